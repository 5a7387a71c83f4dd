//! HTTP server

pub mod api;
pub mod pages;
