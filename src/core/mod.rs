//! Core translation engine module

pub mod cache;
pub mod chunker;
pub mod config;
pub mod errors;
pub mod models;
pub mod provider;
pub mod translator;

#[cfg(test)]
pub(crate) mod testing;
