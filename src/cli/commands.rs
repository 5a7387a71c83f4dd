//! CLI command definitions and handlers

use clap::Subcommand;
use std::io::Read;
use std::time::Instant;
use tracing::info;

use crate::backends::default_provider;
use crate::core::config::TranslatorConfig;
use crate::core::models::TranslationRequest;
use crate::core::translator::Translator;

/// Commands for the translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Serve {
        /// Bind address (default: HOST env var or 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (default: PORT env var or 5000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Translate text once and print the result
    Translate {
        /// Source language code
        #[arg(short, long)]
        from: String,

        /// Target language code
        #[arg(short, long)]
        to: String,

        /// Text to translate (read from stdin when omitted)
        text: Option<String>,
    },

    /// List configured languages
    Languages,
}

/// Handle server command
pub async fn handle_serve(
    mut config: TranslatorConfig,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    info!("Starting HTTP server on {}:{}", config.host, config.port);
    println!("🚀 Server starting on http://{}:{}", config.host, config.port);

    run_server(&config).await?;

    Ok(())
}

/// Handle one-shot translation command
pub async fn handle_translate(
    config: TranslatorConfig,
    from: String,
    to: String,
    text: Option<String>,
) -> anyhow::Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let start_time = Instant::now();
    let provider = default_provider(&config)?;
    let translator = Translator::from_config(&config, provider);

    info!(
        "Translating from {} to {}",
        config.language_name(&from),
        config.language_name(&to)
    );
    let request = TranslationRequest::new(from, to, text);
    let result = translator.translate(&request).await?;

    info!(
        "Translated {} chunk(s) with {} in {:?}",
        result.chunks,
        result.model_used.as_deref().unwrap_or("no model"),
        start_time.elapsed()
    );

    println!("{}", result.translation);
    Ok(())
}

/// Handle languages command
pub fn handle_languages(config: &TranslatorConfig) -> anyhow::Result<()> {
    if config.languages.is_empty() {
        println!("No languages configured");
        return Ok(());
    }

    for (code, name) in &config.languages {
        println!("{:<8} {}", code, name);
    }
    Ok(())
}
