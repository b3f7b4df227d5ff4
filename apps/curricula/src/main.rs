//! # Curricula - Curriculum Taxonomy Navigator
//!
//! The main binary for the curricula graph engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                apps/curricula (THE BINARY)            │
//! │                                                       │
//! │  ┌─────────────┐   ┌─────────────┐   ┌────────────┐   │
//! │  │    CLI      │   │   Config    │   │  Progress  │   │
//! │  │  (clap)     │   │   (toml)    │   │   (json)   │   │
//! │  └──────┬──────┘   └──────┬──────┘   └─────┬──────┘   │
//! │         └─────────────────┼────────────────┘          │
//! │                           ▼                           │
//! │                  ┌─────────────────┐                  │
//! │                  │ curricula-core  │                  │
//! │                  │  (THE LOGIC)    │                  │
//! │                  └─────────────────┘                  │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! curricula subjects
//! curricula frontier Math -p progress.json -g 3
//! curricula next -p progress.json -s English
//! curricula stats --all -p progress.json
//! ```

use clap::Parser;
use curricula::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Logs go to stderr so JSON output on stdout stays clean.
    // CURRICULA_LOG_FORMAT=json enables machine-parseable logs.
    let log_format = std::env::var("CURRICULA_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "curricula=info,curricula_core=warn".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
