//! # Merit - Performance Appraisal Server
//!
//! The main binary for the Merit appraisal engine.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for appraisal operations
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │               apps/merit (THE BINARY)             │
//! │                                                   │
//! │     ┌─────────────┐         ┌─────────────┐      │
//! │     │   CLI       │         │   HTTP API  │      │
//! │     │  (clap)     │         │   (axum)    │      │
//! │     └──────┬──────┘         └──────┬──────┘      │
//! │            │                       │             │
//! │            └───────────┬───────────┘             │
//! │                        ▼                         │
//! │                ┌───────────────┐                 │
//! │                │  merit-core   │                 │
//! │                │ (THE LOGIC)   │                 │
//! │                └───────────────┘                 │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! merit server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! merit create --appraisee 1 --appraiser 2 --reviewer 3 --range FY26
//! merit attach -i 1 -a 2 -g 10 -t "Ship the migration" -w 40
//! merit show -i 1 -a 1
//! ```

mod api;
mod cli;
mod directory;
mod sink;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing — MERIT_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("MERIT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "merit=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Merit startup banner.
fn print_banner() {
    println!(
        r#"
  ███╗   ███╗███████╗██████╗ ██╗████████╗
  ████╗ ████║██╔════╝██╔══██╗██║╚══██╔══╝
  ██╔████╔██║█████╗  ██████╔╝██║   ██║
  ██║╚██╔╝██║██╔══╝  ██╔══██╗██║   ██║
  ██║ ╚═╝ ██║███████╗██║  ██║██║   ██║
  ╚═╝     ╚═╝╚══════╝╚═╝  ╚═╝╚═╝   ╚═╝

  Performance Appraisal Core v{}

  Deterministic • Gated • Auditable
"#,
        env!("CARGO_PKG_VERSION")
    );
}
