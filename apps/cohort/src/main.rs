//! # Cohort - Student Records Server
//!
//! The main binary for the cohort student records service.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            apps/cohort (THE BINARY)          │
//! │                                              │
//! │   ┌─────────────┐        ┌─────────────┐     │
//! │   │    CLI      │        │  HTTP API   │     │
//! │   │   (clap)    │        │   (axum)    │     │
//! │   └──────┬──────┘        └──────┬──────┘     │
//! │          └───────────┬──────────┘            │
//! │                      ▼                       │
//! │              ┌───────────────┐               │
//! │              │  cohort-core  │               │
//! │              │  (THE LOGIC)  │               │
//! │              └───────────────┘               │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! cohort server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! cohort add Kevin Andersson 1994-07-26 kevinandersson@gmail.com
//! cohort grade 1 4.5
//! cohort groups --count 3
//! cohort average
//! ```

use clap::Parser;
use cohort::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // COHORT_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("COHORT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "cohort=debug,tower_http=debug"
    } else {
        "cohort=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

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

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!(error = %e, class = ?e.class(), "Command failed");
        std::process::exit(1);
    }
}

/// Print the cohort startup banner.
fn print_banner() {
    println!(
        r#"
   ___      _                _
  / __|___ | |_   ___  _ _  | |_
 | (__/ _ \| ' \ / _ \| '_| |  _|
  \___\___/|_||_|\___/|_|    \__|

  Student Records v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
