//! kslice-search Main Entry Point
//!
//! Enumerates the free trees of one order and reports every cohort that
//! degree sequences, path counts and k-slice signatures cannot separate.

use std::env;
use std::process::ExitCode;

use dotenv::dotenv;
use kslice_search::{Orchestrator, SearchConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kslice_search=info,kslice_core=info"));

    let json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // Logs go to stderr, stdout only carries counterexamples
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_writer(std::io::stderr),
            )
            .init();

        info!(
            service_name = "kslice-search",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .pretty(),
            )
            .init();

        info!(
            service_name = "kslice-search",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }
}

fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = match SearchConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            let limits = SearchConfig::from_env().unwrap_or_default();
            eprintln!("{e}");
            eprintln!("{}", limits.usage());
            return ExitCode::SUCCESS;
        }
    };

    info!(
        order = config.order,
        worker_threads = config.worker_threads,
        initial_k = config.initial_k,
        "Starting kslice-search"
    );

    match Orchestrator::new(config).run() {
        Ok(report) => {
            print!("{report}");
            if report.has_counterexample() {
                info!(
                    survivors = report.survivors().len(),
                    "Counterexamples found"
                );
            } else {
                info!("No counterexample at this order");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Search failed");
            ExitCode::FAILURE
        }
    }
}
