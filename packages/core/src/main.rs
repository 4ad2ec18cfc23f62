use std::process;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;

use vaccine_scheduler::cli::Cli;
use vaccine_scheduler::commands;
use vaccine_scheduler::config::Config;
use vaccine_scheduler::coordinator::Coordinator;
use vaccine_scheduler::db;
use vaccine_scheduler::logging::init_logging;
use vaccine_scheduler::selector::{CaregiverSelector, SeededSelector, UniformSelector};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = Config::resolve(&cli).unwrap_or_else(|err| {
        tracing::error!("{err}");
        process::exit(1);
    });

    let pool = db::create_pool(&config.database_url)
        .await
        .unwrap_or_else(|err| {
            tracing::error!("cannot open {}: {err}", config.database_url);
            process::exit(1);
        });

    let selector: Arc<dyn CaregiverSelector> = match cli.seed {
        Some(seed) => Arc::new(SeededSelector::new(seed)),
        None => Arc::new(UniformSelector),
    };
    let coordinator = Coordinator::with_selector(pool, selector);

    tracing::info!(database_url = %config.database_url, "scheduler started");
    if let Err(err) = commands::run_loop(&coordinator).await {
        tracing::error!("input loop failed: {err}");
        process::exit(1);
    }
}
