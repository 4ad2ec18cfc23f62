use clap::Parser;

/// Vaccine scheduler CLI arguments
#[derive(Debug, Parser)]
#[command(
    name = "vaccine-scheduler",
    version,
    about = "Command-driven vaccine appointment scheduler"
)]
pub struct Cli {
    /// SQLite database URL (overrides DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Seed for deterministic caregiver assignment
    #[arg(long)]
    pub seed: Option<u64>,
}
