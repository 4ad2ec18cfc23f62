use std::env;

use crate::cli::Cli;

/// Database created next to the working directory when nothing is configured.
const DEFAULT_DATABASE_URL: &str = "sqlite://scheduler.db?mode=rwc";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
}

impl Config {
    /// Resolve configuration: CLI flag first, then `DATABASE_URL`, then the
    /// on-disk default.
    pub fn resolve(cli: &Cli) -> Result<Self, String> {
        let database_url = cli
            .database_url
            .clone()
            .or_else(|| env::var("DATABASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        if database_url.trim().is_empty() {
            return Err("DATABASE_URL must not be empty".to_string());
        }

        Ok(Self { database_url })
    }
}
