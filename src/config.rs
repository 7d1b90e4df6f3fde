use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Attendance sidecar: line-delimited JSON requests on stdin, responses on stdout.
#[derive(Parser, Debug, Clone)]
#[command(name = "attendd", version)]
pub struct Config {
    /// Open a SQLite workspace at startup instead of the in-memory store.
    #[arg(long, env = "ATTENDD_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Start the in-memory store without the demo students.
    #[arg(long, env = "ATTENDD_NO_SEED")]
    pub no_seed: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, env = "ATTENDD_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn load() -> Self {
        Self::parse()
    }
}

/// Logs go to stderr; stdout carries the protocol.
pub fn init_tracing(config: &Config) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
