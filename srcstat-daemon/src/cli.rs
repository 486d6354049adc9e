//! CLI argument definitions for srcstat-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// TF2 / Source engine match statistics daemon.
///
/// Receives srcds UDP log streams, parses every line into a typed event and
/// aggregates per-server match statistics.
#[derive(Parser, Debug)]
#[command(name = "srcstat-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to srcstat.toml configuration file.
    #[arg(short, long, default_value = "/etc/srcstat/srcstat.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration file and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}
