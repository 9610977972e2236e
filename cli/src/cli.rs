//! # CLI Interface
//!
//! Defines the command-line argument structure for `vela-sim` using
//! `clap` derive. Supports two subcommands: `run` and `version`.

use clap::{Parser, Subcommand};

/// Vela banking sandbox demo harness.
///
/// Opens a simulated session, submits a handful of transfers (one flagged
/// for clearance), authorizes the hold after a delay, and streams status
/// changes to the terminal until everything has arrived.
#[derive(Parser, Debug)]
#[command(
    name = "vela-sim",
    about = "Vela banking sandbox demo harness",
    version,
    propagate_version = true
)]
pub struct VelaSimCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the demo binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scripted demo session.
    Run(RunArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Log output format: "pretty" or "json".
    #[arg(long, env = "VELA_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Compress all progression thresholds 5x so a full lifecycle takes a
    /// few seconds instead of half a minute. Demo-day favorite.
    #[arg(long, env = "VELA_FAST")]
    pub fast: bool,

    /// Seconds to wait before authorizing the flagged transfer.
    #[arg(long, default_value_t = 6)]
    pub auth_delay_secs: u64,

    /// Clearance method for the flagged transfer: "code" or "fee".
    #[arg(long, default_value = "code")]
    pub method: String,
}
