use crate::output::OutputFormat;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "saas-ops")]
#[command(version)]
#[command(about = "Operator tooling for the tenancy engine", long_about = None)]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, env = "SAAS_LOG", default_value = "warn")]
    pub log_level: String,

    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load and validate a platform configuration file
    CheckConfig { file: PathBuf },
    /// Evaluate a role expression against a set of roles
    Roles {
        expression: String,
        /// Role held by the person; repeatable
        #[arg(long = "role")]
        roles: Vec<String>,
    },
    /// Show the billing schedule of a recurring payment
    Schedule {
        /// First billing day
        #[arg(long)]
        anchor: NaiveDate,
        /// Months between payments
        #[arg(long, default_value_t = 1)]
        period: u32,
        /// When the subscription was cancelled (RFC 3339)
        #[arg(long)]
        cancelled_at: Option<DateTime<Utc>>,
        /// Instant to evaluate at, defaults to now (RFC 3339)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}
