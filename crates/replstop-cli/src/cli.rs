use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use replstop_config::DialectSetting;
use replstop_core::SslMode;

#[derive(Parser, Debug)]
#[command(name = "replstop")]
#[command(about = "Stop a MySQL replica's replication once it has provably caught up")]
#[command(version)]
pub struct Cli {
    /// Hostname [default: localhost]
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port [default: 3306]
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Username [default: root]
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// Password (falls back to MYSQL_PWD)
    #[arg(short = 'P', long)]
    pub password: Option<String>,

    /// Channel name for multi-source replication
    #[arg(short = 'c', long)]
    pub channel: Option<String>,

    /// Path to a replstop.toml settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// TLS mode for the replica connection [default: disabled]
    #[arg(long, value_enum)]
    pub ssl_mode: Option<SslModeArg>,

    /// Statement dialect [default: auto]
    #[arg(long, value_enum)]
    pub dialect: Option<DialectArg>,

    /// Seconds between status reads while waiting for catch-up [default: 1]
    #[arg(long)]
    pub poll_interval_secs: Option<u64>,

    /// Server-side timeout of each position wait [default: 10]
    #[arg(long)]
    pub wait_timeout_secs: Option<u64>,

    /// Seconds to back off after a timed-out position wait [default: 3]
    #[arg(long)]
    pub retry_backoff_secs: Option<u64>,

    /// Give up catching up after this many seconds, 0 to wait forever [default: 0]
    #[arg(long)]
    pub catch_up_deadline_secs: Option<u64>,

    /// Give up after this many stop/verify cycles, 0 for no limit [default: 30]
    #[arg(long)]
    pub max_quiesce_attempts: Option<u32>,

    /// Print the replica status and exit without stopping anything
    #[arg(long)]
    pub status: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Log more (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SslModeArg {
    Disabled,
    Required,
    VerifyIdentity,
}

impl From<SslModeArg> for SslMode {
    fn from(arg: SslModeArg) -> Self {
        match arg {
            SslModeArg::Disabled => SslMode::Disabled,
            SslModeArg::Required => SslMode::Required,
            SslModeArg::VerifyIdentity => SslMode::VerifyIdentity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    Auto,
    Legacy,
    Modern,
}

impl From<DialectArg> for DialectSetting {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Auto => DialectSetting::Auto,
            DialectArg::Legacy => DialectSetting::Legacy,
            DialectArg::Modern => DialectSetting::Modern,
        }
    }
}
