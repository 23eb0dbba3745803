use anyhow::{Context, Result};
use replstop_config::{validate_settings, Settings};
use replstop_mysql::ConnectOptions;

use crate::cli::Cli;

/// Build the effective settings: defaults, then the settings file, then flags.
pub fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    apply_flags(&mut settings, cli);

    if cli.password.is_none() && settings.replica.password.is_empty() {
        if let Ok(password) = std::env::var("MYSQL_PWD") {
            settings.replica.password = password;
        }
    }

    validate_settings(&settings).context("Invalid settings")?;
    Ok(settings)
}

fn apply_flags(settings: &mut Settings, cli: &Cli) {
    let replica = &mut settings.replica;
    if let Some(host) = &cli.host {
        replica.host = host.clone();
    }
    if let Some(port) = cli.port {
        replica.port = port;
    }
    if let Some(user) = &cli.user {
        replica.user = user.clone();
    }
    if let Some(password) = &cli.password {
        replica.password = password.clone();
    }
    if let Some(channel) = &cli.channel {
        replica.channel = channel.clone();
    }
    if let Some(ssl_mode) = cli.ssl_mode {
        replica.ssl_mode = ssl_mode.into();
    }
    if let Some(dialect) = cli.dialect {
        replica.dialect = dialect.into();
    }

    let timing = &mut settings.timing;
    if let Some(secs) = cli.poll_interval_secs {
        timing.poll_interval_secs = secs;
    }
    if let Some(secs) = cli.wait_timeout_secs {
        timing.wait_timeout_secs = secs;
    }
    if let Some(secs) = cli.retry_backoff_secs {
        timing.retry_backoff_secs = secs;
    }
    if let Some(secs) = cli.catch_up_deadline_secs {
        timing.catch_up_deadline_secs = secs;
    }
    if let Some(attempts) = cli.max_quiesce_attempts {
        timing.max_quiesce_attempts = attempts;
    }
}

pub fn connect_options(settings: &Settings) -> ConnectOptions {
    let replica = &settings.replica;
    ConnectOptions {
        host: replica.host.clone(),
        port: replica.port,
        user: replica.user.clone(),
        password: replica.password.clone(),
        ssl_mode: replica.ssl_mode,
        dialect: replica.dialect.forced(),
    }
}
