use anyhow::{Context, Result};
use colored::Colorize;
use replstop_core::{Phase, Replica, SafeStop};
use replstop_mysql::MySqlReplica;
use tracing::warn;

use replstop_config::Settings;

use crate::config::connect_options;

pub async fn cmd_stop(settings: Settings, json: bool) -> Result<()> {
    let policy = settings.timing.to_policy();
    let options = connect_options(&settings);

    let replica = MySqlReplica::connect(&options)
        .await
        .with_context(|| format!("Couldn't connect to {}", options.address()))?;

    let mut stop = SafeStop::new(replica, settings.channel(), policy);
    let outcome = stop
        .run(|phase| {
            if let Some(line) = progress_line(phase, json) {
                println!("{}", line);
            }
        })
        .await;

    if let Err(e) = stop.into_replica().close().await {
        warn!(error = %e, "Failed to close replica connection");
    }

    let report = outcome?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

/// Progress line for `phase`. With `--json`, stdout carries only the report.
fn progress_line(phase: Phase, json: bool) -> Option<String> {
    match phase {
        _ if json => None,
        Phase::Stopped => Some(phase.to_string().green().to_string()),
        _ => Some(phase.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHASES: [Phase; 4] = [
        Phase::CatchingUp,
        Phase::Quiescing,
        Phase::Quiesced,
        Phase::Stopped,
    ];

    #[test]
    fn test_progress_lines() {
        for phase in PHASES {
            let line = progress_line(phase, false).unwrap();
            assert!(line.contains(&phase.to_string()));
        }
    }

    #[test]
    fn test_json_suppresses_progress_lines() {
        for phase in PHASES {
            assert_eq!(progress_line(phase, true), None);
        }
    }
}
