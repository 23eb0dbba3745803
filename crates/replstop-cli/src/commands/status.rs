use anyhow::{Context, Result};
use replstop_core::{Replica, ReplicationStatus};
use replstop_mysql::MySqlReplica;
use tracing::warn;

use replstop_config::Settings;

use crate::config::connect_options;

/// Fields shown by default, in display order.
const SUMMARY_FIELDS: &[(&str, &str)] = &[
    ("IO thread", "slave_io_running"),
    ("SQL thread", "slave_sql_running"),
    ("Seconds behind", "seconds_behind_master"),
    ("Source log file", "master_log_file"),
    ("Read position", "read_master_log_pos"),
    ("Applied log file", "relay_master_log_file"),
    ("Applied position", "exec_master_log_pos"),
    ("Last IO error", "last_io_error"),
    ("Last SQL error", "last_sql_error"),
];

pub async fn cmd_status(settings: Settings, json: bool) -> Result<()> {
    let options = connect_options(&settings);
    let channel = settings.channel();

    let mut replica = MySqlReplica::connect(&options)
        .await
        .with_context(|| format!("Couldn't connect to {}", options.address()))?;

    let status = replica.replication_status(&channel).await;

    if let Err(e) = replica.close().await {
        warn!(error = %e, "Failed to close replica connection");
    }

    let status = status.context("Couldn't fetch replication status")?;

    if json {
        let fields: serde_json::Map<String, serde_json::Value> = status
            .iter_sorted()
            .into_iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        println!("{}", serde_json::to_string_pretty(&fields)?);
        return Ok(());
    }

    println!("\nReplication Status (channel {}):", channel);
    println!("{:<20} {}", "Field", "Value");
    println!("{:-<60}", "");
    for (label, value) in summary(&status) {
        println!("{:<20} {}", label, value);
    }
    println!();

    Ok(())
}

/// Summary rows, resolving the modern field name when the legacy one is absent.
fn summary(status: &ReplicationStatus) -> Vec<(&'static str, String)> {
    SUMMARY_FIELDS
        .iter()
        .map(|&(label, field)| {
            let modern = field.replace("slave", "replica").replace("master", "source");
            let value = status
                .get(field)
                .or_else(|| status.get(&modern))
                .unwrap_or("NULL");
            (label, value.to_string())
        })
        .collect()
}
