use crate::error::{ConfigError, ConfigResult};
use crate::settings::{ReplicaSettings, Settings, TimingSettings};

/// Longest channel name the server accepts.
pub const MAX_CHANNEL_LEN: usize = 64;

/// Validate settings before connecting.
pub fn validate_settings(settings: &Settings) -> ConfigResult<()> {
    validate_replica(&settings.replica)?;
    validate_timing(&settings.timing)?;
    Ok(())
}

fn validate_replica(replica: &ReplicaSettings) -> ConfigResult<()> {
    if replica.host.trim().is_empty() {
        return Err(ConfigError::Empty { field: "host" });
    }
    if replica.user.is_empty() {
        return Err(ConfigError::Empty { field: "user" });
    }
    if replica.port == 0 {
        return Err(ConfigError::NotPositive {
            field: "port",
            value: 0,
        });
    }
    if replica.channel.chars().count() > MAX_CHANNEL_LEN {
        return Err(ConfigError::ChannelTooLong {
            name: replica.channel.clone(),
            max: MAX_CHANNEL_LEN,
        });
    }
    Ok(())
}

fn validate_timing(timing: &TimingSettings) -> ConfigResult<()> {
    // A zero wait timeout means "no timeout" to the server.
    for (field, value) in [
        ("poll_interval_secs", timing.poll_interval_secs),
        ("wait_timeout_secs", timing.wait_timeout_secs),
    ] {
        if value == 0 {
            return Err(ConfigError::NotPositive { field, value });
        }
    }
    Ok(())
}
