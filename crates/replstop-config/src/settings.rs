use std::fs;
use std::path::Path;
use std::time::Duration;

use replstop_core::{Channel, Dialect, SslMode, StopPolicy};
use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

/// Settings as read from a `replstop.toml` file.
///
/// Every section and field is optional; missing values fall back to the
/// command line defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub replica: ReplicaSettings,
    #[serde(default)]
    pub timing: TimingSettings,
}

/// Connection target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplicaSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Replication channel; empty for the default channel.
    pub channel: String,
    pub ssl_mode: SslMode,
    pub dialect: DialectSetting,
}

impl Default for ReplicaSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            channel: String::new(),
            ssl_mode: SslMode::Disabled,
            dialect: DialectSetting::Auto,
        }
    }
}

/// Statement dialect, or `auto` to detect it from the server version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectSetting {
    #[default]
    Auto,
    Legacy,
    Modern,
}

impl DialectSetting {
    /// The forced dialect, `None` for auto-detection.
    pub fn forced(self) -> Option<Dialect> {
        match self {
            DialectSetting::Auto => None,
            DialectSetting::Legacy => Some(Dialect::Legacy),
            DialectSetting::Modern => Some(Dialect::Modern),
        }
    }
}

/// Protocol timing. Zero disables the two bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingSettings {
    pub poll_interval_secs: u64,
    pub wait_timeout_secs: u64,
    pub retry_backoff_secs: u64,
    pub catch_up_deadline_secs: u64,
    pub max_quiesce_attempts: u32,
}

impl Default for TimingSettings {
    fn default() -> Self {
        let policy = StopPolicy::default();
        Self {
            poll_interval_secs: policy.poll_interval.as_secs(),
            wait_timeout_secs: policy.wait_timeout.as_secs(),
            retry_backoff_secs: policy.retry_backoff.as_secs(),
            catch_up_deadline_secs: policy.catch_up_deadline.map_or(0, |d| d.as_secs()),
            max_quiesce_attempts: policy.max_quiesce_attempts.unwrap_or(0),
        }
    }
}

impl TimingSettings {
    pub fn to_policy(&self) -> StopPolicy {
        StopPolicy {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            wait_timeout: Duration::from_secs(self.wait_timeout_secs),
            retry_backoff: Duration::from_secs(self.retry_backoff_secs),
            catch_up_deadline: (self.catch_up_deadline_secs > 0)
                .then(|| Duration::from_secs(self.catch_up_deadline_secs)),
            max_quiesce_attempts: (self.max_quiesce_attempts > 0)
                .then_some(self.max_quiesce_attempts),
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string, expanding `${VAR}` references.
    pub fn parse(toml_str: &str) -> ConfigResult<Self> {
        let mut settings: Settings = toml::from_str(toml_str)?;
        settings.resolve_env();
        Ok(settings)
    }

    /// Read and parse a settings file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    fn resolve_env(&mut self) {
        let replica = &mut self.replica;
        for value in [
            &mut replica.host,
            &mut replica.user,
            &mut replica.password,
            &mut replica.channel,
        ] {
            *value = resolve_env(value.as_str());
        }
    }

    pub fn channel(&self) -> Channel {
        Channel::new(self.replica.channel.clone())
    }
}

/// Replace `${VAR_NAME}` with the variable's value (empty when unset).
///
/// The input is scanned once, so substituted values are never expanded
/// again. `$${` writes a literal `${`.
fn resolve_env(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(i) = rest.find('$') {
        result.push_str(&rest[..i]);
        let tail = &rest[i..];

        if let Some(after) = tail.strip_prefix("$${") {
            result.push_str("${");
            rest = after;
        } else if let Some(after) = tail.strip_prefix("${") {
            match after.find('}') {
                Some(end) => {
                    result.push_str(&std::env::var(&after[..end]).unwrap_or_default());
                    rest = &after[end + 1..];
                }
                None => {
                    result.push_str(tail);
                    rest = "";
                }
            }
        } else {
            result.push('$');
            rest = &tail[1..];
        }
    }

    result.push_str(rest);
    result
}
