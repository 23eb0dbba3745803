use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReplicaError, ReplicaResult};

/// Value reported for the lag field once the applier has caught up.
pub const ZERO_LAG: &str = "0";

/// Sentinel returned by the position wait when the timeout elapsed.
pub const WAIT_TIMED_OUT: i64 = -1;

/// A replication channel on a multi-source replica.
///
/// The default (empty) channel leaves statements unscoped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Channel(String);

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn is_default(&self) -> bool {
        self.0.is_empty()
    }

    /// The channel name, or `None` for the default channel.
    pub fn name(&self) -> Option<&str> {
        if self.0.is_empty() {
            None
        } else {
            Some(&self.0)
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => f.write_str("(default)"),
        }
    }
}

/// Which generation of replication statements and status fields a server speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `SHOW SLAVE STATUS`, `MASTER_POS_WAIT`, `STOP SLAVE`.
    Legacy,
    /// `SHOW REPLICA STATUS`, `SOURCE_POS_WAIT`, `STOP REPLICA` (MySQL 8.0.22+).
    Modern,
}

impl Dialect {
    /// Pick the dialect for a server version triple.
    ///
    /// MariaDB reports 10.x and up and only understands the legacy syntax.
    pub fn for_server_version(version: (u16, u16, u16)) -> Self {
        let (major, minor, patch) = version;
        if major >= 10 {
            return Dialect::Legacy;
        }
        if (major, minor, patch) >= (8, 0, 22) {
            Dialect::Modern
        } else {
            Dialect::Legacy
        }
    }
}

/// TLS requirement for the replica connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    #[default]
    Disabled,
    /// Encrypt, but accept any certificate.
    Required,
    /// Encrypt and verify the certificate chain and host name.
    VerifyIdentity,
}

/// One normalized row of replica status output.
///
/// Keys are lower-cased field names. Fields the server reported as `NULL`
/// are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicationStatus {
    fields: HashMap<String, String>,
}

impl ReplicationStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field, normalizing its name.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields sorted by name.
    pub fn iter_sorted(&self) -> Vec<(&str, &str)> {
        let mut fields: Vec<_> = self
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        fields
    }

    fn either(&self, legacy: &str, modern: &str) -> Option<&str> {
        self.get(legacy).or_else(|| self.get(modern))
    }

    pub fn seconds_behind_master(&self) -> Option<&str> {
        self.either("seconds_behind_master", "seconds_behind_source")
    }

    pub fn master_log_file(&self) -> Option<&str> {
        self.either("master_log_file", "source_log_file")
    }

    pub fn read_master_log_pos(&self) -> Option<&str> {
        self.either("read_master_log_pos", "read_source_log_pos")
    }

    pub fn is_caught_up(&self) -> bool {
        self.seconds_behind_master() == Some(ZERO_LAG)
    }

    /// The last source position the IO thread has fetched.
    pub fn source_position(&self) -> ReplicaResult<SourcePosition> {
        let log_file = self
            .master_log_file()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| ReplicaError::InvalidStatus("source log file not reported".into()))?;

        let raw_pos = self
            .read_master_log_pos()
            .ok_or_else(|| ReplicaError::InvalidStatus("read position not reported".into()))?;

        let log_pos = raw_pos.trim().parse::<u64>().map_err(|_| {
            ReplicaError::InvalidStatus(format!("read position '{}' is not an integer", raw_pos))
        })?;

        Ok(SourcePosition::new(log_file, log_pos))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ReplicationStatus {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut status = ReplicationStatus::new();
        for (name, value) in iter {
            status.insert(name.as_ref(), value);
        }
        status
    }
}

/// A position in the source's binary log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub log_file: String,
    pub log_pos: u64,
}

impl SourcePosition {
    pub fn new(log_file: impl Into<String>, log_pos: u64) -> Self {
        Self {
            log_file: log_file.into(),
            log_pos,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.log_file, self.log_pos)
    }
}

/// Outcome of waiting for the applier to reach a source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionWaitResult {
    /// Position reached; carries the number of events applied while waiting.
    Reached(u64),
    /// The timeout elapsed first.
    TimedOut,
}

impl PositionWaitResult {
    /// Interpret the integer returned by the server.
    pub fn from_raw(value: i64) -> ReplicaResult<Self> {
        match value {
            WAIT_TIMED_OUT => Ok(PositionWaitResult::TimedOut),
            n if n >= 0 => Ok(PositionWaitResult::Reached(n as u64)),
            n => Err(ReplicaError::UnexpectedWaitResult(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(fields: &[(&str, &str)]) -> ReplicationStatus {
        fields.iter().copied().collect()
    }

    #[test]
    fn test_keys_are_lowercased() {
        let s = status(&[("Seconds_Behind_Master", "0"), ("Master_Log_File", "bin.000042")]);
        assert_eq!(s.get("seconds_behind_master"), Some("0"));
        assert_eq!(s.get("SECONDS_BEHIND_MASTER"), Some("0"));
        assert_eq!(s.master_log_file(), Some("bin.000042"));
        assert!(s.is_caught_up());
    }

    #[test]
    fn test_modern_field_names() {
        let s = status(&[
            ("Seconds_Behind_Source", "12"),
            ("Source_Log_File", "binlog.000007"),
            ("Read_Source_Log_Pos", "4711"),
        ]);
        assert_eq!(s.seconds_behind_master(), Some("12"));
        assert!(!s.is_caught_up());
        assert_eq!(
            s.source_position().unwrap(),
            SourcePosition::new("binlog.000007", 4711)
        );
    }

    #[test]
    fn test_missing_lag_is_not_caught_up() {
        let s = status(&[("Slave_IO_Running", "No")]);
        assert_eq!(s.seconds_behind_master(), None);
        assert!(!s.is_caught_up());
    }

    #[test]
    fn test_source_position_errors() {
        let s = status(&[("Read_Master_Log_Pos", "120")]);
        assert!(matches!(
            s.source_position(),
            Err(ReplicaError::InvalidStatus(_))
        ));

        let s = status(&[("Master_Log_File", "bin.000001"), ("Read_Master_Log_Pos", "abc")]);
        let err = s.source_position().unwrap_err();
        assert!(err.to_string().contains("'abc' is not an integer"));
    }

    #[test]
    fn test_wait_result_from_raw() {
        assert_eq!(
            PositionWaitResult::from_raw(0).unwrap(),
            PositionWaitResult::Reached(0)
        );
        assert_eq!(
            PositionWaitResult::from_raw(5).unwrap(),
            PositionWaitResult::Reached(5)
        );
        assert_eq!(
            PositionWaitResult::from_raw(-1).unwrap(),
            PositionWaitResult::TimedOut
        );
        assert_eq!(
            PositionWaitResult::from_raw(-2),
            Err(ReplicaError::UnexpectedWaitResult(-2))
        );
    }

    #[test]
    fn test_dialect_for_server_version() {
        assert_eq!(Dialect::for_server_version((5, 7, 44)), Dialect::Legacy);
        assert_eq!(Dialect::for_server_version((8, 0, 21)), Dialect::Legacy);
        assert_eq!(Dialect::for_server_version((8, 0, 22)), Dialect::Modern);
        assert_eq!(Dialect::for_server_version((8, 4, 0)), Dialect::Modern);
        assert_eq!(Dialect::for_server_version((10, 11, 6)), Dialect::Legacy);
    }

    #[test]
    fn test_channel_name() {
        assert_eq!(Channel::default().name(), None);
        assert!(Channel::new("").is_default());
        assert_eq!(Channel::new("main-db").name(), Some("main-db"));
        assert_eq!(Channel::default().to_string(), "(default)");
    }
}
