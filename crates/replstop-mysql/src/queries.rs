//! Replication statement text for both statement dialects.
//!
//! `FOR CHANNEL` clauses cannot take placeholders, so channel names are
//! escaped as string literals there. The position wait is a plain function
//! call and binds every argument as a prepared statement parameter instead.

use mysql_async::Value;
use replstop_core::{Channel, Dialect, SourcePosition};

/// ` FOR CHANNEL '<escaped>'`, or nothing for the default channel.
pub fn channel_clause(channel: &Channel) -> String {
    match channel.name() {
        Some(name) => format!(" FOR CHANNEL {}", quote_literal(name)),
        None => String::new(),
    }
}

/// Quote a string literal.
///
/// Quotes are doubled, which parses the same with or without
/// `NO_BACKSLASH_ESCAPES`. Backslashes are doubled too, which assumes the
/// server's default sql_mode.
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "''"))
}

fn keyword(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Legacy => "SLAVE",
        Dialect::Modern => "REPLICA",
    }
}

pub fn status_query(dialect: Dialect, channel: &Channel) -> String {
    format!("SHOW {} STATUS{}", keyword(dialect), channel_clause(channel))
}

pub fn stop_io_thread(dialect: Dialect, channel: &Channel) -> String {
    format!("STOP {} IO_THREAD{}", keyword(dialect), channel_clause(channel))
}

pub fn start_io_thread(dialect: Dialect, channel: &Channel) -> String {
    format!("START {} IO_THREAD{}", keyword(dialect), channel_clause(channel))
}

pub fn stop_replication(dialect: Dialect, channel: &Channel) -> String {
    format!("STOP {}{}", keyword(dialect), channel_clause(channel))
}

/// A parameterized position wait.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionWait {
    pub sql: &'static str,
    pub params: Vec<Value>,
}

pub fn position_wait(
    dialect: Dialect,
    position: &SourcePosition,
    timeout_secs: u64,
    channel: &Channel,
) -> PositionWait {
    let mut params = vec![
        Value::from(position.log_file.as_str()),
        Value::from(position.log_pos),
        Value::from(timeout_secs),
    ];

    let sql = match (dialect, channel.name()) {
        (Dialect::Legacy, None) => "SELECT MASTER_POS_WAIT(?, ?, ?)",
        (Dialect::Legacy, Some(_)) => "SELECT MASTER_POS_WAIT(?, ?, ?, ?)",
        (Dialect::Modern, None) => "SELECT SOURCE_POS_WAIT(?, ?, ?)",
        (Dialect::Modern, Some(_)) => "SELECT SOURCE_POS_WAIT(?, ?, ?, ?)",
    };

    if let Some(name) = channel.name() {
        params.push(Value::from(name));
    }

    PositionWait { sql, params }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unscoped_statements() {
        let channel = Channel::default();
        assert_eq!(status_query(Dialect::Legacy, &channel), "SHOW SLAVE STATUS");
        assert_eq!(stop_io_thread(Dialect::Legacy, &channel), "STOP SLAVE IO_THREAD");
        assert_eq!(start_io_thread(Dialect::Legacy, &channel), "START SLAVE IO_THREAD");
        assert_eq!(stop_replication(Dialect::Legacy, &channel), "STOP SLAVE");
    }

    #[test]
    fn test_channel_scoped_statements() {
        let channel = Channel::new("main-db");
        assert_eq!(
            status_query(Dialect::Legacy, &channel),
            "SHOW SLAVE STATUS FOR CHANNEL 'main-db'"
        );
        assert_eq!(
            stop_io_thread(Dialect::Legacy, &channel),
            "STOP SLAVE IO_THREAD FOR CHANNEL 'main-db'"
        );
        assert_eq!(
            start_io_thread(Dialect::Legacy, &channel),
            "START SLAVE IO_THREAD FOR CHANNEL 'main-db'"
        );
        assert_eq!(
            stop_replication(Dialect::Legacy, &channel),
            "STOP SLAVE FOR CHANNEL 'main-db'"
        );
    }

    #[test]
    fn test_modern_statements() {
        let channel = Channel::new("c2");
        assert_eq!(
            status_query(Dialect::Modern, &channel),
            "SHOW REPLICA STATUS FOR CHANNEL 'c2'"
        );
        assert_eq!(
            stop_io_thread(Dialect::Modern, &Channel::default()),
            "STOP REPLICA IO_THREAD"
        );
        assert_eq!(
            start_io_thread(Dialect::Modern, &channel),
            "START REPLICA IO_THREAD FOR CHANNEL 'c2'"
        );
        assert_eq!(stop_replication(Dialect::Modern, &Channel::default()), "STOP REPLICA");
    }

    #[test]
    fn test_channel_name_is_escaped() {
        let channel = Channel::new("x' OR '1'='1");
        assert_eq!(
            stop_replication(Dialect::Legacy, &channel),
            "STOP SLAVE FOR CHANNEL 'x'' OR ''1''=''1'"
        );
        assert_eq!(quote_literal(r"a\b"), r"'a\\b'");
        assert_eq!(quote_literal(r"o\'x"), r"'o\\''x'");
    }

    #[test]
    fn test_position_wait_unscoped() {
        let position = SourcePosition::new("bin.000042", 1337);
        let wait = position_wait(Dialect::Legacy, &position, 10, &Channel::default());
        assert_eq!(wait.sql, "SELECT MASTER_POS_WAIT(?, ?, ?)");
        assert_eq!(
            wait.params,
            vec![
                Value::from("bin.000042"),
                Value::from(1337u64),
                Value::from(10u64),
            ]
        );
    }

    #[test]
    fn test_position_wait_binds_channel() {
        let position = SourcePosition::new("binlog.000003", 4);
        let channel = Channel::new("o'brien");
        let wait = position_wait(Dialect::Modern, &position, 5, &channel);
        assert_eq!(wait.sql, "SELECT SOURCE_POS_WAIT(?, ?, ?, ?)");
        assert_eq!(wait.params.len(), 4);
        assert_eq!(wait.params[3], Value::from("o'brien"));
    }
}
