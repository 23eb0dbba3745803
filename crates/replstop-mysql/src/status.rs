//! Replica status reads.

use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Row, Value};
use replstop_core::{Channel, Dialect, ReplicaError, ReplicaResult, ReplicationStatus};
use tracing::debug;

use crate::error::query_error;
use crate::queries;

/// Read the replica status row for `channel`.
pub async fn read_status(
    conn: &mut Conn,
    dialect: Dialect,
    channel: &Channel,
) -> ReplicaResult<ReplicationStatus> {
    let query = queries::status_query(dialect, channel);
    let rows: Vec<Row> = conn.query(query).await.map_err(query_error)?;

    let row = first_row(rows, channel)?;
    let status = status_from_row(&row);
    debug!(
        channel = %channel,
        fields = status.len(),
        lag = ?status.seconds_behind_master(),
        "Read replication status"
    );
    Ok(status)
}

/// The status row, or `NoStatus` when the channel is not configured.
fn first_row<T>(rows: Vec<T>, channel: &Channel) -> ReplicaResult<T> {
    rows.into_iter().next().ok_or_else(|| ReplicaError::NoStatus {
        channel: channel.name().map(str::to_string),
    })
}

fn status_from_row(row: &Row) -> ReplicationStatus {
    let columns = row.columns_ref();
    status_from_fields(
        columns
            .iter()
            .enumerate()
            .map(|(i, column)| (column.name_str().into_owned(), row.as_ref(i))),
    )
}

/// Build a status from `(column name, value)` pairs, dropping `NULL`s.
pub(crate) fn status_from_fields<'a>(
    fields: impl IntoIterator<Item = (String, Option<&'a Value>)>,
) -> ReplicationStatus {
    let mut status = ReplicationStatus::new();
    for (name, value) in fields {
        if let Some(text) = value.and_then(value_text) {
            status.insert(&name, text);
        }
    }
    status
}

/// Text form of a column value, `None` for `NULL`.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::NULL => None,
        Value::Bytes(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Value::Int(i) => Some(i.to_string()),
        Value::UInt(u) => Some(u.to_string()),
        other => Some(other.as_sql(true).trim_matches('\'').to_string()),
    }
}
