//! Waiting for the applier to reach a source position.

use std::time::Duration;

use mysql_async::prelude::Queryable;
use mysql_async::Conn;
use replstop_core::{
    Channel, Dialect, PositionWaitResult, ReplicaError, ReplicaResult, SourcePosition,
};
use tracing::debug;

use crate::error::query_error;
use crate::queries;

/// Block until the applier reaches `position`, or the server-side timeout elapses.
///
/// Zero rows and a `NULL` result both mean the server could not evaluate the
/// wait (applier not running, unknown channel, ...) and surface as
/// [`ReplicaError::NoResult`].
pub async fn wait_for_position(
    conn: &mut Conn,
    dialect: Dialect,
    position: &SourcePosition,
    timeout: Duration,
    channel: &Channel,
) -> ReplicaResult<PositionWaitResult> {
    let timeout_secs = timeout.as_secs().max(1);
    let wait = queries::position_wait(dialect, position, timeout_secs, channel);

    debug!(
        channel = %channel,
        position = %position,
        timeout_secs,
        "Waiting for applier position"
    );

    let result: Option<Option<i64>> = conn
        .exec_first(wait.sql, wait.params)
        .await
        .map_err(query_error)?;

    debug!(result = ?result, "Position wait returned");
    wait_result(result)
}

/// Interpret the first row of a position wait.
fn wait_result(row: Option<Option<i64>>) -> ReplicaResult<PositionWaitResult> {
    let raw = row.flatten().ok_or(ReplicaError::NoResult)?;
    PositionWaitResult::from_raw(raw)
}
