//! IO thread and replication control statements.

use mysql_async::prelude::Queryable;
use mysql_async::Conn;
use replstop_core::{Channel, Dialect, ReplicaResult};
use tracing::info;

use crate::error::query_error;
use crate::queries;

async fn execute(conn: &mut Conn, statement: String) -> ReplicaResult<()> {
    conn.query_drop(statement).await.map_err(query_error)
}

/// Stop the IO thread, leaving the applier running.
pub async fn stop_io_thread(
    conn: &mut Conn,
    dialect: Dialect,
    channel: &Channel,
) -> ReplicaResult<()> {
    info!(channel = %channel, "Stopping IO thread");
    execute(conn, queries::stop_io_thread(dialect, channel)).await
}

/// Start the IO thread again.
pub async fn start_io_thread(
    conn: &mut Conn,
    dialect: Dialect,
    channel: &Channel,
) -> ReplicaResult<()> {
    info!(channel = %channel, "Starting IO thread");
    execute(conn, queries::start_io_thread(dialect, channel)).await
}

/// Stop both replication threads.
pub async fn stop_replication(
    conn: &mut Conn,
    dialect: Dialect,
    channel: &Channel,
) -> ReplicaResult<()> {
    info!(channel = %channel, "Stopping replication");
    execute(conn, queries::stop_replication(dialect, channel)).await
}
