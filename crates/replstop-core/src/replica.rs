use std::future::Future;
use std::time::Duration;

use crate::error::ReplicaResult;
use crate::types::{Channel, PositionWaitResult, ReplicationStatus, SourcePosition};

/// Operations the safe stop protocol needs from a replica session.
///
/// Every call is scoped to `channel`; the default channel leaves the
/// statement unscoped.
pub trait Replica: Send {
    /// Read one normalized row of replica status.
    fn replication_status(
        &mut self,
        channel: &Channel,
    ) -> impl Future<Output = ReplicaResult<ReplicationStatus>> + Send;

    /// Block until the applier reaches `position` or `timeout` elapses on the server.
    fn wait_for_position(
        &mut self,
        position: &SourcePosition,
        timeout: Duration,
        channel: &Channel,
    ) -> impl Future<Output = ReplicaResult<PositionWaitResult>> + Send;

    /// Stop only the fetching (IO) thread.
    fn stop_io_thread(&mut self, channel: &Channel)
        -> impl Future<Output = ReplicaResult<()>> + Send;

    /// Start the fetching (IO) thread again.
    fn start_io_thread(
        &mut self,
        channel: &Channel,
    ) -> impl Future<Output = ReplicaResult<()>> + Send;

    /// Stop every replication thread.
    fn stop_replication(
        &mut self,
        channel: &Channel,
    ) -> impl Future<Output = ReplicaResult<()>> + Send;

    /// Release the session.
    fn close(self) -> impl Future<Output = ReplicaResult<()>> + Send
    where
        Self: Sized;
}
