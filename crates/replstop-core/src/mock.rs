use std::collections::{HashMap, VecDeque};
use std::future::{ready, Future};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{ReplicaError, ReplicaResult};
use crate::replica::Replica;
use crate::types::{Channel, PositionWaitResult, ReplicationStatus, SourcePosition};

/// Kinds of replica calls recorded by [`MockReplica`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Status,
    WaitForPosition,
    StopIoThread,
    StartIoThread,
    StopReplication,
    Close,
}

/// One recorded replica call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Op,
    pub channel: Option<Channel>,
}

/// A scripted replica for testing the safe stop protocol.
///
/// Status reads and position waits are answered from queues; once a queue is
/// empty the replica answers as a caught-up replica whose wait succeeds
/// immediately. Clones share state, so a test can keep a handle after the
/// replica is moved into the orchestrator.
#[derive(Clone, Default)]
pub struct MockReplica {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    statuses: VecDeque<ReplicaResult<ReplicationStatus>>,
    waits: VecDeque<ReplicaResult<i64>>,
    failures: HashMap<Op, ReplicaError>,
    calls: Vec<Call>,
    waited: Vec<(SourcePosition, Duration)>,
}

impl MockReplica {
    pub fn new() -> Self {
        Self::default()
    }

    /// A status row reporting `lag` seconds behind at `bin.000001:<pos>`.
    pub fn status_with_lag(lag: &str, pos: u64) -> ReplicationStatus {
        let mut status = ReplicationStatus::new();
        status.insert("Seconds_Behind_Master", lag);
        status.insert("Master_Log_File", "bin.000001");
        status.insert("Read_Master_Log_Pos", pos.to_string());
        status
    }

    /// Queue the next status read result.
    pub fn push_status(&self, status: ReplicaResult<ReplicationStatus>) -> &Self {
        self.state.lock().unwrap().statuses.push_back(status);
        self
    }

    /// Queue the next raw position wait result.
    pub fn push_wait(&self, result: ReplicaResult<i64>) -> &Self {
        self.state.lock().unwrap().waits.push_back(result);
        self
    }

    /// Make every call of `op` fail with `error`.
    pub fn fail(&self, op: Op, error: ReplicaError) -> &Self {
        self.state.lock().unwrap().failures.insert(op, error);
        self
    }

    /// All recorded calls in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Recorded calls with the channel dropped, for sequence assertions.
    pub fn ops(&self) -> Vec<Op> {
        self.calls().into_iter().map(|c| c.op).collect()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|c| c.op == op).count()
    }

    /// Positions and timeouts handed to the position wait.
    pub fn waited(&self) -> Vec<(SourcePosition, Duration)> {
        self.state.lock().unwrap().waited.clone()
    }

    fn record(&self, op: Op, channel: Option<&Channel>) -> ReplicaResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call {
            op,
            channel: channel.cloned(),
        });
        match state.failures.get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn next_status(&self, channel: &Channel) -> ReplicaResult<ReplicationStatus> {
        self.record(Op::Status, Some(channel))?;
        let mut state = self.state.lock().unwrap();
        state
            .statuses
            .pop_front()
            .unwrap_or_else(|| Ok(Self::status_with_lag("0", 4)))
    }

    fn next_wait(
        &self,
        position: &SourcePosition,
        timeout: Duration,
        channel: &Channel,
    ) -> ReplicaResult<PositionWaitResult> {
        self.record(Op::WaitForPosition, Some(channel))?;
        let mut state = self.state.lock().unwrap();
        state.waited.push((position.clone(), timeout));
        let raw = state.waits.pop_front().unwrap_or(Ok(0))?;
        PositionWaitResult::from_raw(raw)
    }
}

impl Replica for MockReplica {
    fn replication_status(
        &mut self,
        channel: &Channel,
    ) -> impl Future<Output = ReplicaResult<ReplicationStatus>> + Send {
        ready(self.next_status(channel))
    }

    fn wait_for_position(
        &mut self,
        position: &SourcePosition,
        timeout: Duration,
        channel: &Channel,
    ) -> impl Future<Output = ReplicaResult<PositionWaitResult>> + Send {
        ready(self.next_wait(position, timeout, channel))
    }

    fn stop_io_thread(
        &mut self,
        channel: &Channel,
    ) -> impl Future<Output = ReplicaResult<()>> + Send {
        ready(self.record(Op::StopIoThread, Some(channel)))
    }

    fn start_io_thread(
        &mut self,
        channel: &Channel,
    ) -> impl Future<Output = ReplicaResult<()>> + Send {
        ready(self.record(Op::StartIoThread, Some(channel)))
    }

    fn stop_replication(
        &mut self,
        channel: &Channel,
    ) -> impl Future<Output = ReplicaResult<()>> + Send {
        ready(self.record(Op::StopReplication, Some(channel)))
    }

    fn close(self) -> impl Future<Output = ReplicaResult<()>> + Send {
        ready(self.record(Op::Close, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replays_queued_statuses() {
        let mut replica = MockReplica::new();
        replica.push_status(Ok(MockReplica::status_with_lag("7", 100)));

        let channel = Channel::default();
        let first = replica.replication_status(&channel).await.unwrap();
        assert_eq!(first.seconds_behind_master(), Some("7"));

        let second = replica.replication_status(&channel).await.unwrap();
        assert!(second.is_caught_up());
        assert_eq!(replica.count(Op::Status), 2);
    }

    #[tokio::test]
    async fn test_mock_failures_are_recorded() {
        let mut replica = MockReplica::new();
        replica.fail(Op::StopIoThread, ReplicaError::Query("denied".into()));

        let result = replica.stop_io_thread(&Channel::new("a")).await;
        assert_eq!(result, Err(ReplicaError::Query("denied".into())));
        assert_eq!(
            replica.calls(),
            vec![Call {
                op: Op::StopIoThread,
                channel: Some(Channel::new("a")),
            }]
        );
    }

    #[tokio::test]
    async fn test_mock_wait_interprets_sentinel() {
        let mut replica = MockReplica::new();
        replica.push_wait(Ok(-1)).push_wait(Err(ReplicaError::NoResult));

        let position = SourcePosition::new("bin.000001", 4);
        let channel = Channel::default();
        let timeout = Duration::from_secs(10);

        assert_eq!(
            replica.wait_for_position(&position, timeout, &channel).await,
            Ok(PositionWaitResult::TimedOut)
        );
        assert_eq!(
            replica.wait_for_position(&position, timeout, &channel).await,
            Err(ReplicaError::NoResult)
        );
        assert_eq!(
            replica.wait_for_position(&position, timeout, &channel).await,
            Ok(PositionWaitResult::Reached(0))
        );
        assert_eq!(replica.waited().len(), 3);
    }
}
