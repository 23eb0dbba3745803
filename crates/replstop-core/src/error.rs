use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while talking to a replica.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicaError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("no replication status returned{}", channel_suffix(.channel))]
    NoStatus { channel: Option<String> },

    #[error("no result returned by the position wait")]
    NoResult,

    #[error("invalid replication status: {0}")]
    InvalidStatus(String),

    #[error("unexpected position wait result: {0}")]
    UnexpectedWaitResult(i64),
}

fn channel_suffix(channel: &Option<String>) -> String {
    match channel {
        Some(name) => format!(" for channel '{}'", name),
        None => String::new(),
    }
}

pub type ReplicaResult<T> = Result<T, ReplicaError>;

/// The protocol step a replica error surfaced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ReadStatus,
    StopIoThread,
    WaitForPosition,
    StopReplication,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::ReadStatus => "couldn't fetch replication status",
            Step::StopIoThread => "couldn't stop the IO thread",
            Step::WaitForPosition => "position wait failed",
            Step::StopReplication => "couldn't stop replication",
        };
        f.write_str(s)
    }
}

/// Reasons a safe stop run ends in the failed state.
#[derive(Debug, Error)]
pub enum StopError {
    #[error("{step}: {source}")]
    Replica {
        step: Step,
        #[source]
        source: ReplicaError,
    },

    #[error("replica still behind after {waited:?} (seconds behind source: {lag})")]
    CatchUpDeadlineExceeded { waited: Duration, lag: String },

    #[error("applier did not reach the fetched position after {attempts} attempt(s)")]
    QuiesceAttemptsExhausted { attempts: u32 },
}

impl StopError {
    pub(crate) fn replica(step: Step) -> impl FnOnce(ReplicaError) -> StopError {
        move |source| StopError::Replica { step, source }
    }

    /// The replica error underneath, if the run failed on a replica call.
    pub fn replica_error(&self) -> Option<&ReplicaError> {
        match self {
            StopError::Replica { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type StopResult<T> = Result<T, StopError>;
