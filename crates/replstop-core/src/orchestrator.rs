//! The safe stop protocol.
//!
//! A replica is only stopped once it has caught up with its source and the
//! applier has provably reached the last position fetched by the IO thread:
//!
//! 1. Poll status until the replica reports zero lag.
//! 2. Stop the IO thread, read the fetched position, and wait for the
//!    applier to reach it. A timed-out wait restarts the IO thread, backs
//!    off, and tries again.
//! 3. Stop replication.
//!
//! Any failure after the IO thread was stopped restarts it before the run
//! fails, so replication is never left half stopped.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use crate::error::{StopError, StopResult, Step};
use crate::policy::StopPolicy;
use crate::replica::Replica;
use crate::types::{Channel, PositionWaitResult, SourcePosition};

/// Progress milestones reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    CatchingUp,
    Quiescing,
    Quiesced,
    Stopped,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = match self {
            Phase::CatchingUp => "waiting for catch-up",
            Phase::Quiescing => "stopping IO thread and verifying position",
            Phase::Quiesced => "IO thread stopped safely, stopping replication",
            Phase::Stopped => "replication stopped safely",
        };
        f.write_str(line)
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct StopReport {
    pub channel: Channel,
    /// Status reads made while waiting for zero lag.
    pub catch_up_polls: u32,
    /// Stop/verify cycles, including the successful one.
    pub quiesce_attempts: u32,
    /// Source position the applier was verified at.
    pub position: SourcePosition,
    /// Events applied during the final position wait.
    pub events_applied: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

struct Quiesced {
    attempts: u32,
    position: SourcePosition,
    events_applied: u64,
}

/// Drives one replica through the safe stop protocol.
///
/// Owns the replica session for the whole run; hand it back with
/// [`SafeStop::into_replica`] to close it.
pub struct SafeStop<R> {
    replica: R,
    channel: Channel,
    policy: StopPolicy,
}

impl<R: Replica> SafeStop<R> {
    pub fn new(replica: R, channel: Channel, policy: StopPolicy) -> Self {
        Self {
            replica,
            channel,
            policy,
        }
    }

    pub fn into_replica(self) -> R {
        self.replica
    }

    /// Run the protocol to completion, reporting each phase to `on_phase`.
    pub async fn run(&mut self, mut on_phase: impl FnMut(Phase)) -> StopResult<StopReport> {
        let started_at = Utc::now();
        info!(channel = %self.channel, "Starting safe stop");

        on_phase(Phase::CatchingUp);
        let catch_up_polls = self.catch_up().await?;

        on_phase(Phase::Quiescing);
        let quiesced = self.quiesce().await?;

        on_phase(Phase::Quiesced);
        self.replica
            .stop_replication(&self.channel)
            .await
            .map_err(StopError::replica(Step::StopReplication))?;

        on_phase(Phase::Stopped);
        info!(
            channel = %self.channel,
            position = %quiesced.position,
            attempts = quiesced.attempts,
            "Replication stopped"
        );

        Ok(StopReport {
            channel: self.channel.clone(),
            catch_up_polls,
            quiesce_attempts: quiesced.attempts,
            position: quiesced.position,
            events_applied: quiesced.events_applied,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Poll until the replica reports zero lag. Returns the number of reads.
    async fn catch_up(&mut self) -> StopResult<u32> {
        let started = Instant::now();
        let mut polls = 0u32;

        loop {
            polls += 1;
            let status = self
                .replica
                .replication_status(&self.channel)
                .await
                .map_err(StopError::replica(Step::ReadStatus))?;

            if status.is_caught_up() {
                debug!(polls, "Replica caught up with source");
                return Ok(polls);
            }

            let lag = status.seconds_behind_master().unwrap_or("NULL").to_string();
            debug!(lag = %lag, polls, "Replica still behind source");

            if let Some(deadline) = self.policy.catch_up_deadline {
                let waited = started.elapsed();
                if waited >= deadline {
                    return Err(StopError::CatchUpDeadlineExceeded { waited, lag });
                }
            }

            sleep(self.policy.poll_interval).await;
        }
    }

    /// Stop the IO thread and confirm the applier reached the fetched position.
    async fn quiesce(&mut self) -> StopResult<Quiesced> {
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            self.replica
                .stop_io_thread(&self.channel)
                .await
                .map_err(StopError::replica(Step::StopIoThread))?;

            let status = match self.replica.replication_status(&self.channel).await {
                Ok(status) => status,
                Err(source) => {
                    self.restart_io_thread().await;
                    return Err(StopError::Replica {
                        step: Step::ReadStatus,
                        source,
                    });
                }
            };

            let position = match status.source_position() {
                Ok(position) => position,
                Err(source) => {
                    self.restart_io_thread().await;
                    return Err(StopError::Replica {
                        step: Step::ReadStatus,
                        source,
                    });
                }
            };

            debug!(position = %position, attempt = attempts, "Waiting for applier");
            let waited = self
                .replica
                .wait_for_position(&position, self.policy.wait_timeout, &self.channel)
                .await;

            match waited {
                Ok(PositionWaitResult::Reached(events_applied)) => {
                    return Ok(Quiesced {
                        attempts,
                        position,
                        events_applied,
                    });
                }
                Ok(PositionWaitResult::TimedOut) => {
                    warn!(
                        position = %position,
                        attempt = attempts,
                        "Position wait timed out, restarting IO thread"
                    );
                    self.restart_io_thread().await;

                    if let Some(max) = self.policy.max_quiesce_attempts {
                        if attempts >= max {
                            return Err(StopError::QuiesceAttemptsExhausted { attempts });
                        }
                    }

                    sleep(self.policy.retry_backoff).await;
                }
                Err(source) => {
                    self.restart_io_thread().await;
                    return Err(StopError::Replica {
                        step: Step::WaitForPosition,
                        source,
                    });
                }
            }
        }
    }

    /// Best-effort rollback of a prior IO thread stop.
    async fn restart_io_thread(&mut self) {
        if let Err(e) = self.replica.start_io_thread(&self.channel).await {
            error!(channel = %self.channel, error = %e, "Failed to restart IO thread");
        }
    }
}
