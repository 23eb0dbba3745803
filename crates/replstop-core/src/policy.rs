use std::time::Duration;

/// Timing and termination knobs for a safe stop run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopPolicy {
    /// Sleep between status reads while the replica is lagging.
    pub poll_interval: Duration,
    /// Server-side timeout handed to the position wait.
    pub wait_timeout: Duration,
    /// Sleep after a timed-out position wait, before stopping the IO thread again.
    pub retry_backoff: Duration,
    /// Give up catching up after this long. `None` waits indefinitely.
    pub catch_up_deadline: Option<Duration>,
    /// Give up after this many stop/verify cycles. `None` retries indefinitely.
    pub max_quiesce_attempts: Option<u32>,
}

impl Default for StopPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            wait_timeout: Duration::from_secs(10),
            retry_backoff: Duration::from_secs(3),
            catch_up_deadline: None,
            max_quiesce_attempts: Some(30),
        }
    }
}

impl StopPolicy {
    pub fn with_catch_up_deadline(mut self, deadline: Duration) -> Self {
        self.catch_up_deadline = Some(deadline);
        self
    }

    pub fn with_max_quiesce_attempts(mut self, attempts: u32) -> Self {
        self.max_quiesce_attempts = Some(attempts);
        self
    }

    /// Remove both bounds.
    pub fn unbounded(mut self) -> Self {
        self.catch_up_deadline = None;
        self.max_quiesce_attempts = None;
        self
    }

    /// Whole seconds handed to the server's position wait, never below one.
    pub fn wait_timeout_secs(&self) -> u64 {
        self.wait_timeout.as_secs().max(1)
    }
}
