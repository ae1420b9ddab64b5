//! Pure connection state machine for the realtime chat channel.
//!
//! All transitions live here, independent of sockets and timers, so the
//! reconnect rules can be tested without I/O. The driver in
//! [`super::connection`] feeds observed events in and executes the
//! returned outcomes.

use std::time::Duration;

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// No connection requested yet
    Idle,
    /// Connection attempt in flight (first attempt or reconnect)
    Connecting,
    /// Connected; sends are allowed
    Open,
    /// Torn down, either by the user or after giving up
    Closed,
}

/// How a connection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseKind {
    /// Close code 1000 or a user-initiated teardown; never reconnects
    Normal,
    /// Everything else: transport errors, abrupt drops, non-normal codes
    Abnormal,
}

/// What the driver must do after a connection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Stop for good (normal close)
    Stop,
    /// Retry budget exhausted; stop and tell the user
    GiveUp,
    /// Schedule exactly one reconnect attempt after this delay
    Reconnect(Duration),
    /// A reconnect timer is already pending; schedule nothing
    AlreadyPending,
}

/// Bounded exponential backoff for reconnect attempts.
///
/// Attempts are capped so a permanently unreachable server cannot keep
/// the client retrying forever.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnect attempt
    pub initial_delay: Duration,
    /// Multiplier applied per subsequent attempt
    pub multiplier: u32,
    /// Upper bound on a single delay
    pub max_delay: Duration,
    /// Total reconnect attempts before giving up
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(3),
            multiplier: 2,
            max_delay: Duration::from_secs(30),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Delay for the given zero-based attempt number
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(attempt);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// The channel state machine: `idle → connecting → open → closed`, with
/// `open → connecting` through the reconnect path.
#[derive(Debug)]
pub struct ChannelMachine {
    state: ChannelState,
    reconnect_pending: bool,
    attempt: u32,
    policy: ReconnectPolicy,
}

impl ChannelMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ChannelState::Idle,
            reconnect_pending: false,
            attempt: 0,
            policy,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    /// A connection attempt has started
    pub fn connect_started(&mut self) {
        self.state = ChannelState::Connecting;
    }

    /// The connection is established; the reconnect budget resets
    pub fn established(&mut self) {
        self.state = ChannelState::Open;
        self.reconnect_pending = false;
        self.attempt = 0;
    }

    /// The connection (or connection attempt) ended.
    ///
    /// At most one reconnect timer may be pending at any instant: an
    /// abnormal close observed while one is pending schedules nothing.
    pub fn connection_closed(&mut self, kind: CloseKind) -> CloseOutcome {
        match kind {
            CloseKind::Normal => {
                self.state = ChannelState::Closed;
                self.reconnect_pending = false;
                CloseOutcome::Stop
            }
            CloseKind::Abnormal => {
                if self.reconnect_pending {
                    return CloseOutcome::AlreadyPending;
                }
                if self.attempt >= self.policy.max_attempts {
                    self.state = ChannelState::Closed;
                    return CloseOutcome::GiveUp;
                }
                let delay = self.policy.delay_for_attempt(self.attempt);
                self.attempt += 1;
                self.reconnect_pending = true;
                self.state = ChannelState::Connecting;
                CloseOutcome::Reconnect(delay)
            }
        }
    }

    /// The pending reconnect timer fired; a new attempt may start
    pub fn reconnect_fired(&mut self) {
        self.reconnect_pending = false;
        self.state = ChannelState::Connecting;
    }

    /// User-initiated teardown. Idempotent; cancels any pending timer.
    ///
    /// Returns whether a reconnect timer was pending (and is now
    /// cancelled).
    pub fn close_requested(&mut self) -> bool {
        let was_pending = self.reconnect_pending;
        self.reconnect_pending = false;
        self.state = ChannelState::Closed;
        was_pending
    }
}
