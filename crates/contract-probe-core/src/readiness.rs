// crates/contract-probe-core/src/readiness.rs
// ============================================================================
// Module: Readiness Poller
// Description: Bounded poll loop that blocks until a backend answers.
// Purpose: Gate contract scenarios on the backend being reachable.
// Dependencies: reqwest, thiserror, url
// ============================================================================

//! ## Overview
//! [`poll_until_ready`] repeatedly probes a [`ReadinessTarget`] until a probe
//! observes an HTTP status in `[200, 500)` or the timeout elapses. The probe
//! and the clock are injected so the loop is a pure function of its inputs;
//! [`wait_for_ready`] wires in the real [`HttpProbe`] and [`SystemClock`].
//! Invariants:
//! - Transport errors and 5xx responses mean "not ready yet", never success.
//! - Attempts start at `0, interval, 2 * interval, ...` strictly before the
//!   deadline, so at most `ceil(timeout / interval)` attempts are issued.
//! - Each attempt is handed the time left before the deadline as its budget,
//!   so a hanging backend cannot push the loop past `timeout + interval`.
//! - On timeout the loop waits out the deadline, so the reported elapsed time
//!   is at least `timeout`.
//! - Malformed targets fail at construction, never inside the loop.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use thiserror::Error;
use url::Url;

use crate::audit::HarnessAuditSink;
use crate::audit::ReadinessAttemptEvent;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default bound on the whole readiness wait.
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(25);

/// Default delay between poll attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Default bound on a single probe request.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Readiness failures.
#[derive(Debug, Error)]
pub enum ReadinessError {
    /// The target URL or bounds are invalid.
    #[error("invalid readiness target: {0}")]
    InvalidTarget(String),
    /// The probe could not be constructed.
    #[error("readiness probe setup failed: {0}")]
    ProbeSetup(String),
    /// The target never answered within the timeout.
    #[error(
        "readiness timeout: {url} not ready after {} ms ({attempts} attempts, last: {last})",
        .elapsed.as_millis()
    )]
    Timeout {
        /// Polled URL.
        url: String,
        /// Time spent polling.
        elapsed: Duration,
        /// Number of probe attempts issued.
        attempts: u32,
        /// Observation of the final attempt.
        last: ProbeObservation,
    },
}

// ============================================================================
// SECTION: Target
// ============================================================================

/// URL plus wait bounds.
///
/// # Invariants
/// - `url` is an absolute `http`/`https` URL with a host.
/// - `timeout > 0` and `0 < interval <= timeout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessTarget {
    /// URL polled with plain GET requests.
    url: Url,
    /// Bound on the whole wait.
    timeout: Duration,
    /// Delay between attempts.
    interval: Duration,
}

impl ReadinessTarget {
    /// Validates and builds a readiness target.
    ///
    /// # Errors
    ///
    /// Returns [`ReadinessError::InvalidTarget`] for malformed URLs, non-HTTP
    /// schemes, or invalid bounds.
    pub fn new(url: &str, timeout: Duration, interval: Duration) -> Result<Self, ReadinessError> {
        let parsed = Url::parse(url)
            .map_err(|err| ReadinessError::InvalidTarget(format!("{url}: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ReadinessError::InvalidTarget(format!("{url}: scheme must be http or https")));
        }
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(ReadinessError::InvalidTarget(format!("{url}: host required")));
        }
        if timeout.is_zero() {
            return Err(ReadinessError::InvalidTarget("timeout must be greater than zero".to_string()));
        }
        if interval.is_zero() || interval > timeout {
            return Err(ReadinessError::InvalidTarget(
                "poll interval must be greater than zero and at most the timeout".to_string(),
            ));
        }
        Ok(Self {
            url: parsed,
            timeout,
            interval,
        })
    }

    /// Builds a target with the default timeout and interval.
    ///
    /// # Errors
    ///
    /// Returns [`ReadinessError::InvalidTarget`] for malformed URLs.
    pub fn with_defaults(url: &str) -> Result<Self, ReadinessError> {
        Self::new(url, DEFAULT_READINESS_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }

    /// Returns the polled URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the wait bound.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the poll interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

// ============================================================================
// SECTION: Probe
// ============================================================================

/// Result of a single probe attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeObservation {
    /// An HTTP response was received.
    Status(u16),
    /// No response was received (refused, reset, DNS, timeout).
    Transport(String),
}

impl ProbeObservation {
    /// Returns true for a response status in `[200, 500)`.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        match self {
            Self::Status(code) => *code >= 200 && *code < 500,
            Self::Transport(_) => false,
        }
    }
}

impl fmt::Display for ProbeObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "status {code}"),
            Self::Transport(message) => write!(f, "transport error: {message}"),
        }
    }
}

/// One readiness attempt against a URL.
pub trait ReadinessProbe {
    /// Probes `url` once, returning within `budget`; must not panic on
    /// network failures.
    fn probe(&self, url: &Url, budget: Duration) -> ProbeObservation;
}

/// Probe issuing plain GET requests without connection reuse.
pub struct HttpProbe {
    /// Client with pooling disabled and redirects off.
    client: Client,
    /// Upper bound for one attempt, further capped by the caller's budget.
    attempt_timeout: Duration,
}

impl HttpProbe {
    /// Builds an HTTP probe bounded by `attempt_timeout` per request.
    ///
    /// # Errors
    ///
    /// Returns [`ReadinessError::ProbeSetup`] when the HTTP client cannot be built.
    pub fn new(attempt_timeout: Duration) -> Result<Self, ReadinessError> {
        let client = Client::builder()
            .timeout(attempt_timeout)
            .pool_max_idle_per_host(0)
            .redirect(Policy::none())
            .build()
            .map_err(|err| ReadinessError::ProbeSetup(err.to_string()))?;
        Ok(Self {
            client,
            attempt_timeout,
        })
    }
}

impl ReadinessProbe for HttpProbe {
    fn probe(&self, url: &Url, budget: Duration) -> ProbeObservation {
        let timeout = self.attempt_timeout.min(budget);
        match self.client.get(url.as_str()).timeout(timeout).send() {
            Ok(response) => ProbeObservation::Status(response.status().as_u16()),
            Err(err) => ProbeObservation::Transport(err.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Time source for the poll loop.
pub trait PollClock {
    /// Returns the time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
    /// Suspends the caller for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by [`Instant`] and [`thread::sleep`].
pub struct SystemClock {
    /// Origin for [`PollClock::now`].
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock anchored at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PollClock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

// ============================================================================
// SECTION: Poll Loop
// ============================================================================

/// Successful readiness wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessOutcome {
    /// Number of probe attempts issued.
    pub attempts: u32,
    /// Time spent polling.
    pub elapsed: Duration,
    /// Status of the attempt that succeeded.
    pub status: u16,
}

/// Polls `target` until ready or until its timeout elapses.
///
/// # Errors
///
/// Returns [`ReadinessError::Timeout`] when no attempt observed a status in
/// `[200, 500)` before the deadline.
pub fn poll_until_ready<P, C>(
    target: &ReadinessTarget,
    probe: &P,
    clock: &C,
    audit: &dyn HarnessAuditSink,
) -> Result<ReadinessOutcome, ReadinessError>
where
    P: ReadinessProbe + ?Sized,
    C: PollClock + ?Sized,
{
    let start = clock.now();
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        let budget = target.timeout().saturating_sub(clock.now().saturating_sub(start));
        let observation = probe.probe(target.url(), budget);
        let elapsed = clock.now().saturating_sub(start);
        audit.record_readiness(&ReadinessAttemptEvent::new(
            target.url().as_str(),
            attempts,
            elapsed,
            &observation,
        ));
        if let ProbeObservation::Status(status) = observation
            && observation.is_ready()
        {
            return Ok(ReadinessOutcome {
                attempts,
                elapsed,
                status,
            });
        }
        if elapsed.saturating_add(target.interval()) >= target.timeout() {
            clock.sleep(target.timeout().saturating_sub(elapsed));
            return Err(ReadinessError::Timeout {
                url: target.url().to_string(),
                elapsed: clock.now().saturating_sub(start),
                attempts,
                last: observation,
            });
        }
        clock.sleep(target.interval());
    }
}

/// Polls `target` over real HTTP with wall-clock sleeps.
///
/// # Errors
///
/// Returns [`ReadinessError`] when the probe cannot be built or the target
/// never becomes ready.
pub fn wait_for_ready(
    target: &ReadinessTarget,
    audit: &dyn HarnessAuditSink,
) -> Result<ReadinessOutcome, ReadinessError> {
    let probe = HttpProbe::new(DEFAULT_ATTEMPT_TIMEOUT.min(target.timeout()))?;
    poll_until_ready(target, &probe, &SystemClock::new(), audit)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
