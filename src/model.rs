use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Title upstream reports once an order has reached the customer.
pub const DELIVERED_TITLE: &str = "Order Delivered";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub base_url: String,
    pub cookie_path: PathBuf,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub render_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub honor_server_interval: bool,
    pub user_agent: String,
    pub session_policy: SessionPolicy,
}

/// Decides whether upstream accepted our cookie.
///
/// A valid session turnaround carries exactly `expected_count` copies of
/// `header`; any other count means the cookie was rejected. Upstream does
/// not document this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPolicy {
    pub header: String,
    pub expected_count: usize,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            header: "set-cookie".into(),
            expected_count: 3,
        }
    }
}

impl SessionPolicy {
    pub fn accepts(&self, session_headers: usize) -> bool {
        session_headers == self.expected_count
    }
}

/// Opaque cookie string sent with every upstream request.
///
/// Never mutated in place; a refresh produces a new token.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep cookies out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(<{} bytes>)", self.0.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIdentity {
    pub order_id: i64,
    pub customer_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    Ongoing,
    Delivered,
}

/// One complete tracking status for the order being followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingSnapshot {
    pub title: String,
    /// Always within [0, 100].
    pub progress_percent: u8,
    pub eta_text: String,
    pub eta_unit: String,
    /// Upstream hint for how often to poll, when it sends one.
    pub poll_hint: Option<Duration>,
}

impl TrackingSnapshot {
    /// Build a snapshot, clamping progress into [0, 100].
    ///
    /// Out-of-range values are reported rather than trusted.
    pub fn new(
        title: impl Into<String>,
        raw_progress: i64,
        eta_text: impl Into<String>,
        eta_unit: impl Into<String>,
    ) -> Self {
        let title = title.into();
        if !(0..=100).contains(&raw_progress) {
            tracing::warn!(
                target: crate::logging::UPSTREAM_TARGET,
                event = "tracking.progress_out_of_range",
                raw_progress,
                title = %title,
            );
        }
        Self {
            title,
            progress_percent: raw_progress.clamp(0, 100) as u8,
            eta_text: eta_text.into(),
            eta_unit: eta_unit.into(),
            poll_hint: None,
        }
    }

    pub fn with_poll_hint(mut self, hint: Option<Duration>) -> Self {
        self.poll_hint = hint;
        self
    }

    pub fn eta(&self) -> String {
        format!("{}{}", self.eta_text, self.eta_unit)
    }

    /// Exact match only; near-misses such as "Order delivered" stay ongoing.
    pub fn terminal_state(&self) -> TerminalState {
        if self.title == DELIVERED_TITLE {
            TerminalState::Delivered
        } else {
            TerminalState::Ongoing
        }
    }
}
