use std::path::PathBuf;

/// Failures raised while talking to upstream or managing the session cookie.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("No saved cookie at {path}")]
    CredentialMissing { path: PathBuf },

    #[error("Can't read cookie from {path}: {source}")]
    CredentialUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session rejected by upstream ({received} session headers, expected {expected})")]
    SessionRejected { received: usize, expected: usize },

    #[error("Session still rejected after refreshing the cookie")]
    SessionInvalidAfterRefresh,

    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("Could not decode response from {url}: {source}")]
    PayloadMalformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot find any active orders to track")]
    NoActiveOrder,

    #[error("Can't save cookie to {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read cookie from the console: {message}")]
    Prompt { message: String },

    #[error("Terminal operation failed: {source}")]
    Terminal {
        #[from]
        source: std::io::Error,
    },
}

impl TrackerError {
    /// Error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            TrackerError::CredentialMissing { .. } => "CREDENTIAL_MISSING",
            TrackerError::CredentialUnreadable { .. } => "CREDENTIAL_UNREADABLE",
            TrackerError::SessionRejected { .. } => "SESSION_REJECTED",
            TrackerError::SessionInvalidAfterRefresh => "SESSION_INVALID_AFTER_REFRESH",
            TrackerError::Network { .. } => "NETWORK_FAILURE",
            TrackerError::PayloadMalformed { .. } => "PAYLOAD_MALFORMED",
            TrackerError::NoActiveOrder => "NO_ACTIVE_ORDER",
            TrackerError::Persistence { .. } => "PERSISTENCE_FAILURE",
            TrackerError::Prompt { .. } => "PROMPT_FAILURE",
            TrackerError::Terminal { .. } => "TERMINAL_FAILURE",
        }
    }

    /// Whether a failure inside the background poller must stop tracking.
    /// Everything except an unrecoverable session is skipped for one cycle.
    pub fn is_fatal_in_poller(&self) -> bool {
        matches!(
            self,
            TrackerError::SessionInvalidAfterRefresh | TrackerError::Prompt { .. }
        )
    }

    /// Process exit status for a failure that terminates the run.
    pub fn exit_code(&self) -> u8 {
        match self {
            TrackerError::NoActiveOrder => 2,
            _ => 1,
        }
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
