use crate::error::TrackerError;
use crate::model::{SessionPolicy, TrackerConfig};
use crate::tui::RenderOutcome;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:139.0) Gecko/20100101 Firefox/139.0";

#[derive(Debug, Parser, Clone)]
#[command(
    name = "swiggy-tracker",
    version,
    about = "Follow your latest Swiggy order with a live progress bar"
)]
pub struct Cli {
    /// Base URL of the Swiggy web API
    #[arg(long, default_value = "https://www.swiggy.com")]
    pub base_url: String,

    /// How often to fetch tracking status
    #[arg(long, default_value = "2s")]
    pub poll_interval: humantime::Duration,

    /// How often to redraw the progress line
    #[arg(long, default_value = "300ms")]
    pub render_interval: humantime::Duration,

    /// Timeout for each HTTP request
    #[arg(long, default_value = "15s")]
    pub request_timeout: humantime::Duration,

    /// Use the polling interval suggested by the tracking response, when present
    #[arg(long)]
    pub honor_server_interval: bool,

    /// Response header that upstream repeats on a valid session
    #[arg(long, default_value = "set-cookie")]
    pub session_header: String,

    /// Number of session headers that marks a valid session
    #[arg(long, default_value_t = 3)]
    pub session_header_count: usize,

    /// Cookie file (defaults to <config dir>/swiggy-cli/cookie)
    #[arg(long)]
    pub cookie_file: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// User-Agent sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

pub async fn run(args: Cli) -> Result<RenderOutcome> {
    crate::logging::init_logging(args.log_file.as_deref())?;
    let cfg = build_config(&args)?;
    tracing::debug!(event = "cli.config", config = ?cfg);

    crate::orchestrator::track_latest_order(&cfg).await
}

/// Build a `TrackerConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> Result<TrackerConfig> {
    let cookie_path = match &args.cookie_file {
        Some(p) => p.clone(),
        None => crate::credentials::default_cookie_path()
            .context("could not resolve a config directory; pass --cookie-file")?,
    };
    Ok(TrackerConfig {
        base_url: args.base_url.clone(),
        cookie_path,
        poll_interval: Duration::from(args.poll_interval),
        render_interval: Duration::from(args.render_interval),
        request_timeout: Duration::from(args.request_timeout),
        honor_server_interval: args.honor_server_interval,
        user_agent: args.user_agent.clone(),
        session_policy: SessionPolicy {
            header: args.session_header.to_ascii_lowercase(),
            expected_count: args.session_header_count,
        },
    })
}

/// Process exit status for a failed run.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<TrackerError>()
        .map(|e| i32::from(e.exit_code()))
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_upstream_expectations() {
        let args = Cli::parse_from(["swiggy-tracker", "--cookie-file", "/tmp/c"]);
        let cfg = build_config(&args).unwrap();

        assert_eq!(cfg.base_url, "https://www.swiggy.com");
        assert_eq!(cfg.poll_interval, Duration::from_secs(2));
        assert_eq!(cfg.render_interval, Duration::from_millis(300));
        assert_eq!(cfg.session_policy, SessionPolicy::default());
        assert_eq!(cfg.cookie_path, PathBuf::from("/tmp/c"));
        assert!(cfg.user_agent.starts_with("Mozilla/5.0"));
        assert!(!cfg.honor_server_interval);
    }

    #[test]
    fn session_policy_is_overridable() {
        let args = Cli::parse_from([
            "swiggy-tracker",
            "--cookie-file",
            "/tmp/c",
            "--session-header",
            "X-Session",
            "--session-header-count",
            "1",
            "--poll-interval",
            "5s",
        ]);
        let cfg = build_config(&args).unwrap();

        assert_eq!(cfg.session_policy.header, "x-session");
        assert_eq!(cfg.session_policy.expected_count, 1);
        assert_eq!(cfg.poll_interval, Duration::from_secs(5));
    }

    #[test]
    fn config_serializes_durations_readably() {
        let args = Cli::parse_from(["swiggy-tracker", "--cookie-file", "/tmp/c"]);
        let json = serde_json::to_value(build_config(&args).unwrap()).unwrap();
        assert_eq!(json["poll_interval"], "2s");
        assert_eq!(json["render_interval"], "300ms");
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        let no_order = anyhow::Error::new(TrackerError::NoActiveOrder).context("tracking failed");
        assert_eq!(exit_code(&no_order), 2);

        let session = anyhow::Error::new(TrackerError::SessionInvalidAfterRefresh);
        assert_eq!(exit_code(&session), 1);

        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 1);
    }
}
