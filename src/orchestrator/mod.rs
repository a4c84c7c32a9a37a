//! Application-level orchestration.
//!
//! This module owns the run lifecycle: resolving the order at start-up,
//! driving the background poller, and coordinating shutdown so the terminal
//! is always restored. CLI code calls into `track_latest_order` and does not
//! touch tasks directly.

mod poller;
mod resolver;
mod shutdown;

use crate::console::ConsoleLock;
use crate::credentials::CredentialStore;
use crate::engine::{ConsolePrompt, HttpTransport, SessionClient, TokenPrompt, Transport};
use crate::model::TrackerConfig;
use crate::snapshot;
use crate::tui::{self, ProgressRenderer, RenderOutcome};
use anyhow::{Context, Result};
use reqwest::Url;
use std::io::Write;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub(crate) use poller::TrackingPoller;
pub(crate) use resolver::{resolve_latest_order, ResolvedOrder};
pub(crate) use shutdown::{spawn_interrupt_handler, CursorGuard, INTERRUPT_GRACE};

/// How long to wait for the poller to notice shutdown before abandoning it.
const POLLER_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Follow the account's latest order until it is delivered or interrupted.
pub(crate) async fn track_latest_order(cfg: &TrackerConfig) -> Result<RenderOutcome> {
    let shutdown = CancellationToken::new();
    let cursor = CursorGuard::hide();
    let signals = spawn_interrupt_handler(shutdown.clone(), cursor.clone(), INTERRUPT_GRACE);

    let res = run_session(cfg, &shutdown).await;

    // Whatever ended the run, stop every task and put the cursor back before
    // the caller prints anything.
    shutdown.cancel();
    signals.abort();
    cursor.restore();
    res
}

async fn run_session(cfg: &TrackerConfig, shutdown: &CancellationToken) -> Result<RenderOutcome> {
    let base_url = Url::parse(&cfg.base_url)
        .with_context(|| format!("invalid base URL: {}", cfg.base_url))?;
    let store = CredentialStore::new(&cfg.cookie_path);
    store
        .prepare()
        .context("failed to create the cookie directory")?;
    let transport = HttpTransport::new(cfg)?;

    let console = ConsoleLock::default();
    let client = SessionClient::new(
        transport,
        ConsolePrompt,
        store,
        cfg.session_policy.clone(),
        base_url,
    )
    .with_console_lock(console.clone());
    let renderer =
        ProgressRenderer::new(std::io::stdout(), tui::terminal_width).with_console_lock(console);

    follow_order(client, renderer, cfg, shutdown).await
}

/// Resolve the latest order, then poll and render it until the run ends.
///
/// A fatal poller error is returned even though the renderer itself ended
/// cleanly.
async fn follow_order<T, P, W, F>(
    mut client: SessionClient<T, P>,
    renderer: ProgressRenderer<W, F>,
    cfg: &TrackerConfig,
    shutdown: &CancellationToken,
) -> Result<RenderOutcome>
where
    T: Transport + 'static,
    P: TokenPrompt + 'static,
    W: Write,
    F: FnMut() -> usize,
{
    let ResolvedOrder { identity, initial } = tokio::select! {
        _ = shutdown.cancelled() => return Ok(RenderOutcome::Interrupted),
        res = resolve_latest_order(&mut client) => res?,
    };
    tracing::info!(
        event = "tracker.started",
        order_id = identity.order_id,
        title = %initial.title,
    );

    let (publisher, reader) = snapshot::channel(initial);
    let poller = TrackingPoller::new(
        client,
        identity,
        publisher,
        cfg.poll_interval,
        cfg.honor_server_interval,
    )
    .spawn(shutdown.clone());

    let outcome = renderer
        .run(reader, cfg.render_interval, shutdown.clone())
        .await?;

    shutdown.cancel();
    match tokio::time::timeout(POLLER_JOIN_TIMEOUT, poller).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => return Err(e.into()),
        Ok(Err(e)) => return Err(anyhow::anyhow!("poller task failed: {e}")),
        Err(_) => tracing::warn!(event = "tracker.poller_join_timeout"),
    }
    Ok(outcome)
}
