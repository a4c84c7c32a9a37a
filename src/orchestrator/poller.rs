//! Background tracking refresh.

use crate::engine::{SessionClient, TokenPrompt, Transport};
use crate::error::TrackerResult;
use crate::model::OrderIdentity;
use crate::snapshot::SnapshotPublisher;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub(crate) struct TrackingPoller<T, P> {
    client: SessionClient<T, P>,
    order: OrderIdentity,
    publisher: SnapshotPublisher,
    interval: Duration,
    honor_server_interval: bool,
}

impl<T, P> TrackingPoller<T, P>
where
    T: Transport + 'static,
    P: TokenPrompt + 'static,
{
    pub fn new(
        client: SessionClient<T, P>,
        order: OrderIdentity,
        publisher: SnapshotPublisher,
        interval: Duration,
        honor_server_interval: bool,
    ) -> Self {
        Self {
            client,
            order,
            publisher,
            interval,
            honor_server_interval,
        }
    }

    pub fn spawn(self, shutdown: CancellationToken) -> tokio::task::JoinHandle<TrackerResult<()>> {
        tokio::spawn(self.run(shutdown))
    }

    /// Fetch, publish, sleep; repeat until `shutdown` fires.
    ///
    /// Failed cycles keep the previous snapshot visible. Only an
    /// unrecoverable session ends the loop early, and it cancels `shutdown`
    /// so the renderer stops too.
    pub async fn run(mut self, shutdown: CancellationToken) -> TrackerResult<()> {
        let mut delay = self.interval;
        loop {
            let res = tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                res = self.client.fetch_tracking(&self.order) => res,
            };
            match res {
                Ok(snapshot) => {
                    delay = match snapshot.poll_hint {
                        Some(hint) if self.honor_server_interval => hint,
                        _ => self.interval,
                    };
                    tracing::debug!(
                        event = "poller.snapshot",
                        title = %snapshot.title,
                        progress = snapshot.progress_percent,
                    );
                    self.publisher.publish(snapshot);
                }
                Err(e) if e.is_fatal_in_poller() => {
                    tracing::error!(
                        event = "poller.stopped",
                        code = e.error_code(),
                        error = %e,
                    );
                    shutdown.cancel();
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        event = "poller.cycle_failed",
                        code = e.error_code(),
                        error = %e,
                    );
                }
            }

            tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
