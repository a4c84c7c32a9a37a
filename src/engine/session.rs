use crate::console::ConsoleLock;
use crate::credentials::CredentialStore;
use crate::engine::payload::{OrderEntry, OrdersResponse, TrackingResponse};
use crate::engine::refresh::{RefreshReason, TokenPrompt};
use crate::engine::transport::{RawResponse, Transport};
use crate::error::{TrackerError, TrackerResult};
use crate::model::{OrderIdentity, SessionPolicy, SessionToken, TrackingSnapshot};
use reqwest::Url;
use serde::de::DeserializeOwned;

/// Authenticated access to the upstream order API.
///
/// Requests must not be issued concurrently against the same client: a
/// refresh replaces the cookie while the caller is blocked on the prompt.
/// `&mut self` on every request method enforces that.
pub struct SessionClient<T, P> {
    transport: T,
    prompt: P,
    store: CredentialStore,
    policy: SessionPolicy,
    base_url: Url,
    token: Option<SessionToken>,
    console: ConsoleLock,
}

impl<T: Transport, P: TokenPrompt> SessionClient<T, P> {
    pub fn new(
        transport: T,
        prompt: P,
        store: CredentialStore,
        policy: SessionPolicy,
        base_url: Url,
    ) -> Self {
        Self {
            transport,
            prompt,
            store,
            policy,
            base_url,
            token: None,
            console: ConsoleLock::default(),
        }
    }

    /// Hold `console` while prompting so nothing else draws over the prompt.
    pub fn with_console_lock(mut self, console: ConsoleLock) -> Self {
        self.console = console;
        self
    }

    pub fn orders_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/dapi/order/all");
        url.query_pairs_mut().append_pair("order_id", "");
        url
    }

    pub fn tracking_url(&self, order: &OrderIdentity) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/dapi/order/trackV4");
        url.query_pairs_mut()
            .append_pair("order_id", &order.order_id.to_string())
            .append_pair("type", "full")
            .append_pair("version", "V2")
            .append_pair("customer_id", &order.customer_id);
        url
    }

    /// Orders for the signed-in account, most recent first.
    pub async fn fetch_orders(&mut self) -> TrackerResult<Vec<OrderEntry>> {
        let url = self.orders_url();
        let resp: OrdersResponse = self.get_json(&url).await?;
        Ok(resp.data.orders)
    }

    pub async fn fetch_tracking(
        &mut self,
        order: &OrderIdentity,
    ) -> TrackerResult<TrackingSnapshot> {
        let url = self.tracking_url(order);
        let resp: TrackingResponse = self.get_json(&url).await?;
        Ok(resp.into_snapshot())
    }

    async fn get_json<D: DeserializeOwned>(&mut self, url: &Url) -> TrackerResult<D> {
        let resp = self.authenticated_get(url).await?;
        serde_json::from_slice(&resp.body).map_err(|source| TrackerError::PayloadMalformed {
            url: url.to_string(),
            source,
        })
    }

    /// GET `url` with the session cookie, refreshing it at most once.
    pub async fn authenticated_get(&mut self, url: &Url) -> TrackerResult<RawResponse> {
        let token = self.current_token()?;
        let resp = self.transport.get(url, &token).await?;
        let received = resp.header_count(&self.policy.header);
        if self.policy.accepts(received) {
            return check_status(url, resp);
        }

        let rejected = TrackerError::SessionRejected {
            received,
            expected: self.policy.expected_count,
        };
        tracing::info!(event = "session.rejected", url = %url, reason = %rejected);

        let token = self.refresh(RefreshReason::Expired)?;
        let resp = self.transport.get(url, &token).await?;
        let received = resp.header_count(&self.policy.header);
        if !self.policy.accepts(received) {
            tracing::error!(event = "session.invalid_after_refresh", url = %url, received);
            return Err(TrackerError::SessionInvalidAfterRefresh);
        }
        check_status(url, resp)
    }

    fn current_token(&mut self) -> TrackerResult<SessionToken> {
        if let Some(token) = &self.token {
            return Ok(token.clone());
        }
        match self.store.load() {
            Ok(token) => {
                self.token = Some(token.clone());
                Ok(token)
            }
            Err(TrackerError::CredentialMissing { path }) => {
                tracing::info!(event = "session.no_cookie", path = %path.display());
                self.refresh(RefreshReason::FirstTime)
            }
            Err(e) => Err(e),
        }
    }

    /// Replace the cookie with one from the operator and try to persist it.
    /// A failed save is only a warning; the new cookie is used in memory.
    fn refresh(&mut self, reason: RefreshReason) -> TrackerResult<SessionToken> {
        let prompt = &mut self.prompt;
        let token = self.console.exclusive(|| prompt.request_token(reason))?;
        if let Err(e) = self.store.save(&token) {
            tracing::warn!(event = "session.persist_failed", error = %e);
            eprintln!("{e}");
        }
        self.token = Some(token.clone());
        tracing::info!(event = "session.refreshed", reason = ?reason);
        Ok(token)
    }
}

fn check_status(url: &Url, resp: RawResponse) -> TrackerResult<RawResponse> {
    if resp.status.is_success() {
        Ok(resp)
    } else {
        Err(TrackerError::Network {
            url: url.to_string(),
            message: format!("upstream returned {}", resp.status),
        })
    }
}
