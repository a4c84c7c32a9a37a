use crate::error::{TrackerError, TrackerResult};
use crate::model::{SessionToken, TrackerConfig};
use reqwest::header::{HeaderMap, ACCEPT, COOKIE, USER_AGENT};
use reqwest::{StatusCode, Url};
use std::future::Future;

/// Raw upstream response before session checks and decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Number of values present for `name` (headers may repeat).
    pub fn header_count(&self, name: &str) -> usize {
        self.headers.get_all(name).iter().count()
    }
}

/// Issues a single GET carrying the session cookie.
pub trait Transport: Send + Sync {
    fn get(
        &self,
        url: &Url,
        token: &SessionToken,
    ) -> impl Future<Output = TrackerResult<RawResponse>> + Send;
}

pub struct HttpTransport {
    http: reqwest::Client,
    user_agent: String,
}

impl HttpTransport {
    pub fn new(cfg: &TrackerConfig) -> TrackerResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()
            .map_err(|e| TrackerError::Network {
                url: cfg.base_url.clone(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            user_agent: cfg.user_agent.clone(),
        })
    }

    /// Upstream rejects requests that don't look like they come from a browser,
    /// so every call carries the configured user agent.
    pub fn build_request(&self, url: &Url, token: &SessionToken) -> reqwest::RequestBuilder {
        self.http
            .get(url.clone())
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "*/*")
            .header(COOKIE, token.as_str())
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &Url, token: &SessionToken) -> TrackerResult<RawResponse> {
        let network = |e: reqwest::Error| TrackerError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };
        let resp = self.build_request(url, token).send().await.map_err(network)?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(network)?.to_vec();
        tracing::debug!(
            event = "http.response",
            url = %url,
            status = status.as_u16(),
            bytes = body.len(),
        );
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
