use super::backend::RankingBackend;
use super::batch::{Batch, Read, Reply};
use super::error::{StoreError, StoreResult};
use super::protocol::*;

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_millis(500);
const ATTEMPTS: usize = 3;

/// `RankingBackend` backed by a store node reached over HTTP.
///
/// Transport failures are retried with jittered exponential backoff. Every batch
/// carries one op id across all of its attempts, so the node applies it at most once.
pub struct RemoteBackend {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
    attempts: usize,
}

impl RemoteBackend {
    /// `addr` is `host:port` or a full `http://` URL.
    pub fn new(addr: &str, token: Option<String>) -> Self {
        let cleaned = addr.trim_end_matches('/');
        let base_url = if cleaned.starts_with("http://") || cleaned.starts_with("https://") {
            cleaned.to_string()
        } else {
            format!("http://{}", cleaned)
        };

        Self {
            http_client: reqwest::Client::new(),
            base_url,
            token,
            timeout: REQUEST_TIMEOUT,
            attempts: ATTEMPTS,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn post_with_retry<T: serde::Serialize>(
        &self,
        endpoint: &str,
        payload: &T,
    ) -> StoreResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut delay_ms = 50u64;

        for attempt in 0..self.attempts {
            let response = self
                .authorize(self.http_client.post(url.clone()))
                .json(payload)
                .timeout(self.timeout)
                .send()
                .await;

            match response {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if attempt + 1 == self.attempts {
                        return Err(StoreError::from(e));
                    }
                    tracing::debug!("POST {} failed (attempt {}): {}", url, attempt + 1, e);
                    let jitter = rand::random::<u64>() % 25;
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    delay_ms = (delay_ms * 2).min(400);
                }
            }
        }

        Err(StoreError::unavailable("retry attempts exhausted"))
    }
}

#[async_trait]
impl RankingBackend for RemoteBackend {
    async fn execute(&self, batch: Batch) -> StoreResult<()> {
        let payload = ExecRequest {
            op_id: Uuid::new_v4().to_string(),
            batch,
        };
        let response = self.post_with_retry(ENDPOINT_EXEC, &payload).await?;
        let status = response.status();

        let body: ExecResponse = response.json().await.map_err(|e| {
            StoreError::protocol(format!("undecodable exec response ({}): {}", status, e))
        })?;
        if let Some(error) = body.error {
            return Err(error);
        }
        if !status.is_success() {
            return Err(StoreError::unavailable(format!("exec failed: {}", status)));
        }
        if !body.applied {
            tracing::debug!("Store node reported batch {} as a duplicate", payload.op_id);
        }
        Ok(())
    }

    async fn read(&self, reads: Vec<Read>) -> StoreResult<Vec<Reply>> {
        let expected = reads.len();
        let response = self
            .post_with_retry(ENDPOINT_READ, &ReadRequest { reads })
            .await?;
        let status = response.status();

        let body: ReadResponse = response.json().await.map_err(|e| {
            StoreError::protocol(format!("undecodable read response ({}): {}", status, e))
        })?;
        if let Some(error) = body.error {
            return Err(error);
        }
        if !status.is_success() {
            return Err(StoreError::unavailable(format!("read failed: {}", status)));
        }
        if body.replies.len() != expected {
            return Err(StoreError::protocol(format!(
                "expected {} replies, got {}",
                expected,
                body.replies.len()
            )));
        }
        Ok(body.replies)
    }

    async fn ping(&self) -> StoreResult<()> {
        let url = format!("{}{}", self.base_url, ENDPOINT_PING);
        let response = self
            .authorize(self.http_client.get(url))
            .timeout(self.timeout)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            reqwest::StatusCode::UNAUTHORIZED => Err(StoreError::Unauthorized),
            status => Err(StoreError::unavailable(format!("ping failed: {}", status))),
        }
    }
}
