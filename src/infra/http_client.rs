use rand::Rng;
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::{
    FETCH_BACKOFF_START_SECS, FETCH_TIMEOUT_SECS, MAX_FETCH_RETRIES, USER_AGENTS,
};
use crate::error::{Result, ScraperError};
use crate::observability::metrics;

/// HTTP fetcher shared by all site adapters.
///
/// Rotates user agents per request and retries on throttling: 429 backs
/// off exponentially, 403 waits a short random delay before retrying.
#[derive(Debug, Clone, Default)]
pub struct FetchClient {
    client: reqwest::Client,
}

impl FetchClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub async fn get_text(&self, url: &str) -> Result<String> {
        let mut backoff = FETCH_BACKOFF_START_SECS;

        for attempt in 1..=MAX_FETCH_RETRIES {
            let user_agent = {
                let idx = rand::thread_rng().gen_range(0..USER_AGENTS.len());
                USER_AGENTS[idx]
            };

            let response = self
                .client
                .get(url)
                .header(reqwest::header::USER_AGENT, user_agent)
                .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    metrics::sources::request_success();
                    return Ok(resp.text().await?);
                }
                Ok(resp) if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                    warn!(url, attempt, backoff, "throttled (429), backing off");
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    backoff *= 2;
                }
                Ok(resp) if resp.status() == reqwest::StatusCode::FORBIDDEN => {
                    let jitter = { rand::thread_rng().gen_range(1..3) };
                    warn!(url, attempt, "blocked (403), retrying with a new agent");
                    tokio::time::sleep(Duration::from_secs(jitter)).await;
                }
                Ok(resp) => {
                    metrics::sources::request_error();
                    return Err(ScraperError::Api {
                        message: format!("GET {url} returned {}", resp.status()),
                    });
                }
                Err(err) => {
                    debug!(url, attempt, error = %err, "request error, retrying");
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    backoff *= 2;
                }
            }
        }

        metrics::sources::request_error();
        Err(ScraperError::Api {
            message: format!("GET {url} failed after {MAX_FETCH_RETRIES} attempts"),
        })
    }

    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        let body = self.get_text(url).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
