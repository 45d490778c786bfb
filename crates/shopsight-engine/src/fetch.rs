//! Resilient page fetching.
//!
//! One `Fetcher` (and one pooled async client) exists per engine run. A fetch
//! either yields a body or `None`; transport detail never crosses this
//! boundary. Soft failures (403, 429, 5xx, timeouts, transport errors) are
//! retried with exponential backoff and then handed to a blocking-transport
//! pass; a 404 aborts immediately.

use std::time::Duration;

use rand::seq::IndexedRandom;
use reqwest::{header::USER_AGENT, Client, StatusCode};
use serde::de::DeserializeOwned;
use shopsight_core::EngineConfig;

enum Attempt {
    Body(String),
    NotFound,
    Soft(String),
}

pub struct Fetcher {
    client: Client,
    config: EngineConfig,
    /// Unit for the backoff schedule. One second in production; tests shrink
    /// it without changing the schedule's shape.
    backoff_unit: Duration,
}

/// Backoff multiplier before retry `attempt + 1`: `2^attempt`, capped at 10.
fn backoff_factor(attempt: u32) -> u32 {
    (1u32 << attempt.min(4)).min(10)
}

/// Walks the error source chain looking for a TLS or certificate failure.
/// Only such failures justify retrying the blocking pass unverified.
fn is_tls_failure(err: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        let msg = e.to_string();
        if msg.contains("certificate") || msg.contains("TLS") || msg.contains("handshake") {
            return true;
        }
        source = e.source();
    }
    false
}

fn blocking_get(
    url: &str,
    user_agent: &str,
    timeout: Duration,
    verify_certs: bool,
) -> Result<String, reqwest::Error> {
    let mut builder = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent);
    if !verify_certs {
        builder = builder.danger_accept_invalid_certs(true);
    }
    let client = builder.build()?;
    client.get(url).send()?.error_for_status()?.text()
}

impl Fetcher {
    /// Creates a fetcher with the run's pooled client.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if the client cannot be constructed
    /// (e.g. TLS backend initialization failure).
    pub fn new(config: &EngineConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
            backoff_unit: Duration::from_secs(1),
        })
    }

    /// The configuration this fetcher was built with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Overrides the backoff unit. Intended for tests.
    #[must_use]
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Fetches a page body, absorbing every failure into `None`.
    ///
    /// Up to `max_retries + 1` async attempts with backoff, then one
    /// blocking-transport pass. A 404 short-circuits: the resource is absent
    /// and no transport will change that.
    pub async fn fetch(&self, url: &str) -> Option<String> {
        let mut attempt = 0u32;
        loop {
            match self.attempt(url).await {
                Attempt::Body(body) => {
                    self.throttle().await;
                    return Some(body);
                }
                Attempt::NotFound => {
                    tracing::debug!(url, "404, not retrying");
                    return None;
                }
                Attempt::Soft(reason) => {
                    if attempt >= self.config.max_retries {
                        tracing::warn!(url, reason, "async attempts exhausted, trying blocking transport");
                        break;
                    }
                    let delay = self.backoff_unit * backoff_factor(attempt);
                    tracing::warn!(url, attempt, reason, delay_ms = delay.as_millis() as u64, "fetch failed, backing off");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }

        let body = self.fetch_blocking(url).await;
        if body.is_some() {
            self.throttle().await;
        }
        body
    }

    /// Fetches and parses a JSON body. `None` on fetch failure or parse
    /// failure alike.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        let body = self.fetch(url).await?;
        match serde_json::from_str(&body) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(url, error = %err, "body is not the expected JSON shape");
                None
            }
        }
    }

    /// One-shot fetch with a caller-supplied timeout and no retries. Used for
    /// platform re-verification across many third-party domains, where one
    /// slow host must not stall the batch.
    pub async fn fetch_with_timeout(&self, url: &str, timeout: Duration) -> Option<String> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.pick_user_agent())
            .timeout(timeout)
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.text().await.ok()
    }

    async fn attempt(&self, url: &str) -> Attempt {
        let request = self
            .client
            .get(url)
            .header(USER_AGENT, self.pick_user_agent());
        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status == StatusCode::NOT_FOUND {
                    return Attempt::NotFound;
                }
                if !status.is_success() {
                    return Attempt::Soft(format!("status {status}"));
                }
                match response.text().await {
                    Ok(body) => Attempt::Body(body),
                    Err(err) => Attempt::Soft(err.to_string()),
                }
            }
            Err(err) => Attempt::Soft(err.to_string()),
        }
    }

    /// Blocking-transport pass: certificate-verified first; on a TLS failure
    /// only, one unverified retry. Any other failure gives up.
    async fn fetch_blocking(&self, url: &str) -> Option<String> {
        let url = url.to_owned();
        let user_agent = self.pick_user_agent();
        let timeout = Duration::from_secs(self.config.request_timeout_secs);
        let handle = tokio::task::spawn_blocking(move || {
            match blocking_get(&url, &user_agent, timeout, true) {
                Ok(body) => Some(body),
                Err(err) if is_tls_failure(&err) => {
                    tracing::warn!(url, error = %err, "TLS failure on blocking pass, retrying unverified");
                    blocking_get(&url, &user_agent, timeout, false).ok()
                }
                Err(err) => {
                    tracing::debug!(url, error = %err, "blocking transport failed");
                    None
                }
            }
        });
        handle.await.ok().flatten()
    }

    async fn throttle(&self) {
        if self.config.rate_limit_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.rate_limit_delay_ms)).await;
        }
    }

    fn pick_user_agent(&self) -> String {
        self.config
            .user_agents
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_factor_doubles_then_caps() {
        assert_eq!(backoff_factor(0), 1);
        assert_eq!(backoff_factor(1), 2);
        assert_eq!(backoff_factor(2), 4);
        assert_eq!(backoff_factor(3), 8);
        assert_eq!(backoff_factor(4), 10);
        assert_eq!(backoff_factor(9), 10);
    }
}
