use async_trait::async_trait;
use reqwest::redirect::Policy;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::constants::{defaults, display, http_status, messages, timeouts};
use crate::core::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    Head,
    Get,
}

/// Failure to obtain any HTTP status at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Timeout,
    Other(String),
}

/// The network boundary of the prober. Returns the final status code after
/// redirects have been followed.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn request(
        &self,
        method: ProbeMethod,
        url: &str,
    ) -> std::result::Result<u16, TransportError>;
}

/// `HttpTransport` over a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build the per-run client: total timeout, redirect limit and User-Agent
    /// all come from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout_duration())
            .redirect(Policy::limited(defaults::MAX_REDIRECTS))
            .user_agent(config.user_agent())
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn request(
        &self,
        method: ProbeMethod,
        url: &str,
    ) -> std::result::Result<u16, TransportError> {
        let request = match method {
            ProbeMethod::Head => self.client.head(url),
            ProbeMethod::Get => self.client.get(url),
        };

        match request.send().await {
            Ok(resp) => Ok(resp.status().as_u16()),
            Err(err) if err.is_timeout() => Err(TransportError::Timeout),
            Err(err) => {
                let description = std::error::Error::source(&err)
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| err.to_string());
                Err(TransportError::Other(description))
            }
        }
    }
}

/// Lifecycle of one URL probe.
///
/// `Pending → Probing → {Ok | Retrying → Probing | Failed}`, with `Cancelled`
/// reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Pending,
    Probing { attempt: u32 },
    Retrying { attempt: u32 },
    Ok,
    Failed,
    Cancelled,
}

impl ProbeState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProbeState::Ok | ProbeState::Failed | ProbeState::Cancelled
        )
    }
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeState::Pending => f.write_str("pending"),
            ProbeState::Probing { attempt } => write!(f, "probing (attempt {})", attempt + 1),
            ProbeState::Retrying { attempt } => {
                write!(f, "retrying (after attempt {})", attempt + 1)
            }
            ProbeState::Ok => f.write_str("ok"),
            ProbeState::Failed => f.write_str("failed"),
            ProbeState::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Result of probing one unique URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub url: String,
    pub ok: bool,
    pub detail: String,
    pub status_code: Option<u16>,
    pub attempts: u32,
    pub cancelled: bool,
}

impl ProbeOutcome {
    fn finished(
        url: &str,
        ok: bool,
        detail: String,
        status_code: Option<u16>,
        attempts: u32,
    ) -> Self {
        Self {
            url: url.to_string(),
            ok,
            detail,
            status_code,
            attempts,
            cancelled: false,
        }
    }

    fn cancelled(url: &str, attempts: u32) -> Self {
        Self {
            url: url.to_string(),
            ok: false,
            detail: messages::CANCELLED.to_string(),
            status_code: None,
            attempts,
            cancelled: true,
        }
    }
}

/// Probes external URLs through a transport.
///
/// Every request first takes a permit from `gate`, which is shared by all
/// probes of a run and bounds the number of requests in flight. Permits are
/// released before any backoff sleep.
pub struct Prober<T> {
    transport: Arc<T>,
    gate: Arc<Semaphore>,
    max_retries: u32,
    cancel: CancellationToken,
}

impl<T: HttpTransport> Prober<T> {
    pub fn new(
        transport: Arc<T>,
        max_concurrent: usize,
        max_retries: u32,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            transport,
            gate: Arc::new(Semaphore::new(max_concurrent.max(1))),
            max_retries,
            cancel,
        }
    }

    pub async fn probe(&self, url: &str) -> ProbeOutcome {
        let mut state = ProbeState::Pending;
        let mut last_error: Option<TransportError> = None;
        let mut attempts = 0;

        for attempt in 0..self.max_retries {
            if self.cancel.is_cancelled() {
                transition(url, &mut state, ProbeState::Cancelled);
                return ProbeOutcome::cancelled(url, attempts);
            }

            let result = {
                let permit = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => None,
                    permit = self.gate.acquire() => permit.ok(),
                };
                let Some(_permit) = permit else {
                    transition(url, &mut state, ProbeState::Cancelled);
                    return ProbeOutcome::cancelled(url, attempts);
                };

                transition(url, &mut state, ProbeState::Probing { attempt });
                attempts += 1;
                self.attempt(url).await
            };

            match result {
                Ok(status) if status < http_status::FIRST_ERROR => {
                    transition(url, &mut state, ProbeState::Ok);
                    return ProbeOutcome::finished(
                        url,
                        true,
                        format!("OK ({status})"),
                        Some(status),
                        attempts,
                    );
                }
                Ok(status) => {
                    transition(url, &mut state, ProbeState::Failed);
                    return ProbeOutcome::finished(
                        url,
                        false,
                        format!("HTTP {status}"),
                        Some(status),
                        attempts,
                    );
                }
                Err(err) => {
                    log::debug!("{url}: attempt {} failed: {err:?}", attempt + 1);
                    last_error = Some(err);
                }
            }

            if attempt + 1 < self.max_retries {
                transition(url, &mut state, ProbeState::Retrying { attempt });
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        transition(url, &mut state, ProbeState::Cancelled);
                        return ProbeOutcome::cancelled(url, attempts);
                    }
                    _ = sleep(backoff_delay(attempt)) => {}
                }
            }
        }

        transition(url, &mut state, ProbeState::Failed);
        let detail = match last_error {
            Some(TransportError::Timeout) => messages::TIMEOUT.to_string(),
            Some(TransportError::Other(msg)) => format!(
                "Error: {}",
                truncate_chars(&msg, display::MAX_ERROR_CHARS)
            ),
            None => messages::MAX_RETRIES_EXCEEDED.to_string(),
        };
        ProbeOutcome::finished(url, false, detail, None, attempts)
    }

    /// One attempt: HEAD, then a single GET if the server rejects HEAD.
    async fn attempt(&self, url: &str) -> std::result::Result<u16, TransportError> {
        let status = self.transport.request(ProbeMethod::Head, url).await?;
        if status == http_status::METHOD_NOT_ALLOWED {
            return self.transport.request(ProbeMethod::Get, url).await;
        }
        Ok(status)
    }
}

/// Sleep after attempt `n` (counted from 0): 1 s, 2 s, 4 s, ...
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(timeouts::BACKOFF_BASE_SECONDS.saturating_mul(2u64.saturating_pow(attempt)))
}

fn transition(url: &str, state: &mut ProbeState, next: ProbeState) {
    log::debug!("{url}: {state} -> {next}");
    *state = next;
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
