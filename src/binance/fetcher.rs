use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::types::BinanceApiErrorResponse;
use crate::config::ExchangeConfig;
use crate::error::AppError;

/// A single GET returning a parsed JSON body. Non-2xx statuses are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get_json(&self, url: &str) -> Result<Value> {
        (**self).get_json(url).await
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ta-scout/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn compact_error_body(body: &str) -> String {
        let normalized = body.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.chars().count() > 180 {
            format!("{}...", normalized.chars().take(180).collect::<String>())
        } else {
            normalized
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let resp = self.http.get(url).send().await.map_err(AppError::Http)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            if let Ok(err) = serde_json::from_str::<BinanceApiErrorResponse>(&body) {
                return Err(AppError::BinanceApi {
                    code: err.code,
                    msg: err.msg,
                }
                .into());
            }
            return Err(anyhow!(
                "HTTP {}: {}",
                status,
                Self::compact_error_body(&body)
            ));
        }

        resp.json::<Value>().await.context("response JSON parse failed")
    }
}

/// Issues one logical request against an ordered host list: mirror, origin,
/// then origin through a pass-through relay. Attempts are sequential and each
/// one is bounded by its own timeout.
pub struct ResilientFetcher<T: Transport> {
    transport: T,
    exchange: ExchangeConfig,
}

impl<T: Transport> ResilientFetcher<T> {
    pub fn new(transport: T, exchange: ExchangeConfig) -> Self {
        Self {
            transport,
            exchange,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.exchange.request_timeout()
    }

    /// Candidate URLs in attempt order. `query` must already be encoded.
    pub fn candidate_urls(&self, path: &str, query: &str) -> Vec<String> {
        let query_string = if query.is_empty() {
            String::new()
        } else {
            format!("?{}", query)
        };
        let origin = format!("{}{}{}", self.exchange.rest_base_url, path, query_string);

        let mut urls = vec![
            format!("{}{}{}", self.exchange.mirror_base_url, path, query_string),
            origin.clone(),
        ];
        if !self.exchange.relay_prefix.is_empty() {
            let encoded: String = url::form_urlencoded::byte_serialize(origin.as_bytes()).collect();
            urls.push(format!("{}{}", self.exchange.relay_prefix, encoded));
        }
        urls
    }

    /// First successful body wins; each candidate is tried at most once.
    pub async fn fetch(&self, path: &str, query: &str) -> Result<Value> {
        let mut attempts = Vec::new();
        for url in self.candidate_urls(path, query) {
            match self.fetch_once(&url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    tracing::debug!(
                        url = %url,
                        error = %format!("{:#}", e),
                        "Source attempt failed"
                    );
                    attempts.push(format!("{}: {:#}", url, e));
                }
            }
        }
        tracing::warn!(path, attempts = attempts.len(), "All market data sources failed");
        Err(AppError::AllSourcesFailed {
            path: path.to_string(),
            attempts,
        }
        .into())
    }

    /// A single timeout-bounded attempt against an absolute URL.
    pub async fn fetch_once(&self, url: &str) -> Result<Value> {
        let timeout = self.timeout();
        match tokio::time::timeout(timeout, self.transport.get_json(url)).await {
            Ok(result) => result,
            Err(_) => Err(anyhow!("timed out after {} ms", timeout.as_millis())),
        }
    }
}
