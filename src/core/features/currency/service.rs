use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::shared::error::{AppError, AppResult};
use crate::shared::settings::AppSettings;

use super::types::PairRateResponse;

/// Source of exchange rates. One call, one attempt.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rate(&self, from: &str, to: &str) -> AppResult<f64>;
}

/// Client for the exchangerate-api.com pair endpoint.
pub struct ExchangeRateApi {
    http: Client,
    base_url: String,
    api_key: String,
}

impl ExchangeRateApi {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent("universal-calc/currency")
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_settings(settings: &AppSettings) -> AppResult<Self> {
        Self::new(
            settings.currency.base_url.clone(),
            settings.api_keys.currency_api_key.clone(),
            settings.currency.timeout(),
        )
    }

    fn pair_url(&self, from: &str, to: &str) -> String {
        format!("{}/{}/pair/{}/{}", self.base_url, self.api_key, from, to)
    }
}

#[async_trait]
impl RateProvider for ExchangeRateApi {
    async fn fetch_rate(&self, from: &str, to: &str) -> AppResult<f64> {
        if self.api_key.is_empty() {
            return Err(AppError::Config("Currency API key is not configured".into()));
        }

        tracing::info!(from, to, "fetching exchange rate");
        let resp = self
            .http
            .get(self.pair_url(from, to))
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AppError::Network(format!(
                "Failed to fetch rate: {}",
                resp.status()
            )));
        }

        let payload: PairRateResponse = resp
            .json()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid response: {}", e)))?;

        payload.into_rate()
    }
}

/// Bound a provider call so a silent endpoint cannot hold a conversion forever.
pub async fn fetch_rate_with_timeout(
    provider: &dyn RateProvider,
    from: &str,
    to: &str,
    timeout: Duration,
) -> AppResult<f64> {
    tokio::time::timeout(timeout, provider.fetch_rate(from, to)).await?
}
