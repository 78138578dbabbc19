use std::{num::NonZeroU32, time::Duration};

use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use nonzero_ext::nonzero;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use crate::{
    models::{price_point::PricePoint, request_params::DailyClosesParams},
    providers::{
        PriceSource, ProviderError, ProviderInitError,
        yahoo::{
            params::{construct_params, validate_params},
            response::ChartResponse,
        },
    },
};

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Tunables for [`YahooProvider`].
#[derive(Debug, Clone)]
pub struct YahooSettings {
    /// Chart endpoint; the symbol is appended as a path segment.
    pub base_url: String,
    /// Request budget shared by all calls through one provider.
    pub requests_per_minute: NonZeroU32,
    /// Retries after the first attempt for 429, 5xx and transport timeouts.
    pub max_retries: u32,
    /// First retry delay; doubled on each further retry.
    pub base_delay: Duration,
    /// Upper bound for any single retry delay.
    pub max_delay: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for YahooSettings {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            requests_per_minute: nonzero!(60u32),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Daily closes from the Yahoo Finance chart API.
pub struct YahooProvider {
    client: Client,
    limiter: DirectRateLimiter,
    settings: YahooSettings,
}

impl YahooProvider {
    /// Creates a provider with default settings.
    pub fn new() -> Result<Self, ProviderInitError> {
        Self::with_settings(YahooSettings::default())
    }

    pub fn with_settings(settings: YahooSettings) -> Result<Self, ProviderInitError> {
        Url::parse(&settings.base_url).map_err(|e| {
            ProviderInitError::InvalidSettings(format!("base_url '{}': {e}", settings.base_url))
        })?;

        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            limiter: RateLimiter::direct(Quota::per_minute(settings.requests_per_minute)),
            settings,
        })
    }

    fn chart_url(&self, symbol: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.settings.base_url)
            .map_err(|e| ProviderError::Internal(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Internal("base_url cannot take path segments".into()))?
            .push(symbol);
        Ok(url)
    }

    /// `base_delay * 2^attempt`, capped at `max_delay`.
    fn backoff(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.settings.base_delay.checked_mul(factor))
            .map_or(self.settings.max_delay, |delay| delay.min(self.settings.max_delay))
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl PriceSource for YahooProvider {
    async fn fetch_daily_closes(
        &self,
        params: &DailyClosesParams,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        validate_params(params)?;

        let url = self.chart_url(params.symbol.trim())?;
        let query = construct_params(params);
        let mut attempt = 0u32;

        loop {
            self.limiter.until_ready().await;
            debug!(symbol = %params.symbol, start = %params.start, end = %params.end, attempt, "requesting yahoo chart");

            let response = match self.client.get(url.clone()).query(&query).send().await {
                Ok(response) => response,
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt < self.settings.max_retries => {
                    warn!(error = %e, attempt, "yahoo request failed, retrying");
                    tokio::time::sleep(self.backoff(attempt)).await;
                    attempt += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();

            // Unknown symbols come back as 404 with a regular chart error body.
            if status.is_success() || status == StatusCode::NOT_FOUND {
                let chart = response.json::<ChartResponse>().await?;
                return chart.into_price_points(params);
            }

            if is_retryable(status) && attempt < self.settings.max_retries {
                warn!(%status, attempt, "yahoo throttled or unavailable, retrying");
                tokio::time::sleep(self.backoff(attempt)).await;
                attempt += 1;
                continue;
            }

            let error_msg = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return Err(ProviderError::Api(format!("HTTP {status}: {error_msg}")));
        }
    }
}
