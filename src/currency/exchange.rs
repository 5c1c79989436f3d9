use crate::models::{format_api_date, ExchangeRateSnapshot};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Where live exchange rates come from
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Native-currency units per one display-currency unit
    async fn fetch(&self) -> Result<ExchangeRateSnapshot>;
}

#[derive(Debug, Deserialize)]
struct LatestRates {
    date: String,
    rates: HashMap<String, f64>,
}

/// frankfurter.app: free, no key required
pub struct FrankfurterSource {
    client: Client,
    base_url: String,
    from: String,
    to: String,
}

impl FrankfurterSource {
    /// `from` is the display currency, `to` the native one
    pub fn new(base_url: &str, from: &str, to: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

#[async_trait]
impl RateSource for FrankfurterSource {
    async fn fetch(&self) -> Result<ExchangeRateSnapshot> {
        let url = format!("{}/latest", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("from", self.from.as_str()), ("to", self.to.as_str())])
            .send()
            .await
            .context("Failed to reach exchange rate service")?;

        if !response.status().is_success() {
            anyhow::bail!("Exchange rate API error: {}", response.status());
        }

        let latest: LatestRates = response
            .json()
            .await
            .context("Failed to parse exchange rate response")?;

        let rate = latest
            .rates
            .get(&self.to)
            .copied()
            .with_context(|| format!("Exchange rate response has no {} rate", self.to))?;
        if !rate.is_finite() || rate <= 0.0 {
            anyhow::bail!("Exchange rate service returned unusable rate {}", rate);
        }

        Ok(ExchangeRateSnapshot {
            rate,
            date: latest.date,
            is_fallback: false,
        })
    }
}

/// Process-wide exchange rate with a time-based cache.
///
/// Failures never reach the caller: a fixed fallback rate is returned
/// instead and is not cached, so the next call tries the source again.
pub struct ExchangeRateService {
    source: Arc<dyn RateSource>,
    fallback_rate: f64,
    ttl: Duration,
    cached: RwLock<Option<(ExchangeRateSnapshot, Instant)>>,
}

impl ExchangeRateService {
    pub fn new(source: Arc<dyn RateSource>, fallback_rate: f64) -> Self {
        Self::with_ttl(source, fallback_rate, CACHE_TTL)
    }

    pub fn with_ttl(source: Arc<dyn RateSource>, fallback_rate: f64, ttl: Duration) -> Self {
        Self {
            source,
            fallback_rate,
            ttl,
            cached: RwLock::new(None),
        }
    }

    pub async fn get_exchange_rate(&self) -> ExchangeRateSnapshot {
        if let Some((snapshot, fetched_at)) = self.cached.read().await.as_ref() {
            if fetched_at.elapsed() < self.ttl {
                debug!("Using cached exchange rate from {}", snapshot.date);
                return snapshot.clone();
            }
        }

        // Concurrent refreshes may both hit the source; the last write wins.
        match self.source.fetch().await {
            Ok(snapshot) => {
                info!("Fetched exchange rate {} ({})", snapshot.rate, snapshot.date);
                *self.cached.write().await = Some((snapshot.clone(), Instant::now()));
                snapshot
            }
            Err(err) => {
                warn!("Failed to fetch exchange rate, using fallback: {:#}", err);
                self.fallback()
            }
        }
    }

    fn fallback(&self) -> ExchangeRateSnapshot {
        ExchangeRateSnapshot {
            rate: self.fallback_rate,
            date: format_api_date(Utc::now().date_naive()),
            is_fallback: true,
        }
    }
}
