use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SMOOBU_API_URL: &str = "https://login.smoobu.com/api";
pub const DEFAULT_CHANNEL_ID: u64 = 1544457;
pub const DEFAULT_EXCHANGE_RATE_URL: &str = "https://api.frankfurter.app";
pub const DEFAULT_FALLBACK_RATE: f64 = 16000.0;
pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 20;

/// Runtime settings, read from the environment at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Provider credential. Without it every gateway route answers 500.
    pub smoobu_api_key: Option<String>,
    pub smoobu_api_url: String,
    /// Sales channel that marks a reservation as a direct booking
    pub channel_id: u64,
    pub native_currency: String,
    pub display_currency: String,
    pub exchange_rate_url: String,
    pub fallback_exchange_rate: f64,
    pub gateway_timeout: Duration,
    pub bind_addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            smoobu_api_key: None,
            smoobu_api_url: DEFAULT_SMOOBU_API_URL.to_string(),
            channel_id: DEFAULT_CHANNEL_ID,
            native_currency: "IDR".to_string(),
            display_currency: "USD".to_string(),
            exchange_rate_url: DEFAULT_EXCHANGE_RATE_URL.to_string(),
            fallback_exchange_rate: DEFAULT_FALLBACK_RATE,
            gateway_timeout: Duration::from_secs(DEFAULT_GATEWAY_TIMEOUT_SECS),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let timeout_secs = parse_or(&get, "GATEWAY_TIMEOUT_SECS", DEFAULT_GATEWAY_TIMEOUT_SECS)?;
        let fallback_exchange_rate = parse_or(&get, "FALLBACK_EXCHANGE_RATE", defaults.fallback_exchange_rate)?;
        if fallback_exchange_rate <= 0.0 {
            anyhow::bail!("FALLBACK_EXCHANGE_RATE must be positive");
        }

        Ok(Self {
            smoobu_api_key: get("SMOOBU_API_KEY"),
            smoobu_api_url: get("SMOOBU_API_URL").unwrap_or(defaults.smoobu_api_url),
            channel_id: parse_or(&get, "SMOOBU_CHANNEL_ID", defaults.channel_id)?,
            native_currency: get("NATIVE_CURRENCY").unwrap_or(defaults.native_currency),
            display_currency: get("DISPLAY_CURRENCY").unwrap_or(defaults.display_currency),
            exchange_rate_url: get("EXCHANGE_RATE_URL").unwrap_or(defaults.exchange_rate_url),
            fallback_exchange_rate,
            gateway_timeout: Duration::from_secs(timeout_secs),
            bind_addr: parse_or(&get, "BIND_ADDR", defaults.bind_addr)?,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
        None => Ok(default),
    }
}
