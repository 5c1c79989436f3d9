pub mod routes;

use crate::aggregator::AvailabilityAggregator;
use crate::config::Config;
use crate::currency::{ExchangeRateService, FrankfurterSource};
use crate::gateway::{RateGateway, ReservationGateway, ReservationService};
use crate::models::PropertyRegistry;
use crate::provider::SmoobuClient;
use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Everything the proxy routes share
pub struct AppState {
    pub aggregator: Arc<AvailabilityAggregator>,
    pub reservations: Arc<dyn ReservationGateway>,
    pub exchange: Arc<ExchangeRateService>,
    pub native_currency: String,
    pub display_currency: String,
}

impl AppState {
    /// Wire the live Smoobu and frankfurter clients from configuration
    pub fn from_config(config: &Config, registry: PropertyRegistry) -> Result<Self> {
        let provider = Arc::new(SmoobuClient::new(
            &config.smoobu_api_url,
            config.smoobu_api_key.clone(),
            config.gateway_timeout,
        )?);

        let rates = Arc::new(RateGateway::new(provider.clone(), config.native_currency.clone()));
        let aggregator = Arc::new(AvailabilityAggregator::new(
            rates,
            Arc::new(registry),
            config.gateway_timeout,
        ));
        let reservations = Arc::new(ReservationService::new(provider, config.channel_id));

        let source = Arc::new(FrankfurterSource::new(
            &config.exchange_rate_url,
            &config.display_currency,
            &config.native_currency,
            config.gateway_timeout,
        )?);
        let exchange = Arc::new(ExchangeRateService::new(source, config.fallback_exchange_rate));

        Ok(Self {
            aggregator,
            reservations,
            exchange,
            native_currency: config.native_currency.clone(),
            display_currency: config.display_currency.clone(),
        })
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/smoobu/rates", get(routes::rates))
        .route("/api/smoobu/reservations", post(routes::reservations))
        .route("/api/exchange-rate", get(routes::exchange_rate))
        .route("/api/availability", get(routes::search_availability))
        .with_state(state)
}
