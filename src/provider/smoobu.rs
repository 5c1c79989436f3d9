use crate::error::{GatewayError, GatewayResult};
use crate::models::format_api_date;
use crate::provider::traits::BookingProvider;
use crate::provider::types::{
    RateCalendar, RatesEnvelope, ReservationAccepted, ReservationCreated, ReservationPayload,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Smoobu property-management API client
pub struct SmoobuClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl SmoobuClient {
    /// Create a client for the given API base URL.
    /// A missing key is accepted here and reported on every call instead.
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("villa-direct/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> GatewayResult<RequestBuilder> {
        match &self.api_key {
            Some(key) => Ok(request.header("Api-Key", key)),
            None => Err(GatewayError::Config("SMOOBU_API_KEY is not set".to_string())),
        }
    }
}

#[async_trait]
impl BookingProvider for SmoobuClient {
    async fn fetch_rates(
        &self,
        property_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> GatewayResult<Option<RateCalendar>> {
        let url = format!("{}/rates", self.base_url);
        let query = [
            ("apartments[]", property_id.to_string()),
            ("start_date", format_api_date(start_date)),
            ("end_date", format_api_date(end_date)),
        ];

        debug!("Fetching rates for {} from {} to {}", property_id, start_date, end_date);

        let response = self
            .authorized(self.client.get(&url).query(&query))?
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Smoobu rates returned status {}: {}", status, body);
            return Err(GatewayError::Provider {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: RatesEnvelope = response.json().await?;
        envelope.into_calendar(property_id)
    }

    async fn create_reservation(
        &self,
        payload: &ReservationPayload,
    ) -> GatewayResult<ReservationCreated> {
        let url = format!("{}/reservations", self.base_url);

        let response = self
            .authorized(self.client.post(&url).json(payload))?
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let body: serde_json::Value =
                serde_json::from_str(&raw).unwrap_or_else(|_| serde_json::json!({}));
            error!("Smoobu reservation rejected with {}: {}", status, raw);

            let detail = ["detail", "error", "title"]
                .iter()
                .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
                .map(str::to_string);

            return Ok(ReservationCreated::Rejected {
                status: status.as_u16(),
                detail,
                payload: body,
            });
        }

        let accepted: ReservationAccepted = response.json().await?;
        Ok(ReservationCreated::Accepted { id: accepted.id })
    }

    fn provider_name(&self) -> &'static str {
        "Smoobu"
    }
}
