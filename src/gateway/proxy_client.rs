use crate::error::{GatewayError, GatewayResult};
use crate::gateway::reservations::BOOKING_FAILED;
use crate::gateway::traits::{AvailabilityGateway, ReservationGateway};
use crate::models::{format_api_date, AvailabilityResult, BookingRequest, BookingResult, StayRequest};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReservationReply {
    #[serde(default)]
    booking_id: Option<i64>,
}

/// Browser-side client of the same-origin proxy routes.
/// The provider credential never leaves the server.
pub struct ProxyClient {
    client: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AvailabilityGateway for ProxyClient {
    async fn check_availability(
        &self,
        property_id: u64,
        stay: &StayRequest,
    ) -> GatewayResult<AvailabilityResult> {
        let url = format!("{}/api/smoobu/rates", self.base_url);
        let query = [
            ("apartmentId", property_id.to_string()),
            ("startDate", format_api_date(stay.arrival_date)),
            ("endDate", format_api_date(stay.departure_date)),
        ];

        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Availability proxy returned {}: {}", status, body);
            return Err(GatewayError::Provider {
                status: status.as_u16(),
                message: body,
            });
        }

        let result: AvailabilityResult = response.json().await?;
        debug!("Proxy availability for {}: {:?}", property_id, result);
        Ok(result)
    }
}

#[async_trait]
impl ReservationGateway for ProxyClient {
    async fn create_booking(&self, request: &BookingRequest) -> GatewayResult<BookingResult> {
        let url = format!("{}/api/smoobu/reservations", self.base_url);

        let response = match self.client.post(&url).json(request).send().await {
            Ok(response) => response,
            Err(err) => {
                error!("Create booking failed: {}", err);
                return Ok(BookingResult::failed(err.to_string(), None));
            }
        };

        let status = response.status();
        let raw = response.text().await.unwrap_or_default();

        if !status.is_success() {
            error!("Booking proxy returned {}: {}", status, raw);
            let body: serde_json::Value =
                serde_json::from_str(&raw).unwrap_or_else(|_| serde_json::json!({}));
            let message = ["detail", "error"]
                .iter()
                .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
                .unwrap_or(BOOKING_FAILED);
            return Ok(BookingResult::failed(message, Some(raw)));
        }

        match serde_json::from_str::<ReservationReply>(&raw) {
            Ok(ReservationReply {
                booking_id: Some(id),
            }) => Ok(BookingResult::confirmed(id)),
            _ => Ok(BookingResult::failed(BOOKING_FAILED, Some(raw))),
        }
    }
}
