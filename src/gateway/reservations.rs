use crate::error::{GatewayError, GatewayResult};
use crate::gateway::traits::ReservationGateway;
use crate::models::{format_api_date, parse_api_date, BookingRequest, BookingResult};
use crate::provider::types::{ReservationCreated, ReservationPayload, PRICE_STATUS_UNPAID};
use crate::provider::BookingProvider;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

pub const MISSING_FIELDS: &str = "Missing required fields";
pub const BOOKING_FAILED: &str = "Failed to create booking";

/// Reservation gateway backed by the booking provider
pub struct ReservationService {
    provider: Arc<dyn BookingProvider>,
    channel_id: u64,
}

impl ReservationService {
    pub fn new(provider: Arc<dyn BookingProvider>, channel_id: u64) -> Self {
        Self {
            provider,
            channel_id,
        }
    }

    /// Check mandatory fields and build the provider payload
    pub fn build_payload(&self, request: &BookingRequest) -> GatewayResult<ReservationPayload> {
        let missing = || GatewayError::Validation(MISSING_FIELDS.to_string());
        let required = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(missing)
        };

        let apartment_id = request
            .property_external_id
            .filter(|id| *id > 0)
            .ok_or_else(missing)?;
        let arrival = parse_api_date(&required(&request.arrival_date)?)?;
        let departure = parse_api_date(&required(&request.departure_date)?)?;
        if arrival >= departure {
            return Err(GatewayError::Validation(
                "Departure date must be after arrival date".to_string(),
            ));
        }

        Ok(ReservationPayload {
            arrival_date: format_api_date(arrival),
            departure_date: format_api_date(departure),
            apartment_id,
            first_name: required(&request.first_name)?,
            last_name: required(&request.last_name)?,
            email: required(&request.email)?,
            phone: request.phone.clone().unwrap_or_default(),
            adults: request.adults.filter(|n| *n > 0).unwrap_or(2),
            children: request.children.unwrap_or(0),
            notice: request.notice.clone().unwrap_or_default(),
            price: request.price,
            price_status: PRICE_STATUS_UNPAID,
            channel_id: self.channel_id,
        })
    }
}

#[async_trait]
impl ReservationGateway for ReservationService {
    async fn create_booking(&self, request: &BookingRequest) -> GatewayResult<BookingResult> {
        let payload = self.build_payload(request)?;

        match self.provider.create_reservation(&payload).await {
            Ok(ReservationCreated::Accepted { id }) => {
                info!(
                    "Reservation {} created for apartment {} ({} to {})",
                    id, payload.apartment_id, payload.arrival_date, payload.departure_date
                );
                Ok(BookingResult::confirmed(id))
            }
            Ok(ReservationCreated::Rejected {
                status,
                detail,
                payload: raw,
            }) => {
                warn!("{} rejected reservation with {}", self.provider.provider_name(), status);
                Ok(BookingResult::failed(
                    detail.unwrap_or_else(|| BOOKING_FAILED.to_string()),
                    Some(raw.to_string()),
                ))
            }
            Err(err @ GatewayError::Config(_)) => Err(err),
            Err(err) => {
                warn!("Reservation request failed: {}", err);
                Ok(BookingResult::failed(err.to_string(), None))
            }
        }
    }
}
