use crate::error::GatewayResult;
use crate::gateway::traits::AvailabilityGateway;
use crate::models::{AvailabilityResult, StayRequest};
use crate::provider::types::RateCalendar;
use crate::provider::BookingProvider;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub const PROPERTY_NOT_FOUND: &str = "Villa not found in booking system";

/// Turn a night-level rate map into one availability decision.
///
/// Every night in `[arrival, departure)` must be present and available.
/// The strictest per-night minimum stay applies to the whole range.
pub fn evaluate_rates(
    calendar: Option<&RateCalendar>,
    stay: &StayRequest,
    currency: &str,
) -> AvailabilityResult {
    let Some(calendar) = calendar else {
        return AvailabilityResult::unavailable(Some(PROPERTY_NOT_FOUND.to_string()));
    };

    let mut total_price = 0.0;
    let mut minimum_stay = 1;

    for date in stay.night_dates() {
        match calendar.night(date) {
            Some(night) if night.is_available() => {
                total_price += night.price.unwrap_or(0.0);
                minimum_stay = minimum_stay.max(night.min_length_of_stay.unwrap_or(1));
            }
            _ => {
                debug!("Night {} is not available", date);
                return AvailabilityResult {
                    currency: Some(currency.to_string()),
                    minimum_stay,
                    ..AvailabilityResult::unavailable(None)
                };
            }
        }
    }

    if stay.nights() < i64::from(minimum_stay) {
        return AvailabilityResult {
            currency: Some(currency.to_string()),
            minimum_stay,
            ..AvailabilityResult::unavailable(Some(format!(
                "Minimum stay is {} nights",
                minimum_stay
            )))
        };
    }

    AvailabilityResult::available(total_price.round() as i64, currency, minimum_stay)
}

/// Rate/availability gateway backed by the booking provider
pub struct RateGateway {
    provider: Arc<dyn BookingProvider>,
    currency: String,
}

impl RateGateway {
    pub fn new(provider: Arc<dyn BookingProvider>, currency: impl Into<String>) -> Self {
        Self {
            provider,
            currency: currency.into(),
        }
    }
}

#[async_trait]
impl AvailabilityGateway for RateGateway {
    async fn check_availability(
        &self,
        property_id: u64,
        stay: &StayRequest,
    ) -> GatewayResult<AvailabilityResult> {
        let calendar = self
            .provider
            .fetch_rates(property_id, stay.arrival_date, stay.departure_date)
            .await?;

        let result = evaluate_rates(calendar.as_ref(), stay, &self.currency);
        debug!(
            "{} rates for {}: available={} price={:?}",
            self.provider.provider_name(),
            property_id,
            result.available,
            result.price
        );
        Ok(result)
    }
}
