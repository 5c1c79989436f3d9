use crate::error::GatewayResult;
use crate::provider::types::{RateCalendar, ReservationCreated, ReservationPayload};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Common trait for remote property-management systems.
/// The gateways only talk to the provider through this seam.
#[async_trait]
pub trait BookingProvider: Send + Sync {
    /// Fetch the night-level rate map for one property.
    /// `Ok(None)` means the provider has no data for the property at all.
    async fn fetch_rates(
        &self,
        property_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> GatewayResult<Option<RateCalendar>>;

    /// Create a reservation.
    /// Rejections come back as `ReservationCreated::Rejected`, not as errors.
    async fn create_reservation(
        &self,
        payload: &ReservationPayload,
    ) -> GatewayResult<ReservationCreated>;

    /// Get the name of the provider
    fn provider_name(&self) -> &'static str;
}
