use crate::error::GatewayResult;
use crate::models::{AvailabilityResult, BookingRequest, BookingResult, StayRequest};
use async_trait::async_trait;

/// Single-property availability lookup
#[async_trait]
pub trait AvailabilityGateway: Send + Sync {
    /// An `Err` is a transport, configuration or provider failure.
    /// A normal "not bookable" answer is `Ok` with `available: false`.
    async fn check_availability(
        &self,
        property_id: u64,
        stay: &StayRequest,
    ) -> GatewayResult<AvailabilityResult>;
}

/// Reservation submission
#[async_trait]
pub trait ReservationGateway: Send + Sync {
    /// Remote rejections and network failures come back as `success: false`.
    /// `Err` is reserved for requests that were never sent upstream
    /// (missing fields, missing credentials).
    ///
    /// Never retried: the provider takes no idempotency key.
    async fn create_booking(&self, request: &BookingRequest) -> GatewayResult<BookingResult>;
}
