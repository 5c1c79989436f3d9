use crate::aggregator::AvailabilityAggregator;
use crate::error::GatewayError;
use crate::gateway::reservations::BOOKING_FAILED;
use crate::gateway::{ReservationGateway, PROPERTY_NOT_FOUND};
use crate::models::{
    AvailabilityResult, BookingRequest, BookingResult, GuestDetails, StayRequest, VillaAvailability,
};
use crate::validation::validate_guest_details;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

pub const CHECK_FAILED: &str = "Failed to check availability, please try again";
pub const BOOKING_RETRY: &str = "Failed to create booking, please try again";
pub const DATES_UNAVAILABLE: &str = "Selected dates are not available";

/// Step tag exposed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStep {
    SelectDates,
    Checking,
    Available,
    Unavailable,
    GuestDetails,
    Booking,
    Confirmed,
    Error,
}

/// What one availability check found: the current villa plus the others
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    pub property_id: u64,
    pub stay: StayRequest,
    pub availability: AvailabilityResult,
    pub other_villas: Vec<VillaAvailability>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingState {
    SelectDates,
    Checking { stay: StayRequest },
    Available { outcome: CheckOutcome },
    Unavailable { outcome: CheckOutcome, reason: String },
    GuestDetails { outcome: CheckOutcome, guest_errors: Vec<String> },
    Booking { outcome: CheckOutcome },
    Confirmed { outcome: CheckOutcome, booking: BookingResult },
    Error {
        message: String,
        other_villas: Vec<VillaAvailability>,
        booking: Option<BookingResult>,
    },
}

impl BookingState {
    pub fn step(&self) -> BookingStep {
        match self {
            BookingState::SelectDates => BookingStep::SelectDates,
            BookingState::Checking { .. } => BookingStep::Checking,
            BookingState::Available { .. } => BookingStep::Available,
            BookingState::Unavailable { .. } => BookingStep::Unavailable,
            BookingState::GuestDetails { .. } => BookingStep::GuestDetails,
            BookingState::Booking { .. } => BookingStep::Booking,
            BookingState::Confirmed { .. } => BookingStep::Confirmed,
            BookingState::Error { .. } => BookingStep::Error,
        }
    }

    pub fn outcome(&self) -> Option<&CheckOutcome> {
        match self {
            BookingState::Available { outcome }
            | BookingState::Unavailable { outcome, .. }
            | BookingState::GuestDetails { outcome, .. }
            | BookingState::Booking { outcome }
            | BookingState::Confirmed { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    pub fn guest_errors(&self) -> &[String] {
        match self {
            BookingState::GuestDetails { guest_errors, .. } => guest_errors,
            _ => &[],
        }
    }

    fn stay(&self) -> Option<StayRequest> {
        match self {
            BookingState::Checking { stay } => Some(*stay),
            other => other.outcome().map(|o| o.stay),
        }
    }
}

/// Result of driving the workflow one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// The guard rejected the event; state is unchanged
    Ignored,
    /// The I/O finished after a reset or newer request and was dropped
    Stale,
}

struct Inner {
    state: BookingState,
    generation: u64,
}

/// Booking flow for one villa page.
///
/// State sits behind a mutex that is never held across an await. Each
/// async step bumps the generation before its I/O and only applies its
/// result if the generation is unchanged afterwards.
pub struct BookingWorkflow {
    slug: String,
    aggregator: Arc<AvailabilityAggregator>,
    reservations: Arc<dyn ReservationGateway>,
    inner: Mutex<Inner>,
}

impl BookingWorkflow {
    pub fn new(
        slug: impl Into<String>,
        aggregator: Arc<AvailabilityAggregator>,
        reservations: Arc<dyn ReservationGateway>,
    ) -> Self {
        Self {
            slug: slug.into(),
            aggregator,
            reservations,
            inner: Mutex::new(Inner {
                state: BookingState::SelectDates,
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> BookingState {
        self.lock().state.clone()
    }

    pub fn step(&self) -> BookingStep {
        self.lock().state.step()
    }

    /// Nights of the stay being checked or booked, if dates are chosen
    pub fn nights(&self) -> Option<i64> {
        self.lock().state.stay().map(|stay| stay.nights())
    }

    pub fn property_id(&self) -> Option<u64> {
        self.aggregator.registry().external_id_for(&self.slug)
    }

    /// Check the chosen dates for this villa and every other villa at once.
    pub async fn submit_dates(
        &self,
        arrival: Option<NaiveDate>,
        departure: Option<NaiveDate>,
        adults: u32,
        children: u32,
    ) -> Transition {
        let (Some(arrival), Some(departure)) = (arrival, departure) else {
            return Transition::Ignored;
        };
        let Ok(stay) = StayRequest::new(arrival, departure, adults, children) else {
            return Transition::Ignored;
        };

        let (generation, property_id) = {
            let mut inner = self.lock();
            match inner.state.step() {
                BookingStep::SelectDates
                | BookingStep::Available
                | BookingStep::Unavailable
                | BookingStep::GuestDetails => {}
                _ => return Transition::Ignored,
            }

            inner.generation += 1;
            let Some(property_id) = self.property_id() else {
                warn!("No booking system id for villa '{}'", self.slug);
                inner.state = BookingState::Error {
                    message: PROPERTY_NOT_FOUND.to_string(),
                    other_villas: Vec::new(),
                    booking: None,
                };
                return Transition::Applied;
            };

            inner.state = BookingState::Checking { stay };
            (inner.generation, property_id)
        };

        debug!("Check #{} for {}: {} to {}", generation, self.slug, arrival, departure);
        let (primary, other_villas) = self
            .aggregator
            .check_with_siblings(property_id, &self.slug, &stay)
            .await;

        let mut inner = self.lock();
        if inner.generation != generation {
            debug!("Dropping stale availability check #{}", generation);
            return Transition::Stale;
        }

        inner.state = match primary {
            Ok(availability) => {
                let available = availability.available;
                let reason = availability
                    .error_message
                    .clone()
                    .unwrap_or_else(|| DATES_UNAVAILABLE.to_string());
                let outcome = CheckOutcome {
                    property_id,
                    stay,
                    availability,
                    other_villas,
                };
                if available {
                    BookingState::Available { outcome }
                } else {
                    BookingState::Unavailable { outcome, reason }
                }
            }
            Err(err) => {
                warn!("Availability check for {} failed: {}", self.slug, err);
                BookingState::Error {
                    message: visitor_message(&err, CHECK_FAILED),
                    other_villas,
                    booking: None,
                }
            }
        };
        Transition::Applied
    }

    /// Move from the availability result to the guest form
    pub fn proceed(&self) -> Transition {
        let mut inner = self.lock();
        let state = std::mem::replace(&mut inner.state, BookingState::SelectDates);
        match state {
            BookingState::Available { outcome } => {
                inner.state = BookingState::GuestDetails {
                    outcome,
                    guest_errors: Vec::new(),
                };
                Transition::Applied
            }
            other => {
                inner.state = other;
                Transition::Ignored
            }
        }
    }

    /// Validate the guest form and, if it passes, create the reservation.
    ///
    /// Submissions while a reservation is in flight are ignored, so a double
    /// click cannot create two bookings.
    pub async fn submit_guest_details(&self, guest: GuestDetails) -> Transition {
        let (generation, request) = {
            let mut inner = self.lock();
            let outcome = match &inner.state {
                BookingState::Available { outcome } | BookingState::GuestDetails { outcome, .. } => {
                    outcome.clone()
                }
                _ => return Transition::Ignored,
            };

            let guest_errors = validate_guest_details(&guest);
            if !guest_errors.is_empty() {
                inner.state = BookingState::GuestDetails {
                    outcome,
                    guest_errors,
                };
                return Transition::Applied;
            }

            inner.generation += 1;
            let request = BookingRequest::for_stay(
                outcome.property_id,
                &outcome.stay,
                &guest,
                outcome.availability.price,
            );
            inner.state = BookingState::Booking { outcome };
            (inner.generation, request)
        };

        let timeout = self.aggregator.timeout();
        let result = match tokio::time::timeout(timeout, self.reservations.create_booking(&request)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(timeout)),
        };

        let mut inner = self.lock();
        if inner.generation != generation {
            warn!("Reservation answer arrived after reset and was dropped: {:?}", result);
            return Transition::Stale;
        }

        let outcome = match std::mem::replace(&mut inner.state, BookingState::SelectDates) {
            BookingState::Booking { outcome } => outcome,
            other => {
                inner.state = other;
                return Transition::Stale;
            }
        };

        inner.state = match result {
            Ok(booking) if booking.success => {
                info!("Booking confirmed for {}: {:?}", self.slug, booking.booking_id);
                BookingState::Confirmed { outcome, booking }
            }
            Ok(booking) => BookingState::Error {
                message: booking
                    .error
                    .clone()
                    .unwrap_or_else(|| BOOKING_FAILED.to_string()),
                other_villas: outcome.other_villas,
                booking: Some(booking),
            },
            Err(err) => {
                warn!("Reservation for {} failed: {}", self.slug, err);
                BookingState::Error {
                    message: visitor_message(&err, BOOKING_RETRY),
                    other_villas: outcome.other_villas,
                    booking: None,
                }
            }
        };
        Transition::Applied
    }

    /// Back to date selection from any state; in-flight results are dropped
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = BookingState::SelectDates;
    }
}

/// Text for the error screen. Timeouts and setup problems have their own
/// wording; anything else gets `fallback` and the detail stays in the log.
fn visitor_message(err: &GatewayError, fallback: &str) -> String {
    match err {
        GatewayError::Timeout(_) | GatewayError::Config(_) => err.public_message(),
        _ => fallback.to_string(),
    }
}
