//! In-memory doubles for the provider and gateway seams.

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{AvailabilityGateway, ReservationGateway};
use crate::models::{AvailabilityResult, BookingRequest, BookingResult, StayRequest};
use crate::provider::types::{RateCalendar, ReservationCreated, ReservationPayload};
use crate::provider::BookingProvider;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Provider answering from fixed calendars
pub struct StaticProvider {
    calendars: HashMap<u64, RateCalendar>,
    rate_failures: HashMap<u64, GatewayError>,
    reservation_answer: GatewayResult<ReservationCreated>,
    sent: Mutex<Vec<ReservationPayload>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self {
            calendars: HashMap::new(),
            rate_failures: HashMap::new(),
            reservation_answer: Err(GatewayError::Transport("no reservation answer".into())),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn with_calendar(mut self, property_id: u64, calendar: RateCalendar) -> Self {
        self.calendars.insert(property_id, calendar);
        self
    }

    pub fn failing(mut self, property_id: u64, err: GatewayError) -> Self {
        self.rate_failures.insert(property_id, err);
        self
    }

    pub fn accepting(mut self, id: i64) -> Self {
        self.reservation_answer = Ok(ReservationCreated::Accepted { id });
        self
    }

    pub fn rejecting(mut self, status: u16, payload: serde_json::Value) -> Self {
        let detail = payload
            .get("detail")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        self.reservation_answer = Ok(ReservationCreated::Rejected {
            status,
            detail,
            payload,
        });
        self
    }

    pub fn failing_reservations(mut self, err: GatewayError) -> Self {
        self.reservation_answer = Err(err);
        self
    }

    pub fn reservations(&self) -> Vec<ReservationPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookingProvider for StaticProvider {
    async fn fetch_rates(
        &self,
        property_id: u64,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> GatewayResult<Option<RateCalendar>> {
        if let Some(err) = self.rate_failures.get(&property_id) {
            return Err(err.clone());
        }
        Ok(self.calendars.get(&property_id).cloned())
    }

    async fn create_reservation(
        &self,
        payload: &ReservationPayload,
    ) -> GatewayResult<ReservationCreated> {
        self.sent.lock().unwrap().push(payload.clone());
        self.reservation_answer.clone()
    }

    fn provider_name(&self) -> &'static str {
        "Static"
    }
}

/// Scripted gateway: per-property answers with optional delays.
/// Answers can also be keyed by arrival date to tell searches apart.
#[derive(Default)]
pub struct ScriptedGateway {
    answers: HashMap<u64, GatewayResult<AvailabilityResult>>,
    by_arrival: HashMap<NaiveDate, (Duration, AvailabilityResult)>,
    delays: HashMap<u64, Duration>,
    booking: Option<(Duration, GatewayResult<BookingResult>)>,
    availability_calls: AtomicUsize,
    booking_calls: AtomicUsize,
    bookings: Mutex<Vec<BookingRequest>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, property_id: u64, answer: GatewayResult<AvailabilityResult>) -> Self {
        self.answers.insert(property_id, answer);
        self
    }

    pub fn delayed(mut self, property_id: u64, delay: Duration) -> Self {
        self.delays.insert(property_id, delay);
        self
    }

    pub fn answer_for_arrival(
        mut self,
        arrival: NaiveDate,
        delay: Duration,
        answer: AvailabilityResult,
    ) -> Self {
        self.by_arrival.insert(arrival, (delay, answer));
        self
    }

    pub fn booking(mut self, delay: Duration, answer: GatewayResult<BookingResult>) -> Self {
        self.booking = Some((delay, answer));
        self
    }

    pub fn availability_calls(&self) -> usize {
        self.availability_calls.load(Ordering::SeqCst)
    }

    pub fn booking_calls(&self) -> usize {
        self.booking_calls.load(Ordering::SeqCst)
    }

    pub fn bookings(&self) -> Vec<BookingRequest> {
        self.bookings.lock().unwrap().clone()
    }
}

#[async_trait]
impl AvailabilityGateway for ScriptedGateway {
    async fn check_availability(
        &self,
        property_id: u64,
        stay: &StayRequest,
    ) -> GatewayResult<AvailabilityResult> {
        self.availability_calls.fetch_add(1, Ordering::SeqCst);

        if let Some((delay, answer)) = self.by_arrival.get(&stay.arrival_date) {
            tokio::time::sleep(*delay).await;
            return Ok(answer.clone());
        }

        if let Some(delay) = self.delays.get(&property_id) {
            tokio::time::sleep(*delay).await;
        }
        self.answers
            .get(&property_id)
            .cloned()
            .unwrap_or_else(|| Ok(AvailabilityResult::unavailable(None)))
    }
}

#[async_trait]
impl ReservationGateway for ScriptedGateway {
    async fn create_booking(&self, request: &BookingRequest) -> GatewayResult<BookingResult> {
        self.booking_calls.fetch_add(1, Ordering::SeqCst);
        self.bookings.lock().unwrap().push(request.clone());

        match &self.booking {
            Some((delay, answer)) => {
                tokio::time::sleep(*delay).await;
                answer.clone()
            }
            None => Ok(BookingResult::failed("no booking answer", None)),
        }
    }
}
