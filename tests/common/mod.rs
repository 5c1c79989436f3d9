#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use villa_direct::currency::{ExchangeRateService, RateSource};
use villa_direct::gateway::{RateGateway, ReservationService};
use villa_direct::models::{parse_api_date, ExchangeRateSnapshot, PropertyRegistry};
use villa_direct::provider::types::{NightRate, RateCalendar, ReservationCreated, ReservationPayload};
use villa_direct::provider::BookingProvider;
use villa_direct::server::AppState;
use villa_direct::{AvailabilityAggregator, GatewayError, GatewayResult};

pub const WEST: u64 = 2900836;
pub const EAST: u64 = 2900841;
pub const BIG: u64 = 2900846;

pub fn calendar(nights: &[(&str, f64, u8, u32)]) -> RateCalendar {
    let mut calendar = RateCalendar::default();
    for (date, price, available, min_stay) in nights {
        calendar.insert(
            parse_api_date(date).unwrap(),
            NightRate {
                price: Some(*price),
                available: *available,
                min_length_of_stay: Some(*min_stay),
            },
        );
    }
    calendar
}

/// Provider double answering from fixed calendars
pub struct FakeProvider {
    pub calendars: HashMap<u64, RateCalendar>,
    pub failures: HashMap<u64, GatewayError>,
    pub reservation: GatewayResult<ReservationCreated>,
    pub sent: Mutex<Vec<ReservationPayload>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            calendars: HashMap::new(),
            failures: HashMap::new(),
            reservation: Ok(ReservationCreated::Accepted { id: 555 }),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn with_calendar(mut self, id: u64, calendar: RateCalendar) -> Self {
        self.calendars.insert(id, calendar);
        self
    }

    pub fn failing(mut self, id: u64, err: GatewayError) -> Self {
        self.failures.insert(id, err);
        self
    }

    pub fn reservation(mut self, answer: GatewayResult<ReservationCreated>) -> Self {
        self.reservation = answer;
        self
    }
}

#[async_trait]
impl BookingProvider for FakeProvider {
    async fn fetch_rates(
        &self,
        property_id: u64,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> GatewayResult<Option<RateCalendar>> {
        if let Some(err) = self.failures.get(&property_id) {
            return Err(err.clone());
        }
        Ok(self.calendars.get(&property_id).cloned())
    }

    async fn create_reservation(
        &self,
        payload: &ReservationPayload,
    ) -> GatewayResult<ReservationCreated> {
        self.sent.lock().unwrap().push(payload.clone());
        self.reservation.clone()
    }

    fn provider_name(&self) -> &'static str {
        "Fake"
    }
}

pub struct FixedRate(pub Option<f64>);

#[async_trait]
impl RateSource for FixedRate {
    async fn fetch(&self) -> anyhow::Result<ExchangeRateSnapshot> {
        match self.0 {
            Some(rate) => Ok(ExchangeRateSnapshot {
                rate,
                date: "2025-08-01".to_string(),
                is_fallback: false,
            }),
            None => anyhow::bail!("rate service unreachable"),
        }
    }
}

pub fn app_state(provider: Arc<FakeProvider>, rate: Option<f64>) -> Arc<AppState> {
    let rates = Arc::new(RateGateway::new(provider.clone(), "IDR"));
    let aggregator = Arc::new(AvailabilityAggregator::new(
        rates,
        Arc::new(PropertyRegistry::default_fleet()),
        Duration::from_secs(5),
    ));

    Arc::new(AppState {
        aggregator,
        reservations: Arc::new(ReservationService::new(provider, 1544457)),
        exchange: Arc::new(ExchangeRateService::new(Arc::new(FixedRate(rate)), 16_000.0)),
        native_currency: "IDR".to_string(),
        display_currency: "USD".to_string(),
    })
}

/// Serve a router on an ephemeral local port
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
