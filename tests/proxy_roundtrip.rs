//! Booking workflow running against the proxy over real HTTP

mod common;

use common::*;
use std::sync::Arc;
use std::time::Duration;
use villa_direct::gateway::{AvailabilityGateway, ProxyClient, ReservationGateway};
use villa_direct::models::{
    parse_api_date, BookingRequest, GuestDetails, PropertyRegistry, StayRequest,
};
use villa_direct::provider::types::ReservationCreated;
use villa_direct::server::create_router;
use villa_direct::{AvailabilityAggregator, BookingState, BookingStep, BookingWorkflow, GatewayError};

async fn proxy(provider: FakeProvider) -> (ProxyClient, Arc<FakeProvider>) {
    let provider = Arc::new(provider);
    let addr = spawn(create_router(app_state(provider.clone(), Some(16_000.0)))).await;
    let client = ProxyClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    (client, provider)
}

fn workflow(client: ProxyClient, slug: &str) -> BookingWorkflow {
    let client = Arc::new(client);
    let aggregator = Arc::new(AvailabilityAggregator::new(
        client.clone(),
        Arc::new(PropertyRegistry::default_fleet()),
        Duration::from_secs(5),
    ));
    BookingWorkflow::new(slug, aggregator, client)
}

fn summer_nights() -> FakeProvider {
    let nights = [
        ("2025-08-10", 1_500_000.0, 1, 1),
        ("2025-08-11", 1_600_000.0, 1, 1),
    ];
    FakeProvider::new()
        .with_calendar(WEST, calendar(&nights))
        .with_calendar(EAST, calendar(&nights))
        .with_calendar(
            BIG,
            calendar(&[
                ("2025-08-10", 2_500_000.0, 0, 1),
                ("2025-08-11", 2_500_000.0, 1, 1),
            ]),
        )
}

fn guest() -> GuestDetails {
    GuestDetails {
        first_name: "Ana".into(),
        last_name: "Doe".into(),
        email: "ana@example.com".into(),
        phone: Some("+62 812 0000".into()),
        special_requests: None,
    }
}

#[tokio::test]
async fn books_a_villa_end_to_end() {
    let (client, provider) = proxy(summer_nights()).await;
    let wf = workflow(client, "2-bedroom-villa-west");

    wf.submit_dates(
        Some(parse_api_date("2025-08-10").unwrap()),
        Some(parse_api_date("2025-08-12").unwrap()),
        2,
        1,
    )
    .await;
    assert_eq!(wf.step(), BookingStep::Available);
    assert_eq!(wf.nights(), Some(2));

    let state = wf.state();
    let outcome = state.outcome().unwrap();
    assert_eq!(outcome.availability.price, Some(3_100_000));
    let siblings: Vec<_> = outcome
        .other_villas
        .iter()
        .map(|v| (v.villa.external_id, v.availability.available))
        .collect();
    assert_eq!(siblings, vec![(EAST, true), (BIG, false)]);

    wf.proceed();
    wf.submit_guest_details(guest()).await;

    match wf.state() {
        BookingState::Confirmed { booking, .. } => assert_eq!(booking.booking_id, Some(555)),
        other => panic!("expected confirmed, got {:?}", other),
    }

    let sent = provider.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].apartment_id, WEST);
    assert_eq!(sent[0].children, 1);
    assert_eq!(sent[0].phone, "+62 812 0000");
    assert_eq!(sent[0].price, Some(3_100_000));
    assert_eq!(sent[0].channel_id, 1544457);
}

#[tokio::test]
async fn proxy_client_surfaces_rejections() {
    let provider = FakeProvider::new().reservation(Ok(ReservationCreated::Rejected {
        status: 422,
        detail: Some("Dates overlap an existing booking".into()),
        payload: serde_json::json!({"detail": "Dates overlap an existing booking"}),
    }));
    let (client, _) = proxy(provider).await;

    let stay = StayRequest::new(
        parse_api_date("2025-08-10").unwrap(),
        parse_api_date("2025-08-12").unwrap(),
        2,
        0,
    )
    .unwrap();
    let request = BookingRequest::for_stay(WEST, &stay, &guest(), None);

    let result = client.create_booking(&request).await.unwrap();
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Dates overlap an existing booking"));
    assert!(result.details.is_some());
}

#[tokio::test]
async fn proxy_client_reports_failed_rates_as_errors() {
    let provider = FakeProvider::new().failing(WEST, GatewayError::Transport("reset".into()));
    let (client, _) = proxy(provider).await;

    let stay = StayRequest::new(
        parse_api_date("2025-08-10").unwrap(),
        parse_api_date("2025-08-12").unwrap(),
        2,
        0,
    )
    .unwrap();
    let err = client.check_availability(WEST, &stay).await.unwrap_err();
    assert!(matches!(err, GatewayError::Provider { status: 500, .. }));
}

#[tokio::test]
async fn unreachable_proxy_degrades_siblings_and_errors_primary() {
    // Nothing listens on port 9 locally
    let client = ProxyClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let wf = workflow(client, "3-bedroom-villa");

    wf.submit_dates(
        Some(parse_api_date("2025-08-10").unwrap()),
        Some(parse_api_date("2025-08-12").unwrap()),
        2,
        0,
    )
    .await;

    match wf.state() {
        BookingState::Error { other_villas, .. } => {
            assert_eq!(other_villas.len(), 2);
            assert!(other_villas.iter().all(|v| !v.availability.available));
            assert!(other_villas.iter().all(|v| v.availability.error_message.is_some()));
        }
        other => panic!("expected error, got {:?}", other),
    }
}
