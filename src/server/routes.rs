use crate::aggregator::CatalogBuckets;
use crate::currency::{price_display, PriceDisplay};
use crate::error::GatewayError;
use crate::models::{
    parse_api_date, BookingRequest, ExchangeRateSnapshot, StayRequest, VillaAvailability,
};
use crate::server::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message.into() })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatesQuery {
    apartment_id: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    adults: Option<u32>,
    children: Option<u32>,
}

/// GET /api/smoobu/rates
pub async fn rates(State(state): State<Arc<AppState>>, Query(query): Query<RatesQuery>) -> Response {
    let (Some(apartment_id), Some(start_date), Some(end_date)) =
        (query.apartment_id, query.start_date, query.end_date)
    else {
        return bad_request("Missing required parameters: apartmentId, startDate, endDate");
    };

    let Ok(apartment_id) = apartment_id.trim().parse::<u64>() else {
        return bad_request("apartmentId must be a positive integer");
    };
    if apartment_id == 0 {
        return bad_request("apartmentId must be a positive integer");
    }

    let stay = match parse_api_date(&start_date).and_then(|start| {
        let end = parse_api_date(&end_date)?;
        StayRequest::new(start, end, query.adults.unwrap_or(2), query.children.unwrap_or(0))
    }) {
        Ok(stay) => stay,
        Err(err) => return err.into_response(),
    };

    match state.aggregator.check_property(apartment_id, &stay).await {
        Ok(result) => Json(result).into_response(),
        Err(err @ (GatewayError::Transport(_) | GatewayError::Malformed(_))) => {
            error!("Rates lookup for {} failed: {}", apartment_id, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch rates" })),
            )
                .into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// POST /api/smoobu/reservations
pub async fn reservations(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BookingRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            error!("Unreadable reservation body: {}", rejection);
            return bad_request("Invalid request body");
        }
    };

    match state.reservations.create_booking(&request).await {
        Ok(result) if result.success => {
            info!("Reservation {:?} created", result.booking_id);
            Json(result).into_response()
        }
        Ok(result) => (StatusCode::BAD_GATEWAY, Json(result)).into_response(),
        Err(err) => err.into_response(),
    }
}

/// GET /api/exchange-rate
pub async fn exchange_rate(State(state): State<Arc<AppState>>) -> Json<ExchangeRateSnapshot> {
    Json(state.exchange.get_exchange_rate().await)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    arrival_date: Option<String>,
    departure_date: Option<String>,
    adults: Option<u32>,
    children: Option<u32>,
}

/// An available villa with its price in both currencies
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VillaQuote {
    #[serde(flatten)]
    pub villa: VillaAvailability,
    pub price_display: Option<PriceDisplay>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSearch {
    pub nights: i64,
    pub exchange_rate: ExchangeRateSnapshot,
    pub available: Vec<VillaQuote>,
    pub unavailable: Vec<VillaAvailability>,
}

/// GET /api/availability: every villa for one date range
pub async fn search_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let (Some(arrival), Some(departure)) = (query.arrival_date, query.departure_date) else {
        return bad_request("Missing required parameters: arrivalDate, departureDate");
    };

    let stay = match parse_api_date(&arrival).and_then(|arrival| {
        let departure = parse_api_date(&departure)?;
        StayRequest::new(arrival, departure, query.adults.unwrap_or(2), query.children.unwrap_or(0))
    }) {
        Ok(stay) => stay,
        Err(err) => return err.into_response(),
    };

    let (results, exchange_rate) = tokio::join!(
        state.aggregator.check_all(&stay),
        state.exchange.get_exchange_rate()
    );
    let results = match results {
        Ok(results) => results,
        Err(err) => return err.into_response(),
    };
    let buckets = CatalogBuckets::from_results(results);

    let available = buckets
        .available
        .into_iter()
        .map(|villa| {
            let display = villa.availability.price.map(|price| {
                price_display(
                    price,
                    exchange_rate.rate,
                    &state.native_currency,
                    &state.display_currency,
                )
            });
            VillaQuote {
                villa,
                price_display: display,
            }
        })
        .collect();

    Json(CatalogSearch {
        nights: stay.nights(),
        exchange_rate,
        available,
        unavailable: buckets.unavailable,
    })
    .into_response()
}
