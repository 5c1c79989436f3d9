pub mod registry;

use crate::error::{GatewayError, GatewayResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use registry::{PropertyRegistry, RegistryError};

/// A bookable villa as known to both the website and the booking provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInfo {
    pub slug: String,
    /// Provider-side apartment id, the join key for availability
    pub external_id: u64,
    pub display_name: String,
    pub short_name: String,
    pub bedroom_count: u8,
    pub max_guests: u8,
    pub short_description: String,
}

/// Dates and party size for one availability check
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StayRequest {
    pub arrival_date: NaiveDate,
    pub departure_date: NaiveDate,
    pub adults: u32,
    pub children: u32,
}

impl StayRequest {
    pub fn new(
        arrival_date: NaiveDate,
        departure_date: NaiveDate,
        adults: u32,
        children: u32,
    ) -> GatewayResult<Self> {
        if arrival_date >= departure_date {
            return Err(GatewayError::Validation(
                "Departure date must be after arrival date".to_string(),
            ));
        }
        if adults < 1 {
            return Err(GatewayError::Validation(
                "At least one adult is required".to_string(),
            ));
        }

        Ok(Self {
            arrival_date,
            departure_date,
            adults,
            children,
        })
    }

    /// Whole nights between arrival and departure, at least 1 for a valid request
    pub fn nights(&self) -> i64 {
        (self.departure_date - self.arrival_date).num_days()
    }

    /// Every night of the stay, departure day excluded
    pub fn night_dates(&self) -> impl Iterator<Item = NaiveDate> {
        let departure = self.departure_date;
        self.arrival_date
            .iter_days()
            .take_while(move |day| *day < departure)
    }
}

/// Parse a `YYYY-MM-DD` calendar date as used on every wire surface
pub fn parse_api_date(value: &str) -> GatewayResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| GatewayError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", value)))
}

pub fn format_api_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Outcome of a rate query for a single property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResult {
    pub available: bool,
    /// Total stay cost in the provider currency, only set when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default = "default_minimum_stay")]
    pub minimum_stay: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

fn default_minimum_stay() -> u32 {
    1
}

impl AvailabilityResult {
    pub fn available(price: i64, currency: impl Into<String>, minimum_stay: u32) -> Self {
        Self {
            available: true,
            price: Some(price),
            currency: Some(currency.into()),
            minimum_stay,
            error_message: None,
        }
    }

    pub fn unavailable(message: Option<String>) -> Self {
        Self {
            available: false,
            price: None,
            currency: None,
            minimum_stay: 1,
            error_message: message,
        }
    }
}

/// Availability joined with the villa it belongs to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VillaAvailability {
    #[serde(flatten)]
    pub availability: AvailabilityResult,
    pub villa: PropertyInfo,
}

/// Contact details entered on the guest form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GuestDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

/// Reservation request accepted by the reservations proxy route.
///
/// Every field is optional on the wire so that missing fields can be
/// answered with a 400 instead of a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[serde(default, alias = "apartmentId")]
    pub property_external_id: Option<u64>,
    #[serde(default)]
    pub arrival_date: Option<String>,
    #[serde(default)]
    pub departure_date: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adults: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
}

impl BookingRequest {
    pub fn for_stay(
        property_external_id: u64,
        stay: &StayRequest,
        guest: &GuestDetails,
        price: Option<i64>,
    ) -> Self {
        Self {
            property_external_id: Some(property_external_id),
            arrival_date: Some(format_api_date(stay.arrival_date)),
            departure_date: Some(format_api_date(stay.departure_date)),
            first_name: Some(guest.first_name.clone()),
            last_name: Some(guest.last_name.clone()),
            email: Some(guest.email.clone()),
            phone: guest.phone.clone(),
            adults: Some(stay.adults),
            children: Some(stay.children),
            notice: guest.special_requests.clone(),
            price,
        }
    }
}

/// Normalized outcome of a reservation attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookingResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl BookingResult {
    pub fn confirmed(booking_id: i64) -> Self {
        Self {
            success: true,
            booking_id: Some(booking_id),
            error: None,
            details: None,
        }
    }

    pub fn failed(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            booking_id: None,
            error: Some(error.into()),
            details,
        }
    }
}

/// Native currency units per one unit of the display currency
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateSnapshot {
    pub rate: f64,
    pub date: String,
    pub is_fallback: bool,
}
