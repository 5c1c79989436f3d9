use crate::error::{GatewayError, GatewayResult};
use crate::models::parse_api_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Price-status flag sent with every reservation: payment is taken later
pub const PRICE_STATUS_UNPAID: u8 = 1;

/// Provider data for a single night
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NightRate {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub available: u8,
    #[serde(default)]
    pub min_length_of_stay: Option<u32>,
}

impl NightRate {
    pub fn is_available(&self) -> bool {
        self.available == 1
    }
}

/// Body of the provider's rates endpoint:
/// `{ data: { [propertyId]: { [date]: NightRate } } }`
#[derive(Debug, Clone, Deserialize)]
pub struct RatesEnvelope {
    #[serde(default)]
    pub data: HashMap<String, HashMap<String, NightRate>>,
}

impl RatesEnvelope {
    /// Pick out one property's calendar, or `None` if the provider doesn't know it
    pub fn into_calendar(mut self, property_id: u64) -> GatewayResult<Option<RateCalendar>> {
        match self.data.remove(&property_id.to_string()) {
            Some(days) => RateCalendar::from_wire(days).map(Some),
            None => Ok(None),
        }
    }
}

/// Night-level rate map of one property, ordered by date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateCalendar {
    nights: BTreeMap<NaiveDate, NightRate>,
}

impl RateCalendar {
    pub fn from_wire(days: HashMap<String, NightRate>) -> GatewayResult<Self> {
        let mut nights = BTreeMap::new();
        for (date, rate) in days {
            let day = parse_api_date(&date)
                .map_err(|_| GatewayError::Malformed(format!("unexpected date key '{}'", date)))?;
            nights.insert(day, rate);
        }
        Ok(Self { nights })
    }

    pub fn night(&self, date: NaiveDate) -> Option<&NightRate> {
        self.nights.get(&date)
    }

    pub fn insert(&mut self, date: NaiveDate, rate: NightRate) {
        self.nights.insert(date, rate);
    }

    pub fn len(&self) -> usize {
        self.nights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nights.is_empty()
    }
}

/// Body of the provider's create-reservation call
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReservationPayload {
    pub arrival_date: String,
    pub departure_date: String,
    pub apartment_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub adults: u32,
    pub children: u32,
    pub notice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    pub price_status: u8,
    pub channel_id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReservationCreated {
    Accepted { id: i64 },
    Rejected {
        status: u16,
        detail: Option<String>,
        payload: serde_json::Value,
    },
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReservationAccepted {
    pub id: i64,
}
