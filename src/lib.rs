pub mod aggregator;
pub mod config;
pub mod currency;
pub mod error;
pub mod gateway;
pub mod models;
pub mod provider;
pub mod server;
pub mod validation;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use aggregator::{AvailabilityAggregator, CatalogBuckets};
pub use config::Config;
pub use error::{GatewayError, GatewayResult};
pub use workflow::{BookingState, BookingStep, BookingWorkflow, Transition};
