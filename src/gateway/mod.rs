pub mod proxy_client;
pub mod rates;
pub mod reservations;
pub mod traits;

pub use proxy_client::ProxyClient;
pub use rates::{evaluate_rates, RateGateway, PROPERTY_NOT_FOUND};
pub use reservations::ReservationService;
pub use traits::{AvailabilityGateway, ReservationGateway};
