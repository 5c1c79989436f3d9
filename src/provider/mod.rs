pub mod smoobu;
pub mod traits;
pub mod types;

pub use smoobu::SmoobuClient;
pub use traits::BookingProvider;
