pub mod exchange;
pub mod format;

pub use exchange::{ExchangeRateService, FrankfurterSource, RateSource};
pub use format::{convert, format_amount, price_display, PriceDisplay};
