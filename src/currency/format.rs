use serde::{Deserialize, Serialize};

/// Convert a native amount into the display currency, rounded to whole units.
/// `rate` is native units per display unit.
pub fn convert(amount: i64, rate: f64) -> i64 {
    if !rate.is_finite() || rate <= 0.0 {
        return 0;
    }
    (amount as f64 / rate).round() as i64
}

/// Render a whole-unit amount the way the site's locales do, without decimals
pub fn format_amount(amount: i64, currency_code: &str) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let digits = amount.unsigned_abs();

    match currency_code {
        // id-ID puts a no-break space after the symbol and groups with dots
        "IDR" => format!("{}Rp\u{a0}{}", sign, group_digits(digits, '.')),
        "USD" => format!("{}${}", sign, group_digits(digits, ',')),
        other => format!("{}{} {}", sign, other, group_digits(digits, ',')),
    }
}

fn group_digits(value: u64, separator: char) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (idx, ch) in raw.chars().enumerate() {
        if idx > 0 && (raw.len() - idx) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// Ready-to-render prices in both currencies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceDisplay {
    pub native: String,
    pub display: String,
    pub display_raw: i64,
    /// e.g. `Rp 4.500.000 (~$281)`
    pub combined: String,
}

pub fn price_display(amount: i64, rate: f64, native_code: &str, display_code: &str) -> PriceDisplay {
    let display_raw = convert(amount, rate);
    let native = format_amount(amount, native_code);
    let display = format_amount(display_raw, display_code);
    let combined = format!("{} (~{})", native, display);

    PriceDisplay {
        native,
        display,
        display_raw,
        combined,
    }
}
