//! # Price Display
//! 
//! Prices on a young curve sit around 1e-8 SOL. Fixed-decimal formatting
//! truncates them to zero, so rendering keeps a fixed number of significant
//! digits instead.

use crate::constants::{PRICE_SIGNIFICANT_DIGITS, UNAVAILABLE_DISPLAY};

// Past this many decimals switch to scientific notation
const MAX_FIXED_DECIMALS: i32 = 20;

/// Render a price with enough precision to stay non-zero
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(value) if value.is_finite() => format_significant(value, PRICE_SIGNIFICANT_DIGITS),
        _ => UNAVAILABLE_DISPLAY.to_string(),
    }
}

/// Fixed-point rendering with `digits` significant digits, trailing zeros trimmed
pub fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let digits = digits.max(1) as i32;
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (digits - 1 - magnitude).max(0);

    if decimals > MAX_FIXED_DECIMALS {
        return format!("{:.*e}", (digits - 1) as usize, value);
    }

    let rendered = format!("{:.*}", decimals as usize, value);
    trim_trailing_zeros(rendered)
}

fn trim_trailing_zeros(rendered: String) -> String {
    if !rendered.contains('.') {
        return rendered;
    }
    rendered
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
