//! Effective price computation.

use chrono::{DateTime, Utc};

use super::entities::Discount;

/// Original and discounted price for one product at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    pub original: f64,
    pub effective: f64,
}

impl PriceQuote {
    /// True when a discount actually lowered the price, which is what
    /// decides whether the old/new price lines are shown.
    pub fn discounted(&self) -> bool {
        self.effective < self.original
    }
}

/// Applies `discount` to `price` as of `now`.
///
/// Percentage is applied before the fixed amount; the result never drops
/// below zero. An inactive discount (disabled, or `now` outside the
/// window) leaves the price untouched.
pub fn effective_price(price: f64, discount: Option<&Discount>, now: DateTime<Utc>) -> PriceQuote {
    let mut effective = price;
    if let Some(discount) = discount {
        if discount.active_at(now) {
            if let Some(percentage) = discount.percentage {
                effective *= 1.0 - percentage / 100.0;
            }
            if let Some(fixed) = discount.fixed_amount {
                effective -= fixed;
            }
            if effective < 0.0 {
                effective = 0.0;
            }
        }
    }
    PriceQuote {
        original: price,
        effective,
    }
}

/// Circled-digit glyph for product sizes 1-20; larger sizes fall back to
/// the plain number.
pub fn size_icon(size: u32) -> String {
    const ICONS: [&str; 20] = [
        "①", "②", "③", "④", "⑤", "⑥", "⑦", "⑧", "⑨", "⑩", "⑪", "⑫", "⑬", "⑭", "⑮",
        "⑯", "⑰", "⑱", "⑲", "⑳",
    ];
    match size {
        1..=20 => ICONS[size as usize - 1].to_string(),
        other => other.to_string(),
    }
}
