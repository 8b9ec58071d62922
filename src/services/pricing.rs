use serde::Serialize;

use crate::models::{DiscountType, PromoCode};

/// 6% tax applied to the discounted subtotal.
const TAX_RATE: f64 = 0.06;

/// Pricing snapshot for a booking. Amounts are whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub subtotal: i64,
    pub discount: i64,
    pub taxes: i64,
    pub total: i64,
}

/// Discount a promo grants on a subtotal, rounded half-up to a whole
/// currency unit and clamped to the subtotal so the taxed base can never
/// go negative.
pub fn discount(subtotal: i64, promo: &PromoCode) -> i64 {
    let raw = match promo.discount_type {
        DiscountType::Percentage => subtotal as f64 * promo.discount_value / 100.0,
        DiscountType::Flat => promo.discount_value,
    };
    (raw.round() as i64).clamp(0, subtotal)
}

/// Pure pricing function: no I/O, deterministic for all `quantity >= 1`
/// and `unit_price >= 0`.
pub fn quote(unit_price: i64, quantity: i64, promo: Option<&PromoCode>) -> PriceQuote {
    let subtotal = unit_price * quantity;
    let discount = promo.map(|p| discount(subtotal, p)).unwrap_or(0);

    let taxed_base = subtotal - discount;
    let taxes = (taxed_base as f64 * TAX_RATE).round() as i64;

    PriceQuote {
        subtotal,
        discount,
        taxes,
        total: taxed_base + taxes,
    }
}
