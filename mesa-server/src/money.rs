//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic is done on `Decimal`, then converted to `f64` (rounded to
//! cents, half-up) for storage and serialization.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum menu item price (€1,000,000)
pub const MAX_PRICE: f64 = 1_000_000.0;

/// Largest cash tender accepted at the counter (€100,000)
pub const MAX_TENDER: f64 = 100_000.0;

/// Convert f64 to Decimal (non-finite values become zero)
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal to f64 rounded to cents
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round an f64 amount to cents
#[inline]
pub fn round(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// `unit_price × quantity`
pub fn line_total(unit_price: f64, quantity: i32) -> f64 {
    to_f64(to_decimal(unit_price) * Decimal::from(quantity))
}

/// Sum of amounts
pub fn sum<I: IntoIterator<Item = f64>>(amounts: I) -> f64 {
    to_f64(amounts.into_iter().map(to_decimal).sum())
}

/// Tax contained in a tax-inclusive total: `total × rate / (100 + rate)`
pub fn included_tax(total: f64, rate_percent: f64) -> f64 {
    let rate = to_decimal(rate_percent);
    let divisor = Decimal::ONE_HUNDRED + rate;
    if divisor.is_zero() {
        return 0.0;
    }
    to_f64(to_decimal(total) * rate / divisor)
}

/// Totals of a tax-inclusive order: `(subtotal, tax, total)`
pub fn order_totals<I: IntoIterator<Item = f64>>(
    line_totals: I,
    rate_percent: f64,
) -> (f64, f64, f64) {
    let total = sum(line_totals);
    let tax = included_tax(total, rate_percent);
    let subtotal = to_f64(to_decimal(total) - to_decimal(tax));
    (subtotal, tax, total)
}

/// Change owed for a cash tender, `None` when the tender is short
pub fn change_due(total: f64, tendered: f64) -> Option<f64> {
    let change = to_decimal(tendered) - to_decimal(total);
    if change < Decimal::ZERO {
        None
    } else {
        Some(to_f64(change))
    }
}

/// Amounts equal within one cent
pub fn amounts_match(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() <= MONEY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_totals_avoid_float_drift() {
        assert_eq!(line_total(0.1, 3), 0.3);
        assert_eq!(sum([0.1, 0.2]), 0.3);
    }

    #[test]
    fn included_tax_portuguese_rates() {
        // 13% IVA on 113.00 -> 13.00
        assert_eq!(included_tax(113.0, 13.0), 13.0);
        // 23% IVA on 12.30 -> 2.30
        assert_eq!(included_tax(12.30, 23.0), 2.30);
        assert_eq!(included_tax(50.0, 0.0), 0.0);
    }

    #[test]
    fn order_totals_split() {
        let (subtotal, tax, total) = order_totals([10.0, 2.30], 23.0);
        assert_eq!(total, 12.30);
        assert_eq!(tax, 2.30);
        assert_eq!(subtotal, 10.0);
    }

    #[test]
    fn change() {
        assert_eq!(change_due(17.5, 20.0), Some(2.5));
        assert_eq!(change_due(17.5, 17.5), Some(0.0));
        assert_eq!(change_due(17.5, 17.49), None);
    }

    #[test]
    fn tolerance() {
        assert!(amounts_match(25.0, 25.01));
        assert!(amounts_match(25.0, 24.99));
        assert!(!amounts_match(25.0, 25.02));
    }
}
