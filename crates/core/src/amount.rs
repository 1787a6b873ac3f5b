//! Storage limits for quantities and money.
//!
//! Every quantity, price, line total and balance is stored in a
//! `NUMERIC(19, 4)` column: at most four decimal places and a magnitude below
//! 10^15. Values are checked against these limits before anything is
//! written, so the database never rounds or overflows on our behalf.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept in storage.
pub const SCALE: u32 = 4;

/// Exclusive upper bound on a stored magnitude (10^15).
pub const LIMIT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Returns true if `value` is stored exactly as given.
#[must_use]
pub fn fits(value: Decimal) -> bool {
    value.normalize().scale() <= SCALE && in_range(value)
}

/// Returns true if the magnitude of `value` is below [`LIMIT`].
#[must_use]
pub fn in_range(value: Decimal) -> bool {
    value.abs() < LIMIT
}

/// `quantity × unit_price` rounded half away from zero to storage scale.
///
/// Returns `None` if the product overflows or does not fit in storage.
#[must_use]
pub fn value_of(quantity: Decimal, unit_price: Decimal) -> Option<Decimal> {
    let value = quantity
        .checked_mul(unit_price)?
        .round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
    in_range(value).then_some(value)
}

/// `a + b`, or `None` if the sum does not fit in storage.
#[must_use]
pub fn add(a: Decimal, b: Decimal) -> Option<Decimal> {
    a.checked_add(b).filter(|sum| in_range(*sum))
}
