use rust_decimal::{Decimal, RoundingStrategy};

/// Money is billed to the cent
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Round a line cost to the nearest cent, halves rounding up.
///
/// Costs are never negative here, so rounding away from zero is the same
/// as rounding half up.
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}
