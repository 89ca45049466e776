use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

const TIER_SEPARATOR: char = ';';
const FIELD_SEPARATOR: char = ',';
const RANGE_SEPARATOR: char = '-';

/// One contiguous band of a tiered rate.
///
/// `min` and `max` are inclusive, 1-indexed unit positions. Every unit in the
/// band costs `unit_price * scale`, so a scale of 1 is full price and 0.5 is
/// half price.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Tier {
    pub min: Decimal,
    pub max: Decimal,
    pub unit_price: Decimal,
    pub scale: Decimal,
}

impl Tier {
    /// Number of units the band covers
    pub fn band_units(&self) -> Result<Decimal, RateError> {
        self.max
            .checked_sub(self.min)
            .and_then(|span| span.checked_add(Decimal::ONE))
            .ok_or(RateError::Overflow)
    }

    /// Cost of `units` units charged at this band's discounted price
    pub fn cost_of(&self, units: Decimal) -> Result<Decimal, RateError> {
        units
            .checked_mul(self.unit_price)
            .and_then(|cost| cost.checked_mul(self.scale))
            .ok_or(RateError::Overflow)
    }
}

impl FromStr for Tier {
    type Err = RateError;

    /// Parses `min-max,unitPrice,scale`, e.g. `1-5,0.50,0.8`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(FIELD_SEPARATOR).map(str::trim).collect();
        let [range, unit_price, scale] = fields.as_slice() else {
            return Err(RateError::MalformedTier(s.to_string()));
        };

        let (min, max) = range
            .split_once(RANGE_SEPARATOR)
            .ok_or_else(|| RateError::MalformedTier(s.to_string()))?;

        let tier = Tier {
            min: parse_number(min)?,
            max: parse_number(max)?,
            unit_price: parse_number(unit_price)?,
            scale: parse_number(scale)?,
        };

        if tier.scale <= Decimal::ZERO || tier.scale > Decimal::ONE {
            return Err(RateError::ScaleOutOfRange(tier.scale));
        }

        Ok(tier)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}{}{}",
            self.min, RANGE_SEPARATOR, self.max, FIELD_SEPARATOR, self.unit_price, FIELD_SEPARATOR, self.scale
        )
    }
}

fn parse_number(raw: &str) -> Result<Decimal, RateError> {
    let raw = raw.trim();
    Decimal::from_str(raw).map_err(|_| RateError::InvalidNumber(raw.to_string()))
}

/// Parse a serialized tier list such as `1-1,0.50,1;2-2,0.50,0.50`.
///
/// Empty segments (a trailing `;`) are skipped.
pub fn parse_tiers(spec: &str) -> Result<Vec<Tier>, RateError> {
    spec.split(TIER_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(Tier::from_str)
        .collect()
}

/// Price `quantity` units by consuming tiers in order.
///
/// Quantity beyond the combined capacity of the tiers is never priced.
pub fn price_for_quantity(tiers: &[Tier], quantity: Decimal) -> Result<Decimal, RateError> {
    let mut remaining = quantity;
    let mut cost = Decimal::ZERO;

    for tier in tiers {
        if remaining <= Decimal::ZERO {
            break;
        }

        let band_units = tier.band_units()?;
        let units = if remaining >= band_units { band_units } else { remaining };
        cost = checked_sum(cost, tier.cost_of(units)?)?;
        remaining = remaining.checked_sub(units).ok_or(RateError::Overflow)?;
    }

    Ok(cost)
}

fn checked_sum(a: Decimal, b: Decimal) -> Result<Decimal, RateError> {
    a.checked_add(b).ok_or(RateError::Overflow)
}

/// How a rate charges for its units
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateMode {
    /// `effective_price` buys exactly `effective_quantity` units
    Flat {
        effective_quantity: Decimal,
        effective_price: Decimal,
    },
    /// Graduated pricing over an ordered list of bands
    Tiered { tiers: Vec<Tier> },
}

/// A single pricing rule offered for a product.
///
/// Two rates are equal when they charge the same way and print the same
/// description; the rate name is for display only.
#[derive(Debug, Clone, Serialize)]
pub struct Rate {
    name: String,
    description: String,
    mode: RateMode,
    effective_quantity: Decimal,
    cost_per_unit: Decimal,
}

impl Rate {
    /// A flat or bulk rate: `effective_price` for `effective_quantity` units
    pub fn flat(
        name: impl Into<String>,
        description: impl Into<String>,
        effective_quantity: Decimal,
        effective_price: Decimal,
    ) -> Result<Self, RateError> {
        if effective_quantity <= Decimal::ZERO {
            return Err(RateError::NonPositiveQuantity(effective_quantity));
        }

        let cost_per_unit = effective_price
            .checked_div(effective_quantity)
            .ok_or(RateError::Overflow)?;

        Ok(Self {
            name: name.into(),
            description: description.into(),
            mode: RateMode::Flat {
                effective_quantity,
                effective_price,
            },
            effective_quantity,
            cost_per_unit,
        })
    }

    /// A tiered rate from its serialized tier list
    pub fn tiered(
        name: impl Into<String>,
        description: impl Into<String>,
        tier_spec: &str,
    ) -> Result<Self, RateError> {
        let tiers = parse_tiers(tier_spec)?;
        Self::from_tiers(name, description, tiers)
    }

    /// A tiered rate from already parsed tiers.
    ///
    /// The effective quantity is the sum of the band sizes. Derivation stops
    /// at the first band with a non-positive size; bands after it do not count.
    pub fn from_tiers(
        name: impl Into<String>,
        description: impl Into<String>,
        tiers: Vec<Tier>,
    ) -> Result<Self, RateError> {
        let mut total_quantity = Decimal::ZERO;
        let mut total_cost = Decimal::ZERO;

        for tier in &tiers {
            let band_units = tier.band_units()?;
            if band_units <= Decimal::ZERO {
                break;
            }
            total_quantity = checked_sum(total_quantity, band_units)?;
            total_cost = checked_sum(total_cost, tier.cost_of(band_units)?)?;
        }

        if total_quantity <= Decimal::ZERO {
            return Err(RateError::EmptyTiers);
        }

        let cost_per_unit = total_cost
            .checked_div(total_quantity)
            .ok_or(RateError::Overflow)?;

        Ok(Self {
            name: name.into(),
            description: description.into(),
            mode: RateMode::Tiered { tiers },
            effective_quantity: total_quantity,
            cost_per_unit,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text shown on the bill
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn mode(&self) -> &RateMode {
        &self.mode
    }

    pub fn is_tiered(&self) -> bool {
        matches!(self.mode, RateMode::Tiered { .. })
    }

    /// Units this rate is defined over; authored for flat rates, derived for tiered ones
    pub fn effective_quantity(&self) -> Decimal {
        self.effective_quantity
    }

    /// Flat price for the effective quantity, `None` for tiered rates
    pub fn effective_price(&self) -> Option<Decimal> {
        match self.mode {
            RateMode::Flat { effective_price, .. } => Some(effective_price),
            RateMode::Tiered { .. } => None,
        }
    }

    /// Tier bands in authored order (empty for flat rates)
    pub fn tiers(&self) -> &[Tier] {
        match &self.mode {
            RateMode::Flat { .. } => &[],
            RateMode::Tiered { tiers } => tiers,
        }
    }

    /// Average unit cost, fixed at construction and used to rank rates
    pub fn cost_per_unit(&self) -> Decimal {
        self.cost_per_unit
    }

    /// Whether the rate can be used when `quantity` units remain to be priced
    pub fn is_applicable(&self, quantity: Decimal) -> bool {
        self.effective_quantity > Decimal::ZERO && self.effective_quantity <= quantity
    }

    /// Unrounded cost of covering `quantity` units with this rate.
    ///
    /// A flat rate always charges its effective price; it only sells its
    /// whole bundle. A tiered rate consumes its bands in order.
    pub fn cost_for_quantity(&self, quantity: Decimal) -> Result<Decimal, RateError> {
        match &self.mode {
            RateMode::Flat { effective_price, .. } => Ok(*effective_price),
            RateMode::Tiered { tiers } => price_for_quantity(tiers, quantity),
        }
    }
}

impl PartialEq for Rate {
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description && self.mode == other.mode
    }
}

impl Eq for Rate {}

impl Hash for Rate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.description.hash(state);
        self.mode.hash(state);
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\tRATE NAME [{}]", self.name)?;
        writeln!(f, "\tRATE DESC [{}]", self.description)?;
        writeln!(f, "\tQUANTITY [{}]", self.effective_quantity)?;
        writeln!(f, "\tCOST PER UNIT [{}]", self.cost_per_unit.round_dp(4))?;

        match &self.mode {
            RateMode::Flat { effective_price, .. } => writeln!(f, "\tPRICE [{}]", effective_price),
            RateMode::Tiered { tiers } => {
                for (i, tier) in tiers.iter().enumerate() {
                    writeln!(f, "\t--- TIER [{}] {}", i + 1, tier)?;
                }
                Ok(())
            }
        }
    }
}

/// Reasons a rate cannot be offered
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateError {
    #[error("Effective quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    #[error("Malformed tier: {0:?} (expected min-max,price,scale)")]
    MalformedTier(String),

    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("Tier scale must be in (0, 1], got {0}")]
    ScaleOutOfRange(Decimal),

    #[error("Tiered rate covers no units")]
    EmptyTiers,

    #[error("Cost per unit overflowed")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flat_cost_per_unit() {
        let rate = Rate::flat("bulk", "Buy 3 for $1.30", dec!(3), dec!(1.30)).unwrap();

        assert!(!rate.is_tiered());
        assert_eq!(rate.effective_quantity(), dec!(3));
        assert_eq!(rate.effective_price(), Some(dec!(1.30)));
        assert_eq!(rate.cost_per_unit(), dec!(1.30) / dec!(3));
        assert!(rate.tiers().is_empty());
    }

    #[test]
    fn test_flat_rejects_non_positive_quantity() {
        assert_eq!(
            Rate::flat("retail", "Retail", dec!(0), dec!(0.50)),
            Err(RateError::NonPositiveQuantity(dec!(0)))
        );
        assert_eq!(
            Rate::flat("retail", "Retail", dec!(-2), dec!(0.50)),
            Err(RateError::NonPositiveQuantity(dec!(-2)))
        );
    }

    #[test]
    fn test_tiered_derives_quantity_and_cost() {
        let rate = Rate::tiered("tier", "Buy 1 get 1 50% off", "1-1,0.50,1;2-2,0.50,0.50").unwrap();

        assert!(rate.is_tiered());
        assert_eq!(rate.effective_price(), None);
        assert_eq!(rate.tiers().len(), 2);
        assert_eq!(rate.effective_quantity(), dec!(2));
        // 0.50 + 0.25 over two units
        assert_eq!(rate.cost_per_unit(), dec!(0.375));
    }

    #[test]
    fn test_full_coverage_matches_derivation() {
        let rate = Rate::tiered("tier", "Buy 2 get 1 50% off", "1-2,0.95,1;3-3,0.95,0.50").unwrap();
        let total = rate.cost_for_quantity(rate.effective_quantity()).unwrap();

        assert_eq!(total, dec!(2.375));
        assert_eq!(rate.cost_per_unit(), total / rate.effective_quantity());
        let band_sum: Decimal = rate.tiers().iter().map(|t| t.band_units().unwrap()).sum();
        assert_eq!(band_sum, rate.effective_quantity());
    }

    #[test]
    fn test_price_for_quantity_partial_tiers() {
        let tiers = parse_tiers("1-1,0.50,1;2-2,0.50,0.50").unwrap();
        assert_eq!(price_for_quantity(&tiers, dec!(2)).unwrap(), dec!(0.75));
        assert_eq!(price_for_quantity(&tiers, dec!(1)).unwrap(), dec!(0.50));

        // Second band untouched
        let tiers = parse_tiers("1-2,0.95,1;3-3,0.95,0.50").unwrap();
        assert_eq!(price_for_quantity(&tiers, dec!(2)).unwrap(), dec!(1.90));
    }

    #[test]
    fn test_price_for_quantity_fractional_and_excess() {
        let tiers = parse_tiers("1-1,0.50,1;2-2,0.50,0.50").unwrap();

        assert_eq!(price_for_quantity(&tiers, dec!(1.5)).unwrap(), dec!(0.625));
        // Nothing left to price the extra units
        assert_eq!(price_for_quantity(&tiers, dec!(10)).unwrap(), dec!(0.75));
        assert_eq!(price_for_quantity(&tiers, dec!(0)).unwrap(), dec!(0));
    }

    #[test]
    fn test_invalid_trailing_tier_stops_derivation() {
        let rate = Rate::tiered("tier", "Odd", "1-2,1.00,1;5-3,1.00,1;6-6,9.00,1").unwrap();

        assert_eq!(rate.tiers().len(), 3);
        assert_eq!(rate.effective_quantity(), dec!(2));
        assert_eq!(rate.cost_per_unit(), dec!(1.00));
    }

    #[test]
    fn test_invalid_first_tier_is_rejected() {
        assert_eq!(
            Rate::tiered("tier", "Broken", "3-1,1.00,1;4-4,1.00,1"),
            Err(RateError::EmptyTiers)
        );
        assert_eq!(Rate::tiered("tier", "Empty", ""), Err(RateError::EmptyTiers));
    }

    #[test]
    fn test_malformed_tier_specs() {
        assert!(matches!(
            Rate::tiered("tier", "x", "1-2,0.95"),
            Err(RateError::MalformedTier(_))
        ));
        assert!(matches!(
            Rate::tiered("tier", "x", "12,0.95,1"),
            Err(RateError::MalformedTier(_))
        ));
        assert_eq!(
            Rate::tiered("tier", "x", "1-2,abc,1"),
            Err(RateError::InvalidNumber("abc".to_string()))
        );
        assert_eq!(
            Rate::tiered("tier", "x", "1-2,0.95,0"),
            Err(RateError::ScaleOutOfRange(dec!(0)))
        );
        assert_eq!(
            Rate::tiered("tier", "x", "1-2,0.95,1.5"),
            Err(RateError::ScaleOutOfRange(dec!(1.5)))
        );
    }

    #[test]
    fn test_trailing_separator_is_ignored() {
        let rate = Rate::tiered("tier", "x", "1-1,0.50,1;").unwrap();
        assert_eq!(rate.tiers().len(), 1);
    }

    #[test]
    fn test_rates_compare_by_value() {
        let a = Rate::flat("bulk", "Buy 3 for $1.30", dec!(3), dec!(1.30)).unwrap();
        let b = Rate::flat("bulk", "Buy 3 for $1.30", dec!(3), dec!(1.30)).unwrap();
        let c = Rate::flat("bulk", "Buy 3 for $1.30", dec!(3), dec!(1.20)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_rate_name_is_not_part_of_equality() {
        let a = Rate::flat("bulk", "Buy 3 for $1.30", dec!(3), dec!(1.30)).unwrap();
        let b = Rate::flat("promo", "Buy 3 for $1.30", dec!(3), dec!(1.30)).unwrap();
        let c = Rate::flat("bulk", "Three for $1.30", dec!(3), dec!(1.30)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_tier_overflow_is_rejected() {
        assert_eq!(
            Rate::tiered("tier", "x", "0-79228162514264337593543950335,1,1"),
            Err(RateError::Overflow)
        );
        assert_eq!(
            Rate::tiered("tier", "x", "1-10,79228162514264337593543950335,1"),
            Err(RateError::Overflow)
        );
        // A band that cannot be sized fails even after a valid one
        assert_eq!(
            Rate::tiered("tier", "x", "1-1,1,1;0-79228162514264337593543950335,1,1"),
            Err(RateError::Overflow)
        );
    }

    #[test]
    fn test_price_for_quantity_reports_overflow() {
        let tiers = vec![Tier {
            min: dec!(1),
            max: dec!(10),
            unit_price: Decimal::MAX,
            scale: dec!(1),
        }];

        assert_eq!(price_for_quantity(&tiers, dec!(1)), Ok(Decimal::MAX));
        assert_eq!(price_for_quantity(&tiers, dec!(2)), Err(RateError::Overflow));
    }

    #[test]
    fn test_applicability_threshold() {
        let rate = Rate::flat("bulk", "Buy 3", dec!(3), dec!(1.30)).unwrap();

        assert!(!rate.is_applicable(dec!(2.99)));
        assert!(rate.is_applicable(dec!(3)));
        assert!(rate.is_applicable(dec!(7)));
    }
}
