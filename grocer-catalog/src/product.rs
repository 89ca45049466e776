use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::rate::Rate;

/// A product and every rate it can be bought under
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    name: String,
    rates: Vec<Rate>,
}

impl Product {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rates: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rates in the order they were first added
    pub fn rates(&self) -> &[Rate] {
        &self.rates
    }

    /// Add a rate unless an identical one is already offered.
    ///
    /// Returns `false` when the rate was a duplicate.
    pub fn add_rate(&mut self, rate: Rate) -> bool {
        if self.rates.contains(&rate) {
            return false;
        }
        self.rates.push(rate);
        true
    }

    /// Pick the cheapest rate per unit among those usable for `quantity`.
    ///
    /// A rate is usable when its effective quantity does not exceed the
    /// requested quantity. When several usable rates share the lowest cost
    /// per unit, the one added first wins.
    pub fn best_rate(&self, quantity: Decimal) -> Result<&Rate, ProductError> {
        let mut best: Option<&Rate> = None;

        for rate in self.rates.iter().filter(|r| r.is_applicable(quantity)) {
            match best {
                Some(current) if current.cost_per_unit() <= rate.cost_per_unit() => {}
                _ => best = Some(rate),
            }
        }

        best.ok_or_else(|| ProductError::NoApplicableRate {
            product: self.name.clone(),
            quantity,
        })
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "*** PRODUCT NAME [{}] ***", self.name)?;
        writeln!(f)?;

        if self.rates.is_empty() {
            writeln!(f, "This product does not have rates defined")?;
        }
        for rate in &self.rates {
            writeln!(f, "{}", rate)?;
        }
        Ok(())
    }
}

/// Product-related errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProductError {
    #[error("No rate for {product} applies to a quantity of {quantity}")]
    NoApplicableRate { product: String, quantity: Decimal },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn apple() -> Product {
        let mut product = Product::new("apple");
        product.add_rate(Rate::flat("retail", "Retail", dec!(1), dec!(0.50)).unwrap());
        product.add_rate(Rate::flat("bulk", "Buy 3 for $1.30", dec!(3), dec!(1.30)).unwrap());
        product
    }

    #[test]
    fn test_best_rate_prefers_lower_cost_per_unit() {
        let product = apple();

        let rate = product.best_rate(dec!(4)).unwrap();
        assert_eq!(rate.name(), "bulk");

        let rate = product.best_rate(dec!(1)).unwrap();
        assert_eq!(rate.name(), "retail");
    }

    #[test]
    fn test_best_rate_never_exceeds_requested_quantity() {
        let mut product = apple();
        product.add_rate(Rate::tiered("tier", "Buy 5 cheap", "1-5,0.10,1").unwrap());

        for quantity in [dec!(1), dec!(2), dec!(3), dec!(4), dec!(4.5), dec!(5), dec!(9)] {
            let rate = product.best_rate(quantity).unwrap();
            assert!(rate.effective_quantity() <= quantity);
        }
        assert_eq!(product.best_rate(dec!(5)).unwrap().name(), "tier");
    }

    #[test]
    fn test_no_applicable_rate() {
        let mut product = Product::new("avocado");
        product.add_rate(Rate::flat("bulk", "Buy 3", dec!(3), dec!(5.00)).unwrap());

        assert_eq!(
            product.best_rate(dec!(1)),
            Err(ProductError::NoApplicableRate {
                product: "avocado".to_string(),
                quantity: dec!(1),
            })
        );
    }

    #[test]
    fn test_empty_product_has_no_rate() {
        let product = Product::new("kiwi");
        assert!(product.best_rate(dec!(10)).is_err());
    }

    #[test]
    fn test_duplicate_rates_collapse() {
        let mut product = apple();

        let added = product.add_rate(Rate::flat("retail", "Retail", dec!(1), dec!(0.50)).unwrap());
        assert!(!added);
        assert_eq!(product.rates().len(), 2);
    }

    #[test]
    fn test_tied_rates_yield_lowest_cost() {
        let mut product = Product::new("pear");
        product.add_rate(Rate::flat("single", "Single", dec!(1), dec!(0.40)).unwrap());
        product.add_rate(Rate::flat("pair", "Pair", dec!(2), dec!(0.80)).unwrap());
        product.add_rate(Rate::flat("retail", "Retail", dec!(1), dec!(0.60)).unwrap());

        let rate = product.best_rate(dec!(2)).unwrap();
        assert_eq!(rate.cost_per_unit(), dec!(0.40));
    }
}
