use chrono::{DateTime, Utc};
use grocer_catalog::{round_half_up, Rate, RateError};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::biller::BillingError;

/// Quantities a customer asked for, in the order they were first requested
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShoppingList {
    items: Vec<(String, Decimal)>,
}

impl ShoppingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `quantity` more of `product_name`.
    ///
    /// Repeated products accumulate and keep their first position.
    pub fn add(&mut self, product_name: impl Into<String>, quantity: Decimal) -> Result<(), BillingError> {
        let product_name = product_name.into();
        match self.items.iter_mut().find(|(name, _)| *name == product_name) {
            Some((_, total)) => {
                *total = total
                    .checked_add(quantity)
                    .ok_or(BillingError::QuantityOverflow(product_name))?;
            }
            None => self.items.push((product_name, quantity)),
        }
        Ok(())
    }

    /// Build a list from `(name, quantity)` pairs, accumulating repeats
    pub fn from_items<S, I>(items: I) -> Result<Self, BillingError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Decimal)>,
    {
        let mut list = ShoppingList::new();
        for (name, quantity) in items {
            list.add(name, quantity)?;
        }
        Ok(list)
    }

    pub fn quantity(&self, product_name: &str) -> Option<Decimal> {
        self.items
            .iter()
            .find(|(name, _)| name == product_name)
            .map(|(_, quantity)| *quantity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.items.iter().map(|(name, quantity)| (name.as_str(), *quantity))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One priced step of an allocation.
///
/// A customer buying 5 apples may end up with several lines for `apple`,
/// each under a different rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchasedLine {
    product_name: String,
    quantity: Decimal,
    rate: Rate,
    cost: Decimal,
}

impl PurchasedLine {
    /// Price `quantity` units under `rate`, rounded to the cent
    pub fn new(product_name: impl Into<String>, quantity: Decimal, rate: Rate) -> Result<Self, RateError> {
        let cost = round_half_up(rate.cost_for_quantity(quantity)?);
        Ok(Self {
            product_name: product_name.into(),
            quantity,
            rate,
            cost,
        })
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn rate(&self) -> &Rate {
        &self.rate
    }

    /// Bill text for the line
    pub fn description(&self) -> &str {
        self.rate.description()
    }

    pub fn cost(&self) -> Decimal {
        self.cost
    }
}

/// An itemized bill
#[derive(Debug, Clone, Serialize)]
pub struct Bill {
    pub id: Uuid,
    lines: Vec<PurchasedLine>,
    total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            lines: Vec::new(),
            total: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    /// Append a line; the total sums the already rounded line costs
    pub fn add_line(&mut self, line: PurchasedLine) -> Result<(), BillingError> {
        self.total = self
            .total
            .checked_add(line.cost())
            .ok_or(BillingError::TotalOverflow)?;
        self.lines.push(line);
        Ok(())
    }

    pub fn lines(&self) -> &[PurchasedLine] {
        &self.lines
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for Bill {
    fn default() -> Self {
        Self::new()
    }
}
