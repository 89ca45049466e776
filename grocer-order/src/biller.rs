use grocer_catalog::{Catalogue, CatalogueError, ProductError, RateError};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::models::{Bill, PurchasedLine, ShoppingList};

/// Covers requested quantities with the cheapest rates the catalogue offers
pub struct Biller<'a> {
    catalogue: &'a Catalogue,
}

impl<'a> Biller<'a> {
    pub fn new(catalogue: &'a Catalogue) -> Self {
        Self { catalogue }
    }

    /// Allocate `requested` units of one product.
    ///
    /// Each step takes the best rate for what is still outstanding and
    /// covers that rate's full effective quantity.
    pub fn allocate(
        &self,
        product_name: &str,
        requested: Decimal,
    ) -> Result<Vec<PurchasedLine>, BillingError> {
        let product = self.catalogue.product(product_name)?;
        let mut remaining = requested;
        let mut lines = Vec::new();

        while remaining > Decimal::ZERO {
            let rate = product.best_rate(remaining)?;
            let covered = rate.effective_quantity();
            let line = PurchasedLine::new(product.name(), covered, rate.clone())?;

            debug!(
                "Allocated {} {} under '{}' for {} ({} remaining)",
                covered,
                product_name,
                rate.description(),
                line.cost(),
                remaining - covered
            );

            remaining -= covered;
            lines.push(line);
        }

        Ok(lines)
    }

    /// Price a whole shopping list.
    ///
    /// Every product is checked against the catalogue before any line is
    /// allocated. Lines follow the list's order.
    pub fn bill(&self, list: &ShoppingList) -> Result<Bill, BillingError> {
        for (name, _) in list.iter() {
            self.catalogue.product(name)?;
        }

        let mut bill = Bill::new();
        for (name, quantity) in list.iter() {
            for line in self.allocate(name, quantity)? {
                bill.add_line(line)?;
            }
        }

        info!(
            "Bill {} priced {} line(s) for {} product(s), total {}",
            bill.id,
            bill.lines().len(),
            list.len(),
            bill.total()
        );

        Ok(bill)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BillingError {
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error(transparent)]
    Product(#[from] ProductError),

    #[error(transparent)]
    Rate(#[from] RateError),

    #[error("Requested quantity of {0} is too large")]
    QuantityOverflow(String),

    #[error("Bill total is too large")]
    TotalOverflow,
}
