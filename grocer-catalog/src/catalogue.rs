use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::product::Product;
use crate::rate::Rate;

/// Every product available for purchase, keyed by case-sensitive name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalogue {
    products: Vec<Product>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products in the order they were first added
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Whether a product exists, optionally ignoring case
    pub fn has_product(&self, name: &str, ignore_case: bool) -> bool {
        self.resolve_name(name, ignore_case).is_some()
    }

    /// The catalogue's own spelling of `name`.
    ///
    /// With `ignore_case`, `APPLE` resolves to the first product whose name
    /// matches case-insensitively.
    pub fn resolve_name(&self, name: &str, ignore_case: bool) -> Option<&str> {
        if let Some(product) = self.products.iter().find(|p| p.name() == name) {
            return Some(product.name());
        }
        if !ignore_case {
            return None;
        }

        let wanted = name.to_uppercase();
        self.products
            .iter()
            .find(|p| p.name().to_uppercase() == wanted)
            .map(Product::name)
    }

    /// Look up a product by exact name
    pub fn product(&self, name: &str) -> Result<&Product, CatalogueError> {
        self.products
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| CatalogueError::UnknownProduct(name.to_string()))
    }

    fn product_mut(&mut self, name: &str) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.name() == name)
    }

    /// Add a product. A product with the same name absorbs the new rates instead.
    pub fn add_product(&mut self, product: Product) {
        match self.product_mut(product.name()) {
            Some(existing) => {
                for rate in product.rates() {
                    existing.add_rate(rate.clone());
                }
            }
            None => self.products.push(product),
        }
    }

    /// Add a rate to a product already in the catalogue.
    ///
    /// Unknown names are ignored; returns whether the rate was added.
    pub fn add_rate_to_existing_product(&mut self, name: &str, rate: Rate) -> bool {
        match self.product_mut(name) {
            Some(product) => product.add_rate(rate),
            None => {
                debug!("Ignoring rate {} for unknown product {}", rate.name(), name);
                false
            }
        }
    }

    /// Add a rate, creating the product on first sight
    pub fn insert_rate(&mut self, name: &str, rate: Rate) {
        if self.has_product(name, false) {
            self.add_rate_to_existing_product(name, rate);
        } else {
            let mut product = Product::new(name);
            product.add_rate(rate);
            self.products.push(product);
        }
    }
}

impl fmt::Display for Catalogue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for product in &self.products {
            writeln!(f, "{}", product)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogueError {
    #[error("Product not found: {0}")]
    UnknownProduct(String),
}
