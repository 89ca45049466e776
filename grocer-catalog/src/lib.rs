pub mod rate;
pub mod product;
pub mod catalogue;
pub mod pricing;

pub use rate::{Rate, RateError, RateMode, Tier};
pub use product::{Product, ProductError};
pub use catalogue::{Catalogue, CatalogueError};
pub use pricing::round_half_up;
