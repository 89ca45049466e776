pub mod models;
pub mod biller;

pub use models::{Bill, PurchasedLine, ShoppingList};
pub use biller::{Biller, BillingError};
