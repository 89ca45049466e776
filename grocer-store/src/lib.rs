pub mod app_config;
pub mod catalogue_file;

pub use app_config::{Config, InvoiceFormat};
pub use catalogue_file::{load_catalogue, parse_catalogue, LoadError};
