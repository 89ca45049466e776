//! Pipe-delimited pricing catalogue files.
//!
//! Each line describes one rate:
//!
//! ```text
//! apple|retail|Retail|1|0.50
//! apple|bulk|Buy 3 for $1.30|3|1.30
//! orange|tier|Buy 2 get 1 50% off|-1|1-2,0.95,1;3-3,0.95,0.50
//! ```
//!
//! Columns are product name, rate name, rate description (printed on the
//! bill), effective quantity, and price. An effective quantity of `-1` marks
//! a tiered rate whose last column is a tier list instead of a price.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use grocer_catalog::{Catalogue, Rate, RateError};
use rust_decimal::Decimal;
use tracing::info;

const FIELD_SEPARATOR: char = '|';
const FIELD_COUNT: usize = 5;
const COMMENT_PREFIX: char = '#';

/// Read and parse a catalogue file
pub fn load_catalogue(path: impl AsRef<Path>) -> Result<Catalogue, LoadError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let catalogue = parse_catalogue(&contents)?;
    info!(
        "Loaded {} product(s) from {}",
        catalogue.len(),
        path.display()
    );
    Ok(catalogue)
}

/// Parse catalogue text. Blank lines and `#` comments are skipped.
pub fn parse_catalogue(contents: &str) -> Result<Catalogue, LoadError> {
    let mut catalogue = Catalogue::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }

        let (product_name, rate) = parse_line(index + 1, line)?;
        catalogue.insert_rate(product_name, rate);
    }

    Ok(catalogue)
}

fn parse_line(line_number: usize, line: &str) -> Result<(&str, Rate), LoadError> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).map(str::trim).collect();
    let [product_name, rate_name, description, quantity, price] = fields.as_slice() else {
        return Err(LoadError::Malformed {
            line: line_number,
            reason: format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
        });
    };

    if product_name.is_empty() {
        return Err(LoadError::Malformed {
            line: line_number,
            reason: "product name is empty".to_string(),
        });
    }

    let invalid = |source: RateError| LoadError::InvalidRate {
        line: line_number,
        source,
    };

    let quantity = parse_decimal(quantity).map_err(invalid)?;
    let rate = if quantity == Decimal::NEGATIVE_ONE {
        Rate::tiered(*rate_name, *description, price)
    } else {
        parse_decimal(price).and_then(|price| Rate::flat(*rate_name, *description, quantity, price))
    };

    Ok((*product_name, rate.map_err(invalid)?))
}

fn parse_decimal(raw: &str) -> Result<Decimal, RateError> {
    Decimal::from_str(raw).map_err(|_| RateError::InvalidNumber(raw.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read catalogue {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Line {line}: {source}")]
    InvalidRate {
        line: usize,
        #[source]
        source: RateError,
    },
}
