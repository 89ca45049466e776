use serde::Deserialize;
use std::env;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub catalogue: CatalogueConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub invoice: InvoiceConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogueConfig {
    /// Catalogue file used when none is given on the command line
    pub path: Option<String>,
    /// Match product names at the prompt regardless of case
    #[serde(default)]
    pub ignore_case: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutConfig {
    #[serde(default = "default_magic_word")]
    pub magic_word: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            magic_word: default_magic_word(),
        }
    }
}

fn default_magic_word() -> String {
    "CHECK OUT".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct InvoiceConfig {
    #[serde(default)]
    pub format: InvoiceFormat,
}

/// How the finished bill is printed
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for InvoiceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(InvoiceFormat::Text),
            "json" => Ok(InvoiceFormat::Json),
            other => Err(format!("unknown invoice format '{}' (expected text or json)", other)),
        }
    }
}

impl fmt::Display for InvoiceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceFormat::Text => write!(f, "text"),
            InvoiceFormat::Json => write!(f, "json"),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Every file is optional; the defaults are enough to run
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `GROCER__CATALOGUE__IGNORE_CASE=true`
            .add_source(
                config::Environment::with_prefix("GROCER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn from_toml(toml: &str) -> Config {
        config::Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = from_toml("");

        assert_eq!(config.catalogue.path, None);
        assert!(!config.catalogue.ignore_case);
        assert_eq!(config.checkout.magic_word, "CHECK OUT");
        assert_eq!(config.invoice.format, InvoiceFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let config = from_toml(
            r#"
            [catalogue]
            path = "prices.txt"
            ignore_case = true

            [checkout]
            magic_word = "DONE"

            [invoice]
            format = "json"
            "#,
        );

        assert_eq!(config.catalogue.path.as_deref(), Some("prices.txt"));
        assert!(config.catalogue.ignore_case);
        assert_eq!(config.checkout.magic_word, "DONE");
        assert_eq!(config.invoice.format, InvoiceFormat::Json);
    }

    #[test]
    fn test_invoice_format_from_str() {
        assert_eq!("JSON".parse::<InvoiceFormat>(), Ok(InvoiceFormat::Json));
        assert_eq!("text".parse::<InvoiceFormat>(), Ok(InvoiceFormat::Text));
        assert!("xml".parse::<InvoiceFormat>().is_err());
    }
}
