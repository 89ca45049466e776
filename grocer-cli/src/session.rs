use std::io::{self, BufRead, Write};
use std::str::FromStr;

use grocer_catalog::Catalogue;
use grocer_order::ShoppingList;
use rust_decimal::Decimal;
use tracing::{debug, warn};

pub const DEFAULT_MAGIC_WORD: &str = "CHECK OUT";

/// Console conversation that gathers what the customer wants to buy.
///
/// Each line holds one or more `quantity name` pairs, e.g. `2 apple 3 orange`.
/// The session ends on the magic word or at end of input.
pub struct CheckoutSession<'a> {
    catalogue: &'a Catalogue,
    magic_word: String,
    ignore_case: bool,
}

impl<'a> CheckoutSession<'a> {
    pub fn new(catalogue: &'a Catalogue) -> Self {
        Self {
            catalogue,
            magic_word: DEFAULT_MAGIC_WORD.to_string(),
            ignore_case: false,
        }
    }

    pub fn with_magic_word(mut self, magic_word: impl Into<String>) -> Self {
        self.magic_word = magic_word.into();
        self
    }

    /// Accept product names in any case, billing them under the catalogue's spelling
    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Prompts go to `output`, complaints about rejected input to `errors`
    pub fn run<R, W, E>(&self, input: R, output: &mut W, errors: &mut E) -> io::Result<ShoppingList>
    where
        R: BufRead,
        W: Write,
        E: Write,
    {
        writeln!(output, "Please enter an item with quantity in a format like '2 apple'")?;
        writeln!(
            output,
            "When you are done entering item(s), type '{}' to get an itemized bill",
            self.magic_word
        )?;

        let mut list = ShoppingList::new();
        let mut lines = input.lines();

        loop {
            write!(output, ">> ")?;
            output.flush()?;

            let Some(line) = lines.next() else {
                debug!("Input closed before {}", self.magic_word);
                break;
            };
            let line = line?;
            if line.trim() == self.magic_word {
                break;
            }

            for issue in self.read_line(&line, &mut list) {
                warn!("Rejected input {:?}: {}", line, issue);
                writeln!(errors, "{}", issue)?;
            }
        }

        Ok(list)
    }

    /// Add every `quantity name` pair on `line` to `list`.
    ///
    /// Unknown products are skipped and reading continues. A bad quantity or
    /// a quantity without a name abandons the rest of the line.
    pub fn read_line(&self, line: &str, list: &mut ShoppingList) -> Vec<InputIssue> {
        let mut issues = Vec::new();
        let mut tokens = line.split_whitespace();

        while let Some(token) = tokens.next() {
            let Ok(quantity) = Decimal::from_str(token) else {
                issues.push(InputIssue::NotAQuantity(token.to_string()));
                break;
            };
            let Some(name) = tokens.next() else {
                issues.push(InputIssue::MissingName);
                break;
            };

            if quantity <= Decimal::ZERO {
                issues.push(InputIssue::NonPositiveQuantity(quantity));
                continue;
            }

            match self.catalogue.resolve_name(name, self.ignore_case) {
                Some(product_name) => {
                    if list.add(product_name, quantity).is_err() {
                        issues.push(InputIssue::QuantityTooLarge(product_name.to_string()));
                    }
                }
                None => issues.push(InputIssue::UnknownItem(name.to_string())),
            }
        }

        issues
    }
}

/// Something the customer typed that could not be added
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputIssue {
    #[error("[{0}] is not something I recognize.  Try something like '2 apple'")]
    NotAQuantity(String),

    #[error("Oops I did not understand that.  Try something like '2 apple'")]
    MissingName,

    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    #[error("Item [{0}] does not exist in the catalogue")]
    UnknownItem(String),

    #[error("That is too many [{0}] for one order")]
    QuantityTooLarge(String),
}
