use grocer_order::Bill;
use grocer_store::InvoiceFormat;
use rust_decimal::Decimal;

/// Render a bill for the customer
pub fn render(bill: &Bill, format: InvoiceFormat) -> Result<String, serde_json::Error> {
    match format {
        InvoiceFormat::Text => Ok(render_text(bill)),
        InvoiceFormat::Json => render_json(bill),
    }
}

/// Fixed-width itemized bill: product, rate description, line cost
pub fn render_text(bill: &Bill) -> String {
    let mut out = String::from("\nHere is your invoice:\n");

    for line in bill.lines() {
        out.push_str(&format!(
            "{:>10}{:>20}{:>10}\n",
            line.product_name(),
            line.description(),
            money(line.cost())
        ));
    }

    out.push_str(&format!("\n{:>10}{:>20}${:>9}\n", "TOTAL DUE", "", money(bill.total())));
    out
}

pub fn render_json(bill: &Bill) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(bill)?;
    out.push('\n');
    Ok(out)
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}
