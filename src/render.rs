//! Plain-text rendering used by the CLI.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::api::InstanceType;

#[derive(Tabled)]
struct InstanceTypeRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "PRICE (USD/HOUR)")]
    price: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

/// Formats a price in cents as dollars with two decimals (`110` → `1.10`).
#[must_use]
pub fn format_price_cents(cents: u64) -> String {
    format!("{}.{:02}", cents.div_euclid(100), cents.rem_euclid(100))
}

/// Renders instance types as a table of name, hourly price, and description.
#[must_use]
pub fn instance_types_table(types: &[InstanceType]) -> String {
    let rows = types.iter().map(|instance_type| InstanceTypeRow {
        name: instance_type.name.clone(),
        price: format_price_cents(instance_type.price_cents_per_hour),
        description: instance_type.description.clone(),
    });
    let mut table = Table::new(rows);
    table.with(Style::modern());
    table.to_string()
}
