use super::ui;
use crate::core::snapshot::RateSnapshot;
use crate::sheet::{CURRENCIES, TIMESTAMP_FORMAT};
use comfy_table::Cell;

/// Renders snapshots as a table, one row per snapshot in the given order.
pub fn snapshots_table(snapshots: &[RateSnapshot], base_currency: &str) -> String {
    let mut table = ui::new_styled_table();

    let mut header = vec![ui::header_cell("#"), ui::header_cell("Captured")];
    header.extend(
        CURRENCIES
            .iter()
            .map(|(code, units)| ui::header_cell(&format!("{units} {code}"))),
    );
    table.set_header(header);

    for snapshot in snapshots {
        let mut row = vec![
            Cell::new(snapshot.id),
            Cell::new(snapshot.timestamp.format(TIMESTAMP_FORMAT)),
        ];
        row.extend(snapshot.rates.as_array().into_iter().map(ui::rate_cell));
        table.add_row(row);
    }

    format!(
        "{}\n\n{}",
        ui::style_text(&format!("Exchange rates in {base_currency}"), ui::StyleType::Title),
        table
    )
}

pub fn empty_message() -> String {
    ui::style_text("No snapshots recorded yet", ui::StyleType::Subtle)
}
