//! Spreadsheet backup format for rate snapshots
//!
//! A backup is a single-sheet `.xlsx` workbook:
//!
//! | row | content |
//! |-----|---------|
//! | 0 | multilingual title, export time in column 5 |
//! | 1..=4 | one legend row per currency (`EUR`, `1 EUR in/en CHF`) |
//! | 5 | column captions: blank, `EUR`, `USD`, `JPY`, `GBP` |
//! | 6.. | one snapshot per row: timestamp text, then the four rates as numbers |
//!
//! The exporter and the importer both read the layout from this module, in
//! particular [`HEADER_ROWS`].

pub mod export;
pub mod import;

pub use export::{export_snapshots, render_workbook};
pub use import::{import_snapshots, read_snapshots};

/// Currency codes and the quantity each rate is quoted for, in column order.
pub const CURRENCIES: [(&str, u32); 4] = [("EUR", 1), ("USD", 1), ("JPY", 100), ("GBP", 1)];

/// Title row, legend rows and caption row.
pub const HEADER_ROWS: u32 = 1 + CURRENCIES.len() as u32 + 1;

pub const TITLE_ROW: u32 = 0;
pub const LEGEND_FIRST_ROW: u32 = 1;
pub const CAPTION_ROW: u32 = HEADER_ROWS - 1;

pub const TIMESTAMP_COL: u16 = 0;
/// First rate column; EUR, USD, JPY and GBP follow in that order.
pub const FIRST_RATE_COL: u16 = 1;
pub const EXPORTED_AT_COL: u16 = 5;

/// Rendering of the timestamp cell, microsecond precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub const TITLE: &str = "Aktuelle Wechselkurse: Übersicht \n\
                         Cours de change actuels: aperçu \n\
                         Current exchange rates: overview \n\
                         Tassi di cambio attuali: panoramica";

pub const SHEET_NAME: &str = "Rates";

/// Legend text for one currency, e.g. `100 JPY in/en CHF`.
pub fn legend_label(code: &str, units: u32, base_currency: &str) -> String {
    format!("{units} {code} in/en {base_currency}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_constants() {
        assert_eq!(HEADER_ROWS, 6);
        assert_eq!(CAPTION_ROW, 5);
        assert_eq!(
            LEGEND_FIRST_ROW + CURRENCIES.len() as u32,
            CAPTION_ROW,
            "legend rows must end right before the caption row"
        );
    }

    #[test]
    fn test_legend_label() {
        assert_eq!(legend_label("JPY", 100, "CHF"), "100 JPY in/en CHF");
        assert_eq!(legend_label("EUR", 1, "PLN"), "1 EUR in/en PLN");
    }
}
