use super::{
    CAPTION_ROW, CURRENCIES, EXPORTED_AT_COL, FIRST_RATE_COL, HEADER_ROWS, LEGEND_FIRST_ROW,
    SHEET_NAME, TIMESTAMP_COL, TIMESTAMP_FORMAT, TITLE, TITLE_ROW, legend_label,
};
use crate::core::error::{RateError, Result};
use crate::core::snapshot::{RateSnapshot, capture_time};
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Builds the workbook bytes for `snapshots`, which must already be in id order.
pub fn render_workbook(
    snapshots: &[RateSnapshot],
    base_currency: &str,
    exported_at: NaiveDateTime,
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    worksheet.set_column_width(TIMESTAMP_COL, 28)?;
    worksheet.set_column_width(FIRST_RATE_COL, 18)?;

    let wrap = Format::new().set_text_wrap();
    worksheet.write_string_with_format(TITLE_ROW, TIMESTAMP_COL, TITLE, &wrap)?;
    worksheet.write_string(
        TITLE_ROW,
        EXPORTED_AT_COL,
        format!("Exported: {}", exported_at.format(TIMESTAMP_FORMAT)),
    )?;

    for (offset, (code, units)) in CURRENCIES.iter().enumerate() {
        let row = LEGEND_FIRST_ROW + offset as u32;
        worksheet.write_string(row, TIMESTAMP_COL, *code)?;
        worksheet.write_string(row, FIRST_RATE_COL, legend_label(code, *units, base_currency))?;
    }

    // Column 0 of the caption row stays blank.
    for (offset, (code, _)) in CURRENCIES.iter().enumerate() {
        worksheet.write_string(CAPTION_ROW, FIRST_RATE_COL + offset as u16, *code)?;
    }

    for (index, snapshot) in snapshots.iter().enumerate() {
        let row = HEADER_ROWS + index as u32;
        worksheet.write_string(
            row,
            TIMESTAMP_COL,
            snapshot.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        )?;
        for (offset, rate) in snapshot.rates.as_array().into_iter().enumerate() {
            worksheet.write_number(row, FIRST_RATE_COL + offset as u16, rate)?;
        }
    }

    workbook.save_to_buffer()
}

/// Writes `snapshots` to `destination` and returns the number of data rows.
///
/// The workbook is written to a temporary file next to `destination` and
/// renamed over it once complete, so readers see either the previous file or
/// the full new one.
///
/// # Errors
///
/// Returns `RateError::Io` if the workbook can't be rendered, written or moved
/// into place. `destination` is untouched in that case.
pub fn export_snapshots(
    snapshots: &[RateSnapshot],
    destination: &Path,
    base_currency: &str,
) -> Result<usize> {
    let buffer = render_workbook(snapshots, base_currency, capture_time())
        .map_err(|e| RateError::io("failed to render workbook", e))?;
    debug!(bytes = buffer.len(), "Rendered workbook");

    let dir = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| {
        RateError::io(
            format!("failed to create temporary file in {}", dir.display()),
            e,
        )
    })?;
    tmp.write_all(&buffer)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| RateError::io("failed to write workbook", e))?;
    tmp.persist(destination).map_err(|e| {
        RateError::io(
            format!("failed to move workbook to {}", destination.display()),
            e.error,
        )
    })?;

    info!(
        rows = snapshots.len(),
        "Exported snapshots to {}",
        destination.display()
    );
    Ok(snapshots.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::Rates;
    use calamine::{Data, Reader, open_workbook_auto};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn snapshot(id: i64, eur: f64) -> RateSnapshot {
        RateSnapshot {
            id,
            rates: Rates::new(eur, 0.88, 0.0067, 1.08),
            timestamp: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_micro_opt(10, 15, id as u32, 250_000)
                .unwrap(),
        }
    }

    fn text(value: Option<&Data>) -> String {
        match value {
            Some(Data::String(s)) => s.clone(),
            other => panic!("Expected a string cell, got {other:?}"),
        }
    }

    #[test]
    fn test_export_writes_header_then_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rates.xlsx");

        let written = export_snapshots(&[snapshot(1, 0.93), snapshot(2, 0.94)], &path, "CHF").unwrap();
        assert_eq!(written, 2);

        let mut workbook = open_workbook_auto(&path).unwrap();
        let range = workbook.worksheet_range_at(0).unwrap().unwrap();

        assert!(text(range.get_value((0, 0))).contains("Current exchange rates: overview"));
        assert!(text(range.get_value((0, 5))).starts_with("Exported: "));
        assert_eq!(text(range.get_value((1, 0))), "EUR");
        assert_eq!(text(range.get_value((1, 1))), "1 EUR in/en CHF");
        assert_eq!(text(range.get_value((3, 0))), "JPY");
        assert_eq!(text(range.get_value((3, 1))), "100 JPY in/en CHF");
        assert_eq!(text(range.get_value((4, 1))), "1 GBP in/en CHF");
        assert_eq!(text(range.get_value((5, 1))), "EUR");
        assert_eq!(text(range.get_value((5, 4))), "GBP");

        assert_eq!(
            text(range.get_value((6, 0))),
            "2024-05-01 10:15:01.250000"
        );
        assert_eq!(range.get_value((6, 1)), Some(&Data::Float(0.93)));
        assert_eq!(range.get_value((7, 1)), Some(&Data::Float(0.94)));
        assert_eq!(range.get_value((7, 3)), Some(&Data::Float(0.0067)));
        assert_eq!(range.end().map(|(row, _)| row), Some(7));
    }

    #[test]
    fn test_export_replaces_existing_file_without_leftovers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rates.xlsx");
        std::fs::write(&path, b"previous contents").unwrap();

        export_snapshots(&[snapshot(1, 0.93)], &path, "CHF").unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temporary file must be renamed away");
        assert!(open_workbook_auto(&path).is_ok());
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("rates.xlsx");

        let err = export_snapshots(&[snapshot(1, 0.93)], &path, "CHF").unwrap_err();
        assert!(matches!(err, RateError::Io { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_history_has_only_header() {
        let exported_at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let buffer = render_workbook(&[], "CHF", exported_at).unwrap();
        assert!(!buffer.is_empty());

        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        std::fs::write(&path, buffer).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        let range = workbook.worksheet_range_at(0).unwrap().unwrap();
        assert_eq!(range.end().map(|(row, _)| row), Some(HEADER_ROWS - 1));
    }
}
