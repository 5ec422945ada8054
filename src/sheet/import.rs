use super::{CURRENCIES, FIRST_RATE_COL, HEADER_ROWS, TIMESTAMP_COL};
use crate::core::error::{RateError, Result};
use crate::core::snapshot::{NewSnapshot, RateSnapshot, Rates};
use crate::core::store::SnapshotStore;
use calamine::{Data, Range, Reader, open_workbook_auto};
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::{debug, info};

const TIMESTAMP_INPUT_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parses every data row of the first worksheet in `source`.
///
/// Rows before [`HEADER_ROWS`] are skipped without being looked at. Parsing
/// stops at the first malformed row.
///
/// # Errors
///
/// Returns `RateError::Io` if the file can't be opened as a workbook and
/// `RateError::Format` for the first row that doesn't parse.
pub fn read_snapshots(source: &Path) -> Result<Vec<NewSnapshot>> {
    let mut workbook = open_workbook_auto(source).map_err(|e| {
        RateError::io(format!("failed to open workbook {}", source.display()), e)
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| RateError::Io {
            message: format!("workbook {} has no worksheets", source.display()),
            source: None,
        })?
        .map_err(|e| RateError::io("failed to read worksheet", e))?;

    let Some((last_row, _)) = range.end() else {
        debug!("Worksheet is empty");
        return Ok(Vec::new());
    };

    let records = (HEADER_ROWS..=last_row)
        .map(|row| parse_row(&range, row))
        .collect::<Result<Vec<_>>>()?;
    debug!(rows = records.len(), "Parsed workbook rows");
    Ok(records)
}

/// Reads `source` and stores every row in one batch, keeping the file's timestamps.
pub async fn import_snapshots(
    store: &dyn SnapshotStore,
    source: &Path,
) -> Result<Vec<RateSnapshot>> {
    let path = source.to_path_buf();
    let records = tokio::task::spawn_blocking(move || read_snapshots(&path))
        .await
        .map_err(|e| RateError::io("workbook reader task failed", e))??;

    let stored = store.append_many(records).await?;
    info!(
        rows = stored.len(),
        "Imported snapshots from {}",
        source.display()
    );
    Ok(stored)
}

fn parse_row(range: &Range<Data>, row: u32) -> Result<NewSnapshot> {
    // Reported row numbers are 1-based like in a spreadsheet application.
    let line = row + 1;
    let cell = |col: u16| range.get_value((row, u32::from(col)));

    let timestamp =
        parse_timestamp(cell(TIMESTAMP_COL)).map_err(|msg| RateError::format(line, msg))?;

    let mut rates = [0.0; 4];
    for (offset, (code, _)) in CURRENCIES.iter().enumerate() {
        rates[offset] = parse_rate(cell(FIRST_RATE_COL + offset as u16))
            .map_err(|msg| RateError::format(line, format!("{code} {msg}")))?;
    }
    let [eur, usd, jpy, gbp] = rates;

    Ok(NewSnapshot {
        rates: Rates { eur, usd, jpy, gbp },
        timestamp,
    })
}

fn parse_timestamp(cell: Option<&Data>) -> Result<NaiveDateTime, String> {
    match cell {
        None | Some(Data::Empty) => Err("timestamp cell is empty".to_string()),
        Some(Data::String(text)) | Some(Data::DateTimeIso(text)) => parse_timestamp_text(text),
        Some(Data::DateTime(value)) => value
            .as_datetime()
            .ok_or_else(|| format!("invalid spreadsheet date {value:?}")),
        Some(other) => Err(format!("expected a timestamp, found {other:?}")),
    }
}

pub(crate) fn parse_timestamp_text(text: &str) -> Result<NaiveDateTime, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("timestamp cell is empty".to_string());
    }
    TIMESTAMP_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .ok_or_else(|| format!("unrecognised timestamp {text:?}"))
}

fn parse_rate(cell: Option<&Data>) -> Result<f64, String> {
    let value = parse_rate_value(cell)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("rate is not a finite number: {value}"))
    }
}

fn parse_rate_value(cell: Option<&Data>) -> Result<f64, String> {
    match cell {
        None | Some(Data::Empty) => Err("rate cell is empty".to_string()),
        Some(Data::Float(value)) => Ok(*value),
        Some(Data::Int(value)) => Ok(*value as f64),
        Some(Data::String(text)) if text.trim().is_empty() => {
            Err("rate cell is empty".to_string())
        }
        Some(Data::String(text)) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("rate is not a number: {text:?}")),
        Some(other) => Err(format!("expected a number, found {other:?}")),
    }
}
