//! Rate snapshot data model

use crate::core::error::{RateError, Result};
use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

/// The four exchange rates of one observation, quoted against the base currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    pub eur: f64,
    pub usd: f64,
    pub jpy: f64,
    pub gbp: f64,
}

impl Rates {
    pub fn new(eur: f64, usd: f64, jpy: f64, gbp: f64) -> Self {
        Self { eur, usd, jpy, gbp }
    }

    /// Rates in spreadsheet column order.
    pub fn as_array(&self) -> [f64; 4] {
        [self.eur, self.usd, self.jpy, self.gbp]
    }

    fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("eur", self.eur),
            ("usd", self.usd),
            ("jpy", self.jpy),
            ("gbp", self.gbp),
        ]
    }
}

/// Caller-supplied rates where any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatesInput {
    pub eur: Option<f64>,
    pub usd: Option<f64>,
    pub jpy: Option<f64>,
    pub gbp: Option<f64>,
}

impl RatesInput {
    /// Checks that all four rates are present and finite.
    ///
    /// # Errors
    ///
    /// Returns `RateError::Validation` naming every missing or non-finite field.
    pub fn validate(&self) -> Result<Rates> {
        match (self.eur, self.usd, self.jpy, self.gbp) {
            (Some(eur), Some(usd), Some(jpy), Some(gbp)) => {
                let rates = Rates { eur, usd, jpy, gbp };
                let invalid: Vec<&str> = rates
                    .named()
                    .into_iter()
                    .filter(|(_, value)| !value.is_finite())
                    .map(|(name, _)| name)
                    .collect();
                if invalid.is_empty() {
                    Ok(rates)
                } else {
                    Err(RateError::Validation(format!(
                        "rates must be finite numbers: {}",
                        invalid.join(", ")
                    )))
                }
            }
            _ => {
                let missing: Vec<&str> = [
                    ("eur", self.eur),
                    ("usd", self.usd),
                    ("jpy", self.jpy),
                    ("gbp", self.gbp),
                ]
                .into_iter()
                .filter(|(_, value)| value.is_none())
                .map(|(name, _)| name)
                .collect();
                Err(RateError::Validation(format!(
                    "missing rate fields: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

impl From<Rates> for RatesInput {
    fn from(rates: Rates) -> Self {
        Self {
            eur: Some(rates.eur),
            usd: Some(rates.usd),
            jpy: Some(rates.jpy),
            gbp: Some(rates.gbp),
        }
    }
}

/// A persisted snapshot. Never mutated after insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    pub id: i64,
    pub rates: Rates,
    pub timestamp: NaiveDateTime,
}

/// A snapshot waiting to be inserted with an explicit timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSnapshot {
    pub rates: Rates,
    pub timestamp: NaiveDateTime,
}

impl NewSnapshot {
    /// Stamps `rates` with the current local time.
    pub fn captured_now(rates: Rates) -> Self {
        Self {
            rates,
            timestamp: capture_time(),
        }
    }
}

/// Current local time truncated to microseconds, the precision kept by exports.
pub fn capture_time() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}

/// JSON shape returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotView {
    pub eur: f64,
    pub usd: f64,
    pub jpy: f64,
    pub gbp: f64,
    pub date: NaiveDateTime,
}

impl From<&RateSnapshot> for SnapshotView {
    fn from(snapshot: &RateSnapshot) -> Self {
        Self {
            eur: snapshot.rates.eur,
            usd: snapshot.rates.usd,
            jpy: snapshot.rates.jpy,
            gbp: snapshot.rates.gbp,
            date: snapshot.timestamp,
        }
    }
}
