//! Transform pipeline from raw Ember rows to collated history records.
//!
//! Stages run in order for one metric type:
//! frame → series rename → continuity check → collation.
//! Each stage lives in its own sibling module; this gateway re-exports
//! the pieces other modules use (EMBP).

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{BridgeError, Result};
use crate::models::{HistoryRecord, MetricType, Period, RawObservation};

mod collate;
mod frame;
mod series;
mod validate;

pub use collate::collate;
pub use frame::build_frame;
pub use series::{normalize, verify_rename_table, FuelTech, REQUESTED_SERIES};
pub use validate::validate;

/// Series name → date → value (or null). Every series carries the same
/// date keys. `BTreeMap` keeps iteration lexical and deterministic.
pub type SeriesMatrix = BTreeMap<String, BTreeMap<String, Option<f64>>>;

// ---

/// Run every stage for one metric type.
pub fn run(
    observations: &[RawObservation],
    metric: MetricType,
    period: Period,
    entity_code: &str,
) -> Result<Vec<HistoryRecord>> {
    // ---
    let matrix = build_frame(observations, metric);
    let matrix = normalize(matrix);
    validate(&matrix, period)?;
    collate(&matrix, metric, period, entity_code)
}

/// Parse an upstream date string at the granularity of `period`:
/// `YYYY` for yearly, `YYYY-MM-DD` for monthly.
pub(crate) fn parse_date(date: &str, period: Period) -> Result<NaiveDate> {
    // ---
    let parsed = match period {
        Period::Yearly if date.len() == 4 => date
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
        Period::Yearly => None,
        Period::Monthly => NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
    };

    parsed.ok_or_else(|| BridgeError::InvalidDate {
        date: date.to_string(),
        period: period.to_string(),
    })
}
