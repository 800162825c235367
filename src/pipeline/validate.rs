//! Continuity check: all series share one gap-free date axis.

use chrono::{Months, NaiveDate};

use super::{parse_date, SeriesMatrix};
use crate::error::{BridgeError, Result};
use crate::models::Period;

/// Verify that every series carries the same dates as the first one and that
/// those dates form a contiguous run at `period` granularity.
///
/// Dates are not re-bucketed: yearly dates must already be `YYYY`, monthly
/// dates `YYYY-MM-DD`. An empty matrix passes.
pub fn validate(matrix: &SeriesMatrix, period: Period) -> Result<()> {
    // ---
    let Some(reference_row) = matrix.values().next() else {
        return Ok(());
    };
    let reference: Vec<&str> = reference_row.keys().map(String::as_str).collect();

    for (series, row) in matrix {
        if !row.keys().map(String::as_str).eq(reference.iter().copied()) {
            return Err(BridgeError::DateMismatch {
                series: series.clone(),
            });
        }
    }

    let (Some(first), Some(last)) = (reference.first(), reference.last()) else {
        return Ok(());
    };
    let expected = date_range(first, last, period)?;

    if expected != reference {
        tracing::warn!(
            "Date gap for {} data: reference {:?}, expected {:?}",
            period,
            reference,
            expected
        );
        return Err(BridgeError::DateGap {
            expected: expected.len(),
            actual: reference.len(),
        });
    }

    Ok(())
}

/// Every date from `first` to `last` inclusive, one step of `period` apart,
/// formatted the way upstream formats dates for that period.
fn date_range(first: &str, last: &str, period: Period) -> Result<Vec<String>> {
    // ---
    let end = parse_date(last, period)?;
    let mut current = parse_date(first, period)?;
    let step = match period {
        Period::Monthly => Months::new(1),
        Period::Yearly => Months::new(12),
    };

    let mut dates = Vec::new();
    while current <= end {
        dates.push(format_axis_date(current, period));
        current = current
            .checked_add_months(step)
            .ok_or_else(|| BridgeError::InvalidDate {
                date: last.to_string(),
                period: period.to_string(),
            })?;
    }
    Ok(dates)
}

fn format_axis_date(date: NaiveDate, period: Period) -> String {
    match period {
        Period::Monthly => date.format("%Y-%m-%d").to_string(),
        Period::Yearly => date.format("%Y").to_string(),
    }
}
