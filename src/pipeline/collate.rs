//! Collation of a validated matrix into ordered history records.

use chrono::NaiveDate;

use super::{parse_date, SeriesMatrix};
use crate::error::Result;
use crate::models::{History, HistoryRecord, MetricType, Period};

/// Emit one record per series, in lexical series order, dropping series
/// whose values are all null or zero.
///
/// `start`/`last` use `YYYY-MM` for monthly and `YYYY` for yearly data.
pub fn collate(
    matrix: &SeriesMatrix,
    metric: MetricType,
    period: Period,
    entity_code: &str,
) -> Result<Vec<HistoryRecord>> {
    // ---
    let mut records = Vec::with_capacity(matrix.len());

    for (series, row) in matrix {
        let mut dated = row
            .iter()
            .map(|(date, value)| Ok((parse_date(date, period)?, *value)))
            .collect::<Result<Vec<(NaiveDate, Option<f64>)>>>()?;
        dated.sort_by_key(|(date, _)| *date);

        let data: Vec<Option<f64>> = dated.iter().map(|(_, value)| *value).collect();
        if data.iter().all(|value| value.unwrap_or(0.0) == 0.0) {
            tracing::info!(
                ".stripped series {}/{}:{} as all values are null/zero",
                metric,
                period,
                series
            );
            continue;
        }

        let (Some((first, _)), Some((last, _))) = (dated.first(), dated.last()) else {
            continue;
        };

        records.push(HistoryRecord {
            id: format!("{}.{}.{}", entity_code, series, metric),
            network: entity_code.to_string(),
            fuel_tech: series.clone(),
            metric,
            units: metric.units().to_string(),
            history: History {
                start: format_bound(*first, period),
                last: format_bound(*last, period),
                interval: period.interval().to_string(),
                data,
            },
        });
    }

    Ok(records)
}

fn format_bound(date: NaiveDate, period: Period) -> String {
    match period {
        Period::Monthly => date.format("%Y-%m").to_string(),
        Period::Yearly => date.format("%Y").to_string(),
    }
}
