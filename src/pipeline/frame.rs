//! Dense series × date matrix from raw upstream rows.

use std::collections::{BTreeMap, BTreeSet};

use super::SeriesMatrix;
use crate::models::{MetricType, RawObservation};

/// Build a matrix holding every observed series over the union of every
/// observed date. Cells without a matching row stay `None`; a later row for
/// the same cell overwrites an earlier one.
pub fn build_frame(observations: &[RawObservation], metric: MetricType) -> SeriesMatrix {
    // ---
    let dates: BTreeSet<&str> = observations.iter().map(|o| o.date.as_str()).collect();

    let mut matrix: SeriesMatrix = observations
        .iter()
        .map(|o| {
            let row: BTreeMap<String, Option<f64>> =
                dates.iter().map(|d| (d.to_string(), None)).collect();
            (o.series.clone(), row)
        })
        .collect();

    for obs in observations {
        if let Some(row) = matrix.get_mut(&obs.series) {
            row.insert(obs.date.clone(), obs.value_for(metric));
        }
    }

    tracing::debug!(
        "Built {} frame: {} series x {} dates",
        metric,
        matrix.len(),
        dates.len()
    );
    matrix
}
