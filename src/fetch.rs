//! Fetch orchestration: energy and emissions pipelines merged into one
//! result bundle.

use std::time::Instant;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use tracing::Instrument;
use uuid::Uuid;

use crate::countries::Entity;
use crate::error::Result;
use crate::models::{HistoryRecord, MetricType, Period, ResultBundle};
use crate::pipeline;
use crate::snapshot::SnapshotWriter;
use crate::upstream::EmberClient;

pub const BUNDLE_VERSION: &str = "4.1";

pub const ATTRIBUTION: &str =
    "Data gratefully sourced from Ember Climate -- see api.ember-energy.org/docs";

/// Seconds east of UTC for `created_at` stamps (+10:00).
const CREATED_AT_OFFSET_SECS: i32 = 10 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Fetcher {
    // ---
    client: EmberClient,
    snapshots: Option<SnapshotWriter>,
}

impl Fetcher {
    // ---
    pub fn new(client: EmberClient, snapshots: Option<SnapshotWriter>) -> Self {
        Self { client, snapshots }
    }

    /// Build the full bundle for `entity`. Energy records come first.
    ///
    /// Both metric types are fetched concurrently; the first failure aborts
    /// the bundle and no partial result is returned.
    pub async fn fetch(&self, entity: &Entity, period: Period) -> Result<ResultBundle> {
        // ---
        let span = tracing::info_span!(
            "fetch",
            run_id = %Uuid::new_v4(),
            code = %entity.iso,
            %period
        );

        async move {
            let started = Instant::now();

            let (energy, emissions) = tokio::try_join!(
                self.fetch_type(entity, MetricType::Energy, period),
                self.fetch_type(entity, MetricType::Emissions, period),
            )?;

            let mut data = energy;
            data.extend(emissions);

            if let Some(snapshots) = &self.snapshots {
                snapshots.write_processed(period, &entity.iso, &data).await;
            }

            tracing::info!(
                "fetched {} records in {:?}",
                data.len(),
                started.elapsed()
            );

            Ok(ResultBundle {
                version: BUNDLE_VERSION.to_string(),
                name: entity.name.clone(),
                network: entity.iso.clone(),
                created_at: created_at(Utc::now()),
                messages: vec![ATTRIBUTION.to_string()],
                data,
            })
        }
        .instrument(span)
        .await
    }

    async fn fetch_type(
        &self,
        entity: &Entity,
        metric: MetricType,
        period: Period,
    ) -> Result<Vec<HistoryRecord>> {
        // ---
        let response = self.client.fetch(&entity.name, metric, period).await?;

        if let Some(snapshots) = &self.snapshots {
            snapshots
                .write_raw(metric, period, &entity.iso, &response.body)
                .await;
        }

        pipeline::run(&response.rows, metric, period, &entity.iso)
    }
}

/// Format `now` in the fixed +10:00 offset, to the second.
pub fn created_at(now: DateTime<Utc>) -> String {
    // ---
    let offset = FixedOffset::east_opt(CREATED_AT_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    now.with_timezone(&offset)
        .format("%Y-%m-%dT%H:%M:%S%:z")
        .to_string()
}
