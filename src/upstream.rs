//! Client for the Ember energy-statistics API.
//!
//! One request per (entity, metric type, period). The raw body is returned
//! alongside the decoded rows so callers can snapshot it for debugging.

use reqwest::Client;

use crate::error::Result;
use crate::models::{MetricType, Period, RawObservation, UpstreamPage};
use crate::pipeline::REQUESTED_SERIES;

/// Raw body and decoded rows of one upstream response.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub body: String,
    pub rows: Vec<RawObservation>,
}

#[derive(Debug, Clone)]
pub struct EmberClient {
    // ---
    client: Client,
    base_url: String,
    api_key: String,
}

impl EmberClient {
    // ---
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Endpoint URL for a metric type and period.
    pub fn url(&self, metric: MetricType, period: Period) -> String {
        format!("{}/v1/{}/{}", self.base_url, metric.endpoint(), period)
    }

    /// Fetch every requested series for `entity_name`.
    ///
    /// Fails on transport errors, non-2xx statuses and bodies that are not
    /// an Ember `{"data": [...]}` envelope.
    pub async fn fetch(
        &self,
        entity_name: &str,
        metric: MetricType,
        period: Period,
    ) -> Result<UpstreamResponse> {
        // ---
        let url = self.url(metric, period);
        let series = REQUESTED_SERIES.join(",");
        tracing::info!("fetch {}/{} data for {} from {}", metric, period, entity_name, url);

        let body = self
            .client
            .get(&url)
            .query(&[
                ("entity", entity_name),
                ("series", series.as_str()),
                ("include_all_dates_value_range", "false"),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let page: UpstreamPage = serde_json::from_str(&body)?;
        tracing::debug!(
            "{}/{} for {}: {} rows ({} bytes)",
            metric,
            period,
            entity_name,
            page.data.len(),
            body.len()
        );

        Ok(UpstreamResponse {
            body,
            rows: page.data,
        })
    }
}
