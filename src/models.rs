//! Data models for the Ember bridge: request dimensions, upstream rows and
//! the normalized response payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

// ---

/// Which Ember dataset a series belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Energy,
    Emissions,
}

impl MetricType {
    // ---
    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Energy => "energy",
            MetricType::Emissions => "emissions",
        }
    }

    /// Units label attached to every history record of this type.
    pub fn units(self) -> &'static str {
        match self {
            MetricType::Energy => "TWh",
            MetricType::Emissions => "MtCO2e",
        }
    }

    /// Path segment of the upstream endpoint serving this dataset.
    pub fn endpoint(self) -> &'static str {
        match self {
            MetricType::Energy => "electricity-generation",
            MetricType::Emissions => "power-sector-emissions",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        match s {
            "energy" => Ok(MetricType::Energy),
            "emissions" => Ok(MetricType::Emissions),
            other => Err(BridgeError::InvalidMetricType(other.to_string())),
        }
    }
}

/// Temporal granularity of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Monthly,
    Yearly,
}

impl Period {
    // ---
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
        }
    }

    pub fn interval(self) -> &'static str {
        match self {
            Period::Monthly => "1M",
            Period::Yearly => "1Y",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        match s {
            "monthly" => Ok(Period::Monthly),
            "yearly" => Ok(Period::Yearly),
            other => Err(BridgeError::InvalidPeriod(other.to_string())),
        }
    }
}

/// One upstream data point, as returned in the `data` array of an Ember
/// response. Fields we do not use are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawObservation {
    // ---
    pub series: String,
    pub date: String,
    #[serde(default)]
    pub generation_twh: Option<f64>,
    #[serde(default)]
    pub emissions_mtco2: Option<f64>,
}

impl RawObservation {
    /// Value field relevant to `metric`.
    pub fn value_for(&self, metric: MetricType) -> Option<f64> {
        match metric {
            MetricType::Energy => self.generation_twh,
            MetricType::Emissions => self.emissions_mtco2,
        }
    }
}

/// Envelope of an Ember API response.
#[derive(Debug, Deserialize)]
pub struct UpstreamPage {
    pub data: Vec<RawObservation>,
}

/// Time axis and values of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub start: String,
    pub last: String,
    pub interval: String,
    pub data: Vec<Option<f64>>,
}

/// One non-empty series of one metric type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    // ---
    pub id: String,
    pub network: String,
    pub fuel_tech: String,
    #[serde(rename = "type")]
    pub metric: MetricType,
    pub units: String,
    pub history: History,
}

/// Full payload returned by `/v4/ember/{code}/{period}.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBundle {
    // ---
    pub version: String,
    pub name: String,
    pub network: String,
    pub created_at: String,
    pub messages: Vec<String>,
    pub data: Vec<HistoryRecord>,
}
