//! Canonical fuel-tech identifiers and the upstream label rename table.

use std::str::FromStr;

use super::SeriesMatrix;

/// Upstream series labels requested from Ember, in request order.
pub const REQUESTED_SERIES: [&str; 10] = [
    "Bioenergy",
    "Coal",
    "Gas",
    "Hydro",
    "Nuclear",
    "Other fossil",
    "Solar",
    "Wind",
    "Net imports",
    "Demand",
];

/// Canonical fuel-tech a known upstream label maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuelTech {
    Bioenergy,
    Coal,
    Demand,
    Gas,
    Hydro,
    Nuclear,
    Oil,
    Solar,
    Wind,
    Import,
}

impl FuelTech {
    pub const ALL: [FuelTech; 10] = [
        FuelTech::Bioenergy,
        FuelTech::Coal,
        FuelTech::Demand,
        FuelTech::Gas,
        FuelTech::Hydro,
        FuelTech::Nuclear,
        FuelTech::Oil,
        FuelTech::Solar,
        FuelTech::Wind,
        FuelTech::Import,
    ];

    pub fn id(self) -> &'static str {
        // ---
        match self {
            FuelTech::Bioenergy => "bioenergy",
            FuelTech::Coal => "coal",
            FuelTech::Demand => "demand",
            FuelTech::Gas => "gas",
            FuelTech::Hydro => "hydro",
            FuelTech::Nuclear => "nuclear",
            FuelTech::Oil => "oil",
            FuelTech::Solar => "solar",
            FuelTech::Wind => "wind",
            FuelTech::Import => "import",
        }
    }

    /// Label Ember uses for this fuel-tech.
    pub fn upstream_label(self) -> &'static str {
        // ---
        match self {
            FuelTech::Bioenergy => "Bioenergy",
            FuelTech::Coal => "Coal",
            FuelTech::Demand => "Demand",
            FuelTech::Gas => "Gas",
            FuelTech::Hydro => "Hydro",
            FuelTech::Nuclear => "Nuclear",
            FuelTech::Oil => "Other fossil",
            FuelTech::Solar => "Solar",
            FuelTech::Wind => "Wind",
            FuelTech::Import => "Net imports",
        }
    }
}

impl FromStr for FuelTech {
    type Err = ();

    /// Parse an upstream label (not a canonical id).
    fn from_str(label: &str) -> Result<Self, Self::Err> {
        FuelTech::ALL
            .into_iter()
            .find(|ft| ft.upstream_label() == label)
            .ok_or(())
    }
}

/// Canonical name for an upstream label; unknown labels pass through.
pub fn canonical_name(label: &str) -> String {
    match label.parse::<FuelTech>() {
        Ok(ft) => ft.id().to_string(),
        Err(()) => label.to_string(),
    }
}

/// Rename the series keys of `matrix`. Date maps and values are untouched.
pub fn normalize(matrix: SeriesMatrix) -> SeriesMatrix {
    // ---
    matrix
        .into_iter()
        .map(|(label, row)| (canonical_name(&label), row))
        .collect()
}

/// Check that every requested upstream label has a canonical mapping.
///
/// Called once at startup; returns the labels lacking a mapping.
pub fn verify_rename_table() -> Result<(), Vec<&'static str>> {
    // ---
    let missing: Vec<&'static str> = REQUESTED_SERIES
        .into_iter()
        .filter(|label| label.parse::<FuelTech>().is_err())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}
