//! Global calculation assumptions and demand-mode selection
//!
//! The assumptions capture the proof-test interval, the mean time to repair
//! and the two common-cause factors of the IEC 61508 beta-factor model.
//! They are created once per calculation context and never mutated while a
//! computation is running; callers that change assumptions recompute.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::conversions::ConversionError;

/// Global calculation assumptions expressed in hours and fractions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    /// Proof-test interval TI in hours
    pub ti: f64,
    /// Mean time to repair in hours
    pub mttr: f64,
    /// Common-cause share for dangerous undetected failures (0.0-1.0)
    pub beta: f64,
    /// Common-cause share for dangerous detected failures (0.0-1.0)
    pub beta_d: f64,
}

impl Assumptions {
    /// Create a new set of assumptions
    pub fn new(ti: f64, mttr: f64, beta: f64, beta_d: f64) -> Self {
        Self {
            ti,
            mttr,
            beta,
            beta_d,
        }
    }

    /// Exposure factor used for dangerous-undetected contributions in
    /// low-demand mode: TI/2 + MTTR
    pub fn low_demand_factor(&self) -> f64 {
        self.ti / 2.0 + self.mttr
    }
}

impl Default for Assumptions {
    /// Typical process-industry defaults: annual proof test, 8 h repair,
    /// beta = 10 %, beta_D = 2 %
    fn default() -> Self {
        Self {
            ti: 8760.0,
            mttr: 8.0,
            beta: 0.1,
            beta_d: 0.02,
        }
    }
}

/// Demand mode of a safety function per IEC 61508
///
/// Low demand classifies against PFDavg, high demand (and continuous
/// operation) against PFH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandMode {
    LowDemand,
    HighDemand,
}

impl DemandMode {
    /// Canonical token for this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandMode::LowDemand => "low_demand",
            DemandMode::HighDemand => "high_demand",
        }
    }

    /// Interpret a free-form UI label such as "High demand" or
    /// "Low demand". Any label containing "high" selects high demand.
    pub fn from_label(label: &str) -> Self {
        if label.to_lowercase().contains("high") {
            DemandMode::HighDemand
        } else {
            DemandMode::LowDemand
        }
    }
}

impl fmt::Display for DemandMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemandMode {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "low_demand" => Ok(DemandMode::LowDemand),
            "high_demand" => Ok(DemandMode::HighDemand),
            other => Err(ConversionError::UnsupportedDemandMode {
                mode: other.to_string(),
            }),
        }
    }
}
