//! Component master data as seen by the engine
//!
//! Reliability data arrives from ingestion as loosely-typed mappings with
//! several historical key aliases (`lambda` vs `lambda_total`, `pfd` vs
//! `pfd_avg`). The engine resolves those aliases exactly once, here, into a
//! typed record; the resolution *order* between aliases is part of the
//! numeric contract and lives in [`crate::conversions`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a component within a safety function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Sensor,
    Logic,
    Actuator,
}

impl ComponentKind {
    /// Short token used in raw records ("sensor" | "logic" | "actuator")
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Sensor => "sensor",
            ComponentKind::Logic => "logic",
            ComponentKind::Actuator => "actuator",
        }
    }

    /// Human-readable lane heading used in breakdown reports
    pub fn display_name(&self) -> &'static str {
        match self {
            ComponentKind::Sensor => "Sensors / Inputs",
            ComponentKind::Logic => "Logic",
            ComponentKind::Actuator => "Outputs / Actuators",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One component record with manufacturer reliability data
///
/// Every field is optional; which combination is present decides how the
/// failure rate is derived (see [`crate::conversions::compute_lambda_total`]).
/// Records are owned by the caller and read-only to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentRecord {
    /// Manufacturer or PDM code, preferred identification
    pub code: Option<String>,
    /// Descriptive name, second choice for identification
    pub name: Option<String>,
    /// Free-form title, last identification fallback
    pub title: Option<String>,
    /// Lane this component belongs to
    pub kind: Option<ComponentKind>,
    /// Data source hint carried into diagnostics (e.g. "datasheet")
    pub source: Option<String>,
    /// Dangerous-undetected failure rate (1/h)
    pub lambda_du: Option<f64>,
    /// Dangerous-detected failure rate (1/h)
    pub lambda_dd: Option<f64>,
    /// Combined dangerous failure rate (1/h)
    pub lambda_total: Option<f64>,
    /// Legacy combined failure rate key, serialized as plain "lambda"
    #[serde(rename = "lambda")]
    pub lambda_legacy: Option<f64>,
    /// Average probability of failure on demand
    pub pfd: Option<f64>,
    /// Alias key for PFDavg, lower priority than `pfd`
    pub pfd_avg: Option<f64>,
    /// Probability of dangerous failure per hour (1/h)
    pub pfh: Option<f64>,
    /// Alias key for PFH, lower priority than `pfh`
    pub pfh_avg: Option<f64>,
    /// Display colour of the cross-lane link this entry belongs to
    pub link_color: Option<String>,
    /// Identifier of the cross-lane link subgroup, raw (un-normalized)
    pub link_group_id: Option<String>,
}

impl ComponentRecord {
    /// Record with only identification set, reliability data filled later
    pub fn named(code: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            ..Self::default()
        }
    }

    /// Preferred human-readable label: code, then name, then title,
    /// else a generic placeholder
    pub fn label(&self) -> &str {
        for candidate in [&self.code, &self.name, &self.title] {
            if let Some(value) = candidate {
                if !value.trim().is_empty() {
                    return value;
                }
            }
        }
        "component"
    }

    /// Label plus the data-source hint, used in conversion diagnostics
    pub fn diagnostic_context(&self) -> String {
        let hint = self
            .source
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.kind.map(|k| k.to_string()));
        match hint {
            Some(hint) => format!("{} (source: {})", self.label(), hint),
            None => self.label().to_string(),
        }
    }

    /// PFD after alias resolution: `pfd` wins over `pfd_avg`
    pub fn pfd_value(&self) -> Option<f64> {
        self.pfd.or(self.pfd_avg)
    }

    /// PFH after alias resolution: `pfh` wins over `pfh_avg`
    pub fn pfh_value(&self) -> Option<f64> {
        self.pfh.or(self.pfh_avg)
    }
}
