//! Normalization of manufacturer reliability data into a single failure rate
//!
//! Manufacturers publish dangerous failure data in several shapes: split
//! λDU/λDD rates, one combined λ, or only PFD/PFH figures. This module
//! reduces any of them to one λ_total plus a provenance tag so that the
//! channel math never has to care where the number came from.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assumptions::{Assumptions, DemandMode};
use crate::component::ComponentRecord;

/// Where a resolved λ_total came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LambdaProvenance {
    /// Taken directly from λDU+λDD or a combined λ field
    Native,
    /// Derived as 2·PFD/TI in low-demand mode
    DerivedFromPfd,
    /// Taken from the PFH figure in high-demand mode
    DerivedFromPfh,
}

impl LambdaProvenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            LambdaProvenance::Native => "native",
            LambdaProvenance::DerivedFromPfd => "derived_from_pfd",
            LambdaProvenance::DerivedFromPfh => "derived_from_pfh",
        }
    }
}

impl fmt::Display for LambdaProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised when raw data cannot be translated into a λ_total
///
/// Every variant carries the human-readable component context so that a
/// failure can be surfaced next to the offending record.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ConversionError {
    #[error("Unsupported demand mode: {mode}")]
    UnsupportedDemandMode { mode: String },
    #[error("{context}: both λDU and λDD must be provided when using native λ data.")]
    IncompleteNativeSplit { context: String },
    #[error("{context}: λDU/λDD must be non-negative.")]
    NegativeNativeSplit { context: String },
    #[error("{context}: λ_total must be non-negative.")]
    NegativeLambdaTotal { context: String },
    #[error("{context}: PFH data required to derive λ_total for high demand mode.")]
    MissingPfh { context: String },
    #[error("{context}: PFH values must be non-negative (1/h).")]
    NegativePfh { context: String },
    #[error("{context}: PFD data required to derive λ_total for low demand mode.")]
    MissingPfd { context: String },
    #[error("{context}: PFD values must be non-negative (dimensionless).")]
    NegativePfd { context: String },
    #[error(
        "{context}: proof-test interval (TI) must be greater than zero to derive λ_total from PFD."
    )]
    NonPositiveProofTestInterval { context: String },
}

/// Resolve one component record to `(λ_total, provenance)`
///
/// Resolution order, first match wins:
/// 1. native λDU/λDD split (both must be present and non-negative),
/// 2. combined `lambda_total` or legacy `lambda`,
/// 3. demand-mode derivation: PFH as-is for high demand, `2·PFD/TI` for
///    low demand (requires `TI > 0`).
pub fn compute_lambda_total(
    raw: &ComponentRecord,
    demand_mode: DemandMode,
    assumptions: &Assumptions,
) -> Result<(f64, LambdaProvenance), ConversionError> {
    let context = raw.diagnostic_context();

    if raw.lambda_du.is_some() || raw.lambda_dd.is_some() {
        let (lambda_du, lambda_dd) = match (raw.lambda_du, raw.lambda_dd) {
            (Some(du), Some(dd)) => (du, dd),
            _ => return Err(ConversionError::IncompleteNativeSplit { context }),
        };
        if lambda_du < 0.0 || lambda_dd < 0.0 {
            return Err(ConversionError::NegativeNativeSplit { context });
        }
        return Ok((lambda_du + lambda_dd, LambdaProvenance::Native));
    }

    for candidate in [raw.lambda_total, raw.lambda_legacy] {
        if let Some(value) = candidate {
            if value < 0.0 {
                return Err(ConversionError::NegativeLambdaTotal { context });
            }
            return Ok((value, LambdaProvenance::Native));
        }
    }

    match demand_mode {
        DemandMode::HighDemand => {
            let pfh = raw
                .pfh_value()
                .ok_or_else(|| ConversionError::MissingPfh {
                    context: context.clone(),
                })?;
            if pfh < 0.0 {
                return Err(ConversionError::NegativePfh { context });
            }
            Ok((pfh, LambdaProvenance::DerivedFromPfh))
        }
        DemandMode::LowDemand => {
            let pfd = raw
                .pfd_value()
                .ok_or_else(|| ConversionError::MissingPfd {
                    context: context.clone(),
                })?;
            if pfd < 0.0 {
                return Err(ConversionError::NegativePfd { context });
            }
            if assumptions.ti <= 0.0 {
                return Err(ConversionError::NonPositiveProofTestInterval { context });
            }
            Ok((2.0 * pfd / assumptions.ti, LambdaProvenance::DerivedFromPfd))
        }
    }
}
