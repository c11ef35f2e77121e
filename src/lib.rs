//! # SIL reliability metrics engine
//!
//! Computes IEC 61508 reliability metrics (PFDavg, PFH) for safety
//! functions built from sensor/logic/actuator components, using a
//! beta-factor common-cause model for redundant 1oo2 architectures, and
//! classifies the totals against the SIL bands.
//!
//! The engine is pure and stateless: every function takes explicit inputs
//! (records, ratios, assumptions) and returns new values. Ingestion of
//! component master data, persistence and report rendering are external
//! collaborators; they supply [`component::ComponentRecord`]s and consume
//! [`channel::ChannelMetrics`], [`aggregation::AggregationResult`] and
//! [`verdict::SifVerdict`] values.

use thiserror::Error;

pub mod aggregation;
pub mod assumptions;
pub mod channel;
pub mod component;
pub mod conversions;
pub mod resolver;
pub mod sil;
pub mod verdict;

pub use aggregation::{
    aggregate, partition_resolved, AggregationResult, BucketTotals, Entry, LaneEntries,
    LaneResidual, LinkSubgroup, RatioTable, ResolvedLaneEntry,
};
pub use assumptions::{Assumptions, DemandMode};
pub use channel::{
    calculate_one_out_of_two, calculate_single_channel, ChannelMetrics, DuDdRatio, RatioError,
};
pub use component::{ComponentKind, ComponentRecord};
pub use conversions::{compute_lambda_total, ConversionError, LambdaProvenance};
pub use resolver::{
    resolve_component, resolve_group, EntryDetail, EntryProvenance, ResolvedEntry,
};
pub use sil::{
    classify_sil_from_pfd, classify_sil_from_pfh, normalize_required_sil, requirement_met,
    sil_rank, RequiredSil, SilClass,
};
pub use verdict::{evaluate_safety_function, format_verdict_report, SifVerdict};

/// Engine-level errors
///
/// Conversion errors are local to one component and are collected rather
/// than propagated during aggregation; ratio errors are configuration
/// errors and abort the calculation that hit them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    Ratio(#[from] RatioError),
}

pub type EngineResult<T> = Result<T, EngineError>;
