//! Per-entry metrics resolution
//!
//! Bridges raw component records and the channel math: a plain entry is a
//! 1oo1 channel, a redundant entry is a 1oo2 pair whose members are each
//! normalized on their own before the beta-factor math runs on the pair.
//! Conversion failures are returned as values so that one bad record never
//! aborts the aggregation of the remaining entries.

use serde::{Deserialize, Serialize};

use crate::assumptions::{Assumptions, DemandMode};
use crate::channel::{
    calculate_one_out_of_two, calculate_single_channel, ChannelMetrics, DuDdRatio,
};
use crate::component::ComponentRecord;
use crate::conversions::{compute_lambda_total, LambdaProvenance};
use crate::EngineResult;

/// Separator used when labelling a redundant pair ("A1 ∥ A2")
pub const GROUP_LABEL_SEPARATOR: &str = " ∥ ";

/// Audit record kept for every resolved entry (and every group member)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDetail {
    /// Display label of the entry or member
    pub label: String,
    /// Resolved combined failure rate (1/h)
    pub lambda_total: f64,
    /// Dangerous-undetected failure rate (1/h)
    pub lambda_du: f64,
    /// Dangerous-detected failure rate (1/h)
    pub lambda_dd: f64,
    /// DU ratio that produced the split
    pub ratio_du: f64,
    /// DD ratio that produced the split
    pub ratio_dd: f64,
    /// PFDavg contribution
    pub pfd: f64,
    /// PFH contribution (1/h)
    pub pfh: f64,
    /// TI/2 + MTTR under the active assumptions
    pub low_demand_factor: f64,
}

impl EntryDetail {
    fn from_metrics(
        label: &str,
        metrics: &ChannelMetrics,
        ratio: DuDdRatio,
        assumptions: &Assumptions,
    ) -> Self {
        Self {
            label: label.to_string(),
            lambda_total: metrics.lambda_total,
            lambda_du: metrics.lambda_du,
            lambda_dd: metrics.lambda_dd,
            ratio_du: ratio.du,
            ratio_dd: ratio.dd,
            pfd: metrics.pfd,
            pfh: metrics.pfh,
            low_demand_factor: assumptions.low_demand_factor(),
        }
    }
}

/// Provenance of the λ data behind one resolved entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntryProvenance {
    /// Single component with one provenance tag
    Single(LambdaProvenance),
    /// Redundant pair, one `(label, provenance)` per member
    PerMember(Vec<(String, LambdaProvenance)>),
}

/// Fully resolved metrics plus audit data for one lane entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    /// Channel metrics this entry contributes to its bucket
    pub metrics: ChannelMetrics,
    /// Where the underlying λ data came from
    pub provenance: EntryProvenance,
    /// One-line plain-text summary for tooltips and logs
    pub summary: String,
    /// Audit record for the entry as a whole
    pub detail: EntryDetail,
    /// Per-member audit records; empty for a plain component
    pub member_details: Vec<EntryDetail>,
}

/// Resolve a single (1oo1) component record
pub fn resolve_component(
    raw: &ComponentRecord,
    ratio: DuDdRatio,
    demand_mode: DemandMode,
    assumptions: &Assumptions,
) -> EngineResult<ResolvedEntry> {
    let (lambda_total, provenance) = compute_lambda_total(raw, demand_mode, assumptions)?;
    let metrics = calculate_single_channel(lambda_total, ratio, assumptions)?;
    let label = raw.label();
    let detail = EntryDetail::from_metrics(label, &metrics, ratio, assumptions);
    let summary = format!(
        "{}: PFDavg = {:.6}, PFH = {:.3e} 1/h (λ {})",
        label, metrics.pfd, metrics.pfh, provenance
    );

    Ok(ResolvedEntry {
        metrics,
        provenance: EntryProvenance::Single(provenance),
        summary,
        detail,
        member_details: Vec::new(),
    })
}

/// Resolve a redundant 1oo2 pair of member records
///
/// Each member's λ is normalized independently and tracked with its own
/// provenance; the pair then goes through the beta-factor model as one
/// architecture. Member details are computed as if each member were a
/// 1oo1 channel, which is what audit views display next to the group.
pub fn resolve_group(
    members: &[ComponentRecord],
    ratio: DuDdRatio,
    demand_mode: DemandMode,
    assumptions: &Assumptions,
) -> EngineResult<ResolvedEntry> {
    let mut lambdas = Vec::with_capacity(members.len());
    let mut provenances = Vec::with_capacity(members.len());
    let mut member_details = Vec::with_capacity(members.len());

    for member in members {
        let (lambda_total, provenance) = compute_lambda_total(member, demand_mode, assumptions)?;
        let member_metrics = calculate_single_channel(lambda_total, ratio, assumptions)?;
        member_details.push(EntryDetail::from_metrics(
            member.label(),
            &member_metrics,
            ratio,
            assumptions,
        ));
        provenances.push((member.label().to_string(), provenance));
        lambdas.push(lambda_total);
    }

    let metrics = calculate_one_out_of_two(&lambdas, ratio, assumptions)?;
    let label = group_label(members);
    let detail = EntryDetail::from_metrics(&label, &metrics, ratio, assumptions);
    let summary = format!(
        "{} (1oo2): PFDavg = {:.6}, PFH = {:.3e} 1/h",
        label, metrics.pfd, metrics.pfh
    );

    Ok(ResolvedEntry {
        metrics,
        provenance: EntryProvenance::PerMember(provenances),
        summary,
        detail,
        member_details,
    })
}

/// Display label for a redundant pair: member labels joined with " ∥ "
pub fn group_label(members: &[ComponentRecord]) -> String {
    members
        .iter()
        .map(|m| m.label().to_string())
        .collect::<Vec<_>>()
        .join(GROUP_LABEL_SEPARATOR)
}
