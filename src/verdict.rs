//! Safety-function evaluation: aggregation, classification and verdict
//!
//! Ties the engine together for one safety function: sum the lanes, pick
//! the classifier matching the demand mode, normalize the required SIL and
//! decide whether the requirement is met.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregation::{aggregate, AggregationResult, LaneEntries, RatioTable};
use crate::assumptions::{Assumptions, DemandMode};
use crate::sil::{
    classify_sil_from_pfd, classify_sil_from_pfh, normalize_required_sil, requirement_met,
    RequiredSil, SilClass,
};
use crate::EngineResult;

/// Verdict for one safety function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SifVerdict {
    /// Grand total and breakdown the verdict is based on
    pub aggregation: AggregationResult,
    /// Demand mode the classification used
    pub demand_mode: DemandMode,
    /// The classified sum: total PFDavg in low demand, total PFH in high
    pub metric: f64,
    /// SIL level classified from the metric
    pub calculated: SilClass,
    /// Required SIL level after normalization
    pub required: SilClass,
    /// Whether the calculated level satisfies the requirement
    pub met: bool,
    /// When this verdict was computed
    pub calculated_at: DateTime<Utc>,
}

/// Evaluate one safety function end to end
///
/// High demand classifies the summed PFH, low demand the summed PFDavg.
/// Conversion failures of single components are carried inside
/// `aggregation.errors`; only a ratio configuration error fails the call.
pub fn evaluate_safety_function(
    lanes: &[LaneEntries],
    ratios: &RatioTable,
    demand_mode: DemandMode,
    required_sil: impl Into<RequiredSil>,
    assumptions: &Assumptions,
) -> EngineResult<SifVerdict> {
    let aggregation = aggregate(lanes, ratios, demand_mode, assumptions)?;

    let (metric, calculated) = match demand_mode {
        DemandMode::HighDemand => (
            aggregation.total.pfh,
            classify_sil_from_pfh(aggregation.total.pfh),
        ),
        DemandMode::LowDemand => (
            aggregation.total.pfd,
            classify_sil_from_pfd(aggregation.total.pfd),
        ),
    };
    let required = normalize_required_sil(required_sil);

    Ok(SifVerdict {
        aggregation,
        demand_mode,
        metric,
        calculated,
        required,
        met: requirement_met(calculated, required),
        calculated_at: Utc::now(),
    })
}

/// Render a plain-text summary of a verdict and its breakdown
pub fn format_verdict_report(name: &str, verdict: &SifVerdict) -> String {
    let mut output = String::new();

    output.push_str(&format!("SIL Verification: {}\n", name));
    output.push_str(&format!("{}\n", "=".repeat(50)));
    let metric_line = match verdict.demand_mode {
        DemandMode::HighDemand => format!("PFHsum = {:.3e} 1/h", verdict.metric),
        DemandMode::LowDemand => format!("PFDsum = {:.6} (–)", verdict.metric),
    };
    output.push_str(&format!("Demand mode: {}\n", verdict.demand_mode));
    output.push_str(&format!("{}\n", metric_line));
    output.push_str(&format!("Required:   {}\n", verdict.required));
    output.push_str(&format!("Calculated: {}\n", verdict.calculated));
    output.push_str(&format!(
        "Requirement met: {}\n",
        if verdict.met { "YES" } else { "NO" }
    ));

    if !verdict.aggregation.subgroups.is_empty() {
        output.push_str(&format!("\nLink subgroups:\n{}\n", "-".repeat(50)));
        for subgroup in &verdict.aggregation.subgroups {
            output.push_str(&format!(
                "{} ({} members, lanes: {})\n",
                subgroup.group_id,
                subgroup.totals.count,
                subgroup.lanes.join(", ")
            ));
            output.push_str(&format!(
                "  PFD = {:.6}, PFH = {:.3e} 1/h\n",
                subgroup.totals.pfd, subgroup.totals.pfh
            ));
        }
    }

    if !verdict.aggregation.lane_residuals.is_empty() {
        output.push_str(&format!("\nLane residuals:\n{}\n", "-".repeat(50)));
        for residual in &verdict.aggregation.lane_residuals {
            output.push_str(&format!(
                "{}: {} entries, PFD = {:.6}, PFH = {:.3e} 1/h\n",
                residual.lane.display_name(),
                residual.totals.count,
                residual.totals.pfd,
                residual.totals.pfh
            ));
        }
    }

    if !verdict.aggregation.errors.is_empty() {
        output.push_str(&format!(
            "\nSkipped components: {}\n",
            verdict.aggregation.errors.len()
        ));
        for error in &verdict.aggregation.errors {
            output.push_str(&format!("  - {}\n", error));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::Entry;
    use crate::component::{ComponentKind, ComponentRecord};

    fn assumptions() -> Assumptions {
        Assumptions::new(8760.0, 8.0, 0.1, 0.02)
    }

    fn pfh_component(code: &str, pfh: f64) -> ComponentRecord {
        let mut rec = ComponentRecord::named(code);
        rec.pfh = Some(pfh);
        rec
    }

    fn single_lane(pfh: f64) -> Vec<LaneEntries> {
        vec![LaneEntries::new(
            ComponentKind::Sensor,
            vec![Entry::component(pfh_component("S1", pfh))],
        )]
    }

    #[test]
    fn test_high_demand_classifies_pfh_sum() {
        // λ = 1e-7, DU share 0.7 → PFH = 7e-8 → SIL 3
        let verdict = evaluate_safety_function(
            &single_lane(1.0e-7),
            &RatioTable::default(),
            DemandMode::HighDemand,
            "SIL 3",
            &assumptions(),
        )
        .unwrap();

        assert!((verdict.metric - 7.0e-8).abs() < 1e-20);
        assert_eq!(verdict.calculated, SilClass::Sil3);
        assert_eq!(verdict.required, SilClass::Sil3);
        assert!(verdict.met);
    }

    #[test]
    fn test_requirement_not_met_when_below_required_rank() {
        let verdict = evaluate_safety_function(
            &single_lane(1.0e-7),
            &RatioTable::default(),
            DemandMode::HighDemand,
            4u8,
            &assumptions(),
        )
        .unwrap();
        assert_eq!(verdict.calculated, SilClass::Sil3);
        assert!(!verdict.met);
    }

    #[test]
    fn test_out_of_band_total_never_meets_requirement() {
        // Nothing to sum: PFH = 0 classifies as n.a.
        let verdict = evaluate_safety_function(
            &[],
            &RatioTable::default(),
            DemandMode::HighDemand,
            "n.a.",
            &assumptions(),
        )
        .unwrap();
        assert_eq!(verdict.calculated, SilClass::NotApplicable);
        assert!(!verdict.met);
    }

    #[test]
    fn test_report_contains_breakdown() {
        let mut rec = pfh_component("S1", 1.0e-7);
        rec.link_group_id = Some("row:abc123".to_string());
        let lanes = vec![LaneEntries::new(
            ComponentKind::Sensor,
            vec![
                Entry::component(rec),
                Entry::component(ComponentRecord::named("BROKEN")),
            ],
        )];

        let verdict = evaluate_safety_function(
            &lanes,
            &RatioTable::default(),
            DemandMode::HighDemand,
            2u8,
            &assumptions(),
        )
        .unwrap();
        let report = format_verdict_report("SIF-01", &verdict);

        assert!(report.contains("SIL Verification: SIF-01"));
        assert!(report.contains("row:abc123"));
        assert!(report.contains("Skipped components: 1"));
        assert!(report.contains("BROKEN"));
    }
}
