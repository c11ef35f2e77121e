//! Partitioning and summation of a safety function's lanes
//!
//! A safety function carries three lanes of entries (sensors, logic,
//! actuators). Entries tagged with the same link id form one cross-lane
//! subgroup; untagged entries stay in their lane's residual bucket. Buckets
//! only shape the breakdown shown to the user: sums inside a bucket are
//! plain arithmetic, 1oo2 math happens per entry during resolution, and the
//! grand total is the same for every possible partition.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::assumptions::{Assumptions, DemandMode};
use crate::channel::DuDdRatio;
use crate::component::{ComponentKind, ComponentRecord};
use crate::conversions::ConversionError;
use crate::resolver::{resolve_component, resolve_group, EntryDetail, ResolvedEntry};
use crate::{EngineError, EngineResult};

/// One entry in a lane: a plain component or a redundant 1oo2 pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "architecture")]
pub enum Entry {
    /// Single-channel component
    #[serde(rename = "1oo1")]
    Component(ComponentRecord),
    /// Redundant pair evaluated with the beta-factor model
    #[serde(rename = "1oo2")]
    Group {
        members: Vec<ComponentRecord>,
        link_color: Option<String>,
        link_group_id: Option<String>,
    },
}

impl Entry {
    /// Convenience constructor for a plain component entry
    pub fn component(record: ComponentRecord) -> Self {
        Entry::Component(record)
    }

    /// Convenience constructor for an untagged 1oo2 pair
    pub fn group(members: Vec<ComponentRecord>) -> Self {
        Entry::Group {
            members,
            link_color: None,
            link_group_id: None,
        }
    }

    /// Raw link colour carried by this entry, if any
    pub fn link_color(&self) -> Option<&str> {
        match self {
            Entry::Component(record) => record.link_color.as_deref(),
            Entry::Group { link_color, .. } => link_color.as_deref(),
        }
    }

    /// Raw link group id carried by this entry, if any
    pub fn link_group_id(&self) -> Option<&str> {
        match self {
            Entry::Component(record) => record.link_group_id.as_deref(),
            Entry::Group { link_group_id, .. } => link_group_id.as_deref(),
        }
    }

    /// Effective subgroup key after normalization
    ///
    /// An explicit link id wins; otherwise a bare link colour still groups
    /// entries that share it within this aggregation pass. `None` means the
    /// entry is always a lane residual.
    pub fn effective_link_id(&self) -> Option<String> {
        if let Some(id) = self.link_group_id().and_then(normalize_link_group_id) {
            return Some(id);
        }
        self.link_color()
            .and_then(sanitize_link_color)
            .map(|color| format!("color:{}", color.trim_start_matches('#')))
    }
}

/// Normalize a raw link group id so that ids assembled from different
/// fragments compare equal; empty ids disappear
pub fn normalize_link_group_id(raw: &str) -> Option<String> {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Canonical form of a link colour: `#` plus 3 or 6 lowercase hex digits
pub fn sanitize_link_color(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let hex = trimmed.strip_prefix('#')?;
    if (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("#{}", hex.to_lowercase()))
    } else {
        None
    }
}

/// Compose the canonical subgroup id for a colour within a row context
pub fn group_id_for_color(row_uid: &str, color: &str) -> Option<String> {
    let sanitized = sanitize_link_color(color)?;
    Some(format!(
        "{}:{}",
        row_uid.trim().to_lowercase(),
        sanitized.trim_start_matches('#')
    ))
}

/// One lane of a safety function with its entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneEntries {
    pub lane: ComponentKind,
    pub entries: Vec<Entry>,
}

impl LaneEntries {
    pub fn new(lane: ComponentKind, entries: Vec<Entry>) -> Self {
        Self { lane, entries }
    }
}

/// Per-lane DU/DD ratio configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioTable {
    ratios: IndexMap<ComponentKind, DuDdRatio>,
}

impl RatioTable {
    pub fn new(ratios: IndexMap<ComponentKind, DuDdRatio>) -> Self {
        Self { ratios }
    }

    /// Ratio pair for a lane; unconfigured lanes fall back to 60/40
    pub fn ratio(&self, lane: ComponentKind) -> DuDdRatio {
        self.ratios.get(&lane).copied().unwrap_or_default()
    }

    pub fn set(&mut self, lane: ComponentKind, ratio: DuDdRatio) {
        self.ratios.insert(lane, ratio);
    }
}

impl Default for RatioTable {
    /// Typical split: sensors 70/30, logic and actuators 60/40
    fn default() -> Self {
        let mut ratios = IndexMap::new();
        ratios.insert(ComponentKind::Sensor, DuDdRatio::new(0.7, 0.3));
        ratios.insert(ComponentKind::Logic, DuDdRatio::new(0.6, 0.4));
        ratios.insert(ComponentKind::Actuator, DuDdRatio::new(0.6, 0.4));
        Self { ratios }
    }
}

/// Plain arithmetic sums over a set of resolved entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketTotals {
    pub pfd: f64,
    pub pfh: f64,
    pub lambda_du: f64,
    pub lambda_dd: f64,
    /// Number of entries summed into this bucket
    pub count: usize,
    /// Audit record of every summed entry, in input order
    pub details: Vec<EntryDetail>,
}

impl BucketTotals {
    fn add(&mut self, resolved: &ResolvedEntry) {
        self.pfd += resolved.metrics.pfd;
        self.pfh += resolved.metrics.pfh;
        self.lambda_du += resolved.metrics.lambda_du;
        self.lambda_dd += resolved.metrics.lambda_dd;
        self.count += 1;
        self.details.push(resolved.detail.clone());
    }
}

/// Cross-lane subgroup of entries sharing one link id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSubgroup {
    /// Normalized link id that formed this subgroup
    pub group_id: String,
    /// Display colour, first sanitized colour seen among the members
    pub color: Option<String>,
    /// Display names of the lanes the members came from, deduplicated
    pub lanes: Vec<String>,
    #[serde(flatten)]
    pub totals: BucketTotals,
}

/// Residual bucket of one lane's untagged entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneResidual {
    pub lane: ComponentKind,
    #[serde(flatten)]
    pub totals: BucketTotals,
}

/// Outcome of one aggregation pass: grand total plus traceable breakdown
///
/// A report structure only; nothing downstream feeds it back into further
/// calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// Sum over every resolved entry, independent of the partition
    pub total: BucketTotals,
    /// Link subgroups in first-seen order
    pub subgroups: Vec<LinkSubgroup>,
    /// Residual buckets in lane order
    pub lane_residuals: Vec<LaneResidual>,
    /// Conversion failures of skipped entries; never abort the pass
    pub errors: Vec<ConversionError>,
}

/// A resolved entry together with its partition keys
///
/// The intermediate between resolution (step one of an aggregation pass)
/// and partitioning. `link_id` is already normalized; `None` pins the
/// entry to its lane's residual bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLaneEntry {
    pub lane: ComponentKind,
    pub link_id: Option<String>,
    pub link_color: Option<String>,
    pub resolved: ResolvedEntry,
}

struct SubgroupAcc {
    color: Option<String>,
    lanes: Vec<String>,
    totals: BucketTotals,
}

/// Resolve, partition and sum all lanes of one safety function
///
/// Entries that fail conversion are reported in `errors` and excluded from
/// every sum. An invalid DU/DD ratio configuration aborts the whole pass,
/// since no entry of the affected lane has a sensible split.
pub fn aggregate(
    lanes: &[LaneEntries],
    ratios: &RatioTable,
    demand_mode: DemandMode,
    assumptions: &Assumptions,
) -> EngineResult<AggregationResult> {
    let mut resolved_entries = Vec::new();
    let mut errors = Vec::new();

    for lane in lanes {
        let ratio = ratios.ratio(lane.lane);
        for entry in &lane.entries {
            match resolve_entry(entry, ratio, demand_mode, assumptions) {
                Ok(resolved) => resolved_entries.push(ResolvedLaneEntry {
                    lane: lane.lane,
                    link_id: entry.effective_link_id(),
                    link_color: entry.link_color().and_then(sanitize_link_color),
                    resolved,
                }),
                Err(EngineError::Conversion(error)) => {
                    warn!(lane = %lane.lane, error = %error, "skipping component");
                    errors.push(error);
                }
                Err(error) => return Err(error),
            }
        }
    }

    let mut result = partition_resolved(&resolved_entries);
    result.errors = errors;
    Ok(result)
}

/// Partition resolved entries into buckets and sum them
///
/// Entries sharing a link id form one subgroup regardless of lane; the
/// rest fall into per-lane residuals. Sums are plain arithmetic — any
/// 1oo2 math already happened during resolution — so the grand total is
/// independent of the partition.
pub fn partition_resolved(entries: &[ResolvedLaneEntry]) -> AggregationResult {
    let mut total = BucketTotals::default();
    let mut subgroups: IndexMap<String, SubgroupAcc> = IndexMap::new();
    let mut residuals: IndexMap<ComponentKind, BucketTotals> = IndexMap::new();

    for entry in entries {
        total.add(&entry.resolved);

        match &entry.link_id {
            Some(group_id) => {
                let acc = subgroups
                    .entry(group_id.clone())
                    .or_insert_with(|| SubgroupAcc {
                        color: None,
                        lanes: Vec::new(),
                        totals: BucketTotals::default(),
                    });
                if acc.color.is_none() {
                    acc.color = entry.link_color.clone();
                }
                let lane_name = entry.lane.display_name().to_string();
                if !acc.lanes.contains(&lane_name) {
                    acc.lanes.push(lane_name);
                }
                acc.totals.add(&entry.resolved);
            }
            None => {
                residuals.entry(entry.lane).or_default().add(&entry.resolved);
            }
        }
    }

    AggregationResult {
        total,
        subgroups: subgroups
            .into_iter()
            .map(|(group_id, acc)| LinkSubgroup {
                group_id,
                color: acc.color,
                lanes: acc.lanes,
                totals: acc.totals,
            })
            .collect(),
        lane_residuals: residuals
            .into_iter()
            .map(|(lane, totals)| LaneResidual { lane, totals })
            .collect(),
        errors: Vec::new(),
    }
}

fn resolve_entry(
    entry: &Entry,
    ratio: DuDdRatio,
    demand_mode: DemandMode,
    assumptions: &Assumptions,
) -> EngineResult<ResolvedEntry> {
    match entry {
        Entry::Component(record) => resolve_component(record, ratio, demand_mode, assumptions),
        Entry::Group { members, .. } => resolve_group(members, ratio, demand_mode, assumptions),
    }
}
