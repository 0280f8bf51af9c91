//! Chart-ready series computed from a record set.
//!
//! - [`yearly_totals`]: members per year (line chart)
//! - [`breakdown`]: members per unit one level below the selection (bar chart)
//! - [`treemap`]: nested nodes by whole-code prefixes (treemap / sunburst)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{HierarchyLevel, Measure, RecordSet, SelectionState};
use crate::resolver::matches_selection;

/// Id and label of the treemap root.
pub const TREEMAP_ROOT: &str = "all";

const PATH_SEPARATOR: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct YearTotal {
    pub year: i32,
    pub members: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UnitTotal {
    pub code: String,
    pub label: String,
    pub members: u64,
}

/// One node of the treemap. Values of inner nodes are the sums of their leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TreemapNode {
    pub id: String,
    pub parent: Option<String>,
    pub label: String,
    pub value: u64,
}

/// Sum of `measure` per year within `from..=to`, ascending by year.
pub fn yearly_totals(records: &RecordSet, from: i32, to: i32, measure: Measure) -> Vec<YearTotal> {
    let mut totals: BTreeMap<i32, u64> = BTreeMap::new();
    for record in records.iter().filter(|r| (from..=to).contains(&r.record.year)) {
        *totals.entry(record.record.year).or_default() += measure.of(&record.record.members);
    }
    totals
        .into_iter()
        .map(|(year, members)| YearTotal { year, members })
        .collect()
}

/// Records under every active slot of `selection` (and its year, if set).
pub fn filter_by_selection(records: &RecordSet, selection: &SelectionState) -> RecordSet {
    records.filtered(|r| matches_selection(r, selection))
}

/// Members per unit one level below the most specific selection.
///
/// With nothing selected the breakdown is by region. A troop selection
/// breaks down into patrols. Sorted by members, largest first.
pub fn breakdown(records: &RecordSet, selection: &SelectionState, measure: Measure) -> Vec<UnitTotal> {
    let level = match selection.most_specific() {
        Some((level, _)) => match level.child() {
            Some(child) => child,
            None => return Vec::new(),
        },
        None => HierarchyLevel::Region,
    };
    let unit_type = level.unit_type();

    let mut totals: BTreeMap<String, UnitTotal> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|r| r.record.unit_type == unit_type)
        .filter(|r| matches_selection(r, selection))
    {
        let entry = totals
            .entry(record.record.registration_id.clone())
            .or_insert_with(|| UnitTotal {
                code: record.record.registration_id.clone(),
                label: record.record.unit_name.clone(),
                members: 0,
            });
        entry.members += measure.of(&record.record.members);
    }

    let mut result: Vec<UnitTotal> = totals.into_values().collect();
    result.sort_by(|a, b| b.members.cmp(&a.members).then_with(|| a.code.cmp(&b.code)));
    result
}

/// Treemap nodes for one year.
///
/// Records with a zero measure, of other years, or belonging to the
/// headquarters or special units are left out. Records nest under
/// [`TREEMAP_ROOT`] by their whole-code key; leaves carry the unit name.
/// Nodes are ordered by id, so parents precede their children.
pub fn treemap(records: &RecordSet, year: i32, measure: Measure) -> Vec<TreemapNode> {
    let mut nodes: BTreeMap<String, TreemapNode> = BTreeMap::new();

    for record in records.iter().filter(|r| {
        r.record.year == year
            && !r.record.unit_type.is_outside_hierarchy()
            && measure.of(&r.record.members) > 0
    }) {
        let value = measure.of(&record.record.members);
        let path = record.whole_key.path();

        let root = nodes
            .entry(TREEMAP_ROOT.to_string())
            .or_insert_with(|| TreemapNode {
                id: TREEMAP_ROOT.to_string(),
                parent: None,
                label: TREEMAP_ROOT.to_string(),
                value: 0,
            });
        root.value += value;

        let mut parent_id = TREEMAP_ROOT.to_string();
        for (depth, segment) in path.iter().enumerate() {
            let id = format!("{}{}{}", parent_id, PATH_SEPARATOR, segment);
            let is_leaf = depth == path.len() - 1;
            let node = nodes.entry(id.clone()).or_insert_with(|| TreemapNode {
                id: id.clone(),
                parent: Some(parent_id.clone()),
                label: if is_leaf {
                    record.record.unit_name.clone()
                } else {
                    segment.to_string()
                },
                value: 0,
            });
            node.value += value;
            parent_id = id;
        }
    }

    nodes.into_values().collect()
}
