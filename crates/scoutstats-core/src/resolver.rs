//! Cascading filter resolution for the hierarchy dropdowns.
//!
//! Option codes are the registration identifiers of the units at the
//! requested level (`110` for a region, `111` for a district, `111.01` for a
//! group, `111.01.001` for a troop). Their ancestors follow from fixed-width
//! truncation, see [`resolve_ancestors`].
//!
//! Everything here is a pure function of its inputs. Dashboard events are
//! folded into a new [`SelectionState`] with [`SelectionState::apply`].

use std::collections::HashSet;

use tracing::debug;

use crate::models::{
    DecodedRecord, FilterOption, HierarchyLevel, RecordSet, Selection, SelectionEvent,
    SelectionState, ALL,
};

/// Troop codes are the first 10 characters of a patrol identifier.
const TROOP_WIDTH: usize = 10;
/// Group codes are the first 6 characters of a troop code.
const GROUP_WIDTH: usize = 6;
/// District codes are the first 3 characters of a group code.
const DISTRICT_WIDTH: usize = 3;
/// Region codes are the first 2 characters of a district code plus `0`.
const REGION_WIDTH: usize = 2;
const REGION_SUFFIX: &str = "0";

fn prefix(s: &str, chars: usize) -> &str {
    match s.char_indices().nth(chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Code of the parent unit implied by `code` at `level`.
fn parent_code(level: HierarchyLevel, code: &str) -> Option<(HierarchyLevel, String)> {
    let parent = level.parent()?;
    let derived = match level {
        HierarchyLevel::Patrol => prefix(code, TROOP_WIDTH).to_string(),
        HierarchyLevel::Troop => prefix(code, GROUP_WIDTH).to_string(),
        HierarchyLevel::Group => prefix(code, DISTRICT_WIDTH).to_string(),
        HierarchyLevel::District => format!("{}{}", prefix(code, REGION_WIDTH), REGION_SUFFIX),
        HierarchyLevel::Region => return None,
    };
    Some((parent, derived))
}

/// Derive the selection implied by picking `code` at `level`.
///
/// The given level's slot is set to `code` and every ancestor slot is derived
/// transitively: troop → group → district → region. Descendant slots stay
/// `ALL`. `ALL` or an empty code yields an unconstrained selection.
pub fn resolve_ancestors(level: HierarchyLevel, code: &str) -> SelectionState {
    let mut state = SelectionState::default();
    if code.is_empty() || code == ALL {
        return state;
    }

    let mut current = Some((level, code.to_string()));
    while let Some((lvl, c)) = current {
        if let Some(slot) = state.slot_mut(lvl) {
            *slot = Selection::code(c.clone());
        }
        current = parent_code(lvl, &c);
    }
    state
}

/// Whether `record` satisfies the selection at `level`.
///
/// Group selections match by containment in the registration identifier;
/// every other level compares the record's derived ancestor code exactly.
fn matches_slot(
    record: &DecodedRecord,
    lineage: &SelectionState,
    level: HierarchyLevel,
    code: &str,
) -> bool {
    match level {
        HierarchyLevel::Group => record.record.registration_id.contains(code),
        _ => lineage.slot(level).and_then(|s| s.as_code()) == Some(code),
    }
}

fn lineage_of(record: &DecodedRecord) -> SelectionState {
    match record.level() {
        Some(level) => resolve_ancestors(level, &record.record.registration_id),
        None => SelectionState::default(),
    }
}

fn matches_levels(
    record: &DecodedRecord,
    selection: &SelectionState,
    levels: &[HierarchyLevel],
) -> bool {
    if let Some(year) = selection.year {
        if record.record.year != year {
            return false;
        }
    }

    let lineage = lineage_of(record);
    levels.iter().all(|&level| {
        match selection.slot(level).and_then(|s| s.as_code()) {
            Some(code) => matches_slot(record, &lineage, level, code),
            None => true,
        }
    })
}

/// Whether `record` falls under every active slot (and the year) of `selection`.
pub fn matches_selection(record: &DecodedRecord, selection: &SelectionState) -> bool {
    matches_levels(record, selection, &SelectionState::SLOTS)
}

/// Dropdown options for `level` given the selections of its ancestors.
///
/// Only records typed for `level` are considered, restricted by every
/// active ancestor slot of `parents` and by its year if set. Entries are
/// deduplicated by `(code, label)` and `ALL` always comes first.
pub fn options(
    records: &RecordSet,
    level: HierarchyLevel,
    parents: &SelectionState,
) -> Vec<FilterOption> {
    let ancestors = level.ancestors();
    let unit_type = level.unit_type();

    let mut seen = HashSet::new();
    let mut result = vec![FilterOption::all()];

    for record in records
        .iter()
        .filter(|r| r.record.unit_type == unit_type)
        .filter(|r| matches_levels(r, parents, &ancestors))
    {
        let option = FilterOption::new(
            record.record.registration_id.clone(),
            record.record.unit_name.clone(),
        );
        if option.is_all() {
            continue;
        }
        if seen.insert((option.code.clone(), option.label.clone())) {
            result.push(option);
        }
    }

    result
}

/// Options for every selectable slot under the current selection.
pub fn all_options(
    records: &RecordSet,
    selection: &SelectionState,
) -> Vec<(HierarchyLevel, Vec<FilterOption>)> {
    SelectionState::SLOTS
        .iter()
        .map(|&level| (level, options(records, level, selection)))
        .collect()
}

/// Drop selections that no longer exist among the valid options.
///
/// Slots are checked outermost first, so a slot is validated against its
/// already reconciled ancestors. Stale slots fall back to `ALL`.
pub fn reconcile(selection: &SelectionState, records: &RecordSet) -> SelectionState {
    let mut result = selection.clone();

    for level in SelectionState::SLOTS {
        let code = match result.slot(level).and_then(|s| s.as_code()) {
            Some(code) => code.to_string(),
            None => continue,
        };

        let valid = options(records, level, &result)
            .iter()
            .any(|option| option.code == code);

        if !valid {
            debug!(level = %level, code = %code, "Stale selection reset to ALL");
            if let Some(slot) = result.slot_mut(level) {
                *slot = Selection::All;
            }
        }
    }

    result
}

impl SelectionState {
    /// Fold a dashboard event into a new, reconciled selection.
    pub fn apply(&self, event: &SelectionEvent, records: &RecordSet) -> SelectionState {
        let next = match event {
            SelectionEvent::YearChanged { year } => SelectionState {
                year: Some(*year),
                ..self.clone()
            },
            SelectionEvent::Selected { level, code } => {
                let mut next = self.clone();
                if let Some(slot) = next.slot_mut(*level) {
                    *slot = Selection::code(code.clone());
                } else {
                    debug!(level = %level, "Level has no selection slot, ignoring");
                }
                next.clear_below(*level);
                next
            }
            SelectionEvent::Derived { level, code } => SelectionState {
                year: self.year,
                ..resolve_ancestors(*level, code)
            },
        };

        reconcile(&next, records)
    }
}
