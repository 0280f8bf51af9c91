//! Data models for membership statistics.
//!
//! - `UnitRecord`, `DecodedRecord`, `RecordSet`: rows from the exports
//! - `HierarchyKey`, `HierarchyLevel`: the region → patrol hierarchy
//! - `SelectionState`, `SelectionEvent`, `FilterOption`: dashboard query state

pub mod hierarchy;
pub mod record;
pub mod selection;

pub use hierarchy::{HierarchyKey, HierarchyLevel, UNKNOWN};
pub use record::{DecodedRecord, Measure, MemberCounts, RecordSet, UnitRecord, UnitType};
pub use selection::{FilterOption, Selection, SelectionEvent, SelectionState, ALL};
