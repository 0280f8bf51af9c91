//! Core library for scoutstats: membership exports, hierarchy decoding,
//! cascading filters and chart series.
//!
//! ```text
//! CSV files ──► loader ──► UnitRecord ──► decoder ──► RecordSet
//!                                                      │
//!                               resolver (dropdowns) ◄─┤
//!                               stats (charts)       ◄─┘
//! ```

pub mod config;
pub mod decoder;
pub mod loader;
pub mod models;
pub mod resolver;
pub mod stats;
pub mod utils;

pub use config::Config;
pub use decoder::{attach_hierarchy, decode, decode_whole};
pub use loader::{DataLoader, LoadError, LoadSummary};
pub use models::{
    DecodedRecord, FilterOption, HierarchyKey, HierarchyLevel, Measure, MemberCounts, RecordSet,
    Selection, SelectionEvent, SelectionState, UnitRecord, UnitType,
};
pub use resolver::{all_options, options, reconcile, resolve_ancestors};
