//! CSV loading for the membership exports.
//!
//! The exports come as one CSV file per unit level and year, in UTF-8 or
//! Windows-1250, delimited by `,` or `;`. `DataLoader` reads a whole
//! directory of them and merges the rows into a single [`RecordSet`].
//!
//! [`RecordSet`]: crate::models::RecordSet

pub mod data_loader;
pub mod dataset;
pub mod error;

pub use data_loader::{read_dataset, DataLoader, LoadSummary};
pub use dataset::{ColumnType, Dataset};
pub use error::LoadError;
