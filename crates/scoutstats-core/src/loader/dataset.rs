//! A single loaded CSV file and its conversion into unit records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::LoadError;
use crate::models::{MemberCounts, UnitRecord, UnitType};
use crate::utils::format::truncate_string;

// ============================================================================
// Column names
// ============================================================================

const REGISTRATION_COLUMNS: &[&str] = &["RegistrationNumber", "RegistrationId"];
const YEAR_COLUMNS: &[&str] = &["Year"];
const NAME_COLUMNS: &[&str] = &["UnitName"];
const TYPE_COLUMNS: &[&str] = &["ID_UnitType", "UnitType"];
const REGULAR_COLUMNS: &[&str] = &["RegularMembers"];
const TOTAL_COLUMNS: &[&str] = &["TotalMembers", "Members"];

/// Headers starting with this prefix (and longer than it) are age brackets.
const AGE_BRACKET_PREFIX: &str = "Members";

/// Widest cell shown in a preview.
const PREVIEW_CELL_WIDTH: usize = 24;

/// Inferred type of a column, shown in previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "int"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Text => write!(f, "text"),
        }
    }
}

/// Rows of one CSV file, headers trimmed, cells kept as strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn first_column(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|alias| self.column_index(alias))
    }

    /// Infer each column's type from its non-empty cells.
    pub fn column_types(&self) -> Vec<(String, ColumnType)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let mut cells = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty())
                    .peekable();

                let column_type = if cells.peek().is_none() {
                    ColumnType::Text
                } else {
                    let cells: Vec<&str> = cells.collect();
                    if cells.iter().all(|c| c.parse::<i64>().is_ok()) {
                        ColumnType::Integer
                    } else if cells.iter().all(|c| c.parse::<f64>().is_ok()) {
                        ColumnType::Float
                    } else {
                        ColumnType::Text
                    }
                };
                (name.clone(), column_type)
            })
            .collect()
    }

    /// Column types followed by the first `rows` rows.
    pub fn preview(&self, rows: usize) -> String {
        let mut out = format!("Preview of '{}' ({} rows)\n", self.name, self.rows.len());

        out.push_str("\nColumn Types:\n");
        for (name, column_type) in self.column_types() {
            out.push_str(&format!("  {:<24} {}\n", name, column_type));
        }

        out.push_str("\nPreview:\n");
        let header: Vec<String> = self
            .columns
            .iter()
            .map(|c| truncate_string(c, PREVIEW_CELL_WIDTH))
            .collect();
        out.push_str(&header.join(" | "));
        out.push('\n');
        for row in self.rows.iter().take(rows) {
            let cells: Vec<String> = row
                .iter()
                .map(|c| truncate_string(c, PREVIEW_CELL_WIDTH))
                .collect();
            out.push_str(&cells.join(" | "));
            out.push('\n');
        }
        out
    }

    /// Year encoded at the end of the file name, e.g. `clenove_oddily_2017`.
    pub fn year_from_name(&self) -> Option<i32> {
        self.name
            .split(|c: char| !c.is_ascii_digit())
            .filter(|part| part.len() == 4)
            .last()
            .and_then(|part| part.parse().ok())
    }

    /// Validate every row into a [`UnitRecord`].
    ///
    /// Returns the records and the number of rows skipped for lacking a
    /// usable year. Fails only when the dataset has no registration column
    /// or no year at all.
    pub fn to_records(&self) -> Result<(Vec<UnitRecord>, usize), LoadError> {
        let registration_idx = self
            .first_column(REGISTRATION_COLUMNS)
            .ok_or_else(|| LoadError::missing_column(&self.name, REGISTRATION_COLUMNS[0]))?;

        let year_idx = self.first_column(YEAR_COLUMNS);
        let name_year = self.year_from_name();
        if year_idx.is_none() && name_year.is_none() {
            return Err(LoadError::missing_column(&self.name, YEAR_COLUMNS[0]));
        }

        let name_idx = self.first_column(NAME_COLUMNS);
        let type_idx = self.first_column(TYPE_COLUMNS);
        let regular_idx = self.first_column(REGULAR_COLUMNS);
        let total_idx = self.first_column(TOTAL_COLUMNS);
        let age_columns: Vec<(usize, String)> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.starts_with(AGE_BRACKET_PREFIX) && c.len() > AGE_BRACKET_PREFIX.len())
            .map(|(idx, c)| {
                let label = c[AGE_BRACKET_PREFIX.len()..]
                    .trim_start_matches(|c: char| c == '_' || c == ' ')
                    .to_string();
                (idx, label)
            })
            .collect();

        let mut records = Vec::with_capacity(self.rows.len());
        let mut skipped = 0;

        for (line, row) in self.rows.iter().enumerate() {
            let year = match year_idx {
                Some(idx) => parse_year(&cell(row, Some(idx))),
                None => name_year,
            };
            let Some(year) = year else {
                debug!(dataset = %self.name, line = line + 1, "Row without a usable year, skipping");
                skipped += 1;
                continue;
            };

            let regular = regular_idx.map(|i| parse_count(&cell(row, Some(i)))).unwrap_or(0);
            let total = total_idx
                .map(|i| parse_count(&cell(row, Some(i))))
                .unwrap_or(regular);
            let by_age: BTreeMap<String, u64> = age_columns
                .iter()
                .map(|(idx, label)| (label.clone(), parse_count(&cell(row, Some(*idx)))))
                .collect();

            records.push(UnitRecord {
                registration_id: cell(row, Some(registration_idx)),
                year,
                unit_name: cell(row, name_idx),
                unit_type: UnitType::from_code(&cell(row, type_idx)),
                members: MemberCounts {
                    total,
                    regular,
                    by_age,
                },
            });
        }

        Ok((records, skipped))
    }
}

fn cell(row: &[String], idx: Option<usize>) -> String {
    idx.and_then(|i| row.get(i))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn parse_year(value: &str) -> Option<i32> {
    value
        .parse::<i32>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i32))
}

/// Member counts: empty or unparsable cells are 0, floats truncate, negatives clamp.
fn parse_count(value: &str) -> u64 {
    if let Ok(n) = value.parse::<i64>() {
        return n.max(0) as u64;
    }
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && f > 0.0 => f.trunc() as u64,
        _ => 0,
    }
}
