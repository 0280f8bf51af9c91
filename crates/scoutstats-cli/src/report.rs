//! Assembles and prints the terminal report.

use std::fmt::Write;

use serde::Serialize;
use scoutstats_core::loader::LoadSummary;
use scoutstats_core::stats::{self, TreemapNode, UnitTotal, YearTotal};
use scoutstats_core::utils::{format_count, truncate_string};
use scoutstats_core::{all_options, FilterOption, HierarchyLevel, Measure, RecordSet, SelectionState};

/// Dropdown entries shown per level before eliding the rest.
const MAX_OPTIONS_SHOWN: usize = 12;

/// Widest unit label in the text output.
const LABEL_WIDTH: usize = 32;

#[derive(Debug, Serialize)]
pub struct LevelOptions {
    pub level: HierarchyLevel,
    pub selected: String,
    pub options: Vec<FilterOption>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub summary: LoadSummary,
    pub measure: Measure,
    pub years: (i32, i32),
    pub yearly_totals: Vec<YearTotal>,
    pub selection: SelectionState,
    pub options: Vec<LevelOptions>,
    pub breakdown: Vec<UnitTotal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treemap: Option<Vec<TreemapNode>>,
}

impl Report {
    pub fn build(
        records: &RecordSet,
        summary: LoadSummary,
        selection: SelectionState,
        years: (i32, i32),
        measure: Measure,
        with_treemap: bool,
    ) -> Self {
        let options = all_options(records, &selection)
            .into_iter()
            .map(|(level, options)| LevelOptions {
                level,
                selected: selection
                    .slot(level)
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
                options,
            })
            .collect();

        let treemap = match (with_treemap, selection.year) {
            (true, Some(year)) => Some(stats::treemap(records, year, measure)),
            _ => None,
        };

        Self {
            summary,
            measure,
            years,
            yearly_totals: stats::yearly_totals(records, years.0, years.1, measure),
            options,
            breakdown: stats::breakdown(records, &selection, measure),
            selection,
            treemap,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Loaded {} datasets ({} rows), skipped {} datasets and {} rows",
            self.summary.datasets_merged,
            self.summary.rows_merged,
            self.summary.datasets_skipped,
            self.summary.rows_skipped
        );

        let _ = writeln!(out, "\nMembers over time ({}-{}):", self.years.0, self.years.1);
        for total in &self.yearly_totals {
            let _ = writeln!(out, "  {}  {:>10}", total.year, format_count(total.members));
        }

        let year = self
            .selection
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "all years".to_string());
        let _ = writeln!(out, "\nSelection ({}):", year);
        for level in &self.options {
            let _ = writeln!(out, "  {:<9} {}", level.level.to_string(), level.selected);
        }

        for level in &self.options {
            let _ = writeln!(out, "\n{} options ({}):", level.level, level.options.len() - 1);
            for option in level.options.iter().take(MAX_OPTIONS_SHOWN) {
                let marker = if option.code == level.selected { '*' } else { ' ' };
                let _ = writeln!(
                    out,
                    " {} {:<12} {}",
                    marker,
                    option.code,
                    truncate_string(&option.label, LABEL_WIDTH)
                );
            }
            if level.options.len() > MAX_OPTIONS_SHOWN {
                let _ = writeln!(out, "    ... {} more", level.options.len() - MAX_OPTIONS_SHOWN);
            }
        }

        if !self.breakdown.is_empty() {
            let _ = writeln!(out, "\nBreakdown:");
            for unit in &self.breakdown {
                let _ = writeln!(
                    out,
                    "  {:<12} {:<width$} {:>8}",
                    unit.code,
                    truncate_string(&unit.label, LABEL_WIDTH),
                    format_count(unit.members),
                    width = LABEL_WIDTH
                );
            }
        }

        if let Some(nodes) = &self.treemap {
            let _ = writeln!(out, "\nTreemap:");
            for node in nodes {
                let depth = node.id.matches('/').count();
                let _ = writeln!(
                    out,
                    "  {}{} ({})",
                    "  ".repeat(depth),
                    truncate_string(&node.label, LABEL_WIDTH),
                    format_count(node.value)
                );
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoutstats_core::{MemberCounts, Selection, UnitRecord, UnitType};

    fn records() -> RecordSet {
        let unit = |id: &str, name: &str, unit_type: UnitType, regular: u64| UnitRecord {
            registration_id: id.to_string(),
            year: 2024,
            unit_name: name.to_string(),
            unit_type,
            members: MemberCounts {
                total: regular,
                regular,
                by_age: Default::default(),
            },
        };
        RecordSet::new(vec![
            unit("110", "Praha", UnitType::Region, 0),
            unit("111", "Praha 1", UnitType::District, 0),
            unit("111.01", "Střelka", UnitType::Group, 4),
            unit("111.01.001", "1. oddíl", UnitType::Troop, 1200),
        ])
    }

    #[test]
    fn test_report_text() {
        let selection = SelectionState::for_year(2024).with(HierarchyLevel::Group, Selection::code("111.01"));
        let report = Report::build(
            &records(),
            LoadSummary::default(),
            selection,
            (2024, 2024),
            Measure::Regular,
            true,
        );
        let text = report.to_text();

        assert!(text.contains("2024       1 204"));
        assert!(text.contains("Group     111.01"));
        assert!(text.contains(" * 111.01"));
        assert!(text.contains("1. oddíl"));
        assert!(text.contains("Treemap:"));
    }

    #[test]
    fn test_report_json_omits_treemap_when_not_requested() {
        let report = Report::build(
            &records(),
            LoadSummary::default(),
            SelectionState::for_year(2024),
            (2024, 2024),
            Measure::Regular,
            false,
        );
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("treemap").is_none());
        assert_eq!(json["options"][0]["options"][0]["code"], "ALL");
        assert_eq!(json["yearly_totals"][0]["members"], 1204);
    }
}
