//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use scoutstats_core::{HierarchyLevel, Measure, SelectionEvent};

/// Membership statistics across years and the region → patrol hierarchy
#[derive(Parser, Debug)]
#[command(name = "scoutstats", version)]
#[command(about = "Membership statistics across years and the organization hierarchy")]
pub struct Args {
    /// Directory with the CSV exports (overrides config and SCOUTSTATS_DATA_DIR)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Year for dropdown options, breakdown and treemap (default: latest in data)
    #[arg(short, long)]
    pub year: Option<i32>,

    /// First year of the yearly totals
    #[arg(long)]
    pub from: Option<i32>,

    /// Last year of the yearly totals
    #[arg(long)]
    pub to: Option<i32>,

    /// Select a unit in a level's dropdown, e.g. `district=111` (repeatable)
    #[arg(short, long = "select", value_name = "LEVEL=CODE", value_parser = parse_level_code)]
    pub selections: Vec<(HierarchyLevel, String)>,

    /// Jump to a unit and derive its ancestors, e.g. `troop=111.01.001`
    #[arg(short, long, value_name = "LEVEL=CODE", value_parser = parse_level_code)]
    pub unit: Option<(HierarchyLevel, String)>,

    /// Member count to sum: regular or total
    #[arg(short, long, value_parser = parse_measure)]
    pub measure: Option<Measure>,

    /// Force the CSV delimiter instead of detecting it per file
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Print column types and leading rows of one dataset (or all) and exit
    #[arg(long, value_name = "DATASET", num_args = 0..=1, default_missing_value = "")]
    pub preview: Option<String>,

    /// Rows shown by --preview
    #[arg(long, default_value_t = 5)]
    pub rows: usize,

    /// Print treemap nodes for the selected year
    #[arg(long)]
    pub treemap: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Store the data directory and year range in the config file
    #[arg(long)]
    pub save_config: bool,
}

impl Args {
    /// Selection events in the order they are applied: the unit jump
    /// first, then each dropdown selection.
    pub fn events(&self) -> Vec<SelectionEvent> {
        let mut events = Vec::new();
        if let Some((level, code)) = &self.unit {
            events.push(SelectionEvent::Derived {
                level: *level,
                code: code.clone(),
            });
        }
        events.extend(self.selections.iter().map(|(level, code)| SelectionEvent::Selected {
            level: *level,
            code: code.clone(),
        }));
        events
    }

    /// `None` when --preview was not given, `Some(None)` for all datasets.
    pub fn preview_key(&self) -> Option<Option<&str>> {
        self.preview
            .as_deref()
            .map(|key| if key.is_empty() { None } else { Some(key) })
    }
}

fn parse_level_code(s: &str) -> Result<(HierarchyLevel, String), String> {
    let (level, code) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LEVEL=CODE, got '{}'", s))?;
    let level = HierarchyLevel::parse(level)
        .ok_or_else(|| format!("unknown level '{}' (region, district, group, troop, patrol)", level))?;
    let code = code.trim();
    if code.is_empty() {
        return Err("code must not be empty".to_string());
    }
    Ok((level, code.to_string()))
}

fn parse_measure(s: &str) -> Result<Measure, String> {
    match s.trim().to_lowercase().as_str() {
        "regular" => Ok(Measure::Regular),
        "total" => Ok(Measure::Total),
        other => Err(format!("unknown measure '{}' (regular, total)", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_code() {
        assert_eq!(
            parse_level_code("district=111"),
            Ok((HierarchyLevel::District, "111".to_string()))
        );
        assert_eq!(
            parse_level_code("oddil= 111.01.001 "),
            Ok((HierarchyLevel::Troop, "111.01.001".to_string()))
        );
        assert!(parse_level_code("district").is_err());
        assert!(parse_level_code("county=1").is_err());
        assert!(parse_level_code("group=").is_err());
    }

    #[test]
    fn test_parse_measure() {
        assert_eq!(parse_measure("Total"), Ok(Measure::Total));
        assert!(parse_measure("average").is_err());
    }

    #[test]
    fn test_events_order() {
        let args = Args::parse_from([
            "scoutstats",
            "--select",
            "group=111.02",
            "--unit",
            "troop=111.01.001",
        ]);
        assert_eq!(
            args.events(),
            vec![
                SelectionEvent::Derived {
                    level: HierarchyLevel::Troop,
                    code: "111.01.001".to_string()
                },
                SelectionEvent::Selected {
                    level: HierarchyLevel::Group,
                    code: "111.02".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_preview_key() {
        let args = Args::parse_from(["scoutstats"]);
        assert_eq!(args.preview_key(), None);

        let args = Args::parse_from(["scoutstats", "--preview"]);
        assert_eq!(args.preview_key(), Some(None));

        let args = Args::parse_from(["scoutstats", "--preview", "oddily_2024"]);
        assert_eq!(args.preview_key(), Some(Some("oddily_2024")));
    }
}
