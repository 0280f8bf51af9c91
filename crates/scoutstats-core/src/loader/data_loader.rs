use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::dataset::Dataset;
use super::error::LoadError;
use crate::models::RecordSet;

/// Characters inspected when guessing the delimiter.
const DELIMITER_SAMPLE_CHARS: usize = 1024;

const CSV_EXTENSION: &str = "csv";
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Counts from one `normalize_and_merge` pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub datasets_merged: usize,
    pub datasets_skipped: usize,
    pub rows_merged: usize,
    pub rows_skipped: usize,
}

/// Loads every CSV export in a directory.
pub struct DataLoader {
    directory: PathBuf,
    datasets: BTreeMap<String, Dataset>,
}

impl DataLoader {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            datasets: BTreeMap::new(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn datasets(&self) -> &BTreeMap<String, Dataset> {
        &self.datasets
    }

    pub fn dataset(&self, key: &str) -> Option<&Dataset> {
        self.datasets.get(key)
    }

    /// Load every `*.csv` file in the directory, keyed by file stem.
    ///
    /// A file that cannot be read or parsed is logged and skipped. Only a
    /// missing or unreadable directory is an error.
    pub fn load_all_csvs(
        &mut self,
        delimiter: Option<u8>,
    ) -> Result<&BTreeMap<String, Dataset>, LoadError> {
        if !self.directory.is_dir() {
            return Err(LoadError::DirectoryNotFound(self.directory.clone()));
        }

        let entries = std::fs::read_dir(&self.directory)
            .map_err(|e| LoadError::io(&self.directory, e))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(CSV_EXTENSION))
            })
            .collect();
        paths.sort();

        for path in paths {
            let Some(key) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };

            match read_dataset(&path, &key, delimiter) {
                Ok(dataset) => {
                    info!(file = %path.display(), rows = dataset.rows.len(), "Loaded dataset");
                    self.datasets.insert(key, dataset);
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Failed to load dataset, skipping");
                }
            }
        }

        Ok(&self.datasets)
    }

    /// Column types and leading rows of one dataset, or of all of them.
    pub fn preview(&self, key: Option<&str>, rows: usize) -> String {
        match key {
            Some(key) => match self.datasets.get(key) {
                Some(dataset) => dataset.preview(rows),
                None => format!("No dataset found with key: {}, so preview cannot be made.\n", key),
            },
            None => {
                let mut out = String::from("Preview of all datasets:\n");
                for (name, dataset) in &self.datasets {
                    out.push_str(&format!("\n--- {} ---\n", name));
                    out.push_str(&dataset.preview(rows));
                }
                out
            }
        }
    }

    /// Validate every dataset into unit records and merge them into one set.
    ///
    /// Datasets lacking the columns needed for a record are skipped with a
    /// warning rather than failing the merge.
    pub fn normalize_and_merge(&self) -> (RecordSet, LoadSummary) {
        let mut summary = LoadSummary::default();
        let mut merged = Vec::new();

        for (name, dataset) in &self.datasets {
            match dataset.to_records() {
                Ok((records, skipped)) => {
                    debug!(dataset = %name, records = records.len(), skipped, "Normalized dataset");
                    summary.datasets_merged += 1;
                    summary.rows_merged += records.len();
                    summary.rows_skipped += skipped;
                    merged.extend(records);
                }
                Err(e) => {
                    warn!(dataset = %name, error = %e, "Dataset cannot be merged, skipping");
                    summary.datasets_skipped += 1;
                }
            }
        }

        info!(
            datasets = summary.datasets_merged,
            rows = summary.rows_merged,
            "Merged datasets"
        );
        (RecordSet::new(merged), summary)
    }
}

/// Read and parse one CSV file.
pub fn read_dataset(path: &Path, name: &str, delimiter: Option<u8>) -> Result<Dataset, LoadError> {
    let bytes = std::fs::read(path).map_err(|e| LoadError::io(path, e))?;
    let (text, encoding) = decode_text(&bytes);
    debug!(file = %path.display(), encoding, "Detected encoding");

    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&text));
    parse_dataset(name, &text, delimiter)
}

/// UTF-8 when valid (BOM stripped), otherwise Windows-1250.
fn decode_text(bytes: &[u8]) -> (Cow<'_, str>, &'static str) {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => (Cow::Borrowed(text), "UTF-8"),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1250.decode(bytes);
            (text, encoding_rs::WINDOWS_1250.name())
        }
    }
}

/// `,` if the leading sample contains one, otherwise `;`.
fn detect_delimiter(text: &str) -> u8 {
    let sample = match text.char_indices().nth(DELIMITER_SAMPLE_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    };
    if sample.contains(',') {
        b','
    } else {
        b';'
    }
}

fn parse_dataset(name: &str, text: &str, delimiter: u8) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        row.resize(columns.len().max(row.len()), String::new());
        rows.push(row);
    }

    Ok(Dataset {
        name: name.to_string(),
        columns,
        rows,
    })
}
