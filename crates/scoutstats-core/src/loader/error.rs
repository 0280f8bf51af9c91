use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Data directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset '{dataset}' has no '{column}' column")]
    MissingColumn { dataset: String, column: String },
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn missing_column(dataset: &str, column: &str) -> Self {
        LoadError::MissingColumn {
            dataset: dataset.to_string(),
            column: column.to_string(),
        }
    }
}
