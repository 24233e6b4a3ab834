use std::path::PathBuf;

use thiserror::Error;

/// Why a dataset could not be loaded. Any of these is fatal for the file:
/// no partial dataset is ever handed to the UI.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// The file is missing or cannot be read.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The table itself is malformed (bad quoting, ragged rows, bad UTF-8).
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A column the explorer depends on is absent from the header.
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    /// Year and month must be integers; they are never defaulted.
    #[error("line {line}: column '{column}' has non-integer value '{value}'")]
    InvalidInteger {
        line: u64,
        column: &'static str,
        value: String,
    },
}
