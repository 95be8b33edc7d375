use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ItemCfError>;

#[derive(Debug, Error)]
pub enum ItemCfError {
    /// A rating line without the expected `user,item,rating[,timestamp]` layout.
    #[error("malformed record at line {line}: expected 3 or 4 fields, found {fields}")]
    MalformedRecord { line: u64, fields: usize },

    /// The rating field is not a finite floating point number.
    #[error("unable to parse rating {value:?} at line {line}")]
    RatingParse { line: u64, value: String },

    /// The line is not valid UTF-8.
    #[error("invalid UTF-8 in record at line {line}")]
    InvalidEncoding { line: u64 },

    /// The ratings source could not be opened or read. Always aborts the run.
    #[error("unable to read ratings from {}: {source}", .path.display())]
    FatalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv reader failed on {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ItemCfError {
    /// Per-record errors may be skipped, everything else terminates the run.
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            ItemCfError::MalformedRecord { .. }
                | ItemCfError::RatingParse { .. }
                | ItemCfError::InvalidEncoding { .. }
        )
    }
}
