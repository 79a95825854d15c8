use std::path::PathBuf;
use thiserror::Error;

/// Invalid query configuration. Raised before any slot arithmetic runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid operating hours {start}..{end}: need 0 <= start < end <= 24")]
    InvalidHours { start: u8, end: u8 },
    #[error("capacity cap for {location} must be at least 1")]
    ZeroCapacity { location: String },
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Strict-mode normalization failure for a single record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("record {id} at {location}: unparsable datetime {datetime:?}")]
    UnparsableDatetime { location: String, id: i64, datetime: String },
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error at record {record}: {source}")]
    Json {
        record: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column {0:?}")]
    MissingColumn(&'static str),
    #[error("unknown input format {0:?} (expected jsonl, json or csv)")]
    UnknownFormat(String),
}
