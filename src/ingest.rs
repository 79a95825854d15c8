use crate::error::IngestError;
use crate::parser::RawRecord;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

const REQUIRED_COLUMNS: [&str; 3] = ["location", "id", "datetime"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    JsonLines,
    JsonArray,
    Csv,
}

impl InputFormat {
    pub fn parse(s: &str) -> Result<Self, IngestError> {
        match s.to_ascii_lowercase().as_str() {
            "jsonl" | "ndjson" => Ok(InputFormat::JsonLines),
            "json" => Ok(InputFormat::JsonArray),
            "csv" => Ok(InputFormat::Csv),
            other => Err(IngestError::UnknownFormat(other.to_string())),
        }
    }

    /// Guess from the file extension; anything unrecognised is read as JSON Lines.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
            Some(ext) if ext == "csv" => InputFormat::Csv,
            Some(ext) if ext == "json" => InputFormat::JsonArray,
            _ => InputFormat::JsonLines,
        }
    }
}

pub fn read_jsonl<R: BufRead>(reader: R) -> Result<Vec<RawRecord>, IngestError> {
    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let rec = serde_json::from_str(&line).map_err(|source| IngestError::Json { record: i + 1, source })?;
        out.push(rec);
    }
    Ok(out)
}

pub fn read_json_array<R: Read>(reader: R) -> Result<Vec<RawRecord>, IngestError> {
    serde_json::from_reader(reader).map_err(|source| IngestError::Json { record: 0, source })
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawRecord>, IngestError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            return Err(IngestError::MissingColumn(col));
        }
    }
    let mut out = Vec::new();
    for rec in rdr.deserialize() {
        out.push(rec?);
    }
    Ok(out)
}

pub fn read_records<R: BufRead>(reader: R, format: InputFormat) -> Result<Vec<RawRecord>, IngestError> {
    match format {
        InputFormat::JsonLines => read_jsonl(reader),
        InputFormat::JsonArray => read_json_array(reader),
        InputFormat::Csv => read_csv(reader),
    }
}

/// Load records from each path in order (`-` is stdin, read as JSON Lines
/// unless `format` says otherwise).
pub fn load_records(paths: &[String], format: Option<InputFormat>) -> Result<Vec<RawRecord>, IngestError> {
    let mut out = Vec::new();
    for p in paths {
        let mut recs = if p == "-" {
            let stdin = io::stdin();
            read_records(stdin.lock(), format.unwrap_or(InputFormat::JsonLines))?
        } else {
            let path = Path::new(p);
            let f = File::open(path)?;
            read_records(BufReader::new(f), format.unwrap_or_else(|| InputFormat::from_path(path)))?
        };
        tracing::debug!(source = %p, records = recs.len(), "loaded reservation records");
        out.append(&mut recs);
    }
    Ok(out)
}
