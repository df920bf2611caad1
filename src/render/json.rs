//! JSON and line-delimited JSON output.
//!
//! Extraction results are persisted as one record per source document,
//! keyed by file name, appended to `.jsonl` files.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::BoundingBox;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a value to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Problem regions of one document (`positions.jsonl`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionsRecord {
    /// Source document stem
    pub file_name: String,
    /// Per-page bounding boxes
    pub positions: Vec<Vec<BoundingBox>>,
}

/// Problem text of one document (`pages.jsonl`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagesRecord {
    /// Source document stem
    pub file_name: String,
    /// Per-page normalized fragments
    pub pages: Vec<Vec<String>>,
}

/// Endnote text of one document (`endnotes.jsonl`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndnotesRecord {
    /// Source document stem
    pub file_name: String,
    /// Per-page endnote bodies
    pub endnotes: Vec<Vec<String>>,
}

/// Serialize a record as a single JSON line (no trailing newline).
pub fn to_json_line<T: Serialize>(record: &T) -> Result<String> {
    to_json(record, JsonFormat::Compact)
}

/// Append a record to a `.jsonl` file, creating it if needed.
pub fn append_record<T: Serialize, P: AsRef<Path>>(path: P, record: &T) -> Result<()> {
    let line = to_json_line(record)?;
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}

/// Read every record of a `.jsonl` file, skipping blank lines.
pub fn read_records<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_json_pretty_and_compact() {
        let record = PagesRecord {
            file_name: "모의고사".to_string(),
            pages: vec![vec!["1) x".to_string()]],
        };
        let pretty = to_json(&record, JsonFormat::Pretty).unwrap();
        assert!(pretty.contains('\n'));
        let compact = to_json_line(&record).unwrap();
        assert!(!compact.contains('\n'));
        assert!(compact.contains("모의고사"));
    }

    #[test]
    fn test_positions_record_shape() {
        let record = PositionsRecord {
            file_name: "a".to_string(),
            positions: vec![vec![BoundingBox::new(0.5, 0.25, 1.0, 0.75)]],
        };
        assert_eq!(
            to_json_line(&record).unwrap(),
            r#"{"file_name":"a","positions":[[[0.5,0.25,1.0,0.75]]]}"#
        );
    }

    #[test]
    fn test_append_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("positions.jsonl");
        for name in ["a", "b"] {
            let record = PositionsRecord {
                file_name: name.to_string(),
                positions: Vec::new(),
            };
            append_record(&path, &record).unwrap();
        }
        let records: Vec<PositionsRecord> = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].file_name, "b");
    }
}
