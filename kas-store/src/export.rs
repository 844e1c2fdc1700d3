//! Export the store as a JSON document or a flat CSV, and read exports back.
//!
//! JSON layout:
//!   { "transactions": [ ...records... ], "exportDate": "<RFC 3339>" }
//!
//! CSV columns match the record fields:
//!   id,type,category,amount,description,date,createdAt

use chrono::{DateTime, NaiveDate, Utc};
use kas_core::Transaction;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Prefix of every export file name.
pub const APP_NAME: &str = "kas-virtual";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid export JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown export format '{other}' (use json or csv)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub transactions: Vec<Transaction>,
    pub export_date: DateTime<Utc>,
}

/// What `import` accepts: a full export document, or the bare array found in
/// the persisted blob.
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportPayload {
    Document(ExportDocument),
    Bare(Vec<Transaction>),
}

impl ExportDocument {
    pub fn new(snapshot: &[Transaction], export_date: DateTime<Utc>) -> Self {
        Self {
            transactions: snapshot.to_vec(),
            export_date,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an export document. A bare transaction array is accepted too and
    /// gets `export_date = now`.
    pub fn from_json(s: &str, now: DateTime<Utc>) -> Result<Self, ExportError> {
        match serde_json::from_str::<ImportPayload>(s) {
            Ok(ImportPayload::Document(doc)) => Ok(doc),
            Ok(ImportPayload::Bare(transactions)) => Ok(Self {
                transactions,
                export_date: now,
            }),
            // re-parse strictly so the caller sees a useful message
            Err(_) => Ok(serde_json::from_str::<ExportDocument>(s)?),
        }
    }
}

/// `kas-virtual-export-<YYYY-MM-DD>.<ext>`
pub fn export_file_name(date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "{APP_NAME}-export-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Write the snapshot as CSV rows with a header.
pub fn write_csv<W: Write>(writer: W, snapshot: &[Transaction]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for t in snapshot {
        wtr.serialize(t)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write an export file into `dir`, named after `today`. Returns its path.
pub fn write_export(
    dir: &Path,
    snapshot: &[Transaction],
    format: ExportFormat,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(export_file_name(today, format));

    match format {
        ExportFormat::Json => {
            let json = ExportDocument::new(snapshot, now).to_json_pretty()?;
            fs::write(&path, json).map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;
        }
        ExportFormat::Csv => {
            let file = fs::File::create(&path).map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;
            write_csv(file, snapshot)?;
        }
    }

    tracing::debug!(path = %path.display(), count = snapshot.len(), "wrote export");
    Ok(path)
}

/// Read a JSON export from disk.
pub fn read_export(path: &Path, now: DateTime<Utc>) -> Result<ExportDocument, ExportError> {
    let s = fs::read_to_string(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ExportDocument::from_json(&s, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use kas_core::{NewTransaction, TransactionType};

    fn sample() -> Vec<Transaction> {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        vec![
            NewTransaction::new(TransactionType::Expense, "Makanan", 40_000.0)
                .with_description("nasi, teh")
                .into_transaction(2, day, now),
            NewTransaction::new(TransactionType::Income, "Kas", 100_000.0).into_transaction(1, day, now),
        ]
    }

    #[test]
    fn test_file_name() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        assert_eq!(export_file_name(day, ExportFormat::Json), "kas-virtual-export-2024-05-07.json");
        assert_eq!(export_file_name(day, ExportFormat::Csv), "kas-virtual-export-2024-05-07.csv");
    }

    #[test]
    fn test_document_layout() {
        let now = Utc.with_ymd_and_hms(2024, 5, 7, 0, 0, 0).unwrap();
        let json = ExportDocument::new(&sample(), now).to_json_pretty().unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["transactions"].as_array().unwrap().len(), 2);
        assert!(v["exportDate"].as_str().unwrap().starts_with("2024-05-07T00:00:00"));
        assert_eq!(v["transactions"][0]["type"], "expense");
    }

    #[test]
    fn test_from_json_accepts_bare_array() {
        let now = Utc.with_ymd_and_hms(2024, 5, 7, 0, 0, 0).unwrap();
        let bare = serde_json::to_string(&sample()).unwrap();
        let doc = ExportDocument::from_json(&bare, now).unwrap();
        assert_eq!(doc.transactions, sample());
        assert_eq!(doc.export_date, now);

        assert!(matches!(
            ExportDocument::from_json("{\"nope\":true}", now),
            Err(ExportError::Json(_))
        ));
    }

    #[test]
    fn test_csv_has_header_and_quoting() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,type,category,amount,description,date,createdAt"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("2,expense,Makanan,40000.0,\"nasi, teh\",2024-05-01,"));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
