use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// A CSV file staged for upload.
///
/// The content is passed through verbatim; all parsing and validation
/// happens on the remote service.
#[derive(Debug, Clone)]
pub struct CsvUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl CsvUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        CsvUpload {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_owned());
        Ok(CsvUpload { file_name, bytes })
    }
}

/// What the service reports after ingesting a dataset.
///
/// Absent fields default to an empty column list and zero rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: u64,
}
