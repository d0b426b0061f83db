//! Error types for the site data tools.

use std::fmt;
use std::path::PathBuf;

/// Errors reading the certifications data file.
#[derive(Debug)]
pub enum CertsError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for CertsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertsError::Io(e) => write!(f, "Failed to read certifications: {}", e),
            CertsError::Json(e) => write!(f, "Invalid certifications JSON: {}", e),
        }
    }
}

impl std::error::Error for CertsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CertsError::Io(e) => Some(e),
            CertsError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for CertsError {
    fn from(e: std::io::Error) -> Self {
        CertsError::Io(e)
    }
}

impl From<serde_json::Error> for CertsError {
    fn from(e: serde_json::Error) -> Self {
        CertsError::Json(e)
    }
}

/// Errors from syncing a LinkedIn export.
#[derive(Debug)]
pub enum SyncError {
    /// The input path is neither a file nor a directory.
    NotFound(PathBuf),
    /// The export directory has no certifications file.
    NoCertificationFile(PathBuf),
    /// The existing output file is not a valid certifications list.
    InvalidExisting(PathBuf, serde_json::Error),
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::NotFound(p) => write!(f, "Path is not a file or directory: {}", p.display()),
            SyncError::NoCertificationFile(p) => write!(
                f,
                "No Certifications file found in {}. Look for a file whose name contains \"Certification\".",
                p.display()
            ),
            SyncError::InvalidExisting(p, e) => write!(
                f,
                "Refusing to overwrite {}: existing certifications are invalid: {}",
                p.display(),
                e
            ),
            SyncError::Io(e) => write!(f, "I/O error: {}", e),
            SyncError::Csv(e) => write!(f, "Failed to parse CSV: {}", e),
            SyncError::Json(e) => write!(f, "Failed to write JSON: {}", e),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::InvalidExisting(_, e) => Some(e),
            SyncError::Io(e) => Some(e),
            SyncError::Csv(e) => Some(e),
            SyncError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(e: std::io::Error) -> Self {
        SyncError::Io(e)
    }
}

impl From<csv::Error> for SyncError {
    fn from(e: csv::Error) -> Self {
        SyncError::Csv(e)
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Json(e)
    }
}

/// Errors parsing an uploaded chart data file.
#[derive(Debug)]
pub enum VizError {
    Json(serde_json::Error),
    Csv(csv::Error),
    /// The CSV has no header row.
    Empty,
}

impl fmt::Display for VizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VizError::Json(e) => write!(f, "Invalid JSON data: {}", e),
            VizError::Csv(e) => write!(f, "Invalid CSV data: {}", e),
            VizError::Empty => write!(f, "Data file is empty"),
        }
    }
}

impl std::error::Error for VizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VizError::Json(e) => Some(e),
            VizError::Csv(e) => Some(e),
            VizError::Empty => None,
        }
    }
}

impl From<serde_json::Error> for VizError {
    fn from(e: serde_json::Error) -> Self {
        VizError::Json(e)
    }
}

impl From<csv::Error> for VizError {
    fn from(e: csv::Error) -> Self {
        VizError::Csv(e)
    }
}
