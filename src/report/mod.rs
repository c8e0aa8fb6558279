//! JSON report generation

mod rbac_report;

pub use rbac_report::*;

use std::path::Path;

use serde::Serialize;

use crate::{Error, Result};

/// Write a report as pretty-printed JSON
pub fn write_json<T: Serialize>(path: impl AsRef<Path>, report: &T) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| Error::ReportError(format!("Failed to serialize report: {}", e)))?;
    std::fs::write(path, json).map_err(|e| {
        Error::ReportError(format!("Failed to write report {}: {}", path.display(), e))
    })
}
