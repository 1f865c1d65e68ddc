//! JSON output and report files

use std::fs;
use std::io::Write;
use std::path::Path;

use serde_json::Value;

use super::errors::{CliError, CliResult};
use crate::analyzer::CorpusSummary;

/// Writes one JSON document followed by a newline.
pub fn write_json<W: Write>(out: &mut W, value: &Value, pretty: bool) -> CliResult<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Reads a persisted report.
pub fn read_report(path: &Path) -> CliResult<CorpusSummary> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&content).map_err(|e| CliError::invalid_report(path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_json_compact() {
        let mut out = Vec::new();
        write_json(&mut out, &json!({"a": 1}), false).unwrap();
        assert_eq!(out, b"{\"a\":1}\n");
    }

    #[test]
    fn test_read_report_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.json");
        fs::write(&path, r#"{"num_rows": "many"}"#).unwrap();
        let err = read_report(&path).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::InvalidReport);
        assert!(err.to_string().starts_with("AIS_CLI_INVALID_REPORT"));
    }
}
