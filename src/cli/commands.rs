//! CLI command implementations
//!
//! Commands write their JSON results to the given writer; logs go to
//! stderr through `tracing`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::analyzer::{reduce, scan_paths, RowClass, ScanOptions, ShardAnalyzer};
use crate::io::{open_json_lines, JsonLinesSink, MessageSink};
use crate::observability::{init_logging, is_known_level, Event};
use crate::schema::{SchemaEngine, QUARANTINE_KEY};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_report, write_json};

/// Main CLI entry point
///
/// Loads the configuration, installs logging and dispatches to the
/// command. This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let config = Config::load_or_default(cli.config.as_deref())?;

    if let Some(level) = cli.log_level.as_deref() {
        if !is_known_level(level) {
            return Err(CliError::config_error(format!("Invalid --log-level: '{}'", level)));
        }
    }
    init_logging(cli.log_level.as_deref(), &config.log_level);
    info!(
        event = Event::ConfigLoaded.as_str(),
        path = ?cli.config,
        threads = config.threads,
        force_cast = config.force_cast,
        skip_failures = config.skip_failures,
        "configuration loaded"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_command(&config, cli.command, &mut out)
}

/// Run the appropriate command based on CLI args
pub fn run_command<W: Write>(config: &Config, cmd: Command, out: &mut W) -> CliResult<()> {
    match cmd {
        Command::Info {
            files,
            merged_only,
            pretty,
            threads,
        } => {
            let threads = threads.unwrap_or(config.threads);
            if threads == 0 {
                return Err(CliError::config_error("--threads must be > 0"));
            }
            info_cmd(config, files, threads, merged_only, pretty, out)
        }
        Command::Validate { files } => validate_cmd(config, &files, out),
        Command::Normalize {
            input,
            output,
            keep_extraneous,
        } => normalize_cmd(
            config,
            &input,
            &output,
            keep_extraneous || config.keep_extraneous,
            out,
        ),
        Command::Merge { reports, pretty } => merge_cmd(&reports, pretty, out),
        Command::Defaults { type_id, optional } => defaults_cmd(type_id, optional, out),
    }
}

/// Per-file reports plus the merged report.
///
/// Files are processed and merged in sorted path order.
pub fn info_cmd<W: Write>(
    config: &Config,
    mut files: Vec<PathBuf>,
    threads: usize,
    merged_only: bool,
    pretty: bool,
    out: &mut W,
) -> CliResult<()> {
    files.sort();
    files.dedup();

    let engine = SchemaEngine::current();
    let options = ScanOptions {
        force_cast: config.force_cast,
    };
    let results = scan_paths(engine, files.clone(), threads, options);

    let mut per_file = Map::new();
    let mut summaries = Vec::with_capacity(results.len());
    for (path, result) in files.iter().zip(results) {
        let summary = result?;
        per_file.insert(path.display().to_string(), summary.to_json());
        summaries.push(summary);
    }
    let merged = reduce(summaries);

    let report = if merged_only {
        merged.to_json()
    } else {
        json!({"files": per_file, "merged": merged.to_json()})
    };
    write_json(out, &report, pretty)
}

/// One diagnostic line per rejected row, then the aggregate counts.
pub fn validate_cmd<W: Write>(config: &Config, files: &[PathBuf], out: &mut W) -> CliResult<()> {
    let engine = SchemaEngine::current();
    let mut summaries = Vec::with_capacity(files.len());

    for path in files {
        let file = path.display().to_string();
        let mut source = open_json_lines(path)?;
        let mut analyzer = ShardAnalyzer::for_source(engine, Some(&file));

        while let Some(item) = source.next() {
            let row = source.line();
            let raw = match item {
                Ok(raw) => raw,
                Err(e) if e.is_record_level() => {
                    analyzer.fold_unreadable();
                    let line = json!({"file": file, "row": row, "code": e.code(), "error": e.to_string()});
                    write_json(out, &line, false)?;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let mut msg = engine.import_values(raw, config.skip_failures, config.force_cast)?;
            let class = analyzer.fold_in_place(&mut msg);
            if class == RowClass::Valid {
                continue;
            }
            let quarantine = msg
                .to_json()
                .get(QUARANTINE_KEY)
                .cloned()
                .unwrap_or(Value::Null);
            let class = match class {
                RowClass::Incomplete => "incomplete",
                _ => "invalid",
            };
            let line = json!({"file": file, "row": row, "class": class, QUARANTINE_KEY: quarantine});
            write_json(out, &line, false)?;
        }
        summaries.push(analyzer.finish());
    }

    let total = reduce(summaries);
    let counts = json!({
        "rows": total.num_rows,
        "valid": total.num_valid_rows(),
        "incomplete": total.num_incomplete_rows,
        "invalid": total.num_invalid_rows,
    });
    write_json(out, &counts, false)
}

/// Import, validate, normalize and export every row of `input` into
/// `output`.
///
/// With `skip_failures`, undecodable records are dropped and rows that
/// cannot be normalized (no or unknown type) are written as validated.
pub fn normalize_cmd<W: Write>(
    config: &Config,
    input: &Path,
    output: &Path,
    keep_extraneous: bool,
    out: &mut W,
) -> CliResult<()> {
    let engine = SchemaEngine::current();
    let skip = config.skip_failures;
    let source = open_json_lines(input)?;

    let file = File::create(output)
        .map_err(|e| CliError::io_error(format!("{}: {}", output.display(), e)))?;
    let mut sink = JsonLinesSink::new(BufWriter::new(file));
    sink.write_header()?;

    let mut rows = 0u64;
    let mut skipped = 0u64;
    let mut unnormalized = 0u64;
    for item in source {
        rows += 1;
        let raw = match item {
            Ok(raw) => raw,
            Err(e) if skip && e.is_record_level() => {
                warn!(event = Event::SourceReadFailed.as_str(), code = e.code(), error = %e, "dropping record");
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let mut msg = engine.import_values(raw, skip, config.force_cast)?;
        engine.validate(&mut msg, true, true)?;
        let normalized = match engine.normalize(&msg, keep_extraneous) {
            Ok(normalized) => normalized,
            Err(e) if skip => {
                warn!(event = Event::RowRejected.as_str(), row = rows, code = e.code(), error = %e, "writing row unnormalized");
                unnormalized += 1;
                msg
            }
            Err(e) => return Err(e.into()),
        };
        sink.write(&engine.export_values(normalized, skip)?)?;
    }

    let written = sink.written();
    sink.finish()?;
    info!(
        event = Event::NormalizeComplete.as_str(),
        input = %input.display(),
        output = %output.display(),
        rows,
        written,
        skipped,
        unnormalized,
        "normalization complete"
    );
    let counts = json!({"rows": rows, "written": written, "skipped": skipped, "unnormalized": unnormalized});
    write_json(out, &counts, false)
}

/// Merges persisted reports left to right, in the order given.
pub fn merge_cmd<W: Write>(reports: &[PathBuf], pretty: bool, out: &mut W) -> CliResult<()> {
    let summaries = reports
        .iter()
        .map(|path| read_report(path))
        .collect::<CliResult<Vec<_>>>()?;
    let merged = reduce(summaries);
    info!(
        event = Event::ReportsMerged.as_str(),
        reports = reports.len(),
        rows = merged.num_rows,
        "reports merged"
    );
    write_json(out, &merged.to_json(), pretty)
}

/// Default message of `type_id`, in wire form.
pub fn defaults_cmd<W: Write>(type_id: i64, include_optional: bool, out: &mut W) -> CliResult<()> {
    let engine = SchemaEngine::current();
    let msg = engine.default_message(type_id, include_optional)?;
    let wire = engine.export_values(msg, false)?;
    write_json(out, &wire.to_json(), false)
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_lines(dir: &TempDir, name: &str, lines: &[Value]) -> PathBuf {
        let path = dir.path().join(name);
        let body: String = lines.iter().map(|l| format!("{}\n", l)).collect();
        fs::write(&path, body).unwrap();
        path
    }

    fn output_lines(out: Vec<u8>) -> Vec<Value> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_info_merges_in_sorted_order() {
        let dir = TempDir::new().unwrap();
        let late = write_lines(&dir, "b.json", &[json!({"type": 1, "timestamp": "2015-01-02T00:00:00.000000Z"})]);
        let early = write_lines(&dir, "a.json", &[json!({"type": 1, "timestamp": "2015-01-01T00:00:00.000000Z"})]);

        let mut out = Vec::new();
        info_cmd(&Config::default(), vec![late, early], 2, false, false, &mut out).unwrap();
        let report = output_lines(out).remove(0);

        assert_eq!(report["files"].as_object().unwrap().len(), 2);
        assert_eq!(report["merged"]["num_rows"], 2);
        assert_eq!(report["merged"]["is_sorted_files"], true);
    }

    #[test]
    fn test_info_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        let err = info_cmd(&Config::default(), vec![dir.path().join("nope.json")], 1, true, false, &mut out)
            .unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::SourceError);
    }

    #[test]
    fn test_validate_prints_diagnostics_then_counts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rows.json");
        fs::write(&path, "{\"type\": 1, \"lat\": 300.0}\nnot json\n").unwrap();

        let mut out = Vec::new();
        validate_cmd(&Config::default(), &[path], &mut out).unwrap();
        let lines = output_lines(out);

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["row"], 1);
        assert_eq!(lines[0]["class"], "invalid");
        assert_eq!(lines[0][QUARANTINE_KEY]["lat"]["reason"], "domain");
        assert_eq!(lines[1]["code"], "AIS_SOURCE_DECODE");
        assert_eq!(lines[2], json!({"rows": 2, "valid": 0, "incomplete": 0, "invalid": 2}));
    }

    #[test]
    fn test_normalize_completes_and_strips() {
        let dir = TempDir::new().unwrap();
        let input = write_lines(
            &dir,
            "in.json",
            &[json!({"type": 1, "mmsi": 123, "custom": 1, "timestamp": "2015-01-01T00:00:00.026490Z"})],
        );
        let output = dir.path().join("out.json");

        let mut out = Vec::new();
        normalize_cmd(&Config::default(), &input, &output, false, &mut out).unwrap();
        assert_eq!(output_lines(out)[0]["written"], 1);

        let written = output_lines(fs::read(&output).unwrap());
        let row = &written[0];
        assert_eq!(row["timestamp"], "2015-01-01T00:00:00.026490Z");
        assert_eq!(row["lat"], 91.0);
        assert!(row.get("custom").is_none());
    }

    #[test]
    fn test_normalize_keeps_row_without_type() {
        let dir = TempDir::new().unwrap();
        let input = write_lines(&dir, "in.json", &[json!({"mmsi": 1})]);
        let output = dir.path().join("out.json");

        let mut out = Vec::new();
        normalize_cmd(&Config::default(), &input, &output, false, &mut out).unwrap();
        assert_eq!(output_lines(out)[0]["unnormalized"], 1);
        assert_eq!(output_lines(fs::read(&output).unwrap())[0], json!({"mmsi": 1}));
    }

    #[test]
    fn test_merge_reports() {
        let dir = TempDir::new().unwrap();
        let shard = write_lines(&dir, "a.json", &[json!({"type": 1}), json!({"type": 5})]);
        let mut report = Vec::new();
        info_cmd(&Config::default(), vec![shard], 1, true, false, &mut report).unwrap();
        let first = dir.path().join("r1.json");
        let second = dir.path().join("r2.json");
        fs::write(&first, &report).unwrap();
        fs::write(&second, &report).unwrap();

        let mut out = Vec::new();
        merge_cmd(&[first, second], false, &mut out).unwrap();
        let merged = output_lines(out).remove(0);
        assert_eq!(merged["num_rows"], 4);
        assert_eq!(merged["msg_type_hist"]["1"], 2);
    }

    #[test]
    fn test_defaults_command() {
        let mut out = Vec::new();
        defaults_cmd(27, false, &mut out).unwrap();
        let msg = output_lines(out).remove(0);
        assert_eq!(msg["type"], 27);
        assert_eq!(msg["gnss"], false);

        let err = defaults_cmd(0, false, &mut Vec::new()).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::SchemaError);
    }
}
