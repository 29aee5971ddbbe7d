//! File lifecycle orchestration
//!
//! The `FileProcessor` takes one filename from the input directory through the
//! whole lifecycle:
//!
//! ```text
//! Discovered ──> Read ──> Parsed ──> Written ──> SourceRemoved
//!     │            │         │          │              │
//!  Skipped       Failed    Failed     Failed         Failed
//! ```
//!
//! # Outputs
//!
//! For an input `<input>/<name>.csv` with base name `<name>`:
//! - `<output>/<name>.json` always receives the records (overwritten)
//! - `<errors>/<name>.csv` receives the error report when there is at least one
//!   row error, and is removed when there are none
//!
//! The source file is removed only after every output step succeeded. A
//! failure at any step leaves the source in place, releases the claim on the
//! filename and is returned to the caller. Outputs already written by earlier
//! steps stay on disk.

use crate::core::pipeline;
use crate::core::processed_set::ProcessedSet;
use crate::types::{IngestError, Result};
use log::{debug, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The three directories the processor works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    /// Where `*.csv` files are picked up and removed from
    pub input: PathBuf,
    /// Where `<base>.json` files are written
    pub output: PathBuf,
    /// Where `<base>.csv` error reports are written
    pub errors: PathBuf,
}

impl Directories {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        errors: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            errors: errors.into(),
        }
    }
}

/// Summary of one successfully processed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub filename: String,
    pub record_count: usize,
    pub row_error_count: usize,
    pub json_path: PathBuf,
    /// Set only when an error report was written
    pub error_report_path: Option<PathBuf>,
}

/// Result of handing a filename to the processor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Outputs written and source removed
    Processed(FileReport),
    /// Filename already processed (or in progress) during this run
    Skipped,
}

/// Base name of a file: everything before the first `.`
///
/// `people.csv` gives `people` and `a.b.csv` gives `a`.
pub fn base_name(filename: &str) -> &str {
    filename.split('.').next().unwrap_or(filename)
}

/// Processes files from the input directory one filename at a time
///
/// The processed set is shared so that every trigger (startup scan, watcher
/// events, direct calls) goes through the same idempotence check.
#[derive(Debug, Clone)]
pub struct FileProcessor {
    directories: Directories,
    processed: Arc<ProcessedSet>,
}

impl FileProcessor {
    pub fn new(directories: Directories, processed: Arc<ProcessedSet>) -> Self {
        Self {
            directories,
            processed,
        }
    }

    pub fn directories(&self) -> &Directories {
        &self.directories
    }

    pub fn processed(&self) -> &ProcessedSet {
        &self.processed
    }

    /// Process one file from the input directory
    ///
    /// # Arguments
    ///
    /// * `filename` - Name of the file inside the input directory (not a path)
    ///
    /// # Returns
    ///
    /// * `Ok(Outcome::Skipped)` if the filename was already handled this run
    /// * `Ok(Outcome::Processed(_))` once outputs are written and the source removed
    ///
    /// # Errors
    ///
    /// - `IngestError::Io` if the input cannot be read, an output cannot be
    ///   written or removed, or the source cannot be removed
    /// - `IngestError::MalformedInput` / `IngestError::StructuralRow` if the
    ///   content cannot be converted; nothing is written in that case
    pub fn handle_file(&self, filename: &str) -> Result<Outcome> {
        let Some(claim) = self.processed.try_claim(filename) else {
            if self.processed.is_in_flight(filename) {
                debug!("Skipping {}: already being processed", filename);
            } else {
                debug!("Skipping {}: already processed", filename);
            }
            return Ok(Outcome::Skipped);
        };

        let base = base_name(filename);
        let input_path = self.directories.input.join(filename);
        let json_path = self.directories.output.join(format!("{}.json", base));
        let error_path = self.directories.errors.join(format!("{}.csv", base));

        info!("Processing {}", input_path.display());

        let bytes = fs::read(&input_path).map_err(|e| IngestError::io(&input_path, &e))?;
        let text = decode_utf8(&bytes)?;
        let output = pipeline::process(text)?;

        fs::write(&json_path, &output.entities_json)
            .map_err(|e| IngestError::io(&json_path, &e))?;

        let error_report_path = if output.has_row_errors() {
            fs::write(&error_path, &output.error_report_csv)
                .map_err(|e| IngestError::io(&error_path, &e))?;
            Some(error_path)
        } else {
            remove_if_exists(&error_path)?;
            None
        };

        fs::remove_file(&input_path).map_err(|e| IngestError::io(&input_path, &e))?;
        claim.commit();

        info!(
            "Processed {}: {} record(s), {} row error(s)",
            filename,
            output.record_count,
            output.row_errors.len()
        );

        Ok(Outcome::Processed(FileReport {
            filename: filename.to_string(),
            record_count: output.record_count,
            row_error_count: output.row_errors.len(),
            json_path,
            error_report_path,
        }))
    }

    /// Remove previous `*.json` and `*.csv` outputs
    ///
    /// Cleans the output and error directories. A directory that is also the
    /// input directory is left alone. Failures to remove single files are
    /// logged and skipped.
    ///
    /// # Returns
    ///
    /// The number of files removed.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::Io` if a directory cannot be listed.
    pub fn clean(&self) -> Result<usize> {
        let mut removed = 0;

        let mut dirs = vec![&self.directories.output];
        if !same_directory(&self.directories.errors, &self.directories.output) {
            dirs.push(&self.directories.errors);
        }

        for dir in dirs {
            if same_directory(dir, &self.directories.input) {
                warn!(
                    "Not cleaning {}: it is also the input directory",
                    dir.display()
                );
                continue;
            }
            removed += clean_dir(dir)?;
        }

        Ok(removed)
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| {
        let valid = &bytes[..e.valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() as u64 + 1;
        IngestError::malformed(Some(line), &format!("input is not valid UTF-8: {}", e))
    })
}

/// Remove a file, treating "not found" as success
fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed stale error report {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(IngestError::io(path, &e)),
    }
}

/// Whether two paths name the same directory, comparing canonical forms when
/// both exist
pub(crate) fn same_directory(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn clean_dir(dir: &Path) -> Result<usize> {
    let entries = fs::read_dir(dir).map_err(|e| IngestError::io(dir, &e))?;
    let mut removed = 0;

    for entry in entries.flatten() {
        let path = entry.path();
        let is_output = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "json" || ext == "csv");
        if !is_output || !path.is_file() {
            continue;
        }

        info!("Removing {}", path.display());
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    const SAMPLE: &str = "INTERNAL_ID,FIRST_NAME,MIDDLE_NAME,LAST_NAME,PHONE_NUM\n\
        12345678,Bobby,,Tables,555-555-5555\n\
        55555555,Schmobby,Schmooble,Schmables,222-222-2222\n\
        6666666,,,Schneebly,222-2dee22-2222\n";

    const VALID: &str = "INTERNAL_ID,FIRST_NAME,MIDDLE_NAME,LAST_NAME,PHONE_NUM\n\
        12345678,Bobby,,Tables,555-555-5555\n";

    /// Input, output and error directories under one temp root
    struct Fixture {
        _root: TempDir,
        processor: FileProcessor,
    }

    impl Fixture {
        fn new() -> Self {
            let root = TempDir::new().expect("Failed to create temp dir");
            let directories = Directories::new(
                root.path().join("input"),
                root.path().join("output"),
                root.path().join("errors"),
            );
            for dir in [&directories.input, &directories.output, &directories.errors] {
                fs::create_dir(dir).expect("Failed to create dir");
            }
            Self {
                _root: root,
                processor: FileProcessor::new(directories, Arc::new(ProcessedSet::new())),
            }
        }

        fn dirs(&self) -> &Directories {
            self.processor.directories()
        }

        fn write_input(&self, filename: &str, content: &str) {
            fs::write(self.dirs().input.join(filename), content).expect("Failed to write input");
        }
    }

    #[rstest]
    #[case("people.csv", "people")]
    #[case("a.b.csv", "a")]
    #[case("noext", "noext")]
    #[case(".csv", "")]
    fn test_base_name(#[case] filename: &str, #[case] expected: &str) {
        assert_eq!(base_name(filename), expected);
    }

    #[test]
    fn test_handle_file_writes_outputs_and_removes_source() {
        let fixture = Fixture::new();
        fixture.write_input("people.csv", SAMPLE);

        let outcome = fixture.processor.handle_file("people.csv").unwrap();

        let Outcome::Processed(report) = outcome else {
            panic!("Expected file to be processed");
        };
        assert_eq!(report.record_count, 3);
        assert_eq!(report.row_error_count, 3);
        assert_eq!(report.json_path, fixture.dirs().output.join("people.json"));
        assert_eq!(
            report.error_report_path,
            Some(fixture.dirs().errors.join("people.csv"))
        );

        let json = fs::read_to_string(&report.json_path).unwrap();
        assert!(json.starts_with(r#"[{"id":12345678,"name":{"first":"Bobby","last":"Tables"}"#));
        let errors = fs::read_to_string(fixture.dirs().errors.join("people.csv")).unwrap();
        assert_eq!(
            errors,
            "LINE_NUM,ERROR_MSG\n\
             4,FIRST_NAME is required\n\
             4,INTERNAL_ID must be an 8 digit positive integer\n\
             4,PHONE_NUMBER should match pattern ###-###-####\n"
        );

        assert!(!fixture.dirs().input.join("people.csv").exists());
        assert!(fixture.processor.processed().contains("people.csv"));
    }

    #[test]
    fn test_handle_file_without_row_errors_writes_no_report() {
        let fixture = Fixture::new();
        fixture.write_input("valid.csv", VALID);

        let outcome = fixture.processor.handle_file("valid.csv").unwrap();

        assert!(matches!(
            outcome,
            Outcome::Processed(FileReport {
                error_report_path: None,
                ..
            })
        ));
        assert!(fixture.dirs().output.join("valid.json").exists());
        assert!(!fixture.dirs().errors.join("valid.csv").exists());
    }

    #[test]
    fn test_handle_file_removes_stale_error_report() {
        let fixture = Fixture::new();
        let stale = fixture.dirs().errors.join("valid.csv");
        fs::write(&stale, "LINE_NUM,ERROR_MSG\n2,old\n").unwrap();
        fixture.write_input("valid.csv", VALID);

        fixture.processor.handle_file("valid.csv").unwrap();

        assert!(!stale.exists());
    }

    #[test]
    fn test_handle_file_overwrites_previous_outputs() {
        let fixture = Fixture::new();
        let json_path = fixture.dirs().output.join("valid.json");
        fs::write(&json_path, "old content that is longer than the new one").unwrap();
        fixture.write_input("valid.csv", VALID);

        fixture.processor.handle_file("valid.csv").unwrap();

        let json = fs::read_to_string(json_path).unwrap();
        assert_eq!(
            json,
            r#"[{"id":12345678,"name":{"first":"Bobby","last":"Tables"},"phone":"555-555-5555"}]"#
        );
    }

    #[test]
    fn test_handle_file_uses_first_dot_for_outputs() {
        let fixture = Fixture::new();
        fixture.write_input("batch.2024.csv", VALID);

        fixture.processor.handle_file("batch.2024.csv").unwrap();

        assert!(fixture.dirs().output.join("batch.json").exists());
    }

    #[test]
    fn test_handle_file_skips_processed_filename() {
        let fixture = Fixture::new();
        fixture.write_input("people.csv", SAMPLE);
        fixture.processor.handle_file("people.csv").unwrap();
        let json_before = fs::read_to_string(fixture.dirs().output.join("people.json")).unwrap();

        fixture.write_input("people.csv", VALID);
        let outcome = fixture.processor.handle_file("people.csv").unwrap();

        assert_eq!(outcome, Outcome::Skipped);
        let json_after = fs::read_to_string(fixture.dirs().output.join("people.json")).unwrap();
        assert_eq!(json_before, json_after);
        assert!(fixture.dirs().errors.join("people.csv").exists());
        assert!(fixture.dirs().input.join("people.csv").exists());
    }

    #[test]
    fn test_handle_file_missing_input() {
        let fixture = Fixture::new();

        let error = fixture.processor.handle_file("missing.csv").unwrap_err();

        assert!(matches!(error, IngestError::Io { .. }));
        assert!(!fixture.processor.processed().contains("missing.csv"));
        assert!(!fixture.dirs().output.join("missing.json").exists());
    }

    #[rstest]
    #[case::unbalanced_quotes("INTERNAL_ID,FIRST_NAME\n\"12345678,Bobby\n")]
    #[case::uneven_rows("A,B,C,D,E\n1,2,3\n")]
    #[case::wrong_width("A,B\n1,2\n")]
    #[case::bare_quote("A,B,C,D,E\n12345678,Bo\"b\"by,,Tables,555-555-5555\n")]
    #[case::text_after_closing_quote("A,B,C,D,E\n12345678,\"Bob\"by,,Tables,555-555-5555\n")]
    fn test_handle_file_bad_content_leaves_source(#[case] content: &str) {
        let fixture = Fixture::new();
        fixture.write_input("bad.csv", content);

        let result = fixture.processor.handle_file("bad.csv");

        assert!(matches!(
            result,
            Err(IngestError::MalformedInput { .. }) | Err(IngestError::StructuralRow { .. })
        ));
        assert!(fixture.dirs().input.join("bad.csv").exists());
        assert!(!fixture.dirs().output.join("bad.json").exists());
        assert!(!fixture.dirs().errors.join("bad.csv").exists());
        assert!(!fixture.processor.processed().contains("bad.csv"));
    }

    #[test]
    fn test_handle_file_invalid_utf8() {
        let fixture = Fixture::new();
        fs::write(
            fixture.dirs().input.join("binary.csv"),
            b"A,B,C,D,E\n\xff\xfe,1,2,3,4\n",
        )
        .unwrap();

        let error = fixture.processor.handle_file("binary.csv").unwrap_err();

        assert!(matches!(
            error,
            IngestError::MalformedInput { line: Some(2), .. }
        ));
    }

    #[test]
    fn test_failed_file_can_be_retried_after_fix() {
        let fixture = Fixture::new();
        fixture.write_input("retry.csv", "A,B\n\"broken\n");
        assert!(fixture.processor.handle_file("retry.csv").is_err());

        fixture.write_input("retry.csv", VALID);
        let outcome = fixture.processor.handle_file("retry.csv").unwrap();

        assert!(matches!(outcome, Outcome::Processed(_)));
        assert!(!fixture.dirs().input.join("retry.csv").exists());
    }

    #[test]
    fn test_handle_file_write_failure_keeps_source() {
        let fixture = Fixture::new();
        fs::remove_dir(&fixture.dirs().output).unwrap();
        fixture.write_input("valid.csv", VALID);

        let error = fixture.processor.handle_file("valid.csv").unwrap_err();

        assert!(matches!(error, IngestError::Io { .. }));
        assert!(fixture.dirs().input.join("valid.csv").exists());
        assert!(!fixture.processor.processed().contains("valid.csv"));
    }

    #[test]
    fn test_stale_report_removal_failure_fails_run() {
        let fixture = Fixture::new();
        fs::create_dir(fixture.dirs().errors.join("valid.csv")).unwrap();
        fixture.write_input("valid.csv", VALID);

        let error = fixture.processor.handle_file("valid.csv").unwrap_err();

        assert!(matches!(error, IngestError::Io { .. }));
        assert!(fixture.dirs().input.join("valid.csv").exists());
        assert!(!fixture.processor.processed().contains("valid.csv"));
        assert!(!fixture.processor.processed().is_in_flight("valid.csv"));
    }

    #[cfg(unix)]
    #[test]
    fn test_source_removal_failure_keeps_outputs() {
        use std::os::unix::fs::PermissionsExt;

        let fixture = Fixture::new();
        let input_dir = fixture.dirs().input.clone();
        fixture.write_input("people.csv", SAMPLE);
        fs::set_permissions(&input_dir, fs::Permissions::from_mode(0o555)).unwrap();

        // Directory permissions are not enforced for privileged users.
        if fs::write(input_dir.join("writable"), "").is_ok() {
            fs::set_permissions(&input_dir, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = fixture.processor.handle_file("people.csv");
        fs::set_permissions(&input_dir, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(result, Err(IngestError::Io { .. })));
        assert!(input_dir.join("people.csv").exists());
        assert!(fixture.dirs().output.join("people.json").exists());
        assert!(fixture.dirs().errors.join("people.csv").exists());
        assert!(!fixture.processor.processed().contains("people.csv"));
        assert!(fixture.processor.processed().try_claim("people.csv").is_some());
    }

    #[test]
    fn test_clean_removes_previous_outputs_only() {
        let fixture = Fixture::new();
        fs::write(fixture.dirs().output.join("old.json"), "[]").unwrap();
        fs::write(fixture.dirs().output.join("notes.txt"), "keep").unwrap();
        fs::write(fixture.dirs().errors.join("old.csv"), "LINE_NUM,ERROR_MSG\n").unwrap();
        fixture.write_input("pending.csv", VALID);

        let removed = fixture.processor.clean().unwrap();

        assert_eq!(removed, 2);
        assert!(!fixture.dirs().output.join("old.json").exists());
        assert!(!fixture.dirs().errors.join("old.csv").exists());
        assert!(fixture.dirs().output.join("notes.txt").exists());
        assert!(fixture.dirs().input.join("pending.csv").exists());
    }

    #[test]
    fn test_clean_skips_input_directory() {
        let root = TempDir::new().unwrap();
        let dir = root.path().to_path_buf();
        fs::write(dir.join("pending.csv"), VALID).unwrap();
        let processor = FileProcessor::new(
            Directories::new(&dir, &dir, &dir),
            Arc::new(ProcessedSet::new()),
        );

        let removed = processor.clean().unwrap();

        assert_eq!(removed, 0);
        assert!(dir.join("pending.csv").exists());
    }
}
