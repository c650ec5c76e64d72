use crate::file_finder::{WalkerConfig, discover};
use crate::stripper::{self, LanguageFamily};
use rayon::prelude::*;
use std::fs;
use std::io::{self, Write};
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    #[error("read failed for {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("write failed for {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no comment stripper for {}", path.display())]
    Unsupported { path: PathBuf },
}

impl ProcessError {
    pub fn path(&self) -> &Path {
        match self {
            ProcessError::Read { path, .. }
            | ProcessError::Write { path, .. }
            | ProcessError::Unsupported { path } => path,
        }
    }
}

/// Result of handling one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub processed: bool,
    pub modified: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Compute outcomes without writing anything back.
    pub dry_run: bool,
    /// Process files on the rayon pool. Reporting stays in traversal order.
    pub parallel: bool,
}

/// Totals over every file a run touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub processed: usize,
    pub modified: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl Summary {
    pub fn record(&mut self, result: &Result<FileOutcome, ProcessError>) {
        match result {
            Ok(outcome) if outcome.processed => {
                self.processed += 1;
                if outcome.modified {
                    self.modified += 1;
                } else {
                    self.unchanged += 1;
                }
            }
            Ok(_) => {}
            Err(_) => self.failed += 1,
        }
    }

    pub fn merge(&mut self, other: Summary) {
        self.processed += other.processed;
        self.modified += other.modified;
        self.unchanged += other.unchanged;
        self.failed += other.failed;
    }
}

impl AddAssign for Summary {
    fn add_assign(&mut self, other: Summary) {
        self.merge(other);
    }
}

/// Receives progress while a run walks its files.
pub trait Reporter {
    fn on_file_start(&mut self, _path: &Path) {}
    fn on_file_done(&mut self, _outcome: &FileOutcome) {}
    fn on_file_error(&mut self, _error: &ProcessError) {}
}

pub struct NoopReporter;

impl Reporter for NoopReporter {}

/// Trimmed, case-insensitive `yes` or `y`.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("yes") || answer.eq_ignore_ascii_case("y")
}

pub fn process_file(path: &Path, options: ProcessOptions) -> Result<FileOutcome, ProcessError> {
    let family = LanguageFamily::from_path(path).ok_or_else(|| ProcessError::Unsupported {
        path: path.to_path_buf(),
    })?;

    let original = fs::read_to_string(path).map_err(|source| ProcessError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let stripped = stripper::strip(&original, family);
    let modified = stripped != original;
    log::debug!(
        "{}: {} ({})",
        path.display(),
        if modified { "comments found" } else { "clean" },
        family
    );

    if modified && !options.dry_run {
        write_in_place(path, &stripped).map_err(|source| ProcessError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    Ok(FileOutcome {
        path: path.to_path_buf(),
        processed: true,
        modified,
    })
}

/// Replaces `path` with `content` through a sibling temp file so the target
/// is never observed half written. The original permissions are kept.
fn write_in_place(path: &Path, content: &str) -> io::Result<()> {
    let permissions = fs::metadata(path)?.permissions();
    if permissions.readonly() {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "file is read-only",
        ));
    }
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut temp_file = tempfile::Builder::new()
        .prefix(".decomment_")
        .suffix(".tmp")
        .tempfile_in(parent_dir)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.as_file().sync_all()?;
    fs::set_permissions(temp_file.path(), permissions)?;
    temp_file.persist(path).map_err(|persist_error| persist_error.error)?;
    Ok(())
}

fn report(
    reporter: &mut dyn Reporter,
    summary: &mut Summary,
    result: Result<FileOutcome, ProcessError>,
) {
    match &result {
        Ok(outcome) => reporter.on_file_done(outcome),
        Err(e) => {
            log::error!("{}", e);
            reporter.on_file_error(e);
        }
    }
    summary.record(&result);
}

/// Strips comments from every supported file under `root`.
///
/// Per-file failures are logged, reported and counted; they never end the
/// run early.
pub fn run(
    config: &WalkerConfig,
    root: &Path,
    options: ProcessOptions,
    reporter: &mut dyn Reporter,
) -> Summary {
    log::debug!(
        "walking {} (skipping {})",
        root.display(),
        config.skip_dirs().collect::<Vec<_>>().join(", ")
    );
    let mut summary = Summary::default();

    if options.parallel {
        let files: Vec<PathBuf> = discover(config, root).collect();
        let results: Vec<Result<FileOutcome, ProcessError>> = files
            .par_iter()
            .map(|p| process_file(p, options))
            .collect();
        for (path, result) in files.iter().zip(results) {
            reporter.on_file_start(path);
            report(reporter, &mut summary, result);
        }
    } else {
        for path in discover(config, root) {
            reporter.on_file_start(&path);
            let result = process_file(&path, options);
            report(reporter, &mut summary, result);
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn affirmative_answers() {
        for yes in ["yes", "y", "Y", "YES", " Yes \n"] {
            assert!(is_affirmative(yes), "{yes:?}");
        }
        for no in ["", "no", "n", "yeah", "ye", "sure"] {
            assert!(!is_affirmative(no), "{no:?}");
        }
    }

    #[test]
    fn modified_file_is_rewritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.js");
        fs::write(&path, "let a = 1; // note\n").unwrap();

        let outcome = process_file(&path, ProcessOptions::default()).unwrap();
        assert!(outcome.processed && outcome.modified);
        assert_eq!(fs::read_to_string(&path).unwrap(), "let a = 1; \n");

        let again = process_file(&path, ProcessOptions::default()).unwrap();
        assert!(again.processed && !again.modified);
    }

    #[test]
    fn dry_run_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("style.css");
        fs::write(&path, "a{}/* x */").unwrap();
        let options = ProcessOptions {
            dry_run: true,
            ..ProcessOptions::default()
        };
        let outcome = process_file(&path, options).unwrap();
        assert!(outcome.modified);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a{}/* x */");
    }

    #[test]
    fn undecodable_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bin.py");
        fs::write(&path, [0xff, 0xfe, 0x00, b'#']).unwrap();
        let err = process_file(&path, ProcessOptions::default()).unwrap_err();
        assert!(matches!(err, ProcessError::Read { .. }));
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn read_only_file_is_a_write_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locked.html");
        fs::write(&path, "<!-- x --><p>y</p>").unwrap();
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&path, permissions).unwrap();

        let err = process_file(&path, ProcessOptions::default()).unwrap_err();
        assert!(matches!(err, ProcessError::Write { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "<!-- x --><p>y</p>");
    }

    #[test]
    fn unsupported_extension_is_refused() {
        let err = process_file(Path::new("notes.txt"), ProcessOptions::default()).unwrap_err();
        assert!(matches!(err, ProcessError::Unsupported { .. }));
    }

    #[test]
    fn summary_counts_outcomes() {
        let mut summary = Summary::default();
        let ok = |modified| {
            Ok(FileOutcome {
                path: PathBuf::from("x.js"),
                processed: true,
                modified,
            })
        };
        summary.record(&ok(true));
        summary.record(&ok(false));
        summary.record(&Err(ProcessError::Unsupported {
            path: PathBuf::from("y"),
        }));
        assert_eq!(
            summary,
            Summary {
                processed: 2,
                modified: 1,
                unchanged: 1,
                failed: 1,
            }
        );

        let mut total = Summary::default();
        total += summary;
        total += summary;
        assert_eq!(total.processed, 4);
        assert_eq!(total.failed, 2);
    }
}
