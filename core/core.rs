pub mod file_finder;
pub mod processor;
pub mod stripper;

pub use file_finder::{WalkerConfig, discover, resolve_targets, validate_root};
pub use processor::{
    FileOutcome, NoopReporter, ProcessError, ProcessOptions, Reporter, Summary, is_affirmative,
    process_file, run,
};
pub use stripper::{LanguageFamily, StripError, find_language_comments, strip, try_strip};

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("traversal root not found: {}", .0.display())]
    MissingRoot(PathBuf),
}
