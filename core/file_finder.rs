use crate::CoreError;
use crate::stripper::LanguageFamily;
use ignore::{DirEntry, WalkBuilder};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const JS_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];
const PYTHON_EXTENSIONS: &[&str] = &["py"];
const CSS_EXTENSIONS: &[&str] = &["css", "scss"];
const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

const SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    ".next",
    "__pycache__",
    "venv",
    "env",
];

const TARGET_DIRS: &[&str] = &["frontend", "backend"];

/// Fixed description of what a run looks at. Built once and handed to the
/// walker; nothing here is global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkerConfig {
    extensions: BTreeSet<String>,
    skip_dirs: Arc<BTreeSet<String>>,
    target_dirs: Vec<String>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        let extensions = [JS_EXTENSIONS, PYTHON_EXTENSIONS, CSS_EXTENSIONS, HTML_EXTENSIONS]
            .concat()
            .into_iter()
            .map(str::to_string)
            .collect();
        WalkerConfig {
            extensions,
            skip_dirs: Arc::new(SKIP_DIRS.iter().map(|s| s.to_string()).collect()),
            target_dirs: TARGET_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl WalkerConfig {
    /// Restricts discovery to these extensions. Extensions without a comment
    /// stripper are never yielded.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    pub fn with_skip_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_dirs = Arc::new(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_target_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_dirs = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    pub fn skip_dirs(&self) -> impl Iterator<Item = &str> {
        self.skip_dirs.iter().map(String::as_str)
    }

    pub fn target_dirs(&self) -> &[String] {
        &self.target_dirs
    }

    pub fn is_skipped_name(&self, name: &str) -> bool {
        self.skip_dirs.contains(name)
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        self.extensions.contains(&ext) && LanguageFamily::from_extension(&ext).is_some()
    }
}

/// Lazily yields every supported file under `root`, in file name order.
///
/// Entries below `root` whose name is in the skip set are pruned together
/// with everything beneath them. Ignore files are not honoured and hidden
/// files are visited.
pub fn discover<'c>(
    config: &'c WalkerConfig,
    root: &Path,
) -> impl Iterator<Item = PathBuf> + use<'c> {
    let skip_dirs = Arc::clone(&config.skip_dirs);
    let mut walker = WalkBuilder::new(root);
    walker
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            entry.depth() == 0
                || entry
                    .file_name()
                    .to_str()
                    .is_none_or(|name| !skip_dirs.contains(name))
        });

    walker.build().filter_map(move |item| match item {
        Ok(entry) if is_target_entry(&entry, config) => Some(entry.into_path()),
        Ok(_) => None,
        Err(e) => {
            log::warn!("skipping unreadable entry: {}", e);
            None
        }
    })
}

fn is_target_entry(entry: &DirEntry, config: &WalkerConfig) -> bool {
    entry.file_type().is_some_and(|ft| ft.is_file()) && config.is_supported(entry.path())
}

pub fn validate_root(root: &Path) -> Result<(), CoreError> {
    match fs::metadata(root) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(CoreError::MissingRoot(root.to_path_buf()))
        }
        Err(e) => Err(CoreError::Io(e)),
    }
}

/// Roots to process for a run started in `base`: each configured target
/// directory that exists, or `base` itself when none does.
pub fn resolve_targets(config: &WalkerConfig, base: &Path) -> Vec<PathBuf> {
    let found: Vec<PathBuf> = config
        .target_dirs()
        .iter()
        .map(|name| base.join(name))
        .filter(|dir| dir.exists())
        .collect();
    if found.is_empty() {
        vec![base.to_path_buf()]
    } else {
        found
    }
}
