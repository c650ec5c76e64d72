pub mod c_family;
pub mod common;
pub mod css;
pub mod html;
pub mod python;

pub use common::{CommentMatch, StripError, remove_matches};

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

/// Comment syntax category of a source file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageFamily {
    /// JavaScript, TypeScript, JSX and TSX.
    CFamily,
    Python,
    /// CSS and SCSS.
    Css,
    Html,
}

impl LanguageFamily {
    pub fn from_extension(ext: &str) -> Option<LanguageFamily> {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "jsx" | "ts" | "tsx" => Some(LanguageFamily::CFamily),
            "py" => Some(LanguageFamily::Python),
            "css" | "scss" => Some(LanguageFamily::Css),
            "html" | "htm" => Some(LanguageFamily::Html),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<LanguageFamily> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(LanguageFamily::from_extension)
    }

    pub fn name(self) -> &'static str {
        match self {
            LanguageFamily::CFamily => "javascript",
            LanguageFamily::Python => "python",
            LanguageFamily::Css => "css",
            LanguageFamily::Html => "html",
        }
    }
}

impl fmt::Display for LanguageFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn find_language_comments(
    content: &str,
    family: LanguageFamily,
) -> Result<Vec<CommentMatch>, StripError> {
    match family {
        LanguageFamily::CFamily => c_family::find_comments(content),
        LanguageFamily::Python => python::find_comments(content),
        LanguageFamily::Css => css::find_comments(content),
        LanguageFamily::Html => html::find_comments(content),
    }
}

/// Removes every comment of `family` from `text`, reporting scanner faults.
///
/// Comment-free input is handed back borrowed.
pub fn try_strip(text: &str, family: LanguageFamily) -> Result<Cow<'_, str>, StripError> {
    let matches = find_language_comments(text, family)?;
    if matches.is_empty() {
        return Ok(Cow::Borrowed(text));
    }
    let mut stripped = remove_matches(text.to_owned(), matches)?;

    // Deleting a comment can splice its neighbours into a new opener.
    loop {
        let matches = find_language_comments(&stripped, family)?;
        if matches.is_empty() {
            break;
        }
        let before = stripped.len();
        stripped = remove_matches(stripped, matches)?;
        if stripped.len() == before {
            break;
        }
    }
    Ok(Cow::Owned(stripped))
}

/// Removes every comment of `family` from `text`.
///
/// Never fails: if the scanner ends up in an inconsistent state the input is
/// returned untouched, so a detection bug cannot corrupt a file.
pub fn strip(text: &str, family: LanguageFamily) -> Cow<'_, str> {
    or_original(text, family, try_strip(text, family))
}

fn or_original<'t>(
    text: &'t str,
    family: LanguageFamily,
    result: Result<Cow<'t, str>, StripError>,
) -> Cow<'t, str> {
    match result {
        Ok(stripped) => stripped,
        Err(e) => {
            log::warn!("{} comment stripping failed, keeping text as is: {}", family, e);
            Cow::Borrowed(text)
        }
    }
}
