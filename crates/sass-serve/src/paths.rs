//! Source and output path resolution.

use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;

use crate::error::{Error, Result};

/// Extension of every generated file
pub const CSS_EXT: &str = "css";

/// Final path segment of a source file: a name, one or more dots, an extension
static SOURCE_FILE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<stem>[ \w.-]*[ \w-])\.+(?P<ext>\w+)$").unwrap());

/// Strip a trailing `.css` so `main.css` and `main` name the same stylesheet.
pub fn strip_css_suffix(name: &str) -> &str {
    name.strip_suffix(".css").unwrap_or(name)
}

/// `scss` + `main.css` + `scss` → `scss/main.scss`
pub fn resolve_source_path(base_dir: &Utf8Path, logical_name: &str, ext: &str) -> Utf8PathBuf {
    let name = strip_css_suffix(logical_name);
    base_dir.join(format!("{name}.{ext}"))
}

/// Output file name and full output path for a source file.
///
/// `src/scss/main.scss` + `public/css` → (`main.css`, `public/css/main.css`)
pub fn resolve_output_path(
    source_path: &Utf8Path,
    output_dir: &Utf8Path,
) -> Result<(String, Utf8PathBuf)> {
    let file_name = source_path
        .file_name()
        .ok_or_else(|| Error::MalformedPath(source_path.to_string()))?;

    let captures = SOURCE_FILE_REGEX
        .captures(file_name)
        .ok_or_else(|| Error::MalformedPath(source_path.to_string()))?;

    let css_file = format!("{}.{CSS_EXT}", &captures["stem"]);
    let full_css_path = output_dir.join(&css_file);
    Ok((css_file, full_css_path))
}

/// Outcome of an import-resolution hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportResolution {
    /// Load this file instead of the requested url
    File(Utf8PathBuf),
    /// Not handled here; continue with the next hook or the default lookup
    Default,
}

/// `~bootstrap/scss/grid` → `<modules_root>/bootstrap/scss/grid`
pub fn resolve_tilde(url: &str, modules_root: &Utf8Path) -> ImportResolution {
    match url.strip_prefix('~') {
        Some(rest) => ImportResolution::File(modules_root.join(rest.trim_start_matches('/'))),
        None => ImportResolution::Default,
    }
}

/// A requested stylesheet name must stay inside the source directory.
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\', '\0'])
        && name != "."
        && name != ".."
        && !name.starts_with("..")
}
