//! Import-resolution hooks.
//!
//! grass resolves `@use`/`@import` by probing candidate paths through its
//! [`grass::Fs`]. [`ImportingFs`] sits in front of the real filesystem and
//! lets each registered [`Importer`] rewrite a candidate before it is probed.
//! The entry file is never rewritten, and only the part of a candidate below
//! the entry directory or a load path is searched for a `~` segment.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};

use crate::paths::{ImportResolution, resolve_tilde};

/// A hook consulted for every import candidate, in registration order.
pub trait Importer: fmt::Debug + Send + Sync {
    /// Resolve `url` (the import reference, starting at the first `~`
    /// segment below the importing root if there is one, otherwise the full
    /// candidate path).
    fn resolve(&self, url: &str) -> ImportResolution;
}

/// Ordered list of import hooks shared by every compile of one installation
pub type Importers = Vec<Arc<dyn Importer>>;

/// Resolves `~package/...` against a dependency directory.
#[derive(Debug, Clone)]
pub struct TildeImporter {
    modules_root: Utf8PathBuf,
}

impl TildeImporter {
    pub fn new(modules_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            modules_root: modules_root.into(),
        }
    }
}

impl Importer for TildeImporter {
    fn resolve(&self, url: &str) -> ImportResolution {
        resolve_tilde(url, &self.modules_root)
    }
}

/// Filesystem for grass that routes every probe through the import hooks.
#[derive(Debug)]
pub struct ImportingFs<'a> {
    importers: &'a [Arc<dyn Importer>],
    entry: &'a Path,
    /// Directories grass joins import urls onto
    roots: Vec<&'a Path>,
}

impl<'a> ImportingFs<'a> {
    pub fn new(
        importers: &'a [Arc<dyn Importer>],
        entry: &'a Utf8Path,
        load_paths: &'a [Utf8PathBuf],
    ) -> Self {
        let roots = entry
            .parent()
            .into_iter()
            .chain(load_paths.iter().map(Utf8PathBuf::as_path))
            .map(Utf8Path::as_std_path)
            .collect();
        Self {
            importers,
            entry: entry.as_std_path(),
            roots,
        }
    }

    /// Apply the first hook that claims this path.
    fn rewrite(&self, path: &Path) -> PathBuf {
        if self.importers.is_empty() || path == self.entry {
            return path.to_path_buf();
        }

        let url = self.import_url(path);
        for importer in self.importers {
            if let ImportResolution::File(resolved) = importer.resolve(&url) {
                tracing::trace!(%url, %resolved, "import rewritten");
                return resolved.into_std_path_buf();
            }
        }
        path.to_path_buf()
    }

    /// grass joins an import onto the importing file's directory, so
    /// `@import "~pkg/a"` from `/app/scss/main.scss` arrives as
    /// `/app/scss/~pkg/a`. Recover `~pkg/a` from that, ignoring any `~` in
    /// the root itself.
    fn import_url(&self, path: &Path) -> String {
        let below_root = self
            .roots
            .iter()
            .filter_map(|root| path.strip_prefix(root).ok())
            .min_by_key(|rest| rest.components().count())
            .unwrap_or(path);

        tilde_segment(below_root).unwrap_or_else(|| path.to_string_lossy().into_owned())
    }
}

impl grass::Fs for ImportingFs<'_> {
    fn is_dir(&self, path: &Path) -> bool {
        self.rewrite(path).is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        self.rewrite(path).is_file()
    }

    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        fs_err::read(self.rewrite(path))
    }
}

/// `a/~pkg/b` → `~pkg/b`
fn tilde_segment(path: &Path) -> Option<String> {
    let mut components = path.components();
    while let Some(component) = components.next() {
        if let Component::Normal(segment) = component {
            let segment = segment.to_string_lossy();
            if segment.starts_with('~') {
                let rest = components.as_path();
                return Some(if rest.as_os_str().is_empty() {
                    segment.into_owned()
                } else {
                    format!("{segment}/{}", rest.to_string_lossy())
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: &str = "/app/scss/main.scss";

    #[test]
    fn test_import_url_from_joined_candidate() {
        let importers: Importers = vec![Arc::new(TildeImporter::new("/deps"))];
        let fs = ImportingFs::new(&importers, Utf8Path::new(ENTRY), &[]);
        assert_eq!(
            fs.import_url(Path::new("/app/scss/~widgets/_button.scss")),
            "~widgets/_button.scss"
        );
        assert_eq!(fs.import_url(Path::new("/app/scss/~widgets")), "~widgets");
        assert_eq!(
            fs.import_url(Path::new("/app/scss/partials/~pkg/_a.scss")),
            "~pkg/_a.scss"
        );
        assert_eq!(
            fs.import_url(Path::new("/app/scss/partials/_colors.scss")),
            "/app/scss/partials/_colors.scss"
        );
    }

    #[test]
    fn test_tilde_in_root_is_not_an_import() {
        let importers: Importers = vec![Arc::new(TildeImporter::new("/deps"))];
        let load_paths = vec![Utf8PathBuf::from("/home/~me/vendor")];
        let entry = Utf8Path::new("/home/~site/scss/main.scss");
        let fs = ImportingFs::new(&importers, entry, &load_paths);

        assert_eq!(
            fs.rewrite(entry.as_std_path()),
            PathBuf::from("/home/~site/scss/main.scss")
        );
        assert_eq!(
            fs.rewrite(Path::new("/home/~site/scss/_colors.scss")),
            PathBuf::from("/home/~site/scss/_colors.scss")
        );
        assert_eq!(
            fs.rewrite(Path::new("/home/~me/vendor/_grid.scss")),
            PathBuf::from("/home/~me/vendor/_grid.scss")
        );
        assert_eq!(
            fs.rewrite(Path::new("/home/~site/scss/~pkg/_a.scss")),
            PathBuf::from("/deps/pkg/_a.scss")
        );
    }

    #[test]
    fn test_rewrite_uses_first_claiming_hook() {
        let importers: Importers = vec![
            Arc::new(TildeImporter::new("/first")),
            Arc::new(TildeImporter::new("/second")),
        ];
        let fs = ImportingFs::new(&importers, Utf8Path::new(ENTRY), &[]);
        assert_eq!(
            fs.rewrite(Path::new("/app/scss/~pkg/_a.scss")),
            PathBuf::from("/first/pkg/_a.scss")
        );
        assert_eq!(
            fs.rewrite(Path::new("/app/scss/_a.scss")),
            PathBuf::from("/app/scss/_a.scss")
        );
    }

    #[test]
    fn test_rewrite_without_hooks_is_identity() {
        let fs = ImportingFs::new(&[], Utf8Path::new(ENTRY), &[]);
        assert_eq!(
            fs.rewrite(Path::new("/app/scss/~pkg/_a.scss")),
            PathBuf::from("/app/scss/~pkg/_a.scss")
        );
    }
}
