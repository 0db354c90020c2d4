//! Writing compiled stylesheets to disk, one at a time or as an ordered batch.

use camino::{Utf8Path, Utf8PathBuf};

use crate::cleanup;
use crate::compile::Compiler;
use crate::error::{Error, Result};
use crate::paths::resolve_output_path;

/// What to do when compiling or writing a file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Return the error to the caller.
    #[default]
    Strict,
    /// Log the error and carry on as if nothing was produced.
    Lenient,
}

/// Input for [`compile_and_save_multiple`]
#[derive(Debug, Clone)]
pub struct CompileMultipleOptions {
    /// Source directory
    pub sass_path: Utf8PathBuf,
    /// Output directory
    pub css_path: Utf8PathBuf,
    /// Source file names, compiled in this order
    pub files: Vec<String>,
}

/// Result of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Output file names, in the order they were written
    pub written: Vec<String>,
    /// Source file names that produced nothing (lenient mode only)
    pub skipped: Vec<String>,
}

/// Compile `source_path` and write the result into `output_dir`.
///
/// Returns the output file name (`main.scss` → `main.css`), or `None` when a
/// failure was swallowed under [`ErrorPolicy::Lenient`]. A source path that
/// has no `name.ext` segment is always an error.
pub async fn compile_and_save(
    compiler: &Compiler,
    source_path: &Utf8Path,
    output_dir: &Utf8Path,
    policy: ErrorPolicy,
) -> Result<Option<String>> {
    let (css_file, full_css_path) = resolve_output_path(source_path, output_dir)?;

    cleanup::register_cleanup(output_dir);

    match write_compiled(compiler, source_path, output_dir, &full_css_path).await {
        Ok(()) => Ok(Some(css_file)),
        Err(e) => match policy {
            ErrorPolicy::Strict => Err(e),
            ErrorPolicy::Lenient => {
                tracing::error!(%source_path, error = %e, "stylesheet not saved");
                Ok(None)
            }
        },
    }
}

async fn write_compiled(
    compiler: &Compiler,
    source_path: &Utf8Path,
    output_dir: &Utf8Path,
    full_css_path: &Utf8Path,
) -> Result<()> {
    let css = compiler.compile(source_path).await?;
    fs_err::tokio::create_dir_all(output_dir).await?;
    fs_err::tokio::write(full_css_path, css).await?;
    Ok(())
}

/// Compile and save every file in `options.files`, strictly in order.
///
/// Under [`ErrorPolicy::Strict`] the first failure stops the batch; files
/// written before it stay on disk.
pub async fn compile_and_save_multiple(
    compiler: &Compiler,
    options: &CompileMultipleOptions,
    policy: ErrorPolicy,
) -> Result<BatchReport> {
    let mut report = BatchReport::default();

    for sass_file in &options.files {
        let source_path = options.sass_path.join(sass_file);
        let saved = compile_and_save(compiler, &source_path, &options.css_path, policy)
            .await
            .map_err(|e| Error::Batch {
                file: sass_file.clone(),
                source: Box::new(e),
            })?;

        match saved {
            Some(css_file) => {
                tracing::info!("Created {css_file}");
                report.written.push(css_file);
            }
            None => report.skipped.push(sass_file.clone()),
        }
    }

    Ok(report)
}
