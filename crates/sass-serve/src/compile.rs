//! Compiler adapter over grass.

use std::sync::Arc;
use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};

pub use sass_serve_config::OutputStyle;

use crate::error::{Error, Result};
use crate::importer::{Importer, Importers, ImportingFs};
use crate::run_mode::RunMode;
use crate::source_map;

/// Compiler settings merged into every compile call
#[derive(Debug, Clone, Default)]
pub struct SassOptions {
    /// Forces an output style regardless of run mode
    pub style: Option<OutputStyle>,
    /// Extra directories searched by `@use` and `@import`
    pub load_paths: Vec<Utf8PathBuf>,
    /// Silence `@warn` and `@debug`
    pub quiet: bool,
}

/// Everything shared by the compiles of one installation.
#[derive(Debug, Clone, Default)]
pub struct CompilerConfig {
    pub sass_options: SassOptions,
    pub importers: Importers,
}

/// Options for a single compile call.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub file: Utf8PathBuf,
    pub config: Arc<CompilerConfig>,
    pub source_map: bool,
    pub style: OutputStyle,
}

/// Compiles stylesheets with one fixed configuration.
///
/// Cloning is cheap; clones share the configuration.
#[derive(Debug, Clone)]
pub struct Compiler {
    config: Arc<CompilerConfig>,
    run_mode: RunMode,
    embed_src_map_in_prod: bool,
}

impl Compiler {
    pub fn new(sass_options: SassOptions, run_mode: RunMode) -> Self {
        Self {
            config: Arc::new(CompilerConfig {
                sass_options,
                importers: Vec::new(),
            }),
            run_mode,
            embed_src_map_in_prod: false,
        }
    }

    /// Keep source maps in production.
    pub fn embed_src_map_in_prod(mut self, embed: bool) -> Self {
        self.embed_src_map_in_prod = embed;
        self
    }

    /// Append an import hook after the ones already registered.
    pub fn with_importer(self, importer: impl Importer + 'static) -> Self {
        self.with_shared_importer(Arc::new(importer))
    }

    pub fn with_shared_importer(mut self, importer: Arc<dyn Importer>) -> Self {
        Arc::make_mut(&mut self.config).importers.push(importer);
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn run_mode(&self) -> RunMode {
        self.run_mode
    }

    /// Whether compiled output gets an embedded source map
    pub fn source_map(&self) -> bool {
        !self.run_mode.is_production() || self.embed_src_map_in_prod
    }

    /// Output style: the configured one, else compressed in production
    pub fn style(&self) -> OutputStyle {
        match self.config.sass_options.style {
            Some(style) => style,
            None if self.run_mode.is_production() => OutputStyle::Compressed,
            None => OutputStyle::Expanded,
        }
    }

    pub fn options_for(&self, file: impl Into<Utf8PathBuf>) -> CompileOptions {
        CompileOptions {
            file: file.into(),
            config: Arc::clone(&self.config),
            source_map: self.source_map(),
            style: self.style(),
        }
    }

    /// Compile `source_path` to CSS.
    pub async fn compile(&self, source_path: &Utf8Path) -> Result<String> {
        compile_with(self.options_for(source_path)).await
    }
}

/// Compile with explicit per-call options. grass is synchronous, so this runs
/// on the blocking pool.
pub async fn compile_with(options: CompileOptions) -> Result<String> {
    tokio::task::spawn_blocking(move || compile_blocking(&options)).await?
}

fn compile_blocking(options: &CompileOptions) -> Result<String> {
    let start = Instant::now();
    let file = &options.file;

    if !file.is_file() {
        return Err(Error::SourceNotFound(file.clone()));
    }

    let sass_options = &options.config.sass_options;
    let fs = ImportingFs::new(&options.config.importers, file, &sass_options.load_paths);
    let mut grass_options = grass::Options::default()
        .fs(&fs)
        .style(grass_style(options.style))
        .quiet(sass_options.quiet);
    for load_path in &sass_options.load_paths {
        grass_options = grass_options.load_path(load_path.as_std_path());
    }

    let mut css = grass::from_path(file, &grass_options).map_err(|e| Error::Compile {
        path: file.clone(),
        message: e.to_string(),
    })?;

    if options.source_map {
        let source = fs_err::read_to_string(file)?;
        let css_file = match file.file_stem() {
            Some(stem) => format!("{stem}.css"),
            None => String::new(),
        };
        source_map::embed(&mut css, file, &source, &css_file);
    }

    tracing::debug!(
        %file,
        style = ?options.style,
        source_map = options.source_map,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "compiled stylesheet"
    );
    Ok(css)
}

fn grass_style(style: OutputStyle) -> grass::OutputStyle {
    match style {
        OutputStyle::Expanded => grass::OutputStyle::Expanded,
        OutputStyle::Compressed => grass::OutputStyle::Compressed,
    }
}
