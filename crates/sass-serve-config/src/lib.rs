//! Configuration types for sass-serve.
//!
//! These structs are parsed from `.config/sass-serve.yaml`. Every key is
//! optional; defaults are applied when the config is resolved.

use facet::Facet;

/// sass-serve configuration from `.config/sass-serve.yaml`
#[derive(Debug, Clone, Default, Facet)]
#[facet(rename_all = "snake_case")]
pub struct SassServeConfig {
    /// Directory holding the stylesheet sources (relative to project root).
    /// Defaults to `scss`.
    #[facet(default)]
    pub sass_file_path: Option<String>,

    /// Extension of the stylesheet sources. Defaults to `scss`.
    #[facet(default)]
    pub sass_file_ext: Option<String>,

    /// Keep embedding source maps when running in production
    #[facet(default)]
    pub embed_src_map_in_prod: Option<bool>,

    /// Resolve `~`-prefixed imports against the dependency directory
    #[facet(default)]
    pub resolve_tildes: Option<bool>,

    /// Dependency directory used for `~` imports (relative to project root).
    /// Defaults to `node_modules`.
    #[facet(default)]
    pub tilde_root: Option<String>,

    /// Options merged into every compile call
    #[facet(default)]
    pub sass_options: Option<SassOptionsConfig>,

    /// Batch compilation, used by `sass-serve build`
    #[facet(default)]
    pub build: Option<BuildConfig>,
}

/// Compiler options merged into every compile call
#[derive(Debug, Clone, Default, Facet)]
#[facet(rename_all = "snake_case")]
pub struct SassOptionsConfig {
    /// Force an output style regardless of run mode
    #[facet(default)]
    pub style: Option<OutputStyle>,

    /// Extra directories searched by `@use` and `@import`
    #[facet(default)]
    pub load_paths: Option<Vec<String>>,

    /// Silence `@warn` and `@debug` output
    #[facet(default)]
    pub quiet: Option<bool>,
}

/// CSS output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Facet)]
#[facet(rename_all = "snake_case")]
#[repr(u8)]
pub enum OutputStyle {
    /// One declaration per line, indented
    Expanded,
    /// Minified
    Compressed,
}

/// Batch compilation settings
#[derive(Debug, Clone, Facet)]
#[facet(rename_all = "snake_case")]
pub struct BuildConfig {
    /// Source directory (relative to project root)
    pub sass_path: String,

    /// Output directory (relative to project root)
    pub css_path: String,

    /// Source file names, compiled in this order
    pub files: Vec<String>,
}
