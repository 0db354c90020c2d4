//! Configuration file discovery and parsing
//!
//! Searches for `.config/sass-serve.yaml` walking up from the current
//! directory. The project root is the parent of `.config/`. Without a config
//! file the current directory is the root and every default applies.

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{Result, eyre};
use sass_serve_config::SassServeConfig;
use std::env;

use crate::compile::SassOptions;
use crate::handler::SetupOptions;
use crate::run_mode::RunMode;
use crate::save::CompileMultipleOptions;

/// Configuration file name
const CONFIG_DIR: &str = ".config";
const CONFIG_FILE_YAML: &str = "sass-serve.yaml";

const DEFAULT_SASS_DIR: &str = "scss";
const DEFAULT_SASS_EXT: &str = "scss";
const DEFAULT_TILDE_ROOT: &str = "node_modules";

/// Configuration with every path made absolute
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Project root (parent of .config/, or the current directory)
    pub root: Utf8PathBuf,
    /// Options for the request handler
    pub setup: SetupOptions,
    /// Batch compilation, if configured
    pub build: Option<CompileMultipleOptions>,
}

impl ResolvedConfig {
    /// Discover configuration from the current directory, falling back to
    /// defaults rooted there.
    pub fn discover() -> Result<Self> {
        let cwd = current_dir()?;
        match find_config_file(&cwd) {
            Some(path) => load_config(&path),
            None => Ok(resolve(SassServeConfig::default(), cwd)),
        }
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = env::current_dir()?;
    Utf8PathBuf::try_from(cwd).map_err(|e| {
        eyre!(
            "Current directory is not valid UTF-8: {}",
            e.as_path().display()
        )
    })
}

/// Search for `.config/sass-serve.yaml` walking up from `start`
fn find_config_file(start: &Utf8Path) -> Option<Utf8PathBuf> {
    let mut current = start;

    loop {
        let yaml_file = current.join(CONFIG_DIR).join(CONFIG_FILE_YAML);
        if yaml_file.exists() {
            return Some(yaml_file);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Load and resolve configuration from a config file path
fn load_config(config_path: &Utf8Path) -> Result<ResolvedConfig> {
    let content = fs_err::read_to_string(config_path)?;

    let config: SassServeConfig = facet_yaml::from_str(&content)
        .map_err(|e| eyre!("Failed to parse {}: {}", config_path, e))?;

    // Project root is the parent of .config/
    let config_dir = config_path
        .parent()
        .ok_or_else(|| eyre!("Config file has no parent directory"))?;
    let root = config_dir
        .parent()
        .ok_or_else(|| eyre!(".config directory has no parent"))?
        .to_owned();

    tracing::debug!(%config_path, %root, "loaded configuration");
    Ok(resolve(config, root))
}

/// Apply defaults and resolve paths relative to `root`
fn resolve(config: SassServeConfig, root: Utf8PathBuf) -> ResolvedConfig {
    let sass_options = config.sass_options.unwrap_or_default();
    let sass_options = SassOptions {
        style: sass_options.style,
        load_paths: sass_options
            .load_paths
            .unwrap_or_default()
            .iter()
            .map(|p| root.join(p))
            .collect(),
        quiet: sass_options.quiet.unwrap_or(false),
    };

    let setup = SetupOptions {
        sass_file_path: root.join(config.sass_file_path.as_deref().unwrap_or(DEFAULT_SASS_DIR)),
        sass_file_ext: config
            .sass_file_ext
            .unwrap_or_else(|| DEFAULT_SASS_EXT.to_string()),
        embed_src_map_in_prod: config.embed_src_map_in_prod.unwrap_or(false),
        resolve_tildes: config.resolve_tildes.unwrap_or(false),
        tilde_root: root.join(config.tilde_root.as_deref().unwrap_or(DEFAULT_TILDE_ROOT)),
        sass_options,
        importers: Vec::new(),
        run_mode: RunMode::from_env(),
    };

    let build = config.build.map(|build| CompileMultipleOptions {
        sass_path: root.join(&build.sass_path),
        css_path: root.join(&build.css_path),
        files: build.files,
    });

    ResolvedConfig { root, setup, build }
}
