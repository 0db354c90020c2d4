//! HTTP handler that compiles stylesheets on request.
//!
//! ```text
//! GET /styles/main.css → <sass_file_path>/main.scss → grass → text/css
//! ```
//!
//! Hosts nest the router returned by [`setup`]:
//!
//! ```ignore
//! let app = axum::Router::new().nest("/styles", sass_serve::setup(SetupOptions::default()));
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use camino::Utf8PathBuf;

use crate::compile::{Compiler, SassOptions};
use crate::error::{Error, Result};
use crate::importer::{Importers, TildeImporter};
use crate::paths::{is_plain_name, resolve_source_path, strip_css_suffix};
use crate::run_mode::RunMode;

/// Public caching for one day
pub const CACHE_ONE_DAY: &str = "public, max-age=86400";

const CSS_CONTENT_TYPE: &str = "text/css; charset=utf-8";

/// Options for one installed handler
#[derive(Debug, Clone)]
pub struct SetupOptions {
    /// Directory holding the stylesheet sources
    pub sass_file_path: Utf8PathBuf,
    /// Extension of the stylesheet sources, without the dot
    pub sass_file_ext: String,
    /// Keep embedding source maps in production
    pub embed_src_map_in_prod: bool,
    /// Resolve `~package/...` imports against `tilde_root`
    pub resolve_tildes: bool,
    /// Dependency directory for `~` imports
    pub tilde_root: Utf8PathBuf,
    /// Options merged into every compile
    pub sass_options: SassOptions,
    /// Import hooks consulted before the tilde resolver
    pub importers: Importers,
    pub run_mode: RunMode,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            sass_file_path: Utf8PathBuf::from("scss"),
            sass_file_ext: "scss".to_string(),
            embed_src_map_in_prod: false,
            resolve_tildes: false,
            tilde_root: Utf8PathBuf::from("node_modules"),
            sass_options: SassOptions::default(),
            importers: Vec::new(),
            run_mode: RunMode::from_env(),
        }
    }
}

/// State of one installed handler
#[derive(Debug)]
pub struct Stylesheets {
    compiler: Compiler,
    sass_file_path: Utf8PathBuf,
    sass_file_ext: String,
}

impl Stylesheets {
    pub fn new(options: SetupOptions) -> Self {
        let mut compiler = Compiler::new(options.sass_options, options.run_mode)
            .embed_src_map_in_prod(options.embed_src_map_in_prod);
        for importer in options.importers {
            compiler = compiler.with_shared_importer(importer);
        }
        if options.resolve_tildes {
            compiler = compiler.with_importer(TildeImporter::new(options.tilde_root));
        }

        tracing::debug!(
            sass_file_path = %options.sass_file_path,
            sass_file_ext = %options.sass_file_ext,
            run_mode = ?options.run_mode,
            importers = compiler.config().importers.len(),
            "stylesheet handler installed"
        );

        Self {
            compiler,
            sass_file_path: options.sass_file_path,
            sass_file_ext: options.sass_file_ext,
        }
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Compile the stylesheet named `css_name` (`main` or `main.css`).
    pub async fn render(&self, css_name: &str) -> Result<Response> {
        let name = strip_css_suffix(css_name);
        if !is_plain_name(name) {
            return Err(Error::InvalidName(css_name.to_string()));
        }

        let sass_file = resolve_source_path(&self.sass_file_path, name, &self.sass_file_ext);
        let css = self.compiler.compile(&sass_file).await?;

        let mut response = ([(header::CONTENT_TYPE, CSS_CONTENT_TYPE)], css).into_response();
        if self.compiler.run_mode().is_production() {
            response
                .headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_ONE_DAY));
        }
        Ok(response)
    }
}

/// Router serving `/{css_name}`, to be nested by the host.
pub fn setup(options: SetupOptions) -> Router {
    router(Arc::new(Stylesheets::new(options)))
}

/// Like [`setup`], for an already installed handler.
pub fn router(sheets: Arc<Stylesheets>) -> Router {
    Router::new()
        .route("/{css_name}", get(css_handler))
        .with_state(sheets)
}

/// Compile and serve one stylesheet. Errors are left to [`Error`]'s
/// `IntoResponse`.
pub async fn css_handler(
    State(sheets): State<Arc<Stylesheets>>,
    Path(css_name): Path<String>,
) -> Result<Response> {
    sheets.render(&css_name).await
}

/// Logging middleware
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

    if status >= 500 {
        tracing::error!("{} {} -> {} in {:.1}ms", method, path, status, latency_ms);
    } else {
        tracing::debug!("{} {} -> {} in {:.1}ms", method, path, status, latency_ms);
    }

    response
}
