//! `sass-serve` command line
//!
//! - `sass-serve serve` runs the stylesheet handler on a standalone server
//! - `sass-serve build` compiles the configured files into the output directory

use std::env;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use axum::Router;
use axum::middleware;
use eyre::{Result, eyre};
use facet::Facet;
use facet_args as args;
use owo_colors::OwoColorize;
use tracing_subscriber::prelude::*;

use sass_serve::cleanup::{self, Cleaned};
use sass_serve::config::ResolvedConfig;
use sass_serve::handler::{self, Stylesheets};
use sass_serve::{CompileMultipleOptions, ErrorPolicy, compile_and_save_multiple};

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_MOUNT: &str = "/styles";

/// Serve command - compile stylesheets on request
#[derive(Facet, Debug)]
struct ServeArgs {
    /// Port to listen on (default 4000)
    #[facet(args::named, args::short = 'p', default)]
    port: Option<u16>,

    /// Path the stylesheets are served under (default /styles)
    #[facet(args::named, default)]
    mount: Option<String>,

    /// Compile the configured `build` files first; they are deleted on Ctrl-C
    #[facet(args::named)]
    prebuild: bool,
}

/// Build command - compile stylesheets to disk
#[derive(Facet, Debug)]
struct BuildArgs {
    /// Log failures and keep going instead of stopping at the first one
    #[facet(args::named)]
    lenient: bool,

    /// Output directory (overrides the configured `css_path`)
    #[facet(args::named, args::short = 'o', default)]
    out: Option<String>,

    /// Files to compile instead of the configured list
    #[facet(args::positional, default)]
    files: Vec<String>,
}

#[derive(Facet, Debug)]
#[repr(u8)]
enum Command {
    /// Compile stylesheets on request
    Serve(ServeArgs),
    /// Compile stylesheets to disk
    Build(BuildArgs),
}

#[derive(Facet, Debug)]
struct Args {
    #[facet(args::subcommand)]
    command: Command,
}

fn parse_args() -> Result<Command, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    let args_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

    let parsed: Args = facet_args::from_slice(&args_refs).map_err(|e| {
        eprintln!("{:?}", miette::Report::new(e));
        "Failed to parse arguments".to_string()
    })?;

    Ok(parsed.command)
}

fn init_tracing() {
    let filter = tracing_subscriber::filter::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true).compact();
    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cmd = match parse_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    let result = match ResolvedConfig::discover() {
        Ok(config) => match cmd {
            Command::Serve(args) => serve(args, config).await,
            Command::Build(args) => build(args, config).await,
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {e:?}", "error".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn serve(args: ServeArgs, config: ResolvedConfig) -> Result<ExitCode> {
    let sheets = Arc::new(Stylesheets::new(config.setup.clone()));

    let mut cleanup_watch = None;
    if args.prebuild {
        let build = config
            .build
            .as_ref()
            .ok_or_else(|| eyre!("--prebuild needs a `build` section in .config/sass-serve.yaml"))?;
        // subscribe before anything registers the cleanup listener
        cleanup_watch = Some(cleanup::subscribe());
        compile_and_save_multiple(sheets.compiler(), build, ErrorPolicy::Strict).await?;
    }

    let mount = normalize_mount(args.mount.as_deref().unwrap_or(DEFAULT_MOUNT));
    let styles = handler::router(sheets);
    let app = if mount.is_empty() {
        Router::new().merge(styles)
    } else {
        Router::new().nest(&mount, styles)
    };
    let app = app.layer(middleware::from_fn(handler::log_requests));

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port.unwrap_or(DEFAULT_PORT)));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        "Serving {} at http://{}{}/",
        config.setup.sass_file_path,
        listener.local_addr()?,
        mount
    );

    let (outcome_tx, outcome_rx) = tokio::sync::oneshot::channel();
    let shutdown = async move {
        match cleanup_watch {
            Some(watch) => {
                let _ = outcome_tx.send(watch.interrupted().await);
            }
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!("Failed to listen for Ctrl-C: {e}");
                    std::future::pending::<()>().await;
                }
            }
        }
        tracing::info!("Shutting down");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    let Ok(outcome) = outcome_rx.await else {
        return Ok(ExitCode::SUCCESS);
    };
    match &*outcome {
        Ok(Cleaned::Deleted(dir)) => tracing::debug!(%dir, "cleanup done"),
        Ok(_) => {}
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            return Ok(ExitCode::FAILURE);
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn build(args: BuildArgs, config: ResolvedConfig) -> Result<ExitCode> {
    let configured = config.build.clone();
    let css_path = match (&args.out, &configured) {
        (Some(out), _) => config.root.join(out),
        (None, Some(build)) => build.css_path.clone(),
        (None, None) => {
            return Err(eyre!(
                "No output directory: pass --out or add a `build` section to .config/sass-serve.yaml"
            ));
        }
    };
    let sass_path = match &configured {
        Some(build) => build.sass_path.clone(),
        None => config.setup.sass_file_path.clone(),
    };
    let files = if args.files.is_empty() {
        configured.map(|build| build.files).unwrap_or_default()
    } else {
        args.files
    };
    if files.is_empty() {
        return Err(eyre!("No files to compile"));
    }

    let options = CompileMultipleOptions {
        sass_path,
        css_path,
        files,
    };
    let policy = if args.lenient {
        ErrorPolicy::Lenient
    } else {
        ErrorPolicy::Strict
    };

    let sheets = Stylesheets::new(config.setup);
    let report = compile_and_save_multiple(sheets.compiler(), &options, policy).await?;

    eprintln!(
        "{} {} stylesheet(s) into {}",
        "Compiled".green().bold(),
        report.written.len(),
        options.css_path
    );
    if !report.skipped.is_empty() {
        eprintln!(
            "{}: skipped {}",
            "warning".yellow().bold(),
            report.skipped.join(", ")
        );
    }
    Ok(ExitCode::SUCCESS)
}

/// `styles/` → `/styles`, `/` → `` (merge at the root)
fn normalize_mount(mount: &str) -> String {
    let trimmed = mount.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
