//! Delete generated stylesheets when the process is interrupted.
//!
//! The first [`register_cleanup`] call installs a Ctrl-C listener; later calls
//! only move the target. The most recently registered directory is the one
//! deleted. The listener runs on its own thread and runtime, so it outlives
//! whichever runtime (if any) registered it.
//!
//! The outcome is published to [`subscribe`]rs so the entry point decides how
//! to exit. When nobody subscribed, the listener exits the process itself
//! (status 1 on failure) so the interrupt is never swallowed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use camino::{Utf8Path, Utf8PathBuf};
use tokio::sync::watch;

use crate::error::{Error, Result};

static HANDLER_INSTALLED: AtomicBool = AtomicBool::new(false);

static CLEANUP_TARGET: Mutex<Option<Utf8PathBuf>> = Mutex::new(None);

type Outcome = Option<Arc<Result<Cleaned>>>;

static OUTCOME: OnceLock<watch::Sender<Outcome>> = OnceLock::new();

/// What the interrupt cleanup did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleaned {
    /// The directory was deleted
    Deleted(Utf8PathBuf),
    /// The directory did not exist
    Missing(Utf8PathBuf),
    /// No directory was registered
    NoTarget,
}

/// Register `output_dir` for deletion on interrupt.
///
/// Returns true only for the call that installed the listener.
pub fn register_cleanup(output_dir: &Utf8Path) -> bool {
    if let Ok(mut target) = CLEANUP_TARGET.lock() {
        *target = Some(output_dir.to_owned());
    }

    if HANDLER_INSTALLED.swap(true, Ordering::SeqCst) {
        return false; // Already installed
    }

    if let Err(e) = spawn_listener() {
        tracing::warn!(%output_dir, "CSS cleanup on exit disabled: {e}");
        HANDLER_INSTALLED.store(false, Ordering::SeqCst);
        return false;
    }

    tracing::debug!(%output_dir, "CSS cleanup on exit installed");
    true
}

fn spawn_listener() -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    std::thread::Builder::new()
        .name("css-cleanup".to_string())
        .spawn(move || runtime.block_on(listen_for_interrupt()))?;
    Ok(())
}

/// Whether the interrupt listener has been installed
pub fn is_registered() -> bool {
    HANDLER_INSTALLED.load(Ordering::SeqCst)
}

/// Directory that will be deleted on interrupt
pub fn cleanup_target() -> Option<Utf8PathBuf> {
    CLEANUP_TARGET.lock().ok().and_then(|target| target.clone())
}

fn outcome_sender() -> &'static watch::Sender<Outcome> {
    OUTCOME.get_or_init(|| watch::channel(None).0)
}

/// Receives the interrupt cleanup outcome.
pub struct CleanupWatch {
    rx: watch::Receiver<Outcome>,
}

/// Subscribe to the cleanup outcome. While a subscription is alive the
/// listener leaves exiting to the subscriber.
pub fn subscribe() -> CleanupWatch {
    CleanupWatch {
        rx: outcome_sender().subscribe(),
    }
}

impl CleanupWatch {
    /// Wait for an interrupt and the cleanup that follows it.
    pub async fn interrupted(mut self) -> Arc<Result<Cleaned>> {
        match self.rx.wait_for(Option::is_some).await {
            Ok(outcome) => match &*outcome {
                Some(result) => Arc::clone(result),
                None => Arc::new(Ok(Cleaned::NoTarget)),
            },
            // the sender lives in a static and is never dropped
            Err(_) => Arc::new(Ok(Cleaned::NoTarget)),
        }
    }
}

async fn listen_for_interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C, CSS cleanup disabled: {e}");
        return;
    }

    tracing::info!("Exiting, running CSS cleanup");
    let result = match cleanup_target() {
        Some(target) => run_cleanup(&target).await,
        None => Ok(Cleaned::NoTarget),
    };
    if let Err(e) = &result {
        tracing::error!("CSS cleanup failed: {e}");
    }

    let sender = outcome_sender();
    if sender.receiver_count() == 0 {
        std::process::exit(if result.is_ok() { 0 } else { 1 });
    }
    sender.send_replace(Some(Arc::new(result)));
}

/// Recursively delete `target` if it is a directory.
pub async fn run_cleanup(target: &Utf8Path) -> Result<Cleaned> {
    let metadata = match fs_err::tokio::symlink_metadata(target).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(%target, "No CSS files to delete");
            return Ok(Cleaned::Missing(target.to_owned()));
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_dir() {
        return Err(Error::CleanupTargetNotDirectory(target.to_owned()));
    }

    fs_err::tokio::remove_dir_all(target).await?;
    tracing::info!(%target, "Deleted CSS files");
    Ok(Cleaned::Deleted(target.to_owned()))
}
