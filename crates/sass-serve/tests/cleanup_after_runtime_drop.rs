//! The interrupt listener must outlive the runtime that registered it.
//!
//! The listener is process-wide, so this binary holds a single test.

#![cfg(unix)]

use std::time::Duration;

use camino::Utf8PathBuf;
use sass_serve::cleanup::{self, Cleaned};
use tokio::signal::unix::{SignalKind, signal};

#[test]
fn cleanup_survives_the_registering_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let out = root.join("css");
    fs_err::create_dir_all(&out).unwrap();
    fs_err::write(out.join("main.css"), "a{}").unwrap();

    let watch = cleanup::subscribe();

    {
        let short_lived = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        short_lived.block_on(async {
            // Replaces the default SIGINT action before anything is sent
            let _sigint = signal(SignalKind::interrupt()).unwrap();
            assert!(cleanup::register_cleanup(&out));
        });
    }

    // outside any runtime: only moves the target
    assert!(!cleanup::register_cleanup(&out));
    assert!(cleanup::is_registered());

    // give the listener time to start waiting for Ctrl-C
    std::thread::sleep(Duration::from_millis(200));

    let status = std::process::Command::new("kill")
        .args(["-INT", &std::process::id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let outcome = runtime
        .block_on(async { tokio::time::timeout(Duration::from_secs(5), watch.interrupted()).await })
        .expect("cleanup should run after SIGINT");

    assert!(
        matches!(&*outcome, Ok(Cleaned::Deleted(deleted)) if *deleted == out),
        "got: {outcome:?}"
    );
    assert!(!out.exists());
}
