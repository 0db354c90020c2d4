//! Test harness: a real axum server over a private copy of the fixtures.

use axum::Router;
use camino::{Utf8Path, Utf8PathBuf};
use sass_serve::{RunMode, SetupOptions, setup};
use tokio::sync::oneshot;

pub struct TestServer {
    _dir: tempfile::TempDir,
    pub root: Utf8PathBuf,
    base_url: String,
    client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Serve the fixtures under `/styles` in the given run mode.
    pub async fn start(run_mode: RunMode) -> Self {
        Self::start_with(run_mode, |_| {}).await
    }

    pub async fn start_with(run_mode: RunMode, configure: impl FnOnce(&mut SetupOptions)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let fixtures = Utf8Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        copy_dir(&fixtures, &root);

        let mut options = SetupOptions {
            sass_file_path: root.join("scss"),
            tilde_root: root.join("node_modules"),
            run_mode,
            ..Default::default()
        };
        configure(&mut options);

        let app = Router::new().nest("/styles", setup(options));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            _dir: dir,
            root,
            base_url: format!("http://{addr}"),
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
            shutdown: Some(shutdown),
        }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap_or_else(|e| panic!("GET {path} failed: {e}"))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

fn copy_dir(from: &Utf8Path, to: &Utf8Path) {
    fs_err::create_dir_all(to).unwrap();
    for entry in fs_err::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let name = entry.file_name().into_string().unwrap();
        let (src, dst) = (from.join(&name), to.join(&name));
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&src, &dst);
        } else {
            fs_err::copy(&src, &dst).unwrap();
        }
    }
}
