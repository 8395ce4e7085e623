//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which wires a full [`AppContext`] around a
//! local-filesystem store in a temp directory and a [`FakeSplitter`] that
//! stands in for ffmpeg.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request};
use bytes::Bytes;
use http_body_util::BodyExt;
use tempfile::TempDir;

use splitforge::config::{Config, StorageBackend};
use splitforge::server::{create_router, AppContext};
use splitforge::split::SplitService;
use splitforge::storage::{LocalStore, ObjectStore};
use splitforge_av::{ChunkSplitter, EncodingParams, ToolCommand, ToolInfo, ToolOutput, ToolRunner};
use splitforge_common::{Error, Result};

/// Tool runner that writes `chunks` files into the segment output directory
/// instead of running ffmpeg, or fails like ffmpeg would.
pub struct FakeSplitter {
    chunks: usize,
    fail: bool,
    /// Bytes found at the `-i` input of each run
    pub inputs: Mutex<Vec<Vec<u8>>>,
    /// Full argument list of each run
    pub calls: Mutex<Vec<Vec<String>>>,
}

impl FakeSplitter {
    pub fn producing(chunks: usize) -> Self {
        Self {
            chunks,
            fail: false,
            inputs: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::producing(0)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ToolRunner for FakeSplitter {
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        let args = command.get_args().to_vec();
        self.calls.lock().unwrap().push(args.clone());

        let input = args
            .iter()
            .position(|a| a == "-i")
            .map(|i| PathBuf::from(&args[i + 1]))
            .unwrap();
        self.inputs.lock().unwrap().push(std::fs::read(&input).unwrap());

        if self.fail {
            return Err(Error::processing(
                "ffmpeg",
                "input: Invalid data found when processing input",
            ));
        }

        let pattern = PathBuf::from(args.last().unwrap());
        let dir = pattern.parent().unwrap();
        for i in 0..self.chunks {
            std::fs::write(dir.join(format!("part_{i:03}.m4a")), format!("chunk-{i}")).unwrap();
        }
        Ok(ToolOutput::default())
    }
}

/// Local store that counts calls so tests can assert what was touched.
pub struct CountingStore {
    inner: LocalStore,
    pub downloads: AtomicUsize,
    pub uploads: AtomicUsize,
}

impl CountingStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            inner: LocalStore::new(root).unwrap(),
            downloads: AtomicUsize::new(0),
            uploads: AtomicUsize::new(0),
        }
    }

    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ObjectStore for CountingStore {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn download(&self, bucket: &str, path: &str) -> Result<Bytes> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.inner.download(bucket, path).await
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
        upsert: bool,
    ) -> Result<()> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.inner
            .upload(bucket, path, data, content_type, upsert)
            .await
    }
}

/// Fully wired application around temp-directory storage.
pub struct TestHarness {
    pub ctx: AppContext,
    pub store: Arc<CountingStore>,
    pub splitter: Arc<FakeSplitter>,
    root: TempDir,
}

impl TestHarness {
    pub fn new(splitter: FakeSplitter) -> Self {
        let root = tempfile::tempdir().unwrap();
        let storage_root = root.path().join("storage");
        let work_dir = root.path().join("work");
        std::fs::create_dir_all(&work_dir).unwrap();

        let mut config = Config::default();
        config.storage.backend = StorageBackend::Local;
        config.storage.local_root = Some(storage_root.clone());
        config.split.work_dir = Some(work_dir);

        let store = Arc::new(CountingStore::new(storage_root));
        let splitter = Arc::new(splitter);
        let chunk_splitter =
            ChunkSplitter::new(Some(PathBuf::from("ffmpeg")), EncodingParams::default())
                .with_runner(splitter.clone());

        let service = SplitService::from_config(&config, store.clone(), chunk_splitter).unwrap();
        let ffmpeg = ToolInfo {
            name: "ffmpeg".to_string(),
            available: true,
            version: Some("ffmpeg version test".to_string()),
            path: Some(PathBuf::from("ffmpeg")),
        };

        Self {
            ctx: AppContext::new(config, service, ffmpeg),
            store,
            splitter,
            root,
        }
    }

    pub fn router(&self) -> axum::Router {
        create_router(self.ctx.clone())
    }

    pub fn storage_root(&self) -> PathBuf {
        self.root.path().join("storage")
    }

    /// Place an object directly in the backing store.
    pub fn seed_object(&self, bucket: &str, path: &str, data: &[u8]) {
        let file = self.storage_root().join(bucket).join(path);
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(file, data).unwrap();
    }

    pub fn stored_object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        std::fs::read(self.storage_root().join(bucket).join(path)).ok()
    }

    /// Entries left behind in the workspace parent directory
    pub fn leftover_workspaces(&self) -> usize {
        count_entries(&self.root.path().join("work"))
    }
}

pub fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

pub fn split_request(body: serde_json::Value) -> Request<Body> {
    Request::post("/split")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
