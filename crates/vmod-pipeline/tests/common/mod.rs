//! Shared fixtures for pipeline integration tests.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use vmod_media::{MediaEngine, MediaError, MediaInfo, MediaResult};
use vmod_models::{AnalysisEvent, VideoId, VideoRecord};
use vmod_pipeline::{AnalysisConfig, Analyzer};
use vmod_store::{MemoryStore, VideoStore};

/// Solid RGB color every stub frame is filled with.
pub const SKIN: [u8; 3] = [210, 150, 120];
pub const NON_SKIN: [u8; 3] = [30, 120, 40];

/// What the stub writes for each requested frame.
#[derive(Debug, Clone, Copy)]
pub enum FrameKind {
    Solid([u8; 3]),
    /// A file that is not a decodable image.
    Corrupt,
}

/// Scripted in-process replacement for the FFmpeg engine.
pub struct StubMediaEngine {
    pub probe_result: Result<MediaInfo, ()>,
    pub frame_kind: FrameKind,
    pub extract_fails: bool,
    pub thumbnail_fails: bool,
    /// Artificial latency inside `extract_frames`, for concurrency tests.
    pub extract_delay: Duration,
    /// Artificial latency inside `generate_thumbnail`.
    pub thumbnail_delay: Duration,
    pub extract_calls: AtomicUsize,
    pub thumbnail_calls: AtomicUsize,
}

impl StubMediaEngine {
    pub fn new(info: MediaInfo) -> Self {
        Self {
            probe_result: Ok(info),
            frame_kind: FrameKind::Solid(NON_SKIN),
            extract_fails: false,
            thumbnail_fails: false,
            extract_delay: Duration::ZERO,
            thumbnail_delay: Duration::from_millis(25),
            extract_calls: AtomicUsize::new(0),
            thumbnail_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_frames(mut self, kind: FrameKind) -> Self {
        self.frame_kind = kind;
        self
    }

    pub fn with_failing_extract(mut self) -> Self {
        self.extract_fails = true;
        self
    }

    pub fn with_failing_thumbnail(mut self) -> Self {
        self.thumbnail_fails = true;
        self
    }

    pub fn with_extract_delay(mut self, delay: Duration) -> Self {
        self.extract_delay = delay;
        self
    }

    pub fn with_thumbnail_delay(mut self, delay: Duration) -> Self {
        self.thumbnail_delay = delay;
        self
    }

    pub fn extract_count(&self) -> usize {
        self.extract_calls.load(Ordering::SeqCst)
    }

    pub fn thumbnail_count(&self) -> usize {
        self.thumbnail_calls.load(Ordering::SeqCst)
    }
}

/// Metadata for a normal 30-second clip.
pub fn video_info(duration: f64) -> MediaInfo {
    MediaInfo {
        duration,
        width: Some(1920),
        height: Some(1080),
        bitrate: Some(4_000_000),
        codec: Some("h264".to_string()),
        frame_rate: 30.0,
        has_video_stream: true,
    }
}

/// Metadata for an audio-only file.
pub fn audio_only_info(duration: f64) -> MediaInfo {
    MediaInfo {
        duration,
        has_video_stream: false,
        ..MediaInfo::default()
    }
}

#[async_trait]
impl MediaEngine for StubMediaEngine {
    async fn probe(&self, _path: &Path) -> MediaResult<MediaInfo> {
        match &self.probe_result {
            Ok(info) => Ok(info.clone()),
            Err(()) => Err(MediaError::FfprobeFailed {
                message: "stubbed probe failure".to_string(),
                stderr: None,
            }),
        }
    }

    async fn extract_frames(
        &self,
        _path: &Path,
        timestamps: &[f64],
        out_dir: &Path,
        _width: u32,
    ) -> MediaResult<Vec<PathBuf>> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        if !self.extract_delay.is_zero() {
            tokio::time::sleep(self.extract_delay).await;
        }
        if self.extract_fails {
            return Err(MediaError::ffmpeg_failed(
                "stubbed extraction failure",
                None,
                Some(1),
            ));
        }

        tokio::fs::create_dir_all(out_dir).await?;
        let mut paths = Vec::with_capacity(timestamps.len());
        for i in 0..timestamps.len() {
            let path = out_dir.join(format!("frame_{:03}.png", i + 1));
            match self.frame_kind {
                FrameKind::Solid(rgb) => {
                    let img = image::RgbImage::from_pixel(64, 64, image::Rgb(rgb));
                    img.save(&path)
                        .map_err(|e| MediaError::ffmpeg_failed(e.to_string(), None, None))?;
                }
                FrameKind::Corrupt => {
                    tokio::fs::write(&path, b"not an image").await?;
                }
            }
            paths.push(path);
        }
        Ok(paths)
    }

    async fn generate_thumbnail(
        &self,
        _path: &Path,
        _timestamp: f64,
        out_path: &Path,
    ) -> MediaResult<()> {
        self.thumbnail_calls.fetch_add(1, Ordering::SeqCst);
        if !self.thumbnail_delay.is_zero() {
            tokio::time::sleep(self.thumbnail_delay).await;
        }
        if self.thumbnail_fails {
            return Err(MediaError::ffmpeg_failed(
                "stubbed thumbnail failure",
                None,
                Some(1),
            ));
        }
        if let Some(parent) = out_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(out_path, b"jpeg").await?;
        Ok(())
    }
}

/// A full harness around one analyzer instance.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub engine: Arc<StubMediaEngine>,
    pub analyzer: Arc<Analyzer>,
    pub work_dir: tempfile::TempDir,
    _thumbs_dir: tempfile::TempDir,
}

impl Harness {
    pub fn new(engine: StubMediaEngine) -> Self {
        let work_dir = tempfile::tempdir().unwrap();
        let thumbs_dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig {
            work_dir: work_dir.path().to_path_buf(),
            thumbnails_dir: thumbs_dir.path().to_path_buf(),
            media_root: PathBuf::from("/nonexistent-media-root"),
            ..AnalysisConfig::default()
        };
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(engine);
        let analyzer = Analyzer::new(store.clone(), engine.clone(), config);
        Self {
            store,
            engine,
            analyzer,
            work_dir,
            _thumbs_dir: thumbs_dir,
        }
    }

    /// Seed an uploaded record and return its id.
    pub async fn seed(&self) -> VideoId {
        let record = VideoRecord::new("tenant-1", "user-1", "clip.mp4", "clip.mp4");
        let id = record.id.clone();
        self.store.insert(record).await;
        id
    }

    pub async fn record(&self, id: &VideoId) -> VideoRecord {
        self.store
            .get(id)
            .await
            .unwrap()
            .expect("record must exist")
    }

    /// Per-run transient frame directory for a video.
    pub fn frames_dir(&self, id: &VideoId) -> PathBuf {
        self.work_dir.path().join(id.as_str())
    }
}

/// Drain events until the run's completion event arrives.
pub async fn wait_for_completion(
    rx: &mut tokio::sync::broadcast::Receiver<AnalysisEvent>,
) -> (Vec<AnalysisEvent>, AnalysisEvent) {
    let mut progress = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for completion event")
            .expect("event channel closed");
        match event {
            AnalysisEvent::Progress { .. } => progress.push(event),
            AnalysisEvent::Completed { .. } => {
                // Let the detached run task finish its cleanup and release
                // the in-flight slot before the test continues.
                tokio::time::sleep(Duration::from_millis(10)).await;
                return (progress, event);
            }
        }
    }
}

/// Poll the store until `predicate` holds for the record.
pub async fn wait_for_record(
    store: &MemoryStore,
    id: &VideoId,
    predicate: impl Fn(&VideoRecord) -> bool,
) -> VideoRecord {
    for _ in 0..100 {
        if let Some(record) = store.get(id).await.unwrap() {
            if predicate(&record) {
                return record;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("record for {} never reached the expected state", id);
}
