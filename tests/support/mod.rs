#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use ytclip::adapters::{FsCleanupAdapter, PollingWatcher};
use ytclip::domain::model::{RetrievalJob, TranscodeJob};
use ytclip::ports::{
    CleanupPort, NoopObserver, ProgressObserver, RetrievePort, ToolInfoPort, TranscodePort,
};
use ytclip::{ClipError, ClipInteractor, ClipPorts, ClipResult, ClipSettings};

pub const SOURCE_BYTES: &[u8] = b"full source media bytes";

/// In-process stand-in for yt-dlp
pub struct StubRetriever {
    outcome: Result<Vec<u8>, String>,
    jobs: Mutex<Vec<RetrievalJob>>,
}

impl StubRetriever {
    /// Exits 0 after writing `bytes` to the requested path
    pub fn writing(bytes: &[u8]) -> Self {
        Self {
            outcome: Ok(bytes.to_vec()),
            jobs: Mutex::new(Vec::new()),
        }
    }

    /// Exits non-zero after leaving a partial download behind
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn jobs(&self) -> Vec<RetrievalJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl RetrievePort for StubRetriever {
    async fn retrieve(
        &self,
        job: &RetrievalJob,
        observer: &dyn ProgressObserver,
    ) -> ClipResult<()> {
        self.jobs.lock().unwrap().push(job.clone());
        observer.on_start("yt-dlp", &job.source_url);

        match &self.outcome {
            Ok(bytes) => {
                tokio::fs::write(&job.output_path, bytes).await?;
                observer.on_progress("yt-dlp", 100.0);
                Ok(())
            }
            Err(message) => {
                let part = ytclip::utils::path::append_extension(&job.output_path, "part");
                tokio::fs::write(&part, b"partial").await?;
                Err(ClipError::RetrievalFailed {
                    message: message.clone(),
                })
            }
        }
    }
}

/// In-process stand-in for ffmpeg: copies the input range marker to the output
pub struct StubTranscoder {
    fail_with: Option<String>,
    jobs: Mutex<Vec<TranscodeJob>>,
}

impl StubTranscoder {
    pub fn copying() -> Self {
        Self {
            fail_with: None,
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn jobs(&self) -> Vec<TranscodeJob> {
        self.jobs.lock().unwrap().clone()
    }
}

/// What the stub transcoder writes for a job
pub fn trimmed_bytes(start: u64, duration: u64) -> Vec<u8> {
    format!("clip {}+{} of ", start, duration)
        .into_bytes()
        .into_iter()
        .chain(SOURCE_BYTES.iter().copied())
        .collect()
}

#[async_trait]
impl TranscodePort for StubTranscoder {
    async fn transcode(
        &self,
        job: &TranscodeJob,
        _observer: &dyn ProgressObserver,
    ) -> ClipResult<()> {
        self.jobs.lock().unwrap().push(job.clone());

        if let Some(message) = &self.fail_with {
            tokio::fs::write(&job.output_path, b"half").await?;
            return Err(ClipError::TranscodeFailed {
                message: message.clone(),
            });
        }

        let source = tokio::fs::read(&job.input_path).await?;
        assert_eq!(source, SOURCE_BYTES, "transcoder read an unexpected input");
        tokio::fs::write(
            &job.output_path,
            trimmed_bytes(job.start_seconds, job.duration_seconds),
        )
        .await?;
        Ok(())
    }
}

/// Real filesystem cleanup that also records every call
#[derive(Default)]
pub struct RecordingCleanup {
    calls: Mutex<Vec<Vec<PathBuf>>>,
}

impl RecordingCleanup {
    pub fn calls(&self) -> Vec<Vec<PathBuf>> {
        self.calls.lock().unwrap().clone()
    }
}

impl CleanupPort for RecordingCleanup {
    fn cleanup(&self, paths: &[PathBuf]) {
        self.calls.lock().unwrap().push(paths.to_vec());
        FsCleanupAdapter::new().cleanup(paths);
    }
}

pub struct StubToolInfo(pub Result<String, String>);

#[async_trait]
impl ToolInfoPort for StubToolInfo {
    async fn version(&self) -> ClipResult<String> {
        self.0.clone().map_err(|message| ClipError::RetrievalFailed { message })
    }
}

/// Interactor wired to stubs and an isolated temp root
pub struct Harness {
    pub temp: TempDir,
    pub retriever: Arc<StubRetriever>,
    pub transcoder: Arc<StubTranscoder>,
    pub cleanup: Arc<RecordingCleanup>,
    pub interactor: Arc<ClipInteractor>,
}

impl Harness {
    pub fn new(retriever: StubRetriever, transcoder: StubTranscoder) -> Self {
        Self::with_settings(retriever, transcoder, |_| {})
    }

    pub fn with_settings(
        retriever: StubRetriever,
        transcoder: StubTranscoder,
        configure: impl FnOnce(&mut ClipSettings),
    ) -> Self {
        let temp = tempfile::tempdir().unwrap();
        let retriever = Arc::new(retriever);
        let transcoder = Arc::new(transcoder);
        let cleanup = Arc::new(RecordingCleanup::default());

        let mut settings = ClipSettings::with_temp_dir(temp.path());
        configure(&mut settings);

        let ports = ClipPorts {
            retrieve: retriever.clone(),
            transcode: transcoder.clone(),
            watch: Arc::new(PollingWatcher::new(
                Duration::from_millis(5),
                Duration::from_secs(2),
            )),
            cleanup: cleanup.clone(),
            observer: Arc::new(NoopObserver),
        };

        Self {
            interactor: Arc::new(ClipInteractor::new(ports, settings)),
            temp,
            retriever,
            transcoder,
            cleanup,
        }
    }

    /// Files currently present in the temp root
    pub fn temp_files(&self) -> Vec<PathBuf> {
        list_files(self.temp.path())
    }
}

pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    files
}
