mod support;

use std::path::PathBuf;

use support::{trimmed_bytes, Harness, StubRetriever, StubTranscoder, SOURCE_BYTES};
use ytclip::{ClipError, ClipParams, TrimStrategy};

#[cfg(unix)]
use std::{sync::Arc, time::Duration};

#[cfg(unix)]
use ytclip::adapters::{PollingWatcher, YtdlpAdapter};
#[cfg(unix)]
use ytclip::config::YtdlpConfig;
#[cfg(unix)]
use ytclip::ports::NoopObserver;
#[cfg(unix)]
use ytclip::{ClipInteractor, ClipPorts, ClipSettings};

fn params(start: &str, end: &str, quality: Option<&str>) -> ClipParams {
    ClipParams {
        url: Some("u".to_string()),
        start: Some(start.to_string()),
        end: Some(end.to_string()),
        quality: quality.map(str::to_string),
    }
}

#[tokio::test]
async fn test_clip_480p_scenario() {
    let harness = Harness::new(StubRetriever::writing(SOURCE_BYTES), StubTranscoder::copying());

    let output = harness
        .interactor
        .clip(&params("00:00:10", "00:00:20", Some("480p")))
        .await
        .unwrap();

    let retrievals = harness.retriever.jobs();
    assert_eq!(retrievals.len(), 1);
    assert_eq!(retrievals[0].source_url, "u");
    assert!(retrievals[0].format_selector.contains("height<=480"));
    assert!(!retrievals[0].format_selector.contains("height<=720"));
    assert_eq!(retrievals[0].section, None);

    let transcodes = harness.transcoder.jobs();
    assert_eq!(transcodes.len(), 1);
    assert_eq!(transcodes[0].start_seconds, 10);
    assert_eq!(transcodes[0].duration_seconds, 10);
    assert_eq!(transcodes[0].input_path, retrievals[0].output_path);
    assert_ne!(transcodes[0].output_path, transcodes[0].input_path);

    assert_eq!(output.path, transcodes[0].output_path);
    assert_eq!(std::fs::read(&output.path).unwrap(), trimmed_bytes(10, 10));
    assert_eq!(output.size, trimmed_bytes(10, 10).len() as u64);
    assert!(harness.cleanup.calls().is_empty());

    drop(output);
    assert_eq!(harness.cleanup.calls().len(), 1);
    assert!(harness.temp_files().is_empty());
}

#[tokio::test]
async fn test_retrieval_failure_cleans_every_path() {
    let harness = Harness::new(
        StubRetriever::failing("yt-dlp exited with code 1: ERROR: Video unavailable"),
        StubTranscoder::copying(),
    );

    let result = harness
        .interactor
        .clip(&params("00:00:10", "00:00:20", None))
        .await;

    match result {
        Err(ClipError::RetrievalFailed { message }) => assert!(message.contains("code 1")),
        other => panic!("expected RetrievalFailed, got {:?}", other),
    }
    assert!(harness.transcoder.jobs().is_empty());

    let calls = harness.cleanup.calls();
    assert_eq!(calls.len(), 1);
    let source = harness.retriever.jobs()[0].output_path.clone();
    let mut part = source.clone().into_os_string();
    part.push(".part");
    assert!(calls[0].contains(&source));
    assert!(calls[0].contains(&PathBuf::from(part)));
    assert!(harness.temp_files().is_empty());
}

#[tokio::test]
async fn test_reversed_range_spawns_nothing() {
    let harness = Harness::new(StubRetriever::writing(SOURCE_BYTES), StubTranscoder::copying());

    let result = harness
        .interactor
        .clip(&params("00:00:10", "00:00:05", None))
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, ClipError::InvalidRange { .. }));
    assert_eq!(err.to_string(), "end must be > start");
    assert!(harness.retriever.jobs().is_empty());
    assert!(harness.transcoder.jobs().is_empty());
    assert!(harness.temp_files().is_empty());
}

#[tokio::test]
async fn test_sixteen_minute_clip_rejected() {
    let harness = Harness::new(StubRetriever::writing(SOURCE_BYTES), StubTranscoder::copying());

    let result = harness
        .interactor
        .clip(&params("00:00:00", "00:16:00", None))
        .await;

    assert!(matches!(
        result,
        Err(ClipError::DurationExceeded {
            duration: 960,
            max: 900
        })
    ));
    assert!(harness.retriever.jobs().is_empty());
}

#[tokio::test]
async fn test_default_quality_is_720p() {
    let harness = Harness::new(StubRetriever::writing(SOURCE_BYTES), StubTranscoder::copying());

    let _output = harness
        .interactor
        .clip(&params("1:00", "1:30", None))
        .await
        .unwrap();

    let job = &harness.retriever.jobs()[0];
    assert!(job.format_selector.contains("height<=720"));
    assert_eq!(harness.transcoder.jobs()[0].start_seconds, 60);
    assert_eq!(harness.transcoder.jobs()[0].duration_seconds, 30);
}

#[tokio::test]
async fn test_transcode_failure_cleans_up() {
    let harness = Harness::new(
        StubRetriever::writing(SOURCE_BYTES),
        StubTranscoder::failing("ffmpeg exited with code 1"),
    );

    let result = harness
        .interactor
        .clip(&params("00:00:10", "00:00:20", None))
        .await;

    assert!(matches!(result, Err(ClipError::TranscodeFailed { .. })));
    assert_eq!(harness.cleanup.calls().len(), 1);
    assert!(harness.temp_files().is_empty());
}

#[tokio::test]
async fn test_in_place_strategy_replaces_source() {
    let harness = Harness::with_settings(
        StubRetriever::writing(SOURCE_BYTES),
        StubTranscoder::copying(),
        |settings| settings.trim_strategy = TrimStrategy::InPlace,
    );

    let output = harness
        .interactor
        .clip(&params("00:00:10", "00:00:20", None))
        .await
        .unwrap();

    let source = harness.retriever.jobs()[0].output_path.clone();
    assert_eq!(output.path, source);
    assert_eq!(std::fs::read(&source).unwrap(), trimmed_bytes(10, 10));
    assert_eq!(harness.temp_files(), vec![source]);

    drop(output);
    assert!(harness.temp_files().is_empty());
}

#[tokio::test]
async fn test_server_side_sections() {
    let harness = Harness::with_settings(
        StubRetriever::writing(SOURCE_BYTES),
        StubTranscoder::copying(),
        |settings| settings.server_side_sections = true,
    );

    let _output = harness
        .interactor
        .clip(&params("00:00:10", "00:00:20", None))
        .await
        .unwrap();

    let section = harness.retriever.jobs()[0].section.unwrap();
    assert_eq!((section.start, section.end), (10, 20));
    let transcode = &harness.transcoder.jobs()[0];
    assert_eq!(transcode.start_seconds, 0);
    assert_eq!(transcode.duration_seconds, 10);
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let harness = Harness::new(StubRetriever::writing(SOURCE_BYTES), StubTranscoder::copying());

    let result = harness
        .interactor
        .clip(&ClipParams {
            url: Some("  ".to_string()),
            ..params("00:00:10", "00:00:20", None)
        })
        .await;

    assert!(matches!(result, Err(ClipError::MissingParameters)));
    assert!(harness.retriever.jobs().is_empty());
}

/// yt-dlp stand-in that writes per-format downloads next to `-o` and fails the merge
#[cfg(unix)]
const FAILING_MERGE_SCRIPT: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; fi
  shift
done
stem="${out%.mp4}"
printf partial > "$stem.f137.mp4.part"
printf partial > "$stem.f137.mp4.part-Frag2"
printf audio > "$stem.f140.m4a"
echo "ERROR: merge failed" >&2
exit 1
"#;

#[cfg(unix)]
#[tokio::test]
async fn test_failed_merge_removes_per_format_downloads() {
    use std::os::unix::fs::PermissionsExt;

    let tools = tempfile::tempdir().unwrap();
    let script = tools.path().join("yt-dlp");
    std::fs::write(&script, FAILING_MERGE_SCRIPT).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let temp = tempfile::tempdir().unwrap();
    let cleanup = Arc::new(support::RecordingCleanup::default());
    let ports = ClipPorts {
        retrieve: Arc::new(YtdlpAdapter::new(&script, YtdlpConfig::default())),
        transcode: Arc::new(StubTranscoder::copying()),
        watch: Arc::new(PollingWatcher::new(
            Duration::from_millis(5),
            Duration::from_secs(2),
        )),
        cleanup: cleanup.clone(),
        observer: Arc::new(NoopObserver),
    };
    let interactor = ClipInteractor::new(ports, ClipSettings::with_temp_dir(temp.path()));

    let result = interactor
        .clip(&params("00:00:10", "00:00:20", None))
        .await;

    match result {
        Err(ClipError::RetrievalFailed { message }) => {
            assert!(message.contains("merge failed"), "{}", message)
        }
        other => panic!("expected RetrievalFailed, got {:?}", other),
    }
    assert_eq!(cleanup.calls().len(), 1);
    assert!(
        support::list_files(temp.path()).is_empty(),
        "left behind: {:?}",
        support::list_files(temp.path())
    );
}
