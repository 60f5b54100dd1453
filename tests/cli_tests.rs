use assert_cmd::Command;
use predicates::prelude::*;

/// Binary under test, isolated from the caller's environment and config files
fn ytclip(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("ytclip").unwrap();
    cmd.current_dir(dir);
    for var in [
        "PORT",
        "RUST_LOG",
        "YTCLIP_CONFIG",
        "YTCLIP_ENV",
        "YTCLIP_TEMP_DIR",
        "YTCLIP_MAX_CLIP_SECONDS",
        "YTCLIP_YTDLP_PATH",
        "YTCLIP_FFMPEG_PATH",
        "YTCLIP_LOG_LEVEL",
        "YTCLIP_LOG_FORMAT",
        "YTCLIP_MAX_CONCURRENT_JOBS",
        "YTCLIP_SERVER_SIDE_SECTIONS",
        "YTCLIP_TRIM_STRATEGY",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    ytclip(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("print-config"));
}

#[test]
fn test_print_config_defaults() {
    let dir = tempfile::tempdir().unwrap();
    ytclip(dir.path())
        .arg("print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("port = 3001"))
        .stdout(predicate::str::contains("max_clip_seconds = 900"))
        .stdout(predicate::str::contains("trim_strategy = \"separate\""));
}

#[test]
fn test_precedence_cli_over_env_over_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("ytclip.toml"),
        "[ytclip]\nport = 4000\nmax_clip_seconds = 60\n",
    )
    .unwrap();

    ytclip(dir.path())
        .arg("print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("port = 4000"))
        .stdout(predicate::str::contains("max_clip_seconds = 60"));

    ytclip(dir.path())
        .env("PORT", "5000")
        .arg("print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("port = 5000"));

    ytclip(dir.path())
        .env("PORT", "5000")
        .args(["print-config", "--port", "6000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("port = 6000"))
        .stdout(predicate::str::contains("max_clip_seconds = 60"));
}

#[test]
fn test_explicit_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "environment = \"production\"\n").unwrap();

    ytclip(dir.path())
        .arg("--config")
        .arg(&path)
        .arg("print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("environment = \"production\""));
}

#[test]
fn test_invalid_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("ytclip.toml"),
        "[watch]\ninterval_ms = 0\n",
    )
    .unwrap();

    ytclip(dir.path())
        .arg("print-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("interval_ms"));
}

#[test]
fn test_check_fails_without_tools() {
    let dir = tempfile::tempdir().unwrap();
    ytclip(dir.path())
        .env("YTCLIP_YTDLP_PATH", "/nonexistent/yt-dlp")
        .env("YTCLIP_FFMPEG_PATH", "/nonexistent/ffmpeg")
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("yt-dlp: unavailable"))
        .stdout(predicate::str::contains("ffmpeg: unavailable"));
}

#[test]
fn test_dotenv_selects_config_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("custom.toml"), "port = 4555\n").unwrap();
    std::fs::write(dir.path().join(".env"), "YTCLIP_CONFIG=custom.toml\n").unwrap();

    ytclip(dir.path())
        .arg("print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("port = 4555"));
}

#[test]
fn test_config_source_is_logged() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("ytclip.toml"), "port = 4000\n").unwrap();

    ytclip(dir.path())
        .env("YTCLIP_MAX_CLIP_SECONDS", "120")
        .arg("print-config")
        .assert()
        .success()
        .stderr(predicate::str::contains("Loaded configuration from"))
        .stderr(predicate::str::contains("ytclip.toml"))
        .stderr(predicate::str::contains(
            "Applied 1 environment variable overrides",
        ));
}
