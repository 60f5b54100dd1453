// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ClipError, ClipResult};

/// A point in a video as `HH:MM:SS` text together with its value in whole seconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timecode {
    seconds: u64,
}

impl Timecode {
    /// Create a new Timecode from seconds
    pub fn from_seconds(seconds: u64) -> Self {
        Self { seconds }
    }

    /// Parse `HH:MM:SS` text.
    ///
    /// The rightmost field is seconds, then minutes, then hours. Missing
    /// high-order fields count as zero, so `"90"` and `"1:30"` are accepted.
    pub fn parse(text: &str) -> ClipResult<Self> {
        let invalid = || ClipError::InvalidFormat {
            time: text.to_string(),
        };

        let trimmed = text.trim();
        let fields: Vec<&str> = trimmed.split(':').collect();
        if trimmed.is_empty() || fields.len() > 3 {
            return Err(invalid());
        }

        let mut seconds: u64 = 0;
        for field in &fields {
            if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let value: u64 = field.parse().map_err(|_| invalid())?;
            seconds = seconds
                .checked_mul(60)
                .and_then(|s| s.checked_add(value))
                .ok_or_else(invalid)?;
        }

        Ok(Self { seconds })
    }

    /// Value in whole seconds
    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Format seconds as zero-padded `HH:MM:SS`
    pub fn format(seconds: u64) -> String {
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        let secs = seconds % 60;
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    }

    /// Canonical `HH:MM:SS` text of this timecode
    pub fn normalize(&self) -> String {
        Self::format(self.seconds)
    }
}

impl FromStr for Timecode {
    type Err = ClipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalize())
    }
}

/// Requested vertical resolution cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Quality {
    #[default]
    P720,
    P480,
    P360,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::P720, Quality::P480, Quality::P360];

    /// Maximum frame height in pixels
    pub fn height(self) -> u32 {
        match self {
            Quality::P720 => 720,
            Quality::P480 => 480,
            Quality::P360 => 360,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quality::P720 => "720p",
            Quality::P480 => "480p",
            Quality::P360 => "360p",
        }
    }
}

impl FromStr for Quality {
    type Err = ClipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "720p" => Ok(Quality::P720),
            "480p" => Ok(Quality::P480),
            "360p" => Ok(Quality::P360),
            _ => Err(ClipError::UnsupportedQuality {
                quality: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated clip bounds in whole seconds, `end > start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRange {
    pub start: u64,
    pub end: u64,
}

impl ClipRange {
    /// Length of the clip in seconds
    pub fn duration(&self) -> u64 {
        self.end - self.start
    }
}

/// Raw caller input before validation
#[derive(Debug, Clone, Default)]
pub struct ClipParams {
    pub url: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub quality: Option<String>,
}

/// An accepted clip request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipRequest {
    url: String,
    start: Timecode,
    end: Timecode,
    range: ClipRange,
    quality: Quality,
}

impl ClipRequest {
    /// Validate raw parameters into a request.
    ///
    /// Missing fields are reported before timecode syntax, which is reported
    /// before range problems.
    pub fn from_params(params: &ClipParams, max_clip_seconds: u64) -> ClipResult<Self> {
        let non_blank = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let (Some(url), Some(start), Some(end)) = (
            non_blank(&params.url),
            non_blank(&params.start),
            non_blank(&params.end),
        ) else {
            return Err(ClipError::MissingParameters);
        };

        let start = Timecode::parse(&start)?;
        let end = Timecode::parse(&end)?;
        let quality = match non_blank(&params.quality) {
            Some(q) => q.parse()?,
            None => Quality::default(),
        };

        crate::domain::rules::validate_range(start.seconds(), end.seconds(), max_clip_seconds)?;

        Ok(Self {
            url,
            range: ClipRange {
                start: start.seconds(),
                end: end.seconds(),
            },
            start,
            end,
            quality,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn start(&self) -> &Timecode {
        &self.start
    }

    pub fn end(&self) -> &Timecode {
        &self.end
    }

    pub fn range(&self) -> ClipRange {
        self.range
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }
}

/// How the trimmed artifact is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimStrategy {
    /// Write the trimmed clip to a second file
    #[default]
    Separate,
    /// Replace the retrieved file with the trimmed clip
    InPlace,
}

impl FromStr for TrimStrategy {
    type Err = ClipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "separate" => Ok(TrimStrategy::Separate),
            "in_place" | "in-place" | "inplace" => Ok(TrimStrategy::InPlace),
            other => Err(ClipError::config(format!(
                "Invalid trim strategy: {}. Valid strategies: separate, in_place",
                other
            ))),
        }
    }
}

/// One invocation of the retrieval tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalJob {
    pub source_url: String,
    pub format_selector: String,
    pub output_path: PathBuf,
    /// Restrict retrieval to this window when the tool supports partial download
    pub section: Option<ClipRange>,
}

/// One invocation of the transcode tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub start_seconds: u64,
    pub duration_seconds: u64,
}

/// Which artifact a watch is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Source,
    Trimmed,
}

/// Orchestration states of a single clip request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipState {
    Validating,
    Retrieving,
    WaitingStable(ArtifactKind),
    Trimming,
    Responding,
    CleaningUp,
    Done,
    Error(&'static str),
}

impl fmt::Display for ClipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipState::Validating => write!(f, "validating"),
            ClipState::Retrieving => write!(f, "retrieving"),
            ClipState::WaitingStable(ArtifactKind::Source) => write!(f, "waiting_stable(source)"),
            ClipState::WaitingStable(ArtifactKind::Trimmed) => write!(f, "waiting_stable(trimmed)"),
            ClipState::Trimming => write!(f, "trimming"),
            ClipState::Responding => write!(f, "responding"),
            ClipState::CleaningUp => write!(f, "cleaning_up"),
            ClipState::Done => write!(f, "done"),
            ClipState::Error(kind) => write!(f, "error({})", kind),
        }
    }
}
