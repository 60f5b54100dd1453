// Domain rules - Business logic and policies

use std::collections::BTreeMap;

use crate::domain::model::*;
use crate::error::{ClipError, ClipResult};

/// Check clip ordering and span, returning the duration in seconds
pub fn validate_range(start_seconds: u64, end_seconds: u64, max_seconds: u64) -> ClipResult<u64> {
    if end_seconds <= start_seconds {
        return Err(ClipError::InvalidRange {
            start: start_seconds,
            end: end_seconds,
        });
    }

    let duration = end_seconds - start_seconds;
    if duration > max_seconds {
        return Err(ClipError::DurationExceeded {
            duration,
            max: max_seconds,
        });
    }

    Ok(duration)
}

/// Retrieval format selectors per quality
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityFormats {
    selectors: BTreeMap<Quality, String>,
}

impl QualityFormats {
    /// Selector for a combined video+audio stream capped at `height`.
    ///
    /// Prefers separate mp4/m4a streams merged into mp4, then a single mp4
    /// under the cap, then anything under the cap, then whatever is best.
    pub fn default_selector(height: u32) -> String {
        format!(
            "bestvideo[height<={h}][ext=mp4]+bestaudio[ext=m4a]/best[height<={h}][ext=mp4]/best[height<={h}]/best",
            h = height
        )
    }

    /// Built-in selectors with the given overrides applied.
    ///
    /// Override keys are quality names such as `"480p"`.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> ClipResult<Self> {
        let mut formats = Self::default();
        for (key, selector) in overrides {
            let quality: Quality = key.parse().map_err(|_| {
                ClipError::config(format!("Unknown quality in format overrides: {}", key))
            })?;
            if selector.trim().is_empty() {
                return Err(ClipError::config(format!(
                    "Format selector for {} cannot be empty",
                    key
                )));
            }
            formats.selectors.insert(quality, selector.trim().to_string());
        }
        Ok(formats)
    }

    pub fn selector(&self, quality: Quality) -> String {
        self.selectors
            .get(&quality)
            .cloned()
            .unwrap_or_else(|| Self::default_selector(quality.height()))
    }
}

impl Default for QualityFormats {
    fn default() -> Self {
        let selectors = Quality::ALL
            .iter()
            .map(|q| (*q, Self::default_selector(q.height())))
            .collect();
        Self { selectors }
    }
}

/// Where the transcode seek starts inside the retrieved file.
///
/// A section download already begins at the clip start, so the seek is zero.
pub fn transcode_seek(range: ClipRange, server_side_sections: bool) -> u64 {
    if server_side_sections {
        0
    } else {
        range.start
    }
}
