// Domain rules - Request validation and naming policies

use std::path::Path;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::utils::path::sanitize_filename;
use crate::utils::time::hms_compact;

/// Stem used when a title sanitizes down to nothing
const FALLBACK_STEM: &str = "clip";

/// Validation applied before a request may be submitted
pub struct RequestValidator;

impl RequestValidator {
    /// Require a source URL and an output directory
    pub fn validate_inputs(source_url: &str, output_directory: &Path) -> Result<(), DomainError> {
        if source_url.trim().is_empty() {
            return Err(DomainError::MissingField("source URL"));
        }
        if output_directory.as_os_str().is_empty() {
            return Err(DomainError::MissingField("output folder"));
        }
        Ok(())
    }

    /// Require `start < end <= duration`
    pub fn validate_range(start: u64, end: u64, duration: u64) -> Result<(), DomainError> {
        if start >= end {
            return Err(DomainError::InvalidTimeRange(format!(
                "start ({}s) must be before end ({}s)",
                start, end
            )));
        }
        if end > duration {
            return Err(DomainError::InvalidTimeRange(format!(
                "end ({}s) is past the end of the video ({}s)",
                end, duration
            )));
        }
        Ok(())
    }
}

/// Naming of produced clips
pub struct ClipNaming;

impl ClipNaming {
    /// `<sanitized title>_<start HHMMSS>_<end HHMMSS>.<ext>`
    ///
    /// Reserved characters are stripped and whitespace runs become a single `_`.
    pub fn clip_file_name(title: &str, start: u64, end: u64, format: OutputFormat) -> String {
        format!(
            "{}_{}_{}.{}",
            Self::title_stem(title),
            hms_compact(start),
            hms_compact(end),
            format.extension()
        )
    }

    /// File-system safe stem derived from a video title
    pub fn title_stem(title: &str) -> String {
        let stem = sanitize_filename(title)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        if stem.is_empty() {
            FALLBACK_STEM.to_string()
        } else {
            stem
        }
    }
}

#[cfg(test)]
mod tests;
