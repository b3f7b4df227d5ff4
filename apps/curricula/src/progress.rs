//! # Progress Files
//!
//! Learner progress is owned by an external store. The CLI only reads a
//! snapshot of it: a JSON object mapping each subject to its completed node
//! paths, oldest first.
//!
//! ```json
//! { "Math": ["Math/Measurement/Units/Feet", "Math/Measurement/Units/Pounds"] }
//! ```

use curricula_core::{CurriculumError, Progress};
use std::path::Path;

/// Maximum progress file size (8 MB).
const MAX_PROGRESS_FILE_SIZE: u64 = 8 * 1024 * 1024;

/// Read a progress file. `None` yields empty progress.
pub fn load_progress(path: Option<&Path>) -> Result<Progress, CurriculumError> {
    let Some(path) = path else {
        return Ok(Progress::new());
    };

    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(CurriculumError::InvalidDocument(format!(
            "progress path '{}' is not a regular file",
            path.display()
        )));
    }
    if metadata.len() > MAX_PROGRESS_FILE_SIZE {
        return Err(CurriculumError::InvalidDocument(format!(
            "progress file is {} bytes, exceeding the maximum of {} bytes",
            metadata.len(),
            MAX_PROGRESS_FILE_SIZE
        )));
    }

    let bytes = std::fs::read(path)?;
    parse_progress(&bytes)
}

/// Parse progress JSON.
pub fn parse_progress(bytes: &[u8]) -> Result<Progress, CurriculumError> {
    let progress: Progress = serde_json::from_slice(bytes)?;
    Ok(progress)
}

/// Completed paths recorded for `subject`, matched case-insensitively.
pub fn paths_for<'a>(progress: &'a Progress, subject: &str) -> &'a [String] {
    progress
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(subject))
        .map(|(_, paths)| paths.as_slice())
        .unwrap_or(&[])
}
