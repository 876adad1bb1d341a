//! Safety utilities to prevent accidental file deletion.
//!
//! The enriched artifact replaces any existing file at the output path, so the
//! path is validated against the inputs before anything is removed.

use std::path::Path;

use crate::error::{PipelineError, Result};

/// Validates that an output path is safe to overwrite.
///
/// Checks:
/// - Output filename must contain the required pattern (e.g., "enriched")
/// - Output cannot be the same as any of the provided source paths
///
/// # Returns
/// * `Ok(())` if the output path is safe
/// * `Err(PipelineError::UnsafeOutput)` describing the failed check
pub fn validate_output_path(
    output: &Path,
    required_pattern: &str,
    source_paths: &[&Path],
) -> Result<()> {
    let output_name = output.file_name().and_then(|n| n.to_str()).unwrap_or("");

    if !output_name.contains(required_pattern) {
        return Err(PipelineError::UnsafeOutput(format!(
            "output file '{}' must contain '{}' in the name",
            output.display(),
            required_pattern
        )));
    }

    for source in source_paths {
        if output == *source {
            return Err(PipelineError::UnsafeOutput(format!(
                "output '{}' cannot be the same as source '{}'",
                output.display(),
                source.display()
            )));
        }
    }

    Ok(())
}
