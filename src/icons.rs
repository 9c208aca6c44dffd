//! Favicon extractor: saves base64 data-URI favicons carved out of tab
//! session records. A malformed payload is logged and skipped; it never
//! affects the record it came from.

use std::{
    fs,
    path::{Path, PathBuf},
};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{info, warn};

/// Saves the icon embedded in `candidate` under `output_dir`, named after
/// the source offset. Returns the saved file name, or `None` when the string
/// is not a data-image URI or its payload does not survive sanitization.
pub fn extract_icon(
    candidate: &str,
    source_offset: usize,
    output_dir: &Path,
) -> anyhow::Result<Option<PathBuf>> {
    if !candidate.starts_with("data:image") {
        return Ok(None);
    }

    let Some((_, payload)) = candidate.split_once(',') else {
        return Ok(None);
    };

    // carved strings routinely carry stray bytes; keep only the base64
    // alphabet before validating
    let sanitized: String = payload
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect();

    let image_data = match STANDARD.decode(&sanitized) {
        Ok(data) => data,
        Err(e) => {
            warn!(
                "invalid base64 favicon at offset {}, skipping extraction: {}",
                source_offset, e
            );
            return Ok(None);
        }
    };

    let extension = if candidate.contains("image/x-icon") {
        "ico"
    } else {
        "png"
    };

    fs::create_dir_all(output_dir)?;
    let file_name = PathBuf::from(format!("{source_offset}_favicon.{extension}"));
    fs::write(output_dir.join(&file_name), image_data)?;

    info!("favicon extracted: {}", file_name.display());

    Ok(Some(file_name))
}
