use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use wayfarer_common::ItineraryError;
use wayfarer_planner::{mime_for_extension, Attachment};

/// Read one file and encode it as a `data:` URI. The media type comes from the extension.
pub async fn encode_file(path: &Path) -> Result<String, ItineraryError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        ItineraryError::InvalidAttachment(format!("{}: {e}", path.display()))
    })?;
    if bytes.is_empty() {
        return Err(ItineraryError::InvalidAttachment(format!(
            "{}: file is empty",
            path.display()
        )));
    }
    let mime = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(mime_for_extension)
        .unwrap_or("application/octet-stream");
    Ok(Attachment::from_bytes(mime, &bytes).to_data_uri())
}

/// Encode all files concurrently. Output order matches `paths`; the first failure aborts.
pub async fn encode_files(paths: &[PathBuf]) -> Result<Vec<String>, ItineraryError> {
    try_join_all(paths.iter().map(|path| encode_file(path))).await
}
