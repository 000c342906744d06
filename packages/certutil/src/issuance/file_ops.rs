//! File operations for issuance artifacts

use std::path::Path;

use certutil_common::{ArtifactMode, LoggingTransformer, write_artifact};

use crate::error::Result;
use crate::responses::{FileType, GeneratedFile};

/// Atomically write an artifact with permissions matching its type
///
/// Private keys are owner-only on Unix; everything else is world-readable.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the write fails.
pub async fn save_artifact(
    path: &Path,
    contents: &[u8],
    file_type: FileType,
) -> Result<GeneratedFile> {
    let mode = match file_type {
        FileType::PrivateKey => ArtifactMode::Private,
        FileType::SigningRequest | FileType::Certificate | FileType::Serial => {
            ArtifactMode::Public
        }
    };

    let size_bytes = write_artifact(path, contents, mode).await?;
    LoggingTransformer::log_step(file_type.label(), path, size_bytes);

    Ok(GeneratedFile {
        path: path.to_path_buf(),
        file_type,
        size_bytes,
    })
}
