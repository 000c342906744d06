//! File operations for issuance artifacts
//!
//! Artifacts are written to a sibling temporary file first and renamed into
//! place, so readers never observe a partially written key or certificate.

use std::io;
use std::path::{Path, PathBuf};

/// Permission class of an artifact on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactMode {
    /// World-readable material (certificates, requests, serial files)
    Public,
    /// Private key material, owner read/write only on Unix
    Private,
}

/// Atomically write `contents` to `path`, creating parent directories
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The temporary file cannot be written or its permissions set
/// - The final rename fails
pub async fn write_artifact(path: &Path, contents: &[u8], mode: ArtifactMode) -> io::Result<u64> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let staging = staging_path(path)?;
    if let Err(e) = write_staged(&staging, contents, mode).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(e);
    }

    if let Err(e) = tokio::fs::rename(&staging, path).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(e);
    }

    Ok(contents.len() as u64)
}

async fn write_staged(staging: &Path, contents: &[u8], mode: ArtifactMode) -> io::Result<()> {
    tokio::fs::write(staging, contents).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let bits = match mode {
            ArtifactMode::Private => 0o600,
            ArtifactMode::Public => 0o644,
        };
        tokio::fs::set_permissions(staging, std::fs::Permissions::from_mode(bits)).await?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}

/// Hidden sibling path used while an artifact is being written
fn staging_path(path: &Path) -> io::Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("artifact path has no file name: {}", path.display()),
        )
    })?;

    let mut staged = std::ffi::OsString::from(".");
    staged.push(file_name);
    staged.push(format!(".partial-{}", std::process::id()));
    Ok(path.with_file_name(staged))
}
