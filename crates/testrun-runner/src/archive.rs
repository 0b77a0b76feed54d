//! Upload directories and archive extraction.
//!
//! Each uploaded archive lands in its own temporary directory under the
//! uploads root and is unpacked in place. The directory is removed when the
//! [`UploadDir`] is dropped.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::process::Stdio;

use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::RunnerError;

const UNZIP: &str = "unzip";

/// Create the uploads root, or empty it if it already exists.
pub async fn init_workspace(root: &Path) -> Result<(), RunnerError> {
    info!(root = %root.display(), "Initializing workspace");

    if !tokio::fs::try_exists(root).await? {
        info!(root = %root.display(), "Creating uploads directory");
        tokio::fs::create_dir_all(root).await?;
        return Ok(());
    }

    info!(root = %root.display(), "Cleaning uploads directory");
    let mut entries = tokio::fs::read_dir(root).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_dir() {
            tokio::fs::remove_dir_all(&path).await?;
        } else {
            tokio::fs::remove_file(&path).await?;
        }
    }

    Ok(())
}

/// Temporary directory holding one uploaded archive and its extracted sources.
#[derive(Debug)]
pub struct UploadDir {
    dir: TempDir,
    file_name: String,
}

impl UploadDir {
    /// Persist `bytes` as `file_name` inside a fresh directory under `root`.
    ///
    /// Only the final component of `file_name` is used.
    pub async fn create(root: &Path, file_name: &str, bytes: &[u8]) -> Result<Self, RunnerError> {
        let file_name = sanitize_file_name(file_name)?;
        let dir = tempfile::Builder::new().prefix("upload-").tempdir_in(root)?;

        let upload = Self { dir, file_name };
        info!(
            file = %upload.file_name,
            dir = %upload.path().display(),
            bytes = bytes.len(),
            "Storing upload"
        );
        tokio::fs::write(upload.archive_path(), bytes).await?;

        Ok(upload)
    }

    /// Directory the sources are extracted into.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the stored archive.
    pub fn archive_path(&self) -> PathBuf {
        self.dir.path().join(&self.file_name)
    }

    /// Extract the archive in place, returning the `.rs` files it contained.
    pub async fn extract(&self) -> Result<Vec<PathBuf>, RunnerError> {
        extract_archive(&self.archive_path(), self.path()).await
    }
}

fn sanitize_file_name(raw: &str) -> Result<String, RunnerError> {
    Path::new(raw)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| RunnerError::InvalidFileName(raw.to_string()))
}

/// Unpack the zip archive at `archive` into `dest`.
///
/// Entries that would land outside `dest` abort the extraction before any
/// file is written. Returns the `.rs` entries relative to `dest`.
pub async fn extract_archive(archive: &Path, dest: &Path) -> Result<Vec<PathBuf>, RunnerError> {
    info!(archive = %archive.display(), dest = %dest.display(), "Unzipping");

    let listing = unzip(&[OsStr::new("-Z1"), archive.as_os_str()]).await?;
    let entries = validate_entries(&listing)?;

    unzip(&[
        OsStr::new("-o"),
        OsStr::new("-q"),
        archive.as_os_str(),
        OsStr::new("-d"),
        dest.as_os_str(),
    ])
    .await?;

    let sources: Vec<PathBuf> = entries
        .into_iter()
        .filter(|entry| entry.extension().is_some_and(|ext| ext == "rs"))
        .collect();

    debug!(count = sources.len(), "Extracted source files");
    Ok(sources)
}

async fn unzip(args: &[&OsStr]) -> Result<String, RunnerError> {
    let output = Command::new(UNZIP)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| RunnerError::Spawn {
            program: UNZIP.to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!(exit_code = output.status.code().unwrap_or(-1), stderr = %stderr, "unzip failed");
        return Err(RunnerError::Extract(if stderr.is_empty() {
            format!("unzip exited with {}", output.status)
        } else {
            stderr
        }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse an `unzip -Z1` listing, rejecting entries that escape the target.
///
/// Directory entries (trailing `/`) are dropped from the result.
pub fn validate_entries(listing: &str) -> Result<Vec<PathBuf>, RunnerError> {
    let mut files = Vec::new();

    for line in listing.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let path = Path::new(line);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(RunnerError::Extract(format!("{line}: illegal file path")));
        }

        if !line.ends_with('/') {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_entries_filters_directories() {
        let listing = "sample/\nsample/Cargo.toml\nsample/src/\nsample/src/lib.rs\n";
        let entries = validate_entries(listing).unwrap();
        assert_eq!(
            entries,
            vec![PathBuf::from("sample/Cargo.toml"), PathBuf::from("sample/src/lib.rs")]
        );
    }

    #[test]
    fn test_validate_entries_rejects_traversal() {
        assert!(matches!(
            validate_entries("ok.rs\n../../etc/passwd\n"),
            Err(RunnerError::Extract(_))
        ));
        assert!(validate_entries("/abs/path.rs").is_err());
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("project.zip").unwrap(), "project.zip");
        assert_eq!(sanitize_file_name("../../evil.zip").unwrap(), "evil.zip");
        assert!(sanitize_file_name("").is_err());
        assert!(sanitize_file_name("..").is_err());
    }

    #[tokio::test]
    async fn test_upload_dir_lifecycle() {
        let root = tempfile::tempdir().unwrap();

        let upload = UploadDir::create(root.path(), "code.zip", b"PK\x03\x04").await.unwrap();
        let dir = upload.path().to_path_buf();
        assert!(dir.starts_with(root.path()));
        assert_eq!(std::fs::read(upload.archive_path()).unwrap(), b"PK\x03\x04");

        drop(upload);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_init_workspace_creates_and_cleans() {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("uploads");

        init_workspace(&root).await.unwrap();
        assert!(root.is_dir());

        std::fs::create_dir_all(root.join("stale/src")).unwrap();
        std::fs::write(root.join("leftover.zip"), b"x").unwrap();

        init_workspace(&root).await.unwrap();
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
    }
}
