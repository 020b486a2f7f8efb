//! Package payload sources and the file access capability used to open them.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Body;
use reqwest::multipart::Part;

use crate::error::{ManagementError, ManagementResult};

/// File name used when a blob handle does not carry one.
pub const DEFAULT_PACKAGE_FILE_NAME: &str = "package.zip";

/// Opened package payload ready to be attached to a multipart request.
pub struct PackageBlob {
    file_name: String,
    body: Body,
    length: Option<u64>,
}

impl PackageBlob {
    /// Wrap an in-memory payload.
    #[must_use]
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let length = u64::try_from(bytes.len()).ok();
        Self {
            file_name: file_name.into(),
            body: Body::from(bytes),
            length,
        }
    }

    /// Wrap an already-open file, streaming its contents on upload.
    #[must_use]
    pub fn from_file(file_name: impl Into<String>, file: tokio::fs::File, length: u64) -> Self {
        Self {
            file_name: file_name.into(),
            body: Body::from(file),
            length: Some(length),
        }
    }

    /// File name reported in the multipart part.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Payload length when known up front.
    #[must_use]
    pub const fn length(&self) -> Option<u64> {
        self.length
    }

    pub(crate) fn into_part(self) -> Part {
        let part = match self.length {
            Some(length) => Part::stream_with_length(self.body, length),
            None => Part::stream(self.body),
        };
        part.file_name(self.file_name)
    }
}

impl fmt::Debug for PackageBlob {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PackageBlob")
            .field("file_name", &self.file_name)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// Where the bytes of a package upload come from.
#[derive(Debug)]
pub enum PackageSource {
    /// Path resolved through the manager's [`FileAccess`].
    Path(PathBuf),
    /// Payload handle supplied directly by the caller.
    Blob(PackageBlob),
}

impl From<PathBuf> for PackageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<PackageBlob> for PackageSource {
    fn from(blob: PackageBlob) -> Self {
        Self::Blob(blob)
    }
}

/// Capability for turning a path into an uploadable payload.
#[async_trait]
pub trait FileAccess: Send + Sync {
    /// Open `path` for upload.
    ///
    /// # Errors
    ///
    /// Returns an error when the path cannot be opened or inspected.
    async fn open(&self, path: &Path) -> ManagementResult<PackageBlob>;
}

/// [`FileAccess`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileAccess;

#[async_trait]
impl FileAccess for LocalFileAccess {
    async fn open(&self, path: &Path) -> ManagementResult<PackageBlob> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|err| ManagementError::io("open", path, err))?;
        let metadata = file
            .metadata()
            .await
            .map_err(|err| ManagementError::io("inspect", path, err))?;
        if metadata.is_dir() {
            return Err(ManagementError::io(
                "open",
                path,
                std::io::Error::other("path is a directory"),
            ));
        }
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(DEFAULT_PACKAGE_FILE_NAME)
            .to_string();
        Ok(PackageBlob::from_file(file_name, file, metadata.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn local_file_access_reports_name_and_length() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bundle.zip");
        let mut file = std::fs::File::create(&path).expect("create");
        file.write_all(b"payload").expect("write");

        let blob = LocalFileAccess.open(&path).await.expect("open");
        assert_eq!(blob.file_name(), "bundle.zip");
        assert_eq!(blob.length(), Some(7));
    }

    #[tokio::test]
    async fn local_file_access_surfaces_missing_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.zip");
        let err = LocalFileAccess.open(&path).await.expect_err("missing file");
        assert!(matches!(err, ManagementError::Io { operation: "open", .. }));
    }

    #[tokio::test]
    async fn local_file_access_rejects_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = LocalFileAccess.open(dir.path()).await.expect_err("directory");
        assert!(matches!(err, ManagementError::Io { operation: "open", .. }));
    }

    #[test]
    fn blob_from_bytes_tracks_length() {
        let blob = PackageBlob::from_bytes("inline.zip", vec![0; 16]);
        assert_eq!(blob.length(), Some(16));
        assert!(format!("{blob:?}").contains("inline.zip"));
    }
}
