use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How terminal image pages are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Print canonical asset URLs, never touch the filesystem.
    ListOnly,
    /// Stop the whole crawl at the first image already on disk.
    #[default]
    Update,
    /// Visit everything, skip images already on disk one by one.
    FullUpdate,
}

impl Mode {
    /// Resolve command line flags. No-download beats everything, full-update
    /// beats update, and update is what you get when neither is given.
    pub fn from_flags(no_download: bool, update: bool, full_update: bool) -> Self {
        if no_download {
            Mode::ListOnly
        } else if full_update {
            if update {
                debug!("Both update and full-update requested, using full-update");
            }
            Mode::FullUpdate
        } else {
            Mode::Update
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::ListOnly => "list-only",
            Mode::Update => "update",
            Mode::FullUpdate => "full-update",
        }
    }
}

/// What to do with one image given the mode and what is already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    List,
    Write,
    Skip,
    CaughtUp,
}

impl Decision {
    pub fn decide(path: &Path, mode: Mode) -> Self {
        match mode {
            Mode::ListOnly => Decision::List,
            Mode::Update if has_content(path) => Decision::CaughtUp,
            Mode::FullUpdate if has_content(path) => Decision::Skip,
            _ => Decision::Write,
        }
    }
}

/// True when `path` is a regular file with at least one byte.
pub fn has_content(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Write `bytes` next to `path` then rename over it, so an interrupted run
/// never leaves a truncated image under the final name.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let partial = partial_path(path);
    let result = match tokio::fs::write(&partial, bytes).await {
        Ok(()) => tokio::fs::rename(&partial, path).await,
        Err(e) => Err(e),
    };
    if result.is_err() {
        let _ = tokio::fs::remove_file(&partial).await;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_full_update_wins_over_update() {
        assert_eq!(Mode::from_flags(false, true, true), Mode::FullUpdate);
        assert_eq!(Mode::from_flags(false, true, false), Mode::Update);
        assert_eq!(Mode::from_flags(false, false, false), Mode::Update);
        assert_eq!(Mode::from_flags(true, true, true), Mode::ListOnly);
    }

    #[test]
    fn test_decisions_for_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2023-05-abc.jpg");

        assert_eq!(Decision::decide(&path, Mode::Update), Decision::Write);
        assert_eq!(Decision::decide(&path, Mode::FullUpdate), Decision::Write);
        assert_eq!(Decision::decide(&path, Mode::ListOnly), Decision::List);
    }

    #[test]
    fn test_decisions_for_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2023-05-abc.jpg");
        std::fs::write(&path, b"jpeg").unwrap();

        assert_eq!(Decision::decide(&path, Mode::Update), Decision::CaughtUp);
        assert_eq!(Decision::decide(&path, Mode::FullUpdate), Decision::Skip);
        assert_eq!(Decision::decide(&path, Mode::ListOnly), Decision::List);
    }

    #[test]
    fn test_empty_file_is_downloaded_again() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2023-05-abc.jpg");
        std::fs::write(&path, b"").unwrap();

        assert_eq!(Decision::decide(&path, Mode::Update), Decision::Write);
        assert_eq!(Decision::decide(&path, Mode::FullUpdate), Decision::Write);
    }

    #[tokio::test]
    async fn test_write_atomic_replaces_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2023-05-abc.jpg");
        std::fs::write(&path, b"").unwrap();

        write_atomic(&path, b"full image").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"full image");
        assert!(!dir.path().join("2023-05-abc.jpg.part").exists());
    }

    #[tokio::test]
    async fn test_write_atomic_failed_rename_leaves_no_partial() {
        let dir = TempDir::new().unwrap();
        // A non-empty directory under the final name makes the rename fail.
        let path = dir.path().join("2023-05-abc.jpg");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("inside"), b"x").unwrap();

        assert!(write_atomic(&path, b"full image").await.is_err());
        assert!(!dir.path().join("2023-05-abc.jpg.part").exists());
    }

    #[tokio::test]
    async fn test_write_atomic_failed_write_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("2023-05-abc.jpg");

        let err = write_atomic(&path, b"full image").await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
        assert!(!path.exists());
        assert!(!dir.path().join("missing").join("2023-05-abc.jpg.part").exists());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_write_atomic_disk_full_removes_partial() {
        if !Path::new("/dev/full").exists() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2023-05-abc.jpg");
        // Writes through this link hit ENOSPC after the .part name exists.
        std::os::unix::fs::symlink("/dev/full", dir.path().join("2023-05-abc.jpg.part")).unwrap();

        assert!(write_atomic(&path, b"full image").await.is_err());
        assert!(std::fs::symlink_metadata(dir.path().join("2023-05-abc.jpg.part")).is_err());
        assert!(!path.exists());
    }
}
