// src/output/writer.rs
// =============================================================================
// Persists one page to the mirror.
//
// Steps:
// 1. Map the URL to <root>/<path>/index.html
// 2. Create the directory chain (no error if it already exists)
// 3. Write the bytes to a uniquely named temp file next to the target, then
//    rename it into place
//
// The rename means a reader never sees a half-written index.html, and an
// existing file is replaced in one step.
// =============================================================================

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::{fs, task};

use super::path::to_output_path;

/// Errors that can occur while writing a page
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("refusing to write outside the output directory for {0}")]
    UnsafePath(String),
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Writer {
    root: PathBuf,
    origin: String,
}

impl Writer {
    pub fn new(root: impl Into<PathBuf>, origin: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            origin: origin.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, url: &str) -> Result<PathBuf, WriteError> {
        to_output_path(url, &self.root, &self.origin)
    }

    // Writes `contents` as the snapshot of `url`, returning the file written
    pub async fn save(&self, url: &str, contents: &[u8]) -> Result<PathBuf, WriteError> {
        let file = self.path_for(url)?;
        if let Some(dir) = file.parent() {
            create_dir_all(dir).await?;
        }
        write_atomic(&file, contents).await?;
        Ok(file)
    }
}

// Recursive and idempotent, like `mkdir -p`
pub async fn create_dir_all(dir: &Path) -> Result<(), WriteError> {
    fs::create_dir_all(dir).await.map_err(|source| WriteError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

// Overwrites `file` with `contents`, all-or-nothing from the caller's view.
//
// Every call gets its own uniquely named temp file in the target directory,
// so two cycles writing the same path never touch each other's temp file.
// The last rename wins and both writes succeed.
pub async fn write_atomic(file: &Path, contents: &[u8]) -> Result<(), WriteError> {
    let target = file.to_path_buf();
    let contents = contents.to_vec();

    // tempfile's API is blocking, so run it off the async worker threads
    let result = task::spawn_blocking(move || -> io::Result<()> {
        let dir = match target.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(&contents)?;
        // On failure the temp file is removed when `temp` is dropped
        temp.persist(&target).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .unwrap_or_else(|join_error| Err(io::Error::new(io::ErrorKind::Other, join_error)));

    result.map_err(|source| WriteError::Write {
        path: file.to_path_buf(),
        source,
    })
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why spawn_blocking?
//    - NamedTempFile uses plain blocking std IO
//    - spawn_blocking runs it on tokio's blocking pool so the async workers
//      keep fetching meanwhile
//
// 2. What does persist() do?
//    - Renames the temp file onto the target path, replacing what's there
//    - If it fails, the temp file is deleted when the NamedTempFile drops
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_creates_directories() {
        let dir = TempDir::new().unwrap();
        let writer = Writer::new(dir.path(), "http://site.test");

        let file = writer.save("http://site.test/docs/intro", b"<h1>Intro</h1>").await.unwrap();

        assert_eq!(file, dir.path().join("docs/intro/index.html"));
        assert_eq!(std::fs::read(&file).unwrap(), b"<h1>Intro</h1>");
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let writer = Writer::new(dir.path(), "http://site.test");

        writer.save("http://site.test/", b"old").await.unwrap();
        let file = writer.save("http://site.test/", b"new").await.unwrap();

        assert_eq!(std::fs::read(&file).unwrap(), b"new");
        // No temp files left next to it
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    // "/about" and "/about/" map to the same file; racing cycles must both succeed
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_to_same_file_both_succeed() {
        let dir = TempDir::new().unwrap();
        let writer = Writer::new(dir.path(), "http://site.test");

        for _ in 0..200 {
            let (first, second) = tokio::join!(
                writer.save("http://site.test/about", b"first"),
                writer.save("http://site.test/about/", b"second"),
            );
            assert!(first.is_ok(), "{:?}", first);
            assert!(second.is_ok(), "{:?}", second);
        }

        let about = dir.path().join("about");
        assert_eq!(std::fs::read_dir(&about).unwrap().count(), 1);
        let written = std::fs::read(about.join("index.html")).unwrap();
        assert!(written == b"first" || written == b"second");
    }

    #[tokio::test]
    async fn test_create_dir_all_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b/c");

        create_dir_all(&nested).await.unwrap();
        create_dir_all(&nested).await.unwrap();

        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_directory_blocked_by_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("blocked"), b"a file, not a directory").unwrap();
        let writer = Writer::new(dir.path(), "http://site.test");

        let result = writer.save("http://site.test/blocked/page", b"x").await;

        assert!(matches!(result, Err(WriteError::CreateDir { .. })));
    }
}
