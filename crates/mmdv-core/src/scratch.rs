//! # Scratch Files
//!
//! Per-request input/output files under a shared scratch directory.
//!
//! Every validation owns one [`ScratchPair`], named by a fresh
//! [`ScratchId`]. The pair is a drop guard: both files are removed when it
//! goes out of scope, including when the handler future is dropped
//! mid-flight or unwinds. Removal is best-effort and never reported.

use std::path::{Path, PathBuf};

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::ScratchError;

/// Extension of the diagram source file handed to the renderer.
pub const INPUT_EXTENSION: &str = "mmd";

/// Extension of the rendered output file.
pub const OUTPUT_EXTENSION: &str = "svg";

/// Random identifier namespacing one request's scratch files.
///
/// 8 bytes from the OS CSPRNG, rendered as 16 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScratchId(String);

impl ScratchId {
    /// Generate a new random identifier.
    pub fn new() -> Self {
        let mut bytes = [0u8; 8];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// The hex form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ScratchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScratchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The shared directory holding all in-flight scratch files.
///
/// Created once at startup and on demand before every request. Never torn
/// down by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Directory name used under the system temp root by default.
    pub const DEFAULT_NAME: &'static str = "mermaid-validation";

    /// Use `path` as the scratch directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<system temp>/mermaid-validation`.
    pub fn default_location() -> PathBuf {
        std::env::temp_dir().join(Self::DEFAULT_NAME)
    }

    /// The directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory (and parents) if absent.
    ///
    /// Idempotent and safe to race: an existing directory is success.
    pub async fn ensure(&self) -> Result<(), ScratchError> {
        tokio::fs::create_dir_all(&self.path)
            .await
            .map_err(|source| ScratchError::CreateDir {
                path: self.path.clone(),
                source,
            })
    }

    /// Reserve a fresh input/output pair. No file is created yet.
    pub fn reserve(&self) -> ScratchPair {
        let id = ScratchId::new();
        let input = self.path.join(format!("{id}.{INPUT_EXTENSION}"));
        let output = self.path.join(format!("{id}.{OUTPUT_EXTENSION}"));
        ScratchPair {
            id,
            input,
            output,
            cleaned: false,
        }
    }
}

impl Default for ScratchDir {
    fn default() -> Self {
        Self::new(Self::default_location())
    }
}

/// Input and output paths for one validation, removed on drop.
#[derive(Debug)]
pub struct ScratchPair {
    id: ScratchId,
    input: PathBuf,
    output: PathBuf,
    /// Set once [`ScratchPair::cleanup`] has run; `Drop` then does nothing.
    cleaned: bool,
}

impl ScratchPair {
    /// Identifier shared by both paths.
    pub fn id(&self) -> &ScratchId {
        &self.id
    }

    /// Path of the diagram source file.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Path the renderer writes to.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Write the diagram source verbatim to the input path.
    pub async fn write_input(&self, code: &str) -> Result<(), ScratchError> {
        tokio::fs::write(&self.input, code)
            .await
            .map_err(|source| ScratchError::Write {
                path: self.input.clone(),
                source,
            })
    }

    /// Remove both files now, swallowing errors.
    pub async fn cleanup(mut self) {
        self.remove_files().await;
    }

    async fn remove_files(&mut self) {
        for path in [&self.input, &self.output] {
            if let Err(e) = tokio::fs::remove_file(path).await {
                log_cleanup_error(path, &e);
            }
        }
        self.cleaned = true;
    }
}

impl Drop for ScratchPair {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        for path in [&self.input, &self.output] {
            if let Err(e) = std::fs::remove_file(path) {
                log_cleanup_error(path, &e);
            }
        }
    }
}

fn log_cleanup_error(path: &Path, err: &std::io::Error) {
    if err.kind() != std::io::ErrorKind::NotFound {
        tracing::trace!(path = %path.display(), error = %err, "scratch cleanup failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn scratch_id_is_sixteen_lowercase_hex() {
        let id = ScratchId::new();
        assert_eq!(id.as_str().len(), 16);
        assert!(id
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(id.to_string(), id.as_str());
    }

    #[test]
    fn scratch_ids_do_not_repeat() {
        let ids: HashSet<ScratchId> = (0..1000).map(|_| ScratchId::new()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn default_location_is_under_temp_dir() {
        let path = ScratchDir::default_location();
        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path.ends_with("mermaid-validation"));
    }

    #[test]
    fn reserve_builds_sibling_paths_with_fixed_extensions() {
        let dir = ScratchDir::new("/scratch");
        let pair = dir.reserve();
        let id = pair.id().as_str().to_string();
        assert_eq!(pair.input(), Path::new(&format!("/scratch/{id}.mmd")));
        assert_eq!(pair.output(), Path::new(&format!("/scratch/{id}.svg")));
    }

    #[tokio::test]
    async fn ensure_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ScratchDir::new(tmp.path().join("a").join("b"));
        dir.ensure().await.unwrap();
        dir.ensure().await.unwrap();
        assert!(dir.path().is_dir());
    }

    #[tokio::test]
    async fn concurrent_ensure_succeeds() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ScratchDir::new(tmp.path().join("shared"));
        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let dir = dir.clone();
                tokio::spawn(async move { dir.ensure().await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert!(dir.path().is_dir());
    }

    #[tokio::test]
    async fn ensure_fails_when_path_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();
        let err = ScratchDir::new(&file).ensure().await.unwrap_err();
        assert!(matches!(err, ScratchError::CreateDir { .. }));
    }

    #[tokio::test]
    async fn write_input_is_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ScratchDir::new(tmp.path());
        let pair = dir.reserve();
        let code = "graph TD;\n  A-->B\r\n  %% ünïcode\n";
        pair.write_input(code).await.unwrap();
        assert_eq!(std::fs::read_to_string(pair.input()).unwrap(), code);
    }

    #[tokio::test]
    async fn cleanup_removes_both_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ScratchDir::new(tmp.path());
        let pair = dir.reserve();
        pair.write_input("graph TD; A-->B").await.unwrap();
        std::fs::write(pair.output(), "<svg/>").unwrap();
        pair.cleanup().await;
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn cleanup_tolerates_missing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let pair = ScratchDir::new(tmp.path()).reserve();
        pair.cleanup().await;
    }

    #[tokio::test]
    async fn drop_after_cleanup_touches_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut pair = ScratchDir::new(tmp.path()).reserve();
        pair.write_input("graph TD; A-->B").await.unwrap();
        pair.remove_files().await;
        assert!(!pair.input().exists());

        // A file reappearing at the same path is left alone.
        std::fs::write(pair.input(), "recreated").unwrap();
        let input = pair.input().to_path_buf();
        drop(pair);
        assert_eq!(std::fs::read_to_string(input).unwrap(), "recreated");
    }

    #[tokio::test]
    async fn drop_removes_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ScratchDir::new(tmp.path());
        {
            let pair = dir.reserve();
            pair.write_input("graph TD; A-->B").await.unwrap();
            std::fs::write(pair.output(), "<svg/>").unwrap();
        }
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
