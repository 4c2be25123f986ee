//! # Error Types
//!
//! Errors raised while validating a diagram. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! ## Taxonomy
//!
//! - [`RenderFailure`] — the renderer rejected the diagram, timed out, or
//!   could not be started. This is a *verdict* about the input, not a fault
//!   of the service, and is reported to the client as an invalid diagram.
//! - [`ScratchError`] — the scratch directory or input file could not be
//!   prepared. Infrastructure fault.
//! - [`ValidatorError`] — everything the validator cannot turn into a
//!   verdict. Infrastructure fault.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Failure to prepare scratch files for one validation.
#[derive(Error, Debug)]
pub enum ScratchError {
    /// The shared scratch directory could not be created.
    #[error("failed to create scratch directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The diagram source could not be written to the input file.
    #[error("failed to write scratch file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The renderer did not produce output for a diagram.
///
/// Every variant carries enough context to build the diagnostic text
/// returned to the client. See [`crate::diagnostics::diagnostic_text`].
#[derive(Error, Debug)]
pub enum RenderFailure {
    /// The renderer process could not be spawned (missing binary, bad
    /// permissions).
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The renderer exited with a non-zero status.
    #[error("Command failed: {program} exited with {status}")]
    Exited {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The renderer exceeded its wall-clock budget and was killed.
    #[error("Command failed: {program} timed out after {}s and was killed", .timeout.as_secs_f64())]
    TimedOut {
        program: String,
        timeout: Duration,
        stderr: String,
    },

    /// Waiting on the renderer failed after it was spawned.
    #[error("Command failed: {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl RenderFailure {
    /// Standard error captured from the renderer, when any was collected.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Exited { stderr, .. } | Self::TimedOut { stderr, .. } => Some(stderr),
            Self::Spawn { .. } | Self::Wait { .. } => None,
        }
    }

    /// Whether the failure was caused by the timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

/// Infrastructure failure while validating a diagram.
#[derive(Error, Debug)]
pub enum ValidatorError {
    /// Scratch files could not be prepared.
    #[error(transparent)]
    Scratch(#[from] ScratchError),

    /// The admission semaphore was closed.
    #[error("render admission closed")]
    AdmissionClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_failure_has_no_stderr() {
        let err = RenderFailure::Spawn {
            program: "mmdc".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        assert!(err.stderr().is_none());
        assert!(!err.is_timeout());
        assert!(err.to_string().contains("mmdc"));
        assert!(err.to_string().contains("No such file"));
    }

    #[test]
    fn timeout_display_names_budget() {
        let err = RenderFailure::TimedOut {
            program: "mmdc".to_string(),
            timeout: Duration::from_secs(10),
            stderr: String::new(),
        };
        assert!(err.is_timeout());
        assert_eq!(err.stderr(), Some(""));
        assert!(err.to_string().contains("timed out after 10s"));
    }

    #[test]
    fn scratch_error_is_transparent_in_validator_error() {
        let err = ValidatorError::from(ScratchError::CreateDir {
            path: PathBuf::from("/nope"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        let msg = err.to_string();
        assert!(msg.starts_with("failed to create scratch directory /nope"), "got: {msg}");
        assert!(msg.contains("denied"));
    }
}
