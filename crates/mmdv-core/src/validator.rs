//! # Diagram Validator
//!
//! Orchestrates one validation: reserve scratch files, write the source,
//! run the renderer, interpret the outcome, clean up.
//!
//! A rejected diagram is a [`Verdict::Invalid`], not an error. Only faults
//! of the service itself (scratch directory, file writes) surface as
//! [`ValidatorError`].

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::Instrument;

use crate::diagnostics::{diagnostic_text, headline};
use crate::error::ValidatorError;
use crate::renderer::{MermaidCli, RendererConfig};
use crate::scratch::{ScratchDir, ScratchPair};

/// Everything the validator needs to run.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Renderer invocation.
    pub renderer: RendererConfig,
    /// Shared scratch directory.
    pub scratch_dir: ScratchDir,
    /// Upper bound on simultaneously running renders. `None` is unbounded.
    pub max_concurrent_renders: Option<usize>,
}

/// Outcome of validating one diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The renderer accepted the diagram.
    Valid,
    /// The renderer rejected the diagram, timed out, or could not run.
    Invalid {
        /// Most relevant line of the diagnostic text.
        headline: String,
        /// Full diagnostic text.
        details: String,
    },
}

impl Verdict {
    /// Whether the diagram was accepted.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Validates diagram sources against the renderer.
///
/// Cheap to clone; clones share the admission limit.
#[derive(Debug, Clone)]
pub struct Validator {
    scratch: ScratchDir,
    renderer: MermaidCli,
    admission: Option<Arc<Semaphore>>,
}

impl Validator {
    /// Build a validator from configuration.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            scratch: config.scratch_dir,
            renderer: MermaidCli::new(config.renderer),
            admission: config
                .max_concurrent_renders
                .map(|n| Arc::new(Semaphore::new(n.max(1)))),
        }
    }

    /// The scratch directory in use.
    pub fn scratch_dir(&self) -> &ScratchDir {
        &self.scratch
    }

    /// The renderer in use.
    pub fn renderer(&self) -> &MermaidCli {
        &self.renderer
    }

    /// Validate one diagram source.
    ///
    /// Scratch files are removed before this returns on every path, and by
    /// drop guard if the returned future is cancelled.
    pub async fn validate(&self, code: &str) -> Result<Verdict, ValidatorError> {
        self.scratch.ensure().await?;

        let pair = self.scratch.reserve();
        let span = tracing::debug_span!("validate", scratch_id = %pair.id());
        self.validate_with(pair, code).instrument(span).await
    }

    async fn validate_with(
        &self,
        pair: ScratchPair,
        code: &str,
    ) -> Result<Verdict, ValidatorError> {
        if let Err(e) = pair.write_input(code).await {
            pair.cleanup().await;
            return Err(e.into());
        }

        let permit = match &self.admission {
            Some(sem) => match Arc::clone(sem).acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(_) => {
                    pair.cleanup().await;
                    return Err(ValidatorError::AdmissionClosed);
                }
            },
            None => None,
        };

        let rendered = self.renderer.render(pair.input(), pair.output()).await;
        drop(permit);
        pair.cleanup().await;

        Ok(match rendered {
            Ok(()) => Verdict::Valid,
            Err(failure) => {
                let details = diagnostic_text(&failure);
                Verdict::Invalid {
                    headline: headline(&details).to_string(),
                    details,
                }
            }
        })
    }
}
