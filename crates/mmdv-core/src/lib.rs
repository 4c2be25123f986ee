//! # mmdv-core — Mermaid Diagram Validation Core
//!
//! Decides whether a Mermaid diagram source is valid by handing it to the
//! Mermaid CLI (`mmdc`) and interpreting the result. The crate knows nothing
//! about the diagram language itself; the renderer is an opaque oracle.
//!
//! ## Flow
//!
//! ```text
//! Validator::validate(code)
//!   ├─ ScratchDir::ensure        create <scratch>/ if absent
//!   ├─ ScratchDir::reserve       <id>.mmd + <id>.svg (16 hex chars)
//!   ├─ ScratchPair::write_input  source written verbatim
//!   ├─ MermaidCli::render        mmdc -i … -o … -p …, hard timeout
//!   ├─ diagnostics::headline     stderr → headline on failure
//!   └─ ScratchPair::cleanup      both files removed, errors swallowed
//! ```
//!
//! ## Crate Policy
//!
//! - No HTTP types. The API crate owns request/response shapes.
//! - A rejected diagram is a [`Verdict`], never an error.
//! - No `unsafe` code. No `.unwrap()` outside tests.

pub mod diagnostics;
pub mod error;
pub mod renderer;
pub mod scratch;
pub mod validator;

// Re-export primary types for ergonomic imports.
pub use diagnostics::{diagnostic_text, headline, DEFAULT_DIAGNOSTIC};
pub use error::{RenderFailure, ScratchError, ValidatorError};
pub use renderer::{MermaidCli, RendererConfig};
pub use scratch::{ScratchDir, ScratchId, ScratchPair};
pub use validator::{ServiceConfig, Validator, Verdict};
