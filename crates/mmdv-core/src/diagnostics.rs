//! # Renderer Diagnostics
//!
//! Turns a [`RenderFailure`] into the text returned to clients.
//!
//! The headline heuristic scans the diagnostic text line by line for
//! `Error`, `error`, or `Parse` (case-sensitive). It is coupled to the
//! message format of the Mermaid CLI and is deliberately kept as a single
//! pure function so it can be tested without spawning a process.

use crate::error::RenderFailure;

/// Diagnostic text used when the renderer failed without saying anything.
pub const DEFAULT_DIAGNOSTIC: &str = "Invalid Mermaid diagram";

/// Substrings that mark a line as the headline, in scan order.
const HEADLINE_MARKERS: [&str; 3] = ["Error", "error", "Parse"];

/// Best available diagnostic text for a failed render.
///
/// Prefers captured standard error, then the failure's own message, then
/// [`DEFAULT_DIAGNOSTIC`]. Empty text at any stage falls through to the next.
///
/// Every current [`RenderFailure`] formats to a non-empty message, so the
/// last step only applies if a variant with an empty message is added.
pub fn diagnostic_text(failure: &RenderFailure) -> String {
    if let Some(stderr) = failure.stderr().filter(|s| !s.is_empty()) {
        return stderr.to_string();
    }
    let message = failure.to_string();
    if message.is_empty() {
        DEFAULT_DIAGNOSTIC.to_string()
    } else {
        message
    }
}

/// Select the headline line from diagnostic text.
///
/// Returns the first line containing one of the headline markers, or the
/// whole text when no line matches. Lines are split on `\n` only, so a
/// trailing `\r` stays part of the returned line.
pub fn headline(diagnostic: &str) -> &str {
    diagnostic
        .split('\n')
        .find(|line| HEADLINE_MARKERS.iter().any(|m| line.contains(m)))
        .unwrap_or(diagnostic)
}
