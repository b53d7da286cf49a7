//! Render-side error types.
//!
//! Parsing never fails on malformed markup (the parser always produces a
//! best-effort tree), so only rendering carries an error type: sink and
//! insertion-stream I/O, plus a defense against hand-built trees whose
//! declared table geometry cannot be satisfied.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing to the byte sink or reading an insertion stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A table declared more cells than its flat cell sequence holds.
    /// Parser-produced tables never trigger this.
    #[error("table declares {rows}x{cols} cells but only {cells} are present")]
    MalformedTable { rows: u32, cols: u32, cells: usize },
}
