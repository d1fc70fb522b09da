//! Core shared types for vigil.
//!
//! This crate holds the text model (offsets, ranges, line/column conversion) and
//! the offset-based edit primitives every other crate builds on. It knows
//! nothing about syntax trees or types.

mod edit;
mod text;

pub use edit::{apply_text_edits, normalize_text_edits, ranges_conflict, EditError, TextEdit};
pub use text::{LineCol, LineIndex, TextRange, TextSize};
