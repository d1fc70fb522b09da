//! Suggested fixes: validated edit sets and the applier that merges them.
//!
//! A checker accumulates edits in a [`SuggestedFixBuilder`] and calls
//! [`SuggestedFixBuilder::build`], which rejects edits that overlap within the
//! same fix. Import changes are kept symbolic until the fix is applied, at
//! which point they are resolved against the imports actually present in the
//! source. That is what lets unrelated fixes ask for the same import without
//! colliding.
//!
//! The builder also edits declarations: modifiers, `@SuppressWarnings`, and
//! renaming a variable or method along with its references.
//!
//! [`apply_fixes`] applies many fixes to one source text. Fixes are taken in
//! order; a fix whose edits overlap an already accepted fix is rejected as a
//! whole and reported as a [`FixConflict`], and the rest are still applied.

mod apply;
mod fix;
mod imports;
mod modifiers;
mod rename;

use vigil_core::{EditError, TextRange};

pub use apply::{apply_fixes, AppliedFixes, FixConflict, InvalidFix};
pub use fix::{ImportChange, SuggestedFix, SuggestedFixBuilder};
pub use modifiers::canonical_modifier_order;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixError {
    #[error("fix edits overlap: {first:?} overlaps {second:?}")]
    OverlappingEdits { first: TextRange, second: TextRange },
    #[error("invalid edit range {start}..{end}")]
    InvalidRange { start: i64, end: i64 },
    #[error("cannot edit generated node at {range:?}")]
    GeneratedNode { range: TextRange },
    #[error("node at {range:?} is not a {expected} declaration")]
    NotADeclaration {
        range: TextRange,
        expected: &'static str,
    },
    #[error("declaration at {range:?} has no resolved symbol")]
    Unresolved { range: TextRange },
    #[error(transparent)]
    Edit(#[from] EditError),
}
