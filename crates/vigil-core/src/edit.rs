//! Offset-based text edits: validation, normalization and application.

use crate::{TextRange, TextSize};

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TextEdit {
    pub range: TextRange,
    pub replacement: String,
}

impl TextEdit {
    pub fn new(range: TextRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self::new(TextRange::empty(offset), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::new(range, String::new())
    }

    #[inline]
    pub fn is_insert(&self) -> bool {
        self.range.is_empty()
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("edit range {range:?} is out of bounds for text length {text_len:?}")]
    RangeOutOfBounds { range: TextRange, text_len: TextSize },
    #[error("offset {offset:?} is not a UTF-8 character boundary")]
    InvalidUtf8Boundary { offset: TextSize },
    #[error("overlapping edits: {first:?} overlaps {second:?}")]
    OverlappingEdits { first: TextRange, second: TextRange },
}

/// Returns `true` when two edit ranges cannot both be applied.
///
/// Ranges that merely touch at an endpoint do not conflict. A zero-width range
/// conflicts only with a range that strictly contains its offset.
#[inline]
pub fn ranges_conflict(a: TextRange, b: TextRange) -> bool {
    a.start() < b.end() && b.start() < a.end()
}

/// Apply a list of edits to a text snapshot.
///
/// The result does not depend on the order of `edits`, except that several
/// insertions at the same offset are emitted in the order they were given.
pub fn apply_text_edits(text: &str, edits: &[TextEdit]) -> Result<String, EditError> {
    let mut edits = edits.to_vec();
    normalize_text_edits(text, &mut edits)?;

    let added: usize = edits.iter().map(|e| e.replacement.len()).sum();
    let mut out = String::with_capacity(text.len() + added);
    let mut cursor = 0usize;
    for edit in &edits {
        let start = u32::from(edit.range.start()) as usize;
        let end = u32::from(edit.range.end()) as usize;
        out.push_str(&text[cursor..start]);
        out.push_str(&edit.replacement);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}

/// Validate, sort and de-duplicate edits.
///
/// After a successful call `edits` is sorted by `(start, end)`, exact
/// duplicates are gone, and insertions sharing an offset have been joined into a
/// single insertion (in submission order). Any two remaining edits either touch
/// or are disjoint.
pub fn normalize_text_edits(text: &str, edits: &mut Vec<TextEdit>) -> Result<(), EditError> {
    let text_len = TextSize::from(text.len() as u32);

    for edit in edits.iter() {
        if edit.range.end() > text_len {
            return Err(EditError::RangeOutOfBounds {
                range: edit.range,
                text_len,
            });
        }
        for offset in [edit.range.start(), edit.range.end()] {
            if !text.is_char_boundary(u32::from(offset) as usize) {
                return Err(EditError::InvalidUtf8Boundary { offset });
            }
        }
    }

    // Stable: insertions at one offset keep their relative order.
    edits.sort_by_key(|e| (e.range.start(), e.range.end()));

    let mut unique: Vec<TextEdit> = Vec::with_capacity(edits.len());
    let mut run_start = 0usize;
    for edit in edits.drain(..) {
        if unique.last().map_or(true, |last| last.range != edit.range) {
            run_start = unique.len();
        } else if unique[run_start..].contains(&edit) {
            continue;
        }
        unique.push(edit);
    }

    let mut merged: Vec<TextEdit> = Vec::with_capacity(unique.len());
    for edit in unique {
        if edit.is_insert() {
            if let Some(last) = merged.last_mut() {
                if last.range == edit.range {
                    last.replacement.push_str(&edit.replacement);
                    continue;
                }
            }
        }
        merged.push(edit);
    }

    // Sweep against the edit reaching furthest right so far.
    let mut widest: Option<TextRange> = None;
    for edit in &merged {
        if let Some(prev) = widest {
            if ranges_conflict(prev, edit.range) {
                return Err(EditError::OverlappingEdits {
                    first: prev,
                    second: edit.range,
                });
            }
        }
        if widest.map_or(true, |prev| edit.range.end() >= prev.end()) {
            widest = Some(edit.range);
        }
    }

    *edits = merged;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    #[test]
    fn apply_multiple_edits_is_deterministic() {
        let text = "abcdef";
        let mut edits = vec![
            TextEdit::new(range(2, 4), "XX"),
            TextEdit::insert(TextSize::from(0), "!"),
            TextEdit::delete(range(5, 6)),
        ];

        let out1 = apply_text_edits(text, &edits).unwrap();

        edits.reverse();
        let out2 = apply_text_edits(text, &edits).unwrap();

        assert_eq!(out1, out2);
        assert_eq!(out1, "!abXXe");
    }

    #[test]
    fn detect_overlapping_edits() {
        let text = "abcdefgh";
        let edits = vec![
            TextEdit::new(range(0, 5), "X"),
            TextEdit::new(range(3, 8), "Y"),
        ];

        assert_eq!(
            apply_text_edits(text, &edits),
            Err(EditError::OverlappingEdits {
                first: range(0, 5),
                second: range(3, 8),
            })
        );
    }

    #[test]
    fn touching_edits_are_allowed() {
        let text = "abcdefgh";
        let edits = vec![
            TextEdit::new(range(5, 8), "Y"),
            TextEdit::new(range(0, 5), "X"),
        ];
        assert_eq!(apply_text_edits(text, &edits).unwrap(), "XY");
    }

    #[test]
    fn identical_edits_are_deduplicated() {
        let text = "int foo = 1;";
        let edit = TextEdit::new(range(4, 7), "bar");
        let out = apply_text_edits(text, &[edit.clone(), edit]).unwrap();
        assert_eq!(out, "int bar = 1;");
    }

    #[test]
    fn same_range_different_replacement_conflicts() {
        let text = "int foo = 1;";
        let edits = vec![
            TextEdit::new(range(4, 7), "bar"),
            TextEdit::new(range(4, 7), "baz"),
        ];
        assert!(matches!(
            apply_text_edits(text, &edits),
            Err(EditError::OverlappingEdits { .. })
        ));
    }

    #[test]
    fn inserts_at_one_offset_keep_submission_order() {
        let text = "x";
        let edits = vec![
            TextEdit::insert(TextSize::from(0), "a"),
            TextEdit::insert(TextSize::from(0), "b"),
            TextEdit::new(range(0, 1), "y"),
        ];
        assert_eq!(apply_text_edits(text, &edits).unwrap(), "aby");
    }

    #[test]
    fn repeated_insert_is_applied_once() {
        let edits = vec![
            TextEdit::insert(TextSize::from(0), "a"),
            TextEdit::insert(TextSize::from(0), "b"),
            TextEdit::insert(TextSize::from(0), "a"),
        ];
        assert_eq!(apply_text_edits("x", &edits).unwrap(), "abx");
    }

    #[test]
    fn insert_strictly_inside_replacement_conflicts() {
        let text = "abcdef";
        let edits = vec![
            TextEdit::new(range(1, 4), "X"),
            TextEdit::insert(TextSize::from(2), "!"),
        ];
        assert!(apply_text_edits(text, &edits).is_err());
    }

    #[test]
    fn nested_range_conflicts_with_enclosing_range() {
        let text = "abcdefgh";
        let edits = vec![
            TextEdit::new(range(0, 8), "X"),
            TextEdit::new(range(2, 3), "Y"),
            TextEdit::new(range(6, 7), "Z"),
        ];
        assert!(apply_text_edits(text, &edits).is_err());
    }

    #[test]
    fn rejects_out_of_bounds_and_split_chars() {
        assert!(matches!(
            apply_text_edits("abc", &[TextEdit::new(range(1, 9), "")]),
            Err(EditError::RangeOutOfBounds { .. })
        ));
        assert!(matches!(
            apply_text_edits("é", &[TextEdit::insert(TextSize::from(1), "x")]),
            Err(EditError::InvalidUtf8Boundary { .. })
        ));
    }
}
