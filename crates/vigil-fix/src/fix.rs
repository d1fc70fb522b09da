use std::collections::BTreeSet;
use std::fmt;

use tracing::trace;
use vigil_core::{ranges_conflict, TextEdit, TextRange, TextSize};
use vigil_syntax::{CompilationUnit, NodeKind, NodeRef};

use crate::apply::apply_fixes;
use crate::FixError;

/// An import to add or remove, resolved against the source only when the fix
/// is applied.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImportChange {
    Add { path: String, is_static: bool },
    Remove { path: String, is_static: bool },
}

impl ImportChange {
    pub fn path(&self) -> &str {
        match self {
            ImportChange::Add { path, .. } | ImportChange::Remove { path, .. } => path,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            ImportChange::Add { is_static, .. } | ImportChange::Remove { is_static, .. } => {
                *is_static
            }
        }
    }

    pub fn is_add(&self) -> bool {
        matches!(self, ImportChange::Add { .. })
    }
}

impl fmt::Display for ImportChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.is_add() { "add" } else { "remove" };
        let kind = if self.is_static() { "static import" } else { "import" };
        write!(f, "{verb} {kind} {}", self.path())
    }
}

/// A validated set of edits to one source text.
///
/// Edits are sorted by range and pairwise non-overlapping; ranges may touch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SuggestedFix {
    short_description: String,
    edits: Vec<TextEdit>,
    imports: BTreeSet<ImportChange>,
}

impl SuggestedFix {
    pub fn builder() -> SuggestedFixBuilder {
        SuggestedFixBuilder::default()
    }

    /// A fix that replaces `node` with `text`.
    pub fn replace(node: NodeRef<'_>, text: impl Into<String>) -> Result<Self, FixError> {
        Self::builder().replace(node, text).build()
    }

    /// A fix that deletes `node`.
    pub fn delete(node: NodeRef<'_>) -> Result<Self, FixError> {
        Self::builder().delete(node).build()
    }

    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    pub fn imports(&self) -> impl Iterator<Item = &ImportChange> {
        self.imports.iter()
    }

    pub fn short_description(&self) -> &str {
        &self.short_description
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty() && self.imports.is_empty()
    }

    /// Applies this fix alone to `source`.
    pub fn apply(&self, source: &str) -> Result<String, FixError> {
        let applied = apply_fixes(source, [self]);
        match applied.invalid.into_iter().next() {
            Some(invalid) => Err(FixError::Edit(invalid.error)),
            None => Ok(applied.text),
        }
    }

    /// A human-readable listing of the edits, one per line.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SuggestedFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.short_description.is_empty() {
            f.write_str("suggested fix")?;
        } else {
            f.write_str(&self.short_description)?;
        }
        for edit in &self.edits {
            let start = u32::from(edit.range.start());
            let end = u32::from(edit.range.end());
            if edit.is_insert() {
                write!(f, "\n  insert {:?} at {start}", edit.replacement)?;
            } else if edit.replacement.is_empty() {
                write!(f, "\n  delete {start}..{end}")?;
            } else {
                write!(f, "\n  replace {start}..{end} with {:?}", edit.replacement)?;
            }
        }
        for import in &self.imports {
            write!(f, "\n  {import}")?;
        }
        Ok(())
    }
}

/// Accumulates edits for one [`SuggestedFix`].
///
/// Edit methods never fail on the spot. Problems such as an edit on a
/// generated node are recorded and surface from [`build`](Self::build).
#[derive(Clone, Debug, Default)]
pub struct SuggestedFixBuilder {
    short_description: Option<String>,
    edits: Vec<TextEdit>,
    imports: Vec<ImportChange>,
    errors: Vec<FixError>,
}

impl SuggestedFixBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_short_description(&mut self, text: impl Into<String>) -> &mut Self {
        self.short_description = Some(text.into());
        self
    }

    /// The range of `node`, or `None` (with a recorded error) when it has no
    /// source text of its own.
    pub(crate) fn editable(&mut self, node: NodeRef<'_>) -> Option<TextRange> {
        if node.is_generated() {
            self.errors.push(FixError::GeneratedNode {
                range: node.range(),
            });
            None
        } else {
            Some(node.range())
        }
    }

    pub(crate) fn record_error(&mut self, error: FixError) -> &mut Self {
        self.errors.push(error);
        self
    }

    pub fn replace_range(&mut self, range: TextRange, text: impl Into<String>) -> &mut Self {
        self.edits.push(TextEdit::new(range, text));
        self
    }

    /// Replaces the bytes `start..end` of the source.
    pub fn replace_offsets(
        &mut self,
        start: usize,
        end: usize,
        text: impl Into<String>,
    ) -> &mut Self {
        match (u32::try_from(start), u32::try_from(end)) {
            (Ok(s), Ok(e)) if s <= e => {
                self.replace_range(TextRange::new(TextSize::from(s), TextSize::from(e)), text)
            }
            _ => {
                self.errors.push(FixError::InvalidRange {
                    start: start as i64,
                    end: end as i64,
                });
                self
            }
        }
    }

    pub fn replace(&mut self, node: NodeRef<'_>, text: impl Into<String>) -> &mut Self {
        if let Some(range) = self.editable(node) {
            self.replace_range(range, text);
        }
        self
    }

    /// Replaces `node` after moving its start and end by the given byte
    /// amounts, e.g. `(1, -1)` to replace the inside of a string literal.
    pub fn replace_adjusted(
        &mut self,
        node: NodeRef<'_>,
        text: impl Into<String>,
        start_adj: i32,
        end_adj: i32,
    ) -> &mut Self {
        let Some(range) = self.editable(node) else {
            return self;
        };
        let start = i64::from(u32::from(range.start())) + i64::from(start_adj);
        let end = i64::from(u32::from(range.end())) + i64::from(end_adj);
        let len = node.unit().text().len() as i64;
        if start < 0 || end < start || end > len {
            self.errors.push(FixError::InvalidRange { start, end });
            return self;
        }
        self.replace_offsets(start as usize, end as usize, text)
    }

    pub fn prefix_with(&mut self, node: NodeRef<'_>, text: impl Into<String>) -> &mut Self {
        if let Some(range) = self.editable(node) {
            self.edits.push(TextEdit::insert(range.start(), text));
        }
        self
    }

    pub fn postfix_with(&mut self, node: NodeRef<'_>, text: impl Into<String>) -> &mut Self {
        if let Some(range) = self.editable(node) {
            self.edits.push(TextEdit::insert(range.end(), text));
        }
        self
    }

    pub fn delete(&mut self, node: NodeRef<'_>) -> &mut Self {
        self.replace(node, "")
    }

    /// Exchanges the source text of two disjoint nodes.
    pub fn swap(&mut self, a: NodeRef<'_>, b: NodeRef<'_>) -> &mut Self {
        let (a_text, b_text) = (a.text(), b.text());
        self.replace(a, b_text).replace(b, a_text)
    }

    /// Deletes `node` together with a comment that ends its line. When
    /// nothing else remains on that line the whole line goes.
    pub fn delete_with_trailing_comment(&mut self, node: NodeRef<'_>) -> &mut Self {
        let Some(node_range) = self.editable(node) else {
            return self;
        };
        let unit = node.unit();
        let text = unit.text();

        let mut end = node_range.end();
        if let Some(comment) = unit.comments().next_after(end) {
            let gap = &text[usize::from(end)..usize::from(comment.range.start())];
            let rest = &text[usize::from(comment.range.end())..];
            let rest_of_line = rest.split('\n').next().unwrap_or_default();
            if gap.chars().all(|c| c == ' ' || c == '\t') && rest_of_line.trim().is_empty() {
                end = comment.range.end();
            }
        }
        let mut range = TextRange::new(node_range.start(), end);

        let index = unit.line_index();
        let line = index.line_col(range.start()).line;
        if let Some(line_range) = index.line_range_with_terminator(line) {
            if line_range.contains_range(range) {
                let before = &text[usize::from(line_range.start())..usize::from(range.start())];
                let after = &text[usize::from(range.end())..usize::from(line_range.end())];
                if before.trim().is_empty() && after.trim().is_empty() {
                    range = line_range;
                }
            }
        }
        self.replace_range(range, "")
    }

    pub fn add_import(&mut self, fqn: impl Into<String>) -> &mut Self {
        self.imports.push(ImportChange::Add {
            path: fqn.into(),
            is_static: false,
        });
        self
    }

    pub fn add_static_import(&mut self, owner: &str, member: &str) -> &mut Self {
        self.imports.push(ImportChange::Add {
            path: format!("{owner}.{member}"),
            is_static: true,
        });
        self
    }

    pub fn remove_import(&mut self, fqn: impl Into<String>) -> &mut Self {
        self.imports.push(ImportChange::Remove {
            path: fqn.into(),
            is_static: false,
        });
        self
    }

    pub fn remove_static_import(&mut self, owner: &str, member: &str) -> &mut Self {
        self.imports.push(ImportChange::Remove {
            path: format!("{owner}.{member}"),
            is_static: true,
        });
        self
    }

    /// Adds the edits of a finished fix. Overlaps surface at `build`.
    pub fn merge(&mut self, other: &SuggestedFix) -> &mut Self {
        self.edits.extend(other.edits.iter().cloned());
        self.imports.extend(other.imports.iter().cloned());
        if self.short_description.is_none() && !other.short_description.is_empty() {
            self.short_description = Some(other.short_description.clone());
        }
        self
    }

    pub fn merge_builder(&mut self, other: &SuggestedFixBuilder) -> &mut Self {
        self.edits.extend(other.edits.iter().cloned());
        self.imports.extend(other.imports.iter().cloned());
        self.errors.extend(other.errors.iter().cloned());
        if self.short_description.is_none() {
            self.short_description = other.short_description.clone();
        }
        self
    }

    /// Returns how `fqn` should be spelled in `unit`, adding an import when
    /// that makes the simple name usable.
    ///
    /// The fully qualified name is returned when the simple name is already
    /// taken by another import or by a class declared in the unit.
    pub fn qualify_type(&mut self, unit: &CompilationUnit, fqn: &str) -> String {
        let (package, simple) = match fqn.rsplit_once('.') {
            Some((package, simple)) => (Some(package), simple),
            None => (None, fqn),
        };

        let imported = unit
            .imports()
            .iter()
            .any(|i| !i.is_static && !i.is_wildcard && i.path == fqn)
            || self.pending_add(|path| path == fqn);
        if imported {
            return simple.to_string();
        }

        let clashes_with_import = unit.imports().iter().any(|i| {
            !i.is_static && !i.is_wildcard && i.simple_name() == simple && i.path != fqn
        }) || self.pending_add(|path| {
            path != fqn && path.rsplit('.').next() == Some(simple)
        });
        let clashes_with_class = unit.root().descendants().any(|node| {
            node.kind() == NodeKind::Class
                && node.name().is_some_and(|name| name == simple)
                && !declares(unit, node, fqn)
        });
        if clashes_with_import || clashes_with_class {
            return fqn.to_string();
        }

        let nameable = package == Some("java.lang")
            || package.is_some() && package == unit.package()
            || unit
                .imports()
                .iter()
                .any(|i| !i.is_static && i.is_wildcard && i.covers(fqn));
        if !nameable {
            self.add_import(fqn);
        }
        simple.to_string()
    }

    fn pending_add(&self, pred: impl Fn(&str) -> bool) -> bool {
        self.imports.iter().any(|change| match change {
            ImportChange::Add {
                path,
                is_static: false,
            } => pred(path),
            _ => false,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty() && self.imports.is_empty()
    }

    /// Validates the accumulated edits and freezes them into a fix.
    ///
    /// Identical edits collapse into one. Any other pair of edits whose
    /// ranges overlap is an error; touching ranges are fine.
    pub fn build(&self) -> Result<SuggestedFix, FixError> {
        if let Some(error) = self.errors.first() {
            return Err(error.clone());
        }

        let mut edits: Vec<TextEdit> = Vec::with_capacity(self.edits.len());
        for edit in &self.edits {
            if !edits.contains(edit) {
                edits.push(edit.clone());
            }
        }
        // Stable: insertions at one offset keep their relative order.
        edits.sort_by_key(|e| (e.range.start(), e.range.end()));

        let mut widest: Option<TextRange> = None;
        for edit in &edits {
            if let Some(prev) = widest {
                if ranges_conflict(prev, edit.range) {
                    return Err(FixError::OverlappingEdits {
                        first: prev,
                        second: edit.range,
                    });
                }
            }
            if widest.map_or(true, |prev| edit.range.end() >= prev.end()) {
                widest = Some(edit.range);
            }
        }

        // An add and a remove of the same import cancel out in favor of the add.
        let imports: BTreeSet<ImportChange> = self
            .imports
            .iter()
            .filter(|change| match change {
                ImportChange::Remove { path, is_static } => {
                    !self.imports.contains(&ImportChange::Add {
                        path: path.clone(),
                        is_static: *is_static,
                    })
                }
                ImportChange::Add { .. } => true,
            })
            .cloned()
            .collect();

        trace!(
            target: "vigil.fix",
            edits = edits.len(),
            imports = imports.len(),
            "built suggested fix"
        );
        Ok(SuggestedFix {
            short_description: self.short_description.clone().unwrap_or_default(),
            edits,
            imports,
        })
    }
}

/// Is `class` the declaration of `fqn` in `unit`?
fn declares(unit: &CompilationUnit, class: NodeRef<'_>, fqn: &str) -> bool {
    let mut parts: Vec<&str> = class
        .ancestors()
        .chain(std::iter::once(class))
        .filter(|n| n.kind() == NodeKind::Class)
        .filter_map(|n| n.name().map(|name| name.as_str()))
        .collect();
    // `ancestors` runs innermost first; the class itself was chained last.
    let own = parts.pop();
    parts.reverse();
    parts.extend(own);
    let nested = parts.join(".");
    match unit.package() {
        Some(package) => fqn == format!("{package}.{nested}"),
        None => fqn == nested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vigil_test_utils::compile;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }

    #[test]
    fn overlapping_edits_fail_at_build() {
        let err = SuggestedFix::builder()
            .replace_range(range(0, 5), "a")
            .replace_range(range(3, 8), "b")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            FixError::OverlappingEdits {
                first: range(0, 5),
                second: range(3, 8),
            }
        );

        let fix = SuggestedFix::builder()
            .replace_range(range(5, 8), "b")
            .replace_range(range(0, 5), "a")
            .build()
            .unwrap();
        assert_eq!(fix.edits()[0].range, range(0, 5));
        assert_eq!(fix.edits()[1].range, range(5, 8));
    }

    #[test]
    fn identical_edits_collapse_and_inserts_keep_order() {
        let fix = SuggestedFix::builder()
            .replace_range(range(2, 4), "x")
            .replace_range(range(2, 4), "x")
            .replace_offsets(6, 6, "a")
            .replace_offsets(6, 6, "b")
            .build()
            .unwrap();
        assert_eq!(
            fix.edits(),
            &[
                TextEdit::new(range(2, 4), "x"),
                TextEdit::insert(6.into(), "a"),
                TextEdit::insert(6.into(), "b"),
            ]
        );

        let err = SuggestedFix::builder()
            .replace_range(range(2, 4), "x")
            .replace_range(range(2, 4), "y")
            .build()
            .unwrap_err();
        assert!(matches!(err, FixError::OverlappingEdits { .. }));

        let err = SuggestedFix::builder()
            .replace_offsets(5, 3, "")
            .build()
            .unwrap_err();
        assert_eq!(err, FixError::InvalidRange { start: 5, end: 3 });
    }

    #[test]
    fn node_edits() {
        let f = compile("class A { int foo = 1; String s = \"abc\"; }");
        let text = f.unit().text();
        let literal = f.find(NodeKind::Literal, "\"abc\"");
        let one = f.find(NodeKind::Literal, "1");

        let fix = SuggestedFix::builder()
            .replace_adjusted(literal, "xyz", 1, -1)
            .prefix_with(one, "(")
            .postfix_with(one, ")")
            .build()
            .unwrap();
        assert_eq!(
            fix.apply(text).unwrap(),
            "class A { int foo = (1); String s = \"xyz\"; }"
        );

        let err = SuggestedFix::builder()
            .replace_adjusted(literal, "", 0, 100)
            .build()
            .unwrap_err();
        assert!(matches!(err, FixError::InvalidRange { .. }));
    }

    #[test]
    fn swap_uses_original_text() {
        let f = compile("class A { void m(int a, int b) { m(a, b); } }");
        let a = f.find_nth(NodeKind::Identifier, "a", 0);
        let b = f.find_nth(NodeKind::Identifier, "b", 0);
        let fix = SuggestedFix::builder().swap(a, b).build().unwrap();
        assert_eq!(
            fix.apply(f.unit().text()).unwrap(),
            "class A { void m(int a, int b) { m(b, a); } }"
        );
    }

    #[test]
    fn generated_nodes_cannot_be_edited() {
        let f = compile("class A { }");
        let generated = f
            .unit()
            .root()
            .descendants()
            .find(|n| n.is_generated())
            .unwrap();
        let err = SuggestedFix::replace(generated, "x").unwrap_err();
        assert!(matches!(err, FixError::GeneratedNode { .. }));
    }

    #[test]
    fn add_and_remove_of_one_import_keeps_the_add() {
        let fix = SuggestedFix::builder()
            .remove_import("java.util.List")
            .add_import("java.util.List")
            .add_import("java.util.List")
            .remove_static_import("java.lang.Math", "max")
            .build()
            .unwrap();
        let imports: Vec<String> = fix.imports().map(ToString::to_string).collect();
        assert_eq!(
            imports,
            vec![
                "add import java.util.List".to_string(),
                "remove static import java.lang.Math.max".to_string(),
            ]
        );
    }

    #[test]
    fn merge_combines_and_revalidates() {
        let first = SuggestedFix::builder()
            .set_short_description("first")
            .replace_range(range(0, 2), "a")
            .add_import("java.util.List")
            .build()
            .unwrap();

        let mut builder = SuggestedFix::builder();
        builder.replace_range(range(4, 6), "b").merge(&first);
        let merged = builder.build().unwrap();
        assert_eq!(merged.edits().len(), 2);
        assert_eq!(merged.imports().count(), 1);
        assert_eq!(merged.short_description(), "first");

        let mut clashing = SuggestedFix::builder();
        clashing.replace_range(range(1, 3), "c");
        builder.merge_builder(&clashing);
        assert!(builder.build().is_err());
    }

    #[test]
    fn empty_fixes() {
        assert!(SuggestedFix::builder().is_empty());
        assert!(SuggestedFix::builder().build().unwrap().is_empty());
        assert!(!SuggestedFix::builder()
            .add_import("java.util.List")
            .build()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn qualify_type_imports_or_qualifies() {
        let f = compile(
            r#"
            package p;
            import java.awt.List;
            import java.util.*;
            class Test { }
            "#,
        );
        let unit = f.unit();

        let mut fix = SuggestedFix::builder();
        assert_eq!(fix.qualify_type(unit, "java.lang.String"), "String");
        assert_eq!(fix.qualify_type(unit, "java.util.Map"), "Map");
        assert_eq!(fix.qualify_type(unit, "p.Helper"), "Helper");
        assert_eq!(fix.qualify_type(unit, "java.awt.List"), "List");
        assert_eq!(fix.qualify_type(unit, "java.util.List"), "java.util.List");
        assert_eq!(fix.qualify_type(unit, "q.Test"), "q.Test");
        assert_eq!(fix.qualify_type(unit, "p.Test"), "Test");
        assert!(fix.is_empty());

        assert_eq!(fix.qualify_type(unit, "java.io.File"), "File");
        assert_eq!(fix.qualify_type(unit, "java.io.File"), "File");
        assert_eq!(fix.qualify_type(unit, "com.example.File"), "com.example.File");
        let fix = fix.build().unwrap();
        let imports: Vec<String> = fix.imports().map(ToString::to_string).collect();
        assert_eq!(imports, vec!["add import java.io.File".to_string()]);
    }

    #[test]
    fn delete_with_trailing_comment_takes_the_line() {
        let source = "class A {\n  void m() {\n    m(); // again\n    m(); /* keep */ m();\n  }\n}\n";
        let f = compile(source);
        let first = f.find_nth(NodeKind::ExpressionStatement, "m();", 0);
        let second = f.find_nth(NodeKind::ExpressionStatement, "m();", 1);

        let fix = SuggestedFix::builder()
            .delete_with_trailing_comment(first)
            .build()
            .unwrap();
        assert_eq!(
            fix.apply(source).unwrap(),
            "class A {\n  void m() {\n    m(); /* keep */ m();\n  }\n}\n"
        );

        let fix = SuggestedFix::builder()
            .delete_with_trailing_comment(second)
            .build()
            .unwrap();
        assert_eq!(
            fix.apply(source).unwrap(),
            "class A {\n  void m() {\n    m(); // again\n     /* keep */ m();\n  }\n}\n"
        );
    }

    #[test]
    fn describe_lists_every_edit() {
        let fix = SuggestedFix::builder()
            .set_short_description("Use Arrays.toString")
            .replace_range(range(4, 7), "bar")
            .replace_offsets(0, 0, "x")
            .replace_range(range(8, 9), "")
            .add_static_import("java.lang.Math", "max")
            .build()
            .unwrap();
        assert_eq!(
            fix.describe(),
            "Use Arrays.toString\n  insert \"x\" at 0\n  replace 4..7 with \"bar\"\n  delete 8..9\n  add static import java.lang.Math.max"
        );
    }
}
