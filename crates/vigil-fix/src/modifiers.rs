//! Modifier and annotation edits on declarations.

use vigil_core::{TextRange, TextSize};
use vigil_syntax::{Constant, NodeData, NodeRef};
use vigil_types::Modifier;

use crate::{FixError, SuggestedFixBuilder};

/// Position of `modifier` in the conventional modifier order:
/// `public protected private abstract default static sealed final transient
/// volatile synchronized native strictfp`.
pub fn canonical_modifier_order(modifier: Modifier) -> u8 {
    match modifier {
        Modifier::Public => 0,
        Modifier::Protected => 1,
        Modifier::Private => 2,
        Modifier::Abstract => 3,
        Modifier::Default => 4,
        Modifier::Static => 5,
        Modifier::Sealed => 6,
        Modifier::Final => 7,
        Modifier::Transient => 8,
        Modifier::Volatile => 9,
        Modifier::Synchronized => 10,
        Modifier::Native => 11,
        Modifier::Strictfp => 12,
    }
}

/// The modifier keywords written on a declaration, and the offset of the
/// first token after them and the annotations.
pub(crate) struct ModifierTokens {
    pub(crate) keywords: Vec<(Modifier, TextRange)>,
    pub(crate) rest: TextSize,
}

pub(crate) fn modifier_tokens(decl: NodeRef<'_>) -> ModifierTokens {
    let unit = decl.unit();
    let text = unit.text();
    let range = decl.range();
    let end = usize::from(range.end());

    let skipped: Vec<TextRange> = decl
        .data()
        .annotations()
        .iter()
        .filter_map(|&id| unit.node(id))
        .map(|annotation| annotation.range())
        .chain(unit.comments().within(range).map(|comment| comment.range))
        .collect();

    let mut keywords = Vec::new();
    let mut pos = usize::from(range.start());
    loop {
        while pos < end && text.as_bytes()[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if let Some(skip) = skipped.iter().find(|r| usize::from(r.start()) == pos) {
            pos = usize::from(skip.end());
            continue;
        }
        let word_len = text[pos..end]
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(end - pos);
        let word = &text[pos..pos + word_len];
        if word == "non" && text[pos + word_len..end].starts_with("-sealed") {
            pos += "non-sealed".len();
            continue;
        }
        match Modifier::ALL.into_iter().find(|m| m.keyword() == word) {
            Some(modifier) if word_len > 0 => {
                let start = TextSize::from(pos as u32);
                keywords.push((modifier, TextRange::at(start, TextSize::of(word))));
                pos += word_len;
            }
            _ => break,
        }
    }
    ModifierTokens {
        keywords,
        rest: TextSize::from(pos as u32),
    }
}

fn is_suppress_warnings(name: &str) -> bool {
    name == "SuppressWarnings" || name == "java.lang.SuppressWarnings"
}

fn is_string(node: NodeRef<'_>, value: &str) -> bool {
    matches!(
        node.data(),
        NodeData::Literal { value: Some(Constant::String(s)) } if s == value
    )
}

impl SuggestedFixBuilder {
    /// Adds the missing `modifiers` to a class, method or variable
    /// declaration, each in its conventional position among the modifiers
    /// already written. Modifiers already present are left alone.
    pub fn add_modifiers(&mut self, decl: NodeRef<'_>, modifiers: &[Modifier]) -> &mut Self {
        let Some(present) = decl.data().modifiers() else {
            return self.record_error(FixError::NotADeclaration {
                range: decl.range(),
                expected: "modifiable",
            });
        };
        if self.editable(decl).is_none() {
            return self;
        }

        let mut missing: Vec<Modifier> = modifiers
            .iter()
            .copied()
            .filter(|m| !present.contains(*m))
            .collect();
        if missing.is_empty() {
            return self;
        }
        missing.sort_by_key(|m| canonical_modifier_order(*m));
        missing.dedup();

        let tokens = modifier_tokens(decl);
        for modifier in missing {
            let rank = canonical_modifier_order(modifier);
            let at = tokens
                .keywords
                .iter()
                .find(|(existing, _)| canonical_modifier_order(*existing) > rank)
                .map_or(tokens.rest, |(_, range)| range.start());
            self.replace_range(TextRange::empty(at), format!("{} ", modifier.keyword()));
        }
        self
    }

    /// Deletes the given modifier keywords, with the whitespace after each,
    /// from a declaration.
    pub fn remove_modifiers(&mut self, decl: NodeRef<'_>, modifiers: &[Modifier]) -> &mut Self {
        if decl.data().modifiers().is_none() {
            return self.record_error(FixError::NotADeclaration {
                range: decl.range(),
                expected: "modifiable",
            });
        }
        if self.editable(decl).is_none() {
            return self;
        }

        let text = decl.unit().text();
        let end = usize::from(decl.range().end());
        for (modifier, range) in modifier_tokens(decl).keywords {
            if !modifiers.contains(&modifier) {
                continue;
            }
            let from = usize::from(range.end());
            let trailing = text[from..end]
                .find(|c: char| !c.is_whitespace())
                .unwrap_or(end - from);
            let to = TextSize::from((from + trailing) as u32);
            self.replace_range(TextRange::new(range.start(), to), "");
        }
        self
    }

    /// Suppresses `warning` on the declaration enclosing `node` (or `node`
    /// itself), extending an existing `@SuppressWarnings` when there is one.
    pub fn add_suppress_warnings(&mut self, node: NodeRef<'_>, warning: &str) -> &mut Self {
        let Some(decl) = std::iter::once(node)
            .chain(node.ancestors())
            .find(|n| n.kind().is_declaration() && !n.is_generated())
        else {
            return self.record_error(FixError::NotADeclaration {
                range: node.range(),
                expected: "suppressible",
            });
        };

        let unit = decl.unit();
        let existing = decl
            .data()
            .annotations()
            .iter()
            .filter_map(|&id| unit.node(id))
            .find(|a| {
                matches!(a.data(), NodeData::Annotation { name, .. } if is_suppress_warnings(name))
            });
        let Some(annotation) = existing else {
            return self.prefix_with(decl, format!("@SuppressWarnings(\"{warning}\") "));
        };

        let quoted = format!("\"{warning}\"");
        let mut args = annotation.children();
        let value = match (args.next(), args.next()) {
            (Some(arg), None) => match arg.data() {
                NodeData::Assignment { lhs, rhs }
                    if arg.at(*lhs).name().is_some_and(|n| n == "value") =>
                {
                    arg.at(*rhs)
                }
                _ => arg,
            },
            _ => {
                let NodeData::Annotation { name, .. } = annotation.data() else {
                    return self;
                };
                return self.replace(annotation, format!("@{name}({quoted})"));
            }
        };

        match value.data() {
            NodeData::NewArray {
                elem_type: None,
                init: Some(elems),
                ..
            } => {
                let elems: Vec<NodeRef<'_>> = elems.iter().map(|&id| value.at(id)).collect();
                if elems.iter().any(|e| is_string(*e, warning)) {
                    return self;
                }
                match elems.last() {
                    Some(last) => self.postfix_with(*last, format!(", {quoted}")),
                    None => self.replace(value, format!("{{{quoted}}}")),
                }
            }
            _ if is_string(value, warning) => self,
            _ => self.replace(value, format!("{{{}, {quoted}}}", value.text())),
        }
    }
}
