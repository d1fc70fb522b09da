//! Renaming a declared variable or method together with its uses.

use tracing::trace;
use vigil_core::{TextRange, TextSize};
use vigil_syntax::{NodeData, NodeRef};

use crate::modifiers::modifier_tokens;
use crate::{FixError, SuggestedFixBuilder};

/// Offset of the first whole-word occurrence of `word` in `text[from..to]`.
fn find_word(text: &str, from: usize, to: usize, word: &str) -> Option<usize> {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    let haystack = &text[from..to];
    haystack.match_indices(word).map(|(i, _)| from + i).find(|&at| {
        let before = text[..at].chars().next_back();
        let after = text[at + word.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

/// The range of the declared name of a variable or method.
fn declared_name(decl: NodeRef<'_>) -> Option<TextRange> {
    let name = decl.name()?;
    let from = match decl.data() {
        NodeData::Variable { ty: Some(ty), .. }
        | NodeData::Method {
            return_type: Some(ty),
            ..
        } => decl.at(*ty).range().end(),
        NodeData::Variable { ty: None, .. } => modifier_tokens(decl).rest,
        _ => return None,
    };
    let text = decl.unit().text();
    let at = find_word(text, usize::from(from), usize::from(decl.range().end()), name)?;
    Some(TextRange::at(TextSize::from(at as u32), TextSize::of(name.as_str())))
}

impl SuggestedFixBuilder {
    /// Renames a field, local variable or parameter declared by `decl`, and
    /// every reference the unit resolves to it.
    pub fn rename_variable(&mut self, decl: NodeRef<'_>, new_name: &str) -> &mut Self {
        if !matches!(decl.data(), NodeData::Variable { .. }) {
            return self.record_error(FixError::NotADeclaration {
                range: decl.range(),
                expected: "variable",
            });
        }
        self.rename_declared(decl, new_name)
    }

    /// Renames the method declared by `decl` and every call or method
    /// reference the unit resolves to it. Overriding methods are not renamed.
    pub fn rename_method(&mut self, decl: NodeRef<'_>, new_name: &str) -> &mut Self {
        if !matches!(decl.data(), NodeData::Method { return_type: Some(_), .. }) {
            return self.record_error(FixError::NotADeclaration {
                range: decl.range(),
                expected: "method",
            });
        }
        self.rename_declared(decl, new_name)
    }

    fn rename_declared(&mut self, decl: NodeRef<'_>, new_name: &str) -> &mut Self {
        let Some(symbol) = decl.symbol() else {
            return self.record_error(FixError::Unresolved {
                range: decl.range(),
            });
        };
        if self.editable(decl).is_none() {
            return self;
        }
        let Some(name_range) = declared_name(decl) else {
            return self.record_error(FixError::Unresolved {
                range: decl.range(),
            });
        };
        self.replace_range(name_range, new_name);

        let mut uses = 0usize;
        for node in decl.unit().root().descendants() {
            if node.is_generated() || node.symbol() != Some(symbol) {
                continue;
            }
            match node.data() {
                NodeData::Identifier { .. } => {
                    self.replace(node, new_name);
                }
                NodeData::MemberSelect { name, .. } | NodeData::MemberReference { name, .. } => {
                    let end = node.range().end();
                    let start = end - TextSize::of(name.as_str());
                    self.replace_range(TextRange::new(start, end), new_name);
                }
                _ => continue,
            }
            uses += 1;
        }
        trace!(target: "vigil.fix", ?symbol, uses, new_name, "renaming declaration");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vigil_syntax::NodeKind;
    use vigil_test_utils::compile;

    use crate::SuggestedFix;

    #[test]
    fn renames_a_field_and_its_references() {
        let source = r#"class A {
  int count;
  int size;
  void m(A other) {
    count = this.count + other.count;
    int countdown = size;
  }
}
"#;
        let f = compile(source);
        let field = f.find(NodeKind::Variable, "int count");
        let fix = SuggestedFix::builder()
            .rename_variable(field, "total")
            .build()
            .unwrap();
        assert_eq!(
            fix.apply(source).unwrap(),
            r#"class A {
  int total;
  int size;
  void m(A other) {
    total = this.total + other.total;
    int countdown = size;
  }
}
"#
        );
    }

    #[test]
    fn renames_a_parameter_and_a_lambda_parameter() {
        let source = r#"import java.util.function.Function;
class A {
  int m(final int x) {
    Function<String, Integer> f = x2 -> x2.length() + x;
    return x * 2;
  }
}
"#;
        let f = compile(source);
        let param = f.find(NodeKind::Variable, "final int x");
        let lambda_param = f.find(NodeKind::Variable, "x2");
        let fix = SuggestedFix::builder()
            .rename_variable(param, "value")
            .rename_variable(lambda_param, "s")
            .build()
            .unwrap();
        assert_eq!(
            fix.apply(source).unwrap(),
            r#"import java.util.function.Function;
class A {
  int m(final int value) {
    Function<String, Integer> f = s -> s.length() + value;
    return value * 2;
  }
}
"#
        );
    }

    #[test]
    fn renames_a_method_and_its_calls() {
        let source = r#"class A {
  int get() { return 1; }
  int get(int i) { return i; }
  int m(A a) { return get() + a.get() + get(2); }
}
"#;
        let f = compile(source);
        let method = f.find_starting(NodeKind::Method, "int get()");
        let fix = SuggestedFix::builder()
            .rename_method(method, "one")
            .build()
            .unwrap();
        assert_eq!(
            fix.apply(source).unwrap(),
            r#"class A {
  int one() { return 1; }
  int get(int i) { return i; }
  int m(A a) { return one() + a.one() + get(2); }
}
"#
        );
    }

    #[test]
    fn rename_needs_the_right_declaration() {
        let f = compile("class A { A() {} int x; }");
        let ctor = f.find_starting(NodeKind::Method, "A()");
        let err = SuggestedFix::builder()
            .rename_method(ctor, "B")
            .build()
            .unwrap_err();
        assert!(matches!(err, FixError::NotADeclaration { expected: "method", .. }));

        let field = f.find(NodeKind::Variable, "int x");
        let err = SuggestedFix::builder()
            .rename_method(field, "y")
            .build()
            .unwrap_err();
        assert!(matches!(err, FixError::NotADeclaration { .. }));
    }
}
