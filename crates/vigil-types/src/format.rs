//! Java-like rendering and parsing of types.
//!
//! Rendering uses fully qualified class names and is stable, so it can be used
//! as a lookup key. Parsing accepts the same syntax plus simple `java.lang`
//! names.

use std::fmt::Write as _;

use crate::{ClassType, PrimitiveType, Type, TypeEnv, WildcardBound};

pub fn format_type(env: &dyn TypeEnv, ty: &Type) -> String {
    let mut out = String::new();
    write_type(env, ty, false, &mut out);
    out
}

/// Like [`format_type`], but with simple class names (`List<String>`).
pub fn format_type_simple(env: &dyn TypeEnv, ty: &Type) -> String {
    let mut out = String::new();
    write_type(env, ty, true, &mut out);
    out
}

fn write_type(env: &dyn TypeEnv, ty: &Type, simple: bool, out: &mut String) {
    match ty {
        Type::Void => out.push_str("void"),
        Type::Primitive(p) => out.push_str(p.keyword()),
        Type::Class(ClassType { def, args }) => {
            match env.class(*def) {
                Some(class) if simple => out.push_str(class.simple_name()),
                Some(class) => out.push_str(&class.name),
                None => {
                    let _ = write!(out, "<class#{}>", def.to_raw());
                }
            }
            if !args.is_empty() {
                out.push('<');
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    write_type(env, arg, simple, out);
                }
                out.push('>');
            }
        }
        Type::Array(elem) => {
            write_type(env, elem, simple, out);
            out.push_str("[]");
        }
        Type::TypeVar(id) => match env.type_param(*id) {
            Some(tp) => out.push_str(&tp.name),
            None => {
                let _ = write!(out, "<tv#{}>", id.to_raw());
            }
        },
        Type::Wildcard(WildcardBound::Unbounded) => out.push('?'),
        Type::Wildcard(WildcardBound::Extends(upper)) => {
            out.push_str("? extends ");
            write_type(env, upper, simple, out);
        }
        Type::Wildcard(WildcardBound::Super(lower)) => {
            out.push_str("? super ");
            write_type(env, lower, simple, out);
        }
        Type::Intersection(parts) => {
            for (idx, part) in parts.iter().enumerate() {
                if idx > 0 {
                    out.push_str(" & ");
                }
                write_type(env, part, simple, out);
            }
        }
        Type::Null => out.push_str("null"),
        Type::Named(name) => out.push_str(name),
        Type::Unknown => out.push_str("<unknown>"),
        Type::Error => out.push_str("<error>"),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token<'a> {
    Name(&'a str),
    Punct(char),
}

fn tokenize(text: &str) -> Option<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((start, ch)) = chars.next() {
        match ch {
            c if c.is_whitespace() => {}
            '<' | '>' | ',' | '[' | ']' | '?' | '&' => tokens.push(Token::Punct(ch)),
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let mut end = start + c.len_utf8();
                while let Some(&(idx, next)) = chars.peek() {
                    if next.is_alphanumeric() || matches!(next, '_' | '$' | '.') {
                        end = idx + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Name(&text[start..end]));
            }
            _ => return None,
        }
    }
    Some(tokens)
}

struct Parser<'a, 'env> {
    env: &'env dyn TypeEnv,
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl Parser<'_, '_> {
    fn peek(&self) -> Option<Token<'_>> {
        self.tokens.get(self.pos).copied()
    }

    fn eat(&mut self, punct: char) -> bool {
        if self.peek() == Some(Token::Punct(punct)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn name(&mut self) -> Option<String> {
        match self.tokens.get(self.pos).copied() {
            Some(Token::Name(name)) => {
                self.pos += 1;
                Some(name.to_string())
            }
            _ => None,
        }
    }

    fn type_arg(&mut self) -> Option<Type> {
        if !self.eat('?') {
            return self.ty();
        }
        let save = self.pos;
        match self.name().as_deref() {
            Some("extends") => Some(Type::Wildcard(WildcardBound::Extends(Box::new(self.ty()?)))),
            Some("super") => Some(Type::Wildcard(WildcardBound::Super(Box::new(self.ty()?)))),
            _ => {
                self.pos = save;
                Some(Type::Wildcard(WildcardBound::Unbounded))
            }
        }
    }

    fn ty(&mut self) -> Option<Type> {
        let name = self.name()?;
        let mut ty = if name == "void" {
            Type::Void
        } else if let Some(p) = PrimitiveType::from_keyword(&name) {
            Type::Primitive(p)
        } else {
            let def = self
                .env
                .lookup_class(&name)
                .or_else(|| self.env.lookup_class(&format!("java.lang.{name}")))?;
            let mut args = Vec::new();
            if self.eat('<') {
                loop {
                    args.push(self.type_arg()?);
                    if self.eat('>') {
                        break;
                    }
                    if !self.eat(',') {
                        return None;
                    }
                }
            }
            Type::class(def, args)
        };
        while self.eat('[') {
            if !self.eat(']') {
                return None;
            }
            ty = Type::array(ty);
        }
        Some(ty)
    }
}

/// Parse a type spelled in Java syntax, e.g. `java.util.List<String>[]`.
///
/// Returns `None` for malformed input or names the environment does not know.
pub fn parse_type(env: &dyn TypeEnv, text: &str) -> Option<Type> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        env,
        tokens,
        pos: 0,
    };
    let ty = parser.ty()?;
    if parser.pos != parser.tokens.len() {
        return None;
    }
    Some(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_and_format_agree() {
        let env = TypeStore::with_minimal_jdk();
        for text in [
            "int",
            "int[][]",
            "java.lang.String",
            "java.util.List<java.lang.String>",
            "java.util.Map<java.lang.String, java.util.List<? extends java.lang.Number>>",
            "java.util.Collection<? super java.lang.Integer>",
            "java.util.List<?>",
        ] {
            let ty = parse_type(&env, text).unwrap();
            assert_eq!(format_type(&env, &ty), text);
        }
    }

    #[test]
    fn simple_java_lang_names_resolve() {
        let env = TypeStore::with_minimal_jdk();
        assert_eq!(parse_type(&env, "String"), Some(env.string_type()));
        assert_eq!(
            format_type_simple(&env, &parse_type(&env, "java.util.List<String>").unwrap()),
            "List<String>"
        );
    }

    #[test]
    fn rejects_unknown_and_malformed() {
        let env = TypeStore::with_minimal_jdk();
        assert_eq!(parse_type(&env, "com.example.Missing"), None);
        assert_eq!(parse_type(&env, "java.util.List<String"), None);
        assert_eq!(parse_type(&env, "int[ "), None);
        assert_eq!(parse_type(&env, "int int"), None);
    }
}
