use vigil_core::{TextRange, TextSize};
use vigil_syntax::{Comment, CommentKind, Constant};

use super::FixtureError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TokenKind {
    /// Identifiers and keywords alike.
    Ident,
    Literal(Constant),
    Punct(&'static str),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub start: u32,
    pub end: u32,
}

impl Token<'_> {
    pub fn range(&self) -> TextRange {
        TextRange::new(TextSize::from(self.start), TextSize::from(self.end))
    }

    pub fn is_punct(&self, punct: &str) -> bool {
        matches!(self.kind, TokenKind::Punct(p) if p == punct)
    }

    pub fn is_ident(&self) -> bool {
        self.kind == TokenKind::Ident
    }
}

// Longest first. `>` is always emitted on its own so that nested generic
// arguments close cleanly; the parser glues `>`/`>=`/`>>` back together.
const PUNCTS: &[&str] = &[
    "<<=", "...", "->", "::", "++", "--", "&&", "||", "==", "!=", "<=", "+=", "-=", "*=", "/=",
    "%=", "&=", "|=", "^=", "<<", "(", ")", "{", "}", "[", "]", ";", ",", ".", "@", "=", ">",
    "<", "!", "~", "?", ":", "+", "-", "*", "/", "&", "|", "^", "%",
];

pub(crate) struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    comments: Vec<Comment>,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Lexer {
            text,
            pos: 0,
            comments: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> Result<(Vec<Token<'a>>, Vec<Comment>), FixtureError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok((tokens, self.comments))
    }

    fn remaining(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn error(&self, message: impl Into<String>) -> FixtureError {
        FixtureError::Syntax {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), FixtureError> {
        loop {
            let trimmed = self.remaining().trim_start();
            self.pos = self.text.len() - trimmed.len();
            let start = self.pos;
            if trimmed.starts_with("//") {
                let len = trimmed.find('\n').unwrap_or(trimmed.len());
                let len = if trimmed[..len].ends_with('\r') {
                    len - 1
                } else {
                    len
                };
                self.pos += len;
                self.push_comment(start, CommentKind::Line);
            } else if trimmed.starts_with("/*") {
                let Some(close) = trimmed[2..].find("*/") else {
                    return Err(self.error("unterminated block comment"));
                };
                let kind = if trimmed.starts_with("/**") && close > 0 {
                    CommentKind::Doc
                } else {
                    CommentKind::Block
                };
                self.pos += close + 4;
                self.push_comment(start, kind);
            } else {
                return Ok(());
            }
        }
    }

    fn push_comment(&mut self, start: usize, kind: CommentKind) {
        self.comments.push(Comment {
            range: TextRange::new(
                TextSize::from(start as u32),
                TextSize::from(self.pos as u32),
            ),
            kind,
        });
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, FixtureError> {
        self.skip_trivia()?;
        let start = self.pos;
        let Some(ch) = self.peek_char() else {
            return Ok(None);
        };
        let kind = if ch.is_alphabetic() || ch == '_' || ch == '$' {
            let len = self
                .remaining()
                .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
                .unwrap_or(self.remaining().len());
            self.pos += len;
            match &self.text[start..self.pos] {
                "true" => TokenKind::Literal(Constant::Bool(true)),
                "false" => TokenKind::Literal(Constant::Bool(false)),
                _ => TokenKind::Ident,
            }
        } else if ch.is_ascii_digit()
            || (ch == '.' && self.remaining()[1..].starts_with(|c: char| c.is_ascii_digit()))
        {
            TokenKind::Literal(self.number()?)
        } else if ch == '"' {
            TokenKind::Literal(Constant::String(self.quoted('"')?))
        } else if ch == '\'' {
            let text = self.quoted('\'')?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => TokenKind::Literal(Constant::Char(c)),
                _ => return Err(self.error("bad char literal")),
            }
        } else {
            let rem = self.remaining();
            let Some(punct) = PUNCTS.iter().find(|p| rem.starts_with(**p)) else {
                return Err(self.error(format!("unexpected character {ch:?}")));
            };
            self.pos += punct.len();
            TokenKind::Punct(punct)
        };
        Ok(Some(Token {
            kind,
            text: &self.text[start..self.pos],
            start: start as u32,
            end: self.pos as u32,
        }))
    }

    fn quoted(&mut self, quote: char) -> Result<String, FixtureError> {
        self.pos += 1;
        let mut out = String::new();
        let mut chars = self.remaining().char_indices();
        while let Some((idx, c)) = chars.next() {
            match c {
                c if c == quote => {
                    self.pos += idx + 1;
                    return Ok(out);
                }
                '\\' => {
                    let Some((_, esc)) = chars.next() else {
                        break;
                    };
                    out.push(match esc {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        'b' => '\u{8}',
                        'f' => '\u{c}',
                        's' => ' ',
                        '0' => '\0',
                        other => other,
                    });
                }
                '\n' => break,
                c => out.push(c),
            }
        }
        Err(self.error("unterminated literal"))
    }

    fn number(&mut self) -> Result<Constant, FixtureError> {
        let rem = self.remaining();
        let prefix = rem.get(..2).map(str::to_ascii_lowercase);
        if let Some(radix) = match prefix.as_deref() {
            Some("0x") => Some(16),
            Some("0b") => Some(2),
            _ => None,
        } {
            let digits_len = rem[2..]
                .find(|c: char| !(c.is_ascii_hexdigit() || c == '_'))
                .unwrap_or(rem.len() - 2);
            let digits: String = rem[2..2 + digits_len].chars().filter(|c| *c != '_').collect();
            let mut len = 2 + digits_len;
            let is_long = rem[len..].starts_with(['l', 'L']);
            if is_long {
                len += 1;
            }
            self.pos += len;
            let value =
                u64::from_str_radix(&digits, radix).map_err(|_| self.error("bad integer"))?;
            return Ok(if is_long {
                Constant::Long(value as i64)
            } else {
                Constant::Int(value as u32 as i32)
            });
        }

        let mut len = 0;
        let mut is_float = false;
        let bytes = rem.as_bytes();
        while len < bytes.len() {
            let b = bytes[len];
            let exponent_sign = matches!(b, b'+' | b'-')
                && len > 0
                && matches!(bytes[len - 1], b'e' | b'E');
            if b.is_ascii_digit() || b == b'_' || exponent_sign {
                len += 1;
            } else if b == b'.' && !is_float {
                is_float = true;
                len += 1;
            } else if matches!(b, b'e' | b'E') {
                is_float = true;
                len += 1;
            } else {
                break;
            }
        }
        let digits: String = rem[..len].chars().filter(|c| *c != '_').collect();
        let suffix = rem[len..].chars().next().map(|c| c.to_ascii_lowercase());
        let value = match suffix {
            Some('l') => {
                len += 1;
                Constant::Long(digits.parse().map_err(|_| self.error("bad long"))?)
            }
            Some('f') => {
                len += 1;
                Constant::Float(digits.parse().map_err(|_| self.error("bad float"))?)
            }
            Some('d') => {
                len += 1;
                Constant::Double(digits.parse().map_err(|_| self.error("bad double"))?)
            }
            _ if is_float => {
                Constant::Double(digits.parse().map_err(|_| self.error("bad double"))?)
            }
            _ => {
                let value: u64 = digits.parse().map_err(|_| self.error("bad int"))?;
                if value > 1 << 31 {
                    return Err(self.error("int literal out of range"));
                }
                // 2147483648 is only legal as the operand of unary minus.
                Constant::Int(value as u32 as i32)
            }
        };
        self.pos += len;
        Ok(value)
    }
}
