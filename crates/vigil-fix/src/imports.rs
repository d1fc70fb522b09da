//! Textual import resolution.
//!
//! Import changes are resolved against the lines of the source being patched,
//! not against a syntax tree, so that fixes compose with edits made by other
//! fixes in the same pass.

use std::collections::BTreeSet;

use tracing::trace;
use vigil_core::{TextEdit, TextRange, TextSize};

use crate::ImportChange;

/// One `import` line found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ImportLine {
    /// Dotted path without `.*`.
    path: String,
    is_static: bool,
    is_wildcard: bool,
    /// The whole line, terminator included.
    range: TextRange,
}

impl ImportLine {
    fn covers(&self, path: &str, is_static: bool) -> bool {
        if self.is_static != is_static {
            return false;
        }
        if self.is_wildcard {
            path.rsplit_once('.').is_some_and(|(owner, _)| owner == self.path)
        } else {
            self.path == path
        }
    }
}

fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// The package line and import lines at the head of a compilation unit.
#[derive(Debug, Default)]
struct Header {
    package_line_end: Option<usize>,
    imports: Vec<ImportLine>,
}

/// Removes comments from one line, tracking whether a block comment is still
/// open at the end of it.
fn strip_comments(line: &str, in_block_comment: &mut bool) -> String {
    let mut code = String::with_capacity(line.len());
    let mut rest = line;
    while !rest.is_empty() {
        if *in_block_comment {
            match rest.find("*/") {
                Some(close) => {
                    *in_block_comment = false;
                    rest = &rest[close + 2..];
                    code.push(' ');
                }
                None => break,
            }
        } else {
            let line_comment = rest.find("//");
            let block_comment = rest.find("/*");
            match (line_comment, block_comment) {
                (Some(l), Some(b)) if l < b => {
                    code.push_str(&rest[..l]);
                    break;
                }
                (_, Some(b)) => {
                    code.push_str(&rest[..b]);
                    *in_block_comment = true;
                    rest = &rest[b + 2..];
                }
                (Some(l), None) => {
                    code.push_str(&rest[..l]);
                    break;
                }
                (None, None) => {
                    code.push_str(rest);
                    break;
                }
            }
        }
    }
    code
}

fn parse_import(code: &str, range: TextRange) -> Option<ImportLine> {
    let rest = code.strip_prefix("import")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let mut rest = rest.trim_start();
    let mut is_static = false;
    if let Some(after_static) = rest.strip_prefix("static") {
        if after_static.starts_with(char::is_whitespace) {
            rest = after_static.trim_start();
            is_static = true;
        }
    }
    let rest = rest.strip_suffix(';').unwrap_or(rest).trim_end();
    let (path, is_wildcard) = match rest.strip_suffix(".*") {
        Some(owner) => (owner, true),
        None => (rest, false),
    };
    Some(ImportLine {
        path: path.to_string(),
        is_static,
        is_wildcard,
        range,
    })
}

/// Reads lines up to the first one holding anything other than the package
/// declaration, an import or a comment.
fn scan_header(text: &str) -> Header {
    let mut header = Header::default();
    let mut in_block_comment = false;
    let mut offset = 0usize;
    for segment in text.split_inclusive('\n') {
        let line_end = offset + segment.len();
        let code = strip_comments(segment, &mut in_block_comment);
        let code = code.trim();
        let range = TextRange::new(
            TextSize::from(offset as u32),
            TextSize::from(line_end as u32),
        );
        offset = line_end;

        if code.is_empty() || code == ";" {
            continue;
        }
        if let Some(import) = parse_import(code, range) {
            header.imports.push(import);
        } else if header.package_line_end.is_none()
            && header.imports.is_empty()
            && code.starts_with("package ")
        {
            header.package_line_end = Some(line_end);
        } else {
            break;
        }
    }
    header
}

fn scan_imports(text: &str) -> Vec<ImportLine> {
    scan_header(text).imports
}

/// Where new imports go: after the last import line, else after the package
/// line, else at the top of the file.
fn insertion_offset(text: &str) -> usize {
    let header = scan_header(text);
    header
        .imports
        .last()
        .map(|line| usize::from(line.range.end()))
        .or(header.package_line_end)
        .unwrap_or(0)
}

/// Turns symbolic import changes into concrete edits against `text`.
///
/// Additions already satisfied by an existing import (explicit or wildcard)
/// are dropped; the rest are inserted together, static imports first, each
/// group sorted. A removal deletes every matching explicit import line unless
/// the same import is also being added.
pub(crate) fn resolve_import_edits(text: &str, changes: &BTreeSet<ImportChange>) -> Vec<TextEdit> {
    let existing = scan_imports(text);
    let mut edits = Vec::new();

    let mut additions: Vec<(bool, &str)> = changes
        .iter()
        .filter_map(|change| match change {
            ImportChange::Add { path, is_static } => Some((*is_static, path.as_str())),
            ImportChange::Remove { .. } => None,
        })
        .filter(|(is_static, path)| !existing.iter().any(|line| line.covers(path, *is_static)))
        .collect();
    // `true` sorts after `false`; statics lead the block.
    additions.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(b.1)));
    additions.dedup();

    for change in changes {
        let ImportChange::Remove { path, is_static } = change else {
            continue;
        };
        let added = changes.contains(&ImportChange::Add {
            path: path.clone(),
            is_static: *is_static,
        });
        if added {
            continue;
        }
        for line in &existing {
            if !line.is_wildcard && line.is_static == *is_static && line.path == *path {
                edits.push(TextEdit::delete(line.range));
            }
        }
    }

    if !additions.is_empty() {
        let eol = line_ending(text);
        let offset = insertion_offset(text);
        let mut block = String::new();
        if offset > 0 && !text[..offset].ends_with('\n') {
            block.push_str(eol);
        }
        if offset > 0 && existing.is_empty() {
            // Only a package line precedes: keep a blank line after it.
            block.push_str(eol);
        }
        for (is_static, path) in &additions {
            block.push_str("import ");
            if *is_static {
                block.push_str("static ");
            }
            block.push_str(path);
            block.push(';');
            block.push_str(eol);
        }
        if offset == 0 {
            block.push_str(eol);
        }
        trace!(
            target: "vigil.fix",
            count = additions.len(),
            offset,
            "inserting imports"
        );
        edits.push(TextEdit::insert(TextSize::from(offset as u32), block));
    }

    edits
}
