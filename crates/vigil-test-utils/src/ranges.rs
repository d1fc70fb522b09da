use vigil_core::{TextRange, TextSize};

/// Extracts a byte range selection from a fixture containing `/*start*/` and
/// `/*end*/` markers.
///
/// Returns the fixture with markers removed and the selection `TextRange`
/// pointing at the extracted region.
pub fn extract_range(fixture: &str) -> (String, TextRange) {
    let start_marker = "/*start*/";
    let end_marker = "/*end*/";

    let start = fixture
        .find(start_marker)
        .expect("fixture missing /*start*/ marker");
    let after_start = start + start_marker.len();
    let end = fixture
        .find(end_marker)
        .expect("fixture missing /*end*/ marker");
    assert!(end >= after_start, "/*end*/ must come after /*start*/");

    let mut text = String::with_capacity(fixture.len());
    text.push_str(&fixture[..start]);
    text.push_str(&fixture[after_start..end]);
    text.push_str(&fixture[end + end_marker.len()..]);

    // The end shrinks by the length of the start marker.
    let range = TextRange::new(
        TextSize::from(start as u32),
        TextSize::from((end - start_marker.len()) as u32),
    );
    (text, range)
}

/// The range of the first occurrence of `needle` in `text`.
pub fn span(text: &str, needle: &str) -> TextRange {
    span_nth(text, needle, 0)
}

/// The range of the `n`th (zero-based) occurrence of `needle` in `text`.
pub fn span_nth(text: &str, needle: &str, n: usize) -> TextRange {
    let (start, _) = text
        .match_indices(needle)
        .nth(n)
        .unwrap_or_else(|| panic!("{needle:?} occurs fewer than {} times", n + 1));
    TextRange::at(
        TextSize::from(start as u32),
        TextSize::from(needle.len() as u32),
    )
}

/// Splits a multi-file fixture on `//- /path` header lines.
///
/// Text before the first header is ignored.
pub fn parse_files(fixture: &str) -> Vec<(String, String)> {
    let mut files = Vec::new();
    let mut current: Option<(String, String)> = None;
    for line in fixture.lines() {
        if let Some(rest) = line.strip_prefix("//-") {
            files.extend(current.take());
            let path = rest.trim().trim_start_matches('/').to_string();
            current = Some((path, String::new()));
            continue;
        }
        if let Some((_, text)) = current.as_mut() {
            text.push_str(line);
            text.push('\n');
        }
    }
    files.extend(current);
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_range_handles_multibyte_chars() {
        let input = "a/*start*/αβ/*end*/c";
        let (text, range) = extract_range(input);
        assert_eq!(text, "aαβc");
        assert_eq!(&text[std::ops::Range::<usize>::from(range)], "αβ");
    }

    #[test]
    fn span_finds_later_occurrences() {
        let text = "x = x + 1;";
        assert_eq!(span(text, "x"), TextRange::new(0.into(), 1.into()));
        assert_eq!(span_nth(text, "x", 1), TextRange::new(4.into(), 5.into()));
    }

    #[test]
    fn multi_file_fixtures_split_on_headers() {
        let files = parse_files("//- /a/A.java\nclass A {}\n//- /B.java\nclass B {}\n");
        assert_eq!(
            files,
            vec![
                ("a/A.java".to_string(), "class A {}\n".to_string()),
                ("B.java".to_string(), "class B {}\n".to_string()),
            ]
        );
    }
}
