//! Scalar quoting and block-text encoding for the header block.

use std::borrow::Cow;
use std::fmt::Write as _;

use super::DELIMITER;

/// Quote a scalar as a YAML double-quoted string.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if is_unsafe_char(c) => {
                let _ = write!(out, "\\u{:04X}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Quote every item and join them as a flow sequence.
pub fn quote_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| quote(item)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Characters a YAML block literal cannot carry verbatim.
///
/// libyaml folds these into line breaks or rejects them outright.
fn is_unsafe_char(c: char) -> bool {
    (c.is_control() && c != '\t' && c != '\n')
        || matches!(
            c,
            '\u{2028}' | '\u{2029}' | '\u{feff}' | '\u{fffe}' | '\u{ffff}'
        )
}

/// Offset of the first non-blank byte when the trimmed line is a run of
/// backslashes followed by the delimiter, together with the backslash count.
fn delimiter_like(line: &str) -> Option<(usize, usize)> {
    let trimmed = line.trim();
    let bare = trimmed.trim_start_matches('\\');
    if bare != DELIMITER {
        return None;
    }
    let offset = line.len() - line.trim_start().len();
    Some((offset, trimmed.len() - bare.len()))
}

/// Rewrite lines that would read as a header delimiter.
///
/// `---` becomes `\---`, and any line that already looks escaped gains one more
/// backslash so [`unescape_delimiter_lines`] is an exact inverse.
pub fn escape_delimiter_lines(text: &str) -> Cow<'_, str> {
    if !text.split('\n').any(|line| delimiter_like(line).is_some()) {
        return Cow::Borrowed(text);
    }
    let lines: Vec<String> = text
        .split('\n')
        .map(|line| match delimiter_like(line) {
            Some((offset, _)) => format!("{}\\{}", &line[..offset], &line[offset..]),
            None => line.to_string(),
        })
        .collect();
    Cow::Owned(lines.join("\n"))
}

/// Inverse of [`escape_delimiter_lines`].
pub fn unescape_delimiter_lines(text: &str) -> Cow<'_, str> {
    let escaped = |line: &str| matches!(delimiter_like(line), Some((_, n)) if n > 0);
    if !text.split('\n').any(escaped) {
        return Cow::Borrowed(text);
    }
    let lines: Vec<String> = text
        .split('\n')
        .map(|line| match delimiter_like(line) {
            Some((offset, n)) if n > 0 => format!("{}{}", &line[..offset], &line[offset + 1..]),
            _ => line.to_string(),
        })
        .collect();
    Cow::Owned(lines.join("\n"))
}

/// Append `key: <value>` using a literal block, or a quoted scalar when the
/// text cannot be represented as one.
///
/// `indent` is the column of the key. Block content sits two columns deeper and
/// the header always carries an explicit indentation indicator, so snippets
/// whose first line is indented survive. The chomping indicator is chosen from
/// the number of trailing newlines.
pub fn push_block(out: &mut String, indent: usize, key: &str, text: &str) {
    let pad = " ".repeat(indent);
    let escaped = escape_delimiter_lines(text);
    let core = escaped.trim_end_matches('\n');

    if core.is_empty() || escaped.chars().any(is_unsafe_char) {
        let _ = writeln!(out, "{pad}{key}: {}", quote(&escaped));
        return;
    }

    let trailing = escaped.len() - core.len();
    let chomp = match trailing {
        0 => "-",
        1 => "",
        _ => "+",
    };
    let _ = writeln!(out, "{pad}{key}: |2{chomp}");

    let content_pad = " ".repeat(indent + 2);
    for line in core.split('\n') {
        if line.is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, "{content_pad}{line}");
        }
    }
    for _ in 1..trailing {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes_structural_characters() {
        assert_eq!(quote(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(quote("a\\b"), r#""a\\b""#);
        assert_eq!(quote("one\ntwo\r\tx"), r#""one\ntwo\r\tx""#);
        assert_eq!(quote("bell\u{7}"), r#""bell\u0007""#);
    }

    #[test]
    fn test_quote_list() {
        let items = vec!["loop".to_string(), "a\"b".to_string()];
        assert_eq!(quote_list(&items), r#"["loop", "a\"b"]"#);
        assert_eq!(quote_list(&[]), "[]");
    }

    #[test]
    fn test_escape_rewrites_bare_delimiter_line() {
        let escaped = escape_delimiter_lines("a\n---\nb");
        assert_eq!(escaped, "a\n\\---\nb");
    }

    #[test]
    fn test_escape_keeps_indentation_and_trailing_blanks() {
        let escaped = escape_delimiter_lines("  ---  ");
        assert_eq!(escaped, "  \\---  ");
        assert_eq!(unescape_delimiter_lines(&escaped), "  ---  ");
    }

    #[test]
    fn test_escape_is_reversible_for_already_escaped_looking_lines() {
        for original in ["\\---", "\\\\---", "---", "x---", "----", "-- -"] {
            let escaped = escape_delimiter_lines(original);
            assert_eq!(unescape_delimiter_lines(&escaped), original, "{original}");
        }
    }

    #[test]
    fn test_escape_borrows_when_nothing_to_do() {
        assert!(matches!(
            escape_delimiter_lines("wiggle(2, 10)"),
            Cow::Borrowed(_)
        ));
        assert!(matches!(
            unescape_delimiter_lines("---"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_push_block_strip_chomping() {
        let mut out = String::new();
        push_block(&mut out, 0, "code", "a\n  b");
        assert_eq!(out, "code: |2-\n  a\n    b\n");
    }

    #[test]
    fn test_push_block_clip_and_keep_chomping() {
        let mut out = String::new();
        push_block(&mut out, 0, "code", "a\n");
        assert_eq!(out, "code: |2\n  a\n");

        let mut out = String::new();
        push_block(&mut out, 4, "description", "a\n\nb\n\n");
        assert_eq!(out, "    description: |2+\n      a\n\n      b\n\n");
    }

    #[test]
    fn test_push_block_falls_back_to_quotes_for_carriage_returns() {
        let mut out = String::new();
        push_block(&mut out, 0, "code", "a\r\nb");
        assert_eq!(out, "code: \"a\\r\\nb\"\n");
    }

    #[test]
    fn test_noncharacters_are_escaped() {
        assert_eq!(quote("end\u{ffff}"), r#""end\uFFFF""#);

        let mut out = String::new();
        push_block(&mut out, 0, "code", "a\n\u{fffe}b");
        assert_eq!(out, "code: \"a\\n\\uFFFEb\"\n");
    }
}
