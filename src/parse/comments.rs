//! Pass 1 of comment handling: split raw source into comment-free text plus
//! an ordered catalog of comments.
//!
//! Comments are blanked to spaces in the returned text (newlines inside
//! block comments are kept), so every surviving token stays at its original
//! line/column and the lexer never has to know comments existed. Comment
//! delimiters inside string literals are left alone.

use crate::error::{Error, Pos, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Inner text, delimiters stripped, stored verbatim.
    pub text: String,
    pub pos: Pos,
    /// Char offset of the comment's first delimiter character. Comparable
    /// with the char offsets the lexer records on tokens.
    pub offset: usize,
    pub block: bool,
    /// `Some` iff the text begins with `Hint: ` after leading whitespace;
    /// holds the prefix-stripped, trimmed hint text. Interior newlines of a
    /// block hint collapse to single spaces so the hint renders on one line.
    pub hint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Stripped {
    /// Same layout as the input, comments replaced by whitespace.
    pub text: String,
    /// In source order.
    pub comments: Vec<Comment>,
}

pub fn strip_comments(src: &str) -> Result<Stripped> {
    let chars: Vec<char> = src.chars().collect();
    let mut out = String::with_capacity(src.len());
    let mut comments = Vec::new();

    let mut i = 0usize;
    let mut line = 1u32;
    let mut col = 1u32;
    let mut in_string: Option<char> = None;

    let bump = |c: char, line: &mut u32, col: &mut u32| {
        if c == '\n' {
            *line += 1;
            *col = 1;
        } else {
            *col += 1;
        }
    };

    while i < chars.len() {
        let c = chars[i];

        if let Some(quote) = in_string {
            out.push(c);
            bump(c, &mut line, &mut col);
            i += 1;
            if c == '\\' {
                // Keep the escaped char opaque; `\"` must not close the string.
                if let Some(&next) = chars.get(i) {
                    out.push(next);
                    bump(next, &mut line, &mut col);
                    i += 1;
                }
            } else if c == quote {
                in_string = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                in_string = Some(c);
                out.push(c);
                bump(c, &mut line, &mut col);
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                let pos = Pos::new(line, col);
                let offset = i;
                i += 2;
                col += 2;
                let mut text = String::new();
                while let Some(&ch) = chars.get(i) {
                    if ch == '\n' {
                        break;
                    }
                    text.push(ch);
                    col += 1;
                    i += 1;
                }
                out.push_str("  ");
                for _ in text.chars() {
                    out.push(' ');
                }
                comments.push(Comment { hint: classify(&text), text, pos, offset, block: false });
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                let pos = Pos::new(line, col);
                let offset = i;
                i += 2;
                col += 2;
                out.push_str("  ");
                let mut text = String::new();
                let mut closed = false;
                while let Some(&ch) = chars.get(i) {
                    if ch == '*' && chars.get(i + 1) == Some(&'/') {
                        out.push_str("  ");
                        col += 2;
                        i += 2;
                        closed = true;
                        break;
                    }
                    out.push(if ch == '\n' { '\n' } else { ' ' });
                    text.push(ch);
                    bump(ch, &mut line, &mut col);
                    i += 1;
                }
                if !closed {
                    return Err(Error::UnterminatedComment { pos });
                }
                comments.push(Comment { hint: classify(&text), text, pos, offset, block: true });
            }
            _ => {
                out.push(c);
                bump(c, &mut line, &mut col);
                i += 1;
            }
        }
    }

    Ok(Stripped { text: out, comments })
}

/// A comment is a hint iff, after leading whitespace, it starts with the
/// literal prefix `Hint: `. Multi-line block hints are folded onto one
/// line, since hints re-emit as `//` lines.
fn classify(inner: &str) -> Option<String> {
    let rest = inner.trim_start().strip_prefix("Hint: ")?;
    let lines: Vec<&str> = rest.trim().lines().map(str::trim).collect();
    Some(lines.join(" "))
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_block_hints_classify() {
        let src = "// Hint: pick a size\n/* Hint: or a flavor */\n// just a note\n";
        let stripped = strip_comments(src).unwrap();
        assert_eq!(stripped.comments.len(), 3);
        assert_eq!(stripped.comments[0].hint.as_deref(), Some("pick a size"));
        assert!(!stripped.comments[0].block);
        assert_eq!(stripped.comments[1].hint.as_deref(), Some("or a flavor"));
        assert!(stripped.comments[1].block);
        assert_eq!(stripped.comments[2].hint, None);
    }

    #[test]
    fn hint_text_keeps_internal_punctuation() {
        let src = "//   Hint: use \"small\", not tiny.  \n";
        let stripped = strip_comments(src).unwrap();
        assert_eq!(stripped.comments[0].hint.as_deref(), Some("use \"small\", not tiny."));
    }

    #[test]
    fn multiline_block_hint_folds_onto_one_line() {
        let src = "/* Hint: line one\n   line two */";
        let stripped = strip_comments(src).unwrap();
        assert_eq!(stripped.comments[0].hint.as_deref(), Some("line one line two"));
    }

    #[test]
    fn layout_is_preserved() {
        let src = "type A = /* gone */ string;\ntype B = number;";
        let stripped = strip_comments(src).unwrap();
        assert_eq!(stripped.text.len(), src.chars().count());
        // Everything outside the comment is untouched, including the second line.
        assert_eq!(stripped.text.find("string;"), src.find("string;"));
        assert!(stripped.text.contains("\ntype B = number;"));
        assert!(!stripped.text.contains("gone"));
    }

    #[test]
    fn block_comment_newlines_survive() {
        let src = "/* a\nb */type A = 1;";
        let stripped = strip_comments(src).unwrap();
        assert_eq!(stripped.text.matches('\n').count(), 1);
        assert_eq!(stripped.comments[0].text, " a\nb ");
    }

    #[test]
    fn comment_delimiters_inside_strings_are_not_comments() {
        let src = "type A = \"http://x\" | '/*nope*/';";
        let stripped = strip_comments(src).unwrap();
        assert!(stripped.comments.is_empty());
        assert_eq!(stripped.text, src);
    }

    #[test]
    fn unterminated_block_comment_reports_start() {
        let src = "type A = 1;\n  /* drifting";
        let err = strip_comments(src).unwrap_err();
        assert_eq!(err, Error::UnterminatedComment { pos: Pos::new(2, 3) });
    }

    #[test]
    fn offsets_are_in_source_order() {
        let src = "// one\ntype A = 1; // two\n";
        let stripped = strip_comments(src).unwrap();
        assert!(stripped.comments[0].offset < stripped.comments[1].offset);
        assert_eq!(stripped.comments[0].offset, 0);
    }
}
