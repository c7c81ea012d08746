//! Source text → catalog.
//!
//! Three passes over the input, each pass blind to the next: comment
//! extraction, tokenizing, and the grammar fold. Hint reattachment runs
//! last, matching hint comments to defines purely by position.

pub mod comments;
pub mod grammar;
pub mod lexer;

use crate::ast::Catalog;
use crate::error::Result;

/// Parse a full catalog. Errors abort the whole parse; there are no
/// partial catalogs.
pub fn parse(src: &str) -> Result<Catalog> {
    let stripped = comments::strip_comments(src)?;
    let tokens = lexer::tokenize(&stripped.text)?;
    let mut raw = grammar::parse_defines(&tokens)?;

    // Hint reattachment, pass 2: walk define starts in source order; each
    // define consumes the unconsumed hints that precede it. Hints trailing
    // the last define attach to the last define.
    let hints: Vec<(usize, String)> = stripped
        .comments
        .iter()
        .filter_map(|c| c.hint.as_ref().map(|h| (c.offset, h.clone())))
        .collect();

    let mut catalog = Catalog::new();
    if raw.is_empty() {
        catalog.loose_hints = hints.into_iter().map(|(_, h)| h).collect();
        return Ok(catalog);
    }

    let mut cursor = 0usize;
    let last = raw.len() - 1;
    for (k, entry) in raw.iter_mut().enumerate() {
        while cursor < hints.len() && (hints[cursor].0 < entry.start || k == last) {
            entry.define.hints.push(hints[cursor].1.clone());
            cursor += 1;
        }
    }
    for entry in raw {
        catalog.insert(entry.define)?;
    }
    Ok(catalog)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_preservation_property() {
        let cat = parse("// Hint: X\ntype A = string;").unwrap();
        assert_eq!(cat.to_string(), "// X\ntype A=string;");
    }

    #[test]
    fn hint_attaches_to_next_define() {
        let src = "type A = 1;\n// Hint: about B\ntype B = 2;";
        let cat = parse(src).unwrap();
        assert!(cat.get("A").unwrap().hints.is_empty());
        assert_eq!(cat.get("B").unwrap().hints, vec!["about B".to_string()]);
    }

    #[test]
    fn trailing_hint_falls_back_to_last_define() {
        let src = "type A = 1;\ntype B = 2;\n// Hint: afterthought";
        let cat = parse(src).unwrap();
        assert_eq!(cat.get("B").unwrap().hints, vec!["afterthought".to_string()]);
    }

    #[test]
    fn hint_inside_a_body_attaches_to_the_following_define() {
        let src = "type A = {\n  a: 1, // Hint: really about B\n  b: 2\n};\ntype B = 3;";
        let cat = parse(src).unwrap();
        assert!(cat.get("A").unwrap().hints.is_empty());
        assert_eq!(cat.get("B").unwrap().hints, vec!["really about B".to_string()]);
    }

    #[test]
    fn multiple_hints_keep_source_order() {
        let src = "// Hint: first\n/* Hint: second */\ntype A = 1;";
        let cat = parse(src).unwrap();
        assert_eq!(
            cat.get("A").unwrap().hints,
            vec!["first".to_string(), "second".to_string()]
        );
        assert_eq!(cat.to_string(), "// first\n// second\ntype A=1;");
    }

    #[test]
    fn multiline_block_hint_output_reparses() {
        let cat = parse("/* Hint: line one\nline two */\ntype A = 1;").unwrap();
        let rendered = cat.to_string();
        assert_eq!(rendered, "// line one line two\ntype A=1;");
        assert_eq!(parse(&rendered).unwrap(), cat);
    }

    #[test]
    fn hints_with_no_defines_are_standalone() {
        let cat = parse("// Hint: lonely\n").unwrap();
        assert!(cat.is_empty());
        assert_eq!(cat.loose_hints, vec!["lonely".to_string()]);
        assert_eq!(cat.to_string(), "// lonely");
    }

    #[test]
    fn non_hint_comment_inside_struct_does_not_break_fields() {
        let src = "type A = { a: 1, /* note */ b: 2 };";
        let cat = parse(src).unwrap();
        assert_eq!(cat.to_string(), "type A={a:1,b:2};");
    }

    #[test]
    fn duplicate_define_names_are_an_error() {
        let err = parse("type A = 1;\ntype A = 2;").unwrap_err();
        assert_eq!(err, crate::error::Error::DuplicateDefinitionName { name: "A".into() });
    }

    #[test]
    fn forward_references_parse_fine() {
        // Resolution is a filter-time concern.
        let cat = parse("type A = B;\ntype B = \"x\";").unwrap();
        assert_eq!(cat.len(), 2);
    }
}
