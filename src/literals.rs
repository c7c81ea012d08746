//! Literal indexer: walks a catalog and registers every literal's primary
//! value and aliases in the inverted index, keyed by where the literal sits
//! (which define, which path in its tree).

use std::collections::HashSet;
use std::fmt;

use crate::ast::{Catalog, Literal, Node};
use crate::index::{Document, Index};

/// One structural step from a define's root toward a literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Union branch, by member index.
    Branch(usize),
    /// Struct field, by name.
    Field(String),
    /// Array unwrap.
    Element,
    /// Type-argument of a reference, by index.
    Arg(usize),
    /// Generic parameter's `extends` bound.
    Bound(String),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Branch(i) => write!(f, "|{i}"),
            PathStep::Field(name) => write!(f, ".{name}"),
            PathStep::Element => f.write_str("[]"),
            PathStep::Arg(i) => write!(f, "<{i}>"),
            PathStep::Bound(name) => write!(f, "extends({name})"),
        }
    }
}

pub fn format_path(path: &[PathStep]) -> String {
    let mut out = String::from("$");
    for step in path {
        out.push_str(&step.to_string());
    }
    out
}

/// A literal occurrence: the index's document type for catalogs.
#[derive(Debug, Clone)]
pub struct LitEntry {
    pub define: String,
    pub path: Vec<PathStep>,
    pub literal: Literal,
}

impl Document for LitEntry {
    fn streams(&self) -> Vec<String> {
        let mut streams = vec![self.literal.value.search_text()];
        streams.extend(self.literal.aliases.iter().cloned());
        streams
    }
}

#[derive(Debug)]
pub struct LiteralIndex {
    index: Index<LitEntry>,
}

impl LiteralIndex {
    /// Walk a catalog and index every literal occurrence, in source order.
    pub fn build(catalog: &Catalog) -> Self {
        let mut index = Index::new();
        for define in catalog.iter() {
            for param in &define.params {
                if let Some(bound) = &param.bound {
                    collect(bound, &define.name, &mut vec![PathStep::Bound(param.name.clone())], &mut index);
                }
            }
            collect(&define.value, &define.name, &mut Vec::new(), &mut index);
        }
        LiteralIndex { index }
    }

    /// All literal occurrences hit by at least one query token, ranked.
    pub fn matches(&self, query: &str) -> Vec<&LitEntry> {
        self.index.matches(query)
    }

    /// Where a single term occurs; diagnostics surface for the CLI.
    pub fn occurrences(&self, term: &str) -> Vec<&LitEntry> {
        self.index.matches(term)
    }

    /// The set of literal values that survive a query, by content. Two
    /// occurrences of the same literal text always match together, so
    /// content is the right survival key during filtering.
    pub fn matched_literals(&self, query: &str) -> HashSet<Literal> {
        self.matches(query).into_iter().map(|e| e.literal.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn collect(node: &Node, define: &str, path: &mut Vec<PathStep>, index: &mut Index<LitEntry>) {
    match node {
        Node::Literal(lit) => {
            index.add(LitEntry { define: define.to_string(), path: path.clone(), literal: lit.clone() });
        }
        Node::Never | Node::Any | Node::Param(_) => {}
        Node::Ref(r) => {
            for (i, arg) in r.args.iter().enumerate() {
                path.push(PathStep::Arg(i));
                collect(arg, define, path, index);
                path.pop();
            }
        }
        Node::Union(members) => {
            for (i, m) in members.iter().enumerate() {
                path.push(PathStep::Branch(i));
                collect(m, define, path, index);
                path.pop();
            }
        }
        Node::Array(el) => {
            path.push(PathStep::Element);
            collect(el, define, path, index);
            path.pop();
        }
        Node::Struct(fields) => {
            for field in fields {
                path.push(PathStep::Field(field.name.clone()));
                collect(&field.ty, define, path, index);
                path.pop();
            }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    #[test]
    fn paths_locate_literals() {
        let cat = parse("type A = { kind: \"x\" | \"y\", tags: \"z\"[] };").unwrap();
        let index = LiteralIndex::build(&cat);

        let hits = index.occurrences("y");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].define, "A");
        assert_eq!(hits[0].path, vec![PathStep::Field("kind".into()), PathStep::Branch(1)]);

        let hits = index.occurrences("z");
        assert_eq!(hits[0].path, vec![PathStep::Field("tags".into()), PathStep::Element]);
        assert_eq!(format_path(&hits[0].path), "$.tags[]");
    }

    #[test]
    fn aliases_are_searchable() {
        let cat = parse("type A = LITERAL<\"err\", [\"failure\"], false>;").unwrap();
        let index = LiteralIndex::build(&cat);
        assert_eq!(index.occurrences("failure").len(), 1);
        assert_eq!(index.occurrences("err").len(), 1);
    }

    #[test]
    fn numeric_literals_index_their_display_text() {
        let cat = parse("type A = 7 | \"x\";").unwrap();
        let index = LiteralIndex::build(&cat);
        assert_eq!(index.occurrences("7").len(), 1);
    }

    #[test]
    fn literals_in_type_args_and_bounds_are_indexed() {
        let cat = parse("type A<T extends \"b\"> = Wrap<\"a\">;").unwrap();
        let index = LiteralIndex::build(&cat);
        let a = index.occurrences("a");
        assert_eq!(a[0].path, vec![PathStep::Arg(0)]);
        let b = index.occurrences("b");
        assert_eq!(b[0].path, vec![PathStep::Bound("T".into())]);
    }

    #[test]
    fn matched_literals_key_on_content() {
        let cat = parse("type A = \"x\";\ntype B = \"x\" | \"y\";").unwrap();
        let index = LiteralIndex::build(&cat);
        assert_eq!(index.len(), 3);
        let matched = index.matched_literals("x");
        assert_eq!(matched.len(), 1); // same content collapses
    }
}
