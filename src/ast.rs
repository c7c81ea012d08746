//! Type algebra: the closed set of node kinds a catalog is made of.
//!
//! Nodes are immutable values once built. Everything derives `Eq + Hash`
//! (floats via `OrderedFloat`) so structural equality works for round-trip
//! checks and filter memo keys. No `serde_json::Value` in here.

use indexmap::IndexMap;
use ordered_float::OrderedFloat;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    /// Bottom: the empty type. Filtering collapses dead branches into this.
    Never,
    /// Top: matches nothing during search, survives everything.
    Any,
    Literal(Literal),
    /// Reference to another `Define` or a builtin (`string`, `number`, ...).
    Ref(TypeRef),
    /// Use of an enclosing `Define`'s generic parameter.
    Param(String),
    /// Flattened sum. Never has fewer than two members.
    Union(Vec<Node>),
    Array(Box<Node>),
    Struct(Vec<Field>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LitValue {
    Str(String),
    Int(i64),
    Float(OrderedFloat<f64>),
}

impl LitValue {
    /// The text surface the inverted index sees for this value.
    pub fn search_text(&self) -> String {
        match self {
            LitValue::Str(s) => s.clone(),
            LitValue::Int(i) => i.to_string(),
            LitValue::Float(f) => f.0.to_string(),
        }
    }
}

/// A literal value plus its search surface. Aliases widen what a query can
/// hit without changing the formatted output; `pinned` exempts the literal
/// from filtering entirely.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub value: LitValue,
    pub aliases: Vec<String>,
    pub pinned: bool,
}

impl Literal {
    pub fn str(text: impl Into<String>) -> Self {
        Literal { value: LitValue::Str(text.into()), aliases: Vec::new(), pinned: false }
    }

    pub fn int(n: i64) -> Self {
        Literal { value: LitValue::Int(n), aliases: Vec::new(), pinned: false }
    }

    pub fn float(n: f64) -> Self {
        Literal { value: LitValue::Float(OrderedFloat(n)), aliases: Vec::new(), pinned: false }
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub name: String,
    pub args: Vec<Node>,
}

impl TypeRef {
    pub fn new(name: impl Into<String>, args: Vec<Node>) -> Self {
        TypeRef { name: name.into(), args }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub optional: bool,
    pub ty: Node,
}

/// A generic parameter declaration, with an optional `extends` bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamDef {
    pub name: String,
    pub bound: Option<Node>,
}

/// One named type declaration, plus any hint lines attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define {
    pub name: String,
    pub params: Vec<ParamDef>,
    pub value: Node,
    pub hints: Vec<String>,
}

impl Define {
    pub fn new(name: impl Into<String>, params: Vec<ParamDef>, value: Node) -> Self {
        Define { name: name.into(), params, value, hints: Vec::new() }
    }

    /// Every `Param` reachable from the value or a bound must name one of
    /// this define's declared parameters.
    fn check_param_refs(&self) -> Result<()> {
        let mut stray: Option<String> = None;
        let mut check = |node: &Node| {
            if stray.is_none() {
                if let Node::Param(p) = node {
                    if !self.params.iter().any(|d| d.name == *p) {
                        stray = Some(p.clone());
                    }
                }
            }
        };
        self.value.walk(&mut check);
        for param in &self.params {
            if let Some(bound) = &param.bound {
                bound.walk(&mut check);
            }
        }
        match stray {
            Some(param) => Err(Error::UndeclaredParameter { define: self.name.clone(), param }),
            None => Ok(()),
        }
    }
}

impl Node {
    pub fn is_never(&self) -> bool {
        matches!(self, Node::Never)
    }

    /// Smart union constructor: flattens nested unions, drops the wrapper
    /// for a single member, and degenerates to `Never` when empty.
    pub fn union(members: Vec<Node>) -> Node {
        let mut flat = Vec::with_capacity(members.len());
        for m in members {
            match m {
                Node::Union(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Node::Never,
            1 => flat.pop().unwrap_or(Node::Never),
            _ => Node::Union(flat),
        }
    }

    /// Pre-order walk over this node and all children.
    pub fn walk(&self, visit: &mut impl FnMut(&Node)) {
        visit(self);
        match self {
            Node::Never | Node::Any | Node::Literal(_) | Node::Param(_) => {}
            Node::Ref(r) => {
                for arg in &r.args {
                    arg.walk(visit);
                }
            }
            Node::Union(members) => {
                for m in members {
                    m.walk(visit);
                }
            }
            Node::Array(el) => el.walk(visit),
            Node::Struct(fields) => {
                for f in fields {
                    f.ty.walk(visit);
                }
            }
        }
    }
}

/// Builtins are pass-through reference targets: always resolvable, never
/// narrowed, never indexed.
pub fn is_builtin(name: &str) -> bool {
    matches!(name, "string" | "number" | "boolean" | "true" | "false" | "null")
}

/// The full mapping from type name to its `Define`, in source order.
///
/// Owns every reachable node. Filtering never mutates a catalog; it builds a
/// new one, so one parsed catalog can serve many queries concurrently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    defines: IndexMap<String, Define>,
    /// Hints from a source with no `Define` at all; emitted standalone.
    pub loose_hints: Vec<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a define, validating parameter references and name uniqueness.
    pub fn insert(&mut self, define: Define) -> Result<()> {
        define.check_param_refs()?;
        if self.defines.contains_key(&define.name) {
            return Err(Error::DuplicateDefinitionName { name: define.name });
        }
        self.defines.insert(define.name.clone(), define);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Define> {
        self.defines.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Define> {
        self.defines.values()
    }

    pub fn len(&self) -> usize {
        self.defines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_constructor_flattens_and_degenerates() {
        let u = Node::union(vec![
            Node::Literal(Literal::str("a")),
            Node::Union(vec![Node::Literal(Literal::str("b")), Node::Literal(Literal::str("c"))]),
        ]);
        match u {
            Node::Union(members) => assert_eq!(members.len(), 3),
            other => panic!("expected flat union, got {other:?}"),
        }

        let single = Node::union(vec![Node::Any]);
        assert_eq!(single, Node::Any);

        let empty = Node::union(vec![]);
        assert_eq!(empty, Node::Never);
    }

    #[test]
    fn catalog_rejects_duplicate_names() {
        let mut cat = Catalog::new();
        cat.insert(Define::new("A", vec![], Node::Any)).unwrap();
        let err = cat.insert(Define::new("A", vec![], Node::Never)).unwrap_err();
        assert_eq!(err, Error::DuplicateDefinitionName { name: "A".into() });
    }

    #[test]
    fn catalog_rejects_undeclared_param_refs() {
        let mut cat = Catalog::new();
        let def = Define::new("Box", vec![ParamDef { name: "T".into(), bound: None }], Node::Param("U".into()));
        let err = cat.insert(def).unwrap_err();
        assert_eq!(
            err,
            Error::UndeclaredParameter { define: "Box".into(), param: "U".into() }
        );
    }

    #[test]
    fn declared_param_refs_are_accepted() {
        let mut cat = Catalog::new();
        let def = Define::new(
            "Box",
            vec![ParamDef { name: "T".into(), bound: Some(Node::Ref(TypeRef::new("string", vec![]))) }],
            Node::Struct(vec![Field { name: "value".into(), optional: false, ty: Node::Param("T".into()) }]),
        );
        cat.insert(def).unwrap();
        assert_eq!(cat.len(), 1);
    }
}
