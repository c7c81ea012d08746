//! Query-driven narrowing: rewrite a catalog so only the literal branches
//! that match a query survive.
//!
//! Filtering is a pure function of (catalog, query). It never mutates the
//! source catalog; it builds a structurally independent new one, so a single
//! parsed catalog can serve any number of queries concurrently.

use std::collections::{HashMap, HashSet};

use crate::ast::{is_builtin, Catalog, Define, Field, Literal, Node, ParamDef, TypeRef};
use crate::error::{Error, Result};
use crate::literals::LiteralIndex;

/// A catalog plus its literal index, ready to answer queries.
pub struct FilterEngine<'a> {
    catalog: &'a Catalog,
    literals: LiteralIndex,
}

impl<'a> FilterEngine<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        FilterEngine { catalog, literals: LiteralIndex::build(catalog) }
    }

    pub fn literals(&self) -> &LiteralIndex {
        &self.literals
    }

    /// Produce the narrowed catalog for one query.
    pub fn filter(&self, query: &str) -> Result<Catalog> {
        let mut run = Narrow {
            catalog: self.catalog,
            matched: self.literals.matched_literals(query),
            memo: HashMap::new(),
            in_progress: HashSet::new(),
        };
        run.catalog()
    }
}

/// Parameter scope while filtering one define's body: `None` means the
/// parameter is opaque (unbound), `Some` is a substituted, already-filtered
/// type argument.
type Scope = HashMap<String, Option<Node>>;

/// Memo key: a reference target together with its filtered arguments.
type RefKey = (String, Vec<Node>);

struct Narrow<'a> {
    catalog: &'a Catalog,
    matched: HashSet<Literal>,
    memo: HashMap<RefKey, Node>,
    in_progress: HashSet<RefKey>,
}

impl Narrow<'_> {
    fn catalog(&mut self) -> Result<Catalog> {
        let mut out = Catalog::new();
        out.loose_hints = self.catalog.loose_hints.clone();
        for define in self.catalog.iter() {
            if let Some(narrowed) = self.define(define)? {
                out.insert(narrowed)?;
            }
        }
        Ok(out)
    }

    /// Narrow one define. `None` means everything pruned away and the
    /// define (hint included) drops from the output.
    fn define(&mut self, define: &Define) -> Result<Option<Define>> {
        let scope: Scope = define.params.iter().map(|p| (p.name.clone(), None)).collect();

        let mut params = Vec::with_capacity(define.params.len());
        for param in &define.params {
            let bound = match &param.bound {
                Some(b) => Some(self.node(b, &scope)?),
                None => None,
            };
            // A bound narrowed to nothing leaves no legal instantiation.
            if matches!(bound, Some(Node::Never)) {
                return Ok(None);
            }
            params.push(ParamDef { name: param.name.clone(), bound });
        }

        let value = self.node(&define.value, &scope)?;
        if value.is_never() {
            return Ok(None);
        }
        Ok(Some(Define { name: define.name.clone(), params, value, hints: define.hints.clone() }))
    }

    fn node(&mut self, node: &Node, scope: &Scope) -> Result<Node> {
        match node {
            Node::Never | Node::Any => Ok(node.clone()),

            Node::Literal(lit) => {
                if lit.pinned || self.matched.contains(lit) {
                    Ok(node.clone())
                } else {
                    Ok(Node::Never)
                }
            }

            Node::Param(name) => match scope.get(name) {
                // Substituted argument; already filtered by the caller.
                Some(Some(arg)) => Ok(arg.clone()),
                // Opaque parameter passes through untouched.
                _ => Ok(node.clone()),
            },

            Node::Array(el) => {
                let el = self.node(el, scope)?;
                if el.is_never() {
                    Ok(Node::Never)
                } else {
                    Ok(Node::Array(Box::new(el)))
                }
            }

            // Struct shape is never collapsed: a field whose type empties
            // keeps its slot with a `never` type.
            Node::Struct(fields) => {
                let fields = fields
                    .iter()
                    .map(|f| {
                        Ok(Field {
                            name: f.name.clone(),
                            optional: f.optional,
                            ty: self.node(&f.ty, scope)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Node::Struct(fields))
            }

            Node::Union(members) => {
                let mut kept = Vec::with_capacity(members.len());
                for m in members {
                    let m = self.node(m, scope)?;
                    if !m.is_never() {
                        kept.push(m);
                    }
                }
                // 0 members → Never; 1 member → the member itself.
                Ok(Node::union(kept))
            }

            Node::Ref(r) => self.reference(r, scope),
        }
    }

    fn reference(&mut self, r: &TypeRef, scope: &Scope) -> Result<Node> {
        let mut args = Vec::with_capacity(r.args.len());
        for arg in &r.args {
            let arg = self.node(arg, scope)?;
            if arg.is_never() {
                return Ok(Node::Never);
            }
            args.push(arg);
        }

        if is_builtin(&r.name) {
            return Ok(Node::Ref(TypeRef::new(r.name.clone(), args)));
        }

        let target = self
            .catalog
            .get(&r.name)
            .ok_or_else(|| Error::UnresolvedTypeReference { name: r.name.clone() })?;

        let key: RefKey = (r.name.clone(), args.clone());
        let body = if let Some(cached) = self.memo.get(&key) {
            cached.clone()
        } else if self.in_progress.contains(&key) {
            // Recursive reference: assume survival to break the cycle.
            return Ok(Node::Ref(TypeRef::new(r.name.clone(), args)));
        } else {
            self.in_progress.insert(key.clone());
            let result = self.instantiate(target, &args);
            self.in_progress.remove(&key);
            let body = result?;
            self.memo.insert(key, body.clone());
            body
        };

        if body.is_never() {
            Ok(Node::Never)
        } else {
            Ok(Node::Ref(TypeRef::new(r.name.clone(), args)))
        }
    }

    /// Filter a target define's value with its parameters bound to the
    /// supplied (already filtered) arguments. Missing arguments leave the
    /// parameter opaque; excess arguments are ignored.
    fn instantiate(&mut self, target: &Define, args: &[Node]) -> Result<Node> {
        let scope: Scope = target
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), args.get(i).cloned()))
            .collect();
        for param in &target.params {
            if let Some(bound) = &param.bound {
                if self.node(bound, &scope)?.is_never() {
                    return Ok(Node::Never);
                }
            }
        }
        self.node(&target.value, &scope)
    }
}

// ------------------------------- Tests ------------------------------------ //
