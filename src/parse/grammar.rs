//! Recursive-descent grammar over the token stream, folding straight into
//! Type-Algebra nodes.
//!
//! Grammar shape:
//! ```text
//! source   := define*
//! define   := "type" NAME params? "=" type ";"?
//! params   := "<" param ("," param)* ">"
//! param    := NAME ("extends" type)?
//! type     := "|"? array ("|" array)*
//! array    := primary ("[" "]")*
//! primary  := literal | literalex | "never" | "any"
//!           | NAME ("<" type ("," type)* ">")?
//!           | "{" [field ((","|";") field)*] (","|";")? "}"
//!           | "(" type ")"
//! field    := NAME "?"? ":" type
//! ```
//! Any mismatch is terminal: the whole parse fails with the offending
//! token's position.

use std::collections::HashSet;

use crate::ast::{Define, Field, Literal, Node, ParamDef, TypeRef};
use crate::error::{Error, Result};
use crate::parse::lexer::{Token, TokenKind};

/// A parsed define plus where it started, for hint reattachment.
#[derive(Debug, Clone)]
pub struct RawDefine {
    pub define: Define,
    /// Char offset of the `type` keyword.
    pub start: usize,
}

pub fn parse_defines(tokens: &[Token]) -> Result<Vec<RawDefine>> {
    Parser { tokens, i: 0 }.source()
}

struct Parser<'t> {
    tokens: &'t [Token],
    i: usize,
}

impl<'t> Parser<'t> {
    fn current(&self) -> &'t Token {
        // tokenize always appends Eof, so the last token is a safe floor.
        self.tokens.get(self.i).unwrap_or(&self.tokens[self.tokens.len() - 1])
    }

    fn bump(&mut self) -> &'t Token {
        let tok = self.current();
        if self.i < self.tokens.len() - 1 {
            self.i += 1;
        }
        tok
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.current().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'t Token> {
        let tok = self.current();
        if tok.kind == kind {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&format!("expected {}", kind.describe())))
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        let tok = self.current();
        Error::syntax(tok.pos, format!("{expected}, found {}", tok.kind.describe()))
    }

    fn ident(&mut self) -> Result<(String, &'t Token)> {
        match &self.current().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                Ok((name, self.bump()))
            }
            _ => Err(self.unexpected("expected a name")),
        }
    }

    // ------------------------------ defines ------------------------------ //

    fn source(&mut self) -> Result<Vec<RawDefine>> {
        let mut defines = Vec::new();
        while self.current().kind != TokenKind::Eof {
            defines.push(self.define()?);
        }
        Ok(defines)
    }

    fn define(&mut self) -> Result<RawDefine> {
        let keyword = self.current();
        let start = keyword.offset;
        match &keyword.kind {
            TokenKind::Ident(kw) if kw == "type" => {
                self.bump();
            }
            _ => return Err(self.unexpected("expected `type`")),
        }
        let (name, _) = self.ident()?;
        let params = if self.eat(&TokenKind::Lt) { self.params()? } else { Vec::new() };
        self.expect(TokenKind::Eq)?;
        let value = self.ty()?;
        self.eat(&TokenKind::Semi);

        // Bare references that name a declared parameter are `ParamRef`s.
        let names: HashSet<String> = params.iter().map(|p| p.name.clone()).collect();
        let value = resolve_params(value, &names);
        let params = params
            .into_iter()
            .map(|p| ParamDef {
                name: p.name,
                bound: p.bound.map(|b| resolve_params(b, &names)),
            })
            .collect();

        Ok(RawDefine { define: Define::new(name, params, value), start })
    }

    fn params(&mut self) -> Result<Vec<ParamDef>> {
        let mut params = Vec::new();
        loop {
            let (name, _) = self.ident()?;
            let bound = match &self.current().kind {
                TokenKind::Ident(kw) if kw == "extends" => {
                    self.bump();
                    Some(self.ty()?)
                }
                _ => None,
            };
            params.push(ParamDef { name, bound });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Gt)?;
        Ok(params)
    }

    // ------------------------------- types ------------------------------- //

    fn ty(&mut self) -> Result<Node> {
        self.eat(&TokenKind::Pipe); // optional leading pipe
        let mut members = vec![self.array()?];
        while self.eat(&TokenKind::Pipe) {
            members.push(self.array()?);
        }
        Ok(Node::union(members))
    }

    fn array(&mut self) -> Result<Node> {
        let mut node = self.primary()?;
        while self.eat(&TokenKind::LBracket) {
            self.expect(TokenKind::RBracket)?;
            node = Node::Array(Box::new(node));
        }
        Ok(node)
    }

    fn primary(&mut self) -> Result<Node> {
        match &self.current().kind {
            TokenKind::Str(s) => {
                let s = s.clone();
                self.bump();
                Ok(Node::Literal(Literal::str(s)))
            }
            TokenKind::Int(n) => {
                let n = *n;
                self.bump();
                Ok(Node::Literal(Literal::int(n)))
            }
            TokenKind::Float(x) => {
                let x = *x;
                self.bump();
                Ok(Node::Literal(Literal::float(x)))
            }
            TokenKind::LBrace => self.strukt(),
            TokenKind::LParen => {
                self.bump();
                let inner = self.ty()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident(name) => match name.as_str() {
                "never" => {
                    self.bump();
                    Ok(Node::Never)
                }
                "any" => {
                    self.bump();
                    Ok(Node::Any)
                }
                "LITERAL" if self.peek_is_lt() => self.literal_ex(),
                _ => {
                    let (name, _) = self.ident()?;
                    let args = if self.eat(&TokenKind::Lt) {
                        let mut args = vec![self.ty()?];
                        while self.eat(&TokenKind::Comma) {
                            args.push(self.ty()?);
                        }
                        self.expect(TokenKind::Gt)?;
                        args
                    } else {
                        Vec::new()
                    };
                    Ok(Node::Ref(TypeRef::new(name, args)))
                }
            },
            _ => Err(self.unexpected("expected a type")),
        }
    }

    fn peek_is_lt(&self) -> bool {
        matches!(self.tokens.get(self.i + 1).map(|t| &t.kind), Some(TokenKind::Lt))
    }

    /// `LITERAL<"text",["alias",...],true|false>`
    fn literal_ex(&mut self) -> Result<Node> {
        self.bump(); // LITERAL
        self.expect(TokenKind::Lt)?;
        let text = self.string_lit()?;
        self.expect(TokenKind::Comma)?;
        self.expect(TokenKind::LBracket)?;
        let mut aliases = Vec::new();
        if self.current().kind != TokenKind::RBracket {
            aliases.push(self.string_lit()?);
            while self.eat(&TokenKind::Comma) {
                aliases.push(self.string_lit()?);
            }
        }
        self.expect(TokenKind::RBracket)?;
        self.expect(TokenKind::Comma)?;
        let pinned = match &self.current().kind {
            TokenKind::Ident(b) if b == "true" => {
                self.bump();
                true
            }
            TokenKind::Ident(b) if b == "false" => {
                self.bump();
                false
            }
            _ => return Err(self.unexpected("expected `true` or `false`")),
        };
        self.expect(TokenKind::Gt)?;
        let mut literal = Literal::str(text).with_aliases(aliases);
        literal.pinned = pinned;
        Ok(Node::Literal(literal))
    }

    fn string_lit(&mut self) -> Result<String> {
        match &self.current().kind {
            TokenKind::Str(s) => {
                let s = s.clone();
                self.bump();
                Ok(s)
            }
            _ => Err(self.unexpected("expected a string literal")),
        }
    }

    fn strukt(&mut self) -> Result<Node> {
        self.bump(); // {
        let mut fields: Vec<Field> = Vec::new();
        if self.eat(&TokenKind::RBrace) {
            return Ok(Node::Struct(fields));
        }
        loop {
            let (name, tok) = self.ident()?;
            if fields.iter().any(|f| f.name == name) {
                return Err(Error::syntax(tok.pos, format!("duplicate field `{name}`")));
            }
            let optional = self.eat(&TokenKind::Question);
            self.expect(TokenKind::Colon)?;
            let ty = self.ty()?;
            fields.push(Field { name, optional, ty });
            let separated = self.eat(&TokenKind::Comma) || self.eat(&TokenKind::Semi);
            if self.eat(&TokenKind::RBrace) {
                break;
            }
            if !separated {
                return Err(self.unexpected("expected `,` or `}`"));
            }
        }
        Ok(Node::Struct(fields))
    }
}

/// Rewrite bare refs whose name is a declared parameter into `Param` nodes.
fn resolve_params(node: Node, params: &HashSet<String>) -> Node {
    match node {
        Node::Ref(r) if r.args.is_empty() && params.contains(r.name.as_str()) => Node::Param(r.name),
        Node::Ref(r) => Node::Ref(TypeRef {
            name: r.name,
            args: r.args.into_iter().map(|a| resolve_params(a, params)).collect(),
        }),
        Node::Union(members) => {
            Node::Union(members.into_iter().map(|m| resolve_params(m, params)).collect())
        }
        Node::Array(el) => Node::Array(Box::new(resolve_params(*el, params))),
        Node::Struct(fields) => Node::Struct(
            fields
                .into_iter()
                .map(|f| Field { ty: resolve_params(f.ty, params), ..f })
                .collect(),
        ),
        leaf => leaf,
    }
}

// ------------------------------- Tests ------------------------------------ //
