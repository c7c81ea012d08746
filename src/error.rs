//! Error taxonomy for the whole pipeline.
//!
//! Parsing either returns a complete catalog or fails with one of these;
//! there are no partial results. Filtering likewise. Every variant that can
//! point at source text carries a [`Pos`].

use thiserror::Error;

/// 1-based line/column into the original source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

impl Pos {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A `/*` with no closing `*/`. Position is the comment's start.
    #[error("unterminated block comment starting at {pos}")]
    UnterminatedComment { pos: Pos },

    /// Any lexical or grammatical mismatch. Aborts the whole parse.
    #[error("syntax error at {pos}: {message}")]
    Syntax { pos: Pos, message: String },

    /// A `ParamRef` that names no declared parameter of its `Define`.
    #[error("type `{define}` uses undeclared parameter `{param}`")]
    UndeclaredParameter { define: String, param: String },

    /// Two `Define`s with the same name. The catalog is a true mapping,
    /// so this is an error rather than last-wins shadowing.
    #[error("duplicate definition of type `{name}`")]
    DuplicateDefinitionName { name: String },

    /// A `Type` reference whose target is absent from the catalog.
    /// Legal until filtering actually walks through it.
    #[error("unresolved type reference `{name}`")]
    UnresolvedTypeReference { name: String },
}

impl Error {
    pub(crate) fn syntax(pos: Pos, message: impl Into<String>) -> Self {
        Error::Syntax { pos, message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
