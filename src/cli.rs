//! Minimal CLI: parse → (filter | terms | search)
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde::de::DeserializeOwned;

use crate::ast::Catalog;
use crate::filter::FilterEngine;
use crate::index::{self, Index};
use crate::literals::format_path;
use crate::parse::parse;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// narrow a type catalog to the branches matching a query, or search plain documents
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// parse a catalog and print the narrowed version for each query
    Filter(FilterCmd),
    /// show which literal occurrences a query hits, with highlighting
    Terms(TermsCmd),
    /// rank and highlight plain documents against a query (index demo)
    Search(SearchCmd),
}

#[derive(Args, Debug, Clone)]
struct CatalogInput {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug)]
struct FilterCmd {
    #[command(flatten)]
    input: CatalogInput,

    /// query text; repeat for a batch (batches run in parallel)
    #[arg(long, short, num_args = 1.., required = true)]
    query: Vec<String>,

    /// output file (stdout if omitted); batches append a query header line
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TermsCmd {
    #[command(flatten)]
    input: CatalogInput,

    /// query text
    #[arg(long, short)]
    query: String,
}

#[derive(Args, Debug)]
struct SearchCmd {
    /// JSON file holding an array of document strings
    #[arg(long, short)]
    docs: PathBuf,

    /// query text
    #[arg(long, short)]
    query: String,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CatalogInput {
    /// Read every input file, concatenate, and parse one catalog.
    fn load(&self) -> anyhow::Result<Catalog> {
        let paths = resolve_file_path_patterns(&self.input)?;
        let mut source = String::new();
        for path in paths {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            source.push_str(&text);
            source.push('\n');
        }
        parse(&source).map_err(|err| anyhow!("{err}"))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Filter(target) => {
                let catalog = target.input.load()?;
                let engine = FilterEngine::new(&catalog);

                // One immutable catalog, many queries; safe to fan out.
                let sections = target
                    .query
                    .par_iter()
                    .map(|query| {
                        let narrowed = engine.filter(query).map_err(|err| anyhow!("{err}"))?;
                        Ok((query.as_str(), narrowed))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;

                let mut rendered = String::new();
                for (query, narrowed) in &sections {
                    if sections.len() > 1 {
                        rendered.push_str(&format!("// query: {query}\n"));
                    }
                    rendered.push_str(&narrowed.to_string());
                    rendered.push('\n');
                }

                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(out, &rendered)?;
                } else {
                    print!("{rendered}");
                }
                Ok(())
            }
            Command::Terms(target) => {
                let catalog = target.input.load()?;
                let engine = FilterEngine::new(&catalog);
                for entry in engine.literals().matches(&target.query) {
                    let surface = entry
                        .literal
                        .aliases
                        .iter()
                        .fold(entry.literal.value.search_text(), |acc, a| format!("{acc} | {a}"));
                    println!(
                        "{} {}: {}",
                        entry.define,
                        format_path(&entry.path),
                        index::highlight(&target.query, &surface),
                    );
                }
                Ok(())
            }
            Command::Search(target) => {
                let source = std::fs::read_to_string(&target.docs)
                    .with_context(|| format!("failed to read {}", target.docs.display()))?;
                let docs: Vec<String> = from_str_with_path(&source).map_err(|err| anyhow!(err))?;

                let mut idx = Index::new();
                for doc in docs {
                    idx.add(doc);
                }
                for doc in idx.matches(&target.query) {
                    println!("{}", index::highlight(&target.query, doc));
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Deserialize with JSON-path context in error messages.
fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        format!("at JSON path {path} → {}", err.into_inner())
    })
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // Explicit glob that matched nothing -> surface as an error
                return Err(anyhow!("glob pattern matched no files: {pattern}"));
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }
    Ok(out)
}
