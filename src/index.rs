//! Generic inverted index: token → document postings.
//!
//! Two clients share this contract: the literal indexer over type catalogs,
//! and the plain prose-search demo. Matching is exact token equality after
//! lowercasing; tokens are maximal alphanumeric runs. No stemming, no fuzz.

use std::collections::{HashMap, HashSet};

use colored::Colorize;
use once_cell::sync::Lazy;
use regex::Regex;

/// Process-wide token pattern; built once, read-only thereafter.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Alphabetic}\p{Nd}]+").expect("token pattern is valid")
});

/// Lowercased tokens of a text, in order.
pub fn tokens(text: &str) -> Vec<String> {
    TOKEN.find_iter(text).map(|m| m.as_str().to_lowercase()).collect()
}

fn token_set(text: &str) -> HashSet<String> {
    tokens(text).into_iter().collect()
}

/// Anything indexable. A document may expose several text streams
/// (a literal's primary value plus its aliases, say); all of them count.
pub trait Document {
    fn streams(&self) -> Vec<String>;
}

impl Document for String {
    fn streams(&self) -> Vec<String> {
        vec![self.clone()]
    }
}

#[derive(Debug)]
pub struct Index<D> {
    docs: Vec<D>,
    postings: HashMap<String, Vec<usize>>,
}

impl<D: Document> Index<D> {
    pub fn new() -> Self {
        Index { docs: Vec::new(), postings: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Register a document's tokens against its identity.
    pub fn add(&mut self, doc: D) {
        let ord = self.docs.len();
        let mut seen = HashSet::new();
        for stream in doc.streams() {
            for token in tokens(&stream) {
                if seen.insert(token.clone()) {
                    self.postings.entry(token).or_default().push(ord);
                }
            }
        }
        self.docs.push(doc);
    }

    /// Documents containing at least one query token, ranked by number of
    /// matching tokens, then by insertion order (stable tie-break).
    pub fn matches(&self, query: &str) -> Vec<&D> {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for token in token_set(query) {
            if let Some(hits) = self.postings.get(&token) {
                for &ord in hits {
                    *counts.entry(ord).or_insert(0) += 1;
                }
            }
        }
        let mut ranked: Vec<(usize, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.into_iter().map(|(ord, _)| &self.docs[ord]).collect()
    }
}

/// Split `text` into `(segment, matched)` spans, where a segment is matched
/// iff it is a token whose lowercased form appears in the query.
pub fn highlight_spans(query: &str, text: &str) -> Vec<(String, bool)> {
    let wanted = token_set(query);
    let mut spans = Vec::new();
    let mut last = 0usize;
    for m in TOKEN.find_iter(text) {
        if m.start() > last {
            spans.push((text[last..m.start()].to_string(), false));
        }
        spans.push((m.as_str().to_string(), wanted.contains(&m.as_str().to_lowercase())));
        last = m.end();
    }
    if last < text.len() {
        spans.push((text[last..].to_string(), false));
    }
    spans
}

/// Render `text` with every matching token wrapped in a bold-green marker.
pub fn highlight(query: &str, text: &str) -> String {
    highlight_spans(query, text)
        .into_iter()
        .map(|(seg, hit)| if hit { seg.bold().green().to_string() } else { seg })
        .collect()
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_index(docs: &[&str]) -> Index<String> {
        let mut index = Index::new();
        for d in docs {
            index.add(d.to_string());
        }
        index
    }

    #[test]
    fn tokenizer_splits_on_whitespace_and_punctuation() {
        assert_eq!(tokens("Veggie-Burger, no_cheese!"), vec!["veggie", "burger", "no", "cheese"]);
    }

    #[test]
    fn match_is_case_insensitive_exact_tokens() {
        let index = demo_index(&["Double Cheeseburger", "Veggie Burger", "Fries"]);
        let hits: Vec<&str> = index.matches("BURGER").iter().map(|s| s.as_str()).collect();
        // `burger` is a whole token only in the second document.
        assert_eq!(hits, vec!["Veggie Burger"]);
        assert_eq!(index.matches("cheeseburger").len(), 1);
    }

    #[test]
    fn substring_without_token_equality_does_not_match() {
        let index = demo_index(&["Cheeseburger"]);
        assert!(index.matches("cheese").is_empty());
    }

    #[test]
    fn ranking_counts_matching_tokens_then_insertion_order() {
        let index = demo_index(&["red fish", "red fish blue fish", "blue sky", "red sky"]);
        let hits: Vec<&str> = index.matches("red blue").iter().map(|s| s.as_str()).collect();
        // Two-token matches first; within a rank, insertion order holds.
        assert_eq!(hits, vec!["red fish blue fish", "red fish", "blue sky", "red sky"]);
    }

    #[test]
    fn multiple_streams_all_count() {
        struct Aliased;
        impl Document for Aliased {
            fn streams(&self) -> Vec<String> {
                vec!["err".into(), "failure".into()]
            }
        }
        let mut index = Index::new();
        index.add(Aliased);
        assert_eq!(index.matches("failure").len(), 1);
        assert_eq!(index.matches("err").len(), 1);
        assert_eq!(index.matches("success").len(), 0);
    }

    #[test]
    fn highlight_spans_wrap_only_matching_tokens() {
        let spans = highlight_spans("fish", "one Fish, two fowl");
        let marked: Vec<&str> = spans.iter().filter(|(_, hit)| *hit).map(|(s, _)| s.as_str()).collect();
        assert_eq!(marked, vec!["Fish"]);
        let joined: String = spans.into_iter().map(|(s, _)| s).collect();
        assert_eq!(joined, "one Fish, two fowl");
    }
}
