//! In-process searcher over a fixed document set
//!
//! Documents are analyzed once at construction (lowercased, split on
//! non-alphanumeric characters) and never change afterwards. Queries are
//! evaluated against every document and scored with BM25.

use super::traits::{BackendKind, Searcher};
use crate::error::Result;
use crate::query::{Matcher, Occur, Query, RangeBounds};
use crate::results::{FieldBag, RawHit, RawResults};
use crate::search::SearchQuery;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// BM25 term frequency saturation
const K1: f32 = 1.2;
/// BM25 length normalization
const B: f32 = 0.75;

/// A document held by a [`MemorySearcher`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryDocument {
    pub id: String,
    /// Field values; a plain string is read as a one-element list
    #[serde(default, deserialize_with = "one_or_many")]
    pub fields: FieldBag,
}

impl MemoryDocument {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: FieldBag::new(),
        }
    }

    /// Append a value to a field
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.entry(name.into()).or_default().push(value.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<FieldBag, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: HashMap<String, OneOrMany> = HashMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, value)| {
            let values = match value {
                OneOrMany::One(v) => vec![v],
                OneOrMany::Many(v) => v,
            };
            (name, values)
        })
        .collect())
}

/// Read a JSON array of documents from a file
pub fn read_documents(path: impl AsRef<Path>) -> anyhow::Result<Vec<MemoryDocument>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading documents from {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing documents in {}", path.display()))
}

/// Split text into lowercase alphanumeric tokens
pub fn analyze(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

struct IndexedDocument {
    source: MemoryDocument,
    /// field name -> tokens of each value
    tokens: HashMap<String, Vec<Vec<String>>>,
    /// Total token count across fields
    length: usize,
}

/// Searcher over documents kept in memory
pub struct MemorySearcher {
    name: String,
    documents: Vec<IndexedDocument>,
    doc_freqs: HashMap<String, usize>,
    avg_length: f32,
}

impl MemorySearcher {
    /// Create a searcher over a fixed set of documents
    pub fn new(name: impl Into<String>, documents: Vec<MemoryDocument>) -> Self {
        let mut doc_freqs: HashMap<String, usize> = HashMap::new();
        let mut total_length = 0usize;

        let documents: Vec<IndexedDocument> = documents
            .into_iter()
            .map(|source| {
                let tokens: HashMap<String, Vec<Vec<String>>> = source
                    .fields
                    .iter()
                    .map(|(name, values)| {
                        (name.clone(), values.iter().map(|v| analyze(v)).collect())
                    })
                    .collect();

                let mut seen: Vec<&str> = tokens.values().flatten().flatten().map(|t| t.as_str()).collect();
                let length = seen.len();
                seen.sort_unstable();
                seen.dedup();
                for token in seen {
                    *doc_freqs.entry(token.to_string()).or_insert(0) += 1;
                }
                total_length += length;

                IndexedDocument {
                    source,
                    tokens,
                    length,
                }
            })
            .collect();

        let avg_length = if documents.is_empty() {
            1.0
        } else {
            (total_length as f32 / documents.len() as f32).max(1.0)
        };

        Self {
            name: name.into(),
            documents,
            doc_freqs,
            avg_length,
        }
    }

    fn idf(&self, token: &str) -> f32 {
        let df = self.doc_freqs.get(token).copied().unwrap_or(0) as f32;
        let n = self.documents.len() as f32;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn term_weight(&self, idf: f32, tf: usize, doc: &IndexedDocument) -> f32 {
        let tf = tf as f32;
        let norm = 1.0 - B + B * doc.length as f32 / self.avg_length;
        idf * (tf * (K1 + 1.0)) / (tf + K1 * norm)
    }

    /// Score a document, `None` when it does not match
    fn score(&self, doc: &IndexedDocument, query: &Query) -> Option<f32> {
        match query {
            Query::Field(leaf) => self.score_leaf(doc, leaf.field.as_deref(), &leaf.matcher),
            Query::Boost { query, boost } => self.score(doc, query).map(|s| s * boost),
            Query::Boolean(clauses) => {
                let mut total = 0.0;
                let mut required = false;
                let mut optional_matched = false;

                for clause in clauses {
                    match clause.occur {
                        Occur::Must => {
                            required = true;
                            total += self.score(doc, &clause.query)?;
                        }
                        Occur::MustNot => {
                            if self.score(doc, &clause.query).is_some() {
                                return None;
                            }
                        }
                        Occur::Should => {
                            if let Some(s) = self.score(doc, &clause.query) {
                                total += s;
                                optional_matched = true;
                            }
                        }
                    }
                }

                (required || optional_matched).then_some(total)
            }
        }
    }

    fn score_leaf(&self, doc: &IndexedDocument, field: Option<&str>, matcher: &Matcher) -> Option<f32> {
        let values: Vec<&Vec<String>> = match field {
            Some(name) => doc.tokens.get(name)?.iter().collect(),
            None => doc.tokens.values().flatten().collect(),
        };

        match matcher {
            Matcher::Term(text) => self.score_sequence(doc, &values, &analyze(text), 0),
            Matcher::Phrase { text, slop } => {
                self.score_sequence(doc, &values, &analyze(text), *slop as usize)
            }
            Matcher::Prefix(prefix) => {
                let prefix = prefix.to_lowercase();
                self.score_tokens(doc, &values, |t| t.starts_with(&prefix))
            }
            Matcher::Wildcard(pattern) => {
                let pattern = compile_glob(&pattern.to_lowercase());
                self.score_tokens(doc, &values, |t| wildcard_match(&pattern, t))
            }
            Matcher::Fuzzy { text, distance } => {
                let text = text.to_lowercase();
                self.score_tokens(doc, &values, |t| levenshtein(t, &text) <= *distance as usize)
            }
            Matcher::Range(bounds) => {
                let bounds = RangeBounds {
                    lower: bounds.lower.as_ref().map(|s| s.to_lowercase()),
                    upper: bounds.upper.as_ref().map(|s| s.to_lowercase()),
                    ..bounds.clone()
                };
                self.score_tokens(doc, &values, |t| bounds.contains(t))
            }
        }
    }

    /// Score every distinct token accepted by `accept`
    fn score_tokens<F>(&self, doc: &IndexedDocument, values: &[&Vec<String>], accept: F) -> Option<f32>
    where
        F: Fn(&str) -> bool,
    {
        let mut freqs: HashMap<&str, usize> = HashMap::new();
        for token in values.iter().flat_map(|v| v.iter()) {
            if accept(token) {
                *freqs.entry(token.as_str()).or_insert(0) += 1;
            }
        }
        if freqs.is_empty() {
            return None;
        }
        Some(
            freqs
                .into_iter()
                .map(|(token, tf)| self.term_weight(self.idf(token), tf, doc))
                .sum(),
        )
    }

    /// Score an analyzed term or phrase
    fn score_sequence(
        &self,
        doc: &IndexedDocument,
        values: &[&Vec<String>],
        terms: &[String],
        slop: usize,
    ) -> Option<f32> {
        match terms {
            [] => None,
            [single] => self.score_tokens(doc, values, |t| t == single.as_str()),
            _ => {
                let tf: usize = values
                    .iter()
                    .map(|tokens| phrase_occurrences(tokens, terms, slop))
                    .sum();
                if tf == 0 {
                    return None;
                }
                let idf: f32 = terms.iter().map(|t| self.idf(t)).sum();
                Some(self.term_weight(idf, tf, doc))
            }
        }
    }
}

#[async_trait]
impl Searcher for MemorySearcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn document_count(&self) -> Option<u64> {
        Some(self.documents.len() as u64)
    }

    async fn search(&self, query: &SearchQuery) -> Result<RawResults> {
        let parsed = crate::query::parse(query.term())?;

        let mut matches: Vec<(usize, f32)> = self
            .documents
            .iter()
            .enumerate()
            .filter_map(|(i, doc)| self.score(doc, &parsed).map(|score| (i, score)))
            .collect();

        // Descending score, insertion order on ties
        matches.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let total = matches.len() as u64;
        let hits: Vec<RawHit> = matches
            .into_iter()
            .skip(query.skip() as usize)
            .take(query.take() as usize)
            .map(|(i, score)| {
                let source = &self.documents[i].source;
                RawHit {
                    id: source.id.clone(),
                    score,
                    fields: source.fields.clone(),
                }
            })
            .collect();

        debug!(
            "Searcher {} matched {} documents, returning {}",
            self.name,
            total,
            hits.len()
        );

        Ok(RawResults { total, hits })
    }
}

/// Count phrase occurrences allowing up to `slop` skipped positions in total
fn phrase_occurrences(tokens: &[String], terms: &[String], slop: usize) -> usize {
    let mut count = 0;
    for start in 0..tokens.len() {
        if tokens[start] != terms[0] {
            continue;
        }
        let mut pos = start;
        let mut budget = slop;
        let mut matched = true;
        for term in &terms[1..] {
            let window_end = (pos + 1 + budget).min(tokens.len().saturating_sub(1));
            match (pos + 1..=window_end).find(|&k| &tokens[k] == term) {
                Some(k) if k > pos => {
                    budget -= k - pos - 1;
                    pos = k;
                }
                _ => {
                    matched = false;
                    break;
                }
            }
        }
        if matched {
            count += 1;
        }
    }
    count
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Glob {
    /// `*`
    Any,
    /// `?`
    One,
    Literal(char),
}

/// Compile a wildcard pattern; `\` escapes the following char
fn compile_glob(pattern: &str) -> Vec<Glob> {
    let mut out = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        out.push(match c {
            '*' => Glob::Any,
            '?' => Glob::One,
            '\\' => Glob::Literal(chars.next().unwrap_or('\\')),
            other => Glob::Literal(other),
        });
    }
    out
}

/// Glob match where `*` is any run and `?` a single char
fn wildcard_match(pattern: &[Glob], text: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        let single = match pattern.get(p) {
            Some(Glob::One) => true,
            Some(Glob::Literal(c)) => *c == text[t],
            _ => false,
        };
        if single {
            p += 1;
            t += 1;
        } else if pattern.get(p) == Some(&Glob::Any) {
            star = Some((p, t));
            p += 1;
        } else if let Some((sp, st)) = star {
            p = sp + 1;
            t = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|g| *g == Glob::Any)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SearchError;

    fn corpus() -> MemorySearcher {
        MemorySearcher::new(
            "content",
            vec![
                MemoryDocument::new("1")
                    .with_value("title", "Hello World")
                    .with_value("body", "The first document says hello"),
                MemoryDocument::new("2")
                    .with_value("title", "Rust search")
                    .with_value("body", "Searching with tantivy and lucene syntax"),
                MemoryDocument::new("3")
                    .with_value("title", "World news")
                    .with_value("tags", "news")
                    .with_value("tags", "world"),
            ],
        )
    }

    async fn ids(searcher: &MemorySearcher, term: &str) -> Vec<String> {
        let query = SearchQuery::new(term, 0, 100).unwrap();
        searcher
            .search(&query)
            .await
            .unwrap()
            .hits
            .into_iter()
            .map(|h| h.id)
            .collect()
    }

    #[test]
    fn test_analyze() {
        assert_eq!(analyze("Hello, World!"), vec!["hello", "world"]);
        assert_eq!(analyze("e-mail"), vec!["e", "mail"]);
        assert!(analyze("...").is_empty());
    }

    #[test]
    fn test_wildcard_match() {
        let pattern = compile_glob("te?t*");
        assert!(wildcard_match(&pattern, "test"));
        assert!(wildcard_match(&pattern, "textbook"));
        assert!(!wildcard_match(&pattern, "toast"));
    }

    #[test]
    fn test_escaped_wildcards_are_literal() {
        let pattern = compile_glob(r"t\?s*t?");
        assert!(wildcard_match(&pattern, "t?sxtz"));
        assert!(!wildcard_match(&pattern, "tasxtz"));

        let pattern = compile_glob(r"a\*b*");
        assert!(wildcard_match(&pattern, "a*bcd"));
        assert!(!wildcard_match(&pattern, "axxbcd"));
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("roam", "foam"), 1);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
    }

    #[test]
    fn test_phrase_occurrences() {
        let tokens = analyze("the quick brown fox");
        assert_eq!(phrase_occurrences(&tokens, &analyze("quick brown"), 0), 1);
        assert_eq!(phrase_occurrences(&tokens, &analyze("quick fox"), 0), 0);
        assert_eq!(phrase_occurrences(&tokens, &analyze("quick fox"), 1), 1);
    }

    #[tokio::test]
    async fn test_single_term() {
        let searcher = corpus();
        assert_eq!(ids(&searcher, "hello").await, vec!["1"]);
        assert_eq!(ids(&searcher, "HELLO").await, vec!["1"]);
    }

    #[tokio::test]
    async fn test_fielded_and_boolean() {
        let searcher = corpus();
        let mut titled = ids(&searcher, "title:world").await;
        titled.sort();
        assert_eq!(titled, vec!["1", "3"]);
        assert_eq!(ids(&searcher, "world AND news").await, vec!["3"]);
        assert_eq!(ids(&searcher, "world -news").await, vec!["1"]);
        assert_eq!(ids(&searcher, "+rust").await, vec!["2"]);
        assert!(ids(&searcher, "-rust").await.is_empty());
    }

    #[tokio::test]
    async fn test_phrase_prefix_fuzzy_wildcard() {
        let searcher = corpus();
        assert_eq!(ids(&searcher, "\"hello world\"").await, vec!["1"]);
        assert!(ids(&searcher, "\"world hello\"").await.is_empty());
        assert_eq!(ids(&searcher, "tant*").await, vec!["2"]);
        assert_eq!(ids(&searcher, "lucine~1").await, vec!["2"]);
        assert_eq!(ids(&searcher, "s?arch").await, vec!["2"]);
    }

    #[tokio::test]
    async fn test_scores_positive_and_descending() {
        let searcher = corpus();
        let query = SearchQuery::new("world", 0, 10).unwrap();
        let results = searcher.search(&query).await.unwrap();
        assert_eq!(results.total, 2);
        assert!(results.hits.iter().all(|h| h.score > 0.0));
        assert!(results.hits[0].score >= results.hits[1].score);
    }

    #[tokio::test]
    async fn test_window_applied_after_ranking() {
        let searcher = corpus();
        let all = searcher
            .search(&SearchQuery::new("world OR rust", 0, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(all.total, 3);

        let page = searcher
            .search(&SearchQuery::new("world OR rust", 1, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.hits.len(), 1);
        assert_eq!(page.hits[0].id, all.hits[1].id);

        let none = searcher
            .search(&SearchQuery::new("world OR rust", 0, 0).unwrap())
            .await
            .unwrap();
        assert_eq!(none.total, 3);
        assert!(none.hits.is_empty());
    }

    #[tokio::test]
    async fn test_leading_wildcard_fails() {
        let searcher = corpus();
        let err = searcher
            .search(&SearchQuery::new("*orld", 0, 10).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::QueryParse(ref e) if e.term == "*orld"));
    }

    #[test]
    fn test_documents_deserialize_single_values() {
        let json = r#"[{"id": "42", "fields": {"title": "Hello World", "tags": ["a", "b"]}}]"#;
        let docs: Vec<MemoryDocument> = serde_json::from_str(json).unwrap();
        assert_eq!(docs[0].fields["title"], vec!["Hello World"]);
        assert_eq!(docs[0].fields["tags"], vec!["a", "b"]);
    }

    #[test]
    fn test_read_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.json");
        std::fs::write(&path, r#"[{"id": "9", "fields": {"title": "on file"}}]"#).unwrap();

        let docs = read_documents(&path).unwrap();
        assert_eq!(docs, vec![MemoryDocument::new("9").with_value("title", "on file")]);

        std::fs::write(&path, "{not json").unwrap();
        assert!(read_documents(&path).is_err());
        assert!(read_documents(dir.path().join("missing.json")).is_err());
    }
}
