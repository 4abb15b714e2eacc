//! Search query data model

use serde::Serialize;

/// A validated query against one searcher.
///
/// The term is trimmed and never blank; construct through [`SearchQuery::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    term: String,
    skip: u32,
    take: u32,
}

impl SearchQuery {
    /// Build a query, or `None` when the term is blank
    pub fn new(term: impl AsRef<str>, skip: u32, take: u32) -> Option<Self> {
        let term = term.as_ref().trim();
        if term.is_empty() {
            return None;
        }
        Some(Self {
            term: term.to_string(),
            skip,
            take,
        })
    }

    /// Native query text
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Number of matches to skip
    pub fn skip(&self) -> u32 {
        self.skip
    }

    /// Maximum number of hits to return
    pub fn take(&self) -> u32 {
        self.take
    }

    /// Copy of this query with `take` capped
    pub fn with_max_take(mut self, max_take: u32) -> Self {
        self.take = self.take.min(max_take);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_is_trimmed() {
        let query = SearchQuery::new("  hello world \t", 5, 10).unwrap();
        assert_eq!(query.term(), "hello world");
        assert_eq!(query.skip(), 5);
        assert_eq!(query.take(), 10);
    }

    #[test]
    fn test_blank_term_rejected() {
        assert!(SearchQuery::new("", 0, 10).is_none());
        assert!(SearchQuery::new("   \n\t", 0, 10).is_none());
    }

    #[test]
    fn test_max_take() {
        let query = SearchQuery::new("a", 0, 500).unwrap().with_max_take(100);
        assert_eq!(query.take(), 100);
        let query = SearchQuery::new("a", 0, 5).unwrap().with_max_take(100);
        assert_eq!(query.take(), 5);
    }
}
