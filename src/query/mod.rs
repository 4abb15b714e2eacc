//! Native query grammar
//!
//! Searchers interpret the query term using the Lucene classic syntax:
//! - Terms and phrases: `hello`, `"hello world"`, `"hello world"~2`
//! - Field scoping: `title:hello`, `title:(hello OR world)`
//! - Boolean operators: `AND`, `OR`, `NOT`, `&&`, `||`, `!`, `+term`, `-term`
//! - Wildcards: `te?t`, `test*` (never as the first character)
//! - Fuzzy terms: `roam~`, `roam~1`
//! - Boosts: `term^2`
//! - Ranges: `[a TO z]`, `{a TO *}`
//!
//! The default operator is OR, so a bare word or a list of words is always
//! a valid query.

mod lexer;
mod parser;

use serde::Serialize;
use thiserror::Error;

/// How a clause participates in a boolean query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Occur {
    Must,
    Should,
    MustNot,
}

/// One clause of a boolean query
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub occur: Occur,
    pub query: Query,
}

/// Bounds of a range query; `None` is an open bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeBounds {
    pub lower: Option<String>,
    pub upper: Option<String>,
    pub include_lower: bool,
    pub include_upper: bool,
}

impl RangeBounds {
    /// Check whether a value falls inside the bounds (lexicographic)
    pub fn contains(&self, value: &str) -> bool {
        let above = match &self.lower {
            None => true,
            Some(lower) if self.include_lower => value >= lower.as_str(),
            Some(lower) => value > lower.as_str(),
        };
        let below = match &self.upper {
            None => true,
            Some(upper) if self.include_upper => value <= upper.as_str(),
            Some(upper) => value < upper.as_str(),
        };
        above && below
    }
}

/// What a leaf query matches against a field's text
#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    /// Raw (unanalyzed) term text
    Term(String),
    /// Raw phrase text and allowed slop
    Phrase { text: String, slop: u32 },
    /// `prefix*`
    Prefix(String),
    /// Pattern containing `*` and `?`; `\` marks the next char as literal
    Wildcard(String),
    /// `term~distance`
    Fuzzy { text: String, distance: u8 },
    Range(RangeBounds),
}

/// Leaf query, optionally scoped to a field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldQuery {
    /// `None` searches every field
    pub field: Option<String>,
    pub matcher: Matcher,
}

/// Parsed native query
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Field(FieldQuery),
    Boolean(Vec<Clause>),
    Boost { query: Box<Query>, boost: f32 },
}

/// A term that does not follow the native query grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse '{term}': {message}")]
pub struct QueryParseError {
    /// The offending query term
    pub term: String,
    /// What the parser rejected
    pub message: String,
    /// Char offset of the problem, when known
    pub position: Option<usize>,
}

impl QueryParseError {
    pub fn new(term: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            message: message.into(),
            position: None,
        }
    }
}

/// Lexer/parser failure before the term is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    pub message: String,
    pub position: usize,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Parse a query term using the native grammar
pub fn parse(term: &str) -> Result<Query, QueryParseError> {
    let attach = |e: SyntaxError| QueryParseError {
        term: term.to_string(),
        message: e.message,
        position: Some(e.position),
    };

    let tokens = lexer::tokenize(term).map_err(attach)?;
    parser::Parser::new(tokens, term.chars().count())
        .parse()
        .map_err(attach)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(field: Option<&str>, matcher: Matcher) -> Query {
        Query::Field(FieldQuery {
            field: field.map(str::to_string),
            matcher,
        })
    }

    fn term(text: &str) -> Query {
        leaf(None, Matcher::Term(text.to_string()))
    }

    fn clause(occur: Occur, query: Query) -> Clause {
        Clause { occur, query }
    }

    #[test]
    fn test_single_word() {
        assert_eq!(parse("hello").unwrap(), term("hello"));
    }

    #[test]
    fn test_single_phrase() {
        assert_eq!(
            parse("\"hello world\"").unwrap(),
            leaf(
                None,
                Matcher::Phrase {
                    text: "hello world".to_string(),
                    slop: 0
                }
            )
        );
    }

    #[test]
    fn test_default_operator_is_or() {
        assert_eq!(
            parse("hello world").unwrap(),
            Query::Boolean(vec![
                clause(Occur::Should, term("hello")),
                clause(Occur::Should, term("world")),
            ])
        );
    }

    #[test]
    fn test_and_makes_both_sides_required() {
        assert_eq!(
            parse("a OR b AND c").unwrap(),
            Query::Boolean(vec![
                clause(Occur::Should, term("a")),
                clause(Occur::Must, term("b")),
                clause(Occur::Must, term("c")),
            ])
        );
    }

    #[test]
    fn test_modifiers() {
        assert_eq!(
            parse("+a -b NOT c").unwrap(),
            Query::Boolean(vec![
                clause(Occur::Must, term("a")),
                clause(Occur::MustNot, term("b")),
                clause(Occur::MustNot, term("c")),
            ])
        );
    }

    #[test]
    fn test_lone_prohibited_clause_stays_boolean() {
        assert_eq!(
            parse("-a").unwrap(),
            Query::Boolean(vec![clause(Occur::MustNot, term("a"))])
        );
    }

    #[test]
    fn test_field_group_applies_to_inner_terms() {
        assert_eq!(
            parse("title:(a b)").unwrap(),
            Query::Boolean(vec![
                clause(Occur::Should, leaf(Some("title"), Matcher::Term("a".to_string()))),
                clause(Occur::Should, leaf(Some("title"), Matcher::Term("b".to_string()))),
            ])
        );
    }

    #[test]
    fn test_prefix_wildcard_fuzzy_boost() {
        assert_eq!(
            parse("hel*").unwrap(),
            leaf(None, Matcher::Prefix("hel".to_string()))
        );
        assert_eq!(
            parse("h?l*o").unwrap(),
            leaf(None, Matcher::Wildcard("h?l*o".to_string()))
        );
        assert_eq!(
            parse(r"t\?s*t?").unwrap(),
            leaf(None, Matcher::Wildcard(r"t\?s*t?".to_string()))
        );
        assert_eq!(
            parse("roam~1").unwrap(),
            leaf(
                None,
                Matcher::Fuzzy {
                    text: "roam".to_string(),
                    distance: 1
                }
            )
        );
        assert_eq!(
            parse("a^3").unwrap(),
            Query::Boost {
                query: Box::new(term("a")),
                boost: 3.0
            }
        );
    }

    #[test]
    fn test_range() {
        let query = parse("date:[2020 TO 2021}").unwrap();
        let Query::Field(FieldQuery {
            field,
            matcher: Matcher::Range(bounds),
        }) = query
        else {
            panic!("expected a range query");
        };
        assert_eq!(field.as_deref(), Some("date"));
        assert!(bounds.contains("2020"));
        assert!(bounds.contains("2020-06"));
        assert!(!bounds.contains("2021"));
    }

    #[test]
    fn test_leading_wildcard_is_parse_error() {
        for term in ["*broken", "?roken", "*", "*:*", "a OR *b", "title:*x"] {
            let err = parse(term).unwrap_err();
            assert_eq!(err.term, term);
            assert!(err.message.contains("first character"), "{}", err.message);
        }
    }

    #[test]
    fn test_syntax_errors() {
        for term in [
            "(a",
            "a)",
            "()",
            "\"open",
            "a AND",
            "AND a",
            "OR",
            "+",
            "a -",
            "title:",
            "title: AND a",
            "a^x",
            "[a TO]",
            "(a)~2",
            "te*t~",
        ] {
            assert!(parse(term).is_err(), "expected '{}' to fail", term);
        }
    }

    #[test]
    fn test_error_carries_position() {
        let err = parse("hello (world").unwrap_err();
        assert_eq!(err.position, Some(6));
        assert_eq!(err.to_string(), "cannot parse 'hello (world': missing ')'");
    }
}
