//! Recursive-descent parser for the Lucene classic query syntax

use super::lexer::{Token, TokenKind};
use super::{Clause, FieldQuery, Matcher, Occur, Query, RangeBounds, SyntaxError};

/// Default edit distance for `term~`
const DEFAULT_FUZZY_DISTANCE: u8 = 2;
/// Largest edit distance accepted for `term~N`
const MAX_FUZZY_DISTANCE: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conjunction {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    Required,
    Prohibited,
}

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    input_len: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, input_len: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            input_len,
        }
    }

    /// Parse the whole token stream into a single query
    pub fn parse(mut self) -> Result<Query, SyntaxError> {
        let clauses = self.clauses(None)?;

        if let Some(token) = self.peek() {
            return Err(SyntaxError::new(
                format!("unexpected {}", token.kind.describe()),
                token.position,
            ));
        }
        if clauses.is_empty() {
            return Err(SyntaxError::new("query has no clauses", 0));
        }

        Ok(simplify(clauses))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Position used when the input ends unexpectedly
    fn end_position(&self) -> usize {
        self.input_len
    }

    /// Parse clauses until end of input or a closing parenthesis
    fn clauses(&mut self, field: Option<&str>) -> Result<Vec<Clause>, SyntaxError> {
        let mut clauses: Vec<Clause> = Vec::new();

        loop {
            let mut conjunction = None;
            if let Some(token) = self.peek() {
                let conj = match token.kind {
                    TokenKind::And => Some(Conjunction::And),
                    TokenKind::Or => Some(Conjunction::Or),
                    _ => None,
                };
                if let Some(conj) = conj {
                    if clauses.is_empty() {
                        return Err(SyntaxError::new(
                            format!("unexpected {} at the start of a clause list", token.kind.describe()),
                            token.position,
                        ));
                    }
                    conjunction = Some(conj);
                    self.pos += 1;
                }
            }

            match self.peek_kind() {
                None | Some(TokenKind::RParen) => {
                    if conjunction.is_some() {
                        let position = self.peek().map(|t| t.position).unwrap_or(self.end_position());
                        return Err(SyntaxError::new("expected a clause after operator", position));
                    }
                    return Ok(clauses);
                }
                _ => {}
            }

            let modifier = self.modifier()?;
            let query = self.clause(field)?;
            add_clause(&mut clauses, conjunction, modifier, query);
        }
    }

    fn modifier(&mut self) -> Result<Option<Modifier>, SyntaxError> {
        let modifier = match self.peek_kind() {
            Some(TokenKind::Plus) => Modifier::Required,
            Some(TokenKind::Minus) | Some(TokenKind::Not) => Modifier::Prohibited,
            _ => return Ok(None),
        };
        let Some(token) = self.next() else {
            return Ok(None);
        };

        match self.peek_kind() {
            None
            | Some(TokenKind::RParen)
            | Some(TokenKind::And)
            | Some(TokenKind::Or)
            | Some(TokenKind::Plus)
            | Some(TokenKind::Minus)
            | Some(TokenKind::Not) => Err(SyntaxError::new(
                format!("expected a clause after {}", token.kind.describe()),
                token.position,
            )),
            _ => Ok(Some(modifier)),
        }
    }

    fn clause(&mut self, default_field: Option<&str>) -> Result<Query, SyntaxError> {
        let mut field: Option<String> = default_field.map(str::to_string);

        // `name:` scopes the following value to a field
        let is_field_prefix = matches!(self.peek_kind(), Some(TokenKind::Word { .. }))
            && matches!(
                self.tokens.get(self.pos + 1).map(|t| &t.kind),
                Some(TokenKind::Colon)
            );
        if is_field_prefix {
            if let Some(Token {
                kind: TokenKind::Word { text, wildcards },
                position,
            }) = self.next()
            {
                if !wildcards.is_empty() {
                    return Err(SyntaxError::new("field names cannot contain wildcards", position));
                }
                field = Some(text);
            }
            let colon = self.next();
            if matches!(
                self.peek_kind(),
                None | Some(TokenKind::RParen) | Some(TokenKind::And) | Some(TokenKind::Or)
            ) {
                let position = colon.map(|t| t.position).unwrap_or(self.end_position());
                return Err(SyntaxError::new("expected a value after field name", position));
            }
        }

        let Some(token) = self.next() else {
            return Err(SyntaxError::new("expected a clause", self.end_position()));
        };

        let query = match token.kind {
            TokenKind::LParen => {
                let inner = self.clauses(field.as_deref())?;
                match self.next() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => {}
                    _ => return Err(SyntaxError::new("missing ')'", token.position)),
                }
                if inner.is_empty() {
                    return Err(SyntaxError::new("empty group", token.position));
                }
                if let Some(TokenKind::Tilde(_)) = self.peek_kind() {
                    let position = self.peek().map(|t| t.position).unwrap_or(0);
                    return Err(SyntaxError::new("'~' cannot follow a group", position));
                }
                simplify(inner)
            }
            TokenKind::Word { text, wildcards } => {
                let matcher = match self.take_tilde() {
                    Some(tilde) => {
                        if !wildcards.is_empty() {
                            return Err(SyntaxError::new(
                                "fuzzy search cannot be combined with wildcards",
                                token.position,
                            ));
                        }
                        Matcher::Fuzzy {
                            text,
                            distance: fuzzy_distance(tilde),
                        }
                    }
                    None => word_matcher(text, &wildcards),
                };
                Query::Field(FieldQuery { field, matcher })
            }
            TokenKind::Phrase(text) => {
                let slop = self
                    .take_tilde()
                    .map(|t| t.unwrap_or(0.0).round() as u32)
                    .unwrap_or(0);
                Query::Field(FieldQuery {
                    field,
                    matcher: Matcher::Phrase { text, slop },
                })
            }
            TokenKind::Range {
                lower,
                upper,
                include_lower,
                include_upper,
            } => Query::Field(FieldQuery {
                field,
                matcher: Matcher::Range(RangeBounds {
                    lower,
                    upper,
                    include_lower,
                    include_upper,
                }),
            }),
            other => {
                return Err(SyntaxError::new(
                    format!("unexpected {}", other.describe()),
                    token.position,
                ))
            }
        };

        if let Some(TokenKind::Boost(boost)) = self.peek_kind() {
            let boost = *boost;
            self.pos += 1;
            return Ok(Query::Boost {
                query: Box::new(query),
                boost,
            });
        }

        Ok(query)
    }

    /// Consume a `~` suffix if present
    fn take_tilde(&mut self) -> Option<Option<f32>> {
        if let Some(TokenKind::Tilde(value)) = self.peek_kind() {
            let value = *value;
            self.pos += 1;
            return Some(value);
        }
        None
    }
}

fn word_matcher(text: String, wildcards: &[usize]) -> Matcher {
    if wildcards.is_empty() {
        return Matcher::Term(text);
    }
    let len = text.chars().count();
    if wildcards.len() == 1 && wildcards[0] == len - 1 && text.ends_with('*') {
        let prefix: String = text.chars().take(len - 1).collect();
        return Matcher::Prefix(prefix);
    }
    // Literal `*`, `?` and `\` are re-escaped so only real wildcards stay special
    let mut pattern = String::with_capacity(text.len() + 2);
    for (i, c) in text.chars().enumerate() {
        if matches!(c, '*' | '?' | '\\') && !wildcards.contains(&i) {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    Matcher::Wildcard(pattern)
}

fn fuzzy_distance(value: Option<f32>) -> u8 {
    match value {
        None => DEFAULT_FUZZY_DISTANCE,
        Some(v) => (v.round() as u8).min(MAX_FUZZY_DISTANCE),
    }
}

/// Lucene classic clause combination with OR as the default operator
fn add_clause(
    clauses: &mut Vec<Clause>,
    conjunction: Option<Conjunction>,
    modifier: Option<Modifier>,
    query: Query,
) {
    if conjunction == Some(Conjunction::And) {
        if let Some(previous) = clauses.last_mut() {
            if previous.occur == Occur::Should {
                previous.occur = Occur::Must;
            }
        }
    }

    let occur = match modifier {
        Some(Modifier::Prohibited) => Occur::MustNot,
        Some(Modifier::Required) => Occur::Must,
        None if conjunction == Some(Conjunction::And) => Occur::Must,
        None => Occur::Should,
    };

    clauses.push(Clause { occur, query });
}

/// Collapse a single non-prohibited clause into its query
fn simplify(mut clauses: Vec<Clause>) -> Query {
    if clauses.len() == 1 && clauses[0].occur != Occur::MustNot {
        if let Some(clause) = clauses.pop() {
            return clause.query;
        }
    }
    Query::Boolean(clauses)
}
