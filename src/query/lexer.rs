//! Tokenizer for the Lucene classic query syntax

use super::SyntaxError;

/// Characters that end a bare word.
const WORD_TERMINATORS: &[char] = &['(', ')', ':', '^', '~', '"', '[', ']', '{', '}'];

/// Lexical token kinds
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    /// A bare word; `wildcards` lists char offsets of unescaped `*`/`?` in `text`
    Word { text: String, wildcards: Vec<usize> },
    /// Contents of a double-quoted phrase
    Phrase(String),
    /// `[a TO b]` or `{a TO b}`
    Range {
        lower: Option<String>,
        upper: Option<String>,
        include_lower: bool,
        include_upper: bool,
    },
    Colon,
    LParen,
    RParen,
    Plus,
    Minus,
    Not,
    And,
    Or,
    Boost(f32),
    Tilde(Option<f32>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Char offset of the token in the input
    pub position: usize,
}

impl TokenKind {
    /// Human readable form used in error messages
    pub fn describe(&self) -> String {
        match self {
            Self::Word { text, .. } => format!("'{}'", text),
            Self::Phrase(text) => format!("\"{}\"", text),
            Self::Range { .. } => "range".to_string(),
            Self::Colon => "':'".to_string(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::Plus => "'+'".to_string(),
            Self::Minus => "'-'".to_string(),
            Self::Not => "NOT".to_string(),
            Self::And => "AND".to_string(),
            Self::Or => "OR".to_string(),
            Self::Boost(_) => "'^'".to_string(),
            Self::Tilde(_) => "'~'".to_string(),
        }
    }
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, SyntaxError> {
    Lexer::new(input).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, SyntaxError> {
        // Prefix operators only count at the start of a clause.
        let mut clause_start = true;

        while let Some(c) = self.peek() {
            let start = self.pos;

            if c.is_whitespace() {
                self.pos += 1;
                clause_start = true;
                continue;
            }

            let kind = match c {
                '(' => {
                    self.pos += 1;
                    clause_start = true;
                    self.push(TokenKind::LParen, start);
                    continue;
                }
                ')' => {
                    self.pos += 1;
                    TokenKind::RParen
                }
                ':' => {
                    self.pos += 1;
                    clause_start = true;
                    self.push(TokenKind::Colon, start);
                    continue;
                }
                '"' => self.phrase()?,
                '[' | '{' => self.range()?,
                ']' | '}' => {
                    return Err(SyntaxError::new(
                        format!("unexpected '{}' without an opening bracket", c),
                        start,
                    ))
                }
                '^' => self.boost()?,
                '~' => self.tilde()?,
                '+' if clause_start => {
                    self.pos += 1;
                    self.push(TokenKind::Plus, start);
                    continue;
                }
                '-' if clause_start => {
                    self.pos += 1;
                    self.push(TokenKind::Minus, start);
                    continue;
                }
                '!' if clause_start => {
                    self.pos += 1;
                    self.push(TokenKind::Not, start);
                    continue;
                }
                '&' if clause_start && self.peek_at(1) == Some('&') => {
                    self.pos += 2;
                    self.push(TokenKind::And, start);
                    continue;
                }
                '|' if clause_start && self.peek_at(1) == Some('|') => {
                    self.pos += 2;
                    self.push(TokenKind::Or, start);
                    continue;
                }
                _ => self.word()?,
            };

            clause_start = false;
            self.push(kind, start);
        }

        Ok(self.tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn push(&mut self, kind: TokenKind, position: usize) {
        self.tokens.push(Token { kind, position });
    }

    fn word(&mut self) -> Result<TokenKind, SyntaxError> {
        let start = self.pos;
        let mut text = String::new();
        let mut wildcards = Vec::new();

        while let Some(c) = self.peek() {
            if c.is_whitespace() || WORD_TERMINATORS.contains(&c) {
                break;
            }
            if c == '\\' {
                let escaped = self
                    .peek_at(1)
                    .ok_or_else(|| SyntaxError::new("query ends with an escape character", self.pos))?;
                text.push(escaped);
                self.pos += 2;
                continue;
            }
            if c == '*' || c == '?' {
                if text.is_empty() {
                    return Err(SyntaxError::new(
                        "'*' or '?' not allowed as first character in WildcardQuery",
                        start,
                    ));
                }
                wildcards.push(text.chars().count());
            }
            text.push(c);
            self.pos += 1;
        }

        if wildcards.is_empty() {
            match text.as_str() {
                "AND" => return Ok(TokenKind::And),
                "OR" => return Ok(TokenKind::Or),
                "NOT" => return Ok(TokenKind::Not),
                _ => {}
            }
        }

        Ok(TokenKind::Word { text, wildcards })
    }

    fn phrase(&mut self) -> Result<TokenKind, SyntaxError> {
        let start = self.pos;
        self.pos += 1;
        let mut text = String::new();

        loop {
            match self.peek() {
                None => return Err(SyntaxError::new("unterminated phrase", start)),
                Some('"') => {
                    self.pos += 1;
                    return Ok(TokenKind::Phrase(text));
                }
                Some('\\') => {
                    let escaped = self.peek_at(1).ok_or_else(|| {
                        SyntaxError::new("query ends with an escape character", self.pos)
                    })?;
                    text.push(escaped);
                    self.pos += 2;
                }
                Some(c) => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn range(&mut self) -> Result<TokenKind, SyntaxError> {
        let start = self.pos;
        let include_lower = self.peek() == Some('[');
        self.pos += 1;
        let mut body = String::new();

        let include_upper = loop {
            match self.peek() {
                None => return Err(SyntaxError::new("unterminated range", start)),
                Some(']') => break true,
                Some('}') => break false,
                Some('\\') => {
                    let escaped = self.peek_at(1).ok_or_else(|| {
                        SyntaxError::new("query ends with an escape character", self.pos)
                    })?;
                    body.push(escaped);
                    self.pos += 2;
                }
                Some(c) => {
                    body.push(c);
                    self.pos += 1;
                }
            }
        };
        self.pos += 1;

        let parts: Vec<&str> = body.split_whitespace().collect();
        if parts.len() != 3 || parts[1] != "TO" {
            return Err(SyntaxError::new(
                "malformed range, expected '[lower TO upper]'",
                start,
            ));
        }

        Ok(TokenKind::Range {
            lower: range_bound(parts[0]),
            upper: range_bound(parts[2]),
            include_lower,
            include_upper,
        })
    }

    fn boost(&mut self) -> Result<TokenKind, SyntaxError> {
        let start = self.pos;
        self.pos += 1;
        let number = self.number();
        number
            .parse::<f32>()
            .ok()
            .filter(|b| b.is_finite() && *b >= 0.0)
            .map(TokenKind::Boost)
            .ok_or_else(|| SyntaxError::new("'^' must be followed by a non-negative number", start))
    }

    fn tilde(&mut self) -> Result<TokenKind, SyntaxError> {
        let start = self.pos;
        self.pos += 1;
        let number = self.number();
        if number.is_empty() {
            return Ok(TokenKind::Tilde(None));
        }
        number
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| TokenKind::Tilde(Some(v)))
            .ok_or_else(|| SyntaxError::new("'~' must be followed by a non-negative number", start))
    }

    fn number(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        out
    }
}

fn range_bound(raw: &str) -> Option<String> {
    if raw == "*" {
        return None;
    }
    let unquoted = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    Some(unquoted.to_string())
}
