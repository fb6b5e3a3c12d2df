//! Constant-expression evaluator for declaration initializers.
//!
//! Only the literal forms that can be written as a C# constant are accepted:
//! `null`, `undefined`, booleans, numbers (decimal, exponent, hex), quoted
//! strings, backtick strings without interpolation, and array literals of
//! those. A trailing `as const` is tolerated. Everything else is rejected
//! with a [`LiteralError`] so callers never emit a guessed value.

use serde::Serialize;
use std::fmt;

/// A constant value recovered from an initializer expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConstValue {
    /// `null` or `undefined`.
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Any numeric literal, hex included.
    Number(f64),
    /// Quoted or backtick string, escapes resolved.
    String(String),
    /// Array literal.
    Array(Vec<ConstValue>),
}

impl ConstValue {
    /// Whether this is [`ConstValue::Null`].
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Why an initializer could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    /// Nothing but whitespace.
    #[error("empty initializer")]
    Empty,
    /// A character no literal form starts with.
    #[error("unexpected character '{found}' at offset {offset}")]
    Unexpected {
        /// Offending character.
        found: char,
        /// Byte offset into the trimmed source.
        offset: usize,
    },
    /// Missing closing quote.
    #[error("unterminated string literal starting at offset {offset}")]
    UnterminatedString {
        /// Byte offset of the opening quote.
        offset: usize,
    },
    /// Backtick string containing `${...}`.
    #[error("template literal with interpolation is not a constant")]
    Interpolation,
    /// Unknown `\x` escape.
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
    /// Digits that do not parse as a number.
    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),
    /// Missing `]`.
    #[error("unterminated array literal")]
    UnterminatedArray,
    /// A non-literal expression such as a call or identifier.
    #[error("unsupported expression '{0}'")]
    Unsupported(String),
    /// Input left over after a complete literal.
    #[error("trailing input '{0}'")]
    TrailingInput(String),
}

/// Evaluate an initializer expression to a constant value.
pub fn evaluate(source: &str) -> Result<ConstValue, LiteralError> {
    let trimmed = strip_as_const(source.trim());
    if trimmed.is_empty() {
        return Err(LiteralError::Empty);
    }

    let mut parser = Parser::new(trimmed);
    let value = parser.value()?;
    parser.skip_whitespace();
    if parser.pos < parser.chars.len() {
        let rest: String = parser.chars[parser.pos..].iter().collect();
        return Err(LiteralError::TrailingInput(rest));
    }
    Ok(value)
}

fn strip_as_const(source: &str) -> &str {
    source
        .strip_suffix("as const")
        .map_or(source, |rest| rest.trim_end())
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn value(&mut self) -> Result<ConstValue, LiteralError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(LiteralError::Empty),
            Some('\'' | '"') => self.quoted().map(ConstValue::String),
            Some('`') => self.template().map(ConstValue::String),
            Some('[') => self.array(),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => self.keyword(),
            Some(found) => Err(LiteralError::Unexpected {
                found,
                offset: self.pos,
            }),
        }
    }

    fn keyword(&mut self) -> Result<ConstValue, LiteralError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.')
        {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "null" | "undefined" => Ok(ConstValue::Null),
            "true" => Ok(ConstValue::Bool(true)),
            "false" => Ok(ConstValue::Bool(false)),
            "NaN" => Ok(ConstValue::Number(f64::NAN)),
            "Infinity" => Ok(ConstValue::Number(f64::INFINITY)),
            _ => Err(LiteralError::Unsupported(word)),
        }
    }

    fn number(&mut self) -> Result<ConstValue, LiteralError> {
        let start = self.pos;
        let negative = match self.peek() {
            Some('-') => {
                self.pos += 1;
                true
            }
            Some('+') => {
                self.pos += 1;
                false
            }
            _ => false,
        };

        if self.peek() == Some('0')
            && matches!(self.chars.get(self.pos + 1), Some('x' | 'X'))
        {
            self.pos += 2;
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit() || c == '_') {
                self.pos += 1;
            }
            let digits: String = self.chars[digits_start..self.pos]
                .iter()
                .filter(|c| **c != '_')
                .collect();
            let parsed = i64::from_str_radix(&digits, 16).map_err(|_| {
                LiteralError::InvalidNumber(self.chars[start..self.pos].iter().collect())
            })?;
            let value = parsed as f64;
            return Ok(ConstValue::Number(if negative { -value } else { value }));
        }

        if self.peek() == Some('I') {
            let rest = self.keyword()?;
            return match rest {
                ConstValue::Number(n) if n.is_infinite() => {
                    Ok(ConstValue::Number(if negative { -n } else { n }))
                }
                _ => Err(LiteralError::InvalidNumber(
                    self.chars[start..self.pos].iter().collect(),
                )),
            };
        }

        while self.peek().is_some_and(|c| {
            c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '_')
        }) {
            let c = self.chars[self.pos];
            self.pos += 1;
            if matches!(c, 'e' | 'E') && matches!(self.peek(), Some('+' | '-')) {
                self.pos += 1;
            }
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        let cleaned: String = text.chars().filter(|c| *c != '_').collect();
        cleaned
            .parse::<f64>()
            .map(ConstValue::Number)
            .map_err(|_| LiteralError::InvalidNumber(text))
    }

    fn quoted(&mut self) -> Result<String, LiteralError> {
        let start = self.pos;
        let Some(quote) = self.bump() else {
            return Err(LiteralError::Empty);
        };
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(LiteralError::UnterminatedString { offset: start }),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.escape(start)?),
                Some('\n') => return Err(LiteralError::UnterminatedString { offset: start }),
                Some(c) => out.push(c),
            }
        }
    }

    fn template(&mut self) -> Result<String, LiteralError> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(LiteralError::UnterminatedString { offset: start }),
                Some('`') => return Ok(out),
                Some('$') if self.peek() == Some('{') => return Err(LiteralError::Interpolation),
                Some('\\') => out.push(self.escape(start)?),
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, start: usize) -> Result<char, LiteralError> {
        let Some(c) = self.bump() else {
            return Err(LiteralError::UnterminatedString { offset: start });
        };
        Ok(match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            'u' => return self.unicode_escape(),
            'x' => return self.hex_escape(2),
            '\\' | '\'' | '"' | '`' | '$' | '/' => c,
            other => return Err(LiteralError::InvalidEscape(other)),
        })
    }

    fn unicode_escape(&mut self) -> Result<char, LiteralError> {
        if self.peek() == Some('{') {
            self.pos += 1;
            let start = self.pos;
            while self.peek().is_some_and(|c| c != '}') {
                self.pos += 1;
            }
            let digits: String = self.chars[start..self.pos].iter().collect();
            if self.bump() != Some('}') {
                return Err(LiteralError::InvalidEscape('u'));
            }
            return u32::from_str_radix(&digits, 16)
                .ok()
                .and_then(char::from_u32)
                .ok_or(LiteralError::InvalidEscape('u'));
        }
        self.hex_escape(4)
    }

    fn hex_escape(&mut self, width: usize) -> Result<char, LiteralError> {
        let end = self.pos + width;
        if end > self.chars.len() {
            return Err(LiteralError::InvalidEscape('x'));
        }
        let digits: String = self.chars[self.pos..end].iter().collect();
        self.pos = end;
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or(LiteralError::InvalidEscape(if width == 2 { 'x' } else { 'u' }))
    }

    fn array(&mut self) -> Result<ConstValue, LiteralError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(LiteralError::UnterminatedArray),
                Some(']') => {
                    self.pos += 1;
                    return Ok(ConstValue::Array(items));
                }
                _ => {}
            }
            items.push(self.value()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => {}
                Some(']') => return Ok(ConstValue::Array(items)),
                None => return Err(LiteralError::UnterminatedArray),
                Some(found) => {
                    return Err(LiteralError::Unexpected {
                        found,
                        offset: self.pos - 1,
                    });
                }
            }
        }
    }
}
