use std::collections::HashMap;

use pest::Parser;
use pest_derive::Parser;

use crate::ast::{ParamValue, Token, TokenKind, cast_value};
use crate::error::ShortcodeError;
use crate::parser;

#[derive(Parser)]
#[grammar = "src/shortcode.pest"]
struct ShortcodeParser;

/// Streaming shortcode tokenizer.
///
/// Owns the input buffer and a byte cursor into it. `tokens()` hands
/// out a lazy stream that advances the cursor, so partial consumption
/// persists across calls; `reset()` rewinds to the start of the most
/// recently set input.
///
/// ```ignore
/// let mut t = Tokenizer::new();
/// let ast = t.input("[row][col]Hello[/col][/row]").ast()?;
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Fail on nesting violations instead of recording ERROR nodes.
    pub strict: bool,
    input: Option<String>,
    pos: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    /// A strict-mode tokenizer with no input set.
    pub fn new() -> Self {
        Self {
            strict: true,
            input: None,
            pos: 0,
        }
    }

    /// A tokenizer that records nesting violations as ERROR nodes in
    /// the AST instead of failing.
    pub fn permissive() -> Self {
        Self {
            strict: false,
            ..Self::new()
        }
    }

    /// A strict-mode tokenizer with its input already set.
    pub fn with_input(input: impl Into<String>) -> Self {
        let mut tokenizer = Self::new();
        tokenizer.input(input);
        tokenizer
    }

    /// Replace the working buffer and rewind the cursor.
    pub fn input(&mut self, input: impl Into<String>) -> &mut Self {
        self.input = Some(input.into());
        self.pos = 0;
        self
    }

    /// Rewind the cursor to the start of the current buffer, discarding
    /// any partial scan progress.
    pub fn reset(&mut self) -> &mut Self {
        self.pos = 0;
        self
    }

    /// The lazy token stream, picking up at the current cursor.
    ///
    /// Consuming the stream moves the tokenizer's cursor; once the
    /// buffer is exhausted the stream is empty until `reset()`.
    pub fn tokens(&mut self) -> Result<Tokens<'_>, ShortcodeError> {
        let Self { input, pos, .. } = self;
        let buf = input.as_deref().ok_or(ShortcodeError::NoInput)?;
        Ok(Tokens { buf, pos })
    }

    /// Eagerly collect the remaining token stream.
    pub fn get_tokens(&mut self) -> Result<Vec<Token>, ShortcodeError> {
        self.tokens()?.collect()
    }

    /// Run the full lexer + AST builder pipeline on the remaining
    /// buffer and return the forest of root nodes.
    pub fn ast(&mut self) -> Result<Vec<Token>, ShortcodeError> {
        let strict = self.strict;
        parser::build(self.tokens()?, strict)
    }
}

/// Lazy, forward-only token stream over a tokenizer's buffer.
///
/// Yields one token per step. The stream is fused after a lexing
/// error: the cursor parks at the end of the buffer.
pub struct Tokens<'t> {
    buf: &'t str,
    pos: &'t mut usize,
}

impl Iterator for Tokens<'_> {
    type Item = Result<Token, ShortcodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if *self.pos >= self.buf.len() {
            return None;
        }
        let start = *self.pos;
        let chunk = ShortcodeParser::parse(Rule::chunk, &self.buf[start..])
            .ok()
            .and_then(|mut pairs| pairs.next())
            .expect("a non-empty buffer always yields a chunk");
        let piece = chunk
            .into_inner()
            .next()
            .expect("a chunk wraps exactly one enclosure or text span");

        let len = piece.as_str().len();
        let result = match piece.as_rule() {
            Rule::enclosure => tag_token(piece.as_str(), start),
            _ => Ok(Token::text(piece.as_str(), start)),
        };

        match result {
            Ok(token) => {
                *self.pos = start + len;
                Some(Ok(token))
            }
            Err(err) => {
                *self.pos = self.buf.len();
                Some(Err(err))
            }
        }
    }
}

/// Classify a candidate by its delimiters alone: a leading slash makes
/// it CLOSE, a trailing slash before the bracket makes it SELF_CLOSING.
fn classify(body: &str) -> TokenKind {
    let bytes = body.as_bytes();
    if bytes[1] == b'/' {
        TokenKind::Close
    } else if bytes[bytes.len() - 2] == b'/' {
        TokenKind::SelfClosing
    } else {
        TokenKind::Open
    }
}

/// Validate a located candidate against the strict grammar for its
/// classified type and build the tag token.
fn tag_token(body: &str, pos: usize) -> Result<Token, ShortcodeError> {
    let kind = classify(body);
    let rule = match kind {
        TokenKind::Close => Rule::close_tag,
        TokenKind::SelfClosing => Rule::self_closing_tag,
        _ => Rule::open_tag,
    };
    let tag = ShortcodeParser::parse(rule, body)
        .map_err(|_| ShortcodeError::InvalidToken {
            kind,
            body: body.to_string(),
        })?
        .next()
        .expect("a successful tag parse yields the tag pair");

    let mut name = None;
    let mut params = HashMap::new();
    for part in tag.into_inner() {
        match part.as_rule() {
            Rule::name => name = Some(part.as_str().to_string()),
            Rule::params => {
                for param in part.into_inner() {
                    let mut inner = param.into_inner();
                    let key = inner.next().expect("a param always carries a name");
                    // A bare flag coerces to boolean true.
                    let value = inner
                        .next()
                        .map(|v| cast_value(v.as_str()))
                        .unwrap_or(ParamValue::Bool(true));
                    params.insert(key.as_str().to_string(), value);
                }
            }
            _ => {}
        }
    }

    Ok(Token {
        kind,
        body: body.to_string(),
        pos,
        name,
        params,
        children: Vec::new(),
        is_closed: kind == TokenKind::SelfClosing,
    })
}
