//! Tokenizer and AST builder for bracket-delimited shortcode markup.
//!
//! Input like `[row][col width=6]Hello[/col][/row]` is scanned into a
//! lazy stream of typed tokens and folded into a forest of nested tag
//! nodes with coerced parameter values and text leaves. Tags are never
//! interpreted; this crate only produces the structure.

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::{ParamValue, Token, TokenKind};
pub use error::ShortcodeError;
pub use lexer::{Tokenizer, Tokens};
