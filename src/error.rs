use thiserror::Error;

use crate::ast::TokenKind;

/// Errors raised while tokenizing input or building the AST.
///
/// Every variant embeds the offending source text so callers (and
/// tests) can assert on the rendered message directly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShortcodeError {
    /// A scan was requested before any input was set.
    #[error("no input")]
    NoInput,

    /// A bracketed candidate matched the loose locator but failed the
    /// strict grammar for its classified type. Always fatal; there is
    /// no permissive lexing mode.
    #[error("invalid {kind} token: {body}")]
    InvalidToken { kind: TokenKind, body: String },

    /// A CLOSE token with no matching open tag (strict mode).
    #[error("unmatched close token: {0}")]
    UnmatchedClose(String),

    /// End of input with an open tag still unresolved (strict mode).
    #[error("unmatched open token: {0}")]
    UnmatchedOpen(String),
}
