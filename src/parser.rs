//! Stack-based AST builder over the token stream.
//!
//! The builder keeps an explicit stack of ancestor contexts plus the
//! innermost open tag ("active parent"). All nesting policy sits at the
//! two mismatch points: a CLOSE that matches nothing and an OPEN left
//! unresolved at end of input.

use crate::ast::{Token, TokenKind};
use crate::error::ShortcodeError;

/// Fold a token stream into a forest of root nodes.
///
/// TEXT and SELF_CLOSING tokens attach to the innermost open tag (or
/// become roots), OPEN tokens push a nesting level and CLOSE tokens pop
/// one after flipping `is_closed`. CLOSE tokens are consumed and never
/// appear in the output tree.
///
/// In strict mode a nesting violation fails the build; in permissive
/// mode it is recorded as an ERROR node and building continues.
pub(crate) fn build<I>(tokens: I, strict: bool) -> Result<Vec<Token>, ShortcodeError>
where
    I: IntoIterator<Item = Result<Token, ShortcodeError>>,
{
    let mut roots = Vec::new();
    let mut stack: Vec<Token> = Vec::new();
    let mut parent: Option<Token> = None;
    let mut last_seen: Option<(String, usize)> = None;

    for token in tokens {
        let token = token?;
        last_seen = Some((token.body.clone(), token.pos));

        match token.kind {
            TokenKind::Open => {
                if let Some(prev) = parent.take() {
                    stack.push(prev);
                }
                parent = Some(token);
            }
            TokenKind::Close => match parent.take() {
                Some(mut open) if token.can_close(&open) => {
                    open.is_closed = true;
                    match stack.pop() {
                        Some(mut prev) => {
                            prev.children.push(open);
                            parent = Some(prev);
                        }
                        None => roots.push(open),
                    }
                }
                unmatched => {
                    parent = unmatched;
                    if strict {
                        return Err(ShortcodeError::UnmatchedClose(token.body));
                    }
                    attach(Token::error(token.body, token.pos), &mut parent, &mut roots);
                }
            },
            TokenKind::Text | TokenKind::SelfClosing | TokenKind::Error => {
                attach(token, &mut parent, &mut roots);
            }
        }
    }

    if let Some(mut node) = parent {
        if strict {
            return Err(ShortcodeError::UnmatchedOpen(node.body));
        }
        // Reattach the unfinished chain so partial state survives, then
        // record the truncation. The ERROR body comes from the last
        // token seen, not from the unmatched OPEN itself.
        while let Some(mut prev) = stack.pop() {
            prev.children.push(node);
            node = prev;
        }
        roots.push(node);
        if let Some((body, pos)) = last_seen {
            roots.push(Token::error(body, pos));
        }
    }

    Ok(roots)
}

fn attach(token: Token, parent: &mut Option<Token>, roots: &mut Vec<Token>) {
    match parent {
        Some(open) => open.children.push(token),
        None => roots.push(token),
    }
}
