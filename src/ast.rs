use std::collections::HashMap;
use std::fmt;

/// Token type, used both during lexing and as the node tag in the AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Plain text between tags
    Text,
    /// Recovered nesting violation (permissive mode only)
    Error,
    /// Opening tag: `[row]`
    Open,
    /// Closing tag: `[/row]`
    Close,
    /// Self-closing tag: `[col width=6/]`
    SelfClosing,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "TEXT",
            Self::Error => "ERROR",
            Self::Open => "OPEN",
            Self::Close => "CLOSE",
            Self::SelfClosing => "SELF_CLOSING",
        };
        f.write_str(name)
    }
}

/// A parameter value coerced to a native type.
///
/// `Null` and `Undefined` are distinct: `a=null` and `a=undefined`
/// produce different values.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Null,
    Undefined,
}

/// A token produced by the lexer, doubling as a node in the AST.
///
/// Only `children` and `is_closed` change after construction, and only
/// while the AST builder holds the node as its innermost open tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Verbatim source of this token, delimiters included.
    pub body: String,
    /// Byte offset of `body` within the original input.
    pub pos: usize,
    /// Tag identifier; `None` for TEXT and ERROR tokens.
    pub name: Option<String>,
    /// Coerced parameters; empty for TEXT, ERROR and CLOSE tokens.
    pub params: HashMap<String, ParamValue>,
    /// Nested nodes, filled in by the AST builder for OPEN tags.
    pub children: Vec<Token>,
    /// True from construction for SELF_CLOSING, set by the AST builder
    /// for OPEN tags once the matching CLOSE is consumed.
    pub is_closed: bool,
}

impl Token {
    /// A plain text token.
    pub fn text(body: impl Into<String>, pos: usize) -> Self {
        Self::leaf(TokenKind::Text, body.into(), pos)
    }

    /// An error node wrapping the source of a nesting violation.
    pub fn error(body: impl Into<String>, pos: usize) -> Self {
        Self::leaf(TokenKind::Error, body.into(), pos)
    }

    fn leaf(kind: TokenKind, body: String, pos: usize) -> Self {
        Self {
            kind,
            body,
            pos,
            name: None,
            params: HashMap::new(),
            children: Vec::new(),
            is_closed: false,
        }
    }

    /// Whether this CLOSE token closes the given open tag. Names are
    /// compared case-sensitively.
    pub fn can_close(&self, open: &Token) -> bool {
        self.name == open.name
    }
}

/// Coerce a raw parameter value to a native type.
///
/// A surrounding quote character on either end is stripped before
/// inspection, so quoted numbers coerce the same as bare ones.
pub(crate) fn cast_value(raw: &str) -> ParamValue {
    let value = strip_quotes(raw);

    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return match value.parse::<i64>() {
            Ok(n) => ParamValue::Int(n),
            // Digit runs too long for i64 keep their numeric meaning.
            Err(_) => value
                .parse::<f64>()
                .map(ParamValue::Float)
                .unwrap_or_else(|_| ParamValue::Str(value.to_string())),
        };
    }
    if let Some(f) = lenient_float(value) {
        return ParamValue::Float(f);
    }
    if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes") {
        return ParamValue::Bool(true);
    }
    if value.eq_ignore_ascii_case("false") || value.eq_ignore_ascii_case("no") {
        return ParamValue::Bool(false);
    }
    match value {
        "undefined" => ParamValue::Undefined,
        "null" => ParamValue::Null,
        _ => ParamValue::Str(value.to_string()),
    }
}

fn strip_quotes(value: &str) -> &str {
    let value = value
        .strip_prefix(['"', '\''])
        .unwrap_or(value);
    value.strip_suffix(['"', '\'']).unwrap_or(value)
}

/// Matches the lenient float shape: a digit run, any single separator
/// character, then a digit run. The separator is not required to be a
/// dot; `1x5` coerces to `1.0` just like the upstream dialect. With a
/// dot (or an exponent marker) the whole value parses as one number,
/// otherwise only the leading digit run counts.
fn lenient_float(value: &str) -> Option<f64> {
    let head = value.bytes().take_while(|b| b.is_ascii_digit()).count();
    if head == 0 {
        return None;
    }
    let mut rest = value[head..].chars();
    let sep = rest.next()?;
    let tail = rest.as_str();
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match sep {
        '.' | 'e' | 'E' => value.parse().ok(),
        _ => value[..head].parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_integers() {
        assert_eq!(cast_value("32"), ParamValue::Int(32));
        assert_eq!(cast_value("\"12\""), ParamValue::Int(12));
        assert_eq!(cast_value("0"), ParamValue::Int(0));
    }

    #[test]
    fn test_cast_integer_overflow_falls_back_to_float() {
        assert_eq!(
            cast_value("99999999999999999999"),
            ParamValue::Float(1e20)
        );
    }

    #[test]
    fn test_cast_floats() {
        assert_eq!(cast_value("3.2"), ParamValue::Float(3.2));
        assert_eq!(cast_value("'1.5'"), ParamValue::Float(1.5));
    }

    #[test]
    fn test_cast_float_separator_is_lenient() {
        // Any single character between two digit runs is accepted as
        // the decimal separator; only the leading digits survive.
        assert_eq!(cast_value("\"1x5\""), ParamValue::Float(1.0));
        assert_eq!(cast_value("\"12a34\""), ParamValue::Float(12.0));
        assert_eq!(cast_value("\"1e5\""), ParamValue::Float(100000.0));
        // Two separators is not a float.
        assert_eq!(
            cast_value("\"1.5.5\""),
            ParamValue::Str("1.5.5".to_string())
        );
    }

    #[test]
    fn test_cast_booleans() {
        assert_eq!(cast_value("true"), ParamValue::Bool(true));
        assert_eq!(cast_value("YES"), ParamValue::Bool(true));
        assert_eq!(cast_value("false"), ParamValue::Bool(false));
        assert_eq!(cast_value("No"), ParamValue::Bool(false));
    }

    #[test]
    fn test_cast_null_and_undefined_are_distinct() {
        assert_eq!(cast_value("null"), ParamValue::Null);
        assert_eq!(cast_value("undefined"), ParamValue::Undefined);
        assert_ne!(cast_value("null"), cast_value("undefined"));
        // Case-sensitive, unlike the booleans.
        assert_eq!(cast_value("NULL"), ParamValue::Str("NULL".to_string()));
    }

    #[test]
    fn test_cast_strings() {
        assert_eq!(
            cast_value("\"Checkout\""),
            ParamValue::Str("Checkout".to_string())
        );
        assert_eq!(cast_value("'x'"), ParamValue::Str("x".to_string()));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TokenKind::SelfClosing.to_string(), "SELF_CLOSING");
        assert_eq!(TokenKind::Text.to_string(), "TEXT");
    }

    #[test]
    fn test_can_close_is_case_sensitive() {
        let mut open = Token::text("[Row]", 0);
        open.kind = TokenKind::Open;
        open.name = Some("Row".to_string());

        let mut close = Token::text("[/row]", 5);
        close.kind = TokenKind::Close;
        close.name = Some("row".to_string());

        assert!(!close.can_close(&open));
    }
}
