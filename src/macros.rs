//! Utility macros for the front end.
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_DEFAULT_HANDLER!` - Creates a lexer handler for fixed-text tokens

/// Creates a Token instance.
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Number, "42".to_string(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// Creates a lexer handler for a token whose text is always `$value`.
/// The handler pushes the token at the current line and column, then
/// moves the lexer past it.
///
/// ```ignore
/// pattern(r"^\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+"))
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, matched: &str| -> Result<(), Error> {
            let start = lexer.position();
            lexer.advance(matched);
            lexer.push(MK_TOKEN!($kind, String::from($value), Span::new(start, lexer.position())));
            Ok(())
        }
    };
}
