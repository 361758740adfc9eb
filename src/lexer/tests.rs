//! Unit tests for the lexer module.

use pretty_assertions::assert_eq;

use super::{
    lexer::{tokenize, unescape},
    tokens::TokenKind,
};
use crate::{errors::errors::ErrorImpl, Position};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source)
        .unwrap()
        .iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    assert_eq!(
        kinds("var if else while for do switch case default break continue return start println new"),
        vec![
            TokenKind::Var,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::For,
            TokenKind::Do,
            TokenKind::Switch,
            TokenKind::Case,
            TokenKind::Default,
            TokenKind::Break,
            TokenKind::Continue,
            TokenKind::Return,
            TokenKind::Start,
            TokenKind::Print,
            TokenKind::New,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_keywords_are_case_insensitive() {
    assert_eq!(
        kinds("VAR While PrintLn TRUE"),
        vec![
            TokenKind::Var,
            TokenKind::While,
            TokenKind::Print,
            TokenKind::True,
            TokenKind::EOF
        ]
    );
}

#[test]
fn test_tokenize_type_names() {
    let tokens = tokenize("int double bool char string void List").unwrap();
    for token in &tokens[..6] {
        assert_eq!(token.kind, TokenKind::TypeName);
    }
    assert_eq!(tokens[6].kind, TokenKind::List);
    assert_eq!(tokens[1].value, "double");
}

#[test]
fn test_tokenize_identifiers() {
    let tokens = tokenize("foo baz_123 _under CamelCase").unwrap();
    let values: Vec<&str> = tokens[..4].iter().map(|token| token.value.as_str()).collect();

    assert_eq!(values, vec!["foo", "baz_123", "_under", "CamelCase"]);
    assert!(tokens[..4].iter().all(|token| token.kind == TokenKind::Identifier));
}

#[test]
fn test_tokenize_numbers() {
    let tokens = tokenize("42 3.14 0").unwrap();
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[2].value, "0");
    assert!(tokens[..3].iter().all(|token| token.kind == TokenKind::Number));
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("** * ++ + -- - == = != ! <= < >= > && || ^ %"),
        vec![
            TokenKind::StarStar,
            TokenKind::Star,
            TokenKind::PlusPlus,
            TokenKind::Plus,
            TokenKind::MinusMinus,
            TokenKind::Dash,
            TokenKind::Equals,
            TokenKind::Assignment,
            TokenKind::NotEquals,
            TokenKind::Not,
            TokenKind::LessEquals,
            TokenKind::Less,
            TokenKind::GreaterEquals,
            TokenKind::Greater,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Caret,
            TokenKind::Percent,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_string_and_char_literals() {
    let tokens = tokenize(r#""hello\nworld" 'a' '\t'"#).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "hello\nworld");
    assert_eq!(tokens[1].kind, TokenKind::Char);
    assert_eq!(tokens[1].value, "a");
    assert_eq!(tokens[2].value, "\t");
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        kinds("a // line comment\n/* block\ncomment */ b"),
        vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::EOF]
    );
}

#[test]
fn test_token_positions() {
    let tokens = tokenize("var a: int = 3;\n  println(a);").unwrap();

    assert_eq!(tokens[0].span.start, Position::new(1, 1));
    assert_eq!(tokens[1].span.start, Position::new(1, 5));
    assert_eq!(tokens[0].span.end, Position::new(1, 4));

    let print = tokens.iter().find(|token| token.kind == TokenKind::Print).unwrap();
    assert_eq!(print.span.start, Position::new(2, 3));
}

#[test]
fn test_positions_after_block_comment() {
    let tokens = tokenize("/* one\ntwo */ x").unwrap();
    assert_eq!(tokens[0].span.start, Position::new(2, 8));
}

#[test]
fn test_unrecognised_token() {
    let error = tokenize("var a = 1 @ 2;").unwrap_err();

    assert_eq!(*error.get_position(), Position::new(1, 11));
    assert!(matches!(
        error.get_internal_error(),
        ErrorImpl::UnrecognisedToken { token } if token == "@"
    ));
}

#[test]
fn test_unterminated_literals() {
    for (source, literal) in [("\"abc", "string"), ("'a", "char"), ("/* open", "comment")] {
        let error = tokenize(source).unwrap_err();
        assert!(matches!(
            error.get_internal_error(),
            ErrorImpl::UnterminatedLiteral { literal: found } if found == literal
        ));
    }
}

#[test]
fn test_unescape_keeps_unknown_escapes() {
    assert_eq!(unescape(r"a\qb"), "a\\qb");
    assert_eq!(unescape(r#"\"quoted\""#), "\"quoted\"");
}

#[test]
fn test_empty_source_yields_eof() {
    assert_eq!(kinds(""), vec![TokenKind::EOF]);
}
