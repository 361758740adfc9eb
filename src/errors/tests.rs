//! Unit tests for error handling.
//!
//! This module contains tests for error names, kinds, tips and the
//! diagnostic ordering.

use crate::errors::errors::{Diagnostics, Error, ErrorImpl, ErrorKind, ErrorTip};
use crate::Position;

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        Position::new(3, 10),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.kind(), ErrorKind::Lexical);
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        Position::new(4, 2),
    );

    assert_eq!(error.line(), 4);
    assert_eq!(error.column(), 2);
    assert_eq!(error.kind(), ErrorKind::Syntactic);
}

#[test]
fn test_runtime_errors_are_semantic() {
    let division = Error::new(ErrorImpl::DivisionByZero, Position::new(1, 1));
    let modulo = Error::new(ErrorImpl::ModuloByZero, Position::new(1, 1));

    assert_eq!(division.kind(), ErrorKind::Semantic);
    assert_eq!(modulo.kind(), ErrorKind::Semantic);
    assert_eq!(division.get_error_name(), "DivisionByZero");
    assert_eq!(division.message(), "division by zero");
}

#[test]
fn test_duplicate_declaration_error() {
    let error = Error::new(
        ErrorImpl::DuplicateDeclaration {
            identifier: "x".to_string(),
        },
        Position::new(2, 5),
    );

    assert_eq!(error.get_error_name(), "DuplicateDeclaration");
    assert_eq!(
        error.message(),
        "identifier \"x\" is already declared in this scope"
    );
}

#[test]
fn test_argument_errors() {
    let error = Error::new(
        ErrorImpl::MissingArguments {
            function: "add".to_string(),
            expected: 3,
            received: 1,
        },
        Position::null(),
    );

    assert_eq!(error.get_error_name(), "MissingArguments");
    assert_eq!(error.get_tip().to_string(), "Expected 3 arguments, received 1");
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        Position::null(),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_suggestion() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "}".to_string(),
        },
        Position::null(),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(_) => (),
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_error_display() {
    let error = Error::new(ErrorImpl::ModuloByZero, Position::new(7, 3));
    assert_eq!(error.to_string(), "[Semantic] 7:3: modulo by zero");
}

#[test]
fn test_diagnostics_sorted_by_kind_then_position() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.push(Error::new(
        ErrorImpl::UnexpectedToken { token: ";".to_string() },
        Position::new(1, 1),
    ));
    diagnostics.push(Error::new(ErrorImpl::DivisionByZero, Position::new(5, 1)));
    diagnostics.push(Error::new(ErrorImpl::ModuloByZero, Position::new(2, 8)));
    diagnostics.push(Error::new(
        ErrorImpl::UnrecognisedToken { token: "#".to_string() },
        Position::new(9, 9),
    ));

    let names = diagnostics
        .sorted()
        .iter()
        .map(|error| error.get_error_name().to_string())
        .collect::<Vec<_>>();

    assert_eq!(
        names,
        vec!["UnrecognisedToken", "ModuloByZero", "DivisionByZero", "UnexpectedToken"]
    );
}

#[test]
fn test_diagnostics_ties_keep_insertion_order() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.push(Error::new(ErrorImpl::ModuloByZero, Position::new(3, 3)));
    diagnostics.push(Error::new(ErrorImpl::DivisionByZero, Position::new(3, 3)));

    let sorted = diagnostics.sorted();
    assert_eq!(sorted[0].get_error_name(), "ModuloByZero");
    assert_eq!(sorted[1].get_error_name(), "DivisionByZero");
    assert_eq!(diagnostics.count_named("DivisionByZero"), 1);
}
