//! Unit tests for the parser module.

use pretty_assertions::assert_eq;

use super::parser::parse;
use crate::{
    ast::{
        ast::Program,
        expressions::{ArithmeticOp, ExprKind, LogicalOp},
        statements::StmtKind,
        types::{Scalar, Type},
    },
    errors::errors::{Error, ErrorImpl, ErrorKind},
    lexer::lexer::tokenize,
    Position,
};

fn parse_source(source: &str) -> Result<Program, Error> {
    parse(tokenize(source).unwrap())
}

fn first_kind(source: &str) -> StmtKind {
    parse_source(source).unwrap().body.remove(0).kind
}

#[test]
fn test_parse_variable_declaration() {
    let StmtKind::VarDecl {
        name,
        ty,
        initializer,
    } = first_kind("var a: int = 3;")
    else {
        panic!("expected a declaration");
    };

    assert_eq!(name, "a");
    assert_eq!(ty, Type::Int);
    assert_eq!(initializer.unwrap().kind, ExprKind::Int(3));
}

#[test]
fn test_parse_declaration_without_initializer() {
    let StmtKind::VarDecl { ty, initializer, .. } = first_kind("var m: double[][];") else {
        panic!("expected a declaration");
    };

    assert_eq!(ty, Type::Matrix(Scalar::Double));
    assert!(initializer.is_none());
}

#[test]
fn test_parse_list_declaration() {
    let StmtKind::VarDecl { ty, initializer, .. } = first_kind("var l: List<int> = new List();")
    else {
        panic!("expected a declaration");
    };

    assert_eq!(ty, Type::List(Scalar::Int));
    assert_eq!(initializer.unwrap().kind, ExprKind::NewList(None));
}

#[test]
fn test_parse_function_declaration() {
    let StmtKind::FnDecl(declaration) = first_kind("int add(int a, double b) { return a; }") else {
        panic!("expected a function");
    };

    assert_eq!(declaration.name, "add");
    assert_eq!(declaration.return_type, Type::Int);
    assert_eq!(declaration.parameters.len(), 2);
    assert_eq!(declaration.parameters[1].ty, Type::Double);
    assert_eq!(declaration.signature(), "add(int, double) : int");
    assert_eq!(declaration.body.body.len(), 1);
}

#[test]
fn test_parse_start_statement() {
    let StmtKind::Start { name, arguments } = first_kind("start main(1, 2);") else {
        panic!("expected start");
    };

    assert_eq!(name, "main");
    assert_eq!(arguments.len(), 2);
}

#[test]
fn test_operator_precedence() {
    let StmtKind::Expression(expr) = first_kind("1 + 2 * 3;") else {
        panic!("expected an expression");
    };
    assert_eq!(expr.to_string(), "1 + 2 * 3");

    let ExprKind::Arithmetic { op, right, .. } = expr.kind else {
        panic!("expected arithmetic");
    };
    assert_eq!(op, ArithmeticOp::Add);
    assert!(matches!(right.kind, ExprKind::Arithmetic { op: ArithmeticOp::Multiply, .. }));
}

#[test]
fn test_power_is_right_associative() {
    let StmtKind::Expression(expr) = first_kind("2 ** 3 ** 2;") else {
        panic!("expected an expression");
    };
    let ExprKind::Arithmetic { left, right, .. } = expr.kind else {
        panic!("expected arithmetic");
    };

    assert_eq!(left.kind, ExprKind::Int(2));
    assert!(matches!(right.kind, ExprKind::Arithmetic { op: ArithmeticOp::Power, .. }));
}

#[test]
fn test_and_binds_tighter_than_or() {
    let StmtKind::Expression(expr) = first_kind("a || b && c;") else {
        panic!("expected an expression");
    };
    let ExprKind::Logical { op, right, .. } = expr.kind else {
        panic!("expected logical");
    };

    assert_eq!(op, LogicalOp::Or);
    assert!(matches!(right.kind, ExprKind::Logical { op: LogicalOp::And, .. }));
}

#[test]
fn test_parse_cast_and_grouping() {
    let StmtKind::Expression(expr) = first_kind("(int) x + (1);") else {
        panic!("expected an expression");
    };
    let ExprKind::Arithmetic { left, right, .. } = expr.kind else {
        panic!("expected arithmetic");
    };

    assert!(matches!(left.kind, ExprKind::Cast { target: Type::Int, .. }));
    assert!(matches!(right.kind, ExprKind::Grouping(_)));
}

#[test]
fn test_parse_aggregate_literals() {
    let StmtKind::Expression(vector) = first_kind("[1, 2, 3];") else {
        panic!("expected an expression");
    };
    assert!(matches!(&vector.kind, ExprKind::Vector(items) if items.len() == 3));

    let StmtKind::Expression(matrix) = first_kind("[[1, 2], [3, 4]];") else {
        panic!("expected an expression");
    };
    assert!(matches!(&matrix.kind, ExprKind::Matrix(rows) if rows.len() == 2));
}

#[test]
fn test_parse_index_assignment() {
    let StmtKind::IndexAssign { column, value, .. } = first_kind("m[1][0] = 2;") else {
        panic!("expected an index assignment");
    };

    assert!(column.is_some());
    assert_eq!(value.kind, ExprKind::Int(2));
}

#[test]
fn test_parse_increment_and_method_call() {
    assert!(matches!(first_kind("a++;"), StmtKind::IncDec { increment: true, .. }));
    assert!(matches!(first_kind("v[0]--;"), StmtKind::IncDec { increment: false, .. }));

    let StmtKind::Expression(expr) = first_kind("l.append(1);") else {
        panic!("expected an expression");
    };
    assert!(matches!(&expr.kind, ExprKind::MethodCall { method, .. } if method == "append"));
}

#[test]
fn test_parse_control_flow() {
    let program = parse_source(
        "if (a) { } else if (b) { } else { }
         while (a) { break; }
         do { continue; } while (a);
         for (var i: int = 0; i < 3; i++) { }
         for (;;) { }
         switch (x) { case 1: println(1); break; case 2: default: println(0); }",
    )
    .unwrap();

    assert_eq!(program.body.len(), 6);
    let StmtKind::If { else_branch, .. } = &program.body[0].kind else {
        panic!("expected if");
    };
    assert!(matches!(
        else_branch.as_deref().map(|stmt| &stmt.kind),
        Some(StmtKind::If { .. })
    ));

    let StmtKind::Switch { cases, default, .. } = &program.body[5].kind else {
        panic!("expected switch");
    };
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0].body.len(), 2);
    assert!(cases[1].body.is_empty());
    assert!(default.is_some());

    let StmtKind::For {
        init,
        condition,
        update,
        ..
    } = &program.body[4].kind
    else {
        panic!("expected for");
    };
    assert!(init.is_none() && condition.is_none() && update.is_none());
}

#[test]
fn test_statement_positions() {
    let program = parse_source("var a: int = 1;\n  println(a);").unwrap();

    assert_eq!(program.body[0].position(), Position::new(1, 1));
    assert_eq!(program.body[1].position(), Position::new(2, 3));
}

#[test]
fn test_missing_semicolon_is_syntactic() {
    let error = parse_source("var a: int = 1\nprintln(a);").unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Syntactic);
    assert_eq!(*error.get_position(), Position::new(2, 1));
}

#[test]
fn test_void_variable_is_rejected() {
    let error = parse_source("var a: void;").unwrap_err();
    assert!(matches!(error.get_internal_error(), ErrorImpl::UnknownType { .. }));
}

#[test]
fn test_assignment_to_call_is_rejected() {
    assert!(parse_source("f() = 3;").is_err());
}

#[test]
fn test_keywords_and_types_are_case_insensitive() {
    let StmtKind::VarDecl { ty, .. } = first_kind("VAR x: INT = 1;") else {
        panic!("expected a declaration");
    };
    assert_eq!(ty, Type::Int);
}
