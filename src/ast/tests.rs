//! Unit tests for the type model and AST helpers.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::expressions::{ArithmeticOp, Expr, ExprKind};
use super::types::{Scalar, Type};
use crate::Span;

fn expected_assignable(destination: Scalar, source: Scalar) -> bool {
    use Scalar::*;

    match (destination, source) {
        (Int, Int) | (Double, Double) | (Bool, Bool) | (Char, Char) | (String, String) => true,
        (Int, Bool) => true,
        (Double, Int) | (Double, Char) => true,
        _ => false,
    }
}

proptest! {
    #[test]
    fn test_assignability_matches_table(
        destination in prop::sample::select(Scalar::ALL.to_vec()),
        source in prop::sample::select(Scalar::ALL.to_vec()),
    ) {
        prop_assert_eq!(
            destination.as_type().is_assignable_from(source.as_type()),
            expected_assignable(destination, source)
        );
        prop_assert!(destination.as_type().is_assignable_from(destination.as_type()));
    }

    #[test]
    fn test_containers_only_accept_identical_containers(
        a in prop::sample::select(Scalar::ALL.to_vec()),
        b in prop::sample::select(Scalar::ALL.to_vec()),
    ) {
        prop_assert_eq!(Type::Vector(a).is_assignable_from(Type::Vector(b)), a == b);
        prop_assert!(!Type::List(a).is_assignable_from(Type::Vector(b)));
        prop_assert!(!Type::Matrix(a).is_assignable_from(Type::Vector(b)));
    }
}

#[test]
fn test_assignable_pairs_count() {
    let mut count = 0;
    for destination in Scalar::ALL {
        for source in Scalar::ALL {
            if destination.as_type().is_assignable_from(source.as_type()) {
                count += 1;
            }
        }
    }

    assert_eq!(count, 8);
}

#[test]
fn test_is_numeric() {
    assert!(Type::Int.is_numeric());
    assert!(Type::Double.is_numeric());
    assert!(Type::Char.is_numeric());
    assert!(!Type::Bool.is_numeric());
    assert!(!Type::String.is_numeric());
    assert!(!Type::Vector(Scalar::Int).is_numeric());
}

#[test]
fn test_container_constructors_reject_non_scalars() {
    assert_eq!(Type::vector_of(Type::Int), Type::Vector(Scalar::Int));
    assert_eq!(Type::matrix_of(Type::Char), Type::Matrix(Scalar::Char));
    assert_eq!(Type::list_of(Type::String), Type::List(Scalar::String));
    assert_eq!(Type::vector_of(Type::Void), Type::Error);
    assert_eq!(Type::list_of(Type::Error), Type::Error);
    assert_eq!(Type::matrix_of(Type::Vector(Scalar::Int)), Type::Error);
    assert_eq!(Type::Matrix(Scalar::Double).base(), Some(Scalar::Double));
    assert_eq!(Type::Int.base(), None);
}

#[test]
fn test_unify() {
    assert_eq!(Type::Int.unify(Type::Double), Some(Type::Double));
    assert_eq!(Type::Double.unify(Type::Int), Some(Type::Double));
    assert_eq!(Type::Char.unify(Type::Char), Some(Type::Char));
    assert_eq!(Type::Int.unify(Type::String), None);
    assert_eq!(Type::Bool.unify(Type::Int), None);
}

#[test]
fn test_type_names() {
    assert_eq!(Type::Int.to_string(), "int");
    assert_eq!(Type::Vector(Scalar::Int).to_string(), "int[]");
    assert_eq!(Type::Matrix(Scalar::Double).to_string(), "double[][]");
    assert_eq!(Type::List(Scalar::String).to_string(), "List<string>");
    assert_eq!(Type::Error.to_string(), "error");
}

#[test]
fn test_type_from_name() {
    assert_eq!(Type::from_name("INT"), Some(Type::Int));
    assert_eq!(Type::from_name(" double [ ] "), Some(Type::Vector(Scalar::Double)));
    assert_eq!(Type::from_name("char[][]"), Some(Type::Matrix(Scalar::Char)));
    assert_eq!(Type::from_name("List<bool>"), Some(Type::List(Scalar::Bool)));
    assert_eq!(Type::from_name("List<int[]>"), None);
    assert_eq!(Type::from_name("void[]"), None);
    assert_eq!(Type::from_name("float"), None);
}

#[test]
fn test_expression_display() {
    let expr = Expr::new(
        ExprKind::Arithmetic {
            op: ArithmeticOp::Add,
            left: Box::new(Expr::new(ExprKind::Identifier("i".to_string()), Span::default())),
            right: Box::new(Expr::new(ExprKind::Int(1), Span::default())),
        },
        Span::default(),
    );

    assert_eq!(expr.to_string(), "i + 1");
}
