use crate::{
    ast::{
        expressions::{ArithmeticOp, Expr, ExprKind},
        types::{Scalar, Type},
    },
    errors::errors::ErrorImpl,
    interpreter::builtins::{check_arity, Builtin, Method},
    Position,
};

use super::type_checker::TypeChecker;

pub fn check_expr(checker: &mut TypeChecker, expr: &Expr) -> Type {
    let position = expr.span.start;

    match &expr.kind {
        ExprKind::Int(_) => Type::Int,
        ExprKind::Double(_) => Type::Double,
        ExprKind::Bool(_) => Type::Bool,
        ExprKind::Char(_) => Type::Char,
        ExprKind::String(_) => Type::String,
        ExprKind::Identifier(name) => checker.lookup(name, position),
        ExprKind::Arithmetic { op, left, right } => {
            let left = check_expr(checker, left);
            let right = check_expr(checker, right);
            check_arithmetic(checker, *op, left, right, position)
        }
        ExprKind::Negate(operand) => match check_expr(checker, operand) {
            Type::Error => Type::Error,
            Type::Int | Type::Char => Type::Int,
            Type::Double => Type::Double,
            other => invalid_operand(checker, "-", other, position),
        },
        ExprKind::Relational { op, left, right } => {
            let left = check_expr(checker, left);
            let right = check_expr(checker, right);
            if left.is_error() || right.is_error() {
                return Type::Error;
            }

            let comparable = if op.is_equality() {
                left == right || (left.is_numeric() && right.is_numeric())
            } else {
                left.is_numeric() && right.is_numeric()
            };
            if !comparable {
                return incompatible(checker, &op.to_string(), left, right, position);
            }
            Type::Bool
        }
        ExprKind::Logical { op, left, right } => {
            let left = check_expr(checker, left);
            let right = check_expr(checker, right);
            match (left, right) {
                (Type::Error, _) | (_, Type::Error) => Type::Error,
                (Type::Bool, Type::Bool) => Type::Bool,
                (Type::Bool, other) | (other, _) => invalid_operand(checker, &op.to_string(), other, position),
            }
        }
        ExprKind::Not(operand) => match check_expr(checker, operand) {
            Type::Error => Type::Error,
            Type::Bool => Type::Bool,
            other => invalid_operand(checker, "!", other, position),
        },
        ExprKind::Cast { target, expr } => {
            let source = check_expr(checker, expr);
            if source.is_error() {
                return Type::Error;
            }
            if !is_legal_cast(source, *target) {
                checker.report(
                    ErrorImpl::InvalidCast {
                        from: source.to_string(),
                        to: target.to_string(),
                    },
                    position,
                );
                return Type::Error;
            }
            *target
        }
        ExprKind::Grouping(inner) => check_expr(checker, inner),
        ExprKind::Call { name, arguments } => check_call(checker, name, arguments, position),
        ExprKind::MethodCall {
            receiver,
            method,
            arguments,
        } => check_method(checker, receiver, method, arguments, position),
        ExprKind::Index {
            target,
            index,
            column,
        } => {
            let container = check_expr(checker, target);
            element_type(checker, container, index, column.as_deref(), position)
        }
        ExprKind::Vector(items) => check_vector(checker, items, position),
        ExprKind::Matrix(rows) => check_matrix(checker, rows, position),
        ExprKind::NewList(Some(base)) => Type::List(*base),
        ExprKind::NewList(None) => {
            checker.report(
                ErrorImpl::NewListOutsideList {
                    expected: String::from("an untyped context"),
                },
                position,
            );
            Type::Error
        }
    }
}

/// Types the right-hand side of a declaration or assignment into a slot of
/// type `target`. `new List()` takes its base from the slot.
pub fn check_expr_for(checker: &mut TypeChecker, expr: &Expr, target: Type) -> Type {
    match (&expr.kind, target) {
        (ExprKind::NewList(None), Type::List(_)) => target,
        (ExprKind::NewList(None), Type::Error) => Type::Error,
        (ExprKind::NewList(None), other) => {
            checker.report(
                ErrorImpl::NewListOutsideList {
                    expected: other.to_string(),
                },
                expr.span.start,
            );
            Type::Error
        }
        _ => check_expr(checker, expr),
    }
}

/// Type of `container[index]` or `container[index][column]`.
pub fn element_type(
    checker: &mut TypeChecker,
    container: Type,
    index: &Expr,
    column: Option<&Expr>,
    position: Position,
) -> Type {
    let mut indices_valid = check_index(checker, index);
    if let Some(column) = column {
        indices_valid &= check_index(checker, column);
    }
    if container.is_error() || !indices_valid {
        return Type::Error;
    }

    match (container, column) {
        (Type::Vector(base) | Type::List(base), None) => base.as_type(),
        (Type::Matrix(base), None) => Type::Vector(base),
        (Type::Matrix(base), Some(_)) => base.as_type(),
        (Type::Vector(_) | Type::List(_), Some(_)) => {
            checker.report(
                ErrorImpl::DoubleIndexOnNonMatrix {
                    type_: container.to_string(),
                },
                position,
            );
            Type::Error
        }
        (other, _) => {
            checker.report(
                ErrorImpl::NotIndexable {
                    type_: other.to_string(),
                },
                position,
            );
            Type::Error
        }
    }
}

/// Checks a call by name: a builtin first, then a declared function.
pub fn check_call(checker: &mut TypeChecker, name: &str, arguments: &[Expr], position: Position) -> Type {
    if let Some(builtin) = Builtin::from_name(name) {
        return check_builtin(checker, builtin, arguments, position);
    }

    let Some(declaration) = checker.function(name) else {
        checker.report(
            ErrorImpl::UndeclaredFunction {
                function: name.to_string(),
            },
            position,
        );
        return Type::Error;
    };

    if let Err(error) = check_arity(
        &declaration.name,
        declaration.parameters.len(),
        arguments.len(),
        position,
    ) {
        checker.diagnostics.push(error);
        return declaration.return_type;
    }

    for (index, (parameter, argument)) in declaration.parameters.iter().zip(arguments).enumerate() {
        let received = check_expr(checker, argument);
        if !received.is_error() && !parameter.ty.is_assignable_from(received) {
            checker.report(
                ErrorImpl::ArgumentTypeMatchError {
                    function: declaration.name.clone(),
                    index: index + 1,
                    expected: parameter.ty.to_string(),
                    received: received.to_string(),
                },
                argument.span.start,
            );
        }
    }

    declaration.return_type
}

fn check_builtin(checker: &mut TypeChecker, builtin: Builtin, arguments: &[Expr], position: Position) -> Type {
    if let Err(error) = check_arity(builtin.name(), builtin.arity(), arguments.len(), position) {
        checker.diagnostics.push(error);
        return Type::Error;
    }

    let types: Vec<Type> = arguments
        .iter()
        .map(|argument| check_expr(checker, argument))
        .collect();
    if types.iter().any(|ty| ty.is_error()) {
        return Type::Error;
    }

    let result = match (builtin, types.as_slice()) {
        (Builtin::Round, [ty]) if ty.is_numeric() => Some(Type::Int),
        (Builtin::Length, [ty]) if *ty == Type::String || ty.is_container() => Some(Type::Int),
        (Builtin::ToString, [ty]) if *ty != Type::Void => Some(Type::String),
        (Builtin::Find, [Type::String, Type::String]) => Some(Type::Int),
        (Builtin::Find, [Type::Vector(base) | Type::List(base), needle]) if comparable(*base, *needle) => {
            Some(Type::Int)
        }
        (Builtin::StartsWith, [Type::String, Type::String]) => Some(Type::Bool),
        _ => None,
    };

    result.unwrap_or_else(|| {
        checker.report(
            ErrorImpl::InvalidBuiltinArgument {
                function: builtin.name().to_string(),
                received: describe(&types),
            },
            position,
        );
        Type::Error
    })
}

fn check_method(
    checker: &mut TypeChecker,
    receiver: &Expr,
    name: &str,
    arguments: &[Expr],
    position: Position,
) -> Type {
    let receiver = check_expr(checker, receiver);
    let types: Vec<Type> = arguments
        .iter()
        .map(|argument| check_expr(checker, argument))
        .collect();

    let Some(method) = Method::from_name(name) else {
        return unknown_method(checker, name, receiver, position);
    };
    if let Err(error) = check_arity(method.name(), method.arity(), types.len(), position) {
        checker.diagnostics.push(error);
        return Type::Error;
    }
    if receiver.is_error() || types.iter().any(|ty| ty.is_error()) {
        return Type::Error;
    }

    let argument = types[0];
    let (expected, result) = match (method, receiver) {
        (Method::Append, Type::List(base)) => (base.as_type(), Type::Void),
        (Method::Remove, Type::List(base)) => {
            if argument != Type::Int {
                return argument_mismatch(checker, method, Type::Int, argument, position);
            }
            return base.as_type();
        }
        (Method::Find, Type::Vector(base) | Type::List(base)) => {
            if !comparable(base, argument) {
                return argument_mismatch(checker, method, base.as_type(), argument, position);
            }
            return Type::Bool;
        }
        (Method::Find, Type::String) => {
            if !matches!(argument, Type::String | Type::Char) {
                return argument_mismatch(checker, method, Type::String, argument, position);
            }
            return Type::Bool;
        }
        (Method::StartsWith, Type::String) => (Type::String, Type::Bool),
        _ => return unknown_method(checker, method.name(), receiver, position),
    };

    if !expected.is_assignable_from(argument) {
        return argument_mismatch(checker, method, expected, argument, position);
    }
    result
}

fn check_arithmetic(
    checker: &mut TypeChecker,
    op: ArithmeticOp,
    left: Type,
    right: Type,
    position: Position,
) -> Type {
    if left.is_error() || right.is_error() {
        return Type::Error;
    }
    if op == ArithmeticOp::Add
        && (left == Type::String || right == Type::String)
        && left != Type::Void
        && right != Type::Void
    {
        return Type::String;
    }
    if !left.is_numeric() || !right.is_numeric() {
        return incompatible(checker, &op.to_string(), left, right, position);
    }

    let integral = |ty: Type| matches!(ty, Type::Int | Type::Char);
    match op {
        ArithmeticOp::Divide => Type::Double,
        ArithmeticOp::Modulo if integral(left) && integral(right) => Type::Int,
        ArithmeticOp::Modulo => incompatible(checker, &op.to_string(), left, right, position),
        _ if integral(left) && integral(right) => Type::Int,
        _ => Type::Double,
    }
}

fn check_vector(checker: &mut TypeChecker, items: &[Expr], position: Position) -> Type {
    if items.is_empty() {
        checker.report(ErrorImpl::EmptyAggregateLiteral, position);
        return Type::Error;
    }

    let types: Vec<Type> = items.iter().map(|item| check_expr(checker, item)).collect();
    if types.iter().any(|ty| ty.is_error()) {
        return Type::Error;
    }

    let mut element = types[0];
    for ty in &types[1..] {
        match element.unify(*ty) {
            Some(unified) => element = unified,
            None => return incompatible_elements(checker, element, *ty, position),
        }
    }

    match element.as_scalar() {
        Some(base) => Type::Vector(base),
        None => incompatible_elements(checker, element, element, position),
    }
}

fn check_matrix(checker: &mut TypeChecker, rows: &[Expr], position: Position) -> Type {
    if rows.is_empty() {
        checker.report(ErrorImpl::EmptyAggregateLiteral, position);
        return Type::Error;
    }

    let mut base: Option<Scalar> = None;
    let mut valid = true;
    for row in rows {
        let row_base = match check_expr(checker, row) {
            Type::Error => {
                valid = false;
                continue;
            }
            Type::Vector(row_base) => row_base,
            other => {
                checker.report(
                    ErrorImpl::MatrixRowNotVector {
                        received: other.to_string(),
                    },
                    row.span.start,
                );
                valid = false;
                continue;
            }
        };

        base = match base {
            None => Some(row_base),
            Some(current) => match current.as_type().unify(row_base.as_type()).and_then(Type::as_scalar) {
                Some(unified) => Some(unified),
                None => return incompatible_elements(checker, current.as_type(), row_base.as_type(), position),
            },
        };
    }

    match (valid, base) {
        (true, Some(base)) => Type::Matrix(base),
        _ => Type::Error,
    }
}

fn check_index(checker: &mut TypeChecker, index: &Expr) -> bool {
    match check_expr(checker, index) {
        Type::Int => true,
        Type::Error => false,
        other => {
            checker.report(
                ErrorImpl::IndexNotInt {
                    received: other.to_string(),
                },
                index.span.start,
            );
            false
        }
    }
}

/// Casts accepted by the language. Identity casts are not among them.
fn is_legal_cast(from: Type, to: Type) -> bool {
    matches!(
        (from, to),
        (Type::Int, Type::Double)
            | (Type::Double, Type::Int)
            | (Type::Int, Type::String)
            | (Type::Int, Type::Char)
            | (Type::Double, Type::String)
            | (Type::Char, Type::Int)
            | (Type::Char, Type::Double)
    )
}

fn comparable(base: Scalar, needle: Type) -> bool {
    let base = base.as_type();
    base.is_assignable_from(needle) || needle.is_assignable_from(base)
}

fn describe(types: &[Type]) -> String {
    types
        .iter()
        .map(|ty| ty.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn incompatible(checker: &mut TypeChecker, operator: &str, left: Type, right: Type, position: Position) -> Type {
    checker.report(
        ErrorImpl::IncompatibleTypes {
            operator: operator.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        },
        position,
    );
    Type::Error
}

fn invalid_operand(checker: &mut TypeChecker, operator: &str, operand: Type, position: Position) -> Type {
    checker.report(
        ErrorImpl::InvalidOperand {
            operator: operator.to_string(),
            operand: operand.to_string(),
        },
        position,
    );
    Type::Error
}

fn incompatible_elements(checker: &mut TypeChecker, first: Type, second: Type, position: Position) -> Type {
    checker.report(
        ErrorImpl::IncompatibleElementTypes {
            first: first.to_string(),
            second: second.to_string(),
        },
        position,
    );
    Type::Error
}

fn unknown_method(checker: &mut TypeChecker, method: &str, receiver: Type, position: Position) -> Type {
    if receiver.is_error() {
        return Type::Error;
    }
    checker.report(
        ErrorImpl::UnknownMethod {
            method: method.to_string(),
            type_: receiver.to_string(),
        },
        position,
    );
    Type::Error
}

fn argument_mismatch(checker: &mut TypeChecker, method: Method, expected: Type, received: Type, position: Position) -> Type {
    checker.report(
        ErrorImpl::ArgumentTypeMatchError {
            function: method.name().to_string(),
            index: 1,
            expected: expected.to_string(),
            received: received.to_string(),
        },
        position,
    );
    Type::Error
}
