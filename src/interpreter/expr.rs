use crate::{
    ast::{
        expressions::{ArithmeticOp, Expr, ExprKind, LogicalOp, RelationalOp},
        types::{Scalar, Type},
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    builtins::{out_of_bounds, Builtin, Method},
    context::ExecutionContext,
    interpreter::call_function,
    value::{format_double, Sequence, Value, EPSILON},
};

pub fn evaluate_expr(ctx: &mut ExecutionContext, expr: &Expr) -> Result<Value, Error> {
    let position = expr.span.start;

    match &expr.kind {
        ExprKind::Int(value) => Ok(Value::Int(*value)),
        ExprKind::Double(value) => Ok(Value::Double(*value)),
        ExprKind::Bool(value) => Ok(Value::Bool(*value)),
        ExprKind::Char(value) => Ok(Value::Char(*value)),
        ExprKind::String(value) => Ok(Value::Str(value.clone())),
        ExprKind::Identifier(name) => ctx.value_of(name, position),
        ExprKind::Arithmetic { op, left, right } => {
            let left = evaluate_expr(ctx, left)?;
            let right = evaluate_expr(ctx, right)?;
            arithmetic(*op, left, right, position)
        }
        ExprKind::Negate(operand) => match evaluate_expr(ctx, operand)? {
            Value::Int(value) => Ok(Value::Int(value.wrapping_neg())),
            Value::Double(value) => Ok(Value::Double(-value)),
            Value::Char(value) => Ok(Value::Int(-(value as u32 as i64))),
            other => Err(invalid_operand("-", &other, position)),
        },
        ExprKind::Relational { op, left, right } => {
            let left = evaluate_expr(ctx, left)?;
            let right = evaluate_expr(ctx, right)?;
            relational(*op, &left, &right, position).map(Value::Bool)
        }
        ExprKind::Logical { op, left, right } => {
            let left = as_bool(evaluate_expr(ctx, left)?, *op, position)?;
            let result = match op {
                LogicalOp::And if !left => false,
                LogicalOp::Or if left => true,
                LogicalOp::Xor => left ^ as_bool(evaluate_expr(ctx, right)?, *op, position)?,
                _ => as_bool(evaluate_expr(ctx, right)?, *op, position)?,
            };
            Ok(Value::Bool(result))
        }
        ExprKind::Not(operand) => match evaluate_expr(ctx, operand)? {
            Value::Bool(value) => Ok(Value::Bool(!value)),
            other => Err(invalid_operand("!", &other, position)),
        },
        ExprKind::Cast { target, expr } => cast(evaluate_expr(ctx, expr)?, *target, position),
        ExprKind::Grouping(inner) => evaluate_expr(ctx, inner),
        ExprKind::Call { name, arguments } => {
            if let Some(builtin) = Builtin::from_name(name) {
                let arguments = evaluate_all(ctx, arguments)?;
                return builtin.call(arguments, position);
            }
            call_function(ctx, name, arguments, position)
        }
        ExprKind::MethodCall {
            receiver,
            method,
            arguments,
        } => {
            let receiver = evaluate_expr(ctx, receiver)?;
            let arguments = evaluate_all(ctx, arguments)?;
            match Method::from_name(method) {
                Some(method) => method.call(&receiver, arguments, position),
                None => Err(Error::new(
                    ErrorImpl::UnknownMethod {
                        method: method.clone(),
                        type_: receiver.type_of().to_string(),
                    },
                    position,
                )),
            }
        }
        ExprKind::Index {
            target,
            index,
            column,
        } => {
            let container = evaluate_expr(ctx, target)?;
            let row = evaluate_index(ctx, index)?;
            let element = element_at(&container, row, position)?;
            match column {
                Some(column) => {
                    let column = evaluate_index(ctx, column)?;
                    match container {
                        Value::Matrix(_) => element_at(&element, column, position),
                        other => Err(Error::new(
                            ErrorImpl::DoubleIndexOnNonMatrix {
                                type_: other.type_of().to_string(),
                            },
                            position,
                        )),
                    }
                }
                None => Ok(element),
            }
        }
        ExprKind::Vector(items) => {
            let values = evaluate_all(ctx, items)?;
            let base = unify_values(&values, position)?;
            Ok(Value::Vector(Sequence::new(base, convert_all(values, base))))
        }
        ExprKind::Matrix(rows) => {
            let rows = evaluate_all(ctx, rows)?;
            let mut base: Option<Scalar> = None;
            for row in &rows {
                let Value::Vector(sequence) = row else {
                    return Err(Error::new(
                        ErrorImpl::MatrixRowNotVector {
                            received: row.type_of().to_string(),
                        },
                        position,
                    ));
                };
                base = Some(match base {
                    None => sequence.base(),
                    Some(current) => unify_scalars(current, sequence.base(), position)?,
                });
            }

            let base = base.ok_or_else(|| Error::new(ErrorImpl::EmptyAggregateLiteral, position))?;
            let rows = rows
                .into_iter()
                .map(|row| match row {
                    Value::Vector(sequence) if sequence.base() != base => {
                        let items = sequence.items().to_vec();
                        Value::Vector(Sequence::new(base, convert_all(items, base)))
                    }
                    row => row,
                })
                .collect();
            Ok(Value::Matrix(Sequence::new(base, rows)))
        }
        ExprKind::NewList(Some(base)) => Ok(Value::List(Sequence::new(*base, vec![]))),
        ExprKind::NewList(None) => Err(Error::new(
            ErrorImpl::NewListOutsideList {
                expected: String::from("an untyped context"),
            },
            position,
        )),
    }
}

/// Evaluates the right-hand side of a declaration or assignment into a
/// slot of type `target`. `new List()` takes its base from the slot.
pub fn evaluate_for(ctx: &mut ExecutionContext, expr: &Expr, target: Type) -> Result<Value, Error> {
    match (&expr.kind, target) {
        (ExprKind::NewList(None), Type::List(base)) => Ok(Value::List(Sequence::new(base, vec![]))),
        (ExprKind::NewList(None), other) => Err(Error::new(
            ErrorImpl::NewListOutsideList {
                expected: other.to_string(),
            },
            expr.span.start,
        )),
        _ => evaluate_expr(ctx, expr),
    }
}

pub fn evaluate_all(ctx: &mut ExecutionContext, exprs: &[Expr]) -> Result<Vec<Value>, Error> {
    exprs.iter().map(|expr| evaluate_expr(ctx, expr)).collect()
}

pub fn evaluate_index(ctx: &mut ExecutionContext, expr: &Expr) -> Result<i64, Error> {
    match evaluate_expr(ctx, expr)? {
        Value::Int(index) => Ok(index),
        other => Err(Error::new(
            ErrorImpl::IndexNotInt {
                received: other.type_of().to_string(),
            },
            expr.span.start,
        )),
    }
}

pub fn evaluate_condition(ctx: &mut ExecutionContext, expr: &Expr, construct: &str) -> Result<bool, Error> {
    match evaluate_expr(ctx, expr)? {
        Value::Bool(value) => Ok(value),
        other => Err(Error::new(
            ErrorImpl::ConditionNotBool {
                construct: construct.to_string(),
                received: other.type_of().to_string(),
            },
            expr.span.start,
        )),
    }
}

/// Element of a vector or list, or a row of a matrix.
pub fn element_at(container: &Value, index: i64, position: Position) -> Result<Value, Error> {
    let Some(sequence) = container.as_sequence() else {
        return Err(Error::new(
            ErrorImpl::NotIndexable {
                type_: container.type_of().to_string(),
            },
            position,
        ));
    };

    usize::try_from(index)
        .ok()
        .and_then(|index| sequence.get(index))
        .ok_or_else(|| out_of_bounds(index, sequence.len(), position))
}

pub fn arithmetic(op: ArithmeticOp, left: Value, right: Value, position: Position) -> Result<Value, Error> {
    if op == ArithmeticOp::Add && (matches!(left, Value::Str(_)) || matches!(right, Value::Str(_))) {
        return Ok(Value::Str(format!("{}{}", left, right)));
    }

    let incompatible = || {
        Error::new(
            ErrorImpl::IncompatibleTypes {
                operator: op.to_string(),
                left: left.type_of().to_string(),
                right: right.type_of().to_string(),
            },
            position,
        )
    };

    let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
        return Err(incompatible());
    };
    let integral = match (left.as_i64(), right.as_i64()) {
        (Some(x), Some(y)) => Some((x, y)),
        _ => None,
    };

    match (op, integral) {
        (ArithmeticOp::Divide, _) => {
            if b.abs() < EPSILON {
                Err(Error::new(ErrorImpl::DivisionByZero, position))
            } else {
                Ok(Value::Double(a / b))
            }
        }
        (ArithmeticOp::Modulo, Some((_, 0))) => Err(Error::new(ErrorImpl::ModuloByZero, position)),
        (ArithmeticOp::Modulo, Some((x, y))) => Ok(Value::Int(x.wrapping_rem(y))),
        (ArithmeticOp::Modulo, None) => Err(incompatible()),
        (ArithmeticOp::Power, Some((x, y))) => Ok(Value::Int(integer_power(x, y))),
        (ArithmeticOp::Power, None) => Ok(Value::Double(a.powf(b))),
        (ArithmeticOp::Add, Some((x, y))) => Ok(Value::Int(x.wrapping_add(y))),
        (ArithmeticOp::Subtract, Some((x, y))) => Ok(Value::Int(x.wrapping_sub(y))),
        (ArithmeticOp::Multiply, Some((x, y))) => Ok(Value::Int(x.wrapping_mul(y))),
        (ArithmeticOp::Add, None) => Ok(Value::Double(a + b)),
        (ArithmeticOp::Subtract, None) => Ok(Value::Double(a - b)),
        (ArithmeticOp::Multiply, None) => Ok(Value::Double(a * b)),
    }
}

fn integer_power(base: i64, exponent: i64) -> i64 {
    if exponent < 0 {
        return (base as f64).powf(exponent as f64) as i64;
    }

    base.wrapping_pow(u32::try_from(exponent).unwrap_or(u32::MAX))
}

pub fn relational(op: RelationalOp, left: &Value, right: &Value, position: Position) -> Result<bool, Error> {
    match op {
        RelationalOp::Equal => return Ok(left.equals(right)),
        RelationalOp::NotEqual => return Ok(!left.equals(right)),
        _ => {}
    }

    let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
        return Err(Error::new(
            ErrorImpl::IncompatibleTypes {
                operator: op.to_string(),
                left: left.type_of().to_string(),
                right: right.type_of().to_string(),
            },
            position,
        ));
    };

    if let (Some(x), Some(y)) = (left.as_i64(), right.as_i64()) {
        return Ok(match op {
            RelationalOp::Less => x < y,
            RelationalOp::LessEqual => x <= y,
            RelationalOp::Greater => x > y,
            _ => x >= y,
        });
    }

    Ok(match op {
        RelationalOp::Less => a < b,
        RelationalOp::LessEqual => a <= b,
        RelationalOp::Greater => a > b,
        _ => a >= b,
    })
}

pub fn cast(value: Value, target: Type, position: Position) -> Result<Value, Error> {
    let invalid = |from: Type| {
        Error::new(
            ErrorImpl::InvalidCast {
                from: from.to_string(),
                to: target.to_string(),
            },
            position,
        )
    };

    match (value, target) {
        (value, target) if value.type_of() == target => Ok(value),
        (Value::Int(x), Type::Double) => Ok(Value::Double(x as f64)),
        (Value::Double(x), Type::Int) => Ok(Value::Int(x as i64)),
        (Value::Int(x), Type::Char) => u32::try_from(x)
            .ok()
            .and_then(char::from_u32)
            .map(Value::Char)
            .ok_or_else(|| invalid(Type::Int)),
        (Value::Char(c), Type::Int) => Ok(Value::Int(c as u32 as i64)),
        (Value::Char(c), Type::Double) => Ok(Value::Double(c as u32 as f64)),
        (Value::Int(x), Type::String) => Ok(Value::Str(x.to_string())),
        (Value::Double(x), Type::String) => Ok(Value::Str(format_double(x))),
        (value, _) => Err(invalid(value.type_of())),
    }
}

fn as_bool(value: Value, op: LogicalOp, position: Position) -> Result<bool, Error> {
    value
        .as_bool()
        .ok_or_else(|| invalid_operand(&op.to_string(), &value, position))
}

fn invalid_operand(operator: &str, value: &Value, position: Position) -> Error {
    Error::new(
        ErrorImpl::InvalidOperand {
            operator: operator.to_string(),
            operand: value.type_of().to_string(),
        },
        position,
    )
}

fn unify_scalars(a: Scalar, b: Scalar, position: Position) -> Result<Scalar, Error> {
    a.as_type()
        .unify(b.as_type())
        .and_then(Type::as_scalar)
        .ok_or_else(|| {
            Error::new(
                ErrorImpl::IncompatibleElementTypes {
                    first: a.to_string(),
                    second: b.to_string(),
                },
                position,
            )
        })
}

fn unify_values(values: &[Value], position: Position) -> Result<Scalar, Error> {
    let mut base: Option<Scalar> = None;
    for value in values {
        let Some(scalar) = value.type_of().as_scalar() else {
            return Err(Error::new(
                ErrorImpl::IncompatibleElementTypes {
                    first: base.map_or_else(|| String::from("?"), |base| base.to_string()),
                    second: value.type_of().to_string(),
                },
                position,
            ));
        };
        base = Some(match base {
            None => scalar,
            Some(current) => unify_scalars(current, scalar, position)?,
        });
    }

    base.ok_or_else(|| Error::new(ErrorImpl::EmptyAggregateLiteral, position))
}

fn convert_all(values: Vec<Value>, base: Scalar) -> Vec<Value> {
    values
        .into_iter()
        .map(|value| {
            let fallback = value.clone();
            value.coerce_to(base.as_type()).unwrap_or(fallback)
        })
        .collect()
}
