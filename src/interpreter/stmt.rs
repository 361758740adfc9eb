use crate::{
    ast::{
        expressions::ExprKind,
        statements::{Block, Case, Stmt, StmtKind},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    symbols::symbol::SymbolCategory,
    Position,
};

use super::{
    builtins::out_of_bounds,
    context::{Construct, ExecutionContext, Signal},
    expr::{element_at, evaluate_condition, evaluate_expr, evaluate_for, evaluate_index},
    interpreter::call_function,
    value::Value,
};

/// Runs one statement. At top level a runtime error abandons the
/// statement, is recorded, and execution continues with the next one.
/// Inside a call it fails the call instead.
pub fn execute_stmt(ctx: &mut ExecutionContext, stmt: &Stmt) {
    if let Err(error) = run_stmt(ctx, stmt) {
        if ctx.in_call() {
            ctx.fail(error);
        } else {
            ctx.report(error);
        }
    }
}

/// Runs statements in order, stopping as soon as a signal is pending.
pub fn execute_statements(ctx: &mut ExecutionContext, statements: &[Stmt]) {
    for stmt in statements {
        execute_stmt(ctx, stmt);
        if ctx.signal_active() {
            break;
        }
    }
}

pub fn execute_block(ctx: &mut ExecutionContext, block: &Block) {
    ctx.with_scope(|ctx| execute_statements(ctx, &block.body));
}

fn run_stmt(ctx: &mut ExecutionContext, stmt: &Stmt) -> Result<(), Error> {
    let position = stmt.position();

    match &stmt.kind {
        StmtKind::VarDecl {
            name,
            ty,
            initializer,
        } => {
            let category = SymbolCategory::for_declaration(*ty);
            let value = match initializer {
                Some(initializer) => {
                    match evaluate_for(ctx, initializer, *ty)
                        .and_then(|value| convert(value, *ty, name, position))
                    {
                        Ok(value) => Some(value),
                        // The name stays bound, holding its default.
                        Err(error) => {
                            return ctx
                                .declare(name, *ty, category, position, None)
                                .and(Err(error));
                        }
                    }
                }
                None => None,
            };
            ctx.declare(name, *ty, category, position, value)
        }
        StmtKind::Assign { name, value } => {
            let target = ctx.type_of(name, position)?;
            let value = evaluate_for(ctx, value, target)?;
            ctx.assign(name, value, position)
        }
        StmtKind::IndexAssign {
            target,
            index,
            column,
            value,
        } => {
            let container = evaluate_expr(ctx, target)?;
            let row = evaluate_index(ctx, index)?;
            let column = match column {
                Some(column) => Some(evaluate_index(ctx, column)?),
                None => None,
            };
            let value = evaluate_expr(ctx, value)?;
            store_element(&container, row, column, value, &target.to_string(), position)
        }
        StmtKind::IncDec { target, increment } => {
            let delta = if *increment { 1 } else { -1 };
            match &target.kind {
                ExprKind::Identifier(name) => {
                    let value = step(ctx.value_of(name, position)?, delta, position)?;
                    ctx.assign(name, value, position)
                }
                ExprKind::Index {
                    target: container,
                    index,
                    column,
                } => {
                    let container = evaluate_expr(ctx, container)?;
                    let row = evaluate_index(ctx, index)?;
                    let column = match column {
                        Some(column) => Some(evaluate_index(ctx, column)?),
                        None => None,
                    };
                    let mut current = element_at(&container, row, position)?;
                    if let Some(column) = column {
                        current = element_at(&current, column, position)?;
                    }
                    let value = step(current, delta, position)?;
                    store_element(&container, row, column, value, &target.to_string(), position)
                }
                _ => Err(Error::new(
                    ErrorImpl::IncDecNonNumeric {
                        received: target.to_string(),
                    },
                    position,
                )),
            }
        }
        StmtKind::Block(block) => {
            execute_block(ctx, block);
            Ok(())
        }
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            if evaluate_condition(ctx, condition, "if")? {
                execute_block(ctx, then_branch);
            } else if let Some(else_branch) = else_branch {
                execute_stmt(ctx, else_branch);
            }
            Ok(())
        }
        StmtKind::Switch {
            scrutinee,
            cases,
            default,
        } => {
            let value = evaluate_expr(ctx, scrutinee)?;
            let label = format!("switch({})", scrutinee);
            ctx.with_labelled_scope(label, |ctx| {
                ctx.with_construct(Construct::Switch, |ctx| {
                    run_switch(ctx, &value, cases, default.as_deref())
                })
            })
        }
        StmtKind::While { condition, body } => {
            let label = format!("while({})", condition);
            ctx.with_labelled_scope(label, |ctx| {
                ctx.with_construct(Construct::Loop, |ctx| -> Result<(), Error> {
                    while evaluate_condition(ctx, condition, "while")? {
                        execute_block(ctx, body);
                        if !continue_looping(ctx) {
                            break;
                        }
                    }
                    Ok(())
                })
            })
        }
        StmtKind::DoWhile { body, condition } => {
            let label = format!("do-while({})", condition);
            ctx.with_labelled_scope(label, |ctx| {
                ctx.with_construct(Construct::Loop, |ctx| -> Result<(), Error> {
                    loop {
                        execute_block(ctx, body);
                        if !continue_looping(ctx) || !evaluate_condition(ctx, condition, "do-while")? {
                            break;
                        }
                    }
                    Ok(())
                })
            })
        }
        StmtKind::For {
            init,
            condition,
            update,
            body,
        } => {
            let label = match condition {
                Some(condition) => format!("for({})", condition),
                None => String::from("for()"),
            };
            ctx.with_labelled_scope(label, |ctx| -> Result<(), Error> {
                if let Some(init) = init {
                    run_stmt(ctx, init)?;
                }
                ctx.with_construct(Construct::Loop, |ctx| -> Result<(), Error> {
                    loop {
                        if let Some(condition) = condition {
                            if !evaluate_condition(ctx, condition, "for")? {
                                break;
                            }
                        }
                        execute_block(ctx, body);
                        if !continue_looping(ctx) {
                            break;
                        }
                        if let Some(update) = update {
                            run_stmt(ctx, update)?;
                        }
                    }
                    Ok(())
                })
            })
        }
        StmtKind::Break => {
            ctx.request_break();
            Ok(())
        }
        StmtKind::Continue => {
            ctx.request_continue();
            Ok(())
        }
        StmtKind::Print(expr) => {
            let value = evaluate_expr(ctx, expr)?;
            ctx.write_line(&value.to_string());
            Ok(())
        }
        // Registered before the program runs.
        StmtKind::FnDecl(_) => Ok(()),
        StmtKind::Return(value) => {
            let value = match value {
                Some(value) => evaluate_expr(ctx, value)?,
                None => Value::Void,
            };
            ctx.activate_return(value);
            Ok(())
        }
        StmtKind::Start { name, arguments } => {
            call_function(ctx, name, arguments, position)?;
            Ok(())
        }
        StmtKind::Expression(expr) => {
            evaluate_expr(ctx, expr)?;
            Ok(())
        }
    }
}

/// Fallthrough switch: the first matching case starts execution, later
/// cases and then the default run until a `break`.
fn run_switch(
    ctx: &mut ExecutionContext,
    value: &Value,
    cases: &[Case],
    default: Option<&[Stmt]>,
) -> Result<(), Error> {
    let mut matched = false;

    for case in cases {
        if !matched {
            let case_value = evaluate_expr(ctx, &case.value)?;
            matched = value.equals(&case_value);
        }

        if matched {
            execute_statements(ctx, &case.body);
            if ctx.consume(&Signal::BreakSwitch) || ctx.signal_active() {
                return Ok(());
            }
        }
    }

    if let Some(default) = default {
        execute_statements(ctx, default);
        ctx.consume(&Signal::BreakSwitch);
    }

    Ok(())
}

/// Handles the signal left by one loop iteration. Returns false when the
/// loop has to stop, leaving any `return` pending for the caller.
fn continue_looping(ctx: &mut ExecutionContext) -> bool {
    if ctx.consume(&Signal::BreakLoop) {
        return false;
    }
    ctx.consume(&Signal::ContinueLoop);
    !ctx.signal_active()
}

fn convert(value: Value, ty: Type, name: &str, position: Position) -> Result<Value, Error> {
    let received = value.type_of();
    value.coerce_to(ty).ok_or_else(|| {
        Error::new(
            ErrorImpl::RuntimeTypeMismatch {
                identifier: name.to_string(),
                expected: ty.to_string(),
                received: received.to_string(),
            },
            position,
        )
    })
}

fn step(value: Value, delta: i64, position: Position) -> Result<Value, Error> {
    match value {
        Value::Int(value) => Ok(Value::Int(value.wrapping_add(delta))),
        Value::Double(value) => Ok(Value::Double(value + delta as f64)),
        Value::Char(value) => u32::try_from(value as i64 + delta)
            .ok()
            .and_then(char::from_u32)
            .map(Value::Char)
            .ok_or_else(|| {
                Error::new(
                    ErrorImpl::InvalidOperand {
                        operator: String::from(if delta > 0 { "++" } else { "--" }),
                        operand: Type::Char.to_string(),
                    },
                    position,
                )
            }),
        other => Err(Error::new(
            ErrorImpl::IncDecNonNumeric {
                received: other.type_of().to_string(),
            },
            position,
        )),
    }
}

/// Writes into `container[row]` or `container[row][column]`. A single index
/// on a matrix replaces a whole row.
fn store_element(
    container: &Value,
    row: i64,
    column: Option<i64>,
    value: Value,
    target: &str,
    position: Position,
) -> Result<(), Error> {
    let (sequence, index, slot_type) = match (container, column) {
        (Value::Vector(sequence) | Value::List(sequence), None) => {
            (sequence.clone(), row, sequence.base().as_type())
        }
        (Value::Matrix(matrix), None) => (matrix.clone(), row, Type::Vector(matrix.base())),
        (Value::Matrix(matrix), Some(column)) => match element_at(container, row, position)? {
            Value::Vector(row) => (row, column, matrix.base().as_type()),
            other => {
                return Err(Error::new(
                    ErrorImpl::NotIndexable {
                        type_: other.type_of().to_string(),
                    },
                    position,
                ))
            }
        },
        (other, Some(_)) if other.as_sequence().is_some() => {
            return Err(Error::new(
                ErrorImpl::DoubleIndexOnNonMatrix {
                    type_: other.type_of().to_string(),
                },
                position,
            ))
        }
        (other, _) => {
            return Err(Error::new(
                ErrorImpl::NotIndexable {
                    type_: other.type_of().to_string(),
                },
                position,
            ))
        }
    };

    let value = convert(value, slot_type, target, position)?;
    let length = sequence.len();
    let stored = usize::try_from(index)
        .map(|index| sequence.set(index, value))
        .unwrap_or(false);

    if stored {
        Ok(())
    } else {
        Err(out_of_bounds(index, length, position))
    }
}
