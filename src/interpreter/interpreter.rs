use tracing::debug;

use crate::{
    ast::{ast::Program, expressions::Expr, statements::StmtKind},
    config::InterpreterConfig,
    errors::errors::{Diagnostics, Error, ErrorImpl},
    symbols::{symbol::SymbolCategory, table::SymbolTable},
    Position,
};

use super::{
    builtins::check_arity,
    context::{ExecutionContext, Signal},
    expr::evaluate_all,
    output::OutputSink,
    stack::ensure_sufficient_stack,
    stmt::{execute_statements, execute_stmt},
    value::Value,
};

/// Result of running a program: the execution symbol table and any
/// runtime diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Execution {
    pub symbols: SymbolTable,
    pub diagnostics: Diagnostics,
}

/// Runs a program that passed analysis, writing `println` output to
/// `output`.
pub fn execute(program: &Program, output: &mut dyn OutputSink) -> Execution {
    execute_with_config(program, output, InterpreterConfig::default())
}

#[tracing::instrument(level = "debug", skip_all, fields(statements = program.body.len()))]
pub fn execute_with_config(
    program: &Program,
    output: &mut dyn OutputSink,
    config: InterpreterConfig,
) -> Execution {
    let mut ctx = ExecutionContext::new(output, config);

    for declaration in program.functions() {
        if !ctx.register_function(declaration.clone()) {
            ctx.report(Error::new(
                ErrorImpl::FunctionAlreadyDeclared {
                    function: declaration.name.clone(),
                },
                declaration.span.start,
            ));
        }
    }
    debug!("function registration complete");

    for stmt in &program.body {
        if let StmtKind::FnDecl(_) = stmt.kind {
            continue;
        }

        execute_stmt(&mut ctx, stmt);
        if let Some(signal) = ctx.take_signal() {
            ctx.report(unconsumed(&signal, stmt.position()));
            break;
        }
    }
    debug!(diagnostics = ctx.diagnostics.len(), "execution complete");

    Execution {
        symbols: ctx.symbols,
        diagnostics: ctx.diagnostics,
    }
}

/// Calls a user function. Arguments are evaluated in the caller's scope,
/// then bound as parameters in a fresh frame. A runtime error in the body
/// ends the call and is returned to the caller.
#[tracing::instrument(level = "debug", skip(ctx, arguments, position))]
pub fn call_function(
    ctx: &mut ExecutionContext,
    name: &str,
    arguments: &[Expr],
    position: Position,
) -> Result<Value, Error> {
    let Some(declaration) = ctx.function(name) else {
        return Err(Error::new(
            ErrorImpl::UndeclaredFunction {
                function: name.to_string(),
            },
            position,
        ));
    };

    check_arity(
        &declaration.name,
        declaration.parameters.len(),
        arguments.len(),
        position,
    )?;

    let values = evaluate_all(ctx, arguments)?;
    let mut bound = Vec::with_capacity(values.len());
    for (index, (parameter, value)) in declaration.parameters.iter().zip(values).enumerate() {
        let received = value.type_of();
        let Some(value) = value.coerce_to(parameter.ty) else {
            return Err(Error::new(
                ErrorImpl::ArgumentTypeMatchError {
                    function: declaration.name.clone(),
                    index: index + 1,
                    expected: parameter.ty.to_string(),
                    received: received.to_string(),
                },
                arguments[index].span.start,
            ));
        };
        bound.push(value);
    }

    let returned = ensure_sufficient_stack(|| {
        ctx.with_call(&declaration.name, position, |ctx| {
            for (parameter, value) in declaration.parameters.iter().zip(bound) {
                ctx.declare(
                    &parameter.name,
                    parameter.ty,
                    SymbolCategory::Parameter,
                    parameter.position,
                    Some(value),
                )?;
            }

            execute_statements(ctx, &declaration.body.body);

            // The first failure in the body fails the whole call.
            if let Some(error) = ctx.take_failure() {
                return Err(error);
            }

            let returned = ctx.take_return_and_clear();
            if let Some(signal) = ctx.take_signal() {
                ctx.report(unconsumed(&signal, declaration.span.start));
            }
            Ok(returned.unwrap_or(Value::Void))
        })
    })?;

    if declaration.is_procedure() {
        return Ok(Value::Void);
    }

    let received = returned.type_of();
    returned.coerce_to(declaration.return_type).ok_or_else(|| {
        Error::new(
            ErrorImpl::RuntimeTypeMismatch {
                identifier: declaration.name.clone(),
                expected: declaration.return_type.to_string(),
                received: received.to_string(),
            },
            position,
        )
    })
}

fn unconsumed(signal: &Signal, position: Position) -> Error {
    let signal = match signal {
        Signal::BreakLoop | Signal::BreakSwitch => "Break",
        Signal::ContinueLoop => "Continue",
        Signal::Return(_) => "Return",
    };

    Error::new(
        ErrorImpl::UnconsumedControlSignal {
            signal: signal.to_string(),
        },
        position,
    )
}
