use std::{collections::HashMap, mem, rc::Rc};

use tracing::debug;

use crate::{
    ast::{
        ast::Program,
        expressions::{Expr, ExprKind},
        statements::{Block, FnDecl, Stmt, StmtKind},
        types::Type,
    },
    errors::errors::{Diagnostics, Error, ErrorImpl},
    interpreter::{builtins::Builtin, value::Value},
    symbols::{
        scope::ScopeStack,
        symbol::{normalize, Symbol, SymbolCategory},
        table::{SymbolRow, SymbolTable},
    },
    Position,
};

use super::expr::{check_call, check_expr, check_expr_for, element_type};

/// Result of analysis: the reporting symbol table and every diagnostic.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub symbols: SymbolTable,
    pub diagnostics: Diagnostics,
}

impl Analysis {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

pub struct TypeChecker {
    pub scopes: ScopeStack,
    pub symbols: SymbolTable,
    pub diagnostics: Diagnostics,
    functions: HashMap<String, Rc<FnDecl>>,
    pending_bodies: Vec<Rc<FnDecl>>,
    declared_functions: usize,
    current_function: Option<Rc<FnDecl>>,
    return_found: bool,
    entry_points: usize,
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeChecker {
    pub fn new() -> Self {
        TypeChecker {
            scopes: ScopeStack::new(),
            symbols: SymbolTable::new(),
            diagnostics: Diagnostics::new(),
            functions: HashMap::new(),
            pending_bodies: vec![],
            declared_functions: 0,
            current_function: None,
            return_found: false,
            entry_points: 0,
        }
    }

    pub fn report(&mut self, error_impl: ErrorImpl, position: Position) {
        self.diagnostics.push(Error::new(error_impl, position));
    }

    pub fn function(&self, name: &str) -> Option<Rc<FnDecl>> {
        self.functions.get(&normalize(name)).cloned()
    }

    pub fn with_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scopes.push_scope();
        let result = f(self);
        self.scopes.pop_scope();
        result
    }

    pub fn with_labelled_scope<R>(&mut self, label: String, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scopes.push_label(label);
        let result = self.with_scope(f);
        self.scopes.pop_label();
        result
    }

    /// Declares a symbol in the innermost scope and lists it in the
    /// reporting table. A duplicate is reported and not listed.
    pub fn declare(&mut self, name: &str, ty: Type, category: SymbolCategory, position: Position) {
        let symbol = Symbol::new(name, ty, category, position, self.scopes.scope_path());
        let mut row = SymbolRow::from(&symbol);
        row.value = None;

        match self.scopes.declare(symbol) {
            Ok(()) => {
                self.symbols.record(row);
            }
            Err(error) => self.diagnostics.push(error),
        }
    }

    pub fn lookup(&mut self, name: &str, position: Position) -> Type {
        match self.scopes.lookup(name, position) {
            Ok(symbol) => symbol.ty,
            Err(error) => {
                self.diagnostics.push(error);
                Type::Error
            }
        }
    }
}

/// Type-checks a program without running it.
///
/// Function bodies are checked at the first top-level statement that can
/// run user code, against the globals declared up to that point, since
/// those are all a body can see when it first runs.
#[tracing::instrument(level = "debug", skip_all, fields(statements = program.body.len()))]
pub fn analyze(program: &Program) -> Analysis {
    let mut checker = TypeChecker::new();

    collect_signatures(&mut checker, program);
    debug!(functions = checker.functions.len(), "signature collection complete");

    for stmt in &program.body {
        if runs_user_code(stmt) {
            check_pending_bodies(&mut checker);
        }
        check_stmt(&mut checker, stmt);
    }
    check_pending_bodies(&mut checker);

    if checker.declared_functions > 0 || checker.entry_points > 1 {
        match checker.entry_points {
            1 => {}
            0 => checker.report(ErrorImpl::MissingEntryPoint, Position::null()),
            count => checker.report(ErrorImpl::MultipleEntryPoints { count }, Position::null()),
        }
    }
    debug!(diagnostics = checker.diagnostics.len(), "body checking complete");

    Analysis {
        symbols: checker.symbols,
        diagnostics: checker.diagnostics,
    }
}

fn collect_signatures(checker: &mut TypeChecker, program: &Program) {
    for declaration in program.functions() {
        checker.declared_functions += 1;
        checker.pending_bodies.push(Rc::clone(declaration));
        let position = declaration.span.start;

        if Builtin::from_name(&declaration.name).is_some() {
            checker.report(
                ErrorImpl::ReservedFunctionName {
                    function: declaration.name.clone(),
                },
                position,
            );
            continue;
        }

        let key = normalize(&declaration.name);
        if checker.functions.contains_key(&key) {
            checker.report(
                ErrorImpl::FunctionAlreadyDeclared {
                    function: declaration.name.clone(),
                },
                position,
            );
            continue;
        }

        let category = if declaration.is_procedure() {
            SymbolCategory::Procedure
        } else {
            SymbolCategory::Function
        };
        checker.symbols.record(SymbolRow {
            name: declaration.name.clone(),
            ty: declaration.return_type,
            category,
            scope: checker.scopes.scope_path(),
            position,
            value: Some(Value::Str(declaration.signature())),
            holds_default: false,
        });
        checker.functions.insert(key, Rc::clone(declaration));
    }
}

pub fn check_block(checker: &mut TypeChecker, block: &Block) {
    checker.with_scope(|checker| check_statements(checker, &block.body));
}

fn check_statements(checker: &mut TypeChecker, statements: &[Stmt]) {
    for stmt in statements {
        check_stmt(checker, stmt);
    }
}

pub fn check_stmt(checker: &mut TypeChecker, stmt: &Stmt) {
    let position = stmt.position();

    match &stmt.kind {
        StmtKind::VarDecl {
            name,
            ty,
            initializer,
        } => {
            if let Some(initializer) = initializer {
                let received = check_expr_for(checker, initializer, *ty);
                expect_assignable(checker, name, *ty, received, initializer);
            }
            checker.declare(name, *ty, SymbolCategory::for_declaration(*ty), position);
        }
        StmtKind::Assign { name, value } => {
            let expected = checker.lookup(name, position);
            if expected.is_error() {
                check_expr(checker, value);
                return;
            }
            let received = check_expr_for(checker, value, expected);
            expect_assignable(checker, name, expected, received, value);
        }
        StmtKind::IndexAssign {
            target,
            index,
            column,
            value,
        } => {
            let container = check_expr(checker, target);
            let expected = element_type(checker, container, index, column.as_ref(), position);
            let received = check_expr(checker, value);
            expect_assignable(checker, &target.to_string(), expected, received, value);
        }
        StmtKind::IncDec { target, .. } => {
            let ty = check_expr(checker, target);
            if !ty.is_error() && !ty.is_numeric() {
                checker.report(
                    ErrorImpl::IncDecNonNumeric {
                        received: ty.to_string(),
                    },
                    position,
                );
            }
        }
        StmtKind::Block(block) => check_block(checker, block),
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            check_condition(checker, condition, "if");
            check_block(checker, then_branch);
            if let Some(else_branch) = else_branch {
                check_stmt(checker, else_branch);
            }
        }
        StmtKind::Switch {
            scrutinee,
            cases,
            default,
        } => {
            let scrutinee_type = check_expr(checker, scrutinee);
            let label = format!("switch({})", scrutinee);
            checker.with_labelled_scope(label, |checker| {
                for case in cases {
                    let case_type = check_expr(checker, &case.value);
                    let comparable = case_type == scrutinee_type
                        || (case_type.is_numeric() && scrutinee_type.is_numeric());
                    if !comparable && !case_type.is_error() && !scrutinee_type.is_error() {
                        checker.report(
                            ErrorImpl::IncompatibleTypes {
                                operator: String::from("case"),
                                left: scrutinee_type.to_string(),
                                right: case_type.to_string(),
                            },
                            case.value.span.start,
                        );
                    }
                    check_statements(checker, &case.body);
                }
                if let Some(default) = default {
                    check_statements(checker, default);
                }
            });
        }
        StmtKind::While { condition, body } => {
            let label = format!("while({})", condition);
            checker.with_labelled_scope(label, |checker| {
                check_condition(checker, condition, "while");
                check_block(checker, body);
            });
        }
        StmtKind::DoWhile { body, condition } => {
            let label = format!("do-while({})", condition);
            checker.with_labelled_scope(label, |checker| {
                check_block(checker, body);
                check_condition(checker, condition, "do-while");
            });
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
            checker.with_labelled_scope(label, |checker| {
                if let Some(init) = init {
                    check_stmt(checker, init);
                }
                if let Some(condition) = condition {
                    check_condition(checker, condition, "for");
                }
                if let Some(update) = update {
                    check_stmt(checker, update);
                }
                check_block(checker, body);
            });
        }
        StmtKind::Break | StmtKind::Continue => {}
        StmtKind::Print(expr) | StmtKind::Expression(expr) => {
            check_expr(checker, expr);
        }
        StmtKind::FnDecl(declaration) => {
            // Top-level bodies are queued by `collect_signatures`.
            if !checker.scopes.at_global() || checker.current_function.is_some() {
                checker.report(
                    ErrorImpl::NestedFunctionDeclaration {
                        function: declaration.name.clone(),
                    },
                    position,
                );
            }
        }
        StmtKind::Return(value) => check_return(checker, value.as_ref(), position),
        StmtKind::Start { name, arguments } => {
            checker.entry_points += 1;
            check_call(checker, name, arguments, position);
        }
    }
}

fn check_pending_bodies(checker: &mut TypeChecker) {
    for declaration in mem::take(&mut checker.pending_bodies) {
        check_function(checker, &declaration);
    }
}

/// Whether running `stmt` at top level can enter a user function.
fn runs_user_code(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Start { .. } => true,
        StmtKind::FnDecl(_) | StmtKind::Break | StmtKind::Continue => false,
        StmtKind::VarDecl { initializer, .. } => initializer.as_ref().is_some_and(calls_user_code),
        StmtKind::Assign { value, .. } => calls_user_code(value),
        StmtKind::IndexAssign {
            target,
            index,
            column,
            value,
        } => [target, index, value]
            .into_iter()
            .chain(column.iter())
            .any(calls_user_code),
        StmtKind::IncDec { target, .. } => calls_user_code(target),
        StmtKind::Block(block) => block.body.iter().any(runs_user_code),
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            calls_user_code(condition)
                || then_branch.body.iter().any(runs_user_code)
                || else_branch.as_deref().is_some_and(runs_user_code)
        }
        StmtKind::Switch {
            scrutinee,
            cases,
            default,
        } => {
            calls_user_code(scrutinee)
                || cases
                    .iter()
                    .any(|case| calls_user_code(&case.value) || case.body.iter().any(runs_user_code))
                || default.iter().flatten().any(runs_user_code)
        }
        StmtKind::While { condition, body } | StmtKind::DoWhile { body, condition } => {
            calls_user_code(condition) || body.body.iter().any(runs_user_code)
        }
        StmtKind::For {
            init,
            condition,
            update,
            body,
        } => {
            init.as_deref().is_some_and(runs_user_code)
                || condition.as_ref().is_some_and(calls_user_code)
                || update.as_deref().is_some_and(runs_user_code)
                || body.body.iter().any(runs_user_code)
        }
        StmtKind::Return(value) => value.as_ref().is_some_and(calls_user_code),
        StmtKind::Print(expr) | StmtKind::Expression(expr) => calls_user_code(expr),
    }
}

fn calls_user_code(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Call { name, arguments } => {
            Builtin::from_name(name).is_none() || arguments.iter().any(calls_user_code)
        }
        ExprKind::MethodCall {
            receiver,
            arguments,
            ..
        } => calls_user_code(receiver) || arguments.iter().any(calls_user_code),
        ExprKind::Arithmetic { left, right, .. }
        | ExprKind::Relational { left, right, .. }
        | ExprKind::Logical { left, right, .. } => calls_user_code(left) || calls_user_code(right),
        ExprKind::Negate(inner)
        | ExprKind::Not(inner)
        | ExprKind::Grouping(inner)
        | ExprKind::Cast { expr: inner, .. } => calls_user_code(inner),
        ExprKind::Index {
            target,
            index,
            column,
        } => calls_user_code(target) || calls_user_code(index) || column.as_deref().is_some_and(calls_user_code),
        ExprKind::Vector(items) | ExprKind::Matrix(items) => items.iter().any(calls_user_code),
        ExprKind::Int(_)
        | ExprKind::Double(_)
        | ExprKind::Bool(_)
        | ExprKind::Char(_)
        | ExprKind::String(_)
        | ExprKind::Identifier(_)
        | ExprKind::NewList(_) => false,
    }
}

fn check_function(checker: &mut TypeChecker, declaration: &Rc<FnDecl>) {
    let label = format!("func({})", declaration.name);
    checker.with_labelled_scope(label, |checker| {
        let previous_function = checker.current_function.replace(Rc::clone(declaration));
        let previous_return = mem::replace(&mut checker.return_found, false);

        for parameter in &declaration.parameters {
            if checker.scopes.is_declared_locally(&parameter.name) {
                checker.report(
                    ErrorImpl::DuplicateParameter {
                        parameter: parameter.name.clone(),
                        function: declaration.name.clone(),
                    },
                    parameter.position,
                );
                continue;
            }
            checker.declare(
                &parameter.name,
                parameter.ty,
                SymbolCategory::Parameter,
                parameter.position,
            );
        }

        check_statements(checker, &declaration.body.body);

        if !declaration.is_procedure() && !checker.return_found {
            checker.report(
                ErrorImpl::MissingReturn {
                    function: declaration.name.clone(),
                },
                declaration.span.start,
            );
        }

        checker.current_function = previous_function;
        checker.return_found = previous_return;
    });
}

fn check_return(checker: &mut TypeChecker, value: Option<&Expr>, position: Position) {
    let received = value.map(|value| check_expr(checker, value));

    let Some(function) = checker.current_function.clone() else {
        checker.report(ErrorImpl::ReturnOutsideFunction, position);
        return;
    };

    match received {
        Some(_) if function.is_procedure() => checker.report(
            ErrorImpl::VoidReturnsValue {
                function: function.name.clone(),
            },
            position,
        ),
        None if !function.is_procedure() => checker.report(
            ErrorImpl::MissingReturnValue {
                function: function.name.clone(),
            },
            position,
        ),
        Some(received) => {
            checker.return_found = true;
            if !received.is_error() && !function.return_type.is_assignable_from(received) {
                checker.report(
                    ErrorImpl::ReturnTypeMismatch {
                        function: function.name.clone(),
                        expected: function.return_type.to_string(),
                        received: received.to_string(),
                    },
                    position,
                );
            }
        }
        None => {}
    }
}

fn check_condition(checker: &mut TypeChecker, condition: &Expr, construct: &str) {
    let ty = check_expr(checker, condition);
    if !ty.is_error() && ty != Type::Bool {
        checker.report(
            ErrorImpl::ConditionNotBool {
                construct: construct.to_string(),
                received: ty.to_string(),
            },
            condition.span.start,
        );
    }
}

fn expect_assignable(checker: &mut TypeChecker, name: &str, expected: Type, received: Type, value: &Expr) {
    if expected.is_error() || received.is_error() || expected.is_assignable_from(received) {
        return;
    }

    checker.report(
        ErrorImpl::TypeMatchError {
            identifier: name.to_string(),
            expected: expected.to_string(),
            received: received.to_string(),
        },
        value.span.start,
    );
}
