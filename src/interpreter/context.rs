use std::{collections::HashMap, mem, rc::Rc};

use tracing::trace;

use crate::{
    ast::{statements::FnDecl, types::Type},
    config::InterpreterConfig,
    errors::errors::{Diagnostics, Error, ErrorImpl},
    symbols::{
        scope::ScopeStack,
        symbol::{normalize, Symbol, SymbolCategory},
        table::{SymbolRow, SymbolTable},
    },
    Position,
};

use super::{output::OutputSink, value::Value};

/// A pending jump, consumed by the nearest construct that owns it.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    BreakLoop,
    BreakSwitch,
    ContinueLoop,
    Return(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    Loop,
    Switch,
}

/// State of one program run. Every evaluation function takes it
/// explicitly; nothing is kept between runs.
pub struct ExecutionContext<'a> {
    pub scopes: ScopeStack,
    pub symbols: SymbolTable,
    pub diagnostics: Diagnostics,
    functions: HashMap<String, Rc<FnDecl>>,
    signal: Option<Signal>,
    failure: Option<Error>,
    constructs: Vec<Construct>,
    call_depth: usize,
    config: InterpreterConfig,
    output: &'a mut dyn OutputSink,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(output: &'a mut dyn OutputSink, config: InterpreterConfig) -> Self {
        ExecutionContext {
            scopes: ScopeStack::new(),
            symbols: SymbolTable::new(),
            diagnostics: Diagnostics::new(),
            functions: HashMap::new(),
            signal: None,
            failure: None,
            constructs: vec![],
            call_depth: 0,
            config,
            output,
        }
    }

    pub fn report(&mut self, error: Error) {
        self.diagnostics.push(error);
    }

    pub fn write_line(&mut self, line: &str) {
        self.output.write_line(line);
    }

    // Functions

    /// Registers a declaration. Returns false when the name is taken.
    pub fn register_function(&mut self, declaration: Rc<FnDecl>) -> bool {
        let key = normalize(&declaration.name);
        if self.functions.contains_key(&key) {
            return false;
        }

        let category = if declaration.is_procedure() {
            SymbolCategory::Procedure
        } else {
            SymbolCategory::Function
        };
        self.symbols.record(SymbolRow {
            name: declaration.name.clone(),
            ty: declaration.return_type,
            category,
            scope: self.scopes.scope_path(),
            position: declaration.span.start,
            value: Some(Value::Str(declaration.signature())),
            holds_default: false,
        });
        self.functions.insert(key, declaration);
        true
    }

    pub fn function(&self, name: &str) -> Option<Rc<FnDecl>> {
        self.functions.get(&normalize(name)).cloned()
    }

    // Scopes

    /// Runs `f` inside a fresh block scope, popping it on every exit path.
    pub fn with_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scopes.push_scope();
        let result = f(self);
        self.scopes.pop_scope();
        result
    }

    /// Like [`ExecutionContext::with_scope`], also naming the scope in the
    /// scope path.
    pub fn with_labelled_scope<R>(&mut self, label: String, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scopes.push_label(label);
        let result = self.with_scope(f);
        self.scopes.pop_label();
        result
    }

    /// Runs `f` as the body of a loop or switch, so `break` knows its target.
    pub fn with_construct<R>(&mut self, construct: Construct, f: impl FnOnce(&mut Self) -> R) -> R {
        self.constructs.push(construct);
        let result = f(self);
        self.constructs.pop();
        result
    }

    /// Runs a call body in its own frame. Only globals stay visible to the
    /// callee, and the caller's loops and switches are hidden from it.
    pub fn with_call<R>(
        &mut self,
        name: &str,
        position: Position,
        f: impl FnOnce(&mut Self) -> Result<R, Error>,
    ) -> Result<R, Error> {
        if self.call_depth >= self.config.max_call_depth {
            return Err(Error::new(
                ErrorImpl::CallDepthExceeded {
                    limit: self.config.max_call_depth,
                },
                position,
            ));
        }

        let detached = self.scopes.detach();
        let constructs = mem::take(&mut self.constructs);
        self.call_depth += 1;

        let result = self.with_labelled_scope(format!("func({})", name), f);

        self.call_depth -= 1;
        self.constructs = constructs;
        self.scopes.reattach(detached);
        result
    }

    pub fn loop_depth(&self) -> usize {
        self.constructs
            .iter()
            .filter(|construct| **construct == Construct::Loop)
            .count()
    }

    pub fn switch_depth(&self) -> usize {
        self.constructs
            .iter()
            .filter(|construct| **construct == Construct::Switch)
            .count()
    }

    // Symbols

    pub fn declare(
        &mut self,
        name: &str,
        ty: Type,
        category: SymbolCategory,
        position: Position,
        value: Option<Value>,
    ) -> Result<(), Error> {
        if self.scopes.is_declared_locally(name) {
            return Err(Error::new(
                ErrorImpl::DuplicateDeclaration {
                    identifier: name.to_string(),
                },
                position,
            ));
        }

        let mut symbol = Symbol::new(name, ty, category, position, self.scopes.scope_path());
        if let Some(value) = value {
            symbol = symbol.with_value(value);
        }
        symbol.row = Some(self.symbols.record(SymbolRow::from(&symbol)));
        self.scopes.declare(symbol)
    }

    pub fn value_of(&self, name: &str, position: Position) -> Result<Value, Error> {
        Ok(self.scopes.lookup(name, position)?.value.clone())
    }

    pub fn type_of(&self, name: &str, position: Position) -> Result<Type, Error> {
        Ok(self.scopes.lookup(name, position)?.ty)
    }

    /// Stores `value` in an existing symbol, converting it to the declared
    /// type, and mirrors the write into the reporting table.
    pub fn assign(&mut self, name: &str, value: Value, position: Position) -> Result<(), Error> {
        let symbol = self.scopes.lookup_mut(name, position)?;
        let received = value.type_of();
        let Some(value) = value.coerce_to(symbol.ty) else {
            return Err(Error::new(
                ErrorImpl::RuntimeTypeMismatch {
                    identifier: symbol.name.clone(),
                    expected: symbol.ty.to_string(),
                    received: received.to_string(),
                },
                position,
            ));
        };

        symbol.value = value.clone();
        symbol.holds_default = false;
        if let Some(row) = symbol.row {
            self.symbols.set_value(row, value);
        }
        Ok(())
    }

    // Control signals

    pub fn signal(&self) -> Option<&Signal> {
        self.signal.as_ref()
    }

    /// True while a signal or a call failure is unwinding the current
    /// statement sequence.
    pub fn signal_active(&self) -> bool {
        self.signal.is_some() || self.failure.is_some()
    }

    pub fn in_call(&self) -> bool {
        self.call_depth > 0
    }

    /// Marks the running call as failed. Statements stop until the call
    /// boundary takes the error.
    pub fn fail(&mut self, error: Error) {
        trace!(error = error.get_error_name(), "call failed");
        self.failure = Some(error);
    }

    pub fn take_failure(&mut self) -> Option<Error> {
        self.failure.take()
    }

    /// `break` leaves the innermost switch or loop.
    pub fn request_break(&mut self) {
        let signal = match self.constructs.last() {
            Some(Construct::Switch) => Signal::BreakSwitch,
            _ => Signal::BreakLoop,
        };
        trace!(?signal, "signal");
        self.signal = Some(signal);
    }

    pub fn request_continue(&mut self) {
        trace!("signal continue");
        self.signal = Some(Signal::ContinueLoop);
    }

    pub fn activate_return(&mut self, value: Value) {
        trace!(%value, "signal return");
        self.signal = Some(Signal::Return(value));
    }

    pub fn is_returning(&self) -> bool {
        matches!(self.signal, Some(Signal::Return(_)))
    }

    /// Clears the signal if it is `expected`, reporting whether it was.
    pub fn consume(&mut self, expected: &Signal) -> bool {
        if self.signal.as_ref() == Some(expected) {
            self.signal = None;
            true
        } else {
            false
        }
    }

    pub fn take_return_and_clear(&mut self) -> Option<Value> {
        match self.signal.take() {
            Some(Signal::Return(value)) => Some(value),
            other => {
                self.signal = other;
                None
            }
        }
    }

    /// Removes whatever signal is pending.
    pub fn take_signal(&mut self) -> Option<Signal> {
        self.signal.take()
    }
}
