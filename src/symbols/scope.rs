use std::collections::HashMap;

use tracing::trace;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::symbol::{normalize, Symbol};

pub const GLOBAL_SCOPE: &str = "Global";

#[derive(Debug, Clone, Default)]
pub struct Scope {
    symbols: HashMap<String, Symbol>,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(&normalize(name))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Frames and labels above the global frame, set aside while a call runs.
#[derive(Debug, Default)]
pub struct DetachedScopes {
    frames: Vec<Scope>,
    labels: Vec<String>,
}

/// LIFO stack of scopes searched innermost first.
///
/// Frames hold symbols; labels name the constructs that were entered
/// (`func(main)`, `while(i < 3)`) and make up the scope path. Both keep
/// their global entry for the lifetime of the stack.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    frames: Vec<Scope>,
    labels: Vec<String>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack {
            frames: vec![Scope::default()],
            labels: vec![String::from(GLOBAL_SCOPE)],
        }
    }

    pub fn push_scope(&mut self) {
        self.frames.push(Scope::default());
        trace!(depth = self.frames.len(), "push scope");
    }

    /// Pops the innermost frame. The global frame is never popped.
    pub fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
        trace!(depth = self.frames.len(), "pop scope");
    }

    pub fn push_label(&mut self, label: String) {
        trace!(%label, "enter");
        self.labels.push(label);
    }

    pub fn pop_label(&mut self) {
        if self.labels.len() > 1 {
            self.labels.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn at_global(&self) -> bool {
        self.frames.len() == 1
    }

    pub fn current_label(&self) -> &str {
        self.labels.last().map_or(GLOBAL_SCOPE, String::as_str)
    }

    /// `Global> func(main)> while(i < 3)`
    pub fn scope_path(&self) -> String {
        self.labels.join("> ")
    }

    pub fn is_declared_locally(&self, name: &str) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| frame.symbols.contains_key(&normalize(name)))
    }

    /// Declares a symbol in the innermost frame.
    pub fn declare(&mut self, symbol: Symbol) -> Result<(), Error> {
        let key = symbol.key();
        let Some(frame) = self.frames.last_mut() else {
            return Ok(());
        };

        if frame.symbols.contains_key(&key) {
            return Err(Error::new(
                ErrorImpl::DuplicateDeclaration {
                    identifier: symbol.name.clone(),
                },
                symbol.position,
            ));
        }

        frame.symbols.insert(key, symbol);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        let key = normalize(name);
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.symbols.get(&key))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        let key = normalize(name);
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.symbols.get_mut(&key))
    }

    pub fn lookup(&self, name: &str, position: Position) -> Result<&Symbol, Error> {
        self.get(name).ok_or_else(|| undeclared(name, position))
    }

    pub fn lookup_mut(&mut self, name: &str, position: Position) -> Result<&mut Symbol, Error> {
        self.get_mut(name).ok_or_else(|| undeclared(name, position))
    }

    /// Sets aside everything above the global frame so a callee only sees
    /// globals. Restore with [`ScopeStack::reattach`].
    pub fn detach(&mut self) -> DetachedScopes {
        DetachedScopes {
            frames: self.frames.split_off(1),
            labels: self.labels.split_off(1),
        }
    }

    pub fn reattach(&mut self, detached: DetachedScopes) {
        self.frames.truncate(1);
        self.labels.truncate(1);
        self.frames.extend(detached.frames);
        self.labels.extend(detached.labels);
    }
}

fn undeclared(name: &str, position: Position) -> Error {
    Error::new(
        ErrorImpl::UndeclaredIdentifier {
            identifier: name.to_string(),
        },
        position,
    )
}
