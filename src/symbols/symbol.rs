use std::fmt::Display;

use crate::{ast::types::Type, interpreter::value::Value, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolCategory {
    Variable,
    Parameter,
    Function,
    Procedure,
    Structure,
}

impl SymbolCategory {
    /// Category of a declared variable: containers are structures.
    pub fn for_declaration(ty: Type) -> Self {
        if ty.is_container() {
            SymbolCategory::Structure
        } else {
            SymbolCategory::Variable
        }
    }
}

impl Display for SymbolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolCategory::Variable => write!(f, "Variable"),
            SymbolCategory::Parameter => write!(f, "Parameter"),
            SymbolCategory::Function => write!(f, "Function"),
            SymbolCategory::Procedure => write!(f, "Procedure"),
            SymbolCategory::Structure => write!(f, "Structure"),
        }
    }
}

/// A named storage cell in a live scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Name as written at the declaration.
    pub name: String,
    pub ty: Type,
    pub category: SymbolCategory,
    pub position: Position,
    pub value: Value,
    /// Scope path at the declaration, e.g. `Global> func(main)`.
    pub scope: String,
    /// True until the first explicit assignment.
    pub holds_default: bool,
    /// Index of the matching row in the reporting table.
    pub row: Option<usize>,
}

impl Symbol {
    pub fn new(
        name: &str,
        ty: Type,
        category: SymbolCategory,
        position: Position,
        scope: String,
    ) -> Self {
        Symbol {
            name: name.to_string(),
            ty,
            category,
            position,
            value: Value::default_for(ty),
            scope,
            holds_default: true,
            row: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self.holds_default = false;
        self
    }

    pub fn key(&self) -> String {
        normalize(&self.name)
    }
}

/// Identifiers compare case-insensitively.
pub fn normalize(name: &str) -> String {
    name.to_lowercase()
}
