use std::collections::HashMap;

use crate::{ast::types::Type, interpreter::value::Value, Position};

use super::symbol::{normalize, Symbol, SymbolCategory};

/// Identity of a reporting row. Re-entering the same scope (a loop body,
/// a repeated call) maps a declaration back onto the row it created the
/// first time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey {
    pub name: String,
    pub scope: String,
    pub category: SymbolCategory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolRow {
    pub name: String,
    pub ty: Type,
    pub category: SymbolCategory,
    pub scope: String,
    pub position: Position,
    pub value: Option<Value>,
    pub holds_default: bool,
}

impl SymbolRow {
    pub fn key(&self) -> RowKey {
        RowKey {
            name: normalize(&self.name),
            scope: self.scope.clone(),
            category: self.category,
        }
    }
}

impl From<&Symbol> for SymbolRow {
    fn from(symbol: &Symbol) -> Self {
        SymbolRow {
            name: symbol.name.clone(),
            ty: symbol.ty,
            category: symbol.category,
            scope: symbol.scope.clone(),
            position: symbol.position,
            value: Some(symbol.value.clone()),
            holds_default: symbol.holds_default,
        }
    }
}

/// Append-only listing of every declaration seen during a pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    rows: Vec<SymbolRow>,
    index: HashMap<RowKey, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Adds a row, or refreshes the existing row with the same key. The
    /// first declaration position is kept.
    pub fn record(&mut self, row: SymbolRow) -> usize {
        let key = row.key();
        if let Some(&existing) = self.index.get(&key) {
            let current = &mut self.rows[existing];
            current.ty = row.ty;
            current.value = row.value;
            current.holds_default = row.holds_default;
            return existing;
        }

        self.rows.push(row);
        self.index.insert(key, self.rows.len() - 1);
        self.rows.len() - 1
    }

    pub fn set_value(&mut self, row: usize, value: Value) {
        if let Some(row) = self.rows.get_mut(row) {
            row.value = Some(value);
            row.holds_default = false;
        }
    }

    pub fn rows(&self) -> &[SymbolRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row with this name, in any scope.
    pub fn find(&self, name: &str) -> Option<&SymbolRow> {
        let name = normalize(name);
        self.rows.iter().find(|row| normalize(&row.name) == name)
    }

    pub fn find_in(&self, name: &str, scope: &str) -> Option<&SymbolRow> {
        let name = normalize(name);
        self.rows
            .iter()
            .find(|row| row.scope == scope && normalize(&row.name) == name)
    }
}
