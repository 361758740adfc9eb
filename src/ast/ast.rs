use std::rc::Rc;

use super::statements::{FnDecl, Stmt, StmtKind};

/// Root of the syntax tree: the top-level statements in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Stmt>,
}

impl Program {
    pub fn new(body: Vec<Stmt>) -> Self {
        Program { body }
    }

    /// Top-level function and procedure declarations, in source order.
    pub fn functions(&self) -> impl Iterator<Item = &Rc<FnDecl>> {
        self.body.iter().filter_map(|stmt| match &stmt.kind {
            StmtKind::FnDecl(declaration) => Some(declaration),
            _ => None,
        })
    }
}
