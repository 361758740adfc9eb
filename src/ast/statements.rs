use std::rc::Rc;

use crate::{Position, Span};

use super::{expressions::Expr, types::Type};

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }

    pub fn position(&self) -> Position {
        self.span.start
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
    pub position: Position,
}

/// A function (or, with a `Void` return type, a procedure).
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Type,
    pub body: Block,
    pub span: Span,
}

impl FnDecl {
    pub fn is_procedure(&self) -> bool {
        self.return_type == Type::Void
    }

    /// `add(int, int) : int`
    pub fn signature(&self) -> String {
        let parameters = self
            .parameters
            .iter()
            .map(|parameter| parameter.ty.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({}) : {}", self.name, parameters, self.return_type)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub value: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    VarDecl {
        name: String,
        ty: Type,
        initializer: Option<Expr>,
    },
    Assign {
        name: String,
        value: Expr,
    },
    IndexAssign {
        target: Expr,
        index: Expr,
        column: Option<Expr>,
        value: Expr,
    },
    /// `target++` / `target--`; the target is an identifier or an index expression.
    IncDec {
        target: Expr,
        increment: bool,
    },
    Block(Block),
    If {
        condition: Expr,
        then_branch: Block,
        else_branch: Option<Box<Stmt>>,
    },
    Switch {
        scrutinee: Expr,
        cases: Vec<Case>,
        default: Option<Vec<Stmt>>,
    },
    While {
        condition: Expr,
        body: Block,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        update: Option<Box<Stmt>>,
        body: Block,
    },
    DoWhile {
        body: Block,
        condition: Expr,
    },
    Break,
    Continue,
    Print(Expr),
    FnDecl(Rc<FnDecl>),
    Return(Option<Expr>),
    /// `start name(args);`
    Start {
        name: String,
        arguments: Vec<Expr>,
    },
    Expression(Expr),
}
