use std::fmt::Display;

use crate::Span;

use super::types::{Scalar, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl RelationalOp {
    pub fn is_equality(self) -> bool {
        matches!(self, RelationalOp::Equal | RelationalOp::NotEqual)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Xor,
}

impl Display for ArithmeticOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
            ArithmeticOp::Modulo => "%",
            ArithmeticOp::Power => "**",
        };
        write!(f, "{}", symbol)
    }
}

impl Display for RelationalOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            RelationalOp::Equal => "==",
            RelationalOp::NotEqual => "!=",
            RelationalOp::Less => "<",
            RelationalOp::LessEqual => "<=",
            RelationalOp::Greater => ">",
            RelationalOp::GreaterEqual => ">=",
        };
        write!(f, "{}", symbol)
    }
}

impl Display for LogicalOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
            LogicalOp::Xor => "^",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Int(i64),
    Double(f64),
    Bool(bool),
    Char(char),
    String(String),
    Identifier(String),
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Negate(Box<Expr>),
    Relational {
        op: RelationalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    Cast {
        target: Type,
        expr: Box<Expr>,
    },
    Grouping(Box<Expr>),
    Call {
        name: String,
        arguments: Vec<Expr>,
    },
    MethodCall {
        receiver: Box<Expr>,
        method: String,
        arguments: Vec<Expr>,
    },
    /// `target[index]` or `target[index][column]`
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
        column: Option<Box<Expr>>,
    },
    Vector(Vec<Expr>),
    /// Every row is expected to evaluate to a vector.
    Matrix(Vec<Expr>),
    /// `new List()` or `new List<T>()`
    NewList(Option<Scalar>),
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ExprKind::Int(value) => write!(f, "{}", value),
            ExprKind::Double(value) => write!(f, "{:?}", value),
            ExprKind::Bool(value) => write!(f, "{}", value),
            ExprKind::Char(value) => write!(f, "'{}'", value),
            ExprKind::String(value) => write!(f, "\"{}\"", value),
            ExprKind::Identifier(name) => write!(f, "{}", name),
            ExprKind::Arithmetic { op, left, right } => write!(f, "{} {} {}", left, op, right),
            ExprKind::Negate(expr) => write!(f, "-{}", expr),
            ExprKind::Relational { op, left, right } => write!(f, "{} {} {}", left, op, right),
            ExprKind::Logical { op, left, right } => write!(f, "{} {} {}", left, op, right),
            ExprKind::Not(expr) => write!(f, "!{}", expr),
            ExprKind::Cast { target, expr } => write!(f, "({}) {}", target, expr),
            ExprKind::Grouping(expr) => write!(f, "({})", expr),
            ExprKind::Call { name, arguments } => {
                write!(f, "{}(", name)?;
                write_list(f, arguments)?;
                write!(f, ")")
            }
            ExprKind::MethodCall {
                receiver,
                method,
                arguments,
            } => {
                write!(f, "{}.{}(", receiver, method)?;
                write_list(f, arguments)?;
                write!(f, ")")
            }
            ExprKind::Index {
                target,
                index,
                column,
            } => {
                write!(f, "{}[{}]", target, index)?;
                if let Some(column) = column {
                    write!(f, "[{}]", column)?;
                }
                Ok(())
            }
            ExprKind::Vector(items) | ExprKind::Matrix(items) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
            ExprKind::NewList(Some(base)) => write!(f, "new List<{}>()", base),
            ExprKind::NewList(None) => write!(f, "new List()"),
        }
    }
}

fn write_list(f: &mut std::fmt::Formatter<'_>, items: &[Expr]) -> std::fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
