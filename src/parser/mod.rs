//! Parser module for building the syntax tree.
//!
//! Transforms the token stream into a [`Program`](crate::ast::ast::Program).
//! It uses a Pratt parser for expressions with operator precedence and
//! handles:
//!
//! - Statement parsing (declarations, functions, control flow, `start`)
//! - Expression parsing (operators, casts, calls, methods, indexing)
//! - Type annotations (`int[]`, `char[][]`, `List<T>`)
//!
//! The parser stops at the first syntax error.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod tests;
