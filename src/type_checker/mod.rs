//! Semantic analysis module.
//!
//! This module checks a parsed program before it runs:
//!
//! - Every expression gets a type, and operators, casts, indexing and
//!   calls are validated against the operand types
//! - Declarations are tracked per scope, duplicates and undeclared
//!   names are reported
//! - Function bodies are checked for return shape, and the program for a
//!   single `start` entry point
//!
//! Analysis never stops at the first problem. Ill-typed expressions get
//! the `error` type so one mistake produces one diagnostic.

pub mod expr;
pub mod type_checker;
