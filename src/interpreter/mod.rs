//! Tree-walking interpreter.
//!
//! This module executes a checked program directly from its syntax tree:
//!
//! - Runtime values with shared storage for containers
//! - The execution context (scopes, function table, control signals)
//! - Statement and expression evaluation
//! - The fixed set of built-in functions and container methods
//!
//! Runtime failures are recorded as semantic diagnostics; output already
//! written stays written.

pub mod builtins;
pub mod context;
pub mod expr;
pub mod interpreter;
pub mod output;
pub mod stack;
pub mod stmt;
pub mod value;

pub use output::{BufferSink, OutputSink, StdoutSink};

#[cfg(test)]
mod tests;
