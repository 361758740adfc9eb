//! Error types and diagnostics for the interpreter.
//!
//! This module defines the errors produced by every phase:
//!
//! - Error structures with source position information
//! - Lexical, syntactic and semantic error variants (runtime failures are semantic)
//! - The sorted diagnostics collection returned by analysis and execution
//! - Helpful error messages and suggestions

pub mod errors;

#[cfg(test)]
mod tests;
