//! Lexical analysis module.
//!
//! Converts source text into tokens for the parser:
//!
//! - Tokenization with anchored regex patterns tried in order
//! - Case-insensitive keyword recognition
//! - Line and column tracking for diagnostics
//! - Comments and whitespace handling

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
