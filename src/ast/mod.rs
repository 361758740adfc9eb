/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: The program root
/// - expressions: Expression nodes and operators
/// - statements: Statement nodes, blocks and function declarations
/// - types: The value types of the language and their coercion rules
///
/// Nodes are plain enums matched exhaustively by the analyzer and the
/// interpreter; every node carries the span it was parsed from.
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;

#[cfg(test)]
mod tests;
