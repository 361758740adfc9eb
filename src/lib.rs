#![allow(clippy::module_inception)]

use std::fmt::Display;

use crate::{
    ast::ast::Program,
    config::InterpreterConfig,
    errors::errors::{Diagnostics, Error, ErrorTip},
    interpreter::OutputSink,
    symbols::table::SymbolTable,
};

pub mod ast;
pub mod config;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod symbols;
pub mod type_checker;

extern crate regex;

pub use interpreter::interpreter::{execute, execute_with_config, Execution};
pub use type_checker::type_checker::{analyze, Analysis};

/// 1-based line and column of a token or node. `Position::null()` is used
/// for diagnostics that belong to the whole program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }

    pub fn null() -> Self {
        Position { line: 0, column: 0 }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    pub fn at(position: Position) -> Self {
        Span { start: position, end: position }
    }
}

/// Tokenizes and parses source text.
pub fn parse_source(source: &str) -> Result<Program, Error> {
    let tokens = lexer::lexer::tokenize(source)?;
    parser::parser::parse(tokens)
}

/// Everything a full run produced. `ran` is false when lexing, parsing or
/// analysis reported problems, in which case nothing was executed.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub diagnostics: Diagnostics,
    pub analysis_symbols: SymbolTable,
    pub execution_symbols: SymbolTable,
    pub ran: bool,
}

/// Front end, analysis and, only when analysis is clean, execution.
pub fn run(source: &str, output: &mut dyn OutputSink, config: InterpreterConfig) -> RunOutcome {
    let mut outcome = RunOutcome::default();

    let program = match parse_source(source) {
        Ok(program) => program,
        Err(error) => {
            outcome.diagnostics.push(error);
            return outcome;
        }
    };

    let analysis = analyze(&program);
    outcome.analysis_symbols = analysis.symbols;
    if !analysis.diagnostics.is_empty() {
        outcome.diagnostics = analysis.diagnostics;
        return outcome;
    }

    let execution = execute_with_config(&program, output, config);
    outcome.execution_symbols = execution.symbols;
    outcome.diagnostics = execution.diagnostics;
    outcome.ran = true;
    outcome
}

/// Returns the text of a 1-based line, or `None` when the line does not exist.
pub fn get_line(source: &str, line: u32) -> Option<&str> {
    if line == 0 {
        return None;
    }

    source.lines().nth((line - 1) as usize)
}

/// Renders a diagnostic the way the command line shows it.
///
/// ```text
/// Error: UndeclaredIdentifier (identifier `b` is not declared in this scope)
/// -> main.usl:2:9
///    |
///  2 | println(b);
///    | --------^
/// ```
pub fn render_error(error: &Error, file: &str, source: &str) -> String {
    let position = error.get_position();
    let mut out = String::new();

    if let ErrorTip::None = error.get_tip() {
        out.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        out.push_str(&format!("Error: {} ({})\n", error.get_error_name(), error.get_tip()));
    }
    out.push_str(&format!("-> {}:{}\n", file, position));

    let Some(line_text) = get_line(source, position.line) else {
        return out;
    };

    let line_string = position.line.to_string();
    let padding = line_string.len() + 2;
    out.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(line_text);
    out.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = (position.column as usize).saturating_sub(removed_whitespace).max(1);
    out.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));

    out
}

fn remove_starting_whitespace(string: &str) -> (&str, usize) {
    let trimmed = string.trim_start_matches([' ', '\t']);
    (trimmed, string.len() - trimmed.len())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{get_line, render_error, Position};
    use crate::errors::errors::{Error, ErrorImpl};

    #[test]
    fn test_get_line() {
        let source = "Hello, world!\nsecond\n\nTesting { }\n";
        assert_eq!(get_line(source, 1), Some("Hello, world!"));
        assert_eq!(get_line(source, 4), Some("Testing { }"));
        assert_eq!(get_line(source, 0), None);
        assert_eq!(get_line(source, 9), None);
    }

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 9) < Position::new(2, 1));
        assert!(Position::new(2, 1) < Position::new(2, 3));
        assert_eq!(Position::null(), Position::new(0, 0));
    }

    #[test]
    fn test_render_error_points_at_column() {
        let source = "var a: int = 1;\n    println(b);\n";
        let error = Error::new(
            ErrorImpl::UndeclaredIdentifier {
                identifier: String::from("b"),
            },
            Position::new(2, 13),
        );

        let rendered = render_error(&error, "main.usl", source);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[1], "-> main.usl:2:13");
        assert_eq!(lines[3], "2 | println(b);");
        assert_eq!(lines[4], "  | --------^");
    }
}
