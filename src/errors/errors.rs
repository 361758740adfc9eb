use std::fmt::Display;

use thiserror::Error;

use crate::Position;

/// Diagnostic family. The derived order is the listing order:
/// lexical, then semantic, then syntactic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    Lexical,
    Semantic,
    Syntactic,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Lexical => write!(f, "Lexical"),
            ErrorKind::Semantic => write!(f, "Semantic"),
            ErrorKind::Syntactic => write!(f, "Syntactic"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn line(&self) -> u32 {
        self.position.line
    }

    pub fn column(&self) -> u32 {
        self.position.column
    }

    pub fn message(&self) -> String {
        self.internal_error.to_string()
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } | ErrorImpl::UnterminatedLiteral { .. } => {
                ErrorKind::Lexical
            }
            ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::NumberParseError { .. }
            | ErrorImpl::UnknownType { .. } => ErrorKind::Syntactic,
            _ => ErrorKind::Semantic,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnterminatedLiteral { .. } => "UnterminatedLiteral",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::DuplicateDeclaration { .. } => "DuplicateDeclaration",
            ErrorImpl::UndeclaredIdentifier { .. } => "UndeclaredIdentifier",
            ErrorImpl::UndeclaredFunction { .. } => "UndeclaredFunction",
            ErrorImpl::FunctionAlreadyDeclared { .. } => "FunctionAlreadyDeclared",
            ErrorImpl::ReservedFunctionName { .. } => "ReservedFunctionName",
            ErrorImpl::NestedFunctionDeclaration { .. } => "NestedFunctionDeclaration",
            ErrorImpl::DuplicateParameter { .. } => "DuplicateParameter",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::IncompatibleTypes { .. } => "IncompatibleTypes",
            ErrorImpl::InvalidOperand { .. } => "InvalidOperand",
            ErrorImpl::InvalidCast { .. } => "InvalidCast",
            ErrorImpl::ConditionNotBool { .. } => "ConditionNotBool",
            ErrorImpl::IndexNotInt { .. } => "IndexNotInt",
            ErrorImpl::NotIndexable { .. } => "NotIndexable",
            ErrorImpl::DoubleIndexOnNonMatrix { .. } => "DoubleIndexOnNonMatrix",
            ErrorImpl::IncompatibleElementTypes { .. } => "IncompatibleElementTypes",
            ErrorImpl::MatrixRowNotVector { .. } => "MatrixRowNotVector",
            ErrorImpl::EmptyAggregateLiteral => "EmptyAggregateLiteral",
            ErrorImpl::NewListOutsideList { .. } => "NewListOutsideList",
            ErrorImpl::MissingReturn { .. } => "MissingReturn",
            ErrorImpl::VoidReturnsValue { .. } => "VoidReturnsValue",
            ErrorImpl::MissingReturnValue { .. } => "MissingReturnValue",
            ErrorImpl::ReturnTypeMismatch { .. } => "ReturnTypeMismatch",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::MissingEntryPoint => "MissingEntryPoint",
            ErrorImpl::MultipleEntryPoints { .. } => "MultipleEntryPoints",
            ErrorImpl::UnknownMethod { .. } => "UnknownMethod",
            ErrorImpl::InvalidBuiltinArgument { .. } => "InvalidBuiltinArgument",
            ErrorImpl::IncDecNonNumeric { .. } => "IncDecNonNumeric",
            ErrorImpl::DivisionByZero => "DivisionByZero",
            ErrorImpl::ModuloByZero => "ModuloByZero",
            ErrorImpl::IndexOutOfBounds { .. } => "IndexOutOfBounds",
            ErrorImpl::RuntimeTypeMismatch { .. } => "RuntimeTypeMismatch",
            ErrorImpl::UnconsumedControlSignal { .. } => "UnconsumedControlSignal",
            ErrorImpl::CallDepthExceeded { .. } => "CallDepthExceeded",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnterminatedLiteral { .. } => {
                ErrorTip::Suggestion(String::from("Close the literal on the same line"))
            }
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnknownType { type_ } => ErrorTip::Suggestion(format!(
                "`{}` is not a type; use int, double, bool, char, string, T[], T[][] or List<T>",
                type_
            )),
            ErrorImpl::DuplicateDeclaration { identifier } => ErrorTip::Suggestion(format!(
                "Rename `{}` or assign to the existing one",
                identifier
            )),
            ErrorImpl::UndeclaredIdentifier { identifier } => ErrorTip::Suggestion(format!(
                "Declare `{}` with `var` before using it",
                identifier
            )),
            ErrorImpl::UndeclaredFunction { function } => ErrorTip::Suggestion(format!(
                "Define a function named `{}`",
                function
            )),
            ErrorImpl::FunctionAlreadyDeclared { .. } => {
                ErrorTip::Suggestion(String::from("Functions cannot be overloaded"))
            }
            ErrorImpl::ReservedFunctionName { .. } => ErrorTip::Suggestion(String::from(
                "round, length, toString, find and startsWith are built in",
            )),
            ErrorImpl::NestedFunctionDeclaration { .. } => {
                ErrorTip::Suggestion(String::from("Move the declaration to the top level"))
            }
            ErrorImpl::UnexpectedArguments { expected, received, .. }
            | ErrorImpl::MissingArguments { expected, received, .. } => ErrorTip::Suggestion(
                format!("Expected {} arguments, received {}", expected, received),
            ),
            ErrorImpl::ArgumentTypeMatchError { expected, received, .. } => {
                ErrorTip::Suggestion(format!(
                    "Expected argument type `{}`, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::TypeMatchError { expected, received, .. }
            | ErrorImpl::RuntimeTypeMismatch { expected, received, .. } => ErrorTip::Suggestion(
                format!("Expected type `{}`, received `{}`", expected, received),
            ),
            ErrorImpl::InvalidCast { .. } => ErrorTip::Suggestion(String::from(
                "Legal casts are int<->double, int->char, char->int, char->double and int|double->string",
            )),
            ErrorImpl::ConditionNotBool { .. } => {
                ErrorTip::Suggestion(String::from("Compare the value to produce a bool"))
            }
            ErrorImpl::EmptyAggregateLiteral => ErrorTip::Suggestion(String::from(
                "Declare the variable without an initializer to get an empty container",
            )),
            ErrorImpl::NewListOutsideList { .. } => {
                ErrorTip::Suggestion(String::from("`new List()` can only initialise a List<T>"))
            }
            ErrorImpl::MissingReturn { function } => ErrorTip::Suggestion(format!(
                "Add a `return` with a value to `{}`",
                function
            )),
            ErrorImpl::MissingEntryPoint => {
                ErrorTip::Suggestion(String::from("Add `start main();` after the declarations"))
            }
            ErrorImpl::MultipleEntryPoints { .. } => {
                ErrorTip::Suggestion(String::from("Keep a single `start` statement"))
            }
            ErrorImpl::DivisionByZero | ErrorImpl::ModuloByZero => {
                ErrorTip::Suggestion(String::from("Check the divisor before dividing"))
            }
            ErrorImpl::IndexOutOfBounds { length, .. } => ErrorTip::Suggestion(format!(
                "Valid indices are 0 to {}",
                length.saturating_sub(1)
            )),
            ErrorImpl::CallDepthExceeded { .. } => ErrorTip::Suggestion(String::from(
                "Check the recursion for a missing base case",
            )),
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.kind(),
            self.position,
            self.internal_error
        )
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unterminated {literal} literal")]
    UnterminatedLiteral { literal: String },
    #[error("unexpected token {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token {token:?}: {message}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("failed to parse number {token:?}")]
    NumberParseError { token: String },
    #[error("unknown type {type_:?}")]
    UnknownType { type_: String },

    #[error("identifier {identifier:?} is already declared in this scope")]
    DuplicateDeclaration { identifier: String },
    #[error("identifier {identifier:?} is not declared")]
    UndeclaredIdentifier { identifier: String },
    #[error("function {function:?} is not declared")]
    UndeclaredFunction { function: String },
    #[error("function {function:?} is already declared, overloading is not supported")]
    FunctionAlreadyDeclared { function: String },
    #[error("{function:?} is a built-in function and cannot be redefined")]
    ReservedFunctionName { function: String },
    #[error("function {function:?} must be declared at the top level")]
    NestedFunctionDeclaration { function: String },
    #[error("parameter {parameter:?} is declared twice in {function:?}")]
    DuplicateParameter { parameter: String, function: String },
    #[error("too many arguments for {function:?}: expected {expected}, received {received}")]
    UnexpectedArguments {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("missing arguments for {function:?}: expected {expected}, received {received}")]
    MissingArguments {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("argument {index} of {function:?} expects {expected}, received {received}")]
    ArgumentTypeMatchError {
        function: String,
        index: usize,
        expected: String,
        received: String,
    },
    #[error("cannot assign {received} to {identifier:?} of type {expected}")]
    TypeMatchError {
        identifier: String,
        expected: String,
        received: String,
    },
    #[error("incompatible types for {operator}: {left} and {right}")]
    IncompatibleTypes {
        operator: String,
        left: String,
        right: String,
    },
    #[error("operator {operator} cannot be applied to {operand}")]
    InvalidOperand { operator: String, operand: String },
    #[error("invalid cast from {from} to {to}")]
    InvalidCast { from: String, to: String },
    #[error("{construct} condition must be bool, found {received}")]
    ConditionNotBool { construct: String, received: String },
    #[error("index must be int, found {received}")]
    IndexNotInt { received: String },
    #[error("type {type_} cannot be indexed")]
    NotIndexable { type_: String },
    #[error("double index requires a matrix, found {type_}")]
    DoubleIndexOnNonMatrix { type_: String },
    #[error("incompatible element types in literal: {first} and {second}")]
    IncompatibleElementTypes { first: String, second: String },
    #[error("matrix rows must be vectors, found {received}")]
    MatrixRowNotVector { received: String },
    #[error("cannot infer the element type of an empty literal")]
    EmptyAggregateLiteral,
    #[error("new List() cannot initialise a value of type {expected}")]
    NewListOutsideList { expected: String },
    #[error("function {function:?} must return a value")]
    MissingReturn { function: String },
    #[error("procedure {function:?} cannot return a value")]
    VoidReturnsValue { function: String },
    #[error("function {function:?} must return a value here")]
    MissingReturnValue { function: String },
    #[error("function {function:?} returns {expected}, found {received}")]
    ReturnTypeMismatch {
        function: String,
        expected: String,
        received: String,
    },
    #[error("return outside of a function")]
    ReturnOutsideFunction,
    #[error("no entry statement: add exactly one `start`")]
    MissingEntryPoint,
    #[error("found {count} entry statements, expected exactly one")]
    MultipleEntryPoints { count: usize },
    #[error("unknown method {method:?} on {type_}")]
    UnknownMethod { method: String, type_: String },
    #[error("invalid argument for {function:?}: {received}")]
    InvalidBuiltinArgument { function: String, received: String },
    #[error("increment and decrement require int, double or char, found {received}")]
    IncDecNonNumeric { received: String },

    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
    #[error("index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: i64, length: usize },
    #[error("runtime type mismatch for {identifier:?}: expected {expected}, found {received}")]
    RuntimeTypeMismatch {
        identifier: String,
        expected: String,
        received: String,
    },
    #[error("{signal} outside loop/switch")]
    UnconsumedControlSignal { signal: String },
    #[error("call depth limit of {limit} exceeded")]
    CallDepthExceeded { limit: usize },
}

/// Ordered collection of diagnostics from one analysis or execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    errors: Vec<Error>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics { errors: vec![] }
    }

    pub fn push(&mut self, error: Error) {
        tracing::debug!(kind = %error.kind(), name = error.get_error_name(), position = %error.get_position(), "diagnostic");
        self.errors.push(error);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &Error> {
        self.errors.iter()
    }

    /// Errors ordered by kind, line, column, then insertion.
    pub fn sorted(&self) -> Vec<&Error> {
        let mut sorted = self.errors.iter().collect::<Vec<_>>();
        // stable, so insertion order breaks ties
        sorted.sort_by_key(|error| (error.kind(), error.position.line, error.position.column));
        sorted
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.errors
            .iter()
            .filter(|error| error.get_error_name() == name)
            .count()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}
