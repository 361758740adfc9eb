//! Built-in functions and container methods.
//!
//! The set is fixed: user code cannot declare functions with these names.
//! The type checker resolves the same [`Builtin`] and [`Method`] values,
//! so both passes agree on what a name means.

use crate::{
    errors::errors::{Error, ErrorImpl},
    symbols::symbol::normalize,
    Position,
};

use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Round,
    Length,
    ToString,
    Find,
    StartsWith,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Builtin> {
        match normalize(name).as_str() {
            "round" => Some(Builtin::Round),
            "length" => Some(Builtin::Length),
            "tostring" => Some(Builtin::ToString),
            "find" => Some(Builtin::Find),
            "startswith" | "start_with" | "startwith" => Some(Builtin::StartsWith),
            _ => None,
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Builtin::Round | Builtin::Length | Builtin::ToString => 1,
            Builtin::Find | Builtin::StartsWith => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Round => "round",
            Builtin::Length => "length",
            Builtin::ToString => "toString",
            Builtin::Find => "find",
            Builtin::StartsWith => "startsWith",
        }
    }

    pub fn call(self, arguments: Vec<Value>, position: Position) -> Result<Value, Error> {
        check_arity(self.name(), self.arity(), arguments.len(), position)?;
        let invalid = |value: &Value| invalid_argument(self.name(), value, position);

        match (self, arguments.as_slice()) {
            (Builtin::Round, [Value::Double(value)]) => Ok(Value::Int(value.round() as i64)),
            (Builtin::Round, [value]) => value.as_i64().map(Value::Int).ok_or_else(|| invalid(value)),
            (Builtin::Length, [Value::Str(value)]) => Ok(Value::Int(value.chars().count() as i64)),
            (Builtin::Length, [value]) => value
                .as_sequence()
                .map(|sequence| Value::Int(sequence.len() as i64))
                .ok_or_else(|| invalid(value)),
            (Builtin::ToString, [value]) => Ok(Value::Str(value.to_string())),
            (Builtin::Find, [Value::Str(haystack), Value::Str(needle)]) => {
                Ok(Value::Int(char_index(haystack, needle)))
            }
            (Builtin::Find, [haystack, needle]) => haystack
                .as_sequence()
                .map(|sequence| {
                    Value::Int(sequence.position(needle).map_or(-1, |index| index as i64))
                })
                .ok_or_else(|| invalid(haystack)),
            (Builtin::StartsWith, [Value::Str(value), Value::Str(prefix)]) => {
                Ok(Value::Bool(value.starts_with(prefix.as_str())))
            }
            (_, [first, ..]) => Err(invalid(first)),
            (_, []) => Err(invalid(&Value::Void)),
        }
    }
}

/// Operations called as `receiver.method(args)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Append,
    Remove,
    Find,
    StartsWith,
}

impl Method {
    pub fn from_name(name: &str) -> Option<Method> {
        match normalize(name).as_str() {
            "append" => Some(Method::Append),
            "remove" => Some(Method::Remove),
            "find" => Some(Method::Find),
            "startswith" | "start_with" | "startwith" => Some(Method::StartsWith),
            _ => None,
        }
    }

    pub fn arity(self) -> usize {
        1
    }

    pub fn name(self) -> &'static str {
        match self {
            Method::Append => "append",
            Method::Remove => "remove",
            Method::Find => "find",
            Method::StartsWith => "startsWith",
        }
    }

    pub fn call(self, receiver: &Value, arguments: Vec<Value>, position: Position) -> Result<Value, Error> {
        check_arity(self.name(), self.arity(), arguments.len(), position)?;
        let Some(argument) = arguments.into_iter().next() else {
            return Err(invalid_argument(self.name(), &Value::Void, position));
        };

        match (self, receiver) {
            (Method::Append, Value::List(list)) => {
                let received = argument.type_of();
                let element = argument.coerce_to(list.base().as_type()).ok_or_else(|| {
                    Error::new(
                        ErrorImpl::RuntimeTypeMismatch {
                            identifier: String::from("append"),
                            expected: list.base().to_string(),
                            received: received.to_string(),
                        },
                        position,
                    )
                })?;
                list.push(element);
                Ok(Value::Void)
            }
            (Method::Remove, Value::List(list)) => {
                let index = argument
                    .as_i64()
                    .ok_or_else(|| invalid_argument(self.name(), &argument, position))?;
                usize::try_from(index)
                    .ok()
                    .and_then(|index| list.remove(index))
                    .ok_or_else(|| out_of_bounds(index, list.len(), position))
            }
            (Method::Find, Value::Vector(sequence) | Value::List(sequence)) => {
                Ok(Value::Bool(sequence.position(&argument).is_some()))
            }
            (Method::Find, Value::Str(value)) => match &argument {
                Value::Str(needle) => Ok(Value::Bool(value.contains(needle.as_str()))),
                Value::Char(needle) => Ok(Value::Bool(value.contains(*needle))),
                other => Err(invalid_argument(self.name(), other, position)),
            },
            (Method::StartsWith, Value::Str(value)) => match &argument {
                Value::Str(prefix) => Ok(Value::Bool(value.starts_with(prefix.as_str()))),
                other => Err(invalid_argument(self.name(), other, position)),
            },
            _ => Err(Error::new(
                ErrorImpl::UnknownMethod {
                    method: self.name().to_string(),
                    type_: receiver.type_of().to_string(),
                },
                position,
            )),
        }
    }
}

pub fn check_arity(function: &str, expected: usize, received: usize, position: Position) -> Result<(), Error> {
    if received > expected {
        Err(Error::new(
            ErrorImpl::UnexpectedArguments {
                function: function.to_string(),
                expected,
                received,
            },
            position,
        ))
    } else if received < expected {
        Err(Error::new(
            ErrorImpl::MissingArguments {
                function: function.to_string(),
                expected,
                received,
            },
            position,
        ))
    } else {
        Ok(())
    }
}

pub fn out_of_bounds(index: i64, length: usize, position: Position) -> Error {
    Error::new(ErrorImpl::IndexOutOfBounds { index, length }, position)
}

fn invalid_argument(function: &str, value: &Value, position: Position) -> Error {
    Error::new(
        ErrorImpl::InvalidBuiltinArgument {
            function: function.to_string(),
            received: value.type_of().to_string(),
        },
        position,
    )
}

/// Character (not byte) offset of `needle` in `haystack`, or -1.
fn char_index(haystack: &str, needle: &str) -> i64 {
    haystack
        .find(needle)
        .map_or(-1, |byte| haystack[..byte].chars().count() as i64)
}
