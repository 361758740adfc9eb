//! Type system definitions.
//!
//! This module defines the closed set of value types of the language:
//!
//! - Scalars (int, double, bool, char, string)
//! - Containers over a scalar base (vectors, matrices, lists)
//! - `Void` for procedures and `Error`, the absorbing type that stops
//!   cascading diagnostics
//!
//! It also holds the coercion table used by declarations, assignments
//! and argument passing, and element-type unification for literals.

use std::fmt::Display;

/// A type that can be the base of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    Int,
    Double,
    Bool,
    Char,
    String,
}

impl Scalar {
    pub const ALL: [Scalar; 5] = [
        Scalar::Int,
        Scalar::Double,
        Scalar::Bool,
        Scalar::Char,
        Scalar::String,
    ];

    pub fn as_type(self) -> Type {
        match self {
            Scalar::Int => Type::Int,
            Scalar::Double => Type::Double,
            Scalar::Bool => Type::Bool,
            Scalar::Char => Type::Char,
            Scalar::String => Type::String,
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_type().fmt(f)
    }
}

/// Container types wrap a [`Scalar`], so containers never nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Double,
    Bool,
    Char,
    String,
    Void,
    Error,
    Vector(Scalar),
    Matrix(Scalar),
    List(Scalar),
}

impl Type {
    pub fn as_scalar(self) -> Option<Scalar> {
        match self {
            Type::Int => Some(Scalar::Int),
            Type::Double => Some(Scalar::Double),
            Type::Bool => Some(Scalar::Bool),
            Type::Char => Some(Scalar::Char),
            Type::String => Some(Scalar::String),
            _ => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Int | Type::Double | Type::Char)
    }

    pub fn is_error(self) -> bool {
        self == Type::Error
    }

    pub fn is_container(self) -> bool {
        matches!(self, Type::Vector(_) | Type::Matrix(_) | Type::List(_))
    }

    /// The scalar wrapped by a container, `None` for everything else.
    pub fn base(self) -> Option<Scalar> {
        match self {
            Type::Vector(base) | Type::Matrix(base) | Type::List(base) => Some(base),
            _ => None,
        }
    }

    pub fn vector_of(base: Type) -> Type {
        base.as_scalar().map_or(Type::Error, Type::Vector)
    }

    pub fn matrix_of(base: Type) -> Type {
        base.as_scalar().map_or(Type::Error, Type::Matrix)
    }

    pub fn list_of(base: Type) -> Type {
        base.as_scalar().map_or(Type::Error, Type::List)
    }

    /// Whether a value of type `source` may be stored in a slot of type `self`.
    pub fn is_assignable_from(self, source: Type) -> bool {
        self == source
            || matches!(
                (self, source),
                (Type::Int, Type::Bool) | (Type::Double, Type::Int) | (Type::Double, Type::Char)
            )
    }

    /// Element type of a literal holding values of both types, `None` when
    /// they cannot share a container.
    pub fn unify(self, other: Type) -> Option<Type> {
        match (self, other) {
            (a, b) if a == b => Some(a),
            (Type::Int, Type::Double) | (Type::Double, Type::Int) => Some(Type::Double),
            _ => None,
        }
    }

    /// Parses a type name as written in source: `int`, `double[]`,
    /// `char[][]`, `List<string>`. Case and surrounding whitespace are
    /// ignored.
    pub fn from_name(name: &str) -> Option<Type> {
        let normalized = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        if let Some(inner) = normalized
            .strip_prefix("list<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return Type::from_name(inner)?.as_scalar().map(Type::List);
        }
        if let Some(inner) = normalized.strip_suffix("[][]") {
            return Type::from_name(inner)?.as_scalar().map(Type::Matrix);
        }
        if let Some(inner) = normalized.strip_suffix("[]") {
            return Type::from_name(inner)?.as_scalar().map(Type::Vector);
        }

        match normalized.as_str() {
            "int" => Some(Type::Int),
            "double" => Some(Type::Double),
            "bool" | "boolean" => Some(Type::Bool),
            "char" => Some(Type::Char),
            "string" => Some(Type::String),
            "void" => Some(Type::Void),
            _ => None,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Double => write!(f, "double"),
            Type::Bool => write!(f, "bool"),
            Type::Char => write!(f, "char"),
            Type::String => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Error => write!(f, "error"),
            Type::Vector(base) => write!(f, "{}[]", base),
            Type::Matrix(base) => write!(f, "{}[][]", base),
            Type::List(base) => write!(f, "List<{}>", base),
        }
    }
}
