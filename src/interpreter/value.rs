use std::{
    cell::{Ref, RefCell},
    fmt::Display,
    rc::Rc,
};

use crate::ast::types::{Scalar, Type};

/// Tolerance used for double equality and the division guard.
pub const EPSILON: f64 = 1e-9;

/// Shared, growable storage behind vectors, lists and matrices. Cloning
/// a sequence clones the handle, so every alias sees in-place mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    base: Scalar,
    items: Rc<RefCell<Vec<Value>>>,
}

impl Sequence {
    pub fn new(base: Scalar, items: Vec<Value>) -> Self {
        Sequence {
            base,
            items: Rc::new(RefCell::new(items)),
        }
    }

    pub fn base(&self) -> Scalar {
        self.base
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn items(&self) -> Ref<'_, Vec<Value>> {
        self.items.borrow()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.borrow().get(index).cloned()
    }

    /// Replaces an element, returning false when the index is out of bounds.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.items.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn push(&self, value: Value) {
        self.items.borrow_mut().push(value);
    }

    pub fn remove(&self, index: usize) -> Option<Value> {
        let mut items = self.items.borrow_mut();
        if index < items.len() {
            Some(items.remove(index))
        } else {
            None
        }
    }

    pub fn position(&self, needle: &Value) -> Option<usize> {
        self.items.borrow().iter().position(|item| item.equals(needle))
    }

    pub fn same_storage(&self, other: &Sequence) -> bool {
        Rc::ptr_eq(&self.items, &other.items)
    }
}

/// A runtime value tagged with its dynamic type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Double(f64),
    Bool(bool),
    Char(char),
    Str(String),
    Vector(Sequence),
    /// Rows are `Value::Vector`s.
    Matrix(Sequence),
    List(Sequence),
    Void,
}

impl Value {
    pub fn default_for(ty: Type) -> Value {
        match ty {
            Type::Int => Value::Int(0),
            Type::Double => Value::Double(0.0),
            Type::Bool => Value::Bool(true),
            Type::Char => Value::Char('\0'),
            Type::String => Value::Str(String::new()),
            Type::Vector(base) => Value::Vector(Sequence::new(base, vec![])),
            Type::Matrix(base) => Value::Matrix(Sequence::new(base, vec![])),
            Type::List(base) => Value::List(Sequence::new(base, vec![])),
            Type::Void | Type::Error => Value::Void,
        }
    }

    pub fn type_of(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Double(_) => Type::Double,
            Value::Bool(_) => Type::Bool,
            Value::Char(_) => Type::Char,
            Value::Str(_) => Type::String,
            Value::Vector(sequence) => Type::Vector(sequence.base()),
            Value::Matrix(sequence) => Type::Matrix(sequence.base()),
            Value::List(sequence) => Type::List(sequence.base()),
            Value::Void => Type::Void,
        }
    }

    /// Numeric view: ints, doubles and char codes.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Double(value) => Some(*value),
            Value::Char(value) => Some(*value as u32 as f64),
            _ => None,
        }
    }

    /// Integral view: ints and char codes.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            Value::Char(value) => Some(*value as u32 as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Vector(sequence) | Value::Matrix(sequence) | Value::List(sequence) => {
                Some(sequence)
            }
            _ => None,
        }
    }

    /// Converts the value for storage in a slot of type `target`, following
    /// the assignability table. `Bool` becomes `0`/`1` in an int slot.
    pub fn coerce_to(self, target: Type) -> Option<Value> {
        if self.type_of() == target {
            return Some(self);
        }

        match (target, self) {
            (Type::Int, Value::Bool(value)) => Some(Value::Int(value as i64)),
            (Type::Double, Value::Int(value)) => Some(Value::Double(value as f64)),
            (Type::Double, Value::Char(value)) => Some(Value::Double(value as u32 as f64)),
            _ => None,
        }
    }

    /// Typed equality: numbers compare by value within [`EPSILON`], other
    /// values only match their own kind.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Vector(a), Value::Vector(b))
            | (Value::Matrix(a), Value::Matrix(b))
            | (Value::List(a), Value::List(b)) => {
                let (a, b) = (a.items(), b.items());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::Void, Value::Void) => true,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => (a - b).abs() < EPSILON,
                _ => false,
            },
        }
    }
}

pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        String::from("NaN")
    } else if value.is_infinite() {
        String::from(if value > 0.0 { "Infinity" } else { "-Infinity" })
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Double(value) => write!(f, "{}", format_double(*value)),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Char(value) => write!(f, "{}", value),
            Value::Str(value) => write!(f, "{}", value),
            Value::Vector(sequence) | Value::Matrix(sequence) | Value::List(sequence) => {
                write!(f, "[")?;
                for (i, item) in sequence.items().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Void => write!(f, "null"),
        }
    }
}
