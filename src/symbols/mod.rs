//! Symbols and scopes.
//!
//! This module holds the two symbol stores used by both passes:
//!
//! - `scope`: the live scope stack used for name resolution, with a
//!   global frame that is never popped
//! - `table`: the flat reporting table that outlives scopes, keyed by
//!   lower-cased name, scope path and category
//!
//! A live symbol remembers the index of its reporting row, so writes to
//! the live symbol can be mirrored into the table.

pub mod scope;
pub mod symbol;
pub mod table;
