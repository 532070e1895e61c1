//! Tern IR - Expression model for the rewriting core.
//!
//! This crate contains the data structures every other tern crate shares:
//! - `Atom`: immutable symbol, numeral or quoted-string token
//! - `Form`: reference-counted application node with copy-on-write spines
//! - `UniqueForm`: move-only owner token for destructive edits
//! - `OpaqueRef`: capability-tagged extension objects (arrays, compiled patterns)
//! - Operator registries consulted by the parser and introspection built-ins
//! - The numeric-engine seam used by comparison and arithmetic built-ins
//!
//! # Sharing Discipline
//!
//! Published expressions are immutable. Structural operations on `Form`
//! return a new spine that shares unmodified sub-terms. In-place edits are
//! only reachable through `UniqueForm`, which is obtained by giving up a
//! `Form` handle (`Form::into_unique`): the spine is reused when this was
//! the last handle and copied otherwise, so no other reader can observe the
//! edit.

mod atom;
mod expr;
pub mod numeric;
mod opaque;
pub mod operators;
pub mod sexpr;

pub use atom::{Atom, FALSE, LIST, TRUE};
pub use expr::{Expr, ExprError, Form, UniqueForm};
pub use numeric::{MachineNumbers, NumericEngine};
pub use opaque::{ArrayObject, OpaqueRef, OpaqueValue, MAX_ARRAY_SIZE};
pub use operators::{Fixity, OperatorDescriptor, OperatorRegistries, OperatorTable, MAX_PRECEDENCE};
