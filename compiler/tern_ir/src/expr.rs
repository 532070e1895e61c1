//! Expressions and the copy-on-write form spine.
//!
//! `Expr` is the polymorphic term: an atom, a form (application node) or an
//! opaque extension object. Forms keep their elements behind an `Arc`, so
//! cloning an expression never copies a spine. Every structural operation on
//! `Form` returns a new spine; the destructive counterparts live on
//! `UniqueForm`, which can only be obtained by surrendering a handle.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::atom::{Atom, FALSE, LIST, TRUE};
use crate::opaque::{OpaqueRef, OpaqueValue};

/// Error from a structural operation on a form.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExprError {
    /// Operand index outside the valid range for the operation.
    #[error("index {index} out of range for a form with {arity} operands")]
    IndexOutOfRange { index: usize, arity: usize },
    /// The operation needs at least one element (the head).
    #[error("operation requires a non-empty form")]
    EmptyForm,
}

/// A term of the language.
#[derive(Clone)]
pub enum Expr {
    /// Symbol, numeral or quoted string.
    Atom(Atom),
    /// Application node; element 0 is the head.
    Form(Form),
    /// Foreign value reachable only through its capability surface.
    Opaque(OpaqueRef),
}

impl Expr {
    /// Atom from exact text.
    #[inline]
    pub fn atom(text: &str) -> Self {
        Expr::Atom(Atom::new(text))
    }

    /// String-literal atom wrapping `contents` in quotes.
    #[inline]
    pub fn string(contents: &str) -> Self {
        Expr::Atom(Atom::string(contents))
    }

    /// Form from its complete element list (head first).
    #[inline]
    pub fn form(elements: Vec<Expr>) -> Self {
        Expr::Form(Form::new(elements))
    }

    /// Application of the symbol `head` to `operands`.
    pub fn apply(head: &str, operands: impl IntoIterator<Item = Expr>) -> Self {
        let mut elements = vec![Expr::atom(head)];
        elements.extend(operands);
        Expr::form(elements)
    }

    /// A `List(...)` form.
    pub fn list(items: impl IntoIterator<Item = Expr>) -> Self {
        Expr::apply(LIST, items)
    }

    /// Wrap an extension object.
    pub fn opaque(value: impl OpaqueValue + 'static) -> Self {
        Expr::Opaque(OpaqueRef::new(value))
    }

    /// `True` or `False`.
    #[inline]
    pub fn boolean(value: bool) -> Self {
        Expr::atom(if value { TRUE } else { FALSE })
    }

    /// Integer numeral.
    pub fn integer(value: i64) -> Self {
        Expr::atom(&value.to_string())
    }

    #[inline]
    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Expr::Atom(atom) => Some(atom),
            _ => None,
        }
    }

    #[inline]
    pub fn as_form(&self) -> Option<&Form> {
        match self {
            Expr::Form(form) => Some(form),
            _ => None,
        }
    }

    #[inline]
    pub fn as_opaque(&self) -> Option<&OpaqueRef> {
        match self {
            Expr::Opaque(value) => Some(value),
            _ => None,
        }
    }

    /// Whether this is the canonical `True` atom.
    #[inline]
    pub fn is_true(&self) -> bool {
        self.as_atom().is_some_and(Atom::is_true)
    }

    /// Whether this is the canonical `False` atom.
    #[inline]
    pub fn is_false(&self) -> bool {
        self.as_atom().is_some_and(Atom::is_false)
    }

    /// Whether this is a string-literal atom.
    #[inline]
    pub fn is_string(&self) -> bool {
        self.as_atom().is_some_and(Atom::is_string)
    }

    /// Name of the head symbol, when this is a form headed by an atom.
    pub fn head_name(&self) -> Option<&str> {
        self.as_form()
            .and_then(Form::head_atom)
            .map(Atom::text)
    }

    /// Whether this is a `List(...)` form.
    pub fn is_list(&self) -> bool {
        self.head_name() == Some(LIST)
    }
}

impl PartialEq for Expr {
    /// Structural equality: atoms by text, forms element-wise, opaque
    /// values only through their own capability.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Atom(a), Expr::Atom(b)) => a == b,
            (Expr::Form(a), Expr::Form(b)) => a == b,
            (Expr::Opaque(a), Expr::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Atom> for Expr {
    fn from(atom: Atom) -> Self {
        Expr::Atom(atom)
    }
}

impl From<Form> for Expr {
    fn from(form: Form) -> Self {
        Expr::Form(form)
    }
}

/// Prefix notation: `(f a (g b))`. Strings keep their quotes.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Atom(atom) => f.write_str(atom.text()),
            Expr::Form(form) => fmt::Display::fmt(form, f),
            Expr::Opaque(value) => write!(f, "<{}>", value.type_name()),
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A shared, immutable application node.
///
/// Cloning shares the spine. Use `into_unique` to edit in place.
#[derive(Clone)]
#[repr(transparent)]
pub struct Form(Arc<Vec<Expr>>);

impl Form {
    #[inline]
    pub fn new(elements: Vec<Expr>) -> Self {
        Form(Arc::new(elements))
    }

    /// All elements, head first.
    #[inline]
    pub fn elements(&self) -> &[Expr] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn head(&self) -> Option<&Expr> {
        self.0.first()
    }

    /// The head when it is an atom.
    #[inline]
    pub fn head_atom(&self) -> Option<&Atom> {
        self.head().and_then(Expr::as_atom)
    }

    /// Elements after the head.
    #[inline]
    pub fn operands(&self) -> &[Expr] {
        self.0.get(1..).unwrap_or(&[])
    }

    /// Number of operands.
    #[inline]
    pub fn arity(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Operand `index`, counting from 1.
    #[inline]
    pub fn operand(&self, index: usize) -> Option<&Expr> {
        if index == 0 {
            return None;
        }
        self.0.get(index)
    }

    /// Whether another handle shares this spine.
    #[inline]
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.0) > 1
    }

    /// Whether both handles point at the same spine.
    #[inline]
    pub fn ptr_eq(&self, other: &Form) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// An independent spine sharing every element.
    #[must_use]
    pub fn flat_copy(&self) -> Form {
        Form::new(self.0.as_ref().clone())
    }

    /// Exclusive owner of a spine with these elements.
    ///
    /// Reuses the allocation when this was the last handle, copies it otherwise.
    pub fn into_unique(self) -> UniqueForm {
        UniqueForm(Arc::try_unwrap(self.0).unwrap_or_else(|shared| shared.as_ref().clone()))
    }

    /// Copy of the spine as an exclusive owner; `self` is untouched.
    pub fn to_unique(&self) -> UniqueForm {
        UniqueForm(self.0.as_ref().clone())
    }

    /// New spine without operand `index`.
    pub fn deleted(&self, index: usize) -> Result<Form, ExprError> {
        let mut unique = self.to_unique();
        unique.delete(index)?;
        Ok(unique.into_form())
    }

    /// New spine with `value` inserted before operand `index`.
    ///
    /// `index == arity + 1` appends.
    pub fn inserted(&self, index: usize, value: Expr) -> Result<Form, ExprError> {
        let mut unique = self.to_unique();
        unique.insert(index, value)?;
        Ok(unique.into_form())
    }

    /// New spine with operand `index` replaced by `value`.
    pub fn replaced(&self, index: usize, value: Expr) -> Result<Form, ExprError> {
        let mut unique = self.to_unique();
        unique.replace(index, value)?;
        Ok(unique.into_form())
    }

    /// New spine with the operands in reverse order; the head stays first.
    #[must_use]
    pub fn reversed(&self) -> Form {
        let mut unique = self.to_unique();
        unique.reverse_operands();
        unique.into_form()
    }
}

impl PartialEq for Form {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, element) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            fmt::Display::fmt(element, f)?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Exclusively owned form spine.
///
/// Not `Clone`: holding a `UniqueForm` proves nobody else can observe the
/// elements, which is what makes the destructive operations sound.
#[derive(Debug)]
pub struct UniqueForm(Vec<Expr>);

impl UniqueForm {
    pub fn new(elements: Vec<Expr>) -> Self {
        UniqueForm(elements)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    #[inline]
    pub fn elements(&self) -> &[Expr] {
        &self.0
    }

    fn check_operand(&self, index: usize) -> Result<(), ExprError> {
        if index == 0 || index > self.arity() {
            return Err(ExprError::IndexOutOfRange {
                index,
                arity: self.arity(),
            });
        }
        Ok(())
    }

    /// Remove operand `index` and return it.
    pub fn delete(&mut self, index: usize) -> Result<Expr, ExprError> {
        self.check_operand(index)?;
        Ok(self.0.remove(index))
    }

    /// Insert `value` before operand `index`; `arity + 1` appends.
    pub fn insert(&mut self, index: usize, value: Expr) -> Result<(), ExprError> {
        if self.0.is_empty() {
            return Err(ExprError::EmptyForm);
        }
        if index == 0 || index > self.0.len() {
            return Err(ExprError::IndexOutOfRange {
                index,
                arity: self.arity(),
            });
        }
        self.0.insert(index, value);
        Ok(())
    }

    /// Replace operand `index`, returning the previous element.
    pub fn replace(&mut self, index: usize, value: Expr) -> Result<Expr, ExprError> {
        self.check_operand(index)?;
        Ok(std::mem::replace(&mut self.0[index], value))
    }

    /// Reverse the operands in place.
    pub fn reverse_operands(&mut self) {
        if let Some(operands) = self.0.get_mut(1..) {
            operands.reverse();
        }
    }

    pub fn push(&mut self, value: Expr) {
        self.0.push(value);
    }

    /// Publish the spine. From here on it is shared and immutable.
    pub fn into_form(self) -> Form {
        Form::new(self.0)
    }

    pub fn into_expr(self) -> Expr {
        Expr::Form(self.into_form())
    }
}

#[cfg(test)]
mod tests;
