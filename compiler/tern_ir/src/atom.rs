//! Atoms: the leaves of every expression.
//!
//! An atom is an immutable text token. Three kinds share the representation:
//! symbols (`x`, `f`, `+`), numerals (`42`, `-1.5`) and string literals,
//! which keep their surrounding double quotes in the text (`"abc"`).
//! Numerals are only recognised through a `NumericEngine`; this module knows
//! about symbols and strings.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Canonical truth atom.
pub const TRUE: &str = "True";
/// Canonical falsity atom.
pub const FALSE: &str = "False";
/// Head of list forms (`List(a, b, c)`).
pub const LIST: &str = "List";

/// An immutable, cheaply clonable text token.
///
/// Equality, ordering and hashing are by text. `Atom` borrows as `str`, so
/// maps keyed by atoms can be queried with a plain `&str` without allocating.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Atom(Arc<str>);

impl Atom {
    /// Create an atom from its exact text.
    #[inline]
    pub fn new(text: &str) -> Self {
        Atom(Arc::from(text))
    }

    /// Create a string-literal atom wrapping `contents` in double quotes.
    pub fn string(contents: &str) -> Self {
        let mut text = String::with_capacity(contents.len() + 2);
        text.push('"');
        text.push_str(contents);
        text.push('"');
        Atom(Arc::from(text))
    }

    /// The exact text of the atom, quotes included for strings.
    #[inline]
    pub fn text(&self) -> &str {
        &self.0
    }

    /// Whether this atom is a string literal.
    #[inline]
    pub fn is_string(&self) -> bool {
        let text = self.text();
        text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
    }

    /// The contents of a string literal, or the whole text for other atoms.
    pub fn unquoted(&self) -> &str {
        if self.is_string() {
            &self.text()[1..self.text().len() - 1]
        } else {
            self.text()
        }
    }

    /// The string literal spelling of this atom's text.
    ///
    /// Already-quoted atoms are returned unchanged.
    #[must_use]
    pub fn stringified(&self) -> Atom {
        if self.is_string() {
            self.clone()
        } else {
            Atom::string(self.text())
        }
    }

    /// The symbol named by a string literal; other atoms are returned unchanged.
    #[must_use]
    pub fn unstringified(&self) -> Atom {
        if self.is_string() {
            Atom::new(self.unquoted())
        } else {
            self.clone()
        }
    }

    /// Whether this is the canonical `True` atom.
    #[inline]
    pub fn is_true(&self) -> bool {
        self.text() == TRUE
    }

    /// Whether this is the canonical `False` atom.
    #[inline]
    pub fn is_false(&self) -> bool {
        self.text() == FALSE
    }
}

impl Borrow<str> for Atom {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Atom {
    fn from(text: &str) -> Self {
        Atom::new(text)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({})", self.text())
    }
}
