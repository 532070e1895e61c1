//! Operator registries.
//!
//! Four independent tables (prefix, infix, postfix, bodied) map a symbol to
//! its `OperatorDescriptor`. The external parser consults them while reading
//! concrete syntax; introspection built-ins query and mutate them.
//!
//! A query that does not name a fixity searches infix, then prefix, then
//! postfix, then bodied.

use rustc_hash::FxHashMap;

use crate::atom::Atom;

/// Largest precedence an operator may be declared with.
pub const MAX_PRECEDENCE: i32 = 60000;

/// Syntactic class of an operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Fixity {
    Prefix,
    Infix,
    Postfix,
    Bodied,
}

impl Fixity {
    pub fn name(self) -> &'static str {
        match self {
            Fixity::Prefix => "prefix",
            Fixity::Infix => "infix",
            Fixity::Postfix => "postfix",
            Fixity::Bodied => "bodied",
        }
    }
}

/// Binding power and associativity of one (symbol, fixity) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorDescriptor {
    pub symbol: Atom,
    pub precedence: i32,
    /// Refined binding power on the left; defaults to `precedence`.
    pub left_precedence: Option<i32>,
    /// Refined binding power on the right; defaults to `precedence`, or
    /// `precedence - 1` for right-associative operators.
    pub right_precedence: Option<i32>,
    pub right_associative: bool,
}

impl OperatorDescriptor {
    pub fn new(symbol: Atom, precedence: i32) -> Self {
        OperatorDescriptor {
            symbol,
            precedence,
            left_precedence: None,
            right_precedence: None,
            right_associative: false,
        }
    }

    /// Binding power towards the left operand.
    pub fn effective_left(&self) -> i32 {
        self.left_precedence.unwrap_or(self.precedence)
    }

    /// Binding power towards the right operand.
    pub fn effective_right(&self) -> i32 {
        match self.right_precedence {
            Some(precedence) => precedence,
            None if self.right_associative => self.precedence.saturating_sub(1),
            None => self.precedence,
        }
    }
}

/// One fixity class: symbol to descriptor.
#[derive(Clone, Debug, Default)]
pub struct OperatorTable {
    entries: FxHashMap<Atom, OperatorDescriptor>,
}

impl OperatorTable {
    /// Insert or overwrite the descriptor for `symbol`.
    ///
    /// Overwriting resets refinements made through the left/right setters.
    pub fn set(&mut self, symbol: Atom, precedence: i32) {
        let descriptor = OperatorDescriptor::new(symbol.clone(), precedence);
        self.entries.insert(symbol, descriptor);
    }

    #[inline]
    pub fn lookup(&self, symbol: &str) -> Option<&OperatorDescriptor> {
        self.entries.get(symbol)
    }

    #[inline]
    pub fn lookup_mut(&mut self, symbol: &str) -> Option<&mut OperatorDescriptor> {
        self.entries.get_mut(symbol)
    }

    #[inline]
    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The four operator tables.
#[derive(Clone, Debug, Default)]
pub struct OperatorRegistries {
    prefix: OperatorTable,
    infix: OperatorTable,
    postfix: OperatorTable,
    bodied: OperatorTable,
}

impl OperatorRegistries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, fixity: Fixity) -> &OperatorTable {
        match fixity {
            Fixity::Prefix => &self.prefix,
            Fixity::Infix => &self.infix,
            Fixity::Postfix => &self.postfix,
            Fixity::Bodied => &self.bodied,
        }
    }

    fn table_mut(&mut self, fixity: Fixity) -> &mut OperatorTable {
        match fixity {
            Fixity::Prefix => &mut self.prefix,
            Fixity::Infix => &mut self.infix,
            Fixity::Postfix => &mut self.postfix,
            Fixity::Bodied => &mut self.bodied,
        }
    }

    /// Insert or overwrite `symbol` in the `fixity` table.
    pub fn set_operator(&mut self, fixity: Fixity, precedence: i32, symbol: Atom) {
        tracing::debug!(fixity = fixity.name(), %symbol, precedence, "set operator");
        self.table_mut(fixity).set(symbol, precedence);
    }

    /// Refine the left binding power of an infix operator.
    ///
    /// Returns `false` when `symbol` is not infix.
    pub fn set_left_precedence(&mut self, symbol: &str, precedence: i32) -> bool {
        match self.infix.lookup_mut(symbol) {
            Some(descriptor) => {
                descriptor.left_precedence = Some(precedence);
                true
            }
            None => false,
        }
    }

    /// Refine the right binding power of an infix operator.
    ///
    /// Returns `false` when `symbol` is not infix.
    pub fn set_right_precedence(&mut self, symbol: &str, precedence: i32) -> bool {
        match self.infix.lookup_mut(symbol) {
            Some(descriptor) => {
                descriptor.right_precedence = Some(precedence);
                true
            }
            None => false,
        }
    }

    /// Make an infix operator right-associative.
    ///
    /// Returns `false` when `symbol` is not infix.
    pub fn set_right_associative(&mut self, symbol: &str) -> bool {
        match self.infix.lookup_mut(symbol) {
            Some(descriptor) => {
                descriptor.right_associative = true;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_operator(&self, fixity: Fixity, symbol: &str) -> bool {
        self.table(fixity).contains(symbol)
    }

    /// First descriptor for `symbol` in search order infix, prefix, postfix, bodied.
    pub fn lookup(&self, symbol: &str) -> Option<(Fixity, &OperatorDescriptor)> {
        self.search(
            symbol,
            &[Fixity::Infix, Fixity::Prefix, Fixity::Postfix, Fixity::Bodied],
        )
    }

    fn search<'a>(
        &'a self,
        symbol: &str,
        order: &[Fixity],
    ) -> Option<(Fixity, &'a OperatorDescriptor)> {
        order
            .iter()
            .find_map(|&fixity| self.table(fixity).lookup(symbol).map(|d| (fixity, d)))
    }

    /// Precedence of `symbol` in any table.
    pub fn precedence(&self, symbol: &str) -> Option<i32> {
        self.lookup(symbol).map(|(_, d)| d.precedence)
    }

    /// Left binding power: infix, then postfix.
    pub fn left_precedence(&self, symbol: &str) -> Option<i32> {
        self.search(symbol, &[Fixity::Infix, Fixity::Postfix])
            .map(|(_, d)| d.effective_left())
    }

    /// Right binding power: infix, then prefix, then bodied.
    pub fn right_precedence(&self, symbol: &str) -> Option<i32> {
        self.search(symbol, &[Fixity::Infix, Fixity::Prefix, Fixity::Bodied])
            .map(|(_, d)| d.effective_right())
    }
}

#[cfg(test)]
mod tests;
