//! Rule database.
//!
//! Rules are grouped into entries keyed by `(symbol, arity)`. Each entry
//! keeps its rules sorted by precedence, lowest first, with ties in
//! insertion order, so the evaluator can try them front to back. An entry
//! can be fenced, which closes it to further insertion for good while the
//! rules already present stay usable.

use std::sync::Arc;

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tern_ir::{Atom, Expr};

use crate::errors::{entry_fenced, unknown_entry, EvalError};
use crate::pattern::{Bindings, GuardExecutor, Pattern};

bitflags! {
    /// Per-entry behaviour flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct EntryFlags: u8 {
        /// No further rules may be inserted.
        const FENCED = 1 << 0;
        /// Arguments are passed unevaluated and bodies see the caller's locals.
        const MACRO = 1 << 1;
        /// Declared through a listed rule base (also registered as bodied).
        const LISTED = 1 << 2;
        /// Bodies see the caller's locals; arguments are still evaluated.
        const SHARES_LOCALS = 1 << 3;
    }
}

/// Identity of an inserted rule, unique within one database.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u64);

/// A rewrite rule.
#[derive(Clone, Debug)]
pub struct Rule {
    id: RuleId,
    pub pattern: Pattern,
    pub body: Expr,
    pub precedence: i32,
}

impl Rule {
    pub fn new(pattern: Pattern, body: Expr, precedence: i32) -> Self {
        Rule {
            id: RuleId(0),
            pattern,
            body,
            precedence,
        }
    }

    /// Identity assigned on insertion.
    #[inline]
    pub fn id(&self) -> RuleId {
        self.id
    }

    #[inline]
    pub fn predicate(&self) -> Option<&Expr> {
        self.pattern.guard()
    }
}

/// The ordered rules of one `(symbol, arity)` pair.
#[derive(Clone, Debug)]
pub struct RuleEntry {
    symbol: Atom,
    params: Vec<Atom>,
    held: SmallVec<[usize; 2]>,
    flags: EntryFlags,
    rules: Vec<Arc<Rule>>,
}

impl RuleEntry {
    fn new(symbol: Atom, params: Vec<Atom>, flags: EntryFlags) -> Self {
        RuleEntry {
            symbol,
            params,
            held: SmallVec::new(),
            flags,
            rules: Vec::new(),
        }
    }

    #[inline]
    pub fn symbol(&self) -> &Atom {
        &self.symbol
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Formal parameter names from the declaration.
    #[inline]
    pub fn params(&self) -> &[Atom] {
        &self.params
    }

    #[inline]
    pub fn flags(&self) -> EntryFlags {
        self.flags
    }

    #[inline]
    pub fn is_fenced(&self) -> bool {
        self.flags.contains(EntryFlags::FENCED)
    }

    #[inline]
    pub fn is_macro(&self) -> bool {
        self.flags.contains(EntryFlags::MACRO)
    }

    /// Whether rule bodies run in a frame that inherits the caller's locals.
    #[inline]
    pub fn inherits_locals(&self) -> bool {
        self.flags.intersects(EntryFlags::MACRO | EntryFlags::SHARES_LOCALS)
    }

    /// Whether operand `index` (0-based) is passed unevaluated.
    #[inline]
    pub fn is_held(&self, index: usize) -> bool {
        self.is_macro() || self.held.contains(&index)
    }

    /// Rules in match order.
    #[inline]
    pub fn rules(&self) -> &[Arc<Rule>] {
        &self.rules
    }

    /// Cheap copy of the rule list, safe to iterate while the database
    /// changes underneath.
    pub fn snapshot(&self) -> Vec<Arc<Rule>> {
        self.rules.clone()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn insert_sorted(&mut self, rule: Arc<Rule>) {
        let at = self
            .rules
            .partition_point(|existing| existing.precedence <= rule.precedence);
        self.rules.insert(at, rule);
    }

    fn hold_param(&mut self, param: &str) -> bool {
        let Some(index) = self.params.iter().position(|p| p.text() == param) else {
            return false;
        };
        if !self.held.contains(&index) {
            self.held.push(index);
        }
        true
    }

    fn remove_at(&mut self, index: usize) -> Arc<Rule> {
        self.rules.remove(index)
    }
}

/// All rule entries, keyed by symbol then arity.
#[derive(Clone, Debug, Default)]
pub struct RuleDb {
    entries: FxHashMap<Atom, SmallVec<[RuleEntry; 1]>>,
    next_id: u64,
}

impl RuleDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty entry for `symbol` with one parameter per name,
    /// unless one already exists for that arity.
    pub fn declare(&mut self, symbol: Atom, params: Vec<Atom>, flags: EntryFlags) -> &mut RuleEntry {
        let arity = params.len();
        let slot = self.entries.entry(symbol.clone()).or_default();
        let index = match slot.iter().position(|e| e.arity() == arity) {
            Some(index) => index,
            None => {
                tracing::debug!(%symbol, arity, ?flags, "declare rule base");
                slot.push(RuleEntry::new(symbol, params, flags));
                slot.len() - 1
            }
        };
        &mut slot[index]
    }

    /// Entry for `(symbol, arity)`.
    pub fn lookup(&self, symbol: &str, arity: usize) -> Option<&RuleEntry> {
        self.entries
            .get(symbol)
            .and_then(|slot| slot.iter().find(|e| e.arity() == arity))
    }

    fn lookup_mut(&mut self, symbol: &str, arity: usize) -> Option<&mut RuleEntry> {
        self.entries
            .get_mut(symbol)
            .and_then(|slot| slot.iter_mut().find(|e| e.arity() == arity))
    }

    fn require_mut(&mut self, symbol: &str, arity: usize) -> Result<&mut RuleEntry, EvalError> {
        self.lookup_mut(symbol, arity)
            .ok_or_else(|| unknown_entry(symbol, arity))
    }

    /// Whether any arity of `symbol` is declared.
    pub fn is_symbol_declared(&self, symbol: &str) -> bool {
        self.entries.get(symbol).is_some_and(|slot| !slot.is_empty())
    }

    /// Insert `rule` into the entry for `(symbol, arity)`.
    pub fn insert(&mut self, symbol: &str, arity: usize, mut rule: Rule) -> Result<RuleId, EvalError> {
        let id = RuleId(self.next_id);
        let entry = self.require_mut(symbol, arity)?;
        if entry.is_fenced() {
            return Err(entry_fenced(symbol, arity));
        }
        rule.id = id;
        tracing::debug!(symbol, arity, precedence = rule.precedence, ?id, "insert rule");
        entry.insert_sorted(Arc::new(rule));
        self.next_id += 1;
        Ok(id)
    }

    /// Close the entry to further insertion.
    pub fn fence(&mut self, symbol: &str, arity: usize) -> Result<(), EvalError> {
        let entry = self.require_mut(symbol, arity)?;
        entry.flags.insert(EntryFlags::FENCED);
        tracing::debug!(symbol, arity, "fence rule base");
        Ok(())
    }

    /// Let the bodies of `(symbol, arity)` see their caller's locals.
    pub fn unfence(&mut self, symbol: &str, arity: usize) -> Result<(), EvalError> {
        let entry = self.require_mut(symbol, arity)?;
        entry.flags.insert(EntryFlags::SHARES_LOCALS);
        tracing::debug!(symbol, arity, "unfence rule base");
        Ok(())
    }

    /// Mark parameter `param` as held in every arity of `symbol` that has it.
    ///
    /// Returns `false` when no entry names such a parameter.
    pub fn hold_arg(&mut self, symbol: &str, param: &str) -> bool {
        let Some(slot) = self.entries.get_mut(symbol) else {
            return false;
        };
        let mut any = false;
        for entry in slot.iter_mut() {
            any |= entry.hold_param(param);
        }
        any
    }

    /// Remove the whole entry for `(symbol, arity)`.
    pub fn retract(&mut self, symbol: &str, arity: usize) -> bool {
        let Some(slot) = self.entries.get_mut(symbol) else {
            return false;
        };
        let before = slot.len();
        slot.retain(|e| e.arity() != arity);
        let removed = slot.len() != before;
        if slot.is_empty() {
            self.entries.remove(symbol);
        }
        if removed {
            tracing::debug!(symbol, arity, "retract rule base");
        }
        removed
    }

    /// Remove the rule with identity `id`.
    pub fn retract_rule(&mut self, symbol: &str, arity: usize, id: RuleId) -> Option<Arc<Rule>> {
        self.retract_where(symbol, arity, |rule| rule.id == id)
    }

    /// Remove the first rule, in match order, satisfying `select`.
    pub fn retract_where(
        &mut self,
        symbol: &str,
        arity: usize,
        mut select: impl FnMut(&Rule) -> bool,
    ) -> Option<Arc<Rule>> {
        let entry = self.lookup_mut(symbol, arity)?;
        let index = entry.rules.iter().position(|rule| select(rule))?;
        let removed = entry.remove_at(index);
        tracing::debug!(symbol, arity, id = ?removed.id, "retract rule");
        Some(removed)
    }

    /// Remove the first rule, in match order, whose guard currently holds.
    ///
    /// Guards are evaluated with no bindings; a rule without a guard holds.
    pub fn retract_first_holding<E>(
        &mut self,
        symbol: &str,
        arity: usize,
        exec: &mut E,
    ) -> Result<Option<Arc<Rule>>, EvalError>
    where
        E: GuardExecutor + ?Sized,
    {
        let Some(entry) = self.lookup(symbol, arity) else {
            return Ok(None);
        };
        let empty = Bindings::new();
        for rule in entry.snapshot() {
            let holds = match rule.predicate() {
                Some(guard) => exec.eval_guard(guard, &empty)?,
                None => true,
            };
            if holds {
                return Ok(self.retract_rule(symbol, arity, rule.id));
            }
        }
        Ok(None)
    }
}
