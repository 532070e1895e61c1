//! Pattern matching.
//!
//! Patterns are ordinary expressions. An atom spelled `x_` is a pattern
//! variable named `x`; a bare `_` matches anything without binding. Every
//! other atom is a literal that must equal the candidate atom, and a form
//! matches a form of the same length element by element, head included.
//!
//! The first occurrence of a variable binds it; later occurrences must be
//! structurally equal to that binding. Matching never backtracks inside one
//! pattern. After a structural match, an optional guard is evaluated through
//! a [`GuardExecutor`] with the bindings visible; anything but `True` is a
//! non-match.

use smallvec::SmallVec;
use tern_ir::{Atom, Expr};

use crate::errors::EvalError;

/// Suffix marking a pattern variable.
pub const VARIABLE_SUFFIX: char = '_';

/// Classification of a pattern atom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternAtom<'a> {
    /// `x_` binds `x`.
    Variable(&'a str),
    /// `_` matches anything.
    Wildcard,
    /// Must equal the candidate.
    Literal,
}

/// Classify a pattern atom by its spelling.
pub fn classify(atom: &Atom) -> PatternAtom<'_> {
    if atom.is_string() {
        return PatternAtom::Literal;
    }
    let text = atom.text();
    if text == "_" {
        return PatternAtom::Wildcard;
    }
    match text.strip_suffix(VARIABLE_SUFFIX) {
        Some(name) if !name.is_empty() && !name.ends_with(VARIABLE_SUFFIX) => {
            PatternAtom::Variable(name)
        }
        _ => PatternAtom::Literal,
    }
}

/// Variable bindings produced by a match, in binding order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bindings {
    entries: SmallVec<[(Atom, Expr); 4]>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Expr> {
        self.entries
            .iter()
            .find(|(bound, _)| bound.text() == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Atom, &Expr)> {
        self.entries.iter().map(|(name, value)| (name, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn bind(&mut self, name: &str, value: &Expr) {
        self.entries.push((Atom::new(name), value.clone()));
    }

    fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }
}

/// Callback into the evaluator for guard predicates.
pub trait GuardExecutor {
    /// Evaluate `guard` with `bindings` visible as local variables and
    /// report whether it produced the canonical `True`.
    fn eval_guard(&mut self, guard: &Expr, bindings: &Bindings) -> Result<bool, EvalError>;
}

/// Structural match of `pattern` against `candidate`, extending `bindings`.
///
/// On failure `bindings` is restored to its previous contents.
pub fn match_pattern(pattern: &Expr, candidate: &Expr, bindings: &mut Bindings) -> bool {
    let mark = bindings.len();
    let matched = match_into(pattern, candidate, bindings);
    if !matched {
        bindings.truncate(mark);
    }
    matched
}

fn match_into(pattern: &Expr, candidate: &Expr, bindings: &mut Bindings) -> bool {
    match pattern {
        Expr::Atom(atom) => match classify(atom) {
            PatternAtom::Wildcard => true,
            PatternAtom::Variable(name) => match bindings.get(name) {
                Some(bound) => bound == candidate,
                None => {
                    bindings.bind(name, candidate);
                    true
                }
            },
            PatternAtom::Literal => candidate.as_atom() == Some(atom),
        },
        Expr::Form(form) => {
            let Some(other) = candidate.as_form() else {
                return false;
            };
            form.len() == other.len()
                && form
                    .elements()
                    .iter()
                    .zip(other.elements())
                    .all(|(p, c)| match_into(p, c, bindings))
        }
        Expr::Opaque(_) => pattern == candidate,
    }
}

/// A pattern with its optional guard.
#[derive(Clone, Debug)]
pub struct Pattern {
    source: Expr,
    guard: Option<Expr>,
    variables: Vec<Atom>,
}

impl Pattern {
    pub fn new(source: Expr, guard: Option<Expr>) -> Self {
        let mut variables = Vec::new();
        collect_variables(&source, &mut variables);
        Pattern {
            source,
            guard,
            variables,
        }
    }

    /// Pattern `head(p1_, ..., pn_)` binding each parameter by name.
    pub fn for_parameters(head: &Atom, params: &[Atom], guard: Option<Expr>) -> Self {
        let mut elements = Vec::with_capacity(params.len() + 1);
        elements.push(Expr::Atom(head.clone()));
        elements.extend(
            params
                .iter()
                .map(|p| Expr::atom(&format!("{}{VARIABLE_SUFFIX}", p.text()))),
        );
        Pattern::new(Expr::form(elements), guard)
    }

    #[inline]
    pub fn source(&self) -> &Expr {
        &self.source
    }

    #[inline]
    pub fn guard(&self) -> Option<&Expr> {
        self.guard.as_ref()
    }

    /// Variable names in order of first occurrence.
    #[inline]
    pub fn variables(&self) -> &[Atom] {
        &self.variables
    }

    /// Structural match only; the guard is not consulted.
    pub fn match_structure(&self, candidate: &Expr) -> Option<Bindings> {
        let mut bindings = Bindings::new();
        match_pattern(&self.source, candidate, &mut bindings).then_some(bindings)
    }

    /// Structural match followed by the guard.
    pub fn matches<E>(&self, candidate: &Expr, exec: &mut E) -> Result<Option<Bindings>, EvalError>
    where
        E: GuardExecutor + ?Sized,
    {
        let Some(bindings) = self.match_structure(candidate) else {
            return Ok(None);
        };
        if let Some(guard) = &self.guard {
            if !exec.eval_guard(guard, &bindings)? {
                return Ok(None);
            }
        }
        Ok(Some(bindings))
    }
}

fn collect_variables(expr: &Expr, out: &mut Vec<Atom>) {
    match expr {
        Expr::Atom(atom) => {
            if let PatternAtom::Variable(name) = classify(atom) {
                if !out.iter().any(|v| v.text() == name) {
                    out.push(Atom::new(name));
                }
            }
        }
        Expr::Form(form) => {
            for element in form.elements() {
                collect_variables(element, out);
            }
        }
        Expr::Opaque(_) => {}
    }
}
