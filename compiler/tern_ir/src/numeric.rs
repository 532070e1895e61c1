//! Numeric-engine seam.
//!
//! The rewriting core does not own number semantics. It asks a
//! `NumericEngine` whether an atom is a numeral, how two numerals compare and,
//! for the small arithmetic built-ins, what their sum, difference or product
//! is. `MachineNumbers` is the default engine: 128-bit integers with a
//! fall-back to `f64` for fractions and overflow.

use std::cmp::Ordering;
use std::fmt;

/// Numeric operations consumed by the evaluator.
pub trait NumericEngine: fmt::Debug + Send + Sync {
    /// Whether `text` is a numeral. With `allow_fraction == false` only
    /// integers qualify.
    fn is_number(&self, text: &str, allow_fraction: bool) -> bool;

    /// Numeric comparison, `None` when either side is not a numeral.
    fn compare(&self, a: &str, b: &str) -> Option<Ordering>;

    fn add(&self, a: &str, b: &str) -> Option<String>;

    fn subtract(&self, a: &str, b: &str) -> Option<String>;

    fn multiply(&self, a: &str, b: &str) -> Option<String>;

    /// Integer value of a numeral, for index and count operands.
    fn to_index(&self, text: &str) -> Option<i64> {
        if self.is_number(text, false) {
            text.parse().ok()
        } else {
            None
        }
    }
}

/// Default engine backed by machine integers and floats.
#[derive(Clone, Copy, Debug, Default)]
pub struct MachineNumbers;

#[derive(Clone, Copy, Debug)]
enum Num {
    Int(i128),
    Real(f64),
}

impl Num {
    fn as_real(self) -> f64 {
        match self {
            #[allow(clippy::cast_precision_loss, reason = "float fallback is lossy")]
            Num::Int(i) => i as f64,
            Num::Real(r) => r,
        }
    }

    fn render(self) -> String {
        match self {
            Num::Int(i) => i.to_string(),
            Num::Real(r) => r.to_string(),
        }
    }
}

/// Recognise `-?digits(.digits)?([eE][+-]?digits)?` and `-?.digits`.
fn scan(text: &str) -> Option<bool> {
    let body = text.strip_prefix('-').unwrap_or(text);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (mantissa, None),
    };
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !digits(whole) || !fraction.map_or(true, digits) {
        return None;
    }
    if whole.is_empty() && fraction.map_or(true, str::is_empty) {
        return None;
    }
    if let Some(exponent) = exponent {
        let exponent = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        if exponent.is_empty() || !digits(exponent) {
            return None;
        }
    }
    Some(fraction.is_some() || exponent.is_some())
}

fn parse(text: &str) -> Option<Num> {
    let is_fraction = scan(text)?;
    if !is_fraction {
        if let Ok(i) = text.parse::<i128>() {
            return Some(Num::Int(i));
        }
    }
    let normalised = if text.starts_with("-.") {
        text.replacen("-.", "-0.", 1)
    } else if text.starts_with('.') {
        format!("0{text}")
    } else {
        text.to_string()
    };
    normalised.parse::<f64>().ok().map(Num::Real)
}

impl MachineNumbers {
    fn combine(
        a: &str,
        b: &str,
        int_op: fn(i128, i128) -> Option<i128>,
        real_op: fn(f64, f64) -> f64,
    ) -> Option<String> {
        let result = match (parse(a)?, parse(b)?) {
            (Num::Int(x), Num::Int(y)) => match int_op(x, y) {
                Some(v) => Num::Int(v),
                None => Num::Real(real_op(Num::Int(x).as_real(), Num::Int(y).as_real())),
            },
            (x, y) => Num::Real(real_op(x.as_real(), y.as_real())),
        };
        Some(result.render())
    }
}

impl NumericEngine for MachineNumbers {
    fn is_number(&self, text: &str, allow_fraction: bool) -> bool {
        match scan(text) {
            Some(is_fraction) => allow_fraction || !is_fraction,
            None => false,
        }
    }

    fn compare(&self, a: &str, b: &str) -> Option<Ordering> {
        match (parse(a)?, parse(b)?) {
            (Num::Int(x), Num::Int(y)) => Some(x.cmp(&y)),
            (x, y) => x.as_real().partial_cmp(&y.as_real()),
        }
    }

    fn add(&self, a: &str, b: &str) -> Option<String> {
        Self::combine(a, b, i128::checked_add, |x, y| x + y)
    }

    fn subtract(&self, a: &str, b: &str) -> Option<String> {
        Self::combine(a, b, i128::checked_sub, |x, y| x - y)
    }

    fn multiply(&self, a: &str, b: &str) -> Option<String> {
        Self::combine(a, b, i128::checked_mul, |x, y| x * y)
    }
}

#[cfg(test)]
mod tests;
