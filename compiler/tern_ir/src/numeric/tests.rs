use super::*;
use pretty_assertions::assert_eq;

#[test]
fn recognises_numerals() {
    let n = MachineNumbers;
    for text in ["0", "42", "-7", "3.25", "-0.5", ".5", "1e10", "2.5E-3"] {
        assert!(n.is_number(text, true), "{text} should be a number");
    }
    for text in ["", "-", ".", "x", "1x", "1e", "--1", "\"1\"", "1.2.3"] {
        assert!(!n.is_number(text, true), "{text} should not be a number");
    }
}

#[test]
fn integers_exclude_fractions() {
    let n = MachineNumbers;
    assert!(n.is_number("12", false));
    assert!(!n.is_number("1.5", false));
    assert!(!n.is_number("1e3", false));
    assert_eq!(n.to_index("3"), Some(3));
    assert_eq!(n.to_index("3.0"), None);
}

#[test]
fn compares_mixed_numerals() {
    let n = MachineNumbers;
    assert_eq!(n.compare("2", "10"), Some(Ordering::Less));
    assert_eq!(n.compare("2.5", "2"), Some(Ordering::Greater));
    assert_eq!(n.compare("-1", "-1"), Some(Ordering::Equal));
    assert_eq!(n.compare("a", "1"), None);
}

#[test]
fn arithmetic_stays_exact_for_integers() {
    let n = MachineNumbers;
    assert_eq!(n.add("7", "1").as_deref(), Some("8"));
    assert_eq!(n.subtract("3", "10").as_deref(), Some("-7"));
    assert_eq!(n.multiply("12", "12").as_deref(), Some("144"));
    assert_eq!(n.add("0.5", "0.25").as_deref(), Some("0.75"));
    assert_eq!(n.add("x", "1"), None);
}
