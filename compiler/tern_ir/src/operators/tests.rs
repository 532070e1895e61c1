use super::*;
use pretty_assertions::assert_eq;

#[test]
fn redeclaring_overwrites_precedence() {
    let mut ops = OperatorRegistries::new();
    ops.set_operator(Fixity::Infix, 20, Atom::new("@"));
    assert_eq!(ops.precedence("@"), Some(20));
    ops.set_operator(Fixity::Infix, 30, Atom::new("@"));
    assert_eq!(ops.precedence("@"), Some(30));
    assert_eq!(ops.table(Fixity::Infix).len(), 1);
}

#[test]
fn overwrite_clears_refinements() {
    let mut ops = OperatorRegistries::new();
    ops.set_operator(Fixity::Infix, 20, Atom::new("^"));
    assert!(ops.set_right_associative("^"));
    assert!(ops.set_left_precedence("^", 5));
    assert_eq!(ops.right_precedence("^"), Some(19));
    assert_eq!(ops.left_precedence("^"), Some(5));
    ops.set_operator(Fixity::Infix, 20, Atom::new("^"));
    assert_eq!(ops.right_precedence("^"), Some(20));
    assert_eq!(ops.left_precedence("^"), Some(20));
}

#[test]
fn explicit_right_precedence_wins_over_associativity() {
    let mut ops = OperatorRegistries::new();
    ops.set_operator(Fixity::Infix, 70, Atom::new(":="));
    ops.set_right_associative(":=");
    ops.set_right_precedence(":=", 10);
    assert_eq!(ops.right_precedence(":="), Some(10));
}

#[test]
fn refinements_require_an_infix_entry() {
    let mut ops = OperatorRegistries::new();
    ops.set_operator(Fixity::Prefix, 10, Atom::new("!"));
    assert!(!ops.set_left_precedence("!", 3));
    assert!(!ops.set_right_precedence("!", 3));
    assert!(!ops.set_right_associative("!"));
}

#[test]
fn tables_are_independent() {
    let mut ops = OperatorRegistries::new();
    ops.set_operator(Fixity::Prefix, 50, Atom::new("-"));
    ops.set_operator(Fixity::Infix, 70, Atom::new("-"));
    assert!(ops.is_operator(Fixity::Prefix, "-"));
    assert!(ops.is_operator(Fixity::Infix, "-"));
    assert!(!ops.is_operator(Fixity::Postfix, "-"));
    assert_eq!(ops.table(Fixity::Prefix).lookup("-").map(|d| d.precedence), Some(50));
}

#[test]
fn lookup_order_is_infix_prefix_postfix_bodied() {
    let mut ops = OperatorRegistries::new();
    ops.set_operator(Fixity::Bodied, 60000, Atom::new("For"));
    assert_eq!(ops.lookup("For").map(|(f, _)| f), Some(Fixity::Bodied));
    ops.set_operator(Fixity::Postfix, 0, Atom::new("For"));
    assert_eq!(ops.lookup("For").map(|(f, _)| f), Some(Fixity::Postfix));
    ops.set_operator(Fixity::Prefix, 5, Atom::new("For"));
    assert_eq!(ops.lookup("For").map(|(f, _)| f), Some(Fixity::Prefix));
    ops.set_operator(Fixity::Infix, 7, Atom::new("For"));
    assert_eq!(ops.lookup("For").map(|(f, _)| f), Some(Fixity::Infix));
}

#[test]
fn side_queries_follow_their_own_order() {
    let mut ops = OperatorRegistries::new();
    ops.set_operator(Fixity::Postfix, 3, Atom::new("!"));
    ops.set_operator(Fixity::Bodied, 9, Atom::new("While"));
    assert_eq!(ops.left_precedence("!"), Some(3));
    assert_eq!(ops.right_precedence("!"), None);
    assert_eq!(ops.right_precedence("While"), Some(9));
    assert_eq!(ops.left_precedence("While"), None);
    assert_eq!(ops.precedence("nothing"), None);
}
