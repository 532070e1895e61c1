#![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn abc() -> Form {
    Form::new(vec![
        Expr::atom("List"),
        Expr::atom("a"),
        Expr::atom("b"),
        Expr::atom("c"),
    ])
}

fn list_of(names: &[&str]) -> Expr {
    Expr::list(names.iter().map(|n| Expr::atom(n)))
}

#[test]
fn structural_equality_ignores_sharing() {
    let a = Expr::Form(abc());
    let b = Expr::Form(abc());
    assert_eq!(a, b);
    assert_ne!(a, list_of(&["a", "b"]));
    assert_ne!(Expr::atom("a"), Expr::string("a"));
}

#[test]
fn atom_and_form_never_coerce() {
    assert_ne!(Expr::atom("f"), Expr::apply("f", []));
}

#[test]
fn destructive_delete_leaves_earlier_copy_intact() {
    let original = abc();
    let copy = original.flat_copy();
    let mut unique = original.clone().into_unique();
    unique.delete(2).unwrap();
    assert_eq!(Expr::Form(unique.into_form()), list_of(&["a", "c"]));
    assert_eq!(Expr::Form(copy), list_of(&["a", "b", "c"]));
    assert_eq!(Expr::Form(original), list_of(&["a", "b", "c"]));
}

#[test]
fn into_unique_reuses_unshared_spine() {
    let form = abc();
    assert!(!form.is_shared());
    let before = form.elements().as_ptr();
    let unique = form.into_unique();
    assert_eq!(unique.elements().as_ptr(), before);
}

#[test]
fn into_unique_copies_shared_spine() {
    let form = abc();
    let other = form.clone();
    assert!(form.is_shared());
    let mut unique = form.into_unique();
    unique.replace(1, Expr::atom("z")).unwrap();
    assert_eq!(Expr::Form(other), list_of(&["a", "b", "c"]));
}

#[test]
fn flat_copy_shares_elements_but_not_spine() {
    let inner = Form::new(vec![Expr::atom("g"), Expr::atom("x")]);
    let outer = Form::new(vec![Expr::atom("f"), Expr::Form(inner.clone())]);
    let copy = outer.flat_copy();
    assert!(!copy.ptr_eq(&outer));
    assert!(copy.operand(1).and_then(Expr::as_form).unwrap().ptr_eq(&inner));
}

#[test]
fn insert_allows_append_position() {
    let form = abc();
    let appended = form.inserted(4, Expr::atom("d")).unwrap();
    assert_eq!(Expr::Form(appended), list_of(&["a", "b", "c", "d"]));
    let front = form.inserted(1, Expr::atom("z")).unwrap();
    assert_eq!(Expr::Form(front), list_of(&["z", "a", "b", "c"]));
}

#[test]
fn indices_are_one_based_and_range_checked() {
    let form = abc();
    assert_eq!(
        form.deleted(0).unwrap_err(),
        ExprError::IndexOutOfRange { index: 0, arity: 3 }
    );
    assert_eq!(
        form.deleted(4).unwrap_err(),
        ExprError::IndexOutOfRange { index: 4, arity: 3 }
    );
    assert!(form.replaced(4, Expr::atom("x")).is_err());
    assert!(form.inserted(5, Expr::atom("x")).is_err());
    assert_eq!(
        Form::new(Vec::new()).to_unique().insert(1, Expr::atom("x")),
        Err(ExprError::EmptyForm)
    );
}

#[test]
fn reversed_keeps_head_in_place() {
    assert_eq!(Expr::Form(abc().reversed()), list_of(&["c", "b", "a"]));
}

#[test]
fn display_uses_prefix_notation() {
    let expr = Expr::apply("f", [Expr::atom("x"), Expr::apply("g", [Expr::string("s")])]);
    assert_eq!(expr.to_string(), "(f x (g \"s\"))");
}

#[test]
fn head_name_and_list_detection() {
    assert_eq!(list_of(&["a"]).head_name(), Some("List"));
    assert!(list_of(&[]).is_list());
    assert!(!Expr::atom("List").is_list());
    assert_eq!(Expr::form(vec![list_of(&[])]).head_name(), None);
}

fn arb_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-e]", 0..8)
}

fn form_of(names: &[String]) -> Form {
    let mut elements = vec![Expr::atom("List")];
    elements.extend(names.iter().map(|n| Expr::atom(n)));
    Form::new(elements)
}

proptest! {
    #[test]
    fn destructive_ops_never_touch_a_prior_copy(names in arb_names(), index in 1usize..10) {
        let original = form_of(&names);
        let snapshot = original.flat_copy();
        let mut unique = original.clone().into_unique();
        let _ = unique.delete(index);
        let _ = unique.insert(index, Expr::atom("q"));
        unique.reverse_operands();
        prop_assert_eq!(&Expr::Form(original), &Expr::Form(snapshot));
    }

    #[test]
    fn delete_matches_destructive_delete_on_copy(names in arb_names(), index in 0usize..10) {
        let x = form_of(&names);
        let pure = x.deleted(index);
        let mut unique = x.flat_copy().into_unique();
        let destructive = unique.delete(index).map(|_| unique.into_form());
        match (pure, destructive) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            _ => prop_assert!(false, "pure and destructive delete disagree"),
        }
        prop_assert_eq!(x, form_of(&names));
    }

    #[test]
    fn replace_matches_destructive_replace_on_copy(names in arb_names(), index in 0usize..10) {
        let x = form_of(&names);
        let pure = x.replaced(index, Expr::atom("z")).ok();
        let mut unique = x.flat_copy().into_unique();
        let destructive = unique
            .replace(index, Expr::atom("z"))
            .ok()
            .map(|_| unique.into_form());
        prop_assert_eq!(pure, destructive);
        prop_assert_eq!(x, form_of(&names));
    }

    #[test]
    fn insert_matches_destructive_insert_on_copy(names in arb_names(), index in 0usize..10) {
        let x = form_of(&names);
        let pure = x.inserted(index, Expr::atom("z")).ok();
        let mut unique = x.flat_copy().into_unique();
        let destructive = unique
            .insert(index, Expr::atom("z"))
            .ok()
            .map(|()| unique.into_form());
        prop_assert_eq!(pure, destructive);
    }
}
