use super::*;
use pretty_assertions::assert_eq;

fn a(name: &str) -> Atom {
    Atom::new(name)
}

fn n(value: i64) -> Expr {
    Expr::integer(value)
}

#[test]
fn set_without_local_goes_global() {
    let mut env = Environment::new();
    env.set_variable(&a("x"), n(1));
    assert_eq!(env.get_variable("x"), Some(n(1)));
    assert_eq!(env.global("x"), Some(&n(1)));
    assert!(env.unset_variable("x"));
    assert_eq!(env.get_variable("x"), None);
    assert!(!env.unset_variable("x"));
}

#[test]
fn local_is_invisible_after_pop() {
    let mut env = Environment::new();
    env.push_frame(false);
    env.define_local(a("x"), n(1));
    assert_eq!(env.get_variable("x"), Some(n(1)));
    env.pop_frame();
    assert_eq!(env.get_variable("x"), None);
}

#[test]
fn inner_rebinding_never_touches_outer_binding() {
    let mut env = Environment::new();
    env.push_frame(false);
    env.define_local(a("x"), n(1));
    env.push_frame(true);
    env.define_local(a("x"), n(2));
    env.set_variable(&a("x"), n(3));
    assert_eq!(env.get_variable("x"), Some(n(3)));
    env.pop_frame();
    assert_eq!(env.get_variable("x"), Some(n(1)));
}

#[test]
fn inheriting_frame_assigns_through_to_outer_local() {
    let mut env = Environment::new();
    env.push_frame(false);
    env.define_local(a("x"), n(1));
    env.push_frame(true);
    env.set_variable(&a("x"), n(5));
    env.pop_frame();
    assert_eq!(env.get_variable("x"), Some(n(5)));
    assert_eq!(env.global("x"), None);
}

#[test]
fn isolated_frame_cannot_see_caller_locals() {
    let mut env = Environment::new();
    env.push_frame(false);
    env.define_local(a("x"), n(1));
    env.push_frame(false);
    assert_eq!(env.get_variable("x"), None);
    env.set_variable(&a("x"), n(9));
    env.pop_frame();
    assert_eq!(env.get_variable("x"), Some(n(1)));
    env.pop_frame();
    assert_eq!(env.get_variable("x"), Some(n(9)));
}

#[test]
fn unbound_local_shadows_global() {
    let mut env = Environment::new();
    env.set_variable(&a("x"), n(1));
    env.push_frame(false);
    env.bind_local(a("x"));
    assert!(!env.is_bound("x"));
    env.set_variable(&a("x"), n(2));
    assert_eq!(env.get_variable("x"), Some(n(2)));
    env.pop_frame();
    assert_eq!(env.get_variable("x"), Some(n(1)));
}

#[test]
fn top_level_frame_is_never_popped() {
    let mut env = Environment::new();
    env.pop_frame();
    env.pop_frame();
    assert_eq!(env.depth(), 1);
}

#[test]
fn visible_locals_follow_the_chain() {
    let mut env = Environment::new();
    env.push_frame(false);
    env.define_local(a("b"), n(1));
    env.push_frame(true);
    env.define_local(a("a"), n(2));
    env.bind_local(a("b"));
    let names: Vec<String> = env.visible_locals().iter().map(ToString::to_string).collect();
    assert_eq!(names, vec!["a", "b"]);
    env.push_frame(false);
    assert!(env.visible_locals().is_empty());
}
