//! Opaque extension objects.
//!
//! The core never looks inside an opaque value. It only uses the capability
//! surface below: a type name, an optional size and 1-based element access.
//! Anything richer (a compiled pattern's `matches` test, for instance) is
//! reached by downcasting through `as_any` at the built-in that owns it.

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::expr::Expr;

/// Capability surface of a foreign value.
pub trait OpaqueValue: fmt::Debug + Send + Sync {
    /// Name reported by `GenericTypeName`.
    fn type_name(&self) -> &str;

    /// Number of elements, for indexable values.
    fn size(&self) -> Option<usize> {
        None
    }

    /// Element at 1-based `index`.
    fn get(&self, _index: usize) -> Option<Expr> {
        None
    }

    /// Store `value` at 1-based `index`. Returns `false` when the index is
    /// out of range or the value is not indexable.
    fn set(&self, _index: usize, _value: Expr) -> bool {
        false
    }

    /// Value equality as defined by the object itself. Identity is checked
    /// before this is consulted.
    fn same_value(&self, _other: &dyn OpaqueValue) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to an opaque value.
#[derive(Clone)]
pub struct OpaqueRef(Arc<dyn OpaqueValue>);

impl OpaqueRef {
    pub fn new(value: impl OpaqueValue + 'static) -> Self {
        OpaqueRef(Arc::new(value))
    }

    #[inline]
    pub fn ptr_eq(&self, other: &OpaqueRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The concrete object, when it is a `T`.
    pub fn downcast_ref<T: OpaqueValue + 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl Deref for OpaqueRef {
    type Target = dyn OpaqueValue;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl PartialEq for OpaqueRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.same_value(other.0.as_ref())
    }
}

impl fmt::Debug for OpaqueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

/// Largest element count `ArrayObject::try_new` accepts.
pub const MAX_ARRAY_SIZE: usize = 1 << 24;

/// Fixed-size mutable array of expressions.
///
/// Arrays are reference objects: every handle sees element updates.
#[derive(Debug)]
pub struct ArrayObject {
    items: RwLock<Vec<Expr>>,
}

impl ArrayObject {
    /// Array of `size` elements, each initialised to `init`.
    ///
    /// `None` when `size` exceeds [`MAX_ARRAY_SIZE`] or the storage cannot
    /// be allocated.
    pub fn try_new(size: usize, init: &Expr) -> Option<Self> {
        if size > MAX_ARRAY_SIZE {
            return None;
        }
        let mut items = Vec::new();
        items.try_reserve_exact(size).ok()?;
        items.resize(size, init.clone());
        Some(ArrayObject {
            items: RwLock::new(items),
        })
    }

    /// Snapshot of the current elements.
    pub fn to_vec(&self) -> Vec<Expr> {
        self.items.read().clone()
    }
}

impl OpaqueValue for ArrayObject {
    fn type_name(&self) -> &str {
        "Array"
    }

    fn size(&self) -> Option<usize> {
        Some(self.items.read().len())
    }

    fn get(&self, index: usize) -> Option<Expr> {
        let slot = index.checked_sub(1)?;
        self.items.read().get(slot).cloned()
    }

    fn set(&self, index: usize, value: Expr) -> bool {
        let Some(slot) = index.checked_sub(1) else {
            return false;
        };
        match self.items.write().get_mut(slot) {
            Some(item) => {
                *item = value;
                true
            }
            None => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn array_access_is_one_based() {
        let array = ArrayObject::try_new(3, &Expr::atom("0")).unwrap();
        assert_eq!(array.size(), Some(3));
        assert!(array.set(1, Expr::atom("a")));
        assert!(!array.set(0, Expr::atom("x")));
        assert!(!array.set(4, Expr::atom("x")));
        assert_eq!(array.get(1), Some(Expr::atom("a")));
        assert_eq!(array.get(3), Some(Expr::atom("0")));
        assert_eq!(array.get(0), None);
    }

    #[test]
    fn opaque_equality_is_identity_by_default() {
        let a = Expr::opaque(ArrayObject::try_new(1, &Expr::atom("x")).unwrap());
        let b = Expr::opaque(ArrayObject::try_new(1, &Expr::atom("x")).unwrap());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn handles_share_updates() {
        let expr = Expr::opaque(ArrayObject::try_new(2, &Expr::atom("0")).unwrap());
        let other = expr.clone();
        let opaque = expr.as_opaque().map(|o| o.set(2, Expr::atom("y")));
        assert_eq!(opaque, Some(true));
        let seen = other.as_opaque().and_then(|o| o.get(2));
        assert_eq!(seen, Some(Expr::atom("y")));
        assert!(other.as_opaque().and_then(OpaqueRef::downcast_ref::<ArrayObject>).is_some());
    }

    #[test]
    fn oversized_arrays_are_refused() {
        assert!(ArrayObject::try_new(MAX_ARRAY_SIZE + 1, &Expr::atom("0")).is_none());
        assert!(ArrayObject::try_new(usize::MAX, &Expr::atom("0")).is_none());
        assert_eq!(ArrayObject::try_new(0, &Expr::atom("0")).unwrap().size(), Some(0));
    }
}
