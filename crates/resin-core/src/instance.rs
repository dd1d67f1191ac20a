//! # Shared Instance Handles
//!
//! [`Instance`] is the handle to one materialized mapped object. It is a
//! cloneable reference: cloning the handle never clones the object, so
//! every mention of the same resource within one decode call can alias
//! the identical object, and consumers detect "same entity" through
//! [`Instance::ptr_eq`].
//!
//! ## Erasure
//!
//! The decode pipeline works over heterogeneous mapped types (an article
//! holding a reference to a user), so the handle erases the concrete type
//! behind `Rc<dyn Any>` with the concrete payload always `RefCell<T>`.
//! Typed access goes through the checked [`borrow`](Instance::borrow) /
//! [`borrow_mut`](Instance::borrow_mut) downcasts.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

/// Shared handle to one mapped object instance.
///
/// Deliberately `!Send`: the pipeline is single-threaded by contract and
/// `Rc` sharing is what carries the reference-identity guarantee.
#[derive(Clone)]
pub struct Instance {
    inner: Rc<dyn Any>,
}

impl Instance {
    /// Wrap a concrete mapped value into a shared handle.
    pub fn new<T: 'static>(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(value)),
        }
    }

    /// Whether this handle holds a value of type `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.inner.is::<RefCell<T>>()
    }

    /// Immutably borrow the underlying value as `T`.
    ///
    /// Returns `None` when the handle holds a different mapped type.
    /// Panics (like any `RefCell`) if the value is mutably borrowed.
    pub fn borrow<T: 'static>(&self) -> Option<Ref<'_, T>> {
        self.inner.downcast_ref::<RefCell<T>>().map(RefCell::borrow)
    }

    /// Mutably borrow the underlying value as `T`.
    ///
    /// Returns `None` when the handle holds a different mapped type.
    pub fn borrow_mut<T: 'static>(&self) -> Option<RefMut<'_, T>> {
        self.inner
            .downcast_ref::<RefCell<T>>()
            .map(RefCell::borrow_mut)
    }

    /// Reference identity: do both handles alias the same object?
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("addr", &Rc::as_ptr(&self.inner))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Widget {
        label: Option<String>,
    }

    #[test]
    fn borrow_downcasts_to_concrete_type() {
        let inst = Instance::new(Widget {
            label: Some("w".into()),
        });
        assert!(inst.is::<Widget>());
        let widget = inst.borrow::<Widget>().unwrap();
        assert_eq!(widget.label.as_deref(), Some("w"));
    }

    #[test]
    fn borrow_wrong_type_is_none() {
        let inst = Instance::new(Widget::default());
        assert!(!inst.is::<String>());
        assert!(inst.borrow::<String>().is_none());
    }

    #[test]
    fn borrow_mut_mutates_shared_value() {
        let inst = Instance::new(Widget::default());
        let alias = inst.clone();

        inst.borrow_mut::<Widget>().unwrap().label = Some("set".into());

        // The clone aliases the same object.
        assert_eq!(
            alias.borrow::<Widget>().unwrap().label.as_deref(),
            Some("set")
        );
    }

    #[test]
    fn ptr_eq_distinguishes_identity_from_equality() {
        let a = Instance::new(Widget::default());
        let b = a.clone();
        let c = Instance::new(Widget::default());

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        // Structural equality of the payloads does not imply identity.
        assert_eq!(
            *a.borrow::<Widget>().unwrap(),
            *c.borrow::<Widget>().unwrap()
        );
    }

    #[test]
    fn debug_does_not_require_payload_type() {
        let inst = Instance::new(Widget::default());
        let rendered = format!("{inst:?}");
        assert!(rendered.contains("Instance"));
    }
}
