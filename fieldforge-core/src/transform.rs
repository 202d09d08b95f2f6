//! Adapters presenting a field of one type as a field of another.
//!
//! Value wrappers such as `struct UserId(i64)` are edited through the field of
//! their underlying primitive: `value()` maps the inner value back into the
//! wrapper and `set` maps the wrapper down before forwarding.

use crate::factory::FieldFactory;
use crate::field::{BoxedField, Field, FieldShape, Observer, ObserverId, Observers};
use std::fmt;
use std::rc::Rc;

/// Field editing `T` through an inner field of `U`.
pub struct Transform<T, U> {
    label: String,
    initial_value: T,
    inner: BoxedField<U>,
    to: Rc<dyn Fn(&T) -> U>,
    from: Rc<dyn Fn(U) -> T>,
    observers: Observers<T>,
}

impl<T: Clone + 'static, U: Clone + 'static> Transform<T, U> {
    /// Creates the adapter.
    ///
    /// # Arguments
    /// * `label` - Field label
    /// * `initial_value` - Initial outer value
    /// * `inner` - Field of the underlying type, already holding `to(initial_value)`
    /// * `to` - Outer to inner mapping
    /// * `from` - Inner to outer mapping
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        initial_value: T,
        inner: BoxedField<U>,
        to: Rc<dyn Fn(&T) -> U>,
        from: Rc<dyn Fn(U) -> T>,
    ) -> Self {
        Self {
            label: label.into(),
            initial_value,
            inner,
            to,
            from,
            observers: Observers::new(),
        }
    }

    /// Returns the underlying field.
    #[must_use]
    pub fn inner(&self) -> &dyn Field<U> {
        self.inner.as_ref()
    }

    /// Mutates the underlying field, then notifies observers.
    pub fn edit<R>(&mut self, edit: impl FnOnce(&mut dyn Field<U>) -> R) -> R {
        let result = edit(self.inner.as_mut());
        self.notify();
        result
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let value = (self.from)(self.inner.value());
        self.observers.notify(&value);
    }
}

impl<T: Clone + 'static, U: Clone + 'static> Field<T> for Transform<T, U> {
    fn label(&self) -> &str {
        &self.label
    }

    fn value(&self) -> T {
        (self.from)(self.inner.value())
    }

    fn initial_value(&self) -> &T {
        &self.initial_value
    }

    fn set(&mut self, value: T) {
        self.inner.set((self.to)(&value));
        self.notify();
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.notify();
    }

    fn subscribe(&mut self, observer: Observer<T>) -> ObserverId {
        self.observers.subscribe(observer)
    }

    fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn shape(&self) -> FieldShape {
        FieldShape::Transform {
            label: self.label.clone(),
            inner: Box::new(self.inner.shape()),
        }
    }
}

impl<T, U> fmt::Debug for Transform<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("label", &self.label)
            .finish()
    }
}

/// Factory adapting a factory of `U` into a factory of `T`.
pub struct TransformField<F, T, U> {
    inner: F,
    to: Rc<dyn Fn(&T) -> U>,
    from: Rc<dyn Fn(U) -> T>,
}

impl<F, T, U> TransformField<F, T, U> {
    /// Wraps `inner` with the `to`/`from` mapping pair.
    pub fn new(
        inner: F,
        to: impl Fn(&T) -> U + 'static,
        from: impl Fn(U) -> T + 'static,
    ) -> Self {
        Self {
            inner,
            to: Rc::new(to),
            from: Rc::new(from),
        }
    }
}

impl<F: Clone, T, U> Clone for TransformField<F, T, U> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            to: Rc::clone(&self.to),
            from: Rc::clone(&self.from),
        }
    }
}

impl<F: fmt::Debug, T, U> fmt::Debug for TransformField<F, T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformField")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<F, T, U> FieldFactory<T> for TransformField<F, T, U>
where
    F: FieldFactory<U>,
    T: Clone + 'static,
    U: Clone + 'static,
{
    type Field = Transform<T, U>;

    fn create(&self, label: &str, initial_value: T) -> Transform<T, U> {
        let inner = Box::new(self.inner.create(label, (self.to)(&initial_value)));
        Transform::new(
            label,
            initial_value,
            inner,
            Rc::clone(&self.to),
            Rc::clone(&self.from),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::I64Field;

    #[derive(Debug, Clone, PartialEq)]
    struct UserId(i64);

    fn user_id(initial: i64) -> Transform<UserId, i64> {
        TransformField::new(I64Field, |value: &UserId| value.0, UserId).create("id", UserId(initial))
    }

    #[test]
    fn test_value_maps_through_inner() {
        let mut field = user_id(5);
        assert_eq!(field.value(), UserId(5));
        assert_eq!(field.inner().value(), 5);

        field.set(UserId(9));
        assert_eq!(field.inner().value(), 9);
    }

    #[test]
    fn test_inner_edit_is_observed() {
        let mut field = user_id(1);
        let seen = Rc::new(std::cell::RefCell::new(None));
        let sink = Rc::clone(&seen);
        field.subscribe(Box::new(move |v: &UserId| *sink.borrow_mut() = Some(v.clone())));

        field.edit(|inner| inner.set(42));
        assert_eq!(*seen.borrow(), Some(UserId(42)));

        field.reset();
        assert_eq!(field.value(), UserId(1));
        assert_eq!(field.shape().kind(), "transform");
    }
}
