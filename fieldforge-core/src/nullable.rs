//! Optional values.

use crate::factory::FieldFactory;
use crate::field::{BoxedField, Field, FieldShape, Observer, ObserverId, Observers};
use std::fmt;
use std::rc::Rc;

/// Field editing `Option<T>`.
///
/// The inner field always exists. Toggling presence off hides it without
/// discarding its state, so toggling back on restores the last edit.
pub struct Nullable<T> {
    label: String,
    initial_value: Option<T>,
    present: bool,
    inner: BoxedField<T>,
    observers: Observers<Option<T>>,
}

impl<T: Clone + 'static> Nullable<T> {
    /// Wraps `inner`, starting present or absent.
    #[must_use]
    pub fn new(label: impl Into<String>, initial_value: Option<T>, inner: BoxedField<T>) -> Self {
        Self {
            label: label.into(),
            present: initial_value.is_some(),
            initial_value,
            inner,
            observers: Observers::new(),
        }
    }

    /// Returns true if a value is present.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Shows or hides the inner field.
    pub fn set_present(&mut self, present: bool) {
        if self.present == present {
            return;
        }
        self.present = present;
        self.notify();
    }

    /// Returns the inner field, whether or not it is shown.
    #[must_use]
    pub fn inner(&self) -> &dyn Field<T> {
        self.inner.as_ref()
    }

    /// Mutates the inner field, then notifies observers.
    pub fn edit<R>(&mut self, edit: impl FnOnce(&mut dyn Field<T>) -> R) -> R {
        let result = edit(self.inner.as_mut());
        self.notify();
        result
    }

    fn current(&self) -> Option<T> {
        self.present.then(|| self.inner.value())
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let value = self.current();
        self.observers.notify(&value);
    }
}

impl<T: Clone + 'static> Field<Option<T>> for Nullable<T> {
    fn label(&self) -> &str {
        &self.label
    }

    fn value(&self) -> Option<T> {
        self.current()
    }

    fn initial_value(&self) -> &Option<T> {
        &self.initial_value
    }

    fn set(&mut self, value: Option<T>) {
        match value {
            Some(value) => {
                self.present = true;
                self.inner.set(value);
            }
            None => self.present = false,
        }
        self.notify();
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.present = self.initial_value.is_some();
        self.notify();
    }

    fn subscribe(&mut self, observer: Observer<Option<T>>) -> ObserverId {
        self.observers.subscribe(observer)
    }

    fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn shape(&self) -> FieldShape {
        FieldShape::Nullable {
            label: self.label.clone(),
            present: self.present,
            inner: Box::new(self.inner.shape()),
        }
    }
}

impl<T> fmt::Debug for Nullable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Nullable")
            .field("label", &self.label)
            .field("present", &self.present)
            .finish()
    }
}

/// Factory for `Option<T>` fields.
///
/// When the initial value is `None` the inner field is built from `fallback()`.
pub struct NullableField<F, T> {
    inner: F,
    fallback: Rc<dyn Fn() -> T>,
}

impl<F, T> NullableField<F, T> {
    /// Wraps the factory of the underlying type.
    pub fn new(inner: F, fallback: impl Fn() -> T + 'static) -> Self {
        Self {
            inner,
            fallback: Rc::new(fallback),
        }
    }
}

impl<F: Clone, T> Clone for NullableField<F, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            fallback: Rc::clone(&self.fallback),
        }
    }
}

impl<F: fmt::Debug, T> fmt::Debug for NullableField<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NullableField")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<F, T> FieldFactory<Option<T>> for NullableField<F, T>
where
    F: FieldFactory<T>,
    T: Clone + 'static,
{
    type Field = Nullable<T>;

    fn create(&self, label: &str, initial_value: Option<T>) -> Nullable<T> {
        let start = initial_value.clone().unwrap_or_else(|| (self.fallback)());
        let inner = Box::new(self.inner.create(label, start));
        Nullable::new(label, initial_value, inner)
    }
}
