//! Field factories.
//!
//! A factory knows how to build a field for a type given a label and an initial
//! value. Generated code is made of factories: composite factories hold the
//! factories of their members and call them when a field is created.

use crate::field::{BoxedField, Field};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

/// Builds fields editing values of `T`.
pub trait FieldFactory<T> {
    /// Field type produced by this factory.
    type Field: Field<T> + 'static;

    /// Creates a field with the given label and initial value.
    fn create(&self, label: &str, initial_value: T) -> Self::Field;
}

/// Factory backed by a closure.
#[derive(Clone)]
pub struct FnFactory<F> {
    build: F,
}

impl<F> FnFactory<F> {
    /// Wraps a closure `(label, initial_value) -> field`.
    pub fn new<T, R>(build: F) -> Self
    where
        F: Fn(&str, T) -> R,
        R: Field<T> + 'static,
    {
        Self { build }
    }
}

impl<T, R, F> FieldFactory<T> for FnFactory<F>
where
    F: Fn(&str, T) -> R,
    R: Field<T> + 'static,
{
    type Field = R;

    fn create(&self, label: &str, initial_value: T) -> R {
        (self.build)(label, initial_value)
    }
}

impl<F> fmt::Debug for FnFactory<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnFactory")
    }
}

/// Type-erased, cloneable factory.
///
/// Used wherever the concrete factory type cannot be named, most notably for
/// members a generator left for the caller to supply.
pub struct SharedFactory<T> {
    build: Rc<dyn Fn(&str, T) -> BoxedField<T>>,
    _marker: PhantomData<fn(T)>,
}

impl<T: 'static> SharedFactory<T> {
    /// Erases a concrete factory.
    pub fn new<F>(factory: F) -> Self
    where
        F: FieldFactory<T> + 'static,
    {
        Self {
            build: Rc::new(move |label: &str, initial_value: T| {
                Box::new(factory.create(label, initial_value)) as BoxedField<T>
            }),
            _marker: PhantomData,
        }
    }

    /// Wraps a closure returning a boxed field.
    pub fn from_fn<F>(build: F) -> Self
    where
        F: Fn(&str, T) -> BoxedField<T> + 'static,
    {
        Self {
            build: Rc::new(build),
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for SharedFactory<T> {
    fn clone(&self) -> Self {
        Self {
            build: Rc::clone(&self.build),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for SharedFactory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFactory")
    }
}

impl<T: 'static> FieldFactory<T> for SharedFactory<T> {
    type Field = BoxedField<T>;

    fn create(&self, label: &str, initial_value: T) -> BoxedField<T> {
        (self.build)(label, initial_value)
    }
}
