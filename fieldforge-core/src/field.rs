//! The `Field` trait, observers, and structural shapes.
//!
//! A field is a stateful, observable cell editing a value of some type. Fields
//! compose: a product type is edited by a [`crate::Combined3`] (or another arity)
//! owning one child per member, a closed sum by a [`crate::Polymorphic`], and so on.
//! All fields are single-threaded; observers run synchronously on mutation.

use std::fmt;

/// Callback invoked with the new value after every mutation of a field.
pub type Observer<T> = Box<dyn FnMut(&T)>;

/// Handle returned by [`Field::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Returns the raw id.
    #[must_use]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// Ordered list of observers attached to one field.
pub struct Observers<T> {
    next_id: u64,
    entries: Vec<(ObserverId, Observer<T>)>,
}

impl<T> Observers<T> {
    /// Creates an empty observer list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Registers an observer and returns its id.
    pub fn subscribe(&mut self, observer: Observer<T>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    /// Removes an observer. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Calls every observer in subscription order.
    pub fn notify(&mut self, value: &T) {
        for (_, observer) in &mut self.entries {
            observer(value);
        }
    }

    /// Returns the number of observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nobody is observing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}

/// An editable, observable value cell.
pub trait Field<T> {
    /// Label shown next to the field.
    fn label(&self) -> &str;

    /// Returns the current value.
    fn value(&self) -> T;

    /// Returns the value the field was created with.
    fn initial_value(&self) -> &T;

    /// Replaces the current value and notifies observers.
    fn set(&mut self, value: T);

    /// Restores the initial value and notifies observers.
    fn reset(&mut self);

    /// Registers an observer called after every mutation.
    fn subscribe(&mut self, observer: Observer<T>) -> ObserverId;

    /// Removes an observer. Returns false if the id was unknown.
    fn unsubscribe(&mut self, id: ObserverId) -> bool;

    /// Describes the structure of this field and its children.
    fn shape(&self) -> FieldShape;

    /// Returns true if the current value differs from the initial one.
    fn is_modified(&self) -> bool
    where
        T: PartialEq,
    {
        self.value() != *self.initial_value()
    }
}

/// Boxed, type-erased field.
pub type BoxedField<T> = Box<dyn Field<T>>;

impl<T, F> Field<T> for Box<F>
where
    F: Field<T> + ?Sized,
{
    fn label(&self) -> &str {
        (**self).label()
    }

    fn value(&self) -> T {
        (**self).value()
    }

    fn initial_value(&self) -> &T {
        (**self).initial_value()
    }

    fn set(&mut self, value: T) {
        (**self).set(value);
    }

    fn reset(&mut self) {
        (**self).reset();
    }

    fn subscribe(&mut self, observer: Observer<T>) -> ObserverId {
        (**self).subscribe(observer)
    }

    fn unsubscribe(&mut self, id: ObserverId) -> bool {
        (**self).unsubscribe(id)
    }

    fn shape(&self) -> FieldShape {
        (**self).shape()
    }
}

/// Structural description of a field tree.
///
/// Renderers walk this to decide which widget to draw; tests use it to check
/// what a generated factory built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldShape {
    /// Primitive or enum leaf.
    Leaf {
        /// Field label.
        label: String,
        /// Rust type name of the edited value.
        value_type: &'static str,
        /// Number of selectable options (0 for free input).
        options: usize,
    },
    /// Constant singleton value.
    Fixed {
        /// Field label.
        label: String,
    },
    /// Product of child fields.
    Combined {
        /// Field label.
        label: String,
        /// Children in declaration order.
        children: Vec<FieldShape>,
    },
    /// Closed sum of variant fields.
    Polymorphic {
        /// Field label.
        label: String,
        /// Tag of the live variant.
        selected: String,
        /// One child per variant, labelled with the variant tag.
        variants: Vec<FieldShape>,
    },
    /// Optional value.
    Nullable {
        /// Field label.
        label: String,
        /// Whether a value is present.
        present: bool,
        /// Field editing the wrapped value.
        inner: Box<FieldShape>,
    },
    /// Adapter over a field of another type.
    Transform {
        /// Field label.
        label: String,
        /// Field editing the underlying value.
        inner: Box<FieldShape>,
    },
}

impl FieldShape {
    /// Returns the label of this node.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Leaf { label, .. }
            | Self::Fixed { label }
            | Self::Combined { label, .. }
            | Self::Polymorphic { label, .. }
            | Self::Nullable { label, .. }
            | Self::Transform { label, .. } => label,
        }
    }

    /// Returns the combinator name of this node.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Leaf { .. } => "leaf",
            Self::Fixed { .. } => "fixed",
            Self::Combined { .. } => "combined",
            Self::Polymorphic { .. } => "polymorphic",
            Self::Nullable { .. } => "nullable",
            Self::Transform { .. } => "transform",
        }
    }

    /// Returns the direct children of this node.
    #[must_use]
    pub fn children(&self) -> Vec<&FieldShape> {
        match self {
            Self::Leaf { .. } | Self::Fixed { .. } => Vec::new(),
            Self::Combined { children, .. } => children.iter().collect(),
            Self::Polymorphic { variants, .. } => variants.iter().collect(),
            Self::Nullable { inner, .. } | Self::Transform { inner, .. } => vec![inner.as_ref()],
        }
    }
}
