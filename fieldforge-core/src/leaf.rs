//! Leaf fields: primitives, enumerations and singleton constants.

use crate::error::{FieldError, Result};
use crate::factory::FieldFactory;
use crate::field::{Field, FieldShape, Observer, ObserverId, Observers};

/// Field holding a single primitive or enum value.
///
/// Enum leaves carry the ordered list of selectable entries.
#[derive(Debug)]
pub struct Leaf<T> {
    label: String,
    initial_value: T,
    value: T,
    options: Vec<T>,
    observers: Observers<T>,
}

impl<T: Clone> Leaf<T> {
    /// Creates a free-input leaf.
    #[must_use]
    pub fn new(label: impl Into<String>, initial_value: T) -> Self {
        Self::with_options(label, initial_value, Vec::new())
    }

    /// Creates a leaf restricted to the given options.
    #[must_use]
    pub fn with_options(label: impl Into<String>, initial_value: T, options: Vec<T>) -> Self {
        Self {
            label: label.into(),
            value: initial_value.clone(),
            initial_value,
            options,
            observers: Observers::new(),
        }
    }

    /// Returns the selectable options, empty for free-input leaves.
    #[must_use]
    pub fn options(&self) -> &[T] {
        &self.options
    }

    /// Selects the option at `index`.
    ///
    /// # Errors
    /// Returns an error if the leaf has no options or the index is out of range.
    pub fn select(&mut self, index: usize) -> Result<()> {
        if self.options.is_empty() {
            return Err(FieldError::NoOptions {
                label: self.label.clone(),
            });
        }
        let option = self
            .options
            .get(index)
            .cloned()
            .ok_or_else(|| FieldError::OptionOutOfRange {
                label: self.label.clone(),
                index,
                len: self.options.len(),
            })?;
        self.value = option;
        self.observers.notify(&self.value);
        Ok(())
    }

    /// Returns the index of the current value in the option list.
    #[must_use]
    pub fn selected_index(&self) -> Option<usize>
    where
        T: PartialEq,
    {
        self.options.iter().position(|option| *option == self.value)
    }
}

impl<T: Clone + 'static> Field<T> for Leaf<T> {
    fn label(&self) -> &str {
        &self.label
    }

    fn value(&self) -> T {
        self.value.clone()
    }

    fn initial_value(&self) -> &T {
        &self.initial_value
    }

    fn set(&mut self, value: T) {
        self.value = value;
        self.observers.notify(&self.value);
    }

    fn reset(&mut self) {
        self.set(self.initial_value.clone());
    }

    fn subscribe(&mut self, observer: Observer<T>) -> ObserverId {
        self.observers.subscribe(observer)
    }

    fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn shape(&self) -> FieldShape {
        FieldShape::Leaf {
            label: self.label.clone(),
            value_type: std::any::type_name::<T>(),
            options: self.options.len(),
        }
    }
}

/// Field for a singleton: a type with exactly one instance.
#[derive(Debug)]
pub struct Fixed<T> {
    label: String,
    initial_value: T,
    value: T,
    observers: Observers<T>,
}

impl<T: Clone> Fixed<T> {
    /// Creates a fixed field.
    #[must_use]
    pub fn new(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            initial_value: value.clone(),
            value,
            observers: Observers::new(),
        }
    }
}

impl<T: Clone + 'static> Field<T> for Fixed<T> {
    fn label(&self) -> &str {
        &self.label
    }

    fn value(&self) -> T {
        self.value.clone()
    }

    fn initial_value(&self) -> &T {
        &self.initial_value
    }

    fn set(&mut self, value: T) {
        self.value = value;
        self.observers.notify(&self.value);
    }

    fn reset(&mut self) {
        self.set(self.initial_value.clone());
    }

    fn subscribe(&mut self, observer: Observer<T>) -> ObserverId {
        self.observers.subscribe(observer)
    }

    fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn shape(&self) -> FieldShape {
        FieldShape::Fixed {
            label: self.label.clone(),
        }
    }
}

macro_rules! leaf_factory {
    ($(#[$meta:meta])* $name:ident => $ty:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl FieldFactory<$ty> for $name {
            type Field = Leaf<$ty>;

            fn create(&self, label: &str, initial_value: $ty) -> Leaf<$ty> {
                Leaf::new(label, initial_value)
            }
        }
    };
}

leaf_factory!(
    /// Factory for `String` leaves.
    StringField => String
);
leaf_factory!(
    /// Factory for `i32` leaves.
    I32Field => i32
);
leaf_factory!(
    /// Factory for `i64` leaves.
    I64Field => i64
);
leaf_factory!(
    /// Factory for `f32` leaves.
    F32Field => f32
);
leaf_factory!(
    /// Factory for `f64` leaves.
    F64Field => f64
);
leaf_factory!(
    /// Factory for `bool` leaves.
    BoolField => bool
);
leaf_factory!(
    /// Factory for `u8` leaves.
    U8Field => u8
);

/// Factory for enumeration leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumField<T> {
    entries: Vec<T>,
}

impl<T> EnumField<T> {
    /// Creates a factory offering `entries` in declaration order.
    #[must_use]
    pub fn new(entries: Vec<T>) -> Self {
        Self { entries }
    }

    /// Returns the entries.
    #[must_use]
    pub fn entries(&self) -> &[T] {
        &self.entries
    }
}

impl<T: Clone + 'static> FieldFactory<T> for EnumField<T> {
    type Field = Leaf<T>;

    fn create(&self, label: &str, initial_value: T) -> Leaf<T> {
        Leaf::with_options(label, initial_value, self.entries.clone())
    }
}

/// Factory for singleton constants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedField;

impl<T: Clone + 'static> FieldFactory<T> for FixedField {
    type Field = Fixed<T>;

    fn create(&self, label: &str, initial_value: T) -> Fixed<T> {
        Fixed::new(label, initial_value)
    }
}
