//! Sum combinator.
//!
//! A polymorphic field edits a closed sum type. It owns one child field per
//! declared variant, each editing the sum type itself, and a matcher per
//! variant deciding which variant a value belongs to. Only the selected child is
//! live; selecting another variant activates that child at its own default
//! value, so prior edits to a variant are not preserved across switches.

use crate::error::{FieldError, Result};
use crate::factory::FieldFactory;
use crate::field::{BoxedField, Field, FieldShape, Observer, ObserverId, Observers};
use std::fmt;

type Matcher<T> = Box<dyn Fn(&T) -> bool>;
type Builder<T> = Box<dyn FnOnce(&str, T) -> BoxedField<T>>;

/// Declaration of one variant of a polymorphic field.
pub struct Variant<T> {
    tag: String,
    matches: Matcher<T>,
    build: Builder<T>,
    default_value: T,
}

impl<T: 'static> Variant<T> {
    /// Declares a variant.
    ///
    /// # Arguments
    /// * `tag` - Variant name, also used as the child label
    /// * `matches` - Returns true for values of this variant
    /// * `factory` - Builds the child field for this variant
    /// * `default_value` - Value the child starts from when the variant is not
    ///   the initially selected one
    pub fn new<M, F>(tag: impl Into<String>, matches: M, factory: F, default_value: T) -> Self
    where
        M: Fn(&T) -> bool + 'static,
        F: FieldFactory<T> + 'static,
    {
        Self {
            tag: tag.into(),
            matches: Box::new(matches),
            build: Box::new(move |label: &str, initial_value: T| {
                Box::new(factory.create(label, initial_value)) as BoxedField<T>
            }),
            default_value,
        }
    }

    /// Returns the variant tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl<T> fmt::Debug for Variant<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant").field("tag", &self.tag).finish()
    }
}

struct Slot<T> {
    tag: String,
    matches: Matcher<T>,
    field: BoxedField<T>,
}

/// Field editing a closed sum type.
pub struct Polymorphic<T> {
    label: String,
    initial_value: T,
    initial_selected: usize,
    selected: usize,
    slots: Vec<Slot<T>>,
    observers: Observers<T>,
}

impl<T: Clone + 'static> Polymorphic<T> {
    /// Creates the field.
    ///
    /// The first variant accepting `initial_value` is selected and its child is
    /// built from `initial_value`; every other child is built from its variant's
    /// default value.
    #[must_use]
    pub fn new(label: impl Into<String>, initial_value: T, variants: Vec<Variant<T>>) -> Self {
        let label = label.into();
        let selected = variants
            .iter()
            .position(|variant| (variant.matches)(&initial_value))
            .unwrap_or_else(|| {
                tracing::warn!(
                    "No variant of '{}' accepts the initial value, selecting the first",
                    label
                );
                0
            });

        let slots = variants
            .into_iter()
            .enumerate()
            .map(|(index, variant)| {
                let start = if index == selected {
                    initial_value.clone()
                } else {
                    variant.default_value
                };
                let field = (variant.build)(&variant.tag, start);
                Slot {
                    tag: variant.tag,
                    matches: variant.matches,
                    field,
                }
            })
            .collect();

        Self {
            label,
            initial_value,
            initial_selected: selected,
            selected,
            slots,
            observers: Observers::new(),
        }
    }

    /// Returns the tag of the live variant.
    #[must_use]
    pub fn selected_tag(&self) -> Option<&str> {
        self.slots.get(self.selected).map(|slot| slot.tag.as_str())
    }

    /// Returns all variant tags in declaration order.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        self.slots.iter().map(|slot| slot.tag.as_str()).collect()
    }

    /// Activates the variant named `tag` at its default value.
    ///
    /// Selecting the live variant again does nothing.
    ///
    /// # Errors
    /// Returns `FieldError::UnknownVariant` if no variant has that tag.
    pub fn select_variant(&mut self, tag: &str) -> Result<()> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.tag == tag)
            .ok_or_else(|| FieldError::UnknownVariant {
                label: self.label.clone(),
                tag: tag.to_string(),
            })?;

        if index == self.selected {
            return Ok(());
        }

        self.slots[index].field.reset();
        self.selected = index;
        self.notify();
        Ok(())
    }

    /// Returns the live variant's field.
    #[must_use]
    pub fn active(&self) -> Option<&dyn Field<T>> {
        self.slots.get(self.selected).map(|slot| slot.field.as_ref())
    }

    /// Mutates the live variant's field, then notifies observers.
    pub fn edit_active<R>(&mut self, edit: impl FnOnce(&mut dyn Field<T>) -> R) -> Option<R> {
        let slot = self.slots.get_mut(self.selected)?;
        let result = edit(slot.field.as_mut());
        self.notify();
        Some(result)
    }

    fn current(&self) -> T {
        self.slots
            .get(self.selected)
            .map_or_else(|| self.initial_value.clone(), |slot| slot.field.value())
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let value = self.current();
        self.observers.notify(&value);
    }
}

impl<T: Clone + 'static> Field<T> for Polymorphic<T> {
    fn label(&self) -> &str {
        &self.label
    }

    fn value(&self) -> T {
        self.current()
    }

    fn initial_value(&self) -> &T {
        &self.initial_value
    }

    fn set(&mut self, value: T) {
        let Some(index) = self.slots.iter().position(|slot| (slot.matches)(&value)) else {
            tracing::warn!("No variant of '{}' accepts the value, ignoring set", self.label);
            return;
        };
        self.slots[index].field.set(value);
        self.selected = index;
        self.notify();
    }

    fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.field.reset();
        }
        self.selected = self.initial_selected;
        self.notify();
    }

    fn subscribe(&mut self, observer: Observer<T>) -> ObserverId {
        self.observers.subscribe(observer)
    }

    fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn shape(&self) -> FieldShape {
        FieldShape::Polymorphic {
            label: self.label.clone(),
            selected: self.selected_tag().unwrap_or_default().to_string(),
            variants: self.slots.iter().map(|slot| slot.field.shape()).collect(),
        }
    }
}

impl<T> fmt::Debug for Polymorphic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<&str> = self.slots.iter().map(|slot| slot.tag.as_str()).collect();
        f.debug_struct("Polymorphic")
            .field("label", &self.label)
            .field("variants", &tags)
            .field("selected", &self.selected)
            .finish()
    }
}
