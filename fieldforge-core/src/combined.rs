//! Product combinators, `Combined1` through `Combined10`.
//!
//! A combined field owns one child field per member of a product type plus a
//! `combine`/`split` pair converting between the product value and the tuple of
//! member values. Its observed value is always `combine` of the children, so any
//! child mutation is reflected immediately; `set` fans `split(value)` out to the
//! children. Generated pairs satisfy `combine(split(v)) == v`.

use crate::factory::FieldFactory;
use crate::field::{BoxedField, Field, FieldShape, Observer, ObserverId, Observers};
use std::fmt;

macro_rules! combined {
    (
        $(#[$meta:meta])*
        $name:ident, $arity:literal;
        $($idx:tt: $ty:ident, $factory:ident);+
    ) => {
        $(#[$meta])*
        pub struct $name<T, $($ty),+> {
            label: String,
            initial_value: T,
            children: ($(BoxedField<$ty>,)+),
            combine: Box<dyn Fn($($ty),+) -> T>,
            split: Box<dyn Fn(&T) -> ($($ty,)+)>,
            observers: Observers<T>,
        }

        impl<T, $($ty),+> $name<T, $($ty),+>
        where
            T: Clone + 'static,
            $($ty: Clone + 'static),+
        {
            /// Number of children.
            pub const ARITY: usize = $arity;

            /// Creates the field, building each child from `split(initial_value)`.
            ///
            /// # Arguments
            /// * `label` - Label of the combined field
            /// * `initial_value` - Initial product value
            /// * `labels` - Child labels in declaration order
            /// * `factories` - Child factories in declaration order
            /// * `combine` - Builds the product from member values
            /// * `split` - Destructures the product into member values
            pub fn new<$($factory,)+ Comb, Split>(
                label: impl Into<String>,
                initial_value: T,
                labels: [&str; $arity],
                factories: ($($factory,)+),
                combine: Comb,
                split: Split,
            ) -> Self
            where
                $($factory: FieldFactory<$ty>,)+
                Comb: Fn($($ty),+) -> T + 'static,
                Split: Fn(&T) -> ($($ty,)+) + 'static,
            {
                let parts = split(&initial_value);
                let children = ($(
                    Box::new(factories.$idx.create(labels[$idx], parts.$idx)) as BoxedField<$ty>,
                )+);

                Self {
                    label: label.into(),
                    initial_value,
                    children,
                    combine: Box::new(combine),
                    split: Box::new(split),
                    observers: Observers::new(),
                }
            }

            /// Returns the child fields.
            #[must_use]
            pub fn children(&self) -> &($(BoxedField<$ty>,)+) {
                &self.children
            }

            /// Mutates children, then notifies observers of this field with the
            /// recombined value.
            pub fn edit<R>(&mut self, edit: impl FnOnce(&mut ($(BoxedField<$ty>,)+)) -> R) -> R {
                let result = edit(&mut self.children);
                self.notify();
                result
            }

            /// Destructures a value with this field's `split`.
            #[must_use]
            pub fn split_value(&self, value: &T) -> ($($ty,)+) {
                (self.split)(value)
            }

            fn current(&self) -> T {
                (self.combine)($(self.children.$idx.value()),+)
            }

            fn notify(&mut self) {
                if self.observers.is_empty() {
                    return;
                }
                let value = self.current();
                self.observers.notify(&value);
            }
        }

        impl<T, $($ty),+> Field<T> for $name<T, $($ty),+>
        where
            T: Clone + 'static,
            $($ty: Clone + 'static),+
        {
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
                let parts = (self.split)(&value);
                $(self.children.$idx.set(parts.$idx);)+
                self.notify();
            }

            fn reset(&mut self) {
                $(self.children.$idx.reset();)+
                self.notify();
            }

            fn subscribe(&mut self, observer: Observer<T>) -> ObserverId {
                self.observers.subscribe(observer)
            }

            fn unsubscribe(&mut self, id: ObserverId) -> bool {
                self.observers.unsubscribe(id)
            }

            fn shape(&self) -> FieldShape {
                FieldShape::Combined {
                    label: self.label.clone(),
                    children: vec![$(self.children.$idx.shape()),+],
                }
            }
        }

        impl<T, $($ty),+> fmt::Debug for $name<T, $($ty),+> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("label", &self.label)
                    .field("arity", &$arity)
                    .finish()
            }
        }
    };
}

combined!(
    /// Product field with one member.
    Combined1, 1;
    0: A, FA
);
combined!(
    /// Product field with two members.
    Combined2, 2;
    0: A, FA; 1: B, FB
);
combined!(
    /// Product field with three members.
    Combined3, 3;
    0: A, FA; 1: B, FB; 2: C, FC
);
combined!(
    /// Product field with four members.
    Combined4, 4;
    0: A, FA; 1: B, FB; 2: C, FC; 3: D, FD
);
combined!(
    /// Product field with five members.
    Combined5, 5;
    0: A, FA; 1: B, FB; 2: C, FC; 3: D, FD; 4: E, FE
);
combined!(
    /// Product field with six members.
    Combined6, 6;
    0: A, FA; 1: B, FB; 2: C, FC; 3: D, FD; 4: E, FE; 5: F, FF
);
combined!(
    /// Product field with seven members.
    Combined7, 7;
    0: A, FA; 1: B, FB; 2: C, FC; 3: D, FD; 4: E, FE; 5: F, FF; 6: G, FG
);
combined!(
    /// Product field with eight members.
    Combined8, 8;
    0: A, FA; 1: B, FB; 2: C, FC; 3: D, FD; 4: E, FE; 5: F, FF; 6: G, FG; 7: H, FH
);
combined!(
    /// Product field with nine members.
    Combined9, 9;
    0: A, FA; 1: B, FB; 2: C, FC; 3: D, FD; 4: E, FE; 5: F, FF; 6: G, FG; 7: H, FH;
    8: I, FI
);
combined!(
    /// Product field with ten members, the largest supported arity.
    Combined10, 10;
    0: A, FA; 1: B, FB; 2: C, FC; 3: D, FD; 4: E, FE; 5: F, FF; 6: G, FG; 7: H, FH;
    8: I, FI; 9: J, FJ
);

/// Largest product arity with a combinator.
pub const MAX_ARITY: usize = 10;
