//! Runtime behavior of derived field factories.

use fieldforge::PreviewField;
use fieldforge::core::{Field, FieldError, FieldFactory, FieldShape};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, PreviewField)]
struct BasicData {
    name: String,
    age: i32,
    active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct UserId(i64);

#[derive(Debug, Clone, PartialEq, PreviewField)]
#[preview(name = "account_editor", auto_label = false)]
struct Account {
    #[preview(value = "i64")]
    id: UserId,
    nickname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, PreviewField)]
enum Shape {
    Dot,
    Circle { radius: f64 },
    Rect(f64, f64),
    Marker {},
}

#[derive(Debug, Clone, PartialEq, Default, PreviewField)]
struct Address {
    street: String,
    number: u8,
}

#[derive(Debug, Clone, PartialEq, PreviewField)]
struct Person {
    name: String,
    home: Address,
    shape: Shape,
}

fn basic() -> BasicData {
    BasicData {
        name: "Ada".to_string(),
        age: 36,
        active: true,
    }
}

fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, Box<dyn FnMut(&T)>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    (seen, Box::new(move |value: &T| sink.borrow_mut().push(value.clone())))
}

#[test]
fn test_product_child_edit_recombines() {
    let mut field = BasicData::basic_data(None, basic());
    assert_eq!(field.label(), "basic_data");
    assert_eq!(field.value(), basic());

    let (seen, observer) = recorder();
    field.subscribe(observer);
    field.edit(|children| children.1.set(37));

    let expected = BasicData { age: 37, ..basic() };
    assert_eq!(field.value(), expected);
    assert_eq!(*seen.borrow(), vec![expected]);
    assert!(field.is_modified());
}

#[test]
fn test_product_set_fans_out_and_reset_restores() {
    let mut field = BasicData::basic_data(Some("Profile"), basic());
    assert_eq!(field.label(), "Profile");

    let replacement = BasicData {
        name: "Grace".to_string(),
        age: 45,
        active: false,
    };
    field.set(replacement.clone());
    assert_eq!(field.value(), replacement);
    assert_eq!(field.children().0.value(), "Grace");
    assert!(!field.children().2.value());

    field.reset();
    assert_eq!(field.value(), basic());
    assert!(!field.is_modified());
}

#[test]
fn test_combine_of_split_is_identity() {
    let field = BasicData::basic_data(None, basic());
    let value = BasicData {
        name: String::new(),
        age: -4,
        active: false,
    };
    let (name, age, active) = field.split_value(&value);
    assert_eq!(BasicData { name, age, active }, value);
}

#[test]
fn test_product_shape_lists_member_labels() {
    let field = BasicData::basic_data(None, basic());
    let shape = field.shape();

    assert_eq!(shape.kind(), "combined");
    let labels: Vec<&str> = shape.children().iter().map(|child| child.label()).collect();
    assert_eq!(labels, vec!["name", "age", "active"]);
}

#[test]
fn test_unsubscribe_stops_notifications() {
    let mut field = BasicData::basic_data(None, basic());
    let (seen, observer) = recorder();
    let id = field.subscribe(observer);

    assert!(field.unsubscribe(id));
    field.edit(|children| children.2.set(false));
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_value_wrapper_and_nullable_members() {
    let initial = Account {
        id: UserId(7),
        nickname: None,
    };
    let mut field = Account::account_editor("Account", initial.clone());
    assert_eq!(field.label(), "Account");
    assert_eq!(field.value(), initial);

    field.edit(|children| children.0.set(UserId(42)));
    assert_eq!(field.value().id, UserId(42));

    field.set(Account {
        id: UserId(42),
        nickname: Some("ace".to_string()),
    });
    assert_eq!(field.value().nickname.as_deref(), Some("ace"));

    let shape = field.shape();
    let kinds: Vec<&str> = shape.children().iter().map(|child| child.kind()).collect();
    assert_eq!(kinds, vec!["transform", "nullable"]);
}

#[test]
fn test_sum_starts_on_matching_variant() {
    let field = Shape::shape(None, Shape::Rect(2.0, 3.0));
    assert_eq!(field.label(), "shape");
    assert_eq!(field.selected_tag(), Some("Rect"));
    assert_eq!(field.tags(), vec!["Dot", "Circle", "Rect", "Marker"]);
    assert_eq!(field.value(), Shape::Rect(2.0, 3.0));
}

#[test]
fn test_sum_select_variant_yields_default() {
    let mut field = Shape::shape(None, Shape::Dot);
    let (seen, observer) = recorder();
    field.subscribe(observer);

    field.select_variant("Circle").expect("Failed to select Circle");
    assert_eq!(field.value(), Shape::Circle { radius: 0.0 });

    field.select_variant("Marker").expect("Failed to select Marker");
    assert_eq!(field.value(), Shape::Marker {});

    assert_eq!(
        *seen.borrow(),
        vec![Shape::Circle { radius: 0.0 }, Shape::Marker {}]
    );
}

#[test]
fn test_sum_set_routes_and_reset_restores() {
    let mut field = Shape::shape(None, Shape::Dot);

    field.set(Shape::Circle { radius: 1.5 });
    assert_eq!(field.selected_tag(), Some("Circle"));
    field.edit_active(|active| active.set(Shape::Circle { radius: 2.5 }));
    assert_eq!(field.value(), Shape::Circle { radius: 2.5 });

    field.reset();
    assert_eq!(field.selected_tag(), Some("Dot"));
    assert_eq!(field.value(), Shape::Dot);
}

#[test]
fn test_sum_unknown_variant() {
    let mut field = Shape::shape(None, Shape::Dot);
    let err = field.select_variant("Triangle").expect_err("unknown tag");

    assert_eq!(
        err,
        FieldError::UnknownVariant {
            label: "shape".to_string(),
            tag: "Triangle".to_string(),
        }
    );
    assert_eq!(field.selected_tag(), Some("Dot"));
}

#[test]
fn test_nested_types_use_their_own_factories() {
    let initial = Person {
        name: "Ada".to_string(),
        home: Address {
            street: "Main".to_string(),
            number: 1,
        },
        shape: Shape::Dot,
    };
    let mut field = Person::person(None, initial.clone());

    field.edit(|children| {
        children.1.set(Address {
            street: "Elm".to_string(),
            number: 9,
        });
        children.2.set(Shape::Rect(1.0, 1.0));
    });

    let value = field.value();
    assert_eq!(value.home.street, "Elm");
    assert_eq!(value.home.number, 9);
    assert_eq!(value.shape, Shape::Rect(1.0, 1.0));

    let FieldShape::Combined { children, .. } = field.shape() else {
        panic!("expected combined shape");
    };
    assert_eq!(children[1].kind(), "combined");
    assert_eq!(children[2].kind(), "polymorphic");
}

#[test]
fn test_factory_is_reusable() {
    let factory = AddressFieldFactory;
    let first = factory.create("first", Address::default());
    let second = factory.create(
        "second",
        Address {
            street: "Side".to_string(),
            number: 2,
        },
    );

    assert_eq!(first.label(), "first");
    assert_eq!(first.value(), Address::default());
    assert_eq!(second.value().number, 2);
}
