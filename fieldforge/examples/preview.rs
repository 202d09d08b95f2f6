//! Builds field trees for a struct and an enum, edits them, and prints the
//! resulting shapes.
//!
//! Run with: `RUST_LOG=info cargo run -p fieldforge --example preview`

use fieldforge::prelude::*;

#[derive(Debug, Clone, PartialEq, PreviewField)]
enum Payment {
    Cash,
    Card { number: String, cvv: u8 },
    Voucher(i64),
}

#[derive(Debug, Clone, PartialEq, PreviewField)]
#[preview(name = "order_editor")]
struct Order {
    customer: String,
    quantity: i32,
    express: bool,
    note: Option<String>,
    payment: Payment,
}

fn print_shape(shape: &FieldShape, depth: usize) {
    let extra = match shape {
        FieldShape::Polymorphic { selected, .. } => format!(" [{selected}]"),
        FieldShape::Nullable { present, .. } => format!(" [present: {present}]"),
        _ => String::new(),
    };
    println!("{:indent$}{} ({}){}", "", shape.label(), shape.kind(), extra, indent = depth * 2);
    for child in shape.children() {
        print_shape(child, depth + 1);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let order = Order {
        customer: "Ada".to_string(),
        quantity: 1,
        express: false,
        note: None,
        payment: Payment::Cash,
    };

    let mut field = Order::order_editor(Some("Order"), order);
    field.subscribe(Box::new(|order: &Order| {
        tracing::info!("Order changed: {:?}", order);
    }));

    field.edit(|(_, quantity, express, note, payment)| {
        quantity.set(3);
        express.set(true);
        note.set(Some("leave at the door".to_string()));
        payment.set(Payment::Voucher(25));
    });
    println!("Edited order: {:?}", field.value());
    print_shape(&field.shape(), 0);

    let mut payment = Payment::payment(None, Payment::Cash);
    payment.select_variant("Card")?;
    println!("Card default: {:?}", payment.value());
    println!("Variants: {}", payment.tags().join(", "));

    field.reset();
    println!("Reset order: {:?}", field.value());

    Ok(())
}
