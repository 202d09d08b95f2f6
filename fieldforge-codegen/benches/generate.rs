//! Classification and generation benchmarks.

use criterion::{Criterion, criterion_group, criterion_main};
use fieldforge_codegen::{Generator, GeneratorConfig};
use fieldforge_schema::{ResolutionPass, parse_schema};
use std::hint::black_box;

const SCHEMA: &str = r#"
<fieldSchema package="bench" tolerateUnsupported="true">
    <types>
        <enum name="Side"><entry name="Buy"/><entry name="Sell"/></enum>
        <product name="OrderId" style="positional" companion="false" value="true">
            <member name="0" type="i64"/>
        </product>
        <product name="Price">
            <member name="mantissa" type="i64"/>
            <member name="exponent" type="i32"/>
        </product>
        <product name="Order">
            <member name="id" type="OrderId"/>
            <member name="side" type="Side"/>
            <member name="price" type="Price"/>
            <member name="quantity" type="i64"/>
            <member name="note" type="String" nullable="true"/>
            <member name="blob" type="Blob"/>
        </product>
        <opaque name="Blob"/>
        <sum name="Event">
            <singleton name="Heartbeat"/>
            <product name="New"><member name="order" type="Order"/></product>
            <product name="Cancel"><member name="id" type="OrderId"/></product>
        </sum>
    </types>
    <generate type="Order"/>
    <generate type="Event"/>
    <generateField type="Price" name="price" nullable="true"/>
</fieldSchema>
"#;

fn benchmark_classify(c: &mut Criterion) {
    let schema = parse_schema(SCHEMA).expect("Failed to parse schema");

    c.bench_function("classify_event", |b| {
        b.iter(|| {
            let mut pass = ResolutionPass::new(&schema.catalog);
            black_box(pass.classify_name(black_box("Event")))
        })
    });
}

fn benchmark_generate(c: &mut Criterion) {
    let schema = parse_schema(SCHEMA).expect("Failed to parse schema");
    let generator = Generator::with_config(&schema.catalog, GeneratorConfig::from_schema(&schema));

    c.bench_function("generate_all", |b| {
        b.iter(|| black_box(generator.generate(black_box(&schema.requests))))
    });
}

fn benchmark_parse(c: &mut Criterion) {
    c.bench_function("parse_schema", |b| {
        b.iter(|| black_box(parse_schema(black_box(SCHEMA))))
    });
}

criterion_group!(
    benches,
    benchmark_classify,
    benchmark_generate,
    benchmark_parse
);
criterion_main!(benches);
