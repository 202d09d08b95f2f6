//! Field schema XML parser.
//!
//! This module parses `<fieldSchema>` documents into a [`FieldSchema`]: the
//! declared types under `<types>` and the `<generate>` / `<generateField>`
//! requests that follow them.

use crate::error::ParseError;
use crate::naming::NameCase;
use crate::types::{
    ConstructorStyle, FieldSchema, GenerationRequest, MemberDescriptor, TypeDescriptor,
};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::Path;

/// Parses a field schema from a string.
///
/// # Arguments
/// * `xml` - XML schema content
///
/// # Returns
/// Parsed schema or parse error.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed or contains invalid schema elements.
pub fn parse_schema(xml: &str) -> Result<FieldSchema, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut schema: Option<FieldSchema> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "fieldSchema" => {
                        schema = Some(parse_field_schema(e)?);
                    }
                    "types" => {
                        let schema = schema.as_mut().ok_or_else(|| outside_root(name))?;
                        parse_types(&mut reader, schema)?;
                    }
                    "generate" | "generateField" => {
                        let schema = schema.as_mut().ok_or_else(|| outside_root(name))?;
                        schema.add_request(parse_request(e, name)?);
                        skip_to_end(&mut reader)?;
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "fieldSchema" => {
                        schema = Some(parse_field_schema(e)?);
                    }
                    "generate" | "generateField" => {
                        let schema = schema.as_mut().ok_or_else(|| outside_root(name))?;
                        schema.add_request(parse_request(e, name)?);
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    schema.ok_or_else(|| ParseError::InvalidStructure {
        message: "No fieldSchema element found".to_string(),
    })
}

/// Reads and parses a field schema file.
///
/// # Errors
/// Returns `ParseError::Io` if the file cannot be read, or any error of
/// [`parse_schema`].
pub fn parse_schema_file(path: impl AsRef<Path>) -> Result<FieldSchema, ParseError> {
    let xml = std::fs::read_to_string(path)?;
    parse_schema(&xml)
}

fn outside_root(element: &str) -> ParseError {
    ParseError::InvalidStructure {
        message: format!("element '{element}' appears outside fieldSchema"),
    }
}

/// Parses the fieldSchema element attributes.
fn parse_field_schema(e: &BytesStart<'_>) -> Result<FieldSchema, ParseError> {
    let mut package = String::new();
    let mut runtime = None;
    let mut tolerate_unsupported = false;
    let mut name_case = NameCase::default();

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "package" => package = value.to_string(),
            "runtime" => runtime = Some(value.to_string()),
            "tolerateUnsupported" => {
                tolerate_unsupported = parse_bool("fieldSchema", key, value)?;
            }
            "nameCase" => {
                name_case = NameCase::parse(value)
                    .ok_or_else(|| ParseError::invalid_attr("fieldSchema", key, value))?;
            }
            _ => {}
        }
    }

    let mut schema = FieldSchema::new(package);
    schema.runtime = runtime;
    schema.tolerate_unsupported = tolerate_unsupported;
    schema.name_case = name_case;

    Ok(schema)
}

/// Parses the types section.
fn parse_types(reader: &mut Reader<&[u8]>, schema: &mut FieldSchema) -> Result<(), ParseError> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let descriptor = parse_type(reader, e, None, false)?;
                add_declared(schema, descriptor)?;
            }
            Ok(Event::Empty(ref e)) => {
                let descriptor = parse_type(reader, e, None, true)?;
                add_declared(schema, descriptor)?;
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn add_declared(schema: &mut FieldSchema, descriptor: TypeDescriptor) -> Result<(), ParseError> {
    if schema.catalog.has_type(&descriptor.name) {
        return Err(ParseError::duplicate("type", descriptor.name));
    }
    schema.add_type(descriptor);
    Ok(())
}

/// Parses one type element, at top level or as a sum variant.
///
/// `empty` is true for self-closing elements, which have no end tag to consume.
fn parse_type(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    owner: Option<&str>,
    empty: bool,
) -> Result<TypeDescriptor, ParseError> {
    let tag_bytes = e.name().as_ref().to_vec();
    let tag = std::str::from_utf8(&tag_bytes)?;

    match tag {
        "enum" => parse_enum(reader, e, owner, empty),
        "product" => parse_product(reader, e, owner, empty),
        "sum" => parse_sum(reader, e, owner, empty),
        "singleton" | "opaque" | "external" => {
            let descriptor = parse_simple_type(e, tag, owner)?;
            if !empty {
                skip_to_end(reader)?;
            }
            Ok(descriptor)
        }
        _ => Err(ParseError::unknown_element(tag, owner.unwrap_or("types"))),
    }
}

fn qualify(owner: Option<&str>, name: &str) -> String {
    match owner {
        Some(owner) => format!("{owner}::{name}"),
        None => name.to_string(),
    }
}

/// Parses the childless type elements: singleton, opaque and external.
fn parse_simple_type(
    e: &BytesStart<'_>,
    tag: &str,
    owner: Option<&str>,
) -> Result<TypeDescriptor, ParseError> {
    let mut name = None;
    let mut valueless = true;
    let mut factory = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = Some(value.to_string()),
            "valueless" => valueless = parse_bool(tag, key, value)?,
            "factory" => factory = Some(value.to_string()),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr(tag, "name"))?;
    let name = qualify(owner, &name);

    match tag {
        "singleton" => Ok(TypeDescriptor::singleton(name, valueless)),
        "external" => {
            let factory = factory.ok_or_else(|| ParseError::missing_attr(tag, "factory"))?;
            Ok(TypeDescriptor::external(name, factory))
        }
        _ => Ok(TypeDescriptor::opaque(name)),
    }
}

/// Parses an enum type definition.
fn parse_enum(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    owner: Option<&str>,
    empty: bool,
) -> Result<TypeDescriptor, ParseError> {
    let mut name = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;
        if key == "name" {
            name = Some(value.to_string());
        }
    }

    let name = qualify(
        owner,
        &name.ok_or_else(|| ParseError::missing_attr("enum", "name"))?,
    );
    let mut entries = Vec::new();

    if empty {
        return Ok(TypeDescriptor::enumeration(name, entries));
    }

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                entries.push(parse_entry(e, &name)?);
                skip_to_end(reader)?;
            }
            Ok(Event::Empty(ref e)) => {
                entries.push(parse_entry(e, &name)?);
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(TypeDescriptor::enumeration(name, entries))
}

/// Parses an enum entry.
fn parse_entry(e: &BytesStart<'_>, enum_name: &str) -> Result<String, ParseError> {
    let tag_bytes = e.name().as_ref().to_vec();
    let tag = std::str::from_utf8(&tag_bytes)?;
    if tag != "entry" {
        return Err(ParseError::unknown_element(tag, enum_name));
    }

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        if key == "name" {
            return Ok(std::str::from_utf8(&attr.value)?.to_string());
        }
    }

    Err(ParseError::missing_attr("entry", "name"))
}

/// Parses a product type definition.
fn parse_product(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    owner: Option<&str>,
    empty: bool,
) -> Result<TypeDescriptor, ParseError> {
    let mut name = None;
    let mut style = ConstructorStyle::Named;
    let mut companion = true;
    let mut is_value = false;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = Some(value.to_string()),
            "style" => {
                style = ConstructorStyle::parse(value)
                    .ok_or_else(|| ParseError::invalid_attr("product", "style", value))?;
            }
            "companion" => companion = parse_bool("product", key, value)?,
            "value" => is_value = parse_bool("product", key, value)?,
            _ => {}
        }
    }

    let name = qualify(
        owner,
        &name.ok_or_else(|| ParseError::missing_attr("product", "name"))?,
    );
    let mut members = Vec::new();

    if !empty {
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    members.push(parse_member(e, &name, style, members.len())?);
                    skip_to_end(reader)?;
                }
                Ok(Event::Empty(ref e)) => {
                    members.push(parse_member(e, &name, style, members.len())?);
                }
                Ok(Event::End(_)) => break,
                Ok(Event::Eof) => break,
                Err(e) => return Err(ParseError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }
    }

    Ok(TypeDescriptor::product(name, style, members)
        .with_companion(companion)
        .with_value(is_value))
}

/// Parses a product member. Positional members default to their index as name.
fn parse_member(
    e: &BytesStart<'_>,
    product: &str,
    style: ConstructorStyle,
    index: usize,
) -> Result<MemberDescriptor, ParseError> {
    let tag_bytes = e.name().as_ref().to_vec();
    let tag = std::str::from_utf8(&tag_bytes)?;
    if tag != "member" {
        return Err(ParseError::unknown_element(tag, product));
    }

    let mut name = None;
    let mut type_name = None;
    let mut nullable = false;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = Some(value.to_string()),
            "type" => type_name = Some(value.to_string()),
            "nullable" => nullable = parse_bool("member", key, value)?,
            _ => {}
        }
    }

    let name = match (name, style) {
        (Some(name), _) => name,
        (None, ConstructorStyle::Positional) => index.to_string(),
        (None, ConstructorStyle::Named) => return Err(ParseError::missing_attr("member", "name")),
    };
    let type_name = type_name.ok_or_else(|| ParseError::missing_attr("member", "type"))?;

    Ok(MemberDescriptor {
        name,
        type_name,
        nullable,
    })
}

/// Parses a sum type definition and its inline variants.
fn parse_sum(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    owner: Option<&str>,
    empty: bool,
) -> Result<TypeDescriptor, ParseError> {
    let mut name = None;
    let mut companion = true;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = Some(value.to_string()),
            "companion" => companion = parse_bool("sum", key, value)?,
            _ => {}
        }
    }

    let name = qualify(
        owner,
        &name.ok_or_else(|| ParseError::missing_attr("sum", "name"))?,
    );
    let mut variants: Vec<TypeDescriptor> = Vec::new();

    if !empty {
        let mut buf = Vec::new();

        loop {
            let variant = match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => Some(parse_type(reader, e, Some(&name), false)?),
                Ok(Event::Empty(ref e)) => Some(parse_type(reader, e, Some(&name), true)?),
                Ok(Event::End(_)) => break,
                Ok(Event::Eof) => break,
                Err(e) => return Err(ParseError::Xml(e)),
                _ => None,
            };
            if let Some(variant) = variant {
                if variants.iter().any(|existing| existing.name == variant.name) {
                    return Err(ParseError::duplicate("variant", variant.name));
                }
                variants.push(variant);
            }
            buf.clear();
        }
    }

    Ok(TypeDescriptor::sum(name, variants).with_companion(companion))
}

/// Parses a generate or generateField request.
fn parse_request(e: &BytesStart<'_>, tag: &str) -> Result<GenerationRequest, ParseError> {
    let mut type_name = None;
    let mut function_name = None;
    let mut auto_label = true;
    let mut nullable = false;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "type" => type_name = Some(value.to_string()),
            "name" => function_name = Some(value.to_string()),
            "autoLabel" => auto_label = parse_bool(tag, key, value)?,
            "nullable" if tag == "generateField" => nullable = parse_bool(tag, key, value)?,
            _ => {}
        }
    }

    let type_name = type_name.ok_or_else(|| ParseError::missing_attr(tag, "type"))?;
    let request = if tag == "generateField" {
        GenerationRequest::field(type_name)
    } else {
        GenerationRequest::factory(type_name)
    };
    let request = request.with_auto_label(auto_label).with_nullable(nullable);

    Ok(match function_name {
        Some(name) => request.with_name(name),
        None => request,
    })
}

fn parse_bool(element: &str, attribute: &str, value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::invalid_attr(element, attribute, value)),
    }
}

/// Skips to the end of the current element.
fn skip_to_end(reader: &mut Reader<&[u8]>) -> Result<(), ParseError> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Directive, TypeKind};

    const DEMO_SCHEMA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<fieldSchema package="demo" runtime="::fieldforge_core" tolerateUnsupported="true">
    <types>
        <enum name="Color">
            <entry name="Red"/>
            <entry name="Green"/>
        </enum>
        <singleton name="Marker" valueless="false"/>
        <product name="BasicData" style="named">
            <member name="str" type="String"/>
            <member name="note" type="String" nullable="true"/>
        </product>
        <product name="UserId" style="positional" companion="false" value="true">
            <member type="i64"/>
        </product>
        <sum name="Shape">
            <singleton name="Dot"/>
            <product name="Circle"><member name="radius" type="f64"/></product>
        </sum>
        <opaque name="Blob"/>
        <external name="Address" factory="crate::geo::AddressFieldFactory"/>
    </types>
    <generate type="BasicData" name="basic" autoLabel="true"/>
    <generateField type="i32" name="count" nullable="true" autoLabel="false"/>
</fieldSchema>"#;

    #[test]
    fn test_parse_schema_attributes() {
        let schema = parse_schema(DEMO_SCHEMA).expect("Failed to parse schema");

        assert_eq!(schema.package, "demo");
        assert_eq!(schema.runtime.as_deref(), Some("::fieldforge_core"));
        assert!(schema.tolerate_unsupported);
        assert_eq!(schema.name_case, NameCase::Snake);
    }

    #[test]
    fn test_parse_name_case() {
        let schema = parse_schema(r#"<fieldSchema package="demo" nameCase="lowerCamel"/>"#)
            .expect("Failed to parse schema");
        assert_eq!(schema.name_case, NameCase::LowerCamel);

        let err = parse_schema(r#"<fieldSchema package="demo" nameCase="kebab"/>"#)
            .expect_err("unknown case should fail");
        assert!(err.to_string().contains("kebab"));
    }

    #[test]
    fn test_parse_types() {
        let schema = parse_schema(DEMO_SCHEMA).expect("Failed to parse schema");
        let names: Vec<&str> = schema
            .catalog
            .declared()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["Color", "Marker", "BasicData", "UserId", "Shape", "Blob", "Address"]
        );

        let color = schema.catalog.get_type("Color").expect("Color declared");
        assert_eq!(
            color.kind,
            TypeKind::Enumeration {
                entries: vec!["Red".to_string(), "Green".to_string()]
            }
        );

        let marker = schema.catalog.get_type("Marker").expect("Marker declared");
        assert_eq!(marker.kind, TypeKind::Singleton { is_valueless: false });

        let basic = schema.catalog.get_type("BasicData").expect("BasicData declared");
        assert_eq!(basic.members().len(), 2);
        assert!(basic.members()[1].nullable);

        let address = schema.catalog.get_type("Address").expect("Address declared");
        assert_eq!(
            address.kind,
            TypeKind::External {
                factory: "crate::geo::AddressFieldFactory".to_string()
            }
        );
    }

    #[test]
    fn test_parse_positional_value_product() {
        let schema = parse_schema(DEMO_SCHEMA).expect("Failed to parse schema");
        let user_id = schema.catalog.get_type("UserId").expect("UserId declared");
        match &user_id.kind {
            TypeKind::Product {
                members,
                style,
                has_companion,
                is_value,
            } => {
                assert_eq!(*style, ConstructorStyle::Positional);
                assert_eq!(members[0].name, "0");
                assert!(!has_companion);
                assert!(is_value);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_parse_sum_variants_are_qualified() {
        let schema = parse_schema(DEMO_SCHEMA).expect("Failed to parse schema");
        let shape = schema.catalog.get_type("Shape").expect("Shape declared");
        let variants: Vec<&str> = shape.variants().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(variants, vec!["Shape::Dot", "Shape::Circle"]);
        assert_eq!(shape.variants()[1].members()[0].type_name, "f64");
    }

    #[test]
    fn test_parse_requests() {
        let schema = parse_schema(DEMO_SCHEMA).expect("Failed to parse schema");
        assert_eq!(schema.requests.len(), 2);

        let basic = &schema.requests[0];
        assert_eq!(basic.directive, Directive::Factory);
        assert_eq!(basic.function_name.as_deref(), Some("basic"));
        assert!(!basic.nullable);

        let count = &schema.requests[1];
        assert_eq!(count.directive, Directive::Field);
        assert!(count.nullable);
        assert!(!count.auto_label);
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let xml = r#"<fieldSchema package="p"><types>
            <opaque name="Blob"/><opaque name="Blob"/>
        </types></fieldSchema>"#;
        let err = parse_schema(xml).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateDefinition { .. }));
    }

    #[test]
    fn test_primitive_redeclaration_rejected() {
        let xml = r#"<fieldSchema package="p"><types><opaque name="String"/></types></fieldSchema>"#;
        assert!(matches!(
            parse_schema(xml),
            Err(ParseError::DuplicateDefinition { .. })
        ));
    }

    #[test]
    fn test_unknown_element_rejected() {
        let xml = r#"<fieldSchema package="p"><types><record name="X"/></types></fieldSchema>"#;
        let err = parse_schema(xml).unwrap_err();
        assert!(matches!(err, ParseError::UnknownElement { .. }));
    }

    #[test]
    fn test_missing_attributes() {
        let xml = r#"<fieldSchema package="p"><types>
            <product name="P"><member name="a"/></product>
        </types></fieldSchema>"#;
        let err = parse_schema(xml).unwrap_err();
        assert!(matches!(err, ParseError::MissingAttribute { ref attribute, .. } if attribute == "type"));

        let xml = r#"<fieldSchema package="p"><generate name="x"/></fieldSchema>"#;
        assert!(matches!(
            parse_schema(xml),
            Err(ParseError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_invalid_bool_attribute() {
        let xml = r#"<fieldSchema package="p" tolerateUnsupported="yes"/>"#;
        assert!(matches!(
            parse_schema(xml),
            Err(ParseError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn test_empty_containers_parse() {
        let xml = r#"<fieldSchema package="p"><types>
            <enum name="Empty"/>
            <product name="Nothing"/>
            <sum name="Never"></sum>
        </types></fieldSchema>"#;
        let schema = parse_schema(xml).expect("Failed to parse schema");
        assert_eq!(schema.catalog.declared().len(), 3);
        assert!(schema.catalog.get_type("Nothing").expect("declared").members().is_empty());
    }

    #[test]
    fn test_missing_root() {
        let err = parse_schema("<other/>").unwrap_err();
        assert!(matches!(err, ParseError::InvalidStructure { .. }));
    }

    #[test]
    fn test_parse_schema_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("demo.xml");
        std::fs::write(&path, DEMO_SCHEMA).expect("Failed to write schema");

        let schema = parse_schema_file(&path).expect("Failed to parse schema file");
        assert_eq!(schema.requests.len(), 2);

        let missing = parse_schema_file(dir.path().join("missing.xml"));
        assert!(matches!(missing, Err(ParseError::Io(_))));
    }
}
