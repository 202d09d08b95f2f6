//! # FieldForge Derive
//!
//! Derive macro generating field factories for structs and enums.
//!
//! The annotated type is lowered to a type descriptor and run through the
//! same generator as XML schemas. Member types are resolved by name: the
//! built-in primitives map to leaves, `Option<T>` marks a member nullable, and
//! any other plain path `a::B` is expected to provide `a::BFieldFactory`,
//! usually by deriving `PreviewField` as well.

use fieldforge_codegen::{Generator, GeneratorConfig};
use fieldforge_schema::{
    ConstructorStyle, GenerationRequest, MemberDescriptor, PrimitiveKind, TypeCatalog,
    TypeDescriptor,
};
use proc_macro::TokenStream;
use quote::ToTokens;
use syn::ext::IdentExt;
use syn::{
    Attribute, Data, DataEnum, DeriveInput, Fields, GenericArgument, LitBool, LitStr,
    PathArguments, Type, parse_macro_input,
};

/// Runtime path used by generated code.
const RUNTIME_PATH: &str = "::fieldforge::core";

/// Derives a field factory and an entry function for a struct or enum.
///
/// Structs become combined fields with one child per field; enums become
/// polymorphic fields with one variant per enum variant.
///
/// # Example
/// ```ignore
/// #[derive(Clone, PreviewField)]
/// #[preview(name = "point", auto_label)]
/// struct Point {
///     x: f64,
///     y: f64,
///     label: Option<String>,
/// }
///
/// let field = Point::point(None, Point { x: 1.0, y: 2.0, label: None });
/// ```
///
/// Container options:
/// - `name = ".."`: entry function name, defaults to the snake_case type name
/// - `auto_label` / `auto_label = false`: whether the label defaults to the
///   function name (default true)
/// - `runtime = ".."`: path of the runtime crate (default `::fieldforge::core`)
/// - `tolerate_unsupported`: unsupported members become caller-supplied
///   factories instead of compile errors
#[proc_macro_derive(PreviewField, attributes(preview))]
pub fn derive_preview_field(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Options read from `#[preview(..)]`.
#[derive(Debug)]
struct ContainerOptions {
    name: Option<String>,
    auto_label: bool,
    runtime: String,
    tolerate_unsupported: bool,
}

impl ContainerOptions {
    fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut options = Self {
            name: None,
            auto_label: true,
            runtime: RUNTIME_PATH.to_string(),
            tolerate_unsupported: false,
        };

        for attr in attrs {
            if !attr.path().is_ident("preview") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    options.name = Some(value.value());
                    Ok(())
                } else if meta.path.is_ident("auto_label") {
                    options.auto_label = if meta.input.peek(syn::Token![=]) {
                        let value: LitBool = meta.value()?.parse()?;
                        value.value
                    } else {
                        true
                    };
                    Ok(())
                } else if meta.path.is_ident("runtime") {
                    let value: LitStr = meta.value()?.parse()?;
                    options.runtime = value.value();
                    Ok(())
                } else if meta.path.is_ident("tolerate_unsupported") {
                    options.tolerate_unsupported = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown preview option"))
                }
            })?;
        }

        Ok(options)
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "PreviewField cannot be derived for generic types",
        ));
    }

    let options = ContainerOptions::from_attrs(&input.attrs)?;
    let name = input.ident.to_string();
    let mut catalog = TypeCatalog::new();

    let descriptor = match &input.data {
        Data::Struct(data) => lower_struct(&name, &data.fields, &mut catalog)?,
        Data::Enum(data) => lower_enum(&name, data, &mut catalog)?,
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "PreviewField cannot be derived for unions",
            ));
        }
    };
    catalog.add_type(descriptor);

    let mut request = GenerationRequest::factory(&name).with_auto_label(options.auto_label);
    if let Some(function_name) = options.name {
        request = request.with_name(function_name);
    }

    let config = GeneratorConfig::new()
        .runtime_path(options.runtime)
        .tolerate_unsupported(options.tolerate_unsupported);
    let code = Generator::with_config(&catalog, config)
        .generate_request(&request)
        .map_err(|err| syn::Error::new_spanned(&input.ident, err.to_string()))?;

    code.parse::<proc_macro2::TokenStream>().map_err(|err| {
        syn::Error::new_spanned(
            &input.ident,
            format!("generated field factory does not parse: {err}"),
        )
    })
}

fn lower_struct(
    name: &str,
    fields: &Fields,
    catalog: &mut TypeCatalog,
) -> syn::Result<TypeDescriptor> {
    match fields {
        Fields::Unit => Ok(TypeDescriptor::singleton(name, true)),
        _ => {
            let (style, members) = lower_fields(name, fields, catalog)?;
            Ok(TypeDescriptor::product(name, style, members))
        }
    }
}

fn lower_enum(name: &str, data: &DataEnum, catalog: &mut TypeCatalog) -> syn::Result<TypeDescriptor> {
    let mut variants = Vec::with_capacity(data.variants.len());

    for variant in &data.variants {
        let path = format!("{}::{}", name, variant.ident);
        let descriptor = match &variant.fields {
            Fields::Unit => TypeDescriptor::singleton(path, true),
            Fields::Named(named) if named.named.is_empty() => TypeDescriptor::singleton(path, false),
            Fields::Unnamed(unnamed) if unnamed.unnamed.is_empty() => {
                return Err(syn::Error::new_spanned(
                    variant,
                    "empty tuple variants are not supported, use a unit variant",
                ));
            }
            fields => {
                let (style, members) = lower_fields(name, fields, catalog)?;
                TypeDescriptor::product(path, style, members).with_companion(false)
            }
        };
        variants.push(descriptor);
    }

    Ok(TypeDescriptor::sum(name, variants))
}

fn lower_fields(
    owner: &str,
    fields: &Fields,
    catalog: &mut TypeCatalog,
) -> syn::Result<(ConstructorStyle, Vec<MemberDescriptor>)> {
    let style = match fields {
        Fields::Unnamed(_) => ConstructorStyle::Positional,
        _ => ConstructorStyle::Named,
    };

    let mut members = Vec::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let name = match &field.ident {
            Some(ident) => ident.unraw().to_string(),
            None => index.to_string(),
        };
        let wraps = value_option(field)?;
        let (type_name, nullable) = member_type(owner, &field.ty, wraps, catalog);
        members.push(MemberDescriptor {
            name,
            type_name,
            nullable,
        });
    }

    Ok((style, members))
}

/// Reads `#[preview(value = "i64")]`, marking the member type as a tuple
/// struct wrapping that primitive.
fn value_option(field: &syn::Field) -> syn::Result<Option<PrimitiveKind>> {
    let mut wraps = None;

    for attr in &field.attrs {
        if !attr.path().is_ident("preview") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("value") {
                let value: LitStr = meta.value()?.parse()?;
                let kind = PrimitiveKind::from_rust_name(&value.value()).ok_or_else(|| {
                    syn::Error::new_spanned(&value, "value wrappers must wrap a primitive")
                })?;
                wraps = Some(kind);
                Ok(())
            } else {
                Err(meta.error("unknown preview field option"))
            }
        })?;
    }

    Ok(wraps)
}

/// Registers the member type in the catalog and returns its name and whether
/// the member is nullable.
fn member_type(
    owner: &str,
    ty: &Type,
    wraps: Option<PrimitiveKind>,
    catalog: &mut TypeCatalog,
) -> (String, bool) {
    match option_inner(ty) {
        Some(inner) => (register_type(owner, inner, wraps, catalog), true),
        None => (register_type(owner, ty, wraps, catalog), false),
    }
}

fn register_type(
    owner: &str,
    ty: &Type,
    wraps: Option<PrimitiveKind>,
    catalog: &mut TypeCatalog,
) -> String {
    let Some(path) = plain_path(ty) else {
        let name = ty.to_token_stream().to_string();
        if !catalog.has_type(&name) {
            catalog.add_type(TypeDescriptor::opaque(name.clone()));
        }
        return name;
    };

    if PrimitiveKind::from_rust_name(&path).is_some() || path == owner || catalog.has_type(&path) {
        return path;
    }

    let descriptor = match wraps {
        Some(kind) => TypeDescriptor::product(
            path.clone(),
            ConstructorStyle::Positional,
            vec![MemberDescriptor::new("0", kind.rust_name())],
        )
        .with_companion(false)
        .with_value(true),
        None => {
            let factory = match path.rsplit_once("::") {
                Some((module, ident)) => format!("{module}::{ident}FieldFactory"),
                None => format!("{path}FieldFactory"),
            };
            TypeDescriptor::external(path.clone(), factory)
        }
    };
    catalog.add_type(descriptor);
    path
}

/// Returns `T` for `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) if args.args.len() == 1 && option_inner(inner).is_none() => {
            Some(inner)
        }
        _ => None,
    }
}

/// Returns `a::B` for a path type without generic arguments.
fn plain_path(ty: &Type) -> Option<String> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() || type_path.path.leading_colon.is_some() {
        return None;
    }

    let mut segments = Vec::with_capacity(type_path.path.segments.len());
    for segment in &type_path.path.segments {
        if !segment.arguments.is_none() {
            return None;
        }
        segments.push(segment.ident.to_string());
    }
    Some(segments.join("::"))
}
