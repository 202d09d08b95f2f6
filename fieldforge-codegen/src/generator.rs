//! Rust source generation for field factories.
//!
//! A [`Generator`] runs one pass per call to [`Generator::generate`]: every
//! requested type is classified through a fresh [`ResolutionPass`], turned into
//! factory plans (one per product, sum and product variant reachable from the
//! request), and rendered as Rust source. Plans are keyed by type name, so a type
//! referenced from several places yields a single factory struct.

use crate::config::GeneratorConfig;
use crate::error::CodegenError;
use fieldforge_schema::naming::{escape_ident, to_snake_case};
use fieldforge_schema::types::simple_name;
use fieldforge_schema::{
    Classification, ConstructorStyle, Directive, GenerationRequest, MemberModifiers,
    NamingResolver, PrimitiveKind, ProductShape, ResolutionPass, ResolvedMember, ResolvedName,
    SumShape, TypeCatalog, TypeKind, ValueWrapper, value_wrapper_of,
};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Generates field factories for a type catalog.
#[derive(Debug)]
pub struct Generator<'a> {
    catalog: &'a TypeCatalog,
    config: GeneratorConfig,
    naming: NamingResolver,
}

impl<'a> Generator<'a> {
    /// Creates a generator with default settings.
    #[must_use]
    pub fn new(catalog: &'a TypeCatalog) -> Self {
        Self::with_config(catalog, GeneratorConfig::default())
    }

    /// Creates a generator with the given configuration.
    #[must_use]
    pub fn with_config(catalog: &'a TypeCatalog, config: GeneratorConfig) -> Self {
        let naming = NamingResolver::new(config.case());
        Self {
            catalog,
            config,
            naming,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates the factories and entry points for all requests.
    ///
    /// # Arguments
    /// * `requests` - Requests in the order their entry points are emitted
    ///
    /// # Returns
    /// Rust source text, meant to be `include!`d next to the subject types.
    ///
    /// # Errors
    /// Returns an error if a request names an unknown type, fails a
    /// precondition, or reaches an unsupported member while unsupported
    /// members are not tolerated.
    pub fn generate(&self, requests: &[GenerationRequest]) -> Result<String, CodegenError> {
        let mut pass = GenerationPass::new(self.catalog, &self.config, self.naming);

        for request in requests {
            let directive = match request.directive {
                Directive::Factory => "factory",
                Directive::Field => "field",
            };
            tracing::info!(
                "Generating {} entry point for '{}'",
                directive,
                request.type_name
            );
            match request.directive {
                Directive::Factory => pass.factory_entry(request)?,
                Directive::Field => pass.field_entry(request)?,
            }
        }

        tracing::debug!(
            "Generated {} factories for {} requests",
            pass.order.len(),
            requests.len()
        );
        Ok(pass.finish())
    }

    /// Generates the output for a single request.
    ///
    /// # Errors
    /// See [`Generator::generate`].
    pub fn generate_request(&self, request: &GenerationRequest) -> Result<String, CodegenError> {
        self.generate(std::slice::from_ref(request))
    }
}

/// Factory struct to emit for one product, sum or product variant.
#[derive(Debug)]
struct FactoryPlan {
    /// Plan key: the type name, or `Sum::Variant` for variants.
    key: String,
    struct_name: String,
    /// Type the factory creates fields for.
    value_type: String,
    body: PlanBody,
    /// Struct fields; a plan without fields is a unit struct.
    fields: Vec<PlanField>,
}

#[derive(Debug)]
enum PlanBody {
    Product {
        constructor: String,
        style: ConstructorStyle,
        members: Vec<MemberPlan>,
        is_variant: bool,
    },
    Sum {
        variants: Vec<VariantPlan>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PlanField {
    name: String,
    ty: String,
    doc: String,
}

#[derive(Debug)]
struct MemberPlan {
    label: String,
    /// Token used to access the member: escaped name or tuple index.
    access: String,
    accessor: String,
    value_ty: String,
    factory: ChildFactory,
    default_expr: String,
}

#[derive(Debug)]
struct VariantPlan {
    tag: String,
    pattern: String,
    default_expr: String,
    factory: ChildFactory,
    /// Accessor emitted on the sum factory for product variants.
    accessor: Option<String>,
}

/// Factory expression for one child field.
#[derive(Debug, Clone)]
struct ChildFactory {
    ty: String,
    expr: String,
    /// Field the owner needs to hold for this factory.
    field: Option<PlanField>,
}

/// Where a non-unit child factory is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Receiver {
    /// A field of the owning factory struct.
    SelfField,
    /// The `factory` parameter of an entry function.
    Param,
}

struct GenerationPass<'a, 'c> {
    catalog: &'a TypeCatalog,
    config: &'c GeneratorConfig,
    naming: NamingResolver,
    resolution: ResolutionPass<'a>,
    plans: HashMap<String, Rc<FactoryPlan>>,
    order: Vec<String>,
    struct_owners: HashMap<String, String>,
    functions: HashSet<(String, String)>,
    entries: String,
}

impl<'a, 'c> GenerationPass<'a, 'c> {
    fn new(catalog: &'a TypeCatalog, config: &'c GeneratorConfig, naming: NamingResolver) -> Self {
        Self {
            catalog,
            config,
            naming,
            resolution: ResolutionPass::new(catalog),
            plans: HashMap::new(),
            order: Vec::new(),
            struct_owners: HashMap::new(),
            functions: HashSet::new(),
            entries: String::new(),
        }
    }

    fn rt(&self, item: &str) -> String {
        format!("{}::{}", self.config.runtime(), item)
    }

    fn factory_entry(&mut self, request: &GenerationRequest) -> Result<(), CodegenError> {
        let type_name = request.type_name.as_str();
        let catalog = self.catalog;
        let descriptor = catalog
            .get_type(type_name)
            .ok_or_else(|| CodegenError::UnknownType {
                type_name: type_name.to_string(),
            })?;

        let has_companion = match &descriptor.kind {
            TypeKind::Product { has_companion, .. } | TypeKind::Sum { has_companion, .. } => {
                *has_companion
            }
            other => {
                return Err(CodegenError::NotFactoryTarget {
                    type_name: type_name.to_string(),
                    kind: other.name().to_string(),
                });
            }
        };
        if !has_companion {
            return Err(CodegenError::MissingCompanion {
                type_name: type_name.to_string(),
            });
        }

        let classification = self.resolution.classify(descriptor);
        if let Some(reason) = classification.unsupported_reason() {
            return Err(CodegenError::Unsupported {
                type_name: type_name.to_string(),
                reason: reason.to_string(),
            });
        }

        let plan = self.plan_named(type_name, &classification)?;
        let name = self
            .naming
            .resolve(type_name, request.function_name.as_deref(), request.auto_label);
        self.claim_function(type_name, &name.function_name)?;

        let (factory_param, receiver) = if plan.fields.is_empty() {
            (String::new(), format!("&{}", plan.struct_name))
        } else {
            (
                format!("factory: &{}, ", plan.struct_name),
                "factory".to_string(),
            )
        };
        let (label_param, label_arg) = label_parts(&name);
        let factory_trait = format!(
            "<{} as {}<{}>>",
            plan.struct_name,
            self.rt("FieldFactory"),
            type_name
        );

        let mut output = String::new();
        output.push_str(&format!("\nimpl {type_name} {{\n"));
        if self.config.docs() {
            output.push_str(&format!(
                "    /// Creates a field editing a `{}` value.\n",
                simple_name(type_name)
            ));
        }
        output.push_str("    #[must_use]\n");
        output.push_str(&format!(
            "    pub fn {}({}{}, initial_value: {}) -> {}::Field {{\n",
            name.function_name, factory_param, label_param, type_name, factory_trait
        ));
        output.push_str(&format!(
            "        {factory_trait}::create({receiver}, {label_arg}, initial_value)\n"
        ));
        output.push_str("    }\n");
        output.push_str("}\n");

        self.entries.push_str(&output);
        Ok(())
    }

    fn field_entry(&mut self, request: &GenerationRequest) -> Result<(), CodegenError> {
        let type_name = request.type_name.as_str();
        let catalog = self.catalog;
        let descriptor = catalog
            .get_type(type_name)
            .ok_or_else(|| CodegenError::UnknownType {
                type_name: type_name.to_string(),
            })?;

        let wrapper = value_wrapper_of(descriptor);
        let classification = match &wrapper {
            Some(wrapper) => Rc::new(Classification::Primitive(wrapper.primitive)),
            None => self.resolution.classify(descriptor),
        };
        if let Some(reason) = classification.unsupported_reason() {
            return Err(CodegenError::Unsupported {
                type_name: type_name.to_string(),
                reason: reason.to_string(),
            });
        }

        let name = self
            .naming
            .resolve(type_name, request.function_name.as_deref(), request.auto_label);
        self.claim_function("", &name.function_name)?;

        let subject = ResolvedMember {
            name: simple_name(type_name).to_string(),
            type_name: type_name.to_string(),
            classification,
            modifiers: MemberModifiers {
                nullable: request.nullable,
                value_wrapper: wrapper,
            },
        };
        let factory = self.member_factory(type_name, &subject, Receiver::Param)?;
        let value_ty = member_value_type(&subject);

        let factory_param = match &factory.field {
            Some(field) => format!("factory: &{}, ", field.ty),
            None => String::new(),
        };
        let (label_param, label_arg) = label_parts(&name);
        let factory_trait = format!(
            "<{} as {}<{}>>",
            factory.ty,
            self.rt("FieldFactory"),
            value_ty
        );

        let mut output = String::new();
        output.push('\n');
        if self.config.docs() {
            output.push_str(&format!(
                "/// Creates a field editing a `{}` value.\n",
                simple_name(type_name)
            ));
        }
        output.push_str("#[must_use]\n");
        output.push_str(&format!(
            "pub fn {}({}{}, initial_value: {}) -> {}::Field {{\n",
            name.function_name, factory_param, label_param, value_ty, factory_trait
        ));
        output.push_str(&format!(
            "    {}::create({}, {}, initial_value)\n",
            factory_trait,
            borrowed(&factory.expr),
            label_arg
        ));
        output.push_str("}\n");

        self.entries.push_str(&output);
        Ok(())
    }

    fn claim_function(&mut self, scope: &str, name: &str) -> Result<(), CodegenError> {
        if self.functions.insert((scope.to_string(), name.to_string())) {
            return Ok(());
        }
        let owner = if scope.is_empty() { "module" } else { scope };
        Err(CodegenError::generation(format!(
            "function '{name}' is generated twice in {owner}"
        )))
    }

    fn claim_struct(&mut self, struct_name: &str, key: &str) -> Result<(), CodegenError> {
        if let Some(owner) = self.struct_owners.get(struct_name) {
            if owner != key {
                return Err(CodegenError::generation(format!(
                    "factory name '{struct_name}' is derived from both '{owner}' and '{key}'"
                )));
            }
            return Ok(());
        }
        self.struct_owners
            .insert(struct_name.to_string(), key.to_string());
        Ok(())
    }

    fn plan_named(
        &mut self,
        type_name: &str,
        classification: &Classification,
    ) -> Result<Rc<FactoryPlan>, CodegenError> {
        if let Some(plan) = self.plans.get(type_name) {
            return Ok(Rc::clone(plan));
        }
        match classification {
            Classification::Product(product) => {
                self.plan_product(type_name, type_name, type_name, product, false)
            }
            Classification::Sum(sum) => self.plan_sum(type_name, sum),
            other => Err(CodegenError::generation(format!(
                "type '{type_name}' is {}, expected product or sum",
                other.kind_name()
            ))),
        }
    }

    fn plan_product(
        &mut self,
        key: &str,
        value_type: &str,
        constructor: &str,
        product: &ProductShape,
        is_variant: bool,
    ) -> Result<Rc<FactoryPlan>, CodegenError> {
        let struct_name = if is_variant {
            self.naming.variant_factory_type_name(value_type, key)
        } else {
            self.naming.factory_type_name(key)
        };
        self.claim_struct(&struct_name, key)?;
        self.order.push(key.to_string());
        tracing::debug!("Planning {} for '{}'", struct_name, key);

        let mut fields = Vec::new();
        let mut members = Vec::with_capacity(product.members.len());

        for member in &product.members {
            let factory = self.member_factory(key, member, Receiver::SelfField)?;
            if let Some(field) = &factory.field {
                push_field(&mut fields, field.clone(), &struct_name)?;
            }
            members.push(MemberPlan {
                label: member.name.clone(),
                access: escape_ident(&member.name),
                accessor: self.naming.accessor_name(&member.name),
                value_ty: member_value_type(member),
                factory,
                default_expr: default_expr(member),
            });
        }

        let plan = Rc::new(FactoryPlan {
            key: key.to_string(),
            struct_name,
            value_type: value_type.to_string(),
            body: PlanBody::Product {
                constructor: constructor.to_string(),
                style: product.style,
                members,
                is_variant,
            },
            fields,
        });
        self.plans.insert(key.to_string(), Rc::clone(&plan));
        Ok(plan)
    }

    fn plan_sum(&mut self, type_name: &str, sum: &SumShape) -> Result<Rc<FactoryPlan>, CodegenError> {
        let struct_name = self.naming.factory_type_name(type_name);
        self.claim_struct(&struct_name, type_name)?;
        self.order.push(type_name.to_string());
        tracing::debug!("Planning {} for '{}'", struct_name, type_name);

        let mut fields = Vec::new();
        let mut variants = Vec::with_capacity(sum.variants.len());

        for variant in &sum.variants {
            let path = variant.type_name.as_str();
            let plan = match variant.classification.as_ref() {
                Classification::Singleton { is_valueless } => {
                    let (instance, pattern) = if *is_valueless {
                        (path.to_string(), path.to_string())
                    } else {
                        (format!("{path} {{}}"), format!("{path} {{ .. }}"))
                    };
                    VariantPlan {
                        tag: variant.name.clone(),
                        pattern,
                        default_expr: instance,
                        factory: self.fixed_factory(),
                        accessor: None,
                    }
                }
                Classification::Product(product) => {
                    let variant_plan = match self.plans.get(path) {
                        Some(plan) => Rc::clone(plan),
                        None => self.plan_product(path, type_name, path, product, true)?,
                    };
                    let factory = self.plan_factory(
                        &variant_plan,
                        &to_snake_case(&variant.name),
                        Receiver::SelfField,
                    );
                    if let Some(field) = &factory.field {
                        push_field(&mut fields, field.clone(), &struct_name)?;
                    }
                    let pattern = match product.style {
                        ConstructorStyle::Named => format!("{path} {{ .. }}"),
                        ConstructorStyle::Positional => format!("{path}(..)"),
                    };
                    let defaults: Vec<(String, String)> = match &variant_plan.body {
                        PlanBody::Product { members, .. } => members
                            .iter()
                            .map(|m| (m.access.clone(), m.default_expr.clone()))
                            .collect(),
                        PlanBody::Sum { .. } => Vec::new(),
                    };
                    VariantPlan {
                        tag: variant.name.clone(),
                        pattern,
                        default_expr: construct(path, product.style, &defaults),
                        factory,
                        accessor: Some(self.naming.accessor_name(&variant.name)),
                    }
                }
                other => {
                    return Err(CodegenError::generation(format!(
                        "variant {} of {} is {}, expected product or singleton",
                        variant.name,
                        type_name,
                        other.kind_name()
                    )));
                }
            };
            variants.push(plan);
        }

        let plan = Rc::new(FactoryPlan {
            key: type_name.to_string(),
            struct_name,
            value_type: type_name.to_string(),
            body: PlanBody::Sum { variants },
            fields,
        });
        self.plans.insert(type_name.to_string(), Rc::clone(&plan));
        Ok(plan)
    }

    fn plan_factory(&self, plan: &FactoryPlan, field_name: &str, receiver: Receiver) -> ChildFactory {
        if plan.fields.is_empty() {
            return ChildFactory {
                ty: plan.struct_name.clone(),
                expr: plan.struct_name.clone(),
                field: None,
            };
        }

        let field = PlanField {
            name: escape_ident(field_name),
            ty: plan.struct_name.clone(),
            doc: format!("Factory for nested `{}` fields.", simple_name(&plan.key)),
        };
        let expr = match receiver {
            Receiver::SelfField => format!("self.{}.clone()", field.name),
            Receiver::Param => "factory.clone()".to_string(),
        };
        ChildFactory {
            ty: plan.struct_name.clone(),
            expr,
            field: Some(field),
        }
    }

    fn member_factory(
        &mut self,
        owner: &str,
        member: &ResolvedMember,
        receiver: Receiver,
    ) -> Result<ChildFactory, CodegenError> {
        let base = self.base_factory(owner, member, receiver)?;
        if !member.modifiers.nullable {
            return Ok(base);
        }

        let nullable = self.rt("NullableField");
        Ok(ChildFactory {
            ty: format!("{}<{}, {}>", nullable, base.ty, member.type_name),
            expr: format!(
                "{}::new({}, || {})",
                nullable,
                base.expr,
                value_default(member)
            ),
            field: base.field,
        })
    }

    fn base_factory(
        &mut self,
        owner: &str,
        member: &ResolvedMember,
        receiver: Receiver,
    ) -> Result<ChildFactory, CodegenError> {
        if let Some(wrapper) = &member.modifiers.value_wrapper {
            return Ok(self.wrapper_factory(&member.type_name, wrapper));
        }

        let type_name = member.type_name.as_str();
        match member.classification.as_ref() {
            Classification::Primitive(kind) => Ok(self.leaf_factory(*kind)),
            Classification::Enum(entries) => {
                let enum_field = self.rt("EnumField");
                let entries: Vec<String> = entries
                    .iter()
                    .map(|entry| format!("{type_name}::{entry}"))
                    .collect();
                Ok(ChildFactory {
                    ty: format!("{enum_field}<{type_name}>"),
                    expr: format!("{}::new(vec![{}])", enum_field, entries.join(", ")),
                    field: None,
                })
            }
            Classification::Singleton { .. } => Ok(self.fixed_factory()),
            classification @ (Classification::Product(_) | Classification::Sum(_)) => {
                let plan = self.plan_named(type_name, classification)?;
                Ok(self.plan_factory(&plan, &to_snake_case(simple_name(type_name)), receiver))
            }
            Classification::External(path) => Ok(ChildFactory {
                ty: path.clone(),
                expr: format!("<{path} as ::core::default::Default>::default()"),
                field: None,
            }),
            Classification::Unsupported(reason) => self.obligation(owner, member, reason),
        }
    }

    fn obligation(
        &self,
        owner: &str,
        member: &ResolvedMember,
        reason: &str,
    ) -> Result<ChildFactory, CodegenError> {
        if !self.config.tolerates_unsupported() {
            return Err(CodegenError::UnsupportedMember {
                owner: owner.to_string(),
                member: member.name.clone(),
                reason: reason.to_string(),
            });
        }

        tracing::warn!(
            "Member '{}' of '{}' is unsupported ({}), leaving its factory to the caller",
            member.name,
            owner,
            reason
        );
        let field = PlanField {
            name: self.naming.obligation_name(&member.name),
            ty: format!("{}<{}>", self.rt("SharedFactory"), member.type_name),
            doc: format!(
                "Caller-supplied factory for member `{}`: {}.",
                member.name, reason
            ),
        };
        Ok(ChildFactory {
            ty: field.ty.clone(),
            expr: format!("self.{}.clone()", field.name),
            field: Some(field),
        })
    }

    fn wrapper_factory(&self, type_name: &str, wrapper: &ValueWrapper) -> ChildFactory {
        let leaf = self.leaf_factory(wrapper.primitive);
        let primitive = wrapper.primitive.rust_name();
        let access = escape_ident(&wrapper.member);
        let read = if wrapper.primitive == PrimitiveKind::String {
            format!("value.{access}.clone()")
        } else {
            format!("value.{access}")
        };
        let build = construct(
            type_name,
            wrapper.style,
            &[(access, "inner".to_string())],
        );
        let transform = self.rt("TransformField");

        ChildFactory {
            ty: format!("{}<{}, {}, {}>", transform, leaf.ty, type_name, primitive),
            expr: format!(
                "{}::new({}, |value: &{}| {}, |inner: {}| {})",
                transform, leaf.expr, type_name, read, primitive, build
            ),
            field: None,
        }
    }

    fn leaf_factory(&self, kind: PrimitiveKind) -> ChildFactory {
        let name = match kind {
            PrimitiveKind::String => "StringField",
            PrimitiveKind::Int32 => "I32Field",
            PrimitiveKind::Int64 => "I64Field",
            PrimitiveKind::Float32 => "F32Field",
            PrimitiveKind::Float64 => "F64Field",
            PrimitiveKind::Bool => "BoolField",
            PrimitiveKind::Byte => "U8Field",
        };
        let path = self.rt(name);
        ChildFactory {
            ty: path.clone(),
            expr: path,
            field: None,
        }
    }

    fn fixed_factory(&self) -> ChildFactory {
        let path = self.rt("FixedField");
        ChildFactory {
            ty: path.clone(),
            expr: path,
            field: None,
        }
    }

    fn finish(self) -> String {
        let mut output = String::new();
        output.push_str("// Generated by fieldforge-codegen. Do not edit.\n");

        for key in &self.order {
            if let Some(plan) = self.plans.get(key) {
                output.push('\n');
                output.push_str(&self.render_plan(plan));
            }
        }

        output.push_str(&self.entries);
        output
    }

    fn render_plan(&self, plan: &FactoryPlan) -> String {
        let mut output = String::new();
        let docs = self.config.docs();

        if docs {
            match &plan.body {
                PlanBody::Product {
                    is_variant: true, ..
                } => output.push_str(&format!(
                    "/// Field factory for the `{}` variant.\n",
                    plan.key
                )),
                _ => output.push_str(&format!(
                    "/// Field factory for `{}`.\n",
                    simple_name(&plan.key)
                )),
            }
        }

        if plan.fields.is_empty() {
            output.push_str("#[derive(Debug, Clone, Copy, Default)]\n");
            output.push_str(&format!("pub struct {};\n", plan.struct_name));
        } else {
            output.push_str("#[derive(Debug, Clone)]\n");
            output.push_str(&format!("pub struct {} {{\n", plan.struct_name));
            for field in &plan.fields {
                if docs {
                    output.push_str(&format!("    /// {}\n", field.doc));
                }
                output.push_str(&format!("    pub {}: {},\n", field.name, field.ty));
            }
            output.push_str("}\n");
        }

        let mut methods = Vec::new();
        if !plan.fields.is_empty() {
            methods.push(self.render_constructor(plan));
        }
        match &plan.body {
            PlanBody::Product { members, .. } => {
                for member in members {
                    methods.push(self.render_accessor(
                        &member.accessor,
                        &format!("member `{}`", member.label),
                        &member.factory,
                    ));
                }
            }
            PlanBody::Sum { variants } => {
                for variant in variants {
                    if let Some(accessor) = &variant.accessor {
                        methods.push(self.render_accessor(
                            accessor,
                            &format!("variant `{}`", variant.tag),
                            &variant.factory,
                        ));
                    }
                }
            }
        }

        if !methods.is_empty() {
            output.push_str(&format!("\nimpl {} {{\n", plan.struct_name));
            output.push_str(&methods.join("\n"));
            output.push_str("}\n");
        }

        output.push('\n');
        match &plan.body {
            PlanBody::Product {
                constructor,
                style,
                members,
                is_variant,
            } => output.push_str(&self.render_product_impl(
                plan,
                constructor,
                *style,
                members,
                *is_variant,
            )),
            PlanBody::Sum { variants } => output.push_str(&self.render_sum_impl(plan, variants)),
        }

        output
    }

    fn render_constructor(&self, plan: &FactoryPlan) -> String {
        let params: Vec<String> = plan
            .fields
            .iter()
            .map(|field| format!("{}: {}", field.name, field.ty))
            .collect();
        let names: Vec<&str> = plan.fields.iter().map(|field| field.name.as_str()).collect();

        let mut output = String::new();
        if self.config.docs() {
            output.push_str("    /// Creates the factory from its parts.\n");
        }
        output.push_str("    #[must_use]\n");
        output.push_str(&format!("    pub fn new({}) -> Self {{\n", params.join(", ")));
        output.push_str(&format!("        Self {{ {} }}\n", names.join(", ")));
        output.push_str("    }\n");
        output
    }

    fn render_accessor(&self, name: &str, subject: &str, factory: &ChildFactory) -> String {
        let mut output = String::new();
        if self.config.docs() {
            output.push_str(&format!("    /// Returns the factory for {subject}.\n"));
        }
        output.push_str("    #[must_use]\n");
        output.push_str(&format!("    pub fn {}(&self) -> {} {{\n", name, factory.ty));
        output.push_str(&format!("        {}\n", factory.expr));
        output.push_str("    }\n");
        output
    }

    fn render_product_impl(
        &self,
        plan: &FactoryPlan,
        constructor: &str,
        style: ConstructorStyle,
        members: &[MemberPlan],
        is_variant: bool,
    ) -> String {
        let value_type = plan.value_type.as_str();
        let combined = self.rt(&format!("Combined{}", members.len()));
        let member_types: Vec<&str> = members.iter().map(|m| m.value_ty.as_str()).collect();
        let labels: Vec<String> = members.iter().map(|m| format!("{:?}", m.label)).collect();
        let factories: Vec<String> = members
            .iter()
            .map(|m| format!("self.{}()", m.accessor))
            .collect();
        let bindings: Vec<String> = (0..members.len())
            .map(|i| self.naming.binding_name(i))
            .collect();
        let parts: Vec<(String, String)> = members
            .iter()
            .zip(&bindings)
            .map(|(m, binding)| (m.access.clone(), binding.clone()))
            .collect();

        let mut output = String::new();
        output.push_str(&format!(
            "impl {}<{}> for {} {{\n",
            self.rt("FieldFactory"),
            value_type,
            plan.struct_name
        ));
        output.push_str(&format!(
            "    type Field = {}<{}, {}>;\n\n",
            combined,
            value_type,
            member_types.join(", ")
        ));
        if is_variant {
            output.push_str("    #[allow(clippy::clone_on_copy, unreachable_patterns)]\n");
        } else {
            output.push_str("    #[allow(clippy::clone_on_copy)]\n");
        }
        output.push_str(&format!(
            "    fn create(&self, label: &str, initial_value: {value_type}) -> Self::Field {{\n"
        ));
        output.push_str(&format!("        {combined}::new(\n"));
        output.push_str("            label,\n");
        output.push_str("            initial_value,\n");
        output.push_str(&format!("            [{}],\n", labels.join(", ")));
        output.push_str(&format!("            {},\n", tuple(&factories)));
        output.push_str(&format!(
            "            |{}| {},\n",
            bindings.join(", "),
            construct(constructor, style, &parts)
        ));

        if is_variant {
            let clones: Vec<String> = bindings.iter().map(|b| format!("{b}.clone()")).collect();
            let defaults: Vec<String> = members.iter().map(|m| m.default_expr.clone()).collect();
            output.push_str(&format!("            |value: &{value_type}| match value {{\n"));
            output.push_str(&format!(
                "                {} => {},\n",
                construct(constructor, style, &parts),
                tuple(&clones)
            ));
            output.push_str(&format!("                _ => {},\n", tuple(&defaults)));
            output.push_str("            },\n");
        } else {
            let clones: Vec<String> = members
                .iter()
                .map(|m| format!("value.{}.clone()", m.access))
                .collect();
            output.push_str(&format!(
                "            |value: &{}| {},\n",
                value_type,
                tuple(&clones)
            ));
        }

        output.push_str("        )\n");
        output.push_str("    }\n");
        output.push_str("}\n");
        output
    }

    fn render_sum_impl(&self, plan: &FactoryPlan, variants: &[VariantPlan]) -> String {
        let value_type = plan.value_type.as_str();
        let variant = self.rt("Variant");

        let mut output = String::new();
        output.push_str(&format!(
            "impl {}<{}> for {} {{\n",
            self.rt("FieldFactory"),
            value_type,
            plan.struct_name
        ));
        output.push_str(&format!(
            "    type Field = {}<{}>;\n\n",
            self.rt("Polymorphic"),
            value_type
        ));
        output.push_str(&format!(
            "    fn create(&self, label: &str, initial_value: {value_type}) -> Self::Field {{\n"
        ));
        output.push_str(&format!("        {}::new(\n", self.rt("Polymorphic")));
        output.push_str("            label,\n");
        output.push_str("            initial_value,\n");
        output.push_str("            vec![\n");
        for plan in variants {
            let factory = match &plan.accessor {
                Some(accessor) => format!("self.{accessor}()"),
                None => plan.factory.expr.clone(),
            };
            output.push_str(&format!("                {variant}::new(\n"));
            output.push_str(&format!("                    {:?},\n", plan.tag));
            output.push_str(&format!(
                "                    |value: &{}| matches!(value, {}),\n",
                value_type, plan.pattern
            ));
            output.push_str(&format!("                    {factory},\n"));
            output.push_str(&format!("                    {},\n", plan.default_expr));
            output.push_str("                ),\n");
        }
        output.push_str("            ],\n");
        output.push_str("        )\n");
        output.push_str("    }\n");
        output.push_str("}\n");
        output
    }
}

/// Adds a struct field; children sharing one nested factory share its field.
fn push_field(
    fields: &mut Vec<PlanField>,
    field: PlanField,
    struct_name: &str,
) -> Result<(), CodegenError> {
    match fields.iter().find(|existing| existing.name == field.name) {
        Some(existing) if existing.ty == field.ty => Ok(()),
        Some(existing) => Err(CodegenError::generation(format!(
            "field '{}' of {} is needed as both {} and {}",
            field.name, struct_name, existing.ty, field.ty
        ))),
        None => {
            fields.push(field);
            Ok(())
        }
    }
}

fn label_parts(name: &ResolvedName) -> (String, String) {
    match &name.default_label {
        Some(label) => (
            "label: Option<&str>".to_string(),
            format!("label.unwrap_or({label:?})"),
        ),
        None => ("label: &str".to_string(), "label".to_string()),
    }
}

/// Borrows a factory expression for a `create` call.
fn borrowed(expr: &str) -> String {
    match expr.strip_suffix(".clone()") {
        Some("factory") => "factory".to_string(),
        Some(base) => format!("&{base}"),
        None => format!("&{expr}"),
    }
}

fn member_value_type(member: &ResolvedMember) -> String {
    if member.modifiers.nullable {
        format!("Option<{}>", member.type_name)
    } else {
        member.type_name.clone()
    }
}

/// Builds a constructor call or pattern from `(access, expression)` parts.
fn construct(path: &str, style: ConstructorStyle, parts: &[(String, String)]) -> String {
    match style {
        ConstructorStyle::Named => {
            let fields: Vec<String> = parts
                .iter()
                .map(|(access, expr)| format!("{access}: {expr}"))
                .collect();
            format!("{} {{ {} }}", path, fields.join(", "))
        }
        ConstructorStyle::Positional => {
            let values: Vec<&str> = parts.iter().map(|(_, expr)| expr.as_str()).collect();
            format!("{}({})", path, values.join(", "))
        }
    }
}

fn tuple(items: &[String]) -> String {
    match items {
        [single] => format!("({single},)"),
        _ => format!("({})", items.join(", ")),
    }
}

fn default_expr(member: &ResolvedMember) -> String {
    if member.modifiers.nullable {
        "None".to_string()
    } else {
        value_default(member)
    }
}

/// Default value of the member type, ignoring nullability.
fn value_default(member: &ResolvedMember) -> String {
    let type_name = member.type_name.as_str();

    if let Some(wrapper) = &member.modifiers.value_wrapper {
        return construct(
            type_name,
            wrapper.style,
            &[(
                escape_ident(&wrapper.member),
                wrapper.primitive.default_expr().to_string(),
            )],
        );
    }

    match member.classification.as_ref() {
        Classification::Primitive(kind) => kind.default_expr().to_string(),
        Classification::Enum(entries) => match entries.first() {
            Some(first) => format!("{type_name}::{first}"),
            None => format!("<{type_name} as ::core::default::Default>::default()"),
        },
        Classification::Singleton { is_valueless: true } => type_name.to_string(),
        Classification::Singleton {
            is_valueless: false,
        } => format!("{type_name} {{}}"),
        _ => format!("<{type_name} as ::core::default::Default>::default()"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldforge_schema::{NameCase, parse_schema};

    fn generate(xml: &str) -> Result<String, CodegenError> {
        let schema = parse_schema(xml).expect("Failed to parse schema");
        let config = GeneratorConfig::from_schema(&schema);
        Generator::with_config(&schema.catalog, config).generate(&schema.requests)
    }

    fn schema(types: &str, requests: &str) -> String {
        format!(
            r#"<fieldSchema package="test"><types>{types}</types>{requests}</fieldSchema>"#
        )
    }

    const BASIC: &str = r#"
        <product name="BasicData">
            <member name="str" type="String"/>
            <member name="int" type="i32"/>
            <member name="flag" type="bool"/>
        </product>
    "#;

    #[test]
    fn test_three_member_product() {
        let output = generate(&schema(BASIC, r#"<generate type="BasicData"/>"#))
            .expect("Failed to generate");

        assert!(output.starts_with("// Generated by fieldforge-codegen"));
        assert!(output.contains("#[derive(Debug, Clone, Copy, Default)]\npub struct BasicDataFieldFactory;"));
        assert!(output.contains(
            "type Field = ::fieldforge_core::Combined3<BasicData, String, i32, bool>;"
        ));
        assert!(output.contains(r#"["str", "int", "flag"],"#));
        assert!(output.contains("(self.str_field(), self.int_field(), self.flag_field()),"));
        assert!(output.contains("|m0, m1, m2| BasicData { str: m0, int: m1, flag: m2 },"));
        assert!(output.contains(
            "|value: &BasicData| (value.str.clone(), value.int.clone(), value.flag.clone()),"
        ));
        assert!(output.contains(
            "pub fn str_field(&self) -> ::fieldforge_core::StringField {\n        ::fieldforge_core::StringField\n    }"
        ));
        assert!(output.contains("impl BasicData {"));
        assert!(output.contains(
            "pub fn basic_data(label: Option<&str>, initial_value: BasicData) -> <BasicDataFieldFactory as ::fieldforge_core::FieldFactory<BasicData>>::Field {"
        ));
        assert!(output.contains(
            r#"::create(&BasicDataFieldFactory, label.unwrap_or("basic_data"), initial_value)"#
        ));
    }

    #[test]
    fn test_nullable_and_value_wrapper_members() {
        let types = r#"
            <product name="UserId" style="positional" companion="false" value="true">
                <member name="0" type="i64"/>
            </product>
            <product name="Account">
                <member name="id" type="UserId"/>
                <member name="note" type="String" nullable="true"/>
            </product>
        "#;
        let output = generate(&schema(types, r#"<generate type="Account" name="account"/>"#))
            .expect("Failed to generate");

        assert!(output.contains(
            "type Field = ::fieldforge_core::Combined2<Account, UserId, Option<String>>;"
        ));
        assert!(output.contains(
            "pub fn id_field(&self) -> ::fieldforge_core::TransformField<::fieldforge_core::I64Field, UserId, i64> {"
        ));
        assert!(output.contains(
            "::fieldforge_core::TransformField::new(::fieldforge_core::I64Field, |value: &UserId| value.0, |inner: i64| UserId(inner))"
        ));
        assert!(output.contains(
            "pub fn note_field(&self) -> ::fieldforge_core::NullableField<::fieldforge_core::StringField, String> {"
        ));
        assert!(output.contains(
            "::fieldforge_core::NullableField::new(::fieldforge_core::StringField, || String::new())"
        ));
        assert!(!output.contains("UserIdFieldFactory"));
    }

    #[test]
    fn test_sum_with_singleton_and_product_variants() {
        let types = r#"
            <sum name="Shape">
                <singleton name="Dot"/>
                <product name="Circle"><member name="radius" type="f64"/></product>
            </sum>
        "#;
        let output = generate(&schema(types, r#"<generate type="Shape"/>"#))
            .expect("Failed to generate");

        assert!(output.contains("pub struct ShapeFieldFactory;"));
        assert!(output.contains("pub struct ShapeCircleFieldFactory;"));
        assert!(output.contains("type Field = ::fieldforge_core::Polymorphic<Shape>;"));
        assert!(output.contains("|value: &Shape| matches!(value, Shape::Dot),"));
        assert!(output.contains("|value: &Shape| matches!(value, Shape::Circle { .. }),"));
        assert!(output.contains("                    ::fieldforge_core::FixedField,\n                    Shape::Dot,"));
        assert!(output.contains("                    self.circle_field(),\n                    Shape::Circle { radius: 0.0 },"));
        assert!(output.contains(
            "impl ::fieldforge_core::FieldFactory<Shape> for ShapeCircleFieldFactory {"
        ));
        assert!(output.contains("type Field = ::fieldforge_core::Combined1<Shape, f64>;"));
        assert!(output.contains("|m0| Shape::Circle { radius: m0 },"));
        assert!(output.contains("Shape::Circle { radius: m0 } => (m0.clone(),),"));
        assert!(output.contains("_ => (0.0,),"));
        assert!(output.contains("#[allow(clippy::clone_on_copy, unreachable_patterns)]"));

        let dot = output.find("\"Dot\"").expect("Dot variant emitted");
        let circle = output.find("\"Circle\"").expect("Circle variant emitted");
        assert!(dot < circle);
    }

    #[test]
    fn test_marker_and_positional_variants() {
        let types = r#"
            <sum name="Event">
                <singleton name="Reset" valueless="false"/>
                <product name="Move" style="positional">
                    <member name="0" type="i32"/>
                    <member name="1" type="i32"/>
                </product>
            </sum>
        "#;
        let output = generate(&schema(types, r#"<generate type="Event"/>"#))
            .expect("Failed to generate");

        assert!(output.contains("matches!(value, Event::Reset { .. })"));
        assert!(output.contains("                    Event::Reset {},\n"));
        assert!(output.contains("matches!(value, Event::Move(..))"));
        assert!(output.contains("Event::Move(0, 0),"));
        assert!(output.contains("|m0, m1| Event::Move(m0, m1),"));
        assert!(output.contains("Event::Move(m0, m1) => (m0.clone(), m1.clone()),"));
        assert!(output.contains(r#"["0", "1"],"#));
        assert!(output.contains("pub fn item_0_field(&self)"));
    }

    #[test]
    fn test_generation_is_idempotent() {
        let types = r#"
            <enum name="Color"><entry name="Red"/><entry name="Green"/></enum>
            <product name="Pixel">
                <member name="x" type="i32"/>
                <member name="color" type="Color"/>
            </product>
        "#;
        let xml = schema(types, r#"<generate type="Pixel"/>"#);
        let first = generate(&xml).expect("Failed to generate");
        let second = generate(&xml).expect("Failed to generate");
        assert_eq!(first, second);
        assert!(first.contains(
            "::fieldforge_core::EnumField::new(vec![Color::Red, Color::Green])"
        ));
    }

    #[test]
    fn test_shared_nested_type_planned_once() {
        let types = r#"
            <product name="Address"><member name="city" type="String"/></product>
            <product name="Trip">
                <member name="from" type="Address"/>
                <member name="to" type="Address"/>
            </product>
            <product name="Person">
                <member name="home" type="Address"/>
            </product>
        "#;
        let requests = r#"<generate type="Trip"/><generate type="Person"/>"#;
        let output = generate(&schema(types, requests)).expect("Failed to generate");

        assert_eq!(output.matches("pub struct AddressFieldFactory;").count(), 1);
        assert!(output.contains("pub fn from_field(&self) -> AddressFieldFactory {"));
        assert!(output.contains("pub fn home_field(&self) -> AddressFieldFactory {"));

        let trip = output.find("pub struct TripFieldFactory").expect("Trip emitted");
        let address = output.find("pub struct AddressFieldFactory").expect("Address emitted");
        let person = output.find("pub struct PersonFieldFactory").expect("Person emitted");
        assert!(trip < address && address < person);
    }

    #[test]
    fn test_unsupported_member_aborts_without_tolerance() {
        let types = r#"
            <opaque name="Blob"/>
            <product name="Holder">
                <member name="id" type="i32"/>
                <member name="blob" type="Blob"/>
            </product>
        "#;
        let err = generate(&schema(types, r#"<generate type="Holder"/>"#))
            .expect_err("unsupported member should abort");
        match err {
            CodegenError::UnsupportedMember { owner, member, .. } => {
                assert_eq!(owner, "Holder");
                assert_eq!(member, "blob");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_tolerated_member_becomes_obligation() {
        let xml = r#"
            <fieldSchema package="test" tolerateUnsupported="true">
                <types>
                    <opaque name="Blob"/>
                    <product name="Holder">
                        <member name="id" type="i32"/>
                        <member name="blob" type="Blob"/>
                    </product>
                    <product name="Outer">
                        <member name="holder" type="Holder"/>
                    </product>
                </types>
                <generate type="Outer"/>
                <generateField type="Holder" name="holder_field"/>
            </fieldSchema>
        "#;
        let output = generate(xml).expect("Failed to generate");

        assert!(output.contains("#[derive(Debug, Clone)]\npub struct HolderFieldFactory {"));
        assert!(output.contains("    pub blob_factory: ::fieldforge_core::SharedFactory<Blob>,"));
        assert!(output.contains(
            "pub fn new(blob_factory: ::fieldforge_core::SharedFactory<Blob>) -> Self {"
        ));
        assert!(output.contains("self.blob_factory.clone()"));
        assert!(output.contains("    pub holder: HolderFieldFactory,"));
        assert!(output.contains(
            "pub fn outer(factory: &OuterFieldFactory, label: Option<&str>, initial_value: Outer)"
        ));
        assert!(output.contains("::create(factory, label.unwrap_or(\"outer\"), initial_value)"));
        assert!(output.contains(
            "pub fn holder_field(factory: &HolderFieldFactory, label: Option<&str>, initial_value: Holder)"
        ));
    }

    #[test]
    fn test_unsupported_subject_never_tolerated() {
        let xml = r#"
            <fieldSchema package="test" tolerateUnsupported="true">
                <types>
                    <product name="Node"><member name="next" type="Node" nullable="true"/></product>
                </types>
                <generate type="Node"/>
            </fieldSchema>
        "#;
        match generate(xml).expect_err("cyclic subject should fail") {
            CodegenError::Unsupported { type_name, reason } => {
                assert_eq!(type_name, "Node");
                assert!(reason.contains("circular type reference"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_factory_preconditions() {
        let types = r#"
            <product name="Loose" companion="false"><member name="a" type="i32"/></product>
            <enum name="Color"><entry name="Red"/></enum>
        "#;

        let err = generate(&schema(types, r#"<generate type="Loose"/>"#))
            .expect_err("missing companion should fail");
        assert!(matches!(err, CodegenError::MissingCompanion { .. }));

        let err = generate(&schema(types, r#"<generate type="Color"/>"#))
            .expect_err("enum is not a factory target");
        match err {
            CodegenError::NotFactoryTarget { kind, .. } => assert_eq!(kind, "enumeration"),
            other => panic!("unexpected error {other}"),
        }

        let catalog = TypeCatalog::new();
        let err = Generator::new(&catalog)
            .generate_request(&GenerationRequest::factory("Ghost"))
            .expect_err("unknown type should fail");
        assert!(matches!(err, CodegenError::UnknownType { .. }));
    }

    #[test]
    fn test_field_entry_for_primitive() {
        let requests = r#"
            <generateField type="i32" name="count" nullable="true"/>
            <generateField type="String" name="title" autoLabel="false"/>
        "#;
        let output = generate(&schema("", requests)).expect("Failed to generate");

        assert!(output.contains(
            "pub fn count(label: Option<&str>, initial_value: Option<i32>) -> <::fieldforge_core::NullableField<::fieldforge_core::I32Field, i32> as ::fieldforge_core::FieldFactory<Option<i32>>>::Field {"
        ));
        assert!(output.contains(
            "::create(&::fieldforge_core::NullableField::new(::fieldforge_core::I32Field, || 0), label.unwrap_or(\"count\"), initial_value)"
        ));
        assert!(output.contains("pub fn title(label: &str, initial_value: String)"));
        assert!(output.contains("::create(&::fieldforge_core::StringField, label, initial_value)"));
    }

    #[test]
    fn test_duplicate_function_rejected() {
        let requests = r#"
            <generateField type="i32" name="count"/>
            <generateField type="i64" name="count"/>
        "#;
        let err = generate(&schema("", requests)).expect_err("duplicate should fail");
        assert!(matches!(err, CodegenError::Generation { .. }));
    }

    #[test]
    fn test_conflicting_struct_fields_rejected() {
        let xml = r#"
            <fieldSchema package="test" tolerateUnsupported="true">
                <types>
                    <opaque name="Address"/>
                    <product name="AddressFactory">
                        <member name="blob" type="Address"/>
                    </product>
                    <product name="Order">
                        <member name="address" type="Address"/>
                        <member name="builder" type="AddressFactory"/>
                    </product>
                </types>
                <generate type="Order"/>
            </fieldSchema>
        "#;
        let err = generate(xml).expect_err("clashing fields should fail");

        let CodegenError::Generation { message } = &err else {
            panic!("expected generation error, got {err:?}");
        };
        assert!(message.contains("field 'address_factory' of OrderFieldFactory"));
        assert!(message.contains("SharedFactory<Address>"));
        assert!(message.contains("AddressFactoryFieldFactory"));
    }

    #[test]
    fn test_shared_nested_factory_field_is_reused() {
        let xml = r#"
            <fieldSchema package="test" tolerateUnsupported="true">
                <types>
                    <opaque name="Blob"/>
                    <product name="Address">
                        <member name="blob" type="Blob"/>
                    </product>
                    <product name="Person">
                        <member name="home" type="Address"/>
                        <member name="work" type="Address"/>
                    </product>
                </types>
                <generate type="Person"/>
            </fieldSchema>
        "#;
        let output = generate(xml).expect("Failed to generate");

        assert_eq!(output.matches("pub address: AddressFieldFactory,").count(), 1);
    }

    #[test]
    fn test_camel_case_and_no_docs() {
        let parsed = parse_schema(&schema(BASIC, "")).expect("Failed to parse schema");
        let config = GeneratorConfig::new()
            .name_case(NameCase::LowerCamel)
            .emit_docs(false)
            .runtime_path("crate::rt");
        let output = Generator::with_config(&parsed.catalog, config)
            .generate_request(&GenerationRequest::factory("BasicData"))
            .expect("Failed to generate");

        assert!(output.contains("pub fn basicData(label: Option<&str>"));
        assert!(output.contains("label.unwrap_or(\"basicData\")"));
        assert!(output.contains("crate::rt::Combined3<BasicData"));
        assert!(!output.contains("///"));
    }

    #[test]
    fn test_nested_sum_and_external_members() {
        let types = r#"
            <sum name="Shape">
                <singleton name="Dot"/>
            </sum>
            <external name="Address" factory="crate::geo::AddressFieldFactory"/>
            <product name="Layer">
                <member name="shape" type="Shape"/>
                <member name="address" type="Address" nullable="true"/>
                <member name="kind" type="Marker"/>
            </product>
            <singleton name="Marker" valueless="false"/>
        "#;
        let output = generate(&schema(types, r#"<generate type="Layer"/>"#))
            .expect("Failed to generate");

        assert!(output.contains("pub fn shape_field(&self) -> ShapeFieldFactory {"));
        assert!(output.contains(
            "::fieldforge_core::NullableField<crate::geo::AddressFieldFactory, Address>"
        ));
        assert!(output.contains(
            "::fieldforge_core::NullableField::new(<crate::geo::AddressFieldFactory as ::core::default::Default>::default(), || <Address as ::core::default::Default>::default())"
        ));
        assert!(output.contains("pub fn kind_field(&self) -> ::fieldforge_core::FixedField {"));
    }
}
