//! Naming of generated items.
//!
//! Every generated identifier is derived here, from type and member names
//! alone, so the same input always yields the same names.

use crate::types::simple_name;

/// Casing of derived function names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NameCase {
    /// `basic_data`.
    #[default]
    Snake,
    /// `basicData`.
    LowerCamel,
}

impl NameCase {
    /// Converts a name to this case.
    #[must_use]
    pub fn apply(&self, name: &str) -> String {
        match self {
            Self::Snake => to_snake_case(name),
            Self::LowerCamel => to_lower_camel_case(name),
        }
    }

    /// Parses a case from its configuration name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "snake" | "snake_case" => Some(Self::Snake),
            "camel" | "lowerCamel" | "lowerCamelCase" => Some(Self::LowerCamel),
            _ => None,
        }
    }
}

/// Function name and default label of one entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    /// Identifier of the generated function, keyword-escaped.
    pub function_name: String,
    /// Label used when the caller passes none; `None` makes the label required.
    pub default_label: Option<String>,
}

/// Derives generated identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamingResolver {
    case: NameCase,
}

impl NamingResolver {
    /// Creates a resolver using `case` for derived function names.
    #[must_use]
    pub const fn new(case: NameCase) -> Self {
        Self { case }
    }

    /// Returns the configured case.
    #[must_use]
    pub const fn case(&self) -> NameCase {
        self.case
    }

    /// Resolves the entry point name for a type.
    ///
    /// # Arguments
    /// * `type_name` - Qualified name of the subject type
    /// * `explicit_name` - Name given by the request, used verbatim
    /// * `auto_label` - Whether the label defaults to the function name
    #[must_use]
    pub fn resolve(
        &self,
        type_name: &str,
        explicit_name: Option<&str>,
        auto_label: bool,
    ) -> ResolvedName {
        let name = match explicit_name {
            Some(name) => name.to_string(),
            None => self.case.apply(simple_name(type_name)),
        };
        ResolvedName {
            function_name: escape_ident(&name),
            default_label: auto_label.then_some(name),
        }
    }

    /// Returns the factory struct name for a type: `Point` becomes
    /// `PointFieldFactory`.
    #[must_use]
    pub fn factory_type_name(&self, type_name: &str) -> String {
        format!("{}FieldFactory", to_pascal_case(simple_name(type_name)))
    }

    /// Returns the factory struct name for a product variant: `Circle` of
    /// `Shape` becomes `ShapeCircleFieldFactory`.
    #[must_use]
    pub fn variant_factory_type_name(&self, sum_name: &str, variant_name: &str) -> String {
        format!(
            "{}{}FieldFactory",
            to_pascal_case(simple_name(sum_name)),
            to_pascal_case(simple_name(variant_name))
        )
    }

    /// Returns the accessor method name for a member: `radius_field`, or
    /// `item_0_field` for positional members.
    #[must_use]
    pub fn accessor_name(&self, member: &str) -> String {
        format!("{}_field", member_ident_base(member))
    }

    /// Returns the struct field name holding a caller-supplied factory for a
    /// member: `radius_factory`, or `item_0_factory`.
    #[must_use]
    pub fn obligation_name(&self, member: &str) -> String {
        format!("{}_factory", member_ident_base(member))
    }

    /// Returns the binding used for a member inside generated closures.
    #[must_use]
    pub fn binding_name(&self, index: usize) -> String {
        format!("m{index}")
    }
}

fn member_ident_base(member: &str) -> String {
    if member.starts_with(|c: char| c.is_ascii_digit()) {
        format!("item_{member}")
    } else {
        to_snake_case(member)
    }
}

/// Converts a name to snake_case.
///
/// Acronyms stay together: `MDEntryPx` becomes `md_entry_px`.
#[must_use]
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' {
            result.push('_');
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !result.ends_with('_') {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }

    result
}

/// Converts a name to PascalCase.
#[must_use]
pub fn to_pascal_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = true;

    for c in s.chars() {
        if c == '_' || c == '-' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}

/// Converts a name to lowerCamelCase.
#[must_use]
pub fn to_lower_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers.
const RESERVED: &[&str] = &["crate", "self", "Self", "super"];

/// Returns true if `name` is a Rust keyword.
#[must_use]
pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name) || RESERVED.contains(&name)
}

/// Makes `name` usable as an identifier: `type` becomes `r#type`, `self`
/// becomes `self_`.
#[must_use]
pub fn escape_ident(name: &str) -> String {
    if RESERVED.contains(&name) {
        format!("{name}_")
    } else if KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}
