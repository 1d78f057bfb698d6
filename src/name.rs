//! Name policy: mapping raw identifiers onto GraphQL-legal names.

use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error};
use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToUpperCamelCase};

/// The kind of schema element a name belongs to.
///
/// The kind selects the case transform and which reserved-word rules apply.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[allow(missing_docs, reason = "variant names are self-describing")]
pub enum ElementKind {
    Type,
    Field,
    Argument,
    InputField,
    EnumValue,
    Directive,
}

/// Error when a raw or transformed name violates a naming rule.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum NameError {
    /// The name does not match the GraphQL name grammar.
    #[display("Names must match /^[A-Za-z_][A-Za-z0-9_]*$/ but \"{_0}\" does not")]
    InvalidFormat(#[error(not(source))] String),

    /// Names starting with two underscores are reserved for introspection.
    #[display("Name \"{_0}\" must not start with \"__\", which is reserved")]
    ReservedPrefix(#[error(not(source))] String),

    /// Enum values may not shadow the boolean and null literals.
    #[display("Enum value \"{_0}\" must not be \"true\", \"false\" or \"null\"")]
    ReservedEnumValue(#[error(not(source))] String),
}

/// SDL keywords a transformed top-level name may not collide with exactly.
const KEYWORDS: &[&str] = &[
    "directive",
    "enum",
    "extend",
    "fragment",
    "implements",
    "input",
    "interface",
    "mutation",
    "on",
    "query",
    "repeatable",
    "scalar",
    "schema",
    "subscription",
    "type",
    "union",
];

/// Built-in scalar names a transformed type name may not collide with. `ID`
/// is absent: its case transform `Id` never collides.
const SUFFIXED_SCALARS: &[&str] = &["Int", "Float", "String", "Boolean"];

/// Which convention family the policy follows. The Relay flavor additionally
/// opts the schema into Relay structural validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(missing_docs, reason = "variant names are self-describing")]
pub enum PolicyFlavor {
    Default,
    Relay,
}

/// Signature of a pluggable name transform.
pub type NameTransformFn = fn(&str, ElementKind) -> String;

/// Maps raw identifiers onto GraphQL-legal names.
///
/// The policy applies a per-kind case transform, preserves a single leading
/// underscore, appends a `_` suffix on keyword and built-in-scalar
/// collisions, and finally checks the result against the name grammar.
#[derive(Clone, Copy, Debug)]
pub struct NamePolicy {
    transform: NameTransformFn,
    flavor: PolicyFlavor,
}

impl Default for NamePolicy {
    fn default() -> Self {
        NamePolicy {
            transform: default_transform,
            flavor: PolicyFlavor::Default,
        }
    }
}

impl NamePolicy {
    /// A policy with a custom transform.
    pub fn new(transform: NameTransformFn, flavor: PolicyFlavor) -> Self {
        NamePolicy { transform, flavor }
    }

    /// The default transform under the Relay flavor.
    pub fn relay() -> Self {
        NamePolicy {
            transform: default_transform,
            flavor: PolicyFlavor::Relay,
        }
    }

    /// The policy's convention family.
    pub fn flavor(&self) -> PolicyFlavor {
        self.flavor
    }

    /// Transforms `raw` for `kind` and validates the result.
    ///
    /// A leading underscore run is carried over verbatim ahead of the
    /// transform; runs of two or more then fail the reserved-prefix check.
    pub fn apply(&self, raw: &str, kind: ElementKind) -> Result<ArcStr, NameError> {
        let stem_start = raw.len() - raw.trim_start_matches('_').len();
        let mut name = String::with_capacity(raw.len());
        name.push_str(&raw[..stem_start]);
        name.push_str(&(self.transform)(&raw[stem_start..], kind));

        if matches!(kind, ElementKind::Type | ElementKind::Directive)
            && KEYWORDS.contains(&name.as_str())
        {
            name.push('_');
        }
        if kind == ElementKind::Type && SUFFIXED_SCALARS.contains(&name.as_str()) {
            name.push('_');
        }

        ensure_name_valid(&name, kind)?;
        Ok(ArcStr::from(name))
    }
}

fn default_transform(name: &str, kind: ElementKind) -> String {
    match kind {
        ElementKind::Type => name.to_upper_camel_case(),
        ElementKind::EnumValue => name.to_shouty_snake_case(),
        ElementKind::Field
        | ElementKind::Argument
        | ElementKind::InputField
        | ElementKind::Directive => name.to_lower_camel_case(),
    }
}

fn is_valid(name: &str) -> bool {
    for (i, c) in name.chars().enumerate() {
        if i == 0 {
            if !c.is_ascii_alphabetic() && c != '_' {
                return false;
            }
        } else if !c.is_ascii_alphanumeric() && c != '_' {
            return false;
        }
    }
    !name.is_empty()
}

/// Checks `name` against the GraphQL name grammar and the reserved-word
/// rules for `kind`.
///
/// The `__` prefix is rejected for every kind; `true`/`false`/`null` only
/// for enum values.
pub fn ensure_name_valid(name: &str, kind: ElementKind) -> Result<(), NameError> {
    if !is_valid(name) {
        return Err(NameError::InvalidFormat(name.into()));
    }
    if name.starts_with("__") {
        return Err(NameError::ReservedPrefix(name.into()));
    }
    if kind == ElementKind::EnumValue && matches!(name, "true" | "false" | "null") {
        return Err(NameError::ReservedEnumValue(name.into()));
    }
    Ok(())
}
