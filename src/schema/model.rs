//! The built, read-only schema produced by the build pass.

use arcstr::ArcStr;
use derive_more::with_trait::Display;
use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    ast::{InputValue, Type},
    schema::meta::{DeprecationStatus, EnumValue},
};

/// GraphQL type kinds, as they appear in positional error messages.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs, reason = "variant names are self-describing")]
pub enum TypeKind {
    #[display("scalar")]
    Scalar,
    #[display("object")]
    Object,
    #[display("interface")]
    Interface,
    #[display("union")]
    Union,
    #[display("enum")]
    Enum,
    #[display("input")]
    InputObject,
}

/// The input positions a type reference can occupy.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[allow(missing_docs, reason = "variant names are self-describing")]
pub enum InputPosition {
    #[display("Argument")]
    Argument,
    #[display("Input field")]
    InputField,
    #[display("Variable")]
    Variable,
}

/// Places a directive may legally be applied.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs, reason = "variant names are self-describing")]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl DirectiveLocation {
    /// The SDL spelling of the location.
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectiveLocation::Query => "QUERY",
            DirectiveLocation::Mutation => "MUTATION",
            DirectiveLocation::Subscription => "SUBSCRIPTION",
            DirectiveLocation::Field => "FIELD",
            DirectiveLocation::FragmentDefinition => "FRAGMENT_DEFINITION",
            DirectiveLocation::FragmentSpread => "FRAGMENT_SPREAD",
            DirectiveLocation::InlineFragment => "INLINE_FRAGMENT",
            DirectiveLocation::VariableDefinition => "VARIABLE_DEFINITION",
            DirectiveLocation::Schema => "SCHEMA",
            DirectiveLocation::Scalar => "SCALAR",
            DirectiveLocation::Object => "OBJECT",
            DirectiveLocation::FieldDefinition => "FIELD_DEFINITION",
            DirectiveLocation::ArgumentDefinition => "ARGUMENT_DEFINITION",
            DirectiveLocation::Interface => "INTERFACE",
            DirectiveLocation::Union => "UNION",
            DirectiveLocation::Enum => "ENUM",
            DirectiveLocation::EnumValue => "ENUM_VALUE",
            DirectiveLocation::InputObject => "INPUT_OBJECT",
            DirectiveLocation::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
        }
    }
}

impl std::fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved argument (or input field) on the built schema.
#[derive(Clone, Debug, PartialEq)]
pub struct ArgumentType {
    /// Argument name.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    /// Resolved argument type.
    pub arg_type: Type,
    /// Optional default value.
    pub default_value: Option<InputValue>,
    /// Whether the argument is deprecated.
    pub deprecation_status: DeprecationStatus,
}

/// A resolved field on the built schema.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldType {
    /// Field name.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    /// Resolved return type.
    pub field_type: Type,
    /// Resolved arguments, keyed by name in declaration order.
    pub arguments: IndexMap<ArcStr, ArgumentType>,
    /// Whether the field is deprecated.
    pub deprecation_status: DeprecationStatus,
}

/// A built scalar type.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarType {
    /// Type name.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    /// URL of the specification this scalar follows.
    pub specified_by_url: Option<ArcStr>,
}

/// A built object type.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectType {
    /// Type name.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    /// Field map including fields inherited from implemented interfaces;
    /// own fields win over inherited ones.
    pub fields: IndexMap<ArcStr, FieldType>,
    /// Deduplicated transitive closure of implemented interfaces.
    pub interfaces: Vec<ArcStr>,
}

/// A built interface type.
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceType {
    /// Type name.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    /// Field map including fields inherited from parent interfaces.
    pub fields: IndexMap<ArcStr, FieldType>,
    /// Deduplicated transitive closure of parent interfaces.
    pub interfaces: Vec<ArcStr>,
}

/// A built union type.
#[derive(Clone, Debug, PartialEq)]
pub struct UnionType {
    /// Type name.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    /// Resolved member type names, in declaration order.
    pub members: Vec<ArcStr>,
}

/// A built enum type.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumType {
    /// Type name.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    /// Values in declaration order.
    pub values: Vec<EnumValue>,
}

/// A built input object type.
#[derive(Clone, Debug, PartialEq)]
pub struct InputObjectType {
    /// Type name.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    /// Input field map in declaration order.
    pub fields: IndexMap<ArcStr, ArgumentType>,
    /// Whether the input object is OneOf.
    pub one_of: bool,
}

/// A resolved named type on the built schema.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs, reason = "variant names are self-describing")]
pub enum NamedType {
    Scalar(ScalarType),
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Enum(EnumType),
    InputObject(InputObjectType),
}

impl NamedType {
    /// The type's name.
    pub fn name(&self) -> &ArcStr {
        match self {
            NamedType::Scalar(t) => &t.name,
            NamedType::Object(t) => &t.name,
            NamedType::Interface(t) => &t.name,
            NamedType::Union(t) => &t.name,
            NamedType::Enum(t) => &t.name,
            NamedType::InputObject(t) => &t.name,
        }
    }

    /// The type's kind tag.
    pub fn kind(&self) -> TypeKind {
        match self {
            NamedType::Scalar(_) => TypeKind::Scalar,
            NamedType::Object(_) => TypeKind::Object,
            NamedType::Interface(_) => TypeKind::Interface,
            NamedType::Union(_) => TypeKind::Union,
            NamedType::Enum(_) => TypeKind::Enum,
            NamedType::InputObject(_) => TypeKind::InputObject,
        }
    }

    /// The type's description, if any.
    pub fn description(&self) -> Option<&ArcStr> {
        match self {
            NamedType::Scalar(t) => t.description.as_ref(),
            NamedType::Object(t) => t.description.as_ref(),
            NamedType::Interface(t) => t.description.as_ref(),
            NamedType::Union(t) => t.description.as_ref(),
            NamedType::Enum(t) => t.description.as_ref(),
            NamedType::InputObject(t) => t.description.as_ref(),
        }
    }
}

/// A directive available on the built schema.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveType {
    /// Directive name, without the `@`.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    /// Legal locations, in declaration order.
    pub locations: Vec<DirectiveLocation>,
    /// Whether the directive may repeat per location.
    pub repeatable: bool,
    /// Resolved arguments, keyed by name in declaration order.
    pub arguments: IndexMap<ArcStr, ArgumentType>,
}

impl DirectiveType {
    fn new(
        name: &'static str,
        locations: &[DirectiveLocation],
        arguments: Vec<ArgumentType>,
    ) -> Self {
        DirectiveType {
            name: ArcStr::from(name),
            description: None,
            locations: locations.to_vec(),
            repeatable: false,
            arguments: arguments.into_iter().map(|a| (a.name.clone(), a)).collect(),
        }
    }

    fn arg(name: &'static str, arg_type: Type, default_value: Option<InputValue>) -> ArgumentType {
        ArgumentType {
            name: ArcStr::from(name),
            description: None,
            arg_type,
            default_value,
            deprecation_status: DeprecationStatus::Current,
        }
    }

    fn new_skip() -> Self {
        Self::new(
            "skip",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            vec![Self::arg(
                "if",
                Type::NonNullNamed(arcstr::literal!("Boolean")),
                None,
            )],
        )
    }

    fn new_include() -> Self {
        Self::new(
            "include",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            vec![Self::arg(
                "if",
                Type::NonNullNamed(arcstr::literal!("Boolean")),
                None,
            )],
        )
    }

    fn new_deprecated() -> Self {
        Self::new(
            "deprecated",
            &[
                DirectiveLocation::FieldDefinition,
                DirectiveLocation::ArgumentDefinition,
                DirectiveLocation::InputFieldDefinition,
                DirectiveLocation::EnumValue,
            ],
            vec![Self::arg(
                "reason",
                Type::Named(arcstr::literal!("String")),
                Some(InputValue::String("No longer supported".into())),
            )],
        )
    }

    fn new_specified_by() -> Self {
        Self::new(
            "specifiedBy",
            &[DirectiveLocation::Scalar],
            vec![Self::arg(
                "url",
                Type::NonNullNamed(arcstr::literal!("String")),
                None,
            )],
        )
    }

    fn new_one_of() -> Self {
        Self::new("oneOf", &[DirectiveLocation::InputObject], Vec::new())
    }

    /// The specified (built-in) directive with this name, if any.
    pub fn specified(name: &str) -> Option<DirectiveType> {
        match name {
            "skip" => Some(Self::new_skip()),
            "include" => Some(Self::new_include()),
            "deprecated" => Some(Self::new_deprecated()),
            "specifiedBy" => Some(Self::new_specified_by()),
            "oneOf" => Some(Self::new_one_of()),
            _ => None,
        }
    }

    /// Whether the name belongs to a specified directive.
    pub fn is_specified(name: &str) -> bool {
        matches!(name, "skip" | "include" | "deprecated" | "specifiedBy" | "oneOf")
    }

    /// All specified directives, in canonical order.
    pub fn specified_directives() -> Vec<DirectiveType> {
        vec![
            Self::new_skip(),
            Self::new_include(),
            Self::new_deprecated(),
            Self::new_specified_by(),
            Self::new_one_of(),
        ]
    }
}

/// The built, read-only schema.
///
/// Produced once per state by [`SchemaState::build`]; the type map preserves
/// registration order, which is also the SDL emission order.
///
/// [`SchemaState::build`]: crate::schema::state::SchemaState::build
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaType {
    pub(crate) description: Option<ArcStr>,
    pub(crate) types: IndexMap<ArcStr, NamedType>,
    pub(crate) directives: IndexMap<ArcStr, DirectiveType>,
    pub(crate) query_type_name: ArcStr,
    pub(crate) mutation_type_name: Option<ArcStr>,
    pub(crate) subscription_type_name: Option<ArcStr>,
}

impl SchemaType {
    /// The schema description, if any.
    pub fn description(&self) -> Option<&ArcStr> {
        self.description.as_ref()
    }

    /// Looks up a type by name.
    pub fn type_by_name(&self, name: &str) -> Option<&NamedType> {
        self.types.get(name)
    }

    /// All types, in registration order.
    pub fn type_list(&self) -> impl Iterator<Item = &NamedType> {
        self.types.values()
    }

    /// The query root type.
    pub fn query_type(&self) -> &NamedType {
        self.types
            .get(&self.query_type_name)
            .expect("Query type does not exist in schema")
    }

    /// The query root type name.
    pub fn query_type_name(&self) -> &ArcStr {
        &self.query_type_name
    }

    /// The mutation root type, if one is configured.
    pub fn mutation_type(&self) -> Option<&NamedType> {
        self.mutation_type_name.as_ref().map(|name| {
            self.types
                .get(name)
                .expect("Mutation type does not exist in schema")
        })
    }

    /// The mutation root type name, if one is configured.
    pub fn mutation_type_name(&self) -> Option<&ArcStr> {
        self.mutation_type_name.as_ref()
    }

    /// The subscription root type, if one is configured.
    pub fn subscription_type(&self) -> Option<&NamedType> {
        self.subscription_type_name.as_ref().map(|name| {
            self.types
                .get(name)
                .expect("Subscription type does not exist in schema")
        })
    }

    /// The subscription root type name, if one is configured.
    pub fn subscription_type_name(&self) -> Option<&ArcStr> {
        self.subscription_type_name.as_ref()
    }

    /// Looks up a directive by name.
    pub fn directive_by_name(&self, name: &str) -> Option<&DirectiveType> {
        self.directives.get(name)
    }

    /// All directives, specified ones first, then declared ones.
    pub fn directive_list(&self) -> impl Iterator<Item = &DirectiveType> {
        self.directives.values()
    }

    /// Renders the schema as SDL text.
    pub fn as_schema_language(&self) -> String {
        crate::schema::translate::sdl::render_sdl(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deprecated_locations_are_declared_in_spec_order() {
        let deprecated = DirectiveType::specified("deprecated").unwrap();
        assert_eq!(
            deprecated.locations,
            [
                DirectiveLocation::FieldDefinition,
                DirectiveLocation::ArgumentDefinition,
                DirectiveLocation::InputFieldDefinition,
                DirectiveLocation::EnumValue,
            ],
        );
        assert!(!deprecated.repeatable);
    }

    #[test]
    fn specified_names_are_recognized() {
        for d in DirectiveType::specified_directives() {
            assert!(DirectiveType::is_specified(&d.name));
        }
        assert!(!DirectiveType::is_specified("auth"));
    }

    #[test]
    fn location_spelling() {
        assert_eq!(DirectiveLocation::InputFieldDefinition.as_str(), "INPUT_FIELD_DEFINITION");
        assert_eq!(DirectiveLocation::Object.to_string(), "OBJECT");
    }
}
