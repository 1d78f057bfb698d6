//! SDL text emission.
//!
//! Definitions are rendered in registration order, which the type map
//! preserves. Specified directives and the five specified scalars are never
//! printed; a `schema { … }` block appears only when the roots differ from
//! the conventional names or the schema carries a description.

use itertools::Itertools as _;

use crate::schema::{
    meta::DeprecationStatus,
    model::{
        ArgumentType, DirectiveType, EnumType, FieldType, InputObjectType, InterfaceType,
        NamedType, ObjectType, ScalarType, SchemaType, UnionType,
    },
    translate::SchemaTranslator,
};

const INDENT: &str = "  ";

/// Renders a built schema as SDL.
pub struct SdlTranslator;

impl SchemaTranslator<String> for SdlTranslator {
    fn translate_schema(schema: &SchemaType) -> String {
        render_sdl(schema)
    }
}

/// Renders the schema as SDL text.
pub fn render_sdl(schema: &SchemaType) -> String {
    let mut definitions: Vec<String> = schema.type_list().map(render_type).collect();
    definitions.extend(
        schema
            .directive_list()
            .filter(|d| !DirectiveType::is_specified(&d.name))
            .map(render_directive),
    );
    if needs_schema_block(schema) {
        definitions.push(render_schema_block(schema));
    }
    let mut out = definitions.join("\n\n");
    out.push('\n');
    out
}

fn render_type(t: &NamedType) -> String {
    match t {
        NamedType::Scalar(s) => render_scalar(s),
        NamedType::Object(o) => render_object(o),
        NamedType::Interface(i) => render_interface(i),
        NamedType::Union(u) => render_union(u),
        NamedType::Enum(e) => render_enum(e),
        NamedType::InputObject(i) => render_input_object(i),
    }
}

fn render_scalar(scalar: &ScalarType) -> String {
    let mut out = String::new();
    push_description(&mut out, scalar.description.as_deref(), "");
    out.push_str("scalar ");
    out.push_str(&scalar.name);
    if let Some(url) = &scalar.specified_by_url {
        out.push_str(" @specifiedBy(url: ");
        push_string_literal(&mut out, url);
        out.push(')');
    }
    out
}

fn render_object(object: &ObjectType) -> String {
    let mut out = String::new();
    push_description(&mut out, object.description.as_deref(), "");
    out.push_str("type ");
    out.push_str(&object.name);
    push_implements(&mut out, &object.interfaces);
    out.push_str(" {\n");
    push_fields(&mut out, object.fields.values());
    out.push('}');
    out
}

fn render_interface(interface: &InterfaceType) -> String {
    let mut out = String::new();
    push_description(&mut out, interface.description.as_deref(), "");
    out.push_str("interface ");
    out.push_str(&interface.name);
    push_implements(&mut out, &interface.interfaces);
    out.push_str(" {\n");
    push_fields(&mut out, interface.fields.values());
    out.push('}');
    out
}

fn render_union(union: &UnionType) -> String {
    let mut out = String::new();
    push_description(&mut out, union.description.as_deref(), "");
    out.push_str("union ");
    out.push_str(&union.name);
    out.push_str(" = ");
    out.push_str(&union.members.iter().join(" | "));
    out
}

fn render_enum(enum_type: &EnumType) -> String {
    let mut out = String::new();
    push_description(&mut out, enum_type.description.as_deref(), "");
    out.push_str("enum ");
    out.push_str(&enum_type.name);
    out.push_str(" {\n");
    for value in &enum_type.values {
        push_description(&mut out, value.description.as_deref(), INDENT);
        out.push_str(INDENT);
        out.push_str(&value.name);
        push_deprecated(&mut out, &value.deprecation_status);
        out.push('\n');
    }
    out.push('}');
    out
}

fn render_input_object(input: &InputObjectType) -> String {
    let mut out = String::new();
    push_description(&mut out, input.description.as_deref(), "");
    out.push_str("input ");
    out.push_str(&input.name);
    if input.one_of {
        out.push_str(" @oneOf");
    }
    out.push_str(" {\n");
    for field in input.fields.values() {
        push_description(&mut out, field.description.as_deref(), INDENT);
        out.push_str(INDENT);
        push_argument(&mut out, field);
        push_deprecated(&mut out, &field.deprecation_status);
        out.push('\n');
    }
    out.push('}');
    out
}

fn render_directive(directive: &DirectiveType) -> String {
    let mut out = String::new();
    push_description(&mut out, directive.description.as_deref(), "");
    out.push_str("directive @");
    out.push_str(&directive.name);
    push_arguments(&mut out, directive.arguments.values());
    if directive.repeatable {
        out.push_str(" repeatable");
    }
    out.push_str(" on ");
    out.push_str(&directive.locations.iter().map(|l| l.as_str()).join(" | "));
    out
}

fn needs_schema_block(schema: &SchemaType) -> bool {
    schema.description().is_some()
        || schema.query_type_name() != "Query"
        || schema
            .mutation_type_name()
            .is_some_and(|name| name != "Mutation")
        || schema
            .subscription_type_name()
            .is_some_and(|name| name != "Subscription")
}

fn render_schema_block(schema: &SchemaType) -> String {
    let mut out = String::new();
    push_description(&mut out, schema.description().map(|d| d.as_str()), "");
    out.push_str("schema {\n");
    out.push_str(INDENT);
    out.push_str("query: ");
    out.push_str(schema.query_type_name());
    out.push('\n');
    if let Some(mutation) = schema.mutation_type_name() {
        out.push_str(INDENT);
        out.push_str("mutation: ");
        out.push_str(mutation);
        out.push('\n');
    }
    if let Some(subscription) = schema.subscription_type_name() {
        out.push_str(INDENT);
        out.push_str("subscription: ");
        out.push_str(subscription);
        out.push('\n');
    }
    out.push('}');
    out
}

fn push_implements(out: &mut String, interfaces: &[arcstr::ArcStr]) {
    if interfaces.is_empty() {
        return;
    }
    out.push_str(" implements ");
    out.push_str(&interfaces.iter().join(" & "));
}

fn push_fields<'a>(out: &mut String, fields: impl Iterator<Item = &'a FieldType>) {
    for field in fields {
        push_description(out, field.description.as_deref(), INDENT);
        out.push_str(INDENT);
        out.push_str(&field.name);
        push_arguments(out, field.arguments.values());
        out.push_str(": ");
        out.push_str(&field.field_type.to_string());
        push_deprecated(out, &field.deprecation_status);
        out.push('\n');
    }
}

fn push_arguments<'a>(out: &mut String, arguments: impl Iterator<Item = &'a ArgumentType>) {
    let arguments: Vec<_> = arguments.collect();
    if arguments.is_empty() {
        return;
    }
    out.push('(');
    for (i, argument) in arguments.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        push_argument(out, argument);
    }
    out.push(')');
}

fn push_argument(out: &mut String, argument: &ArgumentType) {
    out.push_str(&argument.name);
    out.push_str(": ");
    out.push_str(&argument.arg_type.to_string());
    if let Some(default) = &argument.default_value {
        out.push_str(" = ");
        out.push_str(&default.to_string());
    }
}

fn push_deprecated(out: &mut String, status: &DeprecationStatus) {
    match status {
        DeprecationStatus::Current => {}
        DeprecationStatus::Deprecated(None) => out.push_str(" @deprecated"),
        DeprecationStatus::Deprecated(Some(reason)) => {
            out.push_str(" @deprecated(reason: ");
            push_string_literal(out, reason);
            out.push(')');
        }
    }
}

fn push_description(out: &mut String, description: Option<&str>, indent: &str) {
    let Some(description) = description else {
        return;
    };
    if description.contains('\n') {
        out.push_str(indent);
        out.push_str("\"\"\"\n");
        for line in description.lines() {
            out.push_str(indent);
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(indent);
        out.push_str("\"\"\"\n");
    } else {
        out.push_str(indent);
        out.push_str("\"\"\"");
        out.push_str(description);
        out.push_str("\"\"\"\n");
    }
}

fn push_string_literal(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        ast::{InputValue, TypeRef},
        schema::{model::DirectiveLocation, state::SchemaState},
    };

    #[test]
    fn renders_a_representative_schema() {
        let mut state = SchemaState::new();

        let scalar = state
            .scalar_meta("DateTime")
            .unwrap()
            .specified_by_url("https://scalars.example/date-time");
        state.register_type(scalar).unwrap();

        let mut node = state.interface_meta("Node").unwrap();
        node.add_field(
            state
                .field("id", TypeRef::non_null(TypeRef::named("ID")).unwrap())
                .unwrap(),
        )
        .unwrap();
        state.register_type(node).unwrap();

        let mut user = state
            .object_meta("User")
            .unwrap()
            .description("A registered account.")
            .interface("Node");
        let mut posts = state
            .field(
                "posts",
                TypeRef::list(TypeRef::non_null(TypeRef::named("String")).unwrap()),
            )
            .unwrap();
        posts
            .add_argument(
                state
                    .argument("first", "Int")
                    .unwrap()
                    .default_value(InputValue::Int(10)),
            )
            .unwrap();
        user.add_field(posts).unwrap();
        user.add_field(
            state
                .field("nickname", "String")
                .unwrap()
                .deprecated(Some("use displayName")),
        )
        .unwrap();
        state.register_type(user).unwrap();

        let mut color = state.enum_meta("Color").unwrap();
        color.add_value(state.enum_value("red").unwrap()).unwrap();
        color
            .add_value(state.enum_value("lime").unwrap().deprecated(None))
            .unwrap();
        state.register_type(color).unwrap();

        let mut lookup = state.input_object_meta("Lookup").unwrap().one_of();
        lookup
            .add_input_field(state.input_field("byId", "ID").unwrap())
            .unwrap();
        lookup
            .add_input_field(state.input_field("byName", "String").unwrap())
            .unwrap();
        state.register_type(lookup).unwrap();

        let mut query = state.object_meta("Query").unwrap();
        query
            .add_field(
                state
                    .field("user", TypeRef::non_null(TypeRef::named("User")).unwrap())
                    .unwrap(),
            )
            .unwrap();
        state.register_type(query).unwrap();

        let mut auth = state
            .directive_meta(
                "auth",
                &[
                    DirectiveLocation::FieldDefinition,
                    DirectiveLocation::Object,
                ],
            )
            .unwrap()
            .repeatable();
        auth.add_argument(
            state
                .argument("role", TypeRef::non_null(TypeRef::named("String")).unwrap())
                .unwrap(),
        )
        .unwrap();
        state.register_directive(auth).unwrap();

        let schema = state.build().unwrap();
        assert_eq!(
            schema.as_schema_language(),
            r#"scalar DateTime @specifiedBy(url: "https://scalars.example/date-time")

interface Node {
  id: ID!
}

"""A registered account."""
type User implements Node {
  id: ID!
  posts(first: Int = 10): [String!]
  nickname: String @deprecated(reason: "use displayName")
}

enum Color {
  RED
  LIME @deprecated
}

input Lookup @oneOf {
  byId: ID
  byName: String
}

type Query {
  user: User!
}

directive @auth(role: String!) repeatable on FIELD_DEFINITION | OBJECT
"#,
        );
    }

    #[test]
    fn schema_block_appears_for_non_default_roots() {
        let mut state = SchemaState::new();
        let mut root = state.object_meta("RootQuery").unwrap();
        root.add_field(state.field("ok", "Boolean").unwrap()).unwrap();
        state.register_type(root).unwrap();

        let mut mutation = state.object_meta("RootMutation").unwrap();
        mutation
            .add_field(state.field("noop", "Boolean").unwrap())
            .unwrap();
        state.register_type(mutation).unwrap();

        state.set_query_root("RootQuery");
        state.set_mutation_root("RootMutation");
        let schema = state.build().unwrap();
        let sdl = schema.as_schema_language();
        assert!(
            sdl.ends_with("schema {\n  query: RootQuery\n  mutation: RootMutation\n}\n"),
            "{sdl}",
        );
    }

    #[test]
    fn default_roots_need_no_schema_block() {
        let mut state = SchemaState::new();
        let mut query = state.object_meta("Query").unwrap();
        query.add_field(state.field("ok", "Boolean").unwrap()).unwrap();
        state.register_type(query).unwrap();
        let sdl = state.build().unwrap().as_schema_language();
        assert!(!sdl.contains("schema {"), "{sdl}");
    }
}
