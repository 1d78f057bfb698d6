//! The build pass: turning an accumulated [`SchemaState`] into a validated
//! [`SchemaType`].
//!
//! The pass runs once, after the render that populated the state has
//! completed. Every definition is resolved eagerly, in registration order;
//! resolution is memoized per name, and since resolved types reference each
//! other by name, definition cycles never recurse.

use arcstr::ArcStr;
use fnv::FnvHashSet;
use indexmap::IndexMap;
use tracing::debug;

use crate::{
    ast::{OperationType, TypeRef},
    schema::{
        SchemaError,
        meta::{Argument, Field, InputObjectMeta, InterfaceMeta, MetaType, ObjectMeta, UnionMeta},
        model::{
            ArgumentType, DirectiveType, EnumType, FieldType, InputObjectType, InputPosition,
            InterfaceType, NamedType, ObjectType, ScalarType, SchemaType, UnionType,
        },
        state::SchemaState,
    },
    validation::rules::type_positions,
};

struct BuildContext<'a> {
    state: &'a SchemaState,
    types: IndexMap<ArcStr, NamedType>,
}

impl SchemaState {
    /// Builds the schema: resolves every definition, assembles the root
    /// operation types and enforces the structural rules.
    ///
    /// The first failure aborts the build; no partial schema is returned.
    pub fn build(&self) -> Result<SchemaType, SchemaError> {
        debug!(
            types = self.types.len(),
            directives = self.directives.len(),
            "building schema"
        );

        let mut ctx = BuildContext {
            state: self,
            types: IndexMap::new(),
        };
        let names: Vec<ArcStr> = self.types.keys().cloned().collect();
        for name in &names {
            ctx.resolve_named_type(name)?;
        }

        let query_type_name = match &self.roots.query {
            Some(root) => root_name(self, root)?,
            None => match self.types.get_key_value("Query") {
                Some((name, _)) => name.clone(),
                None => return Err(SchemaError::MissingQueryRoot),
            },
        };
        ensure_object_root(&ctx.types, &query_type_name, OperationType::Query)?;

        let mutation_type_name = match &self.roots.mutation {
            Some(root) => {
                let name = root_name(self, root)?;
                ensure_object_root(&ctx.types, &name, OperationType::Mutation)?;
                Some(name)
            }
            None => None,
        };
        let subscription_type_name = match &self.roots.subscription {
            Some(root) => {
                let name = root_name(self, root)?;
                ensure_object_root(&ctx.types, &name, OperationType::Subscription)?;
                Some(name)
            }
            None => None,
        };

        let mut distinct = FnvHashSet::default();
        for name in [Some(&query_type_name), mutation_type_name.as_ref(), subscription_type_name.as_ref()]
            .into_iter()
            .flatten()
        {
            if !distinct.insert(name.clone()) {
                return Err(SchemaError::IndistinctRootTypes);
            }
        }

        let mut directives = IndexMap::new();
        if self.include_specified_directives {
            for directive in DirectiveType::specified_directives() {
                directives.insert(directive.name.clone(), directive);
            }
        }
        for meta in self.directives.values() {
            let mut arguments = IndexMap::new();
            for arg in meta.arguments() {
                let arg = resolve_argument(self, arg, InputPosition::Argument)?;
                arguments.insert(arg.name.clone(), arg);
            }
            directives.insert(
                meta.name.clone(),
                DirectiveType {
                    name: meta.name.clone(),
                    description: meta.description.clone(),
                    locations: meta.locations.clone(),
                    repeatable: meta.repeatable,
                    arguments,
                },
            );
        }

        Ok(SchemaType {
            description: self.description.clone(),
            types: ctx.types,
            directives,
            query_type_name,
            mutation_type_name,
            subscription_type_name,
        })
    }
}

impl BuildContext<'_> {
    fn resolve_named_type(&mut self, name: &ArcStr) -> Result<(), SchemaError> {
        if self.types.contains_key(name) {
            return Ok(());
        }
        let meta = self
            .state
            .type_def(name)
            .ok_or_else(|| SchemaError::UnknownType(name.clone()))?;

        let built = match meta {
            MetaType::Scalar(scalar) => NamedType::Scalar(ScalarType {
                name: scalar.name.clone(),
                description: scalar.description.clone(),
                specified_by_url: scalar.specified_by_url.clone(),
            }),
            MetaType::Object(object) => NamedType::Object(self.resolve_object(object)?),
            MetaType::Interface(interface) => {
                NamedType::Interface(self.resolve_interface(interface)?)
            }
            MetaType::Union(union) => NamedType::Union(self.resolve_union(union)?),
            MetaType::Enum(enum_meta) => {
                if enum_meta.values().is_empty() {
                    return Err(SchemaError::EnumWithoutValues(enum_meta.name.clone()));
                }
                NamedType::Enum(EnumType {
                    name: enum_meta.name.clone(),
                    description: enum_meta.description.clone(),
                    values: enum_meta.values().to_vec(),
                })
            }
            MetaType::InputObject(input) => NamedType::InputObject(self.resolve_input(input)?),
        };
        self.types.insert(name.clone(), built);
        Ok(())
    }

    fn resolve_object(&self, object: &ObjectMeta) -> Result<ObjectType, SchemaError> {
        let interfaces = interface_closure(self.state, object.interfaces())?;
        let fields = build_field_map(self.state, &object.name, object.fields(), &interfaces)?;
        Ok(ObjectType {
            name: object.name.clone(),
            description: object.description.clone(),
            fields,
            interfaces,
        })
    }

    fn resolve_interface(&self, interface: &InterfaceMeta) -> Result<InterfaceType, SchemaError> {
        let interfaces = interface_closure(self.state, interface.interfaces())?;
        let fields = build_field_map(self.state, &interface.name, interface.fields(), &interfaces)?;
        Ok(InterfaceType {
            name: interface.name.clone(),
            description: interface.description.clone(),
            fields,
            interfaces,
        })
    }

    fn resolve_union(&self, union: &UnionMeta) -> Result<UnionType, SchemaError> {
        if union.members().is_empty() {
            return Err(SchemaError::UnionWithoutMembers(union.name.clone()));
        }
        let mut members = Vec::with_capacity(union.members().len());
        for member in union.members() {
            let resolved = self.state.normalize_type_ref(member)?;
            let member_name = resolved.innermost_arcstr().clone();
            let kind = self.state.type_kind(&member_name).or(match member {
                TypeRef::Inline(meta) => Some(meta.kind()),
                _ => None,
            });
            if let Some(kind) = kind {
                type_positions::assert_union_member(&union.name, &member_name, kind)?;
            }
            members.push(member_name);
        }
        Ok(UnionType {
            name: union.name.clone(),
            description: union.description.clone(),
            members,
        })
    }

    fn resolve_input(&self, input: &InputObjectMeta) -> Result<InputObjectType, SchemaError> {
        let mut fields = IndexMap::new();
        for field in input.input_fields() {
            let field = resolve_argument(self.state, field, InputPosition::InputField)?;
            fields.insert(field.name.clone(), field);
        }
        Ok(InputObjectType {
            name: input.name.clone(),
            description: input.description.clone(),
            fields,
            one_of: input.one_of,
        })
    }
}

/// Collects the deduplicated transitive closure of declared interfaces, in
/// pre-order: each declared interface, then its parents. A diamond is
/// visited once.
fn interface_closure(
    state: &SchemaState,
    declared: &[TypeRef],
) -> Result<Vec<ArcStr>, SchemaError> {
    let mut closure = Vec::new();
    let mut visited = FnvHashSet::default();
    for reference in declared {
        collect_interfaces(state, reference, &mut visited, &mut closure)?;
    }
    Ok(closure)
}

fn collect_interfaces(
    state: &SchemaState,
    reference: &TypeRef,
    visited: &mut FnvHashSet<ArcStr>,
    closure: &mut Vec<ArcStr>,
) -> Result<(), SchemaError> {
    let name = state.normalize_type_ref(reference)?.innermost_arcstr().clone();
    if !visited.insert(name.clone()) {
        return Ok(());
    }
    closure.push(name.clone());
    if let Some(MetaType::Interface(interface)) = state.type_def(&name) {
        for parent in interface.interfaces() {
            collect_interfaces(state, parent, visited, closure)?;
        }
    }
    Ok(())
}

/// Builds the field map: fields inherited from the interface closure first
/// (earlier interfaces win among themselves), then the type's own fields,
/// which always win.
fn build_field_map(
    state: &SchemaState,
    type_name: &ArcStr,
    own_fields: &[Field],
    interfaces: &[ArcStr],
) -> Result<IndexMap<ArcStr, FieldType>, SchemaError> {
    let mut fields = IndexMap::new();
    for interface_name in interfaces {
        if let Some(MetaType::Interface(interface)) = state.type_def(interface_name) {
            for field in interface.fields() {
                if !fields.contains_key(&field.name) {
                    fields.insert(field.name.clone(), resolve_field(state, field)?);
                }
            }
        }
    }
    for field in own_fields {
        fields.insert(field.name.clone(), resolve_field(state, field)?);
    }
    if fields.is_empty() {
        return Err(SchemaError::TypeWithoutFields(type_name.clone()));
    }
    Ok(fields)
}

fn resolve_field(state: &SchemaState, field: &Field) -> Result<FieldType, SchemaError> {
    let field_type = state.normalize_type_ref(&field.field_type)?;
    if let Some(kind) = state.type_kind(field_type.innermost_name()) {
        type_positions::assert_output_position(&field.name, field_type.innermost_arcstr(), kind)?;
    }
    let mut arguments = IndexMap::new();
    for arg in field.arguments() {
        let arg = resolve_argument(state, arg, InputPosition::Argument)?;
        arguments.insert(arg.name.clone(), arg);
    }
    Ok(FieldType {
        name: field.name.clone(),
        description: field.description.clone(),
        field_type,
        arguments,
        deprecation_status: field.deprecation_status.clone(),
    })
}

fn resolve_argument(
    state: &SchemaState,
    argument: &Argument,
    position: InputPosition,
) -> Result<ArgumentType, SchemaError> {
    let arg_type = state.normalize_type_ref(&argument.arg_type)?;
    if let Some(kind) = state.type_kind(arg_type.innermost_name()) {
        type_positions::assert_input_position(
            position,
            &argument.name,
            arg_type.innermost_arcstr(),
            kind,
        )?;
    }
    Ok(ArgumentType {
        name: argument.name.clone(),
        description: argument.description.clone(),
        arg_type,
        default_value: argument.default_value.clone(),
        deprecation_status: argument.deprecation_status.clone(),
    })
}

fn root_name(state: &SchemaState, root: &TypeRef) -> Result<ArcStr, SchemaError> {
    Ok(state.normalize_type_ref(root)?.innermost_arcstr().clone())
}

fn ensure_object_root(
    types: &IndexMap<ArcStr, NamedType>,
    name: &ArcStr,
    operation: OperationType,
) -> Result<(), SchemaError> {
    match types.get(name) {
        Some(NamedType::Object(_)) => Ok(()),
        _ => Err(SchemaError::NonObjectRoot(operation)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_only(state: &mut SchemaState) {
        let mut query = state.object_meta("Query").unwrap();
        query
            .add_field(state.field("ping", "Boolean").unwrap())
            .unwrap();
        state.register_type(query).unwrap();
    }

    #[test]
    fn missing_query_root_fails() {
        let state = SchemaState::new();
        assert_eq!(
            state.build().unwrap_err().to_string(),
            "A query root type is required.",
        );
    }

    #[test]
    fn query_defaults_to_the_literal_name() {
        let mut state = SchemaState::new();
        query_only(&mut state);
        let schema = state.build().unwrap();
        assert_eq!(schema.query_type_name(), "Query");
        assert!(schema.mutation_type().is_none());
    }

    #[test]
    fn non_object_roots_are_rejected() {
        let mut state = SchemaState::new();
        let mut en = state.enum_meta("Status").unwrap();
        en.add_value(state.enum_value("OK").unwrap()).unwrap();
        state.register_type(en).unwrap();
        state.set_query_root("Status");
        assert_eq!(
            state.build().unwrap_err().to_string(),
            "Query type must be an object type.",
        );
    }

    #[test]
    fn root_types_must_be_distinct() {
        let mut state = SchemaState::new();
        query_only(&mut state);
        state.set_mutation_root("Query");
        assert_eq!(
            state.build().unwrap_err().to_string(),
            "Root types must be distinct.",
        );
    }

    #[test]
    fn empty_enum_fails_at_build_time_only() {
        let mut state = SchemaState::new();
        query_only(&mut state);
        // Declaration and registration of an empty enum succeed.
        let en = state.enum_meta("X").unwrap();
        state.register_type(en).unwrap();
        assert_eq!(
            state.build().unwrap_err().to_string(),
            "Enum \"X\" must have at least one value.",
        );
    }

    #[test]
    fn empty_union_fails_at_build_time() {
        let mut state = SchemaState::new();
        query_only(&mut state);
        let union = state.union_meta("Anything").unwrap();
        state.register_type(union).unwrap();
        assert_eq!(
            state.build().unwrap_err().to_string(),
            "Union \"Anything\" must have at least one member type.",
        );
    }

    #[test]
    fn union_members_must_be_object_types() {
        let mut state = SchemaState::new();
        query_only(&mut state);

        let mut iface = state.interface_meta("InterfaceX").unwrap();
        iface
            .add_field(state.field("id", "ID").unwrap())
            .unwrap();
        state.register_type(iface).unwrap();

        let mut union = state.union_meta("Result").unwrap();
        union.add_member(&state, "InterfaceX").unwrap();
        state.register_type(union).unwrap();

        let message = state.build().unwrap_err().to_string();
        assert!(message.contains("cannot include \"InterfaceX\""), "{message}");
        assert!(message.contains("union members must be object types"), "{message}");
    }

    #[test]
    fn diamond_inheritance_resolves_each_interface_once() {
        let mut state = SchemaState::new();
        query_only(&mut state);

        let mut d = state.interface_meta("D").unwrap();
        d.add_field(state.field("id", "ID").unwrap()).unwrap();
        state.register_type(d).unwrap();

        for name in ["B", "C"] {
            let mut i = state.interface_meta(name).unwrap().interface("D");
            i.add_field(state.field("id", "ID").unwrap()).unwrap();
            state.register_type(i).unwrap();
        }

        let mut a = state
            .object_meta("A")
            .unwrap()
            .interface("B")
            .interface("C");
        a.add_field(state.field("id", "ID").unwrap()).unwrap();
        state.register_type(a).unwrap();

        let schema = state.build().unwrap();
        match schema.type_by_name("A").unwrap() {
            NamedType::Object(a) => {
                assert_eq!(a.interfaces, ["B", "D", "C"]);
                assert_eq!(a.interfaces.iter().filter(|i| *i == "D").count(), 1);
            }
            other => panic!("unexpected type: {other:?}"),
        }
    }

    #[test]
    fn interface_fields_are_inherited_and_own_fields_win() {
        let mut state = SchemaState::new();
        query_only(&mut state);

        let mut node = state.interface_meta("Node").unwrap();
        node.add_field(
            state
                .field("id", TypeRef::non_null(TypeRef::named("ID")).unwrap())
                .unwrap()
                .description("Inherited doc"),
        )
        .unwrap();
        state.register_type(node).unwrap();

        let mut user = state.object_meta("User").unwrap().interface("Node");
        user.add_field(state.field("name", "String").unwrap()).unwrap();
        state.register_type(user).unwrap();

        let schema = state.build().unwrap();
        match schema.type_by_name("User").unwrap() {
            NamedType::Object(user) => {
                // Inherited field comes first, then own fields.
                let names: Vec<_> = user.fields.keys().map(ToString::to_string).collect();
                assert_eq!(names, ["id", "name"]);
                assert_eq!(user.fields["id"].field_type.to_string(), "ID!");
            }
            other => panic!("unexpected type: {other:?}"),
        }
    }

    #[test]
    fn object_with_no_fields_anywhere_fails() {
        let mut state = SchemaState::new();
        query_only(&mut state);
        let empty = state.object_meta("Empty").unwrap();
        state.register_type(empty).unwrap();
        assert_eq!(
            state.build().unwrap_err().to_string(),
            "Type \"Empty\" must define fields.",
        );
    }

    #[test]
    fn input_object_in_output_position_fails() {
        let mut state = SchemaState::new();
        let mut filter = state.input_object_meta("Filter").unwrap();
        filter
            .add_input_field(state.input_field("term", "String").unwrap())
            .unwrap();
        state.register_type(filter).unwrap();

        let mut query = state.object_meta("Query").unwrap();
        query
            .add_field(state.field("search", "Filter").unwrap())
            .unwrap();
        state.register_type(query).unwrap();

        assert_eq!(
            state.build().unwrap_err().to_string(),
            "Field \"search\" on type cannot use input object type \"Filter\".",
        );
    }

    #[test]
    fn object_in_input_position_fails() {
        let mut state = SchemaState::new();
        let mut user = state.object_meta("User").unwrap();
        user.add_field(state.field("name", "String").unwrap()).unwrap();
        state.register_type(user).unwrap();

        let mut query = state.object_meta("Query").unwrap();
        let mut field = state.field("find", "User").unwrap();
        field
            .add_argument(state.argument("like", "User").unwrap())
            .unwrap();
        query.add_field(field).unwrap();
        state.register_type(query).unwrap();

        assert_eq!(
            state.build().unwrap_err().to_string(),
            "Argument \"like\" cannot use object type \"User\".",
        );
    }

    #[test]
    fn unknown_field_type_fails() {
        let mut state = SchemaState::new();
        let mut query = state.object_meta("Query").unwrap();
        query
            .add_field(state.field("ghost", "Phantom").unwrap())
            .unwrap();
        state.register_type(query).unwrap();
        assert_eq!(
            state.build().unwrap_err().to_string(),
            "Unknown GraphQL type \"Phantom\"",
        );
    }

    #[test]
    fn forward_refkeys_resolve_at_build_time() {
        let mut state = SchemaState::new();
        let post_key = crate::ast::Refkey::new();

        // Reference the refkey before the type it names exists.
        let mut query = state.object_meta("Query").unwrap();
        query
            .add_field(state.field("latest", post_key).unwrap())
            .unwrap();
        state.register_type(query).unwrap();

        let mut post = state.object_meta("Post").unwrap().refkey(post_key);
        post.add_field(state.field("title", "String").unwrap()).unwrap();
        state.register_type(post).unwrap();

        let schema = state.build().unwrap();
        match schema.type_by_name("Query").unwrap() {
            NamedType::Object(query) => {
                assert_eq!(query.fields["latest"].field_type.to_string(), "Post");
            }
            other => panic!("unexpected type: {other:?}"),
        }
    }
}
