//! Placement rules for resolved named types: which kinds may occupy input
//! and output positions, union memberships, fragment type conditions, and
//! variable defaults.
//!
//! These are pure predicates. The build pass calls them as it resolves
//! fields, arguments, input fields and union members; variables and
//! fragments have no build surface and call them directly.

use crate::{
    ast::{InputValue, Type},
    schema::{
        SchemaError,
        model::{InputPosition, TypeKind},
        state::SchemaState,
    },
};

/// A field return type may be anything except an input object.
pub fn assert_output_position(
    field: &str,
    type_name: &str,
    kind: TypeKind,
) -> Result<(), SchemaError> {
    if kind == TypeKind::InputObject {
        return Err(SchemaError::InputTypeInOutputPosition {
            field: field.into(),
            type_name: type_name.into(),
        });
    }
    Ok(())
}

/// Arguments, input fields and variables may only use scalar, enum and
/// input object types.
pub fn assert_input_position(
    position: InputPosition,
    name: &str,
    type_name: &str,
    kind: TypeKind,
) -> Result<(), SchemaError> {
    if matches!(kind, TypeKind::Object | TypeKind::Interface | TypeKind::Union) {
        return Err(SchemaError::OutputTypeInInputPosition {
            position,
            name: name.into(),
            kind,
            type_name: type_name.into(),
        });
    }
    Ok(())
}

/// Union members must be object types.
pub fn assert_union_member(
    union_name: &str,
    member: &str,
    kind: TypeKind,
) -> Result<(), SchemaError> {
    if kind != TypeKind::Object {
        return Err(SchemaError::NonObjectUnionMember {
            union_name: union_name.into(),
            member: member.into(),
            kind,
        });
    }
    Ok(())
}

/// Fragment and inline-fragment type conditions must name composite types.
///
/// A condition that resolves to no local definition bypasses the check
/// entirely: it is assumed to name an external type.
pub fn assert_type_condition(
    state: &SchemaState,
    fragment: &str,
    condition: &str,
) -> Result<(), SchemaError> {
    match state.type_kind(condition) {
        Some(kind @ (TypeKind::Scalar | TypeKind::Enum | TypeKind::InputObject)) => {
            Err(SchemaError::InvalidTypeCondition {
                fragment: fragment.into(),
                type_name: condition.into(),
                kind,
            })
        }
        _ => Ok(()),
    }
}

/// A variable's type must be usable in input positions.
pub fn assert_variable_type(
    variable: &str,
    type_name: &str,
    kind: TypeKind,
) -> Result<(), SchemaError> {
    assert_input_position(InputPosition::Variable, variable, type_name, kind)
}

/// A non-null variable cannot carry an explicit `null` default.
pub fn assert_variable_default(
    variable: &str,
    var_type: &Type,
    default: Option<&InputValue>,
) -> Result<(), SchemaError> {
    if var_type.is_non_null() && default.is_some_and(InputValue::is_null) {
        return Err(SchemaError::NullDefaultOnNonNullVariable(variable.into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcstr::literal;

    fn state_with_kinds() -> SchemaState {
        let mut state = SchemaState::new();
        let mut obj = state.object_meta("Dog").unwrap();
        obj.add_field(state.field("name", "String").unwrap()).unwrap();
        state.register_type(obj).unwrap();

        let mut en = state.enum_meta("Color").unwrap();
        en.add_value(state.enum_value("RED").unwrap()).unwrap();
        state.register_type(en).unwrap();

        let mut input = state.input_object_meta("Filter").unwrap();
        input
            .add_input_field(state.input_field("term", "String").unwrap())
            .unwrap();
        state.register_type(input).unwrap();
        state
    }

    #[test]
    fn output_positions_reject_input_objects_only() {
        assert!(assert_output_position("pet", "Dog", TypeKind::Object).is_ok());
        assert!(assert_output_position("color", "Color", TypeKind::Enum).is_ok());
        assert_eq!(
            assert_output_position("filter", "Filter", TypeKind::InputObject)
                .unwrap_err()
                .to_string(),
            "Field \"filter\" on type cannot use input object type \"Filter\".",
        );
    }

    #[test]
    fn input_positions_reject_composite_output_types() {
        for (kind, type_name) in [
            (TypeKind::Object, "Dog"),
            (TypeKind::Interface, "Pet"),
            (TypeKind::Union, "CatOrDog"),
        ] {
            let err =
                assert_input_position(InputPosition::Argument, "a", type_name, kind).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Argument \"a\" cannot use {kind} type \"{type_name}\"."),
            );
        }
        assert!(
            assert_input_position(InputPosition::InputField, "f", "Filter", TypeKind::InputObject)
                .is_ok()
        );
        assert_eq!(
            assert_input_position(InputPosition::Variable, "v", "Dog", TypeKind::Object)
                .unwrap_err()
                .to_string(),
            "Variable \"v\" cannot use object type \"Dog\".",
        );
    }

    #[test]
    fn union_members_must_be_objects() {
        assert!(assert_union_member("Result", "Dog", TypeKind::Object).is_ok());
        assert_eq!(
            assert_union_member("Result", "Pet", TypeKind::Interface)
                .unwrap_err()
                .to_string(),
            "Union \"Result\" cannot include \"Pet\" (interface type); union members must be object types.",
        );
    }

    #[test]
    fn type_conditions_require_composite_types() {
        let state = state_with_kinds();
        assert!(assert_type_condition(&state, "frag", "Dog").is_ok());
        assert_eq!(
            assert_type_condition(&state, "frag", "Color")
                .unwrap_err()
                .to_string(),
            "Fragment \"frag\" cannot have type condition \"Color\" (enum type).",
        );
        assert_eq!(
            assert_type_condition(&state, "frag", "Int")
                .unwrap_err()
                .to_string(),
            "Fragment \"frag\" cannot have type condition \"Int\" (scalar type).",
        );
        // Unresolvable conditions are assumed to name external types.
        assert!(assert_type_condition(&state, "frag", "ExternalThing").is_ok());
    }

    #[test]
    fn non_null_variables_reject_null_defaults() {
        let non_null = Type::NonNullNamed(literal!("Int"));
        assert_eq!(
            assert_variable_default("count", &non_null, Some(&InputValue::Null))
                .unwrap_err()
                .to_string(),
            "Variable \"count\" has a non-null type but a null default value.",
        );
        assert!(assert_variable_default("count", &non_null, Some(&InputValue::Int(1))).is_ok());
        assert!(assert_variable_default("count", &non_null, None).is_ok());
        let nullable = Type::Named(literal!("Int"));
        assert!(assert_variable_default("count", &nullable, Some(&InputValue::Null)).is_ok());
    }
}
