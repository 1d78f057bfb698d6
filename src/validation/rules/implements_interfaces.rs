//! Deferred interface-conformance validation.
//!
//! Each object or interface declaration queues its implemented interfaces on
//! the state at render time; the actual check runs once the full render has
//! completed, when every refkey binding is known. Conformance is a superset
//! check over encoded field keys: the implementer may add fields, but every
//! interface field must appear with exactly matching name, type and
//! arguments.

use arcstr::ArcStr;
use fnv::FnvHashSet;

use crate::{
    ast::TypeRef,
    schema::{meta::MetaType, state::SchemaState},
    validation::ValidatorContext,
};

/// A queued conformance check: one implementing type and the interface
/// references it declared.
#[derive(Clone, Debug)]
pub struct PendingConformance {
    pub(crate) type_name: ArcStr,
    pub(crate) interfaces: Vec<TypeRef>,
}

pub(crate) fn validate(state: &SchemaState, ctx: &mut ValidatorContext) {
    for pending in state.pending_validations() {
        let type_keys = field_keys(state, &pending.type_name);
        for interface in interface_closure(state, &pending.interfaces) {
            let interface_keys = field_keys(state, &interface);
            if !interface_keys.is_subset(&type_keys) {
                ctx.report_error(error_message(&pending.type_name, &interface));
            }
        }
    }
}

fn error_message(type_name: &str, interface_name: &str) -> String {
    format!("Type \"{type_name}\" does not correctly implement interface \"{interface_name}\".")
}

/// Resolves the declared references into the deduplicated transitive
/// closure of interfaces, deepest-first: an interface's parents precede it,
/// so failures through transitive inheritance are reported per level from
/// the deepest up.
fn interface_closure(state: &SchemaState, declared: &[TypeRef]) -> Vec<ArcStr> {
    let mut closure = Vec::new();
    let mut visited = FnvHashSet::default();
    for reference in declared {
        if let Some(name) = resolve_interface_name(state, reference) {
            visit(state, name, &mut visited, &mut closure);
        }
    }
    closure
}

fn visit(
    state: &SchemaState,
    name: ArcStr,
    visited: &mut FnvHashSet<ArcStr>,
    closure: &mut Vec<ArcStr>,
) {
    if !visited.insert(name.clone()) {
        return;
    }
    if let Some(MetaType::Interface(interface)) = state.type_def(&name) {
        for parent in interface.interfaces() {
            if let Some(parent_name) = resolve_interface_name(state, parent) {
                visit(state, parent_name, visited, closure);
            }
        }
    }
    closure.push(name);
}

/// Resolves a reference to the name of an interface definition. References
/// that resolve to nothing, or to a non-interface, are skipped: the
/// unresolved name surfaces as a build error instead.
fn resolve_interface_name(state: &SchemaState, reference: &TypeRef) -> Option<ArcStr> {
    let name = reference.name_hint(state.refkeys())?;
    matches!(state.type_def(&name), Some(MetaType::Interface(_))).then_some(name)
}

/// Encodes a type's fields as a set of `name \0 type \0 sorted-arg-keys`
/// strings. Whitespace is stripped from the rendered type strings so
/// formatting differences never cause false mismatches.
fn field_keys(state: &SchemaState, type_name: &str) -> FnvHashSet<String> {
    let fields = match state.type_def(type_name) {
        Some(MetaType::Object(object)) => object.fields(),
        Some(MetaType::Interface(interface)) => interface.fields(),
        _ => return FnvHashSet::default(),
    };
    fields
        .iter()
        .map(|field| {
            let mut arg_keys: Vec<String> = field
                .arguments()
                .iter()
                .map(|arg| {
                    format!(
                        "{}\0{}",
                        arg.name,
                        strip_whitespace(&arg.arg_type.render(state.refkeys())),
                    )
                })
                .collect();
            arg_keys.sort();
            format!(
                "{}\0{}\0{}",
                field.name,
                strip_whitespace(&field.field_type.render(state.refkeys())),
                arg_keys.join("\0"),
            )
        })
        .collect()
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::Refkey,
        validation::{RuleError, run_validations},
    };

    fn node_interface(state: &mut SchemaState) {
        let mut node = state.interface_meta("Node").unwrap();
        node.add_field(
            state
                .field("id", TypeRef::non_null(TypeRef::named("ID")).unwrap())
                .unwrap(),
        )
        .unwrap();
        state.register_type(node).unwrap();
    }

    #[test]
    fn conforming_type_passes() {
        let mut state = SchemaState::new();
        node_interface(&mut state);

        let mut user = state.object_meta("User").unwrap().interface("Node");
        user.add_field(
            state
                .field("id", TypeRef::non_null(TypeRef::named("ID")).unwrap())
                .unwrap(),
        )
        .unwrap();
        user.add_field(state.field("name", "String").unwrap()).unwrap();
        state.register_type(user).unwrap();
        state.register_for_validation("User", vec![TypeRef::named("Node")]);

        assert!(run_validations(&state).is_empty());
    }

    #[test]
    fn nullable_field_breaks_conformance_with_one_error() {
        let mut state = SchemaState::new();
        node_interface(&mut state);

        let mut user = state.object_meta("User").unwrap().interface("Node");
        user.add_field(state.field("id", "ID").unwrap()).unwrap();
        user.add_field(state.field("name", "String").unwrap()).unwrap();
        state.register_type(user).unwrap();
        state.register_for_validation("User", vec![TypeRef::named("Node")]);

        let errors = run_validations(&state);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message(),
            "Type \"User\" does not correctly implement interface \"Node\".",
        );
    }

    #[test]
    fn equal_field_sets_pass_and_any_removal_fails() {
        let mut state = SchemaState::new();

        let mut iface = state.interface_meta("Searchable").unwrap();
        let mut search = state.field("search", "String").unwrap();
        search
            .add_argument(state.argument("term", "String").unwrap())
            .unwrap();
        iface.add_field(search).unwrap();
        iface.add_field(state.field("rank", "Int").unwrap()).unwrap();
        state.register_type(iface).unwrap();

        // Exactly equal field sets: zero errors.
        let mut exact = state.object_meta("Exact").unwrap().interface("Searchable");
        let mut search = state.field("search", "String").unwrap();
        search
            .add_argument(state.argument("term", "String").unwrap())
            .unwrap();
        exact.add_field(search).unwrap();
        exact.add_field(state.field("rank", "Int").unwrap()).unwrap();
        state.register_type(exact).unwrap();
        state.register_for_validation("Exact", vec![TypeRef::named("Searchable")]);
        assert!(run_validations(&state).is_empty());

        // Dropping either field produces exactly one error for the pair.
        for keep in ["search", "rank"] {
            let mut state = SchemaState::new();
            let mut iface = state.interface_meta("Searchable").unwrap();
            let mut search = state.field("search", "String").unwrap();
            search
                .add_argument(state.argument("term", "String").unwrap())
                .unwrap();
            iface.add_field(search).unwrap();
            iface.add_field(state.field("rank", "Int").unwrap()).unwrap();
            state.register_type(iface).unwrap();

            let mut partial = state.object_meta("Partial").unwrap().interface("Searchable");
            if keep == "search" {
                let mut search = state.field("search", "String").unwrap();
                search
                    .add_argument(state.argument("term", "String").unwrap())
                    .unwrap();
                partial.add_field(search).unwrap();
            } else {
                partial.add_field(state.field("rank", "Int").unwrap()).unwrap();
            }
            state.register_type(partial).unwrap();
            state.register_for_validation("Partial", vec![TypeRef::named("Searchable")]);

            let errors = run_validations(&state);
            assert_eq!(errors.len(), 1, "keeping only {keep}");
            assert_eq!(
                errors[0].message(),
                "Type \"Partial\" does not correctly implement interface \"Searchable\".",
            );
        }
    }

    #[test]
    fn argument_types_must_match_exactly() {
        let mut state = SchemaState::new();

        let mut iface = state.interface_meta("Pageable").unwrap();
        let mut items = state.field("items", "String").unwrap();
        items
            .add_argument(
                state
                    .argument("first", TypeRef::non_null(TypeRef::named("Int")).unwrap())
                    .unwrap(),
            )
            .unwrap();
        iface.add_field(items).unwrap();
        state.register_type(iface).unwrap();

        let mut list = state.object_meta("List").unwrap().interface("Pageable");
        let mut items = state.field("items", "String").unwrap();
        items
            .add_argument(state.argument("first", "Int").unwrap())
            .unwrap();
        list.add_field(items).unwrap();
        state.register_type(list).unwrap();
        state.register_for_validation("List", vec![TypeRef::named("Pageable")]);

        let errors = run_validations(&state);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message(),
            "Type \"List\" does not correctly implement interface \"Pageable\".",
        );
    }

    #[test]
    fn transitive_failures_report_deepest_interface_first() {
        let mut state = SchemaState::new();

        let mut base = state.interface_meta("Base").unwrap();
        base.add_field(state.field("base", "Int").unwrap()).unwrap();
        state.register_type(base).unwrap();

        let mut extended = state.interface_meta("Extended").unwrap().interface("Base");
        extended
            .add_field(state.field("extended", "Int").unwrap())
            .unwrap();
        state.register_type(extended).unwrap();

        // Implements neither level correctly.
        let mut bare = state.object_meta("Bare").unwrap().interface("Extended");
        bare.add_field(state.field("other", "Int").unwrap()).unwrap();
        state.register_type(bare).unwrap();
        state.register_for_validation("Bare", vec![TypeRef::named("Extended")]);

        let errors = run_validations(&state);
        let messages: Vec<_> = errors.iter().map(RuleError::message).collect();
        assert_eq!(
            messages,
            [
                "Type \"Bare\" does not correctly implement interface \"Base\".",
                "Type \"Bare\" does not correctly implement interface \"Extended\".",
            ],
        );
    }

    #[test]
    fn refkey_interface_references_resolve_at_validation_time() {
        let mut state = SchemaState::new();
        let node_key = Refkey::new();

        // The implementing type is declared before the interface exists;
        // the queued refkey is resolved only when validations run.
        let mut user = state.object_meta("User").unwrap().interface(node_key);
        user.add_field(state.field("id", "ID").unwrap()).unwrap();
        state.register_type(user).unwrap();
        state.register_for_validation("User", vec![TypeRef::Ref(node_key)]);

        let mut node = state.interface_meta("Node").unwrap().refkey(node_key);
        node.add_field(
            state
                .field("id", TypeRef::non_null(TypeRef::named("ID")).unwrap())
                .unwrap(),
        )
        .unwrap();
        state.register_type(node).unwrap();

        let errors = run_validations(&state);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message(),
            "Type \"User\" does not correctly implement interface \"Node\".",
        );
    }
}
