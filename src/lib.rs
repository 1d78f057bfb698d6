//! GraphQL schema construction and SDL emission.
//!
//! `laurel` is the schema engine of a declarative code-generation pipeline:
//! components accumulate type, field, directive and argument declarations
//! into a [`SchemaState`], forward references are carried as opaque
//! [`Refkey`]s and resolved once every declaration has been seen, names pass
//! through a pluggable [`NamePolicy`], and a single build pass turns the
//! state into a validated [`SchemaType`] ready for SDL emission.
//!
//! ```
//! use laurel::{SchemaState, TypeRef};
//!
//! let mut state = SchemaState::new();
//! let mut query = state.object_meta("Query")?;
//! query.add_field(state.field("hello", TypeRef::non_null(TypeRef::named("String"))?)?)?;
//! state.register_type(query)?;
//!
//! let schema = state.build()?;
//! assert_eq!(
//!     schema.as_schema_language(),
//!     "type Query {\n  hello: String!\n}\n",
//! );
//! # Ok::<(), laurel::SchemaError>(())
//! ```
//!
//! Construction and build errors abort immediately as [`SchemaError`]s;
//! interface-conformance defects accumulate as [`RuleError`]s through
//! [`run_validations`] so a caller can report them all at once.

pub mod ast;
pub mod name;
pub mod schema;
pub mod validation;

#[cfg(test)]
mod tests;

pub use crate::{
    ast::{InputValue, OperationType, Refkey, Type, TypeRef},
    name::{ElementKind, NameError, NamePolicy, PolicyFlavor, ensure_name_valid},
    schema::{
        SchemaError,
        meta::{
            Argument, DeprecationStatus, DirectiveMeta, EnumMeta, EnumValue, Field,
            InputObjectMeta, InterfaceMeta, MemberKind, MetaType, ObjectMeta, ScalarMeta,
            UnionMeta,
        },
        model::{
            DirectiveLocation, DirectiveType, InputPosition, NamedType, SchemaType, TypeKind,
        },
        state::{SchemaRoots, SchemaState},
        translate::{SchemaTranslator, sdl::SdlTranslator},
    },
    validation::{
        RuleError, RuleErrors, assert_valid,
        rules::directive_usage::{
            DirectiveUsageContext, DirectiveUsageError, Scope, run_directive_validation,
        },
        run_validations,
    },
};
