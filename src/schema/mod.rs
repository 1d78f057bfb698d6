//! Schema state, definition records, the build pass, and SDL translation.

pub mod build;
pub mod meta;
pub mod model;
pub mod state;
pub mod translate;

use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error};

use crate::{
    ast::{OperationType, Refkey},
    name::NameError,
    schema::{
        meta::MemberKind,
        model::{InputPosition, TypeKind},
    },
};

/// Error raised while constructing definitions or building a schema.
///
/// Everything here is fatal to the render that produced it; only the
/// deferred conformance checks accumulate
/// [`RuleError`](crate::validation::RuleError)s instead.
#[derive(Clone, Debug, Display, Error, PartialEq)]
pub enum SchemaError {
    /// A raw or transformed name violated a naming rule.
    #[display("{_0}")]
    Name(NameError),

    /// A bare name resolved to neither a built-in scalar nor a declared type.
    #[display("Unknown GraphQL type \"{_0}\"")]
    UnknownType(#[error(not(source))] ArcStr),

    /// A refkey had no binding when it was looked up.
    #[display("Unknown refkey \"{_0}\"")]
    UnknownRefkey(#[error(not(source))] Refkey),

    /// `nonNull` wrapped directly around `nonNull`.
    #[display("Non-null cannot wrap another non-null type")]
    DoubleNonNull,

    /// A child with this name already exists on the parent.
    #[display("{kind} \"{name}\" is already defined on \"{parent}\"")]
    DuplicateMember {
        /// What sort of child collided.
        kind: MemberKind,
        /// The colliding name.
        name: ArcStr,
        /// The parent definition's name.
        parent: ArcStr,
    },

    /// A refkey already bound to one name was bound again to another.
    #[display("Refkey \"{key}\" is already bound to \"{bound}\" and cannot be rebound to \"{name}\"")]
    RefkeyRebound {
        /// The offending refkey.
        key: Refkey,
        /// The name it is bound to.
        bound: ArcStr,
        /// The name the rebind attempted.
        name: ArcStr,
    },

    /// A directive with this name is already declared.
    #[display("Directive \"{_0}\" is already defined")]
    DuplicateDirective(#[error(not(source))] ArcStr),

    /// A declared directive collides with a specified (built-in) directive.
    #[display("Directive \"{_0}\" is already defined as a specified directive")]
    SpecifiedDirectiveCollision(#[error(not(source))] ArcStr),

    /// A directive declared no locations at all.
    #[display("Directive \"{_0}\" must declare at least one location")]
    DirectiveWithoutLocations(#[error(not(source))] ArcStr),

    /// No explicit query root and no type named `Query`.
    #[display("A query root type is required.")]
    MissingQueryRoot,

    /// A root operation type resolved to a non-object type.
    #[display("{_0} type must be an object type.")]
    NonObjectRoot(#[error(not(source))] OperationType),

    /// Two root operations resolved to the same type.
    #[display("Root types must be distinct.")]
    IndistinctRootTypes,

    /// An object or interface type ended up with no fields, own or inherited.
    #[display("Type \"{_0}\" must define fields.")]
    TypeWithoutFields(#[error(not(source))] ArcStr),

    /// An enum type with no values.
    #[display("Enum \"{_0}\" must have at least one value.")]
    EnumWithoutValues(#[error(not(source))] ArcStr),

    /// A union type with no members.
    #[display("Union \"{_0}\" must have at least one member type.")]
    UnionWithoutMembers(#[error(not(source))] ArcStr),

    /// A union member resolved to something other than an object type.
    #[display("Union \"{union_name}\" cannot include \"{member}\" ({kind} type); union members must be object types.")]
    NonObjectUnionMember {
        /// The union being built.
        union_name: ArcStr,
        /// The offending member.
        member: ArcStr,
        /// What the member actually is.
        kind: TypeKind,
    },

    /// A field return type resolved to an input object type.
    #[display("Field \"{field}\" on type cannot use input object type \"{type_name}\".")]
    InputTypeInOutputPosition {
        /// The field whose return type is invalid.
        field: ArcStr,
        /// The offending input object type.
        type_name: ArcStr,
    },

    /// An argument, input field or variable type resolved to an output-only
    /// type.
    #[display("{position} \"{name}\" cannot use {kind} type \"{type_name}\".")]
    OutputTypeInInputPosition {
        /// Which input position was occupied.
        position: InputPosition,
        /// The argument/input-field/variable name.
        name: ArcStr,
        /// What the type actually is.
        kind: TypeKind,
        /// The offending type.
        type_name: ArcStr,
    },

    /// A fragment type condition resolved to a non-composite type.
    #[display("Fragment \"{fragment}\" cannot have type condition \"{type_name}\" ({kind} type).")]
    InvalidTypeCondition {
        /// The fragment (or inline fragment host) name.
        fragment: ArcStr,
        /// The offending condition type.
        type_name: ArcStr,
        /// What the type actually is.
        kind: TypeKind,
    },

    /// A non-null variable declared an explicit `null` default.
    #[display("Variable \"{_0}\" has a non-null type but a null default value.")]
    NullDefaultOnNonNullVariable(#[error(not(source))] ArcStr),

    /// A field of a OneOf input object was non-nullable or carried a default.
    #[display("OneOf input object \"{parent}\" field \"{name}\" must be nullable and cannot have a default value.")]
    OneOfFieldViolation {
        /// The OneOf input object.
        parent: ArcStr,
        /// The offending field.
        name: ArcStr,
    },

    /// A required (non-null, defaultless) member was marked deprecated.
    #[display("{kind} \"{name}\" on \"{parent}\" cannot be deprecated because it is required.")]
    RequiredMemberDeprecated {
        /// What sort of member was deprecated.
        kind: MemberKind,
        /// The member name.
        name: ArcStr,
        /// The parent definition's name.
        parent: ArcStr,
    },
}

impl From<NameError> for SchemaError {
    fn from(e: NameError) -> Self {
        SchemaError::Name(e)
    }
}
