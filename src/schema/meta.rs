//! Definition records accumulated into a schema state, and the mutators
//! that attach children to them.
//!
//! Records are created through the constructors on
//! [`SchemaState`](crate::schema::state::SchemaState) (which apply the name
//! policy), filled in with the `add_*` mutators here, and registered back
//! onto the state. Every `add_*` mutator checks the parent's name set before
//! touching the child list, so a failed add leaves the parent untouched.

use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error};
use fnv::FnvHashSet;

use crate::{
    ast::{InputValue, Refkey, TypeRef},
    schema::{SchemaError, model::DirectiveLocation, state::SchemaState},
};

/// Whether an item is deprecated, with context.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum DeprecationStatus {
    /// The field/variant is not deprecated.
    Current,
    /// The field/variant is deprecated, with an optional reason.
    Deprecated(Option<ArcStr>),
}

impl DeprecationStatus {
    /// If this deprecation status indicates the item is deprecated.
    pub fn is_deprecated(&self) -> bool {
        match self {
            DeprecationStatus::Current => false,
            DeprecationStatus::Deprecated(_) => true,
        }
    }

    /// An optional reason for the deprecation, or none if `Current`.
    pub fn reason(&self) -> Option<&str> {
        match self {
            DeprecationStatus::Current => None,
            DeprecationStatus::Deprecated(rsn) => rsn.as_deref(),
        }
    }
}

/// What sort of child collided or misbehaved, for error messages.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[allow(missing_docs, reason = "variant names are self-describing")]
pub enum MemberKind {
    #[display("Field")]
    Field,
    #[display("Argument")]
    Argument,
    #[display("Input field")]
    InputField,
    #[display("Enum value")]
    EnumValue,
    #[display("Union member")]
    UnionMember,
}

/// Error returned by a custom scalar coercion hook.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
#[display("{message}")]
pub struct CoerceError {
    message: String,
}

impl CoerceError {
    /// A coercion error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        CoerceError {
            message: message.into(),
        }
    }
}

/// Host-provided coercion hook for a custom scalar.
///
/// Hooks are carried through to the built schema but never invoked by this
/// crate; they exist for embedders that execute against the emitted schema.
pub type ScalarCoerceFn = fn(&InputValue) -> Result<InputValue, CoerceError>;

/// Scalar type definition.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarMeta {
    /// Final (post-policy) type name.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    /// URL of the specification this scalar follows.
    pub specified_by_url: Option<ArcStr>,
    #[doc(hidden)]
    pub serialize_fn: Option<ScalarCoerceFn>,
    #[doc(hidden)]
    pub parse_value_fn: Option<ScalarCoerceFn>,
    #[doc(hidden)]
    pub parse_literal_fn: Option<ScalarCoerceFn>,
    pub(crate) refkeys: Vec<Refkey>,
}

impl ScalarMeta {
    pub(crate) fn new(name: ArcStr) -> Self {
        ScalarMeta {
            name,
            description: None,
            specified_by_url: None,
            serialize_fn: None,
            parse_value_fn: None,
            parse_literal_fn: None,
            refkeys: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the specification URL.
    pub fn specified_by_url(mut self, url: impl Into<ArcStr>) -> Self {
        self.specified_by_url = Some(url.into());
        self
    }

    /// Sets the serialization hook.
    pub fn serialize_fn(mut self, f: ScalarCoerceFn) -> Self {
        self.serialize_fn = Some(f);
        self
    }

    /// Sets the value-parsing hook.
    pub fn parse_value_fn(mut self, f: ScalarCoerceFn) -> Self {
        self.parse_value_fn = Some(f);
        self
    }

    /// Sets the literal-parsing hook.
    pub fn parse_literal_fn(mut self, f: ScalarCoerceFn) -> Self {
        self.parse_literal_fn = Some(f);
        self
    }

    /// Binds a refkey alias to this definition's name at registration.
    pub fn refkey(mut self, key: Refkey) -> Self {
        self.refkeys.push(key);
        self
    }
}

/// Object type definition.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectMeta {
    /// Final (post-policy) type name.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    pub(crate) fields: Vec<Field>,
    pub(crate) field_names: FnvHashSet<ArcStr>,
    pub(crate) interfaces: Vec<TypeRef>,
    pub(crate) refkeys: Vec<Refkey>,
}

impl ObjectMeta {
    pub(crate) fn new(name: ArcStr) -> Self {
        ObjectMeta {
            name,
            description: None,
            fields: Vec::new(),
            field_names: FnvHashSet::default(),
            interfaces: Vec::new(),
            refkeys: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declares an implemented interface.
    pub fn interface(mut self, interface: impl Into<TypeRef>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Binds a refkey alias to this definition's name at registration.
    pub fn refkey(mut self, key: Refkey) -> Self {
        self.refkeys.push(key);
        self
    }

    /// Appends a field, rejecting duplicates by name.
    pub fn add_field(&mut self, field: Field) -> Result<(), SchemaError> {
        push_named(
            &mut self.fields,
            &mut self.field_names,
            field,
            |f| f.name.clone(),
            MemberKind::Field,
            &self.name,
        )
    }

    /// The fields declared so far, in insertion order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The declared interface references, in declaration order.
    pub fn interfaces(&self) -> &[TypeRef] {
        &self.interfaces
    }
}

/// Interface type definition.
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceMeta {
    /// Final (post-policy) type name.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    pub(crate) fields: Vec<Field>,
    pub(crate) field_names: FnvHashSet<ArcStr>,
    pub(crate) interfaces: Vec<TypeRef>,
    pub(crate) refkeys: Vec<Refkey>,
}

impl InterfaceMeta {
    pub(crate) fn new(name: ArcStr) -> Self {
        InterfaceMeta {
            name,
            description: None,
            fields: Vec::new(),
            field_names: FnvHashSet::default(),
            interfaces: Vec::new(),
            refkeys: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declares a parent interface.
    pub fn interface(mut self, interface: impl Into<TypeRef>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Binds a refkey alias to this definition's name at registration.
    pub fn refkey(mut self, key: Refkey) -> Self {
        self.refkeys.push(key);
        self
    }

    /// Appends a field, rejecting duplicates by name.
    pub fn add_field(&mut self, field: Field) -> Result<(), SchemaError> {
        push_named(
            &mut self.fields,
            &mut self.field_names,
            field,
            |f| f.name.clone(),
            MemberKind::Field,
            &self.name,
        )
    }

    /// The fields declared so far, in insertion order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The declared parent interface references, in declaration order.
    pub fn interfaces(&self) -> &[TypeRef] {
        &self.interfaces
    }
}

/// Union type definition.
#[derive(Clone, Debug, PartialEq)]
pub struct UnionMeta {
    /// Final (post-policy) type name.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    pub(crate) members: Vec<TypeRef>,
    pub(crate) member_names: FnvHashSet<ArcStr>,
    pub(crate) refkeys: Vec<Refkey>,
}

impl UnionMeta {
    pub(crate) fn new(name: ArcStr) -> Self {
        UnionMeta {
            name,
            description: None,
            members: Vec::new(),
            member_names: FnvHashSet::default(),
            refkeys: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Binds a refkey alias to this definition's name at registration.
    pub fn refkey(mut self, key: Refkey) -> Self {
        self.refkeys.push(key);
        self
    }

    /// Appends a member type reference.
    ///
    /// Duplicate detection is keyed by the member name resolvable at add
    /// time; members whose name cannot be determined yet (inline
    /// definitions) bypass the set.
    pub fn add_member(
        &mut self,
        state: &SchemaState,
        member: impl Into<TypeRef>,
    ) -> Result<(), SchemaError> {
        let member = member.into();
        if let Some(name) = member.name_hint(state.refkeys()) {
            if self.member_names.contains(&name) {
                return Err(SchemaError::DuplicateMember {
                    kind: MemberKind::UnionMember,
                    name,
                    parent: self.name.clone(),
                });
            }
            self.member_names.insert(name);
        }
        self.members.push(member);
        Ok(())
    }

    /// The member references declared so far, in insertion order.
    pub fn members(&self) -> &[TypeRef] {
        &self.members
    }
}

/// Enum type definition.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumMeta {
    /// Final (post-policy) type name.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    pub(crate) values: Vec<EnumValue>,
    pub(crate) value_names: FnvHashSet<ArcStr>,
    pub(crate) refkeys: Vec<Refkey>,
}

impl EnumMeta {
    pub(crate) fn new(name: ArcStr) -> Self {
        EnumMeta {
            name,
            description: None,
            values: Vec::new(),
            value_names: FnvHashSet::default(),
            refkeys: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Binds a refkey alias to this definition's name at registration.
    pub fn refkey(mut self, key: Refkey) -> Self {
        self.refkeys.push(key);
        self
    }

    /// Appends a value, rejecting duplicates by name.
    pub fn add_value(&mut self, value: EnumValue) -> Result<(), SchemaError> {
        push_named(
            &mut self.values,
            &mut self.value_names,
            value,
            |v| v.name.clone(),
            MemberKind::EnumValue,
            &self.name,
        )
    }

    /// The values declared so far, in insertion order.
    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }
}

/// Input object type definition.
#[derive(Clone, Debug, PartialEq)]
pub struct InputObjectMeta {
    /// Final (post-policy) type name.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    pub(crate) input_fields: Vec<Argument>,
    pub(crate) field_names: FnvHashSet<ArcStr>,
    pub(crate) one_of: bool,
    pub(crate) refkeys: Vec<Refkey>,
}

impl InputObjectMeta {
    pub(crate) fn new(name: ArcStr) -> Self {
        InputObjectMeta {
            name,
            description: None,
            input_fields: Vec::new(),
            field_names: FnvHashSet::default(),
            one_of: false,
            refkeys: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the input object as OneOf: exactly one field may be provided.
    pub fn one_of(mut self) -> Self {
        self.one_of = true;
        self
    }

    /// Binds a refkey alias to this definition's name at registration.
    pub fn refkey(mut self, key: Refkey) -> Self {
        self.refkeys.push(key);
        self
    }

    /// Appends an input field, rejecting duplicates by name.
    ///
    /// On a OneOf input object every field must be nullable and carry no
    /// default. Independently, a required field (non-null, no default) may
    /// not be deprecated: a client could never legally omit it.
    pub fn add_input_field(&mut self, field: Argument) -> Result<(), SchemaError> {
        if self.field_names.contains(&field.name) {
            return Err(SchemaError::DuplicateMember {
                kind: MemberKind::InputField,
                name: field.name.clone(),
                parent: self.name.clone(),
            });
        }
        if self.one_of
            && (matches!(field.arg_type, TypeRef::NonNull(_)) || field.default_value.is_some())
        {
            return Err(SchemaError::OneOfFieldViolation {
                parent: self.name.clone(),
                name: field.name.clone(),
            });
        }
        ensure_deprecable(&field, MemberKind::InputField, &self.name)?;
        self.field_names.insert(field.name.clone());
        self.input_fields.push(field);
        Ok(())
    }

    /// The input fields declared so far, in insertion order.
    pub fn input_fields(&self) -> &[Argument] {
        &self.input_fields
    }
}

/// Generic type definition, tagged by kind.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs, reason = "variant names are self-describing")]
pub enum MetaType {
    Scalar(ScalarMeta),
    Object(ObjectMeta),
    Interface(InterfaceMeta),
    Union(UnionMeta),
    Enum(EnumMeta),
    InputObject(InputObjectMeta),
}

impl MetaType {
    /// The definition's final name.
    pub fn name(&self) -> &ArcStr {
        match self {
            MetaType::Scalar(m) => &m.name,
            MetaType::Object(m) => &m.name,
            MetaType::Interface(m) => &m.name,
            MetaType::Union(m) => &m.name,
            MetaType::Enum(m) => &m.name,
            MetaType::InputObject(m) => &m.name,
        }
    }

    /// The definition's description, if any.
    pub fn description(&self) -> Option<&ArcStr> {
        match self {
            MetaType::Scalar(m) => m.description.as_ref(),
            MetaType::Object(m) => m.description.as_ref(),
            MetaType::Interface(m) => m.description.as_ref(),
            MetaType::Union(m) => m.description.as_ref(),
            MetaType::Enum(m) => m.description.as_ref(),
            MetaType::InputObject(m) => m.description.as_ref(),
        }
    }

    /// The refkey aliases to bind at registration.
    pub(crate) fn refkeys(&self) -> &[Refkey] {
        match self {
            MetaType::Scalar(m) => &m.refkeys,
            MetaType::Object(m) => &m.refkeys,
            MetaType::Interface(m) => &m.refkeys,
            MetaType::Union(m) => &m.refkeys,
            MetaType::Enum(m) => &m.refkeys,
            MetaType::InputObject(m) => &m.refkeys,
        }
    }

    /// The definition's kind tag.
    pub fn kind(&self) -> crate::schema::model::TypeKind {
        use crate::schema::model::TypeKind;
        match self {
            MetaType::Scalar(_) => TypeKind::Scalar,
            MetaType::Object(_) => TypeKind::Object,
            MetaType::Interface(_) => TypeKind::Interface,
            MetaType::Union(_) => TypeKind::Union,
            MetaType::Enum(_) => TypeKind::Enum,
            MetaType::InputObject(_) => TypeKind::InputObject,
        }
    }
}

impl From<ScalarMeta> for MetaType {
    fn from(m: ScalarMeta) -> Self {
        MetaType::Scalar(m)
    }
}

impl From<ObjectMeta> for MetaType {
    fn from(m: ObjectMeta) -> Self {
        MetaType::Object(m)
    }
}

impl From<InterfaceMeta> for MetaType {
    fn from(m: InterfaceMeta) -> Self {
        MetaType::Interface(m)
    }
}

impl From<UnionMeta> for MetaType {
    fn from(m: UnionMeta) -> Self {
        MetaType::Union(m)
    }
}

impl From<EnumMeta> for MetaType {
    fn from(m: EnumMeta) -> Self {
        MetaType::Enum(m)
    }
}

impl From<InputObjectMeta> for MetaType {
    fn from(m: InputObjectMeta) -> Self {
        MetaType::InputObject(m)
    }
}

/// Field definition on an object or interface type.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    /// Final (post-policy) field name.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    /// The declared return type reference.
    pub field_type: TypeRef,
    pub(crate) arguments: Vec<Argument>,
    pub(crate) argument_names: FnvHashSet<ArcStr>,
    /// Whether the field is deprecated, with an optional reason.
    pub deprecation_status: DeprecationStatus,
}

impl Field {
    pub(crate) fn new(name: ArcStr, field_type: TypeRef) -> Self {
        Field {
            name,
            description: None,
            field_type,
            arguments: Vec::new(),
            argument_names: FnvHashSet::default(),
            deprecation_status: DeprecationStatus::Current,
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the field deprecated, with an optional reason.
    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(Into::into));
        self
    }

    /// Appends an argument, rejecting duplicates by name.
    ///
    /// A required argument (non-null, no default) may not be deprecated.
    pub fn add_argument(&mut self, argument: Argument) -> Result<(), SchemaError> {
        if self.argument_names.contains(&argument.name) {
            return Err(SchemaError::DuplicateMember {
                kind: MemberKind::Argument,
                name: argument.name.clone(),
                parent: self.name.clone(),
            });
        }
        ensure_deprecable(&argument, MemberKind::Argument, &self.name)?;
        self.argument_names.insert(argument.name.clone());
        self.arguments.push(argument);
        Ok(())
    }

    /// The arguments declared so far, in insertion order.
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }
}

/// Argument definition on a field or directive, or an input object field.
#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    /// Final (post-policy) name.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    /// The declared type reference.
    pub arg_type: TypeRef,
    /// Optional default value.
    pub default_value: Option<InputValue>,
    /// Whether the argument is deprecated, with an optional reason.
    pub deprecation_status: DeprecationStatus,
}

impl Argument {
    pub(crate) fn new(name: ArcStr, arg_type: TypeRef) -> Self {
        Argument {
            name,
            description: None,
            arg_type,
            default_value: None,
            deprecation_status: DeprecationStatus::Current,
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default value.
    pub fn default_value(mut self, value: InputValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Marks the argument deprecated, with an optional reason.
    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(Into::into));
        self
    }

    /// Required means non-null at the top level with no default supplied.
    pub(crate) fn is_required(&self) -> bool {
        matches!(self.arg_type, TypeRef::NonNull(_)) && self.default_value.is_none()
    }
}

/// A single value in an enum type.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumValue {
    /// Final (post-policy) value name.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    /// Whether the value is deprecated, with an optional reason.
    pub deprecation_status: DeprecationStatus,
}

impl EnumValue {
    pub(crate) fn new(name: ArcStr) -> Self {
        EnumValue {
            name,
            description: None,
            deprecation_status: DeprecationStatus::Current,
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the value deprecated, with an optional reason.
    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(Into::into));
        self
    }
}

/// Directive definition.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveMeta {
    /// Final (post-policy) directive name, without the `@`.
    pub name: ArcStr,
    /// Optional description.
    pub description: Option<ArcStr>,
    pub(crate) locations: Vec<DirectiveLocation>,
    /// Whether the directive may be applied more than once per location.
    pub repeatable: bool,
    pub(crate) arguments: Vec<Argument>,
    pub(crate) argument_names: FnvHashSet<ArcStr>,
}

impl DirectiveMeta {
    pub(crate) fn new(name: ArcStr, locations: Vec<DirectiveLocation>) -> Self {
        DirectiveMeta {
            name,
            description: None,
            locations,
            repeatable: false,
            arguments: Vec::new(),
            argument_names: FnvHashSet::default(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the directive repeatable.
    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    /// Appends an argument, rejecting duplicates by name.
    pub fn add_argument(&mut self, argument: Argument) -> Result<(), SchemaError> {
        push_named(
            &mut self.arguments,
            &mut self.argument_names,
            argument,
            |a| a.name.clone(),
            MemberKind::Argument,
            &self.name,
        )
    }

    /// The declared locations, in declaration order.
    pub fn locations(&self) -> &[DirectiveLocation] {
        &self.locations
    }

    /// The arguments declared so far, in insertion order.
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }
}

fn push_named<T>(
    items: &mut Vec<T>,
    names: &mut FnvHashSet<ArcStr>,
    item: T,
    name_of: impl Fn(&T) -> ArcStr,
    kind: MemberKind,
    parent: &ArcStr,
) -> Result<(), SchemaError> {
    let name = name_of(&item);
    if names.contains(&name) {
        return Err(SchemaError::DuplicateMember {
            kind,
            name,
            parent: parent.clone(),
        });
    }
    names.insert(name);
    items.push(item);
    Ok(())
}

fn ensure_deprecable(
    member: &Argument,
    kind: MemberKind,
    parent: &ArcStr,
) -> Result<(), SchemaError> {
    if member.is_required() && member.deprecation_status.is_deprecated() {
        return Err(SchemaError::RequiredMemberDeprecated {
            kind,
            name: member.name.clone(),
            parent: parent.clone(),
        });
    }
    Ok(())
}
