//! The mutable schema state one render invocation accumulates into.

use arcstr::ArcStr;
use fnv::FnvHashMap;
use indexmap::IndexMap;

use crate::{
    ast::{Refkey, Type, TypeRef},
    name::{ElementKind, NamePolicy},
    schema::{
        SchemaError,
        meta::{
            Argument, DirectiveMeta, EnumMeta, EnumValue, Field, InputObjectMeta, InterfaceMeta,
            MetaType, ObjectMeta, ScalarMeta, UnionMeta,
        },
        model::{DirectiveLocation, DirectiveType, TypeKind},
    },
    validation::rules::implements_interfaces::PendingConformance,
};

/// The five specified scalars, always resolvable by name.
pub(crate) const SPECIFIED_SCALARS: &[&str] = &["Int", "Float", "String", "Boolean", "ID"];

pub(crate) fn is_specified_scalar(name: &str) -> bool {
    SPECIFIED_SCALARS.contains(&name)
}

/// Explicit root operation type references.
///
/// An absent `query` falls back to a type literally named `Query` at build
/// time; `mutation` and `subscription` simply stay unset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchemaRoots {
    /// The query root reference, if explicitly set.
    pub query: Option<TypeRef>,
    /// The mutation root reference, if explicitly set.
    pub mutation: Option<TypeRef>,
    /// The subscription root reference, if explicitly set.
    pub subscription: Option<TypeRef>,
}

/// The mutable accumulator for one render invocation.
///
/// Components create definitions through the constructors here (which apply
/// the name policy), attach children through the mutators on the definition
/// records, and register the finished records back onto the state. Once the
/// render completes the state is read-only: [`build`](SchemaState::build)
/// turns it into a [`SchemaType`](crate::schema::model::SchemaType) and
/// [`run_validations`](crate::validation::run_validations) drains the queued
/// conformance checks.
///
/// A state is exclusively owned by one render; nothing is shared across
/// renders.
#[derive(Debug)]
pub struct SchemaState {
    pub(crate) types: IndexMap<ArcStr, MetaType>,
    pub(crate) directives: IndexMap<ArcStr, DirectiveMeta>,
    pub(crate) refkeys: FnvHashMap<Refkey, ArcStr>,
    pub(crate) roots: SchemaRoots,
    pub(crate) description: Option<ArcStr>,
    pub(crate) name_policy: NamePolicy,
    pub(crate) extra_scalars: FnvHashMap<ArcStr, ScalarMeta>,
    pub(crate) include_specified_directives: bool,
    pub(crate) pending_validations: Vec<PendingConformance>,
}

impl Default for SchemaState {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaState {
    /// A fresh state with the default name policy.
    pub fn new() -> Self {
        Self::with_policy(NamePolicy::default())
    }

    /// A fresh state with a custom name policy.
    pub fn with_policy(name_policy: NamePolicy) -> Self {
        SchemaState {
            types: IndexMap::new(),
            directives: IndexMap::new(),
            refkeys: FnvHashMap::default(),
            roots: SchemaRoots::default(),
            description: None,
            name_policy,
            extra_scalars: FnvHashMap::default(),
            include_specified_directives: true,
            pending_validations: Vec::new(),
        }
    }

    /// The active name policy.
    pub fn name_policy(&self) -> &NamePolicy {
        &self.name_policy
    }

    /// The explicit root operation references set so far.
    pub fn roots(&self) -> &SchemaRoots {
        &self.roots
    }

    /// Sets the schema description.
    pub fn set_description(&mut self, description: impl Into<ArcStr>) {
        self.description = Some(description.into());
    }

    /// Sets the explicit query root reference.
    pub fn set_query_root(&mut self, root: impl Into<TypeRef>) {
        self.roots.query = Some(root.into());
    }

    /// Sets the explicit mutation root reference.
    pub fn set_mutation_root(&mut self, root: impl Into<TypeRef>) {
        self.roots.mutation = Some(root.into());
    }

    /// Sets the explicit subscription root reference.
    pub fn set_subscription_root(&mut self, root: impl Into<TypeRef>) {
        self.roots.subscription = Some(root.into());
    }

    /// Turns off the specified-directive table: declared directives may then
    /// reuse the specified names, and the built schema omits the built-ins.
    pub fn disable_specified_directives(&mut self) {
        self.include_specified_directives = false;
    }

    /// Registers an auxiliary scalar resolvable by name without appearing in
    /// the emitted schema. Checked after the specified scalars and before
    /// declared types.
    pub fn register_extra_scalar(&mut self, scalar: ScalarMeta) {
        self.extra_scalars.insert(scalar.name.clone(), scalar);
    }

    // Definition constructors. Each applies the name policy (including the
    // validity check) before producing the detached record.

    /// A new object type definition.
    pub fn object_meta(&self, name: &str) -> Result<ObjectMeta, SchemaError> {
        Ok(ObjectMeta::new(self.name_policy.apply(name, ElementKind::Type)?))
    }

    /// A new interface type definition.
    pub fn interface_meta(&self, name: &str) -> Result<InterfaceMeta, SchemaError> {
        Ok(InterfaceMeta::new(self.name_policy.apply(name, ElementKind::Type)?))
    }

    /// A new union type definition.
    pub fn union_meta(&self, name: &str) -> Result<UnionMeta, SchemaError> {
        Ok(UnionMeta::new(self.name_policy.apply(name, ElementKind::Type)?))
    }

    /// A new enum type definition.
    pub fn enum_meta(&self, name: &str) -> Result<EnumMeta, SchemaError> {
        Ok(EnumMeta::new(self.name_policy.apply(name, ElementKind::Type)?))
    }

    /// A new input object type definition.
    pub fn input_object_meta(&self, name: &str) -> Result<InputObjectMeta, SchemaError> {
        Ok(InputObjectMeta::new(self.name_policy.apply(name, ElementKind::Type)?))
    }

    /// A new scalar type definition.
    pub fn scalar_meta(&self, name: &str) -> Result<ScalarMeta, SchemaError> {
        Ok(ScalarMeta::new(self.name_policy.apply(name, ElementKind::Type)?))
    }

    /// A new directive definition.
    pub fn directive_meta(
        &self,
        name: &str,
        locations: &[DirectiveLocation],
    ) -> Result<DirectiveMeta, SchemaError> {
        Ok(DirectiveMeta::new(
            self.name_policy.apply(name, ElementKind::Directive)?,
            locations.to_vec(),
        ))
    }

    /// A new field definition.
    pub fn field(&self, name: &str, field_type: impl Into<TypeRef>) -> Result<Field, SchemaError> {
        Ok(Field::new(
            self.name_policy.apply(name, ElementKind::Field)?,
            field_type.into(),
        ))
    }

    /// A new argument definition.
    pub fn argument(
        &self,
        name: &str,
        arg_type: impl Into<TypeRef>,
    ) -> Result<Argument, SchemaError> {
        Ok(Argument::new(
            self.name_policy.apply(name, ElementKind::Argument)?,
            arg_type.into(),
        ))
    }

    /// A new input field definition.
    pub fn input_field(
        &self,
        name: &str,
        arg_type: impl Into<TypeRef>,
    ) -> Result<Argument, SchemaError> {
        Ok(Argument::new(
            self.name_policy.apply(name, ElementKind::InputField)?,
            arg_type.into(),
        ))
    }

    /// A new enum value definition.
    pub fn enum_value(&self, name: &str) -> Result<EnumValue, SchemaError> {
        Ok(EnumValue::new(self.name_policy.apply(name, ElementKind::EnumValue)?))
    }

    // Registration.

    /// Inserts a type definition and binds its refkey aliases.
    ///
    /// Re-registration under an existing name silently replaces the previous
    /// definition while keeping its position in the emission order; the
    /// refkey bindings are the only part that can fail.
    pub fn register_type(&mut self, meta: impl Into<MetaType>) -> Result<(), SchemaError> {
        let meta = meta.into();
        let name = meta.name().clone();
        for key in meta.refkeys().to_vec() {
            self.bind_refkey(key, name.clone())?;
        }
        self.types.insert(name, meta);
        Ok(())
    }

    /// Binds a refkey to a type name.
    ///
    /// Binding is write-once: rebinding to the same name is idempotent,
    /// rebinding to a different name is an error.
    pub fn bind_refkey(&mut self, key: Refkey, name: impl Into<ArcStr>) -> Result<(), SchemaError> {
        let name = name.into();
        match self.refkeys.get(&key) {
            Some(bound) if *bound != name => Err(SchemaError::RefkeyRebound {
                key,
                bound: bound.clone(),
                name,
            }),
            Some(_) => Ok(()),
            None => {
                self.refkeys.insert(key, name);
                Ok(())
            }
        }
    }

    /// The name a refkey is currently bound to, if any.
    pub fn refkey_target(&self, key: Refkey) -> Option<&ArcStr> {
        self.refkeys.get(&key)
    }

    pub(crate) fn refkeys(&self) -> &FnvHashMap<Refkey, ArcStr> {
        &self.refkeys
    }

    /// Inserts a directive definition.
    pub fn register_directive(&mut self, directive: DirectiveMeta) -> Result<(), SchemaError> {
        if directive.locations.is_empty() {
            return Err(SchemaError::DirectiveWithoutLocations(directive.name.clone()));
        }
        if self.include_specified_directives && DirectiveType::is_specified(&directive.name) {
            return Err(SchemaError::SpecifiedDirectiveCollision(directive.name.clone()));
        }
        if self.directives.contains_key(&directive.name) {
            return Err(SchemaError::DuplicateDirective(directive.name.clone()));
        }
        self.directives.insert(directive.name.clone(), directive);
        Ok(())
    }

    /// Queues a type's declared interfaces for deferred conformance
    /// validation. Resolution happens in
    /// [`run_validations`](crate::validation::run_validations), once every
    /// refkey binding is known.
    pub fn register_for_validation(
        &mut self,
        type_name: impl Into<ArcStr>,
        interfaces: Vec<TypeRef>,
    ) {
        self.pending_validations.push(PendingConformance {
            type_name: type_name.into(),
            interfaces,
        });
    }

    pub(crate) fn pending_validations(&self) -> &[PendingConformance] {
        &self.pending_validations
    }

    /// Looks up a registered type definition by final name.
    pub fn type_def(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    /// Classifies a name against the scalar tables and registered types.
    pub(crate) fn type_kind(&self, name: &str) -> Option<TypeKind> {
        if is_specified_scalar(name) || self.extra_scalars.contains_key(name) {
            return Some(TypeKind::Scalar);
        }
        self.types.get(name).map(MetaType::kind)
    }

    fn resolve_type_name(&self, name: &ArcStr) -> Result<(), SchemaError> {
        if is_specified_scalar(name)
            || self.extra_scalars.contains_key(name)
            || self.types.contains_key(name)
        {
            Ok(())
        } else {
            Err(SchemaError::UnknownType(name.clone()))
        }
    }

    /// Collapses a polymorphic reference into the canonical descriptor.
    ///
    /// Bare names resolve against the specified scalars, then the auxiliary
    /// scalar table, then the registered types; refkeys resolve through the
    /// binding table first. Inline definitions are taken at their word.
    pub fn normalize_type_ref(&self, type_ref: &TypeRef) -> Result<Type, SchemaError> {
        match type_ref {
            TypeRef::Named(name) => {
                self.resolve_type_name(name)?;
                Ok(Type::Named(name.clone()))
            }
            TypeRef::Ref(key) => {
                let name = self
                    .refkeys
                    .get(key)
                    .ok_or(SchemaError::UnknownRefkey(*key))?;
                self.resolve_type_name(name)?;
                Ok(Type::Named(name.clone()))
            }
            TypeRef::Inline(meta) => Ok(Type::Named(meta.name().clone())),
            TypeRef::List(inner) => Ok(Type::List(Box::new(self.normalize_type_ref(inner)?))),
            TypeRef::NonNull(inner) => {
                if matches!(**inner, TypeRef::NonNull(_)) {
                    return Err(SchemaError::DoubleNonNull);
                }
                match self.normalize_type_ref(inner)? {
                    Type::Named(name) => Ok(Type::NonNullNamed(name)),
                    Type::List(of) => Ok(Type::NonNullList(of)),
                    Type::NonNullNamed(_) | Type::NonNullList(_) => Err(SchemaError::DoubleNonNull),
                }
            }
        }
    }
}
