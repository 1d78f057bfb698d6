//! Value types shared by the schema state, the builder and the validators:
//! type references as authors write them, resolved type descriptors, and
//! constant input values.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use arcstr::ArcStr;
use derive_more::with_trait::Display;
use fnv::FnvHashMap;

use crate::schema::{SchemaError, meta::MetaType};

/// A stable reference token for a type that may not be declared yet.
///
/// Refkeys allow one file to reference a type declared in another before the
/// declaration has been evaluated. Tokens are globally unique; the binding
/// from a token to a type name lives in one
/// [`SchemaState`](crate::schema::state::SchemaState) and is established when
/// the declaring definition is registered.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Refkey(u64);

static NEXT_REFKEY: AtomicU64 = AtomicU64::new(1);

impl Refkey {
    /// Allocates a fresh, unbound refkey.
    pub fn new() -> Self {
        Refkey(NEXT_REFKEY.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for Refkey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Refkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The operation a root type serves.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[allow(missing_docs, reason = "variant names are self-describing")]
pub enum OperationType {
    #[display("Query")]
    Query,
    #[display("Mutation")]
    Mutation,
    #[display("Subscription")]
    Subscription,
}

/// A reference to a GraphQL type as written at a declaration site.
///
/// References are polymorphic: a bare name, a forward-reference token, an
/// inline already-constructed definition, or a list/non-null wrapper around
/// any of those. They are collapsed into a canonical [`Type`] during
/// normalization.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeRef {
    /// A bare type name, resolved against the built-in scalar tables and the
    /// schema state.
    Named(ArcStr),
    /// A forward reference, resolved through the state's refkey table.
    Ref(Refkey),
    /// An inline definition that is not looked up at all.
    Inline(Arc<MetaType>),
    /// A list wrapper, e.g. `[Int]`.
    List(Box<TypeRef>),
    /// A non-null wrapper, e.g. `Int!`.
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    /// A reference by name.
    pub fn named(name: impl Into<ArcStr>) -> Self {
        TypeRef::Named(name.into())
    }

    /// Wraps a reference in a list.
    pub fn list(of: TypeRef) -> Self {
        TypeRef::List(Box::new(of))
    }

    /// Wraps a reference in a non-null marker.
    ///
    /// Wrapping a non-null reference in another non-null is a structural
    /// error and fails immediately, not at normalization time.
    pub fn non_null(of: TypeRef) -> Result<Self, SchemaError> {
        if matches!(of, TypeRef::NonNull(_)) {
            return Err(SchemaError::DoubleNonNull);
        }
        Ok(TypeRef::NonNull(Box::new(of)))
    }

    /// The member name this reference would occupy in a per-parent name set,
    /// if one can be determined without a full normalization pass. Inline
    /// definitions deliberately return `None` and bypass such sets.
    pub(crate) fn name_hint(&self, refkeys: &FnvHashMap<Refkey, ArcStr>) -> Option<ArcStr> {
        match self {
            TypeRef::Named(name) => Some(name.clone()),
            TypeRef::Ref(key) => refkeys.get(key).cloned(),
            TypeRef::Inline(_) => None,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.name_hint(refkeys),
        }
    }

    /// Renders the reference the way it would appear in SDL, resolving
    /// refkeys where a binding exists. Used for conformance keys, where an
    /// unresolved refkey must still produce a stable, non-matching string.
    pub(crate) fn render(&self, refkeys: &FnvHashMap<Refkey, ArcStr>) -> String {
        match self {
            TypeRef::Named(name) => name.to_string(),
            TypeRef::Ref(key) => refkeys
                .get(key)
                .map_or_else(|| format!("<unresolved {key}>"), ToString::to_string),
            TypeRef::Inline(meta) => meta.name().to_string(),
            TypeRef::List(inner) => format!("[{}]", inner.render(refkeys)),
            TypeRef::NonNull(inner) => format!("{}!", inner.render(refkeys)),
        }
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::named(name)
    }
}

impl From<ArcStr> for TypeRef {
    fn from(name: ArcStr) -> Self {
        TypeRef::Named(name)
    }
}

impl From<Refkey> for TypeRef {
    fn from(key: Refkey) -> Self {
        TypeRef::Ref(key)
    }
}

/// A fully resolved type descriptor.
///
/// This enum carries no semantic information beyond the shape of the
/// reference; the named type it bottoms out in is looked up by name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Type {
    /// A nullable named type, e.g. `String`.
    Named(ArcStr),
    /// A nullable list type, e.g. `[String]`.
    ///
    /// The list itself is what's nullable, the contained type might be
    /// non-null.
    List(Box<Type>),
    /// A non-null named type, e.g. `String!`.
    NonNullNamed(ArcStr),
    /// A non-null list type, e.g. `[String]!`.
    NonNullList(Box<Type>),
}

impl Type {
    /// The name of the named type the descriptor bottoms out in.
    pub fn innermost_name(&self) -> &str {
        match self {
            Type::Named(name) | Type::NonNullNamed(name) => name,
            Type::List(inner) | Type::NonNullList(inner) => inner.innermost_name(),
        }
    }

    /// Whether the outermost wrapper is non-null.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNullNamed(_) | Type::NonNullList(_))
    }

    pub(crate) fn innermost_arcstr(&self) -> &ArcStr {
        match self {
            Type::Named(name) | Type::NonNullNamed(name) => name,
            Type::List(inner) | Type::NonNullList(inner) => inner.innermost_arcstr(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(name) => write!(f, "{name}"),
            Type::List(inner) => write!(f, "[{inner}]"),
            Type::NonNullNamed(name) => write!(f, "{name}!"),
            Type::NonNullList(inner) => write!(f, "[{inner}]!"),
        }
    }
}

/// A constant value appearing in a default-value position.
///
/// Lists and objects nest; variables only occur beneath operation documents,
/// never in schema defaults.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs, reason = "variants mirror the GraphQL literal grammar")]
pub enum InputValue {
    Null,
    Int(i32),
    Float(f64),
    String(String),
    Boolean(bool),
    Enum(String),
    Variable(String),
    List(Vec<InputValue>),
    Object(Vec<(String, InputValue)>),
}

impl InputValue {
    /// Whether this is the explicit `null` literal.
    pub fn is_null(&self) -> bool {
        matches!(self, InputValue::Null)
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputValue::Null => f.write_str("null"),
            InputValue::Int(v) => write!(f, "{v}"),
            InputValue::Float(v) => {
                if v.fract() == 0.0 {
                    write!(f, "{v}.0")
                } else {
                    write!(f, "{v}")
                }
            }
            InputValue::String(s) => write_escaped(f, s),
            InputValue::Boolean(v) => write!(f, "{v}"),
            InputValue::Enum(v) => f.write_str(v),
            InputValue::Variable(v) => write!(f, "${v}"),
            InputValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            InputValue::Object(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}
