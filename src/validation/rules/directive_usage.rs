//! Render-time validation of directive applications.
//!
//! Each directive-bearing host (a type, field, argument, …) gets its own
//! [`DirectiveUsageContext`] tracking how often each directive was applied
//! there. Validation is fail-fast: the first violated check aborts the
//! render. Without an active context, or for a custom directive that cannot
//! be resolved anywhere in scope, validation is skipped silently.

use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error};
use fnv::FnvHashMap;
use indexmap::IndexMap;
use itertools::Itertools as _;

use crate::{
    ast::{InputValue, TypeRef},
    schema::{
        meta::DirectiveMeta,
        model::{DirectiveLocation, DirectiveType},
        state::SchemaState,
    },
};

/// Error raised at a directive application site.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum DirectiveUsageError {
    /// The directive is not legal at this location.
    #[display("Directive \"{name}\" cannot be used on {location}; valid locations are {valid}")]
    InvalidLocation {
        /// The directive name.
        name: ArcStr,
        /// Where it was applied.
        location: DirectiveLocation,
        /// The comma-joined legal locations, in declared order.
        valid: String,
    },

    /// A non-repeatable directive was applied twice to the same host.
    #[display("Directive \"{_0}\" is not repeatable and was already applied here")]
    NotRepeatable(#[error(not(source))] ArcStr),

    /// A required argument was not provided.
    #[display("Directive \"{name}\" is missing required argument \"{argument}\"")]
    MissingRequiredArgument {
        /// The directive name.
        name: ArcStr,
        /// The first missing required argument, in metadata order.
        argument: ArcStr,
    },

    /// An argument the directive does not declare was provided.
    #[display("Unknown argument \"{argument}\" on directive \"{name}\"; valid arguments are {valid}")]
    UnknownArgument {
        /// The directive name.
        name: ArcStr,
        /// The offending argument key.
        argument: ArcStr,
        /// The comma-joined declared argument names, or "none".
        valid: String,
    },
}

/// One link of the lexical scope chain searched for custom directive
/// declarations. A scope without a symbol table is member-only and skipped
/// during lookup.
pub struct Scope<'a> {
    parent: Option<&'a Scope<'a>>,
    directives: Option<&'a IndexMap<ArcStr, DirectiveMeta>>,
}

impl<'a> Scope<'a> {
    /// A root scope over a directive table.
    pub fn root(directives: &'a IndexMap<ArcStr, DirectiveMeta>) -> Self {
        Scope {
            parent: None,
            directives: Some(directives),
        }
    }

    /// The root scope of a render: the state's declared directives.
    pub fn for_state(state: &'a SchemaState) -> Self {
        Scope {
            parent: None,
            directives: Some(&state.directives),
        }
    }

    /// A nested scope with its own directive table.
    pub fn nested(parent: &'a Scope<'a>, directives: &'a IndexMap<ArcStr, DirectiveMeta>) -> Self {
        Scope {
            parent: Some(parent),
            directives: Some(directives),
        }
    }

    /// A member-only scope: contributes nothing to directive lookup.
    pub fn member_only(parent: &'a Scope<'a>) -> Self {
        Scope {
            parent: Some(parent),
            directives: None,
        }
    }

    fn lookup(&self, name: &str) -> Option<&DirectiveMeta> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(found) = current.directives.and_then(|table| table.get(name)) {
                return Some(found);
            }
            scope = current.parent;
        }
        None
    }
}

/// Per-host usage counter. One instance per directive-bearing location.
#[derive(Debug, Default)]
pub struct DirectiveUsageContext {
    used: FnvHashMap<ArcStr, usize>,
}

impl DirectiveUsageContext {
    /// A fresh counter for one host.
    pub fn new() -> Self {
        Self::default()
    }
}

struct ResolvedDirective {
    locations: Vec<DirectiveLocation>,
    repeatable: bool,
    /// `(name, required)` per declared argument; `None` means the argument
    /// checks are skipped entirely (specified directives).
    arguments: Option<Vec<(ArcStr, bool)>>,
}

fn resolve_metadata(scope: Option<&Scope<'_>>, name: &str) -> Option<ResolvedDirective> {
    if let Some(specified) = DirectiveType::specified(name) {
        return Some(ResolvedDirective {
            locations: specified.locations,
            repeatable: false,
            arguments: None,
        });
    }
    let meta = scope?.lookup(name)?;
    Some(ResolvedDirective {
        locations: meta.locations().to_vec(),
        repeatable: meta.repeatable,
        arguments: Some(
            meta.arguments()
                .iter()
                .map(|arg| {
                    (
                        arg.name.clone(),
                        matches!(arg.arg_type, TypeRef::NonNull(_)),
                    )
                })
                .collect(),
        ),
    })
}

/// Validates one directive application against its resolved metadata.
///
/// Checks run in order and fail fast: location, repeatability, required
/// arguments, unknown arguments. `ctx` is the per-host usage counter;
/// `None` skips validation entirely, supporting usage outside a validating
/// wrapper.
pub fn run_directive_validation(
    ctx: Option<&mut DirectiveUsageContext>,
    scope: Option<&Scope<'_>>,
    name: &str,
    location: DirectiveLocation,
    provided_args: &[(ArcStr, InputValue)],
) -> Result<(), DirectiveUsageError> {
    let Some(ctx) = ctx else {
        return Ok(());
    };
    let Some(directive) = resolve_metadata(scope, name) else {
        return Ok(());
    };
    let name = ArcStr::from(name);

    if !directive.locations.contains(&location) {
        let valid = if directive.locations.is_empty() {
            "none".to_owned()
        } else {
            directive.locations.iter().map(|l| l.as_str()).join(", ")
        };
        return Err(DirectiveUsageError::InvalidLocation {
            name,
            location,
            valid,
        });
    }

    let count = ctx.used.entry(name.clone()).or_insert(0);
    *count += 1;
    if !directive.repeatable && *count > 1 {
        return Err(DirectiveUsageError::NotRepeatable(name));
    }

    if let Some(arguments) = &directive.arguments {
        for (arg_name, required) in arguments {
            if *required && !provided_args.iter().any(|(provided, _)| provided == arg_name) {
                return Err(DirectiveUsageError::MissingRequiredArgument {
                    name,
                    argument: arg_name.clone(),
                });
            }
        }
        for (provided, _) in provided_args {
            if !arguments.iter().any(|(arg_name, _)| arg_name == provided) {
                let valid = if arguments.is_empty() {
                    "none".to_owned()
                } else {
                    arguments.iter().map(|(arg_name, _)| arg_name.as_str()).join(", ")
                };
                return Err(DirectiveUsageError::UnknownArgument {
                    name,
                    argument: provided.clone(),
                    valid,
                });
            }
        }
    }

    Ok(())
}
