//! Deferred validation passes over a completed render.

mod context;
pub mod rules;

pub use self::context::{RuleError, RuleErrors, ValidatorContext};

use tracing::debug;

use crate::{
    name::PolicyFlavor,
    schema::{model::SchemaType, state::SchemaState},
};

/// Runs every validation queued on the state and returns the accumulated
/// errors. Never panics or short-circuits: each defect appears once, in
/// discovery order.
pub fn run_validations(state: &SchemaState) -> Vec<RuleError> {
    debug!(
        pending = state.pending_validations().len(),
        "running deferred validations"
    );
    let mut ctx = ValidatorContext::new();
    rules::implements_interfaces::validate(state, &mut ctx);
    ctx.into_errors()
}

/// Whole-schema assertion: the deferred conformance checks, plus the Relay
/// structural conventions when the active name policy is Relay-flavored.
pub fn assert_valid(state: &SchemaState, schema: &SchemaType) -> Result<(), RuleErrors> {
    let mut errors = run_validations(state);
    if state.name_policy().flavor() == PolicyFlavor::Relay {
        errors.extend(rules::relay::validate(schema));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(RuleErrors(errors))
    }
}
