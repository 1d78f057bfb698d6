//! The individual validation rules, one module each.

pub mod directive_usage;
pub mod implements_interfaces;
pub mod relay;
pub mod type_positions;
