//! End-to-end scenarios exercising the full construct → build → validate →
//! emit flow.

mod serialization;
