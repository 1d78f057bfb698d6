//! Conversions from a built schema into external representations.

use crate::schema::model::SchemaType;

pub mod sdl;

/// Translates a built schema into another schema representation.
pub trait SchemaTranslator<T> {
    /// Performs the translation.
    fn translate_schema(schema: &SchemaType) -> T;
}
