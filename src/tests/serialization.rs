use crate::{DirectiveLocation, RuleError};

#[test]
fn rule_errors_serialize_with_their_message() {
    let error = RuleError::new("Type \"User\" does not correctly implement interface \"Node\".");
    assert_eq!(
        serde_json::to_string(&error).unwrap(),
        r#"{"message":"Type \"User\" does not correctly implement interface \"Node\"."}"#,
    );
}

#[test]
fn directive_locations_serialize_in_sdl_spelling() {
    assert_eq!(
        serde_json::to_string(&DirectiveLocation::FieldDefinition).unwrap(),
        r#""FIELD_DEFINITION""#,
    );
}
