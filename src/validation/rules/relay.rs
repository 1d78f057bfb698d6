//! Relay structural conventions, run when the active name policy is
//! Relay-flavored: `Node` implementors expose `id: ID!`, connection types
//! expose `edges` and `pageInfo`, and `PageInfo` carries the non-null
//! paging booleans.

use crate::{
    ast::Type,
    schema::model::{NamedType, ObjectType, SchemaType},
    validation::{RuleError, ValidatorContext},
};

pub(crate) fn validate(schema: &SchemaType) -> Vec<RuleError> {
    let mut ctx = ValidatorContext::new();
    for named in schema.type_list() {
        if let NamedType::Object(object) = named {
            check_node_implementor(object, &mut ctx);
            check_connection(object, &mut ctx);
            if object.name == "PageInfo" {
                check_page_info(object, &mut ctx);
            }
        }
    }
    ctx.into_errors()
}

fn check_node_implementor(object: &ObjectType, ctx: &mut ValidatorContext) {
    if !object.interfaces.iter().any(|i| i == "Node") {
        return;
    }
    let id_is_non_null_id = object
        .fields
        .get("id")
        .is_some_and(|f| f.field_type == Type::NonNullNamed(arcstr::literal!("ID")));
    if !id_is_non_null_id {
        ctx.report_error(format!(
            "Type \"{}\" must expose \"id: ID!\" to implement \"Node\".",
            object.name,
        ));
    }
}

fn check_connection(object: &ObjectType, ctx: &mut ValidatorContext) {
    if !object.name.ends_with("Connection") || object.name.as_str() == "Connection" {
        return;
    }
    if !object.fields.contains_key("edges") || !object.fields.contains_key("pageInfo") {
        ctx.report_error(format!(
            "Connection type \"{}\" must define \"edges\" and \"pageInfo\".",
            object.name,
        ));
    }
}

fn check_page_info(object: &ObjectType, ctx: &mut ValidatorContext) {
    let boolean = Type::NonNullNamed(arcstr::literal!("Boolean"));
    let ok = ["hasNextPage", "hasPreviousPage"].iter().all(|name| {
        object
            .fields
            .get(*name)
            .is_some_and(|f| f.field_type == boolean)
    });
    if !ok {
        ctx.report_error(
            "Type \"PageInfo\" must define \"hasNextPage: Boolean!\" and \"hasPreviousPage: Boolean!\".",
        );
    }
}
