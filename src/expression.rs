//! Expression and placeholder building for queries and updates.
//!
//! Attribute names and values never appear literally in expressions; each is
//! routed through a positional placeholder (`#f0`, `:v0`). Positional
//! placeholders are required because attribute names handled by this crate
//! may contain characters that are illegal in expression aliases (the default
//! key-value column is `data-id`).

use crate::{error, row, table};

use aws_sdk_dynamodb::types;
use serde::Serialize;
use serde_dynamo::to_attribute_value;
use std::collections;

/// A built expression with its placeholder mappings.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ExpressionInput {
    pub(crate) expression: String,
    pub(crate) expression_attribute_names: collections::HashMap<String, String>,
    pub(crate) expression_attribute_values: collections::HashMap<String, types::AttributeValue>,
}

/// Build the equality key condition `#k0 = :k0` for a lookup.
pub(crate) fn key_condition<T: Serialize>(name: &str, value: T) -> error::Result<ExpressionInput> {
    let value = to_attribute_value(value)?;
    Ok(ExpressionInput {
        expression: "#k0 = :k0".to_string(),
        expression_attribute_names: collections::HashMap::from([(
            "#k0".to_string(),
            name.to_string(),
        )]),
        expression_attribute_values: collections::HashMap::from([(":k0".to_string(), value)]),
    })
}

/// Build the `SET` assignment list merging `data` into an existing row.
///
/// Fields named in `data` are overwritten or created; fields absent from it
/// are untouched by the resulting expression.
pub(crate) fn set_assignments(data: row::Row) -> error::Result<ExpressionInput> {
    let mut fragments = Vec::with_capacity(data.len());
    let mut expression_attribute_names = collections::HashMap::with_capacity(data.len());
    let mut expression_attribute_values = collections::HashMap::with_capacity(data.len());
    for (index, (name, value)) in data.into_iter().enumerate() {
        let name_placeholder = format!("#f{index}");
        let value_placeholder = format!(":v{index}");
        fragments.push(format!("{name_placeholder} = {value_placeholder}"));
        expression_attribute_names.insert(name_placeholder, name);
        expression_attribute_values.insert(value_placeholder, to_attribute_value(value)?);
    }
    Ok(ExpressionInput {
        expression: format!("SET {}", fragments.join(", ")),
        expression_attribute_names,
        expression_attribute_values,
    })
}

/// Build the single atomic delta expression `SET #f0 = #f0 <op> :v0`.
///
/// The read and rewrite of the field happen inside the store as one
/// indivisible operation; this is what makes concurrent increments safe.
pub(crate) fn set_delta(
    field: &str,
    by: serde_json::Number,
    operation: table::Delta,
) -> error::Result<ExpressionInput> {
    let by = to_attribute_value(by)?;
    Ok(ExpressionInput {
        expression: format!("SET #f0 = #f0 {} :v0", operation.operator()),
        expression_attribute_names: collections::HashMap::from([(
            "#f0".to_string(),
            field.to_string(),
        )]),
        expression_attribute_values: collections::HashMap::from([(":v0".to_string(), by)]),
    })
}

/// Build the `attribute_exists(#pk)` guard that turns the store's
/// upsert-by-default updates into update-or-fail.
pub(crate) fn exists_condition(attribute: &str) -> ExpressionInput {
    ExpressionInput {
        expression: "attribute_exists(#pk)".to_string(),
        expression_attribute_names: collections::HashMap::from([(
            "#pk".to_string(),
            attribute.to_string(),
        )]),
        expression_attribute_values: collections::HashMap::new(),
    }
}
