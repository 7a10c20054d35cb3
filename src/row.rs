//! Dynamic row representation and attribute conversion.

use crate::error;

use aws_sdk_dynamodb::types;
use indexmap::IndexMap;
use serde::Serialize;
use serde_dynamo::{to_attribute_value, to_item};
use std::collections;

/// A dynamically typed row: an ordered mapping from attribute name to value.
///
/// Rows in the same table may carry different attribute sets; the only
/// attribute guaranteed to be present is the table's primary key. Attribute
/// order is preserved, which keeps generated expression placeholders stable.
///
/// ```rust
/// use dynamodb_tables::Row;
/// use serde_json::json;
///
/// let row: Row = serde_json::from_value(json!({
///     "user-id": "u1",
///     "region": "Somerset",
/// })).unwrap();
/// assert_eq!(row["region"], json!("Somerset"));
/// ```
pub type Row = IndexMap<String, serde_json::Value>;

/// Convert a row into the store's item representation.
pub(crate) fn to_store_item(
    row: Row,
) -> error::Result<collections::HashMap<String, types::AttributeValue>> {
    let item = to_item(row)?;
    Ok(item)
}

/// Convert a store item back into a row.
pub(crate) fn from_store_item(
    item: collections::HashMap<String, types::AttributeValue>,
) -> error::Result<Row> {
    let row = serde_dynamo::from_item(item)?;
    Ok(row)
}

/// Build the single-attribute key map identifying one row by primary key.
pub(crate) fn key_map<T: Serialize>(
    name: &str,
    value: T,
) -> error::Result<collections::HashMap<String, types::AttributeValue>> {
    let value = to_attribute_value(value)?;
    Ok(collections::HashMap::from([(name.to_string(), value)]))
}
