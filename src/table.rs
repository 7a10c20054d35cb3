//! Table operations: lookups, writes, updates, atomic deltas, scans.

use crate::{error, expression, lookup, result, row};

use aws_sdk_dynamodb::{Client, types};
use serde::Serialize;
use std::collections;

/// The arithmetic a relative update applies to the stored value.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Delta {
    /// Add the delta to the stored value.
    Add,
    /// Subtract the delta from the stored value.
    Subtract,
}

impl Delta {
    pub(crate) fn operator(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
        }
    }
}

/// Arguments for lookup operations (`get`, `there_exists`).
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct LookupArgs {
    /// Whether to use a strongly consistent read.
    ///
    /// Honored for primary-key lookups. For secondary-index queries the flag
    /// is passed through, but global secondary indexes do not support strong
    /// consistency; the store decides, not this crate.
    pub consistent_read: Option<bool>,
    /// An explicit secondary index name.
    ///
    /// When unset, a lookup column other than the primary key queries the
    /// index named after the column.
    pub index_name: Option<String>,
}

/// Arguments for `scan`.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ScanArgs {
    /// Whether to use a strongly consistent read.
    pub consistent_read: Option<bool>,
}

/// One named collection of rows in the backing store.
///
/// A table holds nothing beyond its descriptor and a shared client handle;
/// the store, not this object, is the source of truth, so tables are safe to
/// discard and recreate at any time.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_tables::{LookupArgs, Table};
///
/// # async fn example(client: Client) -> Result<(), dynamodb_tables::Error> {
/// let users = Table::new(client, "users", "user-id");
/// let result = users.get("user-id", "u1", LookupArgs::default()).await?;
/// if result.exists() {
///     println!("{:?}", result.first()?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Table {
    client: Client,
    name: String,
    primary_key: String,
}

impl Table {
    /// Bind a table descriptor to a shared client.
    ///
    /// `primary_key` must be the partition key attribute defined by the
    /// table's schema; it is not re-validated locally.
    pub fn new(client: Client, name: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
            primary_key: primary_key.into(),
        }
    }

    /// The table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The primary key attribute name.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Look up rows where `key` equals `equals`.
    ///
    /// When `key` is the table's primary key this is a direct point lookup;
    /// any other column queries the secondary index named after it (or the
    /// index named in `args`). Fails with [`error::Error::IndexNotFound`]
    /// when the store has no such index. The result may hold zero, one, or
    /// more rows; uniqueness is never assumed, even for primary-key lookups.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_tables.get", skip(equals), err)
    )]
    pub async fn get<T: Serialize>(
        &self,
        key: &str,
        equals: T,
        args: LookupArgs,
    ) -> error::Result<result::QueryResult> {
        let lookup = lookup::Lookup::resolve(&self.primary_key, key, args.index_name.as_deref());
        self.query(key, equals, &lookup, args.consistent_read).await
    }

    /// Whether any row has `a_value` at `at_column`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_tables.there_exists", skip(a_value), err)
    )]
    pub async fn there_exists<T: Serialize>(
        &self,
        a_value: T,
        at_column: &str,
        args: LookupArgs,
    ) -> error::Result<bool> {
        let matched = self.get(at_column, a_value, args).await?;
        Ok(matched.exists())
    }

    /// Put the full row, replacing any existing row with the same primary
    /// key in its entirety.
    ///
    /// This is a whole-row replacement, not a merge, and no existence check
    /// is performed: last write wins. Fails with
    /// [`error::Error::MissingPrimaryKey`] before any network call when
    /// `values` lacks the primary key attribute.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_tables.write", err)
    )]
    pub async fn write(&self, values: row::Row) -> error::Result<()> {
        if !values.contains_key(&self.primary_key) {
            return Err(error::Error::MissingPrimaryKey(self.primary_key.clone()));
        }
        let item = row::to_store_item(values)?;
        self.client
            .put_item()
            .table_name(&self.name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(error::Error::store)?;
        Ok(())
    }

    /// Delete the row whose primary key equals `equals`.
    ///
    /// Deleting a row that does not exist is not an error.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_tables.delete", skip(equals), err)
    )]
    pub async fn delete<T: Serialize>(&self, equals: T) -> error::Result<()> {
        let key = row::key_map(&self.primary_key, equals)?;
        self.client
            .delete_item()
            .table_name(&self.name)
            .set_key(Some(key))
            .send()
            .await
            .map_err(error::Error::store)?;
        Ok(())
    }

    /// Merge `data_to_update` into the row(s) where `where_column` equals
    /// `equals`.
    ///
    /// Fields named in `data_to_update` are overwritten or created; fields
    /// absent from it are preserved. Fails with
    /// [`error::Error::RowNotFound`] when nothing matches; an empty
    /// `data_to_update` is a no-op.
    ///
    /// When `where_column` is a secondary index, the primary key of each
    /// matching row is resolved with a lookup first and one update is issued
    /// per resolved row. That costs an extra round trip, and the lookup and
    /// the update are not atomic with respect to each other.
    ///
    /// Mutating the primary key attribute through this path is unsupported;
    /// renaming a row's identity requires an explicit get, write, delete
    /// sequence performed by the caller.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_tables.update", skip(equals), err)
    )]
    pub async fn update<T: Serialize>(
        &self,
        where_column: &str,
        equals: T,
        data_to_update: row::Row,
    ) -> error::Result<()> {
        if data_to_update.is_empty() {
            return Ok(());
        }
        let assignments = expression::set_assignments(data_to_update)?;
        self.apply_update(where_column, equals, assignments, None)
            .await
    }

    /// Atomically add or subtract `by` on `update_field` of the row(s) where
    /// `key` equals `equals`.
    ///
    /// The delta is resolved and applied entirely inside the store as one
    /// indivisible operation, never as a local read-modify-write, so
    /// concurrent callers cannot lose updates. Fails with
    /// [`error::Error::RowNotFound`] when nothing matches and with
    /// [`error::Error::FieldType`] when the stored value is missing or
    /// non-numeric.
    /// Secondary-index resolution behaves as in [`Table::update`], including
    /// the extra round trip.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_tables.relative_update", skip(equals), err)
    )]
    pub async fn relative_update<T: Serialize>(
        &self,
        key: &str,
        equals: T,
        update_field: &str,
        by: serde_json::Number,
        using_operation: Delta,
    ) -> error::Result<()> {
        let operation = expression::set_delta(update_field, by, using_operation)?;
        self.apply_update(key, equals, operation, Some(update_field))
            .await
    }

    /// [`Table::relative_update`] with [`Delta::Add`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_tables.increment", skip(equals, by), err)
    )]
    pub async fn increment<T: Serialize>(
        &self,
        key: &str,
        equals: T,
        update_field: &str,
        by: impl Into<serde_json::Number>,
    ) -> error::Result<()> {
        self.relative_update(key, equals, update_field, by.into(), Delta::Add)
            .await
    }

    /// [`Table::relative_update`] with [`Delta::Subtract`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_tables.decrement", skip(equals, by), err)
    )]
    pub async fn decrement<T: Serialize>(
        &self,
        key: &str,
        equals: T,
        update_field: &str,
        by: impl Into<serde_json::Number>,
    ) -> error::Result<()> {
        self.relative_update(key, equals, update_field, by.into(), Delta::Subtract)
            .await
    }

    /// Retrieve every row in the table.
    ///
    /// Store-side pagination is exhausted transparently; callers always see
    /// one logical result, never a partial page.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_tables.scan", err)
    )]
    pub async fn scan(&self, args: ScanArgs) -> error::Result<result::QueryResult> {
        let builder = self
            .client
            .scan()
            .table_name(&self.name)
            .set_consistent_read(args.consistent_read);
        let mut paginator = builder.into_paginator().send();
        let mut rows = Vec::new();
        while let Some(page) = paginator.next().await {
            let page = page.map_err(error::Error::store)?;
            if let Some(items) = page.items {
                for item in items {
                    rows.push(row::from_store_item(item)?);
                }
            }
        }
        Ok(result::QueryResult::from(rows))
    }

    /// Run the equality query for a resolved lookup, exhausting pagination.
    async fn query<T: Serialize>(
        &self,
        key: &str,
        equals: T,
        lookup: &lookup::Lookup,
        consistent_read: Option<bool>,
    ) -> error::Result<result::QueryResult> {
        let condition = expression::key_condition(key, equals)?;
        let builder = self
            .client
            .query()
            .table_name(&self.name)
            .key_condition_expression(condition.expression)
            .set_expression_attribute_names(Some(condition.expression_attribute_names))
            .set_expression_attribute_values(Some(condition.expression_attribute_values))
            .set_index_name(lookup.index_name())
            .set_consistent_read(consistent_read);
        let mut paginator = builder.into_paginator().send();
        let mut rows = Vec::new();
        while let Some(page) = paginator.next().await {
            let page =
                page.map_err(|err| error::Error::from_query(err, lookup, consistent_read))?;
            if let Some(items) = page.items {
                for item in items {
                    rows.push(row::from_store_item(item)?);
                }
            }
        }
        Ok(result::QueryResult::from(rows))
    }

    /// Route an update expression through lookup resolution.
    async fn apply_update<T: Serialize>(
        &self,
        where_column: &str,
        equals: T,
        operation: expression::ExpressionInput,
        delta_field: Option<&str>,
    ) -> error::Result<()> {
        let lookup = lookup::Lookup::resolve(&self.primary_key, where_column, None);
        match &lookup {
            lookup::Lookup::PrimaryKey => {
                let key = row::key_map(&self.primary_key, equals)?;
                self.send_update(key, operation, where_column, delta_field)
                    .await
            }
            lookup::Lookup::SecondaryIndex { .. } => {
                let keys = self
                    .resolve_primary_keys(where_column, equals, &lookup)
                    .await?;
                for key in keys {
                    self.send_update(key, operation.clone(), where_column, delta_field)
                        .await?;
                }
                Ok(())
            }
        }
    }

    /// Discover the primary key value(s) behind a secondary-index match.
    ///
    /// This is the extra round trip a secondary-index mutation pays; it
    /// fails before any write is issued when nothing matches.
    async fn resolve_primary_keys<T: Serialize>(
        &self,
        key: &str,
        equals: T,
        lookup: &lookup::Lookup,
    ) -> error::Result<Vec<collections::HashMap<String, types::AttributeValue>>> {
        let matched = self.query(key, equals, lookup, None).await?;
        if !matched.exists() {
            return Err(error::Error::RowNotFound(key.to_string()));
        }
        let mut keys = Vec::with_capacity(matched.len());
        for row in &matched {
            let value = row
                .get(&self.primary_key)
                .ok_or_else(|| error::Error::MissingPrimaryKey(self.primary_key.clone()))?;
            keys.push(row::key_map(&self.primary_key, value)?);
        }
        Ok(keys)
    }

    /// Issue one conditional update against a resolved primary key.
    ///
    /// The `attribute_exists` guard turns the store's upsert-by-default
    /// behavior into update-or-fail.
    async fn send_update(
        &self,
        key: collections::HashMap<String, types::AttributeValue>,
        operation: expression::ExpressionInput,
        where_column: &str,
        delta_field: Option<&str>,
    ) -> error::Result<()> {
        let guard = expression::exists_condition(&self.primary_key);
        let mut names = operation.expression_attribute_names;
        names.extend(guard.expression_attribute_names);
        self.client
            .update_item()
            .table_name(&self.name)
            .set_key(Some(key))
            .update_expression(operation.expression)
            .condition_expression(guard.expression)
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(operation.expression_attribute_values))
            .send()
            .await
            .map_err(|err| error::Error::from_update(err, where_column, delta_field))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::json;

    fn offline_client() -> Client {
        let config = aws_sdk_dynamodb::config::Config::builder()
            .behavior_version(aws_sdk_dynamodb::config::BehaviorVersion::latest())
            .build();
        Client::from_conf(config)
    }

    #[rstest]
    fn test_descriptor_accessors() {
        let table = Table::new(offline_client(), "users", "user-id");
        assert_eq!(table.name(), "users");
        assert_eq!(table.primary_key(), "user-id");
    }

    #[tokio::test]
    async fn test_write_without_primary_key_fails_before_any_request() {
        let table = Table::new(offline_client(), "users", "user-id");
        let row: row::Row =
            serde_json::from_value(json!({"region": "Somerset"})).unwrap();
        let err = table.write(row).await.unwrap_err();
        assert!(matches!(
            err,
            error::Error::MissingPrimaryKey(attribute) if attribute == "user-id"
        ));
    }

    #[tokio::test]
    async fn test_update_with_no_data_is_a_no_op() {
        let table = Table::new(offline_client(), "users", "user-id");
        table
            .update("user-id", "u1", row::Row::new())
            .await
            .unwrap();
    }

    #[rstest]
    #[case::add(Delta::Add, "+")]
    #[case::subtract(Delta::Subtract, "-")]
    fn test_delta_operator(#[case] delta: Delta, #[case] expected: &str) {
        assert_eq!(delta.operator(), expected);
    }
}
