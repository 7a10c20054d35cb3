//! Two-column key-value table specialization.

use crate::{error, row, table};

use serde_json::{Number, Value};

/// The default key column name.
pub const DEFAULT_KEY_COLUMN: &str = "data-id";

/// The default value column name.
pub const DEFAULT_VALUE_COLUMN: &str = "value";

/// Column name overrides for a key-value table.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct KeyValueArgs {
    /// The key column name; defaults to [`DEFAULT_KEY_COLUMN`].
    pub key_column: Option<String>,
    /// The value column name; defaults to [`DEFAULT_VALUE_COLUMN`].
    pub value_column: Option<String>,
}

/// A table constrained to a two-column (key, value) shape.
///
/// Every row holds exactly the configured key and value attributes. The
/// relative-update operations are re-bound to those columns here, so counters
/// stored in the value column stay atomic under concurrent callers.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_tables::{KeyValueArgs, KeyValueTable, Table};
/// use serde_json::json;
///
/// # async fn example(client: Client) -> Result<(), dynamodb_tables::Error> {
/// let table = Table::new(client, "global-data-table", "data-id");
/// let globals = KeyValueTable::new(table, KeyValueArgs::default());
/// globals.set("motd", "hello").await?;
/// assert_eq!(globals.value("motd").await?, json!("hello"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct KeyValueTable {
    key_column: String,
    table: table::Table,
    value_column: String,
}

impl KeyValueTable {
    /// Specialize a table to the two-column shape.
    pub fn new(table: table::Table, args: KeyValueArgs) -> Self {
        Self {
            key_column: args
                .key_column
                .unwrap_or_else(|| DEFAULT_KEY_COLUMN.to_string()),
            table,
            value_column: args
                .value_column
                .unwrap_or_else(|| DEFAULT_VALUE_COLUMN.to_string()),
        }
    }

    /// The key column name.
    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// The value column name.
    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    /// The underlying table, for operations beyond the key-value surface.
    pub fn table(&self) -> &table::Table {
        &self.table
    }

    /// The value stored under `for_key`.
    ///
    /// Fails with [`error::Error::RowNotFound`] when no row holds `for_key`,
    /// or when the matched row lacks the value column.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_tables.value", skip(for_key), err)
    )]
    pub async fn value(&self, for_key: impl Into<Value>) -> error::Result<Value> {
        let matched = self
            .table
            .get(&self.key_column, for_key.into(), table::LookupArgs::default())
            .await?;
        if !matched.exists() {
            return Err(error::Error::RowNotFound(self.key_column.clone()));
        }
        let row = matched.first()?;
        row.get(&self.value_column)
            .cloned()
            .ok_or_else(|| error::Error::RowNotFound(self.value_column.clone()))
    }

    /// Store `new_value` under `for_key`, creating or replacing the pair.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_tables.set", skip(for_key, new_value), err)
    )]
    pub async fn set(
        &self,
        for_key: impl Into<Value>,
        new_value: impl Into<Value>,
    ) -> error::Result<()> {
        let values = self.pair(for_key.into(), new_value.into());
        self.table.write(values).await
    }

    /// Atomically add or subtract `by` on the value stored under `for_key`.
    ///
    /// Same contract as [`table::Table::relative_update`], bound to this
    /// table's configured key and value columns.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_tables.relative_update", skip(for_key), err)
    )]
    pub async fn relative_update(
        &self,
        for_key: impl Into<Value>,
        by: Number,
        using_operation: table::Delta,
    ) -> error::Result<()> {
        let (key_column, value_column) = self.delta_columns();
        self.table
            .relative_update(key_column, for_key.into(), value_column, by, using_operation)
            .await
    }

    /// [`KeyValueTable::relative_update`] with [`table::Delta::Add`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_tables.increment", skip(for_key, by), err)
    )]
    pub async fn increment(
        &self,
        for_key: impl Into<Value>,
        by: impl Into<Number>,
    ) -> error::Result<()> {
        self.relative_update(for_key, by.into(), table::Delta::Add)
            .await
    }

    /// [`KeyValueTable::relative_update`] with [`table::Delta::Subtract`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_tables.decrement", skip(for_key, by), err)
    )]
    pub async fn decrement(
        &self,
        for_key: impl Into<Value>,
        by: impl Into<Number>,
    ) -> error::Result<()> {
        self.relative_update(for_key, by.into(), table::Delta::Subtract)
            .await
    }

    /// The (key, value) column pair relative updates are bound to.
    fn delta_columns(&self) -> (&str, &str) {
        (&self.key_column, &self.value_column)
    }

    /// Shape a (key, value) pair as a full row.
    fn pair(&self, for_key: Value, new_value: Value) -> row::Row {
        let mut values = row::Row::new();
        values.insert(self.key_column.clone(), for_key);
        values.insert(self.value_column.clone(), new_value);
        values
    }
}
