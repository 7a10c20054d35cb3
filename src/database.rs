//! Database factory and named key-value registry.

use crate::{error, key_value, table};

use aws_sdk_dynamodb::{Client, types};
use std::collections;

/// The alias under which the conventional globals table is registered.
pub const GLOBALS_ALIAS: &str = "globals";

/// A key-value table registration held by the database registry.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct NamedTable {
    /// Column name overrides for the registered table.
    pub args: key_value::KeyValueArgs,
    /// The name of the backing store table.
    pub table_name: String,
}

/// Factory handing out tables bound to one shared client.
///
/// The client is created once per database and lives for its lifetime
/// (in practice, the process lifetime). Tables are constructed on demand and
/// not cached; repeated calls may return distinct objects referencing the
/// same underlying store table.
///
/// ```rust,no_run
/// use dynamodb_tables::{Database, KeyValueArgs};
///
/// # async fn example() -> Result<(), dynamodb_tables::Error> {
/// let database = Database::from_env().await;
/// let users = database.table("users").await?;
/// let settings = database
///     .key_value_table("settings", KeyValueArgs::default())
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Database {
    client: Client,
    named_tables: collections::HashMap<String, NamedTable>,
}

impl Database {
    /// Create a database over an existing client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            named_tables: collections::HashMap::new(),
        }
    }

    /// Create a database from the ambient AWS configuration
    /// (environment, profile, instance role).
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }

    /// Create a database with a globals table already registered.
    pub fn with_globals(
        client: Client,
        table_name: impl Into<String>,
        args: key_value::KeyValueArgs,
    ) -> Self {
        let mut database = Self::new(client);
        database.register(
            GLOBALS_ALIAS,
            NamedTable {
                args,
                table_name: table_name.into(),
            },
        );
        database
    }

    /// Register a key-value table under an alias.
    pub fn register(&mut self, alias: impl Into<String>, named: NamedTable) {
        self.named_tables.insert(alias.into(), named);
    }

    /// The registration held under `alias`, if any.
    pub fn registration(&self, alias: &str) -> Option<&NamedTable> {
        self.named_tables.get(alias)
    }

    /// The shared client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Bind a table, discovering its primary key attribute from the store's
    /// schema with one DescribeTable call.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_tables.table", err)
    )]
    pub async fn table(&self, name: &str) -> error::Result<table::Table> {
        let primary_key = self.primary_key_of(name).await?;
        Ok(table::Table::new(self.client.clone(), name, primary_key))
    }

    /// Bind a key-value table with the given column overrides.
    pub async fn key_value_table(
        &self,
        name: &str,
        args: key_value::KeyValueArgs,
    ) -> error::Result<key_value::KeyValueTable> {
        let table = self.table(name).await?;
        Ok(key_value::KeyValueTable::new(table, args))
    }

    /// Bind the key-value table registered under `alias`.
    ///
    /// Fails with [`error::Error::GlobalsNotConfigured`] when nothing is
    /// registered under the alias.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_tables.named_table", err)
    )]
    pub async fn named_table(&self, alias: &str) -> error::Result<key_value::KeyValueTable> {
        let named = self
            .named_tables
            .get(alias)
            .ok_or_else(|| error::Error::GlobalsNotConfigured(alias.to_string()))?;
        self.key_value_table(&named.table_name, named.args.clone())
            .await
    }

    /// Bind the table registered under [`GLOBALS_ALIAS`].
    pub async fn globals(&self) -> error::Result<key_value::KeyValueTable> {
        self.named_table(GLOBALS_ALIAS).await
    }

    async fn primary_key_of(&self, name: &str) -> error::Result<String> {
        let output = self
            .client
            .describe_table()
            .table_name(name)
            .send()
            .await
            .map_err(error::Error::store)?;
        output
            .table
            .and_then(|description| description.key_schema)
            .and_then(|schema| {
                schema
                    .into_iter()
                    .find(|element| element.key_type == types::KeyType::Hash)
                    .map(|element| element.attribute_name)
            })
            .ok_or_else(|| error::Error::UnknownPrimaryKey(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn offline_client() -> Client {
        let config = aws_sdk_dynamodb::config::Config::builder()
            .behavior_version(aws_sdk_dynamodb::config::BehaviorVersion::latest())
            .build();
        Client::from_conf(config)
    }

    #[rstest]
    fn test_with_globals_registers_the_alias() {
        let database = Database::with_globals(
            offline_client(),
            "global-data-table",
            key_value::KeyValueArgs::default(),
        );
        let named = database.registration(GLOBALS_ALIAS).unwrap();
        assert_eq!(named.table_name, "global-data-table");
        assert_eq!(named.args, key_value::KeyValueArgs::default());
        assert!(database.registration("other").is_none());
    }

    #[rstest]
    fn test_register_replaces_an_existing_alias() {
        let mut database = Database::new(offline_client());
        database.register(
            "settings",
            NamedTable {
                table_name: "settings-v1".to_string(),
                ..Default::default()
            },
        );
        database.register(
            "settings",
            NamedTable {
                table_name: "settings-v2".to_string(),
                ..Default::default()
            },
        );
        let named = database.registration("settings").unwrap();
        assert_eq!(named.table_name, "settings-v2");
    }

    #[tokio::test]
    async fn test_globals_requires_a_registration() {
        let database = Database::new(offline_client());
        let err = database.globals().await.unwrap_err();
        assert!(matches!(
            err,
            error::Error::GlobalsNotConfigured(alias) if alias == GLOBALS_ALIAS
        ));
    }
}
