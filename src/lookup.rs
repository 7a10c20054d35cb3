//! Primary-key versus secondary-index lookup resolution.

/// How a caller-supplied lookup column resolves against a table.
///
/// Constructed once per call from the table descriptor and the caller's
/// column name, so the two code paths in `get`, `update`, and
/// `relative_update` are exhaustive rather than inferred ad hoc.
///
/// ```rust
/// use dynamodb_tables::Lookup;
///
/// let lookup = Lookup::resolve("user-id", "username", None);
/// assert_eq!(
///     lookup,
///     Lookup::SecondaryIndex {
///         index_name: "username".to_string(),
///     },
/// );
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Lookup {
    /// Equality on the table's primary key; a direct point lookup.
    PrimaryKey,
    /// A query against a named secondary index; costs the store an index
    /// read, and mutations through it an extra resolution round trip.
    SecondaryIndex {
        /// The name of the secondary index to query.
        index_name: String,
    },
}

impl Lookup {
    /// Resolve a lookup column against a table's primary key attribute.
    ///
    /// An explicit `index_name` always forces the secondary-index path.
    /// Otherwise a column matching the primary key resolves directly, and
    /// any other column is treated as a secondary index named after it.
    pub fn resolve(primary_key: &str, column: &str, index_name: Option<&str>) -> Self {
        match index_name {
            Some(index_name) => Self::SecondaryIndex {
                index_name: index_name.to_string(),
            },
            None if column == primary_key => Self::PrimaryKey,
            None => Self::SecondaryIndex {
                index_name: column.to_string(),
            },
        }
    }

    /// The index name to set on a query, if any.
    pub(crate) fn index_name(&self) -> Option<String> {
        match self {
            Self::PrimaryKey => None,
            Self::SecondaryIndex { index_name } => Some(index_name.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::primary_key("user-id", "user-id", None, Lookup::PrimaryKey)]
    #[case::secondary_index_named_after_column(
        "user-id",
        "username",
        None,
        Lookup::SecondaryIndex {
            index_name: "username".to_string(),
        }
    )]
    #[case::explicit_index_name(
        "user-id",
        "username",
        Some("username-index"),
        Lookup::SecondaryIndex {
            index_name: "username-index".to_string(),
        }
    )]
    #[case::explicit_index_name_wins_over_primary_key(
        "user-id",
        "user-id",
        Some("user-id-index"),
        Lookup::SecondaryIndex {
            index_name: "user-id-index".to_string(),
        }
    )]
    fn test_resolve(
        #[case] primary_key: &str,
        #[case] column: &str,
        #[case] index_name: Option<&str>,
        #[case] expected: Lookup,
    ) {
        let actual = Lookup::resolve(primary_key, column, index_name);
        assert_eq!(actual, expected);
    }

    #[rstest]
    fn test_index_name() {
        assert_eq!(Lookup::PrimaryKey.index_name(), None);
        let lookup = Lookup::SecondaryIndex {
            index_name: "username".to_string(),
        };
        assert_eq!(lookup.index_name(), Some("username".to_string()));
    }
}
