//! Error taxonomy for table and row operations.
//!
//! Every failure kind callers may want to branch on has its own variant, so
//! calling code can distinguish "not found" from "misconfigured" from "bad
//! input" without inspecting message strings. Errors are surfaced immediately;
//! nothing is retried or swallowed.

use crate::lookup;

use aws_sdk_dynamodb::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::operation::{query, update_item};

/// The error code DynamoDB reports for malformed or ill-typed requests.
const VALIDATION_EXCEPTION: &str = "ValidationException";

/// A specialized result type for table and row operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for table and row operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A row accessor was called on a result containing zero rows.
    #[error("result contains no rows")]
    EmptyResult,

    /// A relative update targeted a field that is missing or non-numeric.
    ///
    /// The store reports both cases with one error code, so they share an
    /// identity here.
    #[error("field `{0}` is missing or does not hold a numeric value")]
    FieldType(String),

    /// No key-value table is registered under the requested alias.
    #[error("no key-value table registered under alias `{0}`")]
    GlobalsNotConfigured(String),

    /// The requested secondary index does not exist on the table.
    #[error("secondary index `{0}` does not exist on the table")]
    IndexNotFound(String),

    /// A row was written without the table's primary key attribute.
    #[error("row is missing the primary key attribute `{0}`")]
    MissingPrimaryKey(String),

    /// A positional accessor was called with an index past the last row.
    #[error("index {index} is out of range for a result of {length} rows")]
    OutOfRange {
        /// The requested position.
        index: usize,
        /// The number of rows in the result.
        length: usize,
    },

    /// No row matched the requested lookup column and value.
    #[error("no row matched `{0}`")]
    RowNotFound(String),

    /// A row could not be converted to or from store attribute values.
    #[error("failed to convert between rows and store attributes: {0}")]
    Serialization(#[from] serde_dynamo::Error),

    /// The backing store reported an error that has no local interpretation.
    #[error("the row store reported an error: {0}")]
    Store(#[from] aws_sdk_dynamodb::Error),

    /// The table's schema did not expose a partition key attribute.
    #[error("could not determine the primary key attribute of table `{0}`")]
    UnknownPrimaryKey(String),
}

impl Error {
    /// Normalize any SDK failure into the store's unified error type.
    pub(crate) fn store<E>(err: E) -> Self
    where
        aws_sdk_dynamodb::Error: From<E>,
    {
        Self::Store(err.into())
    }

    /// Classify a query failure.
    ///
    /// DynamoDB rejects a query against a non-existent index with a
    /// `ValidationException`; on the secondary-index path that is an
    /// [`Error::IndexNotFound`], anywhere else it is passed through.
    pub(crate) fn from_query(
        err: SdkError<query::QueryError>,
        lookup: &lookup::Lookup,
        consistent_read: Option<bool>,
    ) -> Self {
        if let Some(index_name) = missing_index(err.code(), lookup, consistent_read) {
            return Self::IndexNotFound(index_name);
        }
        Self::store(err)
    }

    /// Classify an update failure.
    ///
    /// Every update issued by this crate carries an `attribute_exists` guard
    /// on the primary key, so a failed condition check means the target row
    /// does not exist. When the update was a relative delta (`delta_field` is
    /// set), a `ValidationException` means the stored value is missing or
    /// non-numeric; the store does not distinguish the two.
    pub(crate) fn from_update(
        err: SdkError<update_item::UpdateItemError>,
        where_column: &str,
        delta_field: Option<&str>,
    ) -> Self {
        let err = err.into_service_error();
        if matches!(
            err,
            update_item::UpdateItemError::ConditionalCheckFailedException(_)
        ) {
            return Self::RowNotFound(where_column.to_string());
        }
        if let Some(field) = delta_field {
            if err.code() == Some(VALIDATION_EXCEPTION) {
                return Self::FieldType(field.to_string());
            }
        }
        Self::store(err)
    }
}

/// The index a failed query names as missing, if the failure identifies one.
///
/// A `ValidationException` on the secondary-index path usually means the
/// index does not exist, but a consistent read against a global secondary
/// index fails with the same code; when the caller asked for one, the error
/// passes through untouched.
fn missing_index(
    code: Option<&str>,
    lookup: &lookup::Lookup,
    consistent_read: Option<bool>,
) -> Option<String> {
    match lookup {
        lookup::Lookup::SecondaryIndex { index_name }
            if code == Some(VALIDATION_EXCEPTION) && consistent_read != Some(true) =>
        {
            Some(index_name.clone())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn secondary(index_name: &str) -> lookup::Lookup {
        lookup::Lookup::SecondaryIndex {
            index_name: index_name.to_string(),
        }
    }

    #[rstest]
    #[case::index_does_not_exist(secondary("username"), None, Some("username"))]
    #[case::explicitly_inconsistent(secondary("username"), Some(false), Some("username"))]
    #[case::consistent_read_rejected(secondary("username"), Some(true), None)]
    #[case::primary_key_path(lookup::Lookup::PrimaryKey, None, None)]
    fn test_validation_exception_identity(
        #[case] lookup: lookup::Lookup,
        #[case] consistent_read: Option<bool>,
        #[case] expected_index: Option<&str>,
    ) {
        let named = missing_index(Some(VALIDATION_EXCEPTION), &lookup, consistent_read);
        assert_eq!(named.as_deref(), expected_index);
    }

    #[rstest]
    #[case::throttled(Some("ThrottlingException"))]
    #[case::no_code(None)]
    fn test_other_codes_never_name_an_index(#[case] code: Option<&str>) {
        assert_eq!(missing_index(code, &secondary("username"), None), None);
    }

    #[rstest]
    fn test_field_type_message_covers_missing_fields() {
        let err = Error::FieldType("logins".to_string());
        assert_eq!(
            err.to_string(),
            "field `logins` is missing or does not hold a numeric value"
        );
    }
}
