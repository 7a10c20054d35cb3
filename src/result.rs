//! Ordered, read-only view over rows returned by one lookup.

use crate::{error, filter, row};

/// The rows returned by one lookup, in the order the store returned them.
///
/// A result always wraps a sequence, even for primary-key lookups that can
/// match at most one row; callers must not assume uniqueness. The order is
/// not guaranteed stable across calls when the table defines no sort key.
///
/// ```rust
/// use dynamodb_tables::{QueryResult, Row};
/// use serde_json::json;
///
/// let row: Row = serde_json::from_value(json!({"user-id": "u1"})).unwrap();
/// let result = QueryResult::from(vec![row]);
/// assert!(result.is_unique());
/// assert_eq!(result.first().unwrap()["user-id"], json!("u1"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResult {
    rows: Vec<row::Row>,
}

impl QueryResult {
    /// Whether the lookup matched at least one row.
    pub fn exists(&self) -> bool {
        !self.rows.is_empty()
    }

    /// The first row.
    ///
    /// Fails with [`error::Error::EmptyResult`] when no rows matched.
    pub fn first(&self) -> error::Result<&row::Row> {
        self.rows.first().ok_or(error::Error::EmptyResult)
    }

    /// The last row.
    ///
    /// Fails with [`error::Error::EmptyResult`] when no rows matched.
    pub fn last(&self) -> error::Result<&row::Row> {
        self.rows.last().ok_or(error::Error::EmptyResult)
    }

    /// The number of rows matched.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the lookup matched no rows at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the lookup matched exactly one row.
    pub fn is_unique(&self) -> bool {
        self.rows.len() == 1
    }

    /// Every matched row, in store order; an empty slice when nothing matched.
    pub fn all(&self) -> &[row::Row] {
        &self.rows
    }

    /// The row at `index`.
    ///
    /// Fails with [`error::Error::OutOfRange`] past the last row.
    pub fn get(&self, index: usize) -> error::Result<&row::Row> {
        let length = self.rows.len();
        self.rows
            .get(index)
            .ok_or(error::Error::OutOfRange { index, length })
    }

    /// Iterate over the matched rows.
    pub fn iter(&self) -> std::slice::Iter<'_, row::Row> {
        self.rows.iter()
    }

    /// Consume the result, yielding the matched rows.
    pub fn into_rows(self) -> Vec<row::Row> {
        self.rows
    }

    /// Rows whose `column` satisfies `predicate` against `value`.
    ///
    /// Filtering is purely local and chains freely; each call returns a new
    /// result and leaves this one untouched.
    pub fn filter(
        &self,
        column: &str,
        value: impl Into<serde_json::Value>,
        predicate: filter::Predicate,
    ) -> Self {
        self.filter_using(&filter::Filter::new(column, value, predicate))
    }

    /// Rows kept by `filter`; the general form of [`QueryResult::filter`].
    pub fn filter_using(&self, filter: &filter::Filter) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|row| filter.keeps(row))
            .cloned()
            .collect();
        Self { rows }
    }

    /// The first row whose `key` equals `equals`.
    ///
    /// Fails with [`error::Error::RowNotFound`] when nothing matches.
    pub fn get_where(
        &self,
        key: &str,
        equals: impl Into<serde_json::Value>,
    ) -> error::Result<row::Row> {
        self.filter(key, equals, filter::Predicate::Equals)
            .rows
            .into_iter()
            .next()
            .ok_or_else(|| error::Error::RowNotFound(key.to_string()))
    }

    /// The distinct values stored under `column`, in first-seen order.
    ///
    /// Rows lacking the column contribute nothing.
    pub fn unique(&self, column: &str) -> Vec<serde_json::Value> {
        let mut values: Vec<serde_json::Value> = Vec::new();
        for row in &self.rows {
            if let Some(value) = row.get(column) {
                if !values.contains(value) {
                    values.push(value.clone());
                }
            }
        }
        values
    }

    /// The number of distinct values stored under `column`.
    pub fn count_unique(&self, column: &str) -> usize {
        self.unique(column).len()
    }

    /// Every column name appearing in any row, in first-seen order.
    pub fn columns(&self) -> indexmap::IndexSet<String> {
        self.rows.iter().flat_map(|row| row.keys().cloned()).collect()
    }

    /// The number of rows lacking `column`.
    pub fn count_empty(&self, column: &str) -> usize {
        self.rows
            .iter()
            .filter(|row| !row.contains_key(column))
            .count()
    }

    /// A copy of the result with the named columns removed from every row.
    pub fn strip(&self, columns: &[&str]) -> Self {
        self.retain_columns(|column| !columns.contains(&column))
    }

    /// A copy of the result keeping only the named columns in every row.
    pub fn select_columns(&self, columns: &[&str]) -> Self {
        self.retain_columns(|column| columns.contains(&column))
    }

    /// A copy of the result where every row holds every column, filling gaps
    /// with `with_value`.
    pub fn fill_empty(&self, with_value: serde_json::Value) -> Self {
        let columns = self.columns();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| {
                        let value = row
                            .get(column)
                            .cloned()
                            .unwrap_or_else(|| with_value.clone());
                        (column.clone(), value)
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Merge columns from `with` into every row sharing a value at `using`.
    ///
    /// Rows lacking `using`, or without a match on the right, pass through
    /// unchanged; when the right-hand side holds several rows with the same
    /// `using` value, the first one wins. A `using` column absent from this
    /// result entirely makes the join a no-op.
    pub fn join(&self, with: &QueryResult, using: &str) -> Self {
        if !self.columns().contains(using) {
            return self.clone();
        }
        #[cfg(feature = "tracing")]
        if with.count_unique(using) + with.count_empty(using) != with.len() {
            tracing::warn!(column = using, "joining on a non-unique right-hand column");
        }
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut merged = row.clone();
                if let Some(value) = row.get(using) {
                    if let Ok(extra) = with.get_where(using, value.clone()) {
                        merged.extend(extra);
                    }
                }
                merged
            })
            .collect();
        Self { rows }
    }

    fn retain_columns(&self, keep: impl Fn(&str) -> bool) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .filter(|(column, _)| keep(column.as_str()))
                    .map(|(column, value)| (column.clone(), value.clone()))
                    .collect()
            })
            .collect();
        Self { rows }
    }
}

impl From<Vec<row::Row>> for QueryResult {
    fn from(rows: Vec<row::Row>) -> Self {
        Self { rows }
    }
}

impl IntoIterator for QueryResult {
    type Item = row::Row;
    type IntoIter = std::vec::IntoIter<row::Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a row::Row;
    type IntoIter = std::slice::Iter<'a, row::Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::{Value, json};

    fn rows(values: Value) -> Vec<row::Row> {
        serde_json::from_value(values).unwrap()
    }

    #[rstest]
    fn test_empty_result() {
        let result = QueryResult::default();
        assert!(!result.exists());
        assert!(result.is_empty());
        assert!(!result.is_unique());
        assert_eq!(result.len(), 0);
        assert!(result.all().is_empty());
        assert!(matches!(
            result.first().unwrap_err(),
            error::Error::EmptyResult
        ));
        assert!(matches!(
            result.last().unwrap_err(),
            error::Error::EmptyResult
        ));
        assert!(matches!(
            result.get(0).unwrap_err(),
            error::Error::OutOfRange { index: 0, length: 0 }
        ));
    }

    #[rstest]
    fn test_unique_result() {
        let result = QueryResult::from(rows(json!([
            {
                "user-id": "u1",
                "region": "Somerset"
            }
        ])));
        assert!(result.exists());
        assert!(result.is_unique());
        assert_eq!(result.len(), 1);
        assert_eq!(result.first().unwrap(), result.last().unwrap());
        assert_eq!(result.get(0).unwrap()["region"], json!("Somerset"));
    }

    #[rstest]
    fn test_multiple_rows_keep_store_order() {
        let result = QueryResult::from(rows(json!([
            {"user-id": "u1"},
            {"user-id": "u2"},
            {"user-id": "u3"}
        ])));
        assert!(result.exists());
        assert!(!result.is_unique());
        assert_eq!(result.len(), 3);
        assert_eq!(result.first().unwrap()["user-id"], json!("u1"));
        assert_eq!(result.last().unwrap()["user-id"], json!("u3"));
        assert_eq!(result.get(1).unwrap()["user-id"], json!("u2"));
        assert!(matches!(
            result.get(3).unwrap_err(),
            error::Error::OutOfRange { index: 3, length: 3 }
        ));
        let ids: Vec<_> = result
            .iter()
            .map(|row| row["user-id"].clone())
            .collect();
        assert_eq!(ids, vec![json!("u1"), json!("u2"), json!("u3")]);
    }

    #[rstest]
    fn test_into_rows() {
        let result = QueryResult::from(rows(json!([{"user-id": "u1"}])));
        let rows = result.into_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["user-id"], json!("u1"));
    }

    fn sample() -> QueryResult {
        QueryResult::from(rows(json!([
            {"user-id": "u1", "region": "Somerset", "logins": 3},
            {"user-id": "u2", "region": "Bristol", "logins": 7},
            {"user-id": "u3", "region": "Somerset"}
        ])))
    }

    #[rstest]
    fn test_filter_narrows_and_chains() {
        let result = sample();
        let somerset = result.filter("region", "Somerset", filter::Predicate::Equals);
        assert_eq!(somerset.len(), 2);
        let active = somerset.filter("logins", 1, filter::Predicate::GreaterThan);
        assert!(active.is_unique());
        assert_eq!(active.first().unwrap()["user-id"], json!("u1"));
        assert_eq!(result.len(), 3);
    }

    #[rstest]
    fn test_filter_using_can_keep_rows_missing_the_column() {
        let lapsed =
            filter::Filter::new("logins", 5, filter::Predicate::GreaterThan).include_missing();
        let matched = sample().filter_using(&lapsed);
        let ids: Vec<_> = matched
            .iter()
            .map(|row| row["user-id"].clone())
            .collect();
        assert_eq!(ids, vec![json!("u2"), json!("u3")]);
    }

    #[rstest]
    fn test_get_where() {
        let result = sample();
        let row = result.get_where("user-id", "u2").unwrap();
        assert_eq!(row["region"], json!("Bristol"));
        assert!(matches!(
            result.get_where("user-id", "u9").unwrap_err(),
            error::Error::RowNotFound(column) if column == "user-id"
        ));
    }

    #[rstest]
    fn test_unique_and_counts() {
        let result = sample();
        assert_eq!(
            result.unique("region"),
            vec![json!("Somerset"), json!("Bristol")]
        );
        assert_eq!(result.count_unique("region"), 2);
        assert_eq!(result.count_unique("postcode"), 0);
        assert_eq!(result.count_empty("logins"), 1);
    }

    #[rstest]
    fn test_columns_in_first_seen_order() {
        let columns: Vec<_> = sample().columns().into_iter().collect();
        assert_eq!(
            columns,
            vec![
                "user-id".to_string(),
                "region".to_string(),
                "logins".to_string()
            ]
        );
    }

    #[rstest]
    fn test_strip_and_select_leave_the_source_untouched() {
        let result = sample();
        let stripped = result.strip(&["logins"]);
        assert!(!stripped.columns().contains("logins"));
        let selected = result.select_columns(&["user-id"]);
        for row in &selected {
            assert_eq!(row.len(), 1);
            assert!(row.contains_key("user-id"));
        }
        assert!(result.columns().contains("logins"));
    }

    #[rstest]
    fn test_fill_empty() {
        let filled = sample().fill_empty(json!(0));
        assert_eq!(filled.count_empty("logins"), 0);
        assert_eq!(filled.get(2).unwrap()["logins"], json!(0));
    }

    #[rstest]
    fn test_join_merges_matching_columns() {
        let users = sample();
        let regions = QueryResult::from(rows(json!([
            {"region": "Somerset", "country": "England"},
            {"region": "Bristol", "country": "England"}
        ])));
        let joined = users.join(&regions, "region");
        assert_eq!(joined.len(), 3);
        assert_eq!(joined.first().unwrap()["country"], json!("England"));
        let untouched = users.join(&regions, "postcode");
        assert_eq!(untouched, users);
    }
}
