//! # List and row filters
//!
//! Client-side, case-insensitive substring filters. Both are pure and cheap
//! enough to recompute on every keystroke.
//!
//! - [`filter_items`] keeps catalog entries whose label contains the query
//! - [`filter_rows`] keeps preview rows where any field contains the query
//!
//! ```rust
//! use portal_api::prelude::*;
//!
//! let catalog: Vec<CatalogItem> = ["Bloomberg_User_ReportTable", "HR_Employees"]
//!     .into_iter()
//!     .map(CatalogItem::from_key)
//!     .collect();
//! let hits = filter_items(&catalog, "hr");
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].label, "HR Employees");
//! ```

use crate::{cell::CellFormatter, preview::Row};

/// Anything that can be listed in a catalog and matched by the text filter.
pub trait Labeled {
    /// Stable identifier, unique within a catalog
    fn key(&self) -> &str;

    /// Human-readable display string
    fn label(&self) -> &str;
}

/// Trims and lowercases a query. An empty result means "match everything".
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Returns the items whose label contains `query`, ignoring case,
/// in their original order. An empty or whitespace-only query returns every item.
pub fn filter_items<'a, T: Labeled>(items: &'a [T], query: &str) -> Vec<&'a T> {
    let term = normalize_query(query);
    if term.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| item.label().to_lowercase().contains(&term))
        .collect()
}

/// Returns the rows where any field value contains `query`, ignoring case.
/// Values are stringified with the default [`CellFormatter`].
pub fn filter_rows<'a>(rows: &'a [Row], query: &str) -> Vec<&'a Row> {
    filter_rows_with(rows, query, &CellFormatter::default())
}

/// Like [`filter_rows`], stringifying values with `formatter` so that matching
/// follows what is displayed.
pub fn filter_rows_with<'a>(
    rows: &'a [Row],
    query: &str,
    formatter: &CellFormatter,
) -> Vec<&'a Row> {
    let term = normalize_query(query);
    if term.is_empty() {
        return rows.iter().collect();
    }
    rows.iter()
        .filter(|row| {
            row.values()
                .any(|value| formatter.format(value).to_lowercase().contains(&term))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::catalog::CatalogItem;

    fn catalog(keys: &[&str]) -> Vec<CatalogItem> {
        keys.iter().map(|k| CatalogItem::from_key(*k)).collect()
    }

    fn rows(value: Value) -> Vec<Row> {
        value
            .as_array()
            .expect("array fixture")
            .iter()
            .map(|v| v.as_object().expect("object fixture").clone())
            .collect()
    }

    #[test]
    fn empty_query_returns_full_catalog_in_order() {
        let items = catalog(&["B_two", "A_one", "C_three"]);
        for query in ["", "   ", "\t\n"] {
            let keys: Vec<&str> = filter_items(&items, query).iter().map(|i| i.key()).collect();
            assert_eq!(keys, vec!["B_two", "A_one", "C_three"]);
        }
    }

    #[test]
    fn filter_matches_label_substring_ignoring_case() {
        let items = catalog(&["Bloomberg_User_ReportTable", "HR_Employees"]);
        let lower: Vec<&str> = filter_items(&items, "hr").iter().map(|i| i.key()).collect();
        let upper: Vec<&str> = filter_items(&items, "HR").iter().map(|i| i.key()).collect();
        assert_eq!(lower, vec!["HR_Employees"]);
        assert_eq!(lower, upper);
        assert_eq!(filter_items(&items, "hr")[0].label(), "HR Employees");
    }

    #[test]
    fn filter_matches_label_not_key() {
        // label has spaces where the key has underscores
        let items = catalog(&["HR_Employees"]);
        assert_eq!(filter_items(&items, "hr employees").len(), 1);
        assert!(filter_items(&items, "hr_employees").is_empty());
    }

    #[test]
    fn filter_result_is_ordered_subsequence() {
        let items = catalog(&["User_A", "Other", "User_B", "Users_C", "Misc"]);
        let hits: Vec<&str> = filter_items(&items, " user ").iter().map(|i| i.key()).collect();
        assert_eq!(hits, vec!["User_A", "User_B", "Users_C"]);
    }

    #[test]
    fn filter_is_idempotent() {
        let items = catalog(&["HR_Employees", "RightFax_Users", "HR_Payroll"]);
        let once: Vec<CatalogItem> = filter_items(&items, "hr").into_iter().cloned().collect();
        let twice: Vec<CatalogItem> = filter_items(&once, "hr").into_iter().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn row_filter_matches_any_field() {
        let data = rows(json!([{"Name": "Alice", "Dept": "HR"}]));
        assert_eq!(filter_rows(&data, "alice").len(), 1);
        assert_eq!(filter_rows(&data, "ALICE").len(), 1);
        assert_eq!(filter_rows(&data, "hr").len(), 1);
        assert!(filter_rows(&data, "finance").is_empty());
    }

    #[test]
    fn row_filter_empty_query_returns_all_rows() {
        let data = rows(json!([{"a": 1}, {"a": 2}, {"a": null}]));
        assert_eq!(filter_rows(&data, "").len(), 3);
        assert_eq!(filter_rows(&data, "  ").len(), 3);
    }

    #[test]
    fn row_filter_stringifies_non_string_values() {
        let data = rows(json!([
            {"id": 42, "active": true, "note": null},
            {"id": 7, "tags": ["alpha", "beta"], "meta": {"region": "EMEA"}},
        ]));
        assert_eq!(filter_rows(&data, "42").len(), 1);
        assert_eq!(filter_rows(&data, "true").len(), 1);
        // null stringifies to "" and matches nothing
        assert!(filter_rows(&data, "null").is_empty());
        // composite values use their json encoding
        assert_eq!(filter_rows(&data, "\"beta\"").len(), 1);
        assert_eq!(filter_rows(&data, "emea").len(), 1);
        assert_eq!(filter_rows(&data, "region").len(), 1);
    }

    #[test]
    fn row_filter_does_not_mutate_rows() {
        let data = rows(json!([{"Name": "Alice"}, {"Name": "Bob"}]));
        let before = data.clone();
        let hits = filter_rows(&data, "bob");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].get("Name"), Some(&json!("Bob")));
        assert_eq!(data, before);
    }

    #[test]
    fn row_filter_with_date_format_matches_displayed_text() {
        let data = rows(json!([{"hired": "2024-03-05T10:20:30Z"}]));
        let formatter = CellFormatter::with_date_format("%d/%m/%Y");
        assert_eq!(filter_rows_with(&data, "05/03/2024", &formatter).len(), 1);
        assert!(filter_rows(&data, "05/03/2024").is_empty());
    }
}
