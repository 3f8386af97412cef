//! Data shapes crossing the repository ports.

use serde::Serialize;
use serde_json::{Map, Value};

/// One result row keyed by column name.
pub type Row = Map<String, Value>;

/// Default row limit for `get_all`.
pub const DEFAULT_LIST_LIMIT: u32 = 1000;
/// Default row limit for `search`.
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;
/// Default row limit for `get_related`.
pub const DEFAULT_RELATED_LIMIT: u32 = 100;

/// Equality filter for `count`: `column = value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnFilter {
    pub column: String,
    pub value: String,
}

impl ColumnFilter {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Join description for `get_related`: rows of `foreign_table` whose
/// `foreign_key` points at `table.id = id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub table: String,
    pub foreign_table: String,
    pub foreign_key: String,
}
