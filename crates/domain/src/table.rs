//! Table descriptors and CSV header matching.

use std::collections::HashSet;

use serde::Serialize;

use crate::identifier::Identifier;

/// A table and its columns, in ordinal order, as read from the live schema.
///
/// Descriptors are built on demand and never cached, so they always reflect
/// the schema at the time of the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescriptor {
    name: Identifier,
    columns: Vec<Identifier>,
}

impl TableDescriptor {
    pub fn new(name: Identifier, columns: Vec<Identifier>) -> Self {
        Self { name, columns }
    }

    pub fn name(&self) -> &Identifier {
        &self.name
    }

    pub fn columns(&self) -> &[Identifier] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Look up a column by name, returning the schema's own identifier.
    pub fn column(&self, column: &str) -> Option<&Identifier> {
        self.columns.iter().find(|c| *c == column)
    }

    /// Intersect a CSV header with this table's columns.
    ///
    /// Keeps the header's order. A column named twice in the header is
    /// mapped once, to its first position. Header cells that are not valid
    /// identifiers can never match.
    pub fn match_header<S: AsRef<str>>(&self, header: &[S]) -> ColumnMapping {
        let known: HashSet<&str> = self.columns.iter().map(Identifier::as_str).collect();
        let mut seen = HashSet::new();
        let mut pairs = Vec::new();

        for (index, cell) in header.iter().enumerate() {
            let name = cell.as_ref();
            if !known.contains(name) || !seen.insert(name) {
                continue;
            }
            if let Ok(column) = Identifier::new(name) {
                pairs.push(MappedColumn { column, index });
            }
        }

        ColumnMapping {
            table: self.name.clone(),
            pairs,
        }
    }
}

/// One table column fed from one CSV field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedColumn {
    pub column: Identifier,
    /// Position of the field in each CSV record.
    pub index: usize,
}

/// Ordered column/field pairs used to build every row of an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    table: Identifier,
    pairs: Vec<MappedColumn>,
}

impl ColumnMapping {
    pub fn table(&self) -> &Identifier {
        &self.table
    }

    pub fn pairs(&self) -> &[MappedColumn] {
        &self.pairs
    }

    pub fn columns(&self) -> impl Iterator<Item = &Identifier> {
        self.pairs.iter().map(|p| &p.column)
    }

    pub fn width(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pick the mapped fields out of a record.
    ///
    /// Fields past the end of a short record become `None` (NULL).
    pub fn extract<'r, I>(&self, record: I) -> Vec<Option<String>>
    where
        I: IntoIterator<Item = &'r str>,
    {
        let fields: Vec<&str> = record.into_iter().collect();
        self.pairs
            .iter()
            .map(|p| fields.get(p.index).map(|s| (*s).to_string()))
            .collect()
    }
}
