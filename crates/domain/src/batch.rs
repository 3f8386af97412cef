//! Bounded row buffers for chunked inserts.

use crate::error::DomainError;

/// Rows per committed batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// A row of cells ready for binding; `None` binds as NULL.
pub type RowValues = Vec<Option<String>>;

/// Rows accumulated for one insert transaction.
///
/// Every row has the same arity (the width of the column mapping it was
/// extracted with). The batch is drained with [`ImportBatch::take`] and
/// reused for the next chunk.
#[derive(Debug, Clone)]
pub struct ImportBatch {
    arity: usize,
    capacity: usize,
    rows: Vec<RowValues>,
}

impl ImportBatch {
    pub fn new(arity: usize, capacity: usize) -> Result<Self, DomainError> {
        if arity == 0 {
            return Err(DomainError::validation("batch arity must be positive"));
        }
        if capacity == 0 {
            return Err(DomainError::validation("batch capacity must be positive"));
        }
        Ok(Self {
            arity,
            capacity,
            rows: Vec::with_capacity(capacity),
        })
    }

    /// Append a row. Returns `true` once the batch has reached capacity.
    pub fn push(&mut self, row: RowValues) -> Result<bool, DomainError> {
        if row.len() != self.arity {
            return Err(DomainError::validation(format!(
                "row has {} values, expected {}",
                row.len(),
                self.arity
            )));
        }
        self.rows.push(row);
        Ok(self.is_full())
    }

    pub fn is_full(&self) -> bool {
        self.rows.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drain the buffered rows, leaving the batch empty.
    pub fn take(&mut self) -> Vec<RowValues> {
        std::mem::replace(&mut self.rows, Vec::with_capacity(self.capacity))
    }
}
