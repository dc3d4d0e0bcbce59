//! Materialized query results.

use engine::{ColumnInfo, DataChunk, LogicalType, NativeResult};

use crate::dispatch::{fetch_value, FetchContext};
use crate::error::{DuckError, Result};
use crate::value::RowValue;

/// A finished result: the engine's chunks plus the session state needed to
/// decode them. Cells are decoded on access.
#[derive(Debug, Clone)]
pub struct QueryResult {
    columns: Vec<ColumnInfo>,
    chunks: Vec<DataChunk>,
    /// First row index of each chunk
    offsets: Vec<usize>,
    row_count: usize,
    rows_changed: u64,
    context: FetchContext,
}

impl QueryResult {
    pub(crate) fn new(native: NativeResult, context: FetchContext) -> Self {
        let mut offsets = Vec::with_capacity(native.chunks.len());
        let mut row_count = 0;
        for chunk in &native.chunks {
            offsets.push(row_count);
            row_count += chunk.len;
        }
        Self {
            columns: native.columns,
            chunks: native.chunks,
            offsets,
            row_count,
            rows_changed: native.rows_changed,
            context,
        }
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_type(&self, column: usize) -> Option<&LogicalType> {
        self.columns.get(column).map(|c| &c.logical_type)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Rows touched by an INSERT/UPDATE/DELETE; zero for queries.
    pub fn rows_changed(&self) -> u64 {
        self.rows_changed
    }

    fn locate(&self, row: usize) -> Result<(&DataChunk, usize)> {
        if row >= self.row_count {
            return Err(DuckError::range(format!(
                "row index {} is out of range (result has {} rows)",
                row, self.row_count
            )));
        }
        let chunk = self.offsets.partition_point(|&start| start <= row) - 1;
        Ok((&self.chunks[chunk], row - self.offsets[chunk]))
    }

    /// Decode the cell at (`row`, `column`), both 0-based.
    pub fn fetch_row(&self, row: usize, column: usize) -> Result<RowValue> {
        if column >= self.columns.len() {
            return Err(DuckError::range(format!(
                "column index {} is out of range (result has {} columns)",
                column,
                self.columns.len()
            )));
        }
        let (chunk, local) = self.locate(row)?;
        let vector = chunk.columns.get(column).ok_or_else(|| {
            DuckError::invalid_state(format!("chunk is missing column {}", column))
        })?;
        fetch_value(vector, local, &self.context)
    }

    /// Decode every cell of one row.
    pub fn row(&self, row: usize) -> Result<Vec<RowValue>> {
        (0..self.columns.len()).map(|column| self.fetch_row(row, column)).collect()
    }

    /// Lazy iterator over all rows.
    pub fn rows(&self) -> Rows<'_> {
        Rows {
            result: self,
            next: 0,
        }
    }
}

pub struct Rows<'a> {
    result: &'a QueryResult,
    next: usize,
}

impl Iterator for Rows<'_> {
    type Item = Result<Vec<RowValue>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.result.row_count {
            return None;
        }
        let row = self.result.row(self.next);
        self.next += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.result.row_count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Rows<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{Validity, Vector, VectorData};

    fn two_chunk_result() -> QueryResult {
        let chunk = |values: Vec<i64>, valid: &[bool]| {
            let len = values.len();
            DataChunk::new(
                vec![Vector::new(LogicalType::BigInt, VectorData::Int64(values), Validity::from_flags(valid))],
                len,
            )
        };
        QueryResult::new(
            NativeResult {
                columns: vec![ColumnInfo::new("n", LogicalType::BigInt)],
                chunks: vec![chunk(vec![0, 1, 2], &[true, true, true]), chunk(vec![3, 0], &[true, false])],
                rows_changed: 0,
            },
            FetchContext::default(),
        )
    }

    #[test]
    fn test_rows_span_chunks() {
        let result = two_chunk_result();
        assert_eq!(result.row_count(), 5);
        assert_eq!(result.fetch_row(2, 0).unwrap(), RowValue::Int(2));
        assert_eq!(result.fetch_row(3, 0).unwrap(), RowValue::Int(3));
        assert_eq!(result.fetch_row(4, 0).unwrap(), RowValue::Null);
    }

    #[test]
    fn test_rows_iterator_is_exact() {
        let result = two_chunk_result();
        let rows = result.rows();
        assert_eq!(rows.len(), 5);
        let flat: Vec<RowValue> = rows.map(|r| r.unwrap().remove(0)).collect();
        assert_eq!(flat[0], RowValue::Int(0));
        assert_eq!(flat[4], RowValue::Null);
    }

    #[test]
    fn test_out_of_range_indices() {
        let result = two_chunk_result();
        assert!(matches!(result.fetch_row(5, 0), Err(DuckError::Range { .. })));
        assert!(matches!(result.fetch_row(0, 1), Err(DuckError::Range { .. })));
    }

    #[test]
    fn test_empty_result() {
        let result = QueryResult::new(NativeResult::default(), FetchContext::default());
        assert_eq!(result.row_count(), 0);
        assert_eq!(result.rows().count(), 0);
        assert!(result.fetch_row(0, 0).is_err());
    }
}
