//! Composite codec: LIST, ARRAY, STRUCT, MAP and UNION (fetch direction).
//!
//! Children are decoded through [`fetch_value`], so nesting recurses to any
//! depth. Null children stay in place as `RowValue::Null`.

use engine::{ListEntry, LogicalType, Vector, VectorData};
use tracing::debug;

use super::{layout_mismatch, slot_missing};
use crate::dispatch::{fetch_value, FetchContext};
use crate::error::{DuckError, Result};
use crate::value::RowValue;

/// Lazy iterator over the elements of one list cell.
///
/// Yields one decoded element per step; `len()` reports the remaining count
/// up front.
pub struct ListIter<'a> {
    child: &'a Vector,
    next: usize,
    end: usize,
    context: &'a FetchContext,
}

impl Iterator for ListIter<'_> {
    type Item = Result<RowValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let value = fetch_value(self.child, self.next, self.context);
        self.next += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ListIter<'_> {}

fn list_parts(vector: &Vector, row: usize) -> Result<(ListEntry, &Vector)> {
    match &vector.data {
        VectorData::List { entries, child } => {
            let entry = entries.get(row).copied().ok_or_else(|| slot_missing(row))?;
            Ok((entry, child))
        }
        other => Err(layout_mismatch(&vector.logical_type, other)),
    }
}

fn span(entry: ListEntry) -> Result<(usize, usize)> {
    let start = usize::try_from(entry.offset)
        .map_err(|_| DuckError::range(format!("list offset {} is out of range", entry.offset)))?;
    let len = usize::try_from(entry.length)
        .map_err(|_| DuckError::range(format!("list length {} is out of range", entry.length)))?;
    Ok((start, start.saturating_add(len)))
}

pub fn list_iter<'a>(vector: &'a Vector, row: usize, context: &'a FetchContext) -> Result<ListIter<'a>> {
    let (entry, child) = list_parts(vector, row)?;
    let (start, end) = span(entry)?;
    Ok(ListIter {
        child,
        next: start,
        end,
        context,
    })
}

pub fn decode_list(vector: &Vector, row: usize, context: &FetchContext) -> Result<Vec<RowValue>> {
    list_iter(vector, row, context)?.collect()
}

/// Fixed-size arrays: row `r` owns children `r * size .. (r + 1) * size`.
pub fn decode_array(vector: &Vector, row: usize, size: usize, context: &FetchContext) -> Result<Vec<RowValue>> {
    let VectorData::Array { child } = &vector.data else {
        return Err(layout_mismatch(&vector.logical_type, &vector.data));
    };
    let start = row.checked_mul(size).ok_or_else(|| slot_missing(row))?;
    let end = start.checked_add(size).ok_or_else(|| slot_missing(row))?;
    (start..end)
        .map(|i| fetch_value(child, i, context))
        .collect()
}

/// Struct fields in declaration order; names are kept verbatim.
pub fn decode_struct(
    vector: &Vector,
    row: usize,
    fields: &[(String, LogicalType)],
    context: &FetchContext,
) -> Result<Vec<(String, RowValue)>> {
    let VectorData::Struct(children) = &vector.data else {
        return Err(layout_mismatch(&vector.logical_type, &vector.data));
    };
    if children.len() != fields.len() {
        return Err(DuckError::invalid_state(format!(
            "struct of {} fields has {} child vectors",
            fields.len(),
            children.len()
        )));
    }
    fields
        .iter()
        .zip(children)
        .map(|((name, _), child)| Ok((name.clone(), fetch_value(child, row, context)?)))
        .collect()
}

/// Map cells are lists of `{key, value}` structs.
pub fn decode_map(vector: &Vector, row: usize, context: &FetchContext) -> Result<Vec<(RowValue, RowValue)>> {
    let (entry, child) = list_parts(vector, row)?;
    let VectorData::Struct(pair) = &child.data else {
        return Err(layout_mismatch(&child.logical_type, &child.data));
    };
    let [keys, values] = pair.as_slice() else {
        return Err(DuckError::invalid_state(format!(
            "map entries have {} child vectors, expected 2",
            pair.len()
        )));
    };

    let (start, end) = span(entry)?;
    let mut entries = Vec::with_capacity(end - start);
    for i in start..end {
        entries.push((fetch_value(keys, i, context)?, fetch_value(values, i, context)?));
    }
    Ok(dedup_map_entries(entries))
}

/// Resolve duplicate keys: the last value wins and the key keeps the
/// position where it was first seen.
pub fn dedup_map_entries(entries: Vec<(RowValue, RowValue)>) -> Vec<(RowValue, RowValue)> {
    let mut out: Vec<(RowValue, RowValue)> = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        match out.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => {
                debug!(key = %key, "duplicate map key, keeping the last value");
                slot.1 = value;
            }
            None => out.push((key, value)),
        }
    }
    out
}

/// Union cells: child 0 holds the `u8` tag, child `tag + 1` the active member.
pub fn decode_union(
    vector: &Vector,
    row: usize,
    members: &[(String, LogicalType)],
    context: &FetchContext,
) -> Result<(String, RowValue)> {
    let VectorData::Struct(children) = &vector.data else {
        return Err(layout_mismatch(&vector.logical_type, &vector.data));
    };
    let tag_vector = children
        .first()
        .ok_or_else(|| DuckError::invalid_state("union without a tag vector"))?;
    let VectorData::UInt8(tags) = &tag_vector.data else {
        return Err(layout_mismatch(&tag_vector.logical_type, &tag_vector.data));
    };
    let tag = usize::from(*tags.get(row).ok_or_else(|| slot_missing(row))?);

    let (name, _) = members.get(tag).ok_or_else(|| {
        DuckError::invalid_state(format!("union tag {} has no member among {}", tag, members.len()))
    })?;
    let member = children
        .get(tag + 1)
        .ok_or_else(|| DuckError::invalid_state(format!("union member {} has no vector", name)))?;
    Ok((name.clone(), fetch_value(member, row, context)?))
}
