//! The shared `{total, data}` pagination envelope.
//!
//! `total` always reflects the unsliced candidate-set size, so it stays
//! invariant across different offset/limit calls against the same state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub total: usize,
    pub data: Vec<T>,
}

/// Slice an ordered candidate set, returning the full size alongside the
/// requested window.
pub fn slice<T>(items: Vec<T>, offset: usize, limit: usize) -> (usize, Vec<T>) {
    let total = items.len();
    let data = items.into_iter().skip(offset).take(limit).collect();
    (total, data)
}
