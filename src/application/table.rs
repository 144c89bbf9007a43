//! Generic table operations over loaded rows.
//!
//! These mirror the cleaning steps applied to the trade and price tables:
//! dropping incomplete rows, dropping unused columns and joining the two
//! tables on the trade day.

use crate::domain::types::Record;
use std::collections::HashMap;
use std::hash::Hash;

/// Keeps the rows where every named column holds a value, in their original order.
pub fn remove_blank<R: Record>(rows: &[R], columns: &[R::Column]) -> Vec<R> {
    rows.iter()
        .filter(|row| columns.iter().all(|&column| row.is_present(column)))
        .cloned()
        .collect()
}

/// Drops the named columns from every row. Row order and other columns are kept.
pub fn project_away<R: Record>(rows: &[R], columns: &[R::Column]) -> Vec<R> {
    rows.iter()
        .cloned()
        .map(|mut row| {
            for &column in columns {
                row.clear(column);
            }
            row
        })
        .collect()
}

/// Left-joins `left` to `right` on the keys produced by the two key functions.
///
/// Every left row appears exactly once, in its original order, paired with the
/// first right row sharing its key or `None`. A left row without a key never
/// matches. A right row may be attached to several left rows.
pub fn left_join<L, R, K, FL, FR>(
    left: Vec<L>,
    right: &[R],
    left_key: FL,
    right_key: FR,
) -> Vec<(L, Option<R>)>
where
    R: Clone,
    K: Eq + Hash,
    FL: Fn(&L) -> Option<K>,
    FR: Fn(&R) -> K,
{
    let mut index: HashMap<K, &R> = HashMap::with_capacity(right.len());
    for row in right {
        index.entry(right_key(row)).or_insert(row);
    }

    left.into_iter()
        .map(|row| {
            let matched = left_key(&row)
                .and_then(|key| index.get(&key))
                .map(|&r| r.clone());
            (row, matched)
        })
        .collect()
}
