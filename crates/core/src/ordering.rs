//! Display-order planning for menu sections and products.
//!
//! Sections and products carry an integer `display_order`. A reorder takes
//! the list as the user arranged it, assigns sequential indices from zero,
//! and keeps only the rows whose index actually changed so the caller can
//! write them back in a single transaction.

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use thiserror::Error;

/// Errors produced when a requested order does not match the stored rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    /// The same ID appears twice in the requested order.
    #[error("id {0} appears more than once")]
    Duplicate(String),
    /// The requested order names an ID that is not in the list.
    #[error("id {0} does not belong to this list")]
    Unknown(String),
    /// The requested order leaves out stored IDs.
    #[error("{0} item(s) missing from the requested order")]
    Missing(usize),
}

/// Plan the writes needed to put `current` into the order given by `desired`.
///
/// `current` holds `(id, display_order)` for every row in the list;
/// `desired` must be a permutation of those IDs. Returns `(id, new_order)`
/// for each row whose order changes, in `desired` order.
///
/// # Errors
///
/// Returns an error if `desired` repeats an ID, names an unknown ID, or
/// leaves any stored ID out.
///
/// ```
/// use menuhub_core::ordering::plan_reorder;
///
/// let current = [(10, 0), (11, 1), (12, 2)];
/// let plan = plan_reorder(&current, &[12, 10, 11]).unwrap();
/// assert_eq!(plan, vec![(12, 0), (10, 1), (11, 2)]);
///
/// let plan = plan_reorder(&current, &[10, 12, 11]).unwrap();
/// assert_eq!(plan, vec![(12, 1), (11, 2)]);
/// ```
pub fn plan_reorder<Id>(current: &[(Id, i32)], desired: &[Id]) -> Result<Vec<(Id, i32)>, ReorderError>
where
    Id: Copy + Eq + Hash + Display,
{
    let mut seen = HashSet::with_capacity(desired.len());
    for id in desired {
        if !seen.insert(*id) {
            return Err(ReorderError::Duplicate(id.to_string()));
        }
        if !current.iter().any(|(known, _)| known == id) {
            return Err(ReorderError::Unknown(id.to_string()));
        }
    }

    if desired.len() < current.len() {
        return Err(ReorderError::Missing(current.len() - desired.len()));
    }

    let mut plan = Vec::new();
    for (index, id) in desired.iter().enumerate() {
        let position = i32::try_from(index).unwrap_or(i32::MAX);
        let unchanged = current
            .iter()
            .any(|(known, order)| known == id && *order == position);
        if !unchanged {
            plan.push((*id, position));
        }
    }
    Ok(plan)
}

/// Move `id` to `position` within `ids`, shifting the others.
///
/// A position past the end moves the item to the end.
///
/// # Errors
///
/// Returns [`ReorderError::Unknown`] if `id` is not in the list.
pub fn move_item<Id>(ids: &[Id], id: Id, position: usize) -> Result<Vec<Id>, ReorderError>
where
    Id: Copy + Eq + Display,
{
    let from = ids
        .iter()
        .position(|candidate| *candidate == id)
        .ok_or_else(|| ReorderError::Unknown(id.to_string()))?;

    let mut out = ids.to_vec();
    let item = out.remove(from);
    let to = position.min(out.len());
    out.insert(to, item);
    Ok(out)
}

/// Sort `(id, display_order)` pairs into their displayed sequence.
///
/// Ties on `display_order` fall back to the ID so the sequence is stable
/// across requests.
pub fn displayed_sequence<Id>(rows: &[(Id, i32)]) -> Vec<Id>
where
    Id: Copy + Ord,
{
    let mut sorted = rows.to_vec();
    sorted.sort_by_key(|(id, order)| (*order, *id));
    sorted.into_iter().map(|(id, _)| id).collect()
}

/// Order to give a newly created item so it lands at the end of its list.
pub fn next_display_order<I>(existing: I) -> i32
where
    I: IntoIterator<Item = i32>,
{
    existing
        .into_iter()
        .max()
        .map_or(0, |max| max.saturating_add(1))
}
