//! Search and set-style insert/remove over sequences kept ordered by a
//! comparator. Not-found results carry the insertion point in their bitwise
//! complement, so a negative result is both "absent" and "where it goes".

use std::cmp::Ordering;

/// Binary search over a sequence already ordered by `compare`.
///
/// Returns the index of an equal element if one is found - the first equal
/// element the probe lands on, not necessarily the leftmost. Otherwise
/// returns the bitwise complement of the index at which the item would need
/// to be inserted to preserve order.
pub fn binary_search_by<T, F>(list: &[T], item: &T, compare: F) -> isize
where
    F: Fn(&T, &T) -> Ordering,
{
    let mut low: isize = 0;
    let mut high: isize = list.len() as isize - 1;
    while low <= high {
        let mid = (low + high) >> 1;
        match compare(item, &list[mid as usize]) {
            Ordering::Less => high = mid - 1,
            Ordering::Greater => low = mid + 1,
            Ordering::Equal => return mid,
        }
    }

    // Item not found; it would be inserted at low.
    !low
}

pub fn binary_search<T: Ord>(list: &[T], item: &T) -> isize {
    binary_search_by(list, item, |a, b| a.cmp(b))
}

/// Inserts `item` into a sequence ordered by `compare`, unless an equal
/// element is already present (set semantics - the rejected item is
/// dropped). Returns the same signed result as the search, so callers can
/// tell "already there at i" from "inserted at !i".
pub fn insert_by<T, F>(list: &mut Vec<T>, item: T, compare: F) -> isize
where
    F: Fn(&T, &T) -> Ordering,
{
    let index = binary_search_by(list, &item, &compare);
    if index < 0 {
        list.insert(!index as usize, item);
    }
    index
}

pub fn insert<T: Ord>(list: &mut Vec<T>, item: T) -> isize {
    insert_by(list, item, |a, b| a.cmp(b))
}

/// Removes and returns the element equal to `item`, or `None` when absent.
pub fn remove_by<T, F>(list: &mut Vec<T>, item: &T, compare: F) -> Option<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    let index = binary_search_by(list, item, compare);
    if index >= 0 {
        Some(list.remove(index as usize))
    } else {
        None
    }
}

pub fn remove<T: Ord>(list: &mut Vec<T>, item: &T) -> Option<T> {
    remove_by(list, item, |a, b| a.cmp(b))
}
