//! Copy-on-write list splicing.
//!
//! Each helper returns a new vector and leaves its input untouched, so a
//! proposal can be validated before anything is committed. Out-of-range indices
//! yield `None`; callers decide what that means.

/// Move the element at `from` to `to`.
///
/// `to` is relative to the list after the element has been removed, so the
/// valid range for both indices is `0..len`.
pub fn move_within<T: Clone>(items: &[T], from: usize, to: usize) -> Option<Vec<T>> {
    let (mut rest, moved) = remove_at(items, from)?;
    if to > rest.len() {
        return None;
    }
    rest.insert(to, moved);
    Some(rest)
}

/// Remove the element at `index`, returning the remaining list and the element
pub fn remove_at<T: Clone>(items: &[T], index: usize) -> Option<(Vec<T>, T)> {
    if index >= items.len() {
        return None;
    }
    let mut rest = items.to_vec();
    let removed = rest.remove(index);
    Some((rest, removed))
}

/// Insert `item` at `index`, where `index` may equal the length (append)
pub fn insert_at<T: Clone>(items: &[T], index: usize, item: T) -> Option<Vec<T>> {
    if index > items.len() {
        return None;
    }
    let mut next = items.to_vec();
    next.insert(index, item);
    Some(next)
}
