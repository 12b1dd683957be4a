//! Set difference between a desired and an observed collection.

use std::hash::Hash;

use indexmap::IndexSet;

/// Elements present on only one side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference<T> {
    /// In `a` but not in `b`, in `a`'s order.
    pub only_in_a: Vec<T>,
    /// In `b` but not in `a`, in `b`'s order.
    pub only_in_b: Vec<T>,
}

impl<T> Difference<T> {
    pub fn is_empty(&self) -> bool {
        self.only_in_a.is_empty() && self.only_in_b.is_empty()
    }
}

/// Compute both one-sided differences of `a` and `b`.
///
/// Each output keeps the first-seen order of its source and reports a
/// duplicated element once.
pub fn differences<T>(a: &[T], b: &[T]) -> Difference<T>
where
    T: Eq + Hash + Clone,
{
    let set_a: IndexSet<&T> = a.iter().collect();
    let set_b: IndexSet<&T> = b.iter().collect();

    let only_in_a = set_a
        .iter()
        .filter(|v| !set_b.contains(*v))
        .map(|v| (*v).clone())
        .collect();
    let only_in_b = set_b
        .iter()
        .filter(|v| !set_a.contains(*v))
        .map(|v| (*v).clone())
        .collect();

    Difference {
        only_in_a,
        only_in_b,
    }
}
