//! Deep-merge of partial configuration onto defaults.
//!
//! A configuration value is merged field by field: `Some` overrides replace
//! or recurse into what is already there, `None` leaves it untouched. Keyed
//! collections keep their declaration order; new keys are appended.

/// A configuration value that can absorb a partial override.
pub trait Merge {
    /// Merge `overrides` into `self`, keeping whatever `overrides` leaves unset.
    fn merge(&mut self, overrides: Self);
}

impl<T: Merge> Merge for Option<T> {
    fn merge(&mut self, overrides: Self) {
        let Some(next) = overrides else {
            return;
        };
        match self {
            Some(current) => current.merge(next),
            None => *self = Some(next),
        }
    }
}

/// Merge an ordered keyed collection.
///
/// Entries whose key already exists are merged in place (keeping their
/// position); unknown keys are appended in the order given.
pub fn merge_keyed<V: Merge>(
    target: &mut Vec<(String, V)>,
    overrides: impl IntoIterator<Item = (String, V)>,
) {
    for (key, value) in overrides {
        match target.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, current)) => current.merge(value),
            None => target.push((key, value)),
        }
    }
}
