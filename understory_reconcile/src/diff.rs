// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key-set differencing.

use alloc::vec::Vec;
use hashbrown::HashSet;
use understory_mind_tree::GKey;

/// How one sibling scope changed between two passes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyDiff {
    /// Keys only in the new set, in new order.
    pub enter: Vec<GKey>,
    /// Keys in both sets, in new order.
    pub update: Vec<GKey>,
    /// Keys only in the old set, in old order.
    pub exit: Vec<GKey>,
}

/// Split two key lists into entering, updated and exiting keys.
pub fn diff(old: &[GKey], new: &[GKey]) -> KeyDiff {
    let old_set: HashSet<GKey> = old.iter().copied().collect();
    let new_set: HashSet<GKey> = new.iter().copied().collect();
    let (update, enter) = new.iter().copied().partition(|k| old_set.contains(k));
    let exit = old.iter().filter(|k| !new_set.contains(*k)).copied().collect();
    KeyDiff { enter, update, exit }
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_mind_tree::{Side, TreeStore};

    #[test]
    fn splits_by_membership_and_keeps_order() {
        let mut store = TreeStore::new("r");
        let root = store.root();
        let ids: Vec<_> = (0..4).map(|_| store.add(root, "n").unwrap()).collect();
        let key = |i: usize| GKey {
            side: Side::Right,
            id: ids[i],
        };
        let d = diff(&[key(0), key(1), key(2)], &[key(3), key(2), key(0)]);
        assert_eq!(d.enter, [key(3)]);
        assert_eq!(d.update, [key(2), key(0)]);
        assert_eq!(d.exit, [key(1)]);
        assert_eq!(diff(&[], &[]), KeyDiff::default());
    }
}
