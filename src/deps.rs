//! Dependency manager (component G): commits or rolls back the dependency
//! edges for a cell as its formula changes, working off
//! `Formula::parent_keys` rather than re-deriving ranges from a packed
//! remainder scheme.

use crate::cell::Formula;
use crate::store::Store;

/// Removes `x`'s dependent-edge from every parent named by `formula`.
pub fn remove_edges(store: &mut Store, x_key: i32, formula: &Formula) {
    let cols = store.cols();
    for parent_key in formula.parent_keys(cols) {
        store.get_mut(parent_key).dependents.delete(x_key);
    }
}

/// Adds `x`'s dependent-edge to every parent named by `formula`.
pub fn add_edges(store: &mut Store, x_key: i32, formula: &Formula) {
    let cols = store.cols();
    for parent_key in formula.parent_keys(cols) {
        store.get_mut(parent_key).dependents.insert(x_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{BinOp, Operand};

    #[test]
    fn add_then_remove_restores_empty_dependents() {
        let mut store = Store::new(2, 2).unwrap();
        let a1 = store.key(0, 0);
        let b1 = store.key(0, 1);
        let formula = Formula::BinOp { op: BinOp::Add, left: Operand::Cell(a1), right: Operand::Literal(1) };
        add_edges(&mut store, b1, &formula);
        assert!(store.get(a1).dependents.contains(b1));
        remove_edges(&mut store, b1, &formula);
        assert!(store.get(a1).dependents.is_empty());
    }

    #[test]
    fn range_edges_cover_whole_rectangle() {
        let mut store = Store::new(2, 2).unwrap();
        let start = store.key(0, 0);
        let end = store.key(1, 1);
        let b1 = store.key(0, 1);
        let formula = Formula::Range { kind: crate::cell::RangeFn::Sum, start, end };
        add_edges(&mut store, b1, &formula);
        for key in [store.key(0, 0), store.key(0, 1), store.key(1, 0), store.key(1, 1)] {
            assert!(store.get(key).dependents.contains(b1));
        }
    }
}
