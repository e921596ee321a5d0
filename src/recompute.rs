//! Topological recomputer (component H): re-evaluates every transitive
//! dependent of a just-assigned cell exactly once, in dependency order.
//!
//! Uses Kahn's algorithm restricted to the affected subgraph, rather than a
//! recursive-DFS topological sort, which re-evaluates a descendant once per
//! incoming path instead of once overall.

use std::collections::VecDeque;

use crate::eval;
use crate::store::Store;

/// Recomputes every transitive dependent of `x_key` in dependency order.
/// Returns the total sleep-seconds accumulated across the pass (from any
/// `SLEEP` cells re-evaluated along the way).
pub fn recompute_descendants(store: &mut Store, x_key: i32) -> i64 {
    let total_cells = store.total_cells() as usize;

    // Affected set: DFS from x through dependents, excluding x itself.
    let mut visited = vec![false; total_cells];
    let mut affected: Vec<i32> = Vec::new();
    let mut stack: Vec<i32> = store.get(x_key).dependents.keys();
    while let Some(cur) = stack.pop() {
        if visited[cur as usize] {
            continue;
        }
        visited[cur as usize] = true;
        affected.push(cur);
        for dep in store.get(cur).dependents.keys() {
            if !visited[dep as usize] {
                stack.push(dep);
            }
        }
    }

    if affected.is_empty() {
        return 0;
    }

    let cols = store.cols();
    let mut index_of = vec![-1i32; total_cells];
    for (i, &key) in affected.iter().enumerate() {
        index_of[key as usize] = i as i32;
    }

    // Restricted in-degree: count only parents that also lie in the affected set.
    let mut in_degree = vec![0i32; affected.len()];
    for (i, &key) in affected.iter().enumerate() {
        let parents = store.get(key).formula.parent_keys(cols);
        for p in parents {
            if index_of[p as usize] != -1 {
                in_degree[i] += 1;
            }
        }
    }

    let mut queue: VecDeque<i32> = VecDeque::new();
    for (i, &key) in affected.iter().enumerate() {
        if in_degree[i] == 0 {
            queue.push_back(key);
        }
    }

    let mut total_sleep: i64 = 0;
    while let Some(cur_key) = queue.pop_front() {
        let formula = store.get(cur_key).formula;
        let outcome = eval::evaluate(store, &formula);
        {
            let cell = store.get_mut(cur_key);
            cell.value = outcome.value;
            cell.error = outcome.error;
        }
        total_sleep += outcome.sleep_seconds;

        for (i, &key) in affected.iter().enumerate() {
            if in_degree[i] <= 0 {
                continue;
            }
            let depends_on_cur = store.get(key).formula.parent_keys(cols).contains(&cur_key);
            if depends_on_cur {
                in_degree[i] -= 1;
                if in_degree[i] == 0 {
                    queue.push_back(key);
                }
            }
        }
    }

    total_sleep
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{BinOp, Formula, Operand, RangeFn};
    use crate::deps;

    fn assign(store: &mut Store, key: i32, formula: Formula) {
        deps::remove_edges(store, key, &store.get(key).formula.clone());
        deps::add_edges(store, key, &formula);
        store.get_mut(key).formula = formula;
        let outcome = eval::evaluate(store, &formula);
        let cell = store.get_mut(key);
        cell.value = outcome.value;
        cell.error = outcome.error;
    }

    #[test]
    fn propagates_through_a_single_chain() {
        let mut store = Store::new(2, 2).unwrap();
        let a1 = store.key(0, 0);
        let b1 = store.key(0, 1);
        let a2 = store.key(1, 0);
        assign(&mut store, a1, Formula::Literal(2));
        assign(&mut store, b1, Formula::BinOp { op: BinOp::Add, left: Operand::Cell(a1), right: Operand::Literal(1) });
        assign(&mut store, a2, Formula::Range { kind: RangeFn::Max, start: a1, end: b1 });

        assign(&mut store, a1, Formula::Literal(5));
        recompute_descendants(&mut store, a1);

        assert_eq!(store.get(b1).value, 6);
        assert_eq!(store.get(a2).value, 6);
    }

    #[test]
    fn diamond_dependent_recomputes_exactly_once() {
        // A1 -> B1, A1 -> C1, D1 = B1 + C1. Reassigning A1 should recompute
        // D1 exactly once even though it has two paths from A1.
        let mut store = Store::new(2, 2).unwrap();
        let a1 = store.key(0, 0);
        let b1 = store.key(0, 1);
        let c1 = store.key(1, 0);
        let d1 = store.key(1, 1);
        assign(&mut store, a1, Formula::Literal(1));
        assign(&mut store, b1, Formula::Ref(a1));
        assign(&mut store, c1, Formula::Ref(a1));
        assign(&mut store, d1, Formula::BinOp { op: BinOp::Add, left: Operand::Cell(b1), right: Operand::Cell(c1) });

        assign(&mut store, a1, Formula::Literal(10));
        recompute_descendants(&mut store, a1);

        assert_eq!(store.get(d1).value, 20);
    }

    #[test]
    fn error_propagates_to_dependents() {
        let mut store = Store::new(3, 1).unwrap();
        let a1 = store.key(0, 0);
        let b1 = store.key(1, 0);
        let c1 = store.key(2, 0);
        assign(&mut store, a1, Formula::Literal(1));
        assign(&mut store, b1, Formula::BinOp { op: BinOp::Sub, left: Operand::Cell(a1), right: Operand::Literal(1) });
        assign(&mut store, c1, Formula::BinOp { op: BinOp::Div, left: Operand::Literal(10), right: Operand::Cell(b1) });
        recompute_descendants(&mut store, a1);
        assert!(store.get(c1).error);

        assign(&mut store, a1, Formula::Literal(2));
        recompute_descendants(&mut store, a1);
        assert!(!store.get(c1).error);
        assert_eq!(store.get(c1).value, 10);
    }
}
