//! Weak and strong connectivity.
//!
//! Both traversals use explicit stacks: corpora can chain thousands of
//! documents deep, and recursion would put that depth on the call stack.

use fixedbitset::FixedBitSet;

use crate::graph::Adjacency;

/// Connected components of the underlying undirected graph.
///
/// Components are discovered from the lowest unvisited node index, and
/// members within each component are sorted.
#[must_use]
pub fn weak_components(adj: &Adjacency) -> Vec<Vec<usize>> {
    let mut visited = FixedBitSet::with_capacity(adj.len());
    let mut components = Vec::new();

    for start in 0..adj.len() {
        if visited.contains(start) {
            continue;
        }

        let mut members = Vec::new();
        let mut stack = vec![start];
        visited.insert(start);

        while let Some(node) = stack.pop() {
            members.push(node);
            for &next in adj.out(node).iter().chain(adj.inc(node)) {
                if !visited.contains(next) {
                    visited.insert(next);
                    stack.push(next);
                }
            }
        }

        members.sort_unstable();
        components.push(members);
    }

    components
}

/// Strongly connected components by Kosaraju's two-pass algorithm.
///
/// Pass one records DFS finish order on the forward graph; pass two walks
/// the reverse graph in reverse finish order, and each new root starts a
/// component. Members within each component are sorted.
#[must_use]
pub fn strong_components(adj: &Adjacency) -> Vec<Vec<usize>> {
    let n = adj.len();
    let order = finish_order(adj);

    let mut assigned = FixedBitSet::with_capacity(n);
    let mut components = Vec::new();

    for &root in order.iter().rev() {
        if assigned.contains(root) {
            continue;
        }

        let mut members = Vec::new();
        let mut stack = vec![root];
        assigned.insert(root);

        while let Some(node) = stack.pop() {
            members.push(node);
            for &prev in adj.inc(node) {
                if !assigned.contains(prev) {
                    assigned.insert(prev);
                    stack.push(prev);
                }
            }
        }

        members.sort_unstable();
        components.push(members);
    }

    components
}

/// Post-order of an iterative DFS over out-edges, roots taken in index
/// order.
fn finish_order(adj: &Adjacency) -> Vec<usize> {
    let n = adj.len();
    let mut visited = FixedBitSet::with_capacity(n);
    let mut order = Vec::with_capacity(n);
    // (node, index of the next out-neighbor to try)
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if visited.contains(root) {
            continue;
        }
        visited.insert(root);
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, cursor) = *frame;
            if let Some(&next) = adj.out(node).get(cursor) {
                frame.1 += 1;
                if !visited.contains(next) {
                    visited.insert(next);
                    stack.push((next, 0));
                }
            } else {
                order.push(node);
                stack.pop();
            }
        }
    }

    order
}
