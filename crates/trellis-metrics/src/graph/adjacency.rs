//! Index-based adjacency built once per analysis.
//!
//! Nodes are addressed by their position in the sorted id list. Out- and
//! in-neighbor lists are sorted and deduplicated, so every algorithm that
//! walks them is deterministic.

use std::collections::BTreeMap;

use trellis_core::graph::{Edge, Node};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacency {
    ids: Vec<String>,
    out: Vec<Vec<usize>>,
    inc: Vec<Vec<usize>>,
    edge_count: usize,
}

impl Adjacency {
    /// Build from node ids and `(source, target)` pairs.
    ///
    /// Duplicate ids collapse to one node. Self-loops, repeated pairs, and
    /// pairs naming an unknown id are ignored.
    #[must_use]
    pub fn new<'a>(
        ids: impl IntoIterator<Item = &'a str>,
        edges: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut ids: Vec<String> = ids.into_iter().map(str::to_string).collect();
        ids.sort_unstable();
        ids.dedup();

        let index: BTreeMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut out = vec![Vec::new(); ids.len()];
        let mut inc = vec![Vec::new(); ids.len()];
        for (source, target) in edges {
            let (Some(&s), Some(&t)) = (index.get(source), index.get(target)) else {
                continue;
            };
            if s == t {
                continue;
            }
            out[s].push(t);
            inc[t].push(s);
        }

        for list in out.iter_mut().chain(inc.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }
        let edge_count = out.iter().map(Vec::len).sum();

        Self {
            ids,
            out,
            inc,
            edge_count,
        }
    }

    #[must_use]
    pub fn from_graph(nodes: &[Node], edges: &[Edge]) -> Self {
        Self::new(
            nodes.iter().map(|n| n.id.as_str()),
            edges.iter().map(|e| (e.source.as_str(), e.target.as_str())),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    #[must_use]
    pub fn id(&self, node: usize) -> &str {
        &self.ids[node]
    }

    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Sorted out-neighbors of `node`.
    #[must_use]
    pub fn out(&self, node: usize) -> &[usize] {
        &self.out[node]
    }

    /// Sorted in-neighbors of `node`.
    #[must_use]
    pub fn inc(&self, node: usize) -> &[usize] {
        &self.inc[node]
    }

    #[must_use]
    pub fn out_degree(&self, node: usize) -> usize {
        self.out[node].len()
    }

    #[must_use]
    pub fn in_degree(&self, node: usize) -> usize {
        self.inc[node].len()
    }

    #[must_use]
    pub fn total_degree(&self, node: usize) -> usize {
        self.in_degree(node) + self.out_degree(node)
    }

    #[must_use]
    pub fn has_edge(&self, source: usize, target: usize) -> bool {
        self.out[source].binary_search(&target).is_ok()
    }

    /// Undirected neighborhood: union of out- and in-neighbors, sorted.
    #[must_use]
    pub fn neighbors(&self, node: usize) -> Vec<usize> {
        let (a, b) = (&self.out[node], &self.inc[node]);
        let mut merged = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => {
                    merged.push(a[i]);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    merged.push(b[j]);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    merged.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend_from_slice(&a[i..]);
        merged.extend_from_slice(&b[j..]);
        merged
    }

    /// Iterate `(source, target)` index pairs in sorted order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.out
            .iter()
            .enumerate()
            .flat_map(|(s, targets)| targets.iter().map(move |&t| (s, t)))
    }
}
