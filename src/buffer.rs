use crate::coord::Location;
use crate::osm::NodeRef;

use std::ops::Range;

/// Receiver of reconstructed ways.
///
/// A way is started with `begin_way`, filled with `add_node_ref` and becomes
/// visible only after `commit`. Starting a new way discards an uncommitted
/// one.
pub trait WaySink {
    fn begin_way(&mut self, id: i64);
    fn add_node_ref(&mut self, node: NodeRef);
    fn commit(&mut self);
}

/// Committed way in a `WayBuffer`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WayView<'a> {
    pub id: i64,
    pub nodes: &'a [NodeRef],
}

impl<'a> WayView<'a> {
    /// Iterates over the node locations, skipping nodes without one.
    pub fn locations(&self) -> impl Iterator<Item = Location> + 'a {
        let nodes = self.nodes;
        nodes.iter().filter_map(|n| n.location)
    }
}

/// Growable buffer of ways stored in two flat vectors.
///
/// Every way stores the index of its first node; the nodes of way `i` are
/// `nodes[ways[i].1..ways[i + 1].1]`, the last way ends at the committed end
/// of the node vector.
#[derive(Debug, Default)]
pub struct WayBuffer {
    ways: Vec<(i64, usize)>,
    nodes: Vec<NodeRef>,
    pending: Option<i64>,
    committed_nodes: usize,
}

impl WayBuffer {
    pub fn new() -> Self {
        Default::default()
    }

    /// Number of committed ways.
    pub fn len(&self) -> usize {
        self.ways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ways.is_empty()
    }

    fn node_range(&self, idx: usize) -> Range<usize> {
        let start = self.ways[idx].1;
        let end = self
            .ways
            .get(idx + 1)
            .map(|w| w.1)
            .unwrap_or(self.committed_nodes);
        start..end
    }

    pub fn get(&self, idx: usize) -> Option<WayView> {
        if idx >= self.ways.len() {
            return None;
        }
        Some(WayView {
            id: self.ways[idx].0,
            nodes: &self.nodes[self.node_range(idx)],
        })
    }

    /// Iterates over the committed ways.
    pub fn iter(&self) -> impl Iterator<Item = WayView> + '_ {
        (0..self.ways.len()).filter_map(move |idx| self.get(idx))
    }

    /// Removes all ways, committed or not.
    pub fn clear(&mut self) {
        self.ways.clear();
        self.nodes.clear();
        self.pending = None;
        self.committed_nodes = 0;
    }

    fn rollback(&mut self) {
        self.nodes.truncate(self.committed_nodes);
        self.pending = None;
    }
}

impl WaySink for WayBuffer {
    fn begin_way(&mut self, id: i64) {
        self.rollback();
        self.pending = Some(id);
    }

    fn add_node_ref(&mut self, node: NodeRef) {
        debug_assert!(self.pending.is_some(), "node added outside of a way");
        self.nodes.push(node);
    }

    fn commit(&mut self) {
        if let Some(id) = self.pending.take() {
            self.ways.push((id, self.committed_nodes));
            self.committed_nodes = self.nodes.len();
        }
    }
}
