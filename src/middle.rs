//! Query interface of the import pipeline backed by a relation index.
//!
//! `MiddleQuery` lists the queries a node/way/relation storage backend may
//! answer. A backend implements only what it can do; every other query fails
//! with `Error::NotSupported`.

use crate::buffer::WaySink;
use crate::coord;
use crate::error::{Error, Result};
use crate::index::IndexCursor;
use crate::osm::{NodeRef, Relation};
use crate::reconstruct::GeometryReconstructor;
use crate::stats::Stats;

use memmap2::Mmap;
use parking_lot::Mutex;

use std::ops::Deref;

pub trait MiddleQuery {
    /// Sets the locations of `nodes` and returns the number of nodes found.
    fn nodes_get_list(&self, _nodes: &mut [NodeRef]) -> Result<usize> {
        Err(Error::NotSupported("nodes_get_list"))
    }

    /// Writes the way with id `id` into `sink`.
    fn way_get(&self, _id: i64, _sink: &mut dyn WaySink) -> Result<bool> {
        Err(Error::NotSupported("way_get"))
    }

    fn relation_get(&self, _id: i64) -> Result<Option<Relation>> {
        Err(Error::NotSupported("relation_get"))
    }

    /// Returns the ids of all relations having the way `way_id` as member.
    fn relations_using_way(&self, _way_id: i64) -> Result<Vec<i64>> {
        Err(Error::NotSupported("relations_using_way"))
    }

    /// Writes all way members of `relation` into `sink` and returns their
    /// number.
    fn rel_way_members_get(
        &self,
        _relation: &Relation,
        _roles: Option<&mut Vec<String>>,
        _sink: &mut dyn WaySink,
    ) -> Result<usize> {
        Err(Error::NotSupported("rel_way_members_get"))
    }
}

/// Backend whose nodes carry their location encoded in the node id, and
/// whose relation geometries come from a relation index.
///
/// The backend owns the single scan over the index. Queries go through
/// `MiddleHandle`s borrowed from it; at most one of them can advance the scan
/// at a time, a concurrent attempt fails with `Error::ScanInUse`.
pub struct RelationIndexMiddle<D = Mmap> {
    scan: Mutex<GeometryReconstructor<D>>,
}

impl<D: Deref<Target = [u8]>> RelationIndexMiddle<D> {
    pub fn new(cursor: IndexCursor<D>) -> Self {
        Self {
            scan: Mutex::new(GeometryReconstructor::new(cursor)),
        }
    }

    /// Returns a query handle borrowing this backend.
    pub fn query(&self) -> MiddleHandle<'_, D> {
        MiddleHandle { middle: self }
    }

    /// Statistics of the scan so far.
    ///
    /// Blocks while a handle is advancing the scan.
    pub fn stats(&self) -> Stats {
        self.scan.lock().stats().clone()
    }

    pub fn into_inner(self) -> GeometryReconstructor<D> {
        self.scan.into_inner()
    }
}

/// Borrowed query handle of a `RelationIndexMiddle`.
pub struct MiddleHandle<'a, D> {
    middle: &'a RelationIndexMiddle<D>,
}

impl<'a, D> Clone for MiddleHandle<'a, D> {
    fn clone(&self) -> Self {
        Self {
            middle: self.middle,
        }
    }
}

impl<'a, D: Deref<Target = [u8]>> MiddleQuery for MiddleHandle<'a, D> {
    fn nodes_get_list(&self, nodes: &mut [NodeRef]) -> Result<usize> {
        Ok(coord::locate_nodes(nodes))
    }

    fn rel_way_members_get(
        &self,
        relation: &Relation,
        roles: Option<&mut Vec<String>>,
        sink: &mut dyn WaySink,
    ) -> Result<usize> {
        let mut scan = self.middle.scan.try_lock().ok_or(Error::ScanInUse)?;
        scan.reconstruct_way_members(relation, sink, roles)
    }
}
