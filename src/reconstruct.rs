//! Reconstruction of the way members of relations from a relation index.
//!
//! The index and the relation stream are both sorted by relation id, so the
//! reconstruction is a merge of both: every call consumes the index up to and
//! including the record of the given relation. Records of relations which are
//! not part of the stream are skipped without decoding.

use crate::buffer::WaySink;
use crate::coord::{self, DROPPED_NODE};
use crate::error::{DesyncKind, Error, Found, Result};
use crate::index::IndexCursor;
use crate::osm::{NodeRef, Relation};
use crate::stats::Stats;

use log::{info, trace};
use memmap2::Mmap;

use std::ops::Deref;

/// Reads a count word and checks that it is not negative.
pub(crate) fn read_count<D: Deref<Target = [u8]>>(cursor: &mut IndexCursor<D>) -> Result<u64> {
    let position = cursor.position();
    let count = cursor.next()?;
    if count < 0 {
        return Err(Error::InvalidCount { position, count });
    }
    Ok(count as u64)
}

/// Skips the way records of a relation record whose header was already read.
pub(crate) fn skip_ways<D: Deref<Target = [u8]>>(
    cursor: &mut IndexCursor<D>,
    way_count: u64,
) -> Result<()> {
    for _ in 0..way_count {
        cursor.next()?; // way id
        let location_count = read_count(cursor)?;
        cursor.skip(location_count)?;
    }
    Ok(())
}

/// Merge scan of a relation index against a sorted stream of relations.
///
/// The reconstructor is the single owner of the index position. After a
/// fatal error the position is undefined and every further call fails with
/// `Error::ScanAborted`.
#[derive(Debug)]
pub struct GeometryReconstructor<D = Mmap> {
    cursor: IndexCursor<D>,
    stats: Stats,
    aborted: bool,
}

impl<D: Deref<Target = [u8]>> GeometryReconstructor<D> {
    pub fn new(cursor: IndexCursor<D>) -> Self {
        Self {
            cursor,
            stats: Stats::default(),
            aborted: false,
        }
    }

    pub fn cursor(&self) -> &IndexCursor<D> {
        &self.cursor
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Reconstructs all way members of `relation` into `sink`.
    ///
    /// Every way member is committed as one way whose node ids are the
    /// coordinate codes from the index; dropped nodes are left out. The role
    /// of each way member is appended to `roles` if given. Returns the number
    /// of ways.
    pub fn reconstruct_way_members<S: WaySink + ?Sized>(
        &mut self,
        relation: &Relation,
        sink: &mut S,
        roles: Option<&mut Vec<String>>,
    ) -> Result<usize> {
        if self.aborted {
            return Err(Error::ScanAborted {
                relation_id: relation.id,
            });
        }
        let result = self
            .seek(relation.id)
            .and_then(|way_count| self.read_ways(relation, way_count, sink, roles));
        if let Err(ref e) = result {
            if e.is_fatal() {
                self.aborted = true;
            }
        }
        result
    }

    /// Advances past all records before `relation_id` and returns the way
    /// count of its record.
    fn seek(&mut self, relation_id: i64) -> Result<i64> {
        let desync = |found| Error::IndexDesync {
            relation_id,
            kind: DesyncKind::Relation,
            expected: relation_id,
            found,
        };
        let end_of_index = |e: Error| match e {
            Error::IndexExhausted { .. } => desync(Found::EndOfIndex),
            e => e,
        };

        let mut idx_relation_id = self.cursor.next().map_err(end_of_index)?;
        while idx_relation_id < relation_id {
            trace!("Skipping relation {} in index", idx_relation_id);
            let way_count = read_count(&mut self.cursor).map_err(end_of_index)?;
            skip_ways(&mut self.cursor, way_count).map_err(end_of_index)?;
            self.stats.num_skipped_relations += 1;
            idx_relation_id = self.cursor.next().map_err(end_of_index)?;
        }
        if idx_relation_id != relation_id {
            return Err(desync(Found::Id(idx_relation_id)));
        }

        let position = self.cursor.position();
        let way_count = self.cursor.next()?;
        if way_count < 0 {
            return Err(Error::InvalidCount {
                position,
                count: way_count,
            });
        }
        Ok(way_count)
    }

    fn read_ways<S: WaySink + ?Sized>(
        &mut self,
        relation: &Relation,
        declared: i64,
        sink: &mut S,
        mut roles: Option<&mut Vec<String>>,
    ) -> Result<usize> {
        let mut stats = Stats::default();
        let mut way_count = 0;
        for member in relation.way_members() {
            if way_count == declared {
                return Err(Error::WayCountMismatch {
                    relation_id: relation.id,
                    declared,
                    found: relation.way_members().count() as i64,
                });
            }

            let idx_way_id = self.cursor.next()?;
            if idx_way_id != member.id {
                return Err(Error::IndexDesync {
                    relation_id: relation.id,
                    kind: DesyncKind::Way,
                    expected: member.id,
                    found: Found::Id(idx_way_id),
                });
            }

            let location_count = read_count(&mut self.cursor)?;
            sink.begin_way(member.id);
            for _ in 0..location_count {
                let code = self.cursor.next()?;
                if code == DROPPED_NODE {
                    info!(
                        "Skipping dropped node in relation {} way {}",
                        relation.id, member.id
                    );
                    stats.num_dropped_nodes += 1;
                    continue;
                }
                let location = coord::decode(code);
                stats.num_missing_locations += location.is_none() as usize;
                stats.num_locations += 1;
                sink.add_node_ref(NodeRef::new(code, location));
            }
            sink.commit();

            if let Some(roles) = &mut roles {
                roles.push(member.role.clone());
            }
            way_count += 1;
        }

        if way_count != declared {
            return Err(Error::WayCountMismatch {
                relation_id: relation.id,
                declared,
                found: way_count,
            });
        }

        stats.num_relations += 1;
        stats.num_ways += way_count as usize;
        self.stats += stats;
        Ok(way_count as usize)
    }
}
