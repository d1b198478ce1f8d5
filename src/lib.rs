//! Reconstruction of OSM relation way geometries from a relation index.
//!
//! A relation index is a flat file of 64-bit words listing, for every
//! relation sorted by id, the locations of the nodes of its way members (see
//! [`index`]). Locations are packed into single words (see [`coord`]).
//! [`GeometryReconstructor`] walks the index in lockstep with a stream of
//! relations sorted the same way, so that no node locations have to be kept
//! in memory.

pub mod buffer;
pub mod check;
pub mod coord;
pub mod error;
pub mod index;
pub mod input;
pub mod jsonl;
pub mod middle;
pub mod osm;
pub mod reconstruct;
pub mod stats;

pub use crate::buffer::{WayBuffer, WaySink, WayView};
pub use crate::coord::Location;
pub use crate::error::{Error, Result};
pub use crate::index::{Endianness, IndexCursor};
pub use crate::input::{ChunkSource, InputIterator};
pub use crate::middle::{MiddleHandle, MiddleQuery, RelationIndexMiddle};
pub use crate::osm::{Member, MemberType, NodeRef, Relation};
pub use crate::reconstruct::GeometryReconstructor;
pub use crate::stats::Stats;
