//! Entities of the upstream OSM stream as seen by the relation geometry
//! reconstruction.

use crate::coord::Location;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    Node,
    Way,
    Relation,
}

/// Member of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "type")]
    pub member_type: MemberType,
    #[serde(rename = "ref")]
    pub id: i64,
    #[serde(default)]
    pub role: String,
}

impl Member {
    pub fn new<S: Into<String>>(member_type: MemberType, id: i64, role: S) -> Self {
        Self {
            member_type,
            id,
            role: role.into(),
        }
    }

    pub fn way<S: Into<String>>(id: i64, role: S) -> Self {
        Self::new(MemberType::Way, id, role)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub id: i64,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Relation {
    pub fn new(id: i64, members: Vec<Member>) -> Self {
        Self { id, members }
    }

    /// Returns an iterator over the way members in order.
    pub fn way_members(&self) -> impl Iterator<Item = &Member> + Clone {
        self.members
            .iter()
            .filter(|m| m.member_type == MemberType::Way)
    }
}

/// Reference to a node of a way, with its location if known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRef {
    pub id: i64,
    pub location: Option<Location>,
}

impl NodeRef {
    pub fn new(id: i64, location: Option<Location>) -> Self {
        Self { id, location }
    }
}
