use std::fmt;
use std::io;
use std::path::PathBuf;

/// Which part of a relation record disagreed with the entity stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesyncKind {
    Relation,
    Way,
}

impl fmt::Display for DesyncKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DesyncKind::Relation => write!(f, "relation"),
            DesyncKind::Way => write!(f, "way"),
        }
    }
}

/// Value read from the index where another one was expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Found {
    Id(i64),
    EndOfIndex,
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Found::Id(id) => write!(f, "{}", id),
            Found::EndOfIndex => write!(f, "end of index"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Coordinate does not fit into the fixed point representation.
    #[error("coordinate out of range: lon={lon}, lat={lat}")]
    OutOfRange { lon: f64, lat: f64 },

    #[error("relation index {} is unavailable: {source}", .path.display())]
    IndexUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("relation index exhausted at word {position} of {len}")]
    IndexExhausted { position: usize, len: usize },

    #[error(
        "relation index out of sync in relation {relation_id}: \
         expected {kind} {expected}, found {found}"
    )]
    IndexDesync {
        relation_id: i64,
        kind: DesyncKind,
        expected: i64,
        found: Found,
    },

    #[error("relation index has invalid count {count} at word {position}")]
    InvalidCount { position: usize, count: i64 },

    #[error(
        "relation {relation_id} declares {declared} way(s) in the index, \
         but has {found} way member(s)"
    )]
    WayCountMismatch {
        relation_id: i64,
        declared: i64,
        found: i64,
    },

    #[error("operation `{0}` is not supported by this backend")]
    NotSupported(&'static str),

    #[error("relation scan was aborted before relation {relation_id}")]
    ScanAborted { relation_id: i64 },

    #[error("relation scan is already advanced by another handle")]
    ScanInUse,

    #[error("invalid relation at line {line}: {source}")]
    InvalidRelation {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether the error leaves the relation scan in an undefined state.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::IndexExhausted { .. }
            | Error::IndexDesync { .. }
            | Error::InvalidCount { .. }
            | Error::WayCountMismatch { .. }
            | Error::ScanAborted { .. } => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_desync_message_names_ids() {
        let err = Error::IndexDesync {
            relation_id: 5,
            kind: DesyncKind::Way,
            expected: 7,
            found: Found::Id(8),
        };
        assert_eq!(
            err.to_string(),
            "relation index out of sync in relation 5: expected way 7, found 8"
        );
        assert!(err.is_fatal());

        let err = Error::IndexDesync {
            relation_id: 9,
            kind: DesyncKind::Relation,
            expected: 9,
            found: Found::EndOfIndex,
        };
        assert_eq!(
            err.to_string(),
            "relation index out of sync in relation 9: expected relation 9, found end of index"
        );
    }

    #[test]
    fn test_codec_errors_are_recoverable() {
        let err = Error::OutOfRange {
            lon: 300.0,
            lat: 0.0,
        };
        assert!(!err.is_fatal());
        assert!(!Error::NotSupported("way_get").is_fatal());
    }
}
