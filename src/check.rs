use crate::coord::{self, DROPPED_NODE};
use crate::error::{DesyncKind, Error, Found, Result};
use crate::index::IndexCursor;
use crate::reconstruct::read_count;
use crate::stats::Stats;

use log::info;

use std::ops::Deref;

/// Walks all relation records from the current position to the end of the
/// index and checks the structure of the index.
///
/// Relation ids must be strictly increasing and every record must be
/// complete. `progress` is called with the cursor position after each
/// relation record.
pub fn check_index<D, F>(cursor: &mut IndexCursor<D>, mut progress: F) -> Result<Stats>
where
    D: Deref<Target = [u8]>,
    F: FnMut(usize),
{
    let mut stats = Stats::default();
    let mut last_relation_id = None;
    while !cursor.is_exhausted() {
        let relation_id = cursor.next()?;
        if let Some(last) = last_relation_id {
            if relation_id <= last {
                return Err(Error::IndexDesync {
                    relation_id: last,
                    kind: DesyncKind::Relation,
                    expected: last.saturating_add(1),
                    found: Found::Id(relation_id),
                });
            }
        }
        last_relation_id = Some(relation_id);

        let way_count = read_count(cursor)?;
        for _ in 0..way_count {
            cursor.next()?; // way id
            let location_count = read_count(cursor)?;
            for _ in 0..location_count {
                let code = cursor.next()?;
                if code == DROPPED_NODE {
                    stats.num_dropped_nodes += 1;
                } else {
                    stats.num_locations += 1;
                    stats.num_missing_locations += coord::decode(code).is_none() as usize;
                }
            }
        }
        stats.num_relations += 1;
        stats.num_ways += way_count as usize;
        progress(cursor.position());
    }
    info!("Checked {} relation(s) in index", stats.num_relations);
    Ok(stats)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coord::encode;
    use crate::index::{words_to_bytes, Endianness};

    fn cursor(words: &[i64]) -> IndexCursor<Vec<u8>> {
        IndexCursor::from_storage(words_to_bytes(words, Endianness::Native), Endianness::Native)
    }

    #[test]
    fn test_check_valid_index() {
        let c = encode(3.0, 4.0).unwrap();
        let mut cursor = cursor(&[1, 1, 10, 3, c, 0, 5, 4, 0, 9, 2, 20, 0, 21, 1, c]);
        let mut positions = Vec::new();
        let stats = check_index(&mut cursor, |p| positions.push(p)).unwrap();
        assert_eq!(stats.num_relations, 3);
        assert_eq!(stats.num_ways, 3);
        assert_eq!(stats.num_locations, 3);
        assert_eq!(stats.num_dropped_nodes, 1);
        assert_eq!(stats.num_missing_locations, 1);
        assert_eq!(positions, vec![7, 9, 16]);
    }

    #[test]
    fn test_check_empty_index() {
        let stats = check_index(&mut cursor(&[]), |_| ()).unwrap();
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn test_check_unsorted_index() {
        let result = check_index(&mut cursor(&[2, 0, 2, 0]), |_| ());
        assert!(matches!(
            result,
            Err(Error::IndexDesync {
                found: Found::Id(2),
                ..
            })
        ));
    }

    #[test]
    fn test_check_relation_after_max_id() {
        let result = check_index(&mut cursor(&[i64::MAX, 0, i64::MAX, 0]), |_| ());
        assert!(matches!(
            result,
            Err(Error::IndexDesync {
                relation_id: i64::MAX,
                expected: i64::MAX,
                found: Found::Id(i64::MAX),
                ..
            })
        ));
    }

    #[test]
    fn test_check_truncated_index() {
        let result = check_index(&mut cursor(&[1, 1, 10, 2, 0]), |_| ());
        assert!(matches!(result, Err(Error::IndexExhausted { .. })));
    }
}
