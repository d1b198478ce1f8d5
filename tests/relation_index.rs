use osmrelgeom::check::check_index;
use osmrelgeom::coord::{self, encode};
use osmrelgeom::error::{DesyncKind, Found};
use osmrelgeom::jsonl::JsonRelationSource;
use osmrelgeom::{
    Endianness, Error, GeometryReconstructor, IndexCursor, InputIterator, Member, MiddleQuery,
    Relation, RelationIndexMiddle, WayBuffer,
};

use byteorder::{LittleEndian, NativeEndian, WriteBytesExt};
use tempfile::NamedTempFile;

use std::cell::RefCell;
use std::io::{Cursor, Write};
use std::rc::Rc;

fn write_index(words: &[i64]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for &word in words {
        file.write_i64::<NativeEndian>(word).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_reconstruct_from_mapped_file() {
    let c1 = encode(13.4, 52.5).unwrap();
    let file = write_index(&[5, 1, 7, 2, c1, 0]);

    let cursor = IndexCursor::open(file.path(), Endianness::Native).unwrap();
    assert_eq!(cursor.len(), 6);
    let mut reconstructor = GeometryReconstructor::new(cursor);

    let relation = Relation::new(5, vec![Member::way(7, "outer")]);
    let mut buffer = WayBuffer::new();
    let mut roles = Vec::new();
    let way_count = reconstructor
        .reconstruct_way_members(&relation, &mut buffer, Some(&mut roles))
        .unwrap();

    assert_eq!(way_count, 1);
    assert_eq!(roles, vec!["outer"]);
    let way = buffer.get(0).unwrap();
    assert_eq!(way.id, 7);
    assert_eq!(way.nodes.len(), 1);
    assert_eq!(way.nodes[0].id, c1);
    assert_eq!(way.nodes[0].location, coord::decode(c1));
}

#[test]
fn test_missing_relation_in_mapped_file() {
    let file = write_index(&[5, 1, 7, 1, encode(0.0, 0.0).unwrap()]);
    let mut reconstructor =
        GeometryReconstructor::new(IndexCursor::open(file.path(), Endianness::Native).unwrap());
    let result =
        reconstructor.reconstruct_way_members(&Relation::new(9, vec![]), &mut WayBuffer::new(), None);
    match result {
        Err(Error::IndexDesync {
            relation_id: 9,
            kind: DesyncKind::Relation,
            expected: 9,
            found: Found::EndOfIndex,
        }) => (),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_little_endian_index() {
    let mut file = NamedTempFile::new().unwrap();
    for &word in &[3_i64, 0, 4, 1, 40, 1, -1] {
        file.write_i64::<LittleEndian>(word).unwrap();
    }
    file.flush().unwrap();

    let mut cursor = IndexCursor::open(file.path(), Endianness::Little).unwrap();
    let stats = check_index(&mut cursor, |_| ()).unwrap();
    assert_eq!(stats.num_relations, 2);
    assert_eq!(stats.num_ways, 1);
    assert_eq!(stats.num_locations, 1);
}

#[test]
fn test_stream_relations_through_middle() {
    let a = encode(1.0, 2.0).unwrap();
    let b = encode(3.0, 4.0).unwrap();
    #[rustfmt::skip]
    let file = write_index(&[
        1, 1, 11, 2, a, b,
        2, 2, 21, 1, a, 22, 2, b, 0,
        3, 1, 31, 1, b,
        4, 0,
    ]);
    let input = r#"{"id":2,"members":[{"type":"way","ref":21,"role":"outer"},{"type":"node","ref":9,"role":"label"},{"type":"way","ref":22,"role":"inner"}]}
{"id":4,"members":[{"type":"relation","ref":2,"role":""}]}
"#;

    let middle = RelationIndexMiddle::new(IndexCursor::open(file.path(), Endianness::Native).unwrap());
    let query = middle.query();
    let source = Rc::new(RefCell::new(JsonRelationSource::new(Cursor::new(input), 1)));

    let mut buffer = WayBuffer::new();
    let mut roles = Vec::new();
    let mut counts = Vec::new();
    for relation in InputIterator::new(source.clone()) {
        counts.push(
            query
                .rel_way_members_get(&relation, Some(&mut roles), &mut buffer)
                .unwrap(),
        );
    }
    assert!(source.borrow_mut().take_error().is_none());

    assert_eq!(counts, vec![2, 0]);
    assert_eq!(roles, vec!["outer", "inner"]);
    let ways: Vec<_> = buffer.iter().map(|w| (w.id, w.nodes.len())).collect();
    assert_eq!(ways, vec![(21, 1), (22, 1)]);

    let stats = middle.stats();
    assert_eq!(stats.num_relations, 2);
    assert_eq!(stats.num_skipped_relations, 2);
    assert_eq!(stats.num_dropped_nodes, 1);
}
