//! Packing of a fixed point longitude/latitude pair into a single signed
//! 64-bit word.
//!
//! Layout of a code:
//!
//! * bit 63 is set iff the code carries a location, i.e. every code `>= 0`
//!   decodes to no location;
//! * the 32 bits of the longitude are spread over the even bits `0, 2, .., 62`;
//! * the lower 31 bits of the latitude are spread over the odd bits
//!   `1, 3, .., 61`. The latitude is sign extended from its bit 30 on decoding.
//!
//! The odd slot at bit 63 would hold bit 31 of the latitude, but it is
//! occupied by the location flag. The layout is fixed by the index file
//! format and must not change.

use crate::error::{Error, Result};
use crate::osm::NodeRef;

/// Number of fixed point units per degree.
pub const COORDINATE_PRECISION: f64 = 10_000_000.0;

/// Code marking a node which was dropped when the index was built.
pub const DROPPED_NODE: i64 = 0;

const LOCATION_FLAG: u64 = 1 << 63;
const LAT_MASK: u32 = 0x7FFF_FFFF;
const LAT_MIN: i32 = -(1 << 30);
const LAT_MAX: i32 = (1 << 30) - 1;

/// Location in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub lon: f64,
    pub lat: f64,
}

impl Location {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Spreads the bits of `x` over the even bits of the result.
#[inline]
fn spread(x: u32) -> u64 {
    let mut x = u64::from(x);
    x = (x | (x << 16)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x << 8)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333_3333_3333;
    x = (x | (x << 1)) & 0x5555_5555_5555_5555;
    x
}

/// Inverse of `spread`: collects the even bits of `x`.
#[inline]
fn compact(x: u64) -> u32 {
    let mut x = x & 0x5555_5555_5555_5555;
    x = (x | (x >> 1)) & 0x3333_3333_3333_3333;
    x = (x | (x >> 2)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x >> 4)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x >> 8)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x >> 16)) & 0x0000_0000_FFFF_FFFF;
    x as u32
}

fn to_fixed(degrees: f64) -> Option<i32> {
    let scaled = (degrees * COORDINATE_PRECISION).round();
    if scaled >= f64::from(i32::MIN) && scaled <= f64::from(i32::MAX) {
        Some(scaled as i32)
    } else {
        // also NaN
        None
    }
}

/// Encodes a location given in fixed point units of 1e-7 degree.
///
/// Fails if `lat` does not fit into 31 bits two's complement.
pub fn encode_fixed(lon: i32, lat: i32) -> Result<i64> {
    if lat < LAT_MIN || lat > LAT_MAX {
        return Err(Error::OutOfRange {
            lon: f64::from(lon) / COORDINATE_PRECISION,
            lat: f64::from(lat) / COORDINATE_PRECISION,
        });
    }
    let code = spread(lon as u32) | (spread(lat as u32 & LAT_MASK) << 1) | LOCATION_FLAG;
    Ok(code as i64)
}

/// Encodes a location given in degrees.
///
/// Both values are rounded to the nearest 1e-7 degree.
pub fn encode(lon: f64, lat: f64) -> Result<i64> {
    let out_of_range = || Error::OutOfRange { lon, lat };
    let fixed_lon = to_fixed(lon).ok_or_else(out_of_range)?;
    let fixed_lat = to_fixed(lat).ok_or_else(out_of_range)?;
    encode_fixed(fixed_lon, fixed_lat).map_err(|_| out_of_range())
}

/// Decodes a code into fixed point units, `None` if the code has no location.
#[inline]
pub fn decode_fixed(code: i64) -> Option<(i32, i32)> {
    if code >= 0 {
        return None;
    }
    let bits = code as u64;
    let lon = compact(bits) as i32;
    // shift out the location flag and sign extend from bit 30
    let lat = ((compact(bits >> 1) << 1) as i32) >> 1;
    Some((lon, lat))
}

/// Decodes a code into a location in degrees.
///
/// Total on all inputs: every code `>= 0` (in particular `DROPPED_NODE`) has
/// no location.
#[inline]
pub fn decode(code: i64) -> Option<Location> {
    decode_fixed(code).map(|(lon, lat)| {
        Location::new(f64::from(lon) * 0.000_000_1, f64::from(lat) * 0.000_000_1)
    })
}

/// Sets the location of every node whose id is a coordinate code.
///
/// Returns the number of nodes.
pub fn locate_nodes(nodes: &mut [NodeRef]) -> usize {
    for node in nodes.iter_mut() {
        node.location = decode(node.id);
    }
    nodes.len()
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn assert_close(loc: Location, lon: f64, lat: f64) {
        assert!((loc.lon - lon).abs() <= 1e-7, "{} != {}", loc.lon, lon);
        assert!((loc.lat - lat).abs() <= 1e-7, "{} != {}", loc.lat, lat);
    }

    #[test]
    fn test_zero_has_no_location() {
        assert_eq!(decode(DROPPED_NODE), None);
        assert_eq!(decode(1), None);
        assert_eq!(decode(i64::MAX), None);
    }

    #[test]
    fn test_flag_only_is_null_island() {
        assert_eq!(decode(i64::MIN), Some(Location::new(0.0, 0.0)));
        assert_eq!(encode(0.0, 0.0).unwrap(), i64::MIN);
    }

    #[test]
    fn test_bit_layout() {
        // lon = 1 -> bit 0, lat = 1 -> bit 1
        assert_eq!(encode_fixed(1, 0).unwrap(), i64::MIN | 1);
        assert_eq!(encode_fixed(0, 1).unwrap(), i64::MIN | 2);
        assert_eq!(decode_fixed(i64::MIN | 0b11), Some((1, 1)));
        // negative latitude lives in 31 bits
        assert_eq!(decode_fixed(encode_fixed(0, -1).unwrap()), Some((0, -1)));
        assert_eq!(decode_fixed(encode_fixed(-1, 0).unwrap()), Some((-1, 0)));
    }

    #[test]
    fn test_known_locations() {
        let code = encode(13.377_704_1, 52.516_275_3).unwrap();
        assert!(code < 0);
        assert_close(decode(code).unwrap(), 13.377_704_1, 52.516_275_3);

        let code = encode(-180.0, -90.0).unwrap();
        assert_close(decode(code).unwrap(), -180.0, -90.0);
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            encode(215.0, 0.0),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(
            encode(0.0, 107.5),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(
            encode(0.0, -107.5),
            Err(Error::OutOfRange { .. })
        ));
        assert!(encode(f64::NAN, 0.0).is_err());
        assert!(encode_fixed(0, 1 << 30).is_err());
        assert!(encode_fixed(0, LAT_MIN).is_ok());
        assert!(encode_fixed(i32::MIN, LAT_MAX).is_ok());
    }

    #[test]
    fn test_locate_nodes() {
        let code = encode(1.5, -2.5).unwrap();
        let mut nodes = vec![NodeRef::new(code, None), NodeRef::new(42, None)];
        assert_eq!(locate_nodes(&mut nodes), 2);
        assert_close(nodes[0].location.unwrap(), 1.5, -2.5);
        assert_eq!(nodes[1].location, None);
    }

    proptest! {
        #[test]
        fn test_roundtrip(lon in -214.0f64..214.0, lat in -90.0f64..90.0) {
            let loc = decode(encode(lon, lat).unwrap()).unwrap();
            prop_assert!((loc.lon - lon).abs() <= 1e-7);
            prop_assert!((loc.lat - lat).abs() <= 1e-7);
        }

        #[test]
        fn test_fixed_roundtrip(lon in any::<i32>(), lat in LAT_MIN..=LAT_MAX) {
            prop_assert_eq!(decode_fixed(encode_fixed(lon, lat).unwrap()), Some((lon, lat)));
        }

        #[test]
        fn test_non_negative_codes_have_no_location(code in 0..=i64::MAX) {
            prop_assert_eq!(decode(code), None);
        }

        #[test]
        fn test_negative_codes_decode_in_range(code in i64::MIN..0) {
            let loc = decode(code).unwrap();
            prop_assert!(loc.lat.abs() <= 107.4);
            prop_assert!(loc.lon.abs() <= 214.8);
        }
    }
}
