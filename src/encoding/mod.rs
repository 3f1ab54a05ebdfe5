//! Value, level, and dictionary encoders (spec.md §4): the bit-level
//! primitives ([`bitpacking`], [`uleb128`], [`zigzag_leb128`]), the
//! RLE/bit-packed hybrid stream ([`hybrid_rle`]), and the per-page codecs
//! built on top of them ([`plain`], [`dictionary`], [`levels`]).

pub mod bitpacking;
pub mod dictionary;
pub mod hybrid_rle;
pub mod levels;
pub mod plain;
pub mod uleb128;
pub mod zigzag_leb128;

/// The on-wire encoding of a page's values, recorded in its header
/// (spec.md §4, §5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    Plain,
    PlainDictionary,
    Rle,
    BitPacked,
    RleDictionary,
}

impl Encoding {
    pub fn to_thrift_i32(self) -> i32 {
        match self {
            Encoding::Plain => 0,
            Encoding::BitPacked => 3,
            Encoding::Rle => 4,
            Encoding::PlainDictionary => 2,
            Encoding::RleDictionary => 8,
        }
    }
}
