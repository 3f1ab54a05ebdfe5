//! Repetition/definition level streams (spec.md §3, §4.6): each is an
//! RLE/bit-packed hybrid stream at `bitWidth(maxLevel)`, prefixed (in the
//! page) with its own 4-byte little-endian length. A column whose
//! `maxLevel == 0` has no level stream at all: every record contributes
//! exactly one non-null value, so there is nothing to encode.

use crate::encoding::hybrid_rle;

/// Buffers level values for one page and hybrid-encodes them on flush.
pub struct LevelEncoder {
    max_level: i16,
    values: Vec<u32>,
}

impl LevelEncoder {
    pub fn new(max_level: i16) -> Self {
        Self {
            max_level,
            values: Vec::new(),
        }
    }

    pub fn max_level(&self) -> i16 {
        self.max_level
    }

    /// Whether this column needs a level stream at all.
    pub fn is_trivial(&self) -> bool {
        self.max_level == 0
    }

    pub fn push(&mut self, level: i16) {
        debug_assert!(level >= 0 && level <= self.max_level);
        if !self.is_trivial() {
            self.values.push(level as u32);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn bit_width(&self) -> u8 {
        crate::encoding::bitpacking::bit_width(self.max_level as u32)
    }

    /// Encodes the buffered levels as a hybrid-RLE stream, returning `None`
    /// when `max_level == 0` (nothing to write).
    pub fn finish(&self) -> Option<Vec<u8>> {
        if self.is_trivial() {
            return None;
        }
        Some(hybrid_rle::encode(&self.values, self.bit_width()))
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Decodes a level stream written by [`LevelEncoder::finish`]. Returns a
/// vector of all-zero levels without touching `bytes` when `max_level == 0`.
pub fn decode(bytes: &[u8], max_level: i16, count: usize) -> Vec<i16> {
    if max_level == 0 {
        return vec![0; count];
    }
    let width = crate::encoding::bitpacking::bit_width(max_level as u32);
    hybrid_rle::decode(bytes, width, count)
        .into_iter()
        .map(|v| v as i16)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivial_column_emits_nothing() {
        let mut enc = LevelEncoder::new(0);
        enc.push(0);
        enc.push(0);
        assert!(enc.is_trivial());
        assert!(enc.finish().is_none());
        assert_eq!(decode(&[], 0, 2), vec![0, 0]);
    }

    #[test]
    fn roundtrip_nontrivial_levels() {
        let mut enc = LevelEncoder::new(2);
        let levels = vec![0i16, 1, 2, 2, 0, 1, 2];
        for &l in &levels {
            enc.push(l);
        }
        let bytes = enc.finish().unwrap();
        assert_eq!(decode(&bytes, 2, levels.len()), levels);
    }
}
