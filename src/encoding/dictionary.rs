//! Dictionary encoding (spec.md §4.5): values are deduplicated into an
//! insertion-ordered dictionary, and the column stores small integer ids
//! instead of repeating full values. Ids are themselves written with the
//! RLE/bit-packed hybrid ([`super::hybrid_rle`]); the dictionary itself is
//! written as a PLAIN page.
//!
//! Callers fall back to PLAIN encoding once the dictionary's PLAIN-encoded
//! byte size would exceed the configured budget (`WriteOptions::dictionary_page_size`,
//! spec.md's resolution of the "what happens when the dictionary grows
//! unbounded" open question): the page(s) already emitted under
//! `RLE_DICTIONARY` are kept, and later values in the same column chunk
//! switch to PLAIN.

use std::collections::HashMap;

use crate::encoding::hybrid_rle;

/// An insertion-ordered value -> id map, keyed on a value's PLAIN-encoded
/// byte representation so it works uniformly across physical types.
pub struct DictionaryEncoder {
    map: HashMap<Vec<u8>, u32>,
    /// Each entry's PLAIN-encoded bytes, in insertion (== id) order.
    entries: Vec<Vec<u8>>,
    ids: Vec<u32>,
    plain_byte_size: usize,
}

impl DictionaryEncoder {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            entries: Vec::new(),
            ids: Vec::new(),
            plain_byte_size: 0,
        }
    }

    /// Records one value (given as its PLAIN-encoded representation),
    /// inserting it into the dictionary if new, and returns its id.
    pub fn push(&mut self, plain_bytes: &[u8]) -> u32 {
        let id = match self.map.get(plain_bytes) {
            Some(&id) => id,
            None => {
                let id = self.entries.len() as u32;
                self.entries.push(plain_bytes.to_vec());
                self.map.insert(plain_bytes.to_vec(), id);
                self.plain_byte_size += plain_bytes.len();
                id
            }
        };
        self.ids.push(id);
        id
    }

    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    pub fn num_values(&self) -> usize {
        self.ids.len()
    }

    /// The dictionary's PLAIN-encoded byte size, used to decide whether to
    /// fall back to PLAIN encoding.
    pub fn plain_byte_size(&self) -> usize {
        self.plain_byte_size
    }

    /// Concatenation of every distinct value's PLAIN bytes, in id order;
    /// this is the dictionary page's payload.
    pub fn dictionary_page_bytes(&self) -> Vec<u8> {
        self.entries.concat()
    }

    /// The RLE-hybrid-encoded id stream for every value pushed so far,
    /// including the data page's leading bit-width byte (spec.md §4.5).
    pub fn encode_ids(&self) -> Vec<u8> {
        let width = ids_bit_width(self.entries.len());
        let mut out = vec![width];
        out.extend(hybrid_rle::encode(&self.ids, width));
        out
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Each distinct value's PLAIN-encoded bytes, in id order; used to
    /// rebuild a PLAIN buffer when a column falls back from dictionary
    /// encoding.
    pub fn entries(&self) -> &[Vec<u8>] {
        &self.entries
    }

    /// Clears accumulated ids (but not the dictionary itself) after a page
    /// flush; the dictionary page is only ever written once per column
    /// chunk, but the id stream is re-chunked per data page.
    pub fn take_ids(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.ids)
    }
}

/// The bit width used for a dictionary's id stream: `max(1, bitWidth(numEntries - 1))`,
/// since RLE_DICTIONARY data pages always carry at least a 1-bit width byte
/// even for a single-entry dictionary.
pub fn ids_bit_width(num_entries: usize) -> u8 {
    if num_entries <= 1 {
        return 1;
    }
    crate::encoding::bitpacking::bit_width((num_entries - 1) as u32).max(1)
}

/// Decodes a dictionary-page data stream (leading bit-width byte + hybrid
/// ids) back into dictionary indices.
pub fn decode_ids(bytes: &[u8], count: usize) -> Vec<u32> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let width = bytes[0];
    hybrid_rle::decode(&bytes[1..], width, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedups_repeated_values() {
        let mut enc = DictionaryEncoder::new();
        assert_eq!(enc.push(b"alice"), 0);
        assert_eq!(enc.push(b"bob"), 1);
        assert_eq!(enc.push(b"alice"), 0);
        assert_eq!(enc.push(b"carol"), 2);
        assert_eq!(enc.push(b"bob"), 1);
        assert_eq!(enc.num_entries(), 3);
        assert_eq!(enc.num_values(), 5);
        assert_eq!(enc.ids(), &[0, 1, 0, 2, 1]);
    }

    #[test]
    fn ids_roundtrip_through_hybrid_rle() {
        let mut enc = DictionaryEncoder::new();
        for v in [b"a".as_ref(), b"b", b"a", b"a", b"c", b"b"] {
            enc.push(v);
        }
        let encoded = enc.encode_ids();
        let decoded = decode_ids(&encoded, enc.num_values());
        assert_eq!(decoded, enc.ids());
    }

    #[test]
    fn single_entry_dictionary_uses_width_one() {
        assert_eq!(ids_bit_width(1), 1);
        assert_eq!(ids_bit_width(2), 1);
        assert_eq!(ids_bit_width(3), 2);
        assert_eq!(ids_bit_width(256), 8);
        assert_eq!(ids_bit_width(257), 9);
    }
}
