use crate::encoding::bitpacking;
use crate::encoding::uleb128;

/// One run as seen on the wire, before being expanded into individual
/// values. Mirrors the two run kinds in spec.md §4.2.
#[derive(Debug, PartialEq, Eq)]
pub enum HybridEncoded<'a> {
    /// `bytes` holds `paddedByteCount(width)` little-endian bytes of the
    /// repeated value; `run_len` is how many times it repeats.
    Rle(&'a [u8], usize),
    /// `bytes` holds exactly `numGroups * width` bytes packing
    /// `numGroups * 8` values at the stream's width (a group of 8
    /// `width`-bit values always spans a whole number of bytes).
    Bitpacked(&'a [u8]),
}

/// An iterator over the raw runs in a hybrid-encoded stream, without
/// expanding bit-packed runs into individual values (callers needing
/// values should use [`super::decode`]).
pub struct RunIter<'a> {
    values: &'a [u8],
    width: u8,
}

impl<'a> RunIter<'a> {
    pub fn new(values: &'a [u8], width: u8) -> Self {
        Self { values, width }
    }
}

impl<'a> Iterator for RunIter<'a> {
    type Item = HybridEncoded<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.values.is_empty() {
            return None;
        }
        let (indicator, consumed) = uleb128::decode(self.values);
        self.values = &self.values[consumed..];
        if indicator & 1 == 1 {
            let num_groups = (indicator >> 1) as usize;
            let byte_len = (num_groups * self.width as usize).min(self.values.len());
            let (bitpacked, rest) = self.values.split_at(byte_len);
            self.values = rest;
            Some(HybridEncoded::Bitpacked(bitpacked))
        } else {
            let run_len = (indicator >> 1) as usize;
            let rle_bytes = bitpacking::padded_byte_count(self.width as usize).min(self.values.len());
            let (value_bytes, rest) = self.values.split_at(rle_bytes);
            self.values = rest;
            Some(HybridEncoded::Rle(value_bytes, run_len))
        }
    }
}

/// Decodes exactly `count` values from a hybrid-encoded stream at the given
/// bit width. Trailing zero padding in the final bit-packed group is
/// discarded once `count` values have been produced (spec.md §4.2: "readers
/// rely on page valueCount to stop").
pub fn decode(values: &[u8], width: u8, count: usize) -> Vec<u32> {
    let mut out = Vec::with_capacity(count);
    for run in RunIter::new(values, width) {
        if out.len() >= count {
            break;
        }
        match run {
            HybridEncoded::Rle(value_bytes, run_len) => {
                let mut buf = [0u8; 4];
                let n = value_bytes.len().min(4);
                buf[..n].copy_from_slice(&value_bytes[..n]);
                let value = u32::from_le_bytes(buf);
                let take = run_len.min(count - out.len());
                out.extend(std::iter::repeat(value).take(take));
            }
            HybridEncoded::Bitpacked(bytes) => {
                let num_values = if width == 0 {
                    0
                } else {
                    (bytes.len() * 8) / width as usize
                };
                let unpacked = bitpacking::unpack(bytes, width, num_values);
                let take = (count - out.len()).min(unpacked.len());
                out.extend_from_slice(&unpacked[..take]);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitpacked_run_iter() {
        let bit_width = 1;
        let values = vec![0b00001011u8];
        let mut it = RunIter::new(&values, bit_width);
        let run = it.next().unwrap();
        match run {
            HybridEncoded::Bitpacked(bytes) => assert_eq!(bytes, &[0b00001011]),
            _ => panic!("expected bitpacked run"),
        }
    }
}
