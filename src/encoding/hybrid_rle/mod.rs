//! The run-length / bit-packed hybrid stream (spec.md §4.2): a
//! concatenation of runs, each starting with an unsigned VARINT header
//! whose low bit distinguishes an RLE run (`runLen << 1`) from a
//! bit-packed run (`(numGroups << 1) | 1`, `numGroups` groups of 8 values).

mod decoder;
mod encoder;

pub use decoder::{decode, HybridEncoded};
pub use encoder::encode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concrete_rle_run() {
        // spec.md §8 scenario 3: value 5, length 10, width 3.
        let values = vec![5u32; 10];
        let out = encode(&values, 3);
        assert_eq!(out, vec![0x14, 0x05]);
        assert_eq!(decode(&out, 3, 10), values);
    }

    #[test]
    fn concrete_bitpacked_run() {
        // spec.md §8 scenario 4.
        let values: Vec<u32> = (0..8).collect();
        let out = encode(&values, 3);
        assert_eq!(out, vec![0x03, 0x88, 0xC6, 0xFA]);
        assert_eq!(decode(&out, 3, 8), values);
    }

    #[test]
    fn mixed_runs_roundtrip() {
        let mut values = vec![1u32; 12]; // RLE run
        values.extend([0u32, 1, 2, 3, 4, 5]); // bit-packed tail, no run >= 8
        values.extend(vec![9u32; 9]); // another RLE run
        let width = 4;
        let out = encode(&values, width);
        assert_eq!(decode(&out, width, values.len()), values);
    }

    #[test]
    fn width_zero_emits_header_only() {
        let values = vec![0u32; 5];
        let out = encode(&values, 0);
        // only the VARINT header, no value bytes (spec.md §4.2)
        assert_eq!(out, vec![10]); // runLen(5) << 1
        assert_eq!(decode(&out, 0, 5), values);
    }

    #[test]
    fn random_roundtrip() {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        for width in [1u8, 3, 5, 8, 11] {
            let max = (1u64 << width) - 1;
            let values: Vec<u32> = (0..200).map(|_| rng.gen_range(0..=max) as u32).collect();
            let out = encode(&values, width);
            assert_eq!(decode(&out, width, values.len()), values);
        }
    }
}
