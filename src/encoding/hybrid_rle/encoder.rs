use crate::encoding::bitpacking;
use crate::encoding::uleb128;

const GROUP_SIZE: usize = 8;

/// Encodes `values` (each `< 2^width`) as a sequence of RLE / bit-packed
/// hybrid runs (spec.md §4.2). A full-size implementation of the "small
/// look-ahead" streaming policy; since every caller in this crate already
/// buffers an entire page's worth of ids/levels before flushing, this scans
/// the materialized slice directly rather than maintaining a rolling
/// look-ahead window.
pub fn encode(values: &[u32], width: u8) -> Vec<u8> {
    let mut out = Vec::new();
    // Every value is 0 at width 0 (spec.md §4.2); a bit-packed run would
    // still need a group header for no value bytes, so emit a single RLE
    // run of the whole stream instead — just the VARINT header.
    if width == 0 {
        write_rle_run(&mut out, 0, values.len(), 0);
        return out;
    }

    let mut i = 0;
    let n = values.len();

    while i < n {
        let run_len = equal_run_len(values, i);
        if run_len >= GROUP_SIZE {
            write_rle_run(&mut out, values[i], run_len, width);
            i += run_len;
        } else {
            let start = i;
            let mut k = i;
            while k < n && equal_run_len(values, k) < GROUP_SIZE {
                k += 1;
            }
            write_bitpacked_run(&mut out, &values[start..k], width);
            i = k;
        }
    }
    out
}

fn equal_run_len(values: &[u32], at: usize) -> usize {
    let v = values[at];
    values[at..].iter().take_while(|&&x| x == v).count()
}

fn write_varint(out: &mut Vec<u8>, value: u64) {
    let mut container = [0u8; 10];
    let used = uleb128::encode(value, &mut container);
    out.extend_from_slice(&container[..used]);
}

fn write_rle_run(out: &mut Vec<u8>, value: u32, run_len: usize, width: u8) {
    write_varint(out, (run_len as u64) << 1);
    let byte_count = bitpacking::padded_byte_count(width as usize);
    let bytes = value.to_le_bytes();
    out.extend_from_slice(&bytes[..byte_count]);
}

fn write_bitpacked_run(out: &mut Vec<u8>, values: &[u32], width: u8) {
    let num_groups = (values.len() + GROUP_SIZE - 1) / GROUP_SIZE;
    write_varint(out, ((num_groups as u64) << 1) | 1);

    let mut padded = values.to_vec();
    padded.resize(num_groups * GROUP_SIZE, 0);
    bitpacking::pack(&padded, width, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::hybrid_rle::decode;

    #[test]
    fn partial_group_is_zero_padded() {
        // 5 distinct-ish values with no run >= 8: one bit-packed group of 8
        // (padded with 3 zeros), numGroups == 1.
        let values = vec![1u32, 2, 3, 2, 1];
        let width = 2;
        let out = encode(&values, width);
        assert_eq!(out[0], (1u8 << 1) | 1);
        assert_eq!(decode(&out, width, values.len()), values);
    }
}
