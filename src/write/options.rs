//! Writer configuration (spec.md §6).

use crate::compression::CompressionCodec;

/// Tuning knobs for a [`crate::write::FileWriter`]; `Default` matches
/// spec.md §6's defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    /// Target uncompressed size of a row group (block) before it is closed.
    pub block_size: usize,
    /// Target uncompressed size of a data page before it is flushed.
    pub page_size: usize,
    /// Byte budget for a column's dictionary before falling back to PLAIN
    /// (spec.md §9's dictionary-growth Open Question).
    pub dictionary_page_size: usize,
    pub enable_dictionary: bool,
    pub compression: CompressionCodec,
    /// Whether shredding enforces `REQUIRED`-field presence and leaf type
    /// checks (spec.md §3, §9: this is independent of dictionary fallback).
    pub validating: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            block_size: 128 * 1024 * 1024,
            page_size: 1024 * 1024,
            dictionary_page_size: 1024 * 1024,
            enable_dictionary: true,
            compression: CompressionCodec::Uncompressed,
            validating: true,
        }
    }
}
