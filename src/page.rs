//! Pages (spec.md §5): the unit a column chunk is split into. A data page
//! holds one run of (repetition level, definition level, value) triples;
//! a dictionary page holds a column chunk's deduplicated values. Both are
//! framed as a `PageHeader` (written with the same compact codec as the
//! file footer, [`crate::metadata::thrift`]) followed by the page's
//! (possibly compressed) bytes.

use crate::compression::{self, CompressionCodec};
use crate::encoding::Encoding;
use crate::error::{ParquetError, Result};
use crate::metadata::thrift;

const PAGE_TYPE_DATA_PAGE: i32 = 0;
const PAGE_TYPE_DICTIONARY_PAGE: i32 = 2;

/// An uncompressed page ready to be framed and written.
pub enum Page {
    Data(DataPage),
    Dictionary(DictionaryPage),
}

pub struct DataPage {
    pub num_values: u32,
    pub encoding: Encoding,
    /// Concatenation of: 4-byte LE rep-level length + rep levels (if
    /// `maxRepLevel > 0`), 4-byte LE def-level length + def levels (if
    /// `maxDefLevel > 0`), then the value bytes (spec.md §5).
    pub buffer: Vec<u8>,
}

pub struct DictionaryPage {
    pub num_values: u32,
    /// The dictionary's PLAIN-encoded entries, concatenated.
    pub buffer: Vec<u8>,
}

/// A page whose `buffer` has already been passed through the column
/// chunk's compression codec (or left as-is for `Uncompressed`).
pub struct CompressedPage {
    pub page: CompressedPageKind,
    pub uncompressed_size: usize,
}

pub enum CompressedPageKind {
    Data { num_values: u32, encoding: Encoding, buffer: Vec<u8> },
    Dictionary { num_values: u32, buffer: Vec<u8> },
}

/// Compresses a page's buffer with `codec`, returning both the compressed
/// bytes and the original uncompressed length (needed for the page header).
pub fn compress_page(page: Page, codec: CompressionCodec) -> Result<CompressedPage> {
    let mut compressor = compression::create_codec(codec)?;

    match page {
        Page::Data(data) => {
            let uncompressed_size = data.buffer.len();
            let buffer = match compressor.as_mut() {
                Some(c) => {
                    let mut out = Vec::new();
                    c.compress(&data.buffer, &mut out)?;
                    out
                }
                None => data.buffer,
            };
            Ok(CompressedPage {
                page: CompressedPageKind::Data {
                    num_values: data.num_values,
                    encoding: data.encoding,
                    buffer,
                },
                uncompressed_size,
            })
        }
        Page::Dictionary(dict) => {
            let uncompressed_size = dict.buffer.len();
            let buffer = match compressor.as_mut() {
                Some(c) => {
                    let mut out = Vec::new();
                    c.compress(&dict.buffer, &mut out)?;
                    out
                }
                None => dict.buffer,
            };
            Ok(CompressedPage {
                page: CompressedPageKind::Dictionary {
                    num_values: dict.num_values,
                    buffer,
                },
                uncompressed_size,
            })
        }
    }
}

fn sized_i32(value: usize, what: &str) -> Result<i32> {
    value
        .try_into()
        .map_err(|_| ParquetError::OutOfSpec(format!("{} exceeds i32::MAX: {}", what, value)))
}

/// Writes one page's header and body to `writer`, returning the total
/// number of bytes written (header + body).
pub fn write_page<W: std::io::Write>(writer: &mut W, page: &CompressedPage) -> Result<u64> {
    let compressed_page_size = sized_i32(
        match &page.page {
            CompressedPageKind::Data { buffer, .. } => buffer.len(),
            CompressedPageKind::Dictionary { buffer, .. } => buffer.len(),
        },
        "compressed page size",
    )?;
    let uncompressed_page_size = sized_i32(page.uncompressed_size, "uncompressed page size")?;

    let mut w = thrift::Writer::new();
    w.struct_begin();
    match &page.page {
        CompressedPageKind::Data { num_values, encoding, .. } => {
            w.field_i32(1, PAGE_TYPE_DATA_PAGE);
            w.field_i32(2, uncompressed_page_size);
            w.field_i32(3, compressed_page_size);
            w.field_struct_begin(5);
            w.field_i32(1, *num_values as i32);
            w.field_i32(2, encoding.to_thrift_i32());
            w.field_i32(3, Encoding::Rle.to_thrift_i32());
            w.field_i32(4, Encoding::Rle.to_thrift_i32());
            w.struct_end();
        }
        CompressedPageKind::Dictionary { num_values, .. } => {
            w.field_i32(1, PAGE_TYPE_DICTIONARY_PAGE);
            w.field_i32(2, uncompressed_page_size);
            w.field_i32(3, compressed_page_size);
            w.field_struct_begin(7);
            w.field_i32(1, *num_values as i32);
            w.field_i32(2, Encoding::Plain.to_thrift_i32());
            w.struct_end();
        }
    }
    w.struct_end();
    let header_bytes = w.into_bytes();

    writer.write_all(&header_bytes)?;
    let body: &[u8] = match &page.page {
        CompressedPageKind::Data { buffer, .. } => buffer,
        CompressedPageKind::Dictionary { buffer, .. } => buffer,
    };
    writer.write_all(body)?;

    Ok((header_bytes.len() + body.len()) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_uncompressed_data_page() {
        let page = Page::Data(DataPage {
            num_values: 3,
            encoding: Encoding::Plain,
            buffer: vec![1, 2, 3, 4],
        });
        let compressed = compress_page(page, CompressionCodec::Uncompressed).unwrap();
        let mut out = Vec::new();
        let written = write_page(&mut out, &compressed).unwrap();
        assert_eq!(written as usize, out.len());
        assert!(out.len() > 4); // header + body
    }

    #[cfg(feature = "snappy")]
    #[test]
    fn writes_compressed_dictionary_page() {
        let page = Page::Dictionary(DictionaryPage {
            num_values: 2,
            buffer: b"aaaaaaaaaaaaaaaaaabbbbbbbbbbbbbbbbbbbbb".to_vec(),
        });
        let compressed = compress_page(page, CompressionCodec::Snappy).unwrap();
        assert!(compressed.uncompressed_size > 0);
        let mut out = Vec::new();
        write_page(&mut out, &compressed).unwrap();
        assert!(!out.is_empty());
    }
}
