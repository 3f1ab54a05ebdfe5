//! Page compression (spec.md §5): each page's PLAIN/RLE-encoded bytes are
//! independently compressed with the column chunk's codec before being
//! framed into a `PageHeader` + payload.

use crate::error::Result;

/// The compression codec recorded on a column chunk (spec.md §5, §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompressionCodec {
    Uncompressed,
    Snappy,
    Gzip,
    /// Recognized on the wire but never produced: LZO requires a system
    /// library this crate does not link against.
    Lzo,
    Brotli,
    Lz4,
    Zstd,
}

impl CompressionCodec {
    pub fn to_thrift_i32(self) -> i32 {
        match self {
            CompressionCodec::Uncompressed => 0,
            CompressionCodec::Snappy => 1,
            CompressionCodec::Gzip => 2,
            CompressionCodec::Lzo => 3,
            CompressionCodec::Brotli => 4,
            CompressionCodec::Lz4 => 5,
            CompressionCodec::Zstd => 6,
        }
    }
}

/// A page compressor: compresses one page's bytes at a time, and
/// decompresses them back given the known uncompressed length.
pub trait Codec: std::fmt::Debug {
    fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()>;

    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()>;
}

/// Returns a codec for `codec`, or `None` for `Uncompressed` (no wrapping
/// needed).
pub fn create_codec(codec: CompressionCodec) -> Result<Option<Box<dyn Codec>>> {
    match codec {
        #[cfg(feature = "brotli")]
        CompressionCodec::Brotli => Ok(Some(Box::new(BrotliCodec::new()))),
        #[cfg(feature = "gzip")]
        CompressionCodec::Gzip => Ok(Some(Box::new(GzipCodec::new()))),
        #[cfg(feature = "snappy")]
        CompressionCodec::Snappy => Ok(Some(Box::new(SnappyCodec::new()))),
        #[cfg(feature = "lz4")]
        CompressionCodec::Lz4 => Ok(Some(Box::new(Lz4Codec::new()))),
        #[cfg(feature = "zstd")]
        CompressionCodec::Zstd => Ok(Some(Box::new(ZstdCodec::new()))),
        CompressionCodec::Uncompressed => Ok(None),
        _ => Err(general_err!("compression codec {:?} is not installed", codec)),
    }
}

#[cfg(feature = "snappy")]
mod snappy_codec {
    use snap::raw::{decompress_len, max_compress_len, Decoder, Encoder};

    use crate::compression::Codec;
    use crate::error::Result;

    #[derive(Debug)]
    pub struct SnappyCodec {
        decoder: Decoder,
        encoder: Encoder,
    }

    impl SnappyCodec {
        pub(crate) fn new() -> Self {
            Self {
                decoder: Decoder::new(),
                encoder: Encoder::new(),
            }
        }
    }

    impl Codec for SnappyCodec {
        fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()> {
            let len = decompress_len(input_buf)?;
            assert!(len <= output_buf.len());
            self.decoder.decompress(input_buf, output_buf)?;
            Ok(())
        }

        fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
            let output_buf_len = output_buf.len();
            let required_len = max_compress_len(input_buf.len());
            output_buf.resize(output_buf_len + required_len, 0);
            let n = self
                .encoder
                .compress(input_buf, &mut output_buf[output_buf_len..])?;
            output_buf.truncate(output_buf_len + n);
            Ok(())
        }
    }
}
#[cfg(feature = "snappy")]
pub use snappy_codec::*;

#[cfg(feature = "gzip")]
mod gzip_codec {
    use std::io::{Read, Write};

    use flate2::{read, write, Compression};

    use crate::compression::Codec;
    use crate::error::Result;

    #[derive(Debug)]
    pub struct GzipCodec {}

    impl GzipCodec {
        pub(crate) fn new() -> Self {
            Self {}
        }
    }

    impl Codec for GzipCodec {
        fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()> {
            let mut decoder = read::GzDecoder::new(input_buf);
            decoder.read_exact(output_buf).map_err(|e| e.into())
        }

        fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
            let mut encoder = write::GzEncoder::new(output_buf, Compression::default());
            encoder.write_all(input_buf)?;
            encoder.try_finish().map_err(|e| e.into())
        }
    }
}
#[cfg(feature = "gzip")]
pub use gzip_codec::*;

#[cfg(feature = "brotli")]
mod brotli_codec {
    use std::io::{Read, Write};

    use crate::compression::Codec;
    use crate::error::Result;

    const BROTLI_DEFAULT_BUFFER_SIZE: usize = 4096;
    const BROTLI_DEFAULT_COMPRESSION_QUALITY: u32 = 1;
    const BROTLI_DEFAULT_LG_WINDOW_SIZE: u32 = 22;

    #[derive(Debug)]
    pub struct BrotliCodec {}

    impl BrotliCodec {
        pub(crate) fn new() -> Self {
            Self {}
        }
    }

    impl Codec for BrotliCodec {
        fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()> {
            brotli::Decompressor::new(input_buf, BROTLI_DEFAULT_BUFFER_SIZE)
                .read_exact(output_buf)
                .map_err(|e| e.into())
        }

        fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
            let mut encoder = brotli::CompressorWriter::new(
                output_buf,
                BROTLI_DEFAULT_BUFFER_SIZE,
                BROTLI_DEFAULT_COMPRESSION_QUALITY,
                BROTLI_DEFAULT_LG_WINDOW_SIZE,
            );
            encoder.write_all(input_buf)?;
            encoder.flush().map_err(|e| e.into())
        }
    }
}
#[cfg(feature = "brotli")]
pub use brotli_codec::*;

#[cfg(feature = "lz4")]
mod lz4_codec {
    use std::io::{Read, Write};

    use lz4_flex::frame::{FrameDecoder, FrameEncoder};

    use crate::compression::Codec;
    use crate::error::Result;

    #[derive(Debug)]
    pub struct Lz4Codec {}

    impl Lz4Codec {
        pub(crate) fn new() -> Self {
            Self {}
        }
    }

    impl Codec for Lz4Codec {
        fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()> {
            let mut decoder = FrameDecoder::new(input_buf);
            decoder.read_exact(output_buf)?;
            Ok(())
        }

        fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
            let mut encoder = FrameEncoder::new(output_buf);
            encoder.write_all(input_buf)?;
            encoder
                .finish()
                .map(|_| ())
                .map_err(|e| general_err!("lz4 frame error: {}", e))
        }
    }
}
#[cfg(feature = "lz4")]
pub use lz4_codec::*;

#[cfg(feature = "zstd")]
mod zstd_codec {
    use std::io::{Read, Write};

    use crate::compression::Codec;
    use crate::error::Result;

    const ZSTD_COMPRESSION_LEVEL: i32 = 1;

    #[derive(Debug)]
    pub struct ZstdCodec {}

    impl ZstdCodec {
        pub(crate) fn new() -> Self {
            Self {}
        }
    }

    impl Codec for ZstdCodec {
        fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()> {
            let mut decoder = zstd::Decoder::new(input_buf)?;
            decoder.read_exact(output_buf).map_err(|e| e.into())
        }

        fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
            let mut encoder = zstd::Encoder::new(output_buf, ZSTD_COMPRESSION_LEVEL)?;
            encoder.write_all(input_buf)?;
            encoder.finish().map(|_| ()).map_err(|e| e.into())
        }
    }
}
#[cfg(feature = "zstd")]
pub use zstd_codec::*;

#[cfg(test)]
mod tests {
    use super::*;

    fn test_roundtrip(codec: CompressionCodec, data: &[u8]) {
        let mut c1 = create_codec(codec).unwrap().unwrap();
        let mut c2 = create_codec(codec).unwrap().unwrap();

        let mut compressed = Vec::new();
        c1.compress(data, &mut compressed).unwrap();

        let mut decompressed = vec![0; data.len()];
        c2.decompress(&compressed, &mut decompressed).unwrap();
        assert_eq!(data, decompressed.as_slice());
    }

    fn test_codec(codec: CompressionCodec) {
        for size in [100, 10_000, 100_000] {
            let data: Vec<u8> = (0..size).map(|x| (x % 255) as u8).collect();
            test_roundtrip(codec, &data);
        }
    }

    #[test]
    #[cfg(feature = "snappy")]
    fn snappy_roundtrip() {
        test_codec(CompressionCodec::Snappy);
    }

    #[test]
    #[cfg(feature = "gzip")]
    fn gzip_roundtrip() {
        test_codec(CompressionCodec::Gzip);
    }

    #[test]
    #[cfg(feature = "zstd")]
    fn zstd_roundtrip() {
        test_codec(CompressionCodec::Zstd);
    }

    #[test]
    #[cfg(feature = "lz4")]
    fn lz4_roundtrip() {
        test_codec(CompressionCodec::Lz4);
    }

    #[test]
    #[cfg(feature = "brotli")]
    fn brotli_roundtrip() {
        test_codec(CompressionCodec::Brotli);
    }

    #[test]
    fn lzo_is_rejected() {
        assert!(create_codec(CompressionCodec::Lzo).is_err());
    }
}
