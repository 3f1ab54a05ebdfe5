//! A small Parquet-style columnar file writer: record shredding into
//! repetition/definition levels, per-column page buffering, the
//! PLAIN / RLE-hybrid / dictionary encoders, and a file-level writer that
//! assembles row groups and a self-describing footer behind a `PAR1`
//! magic-framed file.
//!
//! See [`write::FileWriter`] for the entry point.

#[macro_use]
pub mod error;

pub mod column;
pub mod compression;
pub mod encoding;
pub mod metadata;
pub mod page;
pub mod record;
pub mod schema;
pub mod write;

pub use error::{ParquetError, Result};
pub use write::{FileWriter, WriteOptions};
