//! The schema tree and the tiny textual grammar used to build one in tests.

pub mod message;
pub mod types;

pub use message::parse_message;
pub use types::{physical_type_to_thrift_i32, ParquetType, PhysicalType, Repetition};
