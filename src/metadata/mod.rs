//! Schema descriptors, the footer's Thrift-compact-shaped codec, and the
//! footer structures themselves (spec.md §4.12, §6, §7).

pub mod column_descriptor;
pub mod file_metadata;
pub mod schema_descriptor;
pub mod thrift;

pub use column_descriptor::ColumnDescriptor;
pub use file_metadata::{ColumnChunkMetaData, FileMetaData, KeyValue, RowGroupMetaData};
pub use schema_descriptor::SchemaDescriptor;
