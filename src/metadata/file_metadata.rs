//! The file footer (spec.md §4.12, §7): schema flattened to a pre-order
//! list of `SchemaElement`s, one `RowGroup` per block, one `ColumnChunk`
//! per leaf column, written with the same compact codec as page headers
//! ([`crate::metadata::thrift`]).

use crate::compression::CompressionCodec;
use crate::encoding::Encoding;
use crate::error::Result;
use crate::metadata::thrift::{self, type_ids};
use crate::metadata::SchemaDescriptor;
use crate::schema::{physical_type_to_thrift_i32, ParquetType, Repetition};

const REPETITION_REQUIRED: i32 = 0;
const REPETITION_OPTIONAL: i32 = 1;
const REPETITION_REPEATED: i32 = 2;

/// A key/value pair stored in the footer (spec.md §6's `keyValueMetadata`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Option<String>,
}

/// One column chunk's metadata within a row group.
#[derive(Clone, Debug)]
pub struct ColumnChunkMetaData {
    pub path_in_schema: Vec<String>,
    pub physical_type: crate::schema::PhysicalType,
    pub encodings: Vec<Encoding>,
    pub codec: CompressionCodec,
    pub num_values: i64,
    pub total_uncompressed_size: i64,
    pub total_compressed_size: i64,
    pub data_page_offset: i64,
    pub dictionary_page_offset: Option<i64>,
}

/// One row group's metadata.
#[derive(Clone, Debug)]
pub struct RowGroupMetaData {
    pub columns: Vec<ColumnChunkMetaData>,
    pub total_byte_size: i64,
    pub num_rows: i64,
}

/// The complete footer written at the end of a file.
#[derive(Clone, Debug)]
pub struct FileMetaData {
    pub version: i32,
    pub num_rows: i64,
    pub row_groups: Vec<RowGroupMetaData>,
    pub key_value_metadata: Vec<KeyValue>,
    pub created_by: Option<String>,
}

fn write_schema_element(w: &mut thrift::Writer, node: &ParquetType) {
    w.list_element_struct_begin();
    match node {
        ParquetType::PrimitiveType { physical_type, .. } => {
            w.field_i32(1, physical_type_to_thrift_i32(*physical_type));
            if let crate::schema::PhysicalType::FixedLenByteArray(len) = physical_type {
                w.field_i32(2, *len);
            }
            if let Some(rep) = node.repetition() {
                w.field_i32(3, repetition_to_thrift_i32(rep));
            }
            w.field_string(4, node.name());
        }
        ParquetType::GroupType { fields, .. } => {
            if let Some(rep) = node.repetition() {
                w.field_i32(3, repetition_to_thrift_i32(rep));
            }
            w.field_string(4, node.name());
            w.field_i32(5, fields.len() as i32);
        }
    }
    w.struct_end();
}

fn repetition_to_thrift_i32(rep: Repetition) -> i32 {
    match rep {
        Repetition::Required => REPETITION_REQUIRED,
        Repetition::Optional => REPETITION_OPTIONAL,
        Repetition::Repeated => REPETITION_REPEATED,
    }
}

/// Flattens `root` into its pre-order `SchemaElement` list (root first,
/// then every descendant depth-first) and writes it as field 2's list.
fn write_schema_list(w: &mut thrift::Writer, root: &ParquetType) {
    let mut nodes = Vec::new();
    flatten_schema(root, &mut nodes);
    w.field_list_begin(2, type_ids::TYPE_STRUCT, nodes.len());
    for node in &nodes {
        write_schema_element(w, node);
    }
}

fn flatten_schema<'a>(node: &'a ParquetType, out: &mut Vec<&'a ParquetType>) {
    out.push(node);
    for field in node.fields() {
        flatten_schema(field, out);
    }
}

impl FileMetaData {
    /// Serializes the footer, given the schema it describes.
    pub fn write(&self, schema: &SchemaDescriptor) -> Vec<u8> {
        let mut w = thrift::Writer::new();
        w.struct_begin();
        w.field_i32(1, self.version);
        write_schema_list(&mut w, schema.root_schema());
        w.field_i64(3, self.num_rows);

        w.field_list_begin(4, type_ids::TYPE_STRUCT, self.row_groups.len());
        for rg in &self.row_groups {
            write_row_group(&mut w, rg);
        }

        if !self.key_value_metadata.is_empty() {
            w.field_list_begin(5, type_ids::TYPE_STRUCT, self.key_value_metadata.len());
            for kv in &self.key_value_metadata {
                w.list_element_struct_begin();
                w.field_string(1, &kv.key);
                if let Some(value) = &kv.value {
                    w.field_string(2, value);
                }
                w.struct_end();
            }
        }

        if let Some(created_by) = &self.created_by {
            w.field_string(6, created_by);
        }
        w.struct_end();
        w.into_bytes()
    }
}

fn write_row_group(w: &mut thrift::Writer, rg: &RowGroupMetaData) {
    w.list_element_struct_begin();
    w.field_list_begin(1, type_ids::TYPE_STRUCT, rg.columns.len());
    for column in &rg.columns {
        write_column_chunk(w, column);
    }
    w.field_i64(2, rg.total_byte_size);
    w.field_i64(3, rg.num_rows);
    w.struct_end();
}

fn write_column_chunk(w: &mut thrift::Writer, column: &ColumnChunkMetaData) {
    w.list_element_struct_begin();
    w.field_i64(1, column.data_page_offset); // `file_offset`: first byte of this chunk.
    w.field_struct_begin(3);
    w.field_i32(1, physical_type_to_thrift_i32(column.physical_type));
    w.field_list_begin(2, type_ids::TYPE_I32, column.encodings.len());
    for encoding in &column.encodings {
        w.list_element_i32(encoding.to_thrift_i32());
    }
    w.field_list_begin(3, type_ids::TYPE_STRING, column.path_in_schema.len());
    for segment in &column.path_in_schema {
        w.list_element_string(segment);
    }
    w.field_i32(4, column.codec.to_thrift_i32());
    w.field_i64(5, column.num_values);
    w.field_i64(6, column.total_uncompressed_size);
    w.field_i64(7, column.total_compressed_size);
    w.field_i64(9, column.data_page_offset);
    if let Some(dict_offset) = column.dictionary_page_offset {
        w.field_i64(11, dict_offset);
    }
    w.struct_end();
    w.struct_end();
}

/// Reads back the footer this crate wrote, enough to support round-trip
/// tests (spec.md §1: "the read path is mentioned only where it
/// constrains writer output"). Not a general-purpose Parquet reader: it
/// understands only the field ids this writer itself produces.
pub fn read_footer(bytes: &[u8]) -> Result<(i32, i64, usize)> {
    let mut r = thrift::Reader::new(bytes);
    r.struct_begin()?;
    let mut version = 0;
    let mut num_rows = 0;
    let mut num_row_groups = 0;
    loop {
        let f = r.field_begin()?;
        if f.type_ == 0 {
            break;
        }
        match f.id {
            1 => version = r.read_i32()?,
            3 => num_rows = r.read_i64()?,
            4 => {
                let (_elem_type, len) = r.read_list_begin()?;
                num_row_groups = len;
                for _ in 0..len {
                    r.skip_field(type_ids::TYPE_STRUCT)?;
                }
            }
            _ => r.skip_field(f.type_)?,
        }
    }
    Ok((version, num_rows, num_row_groups))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_top_level_fields() {
        let schema = SchemaDescriptor::try_from_message("message m { required int32 x; }").unwrap();
        let metadata = FileMetaData {
            version: 1,
            num_rows: 3,
            row_groups: vec![RowGroupMetaData {
                columns: vec![ColumnChunkMetaData {
                    path_in_schema: vec!["x".to_string()],
                    physical_type: crate::schema::PhysicalType::Int32,
                    encodings: vec![Encoding::Plain],
                    codec: CompressionCodec::Uncompressed,
                    num_values: 3,
                    total_uncompressed_size: 12,
                    total_compressed_size: 12,
                    data_page_offset: 4,
                    dictionary_page_offset: None,
                }],
                total_byte_size: 12,
                num_rows: 3,
            }],
            key_value_metadata: vec![],
            created_by: Some("parquet-writer".to_string()),
        };
        let bytes = metadata.write(&schema);
        let (version, num_rows, num_row_groups) = read_footer(&bytes).unwrap();
        assert_eq!(version, 1);
        assert_eq!(num_rows, 3);
        assert_eq!(num_row_groups, 1);
    }
}
