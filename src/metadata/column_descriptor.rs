use crate::schema::types::ParquetType;

/// Describes one leaf-level primitive column: its type, its derived
/// `maxRep`/`maxDef` levels, and its path from the schema root.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    primitive_type: ParquetType,
    max_def_level: i16,
    max_rep_level: i16,
    path: Vec<String>,
}

impl ColumnDescriptor {
    pub fn new(
        primitive_type: ParquetType,
        max_def_level: i16,
        max_rep_level: i16,
        path: Vec<String>,
    ) -> Self {
        Self {
            primitive_type,
            max_def_level,
            max_rep_level,
            path,
        }
    }

    /// The maximum definition level any value on this column can carry.
    pub fn max_def_level(&self) -> i16 {
        self.max_def_level
    }

    /// The maximum repetition level any value on this column can carry.
    pub fn max_rep_level(&self) -> i16 {
        self.max_rep_level
    }

    pub fn path_in_schema(&self) -> &[String] {
        &self.path
    }

    pub fn type_(&self) -> &ParquetType {
        &self.primitive_type
    }

    pub fn name(&self) -> &str {
        self.primitive_type.name()
    }
}
