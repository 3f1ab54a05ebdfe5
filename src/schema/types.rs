//! The schema tree: groups, primitive leaves, and their repetition.

/// How many times a field may occur within its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repetition {
    /// Exactly one value; never null.
    Required,
    /// Zero or one value.
    Optional,
    /// Zero or more values.
    Repeated,
}

/// The primitive physical types a leaf column may carry.
///
/// `FixedLenByteArray` carries its declared length, since unlike the other
/// variants the wire width is not implied by the type alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Int96,
    Float,
    Double,
    ByteArray,
    FixedLenByteArray(i32),
}

impl PhysicalType {
    /// The fixed encoded width in bytes, or `None` for variable-length types.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            PhysicalType::Boolean => None, // bit-packed, not byte-aligned per value
            PhysicalType::Int32 | PhysicalType::Float => Some(4),
            PhysicalType::Int64 | PhysicalType::Double => Some(8),
            PhysicalType::Int96 => Some(12),
            PhysicalType::ByteArray => None,
            PhysicalType::FixedLenByteArray(len) => Some(*len as usize),
        }
    }
}

/// Identifying information shared by every schema node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicTypeInfo {
    name: String,
    // `None` only for the root message.
    repetition: Option<Repetition>,
}

impl BasicTypeInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repetition(&self) -> Option<Repetition> {
        self.repetition
    }

    pub fn is_root(&self) -> bool {
        self.repetition.is_none()
    }
}

/// A node of the schema tree: either a named group of children, or a
/// primitive leaf carrying one of the [`PhysicalType`] variants.
#[derive(Clone, Debug, PartialEq)]
pub enum ParquetType {
    PrimitiveType {
        basic_info: BasicTypeInfo,
        physical_type: PhysicalType,
    },
    GroupType {
        basic_info: BasicTypeInfo,
        fields: Vec<ParquetType>,
    },
}

impl ParquetType {
    /// Builds the root "message" node: a group with no repetition of its own.
    pub fn new_root(name: String, fields: Vec<ParquetType>) -> Self {
        ParquetType::GroupType {
            basic_info: BasicTypeInfo {
                name,
                repetition: None,
            },
            fields,
        }
    }

    pub fn new_group(name: String, repetition: Repetition, fields: Vec<ParquetType>) -> Self {
        ParquetType::GroupType {
            basic_info: BasicTypeInfo {
                name,
                repetition: Some(repetition),
            },
            fields,
        }
    }

    pub fn new_primitive(name: String, repetition: Repetition, physical_type: PhysicalType) -> Self {
        ParquetType::PrimitiveType {
            basic_info: BasicTypeInfo {
                name,
                repetition: Some(repetition),
            },
            physical_type,
        }
    }

    pub fn basic_info(&self) -> &BasicTypeInfo {
        match self {
            ParquetType::PrimitiveType { basic_info, .. } => basic_info,
            ParquetType::GroupType { basic_info, .. } => basic_info,
        }
    }

    pub fn name(&self) -> &str {
        self.basic_info().name()
    }

    pub fn is_root(&self) -> bool {
        self.basic_info().is_root()
    }

    pub fn repetition(&self) -> Option<Repetition> {
        self.basic_info().repetition()
    }

    /// The leaf's physical type.
    ///
    /// # Panics
    /// Panics if `self` is a group; callers only call this on leaves
    /// discovered through [`crate::metadata::SchemaDescriptor`].
    pub fn physical_type(&self) -> PhysicalType {
        match self {
            ParquetType::PrimitiveType { physical_type, .. } => *physical_type,
            ParquetType::GroupType { .. } => panic!("physical_type called on a group type"),
        }
    }

    pub fn fields(&self) -> &[ParquetType] {
        match self {
            ParquetType::GroupType { fields, .. } => fields,
            ParquetType::PrimitiveType { .. } => &[],
        }
    }
}

/// The thrift `Type` enum value for a physical type (spec.md §4.12 footer
/// encoding), matching the Apache Parquet format's numbering.
pub fn physical_type_to_thrift_i32(physical_type: PhysicalType) -> i32 {
    match physical_type {
        PhysicalType::Boolean => 0,
        PhysicalType::Int32 => 1,
        PhysicalType::Int64 => 2,
        PhysicalType::Int96 => 3,
        PhysicalType::Float => 4,
        PhysicalType::Double => 5,
        PhysicalType::ByteArray => 6,
        PhysicalType::FixedLenByteArray(_) => 7,
    }
}
