//! Error types returned by this crate.

/// The error kinds this crate can produce while shredding records, encoding
/// columns, or assembling a file.
#[derive(Debug, PartialEq, Eq)]
pub enum ParquetError {
    /// A general error, carrying a human-readable message.
    General(String),
    /// The data (or a value passed in) is known to violate the file format.
    OutOfSpec(String),
    /// A [`FileWriter`](crate::write::FileWriter) operation was called in a
    /// state that does not allow it (e.g. `end_column` before `start_column`).
    IllegalState(String),
    /// A record could not be shredded against the schema (missing `REQUIRED`
    /// field, or a value whose type does not match its leaf's physical type).
    InvalidRecord(String),
    /// A value did not fit in the declared bit width, or a bit width outside
    /// `[0, 32]` was requested.
    EncodingOverflow(String),
    /// A corrupt or truncated encoded stream was found while decoding
    /// (VARINT, RLE run, or footer bytes).
    MalformedStream(String),
    /// The schema could not be reconciled with the data the caller supplied.
    ConfigurationError(String),
    /// The underlying [`PositionedByteSink`](std::io::Write) or a
    /// [`Codec`](crate::compression::Codec) failed; the file being written
    /// must be treated as corrupt (spec.md §7).
    IOFailure(String),
}

impl std::error::Error for ParquetError {}

impl std::fmt::Display for ParquetError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ParquetError::General(message) => write!(fmt, "{}", message),
            ParquetError::OutOfSpec(message) => write!(fmt, "out of spec: {}", message),
            ParquetError::IllegalState(message) => write!(fmt, "illegal state: {}", message),
            ParquetError::InvalidRecord(message) => write!(fmt, "invalid record: {}", message),
            ParquetError::EncodingOverflow(message) => write!(fmt, "encoding overflow: {}", message),
            ParquetError::MalformedStream(message) => write!(fmt, "malformed stream: {}", message),
            ParquetError::ConfigurationError(message) => {
                write!(fmt, "configuration error: {}", message)
            }
            ParquetError::IOFailure(message) => write!(fmt, "I/O failure: {}", message),
        }
    }
}

impl From<std::io::Error> for ParquetError {
    fn from(e: std::io::Error) -> ParquetError {
        ParquetError::IOFailure(format!("{}", e))
    }
}

#[cfg(feature = "snappy")]
impl From<snap::Error> for ParquetError {
    fn from(e: snap::Error) -> ParquetError {
        ParquetError::IOFailure(format!("snappy codec error: {}", e))
    }
}

/// A specialized `Result` for this crate's errors.
pub type Result<T> = std::result::Result<T, ParquetError>;

macro_rules! general_err {
    ($fmt:expr) => (crate::error::ParquetError::General($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (crate::error::ParquetError::General(format!($fmt, $($args),*)));
}

macro_rules! illegal_state {
    ($fmt:expr) => (crate::error::ParquetError::IllegalState($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (crate::error::ParquetError::IllegalState(format!($fmt, $($args),*)));
}
