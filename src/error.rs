//! Error types for the flat-file codec.

use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors that can occur while encoding, decoding, or assembling a file.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Failed to read or write the underlying file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write the CSV summary report
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A numeric value has more digits than its column
    #[error("Field {field} overflows: {len} digits do not fit in {width} columns")]
    FieldOverflow {
        field: &'static str,
        width: usize,
        len: usize,
    },

    /// A text value is longer than its column and truncation is disabled
    #[error("Field {field} overflows: {len} characters do not fit in {width} columns")]
    TextOverflow {
        field: &'static str,
        width: usize,
        len: usize,
    },

    /// Negative, non-finite, or unrepresentable amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A field value has the wrong shape for its column
    #[error("Invalid field {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    /// A line does not match the fixed width of its layout
    #[error("Invalid {kind} line length: expected {expected} characters, found {actual}")]
    LineLength {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The record type tag at offset 0 is not the expected one
    #[error("Unexpected record tag: expected {expected:?}, found {found:?}")]
    UnexpectedTag {
        expected: &'static str,
        found: String,
    },

    /// Running totals exceeded the range of minor units
    #[error("Running total overflow while adding {field}")]
    TotalOverflow { field: &'static str },

    /// The file does not have the header/details/trailer shape
    #[error("Malformed file: {0}")]
    MalformedFile(String),

    /// A decoding error tied to a line of the input file
    #[error("Line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<CodecError>,
    },

    /// Trailer totals disagree with the detail records
    #[error("Trailer {field} mismatch: computed {expected}, trailer has {found}")]
    Reconcile {
        field: &'static str,
        expected: String,
        found: String,
    },

    /// Generator or CLI configuration is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CodecError {
    /// Attaches a 1-based line number to this error.
    pub fn at_line(self, line: usize) -> Self {
        CodecError::AtLine {
            line,
            source: Box::new(self),
        }
    }
}
