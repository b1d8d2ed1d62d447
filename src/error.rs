//! The error type shared by all decoders and the rule engine.

use crate::path::Value;

/// Represents all possible errors raised while decoding telemetry or
/// evaluating tagging rules.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The fixed-layout buffer is shorter than its status block claims.
    #[error("Truncated buffer: {required} bytes required, {actual} available")]
    TruncatedBuffer { required: usize, actual: usize },

    /// The slice handed to the header stage is not exactly one header long.
    #[error("Malformed header: expected 60 bytes, got {0}")]
    MalformedHeader(usize),

    /// A fixed-layout sub-record was given a slice of the wrong length.
    #[error("Invalid {record} length: expected {expected} bytes, got {actual}")]
    RecordLength {
        record: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Wraps `roxmltree::Error`.
    #[error("Schema parse error: {0}")]
    SchemaParse(#[from] roxmltree::Error),

    /// A capture did not contain a `<profile>` package.
    #[error("No profile found in capture")]
    MissingProfile,

    /// A unit declares a type tag the codec does not know.
    #[error("Unsupported data type: {0}")]
    UnsupportedType(String),

    /// The hex stream ran out before a fixed-width value was complete.
    #[error("Stream exhausted decoding {data_type}: {needed} hex digits needed, {available} left")]
    StreamExhausted {
        data_type: &'static str,
        needed: usize,
        available: usize,
    },

    /// Wraps `hex::FromHexError`.
    #[error("Invalid hex payload: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// A payload character that is not a hex digit, as it appears in the
    /// stream, with its offset in hex digits from the start of the value.
    #[error("Invalid hex digit {digit:?} at offset {offset}")]
    InvalidHexDigit { digit: char, offset: usize },

    /// A field path could not be parsed.
    #[error("Invalid field path '{0}'")]
    InvalidPath(String),

    /// A condition could not be parsed from `path operator literal` text.
    #[error("Invalid condition '{0}'")]
    InvalidCondition(String),

    /// A field path does not lead to a readable or writable field.
    #[error("Cannot resolve '{path}': {reason}")]
    PathResolution { path: String, reason: String },

    /// A writable field refused a value of the wrong kind or range.
    #[error("Cannot assign {value:?}: expected {expected}")]
    ValueRejected { value: Value, expected: &'static str },

    /// Wraps `serde_yaml::Error`.
    #[cfg(feature = "serde")]
    #[error("Invalid rule configuration: {0}")]
    RuleConfig(#[from] serde_yaml::Error),
}

/// The result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
