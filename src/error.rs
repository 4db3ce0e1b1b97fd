use thiserror::Error;

/// Reasons a raw input record is rejected before any metric is derived.
///
/// Field names are reported in the camelCase form used by the input form and
/// the JSON export, e.g. `"totalUsers"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is absent, not a number, or outside its numeric domain.
    #[error("please enter a valid value for {0}")]
    MissingOrInvalid(&'static str),

    /// Individually valid fields contradict each other.
    #[error("{0}")]
    LogicalConflict(&'static str),

    /// One half of the `filesPerDay`/`avgFileSize` pair was supplied without the other.
    #[error("{0} is required when the other file upload field is specified")]
    MissingPairedField(&'static str),

    /// Neither a request count nor file upload metrics were supplied.
    #[error("provide either requestCount or both filesPerDay and avgFileSize")]
    MissingWorkloadSignal,
}

/// Failure to parse one of the textual input enumerations or a read:write ratio.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown {kind} '{value}' (expected one of: {expected})")]
    UnknownVariant {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("invalid read:write ratio '{0}' (expected two positive integers, e.g. 80:20)")]
    Ratio(String),
}
