use crate::record::MalformedRecord;
use std::fmt::Display;
use std::str::FromStr;

/// Failures that end the processing of a log file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The (decompressed) log file could not be read.
    #[error("Failed to read log file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Malformed record on line {line}: {source}")]
    MalformedRecord {
        line: usize,
        #[source]
        source: MalformedRecord,
    },
    #[error("Failed to encode record on line {line}: {source}")]
    Encoding {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Returns the 1-based line number for errors caused by a single line.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Read(_) => None,
            Error::MalformedRecord { line, .. } | Error::Encoding { line, .. } => Some(*line),
        }
    }

    /// Describes what went wrong, without the line number.
    pub fn reason(&self) -> String {
        match self {
            Error::Read(error) => error.to_string(),
            Error::MalformedRecord { source, .. } => source.to_string(),
            Error::Encoding { source, .. } => source.to_string(),
        }
    }
}

/// A line that was skipped under [`ErrorPolicy::Collect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub reason: String,
}

/// Decides what happens to the rest of a log file once a line fails to parse
/// or encode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop at the first broken line and treat the whole file as failed.
    #[default]
    Abort,
    /// Skip broken lines and report them alongside the payload.
    Collect,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown error policy {0:?}, expected `abort` or `collect`")]
pub struct UnknownErrorPolicy(String);

impl FromStr for ErrorPolicy {
    type Err = UnknownErrorPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(ErrorPolicy::Abort),
            "collect" => Ok(ErrorPolicy::Collect),
            _ => Err(UnknownErrorPolicy(s.to_string())),
        }
    }
}

impl Display for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorPolicy::Abort => f.write_str("abort"),
            ErrorPolicy::Collect => f.write_str("collect"),
        }
    }
}
