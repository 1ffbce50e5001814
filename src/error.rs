use std::fmt::{self, Display};
use std::io;

/// Provides `EpinetError` and maps to other errors to
/// convert to an `EpinetError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum EpinetError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
    /// A social graph could not be built with the requested parameters.
    GraphError(String),
    /// A parameter file parsed but described an unusable configuration.
    ParamsError(String),
    /// A report could not be written to the requested destination.
    ReportError(String),
}

impl From<io::Error> for EpinetError {
    fn from(error: io::Error) -> Self {
        EpinetError::IoError(error)
    }
}

impl From<serde_json::Error> for EpinetError {
    fn from(error: serde_json::Error) -> Self {
        EpinetError::JsonError(error)
    }
}

impl From<csv::Error> for EpinetError {
    fn from(error: csv::Error) -> Self {
        EpinetError::CsvError(error)
    }
}

impl std::error::Error for EpinetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EpinetError::IoError(e) => Some(e),
            EpinetError::JsonError(e) => Some(e),
            EpinetError::CsvError(e) => Some(e),
            EpinetError::GraphError(_)
            | EpinetError::ParamsError(_)
            | EpinetError::ReportError(_) => None,
        }
    }
}

impl Display for EpinetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EpinetError::IoError(e) => write!(f, "I/O error: {e}"),
            EpinetError::JsonError(e) => write!(f, "JSON error: {e}"),
            EpinetError::CsvError(e) => write!(f, "CSV error: {e}"),
            EpinetError::GraphError(msg) => write!(f, "graph error: {msg}"),
            EpinetError::ParamsError(msg) => write!(f, "parameter error: {msg}"),
            EpinetError::ReportError(msg) => write!(f, "report error: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_error_converts_and_keeps_source() {
        let err: EpinetError = io::Error::new(io::ErrorKind::NotFound, "missing.json").into();
        assert!(matches!(err, EpinetError::IoError(_)));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn json_error_converts() {
        let parse_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: EpinetError = parse_err.into();
        assert!(matches!(err, EpinetError::JsonError(_)));
        assert!(err.to_string().starts_with("JSON error"));
    }

    #[test]
    fn message_variants_have_no_source() {
        let err = EpinetError::GraphError("k exceeds population".to_string());
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "graph error: k exceeds population");
    }
}
