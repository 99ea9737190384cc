//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Index out of bounds: ({row}, {col}) on a {size}x{size} grid")]
    IndexOutOfBounds { row: usize, col: usize, size: usize },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message() {
        let err = Error::IndexOutOfBounds { row: 7, col: 2, size: 5 };
        assert_eq!(err.to_string(), "Index out of bounds: (7, 2) on a 5x5 grid");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
