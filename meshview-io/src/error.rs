//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Parse error: {message}")]
    ParseError { message: String },
    
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IoError> for meshview_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => meshview_core::Error::Io(e),
            IoError::ParseError { message } => meshview_core::Error::InvalidData(message),
        }
    }
}
