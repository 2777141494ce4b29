//! File resolution errors.

use scamp_types::{ErrorCode, ScampError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VfsError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("could not fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file system is read-only.
    #[error("{operation} is not supported: {path}")]
    Unsupported {
        operation: &'static str,
        path: String,
    },

    #[error("unsupported URL scheme: {0}")]
    Scheme(String),
}

impl VfsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            VfsError::NotFound(_) => ErrorCode::FILE_NOT_FOUND,
            VfsError::Fetch { .. } | VfsError::Io { .. } => ErrorCode::FETCH_FAILED,
            VfsError::Unsupported { .. } => ErrorCode::INTERNAL_CONSISTENCY,
            VfsError::Scheme(_) => ErrorCode::UNSUPPORTED_OPERATION,
        }
    }
}

impl From<VfsError> for ScampError {
    fn from(err: VfsError) -> Self {
        let error = ScampError::new(err.code(), err.to_string());
        match err {
            VfsError::NotFound(_) => {
                error.with_hint("check the path, or mount the directory that holds it")
            }
            VfsError::Scheme(_) => error.with_hint("only http:// and https:// URLs can be fetched"),
            _ => error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scamp_types::Phase;

    #[test]
    fn test_into_scamp_error() {
        let err: ScampError = VfsError::NotFound("/x.scm".into()).into();
        assert_eq!(err.code, ErrorCode::FILE_NOT_FOUND);
        assert_eq!(err.phase, Phase::Runtime);
        assert_eq!(err.message, "file not found: /x.scm");
        assert!(err.hint.is_some());
    }

    #[test]
    fn test_write_is_internal_consistency() {
        let err = VfsError::Unsupported {
            operation: "write",
            path: "/a".into(),
        };
        assert_eq!(err.code().ident(), "internal-consistency-error");
    }
}
