use crate::parsing::error::ParserError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatementError {
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Resource not found")]
    NotFound,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown statement kind: {0}")]
    UnknownStatementKind(String),

    #[error("Failed to parse {document}: {source}")]
    ParseFailed {
        document: String,
        #[source]
        source: ParserError,
    },

    #[error("Parser error: {0}")]
    ParserError(#[from] ParserError),
}

impl StatementError {
    /// Wraps a parser failure with the identity of the document it came from.
    pub fn parse_failed(document: impl Into<String>, source: ParserError) -> Self {
        StatementError::ParseFailed {
            document: document.into(),
            source,
        }
    }

    /// True when the failure is confined to a single document, so a batch
    /// caller can skip it and continue with the next one.
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            StatementError::ParseFailed { .. } | StatementError::ParserError(_)
        )
    }

    /// The underlying parser failure, if this error came from parsing.
    pub fn parser_error(&self) -> Option<&ParserError> {
        match self {
            StatementError::ParseFailed { source, .. } => Some(source),
            StatementError::ParserError(source) => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StatementError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::error::DefectKind;

    #[test]
    fn test_parse_failed_keeps_document_and_source() {
        let err = StatementError::parse_failed("R2.htm", ParserError::MissingHeader);

        assert!(err.is_document_error());
        assert_eq!(
            err.parser_error().map(ParserError::kind),
            Some(DefectKind::Structure)
        );
        assert_eq!(
            err.to_string(),
            "Failed to parse R2.htm: statement table has no header row"
        );
    }

    #[test]
    fn test_transport_errors_are_not_document_errors() {
        assert!(!StatementError::NotFound.is_document_error());
        assert!(!StatementError::RateLimitExceeded.is_document_error());
        assert!(StatementError::NotFound.parser_error().is_none());
    }
}
