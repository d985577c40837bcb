//! Error types for XML-RPC client operations.

use std::fmt;

use thiserror::Error;
use xmlrpc_core::CodecError;

/// The category of a client error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientErrorCode {
    /// Connection failed, timed out, or the body could not be read.
    Network,
    /// The server answered with a 5xx status.
    Server,
    /// The server answered with an unexpected status.
    InvalidResponse,
    /// The request body could not be built.
    Encode,
    /// The response body is not a valid XML-RPC document.
    Decode,
    /// The remote procedure answered with a fault.
    Fault,
    /// The client is missing required configuration.
    Configuration,
}

impl ClientErrorCode {
    /// Returns a stable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network_error",
            Self::Server => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::Encode => "encode_error",
            Self::Decode => "decode_error",
            Self::Fault => "fault",
            Self::Configuration => "configuration_error",
        }
    }
}

impl fmt::Display for ClientErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while performing a remote call.
#[derive(Debug, Error)]
pub struct ClientError {
    code: ClientErrorCode,
    message: String,
    /// `faultCode` of the remote fault, for [`ClientErrorCode::Fault`].
    fault_code: Option<i64>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ClientError {
    /// Creates a new error with the given code and message.
    pub fn new(code: ClientErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            fault_code: None,
            source: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ClientErrorCode::Network, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ClientErrorCode::Server, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ClientErrorCode::InvalidResponse, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ClientErrorCode::Configuration, message)
    }

    /// Wraps a codec error raised while building a request.
    pub fn encode(err: CodecError) -> Self {
        Self::new(ClientErrorCode::Encode, err.to_string()).with_source(err)
    }

    /// Creates a fault error from a decoded `faultCode`/`faultString`.
    pub fn fault(code: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            fault_code: code,
            ..Self::new(ClientErrorCode::Fault, message)
        }
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ClientErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The remote `faultCode`, if this error is a fault that carried one.
    pub fn fault_code(&self) -> Option<i64> {
        self.fault_code
    }

    pub fn is_fault(&self) -> bool {
        self.code == ClientErrorCode::Fault
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(code) = self.fault_code {
            write!(f, " (faultCode {})", code)?;
        }
        Ok(())
    }
}

impl From<CodecError> for ClientError {
    fn from(err: CodecError) -> Self {
        Self::new(ClientErrorCode::Decode, err.to_string()).with_source(err)
    }
}

/// A specialized Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_names() {
        assert_eq!(ClientErrorCode::Network.as_str(), "network_error");
        assert_eq!(ClientErrorCode::Fault.as_str(), "fault");
    }

    #[test]
    fn error_creation() {
        let err = ClientError::server("boom");
        assert_eq!(err.code(), ClientErrorCode::Server);
        assert_eq!(err.message(), "boom");
        assert!(err.fault_code().is_none());
        assert!(!err.is_fault());
    }

    #[test]
    fn fault_display() {
        let err = ClientError::fault(Some(3), "Access Denied");
        assert!(err.is_fault());
        assert_eq!(err.fault_code(), Some(3));
        assert_eq!(err.to_string(), "fault: Access Denied (faultCode 3)");
    }

    #[test]
    fn codec_error_converts_with_source() {
        use std::error::Error;

        let err = ClientError::from(CodecError::MissingValueTag);
        assert_eq!(err.code(), ClientErrorCode::Decode);
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "decode_error: value element has no type tag");
    }

    #[test]
    fn encode_error_keeps_codec_message() {
        let err = ClientError::encode(CodecError::EmptyMethodName);
        assert_eq!(err.code(), ClientErrorCode::Encode);
        assert_eq!(err.to_string(), "encode_error: method name must not be empty");
    }
}
