//! Codec error types.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding XML-RPC documents.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The document root is not the expected envelope, or the envelope
    /// carries neither `params` nor `fault`.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// A `<value>` holds an element that is not an XML-RPC type tag.
    #[error("unrecognized value tag <{tag}>")]
    UnrecognizedValueTag { tag: String },

    /// A `<value>` holds no type element at all.
    #[error("value element has no type tag")]
    MissingValueTag,

    /// Scalar text that does not parse as its declared type.
    #[error("malformed <{tag}> content: {text:?}")]
    MalformedScalar { tag: &'static str, text: String },

    /// A node is missing a child the grammar requires, or holds one it
    /// does not allow.
    #[error("<{parent}> does not hold the expected <{expected}>")]
    StructuralMismatch {
        parent: String,
        expected: &'static str,
    },

    /// A method call without a method name.
    #[error("method name must not be empty")]
    EmptyMethodName,

    /// The XML tokenizer rejected the document.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Writing the document failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The written document is not valid UTF-8.
    #[error("invalid UTF-8 in document: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl CodecError {
    pub(crate) fn mismatch(parent: impl Into<String>, expected: &'static str) -> Self {
        Self::StructuralMismatch {
            parent: parent.into(),
            expected,
        }
    }
}
