//! XML-RPC value model and codec.
//!
//! Two pipelines share one [`Value`] model:
//!
//! ```text
//! encode:  Value ──traverse──▶ XmlNode tree ──quick-xml──▶ XML text
//! decode:  XML text ──quick-xml──▶ XmlNode tree ──decode_value──▶ Value
//! ```
//!
//! Nested arrays and structs are walked with explicit stacks in both
//! directions, so nesting depth is bounded by memory only.
//!
//! # Example
//!
//! ```rust
//! use xmlrpc_core::{build_call, build_success_response, decode_response, MethodResult, Value};
//!
//! let request = build_call("sum", &[Value::from(2), Value::from(3)]).unwrap();
//! assert!(request.contains("<methodName>sum</methodName>"));
//!
//! let body = build_success_response(&Value::from(5)).unwrap();
//! assert_eq!(decode_response(&body).unwrap(), MethodResult::Success(Value::Integer(5)));
//! ```

mod decode;
mod envelope;
mod error;
pub mod logging;
mod node;
mod scalar;
mod traverse;
mod value;

pub use decode::{decode_call, decode_response, decode_response_node, decode_value};
pub use envelope::{build_call, build_fault_response, build_success_response};
pub use error::{CodecError, CodecResult};
pub use node::{Text, XmlNode};
pub use traverse::encode_value;
pub use value::{
    FAULT_CODE, FAULT_STRING, JSON_DEPTH_LIMIT, MethodCall, MethodResult, Number, Value,
};

/// Re-exported so callers can build struct values without naming `indexmap`.
pub use indexmap::IndexMap;
