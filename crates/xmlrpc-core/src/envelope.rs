//! `methodCall` and `methodResponse` envelopes.

use tracing::trace;

use crate::error::{CodecError, CodecResult};
use crate::node::XmlNode;
use crate::traverse::encode_value;
use crate::value::{MethodCall, MethodResult, Value};

/// `<methodCall>` root element.
pub const METHOD_CALL: &str = "methodCall";
/// `<methodName>` inside `<methodCall>`.
pub const METHOD_NAME: &str = "methodName";
/// `<methodResponse>` root element.
pub const METHOD_RESPONSE: &str = "methodResponse";
/// `<params>` list.
pub const PARAMS: &str = "params";
/// `<param>` entry.
pub const PARAM: &str = "param";
/// `<fault>` wrapper.
pub const FAULT: &str = "fault";

/// Builds a `methodCall` document.
///
/// Each parameter becomes a `<param>` in order.
///
/// # Errors
///
/// Returns [`CodecError::EmptyMethodName`] if `method_name` is empty.
///
/// # Example
///
/// ```rust
/// use xmlrpc_core::{build_call, Value};
///
/// let xml = build_call("system.listMethods", &[]).unwrap();
/// assert!(xml.starts_with("<?xml version=\"1.0\"?><methodCall>"));
/// ```
pub fn build_call(method_name: &str, params: &[Value]) -> CodecResult<String> {
    if method_name.is_empty() {
        return Err(CodecError::EmptyMethodName);
    }
    trace!(method = %method_name, params = params.len(), "building methodCall");

    let mut list = XmlNode::new(PARAMS);
    for param in params {
        list.push_child(XmlNode::new(PARAM).with_child(encode_value(param)));
    }

    XmlNode::new(METHOD_CALL)
        .with_child(XmlNode::new(METHOD_NAME).with_text(method_name))
        .with_child(list)
        .to_document()
}

/// Builds a `methodResponse` carrying a single return value.
pub fn build_success_response(value: &Value) -> CodecResult<String> {
    trace!(kind = "success", "building methodResponse");
    XmlNode::new(METHOD_RESPONSE)
        .with_child(XmlNode::new(PARAMS).with_child(XmlNode::new(PARAM).with_child(encode_value(value))))
        .to_document()
}

/// Builds a `methodResponse` carrying a fault.
///
/// `fault` is usually built with [`Value::fault`], but any value is written
/// as given.
pub fn build_fault_response(fault: &Value) -> CodecResult<String> {
    trace!(kind = "fault", "building methodResponse");
    XmlNode::new(METHOD_RESPONSE)
        .with_child(XmlNode::new(FAULT).with_child(encode_value(fault)))
        .to_document()
}

impl MethodCall {
    /// Serializes the call as a `methodCall` document.
    pub fn to_xml(&self) -> CodecResult<String> {
        build_call(self.method_name(), self.params())
    }
}

impl MethodResult {
    /// Serializes the result as a `methodResponse` document.
    pub fn to_xml(&self) -> CodecResult<String> {
        match self {
            MethodResult::Success(value) => build_success_response(value),
            MethodResult::Fault(value) => build_fault_response(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticate_call() {
        let xml = build_call(
            "authenticate",
            &[
                Value::from("mydb"),
                Value::from("admin"),
                Value::from("pw"),
                Value::structure(Vec::<(String, Value)>::new()),
            ],
        )
        .unwrap();

        insta::assert_snapshot!(xml, @r#"<?xml version="1.0"?><methodCall><methodName>authenticate</methodName><params><param><value><string><![CDATA[mydb]]></string></value></param><param><value><string><![CDATA[admin]]></string></value></param><param><value><string><![CDATA[pw]]></string></value></param><param><value><struct/></value></param></params></methodCall>"#);
    }

    #[test]
    fn call_without_params() {
        let xml = build_call("ping", &[]).unwrap();
        insta::assert_snapshot!(xml, @r#"<?xml version="1.0"?><methodCall><methodName>ping</methodName><params/></methodCall>"#);
    }

    #[test]
    fn empty_method_name_is_rejected() {
        assert!(matches!(
            build_call("", &[Value::Nil]),
            Err(CodecError::EmptyMethodName)
        ));
    }

    #[test]
    fn success_response() {
        let xml = build_success_response(&Value::Float(2.5)).unwrap();
        insta::assert_snapshot!(xml, @r#"<?xml version="1.0"?><methodResponse><params><param><value><double>2.5</double></value></param></params></methodResponse>"#);
    }

    #[test]
    fn fault_response() {
        let xml = build_fault_response(&Value::fault(4, "Too many parameters")).unwrap();
        insta::assert_snapshot!(xml, @r#"<?xml version="1.0"?><methodResponse><fault><value><struct><member><name>faultCode</name><value><int>4</int></value></member><member><name>faultString</name><value><string><![CDATA[Too many parameters]]></string></value></member></struct></value></fault></methodResponse>"#);
    }

    #[test]
    fn typed_entry_points_match_free_functions() {
        let call = MethodCall::new("echo", vec![Value::from(true)]).unwrap();
        assert_eq!(call.to_xml().unwrap(), build_call("echo", &[Value::Boolean(true)]).unwrap());

        let fault = MethodResult::Fault(Value::from("nope"));
        assert_eq!(fault.to_xml().unwrap(), build_fault_response(&Value::from("nope")).unwrap());
    }
}
