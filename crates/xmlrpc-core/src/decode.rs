//! Decoding XML-RPC documents back into values.
//!
//! Documents are parsed into an [`XmlNode`] tree first. [`decode_value`]
//! then maps `<value>` nodes onto [`Value`]s, dispatching on the type tag.
//! Nested arrays and structs are handled with an explicit frame stack, the
//! same way the encoder walks them, so deep documents cannot overflow the
//! call stack.
//!
//! The first error aborts the whole decode; no partial values are returned.

use std::slice;

use indexmap::IndexMap;
use tracing::debug;

use crate::envelope::{FAULT, METHOD_CALL, METHOD_NAME, METHOD_RESPONSE, PARAM, PARAMS};
use crate::error::{CodecError, CodecResult};
use crate::node::XmlNode;
use crate::value::{
    ARRAY, BOOLEAN, DATA, DOUBLE, I4, I8, INT, MEMBER, MethodCall, MethodResult, NAME, NIL,
    STRING, STRUCT, VALUE, Value,
};

/// Decodes a `methodResponse` document.
///
/// A `params` child yields [`MethodResult::Success`], a `fault` child
/// yields [`MethodResult::Fault`]. The fault value is returned as decoded,
/// whatever its shape.
///
/// # Errors
///
/// Fails if the XML is malformed, the envelope has neither `params` nor
/// `fault`, or any nested value is invalid.
///
/// # Example
///
/// ```rust
/// use xmlrpc_core::{decode_response, MethodResult, Value};
///
/// let xml = "<methodResponse><params><param><value><int>7</int></value></param></params></methodResponse>";
/// assert_eq!(decode_response(xml).unwrap(), MethodResult::Success(Value::Integer(7)));
/// ```
pub fn decode_response(xml: &str) -> CodecResult<MethodResult> {
    let root = XmlNode::parse(xml)?;
    decode_response_node(&root)
}

/// Classifies and decodes an already parsed `methodResponse` element.
pub fn decode_response_node(root: &XmlNode) -> CodecResult<MethodResult> {
    if root.name() != METHOD_RESPONSE {
        return Err(CodecError::MalformedEnvelope(format!(
            "expected <{}>, found <{}>",
            METHOD_RESPONSE,
            root.name()
        )));
    }

    if let Some(params) = root.child(PARAMS) {
        let param = params
            .child(PARAM)
            .ok_or_else(|| CodecError::mismatch(PARAMS, PARAM))?;
        let value = param_value(param)?;
        debug!(kind = "success", "decoded methodResponse");
        return Ok(MethodResult::Success(value));
    }

    if let Some(fault) = root.child(FAULT) {
        let value = fault
            .child(VALUE)
            .ok_or_else(|| CodecError::mismatch(FAULT, VALUE))?;
        let value = decode_value(value)?;
        debug!(kind = "fault", "decoded methodResponse");
        return Ok(MethodResult::Fault(value));
    }

    Err(CodecError::MalformedEnvelope(
        "methodResponse has neither <params> nor <fault>".to_string(),
    ))
}

/// Decodes a `methodCall` document.
///
/// `params` may be omitted, in which case the call has no parameters.
pub fn decode_call(xml: &str) -> CodecResult<MethodCall> {
    let root = XmlNode::parse(xml)?;
    if root.name() != METHOD_CALL {
        return Err(CodecError::MalformedEnvelope(format!(
            "expected <{}>, found <{}>",
            METHOD_CALL,
            root.name()
        )));
    }

    let name = root
        .child(METHOD_NAME)
        .ok_or_else(|| CodecError::mismatch(METHOD_CALL, METHOD_NAME))?;
    let params = match root.child(PARAMS) {
        Some(list) => list
            .children_named(PARAM)
            .map(param_value)
            .collect::<CodecResult<Vec<_>>>()?,
        None => Vec::new(),
    };

    let call = MethodCall::new(name.text().unwrap_or_default().trim(), params)?;
    debug!(method = %call.method_name(), params = call.params().len(), "decoded methodCall");
    Ok(call)
}

fn param_value(param: &XmlNode) -> CodecResult<Value> {
    let value = param
        .child(VALUE)
        .ok_or_else(|| CodecError::mismatch(PARAM, VALUE))?;
    decode_value(value)
}

/// A compound value whose children are still being decoded.
enum Frame<'a> {
    Array {
        entries: slice::Iter<'a, XmlNode>,
        items: Vec<Value>,
    },
    Struct {
        members: slice::Iter<'a, XmlNode>,
        fields: IndexMap<String, Value>,
        /// Name of the member whose value is being decoded.
        pending: Option<String>,
    },
}

impl<'a> Frame<'a> {
    /// The next `<value>` node to decode, or `None` when all children are done.
    ///
    /// `<data>` may only hold `<value>` elements and `<struct>` only
    /// `<member>` elements; anything else is a structural mismatch.
    fn next_value(&mut self) -> CodecResult<Option<&'a XmlNode>> {
        match self {
            Frame::Array { entries, .. } => match entries.next() {
                Some(entry) if entry.name() == VALUE => Ok(Some(entry)),
                Some(_) => Err(CodecError::mismatch(DATA, VALUE)),
                None => Ok(None),
            },
            Frame::Struct {
                members, pending, ..
            } => {
                let Some(member) = members.next() else {
                    return Ok(None);
                };
                if member.name() != MEMBER {
                    return Err(CodecError::mismatch(STRUCT, MEMBER));
                }
                let name = member
                    .child(NAME)
                    .ok_or_else(|| CodecError::mismatch(MEMBER, NAME))?;
                let value = member
                    .child(VALUE)
                    .ok_or_else(|| CodecError::mismatch(MEMBER, VALUE))?;
                *pending = Some(name.text().unwrap_or_default().to_string());
                Ok(Some(value))
            }
        }
    }

    fn accept(&mut self, value: Value) {
        match self {
            Frame::Array { items, .. } => items.push(value),
            Frame::Struct {
                fields, pending, ..
            } => {
                // last write wins; the key keeps its first position
                if let Some(name) = pending.take() {
                    fields.insert(name, value);
                }
            }
        }
    }

    fn finish(self) -> Value {
        match self {
            Frame::Array { items, .. } => Value::Array(items),
            Frame::Struct { fields, .. } => Value::Struct(fields),
        }
    }
}

enum Opened<'a> {
    Scalar(Value),
    Compound(Frame<'a>),
}

/// Decodes a single `<value>` element.
///
/// The first child element selects the type: `int`/`i4`/`i8`, `double`,
/// `boolean`, `string`, `nil`, `array` or `struct`. A struct or array may
/// have zero, one or many entries; all three shapes decode the same way.
///
/// # Errors
///
/// Fails on a missing or unknown type tag, unparsable numbers, and
/// compounds missing required children.
pub fn decode_value(value: &XmlNode) -> CodecResult<Value> {
    let mut stack = match open(value)? {
        Opened::Scalar(v) => return Ok(v),
        Opened::Compound(frame) => vec![frame],
    };
    let mut completed: Option<Value> = None;

    while let Some(top) = stack.last_mut() {
        if let Some(v) = completed.take() {
            top.accept(v);
        }

        if let Some(child) = top.next_value()? {
            match open(child)? {
                Opened::Scalar(v) => completed = Some(v),
                Opened::Compound(frame) => stack.push(frame),
            }
            continue;
        }

        let Some(frame) = stack.pop() else { break };
        let v = frame.finish();
        if stack.is_empty() {
            return Ok(v);
        }
        completed = Some(v);
    }

    unreachable!("the root frame returns when it is popped")
}

fn open(value: &XmlNode) -> CodecResult<Opened<'_>> {
    let typed = value.first_child().ok_or(CodecError::MissingValueTag)?;
    let text = typed.text();

    let scalar = match typed.name() {
        STRUCT => {
            return Ok(Opened::Compound(Frame::Struct {
                members: typed.children().iter(),
                fields: IndexMap::new(),
                pending: None,
            }));
        }
        ARRAY => {
            let data = typed
                .child(DATA)
                .ok_or_else(|| CodecError::mismatch(ARRAY, DATA))?;
            return Ok(Opened::Compound(Frame::Array {
                entries: data.children().iter(),
                items: Vec::new(),
            }));
        }
        INT => parse_int(INT, text)?,
        I4 => parse_int(I4, text)?,
        I8 => parse_int(I8, text)?,
        DOUBLE => {
            let raw = text.unwrap_or_default();
            let d = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| CodecError::MalformedScalar {
                    tag: DOUBLE,
                    text: raw.to_string(),
                })?;
            Value::Float(d)
        }
        STRING => Value::Text(text.unwrap_or_default().to_string()),
        BOOLEAN => Value::Boolean(text.map(str::trim) == Some("1")),
        NIL => Value::Nil,
        other => {
            return Err(CodecError::UnrecognizedValueTag {
                tag: other.to_string(),
            });
        }
    };
    Ok(Opened::Scalar(scalar))
}

fn parse_int(tag: &'static str, text: Option<&str>) -> CodecResult<Value> {
    let raw = text.unwrap_or_default();
    raw.trim()
        .parse::<i64>()
        .map(Value::Integer)
        .map_err(|_| CodecError::MalformedScalar {
            tag,
            text: raw.to_string(),
        })
}
