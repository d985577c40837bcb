//! The XML-RPC value model.
//!
//! [`Value`] is the closed set of types the wire format can carry. Structs
//! keep their members in insertion order so that a decoded struct re-encodes
//! with the same member sequence.

use std::fmt;
use std::mem;
use std::slice;

use indexmap::IndexMap;
use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};

/// `<value>` wrapper element.
pub const VALUE: &str = "value";
/// `<nil/>` type tag.
pub const NIL: &str = "nil";
/// `<boolean>` type tag.
pub const BOOLEAN: &str = "boolean";
/// `<int>` type tag.
pub const INT: &str = "int";
/// `<i4>` alias of `<int>`.
pub const I4: &str = "i4";
/// `<i8>` 64-bit integer extension.
pub const I8: &str = "i8";
/// `<double>` type tag.
pub const DOUBLE: &str = "double";
/// `<string>` type tag.
pub const STRING: &str = "string";
/// `<array>` type tag.
pub const ARRAY: &str = "array";
/// `<data>` container inside `<array>`.
pub const DATA: &str = "data";
/// `<struct>` type tag.
pub const STRUCT: &str = "struct";
/// `<member>` entry inside `<struct>`.
pub const MEMBER: &str = "member";
/// `<name>` of a struct member.
pub const NAME: &str = "name";

/// Conventional fault struct member holding the numeric code.
pub const FAULT_CODE: &str = "faultCode";
/// Conventional fault struct member holding the message.
pub const FAULT_STRING: &str = "faultString";

/// An XML-RPC value.
///
/// `Clone`, `PartialEq`, `Debug` and `Drop` walk nested values with an
/// explicit stack, so they work at any depth the decoder produces.
pub enum Value {
    /// `<nil/>`, also used for absent values.
    Nil,
    /// `<boolean>`
    Boolean(bool),
    /// `<int>`
    Integer(i64),
    /// `<double>`. Whole numbers are written as `<int>`, see [`Number::classify`].
    Float(f64),
    /// `<string>`
    Text(String),
    /// `<array>`
    Array(Vec<Value>),
    /// `<struct>`, members in insertion order.
    Struct(IndexMap<String, Value>),
}

/// The wire form a number takes once classified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Written as `<int>`.
    Int(i64),
    /// Written as `<double>`.
    Double(f64),
}

impl Number {
    /// Classifies a number for the wire.
    ///
    /// A number with no fractional part is an integer, everything else is a
    /// double. This means `4.0` goes out as `<int>4</int>` and comes back as
    /// [`Value::Integer`]. Whole numbers outside the `i64` range stay doubles
    /// since `<int>` text must parse back as a 64-bit integer.
    pub fn classify(n: f64) -> Self {
        // 2^63 is exactly representable, i64::MAX is not
        const LIMIT: f64 = 9_223_372_036_854_775_808.0;
        if n % 1.0 == 0.0 && (-LIMIT..LIMIT).contains(&n) {
            Number::Int(n as i64)
        } else {
            Number::Double(n)
        }
    }
}

impl Value {
    /// Builds a value from a dynamically typed number, applying
    /// [`Number::classify`].
    pub fn number(n: f64) -> Self {
        match Number::classify(n) {
            Number::Int(i) => Value::Integer(i),
            Number::Double(d) => Value::Float(d),
        }
    }

    /// Builds a struct from `(name, value)` pairs. A repeated name keeps its
    /// first position and takes the last value.
    pub fn structure<K, V, I>(members: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Struct(
            members
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds the conventional `{faultCode, faultString}` fault struct.
    pub fn fault(code: i64, message: impl Into<String>) -> Self {
        Value::structure([
            (FAULT_CODE, Value::Integer(code)),
            (FAULT_STRING, Value::Text(message.into())),
        ])
    }

    /// Converts dynamically typed JSON into a value.
    ///
    /// Numbers that do not fit an `i64` go through [`Value::number`].
    pub fn from_json(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Nil,
            Json::Bool(b) => Value::Boolean(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::number(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::Text(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from_json).collect()),
            Json::Object(map) => Value::Struct(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// The XML-RPC type tag this value is written with.
    pub fn tag(&self) -> &'static str {
        match self {
            Value::Nil => NIL,
            Value::Boolean(_) => BOOLEAN,
            Value::Integer(_) => INT,
            Value::Float(f) => match Number::classify(*f) {
                Number::Int(_) => INT,
                Number::Double(_) => DOUBLE,
            },
            Value::Text(_) => STRING,
            Value::Array(_) => ARRAY,
            Value::Struct(_) => STRUCT,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the number as `f64`, accepting integers too.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Struct(members) => Some(members),
            _ => None,
        }
    }

    /// Looks up a struct member by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_struct()?.get(name)
    }

    /// Takes the string out of a `Text` value.
    pub fn into_string(mut self) -> Option<String> {
        match &mut self {
            Value::Text(s) => Some(mem::take(s)),
            _ => None,
        }
    }

    /// Takes the items out of an `Array` value.
    pub fn into_array(mut self) -> Option<Vec<Value>> {
        match &mut self {
            Value::Array(items) => Some(mem::take(items)),
            _ => None,
        }
    }

    /// Takes the members out of a `Struct` value.
    pub fn into_struct(mut self) -> Option<IndexMap<String, Value>> {
        match &mut self {
            Value::Struct(members) => Some(mem::take(members)),
            _ => None,
        }
    }

    /// Copies a scalar, or starts a copy frame for a compound.
    fn start_copy(&self) -> CopyStep<'_> {
        match self {
            Value::Nil => CopyStep::Done(Value::Nil),
            Value::Boolean(b) => CopyStep::Done(Value::Boolean(*b)),
            Value::Integer(i) => CopyStep::Done(Value::Integer(*i)),
            Value::Float(f) => CopyStep::Done(Value::Float(*f)),
            Value::Text(s) => CopyStep::Done(Value::Text(s.clone())),
            Value::Array(items) => CopyStep::Pending(CopyFrame::Array {
                items: items.iter(),
                copied: Vec::with_capacity(items.len()),
            }),
            Value::Struct(members) => CopyStep::Pending(CopyFrame::Struct {
                members: members.iter(),
                copied: IndexMap::with_capacity(members.len()),
                name: None,
            }),
        }
    }
}

enum CopyStep<'a> {
    Done(Value),
    Pending(CopyFrame<'a>),
}

/// A compound being cloned, with the source children still to copy.
enum CopyFrame<'a> {
    Array {
        items: slice::Iter<'a, Value>,
        copied: Vec<Value>,
    },
    Struct {
        members: indexmap::map::Iter<'a, String, Value>,
        copied: IndexMap<String, Value>,
        /// Member whose value is being copied.
        name: Option<&'a String>,
    },
}

impl<'a> CopyFrame<'a> {
    fn next_child(&mut self) -> Option<&'a Value> {
        match self {
            CopyFrame::Array { items, .. } => items.next(),
            CopyFrame::Struct { members, name, .. } => {
                let (key, value) = members.next()?;
                *name = Some(key);
                Some(value)
            }
        }
    }

    fn accept(&mut self, value: Value) {
        match self {
            CopyFrame::Array { copied, .. } => copied.push(value),
            CopyFrame::Struct { copied, name, .. } => {
                if let Some(key) = name.take() {
                    copied.insert(key.clone(), value);
                }
            }
        }
    }

    fn finish(self) -> Value {
        match self {
            CopyFrame::Array { copied, .. } => Value::Array(copied),
            CopyFrame::Struct { copied, .. } => Value::Struct(copied),
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        let mut stack = match self.start_copy() {
            CopyStep::Done(value) => return value,
            CopyStep::Pending(frame) => vec![frame],
        };
        let mut completed: Option<Value> = None;

        while let Some(top) = stack.last_mut() {
            if let Some(value) = completed.take() {
                top.accept(value);
            }

            if let Some(child) = top.next_child() {
                match child.start_copy() {
                    CopyStep::Done(value) => completed = Some(value),
                    CopyStep::Pending(frame) => stack.push(frame),
                }
                continue;
            }

            let Some(frame) = stack.pop() else { break };
            let value = frame.finish();
            if stack.is_empty() {
                return value;
            }
            completed = Some(value);
        }

        unreachable!("the root frame returns when it is popped")
    }
}

// Struct equality ignores member order, like `IndexMap`'s own `==`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            match pair {
                (Value::Nil, Value::Nil) => {}
                (Value::Boolean(a), Value::Boolean(b)) if a == b => {}
                (Value::Integer(a), Value::Integer(b)) if a == b => {}
                (Value::Float(a), Value::Float(b)) if a == b => {}
                (Value::Text(a), Value::Text(b)) if a == b => {}
                (Value::Array(a), Value::Array(b)) if a.len() == b.len() => {
                    pending.extend(a.iter().zip(b));
                }
                (Value::Struct(a), Value::Struct(b)) if a.len() == b.len() => {
                    for (name, value) in a {
                        match b.get(name) {
                            Some(other) => pending.push((value, other)),
                            None => return false,
                        }
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

/// A piece of `Debug` output still to be written.
enum DebugPiece<'a> {
    Value(&'a Value),
    Name(&'a str),
    Punct(&'static str),
}

// Same text as a derived `Debug` in its single-line form.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = vec![DebugPiece::Value(self)];
        while let Some(piece) = pending.pop() {
            let value = match piece {
                DebugPiece::Value(value) => value,
                DebugPiece::Name(name) => {
                    write!(f, "{name:?}")?;
                    continue;
                }
                DebugPiece::Punct(text) => {
                    f.write_str(text)?;
                    continue;
                }
            };

            match value {
                Value::Nil => f.write_str("Nil")?,
                Value::Boolean(b) => write!(f, "Boolean({b:?})")?,
                Value::Integer(i) => write!(f, "Integer({i:?})")?,
                Value::Float(x) => write!(f, "Float({x:?})")?,
                Value::Text(s) => write!(f, "Text({s:?})")?,
                Value::Array(items) => {
                    f.write_str("Array([")?;
                    pending.push(DebugPiece::Punct("])"));
                    for (i, item) in items.iter().enumerate().rev() {
                        pending.push(DebugPiece::Value(item));
                        if i > 0 {
                            pending.push(DebugPiece::Punct(", "));
                        }
                    }
                }
                Value::Struct(members) => {
                    f.write_str("Struct({")?;
                    pending.push(DebugPiece::Punct("})"));
                    for (i, (name, member)) in members.iter().enumerate().rev() {
                        pending.push(DebugPiece::Value(member));
                        pending.push(DebugPiece::Punct(": "));
                        pending.push(DebugPiece::Name(name));
                        if i > 0 {
                            pending.push(DebugPiece::Punct(", "));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

// Nested values are freed with an explicit stack so that dropping a deep
// tree cannot exhaust the call stack.
impl Drop for Value {
    fn drop(&mut self) {
        let mut pending = match self {
            Value::Array(items) => mem::take(items),
            Value::Struct(members) => mem::take(members).into_values().collect(),
            _ => return,
        };
        while let Some(mut value) = pending.pop() {
            match &mut value {
                Value::Array(items) => pending.append(items),
                Value::Struct(members) => pending.extend(mem::take(members).into_values()),
                _ => {}
            }
        }
    }
}

/// Deepest nesting the JSON view will serialize. Serde's serializers are
/// recursive, so deeper values fail with an error instead.
pub const JSON_DEPTH_LIMIT: usize = 256;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Nested {
            value: self,
            depth: 0,
        }
        .serialize(serializer)
    }
}

struct Nested<'a> {
    value: &'a Value,
    depth: usize,
}

impl Nested<'_> {
    fn child<'b>(&self, value: &'b Value) -> Nested<'b> {
        Nested {
            value,
            depth: self.depth + 1,
        }
    }
}

impl Serialize for Nested<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.depth > JSON_DEPTH_LIMIT {
            return Err(S::Error::custom(format!(
                "value nested deeper than {JSON_DEPTH_LIMIT} levels"
            )));
        }

        match self.value {
            Value::Nil => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&self.child(item))?;
                }
                seq.end()
            }
            Value::Struct(members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (name, value) in members {
                    map.serialize_entry(name, &self.child(value))?;
                }
                map.end()
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i.into())
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(members: IndexMap<String, Value>) -> Self {
        Value::Struct(members)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

/// An outgoing method call.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    method_name: String,
    params: Vec<Value>,
}

impl MethodCall {
    /// Creates a method call.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::EmptyMethodName`](crate::CodecError::EmptyMethodName)
    /// if `method_name` is empty.
    pub fn new(method_name: impl Into<String>, params: Vec<Value>) -> crate::CodecResult<Self> {
        let method_name = method_name.into();
        if method_name.is_empty() {
            return Err(crate::CodecError::EmptyMethodName);
        }
        Ok(Self {
            method_name,
            params,
        })
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Splits the call into its name and parameters.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.method_name, self.params)
    }
}

/// The outcome carried by a `methodResponse`.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResult {
    /// `params > param > value`
    Success(Value),
    /// `fault > value`. Conventionally a `{faultCode, faultString}` struct,
    /// but any value is accepted.
    Fault(Value),
}

impl MethodResult {
    pub fn is_fault(&self) -> bool {
        matches!(self, MethodResult::Fault(_))
    }

    /// The carried value, success or fault.
    pub fn value(&self) -> &Value {
        match self {
            MethodResult::Success(value) | MethodResult::Fault(value) => value,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            MethodResult::Success(value) | MethodResult::Fault(value) => value,
        }
    }

    /// Returns `Ok` for a success and `Err` with the fault value otherwise.
    pub fn into_result(self) -> Result<Value, Value> {
        match self {
            MethodResult::Success(value) => Ok(value),
            MethodResult::Fault(value) => Err(value),
        }
    }

    /// The fault's `faultCode` member, if this is a fault carrying one.
    pub fn fault_code(&self) -> Option<i64> {
        match self {
            MethodResult::Fault(value) => value.get(FAULT_CODE)?.as_i64(),
            MethodResult::Success(_) => None,
        }
    }

    /// The fault's `faultString` member, if this is a fault carrying one.
    pub fn fault_string(&self) -> Option<&str> {
        match self {
            MethodResult::Fault(value) => value.get(FAULT_STRING)?.as_str(),
            MethodResult::Success(_) => None,
        }
    }
}
