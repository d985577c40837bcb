//! Scalar encoders: one `<value>` child per primitive type.

use std::sync::LazyLock;

use regex::Regex;

use crate::node::XmlNode;
use crate::value::{BOOLEAN, DOUBLE, INT, NIL, Number, STRING};

/// Matches text that cannot sit inside a CDATA section untouched.
static UNSAFE_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[<&]|\]\]>").expect("Invalid unsafe text regex"));

/// Appends `<boolean>1</boolean>` or `<boolean>0</boolean>`.
pub fn append_boolean(value: &mut XmlNode, b: bool) {
    value.push_child(XmlNode::new(BOOLEAN).with_text(if b { "1" } else { "0" }));
}

pub fn append_integer(value: &mut XmlNode, i: i64) {
    value.push_child(XmlNode::new(INT).with_text(i.to_string()));
}

/// Appends `<int>` or `<double>` depending on [`Number::classify`].
pub fn append_number(value: &mut XmlNode, n: f64) {
    match Number::classify(n) {
        Number::Int(i) => append_integer(value, i),
        Number::Double(d) => value.push_child(XmlNode::new(DOUBLE).with_text(d.to_string())),
    }
}

/// Appends a `<string>`.
///
/// The empty string is an empty element. Text free of `<`, `&` and `]]>`
/// goes into a CDATA section; anything else is entity-escaped.
pub fn append_string(value: &mut XmlNode, s: &str) {
    let node = XmlNode::new(STRING);
    let node = if s.is_empty() {
        node
    } else if UNSAFE_TEXT.is_match(s) {
        node.with_text(s)
    } else {
        node.with_cdata(s)
    };
    value.push_child(node);
}

pub fn append_nil(value: &mut XmlNode) {
    value.push_child(XmlNode::new(NIL));
}
