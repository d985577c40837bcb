//! Stack-based serialization of nested values.
//!
//! [`encode_value`] walks a [`Value`] depth-first with an explicit stack of
//! [`Frame`]s instead of recursing, so nesting depth is limited by memory
//! rather than by the call stack. Each frame owns the `<value>` element it
//! is building; when a frame is popped its finished element is attached to
//! the parent frame's `<data>` or current `<member>`.

use std::slice;

use indexmap::map;

use crate::node::XmlNode;
use crate::scalar;
use crate::value::{DATA, MEMBER, NAME, VALUE, Value};

/// Iteration state of a frame.
enum Cursor<'v> {
    /// The `<value>` element has not been filled in yet.
    Unopened,
    /// A scalar was written; nothing left to visit.
    Leaf,
    Array {
        items: slice::Iter<'v, Value>,
        data: XmlNode,
    },
    Struct {
        members: map::Iter<'v, String, Value>,
        container: XmlNode,
        /// `<member>` waiting for the value currently being serialized.
        member: Option<XmlNode>,
    },
}

/// Pending work for one value.
struct Frame<'v> {
    value: &'v Value,
    node: XmlNode,
    cursor: Cursor<'v>,
}

impl<'v> Frame<'v> {
    fn new(value: &'v Value) -> Self {
        Self {
            value,
            node: XmlNode::new(VALUE),
            cursor: Cursor::Unopened,
        }
    }

    /// Fills in the `<value>` element: scalars are written right away,
    /// compounds get their container and a cursor over their children.
    fn open(&mut self) -> Cursor<'v> {
        match self.value {
            Value::Nil => scalar::append_nil(&mut self.node),
            Value::Boolean(b) => scalar::append_boolean(&mut self.node, *b),
            Value::Integer(i) => scalar::append_integer(&mut self.node, *i),
            Value::Float(f) => scalar::append_number(&mut self.node, *f),
            Value::Text(s) => scalar::append_string(&mut self.node, s),
            Value::Array(items) => {
                return Cursor::Array {
                    items: items.iter(),
                    data: XmlNode::new(DATA),
                };
            }
            Value::Struct(members) => {
                return Cursor::Struct {
                    members: members.iter(),
                    container: XmlNode::new(self.value.tag()),
                    member: None,
                };
            }
        }
        Cursor::Leaf
    }

    /// Returns the next child value to serialize, or `None` once this
    /// frame's subtree is complete.
    fn advance(&mut self) -> Option<&'v Value> {
        if matches!(self.cursor, Cursor::Unopened) {
            self.cursor = self.open();
        }

        match &mut self.cursor {
            Cursor::Unopened | Cursor::Leaf => None,
            Cursor::Array { items, .. } => items.next(),
            Cursor::Struct {
                members, member, ..
            } => {
                let (name, value) = members.next()?;
                *member = Some(XmlNode::new(MEMBER).with_child(XmlNode::new(NAME).with_text(name)));
                Some(value)
            }
        }
    }

    /// Attaches a finished child `<value>`.
    fn attach(&mut self, child: XmlNode) {
        match &mut self.cursor {
            Cursor::Array { data, .. } => data.push_child(child),
            Cursor::Struct {
                container, member, ..
            } => {
                if let Some(mut member) = member.take() {
                    member.push_child(child);
                    container.push_child(member);
                }
            }
            Cursor::Unopened | Cursor::Leaf => {}
        }
    }

    /// Wraps up the frame into its complete `<value>` element.
    fn finish(self) -> XmlNode {
        let Frame {
            value,
            mut node,
            cursor,
        } = self;
        match cursor {
            Cursor::Array { data, .. } => {
                node.push_child(XmlNode::new(value.tag()).with_child(data))
            }
            Cursor::Struct { container, .. } => node.push_child(container),
            Cursor::Unopened | Cursor::Leaf => {}
        }
        node
    }
}

/// Serializes a value into a `<value>` element.
///
/// The output is identical to a recursive depth-first walk: array items
/// and struct members appear in their original order.
pub fn encode_value(value: &Value) -> XmlNode {
    let mut stack = vec![Frame::new(value)];

    while let Some(top) = stack.last_mut() {
        if let Some(child) = top.advance() {
            stack.push(Frame::new(child));
            continue;
        }

        let Some(done) = stack.pop() else { break };
        let node = done.finish();
        match stack.last_mut() {
            Some(parent) => parent.attach(node),
            None => return node,
        }
    }

    unreachable!("the root frame returns from the loop")
}
