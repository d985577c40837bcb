//! A small typed XML tree over quick-xml.
//!
//! The encoder builds an [`XmlNode`] tree and writes it with
//! [`XmlNode::to_document`]; the decoder reads documents into the same
//! shape with [`XmlNode::parse`]. Each element is one node, with its text
//! and child elements kept apart, so a single child and many children look
//! the same to callers: always a `Vec`.
//!
//! Writing, parsing and dropping all walk the tree with an explicit stack.

use std::io::Cursor;
use std::mem;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{CodecError, CodecResult};

/// Character content of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Text {
    /// Entity-escaped on output.
    Plain(String),
    /// Written verbatim inside a CDATA section.
    CData(String),
}

impl Text {
    pub fn as_str(&self) -> &str {
        match self {
            Text::Plain(s) | Text::CData(s) => s,
        }
    }
}

/// An XML element with its attributes, text and child elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<Text>,
    children: Vec<XmlNode>,
}

impl XmlNode {
    /// Creates an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Sets escaped text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(Text::Plain(text.into()));
        self
    }

    /// Sets CDATA text content.
    pub fn with_cdata(mut self, text: impl Into<String>) -> Self {
        self.text = Some(Text::CData(text.into()));
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn push_child(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Looks up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The element's text, if it has any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_ref().map(Text::as_str)
    }

    pub fn text_content(&self) -> Option<&Text> {
        self.text.as_ref()
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    pub fn first_child(&self) -> Option<&XmlNode> {
        self.children.first()
    }

    /// The first child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Serializes the tree as a document with a leading
    /// `<?xml version="1.0"?>` declaration and no extra whitespace.
    ///
    /// Elements without text or children are written as empty elements.
    pub fn to_document(&self) -> CodecResult<String> {
        enum Step<'a> {
            Open(&'a XmlNode),
            Close(&'a str),
        }

        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;

        let mut steps = vec![Step::Open(self)];
        while let Some(step) = steps.pop() {
            let node = match step {
                Step::Open(node) => node,
                Step::Close(name) => {
                    writer.write_event(Event::End(BytesEnd::new(name)))?;
                    continue;
                }
            };

            let mut start = BytesStart::new(node.name.as_str());
            for (key, value) in &node.attributes {
                start.push_attribute((key.as_str(), value.as_str()));
            }

            if node.text.is_none() && node.children.is_empty() {
                writer.write_event(Event::Empty(start))?;
                continue;
            }

            writer.write_event(Event::Start(start))?;
            match &node.text {
                Some(Text::Plain(text)) => {
                    writer.write_event(Event::Text(BytesText::new(text)))?;
                }
                Some(Text::CData(text)) => {
                    writer.write_event(Event::CData(BytesCData::new(text.as_str())))?;
                }
                None => {}
            }

            steps.push(Step::Close(&node.name));
            steps.extend(node.children.iter().rev().map(Step::Open));
        }

        let bytes = writer.into_inner().into_inner();
        Ok(String::from_utf8(bytes)?)
    }

    /// Parses a document into a tree rooted at its document element.
    ///
    /// Text and CDATA inside an element are concatenated. Whitespace-only
    /// text next to child elements is dropped; leaf text is kept as is.
    /// Comments, processing instructions and the declaration are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed XML, mismatched or unclosed elements,
    /// and documents without (or with more than one) root element.
    pub fn parse(xml: &str) -> CodecResult<XmlNode> {
        let mut reader = Reader::from_str(xml);
        let mut open: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => open.push(start_node(&e)?),
                Event::Empty(e) => {
                    let node = start_node(&e)?;
                    attach(&mut open, &mut root, node)?;
                }
                Event::End(_) => {
                    let Some(mut node) = open.pop() else {
                        return Err(CodecError::MalformedEnvelope(
                            "unexpected closing tag".to_string(),
                        ));
                    };
                    if !node.children.is_empty()
                        && node.text().is_some_and(|t| t.trim().is_empty())
                    {
                        node.text = None;
                    }
                    attach(&mut open, &mut root, node)?;
                }
                Event::Text(e) => {
                    let text = e.unescape()?;
                    match open.last_mut() {
                        Some(node) => append_text(node, &text, false),
                        None if text.trim().is_empty() => {}
                        None => {
                            return Err(CodecError::MalformedEnvelope(
                                "text outside the root element".to_string(),
                            ));
                        }
                    }
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    match open.last_mut() {
                        Some(node) => append_text(node, &text, true),
                        None => {
                            return Err(CodecError::MalformedEnvelope(
                                "CDATA outside the root element".to_string(),
                            ));
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(node) = open.last() {
            return Err(CodecError::mismatch(node.name.clone(), "closing tag"));
        }
        root.ok_or_else(|| CodecError::MalformedEnvelope("document has no root element".to_string()))
    }
}

// Children are moved onto a heap stack before the node itself goes away,
// so arbitrarily deep trees drop in constant stack space.
impl Drop for XmlNode {
    fn drop(&mut self) {
        let mut pending = mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

fn start_node(e: &BytesStart<'_>) -> CodecResult<XmlNode> {
    let mut node = XmlNode::new(String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        node.attributes.push((key, value));
    }
    Ok(node)
}

fn attach(open: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> CodecResult<()> {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => {
            return Err(CodecError::MalformedEnvelope(
                "document has more than one root element".to_string(),
            ));
        }
    }
    Ok(())
}

fn append_text(node: &mut XmlNode, text: &str, cdata: bool) {
    node.text = Some(match node.text.take() {
        None if cdata => Text::CData(text.to_string()),
        None => Text::Plain(text.to_string()),
        Some(existing) => Text::Plain(format!("{}{}", existing.as_str(), text)),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_declaration_and_empty_elements() {
        let doc = XmlNode::new("root")
            .with_child(XmlNode::new("nil"))
            .with_child(XmlNode::new("name").with_text("a<b"))
            .to_document()
            .unwrap();

        insta::assert_snapshot!(doc, @r#"<?xml version="1.0"?><root><nil/><name>a&lt;b</name></root>"#);
    }

    #[test]
    fn writes_cdata_and_attributes() {
        let doc = XmlNode::new("s")
            .with_attribute("lang", "en")
            .with_child(XmlNode::new("v").with_cdata("x & y"))
            .to_document()
            .unwrap();

        insta::assert_snapshot!(doc, @r#"<?xml version="1.0"?><s lang="en"><v><![CDATA[x & y]]></v></s>"#);
    }

    #[test]
    fn parses_elements_text_and_attributes() {
        let node = XmlNode::parse(
            r#"<?xml version="1.0"?>
<!-- comment -->
<root kind="a&amp;b">
  <item>one</item>
  <item><![CDATA[<two>]]></item>
  <empty/>
</root>"#,
        )
        .unwrap();

        assert_eq!(node.name(), "root");
        assert_eq!(node.attribute("kind"), Some("a&b"));
        assert_eq!(node.text(), None);

        let items: Vec<_> = node.children_named("item").filter_map(XmlNode::text).collect();
        assert_eq!(items, ["one", "<two>"]);
        assert!(node.child("empty").is_some());
        assert_eq!(node.child("empty").unwrap().text(), None);
    }

    #[test]
    fn keeps_leaf_whitespace() {
        let node = XmlNode::parse("<s>  padded  </s>").unwrap();
        assert_eq!(node.text(), Some("  padded  "));
    }

    #[test]
    fn concatenates_text_and_cdata() {
        let node = XmlNode::parse("<s>a &amp; <![CDATA[]]]]><![CDATA[>]]></s>").unwrap();
        assert_eq!(node.text(), Some("a & ]]>"));
    }

    #[test]
    fn rejects_unclosed_and_mismatched_elements() {
        assert!(XmlNode::parse("<a><b></b>").is_err());
        assert!(XmlNode::parse("<a><b></a>").is_err());
        assert!(XmlNode::parse("").is_err());
        assert!(XmlNode::parse("<a/><b/>").is_err());
    }

    #[test]
    fn write_then_parse_preserves_structure() {
        let tree = XmlNode::new("a")
            .with_child(XmlNode::new("b").with_text("1 < 2"))
            .with_child(XmlNode::new("c").with_cdata("plain"))
            .with_child(XmlNode::new("d"));

        let parsed = XmlNode::parse(&tree.to_document().unwrap()).unwrap();
        let texts: Vec<_> = parsed.children().iter().map(XmlNode::text).collect();
        assert_eq!(texts, [Some("1 < 2"), Some("plain"), None]);
    }

    #[test]
    fn deep_tree_writes_parses_and_drops() {
        let depth = 50_000;
        let mut node = XmlNode::new("leaf");
        for _ in 0..depth {
            node = XmlNode::new("n").with_child(node);
        }

        let doc = node.to_document().unwrap();
        let parsed = XmlNode::parse(&doc).unwrap();

        let mut current = &parsed;
        let mut seen = 0;
        while let Some(child) = current.first_child() {
            current = child;
            seen += 1;
        }
        assert_eq!(seen, depth);
        assert_eq!(current.name(), "leaf");
    }
}
