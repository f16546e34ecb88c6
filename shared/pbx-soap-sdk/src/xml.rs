//! Owned XML element tree
//!
//! PBX configuration documents are fetched, edited in a few attributes and
//! submitted back whole, so the tree keeps everything it does not edit:
//! character data is stored as written (untrimmed, in its position among
//! child elements) and comments survive. Whitespace-only text between child
//! elements is indentation and is dropped. Names are stored as written
//! (including any prefix); lookups match on the local part.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::{Result, SoapError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    content: Vec<Node>,
}

/// One piece of element content, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Element(XmlElement),
    Text(String),
    Comment(String),
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            content: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.content.push(Node::Element(child));
        self
    }

    /// Builder-style character data
    pub fn with_text(mut self, text: &str) -> Self {
        self.push_text(text);
        self
    }

    fn push_text(&mut self, text: &str) {
        match self.content.last_mut() {
            Some(Node::Text(existing)) => existing.push_str(text),
            _ => self.content.push(Node::Text(text.to_string())),
        }
    }

    /// Parse a document and return its root element
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => stack.push(Self::from_start(e)?),
                Ok(Event::Empty(ref e)) => {
                    let element = Self::from_start(e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| SoapError::Xml("unbalanced end tag".to_string()))?;
                    element.drop_indentation();
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(ref t)) => {
                    if let Some(current) = stack.last_mut() {
                        let text = t.unescape().map_err(xml_error)?;
                        current.push_text(&text);
                    }
                }
                Ok(Event::CData(c)) => {
                    if let Some(current) = stack.last_mut() {
                        current.push_text(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Ok(Event::Comment(c)) => {
                    if let Some(current) = stack.last_mut() {
                        let comment = String::from_utf8_lossy(&c.into_inner()).into_owned();
                        current.content.push(Node::Comment(comment));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(SoapError::Xml(format!(
                        "at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
            }
        }

        if let Some(open) = stack.last() {
            return Err(SoapError::Xml(format!("unclosed element <{}>", open.name)));
        }

        root.ok_or_else(|| SoapError::Xml("document has no root element".to_string()))
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(xml_error)?;
            let value = attr.unescape_value().map_err(xml_error)?;
            element.attributes.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value.into_owned(),
            ));
        }
        Ok(element)
    }

    /// Elements with child elements lose whitespace-only text; leaves keep it
    fn drop_indentation(&mut self) {
        if self.children().next().is_some() {
            self.content.retain(|node| match node {
                Node::Text(text) => !text.trim().is_empty(),
                _ => true,
            });
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element name without its namespace prefix
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overwrite an attribute in place, or append it if missing
    pub fn set_attr(&mut self, key: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attributes.push((key.to_string(), value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        let idx = self.attributes.iter().position(|(k, _)| k == key)?;
        Some(self.attributes.remove(idx).1)
    }

    /// Character data directly inside this element, concatenated as written
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn children(&self) -> impl Iterator<Item = &XmlElement> {
        self.content.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First child with the given local name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children().find(|c| c.local_name() == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children().filter(move |c| c.local_name() == name)
    }

    /// First child with the given name, created (appended) when missing
    pub fn ensure_child(&mut self, name: &str) -> &mut XmlElement {
        let existing = self.content.iter().position(
            |node| matches!(node, Node::Element(element) if element.local_name() == name),
        );
        let idx = match existing {
            Some(idx) => idx,
            None => {
                self.content.push(Node::Element(XmlElement::new(name)));
                self.content.len() - 1
            }
        };
        match &mut self.content[idx] {
            Node::Element(element) => element,
            _ => unreachable!("index points at an element node"),
        }
    }

    /// Depth-first search for the first element (self included) with the local name
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        if self.local_name() == name {
            return Some(self);
        }
        self.children().find_map(|c| c.find(name))
    }

    /// Serialize this element without an XML declaration
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_into(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(xml_error)
    }

    /// Serialize as a standalone document with an XML declaration
    pub fn to_document(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)?;
        self.write_into(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(xml_error)
    }

    fn write_into<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.content.is_empty() {
            return writer.write_event(Event::Empty(start)).map_err(xml_error);
        }

        writer.write_event(Event::Start(start)).map_err(xml_error)?;
        for node in &self.content {
            match node {
                Node::Element(child) => child.write_into(writer)?,
                Node::Text(text) => writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(xml_error)?,
                Node::Comment(comment) => writer
                    .write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))
                    .map_err(xml_error)?,
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(xml_error)
    }
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.content.push(Node::Element(element)),
        None if root.is_some() => {
            return Err(SoapError::Xml("multiple root elements".to_string()));
        }
        None => *root = Some(element),
    }
    Ok(())
}

fn xml_error(err: impl std::fmt::Display) -> SoapError {
    SoapError::Xml(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_DOC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<show>
  <user cn="Agent Smith" h323="asmith" e164="4711">
    <grp name="CC-Sales"/>
    <grp name="Everyone" mode="active"/>
    <phone type="phone" hw="009033aabbcc">
      <rec mode="off" recv="0" fkey="1" ac="0"/>
    </phone>
  </user>
</show>"#;

    #[test]
    fn test_parse_nested_document() {
        let root = XmlElement::parse(USER_DOC).unwrap();
        assert_eq!(root.name(), "show");

        let user = root.child("user").unwrap();
        assert_eq!(user.attr("cn"), Some("Agent Smith"));

        let groups: Vec<_> = user.children_named("grp").filter_map(|g| g.attr("name")).collect();
        assert_eq!(groups, vec!["CC-Sales", "Everyone"]);

        let rec = user.child("phone").and_then(|p| p.child("rec")).unwrap();
        assert_eq!(rec.attr("mode"), Some("off"));
        assert_eq!(rec.attr("e164"), None);
    }

    #[test]
    fn test_text_and_entities() {
        let root = XmlElement::parse("<return>&lt;ok/&gt;</return>").unwrap();
        assert_eq!(root.text(), "<ok/>");

        let root = XmlElement::parse("<return><![CDATA[<ok/>]]></return>").unwrap();
        assert_eq!(root.text(), "<ok/>");
    }

    #[test]
    fn test_local_name_matching() {
        let root = XmlElement::parse(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><x/></soap:Body></soap:Envelope>"#,
        )
        .unwrap();
        assert_eq!(root.local_name(), "Envelope");
        assert!(root.child("Body").is_some());
        assert!(root.find("x").is_some());
    }

    #[test]
    fn test_set_attr_overwrites_in_place() {
        let mut el = XmlElement::new("rec").with_attr("mode", "off").with_attr("ac", "0");
        el.set_attr("mode", "transparent");
        el.set_attr("e164", "1001");

        let attrs: Vec<_> = el.attributes().collect();
        assert_eq!(attrs, vec![("mode", "transparent"), ("ac", "0"), ("e164", "1001")]);

        assert_eq!(el.remove_attr("e164").as_deref(), Some("1001"));
        assert_eq!(el.remove_attr("e164"), None);
    }

    #[test]
    fn test_ensure_child_creates_once() {
        let mut user = XmlElement::new("user");
        user.ensure_child("phone").set_attr("type", "phone");
        user.ensure_child("phone").ensure_child("rec");

        assert_eq!(user.children_named("phone").count(), 1);
        let phone = user.child("phone").unwrap();
        assert_eq!(phone.attr("type"), Some("phone"));
        assert!(phone.child("rec").is_some());
    }

    #[test]
    fn test_serialize_escapes() {
        let el = XmlElement::new("user")
            .with_attr("cn", "Tom & \"Jerry\"")
            .with_child(XmlElement::new("note").with_text("a < b"));
        let xml = el.to_xml().unwrap();
        assert_eq!(
            xml,
            r#"<user cn="Tom &amp; &quot;Jerry&quot;"><note>a &lt; b</note></user>"#
        );

        let reparsed = XmlElement::parse(&xml).unwrap();
        assert_eq!(reparsed, el);
    }

    #[test]
    fn test_untouched_content_survives_rewrite() {
        let mut user = XmlElement::parse(
            "<user cn=\"a\">\n  <note>  padded  </note>\n  <x>a<b/>c</x>\n  <!-- keep -->\n</user>",
        )
        .unwrap();
        user.ensure_child("phone").set_attr("type", "phone");

        assert_eq!(
            user.to_xml().unwrap(),
            r#"<user cn="a"><note>  padded  </note><x>a<b/>c</x><!-- keep --><phone type="phone"/></user>"#
        );
    }

    #[test]
    fn test_document_has_declaration() {
        let doc = XmlElement::new("modify").to_document().unwrap();
        assert_eq!(doc, r#"<?xml version="1.0" encoding="UTF-8"?><modify/>"#);
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(XmlElement::parse("<user><grp></user>"), Err(SoapError::Xml(_))));
        assert!(matches!(XmlElement::parse(""), Err(SoapError::Xml(_))));
        assert!(matches!(XmlElement::parse("<a/><b/>"), Err(SoapError::Xml(_))));
    }
}
