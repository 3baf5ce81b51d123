//! Minimal XML element tree built with quick-xml.
//!
//! The document parser only sees [`SourceNode`], so all namespace handling
//! lives here: names are matched on their local part, which makes
//! `xlink:href` and `href` the same attribute.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::ConvertError;

/// What the document parser needs from an XML element.
pub trait SourceNode {
    /// Local tag name, without any namespace prefix.
    fn tag(&self) -> &str;
    /// Attribute value by local name.
    fn attr(&self, name: &str) -> Option<&str>;
    /// Child elements in document order.
    fn children(&self) -> impl Iterator<Item = &Self>;
    /// Concatenated text and CDATA content of direct children.
    fn text(&self) -> String;
}

/// A qualified name (possibly with namespace prefix).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    /// Parse a qualified name from a string like "prefix:local" or just "local".
    pub fn parse(s: &str) -> Self {
        match s.split_once(':') {
            Some((prefix, local)) => Self {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            None => Self {
                prefix: None,
                local: s.to_string(),
            },
        }
    }

    fn is_xmlns(&self) -> bool {
        self.prefix.as_deref() == Some("xmlns") || (self.prefix.is_none() && self.local == "xmlns")
    }
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Element {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl SourceNode for Element {
    fn tag(&self) -> &str {
        &self.name.local
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.local == name && !a.name.is_xmlns())
            .map(|a| a.value.as_str())
    }

    fn children(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}

/// Parse an XML string into its root element.
pub fn parse_xml(xml: &str) -> Result<Element, ConvertError> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event()? {
            Event::Start(start) => return parse_element(&mut reader, &start),
            Event::Empty(start) => return parse_element_start(&start),
            Event::Eof => break,
            // Declarations, doctypes, comments and whitespace before the root
            _ => {}
        }
    }

    Err(ConvertError::InvalidSvg("No root element found".into()))
}

fn parse_element(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Element, ConvertError> {
    let mut element = parse_element_start(start)?;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                element
                    .children
                    .push(Node::Element(parse_element(reader, &start)?));
            }
            Event::Empty(start) => {
                element
                    .children
                    .push(Node::Element(parse_element_start(&start)?));
            }
            Event::End(_) => break,
            Event::Text(text) => {
                let text = text.unescape()?;
                if !text.trim().is_empty() {
                    element.children.push(Node::Text(text.into_owned()));
                }
            }
            Event::CData(cdata) => {
                element
                    .children
                    .push(Node::Text(String::from_utf8_lossy(&cdata).into_owned()));
            }
            Event::Eof => {
                return Err(ConvertError::InvalidSvg("Unexpected end of file".into()));
            }
            _ => {}
        }
    }

    Ok(element)
}

fn parse_element_start(start: &BytesStart) -> Result<Element, ConvertError> {
    let name_bytes = start.name();
    let name = std::str::from_utf8(name_bytes.as_ref())?;

    let mut element = Element {
        name: QName::parse(name),
        attributes: Vec::new(),
        children: Vec::new(),
    };

    for attr in start.attributes() {
        let attr =
            attr.map_err(|e| ConvertError::InvalidSvg(format!("Invalid attribute: {}", e)))?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr.unescape_value()?;
        element.attributes.push(Attribute {
            name: QName::parse(key),
            value: value.into_owned(),
        });
    }

    Ok(element)
}
