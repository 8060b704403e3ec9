// Typed element tree for TTML documents
use crate::error::{PodvttError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// An XML element with its attributes, child elements and direct text content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Local name of the element, without any namespace prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of the attribute with the given qualified name.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First child element with the given local name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements with the given local name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Concatenated text nodes directly inside this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    fn from_start(start: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| {
                PodvttError::Parse(format!("bad attribute on <{}>: {}", name, e))
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .decode_and_unescape_value(reader.decoder())
                .map_err(|e| PodvttError::Parse(format!("bad value for {}: {}", key, e)))?;
            attributes.push((key, value.into_owned()));
        }

        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }
}

/// A parsed TTML document. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtmlDocument {
    root: Element,
}

impl TtmlDocument {
    /// Parse a TTML document from a string.
    ///
    /// Any well-formedness problem (mismatched or unclosed tags, bad
    /// escapes, missing or multiple root elements) is reported as
    /// [`PodvttError::Parse`].
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                PodvttError::Parse(format!("at position {}: {}", reader.error_position(), e))
            })?;

            match event {
                Event::Start(start) => {
                    stack.push(Element::from_start(&start, &reader)?);
                }
                Event::Empty(start) => {
                    let element = Element::from_start(&start, &reader)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        PodvttError::Parse(format!(
                            "unexpected closing tag at position {}",
                            reader.buffer_position()
                        ))
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        let text = text
                            .unescape()
                            .map_err(|e| PodvttError::Parse(format!("bad text: {}", e)))?;
                        current.text.push_str(&text);
                    } else if !text.iter().all(|b| b.is_ascii_whitespace()) {
                        return Err(PodvttError::Parse(
                            "text outside of the root element".to_string(),
                        ));
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current
                            .text
                            .push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(PodvttError::Parse(format!(
                "unclosed element <{}>",
                open.name
            )));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| PodvttError::Parse("document has no root element".to_string()))
    }

    pub fn root(&self) -> &Element {
        &self.root
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(PodvttError::Parse(format!(
            "second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}
