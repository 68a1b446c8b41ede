use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{DataAccessError, Result};

/// A start tag with its attributes decoded. `name` is the local name.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Tag {
    pub(crate) name: String,
    pub(crate) qname: String,
    attributes: Vec<(String, String)>,
}

impl Tag {
    fn from_event(e: &BytesStart<'_>) -> Result<Self> {
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
            qname: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            attributes,
        })
    }

    /// Looks an attribute up by its name as written, e.g. `xml:lang`.
    pub(crate) fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Node {
    Start(Tag),
    Text(String),
    End(String),
    Eof,
}

impl Node {
    fn describe(&self) -> String {
        match self {
            Node::Start(tag) => format!("<{}>", tag.qname),
            Node::Text(_) => "text".to_string(),
            Node::End(name) => format!("</{name}>"),
            Node::Eof => "end of document".to_string(),
        }
    }
}

/// One-node lookahead over an XML document.
///
/// Empty elements produce a start node followed by an end node. Comments,
/// processing instructions, declarations and whitespace-only text are skipped.
/// CDATA sections come through as text.
pub(crate) struct XmlCursor<'a> {
    reader: Reader<&'a [u8]>,
    node: Node,
    pending_end: Option<String>,
}

impl<'a> XmlCursor<'a> {
    pub(crate) fn new(text: &'a str) -> Result<Self> {
        let mut cursor = Self {
            reader: Reader::from_str(text),
            node: Node::Eof,
            pending_end: None,
        };
        cursor.advance()?;
        Ok(cursor)
    }

    pub(crate) fn node(&self) -> &Node {
        &self.node
    }

    pub(crate) fn advance(&mut self) -> Result<()> {
        if let Some(name) = self.pending_end.take() {
            self.node = Node::End(name);
            return Ok(());
        }
        loop {
            let node = match self.reader.read_event()? {
                Event::Start(e) => Node::Start(Tag::from_event(&e)?),
                Event::Empty(e) => {
                    let tag = Tag::from_event(&e)?;
                    self.pending_end = Some(tag.name.clone());
                    Node::Start(tag)
                }
                Event::End(e) => {
                    Node::End(String::from_utf8_lossy(e.local_name().as_ref()).into_owned())
                }
                Event::Text(e) => {
                    let text = e.unescape()?;
                    if text.trim().is_empty() {
                        continue;
                    }
                    Node::Text(text.into_owned())
                }
                Event::CData(e) => Node::Text(String::from_utf8_lossy(&e.into_inner()).into_owned()),
                Event::Eof => Node::Eof,
                _ => continue,
            };
            self.node = node;
            return Ok(());
        }
    }

    /// Local name of the current start tag.
    pub(crate) fn start_name(&self) -> Option<&str> {
        match &self.node {
            Node::Start(tag) => Some(tag.name.as_str()),
            _ => None,
        }
    }

    pub(crate) fn is_start(&self, name: &str) -> bool {
        self.start_name() == Some(name)
    }

    pub(crate) fn unexpected(&self, expected: impl Into<String>) -> DataAccessError {
        DataAccessError::XsdUnexpectedNode {
            expected: expected.into(),
            found: self.node.describe(),
        }
    }

    /// Consumes the start tag `name`.
    pub(crate) fn expect_start(&mut self, name: &str) -> Result<Tag> {
        match &self.node {
            Node::Start(tag) if tag.name == name => {
                let tag = tag.clone();
                self.advance()?;
                Ok(tag)
            }
            _ => Err(self.unexpected(format!("<{name}>"))),
        }
    }

    /// Consumes the end tag `name`.
    pub(crate) fn expect_end(&mut self, name: &str) -> Result<()> {
        match &self.node {
            Node::End(end) if end == name => self.advance(),
            _ => Err(self.unexpected(format!("</{name}>"))),
        }
    }

    /// Collects the text of the current element's content, nested markup
    /// included, and stops on the element's end tag without consuming it.
    pub(crate) fn read_text(&mut self) -> Result<String> {
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            match &self.node {
                Node::Text(t) => text.push_str(t),
                Node::Start(_) => depth += 1,
                Node::End(_) if depth > 0 => depth -= 1,
                Node::End(_) => break,
                Node::Eof => return Err(self.unexpected("end tag")),
            }
            self.advance()?;
        }
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_elements_get_an_end_node() -> Result<()> {
        let mut cursor = XmlCursor::new(r#"<?xml version="1.0"?><a><b x="1"/></a>"#)?;
        let a = cursor.expect_start("a")?;
        assert_eq!(a.qname, "a");
        let b = cursor.expect_start("b")?;
        assert_eq!(b.attr("x"), Some("1"));
        cursor.expect_end("b")?;
        cursor.expect_end("a")?;
        assert_eq!(cursor.node(), &Node::Eof);
        Ok(())
    }

    #[test]
    fn prefixes_are_ignored_when_matching() -> Result<()> {
        let mut cursor = XmlCursor::new(r#"<xs:a xmlns:xs="urn:x"><!-- c --></xs:a>"#)?;
        let tag = cursor.expect_start("a")?;
        assert_eq!(tag.qname, "xs:a");
        cursor.expect_end("a")?;
        Ok(())
    }

    #[test]
    fn text_includes_nested_markup_and_cdata() -> Result<()> {
        let mut cursor = XmlCursor::new("<d>Hello <b>bold</b> &amp; <![CDATA[<raw>]]></d>")?;
        cursor.expect_start("d")?;
        assert_eq!(cursor.read_text()?, "Hello bold & <raw>");
        cursor.expect_end("d")?;
        Ok(())
    }

    #[test]
    fn unexpected_node_names_what_was_found() -> Result<()> {
        let mut cursor = XmlCursor::new("<a/>")?;
        let err = cursor.expect_start("b").unwrap_err();
        assert!(matches!(
            err,
            DataAccessError::XsdUnexpectedNode { ref expected, ref found }
                if expected == "<b>" && found == "<a>"
        ));
        Ok(())
    }
}
