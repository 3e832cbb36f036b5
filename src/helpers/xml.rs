//! Event-driven XML reading for the package parts we parse: worksheets,
//! OpenDocument content and Word document bodies.
use crate::error::SheetDocError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Unknown entity '&{0};'")]
    UnknownEntityError(String),

    #[error("Invalid value '{1}' for attribute '{0}'")]
    AttributeValueError(String, String),
}

/// Pull reader over one XML part. Self-closing elements arrive as a
/// start/end pair, so `<b/>` and `<b></b>` look the same to callers.
pub(crate) struct XmlReader<R: BufRead> {
    inner: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub(crate) fn new(source: R) -> XmlReader<R> {
        let mut inner = Reader::from_reader(source);
        let config = inner.config_mut();
        config.expand_empty_elements = true;
        config.check_end_names = false;
        config.check_comments = false;
        config.trim_text(false);
        XmlReader { inner, buffer: Vec::with_capacity(1024) }
    }

    /// The next event, or `None` at the end of the part.
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, SheetDocError> {
        self.buffer.clear();
        match self.inner.read_event_into(&mut self.buffer)? {
            Event::Eof => Ok(None),
            event => Ok(Some(event)),
        }
    }
}

/// Attribute lookup on start tags.
pub(crate) trait XmlNodeHelper<'a> {
    /// Unescaped value of the attribute with this qualified name.
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, SheetDocError>;

    /// Like [`get_attribute_value`](Self::get_attribute_value) but ignores the
    /// namespace prefix, for attributes such as `r:id` whose prefix varies.
    fn get_local_attribute_value(&'a self, local_name: &str) -> Result<Option<Cow<'a, str>>, SheetDocError>;

    /// Parses the attribute value, failing on malformed content.
    fn parse_attribute_value<T: FromStr>(&'a self, name: &str) -> Result<Option<T>, SheetDocError>;
}

fn unescaped<'a>(attribute: Attribute<'a>) -> Result<Cow<'a, str>, SheetDocError> {
    Ok(attribute.unescape_value()?)
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, SheetDocError> {
        self.try_get_attribute(name)?.map(unescaped).transpose()
    }

    fn get_local_attribute_value(&'a self, local_name: &str) -> Result<Option<Cow<'a, str>>, SheetDocError> {
        for attribute in self.attributes() {
            let attribute = attribute?;
            if attribute.key.local_name().as_ref() == local_name.as_bytes() {
                return unescaped(attribute).map(Some);
            }
        }
        Ok(None)
    }

    fn parse_attribute_value<T: FromStr>(&'a self, name: &str) -> Result<Option<T>, SheetDocError> {
        match self.get_attribute_value(name)? {
            Some(value) => match value.parse() {
                Ok(parsed) => Ok(Some(parsed)),
                Err(_) => Err(XmlError::AttributeValueError(name.to_owned(), value.into_owned()).into()),
            },
            None => Ok(None),
        }
    }
}

/// Accumulates element text split across text and reference events.
pub(crate) trait XmlTextContextHelper {
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), SheetDocError>;

    /// Resolves `&amp;` style entities and `&#65;`/`&#x41;` character references.
    fn push_bytes_ref(&mut self, reference: &BytesRef) -> Result<(), SheetDocError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), SheetDocError> {
        self.push_str(&text.xml_content()?);
        Ok(())
    }

    fn push_bytes_ref(&mut self, reference: &BytesRef) -> Result<(), SheetDocError> {
        let name = reference.xml_content()?;
        let code = match name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
            Some(hex) => Some(u32::from_str_radix(hex, 16)?),
            None => name.strip_prefix('#').map(str::parse::<u32>).transpose()?,
        };
        match code {
            Some(code) => self.extend(char::from_u32(code)),
            None => self.push_str(resolve_xml_entity(&name).ok_or_else(|| XmlError::UnknownEntityError(name.to_string()))?),
        }
        Ok(())
    }
}

/// Loops over the events of an [`XmlReader`], dispatching to the given match
/// arms. Unmatched events are skipped and the loop ends with the part.
#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(event) = $reader.next()? {
            match event {
                $($arms)*
                _ => (),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(xml: &str) -> XmlReader<Cursor<Vec<u8>>> {
        XmlReader::new(Cursor::new(xml.as_bytes().to_vec()))
    }

    #[test]
    fn self_closing_elements_are_expanded() -> Result<(), SheetDocError> {
        let mut reader = reader(r#"<a><b x="1"/></a>"#);
        let mut events = Vec::new();
        match_xml_events!(reader => {
            Event::Start(event) => {
                let x = event.parse_attribute_value::<i32>("x")?;
                events.push(format!("<{}> {:?}", String::from_utf8_lossy(event.name().as_ref()), x));
            }
            Event::End(event) => events.push(format!("</{}>", String::from_utf8_lossy(event.name().as_ref()))),
        });
        assert_eq!(events, vec!["<a> None", "<b> Some(1)", "</b>", "</a>"]);
        Ok(())
    }

    #[test]
    fn references_are_resolved() -> Result<(), SheetDocError> {
        let mut reader = reader("<t>Tom &amp; Jerry &#x41;&#66;</t>");
        let mut text = String::new();
        match_xml_events!(reader => {
            Event::Text(event) => text.push_bytes_text(&event)?,
            Event::GeneralRef(event) => text.push_bytes_ref(&event)?,
        });
        assert_eq!(text, "Tom & Jerry AB");
        Ok(())
    }

    #[test]
    fn prefixed_attributes_by_local_name() -> Result<(), SheetDocError> {
        let mut reader = reader(r#"<sheet name="Data" rel:id="rId7"/>"#);
        let mut id = None;
        match_xml_events!(reader => {
            Event::Start(event) => id = event.get_local_attribute_value("id")?.map(Cow::into_owned),
        });
        assert_eq!(id.as_deref(), Some("rId7"));
        Ok(())
    }

    #[test]
    fn malformed_attribute_value() {
        let mut reader = reader(r#"<a n="abc"/>"#);
        let mut message = String::new();
        while let Some(event) = reader.next().unwrap() {
            if let Event::Start(event) = event {
                message = event.parse_attribute_value::<usize>("n").unwrap_err().to_string();
            }
        }
        assert_eq!(message, "Invalid value 'abc' for attribute 'n'");
    }
}
