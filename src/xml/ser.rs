use std::io::Write;

use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::codec::XmlScalar;

/// Errors that can occur while writing a feed.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Writing to the sink failed.
    #[error("failed to write feed: {0}")]
    Io(#[from] std::io::Error),

    /// The in-memory output was not valid UTF-8.
    #[error("feed output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encodes a type as an element named `name`.
///
/// Implemented by the generated code for every domain type.
pub trait EncodeXml {
    fn encode_xml<W: Write>(&self, en: &mut XmlEncoder<W>, name: &str) -> Result<(), EncodeError>;
}

/// Indenting element writer.
///
/// Start tags are held back until the element gets content, so an element
/// that ends up with none is written self-closed.
pub struct XmlEncoder<W: Write> {
    writer: Writer<W>,
    pending: Option<BytesStart<'static>>,
}

impl<W: Write> XmlEncoder<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: Writer::new_with_indent(sink, b' ', 2),
            pending: None,
        }
    }

    /// Opens an element. Attributes must already be on `start`.
    pub fn open(&mut self, start: BytesStart<'_>) -> Result<(), EncodeError> {
        self.flush_pending()?;
        self.pending = Some(start.into_owned());
        Ok(())
    }

    /// Closes the innermost open element.
    pub fn close(&mut self, name: &str) -> Result<(), EncodeError> {
        match self.pending.take() {
            Some(start) => self.writer.write_event(Event::Empty(start))?,
            None => self.writer.write_event(Event::End(BytesEnd::new(name)))?,
        }
        Ok(())
    }

    /// Writes `<name>value</name>`.
    pub fn scalar<T: XmlScalar>(&mut self, name: &str, value: &T) -> Result<(), EncodeError> {
        self.open(BytesStart::new(name))?;
        self.text(&value.encode_text())?;
        self.close(name)
    }

    /// Writes escaped character data. Empty text writes nothing.
    pub fn text(&mut self, text: &str) -> Result<(), EncodeError> {
        if text.is_empty() {
            return Ok(());
        }
        self.flush_pending()?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// Writes `text` as CDATA, split into several sections around any `]]>`.
    pub fn cdata(&mut self, text: &str) -> Result<(), EncodeError> {
        if text.is_empty() {
            return Ok(());
        }
        self.flush_pending()?;
        for section in BytesCData::escaped(text) {
            self.writer.write_event(Event::CData(section))?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn flush_pending(&mut self) -> Result<(), EncodeError> {
        if let Some(start) = self.pending.take() {
            self.writer.write_event(Event::Start(start))?;
        }
        Ok(())
    }
}
