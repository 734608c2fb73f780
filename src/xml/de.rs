use std::borrow::Cow;
use std::fmt;

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use thiserror::Error;

use crate::codec::{CodecError, XmlScalar};

/// Maximum element nesting accepted while decoding.
/// `itunes:category` nests recursively, so this bounds decoder recursion.
pub const MAX_DEPTH: usize = 256;

/// Errors that can occur while decoding a feed document.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The document is not well-formed XML.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    /// A leaf value was rejected by its codec.
    #[error("invalid value for {field}: {source}")]
    Scalar {
        field: &'static str,
        source: CodecError,
    },

    #[error("document ended inside an element")]
    UnexpectedEof,

    #[error("document has no root element")]
    NoRoot,

    #[error("unexpected root element <{0}>")]
    UnexpectedRoot(String),

    #[error("feed has no <channel> element")]
    MissingChannel,

    /// Element nesting exceeds [`MAX_DEPTH`].
    #[error("element nesting exceeds maximum of {0} levels")]
    TooDeep(usize),
}

/// An element or attribute name after namespace resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    /// URI the prefix resolved to, `None` when unqualified or undeclared.
    pub namespace: Option<String>,
    pub local: String,
    /// Whether the name belongs to the document's root namespace: elements
    /// in the same namespace as the root element, unqualified attributes.
    pub in_root: bool,
}

impl ResolvedName {
    /// Matches a field declared with `namespace` (`None` for an unprefixed
    /// tag) and `local`.
    pub fn is(&self, namespace: Option<&str>, local: &str) -> bool {
        if self.local != local {
            return false;
        }
        match namespace {
            None => self.in_root,
            Some(uri) => self.namespace.as_deref() == Some(uri),
        }
    }
}

impl fmt::Display for ResolvedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(uri) => write!(f, "{{{uri}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// One step inside an element, as seen by a generated decoder.
#[derive(Debug)]
pub enum Child<'i> {
    Element {
        name: ResolvedName,
        start: BytesStart<'i>,
        empty: bool,
    },
    /// Unescaped character data or the content of a CDATA section.
    Text(Cow<'i, str>),
    /// The enclosing element ended.
    End,
}

/// Decodes a type from the element whose start tag was just read.
///
/// Implemented by the generated shadow types.
pub trait DecodeXml: Sized {
    /// `empty` is set for self-closing elements, which have no children and
    /// no end tag to consume.
    fn decode_xml<'i>(
        de: &mut XmlDecoder<'i>,
        start: &BytesStart<'i>,
        empty: bool,
    ) -> Result<Self, DecodeError>;
}

/// Pull decoder over an in-memory document.
pub struct XmlDecoder<'i> {
    reader: NsReader<&'i [u8]>,
    root_namespace: Option<String>,
    depth: usize,
}

impl<'i> XmlDecoder<'i> {
    pub fn new(input: &'i [u8]) -> Self {
        // quick-xml (0.37) never expands <!ENTITY> declarations, so
        // a DOCTYPE in a fetched feed is skipped like any other prolog event.
        Self {
            reader: NsReader::from_reader(input),
            root_namespace: None,
            depth: 0,
        }
    }

    /// Reads up to the root element and checks its local name.
    ///
    /// # Errors
    ///
    /// [`DecodeError::NoRoot`] if the document holds no element,
    /// [`DecodeError::UnexpectedRoot`] if the root is not named `expected`.
    pub fn root(&mut self, expected: &str) -> Result<(BytesStart<'i>, bool), DecodeError> {
        loop {
            let (start, empty) = match self.reader.read_event()? {
                Event::Start(start) => (start, false),
                Event::Empty(start) => (start, true),
                Event::Eof => return Err(DecodeError::NoRoot),
                _ => continue,
            };

            let (result, local) = self.reader.resolve_element(start.name());
            let local = self.decode_name(local.as_ref())?;
            if local != expected {
                return Err(DecodeError::UnexpectedRoot(local));
            }
            self.root_namespace = match result {
                ResolveResult::Bound(ns) => Some(self.decode_name(ns.as_ref())?),
                _ => None,
            };
            if !empty {
                self.depth = 1;
            }
            return Ok((start, empty));
        }
    }

    /// Resolves and unescapes every attribute of `start`.
    pub fn attributes(
        &self,
        start: &BytesStart<'_>,
    ) -> Result<Vec<(ResolvedName, String)>, DecodeError> {
        let decoder = self.reader.decoder();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let (result, local) = self.reader.resolve_attribute(attr.key);
            let (namespace, in_root) = match result {
                ResolveResult::Unbound => (None, true),
                ResolveResult::Bound(ns) => (Some(self.decode_name(ns.as_ref())?), false),
                ResolveResult::Unknown(_) => (None, false),
            };
            let name = ResolvedName {
                namespace,
                local: self.decode_name(local.as_ref())?,
                in_root,
            };
            let value = attr.decode_and_unescape_value(decoder)?.into_owned();
            attributes.push((name, value));
        }
        Ok(attributes)
    }

    /// Reads the next child of the current element.
    ///
    /// Comments and processing instructions are skipped. Every non-empty
    /// [`Child::Element`] returned must be consumed up to its end tag, by a
    /// nested decoder, [`read_scalar`](Self::read_scalar) or
    /// [`skip`](Self::skip).
    pub fn next_child(&mut self) -> Result<Child<'i>, DecodeError> {
        loop {
            match self.reader.read_event()? {
                Event::Start(start) => {
                    if self.depth >= MAX_DEPTH {
                        return Err(DecodeError::TooDeep(MAX_DEPTH));
                    }
                    self.depth += 1;
                    let name = self.element_name(&start)?;
                    return Ok(Child::Element {
                        name,
                        start,
                        empty: false,
                    });
                }
                Event::Empty(start) => {
                    let name = self.element_name(&start)?;
                    return Ok(Child::Element {
                        name,
                        start,
                        empty: true,
                    });
                }
                Event::Text(text) => return Ok(Child::Text(text.unescape()?)),
                Event::CData(cdata) => {
                    return Ok(Child::Text(cdata.decode().map_err(quick_xml::Error::from)?))
                }
                Event::End(_) => {
                    self.depth = self.depth.saturating_sub(1);
                    return Ok(Child::End);
                }
                Event::Eof => return Err(DecodeError::UnexpectedEof),
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }
    }

    /// Reads the text of a leaf element and decodes it as `T`.
    ///
    /// `field` names the destination in error messages.
    pub fn read_scalar<T: XmlScalar>(
        &mut self,
        field: &'static str,
        empty: bool,
    ) -> Result<T, DecodeError> {
        let text = if empty {
            String::new()
        } else {
            self.read_text()?
        };
        decode_scalar(field, &text)
    }

    /// Concatenates the direct text of the current element, skipping any
    /// nested elements, and consumes its end tag.
    pub fn read_text(&mut self) -> Result<String, DecodeError> {
        let mut text = String::new();
        loop {
            match self.next_child()? {
                Child::Text(chunk) => text.push_str(&chunk),
                Child::Element { name, start, empty } => self.skip(&name, &start, empty)?,
                Child::End => return Ok(text),
            }
        }
    }

    /// Consumes an element nobody claimed.
    ///
    /// Namespace declarations inside the skipped element go out of scope
    /// with it.
    pub fn skip(
        &mut self,
        name: &ResolvedName,
        start: &BytesStart<'_>,
        empty: bool,
    ) -> Result<(), DecodeError> {
        tracing::trace!(
            element = %String::from_utf8_lossy(start.name().as_ref()),
            resolved = %name,
            "Skipping unknown element"
        );
        if empty {
            return Ok(());
        }
        loop {
            match self.next_child()? {
                Child::Element { name, start, empty } => self.skip(&name, &start, empty)?,
                Child::Text(_) => {}
                Child::End => return Ok(()),
            }
        }
    }

    fn element_name(&self, start: &BytesStart<'_>) -> Result<ResolvedName, DecodeError> {
        let (result, local) = self.reader.resolve_element(start.name());
        let (namespace, known) = match result {
            ResolveResult::Unbound => (None, true),
            ResolveResult::Bound(ns) => (Some(self.decode_name(ns.as_ref())?), true),
            ResolveResult::Unknown(_) => (None, false),
        };
        let in_root = known && namespace == self.root_namespace;
        Ok(ResolvedName {
            namespace,
            local: self.decode_name(local.as_ref())?,
            in_root,
        })
    }

    fn decode_name(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        let name = self
            .reader
            .decoder()
            .decode(bytes)
            .map_err(quick_xml::Error::from)?;
        Ok(name.into_owned())
    }
}

/// Decodes `text` as `T`, naming `field` in the error.
pub fn decode_scalar<T: XmlScalar>(field: &'static str, text: &str) -> Result<T, DecodeError> {
    T::decode_text(text).map_err(|source| DecodeError::Scalar { field, source })
}

/// Decodes a whole document whose root element is named `root`.
pub fn decode_document<T: DecodeXml>(input: &[u8], root: &str) -> Result<T, DecodeError> {
    let mut de = XmlDecoder::new(input);
    let (start, empty) = de.root(root)?;
    T::decode_xml(&mut de, &start, empty)
}
