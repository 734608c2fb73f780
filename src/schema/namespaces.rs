//! The fixed prefix → namespace URI table.
//!
//! Every prefix a field tag may use must appear here. Unprefixed tags belong
//! to the document's root namespace and have no entry.

/// A namespace prefix bound to its URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    pub prefix: &'static str,
    pub uri: &'static str,
}

pub const CONTENT: Namespace = Namespace {
    prefix: "content",
    uri: "http://purl.org/rss/1.0/modules/content/",
};

pub const PODCAST: Namespace = Namespace {
    prefix: "podcast",
    uri: "https://podcastindex.org/namespace/1.0",
};

pub const ATOM: Namespace = Namespace {
    prefix: "atom",
    uri: "http://www.w3.org/2005/Atom",
};

pub const ITUNES: Namespace = Namespace {
    prefix: "itunes",
    uri: "http://www.itunes.com/dtds/podcast-1.0.dtd",
};

/// Reserved binding for namespace declaration attributes (`xmlns:itunes="..."`).
pub const XMLNS: Namespace = Namespace {
    prefix: "xmlns",
    uri: "http://www.w3.org/2000/xmlns/",
};

/// The table the shadow schema is generated against.
pub static NAMESPACES: &[Namespace] = &[CONTENT, PODCAST, ATOM, ITUNES, XMLNS];

/// Looks up the URI bound to `prefix` in `table`.
pub fn resolve(table: &[Namespace], prefix: &str) -> Option<&'static str> {
    table.iter().find(|ns| ns.prefix == prefix).map(|ns| ns.uri)
}
