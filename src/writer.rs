//! Feed writing: [`Podcast`] out as an RSS 2.0 document.

use std::io::Write;

use quick_xml::events::BytesStart;

use crate::model::{Feed, Podcast, ROOT_ELEMENT};
use crate::schema::namespaces::{Namespace, ATOM, CONTENT, ITUNES, PODCAST};
use crate::xml::ser::{EncodeError, EncodeXml, XmlEncoder};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

impl Podcast {
    /// Writes this podcast as a complete feed document. See [`write_feed_xml`].
    pub fn write_feed_xml<W: Write>(&self, sink: W) -> Result<(), EncodeError> {
        write_feed_xml(self, sink)
    }
}

/// Writes `podcast` to `sink` as a feed document.
///
/// The `<rss>` envelope always carries `version="2.0"` and the `content`,
/// `podcast`, `atom` and `itunes` namespace declarations. Elements are
/// indented by two spaces.
///
/// # Errors
///
/// Returns [`EncodeError::Io`] if the sink fails.
pub fn write_feed_xml<W: Write>(podcast: &Podcast, mut sink: W) -> Result<(), EncodeError> {
    sink.write_all(XML_DECLARATION.as_bytes())?;

    let mut en = XmlEncoder::new(sink);
    en.open(envelope_start(&envelope()))?;
    podcast.encode_xml(&mut en, "channel")?;
    en.close(ROOT_ELEMENT)?;
    en.into_inner().flush()?;

    tracing::debug!(
        title = %podcast.title,
        items = podcast.items.len(),
        "Wrote feed"
    );
    Ok(())
}

/// Renders `podcast` as a feed document in memory.
pub fn write_feed_string(podcast: &Podcast) -> Result<String, EncodeError> {
    let mut buffer = Vec::new();
    write_feed_xml(podcast, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// The `<rss>` envelope without its channel, which is written from the
/// caller's borrowed [`Podcast`].
fn envelope() -> Feed {
    Feed {
        version: "2.0".to_string(),
        xmlns_content: CONTENT.uri.to_string(),
        xmlns_podcast: PODCAST.uri.to_string(),
        xmlns_atom: ATOM.uri.to_string(),
        xmlns_itunes: ITUNES.uri.to_string(),
        channel: None,
    }
}

fn envelope_start(feed: &Feed) -> BytesStart<'static> {
    let declarations: [(Namespace, &str); 4] = [
        (CONTENT, feed.xmlns_content.as_str()),
        (PODCAST, feed.xmlns_podcast.as_str()),
        (ATOM, feed.xmlns_atom.as_str()),
        (ITUNES, feed.xmlns_itunes.as_str()),
    ];

    let mut start = BytesStart::new(ROOT_ELEMENT);
    start.push_attribute(("version", feed.version.as_str()));
    for (namespace, uri) in declarations {
        let name = format!("xmlns:{}", namespace.prefix);
        start.push_attribute((name.as_str(), uri));
    }
    start
}
