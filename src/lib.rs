//! Podcast RSS feed parser and writer.
//!
//! Feeds are decoded against a shadow schema keyed by namespace URI, so
//! `<atom:link>`, `<itunes:image>` and friends are found whatever prefix a
//! document binds their namespace to. The result is translated into the
//! plain domain model in [`model`], which is also what the writer encodes.
//!
//! ```no_run
//! # async fn run() -> Result<(), podfeed::FeedError> {
//! let parser = podfeed::Parser::new().with_user_agent("my-app/1.0");
//! let podcast = parser
//!     .parse_feed_from_url("https://example.com/feed.xml")
//!     .await?;
//! println!("{}: {} episodes", podcast.title, podcast.items.len());
//!
//! let mut out = Vec::new();
//! podcast.write_feed_xml(&mut out).expect("in-memory write");
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod model;
pub mod parser;
pub mod schema;
mod shadow;
pub mod writer;
pub mod xml;

pub use codec::{Bool, CodecError, Time, YesNo};
pub use config::{ConfigError, ParserConfig};
pub use model::{
    AtomLink, Description, Enclosure, Feed, ITunesCategory, ITunesImage, Item, ItemGuid, Podcast,
    PodcastFunding, PodcastText, PodcastTranscript,
};
pub use parser::{parse_feed, parse_feed_bytes, AuthCredentials, FeedError, Parser};
pub use writer::{write_feed_string, write_feed_xml};
pub use xml::de::DecodeError;
pub use xml::ser::EncodeError;
