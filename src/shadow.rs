//! Namespace-URI keyed mirror of [`crate::model`], generated by `build.rs`.
//!
//! Documents are decoded into `ShadowFeed` and translated into the domain
//! model with `From`. The shadow types never leave the crate.

use crate::model::{Feed, Podcast, ROOT_ELEMENT};
use crate::xml::de::decode_document;

// Brings `DecodeError` and the other runtime items into scope.
include!(concat!(env!("OUT_DIR"), "/shadow.rs"));

/// Decodes a feed document and returns its channel.
///
/// # Errors
///
/// Any [`DecodeError`]; [`DecodeError::MissingChannel`] when the envelope
/// decodes but holds no `<channel>`.
pub(crate) fn decode_feed(input: &[u8]) -> Result<Podcast, DecodeError> {
    let shadow: ShadowFeed = decode_document(input, ROOT_ELEMENT)?;
    let feed = Feed::from(shadow);
    feed.channel.ok_or(DecodeError::MissingChannel)
}
