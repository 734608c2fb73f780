//! The feed domain model.
//!
//! Field names, order and wire tags are declared again in
//! [`crate::schema::descriptors`], which the decoders and encoders are
//! generated from. Required fields of the Podcasting 2.0 / Apple podcast
//! profile are not enforced: a missing element decodes to its default.

use crate::codec::{Bool, Time, YesNo};

/// Name of the document root element.
pub const ROOT_ELEMENT: &str = "rss";

// ============================================================================
// Envelope
// ============================================================================

/// The `<rss>` envelope.
///
/// Only the writer builds one; it overwrites `version` and the namespace
/// declarations, so callers deal in [`Podcast`] alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    pub version: String,
    pub xmlns_content: String,
    pub xmlns_podcast: String,
    pub xmlns_atom: String,
    pub xmlns_itunes: String,
    pub channel: Option<Podcast>,
}

// ============================================================================
// Channel
// ============================================================================

/// A podcast, the `<channel>` of a feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Podcast {
    /// `<atom:link rel="self">`, the canonical feed URL.
    pub atom_link: AtomLink,
    pub title: String,
    pub description: Description,
    pub link: String,
    pub language: String,
    pub itunes_category: Vec<ITunesCategory>,
    pub itunes_explicit: Bool,
    pub itunes_image: ITunesImage,

    /// Whether the feed may be imported to another hosting platform.
    pub podcast_locked: Option<YesNo>,
    pub podcast_guid: String,
    pub itunes_author: String,

    pub copyright: String,
    pub podcast_text: Option<PodcastText>,
    pub podcast_funding: Option<PodcastFunding>,
    /// `episodic` or `serial`.
    pub itunes_type: String,
    /// Set when no more episodes will be published.
    pub itunes_complete: Option<YesNo>,

    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomLink {
    pub href: String,
    pub rel: String,
    pub link_type: String,
}

/// Free text written as CDATA, so HTML survives unescaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Description {
    pub text: String,
}

/// An Apple Podcasts category, optionally refined by one subcategory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ITunesCategory {
    pub text: String,
    pub sub_category: Option<Box<ITunesCategory>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ITunesImage {
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodcastText {
    pub purpose: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodcastFunding {
    pub url: String,
    pub text: String,
}

// ============================================================================
// Episodes
// ============================================================================

/// An episode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub title: String,
    pub enclosure: Enclosure,
    pub guid: ItemGuid,

    pub link: String,
    pub pub_date: Option<Time>,
    pub description: Option<Description>,
    /// Full HTML show notes from `<content:encoded>`.
    pub content_encoded: Option<Description>,
    /// Either seconds or `[hh:]mm:ss`, kept as written.
    pub itunes_duration: String,
    pub itunes_image: Option<ITunesImage>,
    pub itunes_explicit: Option<Bool>,
    pub podcast_transcript: Vec<PodcastTranscript>,

    pub itunes_episode: String,
    pub itunes_season: String,
    /// `full`, `trailer` or `bonus`.
    pub itunes_episode_type: String,
    pub itunes_block: Option<YesNo>,
}

/// The media file of an episode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enclosure {
    /// Size in bytes.
    pub length: i64,
    pub mime_type: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemGuid {
    pub is_perma_link: Option<Bool>,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodcastTranscript {
    pub url: String,
    pub mime_type: String,
    pub rel: String,
    pub language: String,
}
