//! Field descriptors for every entity of the feed model.
//!
//! This table is the single declaration the shadow schema is generated
//! from. Entries must list the fields of the matching struct in
//! `crate::model`, in the same order; the generated translation code builds
//! each domain struct with a struct literal, so a missing, extra or
//! mistyped field fails to compile.
//!
//! Tags use the `name[,flag]*` form: `name` is `local` or `prefix:local`,
//! and the flags are `attr`, `chardata`, `cdata` and `omitempty`.

/// How a field wraps its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `T`
    One,
    /// `Option<T>`
    Optional,
    /// `Option<Box<T>>`, for self-referential entities.
    OptionalBoxed,
    /// `Vec<T>`
    Many,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Rust field name, shared by the domain and shadow structs.
    pub field: &'static str,
    /// Scalar type name or entity name.
    pub ty: &'static str,
    pub shape: Shape,
    /// Wire tag, e.g. `"itunes:category,omitempty"`.
    pub tag: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct EntityDescriptor {
    pub name: &'static str,
    pub fields: &'static [FieldDescriptor],
}

/// Leaf types decoded and encoded through `crate::codec::XmlScalar`.
pub const SCALAR_TYPES: &[&str] = &["String", "i64", "Bool", "YesNo", "Time"];

pub const fn field(
    field: &'static str,
    ty: &'static str,
    shape: Shape,
    tag: &'static str,
) -> FieldDescriptor {
    FieldDescriptor {
        field,
        ty,
        shape,
        tag,
    }
}

use Shape::{Many, One, Optional, OptionalBoxed};

pub static FEED_SCHEMA: &[EntityDescriptor] = &[
    EntityDescriptor {
        name: "Feed",
        fields: &[
            field("version", "String", One, "version,attr"),
            field("xmlns_content", "String", One, "xmlns:content,attr"),
            field("xmlns_podcast", "String", One, "xmlns:podcast,attr"),
            field("xmlns_atom", "String", One, "xmlns:atom,attr"),
            field("xmlns_itunes", "String", One, "xmlns:itunes,attr"),
            field("channel", "Podcast", Optional, "channel"),
        ],
    },
    EntityDescriptor {
        name: "Podcast",
        fields: &[
            // PSP required
            field("atom_link", "AtomLink", One, "atom:link"),
            field("title", "String", One, "title"),
            field("description", "Description", One, "description"),
            field("link", "String", One, "link"),
            field("language", "String", One, "language"),
            field("itunes_category", "ITunesCategory", Many, "itunes:category"),
            field("itunes_explicit", "Bool", One, "itunes:explicit"),
            field("itunes_image", "ITunesImage", One, "itunes:image"),
            // PSP recommended
            field("podcast_locked", "YesNo", Optional, "podcast:locked,omitempty"),
            field("podcast_guid", "String", One, "podcast:guid,omitempty"),
            field("itunes_author", "String", One, "itunes:author,omitempty"),
            // PSP optional
            field("copyright", "String", One, "copyright,omitempty"),
            field("podcast_text", "PodcastText", Optional, "podcast:txt,omitempty"),
            field("podcast_funding", "PodcastFunding", Optional, "podcast:funding,omitempty"),
            field("itunes_type", "String", One, "itunes:type,omitempty"),
            field("itunes_complete", "YesNo", Optional, "itunes:complete,omitempty"),
            field("items", "Item", Many, "item"),
        ],
    },
    EntityDescriptor {
        name: "AtomLink",
        fields: &[
            field("href", "String", One, "href,attr"),
            field("rel", "String", One, "rel,attr"),
            field("link_type", "String", One, "type,attr"),
        ],
    },
    EntityDescriptor {
        name: "Description",
        fields: &[field("text", "String", One, ",cdata")],
    },
    EntityDescriptor {
        name: "ITunesCategory",
        fields: &[
            field("text", "String", One, "text,attr"),
            field("sub_category", "ITunesCategory", OptionalBoxed, "itunes:category,omitempty"),
        ],
    },
    EntityDescriptor {
        name: "ITunesImage",
        fields: &[field("href", "String", One, "href,attr")],
    },
    EntityDescriptor {
        name: "PodcastText",
        fields: &[
            field("purpose", "String", One, "purpose,attr,omitempty"),
            field("text", "String", One, ",chardata"),
        ],
    },
    EntityDescriptor {
        name: "PodcastFunding",
        fields: &[
            field("url", "String", One, "url,attr"),
            field("text", "String", One, ",chardata"),
        ],
    },
    EntityDescriptor {
        name: "Item",
        fields: &[
            // PSP required
            field("title", "String", One, "title"),
            field("enclosure", "Enclosure", One, "enclosure"),
            field("guid", "ItemGuid", One, "guid"),
            // PSP recommended
            field("link", "String", One, "link,omitempty"),
            field("pub_date", "Time", Optional, "pubDate,omitempty"),
            field("description", "Description", Optional, "description,omitempty"),
            field("content_encoded", "Description", Optional, "content:encoded,omitempty"),
            field("itunes_duration", "String", One, "itunes:duration,omitempty"),
            field("itunes_image", "ITunesImage", Optional, "itunes:image,omitempty"),
            field("itunes_explicit", "Bool", Optional, "itunes:explicit,omitempty"),
            field("podcast_transcript", "PodcastTranscript", Many, "podcast:transcript,omitempty"),
            // PSP optional
            field("itunes_episode", "String", One, "itunes:episode,omitempty"),
            field("itunes_season", "String", One, "itunes:season,omitempty"),
            field("itunes_episode_type", "String", One, "itunes:episodeType,omitempty"),
            field("itunes_block", "YesNo", Optional, "itunes:block,omitempty"),
        ],
    },
    EntityDescriptor {
        name: "Enclosure",
        fields: &[
            field("length", "i64", One, "length,attr"),
            field("mime_type", "String", One, "type,attr"),
            field("url", "String", One, "url,attr"),
        ],
    },
    EntityDescriptor {
        name: "ItemGuid",
        fields: &[
            field("is_perma_link", "Bool", Optional, "isPermaLink,attr,omitempty"),
            field("text", "String", One, ",chardata"),
        ],
    },
    EntityDescriptor {
        name: "PodcastTranscript",
        fields: &[
            field("url", "String", One, "url,attr"),
            field("mime_type", "String", One, "type,attr"),
            field("rel", "String", One, "rel,attr,omitempty"),
            field("language", "String", One, "language,attr,omitempty"),
        ],
    },
];
