//! Lenient scalar codecs for the leaf values of a feed.
//!
//! Podcast feeds in the wild are loose about booleans (`yes`, `Y`, `true`)
//! and dates (single-digit days, named zones), so these codecs accept more
//! than they emit. Every leaf type implements [`XmlScalar`], which is the
//! only interface the generated decoders and encoders use.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// Errors raised while decoding a leaf value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid integer '{0}'")]
    InvalidInteger(String),
    /// None of the accepted date layouts matched.
    #[error("failed to parse time '{0}'")]
    InvalidTime(String),
}

/// A value stored as element text or an attribute value.
pub trait XmlScalar: Sized {
    fn decode_text(text: &str) -> Result<Self, CodecError>;

    fn encode_text(&self) -> Cow<'_, str>;

    /// Whether an `omitempty` field holding this value is left out on write.
    fn is_zero(&self) -> bool;
}

impl XmlScalar for String {
    fn decode_text(text: &str) -> Result<Self, CodecError> {
        Ok(text.to_owned())
    }

    fn encode_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl XmlScalar for i64 {
    fn decode_text(text: &str) -> Result<Self, CodecError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(0);
        }
        trimmed
            .parse()
            .map_err(|_| CodecError::InvalidInteger(text.to_owned()))
    }

    fn encode_text(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn is_zero(&self) -> bool {
        *self == 0
    }
}

// ============================================================================
// Boolean-like values
// ============================================================================

/// Shared decode rule of [`Bool`] and [`YesNo`].
///
/// Unrecognized text decodes to `false` rather than failing.
fn decode_bool_like(text: &str) -> bool {
    const TRUE: [&str; 4] = ["true", "t", "y", "yes"];
    TRUE.iter().any(|literal| text.eq_ignore_ascii_case(literal))
}

/// A boolean written as `true`/`false`, read leniently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Bool(pub bool);

/// A boolean written as `yes`/`no`, read leniently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct YesNo(pub bool);

impl XmlScalar for Bool {
    fn decode_text(text: &str) -> Result<Self, CodecError> {
        Ok(Self(decode_bool_like(text)))
    }

    fn encode_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(if self.0 { "true" } else { "false" })
    }

    fn is_zero(&self) -> bool {
        !self.0
    }
}

impl XmlScalar for YesNo {
    fn decode_text(text: &str) -> Result<Self, CodecError> {
        Ok(Self(decode_bool_like(text)))
    }

    fn encode_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(if self.0 { "yes" } else { "no" })
    }

    fn is_zero(&self) -> bool {
        !self.0
    }
}

impl From<bool> for Bool {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl From<Bool> for bool {
    fn from(value: Bool) -> Self {
        value.0
    }
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl From<YesNo> for bool {
    fn from(value: YesNo) -> Self {
        value.0
    }
}

// ============================================================================
// Timestamps
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    /// `MST`, `GMT`, ...
    Named,
    /// `-0700`
    Numeric,
}

struct Layout {
    weekday: bool,
    /// chrono format of the date and time, without weekday or zone. The day
    /// is always handed to chrono zero padded.
    format: &'static str,
    zone: Zone,
    /// Strict layouts want a two digit day; the tolerant ones also take one
    /// digit, optionally preceded by a space.
    padded_day: bool,
}

/// Accepted layouts, tried in order.
const LAYOUTS: [Layout; 6] = [
    // RFC 822: 02 Jan 06 15:04 MST
    Layout {
        weekday: false,
        format: "%d %b %y %H:%M",
        zone: Zone::Named,
        padded_day: true,
    },
    // RFC 822Z: 02 Jan 06 15:04 -0700
    Layout {
        weekday: false,
        format: "%d %b %y %H:%M",
        zone: Zone::Numeric,
        padded_day: true,
    },
    // RFC 1123: Mon, 02 Jan 2006 15:04:05 MST
    Layout {
        weekday: true,
        format: "%d %b %Y %H:%M:%S",
        zone: Zone::Named,
        padded_day: true,
    },
    // RFC 1123Z: Mon, 02 Jan 2006 15:04:05 -0700
    Layout {
        weekday: true,
        format: "%d %b %Y %H:%M:%S",
        zone: Zone::Numeric,
        padded_day: true,
    },
    // Mon, 2 Jan 2006 15:04:05 MST
    Layout {
        weekday: true,
        format: "%d %b %Y %H:%M:%S",
        zone: Zone::Named,
        padded_day: false,
    },
    // Mon, 2 Jan 2006 15:04:05 -0700
    Layout {
        weekday: true,
        format: "%d %b %Y %H:%M:%S",
        zone: Zone::Numeric,
        padded_day: false,
    },
];

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// A point in time read from any of the RFC 822 / RFC 1123 variants feeds
/// use, and always written as RFC 1123.
///
/// Equality compares instants, so a value survives a write/read cycle even
/// though its text and zone may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Time(pub DateTime<FixedOffset>);

impl Time {
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        LAYOUTS
            .iter()
            .find_map(|layout| parse_with(layout, text))
            .map(Self)
            .ok_or_else(|| CodecError::InvalidTime(text.to_owned()))
    }
}

fn parse_with(layout: &Layout, text: &str) -> Option<DateTime<FixedOffset>> {
    let mut rest = text;
    if layout.weekday {
        let (weekday, tail) = rest.split_once(", ")?;
        if !WEEKDAYS.iter().any(|day| day.eq_ignore_ascii_case(weekday)) {
            return None;
        }
        rest = tail;
    }

    let (day, tail) = split_day(rest, layout.padded_day)?;
    let (datetime, zone) = tail.rsplit_once(' ')?;
    let offset = match layout.zone {
        Zone::Named => named_offset(zone)?,
        Zone::Numeric => numeric_offset(zone)?,
    };

    let normalized = format!("{day:02} {datetime}");
    let naive = NaiveDateTime::parse_from_str(&normalized, layout.format).ok()?;
    offset.from_local_datetime(&naive).single()
}

/// Splits the leading day of month off `text`, returning it with the text
/// after the following space.
fn split_day(text: &str, padded: bool) -> Option<(u32, &str)> {
    let text = if padded {
        text
    } else {
        text.strip_prefix(' ').unwrap_or(text)
    };
    let (digits, tail) = text.split_once(' ')?;
    let valid_len = if padded {
        digits.len() == 2
    } else {
        matches!(digits.len(), 1 | 2)
    };
    if !valid_len || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((digits.parse().ok()?, tail))
}

fn named_offset(zone: &str) -> Option<FixedOffset> {
    if zone.is_empty() || zone.len() > 5 || !zone.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let hours = match zone {
        "EST" | "CDT" => -5,
        "EDT" => -4,
        "CST" => -6,
        "MST" => -7,
        "MDT" => -6,
        "PST" => -8,
        "PDT" => -7,
        // UT, UTC, GMT, Z and anything else we have no table entry for.
        _ => 0,
    };
    FixedOffset::east_opt(hours * 3600)
}

fn numeric_offset(zone: &str) -> Option<FixedOffset> {
    let bytes = zone.as_bytes();
    if bytes.len() != 5 || !bytes[1..].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let hours: i32 = zone[1..3].parse().ok()?;
    let minutes: i32 = zone[3..5].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl XmlScalar for Time {
    fn decode_text(text: &str) -> Result<Self, CodecError> {
        Self::parse(text)
    }

    fn encode_text(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn is_zero(&self) -> bool {
        false
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self.0.format("%a, %d %b %Y %H:%M:%S");
        if self.0.offset().local_minus_utc() == 0 {
            write!(f, "{date} GMT")
        } else {
            write!(f, "{date} {}", self.0.format("%z"))
        }
    }
}

impl From<DateTime<FixedOffset>> for Time {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self(value)
    }
}

impl From<DateTime<Utc>> for Time {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.fixed_offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bool_of(text: &str) -> bool {
        Bool::decode_text(text).unwrap().0
    }

    #[test]
    fn test_bool_like_table() {
        for text in ["TRUE", "t", "Y", "yes", "True", "YES"] {
            assert!(bool_of(text), "{text:?} should decode to true");
            assert!(YesNo::decode_text(text).unwrap().0);
        }
        for text in ["false", "F", "n", "NO", "maybe", "", "1", " yes"] {
            assert!(!bool_of(text), "{text:?} should decode to false");
            assert!(!YesNo::decode_text(text).unwrap().0);
        }
    }

    #[test]
    fn test_bool_encodings_differ() {
        assert_eq!(Bool(true).encode_text(), "true");
        assert_eq!(Bool(false).encode_text(), "false");
        assert_eq!(YesNo(true).encode_text(), "yes");
        assert_eq!(YesNo(false).encode_text(), "no");
    }

    #[test]
    fn test_integer_decoding() {
        assert_eq!(i64::decode_text(" 12345 ").unwrap(), 12345);
        assert_eq!(i64::decode_text("").unwrap(), 0);
        assert_eq!(i64::decode_text("-7").unwrap(), -7);
        assert_eq!(
            i64::decode_text("12kb").unwrap_err(),
            CodecError::InvalidInteger("12kb".to_owned())
        );
    }

    #[test]
    fn test_time_layouts() {
        let utc = |s: &str| Time::parse(s).unwrap().0.timestamp();
        let expected = Utc.with_ymd_and_hms(2006, 1, 2, 22, 4, 5).unwrap().timestamp();

        assert_eq!(utc("Mon, 02 Jan 2006 15:04:05 MST"), expected);
        assert_eq!(utc("Mon, 02 Jan 2006 15:04:05 -0700"), expected);
        assert_eq!(utc("Mon, 02 Jan 2006 22:04:05 GMT"), expected);
        assert_eq!(utc("Mon, 2 Jan 2006 22:04:05 +0000"), expected);
        assert_eq!(utc("Mon,  2 Jan 2006 22:04:05 UTC"), expected);

        let no_seconds = Utc.with_ymd_and_hms(2006, 1, 2, 22, 4, 0).unwrap().timestamp();
        assert_eq!(utc("02 Jan 06 15:04 MST"), no_seconds);
        assert_eq!(utc("02 Jan 06 15:04 -0700"), no_seconds);
    }

    #[test]
    fn test_time_single_digit_day_falls_back() {
        let text = "Mon, 2 Jan 2006 15:04:05 MST";
        for layout in &LAYOUTS[..4] {
            assert!(parse_with(layout, text).is_none());
        }
        let time = Time::parse(text).unwrap();
        assert_eq!(time.encode_text(), "Mon, 02 Jan 2006 15:04:05 -0700");
    }

    #[test]
    fn test_time_encodes_gmt_for_zero_offset() {
        let time = Time::parse("Tue, 10 Jun 2003 04:00:00 GMT").unwrap();
        assert_eq!(time.encode_text(), "Tue, 10 Jun 2003 04:00:00 GMT");
        let time = Time::parse("Tue, 10 Jun 2003 04:00:00 Z").unwrap();
        assert_eq!(time.encode_text(), "Tue, 10 Jun 2003 04:00:00 GMT");
    }

    #[test]
    fn test_time_rejects_garbage() {
        for text in [
            "",
            "yesterday",
            "2006-01-02T15:04:05Z",
            "Mon, 02 Jan 2006 15:04:05",
            "Xyz, 02 Jan 2006 15:04:05 GMT",
            "Mon, 02 Foo 2006 15:04:05 GMT",
            "Mon, 32 Jan 2006 15:04:05 GMT",
            "Mon, 02 Jan 2006 15:04:05 +07",
            "Mon, 123 Jan 2006 15:04:05 GMT",
        ] {
            assert_eq!(
                Time::parse(text).unwrap_err(),
                CodecError::InvalidTime(text.to_owned()),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_weekday_is_syntax_only() {
        // 2 Jan 2006 was a Monday.
        let time = Time::parse("Fri, 02 Jan 2006 15:04:05 GMT").unwrap();
        assert_eq!(time.encode_text(), "Mon, 02 Jan 2006 15:04:05 GMT");
    }

    fn mixed_case(literal: &'static str) -> impl Strategy<Value = String> {
        proptest::collection::vec(any::<bool>(), literal.len()).prop_map(move |upper| {
            literal
                .chars()
                .zip(upper)
                .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_true_literals_ignore_case(text in prop_oneof![
            mixed_case("true"), mixed_case("t"), mixed_case("y"), mixed_case("yes"),
        ]) {
            prop_assert!(Bool::decode_text(&text).unwrap().0);
        }

        #[test]
        fn prop_false_literals_ignore_case(text in prop_oneof![
            mixed_case("false"), mixed_case("f"), mixed_case("n"), mixed_case("no"),
        ]) {
            prop_assert!(!YesNo::decode_text(&text).unwrap().0);
        }

        #[test]
        fn prop_time_survives_encoding(
            secs in 0i64..4_000_000_000,
            offset_minutes in -720i32..=840,
        ) {
            let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap();
            let time = Time(offset.timestamp_opt(secs, 0).unwrap());
            let decoded = Time::decode_text(&time.encode_text()).unwrap();
            prop_assert_eq!(decoded, time);
        }
    }
}
