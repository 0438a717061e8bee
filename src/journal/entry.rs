//! `JournalEntry` and its field encodings.
//!
//! The JSON shape is the one every JournalBear release has written:
//! `entryDate` as an ISO-8601 string, `sentiment` as a bare name,
//! `attachment` as a list of image references.  Older releases left
//! `sentiment` out, spelled the attachment key `Attachment`, and
//! sometimes stored a single string instead of a list.

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::attachment;

/// How the author felt about the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Happy,
    Angry,
    Sad,
    Neutral,
    Loved,
    Excited,
}

impl Sentiment {
    pub const ALL: [Sentiment; 6] = [
        Sentiment::Happy,
        Sentiment::Angry,
        Sentiment::Sad,
        Sentiment::Neutral,
        Sentiment::Loved,
        Sentiment::Excited,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Happy => "Happy",
            Sentiment::Angry => "Angry",
            Sentiment::Sad => "Sad",
            Sentiment::Neutral => "Neutral",
            Sentiment::Loved => "Loved",
            Sentiment::Excited => "Excited",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Sentiment::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!("unknown sentiment '{s}' (expected one of Happy, Angry, Sad, Neutral, Loved, Excited)")
            })
    }
}

/// One day in the journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Stored with millisecond precision.
    #[serde(rename = "entryDate", with = "entry_date")]
    pub entry_date: DateTime<Utc>,

    /// Markdown body.
    #[serde(default)]
    pub content: String,

    /// `None` for entries written before sentiments existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,

    /// Image references: `data:` URLs in memory, relative paths inside
    /// an archive's `data.json`.
    #[serde(
        default,
        alias = "Attachment",
        deserialize_with = "attachment::deserialize_list"
    )]
    pub attachment: Vec<String>,

    #[serde(default)]
    pub nsfw: bool,
}

impl JournalEntry {
    /// `entry_date` is truncated to milliseconds, the precision the file
    /// format keeps.
    pub fn new(entry_date: DateTime<Utc>, content: impl Into<String>) -> Self {
        Self {
            entry_date: entry_date.trunc_subsecs(3),
            content: content.into(),
            sentiment: None,
            attachment: Vec::new(),
            nsfw: false,
        }
    }

    /// The calendar day this entry belongs to (UTC).
    pub fn date(&self) -> NaiveDate {
        self.entry_date.date_naive()
    }
}

/// `entryDate` is written as RFC 3339 UTC
/// (millisecond precision, `Z` suffix).  On read we also accept a plain
/// `YYYY-MM-DD` day and epoch milliseconds.
mod entry_date {
    use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDate {
        Text(String),
        Millis(i64),
    }

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match RawDate::deserialize(deserializer)? {
            RawDate::Millis(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| serde::de::Error::custom(format!("timestamp {ms} out of range"))),
            RawDate::Text(s) => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
                    return Ok(dt.with_timezone(&Utc));
                }
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid entryDate '{s}'")))
            }
        }
    }
}
