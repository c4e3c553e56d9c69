//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its validation rules.
//! - Define the persisted JSON shape `{ id, date, content }`.
//!
//! # Invariants
//! - `id` is non-empty, unique within a store and immutable.
//! - `content` is non-empty and immutable once saved.
//! - `created_at` is serialized as ISO-8601 with millisecond precision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque stable identifier of one note.
///
/// Kept as a string so records written by other hosts (any id scheme) load
/// unchanged.
pub type NoteId = String;

/// One persisted note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Creation time. Serialized as `date` to match the stored collection.
    #[serde(rename = "date", with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    pub content: String,
}

impl Note {
    pub fn new(id: impl Into<NoteId>, created_at: DateTime<Utc>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at,
            content: content.into(),
        }
    }

    /// Validates note invariants.
    ///
    /// # Errors
    /// - [`NoteValidationError::EmptyId`] when `id` is empty.
    /// - [`NoteValidationError::EmptyContent`] when `content` is empty.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.id.is_empty() {
            return Err(NoteValidationError::EmptyId);
        }
        if self.content.is_empty() {
            return Err(NoteValidationError::EmptyContent {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Validation failures for [`Note`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyId,
    EmptyContent { id: NoteId },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "note id must not be empty"),
            Self::EmptyContent { id } => write!(f, "note `{id}` has empty content"),
        }
    }
}

impl Error for NoteValidationError {}

mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    // Accepts any RFC 3339 offset; values are normalized to UTC.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|value| value.with_timezone(&Utc))
            .map_err(|err| serde::de::Error::custom(format!("invalid note date `{raw}`: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteValidationError};
    use chrono::{TimeZone, Utc};

    #[test]
    fn serializes_with_date_field_and_millisecond_precision() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        let note = Note::new("n-1", created_at, "buy milk");

        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["id"], "n-1");
        assert_eq!(json["date"], "2024-03-01T12:30:05.000Z");
        assert_eq!(json["content"], "buy milk");
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn deserializes_browser_style_date_strings() {
        let raw = r#"{"id":"a","date":"2024-03-01T12:30:05.123Z","content":"x"}"#;
        let note: Note = serde_json::from_str(raw).unwrap();
        assert_eq!(
            note.created_at.timestamp_millis(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5)
                .unwrap()
                .timestamp_millis()
                + 123
        );
    }

    #[test]
    fn deserializing_rejects_unparsable_date() {
        let raw = r#"{"id":"a","date":"yesterday","content":"x"}"#;
        assert!(serde_json::from_str::<Note>(raw).is_err());
    }

    #[test]
    fn validate_rejects_empty_id_and_content() {
        let now = Utc::now();
        assert_eq!(
            Note::new("", now, "x").validate(),
            Err(NoteValidationError::EmptyId)
        );
        assert_eq!(
            Note::new("a", now, "").validate(),
            Err(NoteValidationError::EmptyContent { id: "a".to_string() })
        );
        assert!(Note::new("a", now, "  ").validate().is_ok());
    }
}
