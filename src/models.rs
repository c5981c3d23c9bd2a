use std::fmt;

use chrono::{DateTime, Local, TimeZone, Utc};
use uuid::Uuid;

pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Opaque note identifier. Fresh ids are UUID v7 strings, so they sort by
/// creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(String);

impl NoteId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Built-in note kinds. Their markers double as thumbnail tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteType {
    Audio,
    Text,
}

impl NoteType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Audio => "AUDIO",
            Self::Text => "TEXT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// Either a [`NoteType`] marker or an image reference.
    pub thumbnail: String,
    pub date: DateTime<Utc>,
}

impl Note {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        thumbnail: impl Into<String>,
    ) -> Self {
        Self {
            id: NoteId::new(),
            title: title.into(),
            content: content.into(),
            thumbnail: thumbnail.into(),
            date: now_millis(),
        }
    }

    pub fn display_date(&self) -> String {
        format_display_date(&self.date, &Local)
    }
}

pub fn format_display_date<Tz>(date: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    date.with_timezone(tz)
        .format(DISPLAY_DATE_FORMAT)
        .to_string()
}

/// The store keeps millisecond precision, so new notes are truncated to match.
fn now_millis() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(Utc::now().timestamp_millis()).unwrap_or_else(Utc::now)
}

/// Snapshot of everything the home screen displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub notes: Vec<Note>,
    /// Note waiting for a delete confirmation. Always one of `notes`.
    pub item_to_delete: Option<Note>,
}

impl UiState {
    pub fn contains(&self, id: &NoteId) -> bool {
        self.notes.iter().any(|note| &note.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique_uuids() {
        let a = NoteId::new();
        let b = NoteId::new();

        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn type_markers_match_thumbnail_tags() {
        assert_eq!(NoteType::Audio.as_str(), "AUDIO");
        assert_eq!(NoteType::Text.as_str(), "TEXT");
    }

    #[test]
    fn display_date_uses_day_month_year() {
        let date = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        assert_eq!(format_display_date(&date, &Utc), "14/11/2023 22:13");
    }

    #[test]
    fn new_notes_drop_sub_millisecond_precision() {
        let note = Note::new("Groceries", "", NoteType::Text.as_str());

        assert_eq!(note.date.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn contains_looks_up_by_id() {
        let note = Note::new("Groceries", "", "TEXT");
        let state = UiState {
            notes: vec![note.clone()],
            item_to_delete: None,
        };

        assert!(state.contains(&note.id));
        assert!(!state.contains(&NoteId::from("missing")));
    }
}
