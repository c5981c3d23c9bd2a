use std::path::Path;

use chrono::DateTime;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::{Error, Result};
use crate::models::{Note, NoteId};

/// Storage operations the home view-model relies on.
pub trait NoteStore {
    /// All notes, newest first.
    fn list(&self) -> Result<Vec<Note>>;

    fn get(&self, id: &NoteId) -> Result<Option<Note>>;

    fn insert(&self, note: &Note) -> Result<()>;

    fn update(&self, note: &Note) -> Result<()>;

    fn delete(&self, id: &NoteId) -> Result<()>;
}

pub struct Database {
    connection: Connection,
}

impl Database {
    pub fn new(db_path: &Path) -> Result<Database> {
        let conn = Connection::open(db_path)?;
        tracing::info!("Opened note database at {}", db_path.display());
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Database> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Database> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                thumbnail TEXT NOT NULL,
                date INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(Database { connection: conn })
    }

    pub fn add_note(&self, note: &Note) -> Result<()> {
        self.connection.execute(
            "INSERT INTO notes (id, title, content, thumbnail, date) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                note.id.as_str(),
                note.title,
                note.content,
                note.thumbnail,
                note.date.timestamp_millis()
            ],
        )?;

        Ok(())
    }

    pub fn update_note(&self, note: &Note) -> Result<()> {
        let changed = self.connection.execute(
            "UPDATE notes SET title = ?1, content = ?2, thumbnail = ?3 WHERE id = ?4",
            params![note.title, note.content, note.thumbnail, note.id.as_str()],
        )?;

        if changed == 0 {
            return Err(Error::NotFound(note.id.to_string()));
        }
        Ok(())
    }

    pub fn delete_note(&self, id: &NoteId) -> Result<()> {
        let changed = self
            .connection
            .execute("DELETE FROM notes WHERE id = ?1", params![id.as_str()])?;

        if changed == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn get_note(&self, id: &NoteId) -> Result<Option<Note>> {
        let note = self
            .connection
            .query_row(
                "SELECT id, title, content, thumbnail, date FROM notes WHERE id = ?1",
                params![id.as_str()],
                note_from_row,
            )
            .optional()?;

        Ok(note)
    }

    pub fn get_all_notes(&self) -> Result<Vec<Note>> {
        let mut query = self.connection.prepare(
            "SELECT id, title, content, thumbnail, date FROM notes ORDER BY date DESC, id DESC",
        )?;

        let notes = query
            .query_map([], note_from_row)?
            .collect::<rusqlite::Result<Vec<Note>>>()?;

        Ok(notes)
    }
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    let id: String = row.get(0)?;
    let millis: i64 = row.get(4)?;

    Ok(Note {
        id: NoteId::from(id),
        title: row.get(1)?,
        content: row.get(2)?,
        thumbnail: row.get(3)?,
        date: DateTime::from_timestamp_millis(millis).unwrap_or_default(),
    })
}

impl NoteStore for Database {
    fn list(&self) -> Result<Vec<Note>> {
        self.get_all_notes()
    }

    fn get(&self, id: &NoteId) -> Result<Option<Note>> {
        self.get_note(id)
    }

    fn insert(&self, note: &Note) -> Result<()> {
        self.add_note(note)
    }

    fn update(&self, note: &Note) -> Result<()> {
        self.update_note(note)
    }

    fn delete(&self, id: &NoteId) -> Result<()> {
        self.delete_note(id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    use super::*;

    fn note_at(title: &str, offset_minutes: i64) -> Note {
        let mut note = Note::new(title, "", "TEXT");
        note.date += Duration::minutes(offset_minutes);
        note
    }

    #[test]
    fn lists_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let older = note_at("older", -10);
        let newer = note_at("newer", 0);
        db.add_note(&older).unwrap();
        db.add_note(&newer).unwrap();

        assert_eq!(db.get_all_notes().unwrap(), vec![newer, older]);
    }

    #[test]
    fn update_keeps_id_and_date() {
        let db = Database::open_in_memory().unwrap();
        let mut note = note_at("draft", 0);
        db.add_note(&note).unwrap();

        note.title = "final".to_string();
        note.content = "body".to_string();
        note.thumbnail = "/tmp/cover.png".to_string();
        db.update_note(&note).unwrap();

        assert_eq!(db.get_note(&note.id).unwrap(), Some(note));
    }

    #[test]
    fn delete_removes_the_note() {
        let db = Database::open_in_memory().unwrap();
        let note = note_at("gone", 0);
        db.add_note(&note).unwrap();

        db.delete_note(&note.id).unwrap();

        assert_eq!(db.get_note(&note.id).unwrap(), None);
        assert!(db.get_all_notes().unwrap().is_empty());
    }

    #[test]
    fn missing_notes_report_not_found() {
        let db = Database::open_in_memory().unwrap();
        let id = NoteId::from("missing");

        assert!(matches!(db.delete_note(&id), Err(Error::NotFound(_))));
        assert!(matches!(
            db.update_note(&Note {
                id,
                ..note_at("x", 0)
            }),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.db");
        let note = note_at("kept", 0);

        Database::new(&path).unwrap().add_note(&note).unwrap();

        assert_eq!(Database::new(&path).unwrap().get_all_notes().unwrap(), vec![note]);
    }
}
