//! Tagged notes repository

#![allow(clippy::result_large_err)]

use etlshell_core::errors::ImportError;
use etlshell_core::model::{NoteTag, NoteTarget, TaggedNote};
use etlshell_core::notes::{validate_note, validate_tag_name, NewTaggedNote};
use rusqlite::{Connection, OptionalExtension};

use crate::errors::{from_rusqlite, is_unique_violation, Result};

const NOTE_COLUMNS: &str = "id, note, tag_id, original_note_id, active, model, res_id";

/// SQLite repository for note tags and tagged notes
pub struct NotesRepo;

impl NotesRepo {
    /// Create a tag; names are unique after trimming
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a blank name, `AlreadyExists` for a taken one.
    pub fn create_tag(conn: &Connection, name: &str, internal: bool) -> Result<NoteTag> {
        let name = validate_tag_name(name)?;

        conn.execute(
            "INSERT INTO note_tags (name, active, internal) VALUES (?1, 1, ?2)",
            rusqlite::params![name, internal],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                ImportError::DuplicateTag { name: name.clone() }.into()
            } else {
                from_rusqlite(e).with_op("create_tag")
            }
        })?;

        Ok(NoteTag {
            id: conn.last_insert_rowid(),
            name,
            active: true,
            internal,
        })
    }

    pub fn get_tag(conn: &Connection, tag_id: i64) -> Result<Option<NoteTag>> {
        conn.query_row(
            "SELECT id, name, active, internal FROM note_tags WHERE id = ?1",
            [tag_id],
            |row| {
                Ok(NoteTag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    active: row.get(2)?,
                    internal: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Delete a tag no note refers to
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown tag, `ConstraintViolation` while any note
    /// (archived ones included) still uses it.
    pub fn delete_tag(conn: &Connection, tag_id: i64) -> Result<()> {
        let note_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM tagged_notes WHERE tag_id = ?1",
                [tag_id],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;
        if note_count > 0 {
            return Err(ImportError::TagInUse { tag_id, note_count }.into());
        }

        let deleted = conn
            .execute("DELETE FROM note_tags WHERE id = ?1", [tag_id])
            .map_err(|e| from_rusqlite(e).with_op("delete_tag"))?;
        if deleted == 0 {
            return Err(ImportError::TagNotFound { tag_id }.into());
        }
        Ok(())
    }

    /// # Errors
    ///
    /// `InvalidInput` for blank text, `NotFound` for an unknown tag.
    pub fn add_note(conn: &Connection, note: &NewTaggedNote) -> Result<TaggedNote> {
        Self::insert_note(conn, note, None)
    }

    /// Replace a note's text with a new version
    ///
    /// The new note keeps the tag and target of the old one and points back
    /// at it; the old one is archived.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown note, `ConstraintViolation` for an archived
    /// one, `InvalidInput` for blank text.
    pub fn revise_note(conn: &mut Connection, note_id: i64, text: &str) -> Result<TaggedNote> {
        let tx = conn.transaction().map_err(from_rusqlite)?;

        let current =
            Self::get_note(&tx, note_id)?.ok_or(ImportError::NoteNotFound { note_id })?;
        if !current.active {
            return Err(ImportError::NoteArchived { note_id }.into());
        }
        let revision = NewTaggedNote {
            note: text.to_string(),
            tag_id: current.tag_id,
            target: current.target,
        };
        let created = Self::insert_note(&tx, &revision, Some(note_id))?;
        tx.execute(
            "UPDATE tagged_notes SET active = 0 WHERE id = ?1",
            [note_id],
        )
        .map_err(from_rusqlite)?;

        tx.commit().map_err(from_rusqlite)?;
        Ok(created)
    }

    /// Soft-delete a note
    pub fn archive_note(conn: &Connection, note_id: i64) -> Result<()> {
        let changed = conn
            .execute(
                "UPDATE tagged_notes SET active = 0 WHERE id = ?1",
                [note_id],
            )
            .map_err(from_rusqlite)?;
        if changed == 0 {
            return Err(ImportError::NoteNotFound { note_id }.into());
        }
        Ok(())
    }

    pub fn get_note(conn: &Connection, note_id: i64) -> Result<Option<TaggedNote>> {
        conn.query_row(
            &format!("SELECT {} FROM tagged_notes WHERE id = ?1", NOTE_COLUMNS),
            [note_id],
            map_note,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Active notes attached to one record, oldest first
    pub fn notes_for_record(conn: &Connection, model: &str, res_id: i64) -> Result<Vec<TaggedNote>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM tagged_notes
                 WHERE model = ?1 AND res_id = ?2 AND active = 1 ORDER BY id",
                NOTE_COLUMNS
            ))
            .map_err(from_rusqlite)?;
        let notes = stmt
            .query_map(rusqlite::params![model, res_id], map_note)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(notes)
    }

    fn insert_note(
        conn: &Connection,
        note: &NewTaggedNote,
        original_note_id: Option<i64>,
    ) -> Result<TaggedNote> {
        validate_note(note)?;
        if Self::get_tag(conn, note.tag_id)?.is_none() {
            return Err(ImportError::TagNotFound {
                tag_id: note.tag_id,
            }
            .into());
        }

        let (model, res_id) = match &note.target {
            Some(target) => (Some(target.model.as_str()), Some(target.res_id)),
            None => (None, None),
        };
        conn.execute(
            "INSERT INTO tagged_notes (note, tag_id, original_note_id, active, model, res_id, created_at)
             VALUES (?1, ?2, ?3, 1, ?4, ?5, ?6)",
            rusqlite::params![
                note.note,
                note.tag_id,
                original_note_id,
                model,
                res_id,
                chrono::Utc::now().timestamp(),
            ],
        )
        .map_err(|e| from_rusqlite(e).with_op("add_note"))?;

        Ok(TaggedNote {
            id: conn.last_insert_rowid(),
            note: note.note.clone(),
            tag_id: note.tag_id,
            original_note_id,
            active: true,
            target: note.target.clone(),
        })
    }
}

fn map_note(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaggedNote> {
    let model: Option<String> = row.get(5)?;
    let res_id: Option<i64> = row.get(6)?;

    Ok(TaggedNote {
        id: row.get(0)?,
        note: row.get(1)?,
        tag_id: row.get(2)?,
        original_note_id: row.get(3)?,
        active: row.get(4)?,
        target: model.zip(res_id).map(|(model, res_id)| NoteTarget { model, res_id }),
    })
}
