use serde::{Deserialize, Serialize};

/// A tag notes are filed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteTag {
    pub id: i64,
    /// Unique across all tags
    pub name: String,
    pub active: bool,
    /// Notes under this tag are for internal use only
    pub internal: bool,
}

/// The record a note is attached to (model name + record id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteTarget {
    pub model: String,
    pub res_id: i64,
}

impl NoteTarget {
    pub fn new(model: impl Into<String>, res_id: i64) -> Self {
        Self {
            model: model.into(),
            res_id,
        }
    }
}

/// A tagged note
///
/// Notes are versioned: a revision is a new note whose `original_note_id`
/// points at the note it replaces. Deletion is soft (`active = false`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedNote {
    pub id: i64,
    pub note: String,
    pub tag_id: i64,
    pub original_note_id: Option<i64>,
    pub active: bool,
    pub target: Option<NoteTarget>,
}
