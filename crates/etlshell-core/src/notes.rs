//! Tagged notes validation

use serde::{Deserialize, Serialize};

use crate::errors::{ImportError, Result};
use crate::model::NoteTarget;

/// Values for a new note (or a new revision of one)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTaggedNote {
    pub note: String,
    pub tag_id: i64,
    pub target: Option<NoteTarget>,
}

/// Normalise a tag name; names are compared after trimming
///
/// # Errors
///
/// Returns `InvalidTagName` for a blank name.
pub fn validate_tag_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ImportError::InvalidTagName {
            reason: "Tag name cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// # Errors
///
/// Returns `InvalidNote` for blank text or a target with a blank model name.
pub fn validate_note(note: &NewTaggedNote) -> Result<()> {
    if note.note.trim().is_empty() {
        return Err(ImportError::InvalidNote {
            reason: "Note cannot be empty or whitespace-only".to_string(),
        });
    }
    if let Some(target) = &note.target {
        if target.model.trim().is_empty() {
            return Err(ImportError::InvalidNote {
                reason: "Related document model cannot be empty".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name_is_trimmed() {
        assert_eq!(validate_tag_name("  billing ").unwrap(), "billing");
        assert!(validate_tag_name(" \n").is_err());
    }

    #[test]
    fn test_note_target_model_required() {
        let note = NewTaggedNote {
            note: "Call the client".to_string(),
            tag_id: 1,
            target: Some(NoteTarget::new("", 4)),
        };
        assert!(matches!(
            validate_note(&note),
            Err(ImportError::InvalidNote { .. })
        ));
    }
}
