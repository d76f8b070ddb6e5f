use etlshell_core_types::BatchId;
use thiserror::Error;

/// Result type alias using ImportError
pub type Result<T> = std::result::Result<T, ImportError>;

/// Message returned when a row arrives without an import key
pub const IMPORT_KEY_REQUIRED: &str = "import_key is required";

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers (the sync jobs, the
/// CLI, tests) can match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    /// The batch could not be deserialized into rows
    MalformedInput,
    InvalidInput,

    // Validation (batch-fatal during upsert)
    ValidationFailed,

    // Lookup
    NotFound,
    AlreadyExists,
    /// A foreign natural key did not resolve to exactly one record
    UnresolvedReference,
    /// The row has already been promoted into the ledger
    AlreadyProcessed,
    ConstraintViolation,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::MalformedInput => "ERR_MALFORMED_INPUT",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::ValidationFailed => "ERR_VALIDATION_FAILED",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::UnresolvedReference => "ERR_UNRESOLVED_REFERENCE",
            ExErrorKind::AlreadyProcessed => "ERR_ALREADY_PROCESSED",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    row_index: Option<usize>,
    batch_id: Option<BatchId>,
    message: String,
    source: Option<Box<ExError>>,
    candidates: Option<Vec<String>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            row_index: None,
            batch_id: None,
            message: String::new(),
            source: None,
            candidates: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (an import key, a row id, a tag name)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add the position of the offending row in its batch
    pub fn with_row_index(mut self, index: usize) -> Self {
        self.row_index = Some(index);
        self
    }

    pub fn with_batch_id(mut self, batch_id: BatchId) -> Self {
        self.batch_id = Some(batch_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Add candidate ids (the matches found for an unresolved reference)
    pub fn with_candidates(mut self, ids: Vec<String>) -> Self {
        self.candidates = Some(ids);
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn row_index(&self) -> Option<usize> {
        self.row_index
    }

    pub fn batch_id(&self) -> Option<&BatchId> {
        self.batch_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    pub fn candidates(&self) -> Option<&[String]> {
        self.candidates.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(index) = self.row_index {
            write!(f, " (row: {})", index)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for import, load, note and task operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    // ===== Batch input =====
    /// The batch is not a collection of well-formed rows
    #[error("Malformed input: {reason}")]
    MalformedInput { reason: String },

    /// A row was submitted with an empty or whitespace-only import key
    #[error("import_key is required")]
    ImportKeyRequired { index: usize },

    /// The integration's `validate_upsert` hook refused the row
    #[error("{reason}")]
    UpsertRejected { import_key: String, reason: String },

    // ===== Persistence =====
    /// The row's own durable write failed
    #[error("Failed to persist row {import_key}: {message}")]
    RowPersistence { import_key: String, message: String },

    // ===== Load step =====
    #[error("There is a problem with the account import_key \"{account_import_key}\"")]
    UnresolvedReference {
        account_import_key: String,
        matches: Vec<String>,
    },

    #[error("Imported row {row_id} was already loaded")]
    AlreadyLoaded { row_id: i64 },

    #[error("Imported row not found: {row_id}")]
    RowNotFound { row_id: i64 },

    // ===== Tagged notes =====
    #[error("Invalid tag name: {reason}")]
    InvalidTagName { reason: String },

    #[error("You cannot have duplicate tags for notes: {name}")]
    DuplicateTag { name: String },

    #[error("Note tag not found: {tag_id}")]
    TagNotFound { tag_id: i64 },

    #[error("Note tag {tag_id} is still used by {note_count} note(s)")]
    TagInUse { tag_id: i64, note_count: i64 },

    #[error("Invalid note: {reason}")]
    InvalidNote { reason: String },

    #[error("Note not found: {note_id}")]
    NoteNotFound { note_id: i64 },

    #[error("Note {note_id} is archived and cannot be revised")]
    NoteArchived { note_id: i64 },

    // ===== Tasks =====
    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: i64 },

    // ===== Internal =====
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<ImportError> for ExError {
    fn from(err: ImportError) -> Self {
        let message = err.to_string();
        match err {
            ImportError::MalformedInput { .. } => {
                ExError::new(ExErrorKind::MalformedInput).with_message(message)
            }

            ImportError::ImportKeyRequired { index } => ExError::new(ExErrorKind::ValidationFailed)
                .with_row_index(index)
                .with_message(IMPORT_KEY_REQUIRED),

            ImportError::UpsertRejected { import_key, reason } => {
                ExError::new(ExErrorKind::ValidationFailed)
                    .with_entity_id(import_key)
                    .with_message(reason)
            }

            ImportError::RowPersistence {
                import_key,
                message,
            } => ExError::new(ExErrorKind::Persistence)
                .with_entity_id(import_key)
                .with_message(message),

            ImportError::UnresolvedReference {
                account_import_key,
                matches,
            } => ExError::new(ExErrorKind::UnresolvedReference)
                .with_entity_id(account_import_key)
                .with_candidates(matches)
                .with_message(message),

            ImportError::AlreadyLoaded { row_id } => ExError::new(ExErrorKind::AlreadyProcessed)
                .with_entity_id(row_id.to_string())
                .with_message(message),

            ImportError::RowNotFound { row_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(row_id.to_string())
                .with_message(message),

            ImportError::InvalidTagName { .. } | ImportError::InvalidNote { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            ImportError::DuplicateTag { name } => ExError::new(ExErrorKind::AlreadyExists)
                .with_entity_id(name)
                .with_message(message),

            ImportError::TagNotFound { tag_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(tag_id.to_string())
                .with_message(message),

            ImportError::TagInUse { tag_id, .. } => ExError::new(ExErrorKind::ConstraintViolation)
                .with_entity_id(tag_id.to_string())
                .with_message(message),

            ImportError::NoteNotFound { note_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(note_id.to_string())
                .with_message(message),

            ImportError::NoteArchived { note_id } => ExError::new(ExErrorKind::ConstraintViolation)
                .with_entity_id(note_id.to_string())
                .with_message(message),

            ImportError::TaskNotFound { task_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(task_id.to_string())
                .with_message(message),

            ImportError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            ImportError::Internal { .. } => ExError::new(ExErrorKind::Internal).with_message(message),
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::Serialization {
            message: err.to_string(),
        }
    }
}
