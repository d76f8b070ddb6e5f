pub mod import_row;
pub mod ledger;
pub mod note;

pub use import_row::{ImportRow, ImportedRow, NaturalKey, NewImportedRow};
pub use ledger::{AccountRef, LoadedRow, NewLedgerLine};
pub use note::{NoteTag, NoteTarget, TaggedNote};
