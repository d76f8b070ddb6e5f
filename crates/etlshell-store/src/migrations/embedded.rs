//! Embedded SQL migrations
//!
//! Migrations are embedded at compile time using include_str!

/// Migration metadata
pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

/// All embedded migrations, in application order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            id: "001_import_ledger",
            sql: include_str!("../../migrations/001_import_ledger.sql"),
        },
        Migration {
            id: "002_tagged_notes",
            sql: include_str!("../../migrations/002_tagged_notes.sql"),
        },
        Migration {
            id: "003_task_plan",
            sql: include_str!("../../migrations/003_task_plan.sql"),
        },
    ]
}
