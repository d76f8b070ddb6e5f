//! Tasks with deadline planning fields

#![allow(clippy::result_large_err)]

use etlshell_core::deadline::{apply_deadline_change, DeadlineChange, DeadlinePlan};
use etlshell_core::errors::ImportError;
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::errors::{from_rusqlite, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub project_id: Option<i64>,
    pub plan: DeadlinePlan,
}

pub struct TaskRepo;

impl TaskRepo {
    /// Create a task; the deadline fields are normalised first
    pub fn create_task(
        conn: &Connection,
        name: &str,
        project_id: Option<i64>,
        deadline: &DeadlineChange,
    ) -> Result<Task> {
        let plan = apply_deadline_change(&DeadlinePlan::default(), deadline);

        conn.execute(
            "INSERT INTO tasks (name, project_id, time_deadline, duration_deadline,
                                time_deadline_display, duration_deadline_minutes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                name,
                project_id,
                plan.time_deadline,
                plan.duration_deadline,
                plan.time_deadline_display,
                plan.duration_deadline_minutes,
            ],
        )
        .map_err(|e| from_rusqlite(e).with_op("create_task"))?;

        Ok(Task {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            project_id,
            plan,
        })
    }

    /// Write deadline fields of an existing task
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown task.
    pub fn update_deadline(
        conn: &Connection,
        task_id: i64,
        change: &DeadlineChange,
    ) -> Result<DeadlinePlan> {
        let task = Self::get_task(conn, task_id)?.ok_or(ImportError::TaskNotFound { task_id })?;
        let plan = apply_deadline_change(&task.plan, change);

        conn.execute(
            "UPDATE tasks SET time_deadline = ?1, duration_deadline = ?2,
                              time_deadline_display = ?3, duration_deadline_minutes = ?4
             WHERE id = ?5",
            rusqlite::params![
                plan.time_deadline,
                plan.duration_deadline,
                plan.time_deadline_display,
                plan.duration_deadline_minutes,
                task_id,
            ],
        )
        .map_err(|e| from_rusqlite(e).with_op("update_deadline"))?;

        tracing::debug!(task_id, ?plan, "task deadline written");
        Ok(plan)
    }

    pub fn get_task(conn: &Connection, task_id: i64) -> Result<Option<Task>> {
        conn.query_row(
            "SELECT id, name, project_id, time_deadline, duration_deadline,
                    time_deadline_display, duration_deadline_minutes
             FROM tasks WHERE id = ?1",
            [task_id],
            |row| {
                Ok(Task {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    project_id: row.get(2)?,
                    plan: DeadlinePlan {
                        time_deadline: row.get(3)?,
                        duration_deadline: row.get(4)?,
                        time_deadline_display: row.get(5)?,
                        duration_deadline_minutes: row.get(6)?,
                    },
                })
            },
        )
        .optional()
        .map_err(from_rusqlite)
    }
}
