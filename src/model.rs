use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Row};

/// Schema version the code expects, stored in the sqlite user_version
/// pragma. A fresh database reports 0 and gets every step applied;
/// later versions would only get the steps they are missing.
const SCHEMA_VERSION: i64 = 1;

/// A single task, saved as a row in the tasks table.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: u32,
    pub name: String,
    pub completed: bool,
    pub priority: i64,
    pub pomodoro_sessions: u64,
    pub created_at: DateTime<Local>,
}

/// Initialize the task store, applying any schema steps the database
/// has not seen yet. Safe to call on every open.
pub fn init_store(db: &Connection) -> Result<()> {
    let version = schema_version(db)?;

    if version < 1 {
        db.execute(
            "CREATE TABLE tasks (
                  id                INTEGER PRIMARY KEY AUTOINCREMENT,
                  name              TEXT NOT NULL,
                  completed         INTEGER NOT NULL DEFAULT 0,
                  priority          INTEGER NOT NULL DEFAULT 1,
                  pomodoro_sessions INTEGER NOT NULL DEFAULT 0,
                  created_at        TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                  )",
            [],
        )
        .context("Failed to create tasks table.")?;
        db.execute_batch("PRAGMA user_version = 1")
            .context("Failed to record schema version.")?;
    }

    Ok(())
}

/// Read the schema version marker.
pub fn schema_version(db: &Connection) -> Result<i64> {
    let version = db
        .query_row("PRAGMA user_version", [], |row| row.get::<_, i64>(0))
        .context("Failed to read schema version from database.")?;
    // a database written by a newer pomo is left alone
    if version > SCHEMA_VERSION {
        anyhow::bail!(
            "Task store schema version {} is newer than this build supports.",
            version
        );
    }
    Ok(version)
}

/// Add a task and return the stored row, so callers can append it to
/// an in-memory view without a full reload. A name that trims to
/// nothing inserts nothing and returns None.
pub fn add_task(db: &Connection, name: &str, priority: i64) -> Result<Option<Task>> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(None);
    }

    db.execute(
        "INSERT INTO tasks (name, priority) VALUES (?1, ?2)",
        params![name, priority],
    )
    .context("Failed to insert task into database.")?;

    let task = db
        .query_row(
            "SELECT id, name, completed, priority, pomodoro_sessions, created_at FROM tasks WHERE id = ?1",
            params![db.last_insert_rowid()],
            |row| task_from_row(row),
        )
        .context("Failed to fetch the inserted task back from database.")?;

    Ok(Some(task))
}

/// Get all tasks, most urgent first, oldest first within a priority.
pub fn list_tasks(db: &Connection) -> Result<Vec<Task>> {
    let mut stmt = db
        .prepare("SELECT id, name, completed, priority, pomodoro_sessions, created_at FROM tasks ORDER BY priority DESC, created_at ASC")
        .context("Failed to query tasks from database.")?;
    let mapped_rows = stmt.query_map([], |row| {
        return task_from_row(row);
    })?;

    let mut tasks = Vec::new();
    for task in mapped_rows {
        tasks.push(task?);
    }

    Ok(tasks)
}

/// Return a task from a row in this order: [id, name, completed,
/// priority, pomodoro_sessions, created_at]
fn task_from_row(row: &Row) -> rusqlite::Result<Task> {
    let task = Task {
        id: row.get(0)?,
        name: row.get(1)?,
        // the store keeps booleans as 0/1 integers
        completed: row.get::<_, i64>(2)? != 0,
        priority: row.get(3)?,
        pomodoro_sessions: row.get::<_, i64>(4)? as u64,
        created_at: row.get::<_, DateTime<Local>>(5)?,
    };
    return Ok(task);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_test_store() -> Connection {
        let db = Connection::open_in_memory().unwrap();
        init_store(&db).unwrap();
        db
    }

    #[test]
    fn init_sets_the_schema_version_once() {
        let db = Connection::open_in_memory().unwrap();
        assert_eq!(schema_version(&db).unwrap(), 0);
        init_store(&db).unwrap();
        assert_eq!(schema_version(&db).unwrap(), 1);
        // re-running is a no-op, not a failed CREATE TABLE
        init_store(&db).unwrap();
        assert_eq!(schema_version(&db).unwrap(), 1);
    }

    #[test]
    fn a_version_from_the_future_is_refused() {
        let db = Connection::open_in_memory().unwrap();
        db.execute_batch("PRAGMA user_version = 99").unwrap();
        assert!(init_store(&db).is_err());
    }

    #[test]
    fn empty_and_blank_names_insert_nothing() {
        let db = open_test_store();
        assert!(add_task(&db, "", 1).unwrap().is_none());
        assert!(add_task(&db, "   ", 1).unwrap().is_none());
        assert!(list_tasks(&db).unwrap().is_empty());
    }

    #[test]
    fn added_tasks_come_back_with_store_defaults() {
        let db = open_test_store();
        let task = add_task(&db, "  Write the intro  ", 3).unwrap().unwrap();
        assert_eq!(task.name, "Write the intro");
        assert_eq!(task.priority, 3);
        assert!(!task.completed);
        assert_eq!(task.pomodoro_sessions, 0);

        let listed = list_tasks(&db).unwrap();
        assert_eq!(listed, vec![task]);
    }

    #[test]
    fn tasks_are_ordered_by_priority_then_age() {
        let db = open_test_store();
        // explicit timestamps so the ordering does not depend on the
        // one-second resolution of CURRENT_TIMESTAMP
        db.execute(
            "INSERT INTO tasks (name, priority, created_at) VALUES
                 ('old low', 1, '2026-08-01 10:00:00'),
                 ('new low', 1, '2026-08-02 10:00:00'),
                 ('urgent', 5, '2026-08-03 10:00:00')",
            [],
        )
        .unwrap();

        let names: Vec<String> = list_tasks(&db)
            .unwrap()
            .into_iter()
            .map(|task| task.name)
            .collect();
        assert_eq!(names, vec!["urgent", "old low", "new low"]);
    }

    #[test]
    fn higher_priority_inserts_sort_before_existing_tasks() {
        let db = open_test_store();
        add_task(&db, "errands", 1).unwrap();
        add_task(&db, "Write the intro", 3).unwrap();

        let tasks = list_tasks(&db).unwrap();
        assert_eq!(tasks[0].name, "Write the intro");
        assert_eq!(tasks[1].name, "errands");
    }

    #[test]
    fn completed_flag_is_normalized_from_integers() {
        let db = open_test_store();
        db.execute(
            "INSERT INTO tasks (name, completed) VALUES ('done', 1), ('open', 0)",
            [],
        )
        .unwrap();

        let tasks = list_tasks(&db).unwrap();
        let done = tasks.iter().find(|task| task.name == "done").unwrap();
        let open = tasks.iter().find(|task| task.name == "open").unwrap();
        assert!(done.completed);
        assert!(!open.completed);
    }
}
