use crate::Database;
use crate::models::{MessageRow, TreeRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, ErrorCode, Row, ffi};

impl Database {
    // -- Users --

    /// Insert a user. Returns `false` without writing when the username is
    /// already taken, including when a concurrent insert won the race.
    pub fn create_user(&self, id: &str, username: &str, password: &str) -> Result<bool> {
        self.with_conn(|conn| {
            match conn.execute(
                "INSERT INTO users (id, username, password) VALUES (?1, ?2, ?3)",
                (id, username, password),
            ) {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(e, msg))
                    if is_username_taken(&e, msg.as_deref()) =>
                {
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, username, password FROM users WHERE username = ?1",
                [username],
                user_from_row,
            )
            .optional()
        })
    }

    /// Exact, case-sensitive match on both fields.
    pub fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, username, password FROM users WHERE username = ?1 AND password = ?2",
                [username, password],
                user_from_row,
            )
            .optional()
        })
    }

    pub fn count_users(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(n as u64)
        })
    }

    // -- Trees --

    pub fn insert_tree(&self, tree: &TreeRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO trees (id, owner_id, name, pin, created_at, theme) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    tree.id,
                    tree.owner_id,
                    tree.name,
                    tree.pin,
                    tree.created_at,
                    tree.theme
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_tree(&self, id: &str) -> Result<Option<TreeRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, owner_id, name, pin, created_at, theme FROM trees WHERE id = ?1",
                [id],
                tree_from_row,
            )
            .optional()
        })
    }

    /// Newest first.
    pub fn get_trees_by_owner(&self, owner_id: &str) -> Result<Vec<TreeRow>> {
        self.with_conn(|conn| query_trees_by_owner(conn, owner_id))
    }

    // -- Messages --

    pub fn insert_message(&self, msg: &MessageRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, tree_id, content, sender, color, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    msg.id,
                    msg.tree_id,
                    msg.content,
                    msg.sender,
                    msg.color,
                    msg.created_at
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_message(&self, id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, tree_id, content, sender, color, created_at FROM messages WHERE id = ?1",
                [id],
                message_from_row,
            )
            .optional()
        })
    }

    /// Newest first.
    pub fn get_messages_by_tree(&self, tree_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_messages_by_tree(conn, tree_id))
    }

    /// Returns the number of rows removed (0 or 1).
    pub fn delete_message(&self, id: &str) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM messages WHERE id = ?1", [id])?))
    }
}

/// Only the UNIQUE index on `users.username`; primary-key and NOT NULL
/// violations are real errors.
fn is_username_taken(e: &ffi::Error, msg: Option<&str>) -> bool {
    e.code == ErrorCode::ConstraintViolation
        && e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
        && msg.is_some_and(|m| m.contains("users.username"))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
    })
}

fn tree_from_row(row: &Row<'_>) -> rusqlite::Result<TreeRow> {
    Ok(TreeRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        pin: row.get(3)?,
        created_at: row.get(4)?,
        theme: row.get(5)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        tree_id: row.get(1)?,
        content: row.get(2)?,
        sender: row.get(3)?,
        color: row.get(4)?,
        created_at: row.get(5)?,
    })
}

// rowid breaks createdAt ties so equal timestamps still list newest insert first.

fn query_trees_by_owner(conn: &Connection, owner_id: &str) -> Result<Vec<TreeRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, name, pin, created_at, theme
         FROM trees
         WHERE owner_id = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt
        .query_map([owner_id], tree_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_messages_by_tree(conn: &Connection, tree_id: &str) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, tree_id, content, sender, color, created_at
         FROM messages
         WHERE tree_id = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt
        .query_map([tree_id], message_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
