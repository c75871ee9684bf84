use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Idempotent bootstrap. Identifier columns referencing other tables are plain
/// text with no foreign keys: writes naming a missing owner or tree are accepted.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS trees (
            id          TEXT PRIMARY KEY,
            owner_id    TEXT NOT NULL,
            name        TEXT NOT NULL,
            pin         TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            theme       TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_trees_owner
            ON trees(owner_id, created_at);

        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            tree_id     TEXT NOT NULL,
            content     TEXT NOT NULL,
            sender      TEXT NOT NULL,
            color       TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_tree
            ON messages(tree_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
