//! Database row types — these map directly to SQLite rows.
//! Distinct from deco-types API models to keep the DB layer independent.

use deco_types::models::{Message, Tree};

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
}

pub struct TreeRow {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub pin: String,
    pub created_at: String,
    pub theme: String,
}

pub struct MessageRow {
    pub id: String,
    pub tree_id: String,
    pub content: String,
    pub sender: String,
    pub color: String,
    pub created_at: String,
}

impl From<TreeRow> for Tree {
    fn from(row: TreeRow) -> Self {
        Tree {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            pin: row.pin,
            created_at: row.created_at,
            theme: row.theme,
        }
    }
}

impl From<&Tree> for TreeRow {
    fn from(tree: &Tree) -> Self {
        TreeRow {
            id: tree.id.clone(),
            owner_id: tree.owner_id.clone(),
            name: tree.name.clone(),
            pin: tree.pin.clone(),
            created_at: tree.created_at.clone(),
            theme: tree.theme.clone(),
        }
    }
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            tree_id: row.tree_id,
            content: row.content,
            sender: row.sender,
            color: row.color,
            created_at: row.created_at,
        }
    }
}

impl From<&Message> for MessageRow {
    fn from(msg: &Message) -> Self {
        MessageRow {
            id: msg.id.clone(),
            tree_id: msg.tree_id.clone(),
            content: msg.content.clone(),
            sender: msg.sender.clone(),
            color: msg.color.clone(),
            created_at: msg.created_at.clone(),
        }
    }
}
