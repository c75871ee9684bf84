use serde::{Deserialize, Serialize};

/// Default theme stamped onto every new tree.
pub const DEFAULT_THEME: &str = "classic";

/// A named collection of messages. The PIN is stored and returned in plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tree {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub pin: String,
    pub created_at: String,
    pub theme: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub tree_id: String,
    pub content: String,
    pub sender: String,
    pub color: String,
    pub created_at: String,
}
