use serde::{Deserialize, Serialize};

// -- Auth --

/// Body of both `POST /signup` and `POST /login`.
#[derive(Debug, Deserialize)]
pub struct UserAuthRequest {
    pub username: String,
    pub password: String,
}

/// Public view of a user; the password never leaves the server.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
}

// -- Trees --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTreeRequest {
    pub name: String,
    pub pin: String,
    pub owner_id: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub tree_id: String,
    pub content: String,
    pub sender: String,
    pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteMessageQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteMessageResponse {
    pub status: String,
    pub id: String,
}

// -- Misc --

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Error body shared by every failing route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
