use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;
use uuid::Uuid;

use deco_db::models::TreeRow;
use deco_types::api::CreateTreeRequest;
use deco_types::models::{DEFAULT_THEME, Tree};

use crate::clock::iso_timestamp;
use crate::error::ApiError;
use crate::state::{AppState, soft_read};

/// POST /trees. The owner id is taken on trust; no user lookup is made.
pub async fn create_tree(
    State(state): State<AppState>,
    Json(req): Json<CreateTreeRequest>,
) -> Result<Json<Tree>, ApiError> {
    let tree = Tree {
        id: Uuid::new_v4().to_string(),
        owner_id: req.owner_id,
        name: req.name,
        pin: req.pin,
        created_at: iso_timestamp(state.clock.now()),
        theme: DEFAULT_THEME.to_string(),
    };

    let row = TreeRow::from(&tree);
    state.with_db(move |db| db.insert_tree(&row)).await?;

    info!("Created tree {} for owner {}", tree.id, tree.owner_id);
    Ok(Json(tree))
}

pub async fn get_tree(
    State(state): State<AppState>,
    Path(tree_id): Path<String>,
) -> Result<Json<Tree>, ApiError> {
    let row = state
        .with_db(move |db| db.get_tree(&tree_id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Tree not found".into()))?;

    Ok(Json(row.into()))
}

/// GET /user-trees/{user_id} — newest first, empty on storage failure.
pub async fn get_user_trees(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Tree>>, ApiError> {
    let rows = state.with_db(move |db| db.get_trees_by_owner(&user_id)).await;
    let trees = soft_read(rows, "trees")?;

    Ok(Json(trees.into_iter().map(Tree::from).collect()))
}
