//! Deck tree handlers: CRUD over nodes plus the read paths the study UI uses.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::domain::{DeckNode, NodeKind};
use crate::error::AppError;
use crate::hierarchy;
use crate::state::AppState;

use super::CardView;

#[derive(Debug, Deserialize)]
pub struct CreateNodeRequest {
  pub title: String,
  pub kind: String,
  pub parent_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RenameNodeRequest {
  pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveNodeRequest {
  pub parent_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DeleteNodeResponse {
  pub nodes_removed: usize,
  pub cards_removed: usize,
}

pub async fn list_decks(State(state): State<AppState>) -> Result<Json<Vec<DeckNode>>, AppError> {
  let conn = db::try_lock(&state.pool)?;
  Ok(Json(db::list_nodes(&conn)?))
}

pub async fn create_deck(
  State(state): State<AppState>,
  Json(req): Json<CreateNodeRequest>,
) -> Result<Json<DeckNode>, AppError> {
  let kind = NodeKind::from_str(&req.kind)
    .ok_or_else(|| AppError::invalid_state(format!("unknown node kind '{}'", req.kind)))?;

  let mut conn = db::try_lock(&state.pool)?;
  let id = db::insert_node(&conn, &DeckNode::new(req.title, kind, req.parent_id))?;
  db::recalculate_all(&mut conn)?;

  let node =
    db::get_node(&conn, id)?.ok_or_else(|| AppError::not_found(format!("deck node {}", id)))?;
  Ok(Json(node))
}

pub async fn rename_deck(
  State(state): State<AppState>,
  Path(id): Path<i64>,
  Json(req): Json<RenameNodeRequest>,
) -> Result<Json<DeckNode>, AppError> {
  let conn = db::try_lock(&state.pool)?;
  db::rename_node(&conn, id, &req.title)?;

  let node =
    db::get_node(&conn, id)?.ok_or_else(|| AppError::not_found(format!("deck node {}", id)))?;
  Ok(Json(node))
}

pub async fn move_deck(
  State(state): State<AppState>,
  Path(id): Path<i64>,
  Json(req): Json<MoveNodeRequest>,
) -> Result<Json<DeckNode>, AppError> {
  let mut conn = db::try_lock(&state.pool)?;
  db::move_node(&conn, id, req.parent_id)?;
  db::recalculate_all(&mut conn)?;

  let node =
    db::get_node(&conn, id)?.ok_or_else(|| AppError::not_found(format!("deck node {}", id)))?;
  Ok(Json(node))
}

pub async fn delete_deck(
  State(state): State<AppState>,
  Path(id): Path<i64>,
) -> Result<Json<DeleteNodeResponse>, AppError> {
  let mut conn = db::try_lock(&state.pool)?;
  let (nodes_removed, cards_removed) = db::delete_node_cascade(&mut conn, id)?;
  db::recalculate_all(&mut conn)?;

  Ok(Json(DeleteNodeResponse {
    nodes_removed,
    cards_removed,
  }))
}

/// Flattened card list for a deck or folder scope. Unknown scopes resolve to
/// an empty list, matching the resolver's hot-path semantics.
pub async fn list_cards_in_scope(
  State(state): State<AppState>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<CardView>>, AppError> {
  let conn = db::try_lock(&state.pool)?;
  let cards = hierarchy::cards_in_scope(&conn, id);
  Ok(Json(cards.into_iter().map(CardView::from).collect()))
}

pub async fn recompute_stats(State(state): State<AppState>) -> Result<Json<Vec<DeckNode>>, AppError> {
  let mut conn = db::try_lock(&state.pool)?;
  db::recalculate_all(&mut conn)?;
  Ok(Json(db::list_nodes(&conn)?))
}
