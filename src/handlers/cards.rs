//! Card handlers: creation, bulk import, deletion.

use axum::Json;
use axum::extract::{Path, State};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::domain::Card;
use crate::error::AppError;
use crate::state::AppState;

use super::CardView;

#[derive(Debug, Deserialize)]
pub struct CreateCardRequest {
  pub deck_id: i64,
  pub front: String,
  pub back: String,
  #[serde(default)]
  pub transcription: Option<String>,
  #[serde(default)]
  pub example: Option<String>,
  #[serde(default)]
  pub image_url: Option<String>,
}

impl CreateCardRequest {
  fn into_card(self) -> Card {
    let mut card = Card::new(self.deck_id, self.front, self.back);
    card.transcription = self.transcription;
    card.example = self.example;
    card.image_url = self.image_url;
    card
  }
}

#[derive(Debug, Deserialize)]
pub struct ImportCardsRequest {
  pub cards: Vec<CreateCardRequest>,
}

#[derive(Debug, Serialize)]
pub struct ImportCardsResponse {
  pub imported: usize,
  pub ids: Vec<i64>,
}

/// Cards may only live on deck-kind nodes; folders never own cards.
fn ensure_owning_deck(conn: &Connection, deck_id: i64) -> Result<(), AppError> {
  match db::get_node(conn, deck_id)? {
    None => Err(AppError::not_found(format!("deck {}", deck_id))),
    Some(node) if node.is_folder() => Err(AppError::invalid_state(
      "cards can only be added to decks, not folders",
    )),
    Some(_) => Ok(()),
  }
}

pub async fn create_card(
  State(state): State<AppState>,
  Json(req): Json<CreateCardRequest>,
) -> Result<Json<CardView>, AppError> {
  let mut conn = db::try_lock(&state.pool)?;
  ensure_owning_deck(&conn, req.deck_id)?;

  let id = db::insert_card(&conn, &req.into_card())?;
  db::recalculate_all(&mut conn)?;

  let card =
    db::get_card_by_id(&conn, id)?.ok_or_else(|| AppError::not_found(format!("card {}", id)))?;
  Ok(Json(card.into()))
}

pub async fn import_cards(
  State(state): State<AppState>,
  Json(req): Json<ImportCardsRequest>,
) -> Result<Json<ImportCardsResponse>, AppError> {
  let mut conn = db::try_lock(&state.pool)?;
  for card in &req.cards {
    ensure_owning_deck(&conn, card.deck_id)?;
  }

  let cards: Vec<Card> = req.cards.into_iter().map(|c| c.into_card()).collect();
  let ids = db::insert_cards(&mut conn, &cards)?;
  db::recalculate_all(&mut conn)?;

  Ok(Json(ImportCardsResponse {
    imported: ids.len(),
    ids,
  }))
}

pub async fn delete_card(
  State(state): State<AppState>,
  Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
  let mut conn = db::try_lock(&state.pool)?;
  let removed = db::delete_card(&conn, id)?;
  if removed == 0 {
    return Err(AppError::not_found(format!("card {}", id)));
  }
  db::recalculate_all(&mut conn)?;

  Ok(Json(serde_json::json!({ "deleted": id })))
}
