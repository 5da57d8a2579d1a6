//! JSON handlers for the deck tree, cards and study sessions.

pub mod cards;
pub mod decks;
pub mod study;

use axum::Router;
use axum::routing::{delete, get, patch, post};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::domain::Card;
use crate::state::AppState;

/// Card as rendered to the collaborator, with the derived mastery flag.
#[derive(Debug, Serialize)]
pub struct CardView {
  #[serde(flatten)]
  pub card: Card,
  pub is_mastered: bool,
}

impl From<Card> for CardView {
  fn from(card: Card) -> Self {
    let is_mastered = card.is_mastered();
    Self { card, is_mastered }
  }
}

pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/decks", get(decks::list_decks).post(decks::create_deck))
    .route(
      "/decks/{id}",
      patch(decks::rename_deck).delete(decks::delete_deck),
    )
    .route("/decks/{id}/move", post(decks::move_deck))
    .route("/decks/{id}/cards", get(decks::list_cards_in_scope))
    .route("/cards", post(cards::create_card))
    .route("/cards/import", post(cards::import_cards))
    .route("/cards/{id}", delete(cards::delete_card))
    .route("/stats/recompute", post(decks::recompute_stats))
    .route("/study/start", post(study::start_session))
    .route("/study/{sid}", get(study::get_session))
    .route("/study/{sid}/answer", post(study::answer_card))
    .route("/study/{sid}/check", post(study::check_answer))
    .route("/study/{sid}/end", post(study::end_session))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
