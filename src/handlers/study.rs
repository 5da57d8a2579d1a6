//! Study session handlers: the quiz lifecycle over the session registry.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::domain::{Card, ReviewFeedback};
use crate::error::AppError;
use crate::hierarchy;
use crate::srs::{CardSelector, QuizSession, SessionPhase, StudyMode, generate_guess_options};
use crate::state::AppState;
use crate::validation;

use super::CardView;

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
  pub scope_id: i64,
  #[serde(default)]
  pub selector: Option<String>,
  #[serde(default)]
  pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
  pub feedback: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckAnswerRequest {
  pub answer: String,
}

/// The front side of the card currently being asked. The back stays on the
/// server; multiple-choice clients get it hidden among the options.
#[derive(Debug, Serialize)]
pub struct CurrentCard {
  pub id: i64,
  pub front: String,
  pub transcription: Option<String>,
  pub example: Option<String>,
  pub image_url: Option<String>,
  pub options: Vec<String>,
  pub time_limit_seconds: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
  pub session_id: String,
  pub scope_id: i64,
  pub mode: StudyMode,
  pub selector: CardSelector,
  pub phase: SessionPhase,
  pub remaining: usize,
  pub current: Option<CurrentCard>,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
  pub card: CardView,
  pub requeued: bool,
  pub session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct CheckAnswerResponse {
  pub accepted: bool,
}

fn snapshot(session_id: String, session: &QuizSession, scope_cards: &[Card]) -> SessionSnapshot {
  let current = session.current().map(|card| CurrentCard {
    id: card.id,
    front: card.front.clone(),
    transcription: card.transcription.clone(),
    example: card.example.clone(),
    image_url: card.image_url.clone(),
    options: generate_guess_options(card, scope_cards),
    time_limit_seconds: session.time_limit_seconds(),
  });

  SessionSnapshot {
    session_id,
    scope_id: session.scope_id,
    mode: session.mode,
    selector: session.selector,
    phase: session.phase(),
    remaining: session.remaining(),
    current,
  }
}

pub async fn start_session(
  State(state): State<AppState>,
  Json(req): Json<StartSessionRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
  let selector = match req.selector.as_deref() {
    None | Some("") => CardSelector::default(),
    Some(s) => CardSelector::from_str(s)
      .ok_or_else(|| AppError::invalid_state(format!("unknown card selector '{}'", s)))?,
  };
  let mode = match req.mode.as_deref() {
    None | Some("") => StudyMode::Sr,
    Some(s) => StudyMode::from_str(s)
      .ok_or_else(|| AppError::invalid_state(format!("unknown study mode '{}'", s)))?,
  };

  let conn = db::try_lock(&state.pool)?;
  let scope_cards = hierarchy::cards_in_scope(&conn, req.scope_id);
  drop(conn);

  let session = QuizSession::start(req.scope_id, scope_cards.clone(), selector, mode);
  let session_id = state.sessions.insert(session.clone());
  tracing::debug!(
    "started {} session {} over scope {} with {} cards",
    mode.as_str(),
    session_id,
    req.scope_id,
    session.remaining()
  );

  Ok(Json(snapshot(session_id, &session, &scope_cards)))
}

pub async fn get_session(
  State(state): State<AppState>,
  Path(sid): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
  let session = state
    .sessions
    .with_session(&sid, |s| s.clone())
    .ok_or_else(|| AppError::not_found(format!("session {}", sid)))?;

  let conn = db::try_lock(&state.pool)?;
  let scope_cards = hierarchy::cards_in_scope(&conn, session.scope_id);

  Ok(Json(snapshot(sid, &session, &scope_cards)))
}

pub async fn answer_card(
  State(state): State<AppState>,
  Path(sid): Path<String>,
  Json(req): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
  let feedback = ReviewFeedback::from_str(&req.feedback)
    .ok_or_else(|| AppError::invalid_state(format!("unknown feedback '{}'", req.feedback)))?;

  let mut conn = db::try_lock(&state.pool)?;
  let (outcome, session) = state
    .sessions
    .with_session(&sid, |s| {
      s.answer(&mut conn, feedback).map(|o| (o, s.clone()))
    })
    .ok_or_else(|| AppError::not_found(format!("session {}", sid)))??;

  // The answer moved the card's due date, so the roll-ups are stale
  db::recalculate_all(&mut conn)?;

  let scope_cards = hierarchy::cards_in_scope(&conn, session.scope_id);
  Ok(Json(AnswerResponse {
    card: outcome.card.into(),
    requeued: outcome.requeued,
    session: snapshot(sid, &session, &scope_cards),
  }))
}

pub async fn check_answer(
  State(state): State<AppState>,
  Path(sid): Path<String>,
  Json(req): Json<CheckAnswerRequest>,
) -> Result<Json<CheckAnswerResponse>, AppError> {
  let current_back = state
    .sessions
    .with_session(&sid, |s| s.current().map(|c| c.back.clone()))
    .ok_or_else(|| AppError::not_found(format!("session {}", sid)))?;

  let back =
    current_back.ok_or_else(|| AppError::invalid_state("session is already complete"))?;

  Ok(Json(CheckAnswerResponse {
    accepted: validation::answer_matches(&req.answer, &back),
  }))
}

pub async fn end_session(
  State(state): State<AppState>,
  Path(sid): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
  state
    .sessions
    .remove(&sid)
    .ok_or_else(|| AppError::not_found(format!("session {}", sid)))?;

  Ok(Json(serde_json::json!({ "ended": sid })))
}
