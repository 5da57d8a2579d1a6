//! Quiz session controller.
//!
//! A session owns an explicit deque of cards. Answering the front card runs
//! it through SM-2 and commits the update (card + review log) atomically;
//! a forgotten card is requeued at the tail for re-drill within the same
//! session, which is independent of its global due-date scheduling. The
//! session is complete exactly when the deque is empty.

use std::collections::VecDeque;

use chrono::Utc;
use rand::seq::SliceRandom;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::db;
use crate::domain::{Card, ReviewFeedback, ReviewLog};
use crate::error::AppError;
use crate::srs::sm2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyMode {
  /// Spaced repetition: selector-filtered cards, uniformly shuffled.
  Sr,
  /// Everything in scope, new cards first, no shuffle.
  Simple,
  /// Due cards under a per-card countdown; timeouts count as forgotten.
  Blitz,
}

impl StudyMode {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "sr" => Some(Self::Sr),
      "simple" => Some(Self::Simple),
      "blitz" => Some(Self::Blitz),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Sr => "sr",
      Self::Simple => "simple",
      Self::Blitz => "blitz",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardSelector {
  New,
  ReviewAll,
  #[default]
  Due,
}

impl CardSelector {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "new" => Some(Self::New),
      "review_all" => Some(Self::ReviewAll),
      "due" => Some(Self::Due),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::New => "new",
      Self::ReviewAll => "review_all",
      Self::Due => "due",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
  Active,
  Complete,
}

/// Result of answering the current card.
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
  /// The card with its updated scheduling state.
  pub card: Card,
  /// Whether the card went back to the tail of the queue.
  pub requeued: bool,
  pub remaining: usize,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
  pub scope_id: i64,
  pub mode: StudyMode,
  pub selector: CardSelector,
  queue: VecDeque<Card>,
}

impl QuizSession {
  /// Build the session queue from the scope's flattened card set.
  pub fn start(scope_id: i64, cards: Vec<Card>, selector: CardSelector, mode: StudyMode) -> Self {
    let now = Utc::now();
    let mut selected: Vec<Card> = match mode {
      StudyMode::Sr => cards
        .into_iter()
        .filter(|c| match selector {
          CardSelector::New => c.is_new(),
          CardSelector::ReviewAll => !c.is_new(),
          CardSelector::Due => c.is_due(now),
        })
        .collect(),
      StudyMode::Simple => cards,
      StudyMode::Blitz => cards.into_iter().filter(|c| c.is_due(now)).collect(),
    };

    match mode {
      StudyMode::Sr | StudyMode::Blitz => {
        selected.shuffle(&mut rand::rng());
      }
      StudyMode::Simple => {
        // New cards first, otherwise keep the incoming order
        selected.sort_by_key(|c| !c.is_new());
      }
    }

    Self {
      scope_id,
      mode,
      selector,
      queue: VecDeque::from(selected),
    }
  }

  pub fn current(&self) -> Option<&Card> {
    self.queue.front()
  }

  pub fn remaining(&self) -> usize {
    self.queue.len()
  }

  pub fn phase(&self) -> SessionPhase {
    if self.queue.is_empty() {
      SessionPhase::Complete
    } else {
      SessionPhase::Active
    }
  }

  /// Countdown for the current card; only blitz sessions are timed.
  pub fn time_limit_seconds(&self) -> Option<u32> {
    match self.mode {
      StudyMode::Blitz => Some(config::BLITZ_SECONDS),
      _ => None,
    }
  }

  /// Answer the current card. The scheduling update and the review log are
  /// committed in one transaction before the queue is touched, so an
  /// abandoned session never loses recorded progress.
  pub fn answer(
    &mut self,
    conn: &mut Connection,
    feedback: ReviewFeedback,
  ) -> Result<AnswerOutcome, AppError> {
    let Some(mut card) = self.queue.pop_front() else {
      return Err(AppError::invalid_state("session is already complete"));
    };

    let quality = feedback.to_quality();
    let result = sm2::calculate_sm2(
      quality,
      card.ease_factor,
      card.interval_days,
      card.repetitions,
    );
    card.ease_factor = result.ease_factor;
    card.interval_days = result.interval_days;
    card.repetitions = result.repetitions;
    card.due_date = result.due_date;

    let tx = conn.transaction()?;
    db::update_card_after_review(
      &tx,
      card.id,
      card.ease_factor,
      card.interval_days,
      card.repetitions,
      card.due_date,
    )?;
    db::insert_review_log(&tx, &ReviewLog::new(card.id, quality, feedback.is_correct()))?;
    tx.commit()?;

    // Session-local re-drill: failed cards go to the tail, unless this was
    // the only card left (nothing to interleave with)
    let requeued = !feedback.is_correct() && !self.queue.is_empty();
    if requeued {
      self.queue.push_back(card.clone());
    }

    Ok(AnswerOutcome {
      card,
      requeued,
      remaining: self.queue.len(),
    })
  }
}

/// Multiple-choice options for a card: up to three distractors sampled from
/// the other cards in scope, padded with placeholders when the scope is too
/// small, with the correct answer at a random position.
pub fn generate_guess_options(card: &Card, scope: &[Card]) -> Vec<String> {
  let correct = card.back.clone();
  let mut rng = rand::rng();

  let mut distractors: Vec<String> = scope
    .iter()
    .filter(|c| c.id != card.id && c.back != correct)
    .map(|c| c.back.clone())
    .collect();
  distractors.sort();
  distractors.dedup();
  distractors.shuffle(&mut rng);
  distractors.truncate(config::DISTRACTOR_COUNT);

  let mut width = 1;
  while distractors.len() < config::DISTRACTOR_COUNT {
    let placeholder = config::DISTRACTOR_PLACEHOLDER.repeat(width);
    width += 1;
    if placeholder != correct && !distractors.contains(&placeholder) {
      distractors.push(placeholder);
    }
  }

  let mut options = vec![correct];
  options.extend(distractors);
  options.shuffle(&mut rng);
  options
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::cards::{get_card_by_id, insert_card, list_cards_for_deck};
  use crate::db::decks::insert_node;
  use crate::db::reviews::list_review_logs_for_card;
  use crate::domain::{DeckNode, NodeKind};
  use crate::testing::TestEnv;
  use chrono::Duration;

  fn seed_due_cards(env: &TestEnv, deck_id: i64, count: usize) -> Vec<Card> {
    for i in 0..count {
      let mut card = Card::new(deck_id, format!("front {}", i), format!("back {}", i));
      card.due_date = Utc::now() - Duration::minutes(5);
      insert_card(&env.conn, &card).unwrap();
    }
    list_cards_for_deck(&env.conn, deck_id).unwrap()
  }

  #[test]
  fn test_full_session_scenario() {
    let mut env = TestEnv::new().unwrap();
    let deck_id = env.seed_deck("Scenario");
    let cards = seed_due_cards(&env, deck_id, 3);

    let mut session =
      QuizSession::start(deck_id, cards, CardSelector::Due, StudyMode::Sr);
    assert_eq!(session.remaining(), 3);
    assert_eq!(session.phase(), SessionPhase::Active);

    // Forget the first card: it is requeued to the tail, queue stays at 3,
    // and its schedule resets to one day out
    let first_id = session.current().unwrap().id;
    let outcome = session.answer(&mut env.conn, ReviewFeedback::Forgot).unwrap();
    assert!(outcome.requeued);
    assert_eq!(session.remaining(), 3);
    assert_eq!(outcome.card.interval_days, 1);

    let stored = get_card_by_id(&env.conn, first_id).unwrap().unwrap();
    assert_eq!(stored.interval_days, 1);
    assert_eq!(stored.repetitions, 0);
    let tomorrow = Utc::now() + Duration::days(1);
    assert!((stored.due_date - tomorrow).num_minutes().abs() < 5);

    // Remember the two other cards
    session.answer(&mut env.conn, ReviewFeedback::Remembered).unwrap();
    session.answer(&mut env.conn, ReviewFeedback::Remembered).unwrap();
    assert_eq!(session.remaining(), 1);
    assert_eq!(session.current().unwrap().id, first_id);

    // Remember the requeued card: session completes
    session.answer(&mut env.conn, ReviewFeedback::Remembered).unwrap();
    assert_eq!(session.remaining(), 0);
    assert_eq!(session.phase(), SessionPhase::Complete);
  }

  #[test]
  fn test_single_card_forgot_is_not_requeued() {
    let mut env = TestEnv::new().unwrap();
    let deck_id = env.seed_deck("Single");
    let cards = seed_due_cards(&env, deck_id, 1);

    let mut session = QuizSession::start(deck_id, cards, CardSelector::Due, StudyMode::Sr);
    let outcome = session.answer(&mut env.conn, ReviewFeedback::Forgot).unwrap();
    assert!(!outcome.requeued);
    assert_eq!(session.phase(), SessionPhase::Complete);
  }

  #[test]
  fn test_answer_after_complete_is_rejected() {
    let mut env = TestEnv::new().unwrap();
    let mut session = QuizSession::start(1, vec![], CardSelector::Due, StudyMode::Sr);
    assert_eq!(session.phase(), SessionPhase::Complete);

    let err = session.answer(&mut env.conn, ReviewFeedback::Remembered).unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
  }

  #[test]
  fn test_selector_new_filters_unstudied() {
    let mut cards = vec![
      Card::new(1, "a".into(), "1".into()),
      Card::new(1, "b".into(), "2".into()),
    ];
    cards[1].interval_days = 4;

    let session = QuizSession::start(1, cards, CardSelector::New, StudyMode::Sr);
    assert_eq!(session.remaining(), 1);
    assert!(session.current().unwrap().is_new());
  }

  #[test]
  fn test_selector_review_all_filters_studied() {
    let mut cards = vec![
      Card::new(1, "a".into(), "1".into()),
      Card::new(1, "b".into(), "2".into()),
    ];
    // Studied but not due for a while
    cards[0].interval_days = 10;
    cards[0].due_date = Utc::now() + Duration::days(9);

    let session = QuizSession::start(1, cards, CardSelector::ReviewAll, StudyMode::Sr);
    assert_eq!(session.remaining(), 1);
    assert_eq!(session.current().unwrap().interval_days, 10);
  }

  #[test]
  fn test_selector_due_ignores_future_cards() {
    let mut cards = vec![
      Card::new(1, "a".into(), "1".into()),
      Card::new(1, "b".into(), "2".into()),
    ];
    cards[1].due_date = Utc::now() + Duration::days(3);

    let session = QuizSession::start(1, cards, CardSelector::Due, StudyMode::Sr);
    assert_eq!(session.remaining(), 1);
  }

  #[test]
  fn test_simple_mode_puts_new_cards_first_stably() {
    let mut cards = Vec::new();
    for i in 0..6 {
      let mut card = Card::new(1, format!("f{}", i), format!("b{}", i));
      card.id = i as i64;
      if i % 2 == 0 {
        card.interval_days = 3;
      }
      cards.push(card);
    }

    let session = QuizSession::start(1, cards, CardSelector::Due, StudyMode::Simple);
    let ids: Vec<i64> = session.queue.iter().map(|c| c.id).collect();
    // Odd ids are new and keep their relative order, then studied even ids
    assert_eq!(ids, vec![1, 3, 5, 0, 2, 4]);
  }

  #[test]
  fn test_simple_mode_keeps_future_cards() {
    let mut card = Card::new(1, "a".into(), "1".into());
    card.interval_days = 8;
    card.due_date = Utc::now() + Duration::days(8);

    let session = QuizSession::start(1, vec![card], CardSelector::Due, StudyMode::Simple);
    assert_eq!(session.remaining(), 1);
  }

  #[test]
  fn test_blitz_filters_due_and_is_timed() {
    let mut cards = vec![
      Card::new(1, "a".into(), "1".into()),
      Card::new(1, "b".into(), "2".into()),
    ];
    cards[1].due_date = Utc::now() + Duration::days(1);

    let session = QuizSession::start(1, cards, CardSelector::Due, StudyMode::Blitz);
    assert_eq!(session.remaining(), 1);
    assert_eq!(session.time_limit_seconds(), Some(config::BLITZ_SECONDS));

    let untimed = QuizSession::start(1, vec![], CardSelector::Due, StudyMode::Sr);
    assert_eq!(untimed.time_limit_seconds(), None);
  }

  #[test]
  fn test_blitz_timeout_schedules_like_forgot() {
    let mut env = TestEnv::new().unwrap();
    let deck_id = env.seed_deck("Blitz");
    let cards = seed_due_cards(&env, deck_id, 2);

    let mut session = QuizSession::start(deck_id, cards, CardSelector::Due, StudyMode::Blitz);
    let outcome = session.answer(&mut env.conn, ReviewFeedback::Timeout).unwrap();
    assert!(outcome.requeued);
    assert_eq!(outcome.card.interval_days, 1);
    assert_eq!(outcome.card.repetitions, 0);
  }

  #[test]
  fn test_answer_writes_review_log() {
    let mut env = TestEnv::new().unwrap();
    let deck_id = env.seed_deck("Logs");
    let cards = seed_due_cards(&env, deck_id, 2);
    let first_id = cards[0].id;

    let mut session =
      QuizSession::start(deck_id, cards, CardSelector::Due, StudyMode::Simple);
    session.answer(&mut env.conn, ReviewFeedback::Remembered).unwrap();

    let logs = list_review_logs_for_card(&env.conn, first_id).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].quality, 4);
    assert!(logs[0].is_correct);
  }

  #[test]
  fn test_remembered_card_progresses_in_store() {
    let mut env = TestEnv::new().unwrap();
    let deck_id = env.seed_deck("Progress");
    let cards = seed_due_cards(&env, deck_id, 1);
    let id = cards[0].id;

    let mut session =
      QuizSession::start(deck_id, cards, CardSelector::Due, StudyMode::Simple);
    session.answer(&mut env.conn, ReviewFeedback::Remembered).unwrap();

    let stored = get_card_by_id(&env.conn, id).unwrap().unwrap();
    assert_eq!(stored.interval_days, 1);
    assert_eq!(stored.repetitions, 1);
  }

  #[test]
  fn test_scope_spanning_session_from_folder() {
    let mut env = TestEnv::new().unwrap();
    let top = insert_node(
      &env.conn,
      &DeckNode::new("Top".into(), NodeKind::Folder, None),
    )
    .unwrap();
    let deck_a = insert_node(
      &env.conn,
      &DeckNode::new("A".into(), NodeKind::Deck, Some(top)),
    )
    .unwrap();
    let deck_b = insert_node(
      &env.conn,
      &DeckNode::new("B".into(), NodeKind::Deck, Some(top)),
    )
    .unwrap();
    seed_due_cards(&env, deck_a, 2);
    seed_due_cards(&env, deck_b, 1);

    let cards = crate::hierarchy::cards_in_scope(&env.conn, top);
    let mut session = QuizSession::start(top, cards, CardSelector::Due, StudyMode::Sr);
    assert_eq!(session.remaining(), 3);

    session.answer(&mut env.conn, ReviewFeedback::Remembered).unwrap();
    assert_eq!(session.remaining(), 2);
  }

  // Guess option tests

  fn card_with_back(id: i64, back: &str) -> Card {
    let mut card = Card::new(1, format!("front {}", id), back.to_string());
    card.id = id;
    card
  }

  #[test]
  fn test_guess_options_single_card_scope_pads() {
    let card = card_with_back(1, "answer");
    let scope = vec![card.clone()];

    let options = generate_guess_options(&card, &scope);
    assert_eq!(options.len(), config::GUESS_OPTION_COUNT);
    assert!(options.contains(&"answer".to_string()));

    let mut unique = options.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), options.len());
  }

  #[test]
  fn test_guess_options_include_correct_answer() {
    let card = card_with_back(1, "dog");
    let scope = vec![
      card.clone(),
      card_with_back(2, "cat"),
      card_with_back(3, "bird"),
      card_with_back(4, "fish"),
      card_with_back(5, "horse"),
    ];

    let options = generate_guess_options(&card, &scope);
    assert_eq!(options.len(), config::GUESS_OPTION_COUNT);
    assert!(options.contains(&"dog".to_string()));
  }

  #[test]
  fn test_guess_options_deduplicate_backs() {
    let card = card_with_back(1, "dog");
    // Every other card has the same answer text
    let scope = vec![
      card.clone(),
      card_with_back(2, "cat"),
      card_with_back(3, "cat"),
      card_with_back(4, "cat"),
    ];

    let options = generate_guess_options(&card, &scope);
    assert_eq!(options.len(), config::GUESS_OPTION_COUNT);
    let cats = options.iter().filter(|o| *o == "cat").count();
    assert_eq!(cats, 1);
  }

  #[test]
  fn test_guess_options_never_sample_correct_as_distractor() {
    let card = card_with_back(1, "dog");
    let scope = vec![card.clone(), card_with_back(2, "dog"), card_with_back(3, "cat")];

    let options = generate_guess_options(&card, &scope);
    let dogs = options.iter().filter(|o| *o == "dog").count();
    assert_eq!(dogs, 1);
  }

  // Mode and selector parsing

  #[test]
  fn test_mode_from_str() {
    assert_eq!(StudyMode::from_str("sr"), Some(StudyMode::Sr));
    assert_eq!(StudyMode::from_str("simple"), Some(StudyMode::Simple));
    assert_eq!(StudyMode::from_str("blitz"), Some(StudyMode::Blitz));
    assert_eq!(StudyMode::from_str("classic"), None);
  }

  #[test]
  fn test_selector_from_str_and_default() {
    assert_eq!(CardSelector::from_str("new"), Some(CardSelector::New));
    assert_eq!(CardSelector::from_str("review_all"), Some(CardSelector::ReviewAll));
    assert_eq!(CardSelector::from_str("due"), Some(CardSelector::Due));
    assert_eq!(CardSelector::from_str(""), None);
    assert_eq!(CardSelector::default(), CardSelector::Due);
  }

  #[test]
  fn test_mode_roundtrip() {
    for mode in [StudyMode::Sr, StudyMode::Simple, StudyMode::Blitz] {
      assert_eq!(StudyMode::from_str(mode.as_str()), Some(mode));
    }
  }
}
