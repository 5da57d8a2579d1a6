use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repetition count at which a card counts as mastered.
pub const MASTERY_THRESHOLD: i64 = 5;

/// Default SM-2 ease factor for a brand new card.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
  pub id: i64,
  pub deck_id: i64,
  pub front: String,
  pub back: String,
  pub transcription: Option<String>,
  pub example: Option<String>,
  pub image_url: Option<String>,

  // SM-2 scheduling state
  pub ease_factor: f64,
  pub interval_days: i64,
  pub repetitions: i64,
  pub due_date: DateTime<Utc>,
}

impl Card {
  pub fn new(deck_id: i64, front: String, back: String) -> Self {
    Self {
      id: 0,
      deck_id,
      front,
      back,
      transcription: None,
      example: None,
      image_url: None,
      ease_factor: DEFAULT_EASE_FACTOR,
      interval_days: 0,
      repetitions: 0,
      due_date: Utc::now(),
    }
  }

  /// A card is mastered once it has accumulated enough consecutive
  /// successful reviews.
  pub fn is_mastered(&self) -> bool {
    self.repetitions >= MASTERY_THRESHOLD
  }

  /// A card is new until its first successful review.
  pub fn is_new(&self) -> bool {
    self.interval_days == 0
  }

  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    self.due_date <= now
  }
}
