use chrono::{DateTime, Duration, Utc};

use crate::domain::MASTERY_THRESHOLD;

const MIN_EASE_FACTOR: f64 = 1.3;

pub struct Sm2Result {
  pub ease_factor: f64,
  pub interval_days: i64,
  pub repetitions: i64,
  pub due_date: DateTime<Utc>,
  pub is_mastered: bool,
}

/// SM-2 update for a single review.
///
/// The success branch keys off the previous interval: a card that has never
/// been answered correctly (interval 0) starts at one day, the second success
/// jumps to six, afterwards the interval grows by the pre-update ease factor.
/// A failed review resets interval and repetitions but keeps the card's ease
/// history (subject to the 1.3 floor).
pub fn calculate_sm2(
  quality: u8,
  current_ease_factor: f64,
  current_interval: i64,
  current_repetitions: i64,
) -> Sm2Result {
  let q = quality.min(5) as f64;

  let (new_interval, new_repetitions) = if quality < 3 {
    // Failed review: reset progress
    (1, 0)
  } else {
    let interval = match current_interval {
      0 => 1,
      1 => 6,
      _ => ((current_interval as f64) * current_ease_factor).round() as i64,
    };
    (interval, current_repetitions + 1)
  };

  // EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), clamped at 1.3
  let ease_delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
  let new_ease_factor = (current_ease_factor + ease_delta).max(MIN_EASE_FACTOR);

  let due_date = Utc::now() + Duration::days(new_interval);

  Sm2Result {
    ease_factor: new_ease_factor,
    interval_days: new_interval,
    repetitions: new_repetitions,
    due_date,
    is_mastered: new_repetitions >= MASTERY_THRESHOLD,
  }
}
