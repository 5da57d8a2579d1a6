use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Binary feedback collected at the study UI boundary.
///
/// A blitz-mode timeout is reported as `Timeout` and scheduled exactly like
/// `Forgot`; the distinction is kept only for the review log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewFeedback {
  Forgot,
  Remembered,
  Timeout,
}

impl ReviewFeedback {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "forgot" => Some(Self::Forgot),
      "remembered" => Some(Self::Remembered),
      "timeout" => Some(Self::Timeout),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Forgot => "forgot",
      Self::Remembered => "remembered",
      Self::Timeout => "timeout",
    }
  }

  /// SM-2 quality rating for this feedback. The calculator accepts the full
  /// 0-5 range; the UI boundary only ever produces 2 and 4.
  pub fn to_quality(&self) -> u8 {
    match self {
      Self::Forgot | Self::Timeout => 2,
      Self::Remembered => 4,
    }
  }

  pub fn is_correct(&self) -> bool {
    matches!(self, Self::Remembered)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewLog {
  pub id: i64,
  pub card_id: i64,
  pub quality: u8,
  pub is_correct: bool,
  pub reviewed_at: DateTime<Utc>,
}

impl ReviewLog {
  pub fn new(card_id: i64, quality: u8, is_correct: bool) -> Self {
    Self {
      id: 0,
      card_id,
      quality,
      is_correct,
      reviewed_at: Utc::now(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_feedback_quality_mapping() {
    assert_eq!(ReviewFeedback::Forgot.to_quality(), 2);
    assert_eq!(ReviewFeedback::Remembered.to_quality(), 4);
    // Timeout schedules like a forgotten card
    assert_eq!(ReviewFeedback::Timeout.to_quality(), 2);
  }

  #[test]
  fn test_feedback_correctness() {
    assert!(!ReviewFeedback::Forgot.is_correct());
    assert!(ReviewFeedback::Remembered.is_correct());
    assert!(!ReviewFeedback::Timeout.is_correct());
  }

  #[test]
  fn test_feedback_from_str() {
    assert_eq!(ReviewFeedback::from_str("forgot"), Some(ReviewFeedback::Forgot));
    assert_eq!(ReviewFeedback::from_str("remembered"), Some(ReviewFeedback::Remembered));
    assert_eq!(ReviewFeedback::from_str("timeout"), Some(ReviewFeedback::Timeout));
    assert_eq!(ReviewFeedback::from_str("Remembered"), None);
    assert_eq!(ReviewFeedback::from_str(""), None);
  }

  #[test]
  fn test_feedback_roundtrip() {
    for fb in [
      ReviewFeedback::Forgot,
      ReviewFeedback::Remembered,
      ReviewFeedback::Timeout,
    ] {
      assert_eq!(ReviewFeedback::from_str(fb.as_str()), Some(fb));
    }
  }

  #[test]
  fn test_review_log_new() {
    let log = ReviewLog::new(42, 4, true);
    assert_eq!(log.id, 0);
    assert_eq!(log.card_id, 42);
    assert_eq!(log.quality, 4);
    assert!(log.is_correct);
  }
}
