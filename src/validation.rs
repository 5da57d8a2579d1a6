//! Typed-answer acceptance for the quiz game variants.
//!
//! Input and expected answer are Unicode-normalized (NFC), lowercased and
//! whitespace-collapsed before comparison. Short answers must match exactly;
//! longer ones get a single character of typo tolerance.

use unicode_normalization::UnicodeNormalization;

/// Answers longer than this many characters get one edit of tolerance.
const FUZZY_MIN_CHARS: usize = 5;

fn normalize(input: &str) -> String {
  input
    .nfc()
    .collect::<String>()
    .to_lowercase()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

/// Check a typed answer against the card's correct answer.
pub fn answer_matches(user_input: &str, correct_answer: &str) -> bool {
  let input = normalize(user_input);
  let expected = normalize(correct_answer);

  if input.is_empty() || expected.is_empty() {
    return false;
  }

  let tolerance = if expected.chars().count() > FUZZY_MIN_CHARS {
    1
  } else {
    0
  };

  strsim::levenshtein(&input, &expected) <= tolerance
}
