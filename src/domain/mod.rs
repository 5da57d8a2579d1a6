pub mod card;
pub mod deck;
pub mod review;

pub use card::{Card, DEFAULT_EASE_FACTOR, MASTERY_THRESHOLD};
pub use deck::{DeckNode, NodeKind};
pub use review::{ReviewFeedback, ReviewLog};
