pub mod quiz;
pub mod sm2;

pub use quiz::{CardSelector, QuizSession, SessionPhase, StudyMode, generate_guess_options};
pub use sm2::{Sm2Result, calculate_sm2};
