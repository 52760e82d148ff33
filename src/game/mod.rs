//! The quiz: catalog, rounds, the state machine and its async runner.
//!
//! # Architecture
//!
//! ```text
//! LearnerInput (mpsc)
//!        │
//!        ▼
//! SessionRunner::run()            ← async tokio task
//!        │   Event
//!        ├──────────▶ Session::handle()  (pure)
//!        │                 │ Vec<Effect>
//!        │◀────────────────┘
//!        ├─ FetchRiddle      → spawn RiddleGenerator::generate → RiddleReady
//!        ├─ Speak            → spawn SpeechOutput::speak       → AudioSettled
//!        ├─ ScheduleAdvance  → spawn sleep                     → AdvanceElapsed
//!        ├─ DealRound        → Round::deal (inline)            → RoundDealt
//!        └─ Finish           → return SessionSummary
//!
//! SessionView (mpsc, try_send) ──▶ front end
//! ```

pub mod catalog;
pub mod round;
pub mod runner;
pub mod session;
pub mod view;

use std::time::Duration;

use thiserror::Error;

use crate::config::GameConfig;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use catalog::{Animal, ANIMALS};
pub use round::{Answer, Round, OPTIONS_PER_ROUND};
pub use runner::{LearnerInput, SessionRunner, SessionSummary};
pub use session::{Effect, Event, Phase, Session};
pub use view::{OptionFeedback, OptionView, SessionView};

// ---------------------------------------------------------------------------
// GameError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum GameError {
    /// Not enough animals to fill a round's options.
    #[error("catalog has {have} animals, need at least {need}")]
    CatalogTooSmall { have: usize, need: usize },
}

// ---------------------------------------------------------------------------
// GameRules
// ---------------------------------------------------------------------------

/// Fixed parameters of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRules {
    pub total_rounds: u32,
    pub points_per_correct: u32,
    /// How long answer feedback stays up before the next round.
    pub advance_delay: Duration,
}

impl GameRules {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            total_rounds: config.total_rounds.max(1),
            points_per_correct: config.points_per_correct,
            advance_delay: Duration::from_millis(config.advance_delay_ms),
        }
    }

    /// Highest score a session can reach.
    pub fn max_score(&self) -> u32 {
        self.total_rounds * self.points_per_correct
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}
