//! Round state machine.
//!
//! [`Session`] is the single source of truth for a quiz session.  It is
//! changed only through [`Session::handle`], a synchronous transition that
//! returns the [`Effect`]s the caller must perform.  All async work (riddle
//! fetch, speech, the answer delay, dealing with an RNG) lives in
//! [`crate::game::runner`], which feeds results back as [`Event`]s.
//!
//! ```text
//! Loading ──RiddleReady──▶ Playing ──AudioSettled(ok)──▶ Idle ─┐
//!                                   ──AudioSettled(err)─▶ Error ┤
//!          Playing / Idle / Error ──Answer──▶ Answered ◀────────┘
//! Answered ──AdvanceElapsed──▶ Loading (DealRound → RoundDealt)
//!                           └▶ Complete   (last round)
//! Idle / Error ──ReplayRequested──▶ Playing
//! ```

use std::time::Duration;

use super::catalog::Animal;
use super::round::{Answer, Round};
use super::GameRules;
use crate::speech::PlaybackOutcome;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where the current round is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for the round to be dealt or its riddle to arrive.
    #[default]
    Loading,
    /// The riddle is being spoken.
    Playing,
    /// Speech finished; waiting for an answer.
    Idle,
    /// Speech failed; the learner can still replay or answer.
    Error,
    /// An answer was given; feedback is showing until the advance delay ends.
    Answered,
    /// All rounds played.
    Complete,
}

impl Phase {
    /// Whether an answer would be accepted in this phase (ignoring whether the
    /// round was already answered).
    pub fn accepts_answer(&self) -> bool {
        matches!(self, Phase::Playing | Phase::Idle | Phase::Error)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Loading => "Loading",
            Phase::Playing => "Playing",
            Phase::Idle => "Idle",
            Phase::Error => "Error",
            Phase::Answered => "Answered",
            Phase::Complete => "Complete",
        }
    }
}

// ---------------------------------------------------------------------------
// Event / Effect
// ---------------------------------------------------------------------------

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Riddle text for the current round is available.
    RiddleReady(String),
    /// A `Speak` effect finished.
    AudioSettled(PlaybackOutcome),
    /// The learner asked to hear the riddle again.
    ReplayRequested,
    /// The learner picked the option with this id.
    Answer(String),
    /// The post-answer delay is over.
    AdvanceElapsed,
    /// The round requested by `DealRound`.
    RoundDealt(Round),
}

/// Work the caller must perform on behalf of the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Generate a riddle and report `RiddleReady`.
    FetchRiddle { animal: Animal },
    /// Speak `text` and report `AudioSettled`.
    Speak { text: String },
    /// Wait, then report `AdvanceElapsed`.
    ScheduleAdvance(Duration),
    /// Deal round `index` and report `RoundDealt`.
    DealRound { index: u32 },
    /// The session is over.
    Finish { final_score: u32 },
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One quiz session.
#[derive(Debug, Clone)]
pub struct Session {
    rules: GameRules,
    round: Round,
    phase: Phase,
    score: u32,
    /// First-round latch for [`Session::start`].
    started: bool,
    /// A `Speak` effect is outstanding.
    speaking: bool,
    /// `AdvanceElapsed` arrived while speech was outstanding.
    advance_pending: bool,
    /// `DealRound` is outstanding.
    dealing: bool,
}

impl Session {
    /// New session positioned on `first_round`, phase `Loading`.
    pub fn new(rules: GameRules, first_round: Round) -> Self {
        Self {
            rules,
            round: first_round,
            phase: Phase::Loading,
            score: 0,
            started: false,
            speaking: false,
            advance_pending: false,
            dealing: false,
        }
    }

    /// Kick off the first round.  Only the first call has any effect.
    pub fn start(&mut self) -> Vec<Effect> {
        if self.started {
            log::debug!("session: start ignored, already started");
            return Vec::new();
        }
        self.started = true;
        vec![Effect::FetchRiddle {
            animal: self.round.target,
        }]
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Whether a replay would be accepted now.
    pub fn can_replay(&self) -> bool {
        !self.speaking
            && self.round.riddle.is_some()
            && matches!(self.phase, Phase::Idle | Phase::Error | Phase::Answered)
    }

    /// Apply `event` and return the effects to perform.
    ///
    /// Events that do not apply to the current phase are ignored and produce
    /// no effects.
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        log::debug!("session: {} <- {}", self.phase.label(), event_name(&event));

        match event {
            Event::RiddleReady(text) => self.on_riddle_ready(text),
            Event::AudioSettled(outcome) => self.on_audio_settled(outcome),
            Event::ReplayRequested => self.on_replay(),
            Event::Answer(id) => self.on_answer(&id),
            Event::AdvanceElapsed => self.on_advance_elapsed(),
            Event::RoundDealt(round) => self.on_round_dealt(round),
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn on_riddle_ready(&mut self, text: String) -> Vec<Effect> {
        if self.phase != Phase::Loading || self.dealing || self.round.riddle.is_some() {
            return Vec::new();
        }
        self.round.riddle = Some(text.clone());
        self.phase = Phase::Playing;
        self.speaking = true;
        vec![Effect::Speak { text }]
    }

    fn on_audio_settled(&mut self, outcome: PlaybackOutcome) -> Vec<Effect> {
        if !self.speaking {
            return Vec::new();
        }
        self.speaking = false;

        match self.phase {
            Phase::Playing => {
                self.phase = if outcome.is_failure() {
                    Phase::Error
                } else {
                    Phase::Idle
                };
                Vec::new()
            }
            Phase::Answered if self.advance_pending => {
                self.advance_pending = false;
                self.advance()
            }
            _ => Vec::new(),
        }
    }

    fn on_replay(&mut self) -> Vec<Effect> {
        if !self.can_replay() {
            return Vec::new();
        }
        let Some(text) = self.round.riddle.clone() else {
            return Vec::new();
        };

        self.speaking = true;
        if self.phase != Phase::Answered {
            self.phase = Phase::Playing;
        }
        vec![Effect::Speak { text }]
    }

    fn on_answer(&mut self, id: &str) -> Vec<Effect> {
        if !self.phase.accepts_answer() || self.round.answer.is_some() {
            return Vec::new();
        }
        if !self.round.has_option(id) {
            log::warn!("session: answer {id:?} is not one of this round's options");
            return Vec::new();
        }

        let correct = id == self.round.target.id;
        if correct {
            self.score += self.rules.points_per_correct;
        }
        self.round.answer = Some(Answer {
            selected: id.to_string(),
            correct,
        });
        self.phase = Phase::Answered;

        vec![Effect::ScheduleAdvance(self.rules.advance_delay)]
    }

    fn on_advance_elapsed(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Answered || self.dealing {
            return Vec::new();
        }
        if self.speaking {
            self.advance_pending = true;
            return Vec::new();
        }
        self.advance()
    }

    fn advance(&mut self) -> Vec<Effect> {
        if self.round.index < self.rules.total_rounds {
            self.phase = Phase::Loading;
            self.dealing = true;
            vec![Effect::DealRound {
                index: self.round.index + 1,
            }]
        } else {
            self.phase = Phase::Complete;
            vec![Effect::Finish {
                final_score: self.score,
            }]
        }
    }

    fn on_round_dealt(&mut self, round: Round) -> Vec<Effect> {
        if !self.dealing {
            return Vec::new();
        }
        self.dealing = false;
        self.round = round;
        self.phase = Phase::Loading;
        vec![Effect::FetchRiddle {
            animal: self.round.target,
        }]
    }
}

fn event_name(event: &Event) -> &'static str {
    match event {
        Event::RiddleReady(_) => "RiddleReady",
        Event::AudioSettled(_) => "AudioSettled",
        Event::ReplayRequested => "ReplayRequested",
        Event::Answer(_) => "Answer",
        Event::AdvanceElapsed => "AdvanceElapsed",
        Event::RoundDealt(_) => "RoundDealt",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::ANIMALS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rules(total_rounds: u32) -> GameRules {
        GameRules {
            total_rounds,
            points_per_correct: 10,
            advance_delay: Duration::from_millis(2_500),
        }
    }

    fn deal(index: u32, rng: &mut StdRng) -> Round {
        Round::deal(index, ANIMALS, rng).unwrap()
    }

    fn wrong_id(round: &Round) -> String {
        round
            .options
            .iter()
            .find(|a| a.id != round.target.id)
            .unwrap()
            .id
            .to_string()
    }

    /// Session started and advanced to `Idle` for round 1.
    fn idle_session(total_rounds: u32, rng: &mut StdRng) -> Session {
        let mut s = Session::new(rules(total_rounds), deal(1, rng));
        s.start();
        s.handle(Event::RiddleReady("I say Moo!".into()));
        s.handle(Event::AudioSettled(PlaybackOutcome::Remote));
        assert_eq!(s.phase(), Phase::Idle);
        s
    }

    #[test]
    fn start_fetches_riddle_once() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut s = Session::new(rules(5), deal(1, &mut rng));
        let target = s.round().target;

        assert_eq!(s.start(), vec![Effect::FetchRiddle { animal: target }]);
        assert!(s.start().is_empty());
        assert_eq!(s.phase(), Phase::Loading);
    }

    #[test]
    fn riddle_then_audio_reaches_idle() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut s = Session::new(rules(5), deal(1, &mut rng));
        s.start();

        let effects = s.handle(Event::RiddleReady("I say Roar!".into()));
        assert_eq!(effects, vec![Effect::Speak { text: "I say Roar!".into() }]);
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.round().riddle.as_deref(), Some("I say Roar!"));

        assert!(s.handle(Event::AudioSettled(PlaybackOutcome::Local)).is_empty());
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn failed_audio_reaches_error_and_still_accepts_answer() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut s = Session::new(rules(5), deal(1, &mut rng));
        s.start();
        s.handle(Event::RiddleReady("Hiss!".into()));
        s.handle(Event::AudioSettled(PlaybackOutcome::Failed("no voice".into())));
        assert_eq!(s.phase(), Phase::Error);

        let target = s.round().target.id.to_string();
        let effects = s.handle(Event::Answer(target));
        assert_eq!(effects, vec![Effect::ScheduleAdvance(Duration::from_millis(2_500))]);
        assert_eq!(s.phase(), Phase::Answered);
        assert_eq!(s.score(), 10);
    }

    #[test]
    fn correct_answer_scores_once() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut s = idle_session(5, &mut rng);
        let target = s.round().target.id.to_string();

        s.handle(Event::Answer(target.clone()));
        assert_eq!(s.score(), 10);
        assert_eq!(
            s.round().answer,
            Some(Answer {
                selected: target.clone(),
                correct: true
            })
        );

        // Second submission is a no-op, whatever is clicked.
        let before = s.round().answer.clone();
        assert!(s.handle(Event::Answer(target)).is_empty());
        assert!(s.handle(Event::Answer(wrong_id(s.round()))).is_empty());
        assert_eq!(s.score(), 10);
        assert_eq!(s.round().answer, before);
    }

    #[test]
    fn wrong_answer_scores_nothing() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut s = idle_session(5, &mut rng);
        let wrong = wrong_id(s.round());

        s.handle(Event::Answer(wrong.clone()));
        assert_eq!(s.score(), 0);
        assert_eq!(s.phase(), Phase::Answered);
        assert_eq!(s.round().answer.as_ref().map(|a| a.correct), Some(false));
    }

    #[test]
    fn answer_while_loading_is_ignored() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut s = Session::new(rules(5), deal(1, &mut rng));
        s.start();
        let target = s.round().target.id.to_string();

        assert!(s.handle(Event::Answer(target)).is_empty());
        assert_eq!(s.phase(), Phase::Loading);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn unknown_option_is_ignored() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut s = idle_session(5, &mut rng);

        assert!(s.handle(Event::Answer("unicorn".into())).is_empty());
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.round().answer.is_none());
    }

    #[test]
    fn advance_deals_next_round() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut s = idle_session(5, &mut rng);
        s.handle(Event::Answer(s.round().target.id.to_string()));

        assert_eq!(
            s.handle(Event::AdvanceElapsed),
            vec![Effect::DealRound { index: 2 }]
        );
        assert_eq!(s.phase(), Phase::Loading);

        let next = deal(2, &mut rng);
        let next_target = next.target;
        assert_eq!(
            s.handle(Event::RoundDealt(next)),
            vec![Effect::FetchRiddle {
                animal: next_target
            }]
        );
        assert_eq!(s.round().index, 2);
        assert!(s.round().riddle.is_none());
        assert!(s.round().answer.is_none());
        assert_eq!(s.score(), 10);
    }

    #[test]
    fn final_round_completes_with_its_points() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut s = idle_session(1, &mut rng);
        s.handle(Event::Answer(s.round().target.id.to_string()));

        assert_eq!(
            s.handle(Event::AdvanceElapsed),
            vec![Effect::Finish { final_score: 10 }]
        );
        assert!(s.is_complete());

        // Terminal: nothing else applies.
        assert!(s.handle(Event::ReplayRequested).is_empty());
        assert!(s.handle(Event::AdvanceElapsed).is_empty());
    }

    #[test]
    fn replay_from_idle_and_error() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut s = idle_session(5, &mut rng);

        assert_eq!(
            s.handle(Event::ReplayRequested),
            vec![Effect::Speak { text: "I say Moo!".into() }]
        );
        assert_eq!(s.phase(), Phase::Playing);

        // Already playing: ignored.
        assert!(s.handle(Event::ReplayRequested).is_empty());

        s.handle(Event::AudioSettled(PlaybackOutcome::Failed("x".into())));
        assert_eq!(s.phase(), Phase::Error);
        assert_eq!(s.handle(Event::ReplayRequested).len(), 1);
        assert_eq!(s.score(), 0);
        assert_eq!(s.round().index, 1);
    }

    #[test]
    fn replay_without_riddle_is_ignored() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut s = Session::new(rules(5), deal(1, &mut rng));
        s.start();
        assert!(s.handle(Event::ReplayRequested).is_empty());
        assert_eq!(s.phase(), Phase::Loading);
    }

    #[test]
    fn answer_during_playback_then_audio_keeps_answered() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut s = Session::new(rules(5), deal(1, &mut rng));
        s.start();
        s.handle(Event::RiddleReady("Quack!".into()));

        s.handle(Event::Answer(s.round().target.id.to_string()));
        assert_eq!(s.phase(), Phase::Answered);

        assert!(s.handle(Event::AudioSettled(PlaybackOutcome::Remote)).is_empty());
        assert_eq!(s.phase(), Phase::Answered);
    }

    #[test]
    fn advance_waits_for_outstanding_speech() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut s = idle_session(5, &mut rng);
        s.handle(Event::Answer(wrong_id(s.round())));

        // Replay during feedback keeps the phase.
        assert_eq!(s.handle(Event::ReplayRequested).len(), 1);
        assert_eq!(s.phase(), Phase::Answered);
        assert!(s.is_speaking());

        // Delay ends while speaking: deferred.
        assert!(s.handle(Event::AdvanceElapsed).is_empty());
        assert_eq!(s.phase(), Phase::Answered);

        // Speech settles: the deferred advance happens now.
        assert_eq!(
            s.handle(Event::AudioSettled(PlaybackOutcome::Remote)),
            vec![Effect::DealRound { index: 2 }]
        );
    }

    #[test]
    fn stray_events_are_ignored() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut s = idle_session(5, &mut rng);

        assert!(s.handle(Event::RiddleReady("late".into())).is_empty());
        assert!(s.handle(Event::AudioSettled(PlaybackOutcome::Remote)).is_empty());
        assert!(s.handle(Event::AdvanceElapsed).is_empty());
        assert!(s.handle(Event::RoundDealt(deal(9, &mut rng))).is_empty());

        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.round().index, 1);
        assert_eq!(s.round().riddle.as_deref(), Some("I say Moo!"));
    }

    #[test]
    fn score_stays_on_ten_point_grid_and_never_decreases() {
        let mut rng = StdRng::seed_from_u64(15);
        let mut s = Session::new(rules(5), deal(1, &mut rng));
        s.start();

        let mut last = 0;
        for i in 0..5 {
            s.handle(Event::RiddleReady(format!("riddle {i}")));
            s.handle(Event::AudioSettled(PlaybackOutcome::Remote));

            let pick = if i % 2 == 0 {
                s.round().target.id.to_string()
            } else {
                wrong_id(s.round())
            };
            s.handle(Event::Answer(pick));

            assert!(s.score() >= last);
            assert_eq!(s.score() % 10, 0);
            assert!(s.score() <= 50);
            last = s.score();

            for effect in s.handle(Event::AdvanceElapsed) {
                if let Effect::DealRound { index } = effect {
                    s.handle(Event::RoundDealt(deal(index, &mut rng)));
                }
            }
        }

        assert!(s.is_complete());
        assert_eq!(s.score(), 30);
    }
}
