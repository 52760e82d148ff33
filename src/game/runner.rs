//! Session runner: drives a [`Session`] from learner input and async results.
//!
//! [`SessionRunner`] owns the session, an RNG, the riddle generator and the
//! speech output.  It turns [`Effect`]s into tokio tasks that report back as
//! [`Event`]s on an internal channel, and applies every event on its own task,
//! one at a time.
//!
//! ```text
//! input_rx ─┐
//!           ├─▶ select! ─▶ Session::handle ─▶ effects ─┬─▶ spawn ─▶ event_tx
//! event_rx ─┘                                          └─▶ DealRound inline
//! ```
//!
//! The runner returns when the session completes, when the learner quits, or
//! when the input channel has closed and nothing is in flight.

use std::collections::VecDeque;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::riddle::{fallback_riddle, RiddleGenerator};
use crate::speech::SpeechOutput;

use super::catalog::{Animal, ANIMALS};
use super::round::Round;
use super::session::{Effect, Event, Session};
use super::view::SessionView;
use super::{GameError, GameRules};

// ---------------------------------------------------------------------------
// LearnerInput / SessionSummary
// ---------------------------------------------------------------------------

/// What the front end can send to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LearnerInput {
    /// Pick the option at this 0-based position.
    Pick(usize),
    /// Pick the option with this animal id.
    Answer(String),
    /// Hear the riddle again.
    Replay,
    /// Stop the session now.
    Quit,
}

/// Result of [`SessionRunner::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub final_score: u32,
    /// Rounds the learner answered.
    pub rounds_played: u32,
    /// `true` if every round was played.
    pub completed: bool,
}

impl SessionSummary {
    fn of(session: &Session) -> Self {
        let round = session.round();
        let rounds_played = if round.answer.is_some() {
            round.index
        } else {
            round.index.saturating_sub(1)
        };
        Self {
            final_score: session.score(),
            rounds_played,
            completed: session.is_complete(),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionRunner
// ---------------------------------------------------------------------------

/// Async shell around the [`Session`] state machine.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tokio::sync::mpsc;
/// use sound_safari::game::{GameRules, LearnerInput, SessionRunner};
/// # use sound_safari::riddle::RiddleGenerator;
/// # use sound_safari::speech::SpeechOutput;
/// # fn make_riddles() -> Arc<dyn RiddleGenerator> { unimplemented!() }
/// # fn make_speech() -> Arc<dyn SpeechOutput> { unimplemented!() }
///
/// # async fn example() {
/// let (input_tx, input_rx) = mpsc::channel(16);
/// let (view_tx, _view_rx) = mpsc::channel(16);
///
/// let runner = SessionRunner::new(make_riddles(), make_speech(), GameRules::default())
///     .with_views(view_tx);
/// let game = tokio::spawn(runner.run(input_rx));
///
/// input_tx.send(LearnerInput::Quit).await.unwrap();
/// let summary = game.await.unwrap().unwrap();
/// println!("score: {}", summary.final_score);
/// # }
/// ```
pub struct SessionRunner {
    riddles: Arc<dyn RiddleGenerator>,
    speech: Arc<dyn SpeechOutput>,
    rules: GameRules,
    catalog: &'static [Animal],
    rng: StdRng,
    views: Option<mpsc::Sender<SessionView>>,
}

impl SessionRunner {
    /// Runner over the full catalog with an entropy-seeded RNG and no view
    /// channel.
    pub fn new(
        riddles: Arc<dyn RiddleGenerator>,
        speech: Arc<dyn SpeechOutput>,
        rules: GameRules,
    ) -> Self {
        Self {
            riddles,
            speech,
            rules,
            catalog: ANIMALS,
            rng: StdRng::from_entropy(),
            views: None,
        }
    }

    pub fn with_catalog(mut self, catalog: &'static [Animal]) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Publish a [`SessionView`] after every transition.  Frames are dropped
    /// when the channel is full.
    pub fn with_views(mut self, views: mpsc::Sender<SessionView>) -> Self {
        self.views = Some(views);
        self
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Play one session.
    ///
    /// Fails only if the catalog cannot fill a round.
    pub async fn run(
        mut self,
        mut input_rx: mpsc::Receiver<LearnerInput>,
    ) -> Result<SessionSummary, GameError> {
        let first = Round::deal(1, self.catalog, &mut self.rng)?;
        let mut session = Session::new(self.rules.clone(), first);

        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
        let mut in_flight: usize = 0;
        let mut input_open = true;

        log::info!(
            "game: session started ({} rounds, {} points each)",
            self.rules.total_rounds,
            self.rules.points_per_correct
        );

        let effects = session.start();
        self.publish(&session);
        if self.execute(&mut session, effects, &event_tx, &mut in_flight)? {
            return Ok(self.finish(&session));
        }

        loop {
            if !input_open && in_flight == 0 {
                log::info!("game: input closed, stopping session");
                break;
            }

            let event = tokio::select! {
                Some(event) = event_rx.recv() => {
                    in_flight = in_flight.saturating_sub(1);
                    event
                }
                input = input_rx.recv(), if input_open => match input {
                    Some(LearnerInput::Quit) => {
                        log::info!("game: learner quit");
                        break;
                    }
                    Some(input) => match Self::map_input(&session, input) {
                        Some(event) => event,
                        None => continue,
                    },
                    None => {
                        input_open = false;
                        continue;
                    }
                },
                else => break,
            };

            let effects = session.handle(event);
            self.publish(&session);
            if self.execute(&mut session, effects, &event_tx, &mut in_flight)? {
                break;
            }
        }

        Ok(self.finish(&session))
    }

    // -----------------------------------------------------------------------
    // Effects
    // -----------------------------------------------------------------------

    /// Perform `effects`; returns `true` once the session has finished.
    fn execute(
        &mut self,
        session: &mut Session,
        effects: Vec<Effect>,
        events: &mpsc::UnboundedSender<Event>,
        in_flight: &mut usize,
    ) -> Result<bool, GameError> {
        let mut queue: VecDeque<Effect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::FetchRiddle { animal } => {
                    *in_flight += 1;
                    let riddles = Arc::clone(&self.riddles);
                    let tx = events.clone();
                    tokio::spawn(async move {
                        let text = match riddles.generate(animal.name).await {
                            Ok(text) => text,
                            Err(e) => {
                                log::warn!("game: riddle for {} failed ({e})", animal.id);
                                fallback_riddle(animal.name)
                            }
                        };
                        let _ = tx.send(Event::RiddleReady(text));
                    });
                }
                Effect::Speak { text } => {
                    *in_flight += 1;
                    let speech = Arc::clone(&self.speech);
                    let tx = events.clone();
                    tokio::spawn(async move {
                        let outcome = speech.speak(&text).await;
                        let _ = tx.send(Event::AudioSettled(outcome));
                    });
                }
                Effect::ScheduleAdvance(delay) => {
                    *in_flight += 1;
                    let tx = events.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(Event::AdvanceElapsed);
                    });
                }
                Effect::DealRound { index } => {
                    let round = Round::deal(index, self.catalog, &mut self.rng)?;
                    log::debug!("game: dealt round {index} (target {})", round.target.id);
                    queue.extend(session.handle(Event::RoundDealt(round)));
                    self.publish(session);
                }
                Effect::Finish { final_score } => {
                    log::info!("game: session complete, final score {final_score}");
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn map_input(session: &Session, input: LearnerInput) -> Option<Event> {
        match input {
            LearnerInput::Pick(position) => match session.round().options.get(position) {
                Some(animal) => Some(Event::Answer(animal.id.to_string())),
                None => {
                    log::debug!("game: no option at position {position}");
                    None
                }
            },
            LearnerInput::Answer(id) => Some(Event::Answer(id)),
            LearnerInput::Replay => Some(Event::ReplayRequested),
            LearnerInput::Quit => None,
        }
    }

    fn publish(&self, session: &Session) {
        let Some(views) = &self.views else {
            return;
        };
        if let Err(TrySendError::Full(_)) = views.try_send(SessionView::of(session)) {
            log::debug!("game: view channel full, dropping frame");
        }
    }

    fn finish(&self, session: &Session) -> SessionSummary {
        let summary = SessionSummary::of(session);
        log::info!(
            "game: {} of {} rounds played, score {}",
            summary.rounds_played,
            self.rules.total_rounds,
            summary.final_score
        );
        summary
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
