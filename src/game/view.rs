//! Read-only snapshot of a session for the front end.

use super::catalog::Animal;
use super::session::{Phase, Session};

/// How an option card should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionFeedback {
    /// Not answered yet.
    Default,
    /// The target animal, after an answer.
    Correct,
    /// The learner's wrong pick.
    Wrong,
    /// Any other card after an answer.
    Dimmed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionView {
    pub animal: Animal,
    pub feedback: OptionFeedback,
    /// Whether picking this card would be accepted right now.
    pub enabled: bool,
}

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub round_index: u32,
    pub total_rounds: u32,
    pub score: u32,
    pub phase: Phase,
    pub options: Vec<OptionView>,
    /// Shown once the round has been answered.
    pub revealed_riddle: Option<String>,
    /// The target, once the round has been answered.
    pub revealed_animal: Option<Animal>,
    pub last_answer_correct: Option<bool>,
    /// Points the answer earned, once the round has been answered.
    pub points_awarded: Option<u32>,
    pub can_replay: bool,
}

impl SessionView {
    pub fn of(session: &Session) -> Self {
        let round = session.round();
        let answer = round.answer.as_ref();
        let enabled = session.phase().accepts_answer() && answer.is_none();

        let options = round
            .options
            .iter()
            .map(|animal| {
                let feedback = match answer {
                    None => OptionFeedback::Default,
                    Some(_) if animal.id == round.target.id => OptionFeedback::Correct,
                    Some(a) if a.selected == animal.id => OptionFeedback::Wrong,
                    Some(_) => OptionFeedback::Dimmed,
                };
                OptionView {
                    animal: *animal,
                    feedback,
                    enabled,
                }
            })
            .collect();

        let answered = answer.is_some();

        Self {
            round_index: round.index,
            total_rounds: session.rules().total_rounds,
            score: session.score(),
            phase: session.phase(),
            options,
            revealed_riddle: if answered { round.riddle.clone() } else { None },
            revealed_animal: answered.then_some(round.target),
            last_answer_correct: answer.map(|a| a.correct),
            points_awarded: answer.map(|a| {
                if a.correct {
                    session.rules().points_per_correct
                } else {
                    0
                }
            }),
            can_replay: session.can_replay(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::ANIMALS;
    use crate::game::round::Round;
    use crate::game::session::Event;
    use crate::game::GameRules;
    use crate::speech::PlaybackOutcome;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn idle_session() -> Session {
        let mut rng = StdRng::seed_from_u64(21);
        let mut s = Session::new(GameRules::default(), Round::deal(1, ANIMALS, &mut rng).unwrap());
        s.start();
        s.handle(Event::RiddleReady("I have a trunk.".into()));
        s.handle(Event::AudioSettled(PlaybackOutcome::Remote));
        s
    }

    #[test]
    fn loading_disables_every_card() {
        let mut rng = StdRng::seed_from_u64(20);
        let s = Session::new(GameRules::default(), Round::deal(1, ANIMALS, &mut rng).unwrap());
        let view = SessionView::of(&s);

        assert_eq!(view.phase, Phase::Loading);
        assert_eq!(view.options.len(), 4);
        assert!(view.options.iter().all(|o| !o.enabled));
        assert!(!view.can_replay);
        assert_eq!(view.total_rounds, 5);
    }

    #[test]
    fn idle_keeps_riddle_hidden() {
        let view = SessionView::of(&idle_session());

        assert!(view.options.iter().all(|o| o.enabled));
        assert!(view
            .options
            .iter()
            .all(|o| o.feedback == OptionFeedback::Default));
        assert!(view.revealed_riddle.is_none());
        assert!(view.revealed_animal.is_none());
        assert!(view.can_replay);
    }

    #[test]
    fn wrong_answer_marks_pick_and_target() {
        let mut s = idle_session();
        let target = s.round().target.id;
        let wrong = s
            .round()
            .options
            .iter()
            .find(|a| a.id != target)
            .unwrap()
            .id;
        s.handle(Event::Answer(wrong.to_string()));

        let view = SessionView::of(&s);
        for option in &view.options {
            let expected = if option.animal.id == target {
                OptionFeedback::Correct
            } else if option.animal.id == wrong {
                OptionFeedback::Wrong
            } else {
                OptionFeedback::Dimmed
            };
            assert_eq!(option.feedback, expected);
            assert!(!option.enabled);
        }
        assert_eq!(view.revealed_riddle.as_deref(), Some("I have a trunk."));
        assert_eq!(view.revealed_animal.map(|a| a.id), Some(target));
        assert_eq!(view.last_answer_correct, Some(false));
        assert_eq!(view.points_awarded, Some(0));
    }

    #[test]
    fn correct_answer_reports_configured_points() {
        let rules = GameRules {
            points_per_correct: 25,
            ..GameRules::default()
        };
        let mut rng = StdRng::seed_from_u64(22);
        let mut s = Session::new(rules, Round::deal(1, ANIMALS, &mut rng).unwrap());
        s.start();
        s.handle(Event::RiddleReady("Moo!".into()));
        assert_eq!(SessionView::of(&s).points_awarded, None);

        s.handle(Event::Answer(s.round().target.id.to_string()));

        let view = SessionView::of(&s);
        assert_eq!(view.points_awarded, Some(25));
        assert_eq!(view.score, 25);
    }

    #[test]
    fn complete_view_reports_completion() {
        let rules = GameRules {
            total_rounds: 1,
            ..GameRules::default()
        };
        let mut rng = StdRng::seed_from_u64(23);
        let mut s = Session::new(rules, Round::deal(1, ANIMALS, &mut rng).unwrap());
        s.start();
        s.handle(Event::RiddleReady("Quack!".into()));
        s.handle(Event::AudioSettled(PlaybackOutcome::Local));
        assert!(!SessionView::of(&s).is_complete());

        s.handle(Event::Answer(s.round().target.id.to_string()));
        s.handle(Event::AdvanceElapsed);

        assert!(SessionView::of(&s).is_complete());
    }
}
