//! Dealing a round: target, distractors, shuffled options.

use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;

use super::catalog::Animal;
use super::GameError;

/// Options shown per round (target + distractors).
pub const OPTIONS_PER_ROUND: usize = 4;

/// The learner's answer for a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub selected: String,
    pub correct: bool,
}

/// One question: a target animal among four options.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    /// 1-based round number.
    pub index: u32,
    pub target: Animal,
    /// Exactly [`OPTIONS_PER_ROUND`] distinct animals including `target`, in
    /// presentation order.
    pub options: Vec<Animal>,
    pub riddle: Option<String>,
    pub answer: Option<Answer>,
}

impl Round {
    /// Deal round `index` from `catalog`.
    ///
    /// The target is drawn uniformly, three distractors are drawn uniformly
    /// without replacement from the remaining animals, and the four options
    /// are shuffled.
    pub fn deal<R: Rng + ?Sized>(
        index: u32,
        catalog: &[Animal],
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if catalog.len() < OPTIONS_PER_ROUND {
            return Err(GameError::CatalogTooSmall {
                have: catalog.len(),
                need: OPTIONS_PER_ROUND,
            });
        }

        let target = *catalog.choose(rng).ok_or(GameError::CatalogTooSmall {
            have: 0,
            need: OPTIONS_PER_ROUND,
        })?;

        let mut options: Vec<Animal> = catalog
            .iter()
            .filter(|a| a.id != target.id)
            .copied()
            .choose_multiple(rng, OPTIONS_PER_ROUND - 1);
        options.push(target);
        options.shuffle(rng);

        Ok(Self {
            index,
            target,
            options,
            riddle: None,
            answer: None,
        })
    }

    pub fn has_option(&self, id: &str) -> bool {
        self.options.iter().any(|a| a.id == id)
    }
}
