//! Fallback riddles: wraps any [`RiddleGenerator`] and never fails.
//!
//! When the remote call fails for any reason (missing key, transport,
//! timeout, malformed structured output) [`FallbackRiddles`] returns
//! [`fallback_riddle`] instead, so a round can always proceed.

use async_trait::async_trait;

use crate::gemini::GeminiError;
use crate::riddle::generator::RiddleGenerator;

/// Deterministic local riddle for `animal_name`.
///
/// ```rust
/// use sound_safari::riddle::fallback_riddle;
///
/// assert_eq!(fallback_riddle("Cat"), "I make a sound and I am a Cat. Who am I?");
/// ```
pub fn fallback_riddle(animal_name: &str) -> String {
    format!("I make a sound and I am a {animal_name}. Who am I?")
}

// ---------------------------------------------------------------------------
// FallbackRiddles
// ---------------------------------------------------------------------------

/// A transparent wrapper around any [`RiddleGenerator`] that never returns an
/// error.
pub struct FallbackRiddles<G: RiddleGenerator> {
    inner: G,
}

impl<G: RiddleGenerator> FallbackRiddles<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<G: RiddleGenerator> RiddleGenerator for FallbackRiddles<G> {
    /// Never returns `Err(_)`.
    async fn generate(&self, animal_name: &str) -> Result<String, GeminiError> {
        match self.inner.generate(animal_name).await {
            Ok(riddle) => Ok(riddle),
            Err(err) => {
                log::warn!("riddle generation failed ({err}); using local riddle for {animal_name}");
                Ok(fallback_riddle(animal_name))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
