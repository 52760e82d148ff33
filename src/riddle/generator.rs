//! Core `RiddleGenerator` trait and the remote `GeminiRiddles` implementation.

use async_trait::async_trait;
use serde::Deserialize;

use crate::gemini::{candidate_text, GeminiClient, GeminiError};
use crate::riddle::prompt::RiddlePrompt;

// ---------------------------------------------------------------------------
// RiddleGenerator trait
// ---------------------------------------------------------------------------

/// Async trait for riddle sources.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn RiddleGenerator>`).
#[async_trait]
pub trait RiddleGenerator: Send + Sync {
    /// Produce a short riddle about the animal called `animal_name`.
    async fn generate(&self, animal_name: &str) -> Result<String, GeminiError>;
}

// ---------------------------------------------------------------------------
// Structured response
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RiddleResponse {
    riddle: String,
}

/// Parse the model's JSON text into the riddle string.
///
/// Fails with [`GeminiError::Parse`] when the text is not the expected
/// object, and [`GeminiError::EmptyResponse`] when the riddle is blank.
pub fn parse_riddle(json_text: &str) -> Result<String, GeminiError> {
    let parsed: RiddleResponse =
        serde_json::from_str(json_text).map_err(|e| GeminiError::Parse(e.to_string()))?;

    let riddle = parsed.riddle.trim();
    if riddle.is_empty() {
        return Err(GeminiError::EmptyResponse);
    }
    Ok(riddle.to_string())
}

// ---------------------------------------------------------------------------
// GeminiRiddles
// ---------------------------------------------------------------------------

/// Generates riddles with the configured text model.
pub struct GeminiRiddles {
    client: GeminiClient,
    model: String,
}

impl GeminiRiddles {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl RiddleGenerator for GeminiRiddles {
    async fn generate(&self, animal_name: &str) -> Result<String, GeminiError> {
        let body = RiddlePrompt::new(animal_name).request_body();
        let response = self.client.generate_content(&self.model, &body).await?;

        let json_text = candidate_text(&response).ok_or(GeminiError::EmptyResponse)?;
        let riddle = parse_riddle(json_text)?;

        log::debug!("riddle: generated for {animal_name}: {riddle:?}");
        Ok(riddle)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
