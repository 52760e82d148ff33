//! Riddle prompt template and structured-output schema.
//!
//! The model is asked for JSON matching [`RiddlePrompt::response_schema`]:
//! an object with the single required string field `riddle`.

use serde_json::{json, Value};

use crate::gemini::user_contents;

/// Name of the only field in the structured response.
pub const RIDDLE_FIELD: &str = "riddle";

// ---------------------------------------------------------------------------
// RiddlePrompt
// ---------------------------------------------------------------------------

/// Builds riddle requests for one animal.
///
/// # Example
/// ```rust
/// use sound_safari::riddle::RiddlePrompt;
///
/// let prompt = RiddlePrompt::new("Elephant");
/// assert!(prompt.text().contains("Do NOT say the name of the animal (Elephant)"));
/// ```
pub struct RiddlePrompt<'a> {
    animal_name: &'a str,
}

impl<'a> RiddlePrompt<'a> {
    pub fn new(animal_name: &'a str) -> Self {
        Self { animal_name }
    }

    /// Prompt text sent as the user turn.
    pub fn text(&self) -> String {
        let name = self.animal_name;
        format!(
            "Create a very simple riddle for a Primary School student (English Movers level) about a {name}.

Strict Rules:
1. Use ONLY simple vocabulary (A1/Movers level).
2. Maximum 2 short sentences. Keep it very short.
3. YOU MUST include the sound the animal makes (onomatopoeia) like 'Woof', 'Moo', 'Roar', 'Meow', etc.
4. Do NOT say the name of the animal ({name}) in the text.
5. Example format: \"I have a long trunk. I say Pa-woo!\""
        )
    }

    /// Schema forcing a `{ "riddle": string }` object.
    pub fn response_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                RIDDLE_FIELD: {
                    "type": "STRING",
                    "description": "A simple riddle for a child about the animal, including its sound."
                }
            },
            "required": [RIDDLE_FIELD]
        })
    }

    /// Full `generateContent` request body.
    pub fn request_body(&self) -> Value {
        json!({
            "contents": user_contents(&self.text()),
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": Self::response_schema()
            }
        })
    }
}
