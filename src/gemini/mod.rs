//! Thin client for the remote generative-AI service.
//!
//! * [`GeminiClient`]: posts `generateContent` requests for a given model.
//! * [`GeminiError`]: transport / status / payload errors.
//! * [`response`]: helpers that pull text or inline audio out of a
//!   `generateContent` response.
//!
//! The riddle and speech adapters build their request bodies and hand them to
//! the same client, so credentials and timeouts are configured once.

pub mod client;
pub mod response;

pub use client::{user_contents, GeminiClient, GeminiError};
pub use response::{candidate_audio, candidate_text};
