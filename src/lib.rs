pub mod audio;
pub mod config;
pub mod game;
pub mod gemini;
pub mod riddle;
pub mod speech;
