//! Application entry point: Sound Safari in the terminal.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create the [`tokio`] runtime (current thread).
//! 4. Build the remote client (reporting a missing key), the riddle
//!    generator and the speech player from config.
//! 5. Create channels (`input`, `views`).
//! 6. Spawn the stdin reader thread.
//! 7. Spawn the view printer task.
//! 8. Resume the audio output and run the session until it ends.

use std::io::BufRead;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;

use sound_safari::{
    audio::{AudioSink, SharedOutput},
    config::{api_key_from_env, AppConfig, API_KEY_VARS},
    game::{GameRules, LearnerInput, OptionFeedback, Phase, SessionRunner, SessionView},
    gemini::GeminiClient,
    riddle::{FallbackRiddles, GeminiRiddles, RiddleGenerator},
    speech::{SpeechOutput, SpeechPlayer},
};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// `1`-`4` pick a card, `r` replays, `q` quits.
fn parse_command(line: &str) -> Option<LearnerInput> {
    match line.trim().to_ascii_lowercase().as_str() {
        "q" | "quit" => Some(LearnerInput::Quit),
        "r" | "replay" => Some(LearnerInput::Replay),
        other => other
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1)
            .map(|n| LearnerInput::Pick(n - 1)),
    }
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<LearnerInput>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match parse_command(&line) {
                    Some(input) => {
                        if input_tx.blocking_send(input).is_err() {
                            break;
                        }
                    }
                    None => println!("  (type 1-4, r or q)"),
                }
            }
        })
        .map(|_| ())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(view: &SessionView) {
    match view.phase {
        Phase::Loading => {
            println!();
            println!(
                "── Round {}/{} ── score {} ──",
                view.round_index, view.total_rounds, view.score
            );
            println!("Đang nghĩ câu đố... (thinking of a riddle)");
        }
        Phase::Playing => println!("🔊 Nghe này! (listen)"),
        Phase::Idle | Phase::Error => {
            if view.phase == Phase::Error {
                println!("Không phát được âm thanh. Press r to try again.");
            }
            for (i, option) in view.options.iter().enumerate() {
                println!(
                    "  {}) {} {} ({})",
                    i + 1,
                    option.animal.emoji,
                    option.animal.native_name,
                    option.animal.name
                );
            }
            println!("Chọn 1-4, r = nghe lại, q = thoát");
        }
        Phase::Answered => {
            for option in &view.options {
                let mark = match option.feedback {
                    OptionFeedback::Correct => "✅",
                    OptionFeedback::Wrong => "❌",
                    OptionFeedback::Dimmed | OptionFeedback::Default => "  ",
                };
                println!("  {mark} {} {}", option.animal.emoji, option.animal.native_name);
            }
            match (view.last_answer_correct, view.revealed_animal) {
                (Some(true), _) => println!(
                    "Đúng rồi! Correct! +{}",
                    view.points_awarded.unwrap_or_default()
                ),
                (_, Some(animal)) => println!(
                    "Chưa đúng. It was the {} {} ({}).",
                    animal.emoji, animal.name, animal.native_name
                ),
                _ => {}
            }
            if let Some(riddle) = &view.revealed_riddle {
                println!("  \"{riddle}\"");
            }
        }
        Phase::Complete => {
            println!();
            println!("🏆 Hoàn thành! Final score: {}", view.score);
        }
    }
}

/// Print each view whose round or phase differs from the previous one,
/// up to and including the completed session.
async fn print_views(mut views: mpsc::Receiver<SessionView>) {
    let mut last: Option<(u32, Phase)> = None;
    while let Some(view) = views.recv().await {
        let key = (view.round_index, view.phase);
        if last != Some(key) {
            render(&view);
            last = Some(key);
        }
        if view.is_complete() {
            break;
        }
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Sound Safari starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        let mut config = AppConfig::default();
        config.apply_api_key(api_key_from_env());
        config
    });

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 4. Riddles and speech
    let client = GeminiClient::from_config(&config.gemini);
    if !client.has_api_key() {
        log::error!(
            "No API key set ({}); riddles and speech will use the offline fallbacks",
            API_KEY_VARS.join(" / ")
        );
    }
    let riddles: Arc<dyn RiddleGenerator> = Arc::new(FallbackRiddles::new(GeminiRiddles::new(
        client.clone(),
        &config.gemini.text_model,
    )));
    let speech: Arc<dyn SpeechOutput> = Arc::new(SpeechPlayer::from_config(
        client,
        &config.gemini.speech_model,
        &config.gemini.voice,
        &config.speech,
    ));

    // 5. Channels
    let (input_tx, input_rx) = mpsc::channel::<LearnerInput>(16);
    let (view_tx, view_rx) = mpsc::channel::<SessionView>(64);

    // 6. Stdin reader
    spawn_stdin_reader(input_tx).context("failed to spawn stdin reader")?;

    println!("🦁 Sound Safari: listen to the riddle and pick the animal!");

    let rules = GameRules::from_config(&config.game);
    let max_score = rules.max_score();

    let summary = rt.block_on(async move {
        // 7. View printer
        let printer = tokio::spawn(print_views(view_rx));

        // 8. Audio output, then the session
        if let Err(e) = SharedOutput.resume().await {
            log::warn!("Audio output unavailable ({e}); the offline voice will be used");
        }

        let runner = SessionRunner::new(riddles, speech, rules).with_views(view_tx);
        let summary = runner.run(input_rx).await;

        let _ = printer.await;
        summary
    })?;

    println!(
        "Score: {}/{max_score} ({} rounds played)",
        summary.final_score, summary.rounds_played
    );
    Ok(())
}
