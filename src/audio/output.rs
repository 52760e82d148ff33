//! Speaker output via `cpal`.
//!
//! [`AudioOutput`] is a process-wide singleton created on first use with
//! [`AudioOutput::shared`] and never torn down.  The cpal stream is not `Send`
//! on every platform, so it lives on a dedicated `audio-output` thread that
//! receives [`OutputCommand`]s over a channel; each command answers through a
//! `tokio::sync::oneshot` so async callers can await completion.
//!
//! The stream is opened paused ([`OutputState::Suspended`]) the first time a
//! command arrives and stays open for the rest of the process.  `play`
//! resumes it when needed.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, OnceLock};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;
use tokio::sync::oneshot;

use super::pcm::AudioBuffer;
use super::resample::{mono_to_interleaved, resample_linear};

/// Preferred device rate: the rate the speech model synthesizes at.
pub const OUTPUT_SAMPLE_RATE: u32 = 24_000;

static SHARED_OUTPUT: OnceLock<AudioOutput> = OnceLock::new();

// ---------------------------------------------------------------------------
// OutputError
// ---------------------------------------------------------------------------

/// Errors that can occur while opening or driving the output device.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("no output device found on the default audio host")]
    NoDevice,

    #[error("failed to query output configs: {0}")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("failed to query default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("unsupported output sample format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("audio output thread is not running")]
    Closed,
}

// ---------------------------------------------------------------------------
// OutputState / AudioSink
// ---------------------------------------------------------------------------

/// Whether the output stream is currently pulling samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    Suspended,
    Running,
}

/// Playback seam used by the speech player.
///
/// [`AudioOutput`] is the production implementation; tests substitute a
/// recording double.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Current stream state.
    fn state(&self) -> OutputState;

    /// Bring the stream to [`OutputState::Running`].
    async fn resume(&self) -> Result<(), OutputError>;

    /// Play `buffer` and resolve once every sample has been handed to the
    /// device.
    async fn play(&self, buffer: AudioBuffer) -> Result<(), OutputError>;
}

// ---------------------------------------------------------------------------
// AudioOutput
// ---------------------------------------------------------------------------

type Reply = oneshot::Sender<Result<(), OutputError>>;

/// Commands accepted by the audio thread.
enum OutputCommand {
    Resume { reply: Reply },
    Play { buffer: AudioBuffer, done: Reply },
}

/// Handle to the audio thread.  Cheap to share; see [`AudioOutput::shared`].
pub struct AudioOutput {
    commands: mpsc::Sender<OutputCommand>,
    running: Arc<AtomicBool>,
}

impl AudioOutput {
    /// The process-wide output, spawning the audio thread on first call.
    ///
    /// The device itself is opened lazily by the first `resume`/`play`.
    pub fn shared() -> &'static AudioOutput {
        SHARED_OUTPUT.get_or_init(AudioOutput::spawn)
    }

    fn spawn() -> Self {
        let (commands, rx) = mpsc::channel::<OutputCommand>();
        let running = Arc::new(AtomicBool::new(false));
        let thread_running = Arc::clone(&running);

        // On spawn failure `rx` is dropped and every command reports Closed.
        if let Err(e) = std::thread::Builder::new()
            .name("audio-output".into())
            .spawn(move || run_output_thread(rx, thread_running))
        {
            log::error!("failed to spawn audio-output thread: {e}");
        }

        Self { commands, running }
    }

    async fn request(&self, make: impl FnOnce(Reply) -> OutputCommand) -> Result<(), OutputError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(make(reply))
            .map_err(|_| OutputError::Closed)?;
        rx.await.map_err(|_| OutputError::Closed)?
    }
}

#[async_trait]
impl AudioSink for AudioOutput {
    fn state(&self) -> OutputState {
        if self.running.load(Ordering::Acquire) {
            OutputState::Running
        } else {
            OutputState::Suspended
        }
    }

    async fn resume(&self) -> Result<(), OutputError> {
        self.request(|reply| OutputCommand::Resume { reply }).await
    }

    async fn play(&self, buffer: AudioBuffer) -> Result<(), OutputError> {
        self.request(|done| OutputCommand::Play { buffer, done }).await
    }
}

/// [`AudioSink`] that forwards to [`AudioOutput::shared`], so the audio
/// thread is only spawned when sound is first needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedOutput;

#[async_trait]
impl AudioSink for SharedOutput {
    fn state(&self) -> OutputState {
        AudioOutput::shared().state()
    }

    async fn resume(&self) -> Result<(), OutputError> {
        AudioOutput::shared().resume().await
    }

    async fn play(&self, buffer: AudioBuffer) -> Result<(), OutputError> {
        AudioOutput::shared().play(buffer).await
    }
}

// ---------------------------------------------------------------------------
// Audio thread
// ---------------------------------------------------------------------------

fn run_output_thread(rx: mpsc::Receiver<OutputCommand>, running: Arc<AtomicBool>) {
    let mut device: Option<OutputDevice> = None;

    while let Ok(command) = rx.recv() {
        match command {
            OutputCommand::Resume { reply } => {
                let result = open_device(&mut device).and_then(|d| d.resume(&running));
                let _ = reply.send(result);
            }
            OutputCommand::Play { buffer, done } => {
                let ready = open_device(&mut device).and_then(|d| {
                    if !running.load(Ordering::Acquire) {
                        d.resume(&running)?;
                    }
                    Ok(d)
                });
                match ready {
                    Ok(d) => d.enqueue(buffer, done),
                    Err(e) => {
                        let _ = done.send(Err(e));
                    }
                }
            }
        }
    }

    log::debug!("audio-output: command channel closed");
}

fn open_device(slot: &mut Option<OutputDevice>) -> Result<&mut OutputDevice, OutputError> {
    if slot.is_none() {
        *slot = Some(OutputDevice::open(OUTPUT_SAMPLE_RATE)?);
    }
    slot.as_mut().ok_or(OutputError::NoDevice)
}

/// The open cpal stream plus the queue its callback drains.
struct OutputDevice {
    stream: cpal::Stream,
    queue: Arc<Mutex<PlaybackQueue>>,
    sample_rate: u32,
    channels: u16,
}

impl OutputDevice {
    /// Open the default output device, preferring an `f32` stream at
    /// `preferred_rate`, mono first.  The stream starts paused.
    fn open(preferred_rate: u32) -> Result<Self, OutputError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(OutputError::NoDevice)?;

        let config = choose_config(&device, preferred_rate)?;
        let sample_rate = config.sample_rate.0;
        let channels = config.channels;

        let queue = Arc::new(Mutex::new(PlaybackQueue::default()));
        let cb_queue = Arc::clone(&queue);

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| match cb_queue.lock() {
                Ok(mut q) => q.fill(data),
                Err(_) => data.fill(0.0),
            },
            |err: cpal::StreamError| {
                log::error!("cpal output stream error: {err}");
            },
            None,
        )?;

        if let Err(e) = stream.pause() {
            log::debug!("audio-output: could not pause new stream: {e}");
        }

        log::info!("Audio output opened ({sample_rate} Hz, {channels} ch)");

        Ok(Self {
            stream,
            queue,
            sample_rate,
            channels,
        })
    }

    fn resume(&self, running: &AtomicBool) -> Result<(), OutputError> {
        self.stream.play()?;
        running.store(true, Ordering::Release);
        Ok(())
    }

    fn enqueue(&self, buffer: AudioBuffer, done: Reply) {
        let resampled = resample_linear(&buffer.samples, buffer.sample_rate, self.sample_rate);
        let frames = mono_to_interleaved(&resampled, self.channels);

        match self.queue.lock() {
            Ok(mut q) => q.push(frames, done),
            Err(_) => {
                let _ = done.send(Err(OutputError::Closed));
            }
        }
    }
}

fn choose_config(device: &cpal::Device, rate: u32) -> Result<cpal::StreamConfig, OutputError> {
    let ranges: Vec<cpal::SupportedStreamConfigRange> = device
        .supported_output_configs()?
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .filter(|c| c.min_sample_rate().0 <= rate && rate <= c.max_sample_rate().0)
        .collect();

    let preferred = ranges
        .iter()
        .find(|c| c.channels() == 1)
        .or_else(|| ranges.first());

    if let Some(range) = preferred {
        return Ok(range.clone().with_sample_rate(cpal::SampleRate(rate)).config());
    }

    let default = device.default_output_config()?;
    if default.sample_format() != cpal::SampleFormat::F32 {
        return Err(OutputError::UnsupportedFormat(format!(
            "{:?}",
            default.sample_format()
        )));
    }
    Ok(default.config())
}

// ---------------------------------------------------------------------------
// PlaybackQueue
// ---------------------------------------------------------------------------

/// Interleaved samples waiting for the device, plus the completion
/// notifications of the buffers they came from.
#[derive(Default)]
struct PlaybackQueue {
    samples: VecDeque<f32>,
    /// Samples handed to the device so far.
    written: u64,
    /// Samples ever queued.
    queued: u64,
    /// `(end position, notification)` per queued buffer, in order.
    waiters: VecDeque<(u64, Reply)>,
}

impl PlaybackQueue {
    fn push(&mut self, samples: Vec<f32>, done: Reply) {
        self.queued += samples.len() as u64;
        self.samples.extend(samples);
        self.waiters.push_back((self.queued, done));
        self.notify();
    }

    /// Copy queued samples into `out`, padding with silence.
    fn fill(&mut self, out: &mut [f32]) {
        for slot in out.iter_mut() {
            *slot = match self.samples.pop_front() {
                Some(s) => {
                    self.written += 1;
                    s
                }
                None => 0.0,
            };
        }
        self.notify();
    }

    fn notify(&mut self) {
        while self
            .waiters
            .front()
            .is_some_and(|(end, _)| *end <= self.written)
        {
            if let Some((_, done)) = self.waiters.pop_front() {
                let _ = done.send(Ok(()));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
