// Looping audio player
// Renders the clip at the current playback rate into the output ring

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::clip::AudioClip;
use super::output::{AudioOutput, OutputWriter};
use super::varispeed::{LoopVoice, RateParam};
use crate::error::{AudioError, TransportError};
use crate::speed::PlaybackTransport;

/// Frames rendered per write into the ring
const RENDER_BLOCK_FRAMES: usize = 256;

#[derive(Debug, Default)]
struct RenderFlags {
    running: AtomicBool,
    playing: AtomicBool,
    restart: AtomicBool,
}

pub struct Player {
    output: AudioOutput,
    rate: RateParam,
    flags: Arc<RenderFlags>,
    render_thread: Option<JoinHandle<()>>,
}

impl Player {
    /// Open the output device and prepare the clip for looped playback
    pub fn new(clip: AudioClip) -> Result<Self, AudioError> {
        let output = AudioOutput::new()?;
        let clip = Arc::new(clip.resampled(output.sample_rate())?);
        log::info!(
            "Loaded {:.1}s loop, {} ch",
            clip.duration_secs(),
            clip.channels()
        );

        let rate = RateParam::new(1.0);
        let flags = Arc::new(RenderFlags::default());
        flags.running.store(true, Ordering::SeqCst);

        let voice = LoopVoice::new(
            clip,
            output.channels() as usize,
            output.sample_rate(),
            rate.clone(),
        );
        let writer = output.writer();
        let thread_flags = Arc::clone(&flags);
        let channels = output.channels() as usize;

        let render_thread = thread::Builder::new()
            .name("shakeplay-render".to_string())
            .spawn(move || render_loop(voice, writer, thread_flags, channels))
            .map_err(|e| AudioError::Stream(format!("failed to spawn render thread: {}", e)))?;

        Ok(Self {
            output,
            rate,
            flags,
            render_thread: Some(render_thread),
        })
    }

    /// Start looping from the beginning
    pub fn start(&self) {
        self.flags.restart.store(true, Ordering::SeqCst);
        self.flags.playing.store(true, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.flags.playing.store(false, Ordering::SeqCst);
        self.output.clear();
    }

    pub fn is_playing(&self) -> bool {
        self.flags.playing.load(Ordering::SeqCst)
    }
}

impl PlaybackTransport for Player {
    fn is_playing(&self) -> bool {
        Player::is_playing(self)
    }

    fn set_rate_target(&self, rate: f64, time_constant_s: f64) {
        self.rate.set_target_at_time(rate, time_constant_s);
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.flags.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.render_thread.take() {
            if handle.join().is_err() {
                log::error!("Render thread panicked");
            }
        }
    }
}

/// Outcome of one pass of the render thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderStep {
    Stopped,
    RingFull,
    Wrote,
}

fn render_loop(mut voice: LoopVoice, writer: OutputWriter, flags: Arc<RenderFlags>, channels: usize) {
    let mut block = vec![0.0f32; RENDER_BLOCK_FRAMES * channels];

    while flags.running.load(Ordering::SeqCst) {
        match render_step(&mut voice, &writer, &flags, &mut block) {
            RenderStep::Stopped => thread::sleep(Duration::from_millis(5)),
            RenderStep::RingFull => thread::sleep(Duration::from_millis(2)),
            RenderStep::Wrote => {}
        }
    }

    log::debug!("Render thread exiting");
}

fn render_step(
    voice: &mut LoopVoice,
    writer: &OutputWriter,
    flags: &RenderFlags,
    block: &mut [f32],
) -> RenderStep {
    if !flags.playing.load(Ordering::SeqCst) {
        return RenderStep::Stopped;
    }

    if flags.restart.swap(false, Ordering::SeqCst) {
        voice.restart();
    }

    if writer.available_space() < block.len() {
        return RenderStep::RingFull;
    }

    voice.render(block);

    // A stop may have landed while the block was rendering
    if !flags.playing.load(Ordering::SeqCst) {
        return RenderStep::Stopped;
    }

    writer.write(block);

    // Or while it was being written, after the callback already drained
    if !flags.playing.load(Ordering::SeqCst) {
        writer.clear();
        return RenderStep::Stopped;
    }

    RenderStep::Wrote
}

/// The transport as the rest of the app sees it.
///
/// Without a loaded asset the controls are disabled but the slider path
/// keeps working.
pub struct Deck {
    player: Option<Player>,
}

impl Deck {
    pub fn loaded(player: Player) -> Self {
        Self {
            player: Some(player),
        }
    }

    pub fn disabled() -> Self {
        Self { player: None }
    }

    pub fn controls_enabled(&self) -> bool {
        self.player.is_some()
    }

    pub fn start(&self) -> Result<(), TransportError> {
        let player = self.player.as_ref().ok_or(TransportError::ControlsDisabled)?;
        player.start();
        Ok(())
    }

    pub fn stop(&self) -> Result<(), TransportError> {
        let player = self.player.as_ref().ok_or(TransportError::ControlsDisabled)?;
        player.stop();
        Ok(())
    }

    /// Start if stopped, stop if playing; returns whether it is now playing
    pub fn toggle(&self) -> Result<bool, TransportError> {
        if self.is_playing() {
            self.stop()?;
            Ok(false)
        } else {
            self.start()?;
            Ok(true)
        }
    }
}

impl PlaybackTransport for Deck {
    fn is_playing(&self) -> bool {
        self.player.as_ref().is_some_and(Player::is_playing)
    }

    fn set_rate_target(&self, rate: f64, time_constant_s: f64) {
        if let Some(player) = &self.player {
            player.set_rate_target(rate, time_constant_s);
        }
    }
}
