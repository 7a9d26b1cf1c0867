// Per-frame driver
// Runs the speed loop at the display rate until told to stop

use std::rc::Rc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::session::{LoopSnapshot, SpeedLoop};
use crate::speed::PlaybackTransport;

/// Messages into the running frame loop
#[derive(Debug)]
pub enum FrameCommand {
    /// The user moved the slider
    Manual(f64),
    Snapshot(oneshot::Sender<LoopSnapshot>),
}

/// Handle to a frame loop spawned on the current `LocalSet`
pub struct FrameLoopHandle {
    commands: mpsc::UnboundedSender<FrameCommand>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<SpeedLoop>,
}

impl FrameLoopHandle {
    /// Forward a manual slider value; it is applied as soon as the loop sees it
    pub fn manual(&self, value: f64) {
        if self.commands.send(FrameCommand::Manual(value)).is_err() {
            log::warn!("Frame loop is gone, dropping slider input");
        }
    }

    pub async fn snapshot(&self) -> Option<LoopSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(FrameCommand::Snapshot(tx)).ok()?;
        rx.await.ok()
    }

    /// Cancel the loop and get the session half back
    pub async fn stop(self) -> Option<SpeedLoop> {
        let _ = self.shutdown.send(true);
        match self.task.await {
            Ok(speed) => Some(speed),
            Err(e) => {
                log::error!("Frame loop task failed: {}", e);
                None
            }
        }
    }
}

/// Spawn the loop on the current `LocalSet`.
///
/// `display` is called with the read-out text whenever it changes.
pub fn spawn_frame_loop<F>(
    speed: SpeedLoop,
    transport: Rc<dyn PlaybackTransport>,
    frame_rate_hz: f64,
    display: F,
) -> FrameLoopHandle
where
    F: FnMut(&str) + 'static,
{
    let (commands, command_rx) = mpsc::unbounded_channel();
    let (shutdown, shutdown_rx) = watch::channel(false);
    let frame_interval = Duration::from_secs_f64(1.0 / frame_rate_hz);

    let task = tokio::task::spawn_local(run_frame_loop(
        speed,
        transport,
        frame_interval,
        command_rx,
        shutdown_rx,
        display,
    ));

    FrameLoopHandle {
        commands,
        shutdown,
        task,
    }
}

pub async fn run_frame_loop<F>(
    mut speed: SpeedLoop,
    transport: Rc<dyn PlaybackTransport>,
    frame_interval: Duration,
    mut commands: mpsc::UnboundedReceiver<FrameCommand>,
    mut shutdown: watch::Receiver<bool>,
    mut display: F,
) -> SpeedLoop
where
    F: FnMut(&str),
{
    let mut ticker = tokio::time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut shown = speed.slider().label().to_string();
    display(&shown);

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                // A dropped sender also ends the loop
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            command = commands.recv() => match command {
                Some(FrameCommand::Manual(value)) => {
                    let rate = speed.on_manual_input(value, transport.as_ref());
                    log::debug!("manual speed {:.3}, rate {:?}", value, rate);
                }
                Some(FrameCommand::Snapshot(reply)) => {
                    let _ = reply.send(speed.snapshot());
                }
                None => break,
            },
            _ = ticker.tick() => {
                let update = speed.on_frame(transport.as_ref());
                log::trace!(
                    "frame: target {:.3} current {:.3} speed {:.2}",
                    update.target_activity,
                    update.current_activity,
                    update.target_speed
                );
            }
        }

        if speed.slider().label() != shown {
            shown = speed.slider().label().to_string();
            display(&shown);
        }
    }

    log::debug!("Frame loop stopped");
    speed
}
