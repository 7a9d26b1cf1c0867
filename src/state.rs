// Application state management
use std::rc::Rc;

use crate::audio::Deck;
use crate::control::{FrameLoopHandle, MotionIngest};
use crate::motion::permission::SensorAccess;

/// Everything the command handlers act on. Lives on the runtime's single
/// thread; the frame loop runs alongside it as a local task.
pub struct AppState {
    pub deck: Rc<Deck>,
    pub ingest: MotionIngest,
    pub frame_loop: FrameLoopHandle,
    pub sensor: SensorAccess,
}

impl AppState {
    pub fn new(
        deck: Rc<Deck>,
        ingest: MotionIngest,
        frame_loop: FrameLoopHandle,
        sensor: SensorAccess,
    ) -> Self {
        Self {
            deck,
            ingest,
            frame_loop,
            sensor,
        }
    }

    /// Stop playback and the frame loop
    pub async fn shutdown(self) {
        let _ = self.deck.stop();
        self.frame_loop.stop().await;
    }
}
