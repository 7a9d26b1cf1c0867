// Control module
// Wires motion input and the per-frame speed loop into one session

pub mod frame_loop;
pub mod session;

pub use frame_loop::{spawn_frame_loop, FrameCommand, FrameLoopHandle};
pub use session::{new_session, FrameUpdate, LoopSnapshot, MotionIngest, SpeedLoop};
