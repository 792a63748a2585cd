//! Time subsystem.
//!
//! One `FrameClock` per window; `tick()` once per presented frame. Scenes
//! animate off `FrameTime::t` rather than wall-clock time.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
