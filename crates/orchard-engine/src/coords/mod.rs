//! Screen-space coordinate helpers.
//!
//! Pointer positions arrive in logical pixels (origin top-left, +Y down);
//! render targets are sized in physical pixels.

mod viewport;

pub use viewport::Viewport;
