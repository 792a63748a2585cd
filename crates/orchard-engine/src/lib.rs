//! Orchard engine crate.
//!
//! Platform + GPU runtime for small lit 3D scenes: window loop, device and
//! depth buffer, input translation, frame clock, mesh/sky renderers and the
//! offscreen ID pass used for mouse picking.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod scene;
