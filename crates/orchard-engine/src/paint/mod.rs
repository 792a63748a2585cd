//! Color model shared between scenes and renderers.
//!
//! Colors are linear; the swapchain is sRGB so the hardware encodes on write.

pub mod color;

pub use color::Color;
