//! Orchard scene state.
//!
//! Everything the orchard demo decides without a GPU: which apples hang on the
//! tree, which are falling and where, when they touch the hill, what a sampled
//! pick pixel refers to, and the skyline layout. The engine only draws what
//! [`Orchard`] reports.

pub mod apple;
pub mod buildings;
pub mod config;
pub mod error;
pub mod fall;
pub mod ground;
pub mod lamp;
pub mod orchard;
pub mod pick;

pub use apple::{Apple, AppleId, AppleState, Canopy};
pub use buildings::{Building, BuildingKind, BuildingLayout, BuildingPart, Primitive};
pub use config::{DESK_ROW, MAX_APPLES, OrchardConfig};
pub use error::ConfigError;
pub use fall::GravityMode;
pub use ground::{GroundModel, GroundZone};
pub use lamp::Lamp;
pub use orchard::{Orchard, SceneEvent, SoundCue};
pub use pick::{BACKGROUND_TAG, PickPolicy, PickRegistry, PickTag, PickTarget};
