//! The orchard session: every piece of mutable scene state in one place.

use std::collections::HashMap;

use glam::Vec3;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::apple::{Apple, AppleId, AppleState};
use crate::buildings::Building;
use crate::config::OrchardConfig;
use crate::error::ConfigError;
use crate::fall::{GravityMode, falling_placement};
use crate::lamp::Lamp;
use crate::pick::{PickRegistry, PickTarget};

/// Sound the scene would play if it had a speaker.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SoundCue {
    /// An apple snapped off its branch.
    Pluck,
    /// An apple hit the ground.
    Thud,
}

/// Something observable that happened during a session call.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SceneEvent {
    AppleGrown(AppleId),
    AppleDetached { id: AppleId, at: f32 },
    AppleLanded { id: AppleId, position: Vec3 },
    ApplePlacedOnDesk(AppleId),
    Regrown { count: usize },
    LampToggled { on: bool },
    GravityChanged(GravityMode),
    AudioToggled { on: bool },
    /// Only emitted while audio is enabled.
    Sound(SoundCue),
}

/// Owns apples, the fall queue, the lamp and the skyline.
///
/// All methods take the scene clock `now` (seconds) from the caller; the
/// session never reads a clock itself.
#[derive(Debug)]
pub struct Orchard {
    config: OrchardConfig,
    apples: Vec<Apple>,
    /// Fall start time per detached apple.
    falls: HashMap<AppleId, f32>,
    lamp: Lamp,
    buildings: Vec<Building>,
    registry: PickRegistry,
    gravity: GravityMode,
    audio: bool,
    next_spawn: f32,
    events: Vec<SceneEvent>,
}

impl Orchard {
    /// Validates `config` and lays out the skyline from `seed`.
    ///
    /// The tree starts bare; apples appear through [`grow`](Self::grow).
    pub fn new(config: OrchardConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut registry = PickRegistry::new(config.pick);
        let lamp_tag = registry
            .register(PickTarget::Lamp)
            .ok_or_else(|| ConfigError::new("pick.spacing", "no room for the lamp tag"))?;

        let mut rng = StdRng::seed_from_u64(seed);
        let buildings = config.buildings.generate(&mut rng);

        log::info!(
            "orchard: {} buildings from seed {seed}, up to {} apples",
            buildings.len(),
            config.capacity
        );

        Ok(Self {
            lamp: Lamp::new(lamp_tag, config.lamp_bulb),
            apples: Vec::with_capacity(config.capacity as usize),
            falls: HashMap::new(),
            buildings,
            registry,
            gravity: GravityMode::default(),
            audio: true,
            next_spawn: 0.0,
            events: Vec::new(),
            config,
        })
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    #[inline]
    pub fn config(&self) -> &OrchardConfig {
        &self.config
    }

    #[inline]
    pub fn apples(&self) -> &[Apple] {
        &self.apples
    }

    pub fn apple(&self, id: AppleId) -> Option<&Apple> {
        self.apples.get(id.0 as usize)
    }

    /// Pending falls keyed by apple, valued by start time.
    #[inline]
    pub fn falls(&self) -> &HashMap<AppleId, f32> {
        &self.falls
    }

    #[inline]
    pub fn lamp(&self) -> &Lamp {
        &self.lamp
    }

    #[inline]
    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    #[inline]
    pub fn registry(&self) -> &PickRegistry {
        &self.registry
    }

    #[inline]
    pub fn gravity_mode(&self) -> GravityMode {
        self.gravity
    }

    #[inline]
    pub fn audio_enabled(&self) -> bool {
        self.audio
    }

    /// Takes every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Growth ─────────────────────────────────────────────────────────────

    /// Adds apples whose spawn time has come, up to capacity.
    ///
    /// Returns how many apples were added.
    pub fn grow(&mut self, now: f32) -> usize {
        let mut grown = 0;
        while self.apples.len() < self.config.capacity as usize && now >= self.next_spawn {
            let slot = self.apples.len() as u8;
            let id = AppleId(slot);
            let Some(tag) = self.registry.register(PickTarget::Apple(id)) else {
                log::warn!("orchard: out of pick tags at {id}, tree stops growing");
                break;
            };

            let loc = self.config.canopy.default_loc(slot, self.config.apple_radius);
            self.apples.push(Apple::new(id, tag, loc));
            self.events.push(SceneEvent::AppleGrown(id));
            log::debug!("orchard: grew {id} with tag {}", tag.0);

            self.next_spawn += self.config.spawn_interval;
            grown += 1;
        }
        grown
    }

    // ── Picking ────────────────────────────────────────────────────────────

    /// Resolves a sampled ID-pass red value and applies the pick.
    ///
    /// Returns `false` when the value matches no entity.
    pub fn pick_sample(&mut self, red: u8, now: f32) -> bool {
        match self.registry.decode(red) {
            Some(target) => self.pick(target, now),
            None => {
                log::debug!("orchard: pick sample {red} matches nothing");
                false
            }
        }
    }

    /// Applies a click on `target`. Returns `true` if the scene changed.
    pub fn pick(&mut self, target: PickTarget, now: f32) -> bool {
        match target {
            PickTarget::Lamp => {
                self.toggle_lamp();
                true
            }
            PickTarget::Apple(id) => self.pick_apple(id, now),
        }
    }

    fn pick_apple(&mut self, id: AppleId, now: f32) -> bool {
        let desk = self.config.desk_slot(id);
        let Some(apple) = self.apples.get_mut(id.0 as usize) else {
            log::debug!("orchard: pick for {id} which has not grown yet");
            return false;
        };

        match apple.state {
            AppleState::OnTree => {
                apple.state = AppleState::Falling;
                self.falls.insert(id, now);
                self.events.push(SceneEvent::AppleDetached { id, at: now });
                log::info!("orchard: {id} picked at t={now:.2}");
                self.cue(SoundCue::Pluck);
                true
            }
            AppleState::Falling | AppleState::Grounded => {
                apple.state = AppleState::OnDesk;
                apple.placement = desk;
                self.falls.remove(&id);
                self.events.push(SceneEvent::ApplePlacedOnDesk(id));
                log::info!("orchard: {id} placed on the desk");
                true
            }
            AppleState::OnDesk => {
                log::debug!("orchard: {id} is already on the desk");
                false
            }
        }
    }

    // ── Per-frame ──────────────────────────────────────────────────────────

    /// Grows due apples and advances every fall to `now`.
    pub fn update(&mut self, now: f32) {
        self.grow(now);

        if self.falls.is_empty() {
            return;
        }

        let g = self.config.gravity * self.gravity.factor();
        let rate = self.config.tumble_rate;
        let radius = self.config.apple_radius;

        let mut pending: Vec<(AppleId, f32)> = self.falls.iter().map(|(id, t)| (*id, *t)).collect();
        pending.sort_by_key(|(id, _)| *id);

        for (id, start) in pending {
            let Some(apple) = self.apples.get_mut(id.0 as usize) else {
                self.falls.remove(&id);
                continue;
            };

            apple.placement = falling_placement(apple.default_loc, g, rate, now - start);
            let pos = apple.position();
            log::trace!("orchard: {id} at {pos}");

            if self.config.ground.contact(pos, radius) {
                apple.state = AppleState::Grounded;
                self.falls.remove(&id);
                self.events.push(SceneEvent::AppleLanded { id, position: pos });
                log::info!("orchard: {id} landed at ({:.2}, {:.2}, {:.2})", pos.x, pos.y, pos.z);
                self.cue(SoundCue::Thud);
            }
        }
    }

    // ── Commands ───────────────────────────────────────────────────────────

    /// Puts every detached apple back on the tree and clears the fall queue.
    ///
    /// Returns how many apples were reset.
    pub fn regrow(&mut self) -> usize {
        let mut count = 0;
        for apple in self.apples.iter_mut().filter(|a| !a.on_tree()) {
            apple.reset();
            count += 1;
        }
        self.falls.clear();
        self.events.push(SceneEvent::Regrown { count });
        log::info!("orchard: regrew {count} apples");
        count
    }

    pub fn toggle_lamp(&mut self) -> bool {
        let on = self.lamp.toggle();
        self.events.push(SceneEvent::LampToggled { on });
        log::info!("orchard: lamp {}", if on { "on" } else { "off" });
        on
    }

    /// Switches between full and half gravity. Falls in flight pick up the
    /// new value on the next update.
    pub fn toggle_gravity(&mut self) -> GravityMode {
        self.gravity = self.gravity.toggled();
        self.events.push(SceneEvent::GravityChanged(self.gravity));
        log::info!("orchard: gravity {:?} ({} m/s²)", self.gravity, self.config.gravity * self.gravity.factor());
        self.gravity
    }

    pub fn toggle_audio(&mut self) -> bool {
        self.audio = !self.audio;
        self.events.push(SceneEvent::AudioToggled { on: self.audio });
        log::info!("orchard: audio {}", if self.audio { "on" } else { "muted" });
        self.audio
    }

    fn cue(&mut self, cue: SoundCue) {
        if self.audio {
            self.events.push(SceneEvent::Sound(cue));
        }
    }
}
