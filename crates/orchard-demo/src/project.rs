//! The orchard scene: simulation, meshes, and the per-frame draw sequence.

use std::path::PathBuf;

use anyhow::Result;
use glam::Vec3;

use orchard_engine::core::{App, AppControl, FrameCtx};
use orchard_engine::input::MouseButton;
use orchard_engine::paint::Color;
use orchard_engine::render::mesh::{cone, cube, prism, subdivision_sphere};
use orchard_engine::render::{
    sky_material, sky_transform, MeshRenderer, MeshStore, PickReadback, PickRenderer, SkyRenderer,
    Texture, SKY_UV_SCALE,
};
use orchard_engine::scene::{DrawList, FrameState, Light, Material, MeshId, PickList};
use orchard_sim::{AppleState, BuildingKind, Orchard, Primitive, SceneEvent, SoundCue};

use crate::camera::{projection, Camera};
use crate::controls::{self, Action};
use crate::props::Props;

const CLEAR: Color = Color::rgb(0.02, 0.02, 0.04);

/// Main light: white point at (10, 10, 0), attenuation size 1000.
const SUN_POSITION: Vec3 = Vec3::new(10.0, 10.0, 0.0);
const SUN_SIZE: f32 = 1000.0;
const LAMP_SIZE: f32 = 20.0;

/// Mesh handles, filled in on start.
struct Meshes {
    cube: MeshId,
    sphere: MeshId,
    sky: MeshId,
    picker: MeshId,
    cone: MeshId,
    prism: MeshId,
}

/// GPU-side state, created once the device exists.
struct GpuScene {
    store: MeshStore,
    meshes: Meshes,
    lit: MeshRenderer,
    sky: SkyRenderer,
    pick: PickRenderer,
    readback: PickReadback,
}

/// Scene materials.
struct Palette {
    meadow: Material,
    hill: Material,
    buildings: [Material; 4],
    floor: Material,
    wall: Material,
    wood: Material,
    bark: Material,
    leaves: Material,
    apple: Material,
    bruised: Material,
    lamp_metal: Material,
    shade: Material,
    bulb_off: Material,
    bulb_on: Material,
}

impl Palette {
    fn new() -> Self {
        let hex = |h: &str| Color::from_hex(h).unwrap_or(Color::WHITE);
        let bulb_off = Material::gouraud(hex("#bfbfbf")).with_ambient(0.3);
        Self {
            meadow: Material::phong(hex("#00ff00")).with_ambient(0.4).with_diffusivity(0.6),
            hill: Material::gouraud(hex("#5b7f2a")).with_ambient(0.3).with_specularity(0.1),
            buildings: [
                Material::gouraud(hex("#9aa0a6")).with_ambient(0.3).with_specularity(0.2),
                Material::gouraud(hex("#c9b79c")).with_ambient(0.3).with_specularity(0.2),
                Material::phong(hex("#7d8fa3")).with_ambient(0.3).with_specularity(0.6),
                Material::gouraud(hex("#a0522d")).with_ambient(0.3).with_specularity(0.1),
            ],
            floor: Material::gouraud(hex("#8b6b4a")).with_ambient(0.35).with_specularity(0.2),
            wall: Material::gouraud(hex("#e8dcc4")).with_ambient(0.4).with_specularity(0.05),
            wood: Material::phong(hex("#6b4226")).with_ambient(0.3).with_specularity(0.4),
            bark: Material::gouraud(hex("#4a3020")).with_ambient(0.3).with_specularity(0.05),
            leaves: Material::phong(hex("#2e6b1f")).with_ambient(0.3).with_specularity(0.2),
            apple: Material::phong(hex("#c8102e")).with_ambient(0.3).with_smoothness(60.0),
            bruised: Material::phong(hex("#8e1b22")).with_ambient(0.3).with_specularity(0.3),
            lamp_metal: Material::phong(hex("#303236")).with_ambient(0.2),
            shade: Material::gouraud(hex("#f3e5ab")).with_ambient(0.4),
            bulb_off,
            bulb_on: bulb_off.with_color(hex("#fff4c2")).with_ambient(1.0),
        }
    }
}

/// Orchard scene application.
pub struct Project {
    orchard: Orchard,
    props: Props,
    camera: Camera,
    palette: Palette,
    sky_path: PathBuf,

    gpu: Option<GpuScene>,
    draws: DrawList,
    picks: PickList,
}

impl Project {
    pub fn new(orchard: Orchard, sky_path: PathBuf) -> Self {
        let props = Props::new(orchard.config());
        let camera = Camera::new(props.desk_focus, props.tree_focus);
        Self {
            orchard,
            props,
            camera,
            palette: Palette::new(),
            sky_path,
            gpu: None,
            draws: DrawList::new(),
            picks: PickList::new(),
        }
    }

    fn apply(&mut self, action: Action) -> AppControl {
        match action {
            Action::CycleCamera => {
                let mode = self.camera.cycle();
                log::info!("camera: {mode:?}");
            }
            Action::Regrow => {
                self.orchard.regrow();
            }
            Action::ToggleGravity => {
                self.orchard.toggle_gravity();
            }
            Action::ToggleAudio => {
                self.orchard.toggle_audio();
            }
            Action::ToggleLamp => {
                self.orchard.toggle_lamp();
            }
            Action::Quit => return AppControl::Exit,
        }
        AppControl::Continue
    }

    fn title(&self) -> String {
        let lamp = if self.orchard.lamp().is_on { "on" } else { "off" };
        let audio = if self.orchard.audio_enabled() { "on" } else { "muted" };
        format!(
            "orchard | camera {:?} | gravity {:?} | audio {audio} | lamp {lamp}",
            self.camera.mode(),
            self.orchard.gravity_mode(),
        )
    }

    fn report_events(&mut self) {
        for event in self.orchard.drain_events() {
            match event {
                SceneEvent::Sound(SoundCue::Pluck) => log::info!("sound: pluck"),
                SceneEvent::Sound(SoundCue::Thud) => log::info!("sound: thud"),
                other => log::trace!("scene event {other:?}"),
            }
        }
    }

    fn frame_state(&self, aspect: f32) -> FrameState {
        let mut frame = FrameState::new(self.camera.view(), projection(aspect));
        frame.lights.push(Light::point(SUN_POSITION, Color::WHITE, SUN_SIZE));
        let lamp = self.orchard.lamp();
        if lamp.is_on {
            frame.lights.push(Light::point(lamp.bulb, Color::rgb(1.0, 0.85, 0.6), LAMP_SIZE));
        }
        frame
    }

    /// Records the visible pass and the ID pass for this frame.
    fn record(&mut self, meshes: &Meshes) {
        let p = &self.palette;
        let props = &self.props;
        self.draws.clear();
        self.picks.clear();

        // Ground.
        self.draws.push(meshes.cube, props.meadow, p.meadow);
        for slab in props.ground_slabs {
            self.draws.push(meshes.cube, slab, p.hill);
        }

        // Skyline.
        let ground_y = self.orchard.config().buildings.ground_y;
        for (i, building) in self.orchard.buildings().iter().enumerate() {
            let material = p.buildings[kind_index(building.kind)];
            let body = if i % 3 == 0 { material.with_ambient(0.4) } else { material };
            for part in building.parts(ground_y) {
                let mesh = match part.primitive {
                    Primitive::Cube => meshes.cube,
                    Primitive::Sphere => meshes.sphere,
                    Primitive::Cone => meshes.cone,
                    Primitive::Prism => meshes.prism,
                };
                self.draws.push(mesh, part.transform, body);
            }
        }

        // Room and desk.
        for (i, wall) in props.room.iter().enumerate() {
            let material = if i == 0 { p.floor } else { p.wall };
            self.draws.push(meshes.cube, *wall, material);
            self.picks.push_occluder(meshes.cube, *wall);
        }
        self.draws.push(meshes.cube, props.desk_top, p.wood);
        self.picks.push_occluder(meshes.cube, props.desk_top);
        for leg in props.desk_legs {
            self.draws.push(meshes.cube, leg, p.wood);
        }

        // Tree.
        self.draws.push(meshes.cube, props.trunk, p.bark);
        self.draws.push(meshes.sphere, props.crown, p.leaves);
        self.picks.push_occluder(meshes.cube, props.trunk);
        self.picks.push_occluder(meshes.sphere, props.crown);

        // Apples.
        for apple in self.orchard.apples() {
            let material = match apple.state {
                AppleState::Grounded => p.bruised,
                _ => p.apple,
            };
            self.draws.push(meshes.sphere, apple.placement, material);
            self.picks.push(meshes.sphere, apple.placement, apple.tag.0);
        }

        // Lamp.
        let lamp = self.orchard.lamp();
        let bulb = if lamp.is_on { p.bulb_on } else { p.bulb_off };
        self.draws.push(meshes.cube, props.lamp_stand, p.lamp_metal);
        self.draws.push(meshes.cone, props.lamp_shade, p.shade);
        self.draws.push(meshes.picker, props.lamp_bulb, bulb);
        self.picks.push(meshes.picker, props.lamp_bulb, lamp.tag.0);
        self.picks.push(meshes.cone, props.lamp_shade, lamp.tag.0);
    }
}

fn kind_index(kind: BuildingKind) -> usize {
    BuildingKind::ALL.iter().position(|k| *k == kind).unwrap_or(0)
}

impl App for Project {
    fn on_start(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<()> {
        let device = ctx.gpu.device();
        let queue = ctx.gpu.queue();

        let mut store = MeshStore::new();
        let meshes = Meshes {
            cube: store.upload(device, "cube", &cube()),
            sphere: store.upload(device, "sphere", &subdivision_sphere(4)),
            sky: store.upload(device, "sky", &subdivision_sphere(4).scale_uvs(SKY_UV_SCALE)),
            picker: store.upload(device, "picker", &subdivision_sphere(2).flat_shaded()),
            cone: store.upload(device, "cone", &cone(24)),
            prism: store.upload(device, "prism", &prism()),
        };

        let mut sky = SkyRenderer::new();
        sky.set_texture(Texture::from_path(device, queue, &self.sky_path, "orchard sky"));

        self.gpu = Some(GpuScene {
            store,
            meshes,
            lit: MeshRenderer::new(),
            sky,
            pick: PickRenderer::new(),
            readback: PickReadback::new(device),
        });

        for line in controls::help_lines() {
            log::info!("  {line}");
        }
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let now = ctx.time.t;

        // Apply last frame's pick before anything else moves.
        let sample = self.gpu.as_mut().and_then(|gpu| gpu.readback.poll());
        if let Some(red) = sample {
            log::debug!("pick sample red={red}");
            if self.orchard.pick_sample(red, now) {
                ctx.runtime.set_title(self.title());
            }
        }

        let actions = controls::actions(&ctx.input_frame.events);
        for &action in &actions {
            if self.apply(action) == AppControl::Exit {
                return AppControl::Exit;
            }
        }
        if !actions.is_empty() {
            ctx.runtime.set_title(self.title());
        }
        self.camera.update(controls::camera_input(ctx.input, ctx.input_frame), ctx.time.dt);

        // Click latch: one read-back in flight at a time.
        let viewport = ctx.viewport();
        let pixel = ctx
            .input_frame
            .first_press(MouseButton::Left)
            .and_then(|press| viewport.pixel_at(press.x, press.y, ctx.window.scale_factor()));
        let click = self.gpu.as_ref().and_then(|g| g.readback.try_begin(pixel));

        self.orchard.update(now);
        self.report_events();

        let frame = self.frame_state(viewport.aspect());
        let Some(mut gpu) = self.gpu.take() else {
            return AppControl::Continue;
        };
        self.record(&gpu.meshes);

        let draws = &self.draws;
        let picks = &self.picks;
        let mut copied = false;
        let control = ctx.render(CLEAR, |rctx, target| {
            let GpuScene { store, meshes, lit, sky, pick, readback } = &mut gpu;

            if let Some(dome) = store.get(meshes.sky) {
                sky.render(rctx, target, &frame, dome, sky_transform(now), &sky_material());
            }
            lit.render(rctx, target, &frame, store, draws);

            if let Some((x, y)) = click {
                pick.render(rctx, target.encoder, &frame, store, picks);
                copied = pick.copy_pixel(target.encoder, readback, x, y);
            }
        });

        // The copy is in the submitted frame now; start the async map.
        if copied {
            gpu.readback.begin_map();
        }
        self.gpu = Some(gpu);
        control
    }
}
