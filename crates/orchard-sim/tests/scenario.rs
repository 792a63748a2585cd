use orchard_sim::fall::fall_drop;
use orchard_sim::{
    AppleId, AppleState, BuildingLayout, GravityMode, Orchard, OrchardConfig, PickPolicy, PickTarget,
    SceneEvent,
};

fn full_tree(seed: u64) -> Orchard {
    let cfg = OrchardConfig { spawn_interval: 0.0, ..OrchardConfig::default() };
    let mut orchard = Orchard::new(cfg, seed).unwrap();
    orchard.update(0.0);
    orchard
}

fn assert_tree_desk_exclusive(o: &Orchard) {
    for a in o.apples() {
        assert!(!(a.on_tree() && a.on_desk()), "{} is on tree and desk", a.id);
    }
}

#[test]
fn picking_apple_zero_queues_its_fall() {
    let mut o = full_tree(0);
    let first = o.apple(AppleId(0)).unwrap();
    assert!(first.on_tree());
    let tag = first.tag;

    let t_click = 3.75;
    assert!(o.pick_sample(tag.0, t_click));

    let a = o.apple(AppleId(0)).unwrap();
    assert!(!a.on_tree());
    assert_eq!(a.state, AppleState::Falling);
    assert_eq!(o.falls().len(), 1);
    assert_eq!(o.falls().get(&AppleId(0)), Some(&t_click));
}

#[test]
fn fall_follows_closed_form_until_contact() {
    let mut o = full_tree(0);
    let start = o.apple(AppleId(5)).unwrap().position();
    o.pick(PickTarget::Apple(AppleId(5)), 1.0);

    let dt = 0.3;
    o.update(1.0 + dt);
    let now = o.apple(AppleId(5)).unwrap().position();
    let expected = fall_drop(9.8, dt);
    assert!((start.y - now.y - expected).abs() < 1e-4);
    assert!((start.x - now.x).abs() < 1e-5);
    assert!((start.z - now.z).abs() < 1e-5);
}

#[test]
fn landed_apple_rests_near_the_hill() {
    let mut o = full_tree(0);
    let cfg = o.config().clone();
    o.pick(PickTarget::Apple(AppleId(7)), 0.0);

    let mut t = 0.0;
    let mut landed = None;
    while landed.is_none() {
        t += 1.0 / 120.0;
        o.update(t);
        landed = o.drain_events().into_iter().find_map(|e| match e {
            SceneEvent::AppleLanded { id, position } if id == AppleId(7) => Some(position),
            _ => None,
        });
        assert!(t < 5.0);
    }

    let pos = landed.unwrap();
    let ground = cfg.ground.height_at(pos.x, pos.z);
    assert!(pos.y - cfg.apple_radius <= ground);
    // One frame of fall at landing speed is well under half a unit.
    assert!(pos.y - cfg.apple_radius > ground - 0.5);
    assert!(cfg.ground.contact(pos, cfg.apple_radius));
}

#[test]
fn full_life_cycle_then_regrow() {
    let mut o = full_tree(11);
    let ids: Vec<AppleId> = o.apples().iter().map(|a| a.id).collect();

    for (i, id) in ids.iter().enumerate() {
        o.pick(PickTarget::Apple(*id), i as f32 * 0.1);
        assert_tree_desk_exclusive(&o);
    }
    o.update(2.0);
    assert_tree_desk_exclusive(&o);
    for id in ids.iter().step_by(2) {
        o.pick(PickTarget::Apple(*id), 2.0);
        assert_tree_desk_exclusive(&o);
    }

    assert!(o.apples().iter().all(|a| !a.on_tree()));
    assert_eq!(o.regrow(), ids.len());
    assert!(o.falls().is_empty());
    for a in o.apples() {
        assert!(a.on_tree());
        assert!(!a.on_desk());
        assert_eq!(a.placement, a.default_loc);
    }
}

#[test]
fn regrow_interrupts_a_fall() {
    let mut o = full_tree(0);
    o.pick(PickTarget::Apple(AppleId(1)), 0.0);
    o.update(0.2);
    o.regrow();
    o.update(0.4);
    let a = o.apple(AppleId(1)).unwrap();
    assert!(a.on_tree());
    assert_eq!(a.placement, a.default_loc);
}

#[test]
fn tolerant_decoder_accepts_rounding_neighbour() {
    let cfg = OrchardConfig {
        spawn_interval: 0.0,
        pick: PickPolicy { spacing: 4, tolerance: 1 },
        ..OrchardConfig::default()
    };
    let mut o = Orchard::new(cfg, 0).unwrap();
    o.update(0.0);

    let tag = o.apple(AppleId(2)).unwrap().tag;
    assert!(o.pick_sample(tag.0 + 1, 0.0));
    assert!(o.apple(AppleId(2)).unwrap().is_falling());
    assert!(!o.pick_sample(tag.0 + 2, 0.0));
}

#[test]
fn skyline_is_a_function_of_seed() {
    let a = full_tree(2024);
    let b = full_tree(2024);
    let c = full_tree(2025);
    assert_eq!(a.buildings(), b.buildings());
    assert_ne!(a.buildings(), c.buildings());
    assert_eq!(a.buildings().len(), BuildingLayout::default().count);
}

#[test]
fn gravity_toggle_round_trips() {
    let mut o = full_tree(0);
    assert_eq!(o.gravity_mode(), GravityMode::Full);
    assert_eq!(o.toggle_gravity(), GravityMode::Half);
    assert_eq!(o.toggle_gravity(), GravityMode::Full);
}
