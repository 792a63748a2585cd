//! Static scene furniture placed around the simulation's anchors.

use glam::{Mat4, Vec3};
use orchard_sim::{OrchardConfig, DESK_ROW};

const DESK_THICKNESS: f32 = 0.1;
const DESK_MARGIN: f32 = 0.6;
const LEG_HALF_WIDTH: f32 = 0.08;
const BULB_RADIUS: f32 = 0.22;

/// Unit-cube transform spanning `min..max`.
fn box_between(min: Vec3, max: Vec3) -> Mat4 {
    Mat4::from_translation(0.5 * (min + max)) * Mat4::from_scale(0.5 * (max - min))
}

/// Transforms of everything that is neither an apple nor a building.
#[derive(Debug, Clone)]
pub struct Props {
    /// Flat plane the skyline stands on.
    pub meadow: Mat4,
    pub ground_slabs: [Mat4; 3],
    pub room: Vec<Mat4>,
    pub desk_top: Mat4,
    pub desk_legs: [Mat4; 4],
    pub trunk: Mat4,
    pub crown: Mat4,
    pub lamp_stand: Mat4,
    pub lamp_shade: Mat4,
    pub lamp_bulb: Mat4,

    /// Where the desk camera looks.
    pub desk_focus: Vec3,
    /// Where the tree camera looks.
    pub tree_focus: Vec3,
}

impl Props {
    pub fn new(config: &OrchardConfig) -> Self {
        let ground = &config.ground;
        let ground_slabs = [0, 1, 2].map(|i| ground.slab_transform(i, 0.4));

        // Desk top: its upper face is the plane apples rest on.
        let rows = config.desk_rows() as f32;
        let columns = DESK_ROW as f32;
        let a = config.desk_anchor;
        let top_min = Vec3::new(
            a.x - DESK_MARGIN,
            a.y - DESK_THICKNESS,
            a.z - (rows - 1.0) * config.desk_spacing - DESK_MARGIN,
        );
        let top_max = Vec3::new(a.x + (columns - 1.0) * config.desk_spacing + DESK_MARGIN, a.y, a.z + DESK_MARGIN);
        let desk_top = box_between(top_min, top_max);

        let floor_y = config.buildings.ground_y;
        let inset = 2.0 * LEG_HALF_WIDTH;
        let desk_legs = [
            (top_min.x + inset, top_min.z + inset),
            (top_max.x - inset, top_min.z + inset),
            (top_min.x + inset, top_max.z - inset),
            (top_max.x - inset, top_max.z - inset),
        ]
        .map(|(x, z)| {
            box_between(
                Vec3::new(x - LEG_HALF_WIDTH, floor_y, z - LEG_HALF_WIDTH),
                Vec3::new(x + LEG_HALF_WIDTH, top_min.y, z + LEG_HALF_WIDTH),
            )
        });

        // Room: floor, back wall, side wall, wrapped around the desk.
        let room_min = Vec3::new(top_min.x - 2.5, floor_y, top_min.z - 3.0);
        let room_max = Vec3::new(top_max.x + 2.5, floor_y + 5.0, top_max.z + 2.0);
        let room = vec![
            box_between(room_min - Vec3::Y * 0.1, Vec3::new(room_max.x, floor_y, room_max.z)),
            box_between(Vec3::new(room_max.x, floor_y, room_min.z), room_max + Vec3::X * 0.2),
            box_between(room_min - Vec3::Z * 0.2, Vec3::new(room_max.x, room_max.y, room_min.z)),
        ];

        // Tree: trunk from the hill to the crown center.
        let canopy = config.canopy;
        let base = Vec3::new(canopy.center.x, ground.height_at(canopy.center.x, canopy.center.z), canopy.center.z);
        let trunk = box_between(
            base - Vec3::new(0.35, 0.2, 0.35),
            Vec3::new(canopy.center.x + 0.35, canopy.center.y, canopy.center.z + 0.35),
        );
        // Slightly smaller than the anchor sphere so apples stand out of the leaves.
        let crown = Mat4::from_translation(canopy.center)
            * Mat4::from_scale(Vec3::new(1.0, 0.85, 1.0) * (canopy.radius - 0.1));

        // Lamp on the desk, bulb at the configured point.
        let bulb = config.lamp_bulb;
        let lamp_stand = box_between(
            Vec3::new(bulb.x - 0.05, a.y, bulb.z - 0.05),
            Vec3::new(bulb.x + 0.05, bulb.y - BULB_RADIUS, bulb.z + 0.05),
        );
        let lamp_shade = Mat4::from_translation(bulb + Vec3::Y * 0.05) * Mat4::from_scale(Vec3::new(0.45, 0.4, 0.45));
        let lamp_bulb = Mat4::from_translation(bulb) * Mat4::from_scale(Vec3::splat(BULB_RADIUS));

        Self {
            meadow: Mat4::from_translation(Vec3::new(0.0, floor_y - 0.05, 0.0))
                * Mat4::from_scale(Vec3::new(100.0, 0.05, 100.0)),
            ground_slabs,
            room,
            desk_top,
            desk_legs,
            trunk,
            crown,
            lamp_stand,
            lamp_shade,
            lamp_bulb,
            desk_focus: 0.5 * (top_min + top_max) + Vec3::Y * 1.0,
            tree_focus: canopy.center,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchard_sim::AppleId;

    fn top_face_y(m: Mat4) -> f32 {
        m.transform_point3(Vec3::Y).y
    }

    #[test]
    fn apples_rest_on_the_desk_top() {
        let config = OrchardConfig::default();
        let props = Props::new(&config);
        assert!((top_face_y(props.desk_top) - config.desk_anchor.y).abs() < 1e-5);

        let lo = props.desk_top.transform_point3(Vec3::NEG_ONE);
        let hi = props.desk_top.transform_point3(Vec3::ONE);
        for i in 0..config.capacity {
            let c = config.desk_slot(AppleId(i)).w_axis.truncate();
            assert!(c.x > lo.x && c.x < hi.x, "{i}: x {} outside desk", c.x);
            assert!(c.z > lo.z && c.z < hi.z, "{i}: z {} outside desk", c.z);
        }
    }

    #[test]
    fn lamp_stands_on_the_desk() {
        let config = OrchardConfig::default();
        let props = Props::new(&config);
        let stand_bottom = props.lamp_stand.transform_point3(Vec3::NEG_Y).y;
        assert!((stand_bottom - config.desk_anchor.y).abs() < 1e-5);
        assert_eq!(props.lamp_bulb.w_axis.truncate(), config.lamp_bulb);
    }

    #[test]
    fn trunk_reaches_the_crown() {
        let config = OrchardConfig::default();
        let props = Props::new(&config);
        assert!((top_face_y(props.trunk) - config.canopy.center.y).abs() < 1e-5);
        let base = props.trunk.transform_point3(Vec3::NEG_Y).y;
        assert!(base < config.ground.height_at(0.0, 0.0));
    }
}
