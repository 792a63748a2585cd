//! Procedural mesh generators.
//!
//! All shapes are centered on the origin in a unit box unless noted, wound
//! counter-clockwise when seen from outside.

use std::collections::HashMap;
use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use super::MeshVertex;

/// CPU-side indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_vertex(&mut self, p: Vec3, n: Vec3, uv: Vec2) -> u32 {
        let i = self.vertices.len() as u32;
        self.vertices.push(MeshVertex::new(p.to_array(), n.to_array(), uv.to_array()));
        i
    }

    /// Adds a planar quad `a b c d` (counter-clockwise) with a shared normal.
    fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3) {
        let uvs = [Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 0.0)];
        let base = self.vertices.len() as u32;
        for (p, uv) in corners.into_iter().zip(uvs) {
            self.push_vertex(p, normal, uv);
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    fn push_triangle(&mut self, corners: [Vec3; 3], normal: Vec3) {
        let uvs = [Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::new(0.5, 0.0)];
        for (p, uv) in corners.into_iter().zip(uvs) {
            let i = self.push_vertex(p, normal, uv);
            self.indices.push(i);
        }
    }

    /// Multiplies every texture coordinate by `factor` (the sampler repeats).
    pub fn scale_uvs(mut self, factor: f32) -> Self {
        for v in &mut self.vertices {
            v.uv = [v.uv[0] * factor, v.uv[1] * factor];
        }
        self
    }

    /// Copy with one vertex per triangle corner and face normals, so lighting
    /// shows each facet.
    pub fn flat_shaded(&self) -> Self {
        let mut out = MeshData::default();
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| self.vertices[i as usize]);
            let (pa, pb, pc) = (Vec3::from(a.position), Vec3::from(b.position), Vec3::from(c.position));
            let n = (pb - pa).cross(pc - pa).normalize_or_zero();
            for v in [a, b, c] {
                let i = out.push_vertex(Vec3::from(v.position), n, Vec2::from(v.uv));
                out.indices.push(i);
            }
        }
        out
    }
}

/// Cube spanning `[-1, 1]` on every axis, one quad per face.
pub fn cube() -> MeshData {
    let mut m = MeshData::default();
    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        for sign in [1.0f32, -1.0] {
            let n = axis * sign;
            // Two tangents spanning the face, ordered so u x v == n.
            let u = n.any_orthonormal_vector();
            let v = n.cross(u);
            let c = n;
            m.push_quad([c - u - v, c + u - v, c + u + v, c - u + v], n);
        }
    }
    m
}

/// Unit sphere from a tetrahedron subdivided `subdivisions` times.
///
/// Midpoints are shared between neighbouring triangles.
pub fn subdivision_sphere(subdivisions: u32) -> MeshData {
    let seed = [
        Vec3::new(0.0, 0.0, -1.0),
        Vec3::new(0.0, 0.9428, 0.3333),
        Vec3::new(-0.8165, -0.4714, 0.3333),
        Vec3::new(0.8165, -0.4714, 0.3333),
    ];
    let mut points: Vec<Vec3> = seed.iter().map(|p| p.normalize()).collect();
    let mut tris: Vec<[u32; 3]> = vec![[0, 1, 2], [3, 2, 1], [1, 0, 3], [0, 2, 3]];

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut mid = |a: u32, b: u32, points: &mut Vec<Vec3>| -> u32 {
            let key = (a.min(b), a.max(b));
            *midpoints.entry(key).or_insert_with(|| {
                let p = ((points[a as usize] + points[b as usize]) * 0.5).normalize();
                points.push(p);
                (points.len() - 1) as u32
            })
        };

        let mut next = Vec::with_capacity(tris.len() * 4);
        for [a, b, c] in tris {
            let ab = mid(a, b, &mut points);
            let bc = mid(b, c, &mut points);
            let ca = mid(c, a, &mut points);
            next.extend_from_slice(&[[a, ab, ca], [ab, b, bc], [ca, bc, c], [ab, bc, ca]]);
        }
        tris = next;
    }

    // Orient every face outward; the seed winding is not uniform.
    let mut m = MeshData::default();
    for p in &points {
        m.push_vertex(*p, *p, sphere_uv(*p));
    }
    for [a, b, c] in tris {
        let (pa, pb, pc) = (points[a as usize], points[b as usize], points[c as usize]);
        if (pb - pa).cross(pc - pa).dot(pa + pb + pc) >= 0.0 {
            m.indices.extend_from_slice(&[a, b, c]);
        } else {
            m.indices.extend_from_slice(&[a, c, b]);
        }
    }
    m
}

fn sphere_uv(p: Vec3) -> Vec2 {
    Vec2::new(
        0.5 - p.z.atan2(p.x) / TAU,
        0.5 + p.y.clamp(-1.0, 1.0).asin() / PI,
    )
}

/// Cone with base radius 1 at `y = 0` and apex at `(0, 1, 0)`, closed at the base.
pub fn cone(segments: u32) -> MeshData {
    let segments = segments.max(3);
    let mut m = MeshData::default();
    let apex = Vec3::Y;
    // Side normals lean up by the slope of a unit-height, unit-radius cone.
    let rim = |i: u32| {
        let a = i as f32 / segments as f32 * TAU;
        Vec3::new(a.cos(), 0.0, -a.sin())
    };

    for i in 0..segments {
        let (p0, p1) = (rim(i), rim(i + 1));
        let n0 = (p0 + Vec3::Y).normalize();
        let n1 = (p1 + Vec3::Y).normalize();
        let na = (n0 + n1).normalize();
        let t = i as f32 / segments as f32;
        let dt = 1.0 / segments as f32;

        let a = m.push_vertex(p0, n0, Vec2::new(t, 1.0));
        let b = m.push_vertex(p1, n1, Vec2::new(t + dt, 1.0));
        let c = m.push_vertex(apex, na, Vec2::new(t + 0.5 * dt, 0.0));
        m.indices.extend_from_slice(&[a, b, c]);

        m.push_triangle([Vec3::ZERO, p1, p0], Vec3::NEG_Y);
    }
    m
}

/// Roof prism: base `[-1, 1]` in x and z at `y = 0`, ridge along z at `y = 1`.
pub fn prism() -> MeshData {
    let mut m = MeshData::default();
    let (l, r) = (-1.0f32, 1.0f32);
    let ridge_front = Vec3::new(0.0, 1.0, 1.0);
    let ridge_back = Vec3::new(0.0, 1.0, -1.0);

    // Gable ends.
    m.push_triangle([Vec3::new(l, 0.0, 1.0), Vec3::new(r, 0.0, 1.0), ridge_front], Vec3::Z);
    m.push_triangle([Vec3::new(r, 0.0, -1.0), Vec3::new(l, 0.0, -1.0), ridge_back], Vec3::NEG_Z);

    // Slopes.
    let east = Vec3::new(1.0, 1.0, 0.0).normalize();
    m.push_quad(
        [Vec3::new(r, 0.0, 1.0), Vec3::new(r, 0.0, -1.0), ridge_back, ridge_front],
        east,
    );
    let west = Vec3::new(-1.0, 1.0, 0.0).normalize();
    m.push_quad(
        [Vec3::new(l, 0.0, -1.0), Vec3::new(l, 0.0, 1.0), ridge_front, ridge_back],
        west,
    );

    // Floor.
    m.push_quad(
        [
            Vec3::new(l, 0.0, -1.0),
            Vec3::new(r, 0.0, -1.0),
            Vec3::new(r, 0.0, 1.0),
            Vec3::new(l, 0.0, 1.0),
        ],
        Vec3::NEG_Y,
    );
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every triangle's winding normal must agree with its vertex normals.
    fn assert_outward(m: &MeshData) {
        for tri in m.indices.chunks_exact(3) {
            let v = [tri[0], tri[1], tri[2]].map(|i| m.vertices[i as usize]);
            let p = v.map(|v| Vec3::from(v.position));
            let face = (p[1] - p[0]).cross(p[2] - p[0]);
            let n: Vec3 = v.iter().map(|v| Vec3::from(v.normal)).sum();
            assert!(face.dot(n) > 0.0, "inward triangle {tri:?}");
        }
    }

    fn assert_indices_in_range(m: &MeshData) {
        assert_eq!(m.indices.len() % 3, 0);
        assert!(m.indices.iter().all(|&i| (i as usize) < m.vertices.len()));
    }

    #[test]
    fn cube_is_closed_and_outward() {
        let m = cube();
        assert_eq!(m.vertices.len(), 24);
        assert_eq!(m.triangle_count(), 12);
        assert_indices_in_range(&m);
        assert_outward(&m);
        for v in &m.vertices {
            assert!(v.position.iter().all(|c| c.abs() == 1.0));
        }
    }

    #[test]
    fn sphere_counts_follow_euler() {
        for n in 0..5 {
            let m = subdivision_sphere(n);
            let faces = 4 * 4usize.pow(n);
            assert_eq!(m.triangle_count(), faces);
            assert_eq!(m.vertices.len(), faces / 2 + 2);
            assert_indices_in_range(&m);
        }
    }

    #[test]
    fn sphere_is_unit_and_outward() {
        let m = subdivision_sphere(3);
        for v in &m.vertices {
            assert!((Vec3::from(v.position).length() - 1.0).abs() < 1e-5);
            assert!(v.uv[0] >= 0.0 && v.uv[0] <= 1.0);
            assert!(v.uv[1] >= 0.0 && v.uv[1] <= 1.0);
        }
        assert_outward(&m);
    }

    #[test]
    fn flat_shading_unshares_vertices() {
        let smooth = subdivision_sphere(2);
        let flat = smooth.flat_shaded();
        assert_eq!(flat.vertices.len(), smooth.indices.len());
        assert_eq!(flat.triangle_count(), smooth.triangle_count());
        for tri in flat.vertices.chunks_exact(3) {
            assert_eq!(tri[0].normal, tri[1].normal);
            assert_eq!(tri[1].normal, tri[2].normal);
        }
        assert_outward(&flat);
    }

    #[test]
    fn cone_and_prism_are_outward() {
        let c = cone(16);
        assert_eq!(c.triangle_count(), 32);
        assert_indices_in_range(&c);
        assert_outward(&c);

        let p = prism();
        assert_eq!(p.triangle_count(), 8);
        assert_indices_in_range(&p);
        assert_outward(&p);
    }

    #[test]
    fn uv_scaling_multiplies() {
        let m = cube().scale_uvs(4.0);
        assert!(m.vertices.iter().any(|v| v.uv == [4.0, 4.0]));
    }
}
