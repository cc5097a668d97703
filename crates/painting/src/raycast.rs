//! Ray picking against garment meshes and control point handles.
//!
//! Hosts that already resolve pointer rays can skip this module and send
//! ranked intersections directly. The triangle test is Moller-Trumbore with
//! barycentric UV interpolation.

use glam::{Vec2, Vec3};

use dzyn_ipc::{HitKind, Intersection};

use crate::constants::{HANDLE_RADIUS_SCALE, MIN_HANDLE_RADIUS};
use crate::types::ControlPoint;

/// Epsilon for floating point comparisons in ray intersection
const EPSILON: f32 = 1e-6;

/// A pointer ray in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Normalized direction
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray; `direction` is normalized, None if it has zero length
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray-triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance along the ray to the intersection point
    pub t: f32,
    /// Barycentric coordinate u (weight for vertex 1)
    pub u: f32,
    /// Barycentric coordinate v (weight for vertex 2)
    pub v: f32,
}

/// Moller-Trumbore ray-triangle intersection.
///
/// Returns the hit distance and barycentric coordinates if the ray hits the
/// triangle in front of its origin. Both faces count.
pub fn ray_triangle_intersection(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let pvec = ray.direction.cross(edge2);
    let det = edge1.dot(pvec);

    // Ray parallel to the triangle plane
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let tvec = ray.origin - v0;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray.direction.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if t < EPSILON {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

/// Nearest forward intersection of a ray with a sphere
pub fn ray_sphere_intersection(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let near = -b - sqrt_d;
    if near >= EPSILON {
        return Some(near);
    }
    // Origin inside the sphere
    let far = -b + sqrt_d;
    (far >= EPSILON).then_some(far)
}

/// Interpolate a Vec2 attribute (like UVs) using barycentric coordinates.
#[inline]
pub fn interpolate_vec2(v0: Vec2, v1: Vec2, v2: Vec2, u: f32, v: f32) -> Vec2 {
    let w = 1.0 - u - v;
    v0 * w + v1 * u + v2 * v
}

/// World-space radius of the handle widget drawn for a control point
#[inline]
pub fn handle_radius(point_radius: f32) -> f32 {
    (point_radius * HANDLE_RADIUS_SCALE).max(MIN_HANDLE_RADIUS)
}

/// Triangle mesh geometry for picking, in world space
#[derive(Debug, Clone, Default)]
pub struct PickMesh {
    /// Host identifier reported in intersections
    pub object_id: u64,
    pub positions: Vec<Vec3>,
    /// Triangle indices (3 per triangle)
    pub indices: Vec<u32>,
    /// Per-vertex UVs; empty when the mesh has no UV channel
    pub uvs: Vec<Vec2>,
}

impl PickMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn triangle_indices(&self, tri_index: usize) -> Option<[usize; 3]> {
        let base = tri_index * 3;
        let tri = self.indices.get(base..base + 3)?;
        Some([tri[0] as usize, tri[1] as usize, tri[2] as usize])
    }

    fn triangle_positions(&self, tri_index: usize) -> Option<[Vec3; 3]> {
        let [i0, i1, i2] = self.triangle_indices(tri_index)?;
        Some([
            *self.positions.get(i0)?,
            *self.positions.get(i1)?,
            *self.positions.get(i2)?,
        ])
    }

    fn triangle_uv(&self, tri_index: usize, hit: &TriangleHit) -> Option<Vec2> {
        let [i0, i1, i2] = self.triangle_indices(tri_index)?;
        Some(interpolate_vec2(
            *self.uvs.get(i0)?,
            *self.uvs.get(i1)?,
            *self.uvs.get(i2)?,
            hit.u,
            hit.v,
        ))
    }
}

/// Closest ray hit on a mesh surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub distance: f32,
    pub point: Vec3,
    /// None when the mesh has no UVs
    pub uv: Option<Vec2>,
}

/// Cast a ray against a mesh and return the closest hit.
/// Triangles with out-of-range indices are ignored.
pub fn raycast_mesh(ray: &Ray, mesh: &PickMesh) -> Option<SurfaceHit> {
    let mut closest: Option<(TriangleHit, usize)> = None;

    // Brute force; garments are small enough for interactive picking
    for tri_index in 0..mesh.triangle_count() {
        let Some([v0, v1, v2]) = mesh.triangle_positions(tri_index) else {
            continue;
        };
        if let Some(hit) = ray_triangle_intersection(ray, v0, v1, v2) {
            if closest.is_none_or(|(prev, _)| hit.t < prev.t) {
                closest = Some((hit, tri_index));
            }
        }
    }

    closest.map(|(hit, tri_index)| SurfaceHit {
        distance: hit.t,
        point: ray.at(hit.t),
        uv: mesh.triangle_uv(tri_index, &hit),
    })
}

/// Pick proxy for a text element, placed by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextTarget {
    /// Index of the text element it stands for
    pub index: usize,
    pub center: Vec3,
    pub radius: f32,
}

/// Resolve a ray into the ranked, tagged intersection list the router consumes.
///
/// Surfaces, control point handles and text targets are all tested; the
/// result is sorted nearest first.
pub fn resolve_intersections(
    ray: &Ray,
    meshes: &[PickMesh],
    points: &[ControlPoint],
    text_targets: &[TextTarget],
) -> Vec<Intersection> {
    let mut hits = Vec::new();

    for mesh in meshes {
        if let Some(hit) = raycast_mesh(ray, mesh) {
            hits.push(Intersection {
                point: hit.point.to_array(),
                uv: hit.uv.map(|uv| uv.to_array()),
                distance: hit.distance,
                object_id: mesh.object_id,
                kind: HitKind::Surface,
            });
        }
    }

    for (index, point) in points.iter().enumerate() {
        let radius = handle_radius(point.radius);
        if let Some(t) = ray_sphere_intersection(ray, point.world_position, radius) {
            hits.push(Intersection::handle(index, ray.at(t).to_array(), t));
        }
    }

    for target in text_targets {
        if let Some(t) = ray_sphere_intersection(ray, target.center, target.radius) {
            hits.push(Intersection::text_target(target.index, ray.at(t).to_array(), t));
        }
    }

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    /// Unit quad in the z = 0 plane with UVs matching xy
    fn quad(object_id: u64) -> PickMesh {
        PickMesh {
            object_id,
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
            uvs: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ],
        }
    }

    fn down_at(x: f32, y: f32) -> Ray {
        Ray::new(Vec3::new(x, y, 5.0), Vec3::NEG_Z).unwrap()
    }

    #[test]
    fn test_ray_triangle_hit() {
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::NEG_Z).unwrap();
        let hit =
            ray_triangle_intersection(&ray, Vec3::ZERO, Vec3::X, Vec3::Y).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-6);
        assert!((hit.u - 0.25).abs() < 1e-6);
        assert!((hit.v - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_ray_triangle_miss_and_behind() {
        let miss = Ray::new(Vec3::new(2.0, 2.0, 1.0), Vec3::NEG_Z).unwrap();
        assert!(ray_triangle_intersection(&miss, Vec3::ZERO, Vec3::X, Vec3::Y).is_none());

        let away = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::Z).unwrap();
        assert!(ray_triangle_intersection(&away, Vec3::ZERO, Vec3::X, Vec3::Y).is_none());
    }

    #[test]
    fn test_raycast_mesh_interpolates_uv() {
        let hit = raycast_mesh(&down_at(0.3, 0.7), &quad(1)).unwrap();
        let uv = hit.uv.unwrap();
        assert!((uv - Vec2::new(0.3, 0.7)).length() < 1e-5);
        assert!((hit.distance - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_raycast_mesh_without_uvs() {
        let mut mesh = quad(1);
        mesh.uvs.clear();
        let hit = raycast_mesh(&down_at(0.5, 0.5), &mesh).unwrap();
        assert!(hit.uv.is_none());
    }

    #[test]
    fn test_bad_indices_are_ignored() {
        let mut mesh = quad(1);
        mesh.indices = vec![0, 1, 99];
        assert!(raycast_mesh(&down_at(0.5, 0.1), &mesh).is_none());
    }

    #[test]
    fn test_ray_sphere() {
        let ray = down_at(0.0, 0.0);
        let t = ray_sphere_intersection(&ray, Vec3::ZERO, 1.0).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
        assert!(ray_sphere_intersection(&ray, Vec3::new(3.0, 0.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_handle_radius_floor() {
        assert_eq!(handle_radius(0.05), MIN_HANDLE_RADIUS);
        assert!((handle_radius(0.5) - 0.075).abs() < 1e-6);
    }

    #[test]
    fn test_handle_ranks_before_surface() {
        let points = [ControlPoint::new(
            Vec2::new(0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.0),
            Rgb::RED,
            0.1,
        )];
        let targets = [TextTarget {
            index: 0,
            center: Vec3::new(5.0, 5.0, 0.0),
            radius: 0.1,
        }];

        let hits = resolve_intersections(&down_at(0.5, 0.5), &[quad(9)], &points, &targets);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].kind, HitKind::Handle(0));
        assert_eq!(hits[1].kind, HitKind::Surface);
        assert_eq!(hits[1].object_id, 9);
        assert!(hits[0].distance < hits[1].distance);
    }
}
