use glam::Vec3A;
use strum::IntoEnumIterator;

use crate::{Axis, Payload, Ray, Triangle, AABB};

/// Objects capable of being intersected by a ray, recording the hit in the payload
pub trait RayIntersect {
    /// Returns true if a hit closer than `payload.t_max` was found. The payload is only
    /// touched on a hit.
    fn ray_intersect(&self, ray: &Ray, payload: &mut Payload) -> bool;
}

/// Boolean-only ray tests used for pruning
pub trait FastRayIntersect {
    fn fast_ray_intersect(&self, ray: &Ray, payload: &Payload) -> bool;
}

impl FastRayIntersect for AABB {
    /// Slab test, clipped to the payload search interval.
    #[inline]
    fn fast_ray_intersect(&self, ray: &Ray, payload: &Payload) -> bool {
        if !self.is_valid() {
            return false;
        }

        let origin = ray.origin();
        let direction = ray.direction();
        let inv_direction = ray.inv_direction();

        let mut t_near = payload.t_min as f32;
        let mut t_far = payload.t_max as f32;

        for axis in Axis::iter() {
            if direction[axis] == 0.0 {
                // parallel to the slab
                if origin[axis] < self.min[axis] || origin[axis] > self.max[axis] {
                    return false;
                }
                continue;
            }

            let inv = inv_direction[axis];
            let mut t0 = (self.min[axis] - origin[axis]) * inv;
            let mut t1 = (self.max[axis] - origin[axis]) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return false;
            }
        }

        true
    }
}

/// Intersect a triangle given by its vertices and per-vertex normals.
///
/// Every term is evaluated before the accept test so the function has no early exits.
/// Barycentric coordinates get `epsilon / 2` of slack so hits on shared edges are not lost.
pub fn ray_triangle(
    ray: &Ray,
    vertices: &[Vec3A; 3],
    normals: &[Vec3A; 3],
    payload: &mut Payload,
) -> bool {
    let [p0, p1, p2] = *vertices;

    let e0 = p1 - p0;
    let e1 = p0 - p2;
    let n = e1.cross(e0);

    let e2 = (1.0 / n.dot(ray.direction())) * (p0 - ray.origin());
    let i = ray.direction().cross(e2);

    let beta = i.dot(e1);
    let gamma = i.dot(e0);
    let alpha = 1.0 - beta - gamma;

    let t = n.dot(e2);
    let tolerance = ray.epsilon() * 0.5;
    let hit = payload.accepts(t as f64)
        & (beta >= -tolerance)
        & (gamma >= -tolerance)
        & (beta + gamma <= 1.0 + tolerance);

    if hit {
        let normal = alpha * normals[0] + beta * normals[1] + gamma * normals[2];
        payload.narrow(t as f64, ray.at(t), normal.normalize_or_zero());
    }

    hit
}

/// Intersect a sphere, taking the nearest root inside the payload interval
pub fn ray_sphere(ray: &Ray, center: Vec3A, radius: f32, payload: &mut Payload) -> bool {
    let direction = ray.direction();
    let a = direction.length_squared();
    if a == 0.0 {
        return false;
    }

    let oc = ray.origin() - center;
    let half_b = oc.dot(direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return false;
    }

    let root = discriminant.sqrt();
    let mut t = (-half_b - root) / a;
    if !payload.accepts(t as f64) {
        t = (-half_b + root) / a;
        if !payload.accepts(t as f64) {
            return false;
        }
    }

    let point = ray.at(t);
    payload.narrow(t as f64, point, (point - center).normalize_or_zero());
    true
}

impl RayIntersect for Triangle {
    #[inline]
    fn ray_intersect(&self, ray: &Ray, payload: &mut Payload) -> bool {
        let hit = ray_triangle(ray, &self.vertices, &self.normals, payload);
        if hit {
            payload.material = self.material.clone();
        }
        hit
    }
}

#[cfg(test)]
mod tests {

    use rand::{thread_rng, Rng};

    use glam::Vec3A;

    use approx::*;

    use crate::*;

    fn random_triangle() -> Triangle {
        let mut rng = thread_rng();
        let v0 = rng.gen::<Vec3A>() * 9.0 - Vec3A::splat(5.0);
        let v1 = rng.gen();
        let v2 = rng.gen();
        Triangle::new(v0, v1, v2)
    }

    #[test]
    fn ray_triangle_intersect() {
        let tri = random_triangle();

        let ray = Ray::new(Vec3A::ZERO, tri.centroid.normalize_or_zero());
        let mut payload = Payload::new(&ray);

        assert!(tri.ray_intersect(&ray, &mut payload));

        assert_abs_diff_eq!(
            payload.t_max as f32,
            tri.centroid.distance(ray.origin()),
            epsilon = 1e-3
        );
        assert_abs_diff_eq!(payload.hit_point, tri.centroid, epsilon = 1e-3);
    }

    #[test]
    fn ray_triangle_no_intersect() {
        let tri = random_triangle();

        let ray = Ray::new(Vec3A::ZERO, -tri.centroid.normalize_or_zero());
        let mut payload = Payload::new(&ray);

        assert!(!tri.ray_intersect(&ray, &mut payload));
        assert_eq!(payload.t_max, DEFAULT_T_MAX);
    }

    #[test]
    fn ray_triangle_respects_interval() {
        let tri = Triangle::new(
            Vec3A::new(-1.0, -1.0, 0.0),
            Vec3A::new(1.0, -1.0, 0.0),
            Vec3A::new(0.0, 1.0, 0.0),
        );
        let ray = Ray::new(Vec3A::new(0.0, 0.0, 3.0), -Vec3A::Z);

        let mut payload = Payload::new(&ray);
        payload.t_max = 2.0;
        assert!(!tri.ray_intersect(&ray, &mut payload));

        payload.t_max = 4.0;
        assert!(tri.ray_intersect(&ray, &mut payload));
        assert_abs_diff_eq!(payload.t_max, 3.0, epsilon = 1e-4);
        // flat triangle, interpolated normal equals the face normal
        assert_abs_diff_eq!(payload.normal.z.abs(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn ray_triangle_interpolates_normals() {
        let vertices = [
            Vec3A::new(0.0, 0.0, 0.0),
            Vec3A::new(1.0, 0.0, 0.0),
            Vec3A::new(0.0, 1.0, 0.0),
        ];
        let normals = [Vec3A::Z, Vec3A::X, Vec3A::Y];

        // hit exactly on the second vertex
        let ray = Ray::new(Vec3A::new(1.0, 0.0, 1.0), -Vec3A::Z);
        let mut payload = Payload::new(&ray);
        assert!(ray_triangle(&ray, &vertices, &normals, &mut payload));
        assert_abs_diff_eq!(payload.normal, Vec3A::X, epsilon = 1e-4);
    }

    #[test]
    fn ray_through_shared_edge_hits() {
        let a = Triangle::new(
            Vec3A::new(0.0, 0.0, 0.0),
            Vec3A::new(1.0, 0.0, 0.0),
            Vec3A::new(0.0, 1.0, 0.0),
        );
        let b = Triangle::new(
            Vec3A::new(1.0, 0.0, 0.0),
            Vec3A::new(1.0, 1.0, 0.0),
            Vec3A::new(0.0, 1.0, 0.0),
        );

        let ray = Ray::new(Vec3A::new(0.5, 0.5, 1.0), -Vec3A::Z);
        let mut payload = Payload::new(&ray);
        let hit_a = a.ray_intersect(&ray, &mut payload);
        let hit_b = b.ray_intersect(&ray, &mut payload);
        assert!(hit_a || hit_b);
    }

    #[test]
    fn parallel_ray_misses_triangle() {
        let tri = Triangle::new(
            Vec3A::new(-1.0, -1.0, 0.0),
            Vec3A::new(1.0, -1.0, 0.0),
            Vec3A::new(0.0, 1.0, 0.0),
        );
        let ray = Ray::new(Vec3A::new(-5.0, 0.0, 0.0), Vec3A::X);
        let mut payload = Payload::new(&ray);
        assert!(!tri.ray_intersect(&ray, &mut payload));
    }

    #[test]
    fn ray_aabb_hit_and_miss() {
        let aabb = AABB::new(Vec3A::splat(-1.0), Vec3A::splat(1.0));

        let ray = Ray::new(Vec3A::new(-5.0, 0.2, 0.3), Vec3A::new(1.0, 0.1, 0.0));
        assert!(aabb.fast_ray_intersect(&ray, &Payload::new(&ray)));

        let ray = Ray::new(Vec3A::new(-5.0, 3.0, 0.0), Vec3A::X);
        assert!(!aabb.fast_ray_intersect(&ray, &Payload::new(&ray)));

        // negative direction components
        let ray = Ray::new(Vec3A::splat(5.0), Vec3A::splat(-1.0));
        assert!(aabb.fast_ray_intersect(&ray, &Payload::new(&ray)));
    }

    #[test]
    fn ray_aabb_behind_origin() {
        let aabb = AABB::new(Vec3A::splat(-1.0), Vec3A::splat(1.0));
        let ray = Ray::new(Vec3A::new(5.0, 0.0, 0.0), Vec3A::X);
        assert!(!aabb.fast_ray_intersect(&ray, &Payload::new(&ray)));
    }

    #[test]
    fn ray_aabb_outside_payload_interval() {
        let aabb = AABB::new(Vec3A::splat(-1.0), Vec3A::splat(1.0));
        let ray = Ray::new(Vec3A::new(-5.0, 0.0, 0.0), Vec3A::X);
        let mut payload = Payload::new(&ray);
        payload.t_max = 3.0;
        assert!(!aabb.fast_ray_intersect(&ray, &payload));
    }

    #[test]
    fn ray_aabb_zero_direction_component() {
        let aabb = AABB::new(Vec3A::ZERO, Vec3A::ONE);

        // parallel to the y and z slabs, inside both
        let ray = Ray::new(Vec3A::new(-1.0, 0.5, 0.5), Vec3A::X);
        assert!(aabb.fast_ray_intersect(&ray, &Payload::new(&ray)));

        // on the slab boundary
        let ray = Ray::new(Vec3A::new(-1.0, 0.0, 1.0), Vec3A::X);
        assert!(aabb.fast_ray_intersect(&ray, &Payload::new(&ray)));

        // parallel and outside the y slab
        let ray = Ray::new(Vec3A::new(-1.0, 2.0, 0.5), Vec3A::X);
        assert!(!aabb.fast_ray_intersect(&ray, &Payload::new(&ray)));
    }

    #[test]
    fn ray_aabb_empty_box() {
        let ray = Ray::new(Vec3A::ZERO, Vec3A::X);
        assert!(!AABB::default().fast_ray_intersect(&ray, &Payload::new(&ray)));
    }

    #[test]
    fn ray_sphere_nearest_root() {
        let ray = Ray::new(Vec3A::new(0.0, 0.0, 5.0), -Vec3A::Z);
        let mut payload = Payload::new(&ray);
        assert!(ray_sphere(&ray, Vec3A::ZERO, 1.0, &mut payload));
        assert_abs_diff_eq!(payload.t_max, 4.0, epsilon = 1e-4);
        assert_abs_diff_eq!(payload.normal, Vec3A::Z, epsilon = 1e-4);

        // from the inside the far root is taken
        let ray = Ray::new(Vec3A::ZERO, Vec3A::X);
        let mut payload = Payload::new(&ray);
        assert!(ray_sphere(&ray, Vec3A::ZERO, 1.0, &mut payload));
        assert_abs_diff_eq!(payload.hit_point, Vec3A::X, epsilon = 1e-4);
    }

    #[test]
    fn ray_sphere_miss() {
        let ray = Ray::new(Vec3A::new(0.0, 3.0, 5.0), -Vec3A::Z);
        let mut payload = Payload::new(&ray);
        assert!(!ray_sphere(&ray, Vec3A::ZERO, 1.0, &mut payload));
    }
}
