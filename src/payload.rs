use std::sync::Arc;

use glam::Vec3A;

use crate::Ray;

/// Material name attached to a hit
pub type MaterialTag = Arc<str>;

/// Upper end of the search interval of a fresh payload
pub const DEFAULT_T_MAX: f64 = 9_999_999.0;

/// Closest hit found so far along a ray.
///
/// `(t_min, t_max)` is the open search interval. Hits only ever narrow `t_max`.
#[derive(Debug, Clone)]
pub struct Payload {
    pub t_min: f64,
    pub t_max: f64,
    pub hit_point: Vec3A,
    pub normal: Vec3A,
    pub launch_point: Vec3A,
    pub material: Option<MaterialTag>,
}

impl Payload {
    pub fn new(ray: &Ray) -> Self {
        Self {
            t_min: ray.epsilon() as f64,
            t_max: DEFAULT_T_MAX,
            hit_point: Vec3A::ZERO,
            normal: Vec3A::ZERO,
            launch_point: ray.origin(),
            material: None,
        }
    }

    /// Would a hit at `t` be accepted
    #[inline]
    pub fn accepts(&self, t: f64) -> bool {
        t > self.t_min && t < self.t_max
    }

    /// Record a closer hit
    #[inline]
    pub fn narrow(&mut self, t: f64, hit_point: Vec3A, normal: Vec3A) {
        debug_assert!(t <= self.t_max, "t_max can only shrink");
        self.t_max = t;
        self.hit_point = hit_point;
        self.normal = normal;
    }
}
