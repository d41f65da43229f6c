use glam::Vec3A;

/// Default self-intersection epsilon
pub const DEFAULT_RAY_EPSILON: f32 = 1e-6;

/// Ray with a cached reciprocal direction for slab tests.
///
/// The origin is pushed `epsilon` along the direction at construction so that
/// rays spawned from a surface do not hit that same surface at `t = 0`.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    origin: Vec3A,
    direction: Vec3A,
    inv_direction: Vec3A,
    epsilon: f32,
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vec3A::ZERO, Vec3A::new(0.0, 0.0, -1.0))
    }
}

impl Ray {
    #[inline]
    pub fn new(origin: Vec3A, direction: Vec3A) -> Self {
        Self::with_epsilon(origin, direction, DEFAULT_RAY_EPSILON)
    }

    #[inline]
    pub fn with_epsilon(origin: Vec3A, direction: Vec3A, epsilon: f32) -> Self {
        Self {
            origin: origin + direction.normalize_or_zero() * epsilon,
            direction,
            inv_direction: direction.recip(),
            epsilon,
        }
    }

    /// Ray going from `origin` through `target`
    #[inline]
    pub fn towards(origin: Vec3A, target: Vec3A) -> Self {
        Self::new(origin, target - origin)
    }

    #[inline]
    pub fn origin(&self) -> Vec3A {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3A {
        self.direction
    }

    /// Component-wise `1 / direction`. Zero components become +-infinity.
    #[inline]
    pub fn inv_direction(&self) -> Vec3A {
        self.inv_direction
    }

    #[inline]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Point along the ray at parameter `t`
    #[inline]
    pub fn at(&self, t: f32) -> Vec3A {
        self.origin + self.direction * t
    }
}

/// Reflect `incident` around the (unit) `normal`
#[inline]
pub fn reflect(incident: Vec3A, normal: Vec3A) -> Vec3A {
    incident - 2.0 * normal * normal.dot(incident)
}
