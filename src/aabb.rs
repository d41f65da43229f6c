use glam::{Vec3, Vec3A};

/// Axis aligned bounding box.
///
/// The default box is empty (`min = +inf`, `max = -inf`), so growing it by
/// anything yields exactly that thing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vec3A,
    pub max: Vec3A,
}

impl Default for AABB {
    fn default() -> Self {
        Self {
            min: Vec3A::splat(f32::INFINITY),
            max: Vec3A::splat(-f32::INFINITY),
        }
    }
}

/// Grow a bounding box so it also encloses `T`
pub trait Grow<T> {
    fn grow(&mut self, value: T);
}

impl Grow<Vec3A> for AABB {
    /// Grow the box to contain a new point
    #[inline]
    fn grow(&mut self, point: Vec3A) {
        self.max = self.max.max(point);
        self.min = self.min.min(point);
    }
}

impl Grow<&AABB> for AABB {
    /// Grow the box to contain another box. Empty boxes leave it untouched.
    #[inline]
    fn grow(&mut self, aabb: &AABB) {
        self.max = self.max.max(aabb.max);
        self.min = self.min.min(aabb.min);
    }
}

impl AABB {
    #[inline]
    pub fn new(min: Vec3A, max: Vec3A) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vec3A>,
    {
        let mut aabb = AABB::default();
        for point in points {
            aabb.grow(point);
        }
        aabb
    }

    /// Union of two boxes
    #[inline]
    pub fn union(&self, other: &AABB) -> AABB {
        let mut aabb = *self;
        aabb.grow(other);
        aabb
    }

    /// If the AABB is valid (min <= max)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    #[inline]
    pub fn center(&self) -> Vec3A {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3A {
        self.max - self.min
    }

    /// True when `other` lies completely inside this box. Empty boxes are contained by anything.
    pub fn contains(&self, other: &AABB) -> bool {
        if !other.is_valid() {
            return true;
        }
        self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
    }

    /// Append the 12 edges of the box as 24 points (pairs of segment end points)
    pub fn edges(&self, edges: &mut Vec<Vec3>) {
        let min = Vec3::from(self.min);
        let max = Vec3::from(self.max);

        // bottom quad
        let a = min;
        let b = Vec3::new(max.x, min.y, min.z);
        let c = Vec3::new(max.x, min.y, max.z);
        let d = Vec3::new(min.x, min.y, max.z);
        // top quad
        let e = Vec3::new(min.x, max.y, min.z);
        let f = Vec3::new(max.x, max.y, min.z);
        let g = max;
        let h = Vec3::new(min.x, max.y, max.z);

        edges.extend_from_slice(&[
            a, b, a, d, c, b, c, d, // bottom
            e, f, e, h, g, f, g, h, // top
            d, h, a, e, b, f, c, g, // columns
        ]);
    }
}
