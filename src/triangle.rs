extern crate glam;

use rand::{
    distributions::{Distribution, Standard},
    Rng,
};

use crate::{Bounded, MaterialTag, PrimitiveSource, AABB};

/// Standalone triangle owning its vertices and per-vertex normals
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [glam::Vec3A; 3],
    pub normals: [glam::Vec3A; 3],
    pub centroid: glam::Vec3A,
    pub material: Option<MaterialTag>,
}

impl Triangle {
    /// Triangle with every vertex normal set to the face normal
    #[inline]
    pub fn new(vertex0: glam::Vec3A, vertex1: glam::Vec3A, vertex2: glam::Vec3A) -> Triangle {
        let normal = face_normal(&[vertex0, vertex1, vertex2]);
        Self::with_normals([vertex0, vertex1, vertex2], [normal; 3])
    }

    #[inline]
    pub fn with_normals(vertices: [glam::Vec3A; 3], normals: [glam::Vec3A; 3]) -> Triangle {
        let mut tri = Triangle {
            vertices,
            normals,
            centroid: glam::Vec3A::ZERO,
            material: None,
        };
        tri.compute_centroid();
        tri
    }

    pub fn with_material(mut self, material: MaterialTag) -> Triangle {
        self.material = Some(material);
        self
    }

    #[inline]
    pub fn compute_centroid(&mut self) {
        self.centroid = (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0;
    }
}

/// Unit normal following the winding of the vertices
#[inline]
pub fn face_normal(vertices: &[glam::Vec3A; 3]) -> glam::Vec3A {
    (vertices[1] - vertices[0])
        .cross(vertices[2] - vertices[0])
        .normalize_or_zero()
}

impl Bounded for Triangle {
    #[inline]
    fn bounds(&self) -> AABB {
        AABB::from_points(self.vertices)
    }
}

impl PrimitiveSource for Triangle {
    type Primitive = Triangle;

    fn get_primitives(&self, primitives: &mut Vec<Triangle>) {
        primitives.push(self.clone());
    }
}

impl Distribution<Triangle> for Standard {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Triangle {
        Triangle::new(rng.gen(), rng.gen(), rng.gen())
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    use glam::Vec3A;
    use rand::{thread_rng, Rng};

    use approx::*;

    #[test]
    fn compute_centroid() {
        let mut rng = thread_rng();
        let tri: Triangle = rng.gen();
        assert_relative_eq!(
            tri.centroid,
            (tri.vertices[0] + tri.vertices[1] + tri.vertices[2]) / 3.0
        );
    }

    #[test]
    fn bounds_enclose_vertices() {
        let mut rng = thread_rng();
        let tri: Triangle = rng.gen();
        let bounds = tri.bounds();
        for v in tri.vertices {
            assert!(bounds.contains(&AABB::new(v, v)));
        }
    }

    #[test]
    fn flat_normals_follow_winding() {
        let tri = Triangle::new(Vec3A::ZERO, Vec3A::X, Vec3A::Y);
        assert_relative_eq!(tri.normals[0], Vec3A::Z);
        assert_relative_eq!(tri.normals[2], Vec3A::Z);

        let flipped = Triangle::new(Vec3A::ZERO, Vec3A::Y, Vec3A::X);
        assert_relative_eq!(flipped.normals[1], -Vec3A::Z);
    }

    #[test]
    fn triangle_is_its_own_primitive() {
        let tri = Triangle::new(Vec3A::ZERO, Vec3A::X, Vec3A::Y);
        let mut primitives = vec![];
        tri.get_primitives(&mut primitives);
        assert_eq!(primitives, vec![tri]);
    }
}
