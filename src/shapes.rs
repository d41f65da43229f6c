//! Scene objects and the primitive variants they expand into.
//!
//! A [`SceneObject`] is what a scene holds (a mesh, a point cloud or an analytic sphere).
//! Before a build each object is expanded into [`Shape`] primitives: one triangle reference
//! per mesh face, one point reference per cloud vertex, and spheres as themselves.

use std::sync::Arc;

use glam::Vec3A;

use crate::{
    face_normal, ray_sphere, ray_triangle, Bounded, Grow, MaterialTag, Payload, PrimitiveSource,
    Ray, RayIntersect, AABB,
};

/// Radius used for points of a cloud without radii
pub const DEFAULT_POINT_RADIUS: f32 = 0.01;

/// Indexed triangle mesh
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    pub vertices: Vec<Vec3A>,
    /// Per-vertex normals. Faces fall back to their face normal when this does not match
    /// `vertices` in length.
    pub normals: Vec<Vec3A>,
    pub faces: Vec<[u32; 3]>,
    pub material: Option<MaterialTag>,
}

impl TriangleMesh {
    pub fn new(vertices: Vec<Vec3A>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            normals: vec![],
            faces,
            material: None,
        }
    }

    #[inline]
    pub fn face_vertices(&self, face: usize) -> [Vec3A; 3] {
        let [a, b, c] = self.faces[face];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    #[inline]
    pub fn face_normals(&self, face: usize) -> [Vec3A; 3] {
        if self.normals.len() != self.vertices.len() {
            return [face_normal(&self.face_vertices(face)); 3];
        }
        let [a, b, c] = self.faces[face];
        [
            self.normals[a as usize],
            self.normals[b as usize],
            self.normals[c as usize],
        ]
    }
}

impl Bounded for TriangleMesh {
    fn bounds(&self) -> AABB {
        let mut aabb = AABB::default();
        for face in 0..self.faces.len() {
            for vertex in self.face_vertices(face) {
                aabb.grow(vertex);
            }
        }
        aabb
    }
}

/// One face of a shared [`TriangleMesh`]
#[derive(Debug, Clone)]
pub struct TriangleRef {
    pub mesh: Arc<TriangleMesh>,
    pub face: u32,
}

impl Bounded for TriangleRef {
    #[inline]
    fn bounds(&self) -> AABB {
        AABB::from_points(self.mesh.face_vertices(self.face as usize))
    }
}

impl RayIntersect for TriangleRef {
    #[inline]
    fn ray_intersect(&self, ray: &Ray, payload: &mut Payload) -> bool {
        let face = self.face as usize;
        let hit = ray_triangle(
            ray,
            &self.mesh.face_vertices(face),
            &self.mesh.face_normals(face),
            payload,
        );
        if hit {
            payload.material = self.mesh.material.clone();
        }
        hit
    }
}

/// Set of points, each one intersected as a small sphere
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    pub vertices: Vec<Vec3A>,
    /// Per-point radius, [`DEFAULT_POINT_RADIUS`] is used where missing
    pub radii: Vec<f32>,
    pub material: Option<MaterialTag>,
}

impl PointCloud {
    pub fn new(vertices: Vec<Vec3A>) -> Self {
        Self {
            vertices,
            radii: vec![],
            material: None,
        }
    }

    #[inline]
    pub fn radius(&self, index: usize) -> f32 {
        self.radii
            .get(index)
            .copied()
            .unwrap_or(DEFAULT_POINT_RADIUS)
    }
}

impl Bounded for PointCloud {
    fn bounds(&self) -> AABB {
        let mut aabb = AABB::default();
        for (i, &vertex) in self.vertices.iter().enumerate() {
            let r = Vec3A::splat(self.radius(i));
            aabb.grow(&AABB::new(vertex - r, vertex + r));
        }
        aabb
    }
}

/// One point of a shared [`PointCloud`]
#[derive(Debug, Clone)]
pub struct PointRef {
    pub cloud: Arc<PointCloud>,
    pub index: u32,
}

impl Bounded for PointRef {
    #[inline]
    fn bounds(&self) -> AABB {
        let index = self.index as usize;
        let center = self.cloud.vertices[index];
        let r = Vec3A::splat(self.cloud.radius(index));
        AABB::new(center - r, center + r)
    }
}

impl RayIntersect for PointRef {
    #[inline]
    fn ray_intersect(&self, ray: &Ray, payload: &mut Payload) -> bool {
        let index = self.index as usize;
        let hit = ray_sphere(
            ray,
            self.cloud.vertices[index],
            self.cloud.radius(index),
            payload,
        );
        if hit {
            payload.material = self.cloud.material.clone();
        }
        hit
    }
}

/// Analytic sphere
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub center: Vec3A,
    pub radius: f32,
    pub material: Option<MaterialTag>,
}

impl Sphere {
    pub fn new(center: Vec3A, radius: f32) -> Self {
        Self {
            center,
            radius,
            material: None,
        }
    }
}

impl Bounded for Sphere {
    #[inline]
    fn bounds(&self) -> AABB {
        let r = Vec3A::splat(self.radius);
        AABB::new(self.center - r, self.center + r)
    }
}

impl RayIntersect for Sphere {
    #[inline]
    fn ray_intersect(&self, ray: &Ray, payload: &mut Payload) -> bool {
        let hit = ray_sphere(ray, self.center, self.radius, payload);
        if hit {
            payload.material = self.material.clone();
        }
        hit
    }
}

impl PrimitiveSource for Sphere {
    type Primitive = Sphere;

    fn get_primitives(&self, primitives: &mut Vec<Sphere>) {
        primitives.push(self.clone());
    }
}

/// Primitive variants produced by expanding a [`SceneObject`]
#[derive(Debug, Clone)]
pub enum Shape {
    Triangle(TriangleRef),
    Point(PointRef),
    Sphere(Sphere),
}

impl Bounded for Shape {
    #[inline]
    fn bounds(&self) -> AABB {
        match self {
            Shape::Triangle(tri) => tri.bounds(),
            Shape::Point(point) => point.bounds(),
            Shape::Sphere(sphere) => sphere.bounds(),
        }
    }
}

impl RayIntersect for Shape {
    #[inline]
    fn ray_intersect(&self, ray: &Ray, payload: &mut Payload) -> bool {
        match self {
            Shape::Triangle(tri) => tri.ray_intersect(ray, payload),
            Shape::Point(point) => point.ray_intersect(ray, payload),
            Shape::Sphere(sphere) => sphere.ray_intersect(ray, payload),
        }
    }
}

/// Object held by a [`crate::Scene`]
#[derive(Debug, Clone)]
pub enum SceneObject {
    Mesh(Arc<TriangleMesh>),
    PointCloud(Arc<PointCloud>),
    Sphere(Sphere),
}

impl Bounded for SceneObject {
    fn bounds(&self) -> AABB {
        match self {
            SceneObject::Mesh(mesh) => mesh.bounds(),
            SceneObject::PointCloud(cloud) => cloud.bounds(),
            SceneObject::Sphere(sphere) => sphere.bounds(),
        }
    }
}

impl PrimitiveSource for SceneObject {
    type Primitive = Shape;

    fn get_primitives(&self, primitives: &mut Vec<Shape>) {
        match self {
            SceneObject::Mesh(mesh) => {
                primitives.extend((0..mesh.faces.len() as u32).map(|face| {
                    Shape::Triangle(TriangleRef {
                        mesh: Arc::clone(mesh),
                        face,
                    })
                }));
            }
            SceneObject::PointCloud(cloud) => {
                primitives.extend((0..cloud.vertices.len() as u32).map(|index| {
                    Shape::Point(PointRef {
                        cloud: Arc::clone(cloud),
                        index,
                    })
                }));
            }
            SceneObject::Sphere(sphere) => primitives.push(Shape::Sphere(sphere.clone())),
        }
    }
}

impl From<TriangleMesh> for SceneObject {
    fn from(mesh: TriangleMesh) -> Self {
        SceneObject::Mesh(Arc::new(mesh))
    }
}

impl From<PointCloud> for SceneObject {
    fn from(cloud: PointCloud) -> Self {
        SceneObject::PointCloud(Arc::new(cloud))
    }
}

impl From<Sphere> for SceneObject {
    fn from(sphere: Sphere) -> Self {
        SceneObject::Sphere(sphere)
    }
}
