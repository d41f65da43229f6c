use std::sync::Arc;

use crate::{Payload, Ray, RayIntersect, AABB};

/// Anything with an axis aligned bounding box
pub trait Bounded {
    fn bounds(&self) -> AABB;
}

/// Atomic unit stored in the leaves of a [`crate::Bvh`]
pub trait Primitive: Bounded + RayIntersect + Send + Sync {}

impl<T> Primitive for T where T: Bounded + RayIntersect + Send + Sync + ?Sized {}

/// Scene object that expands into one or more primitives before a build
/// (a mesh gives one primitive per face, atomic objects give themselves).
pub trait PrimitiveSource: Bounded {
    type Primitive: Primitive;

    fn get_primitives(&self, primitives: &mut Vec<Self::Primitive>);
}

impl<T> Bounded for Arc<T>
where
    T: Bounded + ?Sized,
{
    #[inline]
    fn bounds(&self) -> AABB {
        (**self).bounds()
    }
}

impl<T> RayIntersect for Arc<T>
where
    T: RayIntersect + ?Sized,
{
    #[inline]
    fn ray_intersect(&self, ray: &Ray, payload: &mut Payload) -> bool {
        (**self).ray_intersect(ray, payload)
    }
}

/// Expand every object into its primitives, in order
pub fn expand_primitives<S>(objects: &[S]) -> Vec<S::Primitive>
where
    S: PrimitiveSource,
{
    let mut primitives = Vec::with_capacity(objects.len());
    for object in objects {
        object.get_primitives(&mut primitives);
    }
    primitives
}
