use glam::Vec3A;
use smallvec::{smallvec, SmallVec};

use crate::{
    Bvh, FastRayIntersect, MaterialTag, NodeId, Payload, Primitive, PrimitiveId, Ray, ROOT,
};

/// Inline traversal stack size. Balanced trees of the default depth never spill to the heap.
const TRAVERSAL_STACK: usize = 64;

/// Closest intersection found by a query
#[derive(Debug, Clone)]
pub struct Hit {
    pub primitive: PrimitiveId,
    pub t: f64,
    pub point: Vec3A,
    pub normal: Vec3A,
    pub material: Option<MaterialTag>,
}

impl Hit {
    fn from_payload(primitive: PrimitiveId, payload: &Payload) -> Self {
        Self {
            primitive,
            t: payload.t_max,
            point: payload.hit_point,
            normal: payload.normal,
            material: payload.material.clone(),
        }
    }
}

impl<P> Bvh<P>
where
    P: Primitive,
{
    /// Closest hit along `ray` within the default search interval
    pub fn closest_hit(&self, ray: &Ray) -> Option<Hit> {
        let mut payload = Payload::new(ray);
        self.closest_hit_with(ray, &mut payload)
    }

    /// Closest hit inside the payload's interval. The payload ends up describing the hit.
    pub fn closest_hit_with(&self, ray: &Ray, payload: &mut Payload) -> Option<Hit> {
        let mut primitive = None;
        self.traverse_closest(ROOT, ray, payload, &mut primitive);
        primitive.map(|primitive| Hit::from_payload(primitive, payload))
    }

    /// True as soon as anything along `ray` is hit
    pub fn any_hit(&self, ray: &Ray) -> bool {
        let mut payload = Payload::new(ray);
        self.traverse_any(ROOT, ray, &mut payload)
    }

    /// Closest-hit traversal of the subtree at `node`.
    ///
    /// Both children of every box the ray passes are visited, left first. The payload
    /// interval shrinking with every hit prunes whatever lies behind it. `primitive` is set
    /// to the last primitive that narrowed the payload.
    pub fn traverse_closest(
        &self,
        node: NodeId,
        ray: &Ray,
        payload: &mut Payload,
        primitive: &mut Option<PrimitiveId>,
    ) -> bool {
        let mut hit = false;
        let mut stack: SmallVec<[NodeId; TRAVERSAL_STACK]> = smallvec![node];

        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if !node.aabb.fast_ray_intersect(ray, payload) {
                continue;
            }

            if let Some((left, right)) = node.children() {
                stack.push(right);
                stack.push(left);
                continue;
            }

            for &id in node.primitives() {
                if self.primitive(id).ray_intersect(ray, payload) {
                    *primitive = Some(id);
                    hit = true;
                }
            }
        }

        hit
    }

    /// Any-hit traversal of the subtree at `node`, stops at the first hit
    pub fn traverse_any(&self, node: NodeId, ray: &Ray, payload: &mut Payload) -> bool {
        let mut stack: SmallVec<[NodeId; TRAVERSAL_STACK]> = smallvec![node];

        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if !node.aabb.fast_ray_intersect(ray, payload) {
                continue;
            }

            if let Some((left, right)) = node.children() {
                stack.push(right);
                stack.push(left);
                continue;
            }

            if node
                .primitives()
                .iter()
                .any(|&id| self.primitive(id).ray_intersect(ray, payload))
            {
                return true;
            }
        }

        false
    }
}
