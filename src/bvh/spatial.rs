use tracing::trace;

use crate::{
    repair_degenerate_split, Axis, BuildStrategy, BvhNode, Grow, NodeArena, NodeId, PrimitiveId,
    PrimitiveInfo, SplitMode, AABB,
};

/// Box-center split on a round-robin axis: every node cuts its box in half on one axis,
/// rotating X, Y, Z from the root down. Primitives go left when their centroid is at or
/// below the cut.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpatialStrategy;

/// Node still to be split, with the primitives it holds
struct Pending {
    node: NodeId,
    queue: Vec<PrimitiveId>,
    axis: Axis,
    depth: u32,
}

impl BuildStrategy for SpatialStrategy {
    const MODE: SplitMode = SplitMode::Spatial;

    fn build_nodes(
        primitives: &[PrimitiveInfo],
        _world: &AABB,
        max_depth: u32,
        arena: &mut NodeArena,
    ) {
        let root = arena.push(BvhNode::default());
        let mut stack = vec![Pending {
            node: root,
            queue: (0..primitives.len() as PrimitiveId).collect(),
            axis: Axis::X,
            depth: max_depth,
        }];

        while let Some(Pending {
            node,
            queue,
            axis,
            depth,
        }) = stack.pop()
        {
            if queue.len() <= 1 || depth == 0 {
                *arena.node_mut(node) = BvhNode::leaf(primitives, &queue);
                continue;
            }

            let mut aabb = AABB::default();
            for &prim in &queue {
                aabb.grow(&primitives[prim as usize].bounds);
            }
            let cut = aabb.center()[axis];

            // NaN centroids compare false and end up on the right
            let (mut left, mut right): (Vec<PrimitiveId>, Vec<PrimitiveId>) = queue
                .into_iter()
                .partition(|&prim| primitives[prim as usize].centroid[axis] <= cut);
            if repair_degenerate_split(&mut left, &mut right) {
                trace!(?axis, depth, "all centroids on one side, moved one primitive over");
            }
            arena.record_split(left.len(), right.len());

            let (left_node, right_node) = arena.add_children(node, aabb);
            stack.push(Pending {
                node: right_node,
                queue: right,
                axis: axis.next(),
                depth: depth - 1,
            });
            stack.push(Pending {
                node: left_node,
                queue: left,
                axis: axis.next(),
                depth: depth - 1,
            });
        }
    }
}
