use bitvec::prelude::*;
use glam::Vec3A;
use rayon::prelude::*;
use smallvec::SmallVec;
use tracing::trace;

use crate::{
    compute_keys, highest_set_bit, repair_degenerate_split, BuildStrategy, BvhNode, Grow,
    MortonKey, NodeArena, NodeId, PrimitiveId, PrimitiveInfo, SplitMode, AABB,
};

/// Top-down radix split on the Morton keys of the primitive centroids.
///
/// Each level partitions on one key bit, starting from the highest bit set in any key,
/// so consecutive levels cycle through the axes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearStrategy;

/// Node still to be split, with the keys of the primitives it holds
struct Pending {
    node: NodeId,
    keys: Vec<MortonKey>,
    bit: u32,
    depth: u32,
}

impl BuildStrategy for LinearStrategy {
    const MODE: SplitMode = SplitMode::Linear;

    fn build_nodes(
        primitives: &[PrimitiveInfo],
        world: &AABB,
        max_depth: u32,
        arena: &mut NodeArena,
    ) {
        let centroids: Vec<Vec3A> = primitives.par_iter().map(|info| info.centroid).collect();
        let keys = compute_keys(&centroids, world);
        let start_bit = highest_set_bit(&keys);
        trace!(start_bit, "radix split");

        let root = arena.push(BvhNode::default());
        let mut stack = vec![Pending {
            node: root,
            keys,
            bit: start_bit,
            depth: max_depth,
        }];

        while let Some(Pending {
            node,
            keys,
            bit,
            depth,
        }) = stack.pop()
        {
            if bit == 0 || depth == 0 || keys.len() == 1 {
                let ids: SmallVec<[PrimitiveId; 8]> =
                    keys.iter().map(|key| key.primitive).collect();
                *arena.node_mut(node) = BvhNode::leaf(primitives, &ids);
                continue;
            }

            let mut aabb = AABB::default();
            for key in &keys {
                aabb.grow(&primitives[key.primitive as usize].bounds);
            }

            let (mut left, mut right): (Vec<MortonKey>, Vec<MortonKey>) =
                keys.into_iter().partition(|key| !bit_is_set(key, bit));
            if repair_degenerate_split(&mut left, &mut right) {
                trace!(bit, depth, "no key differs at this bit, moved one primitive over");
            }
            arena.record_split(left.len(), right.len());

            let (left_node, right_node) = arena.add_children(node, aabb);
            stack.push(Pending {
                node: right_node,
                keys: right,
                bit: bit - 1,
                depth: depth - 1,
            });
            stack.push(Pending {
                node: left_node,
                keys: left,
                bit: bit - 1,
                depth: depth - 1,
            });
        }
    }
}

#[inline]
fn bit_is_set(key: &MortonKey, bit: u32) -> bool {
    key.code.view_bits::<Lsb0>()[bit as usize]
}
