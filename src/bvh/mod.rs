//! Bounding volume hierarchy stored as a node arena.
//!
//! Nodes live in a `Vec` and refer to their children by index, the root is node 0.
//! A tree is built once from a list of primitives and never changes afterwards, so it can be
//! shared between threads and queried concurrently. Geometry changes mean a full rebuild.

mod linear;
mod spatial;
mod traversal;

pub use linear::*;
pub use spatial::*;
pub use traversal::*;

use std::time::{Duration, Instant};

use glam::{Vec3, Vec3A};
use rayon::prelude::*;
use smallvec::SmallVec;
use tracing::debug;

use crate::{
    expand_primitives, BuildOptions, BuildStrategy, Grow, Primitive, PrimitiveSource, SplitMode,
    AABB,
};

/// Index of a node in [`Bvh::nodes`]
pub type NodeId = u32;

/// Index of a primitive in [`Bvh::primitives`]
pub type PrimitiveId = u32;

/// The root is always the first node
pub const ROOT: NodeId = 0;

/// Bounds and centroid of a primitive, computed once per build
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveInfo {
    pub bounds: AABB,
    pub centroid: Vec3A,
}

impl PrimitiveInfo {
    #[inline]
    pub fn new(bounds: AABB) -> Self {
        Self {
            bounds,
            centroid: bounds.center(),
        }
    }
}

/// Tree node. Either a leaf holding primitives, an internal node with exactly two
/// children, or the empty root of a tree built from nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BvhNode {
    pub aabb: AABB,
    children: Option<(NodeId, NodeId)>,
    primitives: SmallVec<[PrimitiveId; 4]>,
}

impl BvhNode {
    /// Leaf holding `ids`, bounded by their boxes
    pub fn leaf(primitives: &[PrimitiveInfo], ids: &[PrimitiveId]) -> Self {
        let mut aabb = AABB::default();
        for &id in ids {
            aabb.grow(&primitives[id as usize].bounds);
        }
        Self {
            aabb,
            children: None,
            primitives: SmallVec::from_slice(ids),
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        !self.primitives.is_empty()
    }

    /// (left, right) for internal nodes
    #[inline]
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        self.children
    }

    /// Primitives of a leaf, empty for internal nodes
    #[inline]
    pub fn primitives(&self) -> &[PrimitiveId] {
        &self.primitives
    }
}

/// Nodes under construction plus the running balance statistic
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<BvhNode>,
    balance_sum: f64,
    splits: u32,
}

impl NodeArena {
    /// Append a node and return its id
    #[inline]
    pub fn push(&mut self, node: BvhNode) -> NodeId {
        self.nodes.push(node);
        (self.nodes.len() - 1) as NodeId
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut BvhNode {
        &mut self.nodes[id as usize]
    }

    /// Turn `parent` into an internal node bounded by `aabb` and append its two children
    /// next to each other. The children start out empty and are filled in by the caller.
    pub fn add_children(&mut self, parent: NodeId, aabb: AABB) -> (NodeId, NodeId) {
        let left = self.push(BvhNode::default());
        let right = self.push(BvhNode::default());
        let node = self.node_mut(parent);
        node.aabb = aabb;
        node.children = Some((left, right));
        node.primitives.clear();
        (left, right)
    }

    /// Track the `left / right` size ratio of a split
    #[inline]
    pub fn record_split(&mut self, left: usize, right: usize) {
        self.balance_sum += left as f64 / right as f64;
        self.splits += 1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn average_balance(&self) -> f32 {
        if self.splits == 0 {
            0.0
        } else {
            (self.balance_sum / self.splits as f64) as f32
        }
    }
}

/// Statistics of the build that produced a tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildStats {
    pub split_mode: SplitMode,
    pub max_depth: u32,
    pub node_count: usize,
    /// Mean of `left / right` primitive counts over all splits (0 without splits)
    pub avg_balance: f32,
    pub build_time: Duration,
}

/// Bounding volume hierarchy over an owned list of primitives
#[derive(Debug, Clone)]
pub struct Bvh<P> {
    primitives: Vec<P>,
    nodes: Vec<BvhNode>,
    stats: BuildStats,
}

impl<P> Bvh<P>
where
    P: Primitive,
{
    /// Expand `objects` into primitives and build with the configured split mode
    pub fn build<S>(objects: &[S], options: &BuildOptions) -> Self
    where
        S: PrimitiveSource<Primitive = P>,
    {
        Self::from_primitives(expand_primitives(objects), options)
    }

    /// Expand `objects` into primitives and build with a fixed strategy
    pub fn build_with<Strat, S>(objects: &[S], max_depth: u32) -> Self
    where
        Strat: BuildStrategy,
        S: PrimitiveSource<Primitive = P>,
    {
        Self::from_primitives_with::<Strat>(expand_primitives(objects), max_depth)
    }

    pub fn from_primitives(primitives: Vec<P>, options: &BuildOptions) -> Self {
        match options.split_mode {
            SplitMode::Spatial => {
                Self::from_primitives_with::<SpatialStrategy>(primitives, options.max_depth)
            }
            SplitMode::Linear => {
                Self::from_primitives_with::<LinearStrategy>(primitives, options.max_depth)
            }
        }
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(mode = %Strat::MODE, primitives = primitives.len(), max_depth = max_depth)
    )]
    pub fn from_primitives_with<Strat>(primitives: Vec<P>, max_depth: u32) -> Self
    where
        Strat: BuildStrategy,
    {
        let start = Instant::now();
        let mut arena = NodeArena::default();

        if primitives.is_empty() {
            arena.push(BvhNode::default());
        } else {
            let info: Vec<PrimitiveInfo> = primitives
                .par_iter()
                .map(|primitive| PrimitiveInfo::new(primitive.bounds()))
                .collect();
            let world = info
                .par_iter()
                .map(|info| info.bounds)
                .reduce(AABB::default, |a, b| a.union(&b));

            arena.nodes.reserve(2 * primitives.len());
            Strat::build_nodes(&info, &world, max_depth, &mut arena);
        }

        let stats = BuildStats {
            split_mode: Strat::MODE,
            max_depth,
            node_count: arena.len(),
            avg_balance: arena.average_balance(),
            build_time: start.elapsed(),
        };

        debug!(
            nodes = stats.node_count,
            avg_balance = stats.avg_balance,
            elapsed = ?stats.build_time,
            "built BVH"
        );

        Self {
            primitives,
            nodes: arena.nodes,
            stats,
        }
    }
}

impl<P> Bvh<P> {
    #[inline]
    pub fn root(&self) -> &BvhNode {
        &self.nodes[ROOT as usize]
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &BvhNode {
        &self.nodes[id as usize]
    }

    #[inline]
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    #[inline]
    pub fn primitive(&self, id: PrimitiveId) -> &P {
        &self.primitives[id as usize]
    }

    #[inline]
    pub fn primitives(&self) -> &[P] {
        &self.primitives
    }

    #[inline]
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Bounds of the whole tree (invalid when built from nothing)
    #[inline]
    pub fn bounds(&self) -> AABB {
        self.root().aabb
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Box edges of every node for debug drawing, as consecutive segment end points
    pub fn edges(&self) -> Vec<Vec3> {
        self.node_edges(ROOT, true)
    }

    /// Box edges of one node, and of its whole subtree if `recursive`.
    /// Nodes with empty boxes are skipped.
    pub fn node_edges(&self, node: NodeId, recursive: bool) -> Vec<Vec3> {
        let mut edges = vec![];
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if node.aabb.is_valid() {
                node.aabb.edges(&mut edges);
            }
            if let (true, Some((left, right))) = (recursive, node.children()) {
                stack.push(right);
                stack.push(left);
            }
        }
        edges
    }
}

/// Edge list as a flat `[x0, y0, z0, x1, ...]` slice, ready for a vertex buffer
#[inline]
pub fn edges_as_f32(edges: &[Vec3]) -> &[f32] {
    bytemuck::cast_slice(edges)
}
