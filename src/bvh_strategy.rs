use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};

use crate::{BvhError, NodeArena, PrimitiveInfo, Result, AABB};

/// Default depth budget of a build
pub const DEFAULT_MAX_DEPTH: u32 = 10;

/// How the builder partitions primitives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SplitMode {
    /// Box-center split on a round-robin axis
    #[default]
    Spatial,
    /// Top-down radix split on Morton keys
    Linear,
}

impl SplitMode {
    /// Parse a split mode name, case insensitive
    pub fn parse(name: &str) -> Result<Self> {
        SplitMode::from_str(name).map_err(|_| BvhError::UnknownSplitMode(name.to_owned()))
    }
}

/// Build parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub split_mode: SplitMode,
    pub max_depth: u32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            split_mode: SplitMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl BuildOptions {
    pub fn new(split_mode: SplitMode, max_depth: u32) -> Result<Self> {
        if max_depth == 0 {
            return Err(BvhError::InvalidMaxDepth);
        }
        Ok(Self {
            split_mode,
            max_depth,
        })
    }

    /// Options from a split mode name and a depth budget
    pub fn parse(split_mode: &str, max_depth: u32) -> Result<Self> {
        Self::new(SplitMode::parse(split_mode)?, max_depth)
    }
}

/// Builds the node arena for a set of primitives.
///
/// `primitives` is never empty, `world` is the union of all primitive bounds and
/// `max_depth >= 1`. The root must end up at index 0 of `arena`.
pub trait BuildStrategy {
    const MODE: SplitMode;

    fn build_nodes(primitives: &[PrimitiveInfo], world: &AABB, max_depth: u32, arena: &mut NodeArena);
}

/// Split a node's primitive list so that both sides are non-empty by moving the
/// last element of the full side over. Returns true if a move was needed.
pub(crate) fn repair_degenerate_split<T>(left: &mut Vec<T>, right: &mut Vec<T>) -> bool {
    if left.is_empty() {
        if let Some(moved) = right.pop() {
            left.push(moved);
            return true;
        }
    }
    if right.is_empty() {
        if let Some(moved) = left.pop() {
            right.push(moved);
            return true;
        }
    }
    false
}
