//! Spatial keys for the linear builder.
//!
//! Centroids are quantized to `0..=MORTON_SCALE` on each axis of the world box and the
//! three integers are bit-interleaved (x at `3i`, y at `3i + 1`, z at `3i + 2`), so that every
//! radix level of the key cycles through all three axes.

use glam::Vec3A;
use rayon::prelude::*;

use crate::AABB;

/// Quantization range per axis
pub const MORTON_SCALE: f32 = 1024.0;

/// Bits kept per axis. 3 * 21 bits fit in a u64.
pub const MORTON_AXIS_BITS: u32 = 21;

/// Key of a primitive for the radix split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MortonKey {
    pub code: u64,
    pub primitive: u32,
}

/// Interleave the low [`MORTON_AXIS_BITS`] bits of x, y and z
#[inline]
pub fn morton_encode(x: u32, y: u32, z: u32) -> u64 {
    let (x, y, z) = (x as u64, y as u64, z as u64);
    let mut result = 0_u64;
    for i in 0..MORTON_AXIS_BITS as u64 {
        let bit = 1_u64 << i;
        result |= (x & bit) << (2 * i) | (y & bit) << (2 * i + 1) | (z & bit) << (2 * i + 2);
    }
    result
}

/// Maps points of the world box into the integer key domain
#[derive(Debug, Clone, Copy)]
pub struct KeyQuantizer {
    min: Vec3A,
    scale: Vec3A,
}

impl KeyQuantizer {
    pub fn new(world: &AABB) -> Self {
        let extent = world.extent();
        // flat axes map to 0
        let scale = Vec3A::select(
            extent.cmpgt(Vec3A::ZERO),
            Vec3A::splat(MORTON_SCALE) / extent,
            Vec3A::ZERO,
        );
        Self {
            min: world.min,
            scale,
        }
    }

    /// Integer coordinates in `0..=MORTON_SCALE`. NaN maps to 0.
    #[inline]
    pub fn quantize(&self, point: Vec3A) -> [u32; 3] {
        let scaled = (point - self.min) * self.scale;
        scaled
            .to_array()
            .map(|v| num::cast::<f32, u32>(v.clamp(0.0, MORTON_SCALE)).unwrap_or(0))
    }

    #[inline]
    pub fn encode(&self, point: Vec3A) -> u64 {
        let [x, y, z] = self.quantize(point);
        morton_encode(x, y, z)
    }
}

/// Keys for every centroid, computed in parallel. Key `i` refers to primitive `i`.
pub fn compute_keys(centroids: &[Vec3A], world: &AABB) -> Vec<MortonKey> {
    let quantizer = KeyQuantizer::new(world);
    centroids
        .par_iter()
        .enumerate()
        .map(|(i, &centroid)| MortonKey {
            code: quantizer.encode(centroid),
            primitive: i as u32,
        })
        .collect()
}

/// Index of the most significant bit set in any key (0 if no bit is set)
pub fn highest_set_bit(keys: &[MortonKey]) -> u32 {
    let any = keys
        .par_iter()
        .map(|key| key.code)
        .reduce(|| 0, |a, b| a | b);

    if any == 0 {
        0
    } else {
        u64::BITS - 1 - any.leading_zeros()
    }
}
