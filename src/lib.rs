pub mod axis;
pub use axis::*;

pub mod aabb;
pub use aabb::*;

pub mod ray;
pub use ray::*;

pub mod payload;
pub use payload::*;

pub mod intersections;
pub use intersections::*;

pub mod primitive;
pub use primitive::*;

pub mod triangle;
pub use triangle::*;

pub mod shapes;
pub use shapes::*;

pub mod morton;
pub use morton::*;

pub mod error;
pub use error::*;

pub mod bvh_strategy;
pub use bvh_strategy::*;

pub mod bvh;
pub use bvh::*;

pub mod scene;
pub use scene::*;
