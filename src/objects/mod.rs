pub mod aabb;
pub mod bvh;
pub mod cube;
pub mod hit;
pub mod medium;
pub mod rectangle;
pub mod sphere;
pub mod transform;

use thiserror::Error;

/// Rejected scene construction.
#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("moving sphere needs two distinct finite keyframe times, got {time0} and {time1}")]
    DegenerateTimeRange { time0: f64, time1: f64 },

    #[error("constant medium density must be positive and finite, got {0}")]
    InvalidDensity(f64),

    #[error("cannot build a BVH over an empty shape list")]
    EmptyBvh,

    #[error("no preset scene with index {0}")]
    UnknownScene(usize),
}
