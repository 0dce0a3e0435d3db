#![allow(clippy::float_cmp)]
#[macro_use]
extern crate lazy_static;

pub mod camera;
pub mod config;
pub mod integrator;
pub mod material;
pub mod objects;
pub mod output;
pub mod pdf;
pub mod perlin;
pub mod renderer;
pub mod scene;
pub mod texture;
pub mod vec3;
pub mod worker_pool;

mod ray;

pub use config::{RenderConfig, CONFIGS};
pub use ray::Ray;
pub use vec3::Vec3;
