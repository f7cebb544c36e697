// Do this because numerics calls for a lot of non-standard names
#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]
pub mod antenna;
pub mod colormap;
pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod helper;
pub mod helper_traits;
pub mod mapping;
#[cfg(not(target_arch = "wasm32"))]
pub mod pattern_chart;
pub mod raster;
pub mod surface;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use engine::{create_app, create_app_with_config, initialise, App, FrameStatus};
