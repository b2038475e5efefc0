//! lantern-ngin
//!
//! A small retained-mode 3D renderer core on top of wgpu. It keeps a
//! free-flying camera, loads models through a scene importer into GPU-backed
//! meshes, shares decoded textures through an explicit cache and records draw
//! calls against an explicit render context so binding order can be checked.
//!
//! High-level modules
//! - `camera`: camera, controller, projection and camera uniforms
//! - `context`: GPU backend seam and the wgpu implementation that owns device/queue
//! - `data_structures`: engine data models (meshes, textures, lights, instances, scenes)
//! - `error`: the error type every fallible operation returns
//! - `render`: texture-unit binding state and recorded draw calls
//! - `resources`: importers, image decoding, the texture cache and model loading
//! - `shader`: the uniform-setting seam and a named uniform table
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod render;
pub mod resources;
pub mod shader;

pub use error::{RenderError, Result};

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use wgpu;
pub use winit::event::{ElementState, MouseScrollDelta};
pub use winit::keyboard::KeyCode;
