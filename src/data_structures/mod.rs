//! Engine data structures: meshes, textures, lights, scene graphs, and instances.
//!
//! This module contains the core data types for scene representation:
//!
//! - `model` contains the vertex layout, GPU-backed meshes and whole models
//! - `texture` contains texture kinds, pixel formats and the uploaded texture handle
//! - `cube` holds hand-built cube geometry and the demo scene layout
//! - `instance` holds per-draw transformation data
//! - `light` describes the directional, point and spot lights of a lit scene
//! - `scene_graph` is the importer's view of a file, before upload

pub mod cube;
pub mod instance;
pub mod light;
pub mod model;
pub mod scene_graph;
pub mod texture;
