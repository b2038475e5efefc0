//! Hand-built cube geometry and the demo layout that places it.
//!
//! The cube is a unit cube centred on the origin with one quad per face, so
//! each face has its own normals and a full 0..1 UV square.

use std::rc::Rc;

use cgmath::{Deg, Vector3};

use crate::{
    context::GpuBackend,
    data_structures::{instance::Instance, model::{Mesh, ModelVertex}, texture::Texture},
    error::Result,
};

/// Where the textured cubes of the demo scene sit.
pub const CUBE_POSITIONS: [[f32; 3]; 10] = [
    [0.0, 0.0, 0.0],
    [2.0, 5.0, -15.0],
    [-1.5, -2.2, -2.5],
    [-3.8, -2.0, -12.3],
    [2.4, -0.4, -3.5],
    [-1.7, 3.0, -7.5],
    [1.3, -2.0, -2.5],
    [1.5, 2.0, -2.5],
    [1.5, 0.2, -1.5],
    [-1.3, 1.0, -1.5],
];

/// Where the point lights (and the small lamp cubes marking them) sit.
pub const POINT_LIGHT_POSITIONS: [[f32; 3]; 4] = [
    [0.7, 0.2, 2.0],
    [2.3, -3.3, -4.0],
    [-4.0, 2.0, -12.0],
    [0.0, 0.0, -3.0],
];

pub const LAMP_SCALE: f32 = 0.2;

// (normal, u axis, v axis) with u × v = normal so quads wind counter-clockwise from outside
const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
];

pub fn cube_geometry() -> (Vec<ModelVertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in FACES {
        let (n, u, v) = (Vector3::from(normal), Vector3::from(u), Vector3::from(v));
        let base = vertices.len() as u32;
        for (su, sv) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            let position = n * 0.5 + u * (su - 0.5) + v * (sv - 0.5);
            vertices.push(ModelVertex {
                position: position.into(),
                normal,
                tex_coords: [su, sv],
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

pub fn cube_mesh(
    name: &str,
    textures: Vec<Rc<Texture>>,
    backend: &mut dyn GpuBackend,
) -> Result<Mesh> {
    let (vertices, indices) = cube_geometry();
    Mesh::new(name, vertices, indices, textures, backend)
}

/// Cube `i` is rotated by `20 * i` degrees around (1, 0.3, 0.5).
pub fn cube_field() -> Vec<Instance> {
    CUBE_POSITIONS
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            Instance::rotated(position.into(), Vector3::new(1.0, 0.3, 0.5), Deg(20.0 * i as f32))
        })
        .collect()
}

pub fn lamp_instances() -> Vec<Instance> {
    POINT_LIGHT_POSITIONS
        .iter()
        .map(|&position| Instance::from(Vector3::from(position)).scaled(LAMP_SCALE))
        .collect()
}
