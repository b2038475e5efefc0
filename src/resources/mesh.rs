use crate::data_structures::{model::ModelVertex, scene_graph::SceneMesh};

/**
 * One vertex per source position. Missing normals come out as zero and a
 * mesh without a UV channel gets (0, 0) everywhere.
 */
pub fn to_vertices(mesh: &SceneMesh) -> Vec<ModelVertex> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, &position)| ModelVertex {
            position,
            normal: mesh.normals.get(i).copied().unwrap_or([0.0; 3]),
            tex_coords: mesh
                .tex_coords
                .as_ref()
                .and_then(|uvs| uvs.get(i).copied())
                .unwrap_or([0.0; 2]),
        })
        .collect()
}

/// All faces, in order, as one index list.
pub fn flatten_faces(mesh: &SceneMesh) -> Vec<u32> {
    mesh.faces.iter().flatten().copied().collect()
}
