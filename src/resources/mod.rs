use std::path::{Path, PathBuf};

use crate::{
    context::GpuBackend,
    data_structures::{
        model::{Mesh, Model},
        scene_graph::{Scene, SceneMesh, SceneNode, TextureSlot},
        texture::TextureKind,
    },
    error::{RenderError, Result},
    resources::{
        scene::{ImportOptions, SceneImporter},
        texture::TextureCache,
    },
};

/**
 * This module contains all logic for loading meshes and textures from external files.
 */
pub mod mesh;
pub mod scene;
pub mod texture;

/// Imports `path`, then uploads one mesh per scene mesh reference in node pre-order.
///
/// Either the whole model loads or nothing stays allocated: on failure the
/// meshes created so far are released again. Textures that made it into
/// `cache` stay there.
pub fn load_model(
    path: &Path,
    importer: &dyn SceneImporter,
    cache: &mut TextureCache,
    backend: &mut dyn GpuBackend,
) -> Result<Model> {
    let scene = importer.import(path, &ImportOptions::default())?;
    if scene.incomplete {
        return Err(RenderError::Import(format!("{}: scene is incomplete", path.display())));
    }
    let Some(root) = scene.root.as_ref() else {
        return Err(RenderError::Import(format!("{}: scene has no root node", path.display())));
    };

    let mut model = Model {
        meshes: Vec::new(),
        directory: model_directory(path),
    };
    match process_node(root, &scene, &mut model, cache, backend) {
        Ok(()) => {
            log::info!("loaded {} with {} meshes", path.display(), model.meshes.len());
            Ok(model)
        }
        Err(e) => {
            model.release(backend);
            Err(e)
        }
    }
}

/// The directory textures of a model file are resolved against.
pub fn model_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn process_node(
    node: &SceneNode,
    scene: &Scene,
    model: &mut Model,
    cache: &mut TextureCache,
    backend: &mut dyn GpuBackend,
) -> Result<()> {
    log::info!("processing node {:?} ({} meshes)", node.name, node.meshes.len());
    for &index in &node.meshes {
        let source = scene.meshes.get(index).ok_or_else(|| {
            RenderError::Import(format!("node {:?} references missing mesh {index}", node.name))
        })?;
        let mesh = process_mesh(source, scene, &model.directory, cache, backend)?;
        model.meshes.push(mesh);
    }
    for child in &node.children {
        process_node(child, scene, model, cache, backend)?;
    }
    Ok(())
}

fn process_mesh(
    source: &SceneMesh,
    scene: &Scene,
    directory: &Path,
    cache: &mut TextureCache,
    backend: &mut dyn GpuBackend,
) -> Result<Mesh> {
    let vertices = mesh::to_vertices(source);
    let indices = mesh::flatten_faces(source);

    let material = source
        .material
        .map(|m| {
            scene.materials.get(m).ok_or_else(|| {
                RenderError::Import(format!("mesh {:?} references missing material {m}", source.name))
            })
        })
        .transpose()?;

    let mut textures = Vec::new();
    if let Some(material) = material {
        for (slot, kind) in [
            (TextureSlot::Diffuse, TextureKind::Diffuse),
            (TextureSlot::Specular, TextureKind::Specular),
        ] {
            for file in material.textures_in(slot) {
                textures.push(cache.acquire(directory.join(file), kind.clone(), backend)?);
            }
        }
        for (slot, file) in &material.textures {
            if !matches!(slot, TextureSlot::Diffuse | TextureSlot::Specular) {
                log::warn!("mesh {:?}: {slot} texture {file} not used", source.name);
            }
        }
    }

    Mesh::new(&source.name, vertices, indices, textures, backend)
}
