//! Scene importers: file formats in, [`Scene`] out.
//!
//! [`FileImporter`] picks the reader by extension. glTF goes through the
//! `gltf` crate, Wavefront OBJ through `tobj`. Node transforms are not
//! applied; every mesh stays in the space its file stores it in.

use std::path::Path;

use crate::{
    data_structures::scene_graph::{Scene, SceneMaterial, SceneMesh, SceneNode, TextureSlot},
    error::{RenderError, Result},
};

/// Post-processing requested from an importer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportOptions {
    /// Split every polygon, strip and fan into triangles.
    pub triangulate: bool,
    /// Put the UV origin at the top-left corner of the image, which is where wgpu samples row 0.
    pub flip_uvs: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            triangulate: true,
            flip_uvs: true,
        }
    }
}

pub trait SceneImporter {
    fn import(&self, path: &Path, options: &ImportOptions) -> Result<Scene>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FileImporter;

impl SceneImporter for FileImporter {
    fn import(&self, path: &Path, options: &ImportOptions) -> Result<Scene> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("gltf" | "glb") => import_gltf(path, options),
            Some("obj") => import_obj(path, options),
            _ => Err(RenderError::Import(format!(
                "{}: no importer for this file type",
                path.display()
            ))),
        }
    }
}

fn node_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string())
}

fn import_gltf(path: &Path, options: &ImportOptions) -> Result<Scene> {
    let bytes = std::fs::read(path).map_err(|e| RenderError::io(path, e))?;
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(&bytes)
        .map_err(|e| RenderError::Import(format!("{}: {e}", path.display())))?;
    let buffer_data: Vec<Vec<u8>> = gltf::import_buffers(&document, path.parent(), blob)
        .map_err(|e| RenderError::Import(format!("{}: {e}", path.display())))?
        .into_iter()
        .map(|data| data.0)
        .collect();

    let mut scene = Scene::default();

    // Load materials
    for material in document.materials() {
        let mut textures = Vec::new();
        let pbr = material.pbr_metallic_roughness();
        let slots = [
            (TextureSlot::Diffuse, pbr.base_color_texture().map(|info| info.texture())),
            (TextureSlot::Normal, material.normal_texture().map(|t| t.texture())),
            (TextureSlot::Occlusion, material.occlusion_texture().map(|t| t.texture())),
            (TextureSlot::Emissive, material.emissive_texture().map(|info| info.texture())),
        ];
        for (slot, texture) in slots {
            let Some(texture) = texture else { continue };
            match texture.source().source() {
                gltf::image::Source::Uri { uri, .. } => textures.push((slot, uri.to_string())),
                gltf::image::Source::View { .. } => log::warn!(
                    "{}: embedded {slot} image of material {:?} skipped",
                    path.display(),
                    material.name()
                ),
            }
        }
        scene.materials.push(SceneMaterial {
            name: material.name().unwrap_or_default().to_string(),
            textures,
        });
    }

    // Every primitive becomes its own scene mesh
    let mut primitive_meshes: Vec<Vec<usize>> = Vec::new();
    for mesh in document.meshes() {
        let mut indices = Vec::new();
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(buffer_data[buffer.index()].as_slice()));
            let Some(positions) = reader.read_positions() else {
                log::warn!("{}: primitive without positions in mesh {:?}", path.display(), mesh.name());
                scene.incomplete = true;
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let normals = reader
                .read_normals()
                .map(|n| n.collect())
                .unwrap_or_default();
            // glTF already stores UVs with a top-left origin
            let tex_coords = reader.read_tex_coords(0).map(|uvs| {
                uvs.into_f32()
                    .map(|[u, v]| if options.flip_uvs { [u, v] } else { [u, 1.0 - v] })
                    .collect()
            });
            let flat: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            let faces = primitive_faces(primitive.mode(), &flat, options.triangulate).unwrap_or_else(|| {
                log::warn!(
                    "{}: {:?} primitive in mesh {:?} has no triangles",
                    path.display(),
                    primitive.mode(),
                    mesh.name()
                );
                Vec::new()
            });

            indices.push(scene.meshes.len());
            scene.meshes.push(SceneMesh {
                name: mesh.name().unwrap_or_default().to_string(),
                positions,
                normals,
                tex_coords,
                faces,
                material: primitive.material().index(),
            });
        }
        primitive_meshes.push(indices);
    }

    let gltf_scene = document.default_scene().or_else(|| document.scenes().next());
    scene.root = gltf_scene.map(|s| {
        let mut root = SceneNode::new(node_name(path));
        root.children = s.nodes().map(|node| to_scene_node(node, &primitive_meshes)).collect();
        root
    });
    Ok(scene)
}

fn to_scene_node(node: gltf::Node, primitive_meshes: &[Vec<usize>]) -> SceneNode {
    SceneNode {
        name: node.name().unwrap_or_default().to_string(),
        meshes: node
            .mesh()
            .map(|mesh| primitive_meshes[mesh.index()].clone())
            .unwrap_or_default(),
        children: node
            .children()
            .map(|child| to_scene_node(child, primitive_meshes))
            .collect(),
    }
}

/// `None` for points and lines. Without triangulation strips and fans stay one polygon each.
fn primitive_faces(mode: gltf::mesh::Mode, indices: &[u32], triangulate: bool) -> Option<Vec<Vec<u32>>> {
    use gltf::mesh::Mode;
    let faces = match mode {
        Mode::Triangles => indices.chunks_exact(3).map(<[u32]>::to_vec).collect(),
        Mode::TriangleStrip | Mode::TriangleFan if !triangulate => vec![indices.to_vec()],
        Mode::TriangleStrip => indices
            .windows(3)
            .enumerate()
            // every other triangle of a strip is wound backwards
            .map(|(i, w)| if i % 2 == 0 { vec![w[0], w[1], w[2]] } else { vec![w[1], w[0], w[2]] })
            .collect(),
        Mode::TriangleFan => match indices.split_first() {
            Some((&hub, rest)) => rest.windows(2).map(|w| vec![hub, w[0], w[1]]).collect(),
            None => Vec::new(),
        },
        Mode::Points | Mode::Lines | Mode::LineLoop | Mode::LineStrip => return None,
    };
    Some(faces)
}

fn import_obj(path: &Path, options: &ImportOptions) -> Result<Scene> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: options.triangulate,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| RenderError::Import(format!("{}: {e}", path.display())))?;

    let materials = materials.unwrap_or_else(|e| {
        log::warn!("{}: materials not loaded: {e}", path.display());
        Vec::new()
    });

    let mut scene = Scene::default();
    for m in &materials {
        let slots = [
            (TextureSlot::Diffuse, &m.diffuse_texture),
            (TextureSlot::Specular, &m.specular_texture),
            (TextureSlot::Normal, &m.normal_texture),
            (TextureSlot::Shininess, &m.shininess_texture),
        ];
        scene.materials.push(SceneMaterial {
            name: m.name.clone(),
            textures: slots
                .into_iter()
                .filter_map(|(slot, file)| file.as_ref().map(|f| (slot, f.clone())))
                .collect(),
        });
    }

    let mut root = SceneNode::new(node_name(path));
    for model in models {
        let mesh = &model.mesh;
        let positions = mesh.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect();
        let normals = mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect();
        // OBJ puts the UV origin bottom-left
        let tex_coords = (!mesh.texcoords.is_empty()).then(|| {
            mesh.texcoords
                .chunks_exact(2)
                .map(|t| if options.flip_uvs { [t[0], 1.0 - t[1]] } else { [t[0], t[1]] })
                .collect()
        });
        let faces = if mesh.face_arities.is_empty() {
            mesh.indices.chunks_exact(3).map(<[u32]>::to_vec).collect()
        } else {
            let mut start = 0;
            mesh.face_arities
                .iter()
                .map(|&arity| {
                    let face = mesh.indices[start..start + arity as usize].to_vec();
                    start += arity as usize;
                    face
                })
                .collect()
        };
        let material = mesh.material_id.filter(|&id| {
            let known = id < scene.materials.len();
            if !known {
                log::warn!("{}: mesh {} uses missing material {id}", path.display(), model.name);
            }
            known
        });

        let index = scene.meshes.len();
        scene.meshes.push(SceneMesh {
            name: model.name.clone(),
            positions,
            normals,
            tex_coords,
            faces,
            material,
        });
        root.children.push(SceneNode::new(model.name).with_meshes([index]));
    }
    scene.root = Some(root);
    Ok(scene)
}
