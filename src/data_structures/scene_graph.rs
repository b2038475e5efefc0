//! The imported scene, before anything touches the GPU.
//!
//! Importers produce a [`Scene`]: a tree of [`SceneNode`]s that refer to
//! meshes by index into one flat per-scene table, the way glTF and most
//! interchange formats lay things out. Meshes in turn refer to materials by
//! index, and materials list the image files they sample per [`TextureSlot`].

use std::fmt;

/// The material role an importer assigned to a texture file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Diffuse,
    Specular,
    Normal,
    Emissive,
    Occlusion,
    Shininess,
}

impl fmt::Display for TextureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextureSlot::Diffuse => "diffuse",
            TextureSlot::Specular => "specular",
            TextureSlot::Normal => "normal",
            TextureSlot::Emissive => "emissive",
            TextureSlot::Occlusion => "occlusion",
            TextureSlot::Shininess => "shininess",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneMaterial {
    pub name: String,
    /// Texture files in the order the source lists them, relative to the scene's directory.
    pub textures: Vec<(TextureSlot, String)>,
}

impl SceneMaterial {
    pub fn textures_in(&self, slot: TextureSlot) -> impl Iterator<Item = &str> {
        self.textures
            .iter()
            .filter(move |(s, _)| *s == slot)
            .map(|(_, file)| file.as_str())
    }
}

/// Geometry of one mesh as the importer read it.
///
/// `normals` may be empty and `tex_coords` may be absent. `faces` hold
/// indices into `positions`; after triangulation each face has three.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Option<Vec<[f32; 2]>>,
    pub faces: Vec<Vec<u32>>,
    pub material: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Indices into [`Scene::meshes`].
    pub meshes: Vec<usize>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_meshes(mut self, meshes: impl IntoIterator<Item = usize>) -> Self {
        self.meshes.extend(meshes);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first pre-order walk: a node comes before its children, siblings in order.
    pub fn walk(&self) -> Vec<&SceneNode> {
        let mut order = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(node.children.iter().rev());
        }
        order
    }
}

/// What a [`SceneImporter`](crate::resources::scene::SceneImporter) returns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub root: Option<SceneNode>,
    pub meshes: Vec<SceneMesh>,
    pub materials: Vec<SceneMaterial>,
    /// Set when the importer could only read part of the file.
    pub incomplete: bool,
}
