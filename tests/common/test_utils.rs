use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
    rc::Rc,
};

use cgmath::{Matrix4, Vector3};
use lantern_ngin::{
    context::{BufferId, GpuBackend, MeshBuffers, TextureId},
    data_structures::{model::ModelVertex, scene_graph::Scene, texture::{DecodedImage, TextureImage}},
    error::{RenderError, Result},
    resources::{
        scene::{ImportOptions, SceneImporter},
        texture::ImageDecoder,
    },
    shader::{ShaderProgram, UniformValue},
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Hands out sequential ids and remembers what is still alive.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_id: u32,
    pub textures: BTreeMap<TextureId, String>,
    pub meshes: Vec<(String, MeshBuffers, usize, usize)>,
    pub released_textures: Vec<TextureId>,
    pub released_meshes: Vec<MeshBuffers>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_meshes(&self) -> usize {
        self.meshes.len() - self.released_meshes.len()
    }
}

impl GpuBackend for RecordingBackend {
    fn upload_texture(&mut self, label: &str, _image: &TextureImage) -> TextureId {
        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.textures.insert(id, label.to_string());
        id
    }

    fn upload_mesh(&mut self, label: &str, vertices: &[ModelVertex], indices: &[u32]) -> MeshBuffers {
        let buffers = MeshBuffers {
            vertex: BufferId(self.next_id),
            index: BufferId(self.next_id + 1),
        };
        self.next_id += 2;
        self.meshes
            .push((label.to_string(), buffers, vertices.len(), indices.len()));
        buffers
    }

    fn release_texture(&mut self, id: TextureId) {
        self.textures.remove(&id);
        self.released_textures.push(id);
    }

    fn release_mesh(&mut self, buffers: MeshBuffers) {
        self.released_meshes.push(buffers);
    }
}

/// Serves in-memory images and logs every decode. Unknown paths fail like a missing file.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDecoder {
    images: HashMap<PathBuf, DecodedImage>,
    pub decoded: Rc<RefCell<Vec<PathBuf>>>,
}

impl ScriptedDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, path: impl Into<PathBuf>, width: u32, height: u32, channels: u8) -> Self {
        self.images.insert(
            path.into(),
            DecodedImage {
                width,
                height,
                channels,
                pixels: vec![128; (width * height * channels as u32) as usize],
            },
        );
        self
    }

    pub fn decode_count(&self) -> usize {
        self.decoded.borrow().len()
    }
}

impl ImageDecoder for ScriptedDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        self.decoded.borrow_mut().push(path.to_path_buf());
        self.images.get(path).cloned().ok_or_else(|| RenderError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such image"),
        })
    }
}

/// Returns a prepared scene, or an import failure carrying `message`.
#[derive(Debug)]
pub struct ScriptedImporter {
    scene: std::result::Result<Scene, String>,
    pub requested: RefCell<Vec<(PathBuf, ImportOptions)>>,
}

impl ScriptedImporter {
    pub fn returning(scene: Scene) -> Self {
        Self {
            scene: Ok(scene),
            requested: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            scene: Err(message.to_string()),
            requested: RefCell::new(Vec::new()),
        }
    }
}

impl SceneImporter for ScriptedImporter {
    fn import(&self, path: &Path, options: &ImportOptions) -> Result<Scene> {
        self.requested.borrow_mut().push((path.to_path_buf(), *options));
        self.scene.clone().map_err(RenderError::Import)
    }
}

/// Logs every uniform assignment in call order.
#[derive(Debug, Default)]
pub struct RecordingShader {
    pub activations: usize,
    pub calls: Vec<(String, UniformValue)>,
}

impl RecordingShader {
    pub fn ints(&self) -> Vec<(&str, i32)> {
        self.calls
            .iter()
            .filter_map(|(name, value)| match value {
                UniformValue::Int(i) => Some((name.as_str(), *i)),
                _ => None,
            })
            .collect()
    }
}

impl ShaderProgram for RecordingShader {
    fn activate(&mut self) {
        self.activations += 1;
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.calls.push((name.to_string(), UniformValue::Int(value)));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.calls.push((name.to_string(), UniformValue::Float(value)));
    }

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
        self.calls.push((name.to_string(), UniformValue::Vec3(value)));
    }

    fn set_mat4(&mut self, name: &str, value: Matrix4<f32>) {
        self.calls.push((name.to_string(), UniformValue::Mat4(value)));
    }
}
