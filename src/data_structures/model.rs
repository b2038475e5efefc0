//! Meshes and models: the GPU-resident units the render loop draws.

use std::{
    path::{Path, PathBuf},
    rc::Rc,
};

use crate::{
    context::{GpuBackend, MeshBuffers},
    data_structures::{instance::Instance, texture::{Texture, TextureKind}},
    error::{RenderError, Result},
    render::{MAX_TEXTURE_UNITS, RenderContext},
    resources::{self, scene::SceneImporter, texture::TextureCache},
    shader::ShaderProgram,
};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl ModelVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
}

/**
 * Position at location 0, normal at 1, texture coordinate at 2, all read
 * from a single interleaved buffer stepping once per vertex.
 */
impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// One drawable unit: immutable geometry, its GPU buffers and the textures it samples.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    vertices: Vec<ModelVertex>,
    indices: Vec<u32>,
    textures: Vec<Rc<Texture>>,
    buffers: MeshBuffers,
}

impl Mesh {
    /// Validates the triangle list and uploads vertex and index data right away.
    pub fn new(
        name: &str,
        vertices: Vec<ModelVertex>,
        indices: Vec<u32>,
        textures: Vec<Rc<Texture>>,
        backend: &mut dyn GpuBackend,
    ) -> Result<Self> {
        if indices.len() % 3 != 0 {
            return Err(RenderError::Geometry {
                mesh: name.to_string(),
                reason: format!("{} indices don't form whole triangles", indices.len()),
            });
        }
        if let Some(&out_of_range) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(RenderError::Geometry {
                mesh: name.to_string(),
                reason: format!("index {out_of_range} exceeds {} vertices", vertices.len()),
            });
        }

        let buffers = backend.upload_mesh(name, &vertices, &indices);
        Ok(Self {
            name: name.to_string(),
            vertices,
            indices,
            textures,
            buffers,
        })
    }

    pub fn vertices(&self) -> &[ModelVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn textures(&self) -> &[Rc<Texture>] {
        &self.textures
    }

    pub fn buffers(&self) -> MeshBuffers {
        self.buffers
    }

    /// Sampler uniform name for each texture, numbered per kind starting at 1.
    ///
    /// Fails when the textures don't fit into the available texture units.
    pub fn sampler_names(&self) -> Result<Vec<String>> {
        if self.textures.len() > MAX_TEXTURE_UNITS as usize {
            return Err(RenderError::TooManyTextures {
                mesh: self.name.clone(),
                count: self.textures.len(),
                max: MAX_TEXTURE_UNITS,
            });
        }
        let mut diffuse_n = 0;
        let mut specular_n = 0;
        self.textures
            .iter()
            .map(|texture| {
                let n = match texture.kind() {
                    TextureKind::Diffuse => {
                        diffuse_n += 1;
                        diffuse_n
                    }
                    TextureKind::Specular => {
                        specular_n += 1;
                        specular_n
                    }
                    TextureKind::Other(name) => {
                        return Err(RenderError::UnknownTextureKind(name.clone()));
                    }
                };
                Ok(format!("{}{n}", texture.kind()))
            })
            .collect()
    }

    /// Binds texture `i` to unit `i`, points its sampler uniform at that unit,
    /// draws the full index range and leaves unit 0 active.
    ///
    /// Names are resolved before anything is bound, so an unknown texture kind
    /// or a texture count beyond the unit limit leaves `ctx` and `shader` untouched.
    pub fn draw(&self, shader: &mut dyn ShaderProgram, ctx: &mut RenderContext) -> Result<()> {
        let names = self.sampler_names()?;
        for (unit, (texture, name)) in self.textures.iter().zip(&names).enumerate() {
            ctx.active_texture(unit as u32);
            shader.set_int(name, unit as i32);
            ctx.bind_texture(texture.id());
        }
        ctx.draw_indexed(self.buffers, self.indices.len() as u32);
        ctx.active_texture(0);
        Ok(())
    }

    pub fn release(self, backend: &mut dyn GpuBackend) {
        backend.release_mesh(self.buffers);
    }
}

/// All meshes of one imported scene, in scene-graph pre-order.
#[derive(Debug)]
pub struct Model {
    pub(crate) meshes: Vec<Mesh>,
    pub(crate) directory: PathBuf,
}

impl Model {
    /// Imports `path` and uploads every mesh. Textures resolve relative to the file's directory.
    pub fn load(
        path: impl AsRef<Path>,
        importer: &dyn SceneImporter,
        cache: &mut TextureCache,
        backend: &mut dyn GpuBackend,
    ) -> Result<Self> {
        resources::load_model(path.as_ref(), importer, cache, backend)
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn draw(&self, shader: &mut dyn ShaderProgram, ctx: &mut RenderContext) -> Result<()> {
        for mesh in &self.meshes {
            mesh.draw(shader, ctx)?;
        }
        Ok(())
    }

    /// Sets the `model` uniform from `instance` before drawing.
    pub fn draw_instance(
        &self,
        instance: &Instance,
        shader: &mut dyn ShaderProgram,
        ctx: &mut RenderContext,
    ) -> Result<()> {
        shader.set_mat4("model", instance.to_matrix());
        self.draw(shader, ctx)
    }

    /// Frees the mesh buffers. Textures belong to the cache and are released there.
    pub fn release(self, backend: &mut dyn GpuBackend) {
        for mesh in self.meshes {
            mesh.release(backend);
        }
    }
}
