//! GPU resource ownership.
//!
//! Everything above this module refers to GPU objects through opaque handles
//! ([`TextureId`], [`BufferId`]). A [`GpuBackend`] turns CPU-side data into
//! those handles and frees them again. [`WgpuContext`] is the wgpu
//! implementation: it owns device and queue and keeps a table from handle to
//! the actual wgpu objects so recorded draw calls can be replayed into a
//! render pass.

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{model::ModelVertex, texture::TextureImage},
    render::DrawCall,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

/// Vertex and index buffer of one mesh. The vertex layout is fixed by [`ModelVertex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshBuffers {
    pub vertex: BufferId,
    pub index: BufferId,
}

/// Allocates and frees GPU resources. Uploads are synchronous.
pub trait GpuBackend {
    fn upload_texture(&mut self, label: &str, image: &TextureImage) -> TextureId;

    fn upload_mesh(&mut self, label: &str, vertices: &[ModelVertex], indices: &[u32]) -> MeshBuffers;

    fn release_texture(&mut self, id: TextureId);

    fn release_mesh(&mut self, buffers: MeshBuffers);
}

/// A texture with its view, sampler and the bind group that exposes it to shaders.
#[derive(Debug)]
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub bind_group: wgpu::BindGroup,
}

#[derive(Debug)]
pub struct WgpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    /// Layout of every per-texture bind group: texture at binding 0, sampler at binding 1.
    pub texture_layout: wgpu::BindGroupLayout,
    textures: HashMap<TextureId, GpuTexture>,
    buffers: HashMap<BufferId, wgpu::Buffer>,
    next_id: u32,
}

impl WgpuContext {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let texture_layout = texture_layout(&device);
        Self {
            device,
            queue,
            texture_layout,
            textures: HashMap::new(),
            buffers: HashMap::new(),
            next_id: 0,
        }
    }

    /// Context without a surface, for offscreen rendering and tests.
    pub async fn headless() -> anyhow::Result<Self> {
        log::info!("WGPU headless setup");
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("lantern device"),
                ..Default::default()
            })
            .await?;
        Ok(Self::new(device, queue))
    }

    pub fn texture(&self, id: TextureId) -> Option<&GpuTexture> {
        self.textures.get(&id)
    }

    pub fn buffer(&self, id: BufferId) -> Option<&wgpu::Buffer> {
        self.buffers.get(&id)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Issues recorded draw calls into `render_pass`.
    ///
    /// Texture unit `n` maps to bind group `first_texture_group + n`; the
    /// pipeline bound by the caller decides how many of them it reads.
    pub fn replay(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        draws: &[DrawCall],
        first_texture_group: u32,
    ) {
        for draw in draws {
            let (Some(vertex), Some(index)) = (
                self.buffers.get(&draw.buffers.vertex),
                self.buffers.get(&draw.buffers.index),
            ) else {
                log::warn!("Skipping draw call over released buffers {:?}", draw.buffers);
                continue;
            };
            for (unit, id) in &draw.textures {
                match self.textures.get(id) {
                    Some(texture) => {
                        render_pass.set_bind_group(first_texture_group + unit, &texture.bind_group, &[])
                    }
                    None => log::warn!("Texture {:?} on unit {} was released", id, unit),
                }
            }
            render_pass.set_vertex_buffer(0, vertex.slice(..));
            render_pass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..draw.index_count, 0, 0..1);
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl GpuBackend for WgpuContext {
    fn upload_texture(&mut self, label: &str, image: &TextureImage) -> TextureId {
        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: image.levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: image.format.wgpu_format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let bytes_per_pixel = image.format.upload_bytes_per_pixel();
        for (mip_level, level) in image.levels.iter().enumerate() {
            self.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                },
                &level.data,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_pixel * level.width),
                    rows_per_image: Some(level.height),
                },
                wgpu::Extent3d {
                    width: level.width,
                    height: level.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = create_default_sampler(&self.device);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some(label),
        });

        let id = TextureId(self.next_id());
        self.textures.insert(
            id,
            GpuTexture {
                texture,
                view,
                sampler,
                bind_group,
            },
        );
        id
    }

    fn upload_mesh(&mut self, label: &str, vertices: &[ModelVertex], indices: &[u32]) -> MeshBuffers {
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", label)),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let vertex = BufferId(self.next_id());
        let index = BufferId(self.next_id());
        self.buffers.insert(vertex, vertex_buffer);
        self.buffers.insert(index, index_buffer);
        MeshBuffers { vertex, index }
    }

    fn release_texture(&mut self, id: TextureId) {
        if let Some(gpu) = self.textures.remove(&id) {
            gpu.texture.destroy();
        }
    }

    fn release_mesh(&mut self, buffers: MeshBuffers) {
        for id in [buffers.vertex, buffers.index] {
            if let Some(buffer) = self.buffers.remove(&id) {
                buffer.destroy();
            }
        }
    }
}

pub fn texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("texture_bind_group_layout"),
    })
}

/// Repeat wrapping, linear magnification, trilinear minification.
pub fn create_default_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        ..Default::default()
    })
}
