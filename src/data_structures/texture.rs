//! Textures: semantic kinds, pixel formats and the GPU-resident handle.
//!
//! A [`Texture`] is what meshes hold on to. It names the GPU resource by an
//! opaque [`TextureId`], remembers the file it came from and the material
//! role it plays. The pixel data itself lives on the GPU; on the CPU side it
//! only exists transiently as a [`TextureImage`] with a full mip chain ready
//! for upload.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use image::{ImageBuffer, Luma, Pixel, Rgba, imageops::FilterType};

use crate::{
    context::TextureId,
    error::{RenderError, Result},
};

/// The material role of a texture, which decides the sampler uniform it is bound to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureKind {
    Diffuse,
    Specular,
    /// Anything the shader naming scheme has no slot for. Kept so it can be reported at draw time.
    Other(String),
}

impl TextureKind {
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "texture_diffuse" => TextureKind::Diffuse,
            "texture_specular" => TextureKind::Specular,
            other => TextureKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TextureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureKind::Diffuse => write!(f, "texture_diffuse"),
            TextureKind::Specular => write!(f, "texture_specular"),
            TextureKind::Other(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    R8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(PixelFormat::R8),
            3 => Some(PixelFormat::Rgb8),
            4 => Some(PixelFormat::Rgba8),
            _ => None,
        }
    }

    pub fn channels(&self) -> u8 {
        match self {
            PixelFormat::R8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }

    /// Bytes per texel as uploaded. wgpu has no 3-channel 8-bit format, so RGB goes up as RGBA.
    pub fn upload_bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::R8 => 1,
            PixelFormat::Rgb8 | PixelFormat::Rgba8 => 4,
        }
    }

    /// Always a linear format. Texel values reach the shader exactly as decoded.
    pub fn wgpu_format(&self) -> wgpu::TextureFormat {
        match self {
            PixelFormat::R8 => wgpu::TextureFormat::R8Unorm,
            PixelFormat::Rgb8 | PixelFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// Raw output of an image decoder: 8 bits per channel, rows tightly packed.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Upload-ready pixel data: the base image plus every mip level down to 1x1.
#[derive(Clone, Debug)]
pub struct TextureImage {
    pub format: PixelFormat,
    pub levels: Vec<MipLevel>,
}

impl TextureImage {
    /// Infers the pixel format from the channel count and builds the mip chain.
    pub fn from_decoded(path: &Path, image: &DecodedImage) -> Result<Self> {
        let format = PixelFormat::from_channels(image.channels).ok_or_else(|| {
            RenderError::asset(
                path,
                format!("unable to infer texture format from {} channels", image.channels),
            )
        })?;
        if image.width == 0 || image.height == 0 {
            return Err(RenderError::asset(path, "image has no pixels"));
        }
        let expected = image.width as usize * image.height as usize * image.channels as usize;
        if image.pixels.len() != expected {
            return Err(RenderError::asset(
                path,
                format!("expected {expected} bytes of pixel data, got {}", image.pixels.len()),
            ));
        }

        let base = match format {
            PixelFormat::Rgb8 => image
                .pixels
                .chunks_exact(3)
                .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], u8::MAX])
                .collect(),
            PixelFormat::R8 | PixelFormat::Rgba8 => image.pixels.clone(),
        };

        let mut levels = vec![MipLevel {
            width: image.width,
            height: image.height,
            data: base,
        }];
        for _ in 1..mip_level_count(image.width, image.height) {
            let Some(previous) = levels.last() else {
                break;
            };
            let next = match format {
                PixelFormat::R8 => halve::<Luma<u8>>(previous),
                PixelFormat::Rgb8 | PixelFormat::Rgba8 => halve::<Rgba<u8>>(previous),
            }
            .ok_or_else(|| RenderError::asset(path, "couldn't build mip chain"))?;
            levels.push(next);
        }

        Ok(Self { format, levels })
    }

    pub fn width(&self) -> u32 {
        self.levels[0].width
    }

    pub fn height(&self) -> u32 {
        self.levels[0].height
    }
}

/// Number of levels from `width`x`height` down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

fn halve<P: Pixel<Subpixel = u8> + 'static>(level: &MipLevel) -> Option<MipLevel> {
    let width = (level.width / 2).max(1);
    let height = (level.height / 2).max(1);
    let img = ImageBuffer::<P, Vec<u8>>::from_raw(level.width, level.height, level.data.clone())?;
    let data = image::imageops::resize(&img, width, height, FilterType::Triangle).into_raw();
    Some(MipLevel {
        width,
        height,
        data,
    })
}

/// A texture that has been uploaded to the GPU.
///
/// Meshes share these through `Rc`; the [`TextureCache`](crate::resources::texture::TextureCache)
/// hands out at most one per (path, kind).
#[derive(Debug, PartialEq)]
pub struct Texture {
    id: TextureId,
    kind: TextureKind,
    path: PathBuf,
    format: PixelFormat,
    width: u32,
    height: u32,
}

impl Texture {
    pub fn new(
        id: TextureId,
        kind: TextureKind,
        path: impl Into<PathBuf>,
        format: PixelFormat,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id,
            kind,
            path: path.into(),
            format,
            width,
            height,
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn kind(&self) -> &TextureKind {
        &self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(width: u32, height: u32, channels: u8) -> DecodedImage {
        DecodedImage {
            width,
            height,
            channels,
            pixels: vec![200; (width * height * channels as u32) as usize],
        }
    }

    #[test]
    fn format_follows_channel_count() {
        assert_eq!(PixelFormat::from_channels(1), Some(PixelFormat::R8));
        assert_eq!(PixelFormat::from_channels(3), Some(PixelFormat::Rgb8));
        assert_eq!(PixelFormat::from_channels(4), Some(PixelFormat::Rgba8));
        assert_eq!(PixelFormat::from_channels(2), None);
        assert_eq!(PixelFormat::from_channels(0), None);
    }

    #[test]
    fn mip_count_reaches_one_by_one() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(256, 64), 9);
        assert_eq!(mip_level_count(300, 17), 9);
    }

    #[test]
    fn rgb_is_expanded_and_mipped() -> anyhow::Result<()> {
        let image = TextureImage::from_decoded(Path::new("crate.png"), &decoded(8, 4, 3))?;
        assert_eq!(image.format, PixelFormat::Rgb8);
        assert_eq!(image.levels.len(), 4);
        assert_eq!(image.levels[0].data.len(), 8 * 4 * 4);
        assert_eq!(&image.levels[0].data[..4], &[200, 200, 200, 255]);
        let last = image.levels.last().unwrap();
        assert_eq!((last.width, last.height), (1, 1));
        assert_eq!(last.data.len(), 4);
        Ok(())
    }

    #[test]
    fn single_channel_stays_single_channel() -> anyhow::Result<()> {
        let image = TextureImage::from_decoded(Path::new("mask.png"), &decoded(4, 4, 1))?;
        assert_eq!(image.format.wgpu_format(), wgpu::TextureFormat::R8Unorm);
        assert_eq!(image.levels[1].data.len(), 4);
        Ok(())
    }

    #[test]
    fn every_channel_count_uploads_linear() -> anyhow::Result<()> {
        let formats = [1, 3, 4]
            .into_iter()
            .map(|channels| {
                let image = TextureImage::from_decoded(Path::new("linear.png"), &decoded(2, 2, channels))?;
                Ok(image.format.wgpu_format())
            })
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(
            formats,
            vec![
                wgpu::TextureFormat::R8Unorm,
                wgpu::TextureFormat::Rgba8Unorm,
                wgpu::TextureFormat::Rgba8Unorm,
            ]
        );
        assert!(formats.iter().all(|format| !format.is_srgb()));
        Ok(())
    }

    #[test]
    fn two_channels_are_rejected() {
        let err = TextureImage::from_decoded(Path::new("la.png"), &decoded(2, 2, 2)).unwrap_err();
        assert!(matches!(err, RenderError::AssetLoad { .. }));
    }

    #[test]
    fn truncated_pixels_are_rejected() {
        let mut image = decoded(4, 4, 4);
        image.pixels.truncate(10);
        let err = TextureImage::from_decoded(Path::new("short.png"), &image).unwrap_err();
        assert!(matches!(err, RenderError::AssetLoad { .. }));
    }

    #[test]
    fn type_names_round_trip_through_display() {
        for name in ["texture_diffuse", "texture_specular", "texture_normal"] {
            assert_eq!(TextureKind::from_type_name(name).to_string(), name);
        }
        assert_eq!(TextureKind::from_type_name("texture_specular"), TextureKind::Specular);
        assert!(matches!(
            TextureKind::from_type_name("texture_height"),
            TextureKind::Other(name) if name == "texture_height"
        ));
    }
}
