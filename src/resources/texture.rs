use std::{
    collections::HashMap,
    path::{Component, Path, PathBuf},
    rc::Rc,
};

use image::DynamicImage;

use crate::{
    context::GpuBackend,
    data_structures::texture::{DecodedImage, Texture, TextureImage, TextureKind},
    error::{RenderError, Result},
};

/// Turns an image file into raw 8-bit pixels.
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage>;
}

/// Decodes with the `image` crate, keeping the file's own channel count.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageFileDecoder;

impl ImageDecoder for ImageFileDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        let bytes = std::fs::read(path).map_err(|e| RenderError::io(path, e))?;
        let img = image::load_from_memory(&bytes).map_err(|e| RenderError::asset(path, e.to_string()))?;
        Ok(to_decoded(img))
    }
}

/**
 * 16-bit and float images are narrowed to 8 bits per channel. Grey+alpha
 * stays two channels so the texture layer can refuse it like any other
 * unsupported layout.
 */
fn to_decoded(img: DynamicImage) -> DecodedImage {
    let (width, height) = (img.width(), img.height());
    let (channels, pixels) = match img.color().channel_count() {
        1 => (1, img.to_luma8().into_raw()),
        2 => (2, img.to_luma_alpha8().into_raw()),
        3 => (3, img.to_rgb8().into_raw()),
        _ => (4, img.to_rgba8().into_raw()),
    };
    DecodedImage {
        width,
        height,
        channels,
        pixels,
    }
}

/// Hands out one uploaded [`Texture`] per (path, kind) and keeps it alive until [`release_all`](Self::release_all).
///
/// Paths are normalised lexically before lookup, so `assets/./crate.png` and
/// `assets/crate.png` share an entry. The same file requested as diffuse and
/// as specular is uploaded twice.
pub struct TextureCache {
    decoder: Box<dyn ImageDecoder>,
    entries: HashMap<(PathBuf, TextureKind), Rc<Texture>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::with_decoder(ImageFileDecoder)
    }

    pub fn with_decoder(decoder: impl ImageDecoder + 'static) -> Self {
        Self {
            decoder: Box::new(decoder),
            entries: HashMap::new(),
        }
    }

    /// Returns the cached texture or decodes, uploads and caches it.
    ///
    /// On failure the cache is left exactly as it was.
    pub fn acquire(
        &mut self,
        path: impl AsRef<Path>,
        kind: TextureKind,
        backend: &mut dyn GpuBackend,
    ) -> Result<Rc<Texture>> {
        let key = (normalize_path(path.as_ref()), kind);
        if let Some(texture) = self.entries.get(&key) {
            log::debug!("texture cache hit: {} ({})", key.0.display(), key.1);
            return Ok(Rc::clone(texture));
        }

        let (path, kind) = key;
        log::debug!("texture cache miss: {} ({kind})", path.display());
        let decoded = self.decoder.decode(&path)?;
        let image = TextureImage::from_decoded(&path, &decoded)?;
        let id = backend.upload_texture(&path.to_string_lossy(), &image);
        let texture = Rc::new(Texture::new(
            id,
            kind.clone(),
            path.clone(),
            image.format,
            image.width(),
            image.height(),
        ));
        self.entries.insert((path, kind), Rc::clone(&texture));
        Ok(texture)
    }

    pub fn get(&self, path: impl AsRef<Path>, kind: &TextureKind) -> Option<Rc<Texture>> {
        self.entries
            .get(&(normalize_path(path.as_ref()), kind.clone()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Frees every cached texture on the GPU and empties the cache.
    ///
    /// Meshes still holding an `Rc<Texture>` keep a handle the backend no longer knows.
    pub fn release_all(&mut self, backend: &mut dyn GpuBackend) {
        for ((path, _), texture) in self.entries.drain() {
            log::debug!("releasing texture {}", path.display());
            backend.release_texture(texture.id());
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Drops `.` components and folds `..` into its parent without touching the file system.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalisation_is_lexical() {
        assert_eq!(normalize_path(Path::new("assets/./crate.png")), Path::new("assets/crate.png"));
        assert_eq!(
            normalize_path(Path::new("assets/models/../crate.png")),
            Path::new("assets/crate.png")
        );
        assert_eq!(normalize_path(Path::new("../tex/a.png")), Path::new("../tex/a.png"));
        assert_eq!(normalize_path(Path::new("/../a.png")), Path::new("/a.png"));
        assert_eq!(normalize_path(Path::new("./")), Path::new("."));
    }

    #[test]
    fn channel_count_survives_decoding() {
        let grey = DynamicImage::new_luma8(3, 2);
        let decoded = to_decoded(grey);
        assert_eq!((decoded.width, decoded.height, decoded.channels), (3, 2, 1));
        assert_eq!(decoded.pixels.len(), 6);

        let rgb16 = DynamicImage::new_rgb16(2, 2);
        let decoded = to_decoded(rgb16);
        assert_eq!(decoded.channels, 3);
        assert_eq!(decoded.pixels.len(), 12);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ImageFileDecoder
            .decode(Path::new("definitely/not/here.png"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }
}
