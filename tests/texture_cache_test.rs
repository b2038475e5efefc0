use std::rc::Rc;

use lantern_ngin::{
    data_structures::texture::{PixelFormat, TextureKind},
    error::RenderError,
    resources::texture::TextureCache,
};

use crate::common::test_utils::{RecordingBackend, ScriptedDecoder, init_logger};

mod common;

#[test]
fn acquiring_twice_decodes_once() -> anyhow::Result<()> {
    init_logger();
    let decoder = ScriptedDecoder::new().with_image("assets/container.png", 4, 4, 3);
    let decodes = decoder.decoded.clone();
    let mut cache = TextureCache::with_decoder(decoder);
    let mut backend = RecordingBackend::new();

    let first = cache.acquire("assets/container.png", TextureKind::Diffuse, &mut backend)?;
    let second = cache.acquire("assets/./container.png", TextureKind::Diffuse, &mut backend)?;

    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(decodes.borrow().len(), 1);
    assert_eq!(backend.textures.len(), 1);
    assert_eq!(cache.len(), 1);
    assert_eq!(first.format(), PixelFormat::Rgb8);
    assert_eq!(first.dimensions(), (4, 4));
    Ok(())
}

#[test]
fn same_file_as_another_kind_is_a_separate_entry() -> anyhow::Result<()> {
    let decoder = ScriptedDecoder::new().with_image("assets/container.png", 2, 2, 4);
    let decodes = decoder.decoded.clone();
    let mut cache = TextureCache::with_decoder(decoder);
    let mut backend = RecordingBackend::new();

    let diffuse = cache.acquire("assets/container.png", TextureKind::Diffuse, &mut backend)?;
    let specular = cache.acquire("assets/container.png", TextureKind::Specular, &mut backend)?;

    assert_ne!(diffuse.id(), specular.id());
    assert_eq!(diffuse.kind(), &TextureKind::Diffuse);
    assert_eq!(specular.kind(), &TextureKind::Specular);
    assert_eq!(decodes.borrow().len(), 2);
    Ok(())
}

#[test]
fn unsupported_channel_count_leaves_cache_untouched() {
    init_logger();
    let decoder = ScriptedDecoder::new().with_image("assets/grey_alpha.png", 2, 2, 2);
    let mut cache = TextureCache::with_decoder(decoder);
    let mut backend = RecordingBackend::new();

    let err = cache
        .acquire("assets/grey_alpha.png", TextureKind::Diffuse, &mut backend)
        .unwrap_err();

    assert!(matches!(err, RenderError::AssetLoad { .. }));
    assert!(cache.is_empty());
    assert!(cache.get("assets/grey_alpha.png", &TextureKind::Diffuse).is_none());
    assert!(backend.textures.is_empty());
}

#[test]
fn missing_file_is_reported_and_not_cached() {
    let mut cache = TextureCache::with_decoder(ScriptedDecoder::new());
    let mut backend = RecordingBackend::new();

    let err = cache
        .acquire("assets/nothing.png", TextureKind::Specular, &mut backend)
        .unwrap_err();

    assert!(matches!(err, RenderError::Io { .. }));
    assert!(cache.is_empty());
}

#[test]
fn release_all_frees_every_texture() -> anyhow::Result<()> {
    let decoder = ScriptedDecoder::new()
        .with_image("a.png", 1, 1, 1)
        .with_image("b.png", 1, 1, 4);
    let mut cache = TextureCache::with_decoder(decoder);
    let mut backend = RecordingBackend::new();
    let a = cache.acquire("a.png", TextureKind::Diffuse, &mut backend)?;
    let b = cache.acquire("b.png", TextureKind::Specular, &mut backend)?;

    cache.release_all(&mut backend);

    assert!(cache.is_empty());
    assert!(backend.textures.is_empty());
    let mut released = backend.released_textures.clone();
    released.sort();
    let mut expected = vec![a.id(), b.id()];
    expected.sort();
    assert_eq!(released, expected);
    Ok(())
}

#[test]
fn png_files_decode_through_the_image_crate() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("checker.png");
    image::RgbaImage::from_fn(8, 8, |x, y| {
        if (x + y) % 2 == 0 {
            image::Rgba([255, 255, 255, 255])
        } else {
            image::Rgba([0, 0, 0, 255])
        }
    })
    .save(&path)?;

    let mut cache = TextureCache::new();
    let mut backend = RecordingBackend::new();
    let texture = cache.acquire(&path, TextureKind::Diffuse, &mut backend)?;

    assert_eq!(texture.dimensions(), (8, 8));
    assert_eq!(texture.format(), PixelFormat::Rgba8);
    Ok(())
}

#[test]
fn corrupt_file_is_an_asset_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"not a png at all")?;

    let mut cache = TextureCache::new();
    let err = cache
        .acquire(&path, TextureKind::Diffuse, &mut RecordingBackend::new())
        .unwrap_err();

    assert!(matches!(err, RenderError::AssetLoad { .. }));
    Ok(())
}
