//! Error taxonomy shared by every loader and draw call.
//!
//! None of these are retried internally. A failure aborts the load or draw
//! that triggered it and is handed back to the caller unchanged.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// A file could not be opened or read.
    #[error("couldn't read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image decoding failed or produced an unsupported channel count.
    #[error("couldn't load image file {path}: {reason}")]
    AssetLoad { path: PathBuf, reason: String },

    /// The scene importer failed, reported an incomplete scene, or the scene has no root.
    #[error("import error: {0}")]
    Import(String),

    /// A mesh texture carries a semantic kind the shader naming scheme doesn't know.
    #[error("unknown texture type: {0}")]
    UnknownTextureKind(String),

    /// Index data that isn't a triangle list over the mesh's own vertices.
    #[error("invalid geometry in mesh {mesh}: {reason}")]
    Geometry { mesh: String, reason: String },

    /// A mesh samples more textures than there are texture units to bind them to.
    #[error("mesh {mesh} has {count} textures, only {max} texture units are available")]
    TooManyTextures { mesh: String, count: usize, max: u32 },
}

impl RenderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RenderError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn asset(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        RenderError::AssetLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
