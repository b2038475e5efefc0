//! Explicit binding state for draw calls.
//!
//! Instead of relying on process-wide GPU state, every draw goes through a
//! [`RenderContext`]. It tracks which texture unit is active and which
//! texture is bound to each unit, and records a [`DrawCall`] snapshot for
//! every indexed draw. The recorded calls are later replayed by a backend
//! (see [`WgpuContext::replay`](crate::context::WgpuContext::replay)).
//!
//! The context is single-threaded by construction: it is borrowed mutably
//! for the whole bind-then-draw sequence, so nothing else can interleave.

use crate::context::{MeshBuffers, TextureId};

/// Upper bound on simultaneously bound texture units.
pub const MAX_TEXTURE_UNITS: u32 = 16;

/// One indexed triangle-list draw with the texture bindings that were live when it was issued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub buffers: MeshBuffers,
    pub index_count: u32,
    /// `(unit, texture)` pairs in ascending unit order.
    pub textures: Vec<(u32, TextureId)>,
}

#[derive(Debug)]
pub struct RenderContext {
    active_unit: u32,
    units: Vec<Option<TextureId>>,
    draws: Vec<DrawCall>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self {
            active_unit: 0,
            units: vec![None; MAX_TEXTURE_UNITS as usize],
            draws: Vec::new(),
        }
    }

    pub fn active_unit(&self) -> u32 {
        self.active_unit
    }

    /// Selects the unit subsequent [`bind_texture`](Self::bind_texture) calls target.
    pub fn active_texture(&mut self, unit: u32) {
        assert!(
            unit < MAX_TEXTURE_UNITS,
            "texture unit {unit} out of range (max {MAX_TEXTURE_UNITS})"
        );
        self.active_unit = unit;
    }

    pub fn bind_texture(&mut self, texture: TextureId) {
        self.units[self.active_unit as usize] = Some(texture);
    }

    pub fn bound_texture(&self, unit: u32) -> Option<TextureId> {
        self.units.get(unit as usize).copied().flatten()
    }

    pub fn draw_indexed(&mut self, buffers: MeshBuffers, index_count: u32) {
        let textures = self
            .units
            .iter()
            .enumerate()
            .filter_map(|(unit, bound)| bound.map(|id| (unit as u32, id)))
            .collect();
        self.draws.push(DrawCall {
            buffers,
            index_count,
            textures,
        });
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Hands the recorded draws to the caller and starts a new frame with all units unbound.
    pub fn finish_frame(&mut self) -> Vec<DrawCall> {
        self.active_unit = 0;
        self.units.iter_mut().for_each(|unit| *unit = None);
        std::mem::take(&mut self.draws)
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}
