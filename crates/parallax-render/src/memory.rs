//! In-memory rendering service.
//!
//! Keeps texture storage in host memory and records every blit so callers can
//! run without a GPU and tests can inspect what was uploaded.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;
use tracing::trace;

use crate::{
    Image, ImageFormat, Rect, RenderError, RenderResult, RenderTargetId, ScreenBlitter,
    TextureFlags, TextureId, TextureStorage,
};

/// Snapshot of a texture's storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub flags: TextureFlags,
    /// Number of times storage was (re)allocated.
    pub allocations: u64,
    pub uploads: u64,
    pub data: Option<Bytes>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlitRecord {
    pub target: RenderTargetId,
    pub rect: Rect,
    pub screen: u32,
}

#[derive(Default)]
struct TextureRecord {
    storage: Option<TextureInfo>,
    allocations: u64,
}

#[derive(Default)]
struct MemoryState {
    next_id: u64,
    textures: HashMap<TextureId, TextureRecord>,
    current_target: Option<RenderTargetId>,
    blits: Vec<BlitRecord>,
}

#[derive(Default)]
pub struct MemoryRenderer {
    state: Mutex<MemoryState>,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Storage details for `texture`, `None` if unknown or never allocated.
    pub fn texture_info(&self, texture: TextureId) -> Option<TextureInfo> {
        self.lock()
            .textures
            .get(&texture)
            .and_then(|record| record.storage.clone())
    }

    /// How many times `texture` has been allocated, 0 for unknown handles.
    pub fn allocation_count(&self, texture: TextureId) -> u64 {
        self.lock()
            .textures
            .get(&texture)
            .map(|record| record.allocations)
            .unwrap_or(0)
    }

    /// Number of live texture handles.
    pub fn texture_count(&self) -> usize {
        self.lock().textures.len()
    }

    pub fn contains(&self, texture: TextureId) -> bool {
        self.lock().textures.contains_key(&texture)
    }

    pub fn current_render_target(&self) -> Option<RenderTargetId> {
        self.lock().current_target
    }

    pub fn blits(&self) -> Vec<BlitRecord> {
        self.lock().blits.clone()
    }
}

impl TextureStorage for MemoryRenderer {
    fn texture_create(&self) -> RenderResult<TextureId> {
        let mut state = self.lock();
        state.next_id += 1;
        let id = TextureId(state.next_id);
        state.textures.insert(id, TextureRecord::default());
        trace!(texture = id.0, "texture created");
        Ok(id)
    }

    fn texture_allocate(
        &self,
        texture: TextureId,
        width: u32,
        height: u32,
        format: ImageFormat,
        flags: TextureFlags,
    ) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSize(width, height));
        }
        let mut state = self.lock();
        let record = state
            .textures
            .get_mut(&texture)
            .ok_or(RenderError::UnknownTexture(texture))?;
        record.allocations += 1;
        record.storage = Some(TextureInfo {
            width,
            height,
            format,
            flags,
            allocations: record.allocations,
            uploads: 0,
            data: None,
        });
        trace!(texture = texture.0, width, height, ?format, "texture allocated");
        Ok(())
    }

    fn texture_set_data(&self, texture: TextureId, image: &Image) -> RenderResult<()> {
        let mut state = self.lock();
        let record = state
            .textures
            .get_mut(&texture)
            .ok_or(RenderError::UnknownTexture(texture))?;
        let storage = record
            .storage
            .as_mut()
            .ok_or(RenderError::NotAllocated(texture))?;

        if storage.width != image.width()
            || storage.height != image.height()
            || storage.format != image.format()
        {
            return Err(RenderError::ImageMismatch {
                width: storage.width,
                height: storage.height,
                format: storage.format,
                got_width: image.width(),
                got_height: image.height(),
                got_format: image.format(),
            });
        }

        storage.uploads += 1;
        storage.data = Some(image.data().clone());
        Ok(())
    }

    fn free(&self, texture: TextureId) -> RenderResult<()> {
        let mut state = self.lock();
        state
            .textures
            .remove(&texture)
            .map(|_| ())
            .ok_or(RenderError::UnknownTexture(texture))
    }
}

impl ScreenBlitter for MemoryRenderer {
    fn set_current_render_target(&self, target: Option<RenderTargetId>) {
        self.lock().current_target = target;
    }

    fn blit_render_target_to_screen(
        &self,
        target: RenderTargetId,
        rect: Rect,
        screen: u32,
    ) -> RenderResult<()> {
        if !target.is_valid() {
            return Err(RenderError::InvalidRenderTarget(target));
        }
        self.lock().blits.push(BlitRecord {
            target,
            rect,
            screen,
        });
        Ok(())
    }
}
