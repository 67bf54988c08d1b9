use std::sync::{Mutex, MutexGuard};

use glam::Affine3A;
use parallax_common::XrConfig;
use tracing::info;

use crate::VrResult;

/// Engine-wide XR state shared by all interfaces.
pub trait XrServer: Send + Sync {
    /// Meters per world unit.
    fn world_scale(&self) -> f32;

    /// Transform from tracking space to world space (recentering).
    fn reference_frame(&self) -> Affine3A;

    /// Drop `name` as the primary interface if it currently is.
    fn clear_primary_interface_if(&self, name: &str);
}

struct LocalState {
    world_scale: f32,
    reference_frame: Affine3A,
    primary: Option<String>,
}

/// In-process [`XrServer`].
pub struct LocalXrServer {
    state: Mutex<LocalState>,
}

impl Default for LocalXrServer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl LocalXrServer {
    pub fn new(world_scale: f32) -> Self {
        Self {
            state: Mutex::new(LocalState {
                world_scale,
                reference_frame: Affine3A::IDENTITY,
                primary: None,
            }),
        }
    }

    /// Server seeded with the configured world scale, which must be
    /// positive and finite.
    pub fn from_config(config: &XrConfig) -> VrResult<Self> {
        config.validate_world_scale()?;
        Ok(Self::new(config.world_scale))
    }

    fn lock(&self) -> MutexGuard<'_, LocalState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn set_world_scale(&self, world_scale: f32) {
        self.lock().world_scale = world_scale;
    }

    pub fn set_reference_frame(&self, reference_frame: Affine3A) {
        self.lock().reference_frame = reference_frame;
    }

    pub fn set_primary_interface(&self, name: impl Into<String>) {
        let name = name.into();
        info!(interface = %name, "primary XR interface set");
        self.lock().primary = Some(name);
    }

    pub fn primary_interface(&self) -> Option<String> {
        self.lock().primary.clone()
    }
}

impl XrServer for LocalXrServer {
    fn world_scale(&self) -> f32 {
        self.lock().world_scale
    }

    fn reference_frame(&self) -> Affine3A {
        self.lock().reference_frame
    }

    fn clear_primary_interface_if(&self, name: &str) {
        let mut state = self.lock();
        if state.primary.as_deref() == Some(name) {
            info!(interface = %name, "primary XR interface cleared");
            state.primary = None;
        }
    }
}
