//! Placeholder interface for mixed reality headsets.
//!
//! No pose is read from the device yet: the head sits at a fixed height above
//! the reference frame origin and both eyes share one fixed-FOV projection.

use std::sync::{Arc, Mutex, MutexGuard};

use glam::{Affine3A, Mat4, Vec2, Vec3};
use parallax_common::XrConfig;
use parallax_render::{Rect, RenderTargetId, ScreenBlitter};
use tracing::{info, trace};

use crate::{Capabilities, Eye, VrError, VrResult, XrInterface, XrServer};

struct InterfaceState {
    initialized: bool,
}

pub struct MixedRealityInterface {
    config: XrConfig,
    server: Arc<dyn XrServer>,
    blitter: Arc<dyn ScreenBlitter>,
    state: Mutex<InterfaceState>,
}

impl MixedRealityInterface {
    pub fn new(
        config: XrConfig,
        server: Arc<dyn XrServer>,
        blitter: Arc<dyn ScreenBlitter>,
    ) -> VrResult<Self> {
        config.validate_headset()?;
        Ok(Self {
            config,
            server,
            blitter,
            state: Mutex::new(InterfaceState { initialized: false }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, InterfaceState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn eye_offset(&self, eye: Eye, world_scale: f32) -> Affine3A {
        let half_ipd = self.config.ipd_m * 0.5 * world_scale;
        Affine3A::from_translation(Vec3::new(eye.lateral_sign() * half_ipd, 0.0, 0.0))
    }

    fn head_pose(&self, world_scale: f32) -> Affine3A {
        Affine3A::from_translation(Vec3::new(0.0, self.config.head_height_m * world_scale, 0.0))
    }
}

impl XrInterface for MixedRealityInterface {
    fn name(&self) -> &str {
        &self.config.interface_name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::STEREO
    }

    fn is_stereo(&self) -> bool {
        true
    }

    fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    /// The headset is part of the platform and always on, so this only marks
    /// the interface ready.
    fn initialize(&self) -> VrResult<()> {
        let mut state = self.lock();
        if !state.initialized {
            state.initialized = true;
            info!(interface = %self.config.interface_name, "XR interface initialized");
        }
        Ok(())
    }

    fn uninitialize(&self) {
        let mut state = self.lock();
        if state.initialized {
            self.server
                .clear_primary_interface_if(&self.config.interface_name);
            state.initialized = false;
            info!(interface = %self.config.interface_name, "XR interface uninitialized");
        }
    }

    fn render_target_size(&self) -> Vec2 {
        let _state = self.lock();
        Vec2::new(
            self.config.render_target_width as f32,
            self.config.render_target_height as f32,
        )
    }

    fn transform_for_eye(&self, eye: Eye, camera_transform: Affine3A) -> Affine3A {
        let state = self.lock();
        if !state.initialized {
            return camera_transform;
        }

        let world_scale = self.server.world_scale();
        camera_transform
            * self.server.reference_frame()
            * self.head_pose(world_scale)
            * self.eye_offset(eye, world_scale)
    }

    fn projection_for_eye(&self, _eye: Eye, aspect: f32, z_near: f32, z_far: f32) -> Mat4 {
        let _state = self.lock();
        Mat4::perspective_rh_gl(self.config.fov_degrees.to_radians(), aspect, z_near, z_far)
    }

    fn commit_for_eye(
        &self,
        eye: Eye,
        render_target: RenderTargetId,
        screen_rect: Rect,
    ) -> VrResult<()> {
        let _state = self.lock();
        if !render_target.is_valid() {
            return Err(VrError::InvalidRenderTarget(render_target));
        }
        if screen_rect.is_empty() {
            return Err(VrError::EmptyScreenRect);
        }

        // Output goes to the main window until the device swap chain is wired up.
        if eye == Eye::Mono {
            self.blitter.set_current_render_target(None);
            self.blitter
                .blit_render_target_to_screen(render_target, screen_rect, 0)?;
        }
        Ok(())
    }

    fn process(&self) {
        let state = self.lock();
        if state.initialized {
            trace!(interface = %self.config.interface_name, "process");
        }
    }
}

impl Drop for MixedRealityInterface {
    fn drop(&mut self) {
        self.uninitialize();
    }
}
