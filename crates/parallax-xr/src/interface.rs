use glam::{Affine3A, Mat4, Vec2};
use parallax_render::{Rect, RenderTargetId};

use crate::{Capabilities, Eye, VrResult};

/// A head-mounted display as seen by the engine's frame loop.
///
/// Per frame the engine asks for each eye's view transform and projection,
/// renders, then commits the result with [`XrInterface::commit_for_eye`].
pub trait XrInterface: Send + Sync {
    fn name(&self) -> &str;
    fn capabilities(&self) -> Capabilities;
    fn is_stereo(&self) -> bool;

    fn is_initialized(&self) -> bool;
    fn initialize(&self) -> VrResult<()>;
    fn uninitialize(&self);

    /// Size of the offscreen target each eye is rendered into.
    fn render_target_size(&self) -> Vec2;

    /// World-space view transform for `eye`, given the engine camera's transform.
    fn transform_for_eye(&self, eye: Eye, camera_transform: Affine3A) -> Affine3A;

    fn projection_for_eye(&self, eye: Eye, aspect: f32, z_near: f32, z_far: f32) -> Mat4;

    /// Hand the rendered `render_target` for `eye` to the device.
    fn commit_for_eye(
        &self,
        eye: Eye,
        render_target: RenderTargetId,
        screen_rect: Rect,
    ) -> VrResult<()>;

    /// Per-frame housekeeping.
    fn process(&self);
}
