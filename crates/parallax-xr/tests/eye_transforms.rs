use std::sync::Arc;

use glam::{Affine3A, Quat, Vec3};
use parallax_common::XrConfig;
use parallax_render::{MemoryRenderer, Rect, RenderTargetId, ScreenBlitter};
use parallax_xr::{Eye, LocalXrServer, MixedRealityInterface, VrError, XrInterface, XrServer};

const EPS: f32 = 1e-5;

fn initialized() -> (Arc<LocalXrServer>, Arc<MemoryRenderer>, MixedRealityInterface) {
    let server = Arc::new(LocalXrServer::default());
    let renderer = Arc::new(MemoryRenderer::new());
    let iface = MixedRealityInterface::new(XrConfig::default(), server.clone(), renderer.clone())
        .unwrap();
    iface.initialize().unwrap();
    (server, renderer, iface)
}

fn origin(transform: Affine3A) -> Vec3 {
    Vec3::from(transform.translation)
}

#[test]
fn test_eye_offsets_are_symmetric() {
    let (_server, _renderer, iface) = initialized();
    let camera = Affine3A::IDENTITY;

    let left = origin(iface.transform_for_eye(Eye::Left, camera));
    let right = origin(iface.transform_for_eye(Eye::Right, camera));
    let mono = origin(iface.transform_for_eye(Eye::Mono, camera));

    assert!(left.abs_diff_eq(Vec3::new(-0.0325, 1.8, 0.0), EPS), "{left}");
    assert!(right.abs_diff_eq(Vec3::new(0.0325, 1.8, 0.0), EPS), "{right}");
    assert!(mono.abs_diff_eq(Vec3::new(0.0, 1.8, 0.0), EPS), "{mono}");
}

#[test]
fn test_world_scale_scales_offsets() {
    let (server, _renderer, iface) = initialized();
    server.set_world_scale(2.0);

    let left = origin(iface.transform_for_eye(Eye::Left, Affine3A::IDENTITY));
    assert!(left.abs_diff_eq(Vec3::new(-0.065, 3.6, 0.0), EPS), "{left}");
}

#[test]
fn test_composition_order() {
    let (server, _renderer, iface) = initialized();
    server.set_reference_frame(Affine3A::from_rotation_y(std::f32::consts::FRAC_PI_2));
    let camera = Affine3A::from_translation(Vec3::new(0.0, 0.0, 5.0));

    // Reference rotation turns the +x eye axis into -z before the camera moves it.
    let left = origin(iface.transform_for_eye(Eye::Left, camera));
    assert!(left.abs_diff_eq(Vec3::new(0.0, 1.8, 5.0325), EPS), "{left}");

    let expected = camera
        * server.reference_frame()
        * Affine3A::from_translation(Vec3::new(0.0, 1.8, 0.0))
        * Affine3A::from_translation(Vec3::new(0.0325, 0.0, 0.0));
    let right = iface.transform_for_eye(Eye::Right, camera);
    assert!(right.abs_diff_eq(expected, EPS));
}

#[test]
fn test_camera_rotation_is_preserved() {
    let (_server, _renderer, iface) = initialized();
    let rotation = Quat::from_rotation_x(0.3);
    let camera = Affine3A::from_quat(rotation);
    let eye = iface.transform_for_eye(Eye::Mono, camera);
    let (_, eye_rotation, _) = eye.to_scale_rotation_translation();
    assert!(eye_rotation.abs_diff_eq(rotation, EPS));
}

#[test]
fn test_projection_is_fixed_fov_for_both_eyes() {
    let (_server, _renderer, iface) = initialized();
    let (aspect, near, far) = (16.0 / 9.0, 0.05, 100.0);

    let mono = iface.projection_for_eye(Eye::Mono, aspect, near, far);
    let left = iface.projection_for_eye(Eye::Left, aspect, near, far);
    let right = iface.projection_for_eye(Eye::Right, aspect, near, far);
    assert_eq!(mono, left);
    assert_eq!(left, right);

    let f = 1.0 / 30.0f32.to_radians().tan();
    assert!((mono.x_axis.x - f / aspect).abs() < EPS);
    assert!((mono.y_axis.y - f).abs() < EPS);
    assert!((mono.z_axis.z - (far + near) / (near - far)).abs() < EPS);
    assert!((mono.z_axis.w + 1.0).abs() < EPS);
    assert!((mono.w_axis.z - 2.0 * far * near / (near - far)).abs() < EPS);
}

#[test]
fn test_commit_rejects_invalid_target() {
    let (_server, renderer, iface) = initialized();
    let rect = Rect::new(0.0, 0.0, 1280.0, 720.0);
    assert!(matches!(
        iface.commit_for_eye(Eye::Mono, RenderTargetId::INVALID, rect),
        Err(VrError::InvalidRenderTarget(_))
    ));
    assert!(matches!(
        iface.commit_for_eye(Eye::Mono, RenderTargetId(4), Rect::default()),
        Err(VrError::EmptyScreenRect)
    ));
    assert!(renderer.blits().is_empty());
}

#[test]
fn test_commit_blits_mono_only() {
    let (_server, renderer, iface) = initialized();
    let rect = Rect::new(0.0, 0.0, 1280.0, 720.0);
    renderer.set_current_render_target(Some(RenderTargetId(9)));

    iface
        .commit_for_eye(Eye::Left, RenderTargetId(4), rect)
        .unwrap();
    iface
        .commit_for_eye(Eye::Right, RenderTargetId(4), rect)
        .unwrap();
    assert!(renderer.blits().is_empty());
    assert_eq!(renderer.current_render_target(), Some(RenderTargetId(9)));

    iface
        .commit_for_eye(Eye::Mono, RenderTargetId(4), rect)
        .unwrap();
    let blits = renderer.blits();
    assert_eq!(blits.len(), 1);
    assert_eq!(blits[0].target, RenderTargetId(4));
    assert_eq!(blits[0].rect, rect);
    assert_eq!(blits[0].screen, 0);
    assert_eq!(renderer.current_render_target(), None);
}
