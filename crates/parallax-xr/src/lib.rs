#![forbid(unsafe_code)]

pub mod interface;
pub mod mixed_reality;
pub mod server;
pub mod types;

pub use interface::XrInterface;
pub use mixed_reality::MixedRealityInterface;
pub use server::{LocalXrServer, XrServer};
pub use types::{Capabilities, Eye};

use parallax_render::{RenderError, RenderTargetId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VrError {
    #[error("interface unavailable: {0}")]
    Unavailable(String),
    #[error("invalid render target {0:?}")]
    InvalidRenderTarget(RenderTargetId),
    #[error("screen rect is empty; the device must render to the main viewport")]
    EmptyScreenRect,
    #[error("configuration error: {0}")]
    Config(#[from] parallax_common::Error),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

pub type VrResult<T> = Result<T, VrError>;
