//! Error Types
//!
//! This module defines the error type used for resource-creation failures
//! (§7.2 of the design: shadow-map and cube-map allocation). Lifecycle
//! misuse is *not* represented here — see [`crate::status::RenderStatus`],
//! which is returned by value rather than propagated as an error.
//!
//! # Usage
//!
//! ```rust,ignore
//! use farview::errors::{EngineError, Result};
//!
//! fn allocate_shadow_maps() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Resource-creation failure. These are always caught at the call site and
/// converted into the "feature silently disabled" behavior described in
/// spec §7.2 — they never propagate out of `render_view`/`render_cube_map`.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The collaborator's `Framebuffer` factory returned a framebuffer whose
    /// `is_valid()` is false, or allocation otherwise failed.
    #[error("failed to allocate directional shadow map at size {size}: {reason}")]
    ShadowMapAllocationFailed {
        /// Requested square size in texels.
        size: u32,
        /// Collaborator-supplied reason, if any.
        reason: String,
    },

    /// The collaborator's `CubeMapFramebuffer` factory failed.
    #[error("failed to allocate omni shadow cube map at size {size}: {reason}")]
    CubeMapAllocationFailed {
        /// Requested square face size in texels.
        size: u32,
        /// Collaborator-supplied reason, if any.
        reason: String,
    },
}

/// Alias for `Result<T, EngineError>`.
pub type Result<T> = std::result::Result<T, EngineError>;
