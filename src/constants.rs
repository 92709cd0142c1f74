//! Bit-exact tuning constants (spec §6).
//!
//! These are the single source of truth; [`crate::config::EngineConfig`]
//! wraps them in an overridable, documented struct the way
//! `myth::renderer::settings::RenderSettings` wraps its own magic numbers.

/// Floor for near-plane distance under `PreventClipping` /
/// `SplitToPreventClipping` clipping policies.
pub const MINIMUM_NEAR_PLANE_DISTANCE: f32 = 1e-5;

/// Upper bound a projection may request for its far plane.
pub const MAXIMUM_FAR_PLANE_DISTANCE: f64 = 1e12;

/// Floor on near/far ratio for `PreserveDepthPrecision` items (near is
/// pulled out to at least this fraction of the bounding diameter).
pub const MINIMUM_NEAR_FAR_RATIO: f32 = 0.001;

/// Minimum near/far ratio a coalesced span must retain; merges that would
/// violate this are rejected.
pub const PREFERRED_NEAR_FAR_RATIO: f64 = 0.002;

/// Maximum near/far ratio a synthesized splittable-item span may span.
pub const MAX_FAR_NEAR_RATIO: f64 = 10_000.0;

/// Geometry projected-size cull threshold, in pixels.
pub const SIZE_CULL_THRESHOLD_PX: f32 = 0.5;

/// Light influence-sphere cull threshold, in pixels.
pub const LIGHT_CULL_THRESHOLD_PX: f32 = 1.0;

/// Safety epsilon applied to a span's far plane to compensate for 32-bit
/// float round-off (spec §4.4 step 2).
pub const FAR_PLANE_SAFETY_EPSILON: f64 = 1e-6;
