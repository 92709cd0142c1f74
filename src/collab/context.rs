//! Render-context collaborator.
//!
//! `RenderContext` is the single hub object through which the orchestrator
//! drives the GPU: projection/modelview stacks, light/shadow slot bindings,
//! and the handful of GPU-state toggles that must be restored on every exit
//! path (spec §5). Framebuffer and cube-map-framebuffer creation are also
//! routed through it, since in practice a context always wraps "the
//! device" the same way `myth`'s own `RenderContext`/`WgpuContext` does.

use glam::{DAffine3, DMat4, Mat4, Vec3, Vec4};

use super::geometry_math::Frustum;
use super::light::LightHandle;

/// What a fragment shader should output (spec §4.6 step 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererOutput {
    /// Normal shaded color.
    FragmentColor,
    /// World-space distance from the fragment to the camera, written into
    /// the red channel (used by the omni shadow pass).
    CameraDistance,
}

/// Which draw-order sub-pass is currently active (spec §4.4 step 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPassKind {
    Opaque,
    Translucent,
}

/// Handedness of a projection matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chirality {
    RightHanded,
    LeftHanded,
}

/// Triangle winding order considered front-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    CounterClockwise,
    Clockwise,
}

/// Which faces are culled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// One of the six faces of a cube map, in a fixed order used throughout
/// this crate for face indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl CubeFace {
    /// All six faces, in index order (0..=5 matches this array's order).
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PosX,
        CubeFace::NegX,
        CubeFace::PosY,
        CubeFace::NegY,
        CubeFace::PosZ,
        CubeFace::NegZ,
    ];

    /// The world-space look direction for this face, composed with a 180°
    /// roll about the view axis so that adjacent faces share a consistent
    /// up vector for correct sampling (spec §4.6, final paragraph).
    #[must_use]
    pub fn look_rotation(self) -> glam::Quat {
        use std::f32::consts::PI;
        let (look, up) = match self {
            CubeFace::PosX => (Vec3::X, Vec3::NEG_Y),
            CubeFace::NegX => (Vec3::NEG_X, Vec3::NEG_Y),
            CubeFace::PosY => (Vec3::Y, Vec3::Z),
            CubeFace::NegY => (Vec3::NEG_Y, Vec3::NEG_Z),
            CubeFace::PosZ => (Vec3::Z, Vec3::NEG_Y),
            CubeFace::NegZ => (Vec3::NEG_Z, Vec3::NEG_Y),
        };
        let base = glam::Quat::from_mat3(&glam::Mat3::from_cols(
            look.cross(up).normalize(),
            up,
            -look,
        ));
        // 180-degree roll about the face's own view axis.
        base * glam::Quat::from_axis_angle(Vec3::Z, PI)
    }
}

/// Opaque identifier for a GPU texture (depth or color) handed back by a
/// framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// A depth-only render target (spec §6: "Framebuffer").
pub trait Framebuffer {
    /// `true` if the framebuffer was successfully allocated and is usable.
    fn is_valid(&self) -> bool;
    /// Handle to the depth attachment, to be bound as a shadow-map texture.
    fn depth_texture_handle(&self) -> TextureHandle;
}

/// A cube-map render target with six per-face framebuffers (spec §6:
/// "CubeMapFramebuffer").
pub trait CubeMapFramebuffer {
    /// `true` if every face was successfully allocated.
    fn is_valid(&self) -> bool;
    /// The framebuffer for a single face.
    fn face_framebuffer(&self, face: CubeFace) -> &dyn Framebuffer;
    /// Handle to the cube texture as a whole, for sampling in shaders.
    fn cube_texture_handle(&self) -> TextureHandle;
}

/// A (possibly sliced) planar projection (spec §6: "PlanarProjection").
///
/// `near`/`far` are `f64` because the orchestrator routinely works with
/// distances up to `MaximumFarPlaneDistance` (1e12), well past `f32`'s
/// useful precision at that magnitude.
pub trait PlanarProjection {
    fn chirality(&self) -> Chirality;
    fn near(&self) -> f64;
    fn far(&self) -> f64;
    /// Vertical field of view in radians; meaningless for an orthographic
    /// projection (returns 0.0).
    fn fov(&self) -> f32;
    fn aspect(&self) -> f32;
    fn frustum(&self) -> Frustum;
    /// The projection matrix. `f32`-precision, matching hardware depth
    /// buffers — callers are responsible for keeping `near`/`far` in a
    /// range where that's adequate (this is exactly what span slicing is
    /// for).
    fn matrix(&self) -> Mat4;
    /// Returns a copy of this projection restricted to `[near, far]`,
    /// same fov/aspect/chirality (spec §4.3, §4.4 step 2).
    fn slice(&self, near: f64, far: f64) -> Box<dyn PlanarProjection>;
}

/// The render-context collaborator (spec §6).
///
/// All GPU-state mutating methods here are part of the set that must be
/// restored on every exit path, including error paths (spec §5); see
/// [`crate::render::util::GraphicsStateGuard`].
pub trait RenderContext {
    // -- projection / modelview stacks --
    fn push_projection(&mut self);
    fn pop_projection(&mut self);
    fn push_modelview(&mut self);
    fn pop_modelview(&mut self);

    fn set_projection(&mut self, projection: &dyn PlanarProjection);
    fn set_modelview(&mut self, modelview: DAffine3);
    fn set_camera_orientation(&mut self, orientation: glam::Quat);
    fn set_model_translation(&mut self, translation: Vec3);
    fn set_pixel_size(&mut self, pixel_size: f32);
    fn set_viewport_size(&mut self, width: u32, height: u32);

    // -- lighting --
    fn set_active_light_count(&mut self, count: u32);
    fn set_light(&mut self, slot: u32, light: LightHandle, camera_relative_position: Vec3);
    fn set_ambient_light(&mut self, color: Vec3);

    // -- shadow slots --
    fn set_shadow_map_count(&mut self, count: u32);
    fn set_omni_shadow_map_count(&mut self, count: u32);
    fn set_shadow_map_matrix(&mut self, slot: u32, shadow_transform: DMat4);
    fn set_shadow_map_texture(&mut self, slot: u32, framebuffer: &dyn Framebuffer);
    fn set_omni_shadow_map_texture(&mut self, slot: u32, cube_map: &dyn CubeMapFramebuffer);

    fn set_environment_map(&mut self, cube_map: Option<&dyn CubeMapFramebuffer>);
    fn set_renderer_output(&mut self, output: RendererOutput);
    fn set_pass(&mut self, pass: RenderPassKind);
    fn unbind_shader(&mut self);

    // -- queries --
    fn current_frustum(&self) -> Frustum;
    fn current_modelview(&self) -> DAffine3;
    fn current_camera_orientation(&self) -> glam::Quat;
    fn shader_capability(&self, name: &str) -> bool;
    /// The viewport rectangle currently bound (`x, y, width, height`), as
    /// last set by `set_viewport`. Lets a caller that is about to mutate
    /// this state for a sub-pass (a shadow map, a cube-map face) snapshot
    /// the real pre-pass value to restore afterward, rather than assuming
    /// one (spec §5).
    fn current_viewport(&self) -> (u32, u32, u32, u32);
    /// The depth range currently bound (`near, far`), as last set by
    /// `set_depth_range`. Same rationale as `current_viewport`.
    fn current_depth_range(&self) -> (f32, f32);

    // -- GPU state restored on every exit path (spec §5) --
    fn set_color_write(&mut self, enabled: bool);
    fn set_cull_mode(&mut self, mode: CullMode);
    fn set_front_face(&mut self, winding: Winding);
    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32);
    fn set_depth_range(&mut self, near: f32, far: f32);
    fn bind_framebuffer(&mut self, framebuffer: Option<&dyn Framebuffer>);
    fn clear_depth(&mut self, depth: f32);
    fn clear_color(&mut self, color: Vec4);

    // -- resource creation (spec §5 "Lifecycle") --
    /// Allocates a depth-only framebuffer of the given square size, or
    /// `None` on allocation failure / lack of platform support.
    fn create_shadow_framebuffer(&mut self, size: u32) -> Option<Box<dyn Framebuffer>>;
    /// Allocates a cube-map framebuffer (six faces, single-channel float
    /// color format) of the given per-face square size.
    fn create_omni_shadow_framebuffer(&mut self, size: u32) -> Option<Box<dyn CubeMapFramebuffer>>;
    /// Builds a perspective projection.
    fn build_perspective_projection(
        &self,
        chirality: Chirality,
        fov: f32,
        aspect: f32,
        near: f64,
        far: f64,
    ) -> Box<dyn PlanarProjection>;
    /// Builds an orthographic projection with the given symmetric extents.
    fn build_orthographic_projection(
        &self,
        half_width: f64,
        half_height: f64,
        half_depth: f64,
        near: f64,
        far: f64,
    ) -> Box<dyn PlanarProjection>;
}
