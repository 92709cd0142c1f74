//! Omnidirectional (point-light) shadow-map generation (spec §4.6).

use glam::{Vec3, Vec4};
use log::warn;
use smallvec::SmallVec;

use crate::collab::{
    Chirality, CubeFace, CubeMapFramebuffer, CullMode, Framebuffer, RenderContext, RendererOutput,
    Winding,
};

use super::types::VisibleItem;
use super::util::GraphicsStateGuard;
use super::visible_items::CollectedItems;

/// Color the cube-map faces are cleared to: an enormous red-channel
/// distance so unshadowed fragments read as "very far" rather than zero
/// (spec §4.6 step 1).
const CLEAR_DISTANCE: Vec4 = Vec4::new(1.0e15, 0.0, 0.0, 0.0);

/// Renders the six faces of a point light's omni shadow cube map.
#[derive(Debug, Default)]
pub struct OmniShadowPass;

#[derive(Debug, Clone, Copy)]
pub struct PrePassState {
    pub color_write: bool,
    pub cull_mode: CullMode,
    pub front_face: Winding,
    pub viewport: (u32, u32, u32, u32),
    pub depth_range: (f32, f32),
    pub clear_color: Vec4,
}

impl OmniShadowPass {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs the pass. `light_range` sets the near/far of the 90-degree
    /// cube perspective (`near = range * 1e-4`, `far = range`, spec §4.6
    /// step 2). Returns `false` on a per-frame degeneracy (no receivers or
    /// no casters).
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &self,
        ctx: &mut dyn RenderContext,
        span_items: &[VisibleItem],
        light_camera_relative_position: Vec3,
        light_range: f32,
        shadow_map_slot: u32,
        cube_map: &dyn CubeMapFramebuffer,
        cube_map_size: u32,
        is_receiver: impl Fn(&VisibleItem) -> bool,
        is_caster: impl Fn(&VisibleItem) -> bool,
        render_caster: impl Fn(&mut dyn RenderContext, &VisibleItem),
        pre_pass_state: PrePassState,
    ) -> bool {
        if !cube_map.is_valid() {
            warn!("omni shadow pass: cube map invalid, skipping");
            return false;
        }

        let receivers: SmallVec<[VisibleItem; 8]> = span_items
            .iter()
            .filter(|i| is_receiver(i))
            .copied()
            .collect();
        let casters: SmallVec<[VisibleItem; 8]> = span_items
            .iter()
            .filter(|i| is_caster(i))
            .copied()
            .collect();

        if receivers.is_empty() || casters.is_empty() {
            return false;
        }
        if CollectedItems::union_bounds(&receivers).is_none() {
            return false;
        }

        let near = f64::from(light_range) * 1.0e-4;
        let far = f64::from(light_range);

        let mut guard = GraphicsStateGuard::new(
            ctx,
            pre_pass_state.color_write,
            pre_pass_state.cull_mode,
            pre_pass_state.front_face,
            pre_pass_state.viewport,
            pre_pass_state.depth_range,
        );

        {
            let ctx = guard.ctx();
            ctx.set_front_face(Winding::Clockwise);
            ctx.set_renderer_output(RendererOutput::CameraDistance);

            for face in CubeFace::ALL {
                let framebuffer = cube_map.face_framebuffer(face);
                if !framebuffer.is_valid() {
                    continue;
                }

                ctx.bind_framebuffer(Some(framebuffer));
                ctx.clear_color(CLEAR_DISTANCE);
                ctx.clear_depth(1.0);
                ctx.set_viewport(0, 0, cube_map_size, cube_map_size);

                let projection = ctx.build_perspective_projection(
                    Chirality::LeftHanded,
                    std::f32::consts::FRAC_PI_2,
                    1.0,
                    near,
                    far,
                );
                ctx.push_projection();
                ctx.set_projection(projection.as_ref());
                ctx.push_modelview();
                ctx.set_camera_orientation(face.look_rotation());

                let face_frustum = projection.frustum();
                let face_inverse_rotation = face.look_rotation().inverse();

                for item in &casters {
                    let expanded_radius = item.bounding_radius + light_range;
                    let relative =
                        item.camera_relative_position.as_vec3() - light_camera_relative_position;
                    let face_local = face_inverse_rotation * relative;
                    if !face_frustum.intersects_sphere(face_local, expanded_radius) {
                        continue;
                    }

                    let modelview = glam::DAffine3::from_rotation_translation(
                        item.orientation.as_dquat(),
                        relative.as_dvec3(),
                    );
                    ctx.set_modelview(modelview);
                    render_caster(ctx, item);
                }

                ctx.pop_modelview();
                ctx.pop_projection();
            }

            ctx.set_renderer_output(RendererOutput::FragmentColor);
            ctx.set_front_face(Winding::CounterClockwise);
            ctx.set_omni_shadow_map_texture(shadow_map_slot, cube_map);
        }

        drop(guard);
        true
    }
}
