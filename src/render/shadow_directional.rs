//! Directional shadow-map generation (spec §4.5).

use glam::{DMat4, Mat4, Vec3};
use log::warn;
use smallvec::SmallVec;

use crate::collab::{CullMode, Framebuffer, RenderContext, Winding};

use super::types::VisibleItem;
use super::util::{stable_orthonormal_basis, GraphicsStateGuard};
use super::visible_items::CollectedItems;

/// Maps clip-space `[-1, 1]^3` to texture-space `[0, 1]^3`.
const SHADOW_BIAS: Mat4 = Mat4::from_cols_array(&[
    0.5, 0.0, 0.0, 0.0,
    0.0, 0.5, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.5, 0.5, 0.5, 1.0,
]);

/// Renders all shadow casters in a span into a directional (orthographic)
/// shadow map and produces the span-specific shadow transform.
#[derive(Debug, Default)]
pub struct DirectionalShadowPass;

/// Pre-pass-set GPU state a caller must supply so it can be restored on
/// exit (spec §5).
#[derive(Debug, Clone, Copy)]
pub struct PrePassState {
    pub color_write: bool,
    pub cull_mode: CullMode,
    pub front_face: Winding,
    pub viewport: (u32, u32, u32, u32),
    pub depth_range: (f32, f32),
}

impl DirectionalShadowPass {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs the pass for the given span's items. Returns `false` (and
    /// leaves the render context untouched) if there are no receivers or
    /// no casters — a per-frame degeneracy, not an error (spec §7.3).
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &self,
        ctx: &mut dyn RenderContext,
        span_items: &[VisibleItem],
        light_camera_relative_position: Vec3,
        shadow_map_slot: u32,
        framebuffer: &dyn Framebuffer,
        shadow_map_size: u32,
        is_receiver: impl Fn(&VisibleItem) -> bool,
        is_caster: impl Fn(&VisibleItem) -> bool,
        render_caster: impl Fn(&mut dyn RenderContext, &VisibleItem),
        pre_pass_state: PrePassState,
    ) -> bool {
        if !framebuffer.is_valid() {
            warn!("directional shadow pass: framebuffer invalid, skipping");
            return false;
        }

        let receivers: SmallVec<[&VisibleItem; 8]> =
            span_items.iter().filter(|i| is_receiver(i)).collect();
        let casters: SmallVec<[&VisibleItem; 8]> =
            span_items.iter().filter(|i| is_caster(i)).collect();

        if receivers.is_empty() || casters.is_empty() {
            return false;
        }

        let receiver_items: SmallVec<[VisibleItem; 8]> = receivers.iter().map(|i| **i).collect();
        let Some(receiver_bounds) = CollectedItems::union_bounds(&receiver_items) else {
            return false;
        };

        let center = receiver_bounds.center;
        let radius = receiver_bounds.radius.max(1e-6);

        let light_dir = (light_camera_relative_position + center).normalize_or_zero();
        let light_dir = if light_dir.length_squared() < 0.5 {
            Vec3::NEG_Z
        } else {
            light_dir
        };

        let (_right, up, forward) = stable_orthonormal_basis(light_dir);
        let light_view = Mat4::look_to_rh(Vec3::ZERO, forward, up);

        let light_proj = Mat4::orthographic_rh(-radius, radius, -radius, radius, -radius, radius);

        let translate_center = Mat4::from_translation(-center);
        let shadow_transform = DMat4::from_mat4(SHADOW_BIAS * light_proj * light_view)
            * DMat4::from_mat4(translate_center);

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
            ctx.set_color_write(false);
            ctx.set_cull_mode(CullMode::Front);
            ctx.set_front_face(Winding::CounterClockwise);
            ctx.bind_framebuffer(Some(framebuffer));
            ctx.clear_depth(1.0);
            ctx.set_viewport(0, 0, shadow_map_size, shadow_map_size);

            let projection = ctx.build_orthographic_projection(
                f64::from(radius),
                f64::from(radius),
                f64::from(radius),
                -f64::from(radius),
                f64::from(radius),
            );
            ctx.push_projection();
            ctx.set_projection(projection.as_ref());
            ctx.push_modelview();

            for item in &casters {
                let translation = item.camera_relative_position.as_vec3() - center;
                let modelview = glam::DAffine3::from_rotation_translation(
                    item.orientation.as_dquat(),
                    translation.as_dvec3(),
                );
                ctx.set_modelview(modelview);
                render_caster(ctx, *item);
            }

            ctx.pop_modelview();
            ctx.pop_projection();
            ctx.set_shadow_map_matrix(shadow_map_slot, shadow_transform);
            ctx.set_shadow_map_texture(shadow_map_slot, framebuffer);
        }

        // Guard drop restores color mask, cull mode, front face, viewport,
        // depth range, and unbinds the shadow framebuffer.
        drop(guard);

        true
    }
}
