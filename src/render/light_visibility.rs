//! Light-source visibility filtering (spec §4.1).

use glam::{DVec3, Quat};
use log::trace;

use crate::collab::{Frustum, LightHandle};

use super::types::{LightCullReason, LightSourceItem, VisibleLightSourceItem};

/// Reduces a scene-wide light list to the ones worth shading with this
/// frame, ordered so shadow casters come first.
///
/// The Sun sentinel (`handle == None`) is never culled and is always
/// treated as a shadow caster, so it always survives and always sorts to
/// the front — preserving the "index 0 is the Sun" invariant (spec §3)
/// into the visible list as well.
#[derive(Debug, Default)]
pub struct LightVisibilityFilter;

impl LightVisibilityFilter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Filters `lights` against the camera and frustum, returning the
    /// survivors in shadow-caster-first order.
    pub fn filter(
        &self,
        lights: &[LightSourceItem],
        camera_position: DVec3,
        camera_orientation: Quat,
        frustum: &Frustum,
        pixel_size: f32,
    ) -> Vec<VisibleLightSourceItem> {
        let mut survivors: Vec<VisibleLightSourceItem> = Vec::with_capacity(lights.len());
        let inverse_orientation = camera_orientation.inverse();

        for light in lights {
            let camera_relative = light.world_position - camera_position;
            let camera_relative_f32 = camera_relative.as_vec3();
            let camera_space = inverse_orientation * camera_relative_f32;

            if light.is_sun() {
                survivors.push(VisibleLightSourceItem {
                    handle: None,
                    world_position: light.world_position,
                    camera_relative_position: camera_relative_f32,
                    range: light.range,
                    is_shadow_caster: true,
                });
                continue;
            }

            let distance = camera_relative.length();
            if distance <= 0.0 {
                // Coincident with the camera: treat as maximally significant
                // rather than dividing by zero.
                survivors.push(VisibleLightSourceItem {
                    handle: light.handle,
                    world_position: light.world_position,
                    camera_relative_position: camera_relative_f32,
                    range: light.range,
                    is_shadow_caster: light.is_shadow_caster,
                });
                continue;
            }

            let subtended = (f64::from(light.range) / distance) as f32 / pixel_size;
            if subtended < 1.0 {
                trace!(
                    "culling light {:?}: {:?} ({subtended})",
                    light.handle,
                    LightCullReason::SubpixelInfluence
                );
                continue;
            }

            if !frustum.intersects_sphere(camera_space, light.range) {
                trace!(
                    "culling light {:?}: {:?}",
                    light.handle,
                    LightCullReason::OutsideFrustum
                );
                continue;
            }

            survivors.push(VisibleLightSourceItem {
                handle: light.handle,
                world_position: light.world_position,
                camera_relative_position: camera_relative_f32,
                range: light.range,
                is_shadow_caster: light.is_shadow_caster,
            });
        }

        survivors.sort_by_key(|item| !item.is_shadow_caster);
        survivors
    }
}

/// Finds the camera-relative position of the Sun sentinel among already
/// filtered lights, for callers that need it without a linear scan of
/// their own (used by the directional shadow pass).
#[must_use]
pub fn sun_camera_relative_position(visible_lights: &[VisibleLightSourceItem]) -> Option<glam::Vec3> {
    visible_lights
        .iter()
        .find(|l| l.handle.is_none())
        .map(|l| l.camera_relative_position)
}

/// Whether `handle` refers to a light still present after filtering.
#[must_use]
pub fn is_visible(visible_lights: &[VisibleLightSourceItem], handle: LightHandle) -> bool {
    visible_lights.iter().any(|l| l.handle == Some(handle))
}
