//! Light-source collaborator.
//!
//! Spec §9's Design Note recommends replacing the "null handle denotes the
//! Sun" sentinel with an explicit discriminant; `LightSourceKind` is that
//! discriminant.

/// Opaque identifier for a non-Sun light, as handed back by a
/// [`super::scene::SceneEntity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightHandle(pub u64);

/// Which kind of light a scene entity carries.
///
/// The Sun is distinguished from ordinary point/spot lights because it is
/// always treated as a directional light with its own shadow pass (spec
/// §4.5), while every other light is an omnidirectional point light
/// candidate for the cube-map shadow pass (spec §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightSourceKind {
    /// The single directional light, rendered as the Sun.
    Sun,
    /// An ordinary point/spot light.
    External(LightHandle),
}

/// What [`super::scene::SceneEntity::light_source`] returns for an entity
/// that carries a light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSourceDescriptor {
    /// Which light this is.
    pub kind: LightSourceKind,
    /// Influence radius, in the light's own local units; used by
    /// [`crate::render::light_visibility::LightVisibilityFilter`] to decide
    /// whether the light is visually significant (spec §4.1).
    pub range: f32,
    /// `true` if this light should receive an omni shadow map when
    /// visible. Ignored for `LightSourceKind::Sun`, which always casts
    /// shadows via the directional pass.
    pub is_shadow_caster: bool,
}
