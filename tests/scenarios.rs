//! Cross-module scenarios from spec.md §8 ("Concrete scenarios"), driven
//! against the real orchestrator through `tests/support`'s fakes.

mod support;

use farview::collab::{ClippingPolicy, LightSourceDescriptor, LightSourceKind};
use farview::{EngineConfig, RenderStatus, ViewSetSession};
use glam::{DVec3, Quat};
use support::{FakeEntity, FakeGeometry, FakeObserver, FakeRenderContext, FakeScene};

fn session() -> ViewSetSession {
    let mut session = ViewSetSession::new(EngineConfig::default());
    session.initialize_graphics();
    session
}

fn camera_at(position: DVec3) -> FakeObserver {
    FakeObserver {
        position,
        orientation: Quat::IDENTITY,
    }
}

/// Scenario 1: a single planet far enough away that one span covers it.
#[test]
fn single_distant_planet_yields_one_span() {
    let mut scene = FakeScene::default();
    let radius = 1.0e8_f32;
    let distance = 1.0e9_f64;
    scene.entities.push(
        FakeEntity::new(DVec3::ZERO).with_geometry(FakeGeometry::new(
            radius,
            (distance as f32) - radius,
            ClippingPolicy::PreserveDepthPrecision,
        )),
    );

    let camera = camera_at(DVec3::new(0.0, 0.0, distance));
    let mut ctx = FakeRenderContext::default();
    let mut session = session();

    let status = session.begin_view_set(&scene, 0.0);
    assert_eq!(status, RenderStatus::Ok);

    let (status, stats) = session.render_view(
        &mut ctx,
        &scene,
        &camera,
        1000,
        1000,
        60f32.to_radians(),
        1.0,
        1.0e12,
    );

    assert_eq!(status, RenderStatus::Ok);
    assert_eq!(stats.span_count, 1, "a single isolated body should need one span");
    assert_eq!(stats.normal_item_count, 1);

    // one draw call per sub-pass (opaque) for the single item.
    let draws = ctx.draw_log.borrow();
    assert_eq!(draws.len(), 1, "exactly one opaque draw for the lone item");
}

/// Scenario 2: a distant planet plus a low-orbit spacecraft at wildly
/// different scales forces at least two merged spans.
#[test]
fn disjoint_scales_yield_multiple_spans() {
    let mut scene = FakeScene::default();
    let planet_radius = 1.0e8_f32;
    let planet_distance = 1.0e9_f64;
    scene.entities.push(
        FakeEntity::new(DVec3::ZERO).with_geometry(FakeGeometry::new(
            planet_radius,
            (planet_distance as f32) - planet_radius,
            ClippingPolicy::PreserveDepthPrecision,
        )),
    );

    // Large enough relative to its distance to clear the size cull
    // (threshold 0.5px at this FOV/viewport needs radius/distance >~ 6e-4).
    let spacecraft_radius = 200.0_f32;
    let spacecraft_distance = 1.0e5_f64;
    // Spacecraft sits between the camera and the planet along the same axis.
    scene.entities.push(
        FakeEntity::new(DVec3::new(0.0, 0.0, planet_distance - spacecraft_distance))
            .with_geometry(FakeGeometry::new(
                spacecraft_radius,
                spacecraft_distance as f32 - spacecraft_radius,
                ClippingPolicy::PreserveDepthPrecision,
            )),
    );

    let camera = camera_at(DVec3::new(0.0, 0.0, planet_distance));
    let mut ctx = FakeRenderContext::default();
    let mut session = session();

    session.begin_view_set(&scene, 0.0);
    let (status, stats) = session.render_view(
        &mut ctx,
        &scene,
        &camera,
        1000,
        1000,
        60f32.to_radians(),
        1.0,
        1.0e12,
    );

    assert_eq!(status, RenderStatus::Ok);
    assert!(
        stats.span_count >= 2,
        "disjoint scales should not coalesce into one span, got {}",
        stats.span_count
    );
    assert_eq!(stats.normal_item_count, 2);
}

/// Scenario 3: only a splittable trajectory is visible; expect a single
/// synthesized back span and exactly one draw of the trajectory.
#[test]
fn only_splittable_item_synthesizes_back_span() {
    // With no normal items, the partitioner synthesizes a single back span
    // covering [far/max_far_near_ratio, far] of the projection range (here
    // [1e8, 1e12]); the trajectory's own far distance must exceed 1e8 for
    // it to actually land inside that span.
    let mut scene = FakeScene::default();
    scene.entities.push(FakeEntity::new(DVec3::new(0.0, 0.0, -4.0e8)).with_geometry(
        FakeGeometry::new(1.0e8, 10.0, ClippingPolicy::SplitToPreventClipping),
    ));

    let camera = camera_at(DVec3::ZERO);
    let mut ctx = FakeRenderContext::default();
    let mut session = session();

    session.begin_view_set(&scene, 0.0);
    let (status, stats) = session.render_view(
        &mut ctx,
        &scene,
        &camera,
        1000,
        1000,
        60f32.to_radians(),
        1.0,
        1.0e12,
    );

    assert_eq!(status, RenderStatus::Ok);
    assert_eq!(stats.normal_item_count, 0);
    assert_eq!(stats.splittable_item_count, 1);
    assert!(stats.span_count >= 1);

    let draws = ctx.draw_log.borrow();
    assert_eq!(draws.len(), 1, "trajectory drawn exactly once (single span)");
}

/// Scenario 4: a subpixel point light is culled; the Sun sentinel always
/// survives at slot 0.
#[test]
fn subpixel_point_light_culled_sun_survives() {
    let mut scene = FakeScene::default();
    scene.entities.push(FakeEntity::new(DVec3::new(1.0e9, 0.0, 0.0)).with_light(
        LightSourceDescriptor {
            kind: LightSourceKind::External(farview::collab::LightHandle(1)),
            range: 1.0,
            is_shadow_caster: false,
        },
    ));

    let camera = camera_at(DVec3::ZERO);
    let mut ctx = FakeRenderContext::default();
    let mut session = session();

    session.begin_view_set(&scene, 0.0);
    let (status, stats) = session.render_view(
        &mut ctx,
        &scene,
        &camera,
        1000,
        1000,
        60f32.to_radians(),
        1.0,
        1.0e12,
    );

    assert_eq!(status, RenderStatus::Ok);
    assert_eq!(stats.visible_light_count, 1, "only the Sun should survive");
}

/// Scenario 5: a shadow caster outside the frustum is kept in the
/// visible-item list (and processed by the shadow pass) but is skipped by
/// the main draw.
#[test]
fn caster_outside_frustum_is_shadow_only() {
    let mut scene = FakeScene::default();
    // Off to the side enough to clear a 30-degree half-FOV (its camera-space
    // direction sits at ~72 degrees from forward) while staying close
    // enough in Euclidean distance that its projected size still clears the
    // size cull.
    let off_axis = DVec3::new(3.0e5, 0.0, -1.0e5);
    scene.entities.push(
        FakeEntity::new(off_axis).with_geometry(FakeGeometry::new(
            1.0e4,
            9.0e4,
            ClippingPolicy::PreserveDepthPrecision,
        )),
    );
    // An in-frustum receiver at a comparable depth so the directional
    // shadow pass has somewhere to cast onto, and the two items land in the
    // same span.
    scene.entities.push(FakeEntity::new(DVec3::new(0.0, 0.0, -1.0e5)).with_geometry(
        FakeGeometry::new(1.0e4, 9.0e4, ClippingPolicy::PreserveDepthPrecision),
    ));

    let camera = camera_at(DVec3::ZERO);
    let mut ctx = FakeRenderContext::default();
    let mut session = session();
    session.initialize_shadow_maps(&mut ctx);
    session.initialize_omni_shadow_maps(&mut ctx);

    session.begin_view_set(&scene, 0.0);
    let (status, stats) = session.render_view(
        &mut ctx,
        &scene,
        &camera,
        1000,
        1000,
        60f32.to_radians(),
        1.0,
        1.0e12,
    );

    assert_eq!(status, RenderStatus::Ok);
    assert_eq!(stats.normal_item_count, 2, "both items remain in the visible list");
    assert!(
        stats.directional_shadow_passes >= 1,
        "the off-axis caster should still feed the shadow pass"
    );

    // The off-axis item should never have been drawn in the main pass:
    // only the in-frustum receiver contributes a shaded draw call.
    let draws = ctx.draw_log.borrow();
    assert_eq!(draws.len(), 1, "only the in-frustum receiver is shaded");
}

/// Lifecycle: `begin_view_set` twice without `end_view_set` is rejected.
#[test]
fn reentrant_begin_view_set_is_rejected() {
    let scene = FakeScene::default();
    let mut session = session();
    assert_eq!(session.begin_view_set(&scene, 0.0), RenderStatus::Ok);
    assert_eq!(
        session.begin_view_set(&scene, 0.0),
        RenderStatus::ViewSetAlreadyStarted
    );
    assert_eq!(session.end_view_set(), RenderStatus::Ok);
}

/// Lifecycle: rendering before `begin_view_set` is rejected.
#[test]
fn render_without_view_set_is_rejected() {
    let scene = FakeScene::default();
    let camera = camera_at(DVec3::ZERO);
    let mut ctx = FakeRenderContext::default();
    let mut session = session();

    let (status, stats) = session.render_view(
        &mut ctx,
        &scene,
        &camera,
        1000,
        1000,
        60f32.to_radians(),
        1.0,
        1.0e12,
    );
    assert_eq!(status, RenderStatus::NoViewSet);
    assert_eq!(stats, Default::default());
}

/// After `render_view` returns, the GPU state it mutates is back to the
/// values active before the call.
#[test]
fn render_view_restores_gpu_state_on_success() {
    let mut scene = FakeScene::default();
    scene.entities.push(FakeEntity::new(DVec3::new(0.0, 0.0, -1.0e6)).with_geometry(
        FakeGeometry::new(1.0e5, 9.0e5, ClippingPolicy::PreserveDepthPrecision),
    ));

    let camera = camera_at(DVec3::ZERO);
    let mut ctx = FakeRenderContext::default();
    let mut session = session();
    session.initialize_shadow_maps(&mut ctx);

    let pre_color_write = ctx.color_write;
    let pre_cull = ctx.cull_mode;
    let pre_front_face = ctx.front_face;
    let pre_depth_range = ctx.depth_range;
    let pre_bound = ctx.bound_framebuffer;

    session.begin_view_set(&scene, 0.0);
    let (status, _) = session.render_view(
        &mut ctx,
        &scene,
        &camera,
        1000,
        1000,
        60f32.to_radians(),
        1.0,
        1.0e12,
    );
    assert_eq!(status, RenderStatus::Ok);

    assert_eq!(ctx.color_write, pre_color_write);
    assert_eq!(ctx.cull_mode, pre_cull);
    assert_eq!(ctx.front_face, pre_front_face);
    assert_eq!(ctx.depth_range, pre_depth_range);
    assert_eq!(ctx.bound_framebuffer, pre_bound);
    assert_eq!(ctx.projection_stack_depth, 0, "projection stack must be balanced");
    assert_eq!(ctx.modelview_stack_depth, 0, "modelview stack must be balanced");
}

/// Same as above, but with a scene that forces ≥2 merged spans: the
/// per-span depth-range slice (spec §4.4 step 1) must not leak out of
/// `render_view` just because more than one span was rendered.
#[test]
fn render_view_restores_gpu_state_with_multiple_spans() {
    let mut scene = FakeScene::default();
    let planet_radius = 1.0e8_f32;
    let planet_distance = 1.0e9_f64;
    scene.entities.push(
        FakeEntity::new(DVec3::ZERO).with_geometry(FakeGeometry::new(
            planet_radius,
            (planet_distance as f32) - planet_radius,
            ClippingPolicy::PreserveDepthPrecision,
        )),
    );

    let spacecraft_radius = 200.0_f32;
    let spacecraft_distance = 1.0e5_f64;
    scene.entities.push(
        FakeEntity::new(DVec3::new(0.0, 0.0, planet_distance - spacecraft_distance))
            .with_geometry(FakeGeometry::new(
                spacecraft_radius,
                spacecraft_distance as f32 - spacecraft_radius,
                ClippingPolicy::PreserveDepthPrecision,
            )),
    );

    let camera = camera_at(DVec3::new(0.0, 0.0, planet_distance));
    let mut ctx = FakeRenderContext::default();
    let mut session = session();
    session.initialize_shadow_maps(&mut ctx);

    let pre_depth_range = ctx.depth_range;
    let pre_viewport = ctx.viewport;
    let pre_bound = ctx.bound_framebuffer;

    session.begin_view_set(&scene, 0.0);
    let (status, stats) = session.render_view(
        &mut ctx,
        &scene,
        &camera,
        1000,
        1000,
        60f32.to_radians(),
        1.0,
        1.0e12,
    );
    assert_eq!(status, RenderStatus::Ok);
    assert!(
        stats.span_count >= 2,
        "this scenario must exercise more than one span, got {}",
        stats.span_count
    );

    assert_eq!(
        ctx.depth_range, pre_depth_range,
        "depth range must not be left at the last span's slice"
    );
    assert_eq!(ctx.viewport, pre_viewport);
    assert_eq!(ctx.bound_framebuffer, pre_bound);
}

/// Calling `render_view` twice in the same view set against an immutable
/// scene snapshot produces identical draw counts both times.
#[test]
fn render_view_twice_is_idempotent() {
    let mut scene = FakeScene::default();
    scene.entities.push(FakeEntity::new(DVec3::new(0.0, 0.0, -1.0e6)).with_geometry(
        FakeGeometry::new(1.0e5, 9.0e5, ClippingPolicy::PreserveDepthPrecision),
    ));
    let camera = camera_at(DVec3::ZERO);
    let mut session = session();
    session.begin_view_set(&scene, 0.0);

    let mut ctx_a = FakeRenderContext::default();
    let (_, stats_a) = session.render_view(
        &mut ctx_a,
        &scene,
        &camera,
        1000,
        1000,
        60f32.to_radians(),
        1.0,
        1.0e12,
    );

    let mut ctx_b = FakeRenderContext::default();
    let (_, stats_b) = session.render_view(
        &mut ctx_b,
        &scene,
        &camera,
        1000,
        1000,
        60f32.to_radians(),
        1.0,
        1.0e12,
    );

    assert_eq!(stats_a, stats_b);
    assert_eq!(ctx_a.draw_log.borrow().len(), ctx_b.draw_log.borrow().len());
}
