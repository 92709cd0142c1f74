//! The per-view render orchestrator (spec §2).
//!
//! Components are listed here in the same dependency order the spec uses,
//! leaves first: light visibility filtering, visible-item collection,
//! depth-span partitioning, the span renderer, the two shadow passes, the
//! cube-map view driver, and finally the view-set lifecycle that ties them
//! together for public consumption.

pub mod cubemap_view;
pub mod depth_span;
pub mod light_visibility;
pub mod shadow_directional;
pub mod shadow_omni;
pub mod span_renderer;
pub mod types;
pub mod util;
pub mod view_set;
pub mod visible_items;

pub use cubemap_view::CubeMapViewDriver;
pub use depth_span::DepthSpanPartitioner;
pub use light_visibility::LightVisibilityFilter;
pub use shadow_directional::DirectionalShadowPass;
pub use shadow_omni::OmniShadowPass;
pub use span_renderer::{ShadowResources, SpanRenderer};
pub use types::{
    DepthBufferSpan, LightCullReason, LightSourceItem, RenderStats, VisibleItem,
    VisibleLightSourceItem,
};
pub use view_set::ViewSetSession;
pub use visible_items::VisibleItemCollector;
