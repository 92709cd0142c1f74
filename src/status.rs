//! Lifecycle status codes.
//!
//! Per spec §7, lifecycle misuse is surfaced as a status code and nothing
//! more — callers are responsible for checking it, and there is no retry or
//! unwinding machinery attached to it. This is deliberately not
//! `std::error::Error`: treating it as an error that can be propagated with
//! `?` would encourage exactly the "abort the frame" behavior spec.md rules
//! out (§7.3 — per-frame degeneracies are skipped, not fatal).

/// Outcome of a lifecycle entry point (`begin_view_set`, `render_view`,
/// `render_cube_map`, `end_view_set`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderStatus {
    /// The call completed normally.
    Ok,
    /// Graphics resources required for this call were never initialized
    /// (see [`crate::render::ViewSetSession::initialize_graphics`]).
    Uninitialized,
    /// A render call was made with no active view set
    /// ([`crate::render::ViewSetSession::begin_view_set`] was never called,
    /// or a prior `end_view_set` already closed it).
    NoViewSet,
    /// `begin_view_set` was called while a view set was already open.
    ViewSetAlreadyStarted,
    /// A caller-supplied parameter was out of range (e.g. a negative
    /// viewport size, or a rotation matrix is not requested for a face that
    /// doesn't exist).
    BadParameter,
}

impl RenderStatus {
    /// `true` iff the call completed normally.
    #[inline]
    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(self, RenderStatus::Ok)
    }
}
