//! Render callbacks
//!
//! A [`Render`] is the presentation side of a binding: it is told when an
//! attribute becomes valid or invalid. How it shows that (toggling a CSS
//! class, writing to a terminal, collecting into a list) is its own concern.

use std::fmt;

use crate::events::ModelEvent;

/// Per-notification context passed to render callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext<'a> {
    /// Attribute name used to locate the attribute's element.
    pub selector: &'a str,
    /// The attribute was among the changed attributes.
    pub is_changed: bool,
    /// One of the attribute's dependencies was among the changed attributes.
    pub dependency_changed: bool,
}

/// Receives per-attribute validity notifications.
pub trait Render: Send + Sync {
    /// `attr` passed its rules.
    fn valid(&self, attr: &str, ctx: &RenderContext<'_>);

    /// `attr` failed a rule with `error`.
    fn invalid(&self, attr: &str, error: &str, ctx: &RenderContext<'_>);
}

/// Render that ignores every notification. This is the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRender;

impl Render for NoopRender {
    fn valid(&self, _attr: &str, _ctx: &RenderContext<'_>) {}

    fn invalid(&self, _attr: &str, _error: &str, _ctx: &RenderContext<'_>) {}
}

impl fmt::Debug for dyn Render {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Render")
    }
}

/// Routes an [`ModelEvent::AttrValidated`] to `render`.
///
/// Used when a binding publishes attribute events instead of calling its
/// render directly. Returns whether a callback fired; other events and
/// attribute events with none of the change flags set are ignored.
pub fn dispatch(render: &dyn Render, selector: &str, event: &ModelEvent) -> bool {
    let ModelEvent::AttrValidated {
        attr,
        error,
        is_changed,
        is_dependency_changed,
        validate_all,
        ..
    } = event
    else {
        return false;
    };
    if !(*is_changed || *is_dependency_changed || *validate_all) {
        return false;
    }

    let ctx = RenderContext {
        selector,
        is_changed: *is_changed,
        dependency_changed: *is_dependency_changed,
    };
    match error {
        Some(error) => render.invalid(attr, error, &ctx),
        None => render.valid(attr, &ctx),
    }
    true
}
