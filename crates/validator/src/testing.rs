//! Test helpers
//!
//! [`RecordingRender`] collects render notifications so tests (and adapters
//! built on this crate) can assert on exactly which callbacks fired.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::render::{Render, RenderContext};

/// One recorded render callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// The attribute notified.
    pub attr: String,
    /// `Some` for `invalid`, `None` for `valid`.
    pub error: Option<String>,
}

impl Rendered {
    /// A `valid` notification.
    pub fn valid(attr: impl Into<String>) -> Self {
        Self {
            attr: attr.into(),
            error: None,
        }
    }

    /// An `invalid` notification.
    pub fn invalid(attr: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            attr: attr.into(),
            error: Some(error.into()),
        }
    }
}

/// A recorded callback together with its render context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    /// What was rendered.
    pub rendered: Rendered,
    /// The selector in effect.
    pub selector: String,
    /// The attribute itself changed.
    pub is_changed: bool,
    /// A dependency of the attribute changed.
    pub dependency_changed: bool,
}

/// A [`Render`] that records every callback in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingRender {
    entries: Arc<Mutex<Vec<RenderedEntry>>>,
}

impl RecordingRender {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, rendered: Rendered, ctx: &RenderContext<'_>) {
        self.entries.lock().push(RenderedEntry {
            rendered,
            selector: ctx.selector.to_owned(),
            is_changed: ctx.is_changed,
            dependency_changed: ctx.dependency_changed,
        });
    }

    /// Drains the recorded callbacks.
    pub fn take(&self) -> Vec<Rendered> {
        self.take_entries().into_iter().map(|e| e.rendered).collect()
    }

    /// Drains the recorded callbacks with their contexts.
    pub fn take_entries(&self) -> Vec<RenderedEntry> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Number of callbacks recorded and not yet drained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Render for RecordingRender {
    fn valid(&self, attr: &str, ctx: &RenderContext<'_>) {
        self.record(Rendered::valid(attr), ctx);
    }

    fn invalid(&self, attr: &str, error: &str, ctx: &RenderContext<'_>) {
        self.record(Rendered::invalid(attr, error), ctx);
    }
}
