//! Validation configuration
//!
//! [`Config`] is the resolved record a validation pass runs with. [`Options`]
//! is a partial overlay: every field is optional and only set fields
//! override. The effective configuration of a call is
//! `global ⊕ bind-time options ⊕ call options`.
//!
//! # Process-wide defaults
//!
//! [`configure`] merges options into a single process-wide record read by
//! every later pass. The record is global, not scoped: concurrent
//! `configure` calls from unrelated code race, and the last write wins.
//! Prefer bind-time or call-time [`Options`] for anything local.

use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use serde::Deserialize;

use crate::message::LabelFormatter;
use crate::render::{NoopRender, Render};
use crate::validators::Catalog;

// ============================================================================
// CONFIG
// ============================================================================

/// Resolved configuration of a validation pass.
#[derive(Debug, Clone)]
pub struct Config {
    /// Always return `None` from `validate`, even when changed attributes
    /// are invalid.
    pub force_update: bool,
    /// Attribute used by render callbacks to locate an attribute's element.
    pub selector: String,
    /// Label strategy for messages.
    pub label_formatter: LabelFormatter,
    /// Render callbacks.
    pub render: Arc<dyn Render>,
    /// Suppress all notifications.
    pub silent: bool,
    /// Publish [`ModelEvent::AttrValidated`] instead of calling `render`.
    ///
    /// [`ModelEvent::AttrValidated`]: crate::events::ModelEvent::AttrValidated
    pub use_events_instead_of_callbacks: bool,
    /// Validators, messages and named patterns.
    pub catalog: Arc<Catalog>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            force_update: false,
            selector: "name".to_owned(),
            label_formatter: LabelFormatter::default(),
            render: Arc::new(NoopRender),
            silent: false,
            use_events_instead_of_callbacks: false,
            catalog: Arc::new(Catalog::default()),
        }
    }
}

impl Config {
    /// Overrides every field set in `options`.
    pub fn apply(&mut self, options: &Options) {
        if let Some(force_update) = options.force_update {
            self.force_update = force_update;
        }
        if let Some(selector) = &options.selector {
            self.selector.clone_from(selector);
        }
        if let Some(formatter) = &options.label_formatter {
            self.label_formatter = formatter.clone();
        }
        if let Some(render) = &options.render {
            self.render = render.clone();
        }
        if let Some(silent) = options.silent {
            self.silent = silent;
        }
        if let Some(use_events) = options.use_events_instead_of_callbacks {
            self.use_events_instead_of_callbacks = use_events;
        }
        if let Some(catalog) = &options.catalog {
            self.catalog = catalog.clone();
        }
    }

    /// This configuration with `options` applied on top.
    #[must_use]
    pub fn with(mut self, options: &Options) -> Self {
        self.apply(options);
        self
    }
}

// ============================================================================
// OPTIONS
// ============================================================================

/// Partial configuration.
///
/// Plain fields deserialize from camelCase JSON:
///
/// ```
/// use verity_validator::config::Options;
/// use verity_validator::message::LabelFormatter;
///
/// let options: Options =
///     serde_json::from_str(r#"{"forceUpdate": true, "labelFormatter": "label"}"#).unwrap();
/// assert_eq!(options.force_update, Some(true));
/// assert!(matches!(options.label_formatter, Some(LabelFormatter::Label)));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// See [`Config::force_update`].
    pub force_update: Option<bool>,
    /// See [`Config::selector`].
    pub selector: Option<String>,
    /// See [`Config::label_formatter`].
    pub label_formatter: Option<LabelFormatter>,
    /// See [`Config::render`].
    #[serde(skip)]
    pub render: Option<Arc<dyn Render>>,
    /// See [`Config::silent`].
    pub silent: Option<bool>,
    /// See [`Config::use_events_instead_of_callbacks`].
    pub use_events_instead_of_callbacks: Option<bool>,
    /// See [`Config::catalog`].
    #[serde(skip)]
    pub catalog: Option<Arc<Catalog>>,
}

impl Options {
    /// Creates an empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `force_update`.
    #[must_use = "builder methods must be chained or built"]
    pub const fn force_update(mut self, force_update: bool) -> Self {
        self.force_update = Some(force_update);
        self
    }

    /// Sets `selector`.
    #[must_use = "builder methods must be chained or built"]
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Sets the label strategy.
    #[must_use = "builder methods must be chained or built"]
    pub fn label_formatter(mut self, formatter: LabelFormatter) -> Self {
        self.label_formatter = Some(formatter);
        self
    }

    /// Sets the render callbacks.
    #[must_use = "builder methods must be chained or built"]
    pub fn render(mut self, render: impl Render + 'static) -> Self {
        self.render = Some(Arc::new(render));
        self
    }

    /// Sets `silent`.
    #[must_use = "builder methods must be chained or built"]
    pub const fn silent(mut self, silent: bool) -> Self {
        self.silent = Some(silent);
        self
    }

    /// Sets `use_events_instead_of_callbacks`.
    #[must_use = "builder methods must be chained or built"]
    pub const fn use_events(mut self, use_events: bool) -> Self {
        self.use_events_instead_of_callbacks = Some(use_events);
        self
    }

    /// Sets the catalog.
    #[must_use = "builder methods must be chained or built"]
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    /// Overlays `other` on top of `self`; fields set in `other` win.
    #[must_use = "builder methods must be chained or built"]
    pub fn merge(mut self, other: &Self) -> Self {
        if other.force_update.is_some() {
            self.force_update = other.force_update;
        }
        if other.selector.is_some() {
            self.selector.clone_from(&other.selector);
        }
        if other.label_formatter.is_some() {
            self.label_formatter.clone_from(&other.label_formatter);
        }
        if other.render.is_some() {
            self.render.clone_from(&other.render);
        }
        if other.silent.is_some() {
            self.silent = other.silent;
        }
        if other.use_events_instead_of_callbacks.is_some() {
            self.use_events_instead_of_callbacks = other.use_events_instead_of_callbacks;
        }
        if other.catalog.is_some() {
            self.catalog.clone_from(&other.catalog);
        }
        self
    }
}

// ============================================================================
// GLOBAL DEFAULTS
// ============================================================================

static GLOBAL: LazyLock<RwLock<Config>> = LazyLock::new(|| RwLock::new(Config::default()));

/// Merges `options` into the process-wide defaults.
pub fn configure(options: &Options) {
    GLOBAL.write().apply(options);
    tracing::debug!(?options, "validation defaults updated");
}

/// Restores the process-wide defaults.
pub fn reset() {
    *GLOBAL.write() = Config::default();
    tracing::debug!("validation defaults reset");
}

/// A copy of the current process-wide defaults.
#[must_use]
pub fn current() -> Config {
    GLOBAL.read().clone()
}

/// The effective configuration: process-wide defaults overlaid with
/// `options`.
#[must_use]
pub fn resolve(options: &Options) -> Config {
    current().with(options)
}
