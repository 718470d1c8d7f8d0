//! The observable model seam
//!
//! A [`Model`] exposes its current attributes, its rule declarations and a
//! change notifier. [`Record`] is the in-memory implementation shipped with
//! the crate; applications with their own state stores implement the trait
//! directly.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde_json::Value;

use crate::events::EventBus;
use crate::foundation::{Attributes, ConfigError, Result};
use crate::message::Labels;
use crate::rules::{CustomFn, Validation};
use crate::validators::{FnArgs, Outcome};

/// A data model that can be validated.
///
/// Accessors return owned snapshots so implementations are free to keep
/// their state behind locks. Declarations are read afresh on every pass and
/// may change at runtime.
pub trait Model: Send + Sync {
    /// Current attributes (possibly nested).
    fn attributes(&self) -> Attributes;

    /// Rule declarations; `None` when the model declares no validation.
    fn validation(&self) -> Option<Validation>;

    /// Label overrides used by the `label` strategy.
    fn labels(&self) -> Option<Labels> {
        None
    }

    /// Resolves a method named by an `fn` rule.
    fn method(&self, _name: &str) -> Option<CustomFn> {
        None
    }

    /// Merges `changed` into the attributes.
    fn assign(&self, changed: Attributes);

    /// The model's change notifier.
    fn events(&self) -> &EventBus;
}

// ============================================================================
// RECORD
// ============================================================================

static NEXT_CID: AtomicU64 = AtomicU64::new(1);

struct RecordInner {
    cid: String,
    attributes: RwLock<Attributes>,
    validation: RwLock<Option<Validation>>,
    labels: RwLock<Option<Labels>>,
    methods: RwLock<BTreeMap<String, CustomFn>>,
    events: EventBus,
}

/// In-memory model. Clones are handles to the same record; equality is
/// identity.
///
/// ```
/// use serde_json::json;
/// use verity_validator::model::{Model, Record};
/// use verity_validator::rules::{RuleDecl, Validation};
///
/// let user = Record::from_json(&json!({"name": "Ada"}))
///     .unwrap()
///     .with_validation(Validation::new().attr("name", RuleDecl::validator("required", true)));
/// assert_eq!(user.get("name"), Some(json!("Ada")));
/// assert!(user.validation().is_some());
/// ```
#[derive(Clone)]
pub struct Record {
    inner: Arc<RecordInner>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::with_attributes(Attributes::new())
    }

    /// Creates a record holding `attributes`.
    #[must_use]
    pub fn with_attributes(attributes: Attributes) -> Self {
        let cid = format!("c{}", NEXT_CID.fetch_add(1, Ordering::Relaxed));
        Self {
            inner: Arc::new(RecordInner {
                cid,
                attributes: RwLock::new(attributes),
                validation: RwLock::new(None),
                labels: RwLock::new(None),
                methods: RwLock::new(BTreeMap::new()),
                events: EventBus::default(),
            }),
        }
    }

    /// Creates a record from a JSON object.
    pub fn from_json(value: &Value) -> Result<Self> {
        let attributes = value
            .as_object()
            .cloned()
            .ok_or_else(|| ConfigError::InvalidDeclaration {
                attr: String::new(),
                reason: "record attributes must be a JSON object".into(),
            })?;
        Ok(Self::with_attributes(attributes))
    }

    /// Sets the rule declarations.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_validation(self, validation: Validation) -> Self {
        self.set_validation(Some(validation));
        self
    }

    /// Sets the label overrides.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_labels<I, K, V>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        *self.inner.labels.write() = Some(
            labels
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Adds a method callable from `fn` rules by name.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_method<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&FnArgs<'_>) -> Outcome + Send + Sync + 'static,
    {
        self.inner.methods.write().insert(name.into(), Arc::new(f));
        self
    }

    /// Replaces the rule declarations in place.
    pub fn set_validation(&self, validation: Option<Validation>) {
        *self.inner.validation.write() = validation;
    }

    /// A client-side id unique within the process.
    #[must_use]
    pub fn cid(&self) -> &str {
        &self.inner.cid
    }

    /// The value of a top-level attribute.
    #[must_use]
    pub fn get(&self, attr: &str) -> Option<Value> {
        self.inner.attributes.read().get(attr).cloned()
    }

    /// Sets one attribute without validating.
    pub fn set(&self, attr: impl Into<String>, value: impl Into<Value>) {
        self.inner.attributes.write().insert(attr.into(), value.into());
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Record {}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("cid", &self.inner.cid)
            .field("attributes", &*self.inner.attributes.read())
            .finish_non_exhaustive()
    }
}

impl Model for Record {
    fn attributes(&self) -> Attributes {
        self.inner.attributes.read().clone()
    }

    fn validation(&self) -> Option<Validation> {
        self.inner.validation.read().clone()
    }

    fn labels(&self) -> Option<Labels> {
        self.inner.labels.read().clone()
    }

    fn method(&self, name: &str) -> Option<CustomFn> {
        self.inner.methods.read().get(name).cloned()
    }

    fn assign(&self, changed: Attributes) {
        self.inner.attributes.write().extend(changed);
    }

    fn events(&self) -> &EventBus {
        &self.inner.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clones_share_state() {
        let a = Record::new();
        let b = a.clone();
        b.set("x", 1);
        assert_eq!(a.get("x"), Some(json!(1)));
        assert_eq!(a, b);
        assert_ne!(a, Record::new());
    }

    #[test]
    fn cids_are_unique() {
        assert_ne!(Record::new().cid(), Record::new().cid());
    }

    #[test]
    fn assign_merges() {
        let record = Record::from_json(&json!({"a": 1, "b": 2})).unwrap();
        record.assign(json!({"b": 3, "c": 4}).as_object().cloned().unwrap());
        assert_eq!(Value::Object(record.attributes()), json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn methods_resolve_by_name() {
        let record = Record::new().with_method("isOk", |_| Outcome::Pass);
        assert!(record.method("isOk").is_some());
        assert!(record.method("missing").is_none());
    }

    #[test]
    fn from_json_needs_an_object() {
        assert!(Record::from_json(&json!([1, 2])).is_err());
    }
}
