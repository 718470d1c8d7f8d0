//! Validation controller
//!
//! A [`Controller`] is the validation capability of one bound model:
//! incremental [`validate`](Controller::validate) passes with notifications,
//! side-effect free [`pre_validate`](Controller::pre_validate), and
//! [`is_valid`](Controller::is_valid) queries.
//!
//! ## Notifications
//!
//! After evaluating, a pass notifies each declared attribute that changed,
//! whose dependency changed, or every declared attribute when validating
//! all. Each notified attribute gets exactly one `valid` or `invalid` render
//! callback (or one [`ModelEvent::AttrValidated`] in event mode). The
//! summary events [`ModelEvent::Validated`] and
//! `ValidatedValid`/`ValidatedInvalid` are deferred to the controller's
//! [`TaskQueue`]; they are not visible before `validate` returns.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::config::{self, Config, Options};
use crate::evaluate::{EvalContext, evaluate};
use crate::events::ModelEvent;
use crate::foundation::{Attributes, Result, Snapshot, flatten};
use crate::model::Model;
use crate::queue::TaskQueue;
use crate::render::RenderContext;
use crate::rules::{CustomFn, Validation, dependencies_of};

/// Invalid attributes and their messages.
pub type InvalidAttrs = BTreeMap<String, String>;

/// What [`Controller::is_valid`] checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidityQuery {
    /// The validity stored by the last pass. `true` when the model declares
    /// no validation, `false` before the first pass.
    Stored,
    /// Run a validate-all pass, then report the stored validity.
    Revalidate,
    /// Evaluate every declared attribute against the current state without
    /// storing anything.
    Declared,
    /// Evaluate one attribute against the current state.
    Attr(String),
    /// Evaluate several attributes; valid when all are.
    Attrs(Vec<String>),
}

impl From<&str> for ValidityQuery {
    fn from(attr: &str) -> Self {
        Self::Attr(attr.to_owned())
    }
}

impl From<String> for ValidityQuery {
    fn from(attr: String) -> Self {
        Self::Attr(attr)
    }
}

impl From<Vec<&str>> for ValidityQuery {
    fn from(attrs: Vec<&str>) -> Self {
        Self::Attrs(attrs.into_iter().map(str::to_owned).collect())
    }
}

impl From<Vec<String>> for ValidityQuery {
    fn from(attrs: Vec<String>) -> Self {
        Self::Attrs(attrs)
    }
}

impl<const N: usize> From<[&str; N]> for ValidityQuery {
    fn from(attrs: [&str; N]) -> Self {
        Self::Attrs(attrs.into_iter().map(str::to_owned).collect())
    }
}

impl From<bool> for ValidityQuery {
    /// `true` revalidates, `false` evaluates the declared attributes.
    fn from(revalidate: bool) -> Self {
        if revalidate {
            Self::Revalidate
        } else {
            Self::Declared
        }
    }
}

struct PassResult {
    invalid_attrs: InvalidAttrs,
    is_valid: bool,
}

/// Validation capability of one bound model.
pub struct Controller<M> {
    model: M,
    options: Options,
    queue: TaskQueue,
    is_valid: Arc<RwLock<Option<bool>>>,
}

impl<M: Clone> Clone for Controller<M> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            options: self.options.clone(),
            queue: self.queue.clone(),
            is_valid: self.is_valid.clone(),
        }
    }
}

impl<M: fmt::Debug> fmt::Debug for Controller<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("model", &self.model)
            .field("is_valid", &*self.is_valid.read())
            .finish_non_exhaustive()
    }
}

impl<M: Model> Controller<M> {
    /// Creates a controller for `model`. `options` overlay the process-wide
    /// defaults on every call; summary events are deferred to `queue`.
    pub fn new(model: M, options: Options, queue: TaskQueue) -> Self {
        Self {
            model,
            options,
            queue,
            is_valid: Arc::new(RwLock::new(None)),
        }
    }

    /// The validated model.
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// The queue summary events are deferred to.
    pub const fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    /// The configuration a call with `options` runs with.
    #[must_use]
    pub fn config(&self, options: &Options) -> Config {
        config::resolve(&self.options.clone().merge(options))
    }

    // ========================================================================
    // VALIDATE
    // ========================================================================

    /// Runs a validation pass.
    ///
    /// With `changed` set, the pass validates the model state with `changed`
    /// applied (the model itself is not modified) and notifies the changed
    /// attributes and their dependents. With `None` every declared attribute
    /// is notified.
    ///
    /// Returns the invalid attributes when any of them is among the changed
    /// attributes, and `None` otherwise or when `force_update` is set.
    pub fn validate(
        &self,
        changed: Option<&Attributes>,
        options: &Options,
    ) -> Result<Option<InvalidAttrs>> {
        let config = self.config(options);
        let validation = self.model.validation();
        let validate_all = changed.is_none();

        let mut all = Attributes::new();
        if let Some(validation) = &validation {
            for attr in validation.attrs() {
                all.insert(attr.to_owned(), Value::Null);
            }
        }
        all.extend(self.model.attributes());
        if let Some(changed) = changed {
            all.extend(changed.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        let flat_changed = flatten(changed.unwrap_or(&all));

        let result = match &validation {
            Some(validation) => self.run_pass(&config, validation, &all)?,
            None => PassResult {
                invalid_attrs: InvalidAttrs::new(),
                is_valid: true,
            },
        };
        *self.is_valid.write() = Some(result.is_valid);

        tracing::debug!(
            invalid = result.invalid_attrs.len(),
            changed = flat_changed.len(),
            validate_all,
            "validation pass complete"
        );

        if !config.silent {
            if let Some(validation) = &validation {
                self.notify_attrs(&config, validation, &result, &flat_changed, validate_all);
            }
            self.defer_summary(&result, flat_changed.clone());
        }

        let touches_changed = result
            .invalid_attrs
            .keys()
            .any(|attr| flat_changed.contains_key(attr));
        if !config.force_update && touches_changed {
            Ok(Some(result.invalid_attrs))
        } else {
            Ok(None)
        }
    }

    /// Validates `changed` and applies it to the model unless the pass
    /// returns invalid attributes.
    pub fn set(&self, changed: Attributes, options: &Options) -> Result<Option<InvalidAttrs>> {
        let invalid = self.validate(Some(&changed), options)?;
        if invalid.is_none() {
            self.model.assign(changed);
        }
        Ok(invalid)
    }

    fn run_pass(&self, config: &Config, validation: &Validation, all: &Attributes) -> Result<PassResult> {
        let labels = self.model.labels();
        let methods = |name: &str| self.model.method(name);
        let ctx = EvalContext {
            catalog: &config.catalog,
            formatter: &config.label_formatter,
            labels: labels.as_ref(),
            methods: &methods,
        };

        let mut invalid_attrs = InvalidAttrs::new();
        for (attr, value) in flatten(all) {
            if let Some(error) = evaluate(&ctx, validation, &attr, &value, all)? {
                tracing::debug!(attr = %attr, error = %error, "attribute invalid");
                invalid_attrs.insert(attr, error);
            }
        }
        let is_valid = invalid_attrs.is_empty();
        Ok(PassResult {
            invalid_attrs,
            is_valid,
        })
    }

    fn notify_attrs(
        &self,
        config: &Config,
        validation: &Validation,
        result: &PassResult,
        flat_changed: &Snapshot,
        validate_all: bool,
    ) {
        for attr in validation.attrs() {
            let is_changed = flat_changed.contains_key(attr);
            let dependency_changed = dependencies_of(validation, attr)
                .iter()
                .any(|dep| flat_changed.contains_key(dep));
            if !(is_changed || dependency_changed || validate_all) {
                continue;
            }

            let error = result.invalid_attrs.get(attr);
            tracing::trace!(attr, is_changed, dependency_changed, valid = error.is_none(), "notify");

            if config.use_events_instead_of_callbacks {
                self.model.events().emit(ModelEvent::AttrValidated {
                    attr: attr.to_owned(),
                    is_valid: error.is_none(),
                    error: error.cloned(),
                    is_changed,
                    is_dependency_changed: dependency_changed,
                    validate_all,
                });
                continue;
            }

            let ctx = RenderContext {
                selector: &config.selector,
                is_changed,
                dependency_changed,
            };
            match error {
                Some(error) => config.render.invalid(attr, error, &ctx),
                None => config.render.valid(attr, &ctx),
            }
        }
    }

    fn defer_summary(&self, result: &PassResult, changed: Snapshot) {
        let events = self.model.events().clone();
        let is_valid = result.is_valid;
        let invalid_attrs = result.invalid_attrs.clone();
        self.queue.defer(move || {
            events.emit(ModelEvent::Validated {
                is_valid,
                invalid_attrs: invalid_attrs.clone(),
                changed: changed.clone(),
            });
            events.emit(if is_valid {
                ModelEvent::ValidatedValid {
                    invalid_attrs,
                    changed,
                }
            } else {
                ModelEvent::ValidatedInvalid {
                    invalid_attrs,
                    changed,
                }
            });
        });
    }

    // ========================================================================
    // PRE-VALIDATE
    // ========================================================================

    /// Validates `value` as `attr` against the model's current state.
    ///
    /// Nothing is stored and nothing is notified.
    pub fn pre_validate(&self, attr: &str, value: &Value) -> Result<Option<String>> {
        let Some(validation) = self.model.validation() else {
            return Ok(None);
        };
        let config = self.config(&Options::new());
        self.evaluate_current(&config, &validation, attr, value, &self.model.attributes())
    }

    /// Validates each pair of `values` like [`pre_validate`](Self::pre_validate).
    ///
    /// Returns `None` when every value is valid.
    pub fn pre_validate_all(&self, values: &Attributes) -> Result<Option<InvalidAttrs>> {
        let mut invalid = InvalidAttrs::new();
        for (attr, value) in values {
            if let Some(error) = self.pre_validate(attr, value)? {
                invalid.insert(attr.clone(), error);
            }
        }
        Ok((!invalid.is_empty()).then_some(invalid))
    }

    fn evaluate_current(
        &self,
        config: &Config,
        validation: &Validation,
        attr: &str,
        value: &Value,
        computed: &Attributes,
    ) -> Result<Option<String>> {
        let labels = self.model.labels();
        let methods = |name: &str| -> Option<CustomFn> { self.model.method(name) };
        let ctx = EvalContext {
            catalog: &config.catalog,
            formatter: &config.label_formatter,
            labels: labels.as_ref(),
            methods: &methods,
        };
        evaluate(&ctx, validation, attr, value, computed)
    }

    // ========================================================================
    // IS VALID
    // ========================================================================

    /// Answers a validity query. See [`ValidityQuery`] for the forms.
    pub fn is_valid(&self, query: impl Into<ValidityQuery>) -> Result<bool> {
        let attrs = match query.into() {
            ValidityQuery::Stored => return Ok(self.stored_validity()),
            ValidityQuery::Revalidate => {
                self.validate(None, &Options::new())?;
                return Ok(self.stored_validity());
            }
            ValidityQuery::Declared => self
                .model
                .validation()
                .map(|v| v.attrs().map(str::to_owned).collect())
                .unwrap_or_default(),
            ValidityQuery::Attr(attr) => vec![attr],
            ValidityQuery::Attrs(attrs) => attrs,
        };
        self.current_attrs_valid(&attrs)
    }

    fn stored_validity(&self) -> bool {
        if self.model.validation().is_none() {
            return true;
        }
        self.is_valid.read().unwrap_or(false)
    }

    fn current_attrs_valid(&self, attrs: &[String]) -> Result<bool> {
        let Some(validation) = self.model.validation() else {
            return Ok(true);
        };
        let config = self.config(&Options::new());
        let current = self.model.attributes();
        let flat = flatten(&current);
        for attr in attrs {
            let value = flat.get(attr).unwrap_or(&Value::Null);
            if self
                .evaluate_current(&config, &validation, attr, value, &current)?
                .is_some()
            {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::drain;
    use crate::message::LabelFormatter;
    use crate::model::Record;
    use crate::rules::RuleDecl;
    use crate::testing::{RecordingRender, Rendered};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap_or_default()
    }

    fn controller(record: Record, render: &RecordingRender) -> Controller<Record> {
        let options = Options::new()
            .render(render.clone())
            .label_formatter(LabelFormatter::None);
        Controller::new(record, options, TaskQueue::new())
    }

    fn signup() -> Record {
        Record::from_json(&json!({"name": "", "age": 30}))
            .unwrap()
            .with_validation(
                Validation::new()
                    .attr("name", RuleDecl::validator("required", true))
                    .attr("age", RuleDecl::validator("min", 18)),
            )
    }

    #[test]
    fn validate_all_notifies_every_declared_attribute() {
        let render = RecordingRender::new();
        let ctl = controller(signup(), &render);

        let invalid = ctl.validate(None, &Options::new()).unwrap();

        assert_eq!(invalid, Some(InvalidAttrs::from([("name".into(), "name is required".into())])));
        assert_eq!(
            render.take(),
            vec![Rendered::invalid("name", "name is required"), Rendered::valid("age")]
        );
        assert!(!ctl.is_valid(ValidityQuery::Stored).unwrap());
    }

    #[test]
    fn changed_attributes_only_notify_themselves() {
        let render = RecordingRender::new();
        let ctl = controller(signup(), &render);

        let invalid = ctl.validate(Some(&attrs(json!({"age": 12}))), &Options::new()).unwrap();

        assert_eq!(
            invalid,
            Some(InvalidAttrs::from([
                ("age".into(), "age must be greater than or equal to 18".into()),
                ("name".into(), "name is required".into()),
            ]))
        );
        assert_eq!(
            render.take(),
            vec![Rendered::invalid("age", "age must be greater than or equal to 18")]
        );
    }

    #[test]
    fn invalid_attrs_outside_the_change_are_not_returned() {
        let render = RecordingRender::new();
        let ctl = controller(signup(), &render);

        let invalid = ctl.validate(Some(&attrs(json!({"age": 40}))), &Options::new()).unwrap();

        assert_eq!(invalid, None);
        assert!(!ctl.is_valid(ValidityQuery::Stored).unwrap());
        assert_eq!(render.take(), vec![Rendered::valid("age")]);
    }

    #[test]
    fn validate_does_not_modify_the_model() {
        let record = signup();
        let ctl = controller(record.clone(), &RecordingRender::new());
        ctl.validate(Some(&attrs(json!({"age": 12}))), &Options::new()).unwrap();
        assert_eq!(record.get("age"), Some(json!(30)));
    }

    #[test]
    fn set_applies_only_valid_changes() {
        let record = signup();
        let ctl = controller(record.clone(), &RecordingRender::new());

        assert!(ctl.set(attrs(json!({"age": 12})), &Options::new()).unwrap().is_some());
        assert_eq!(record.get("age"), Some(json!(30)));

        assert!(ctl.set(attrs(json!({"age": 21})), &Options::new()).unwrap().is_none());
        assert_eq!(record.get("age"), Some(json!(21)));
    }

    #[test]
    fn force_update_suppresses_return_value() {
        let ctl = controller(signup(), &RecordingRender::new());
        let invalid = ctl
            .validate(Some(&attrs(json!({"age": 1}))), &Options::new().force_update(true))
            .unwrap();
        assert_eq!(invalid, None);
        assert!(!ctl.is_valid(ValidityQuery::Stored).unwrap());
    }

    #[test]
    fn silent_suppresses_all_notifications() {
        let render = RecordingRender::new();
        let ctl = controller(signup(), &render);

        ctl.validate(None, &Options::new().silent(true)).unwrap();

        assert!(render.is_empty());
        assert_eq!(ctl.queue().flush(), 0);
    }

    #[test]
    fn summary_events_wait_for_the_queue() {
        let record = signup();
        let mut rx = record.events().subscribe();
        let ctl = controller(record, &RecordingRender::new());

        ctl.validate(None, &Options::new()).unwrap();
        assert!(drain(&mut rx).is_empty());

        assert_eq!(ctl.queue().flush(), 1);
        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], ModelEvent::Validated { is_valid: false, .. }));
        assert!(matches!(&events[1], ModelEvent::ValidatedInvalid { invalid_attrs, .. }
            if invalid_attrs.contains_key("name")));
    }

    #[test]
    fn pre_validate_is_side_effect_free() {
        let record = signup();
        let mut rx = record.events().subscribe();
        let render = RecordingRender::new();
        let ctl = controller(record, &render);

        assert_eq!(
            ctl.pre_validate("age", &json!(3)).unwrap(),
            Some("age must be greater than or equal to 18".into())
        );
        assert_eq!(ctl.pre_validate("age", &json!(30)).unwrap(), None);
        assert_eq!(ctl.pre_validate("undeclared", &json!(1)).unwrap(), None);

        assert!(render.is_empty());
        assert!(ctl.queue().is_empty());
        assert!(drain(&mut rx).is_empty());
        assert!(!ctl.is_valid(ValidityQuery::Stored).unwrap());
    }

    #[test]
    fn pre_validate_all_returns_none_when_clean() {
        let ctl = controller(signup(), &RecordingRender::new());
        assert_eq!(ctl.pre_validate_all(&attrs(json!({"name": "Ada", "age": 20}))).unwrap(), None);
        assert_eq!(
            ctl.pre_validate_all(&attrs(json!({"name": "", "age": 20}))).unwrap(),
            Some(InvalidAttrs::from([("name".into(), "name is required".into())]))
        );
    }

    #[test]
    fn is_valid_forms() {
        let ctl = controller(signup(), &RecordingRender::new());

        assert!(!ctl.is_valid("name").unwrap());
        assert!(ctl.is_valid("age").unwrap());
        assert!(!ctl.is_valid(["name", "age"]).unwrap());
        assert!(ctl.is_valid(vec!["age"]).unwrap());
        assert!(!ctl.is_valid(false).unwrap());
        assert!(!ctl.is_valid(ValidityQuery::Stored).unwrap());
        assert!(!ctl.is_valid(true).unwrap());

        ctl.model().set("name", "Ada");
        assert!(ctl.is_valid(false).unwrap());
        assert!(!ctl.is_valid(ValidityQuery::Stored).unwrap());
        assert!(ctl.is_valid(true).unwrap());
    }

    #[test]
    fn model_without_validation_is_valid() {
        let ctl = controller(Record::from_json(&json!({"a": 1})).unwrap(), &RecordingRender::new());
        assert!(ctl.is_valid(ValidityQuery::Stored).unwrap());
        assert_eq!(ctl.validate(None, &Options::new()).unwrap(), None);
        assert!(ctl.is_valid(ValidityQuery::Stored).unwrap());
    }

    #[test]
    fn nested_attributes_validate_by_dot_path() {
        let record = Record::from_json(&json!({"address": {"city": ""}}))
            .unwrap()
            .with_validation(Validation::new().attr("address.city", RuleDecl::validator("required", true)));
        let render = RecordingRender::new();
        let ctl = controller(record, &render);

        let invalid = ctl
            .validate(Some(&attrs(json!({"address": {"city": ""}}))), &Options::new())
            .unwrap();
        assert_eq!(
            invalid,
            Some(InvalidAttrs::from([("address.city".into(), "address.city is required".into())]))
        );
        assert_eq!(
            render.take(),
            vec![Rendered::invalid("address.city", "address.city is required")]
        );
        assert!(ctl.is_valid("address.city").is_ok_and(|valid| !valid));
    }
}
