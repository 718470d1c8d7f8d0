//! Validator catalog
//!
//! Every validator is a named predicate over the value being validated, its
//! attribute name, the rule parameter and the surrounding model state. It
//! answers with an [`Outcome`].
//!
//! ## Built-in validators
//!
//! - **Presence**: `required`, `acceptance`
//! - **Numeric**: `min`, `max`, `range`
//! - **Length**: `length`, `minLength`, `maxLength`, `rangeLength`
//! - **Comparison**: `oneOf`, `equalTo`
//! - **Pattern**: `pattern` (named patterns `digits`, `number`, `email`, `url`,
//!   or an inline regex)
//! - **Dispatch**: `fn` (a model method or a closure)
//!
//! A [`Catalog`] holds the default messages and named patterns, and may
//! register additional validators by name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::foundation::{Attributes, ConfigError, Result};
use crate::message::{self, LabelFormatter, Labels};

pub mod comparison;
pub mod custom;
pub mod length;
pub mod numeric;
pub mod pattern;
pub mod presence;

// ============================================================================
// OUTCOME
// ============================================================================

/// The answer of a single validator.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// The value satisfies the rule.
    Pass,
    /// The value fails the rule with this message.
    Fail(String),
    /// Stop evaluating the attribute's remaining rules without reporting a
    /// failure. `required` answers this for an empty value that is not
    /// required.
    HardFail,
}

impl Outcome {
    /// Creates a failure with the given message.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }

    /// Whether this is [`Outcome::Pass`] or a failure with an empty message.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        match self {
            Self::Pass => true,
            Self::Fail(message) => message.is_empty(),
            Self::HardFail => false,
        }
    }
}

impl From<Option<String>> for Outcome {
    fn from(message: Option<String>) -> Self {
        message.map_or(Self::Pass, Self::Fail)
    }
}

impl From<&str> for Outcome {
    fn from(message: &str) -> Self {
        Self::Fail(message.to_owned())
    }
}

// ============================================================================
// ARGUMENTS
// ============================================================================

/// Arguments passed to `fn` validators (model methods and closures).
#[derive(Debug, Clone, Copy)]
pub struct FnArgs<'a> {
    /// The value being validated.
    pub value: &'a Value,
    /// The attribute name.
    pub attr: &'a str,
    /// The full (unflattened) attribute state being validated against.
    pub computed: &'a Attributes,
    /// The subset of `computed` named by the rule's `depends`.
    pub depends: &'a Attributes,
}

/// Arguments passed to built-in and registered validators.
#[derive(Clone, Copy)]
pub struct ValidatorArgs<'a> {
    /// The value being validated.
    pub value: &'a Value,
    /// The attribute name.
    pub attr: &'a str,
    /// The resolved rule parameter.
    pub param: &'a Value,
    /// The full (unflattened) attribute state being validated against.
    pub computed: &'a Attributes,
    /// The subset of `computed` named by the rule's `depends`.
    pub depends: &'a Attributes,
    catalog: &'a Catalog,
    formatter: &'a LabelFormatter,
    labels: Option<&'a Labels>,
}

impl<'a> ValidatorArgs<'a> {
    pub(crate) fn new(
        fn_args: FnArgs<'a>,
        param: &'a Value,
        catalog: &'a Catalog,
        formatter: &'a LabelFormatter,
        labels: Option<&'a Labels>,
    ) -> Self {
        Self {
            value: fn_args.value,
            attr: fn_args.attr,
            param,
            computed: fn_args.computed,
            depends: fn_args.depends,
            catalog,
            formatter,
            labels,
        }
    }

    /// Formats an attribute name with the active label strategy.
    #[must_use]
    pub fn label(&self, attr: &str) -> String {
        self.formatter.format_label(attr, self.labels)
    }

    /// Substitutes positional placeholders in `template`.
    #[must_use]
    pub fn format<S: AsRef<str>>(&self, template: &str, args: &[S]) -> String {
        message::format(template, args)
    }

    /// Fails with the catalog message `key`, the attribute label as `{0}` and
    /// `params` as `{1}`, `{2}`, ...
    pub fn fail_with<I>(&self, key: &str, params: I) -> Outcome
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = vec![self.label(self.attr)];
        args.extend(params);
        Outcome::Fail(message::format(self.catalog.message(key), &args))
    }

    /// The catalog the validator runs against.
    #[must_use]
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }
}

impl fmt::Debug for ValidatorArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorArgs")
            .field("value", self.value)
            .field("attr", &self.attr)
            .field("param", self.param)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// BUILT-INS
// ============================================================================

/// The built-in validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// Value must be present when the parameter is truthy.
    Required,
    /// Value must be `true` or `"true"`.
    Acceptance,
    /// Numeric value must be at least the parameter.
    Min,
    /// Numeric value must be at most the parameter.
    Max,
    /// Numeric value must lie within `[lo, hi]`.
    Range,
    /// String length must equal the parameter.
    Length,
    /// String length must be at least the parameter.
    MinLength,
    /// String length must be at most the parameter.
    MaxLength,
    /// String length must lie within `[lo, hi]`.
    RangeLength,
    /// Value must be a member of the parameter list.
    OneOf,
    /// Value must equal the attribute named by the parameter.
    EqualTo,
    /// Value must match a named or inline pattern.
    Pattern,
}

impl Builtin {
    /// All built-ins, in catalog order.
    pub const ALL: [Self; 12] = [
        Self::Required,
        Self::Acceptance,
        Self::Min,
        Self::Max,
        Self::Range,
        Self::Length,
        Self::MinLength,
        Self::MaxLength,
        Self::RangeLength,
        Self::OneOf,
        Self::EqualTo,
        Self::Pattern,
    ];

    /// The name used in rule declarations.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Acceptance => "acceptance",
            Self::Min => "min",
            Self::Max => "max",
            Self::Range => "range",
            Self::Length => "length",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::RangeLength => "rangeLength",
            Self::OneOf => "oneOf",
            Self::EqualTo => "equalTo",
            Self::Pattern => "pattern",
        }
    }

    /// Looks up a built-in by its declaration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Runs the validator.
    pub fn check(self, args: &ValidatorArgs<'_>) -> Result<Outcome> {
        match self {
            Self::Required => Ok(presence::required(args)),
            Self::Acceptance => Ok(presence::acceptance(args)),
            Self::Min => numeric::min(args),
            Self::Max => numeric::max(args),
            Self::Range => numeric::range(args),
            Self::Length => length::length(args),
            Self::MinLength => length::min_length(args),
            Self::MaxLength => length::max_length(args),
            Self::RangeLength => length::range_length(args),
            Self::OneOf => comparison::one_of(args),
            Self::EqualTo => comparison::equal_to(args),
            Self::Pattern => pattern::pattern(args),
        }
    }
}

/// A registered validator.
pub type CustomValidator = Arc<dyn Fn(&ValidatorArgs<'_>) -> Outcome + Send + Sync>;

/// A resolved catalog entry.
#[derive(Clone)]
pub enum ValidatorRef {
    /// The `fn` dispatcher.
    Func,
    /// A built-in validator.
    Builtin(Builtin),
    /// A validator registered on the catalog.
    Custom {
        /// Registration name
        name: String,
        /// The validator
        check: CustomValidator,
    },
}

impl ValidatorRef {
    /// The declaration name of the entry.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Func => "fn",
            Self::Builtin(builtin) => builtin.name(),
            Self::Custom { name, .. } => name,
        }
    }
}

impl fmt::Debug for ValidatorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Func => f.write_str("Func"),
            Self::Builtin(builtin) => f.debug_tuple("Builtin").field(builtin).finish(),
            Self::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
        }
    }
}

// ============================================================================
// CATALOG
// ============================================================================

const FALLBACK_MESSAGE: &str = "{0} is invalid";

/// Default messages, keyed by validator or pattern name.
pub const DEFAULT_MESSAGES: [(&str, &str); 16] = [
    ("required", "{0} is required"),
    ("acceptance", "{0} must be accepted"),
    ("min", "{0} must be greater than or equal to {1}"),
    ("max", "{0} must be less than or equal to {1}"),
    ("range", "{0} must be between {1} and {2}"),
    ("length", "{0} must be {1} characters"),
    ("minLength", "{0} must be at least {1} characters"),
    ("maxLength", "{0} must be at most {1} characters"),
    ("rangeLength", "{0} must be between {1} and {2} characters"),
    ("oneOf", "{0} must be one of: {1}"),
    ("equalTo", "{0} must be the same as {1}"),
    ("digits", "{0} must only contain digits"),
    ("number", "{0} must be a number"),
    ("email", "{0} must be a valid email"),
    ("url", "{0} must be a valid url"),
    ("inlinePattern", FALLBACK_MESSAGE),
];

/// Validators, messages and named patterns available to rule declarations.
///
/// ```
/// use verity_validator::validators::{Catalog, Outcome};
///
/// let catalog = Catalog::default()
///     .with_message("required", "{0} cannot be blank")
///     .register("even", |args| match args.value.as_i64() {
///         Some(n) if n % 2 == 0 => Outcome::Pass,
///         _ => args.fail_with("even", []),
///     })
///     .with_message("even", "{0} must be even");
/// assert!(catalog.resolve("even").is_some());
/// ```
#[derive(Clone)]
pub struct Catalog {
    messages: BTreeMap<String, String>,
    patterns: BTreeMap<String, Regex>,
    custom: BTreeMap<String, CustomValidator>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            messages: DEFAULT_MESSAGES
                .iter()
                .map(|(key, template)| ((*key).to_owned(), (*template).to_owned()))
                .collect(),
            patterns: pattern::builtin_patterns(),
            custom: BTreeMap::new(),
        }
    }
}

impl Catalog {
    /// Resolves a declaration name. Registered validators shadow built-ins.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<ValidatorRef> {
        if let Some(check) = self.custom.get(name) {
            return Some(ValidatorRef::Custom {
                name: name.to_owned(),
                check: check.clone(),
            });
        }
        if name == "fn" {
            return Some(ValidatorRef::Func);
        }
        Builtin::from_name(name).map(ValidatorRef::Builtin)
    }

    /// Registers a validator under `name`.
    #[must_use = "builder methods must be chained or built"]
    pub fn register<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&ValidatorArgs<'_>) -> Outcome + Send + Sync + 'static,
    {
        self.custom.insert(name.into(), Arc::new(check));
        self
    }

    /// Overrides or adds a message template.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(key.into(), template.into());
        self
    }

    /// Overrides or adds a named pattern.
    pub fn with_pattern(mut self, name: impl Into<String>, source: &str) -> Result<Self> {
        let regex = Regex::new(source).map_err(|e| ConfigError::invalid_pattern(source, &e))?;
        self.patterns.insert(name.into(), regex);
        Ok(self)
    }

    /// The message template for `key`, or `"{0} is invalid"`.
    #[must_use]
    pub fn message(&self, key: &str) -> &str {
        self.messages.get(key).map_or(FALLBACK_MESSAGE, String::as_str)
    }

    /// Whether a message template is registered for `key`.
    #[must_use]
    pub fn has_message(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }

    /// The named pattern, if any.
    #[must_use]
    pub fn pattern(&self, name: &str) -> Option<&Regex> {
        self.patterns.get(name)
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("messages", &self.messages.len())
            .field("patterns", &self.patterns.keys().collect::<Vec<_>>())
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Runs a built-in against a value with the `none` label strategy.
    pub(crate) fn check(
        builtin: Builtin,
        value: &Value,
        param: &Value,
        computed: &Attributes,
    ) -> Result<Outcome> {
        let catalog = Catalog::default();
        let depends = Attributes::new();
        let fn_args = FnArgs {
            value,
            attr: "attr",
            computed,
            depends: &depends,
        };
        let args = ValidatorArgs::new(fn_args, param, &catalog, &LabelFormatter::None, None);
        builtin.check(&args)
    }
}
