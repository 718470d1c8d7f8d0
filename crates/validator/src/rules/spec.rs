//! Rule declarations as authored on a model type
//!
//! A [`Validation`] maps attribute names to a [`RuleSpec`]. Specs are plain
//! data plus optional closures; they are normalized afresh on every
//! validation pass so a model may change its declaration at runtime.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use smallvec::SmallVec;

use crate::foundation::{Attributes, ConfigError, Result};
use crate::validators::{FnArgs, Outcome};

/// Ad-hoc validation function, used for `fn` rules.
pub type CustomFn = Arc<dyn Fn(&FnArgs<'_>) -> Outcome + Send + Sync>;

/// Parameter computed at evaluation time from `(value, attr, computed)`.
pub type ParamFn = Arc<dyn Fn(&Value, &str, &Attributes) -> Value + Send + Sync>;

/// Produces message placeholders from `(param, value)`.
pub type PlaceholderFn = Arc<dyn Fn(&Value, &Value) -> Vec<Value> + Send + Sync>;

// ============================================================================
// PARAM
// ============================================================================

/// A validator parameter.
#[derive(Clone)]
pub enum Param {
    /// A literal value.
    Value(Value),
    /// A value computed when the rule runs (e.g. a conditional `required`).
    Deferred(ParamFn),
    /// A function to call, only meaningful for `fn` rules.
    Func(CustomFn),
}

impl Param {
    /// Wraps a closure computing the parameter at evaluation time.
    pub fn deferred<F>(f: F) -> Self
    where
        F: Fn(&Value, &str, &Attributes) -> Value + Send + Sync + 'static,
    {
        Self::Deferred(Arc::new(f))
    }

    /// Wraps a closure used as an `fn` validator.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&FnArgs<'_>) -> Outcome + Send + Sync + 'static,
    {
        Self::Func(Arc::new(f))
    }

    /// Resolves the parameter against the value being validated.
    ///
    /// Functions used as `fn` validators resolve to `null`.
    #[must_use]
    pub fn resolve(&self, value: &Value, attr: &str, computed: &Attributes) -> Value {
        match self {
            Self::Value(v) => v.clone(),
            Self::Deferred(f) => f(value, attr, computed),
            Self::Func(_) => Value::Null,
        }
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
            Self::Func(_) => f.write_str("Func(..)"),
        }
    }
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

macro_rules! param_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Param {
                fn from(value: $ty) -> Self {
                    Self::Value(Value::from(value))
                }
            }
        )*
    };
}

param_from!(bool, i32, i64, u32, u64, f64, &str, String, Vec<Value>);

impl<const N: usize> From<[i32; N]> for Param {
    fn from(values: [i32; N]) -> Self {
        Self::Value(Value::from(values.to_vec()))
    }
}

impl<const N: usize> From<[&str; N]> for Param {
    fn from(values: [&str; N]) -> Self {
        Self::Value(Value::from(values.to_vec()))
    }
}

// ============================================================================
// PLACEHOLDERS
// ============================================================================

/// Override for the placeholders substituted after the label in a custom
/// message.
#[derive(Clone)]
pub enum Placeholders {
    /// Replaces the parameter slots; the attribute value is still appended.
    Literal(Value),
    /// Replaces both the parameter slots and the value slot.
    Func(PlaceholderFn),
}

impl fmt::Debug for Placeholders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Self::Func(_) => f.write_str("Func(..)"),
        }
    }
}

// ============================================================================
// RULE DECLARATION
// ============================================================================

/// One rule object: one or more validators sharing a message, dependency
/// list and placeholder override.
#[derive(Debug, Clone, Default)]
pub struct RuleDecl {
    pub(crate) validators: SmallVec<[(String, Param); 1]>,
    pub(crate) msg: Option<String>,
    pub(crate) depends: SmallVec<[String; 2]>,
    pub(crate) label_placeholders: Option<Placeholders>,
}

impl RuleDecl {
    /// Creates an empty rule object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a rule object with a single validator.
    pub fn validator(name: impl Into<String>, param: impl Into<Param>) -> Self {
        Self::new().with(name, param)
    }

    /// Adds a validator; validators in one object run in insertion order.
    #[must_use = "builder methods must be chained or built"]
    pub fn with(mut self, name: impl Into<String>, param: impl Into<Param>) -> Self {
        self.validators.push((name.into(), param.into()));
        self
    }

    /// Sets a custom failure message.
    #[must_use = "builder methods must be chained or built"]
    pub fn msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }

    /// Declares attributes whose change re-notifies this attribute.
    #[must_use = "builder methods must be chained or built"]
    pub fn depends<I, S>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends.extend(attrs.into_iter().map(Into::into));
        self
    }

    /// Overrides the parameter placeholders with a literal (or list).
    #[must_use = "builder methods must be chained or built"]
    pub fn label_placeholders(mut self, placeholders: impl Into<Value>) -> Self {
        self.label_placeholders = Some(Placeholders::Literal(placeholders.into()));
        self
    }

    /// Overrides all placeholders with a function of `(param, value)`.
    #[must_use = "builder methods must be chained or built"]
    pub fn label_placeholders_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Vec<Value> + Send + Sync + 'static,
    {
        self.label_placeholders = Some(Placeholders::Func(Arc::new(f)));
        self
    }

    /// Names of the validators declared in this object.
    pub fn validator_names(&self) -> impl Iterator<Item = &str> {
        self.validators.iter().map(|(name, _)| name.as_str())
    }

    fn from_json(attr: &str, object: &serde_json::Map<String, Value>) -> Result<Self> {
        let mut decl = Self::new();
        for (key, value) in object {
            match key.as_str() {
                "msg" => {
                    let msg = value.as_str().ok_or_else(|| ConfigError::InvalidDeclaration {
                        attr: attr.to_owned(),
                        reason: "`msg` must be a string".into(),
                    })?;
                    decl.msg = Some(msg.to_owned());
                }
                "depends" => decl.depends.extend(depends_from_json(attr, value)?),
                "labelPlaceholders" => {
                    decl.label_placeholders = Some(Placeholders::Literal(value.clone()));
                }
                name => decl.validators.push((name.to_owned(), Param::Value(value.clone()))),
            }
        }
        Ok(decl)
    }
}

fn depends_from_json(attr: &str, value: &Value) -> Result<Vec<String>> {
    let invalid = || ConfigError::InvalidDeclaration {
        attr: attr.to_owned(),
        reason: "`depends` must be a string or a list of strings".into(),
    };
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_owned).ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

// ============================================================================
// RULE SPEC
// ============================================================================

/// Everything declared for one attribute.
#[derive(Clone)]
pub enum RuleSpec {
    /// Name of a model method, run as an `fn` rule.
    Method(String),
    /// A function, run as an `fn` rule.
    Func(CustomFn),
    /// Rule objects in evaluation order.
    Rules(Vec<RuleDecl>),
}

impl RuleSpec {
    /// Wraps a closure as an `fn` rule.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&FnArgs<'_>) -> Outcome + Send + Sync + 'static,
    {
        Self::Func(Arc::new(f))
    }

    /// Builds a spec from its JSON form: a string names a model method, an
    /// object is a single rule object, and an array is a list of them.
    pub fn from_json(attr: &str, value: &Value) -> Result<Self> {
        match value {
            Value::String(name) => Ok(Self::Method(name.clone())),
            Value::Object(object) => Ok(Self::Rules(vec![RuleDecl::from_json(attr, object)?])),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Object(object) => RuleDecl::from_json(attr, object),
                    _ => Err(ConfigError::InvalidDeclaration {
                        attr: attr.to_owned(),
                        reason: "rule lists may only contain objects".into(),
                    }),
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::Rules),
            _ => Err(ConfigError::InvalidDeclaration {
                attr: attr.to_owned(),
                reason: "expected a method name, a rule object or a list of rule objects".into(),
            }),
        }
    }
}

impl fmt::Debug for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method(name) => f.debug_tuple("Method").field(name).finish(),
            Self::Func(_) => f.write_str("Func(..)"),
            Self::Rules(rules) => f.debug_tuple("Rules").field(rules).finish(),
        }
    }
}

impl From<RuleDecl> for RuleSpec {
    fn from(decl: RuleDecl) -> Self {
        Self::Rules(vec![decl])
    }
}

impl From<Vec<RuleDecl>> for RuleSpec {
    fn from(decls: Vec<RuleDecl>) -> Self {
        Self::Rules(decls)
    }
}

impl From<&str> for RuleSpec {
    fn from(method: &str) -> Self {
        Self::Method(method.to_owned())
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// The per-attribute rule declarations of a model type, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Validation {
    attrs: IndexMap<String, RuleSpec>,
}

impl Validation {
    /// Creates an empty declaration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the rules of an attribute, replacing any earlier declaration.
    #[must_use = "builder methods must be chained or built"]
    pub fn attr(mut self, name: impl Into<String>, spec: impl Into<RuleSpec>) -> Self {
        self.insert(name, spec);
        self
    }

    /// Declares the rules of an attribute in place.
    pub fn insert(&mut self, name: impl Into<String>, spec: impl Into<RuleSpec>) {
        self.attrs.insert(name.into(), spec.into());
    }

    /// Removes an attribute's declaration.
    pub fn remove(&mut self, name: &str) -> Option<RuleSpec> {
        self.attrs.shift_remove(name)
    }

    /// Returns an attribute's declaration.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RuleSpec> {
        self.attrs.get(name)
    }

    /// Mutable access to an attribute's declaration.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut RuleSpec> {
        self.attrs.get_mut(name)
    }

    /// Declared attribute names, in declaration order.
    pub fn attrs(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }

    /// Iterates declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleSpec)> {
        self.attrs.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Number of declared attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Builds a declaration from a JSON object keyed by attribute name.
    ///
    /// ```
    /// use serde_json::json;
    /// use verity_validator::rules::Validation;
    ///
    /// let validation = Validation::from_json(&json!({
    ///     "name": {"required": true, "msg": "Please enter a name"},
    ///     "age": [{"required": true}, {"range": [18, 99]}],
    ///     "email": "checkEmail",
    /// }))
    /// .unwrap();
    /// assert_eq!(validation.len(), 3);
    /// ```
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| ConfigError::InvalidDeclaration {
            attr: String::new(),
            reason: "a validation declaration must be a JSON object".into(),
        })?;
        let mut validation = Self::new();
        for (attr, spec) in object {
            validation.insert(attr.clone(), RuleSpec::from_json(attr, spec)?);
        }
        Ok(validation)
    }
}
