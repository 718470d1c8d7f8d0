//! Rule evaluation
//!
//! Runs one attribute's normalized rules in order against a candidate value
//! and resolves the message of the first failure.

use serde_json::Value;

use crate::foundation::value::spread_into;
use crate::foundation::{Attributes, Result, display, lookup};
use crate::message::{self, LabelFormatter, Labels};
use crate::rules::{CustomFn, Placeholders, Rule, Validation, rules_for};
use crate::validators::{Catalog, FnArgs, Outcome, ValidatorArgs, ValidatorRef, custom};

/// Everything besides the rules themselves that evaluation reads.
pub struct EvalContext<'a> {
    /// Validators, messages and named patterns.
    pub catalog: &'a Catalog,
    /// Label strategy for message placeholders.
    pub formatter: &'a LabelFormatter,
    /// The model's label overrides.
    pub labels: Option<&'a Labels>,
    /// Resolves model method names used by `fn` rules.
    pub methods: &'a dyn Fn(&str) -> Option<CustomFn>,
}

impl std::fmt::Debug for EvalContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvalContext")
            .field("catalog", self.catalog)
            .field("formatter", self.formatter)
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

/// Validates `value` as `attr` against the declared rules.
///
/// Returns `Ok(None)` when the value is valid, when the attribute declares
/// no rules, or when a rule halts evaluation with [`Outcome::HardFail`].
/// Otherwise returns the message of the first failing rule; later rules of
/// the attribute are not run.
pub fn evaluate(
    ctx: &EvalContext<'_>,
    validation: &Validation,
    attr: &str,
    value: &Value,
    computed: &Attributes,
) -> Result<Option<String>> {
    for rule in rules_for(validation, attr, ctx.catalog)? {
        let param = rule.param.resolve(value, attr, computed);
        let depends = pick(computed, &rule.depends);
        let fn_args = FnArgs {
            value,
            attr,
            computed,
            depends: &depends,
        };

        let outcome = match &rule.validator {
            ValidatorRef::Func => custom::call(&rule.param, &param, &fn_args, ctx.methods)?,
            ValidatorRef::Builtin(builtin) => builtin.check(&validator_args(ctx, fn_args, &param))?,
            ValidatorRef::Custom { check, .. } => check(&validator_args(ctx, fn_args, &param)),
        };

        match outcome {
            Outcome::HardFail => return Ok(None),
            Outcome::Fail(message) if !message.is_empty() => {
                return Ok(Some(resolve_message(ctx, &rule, attr, &param, value, message)));
            }
            Outcome::Pass | Outcome::Fail(_) => {}
        }
    }
    Ok(None)
}

fn validator_args<'a>(
    ctx: &EvalContext<'a>,
    fn_args: FnArgs<'a>,
    param: &'a Value,
) -> ValidatorArgs<'a> {
    ValidatorArgs::new(fn_args, param, ctx.catalog, ctx.formatter, ctx.labels)
}

/// The subset of `computed` named by `names`; names absent from `computed`
/// are left out.
fn pick(computed: &Attributes, names: &[String]) -> Attributes {
    names
        .iter()
        .filter_map(|name| lookup(computed, name).map(|value| (name.clone(), value.clone())))
        .collect()
}

/// A declared `msg` replaces the validator's own message. Its placeholders
/// are the label, then the parameter (or its override), then the value.
fn resolve_message(
    ctx: &EvalContext<'_>,
    rule: &Rule,
    attr: &str,
    param: &Value,
    value: &Value,
    fallback: String,
) -> String {
    let Some(template) = &rule.msg else {
        return fallback;
    };

    let mut placeholders = Vec::new();
    match &rule.label_placeholders {
        Some(Placeholders::Func(f)) => placeholders = f(param, value),
        Some(Placeholders::Literal(literal)) => {
            spread_into(&mut placeholders, literal);
            placeholders.push(value.clone());
        }
        None => {
            spread_into(&mut placeholders, param);
            placeholders.push(value.clone());
        }
    }

    let args: Vec<String> = std::iter::once(ctx.formatter.format_label(attr, ctx.labels))
        .chain(placeholders.iter().map(display))
        .collect();
    message::format(template, &args)
}
