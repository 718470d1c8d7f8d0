//! The `fn` validator
//!
//! An `fn` rule either carries its function directly or names a method on
//! the model. Methods are looked up through [`Model::method`].
//!
//! [`Model::method`]: crate::model::Model::method

use serde_json::Value;

use super::{FnArgs, Outcome};
use crate::foundation::{ConfigError, Result};
use crate::rules::{CustomFn, Param};

/// Runs an `fn` rule.
///
/// `resolved` is the parameter after deferred evaluation; a string there is
/// treated as a method name and looked up with `method`.
pub fn call(
    param: &Param,
    resolved: &Value,
    args: &FnArgs<'_>,
    method: &dyn Fn(&str) -> Option<CustomFn>,
) -> Result<Outcome> {
    if let Param::Func(f) = param {
        return Ok(f(args));
    }
    match resolved {
        Value::String(name) => {
            let f = method(name).ok_or_else(|| ConfigError::UnknownMethod {
                attr: args.attr.to_owned(),
                name: name.clone(),
            })?;
            Ok(f(args))
        }
        _ => Err(ConfigError::invalid_param(
            "fn",
            "expected a function or a method name",
        )),
    }
}
