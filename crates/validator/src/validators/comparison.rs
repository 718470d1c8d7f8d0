//! Comparison validators: `oneOf` and `equalTo`

use serde_json::Value;

use super::{Outcome, ValidatorArgs};
use crate::foundation::{ConfigError, Result, display, lookup, strict_eq};

/// `oneOf`: the value strictly equals one of the listed values.
pub fn one_of(args: &ValidatorArgs<'_>) -> Result<Outcome> {
    let options = args
        .param
        .as_array()
        .ok_or_else(|| ConfigError::invalid_param("oneOf", "expected a list of values"))?;

    if options.iter().any(|option| strict_eq(option, args.value)) {
        return Ok(Outcome::Pass);
    }
    let listed = options.iter().map(display).collect::<Vec<_>>().join(", ");
    Ok(args.fail_with("oneOf", [listed]))
}

/// `equalTo`: the value strictly equals the attribute named by the parameter.
///
/// The other attribute is read from the state being validated, so a pending
/// change to it is taken into account.
pub fn equal_to(args: &ValidatorArgs<'_>) -> Result<Outcome> {
    let other = args
        .param
        .as_str()
        .ok_or_else(|| ConfigError::invalid_param("equalTo", "expected an attribute name"))?;

    let other_value = lookup(args.computed, other).unwrap_or(&Value::Null);
    if strict_eq(args.value, other_value) {
        return Ok(Outcome::Pass);
    }
    Ok(args.fail_with("equalTo", [args.label(other)]))
}
