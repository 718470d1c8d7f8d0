//! Numeric validators: `min`, `max` and `range`
//!
//! A value is numeric when it is a JSON number or a string matching the
//! `number` pattern. Thousands separators are dropped before comparing.

use serde_json::Value;

use super::pattern::NUMBER;
use super::{Outcome, ValidatorArgs};
use crate::foundation::{ConfigError, Result, display};

/// Reads a value as a number, accepting numeric strings.
#[must_use]
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if NUMBER.is_match(s) => s.replace(',', "").parse().ok(),
        _ => None,
    }
}

fn bound(validator: &str, param: &Value) -> Result<f64> {
    as_number(param).ok_or_else(|| ConfigError::invalid_param(validator, "expected a number"))
}

fn bounds(validator: &str, param: &Value) -> Result<(Value, Value, f64, f64)> {
    match param.as_array().map(Vec::as_slice) {
        Some([lo, hi]) => Ok((lo.clone(), hi.clone(), bound(validator, lo)?, bound(validator, hi)?)),
        _ => Err(ConfigError::invalid_param(validator, "expected [lo, hi]")),
    }
}

/// `min`: numeric and not below the parameter.
pub fn min(args: &ValidatorArgs<'_>) -> Result<Outcome> {
    let min = bound("min", args.param)?;
    Ok(match as_number(args.value) {
        Some(n) if n >= min => Outcome::Pass,
        _ => args.fail_with("min", [display(args.param)]),
    })
}

/// `max`: numeric and not above the parameter.
pub fn max(args: &ValidatorArgs<'_>) -> Result<Outcome> {
    let max = bound("max", args.param)?;
    Ok(match as_number(args.value) {
        Some(n) if n <= max => Outcome::Pass,
        _ => args.fail_with("max", [display(args.param)]),
    })
}

/// `range`: numeric and within `[lo, hi]` inclusive.
pub fn range(args: &ValidatorArgs<'_>) -> Result<Outcome> {
    let (lo, hi, min, max) = bounds("range", args.param)?;
    Ok(match as_number(args.value) {
        Some(n) if n >= min && n <= max => Outcome::Pass,
        _ => args.fail_with("range", [display(&lo), display(&hi)]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::Attributes;
    use crate::validators::Builtin;
    use crate::validators::test_support::check;
    use rstest::rstest;
    use serde_json::json;

    fn run(builtin: Builtin, value: Value, param: Value) -> Result<Outcome> {
        check(builtin, &value, &param, &Attributes::new())
    }

    #[rstest]
    #[case(json!(5), Some(5.0))]
    #[case(json!(-2.5), Some(-2.5))]
    #[case(json!("42"), Some(42.0))]
    #[case(json!("-1,000.5"), Some(-1000.5))]
    #[case(json!("4 2"), None)]
    #[case(json!(true), None)]
    #[case(json!(null), None)]
    fn numeric_coercion(#[case] value: Value, #[case] expected: Option<f64>) {
        assert_eq!(as_number(&value), expected);
    }

    #[rstest]
    #[case(json!(1), true)]
    #[case(json!(0), false)]
    #[case(json!("1"), true)]
    #[case(json!("abc"), false)]
    fn min_cases(#[case] value: Value, #[case] passes: bool) {
        let outcome = run(Builtin::Min, value, json!(1)).unwrap();
        assert_eq!(outcome.is_pass(), passes);
    }

    #[test]
    fn min_message() {
        assert_eq!(
            run(Builtin::Min, json!(0), json!(1)).unwrap(),
            Outcome::fail("attr must be greater than or equal to 1")
        );
    }

    #[test]
    fn max_message() {
        assert_eq!(
            run(Builtin::Max, json!(100), json!(42)).unwrap(),
            Outcome::fail("attr must be less than or equal to 42")
        );
        assert_eq!(run(Builtin::Max, json!(42), json!(42)).unwrap(), Outcome::Pass);
    }

    #[rstest]
    #[case(json!(10), true)]
    #[case(json!(15), true)]
    #[case(json!(12.5), true)]
    #[case(json!(9), false)]
    #[case(json!(16), false)]
    #[case(json!("x"), false)]
    fn range_is_inclusive(#[case] value: Value, #[case] passes: bool) {
        let outcome = run(Builtin::Range, value, json!([10, 15])).unwrap();
        if passes {
            assert_eq!(outcome, Outcome::Pass);
        } else {
            assert_eq!(outcome, Outcome::fail("attr must be between 10 and 15"));
        }
    }

    #[test]
    fn malformed_params_are_configuration_errors() {
        assert!(run(Builtin::Min, json!(1), json!("lots")).is_err());
        assert!(run(Builtin::Range, json!(1), json!([1])).is_err());
        assert!(run(Builtin::Range, json!(1), json!(5)).is_err());
    }
}
