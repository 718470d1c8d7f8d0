//! Length validators: `length`, `minLength`, `maxLength` and `rangeLength`
//!
//! Lengths count characters, not bytes. Values that are not strings fail.

use serde_json::Value;

use super::{Outcome, ValidatorArgs};
use crate::foundation::{ConfigError, Result, display};

fn char_len(value: &Value) -> Option<usize> {
    value.as_str().map(|s| s.chars().count())
}

fn limit(validator: &str, param: &Value) -> Result<usize> {
    param
        .as_u64()
        .or_else(|| {
            param
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        })
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| ConfigError::invalid_param(validator, "expected a non-negative integer"))
}

fn limits(validator: &str, param: &Value) -> Result<(usize, usize)> {
    match param.as_array().map(Vec::as_slice) {
        Some([lo, hi]) => Ok((limit(validator, lo)?, limit(validator, hi)?)),
        _ => Err(ConfigError::invalid_param(validator, "expected [lo, hi]")),
    }
}

fn check_len(
    args: &ValidatorArgs<'_>,
    key: &str,
    accept: impl Fn(usize) -> bool,
    params: Vec<String>,
) -> Outcome {
    match char_len(args.value) {
        Some(len) if accept(len) => Outcome::Pass,
        _ => args.fail_with(key, params),
    }
}

/// `length`: a string of exactly `param` characters.
pub fn length(args: &ValidatorArgs<'_>) -> Result<Outcome> {
    let n = limit("length", args.param)?;
    Ok(check_len(args, "length", |len| len == n, vec![display(args.param)]))
}

/// `minLength`: a string of at least `param` characters.
pub fn min_length(args: &ValidatorArgs<'_>) -> Result<Outcome> {
    let n = limit("minLength", args.param)?;
    Ok(check_len(args, "minLength", |len| len >= n, vec![display(args.param)]))
}

/// `maxLength`: a string of at most `param` characters.
pub fn max_length(args: &ValidatorArgs<'_>) -> Result<Outcome> {
    let n = limit("maxLength", args.param)?;
    Ok(check_len(args, "maxLength", |len| len <= n, vec![display(args.param)]))
}

/// `rangeLength`: a string whose length lies within `[lo, hi]`.
pub fn range_length(args: &ValidatorArgs<'_>) -> Result<Outcome> {
    let (lo, hi) = limits("rangeLength", args.param)?;
    Ok(check_len(
        args,
        "rangeLength",
        |len| (lo..=hi).contains(&len),
        vec![lo.to_string(), hi.to_string()],
    ))
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
    #[case(json!("abcd"), true)]
    #[case(json!("abc"), false)]
    #[case(json!("abcde"), false)]
    #[case(json!("åäöü"), true)]
    #[case(json!(1234), false)]
    fn exact_length(#[case] value: Value, #[case] passes: bool) {
        let outcome = run(Builtin::Length, value, json!(4)).unwrap();
        if passes {
            assert_eq!(outcome, Outcome::Pass);
        } else {
            assert_eq!(outcome, Outcome::fail("attr must be 4 characters"));
        }
    }

    #[rstest]
    #[case(Builtin::MinLength, json!("ab"), true)]
    #[case(Builtin::MinLength, json!("a"), false)]
    #[case(Builtin::MaxLength, json!("ab"), true)]
    #[case(Builtin::MaxLength, json!("abc"), false)]
    fn bounded_length(#[case] builtin: Builtin, #[case] value: Value, #[case] passes: bool) {
        let outcome = run(builtin, value, json!(2)).unwrap();
        assert_eq!(outcome.is_pass(), passes);
    }

    #[test]
    fn min_length_message() {
        assert_eq!(
            run(Builtin::MinLength, json!("a"), json!(2)).unwrap(),
            Outcome::fail("attr must be at least 2 characters")
        );
    }

    #[rstest]
    #[case(json!("ab"), true)]
    #[case(json!("abcd"), true)]
    #[case(json!("a"), false)]
    #[case(json!("abcde"), false)]
    fn range_length_is_inclusive(#[case] value: Value, #[case] passes: bool) {
        let outcome = run(Builtin::RangeLength, value, json!([2, 4])).unwrap();
        if passes {
            assert_eq!(outcome, Outcome::Pass);
        } else {
            assert_eq!(outcome, Outcome::fail("attr must be between 2 and 4 characters"));
        }
    }

    #[test]
    fn integral_floats_are_accepted_as_limits() {
        assert_eq!(run(Builtin::Length, json!("ab"), json!(2.0)).unwrap(), Outcome::Pass);
    }

    #[rstest]
    #[case(Builtin::Length, json!("4"))]
    #[case(Builtin::MinLength, json!(-1))]
    #[case(Builtin::MaxLength, json!(2.5))]
    #[case(Builtin::RangeLength, json!(3))]
    #[case(Builtin::RangeLength, json!([1, "x"]))]
    fn malformed_params_are_configuration_errors(#[case] builtin: Builtin, #[case] param: Value) {
        let err = run(builtin, json!("abc"), param).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParam { .. }));
    }
}
