//! Presence validators: `required` and `acceptance`

use serde_json::Value;

use super::{Outcome, ValidatorArgs};
use crate::foundation::{is_present, is_truthy};

/// `required`: a truthy parameter demands a present value.
///
/// With a falsy parameter an absent value answers [`Outcome::HardFail`],
/// so an optional empty attribute skips the rest of its rules.
pub fn required(args: &ValidatorArgs<'_>) -> Outcome {
    let is_required = is_truthy(args.param);
    let present = is_present(args.value);

    match (is_required, present) {
        (false, false) => Outcome::HardFail,
        (true, false) => args.fail_with("required", []),
        (_, true) => Outcome::Pass,
    }
}

/// `acceptance`: the value is `true` or the string `"true"`.
pub fn acceptance(args: &ValidatorArgs<'_>) -> Outcome {
    match args.value {
        Value::Bool(true) => Outcome::Pass,
        Value::String(s) if s == "true" => Outcome::Pass,
        _ => args.fail_with("acceptance", []),
    }
}
