//! Dependency tracking
//!
//! An attribute depends on another when any of its rule objects lists it in
//! `depends`. Dependencies only decide whether an attribute is re-notified;
//! they never change which rules run or in what order.

use std::collections::BTreeSet;

use super::spec::{RuleSpec, Validation};

/// Union of the `depends` lists declared for `attr`.
///
/// Rule objects without any validator key contribute nothing, since they
/// normalize to no rules.
#[must_use]
pub fn dependencies_of(validation: &Validation, attr: &str) -> BTreeSet<String> {
    match validation.get(attr) {
        Some(RuleSpec::Rules(decls)) => decls
            .iter()
            .filter(|decl| !decl.validators.is_empty())
            .flat_map(|decl| decl.depends.iter().cloned())
            .collect(),
        _ => BTreeSet::new(),
    }
}
