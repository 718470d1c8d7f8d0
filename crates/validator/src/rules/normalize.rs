//! Rule normalization
//!
//! Flattens an attribute's [`RuleSpec`] into the ordered list of [`Rule`]s
//! the evaluator runs. Each validator key of each rule object becomes one
//! rule; the object's `msg`, `depends` and `labelPlaceholders` are shared by
//! all rules it produces.

use smallvec::SmallVec;

use super::spec::{Param, Placeholders, RuleSpec, Validation};
use crate::foundation::{ConfigError, Result};
use crate::validators::{Catalog, ValidatorRef};

/// A single validator bound to its parameter and message settings.
#[derive(Debug, Clone)]
pub struct Rule {
    /// The catalog entry to run.
    pub validator: ValidatorRef,
    /// Its parameter.
    pub param: Param,
    /// Custom failure message, if declared.
    pub msg: Option<String>,
    /// Attributes that re-notify this attribute when they change.
    pub depends: SmallVec<[String; 2]>,
    /// Placeholder override for the custom message.
    pub label_placeholders: Option<Placeholders>,
}

impl Rule {
    fn func(param: Param) -> Self {
        Self {
            validator: ValidatorRef::Func,
            param,
            msg: None,
            depends: SmallVec::new(),
            label_placeholders: None,
        }
    }
}

/// Normalizes one attribute's spec against the catalog.
///
/// Fails with [`ConfigError::UnknownValidator`] when a rule object names a
/// validator the catalog cannot resolve.
pub fn normalize(attr: &str, spec: &RuleSpec, catalog: &Catalog) -> Result<Vec<Rule>> {
    match spec {
        RuleSpec::Method(name) => Ok(vec![Rule::func(Param::Value(name.as_str().into()))]),
        RuleSpec::Func(f) => Ok(vec![Rule::func(Param::Func(f.clone()))]),
        RuleSpec::Rules(decls) => {
            let mut rules = Vec::with_capacity(decls.len());
            for decl in decls {
                for (name, param) in &decl.validators {
                    let validator =
                        catalog
                            .resolve(name)
                            .ok_or_else(|| ConfigError::UnknownValidator {
                                attr: attr.to_owned(),
                                name: name.clone(),
                            })?;
                    rules.push(Rule {
                        validator,
                        param: param.clone(),
                        msg: decl.msg.clone(),
                        depends: decl.depends.clone(),
                        label_placeholders: decl.label_placeholders.clone(),
                    });
                }
            }
            Ok(rules)
        }
    }
}

/// Normalizes the declared rules of `attr`; undeclared attributes have none.
pub fn rules_for(validation: &Validation, attr: &str, catalog: &Catalog) -> Result<Vec<Rule>> {
    validation
        .get(attr)
        .map_or_else(|| Ok(Vec::new()), |spec| normalize(attr, spec, catalog))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleDecl;
    use serde_json::json;

    fn names(rules: &[Rule]) -> Vec<String> {
        rules.iter().map(|r| r.validator.name().to_owned()).collect()
    }

    #[test]
    fn method_name_becomes_fn_rule() {
        let rules = normalize("a", &RuleSpec::from("check"), &Catalog::default()).unwrap();
        assert_eq!(names(&rules), ["fn"]);
        assert!(matches!(&rules[0].param, Param::Value(v) if v == &json!("check")));
    }

    #[test]
    fn closure_becomes_fn_rule() {
        let spec = RuleSpec::func(|_| crate::validators::Outcome::Pass);
        let rules = normalize("a", &spec, &Catalog::default()).unwrap();
        assert_eq!(names(&rules), ["fn"]);
        assert!(matches!(rules[0].param, Param::Func(_)));
    }

    #[test]
    fn multiple_keys_share_message_and_depends() {
        let spec = RuleSpec::from(vec![
            RuleDecl::validator("required", true),
            RuleDecl::new()
                .with("minLength", 2)
                .with("maxLength", 5)
                .msg("bad")
                .depends(["other"]),
        ]);
        let rules = normalize("a", &spec, &Catalog::default()).unwrap();
        assert_eq!(names(&rules), ["required", "minLength", "maxLength"]);
        assert_eq!(rules[0].msg, None);
        assert_eq!(rules[1].msg.as_deref(), Some("bad"));
        assert_eq!(rules[2].msg.as_deref(), Some("bad"));
        assert_eq!(rules[2].depends.as_slice(), ["other"]);
    }

    #[test]
    fn unknown_validator_is_a_configuration_error() {
        let spec = RuleSpec::from(RuleDecl::validator("between", json!([1, 2])));
        let err = normalize("a", &spec, &Catalog::default()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownValidator {
                attr: "a".into(),
                name: "between".into()
            }
        );
    }

    #[test]
    fn undeclared_attribute_has_no_rules() {
        let rules = rules_for(&Validation::new(), "ghost", &Catalog::default()).unwrap();
        assert!(rules.is_empty());
    }
}
