//! Message formatting and attribute labels
//!
//! Messages use positional placeholders: `{0}` is always the attribute label,
//! later indices are validator parameters and the attribute value. Tokens
//! without a matching argument are left in the output untouched.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use serde::Deserialize;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([0-9]+)\}").expect("placeholder regex is valid"));

/// Substitutes each `{i}` token in `template` with `args[i]`.
///
/// ```
/// use verity_validator::message::format;
///
/// assert_eq!(format("{0} is {1}", &["Age", "required"]), "Age is required");
/// assert_eq!(format("{0} and {3}", &["a"]), "a and {3}");
/// ```
#[must_use]
pub fn format<S: AsRef<str>>(template: &str, args: &[S]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| args.get(i))
                .map_or_else(|| caps[0].to_owned(), |arg| arg.as_ref().to_owned())
        })
        .into_owned()
}

/// Label override map: attribute name to display label.
pub type Labels = BTreeMap<String, String>;

/// Signature of a custom label strategy.
pub type LabelFn = Arc<dyn Fn(&str, Option<&Labels>) -> String + Send + Sync>;

/// Strategy used to turn an attribute name into the label shown in messages.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelFormatter {
    /// The attribute name, unchanged.
    None,
    /// `someAttribute` and `some_attribute` both become "Some attribute".
    #[default]
    SentenceCase,
    /// The model's label override, falling back to sentence case.
    Label,
    /// A caller-supplied strategy.
    #[serde(skip)]
    Custom(LabelFn),
}

impl fmt::Debug for LabelFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::SentenceCase => f.write_str("SentenceCase"),
            Self::Label => f.write_str("Label"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl LabelFormatter {
    /// Wraps a function as a custom label strategy.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str, Option<&Labels>) -> String + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Formats `attr` using this strategy and the model's optional labels.
    #[must_use]
    pub fn format_label(&self, attr: &str, labels: Option<&Labels>) -> String {
        match self {
            Self::None => attr.to_owned(),
            Self::SentenceCase => sentence_case(attr),
            Self::Label => labels
                .and_then(|labels| labels.get(attr))
                .filter(|label| !label.is_empty())
                .cloned()
                .unwrap_or_else(|| sentence_case(attr)),
            Self::Custom(f) => f(attr, labels),
        }
    }
}

/// Converts an attribute name to sentence case.
///
/// The first word character is upper-cased. Every later capital letter, and
/// every word character that follows a non-word character, starts a new
/// lower-cased word. Underscores become spaces.
///
/// ```
/// use verity_validator::message::sentence_case;
///
/// assert_eq!(sentence_case("someAttribute"), "Some attribute");
/// assert_eq!(sentence_case("some_other_attribute"), "Some other attribute");
/// ```
#[must_use]
pub fn sentence_case(attr: &str) -> String {
    let mut out = String::with_capacity(attr.len() + 4);
    let mut prev_is_word = false;

    for (i, ch) in attr.char_indices() {
        let is_word = ch.is_ascii_alphanumeric() || ch == '_';
        if i == 0 && is_word {
            out.extend(ch.to_uppercase());
        } else if ch.is_ascii_uppercase() || (is_word && !prev_is_word) {
            out.push(' ');
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
        prev_is_word = is_word;
    }

    out.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("{0} is required", &["Name"], "Name is required")]
    #[case("{1}{0}{1}", &["a", "b"], "bab")]
    #[case("{0} must be {2}", &["Name"], "Name must be {2}")]
    #[case("no placeholders", &[], "no placeholders")]
    #[case("{x} and {0}", &["a"], "{x} and a")]
    fn format_substitutes_positionally(
        #[case] template: &str,
        #[case] args: &[&str],
        #[case] expected: &str,
    ) {
        assert_eq!(format(template, args), expected);
    }

    #[rstest]
    #[case("someAttribute", "Some attribute")]
    #[case("some_attribute", "Some attribute")]
    #[case("some_other_attribute", "Some other attribute")]
    #[case("name", "Name")]
    #[case("firstNameInitial", "First name initial")]
    #[case("address.city", "Address. city")]
    fn sentence_case_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sentence_case(input), expected);
    }

    #[test]
    fn none_is_identity() {
        assert_eq!(LabelFormatter::None.format_label("someAttribute", None), "someAttribute");
    }

    #[test]
    fn label_uses_override_then_falls_back() {
        let labels = Labels::from([("someAttribute".to_owned(), "Custom label".to_owned())]);
        let f = LabelFormatter::Label;
        assert_eq!(f.format_label("someAttribute", Some(&labels)), "Custom label");
        assert_eq!(f.format_label("some_attribute", Some(&labels)), "Some attribute");
        assert_eq!(f.format_label("someAttribute", None), "Some attribute");
    }

    #[test]
    fn custom_strategy() {
        let f = LabelFormatter::custom(|attr, _| attr.to_uppercase());
        assert_eq!(f.format_label("zip", None), "ZIP");
    }

    #[test]
    fn deserializes_from_config_names() {
        let f: LabelFormatter = serde_json::from_str("\"sentenceCase\"").unwrap();
        assert!(matches!(f, LabelFormatter::SentenceCase));
        let f: LabelFormatter = serde_json::from_str("\"none\"").unwrap();
        assert!(matches!(f, LabelFormatter::None));
    }
}
