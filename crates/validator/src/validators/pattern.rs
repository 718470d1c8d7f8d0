//! Pattern validator and the named built-in patterns
//!
//! `pattern` takes either the name of a catalog pattern (`digits`, `number`,
//! `email`, `url`, or a registered one) or an inline regular expression.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::{Outcome, ValidatorArgs};
use crate::foundation::{ConfigError, Result, display, is_present};

/// Non-ASCII letters accepted by the email and url grammars.
const UCS: &str = r"[\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}]";

const DIGITS_SRC: &str = r"^[0-9]+$";
const NUMBER_SRC: &str = r"^-?(?:[0-9]+|[0-9]{1,3}(?:,[0-9]{3})+)(?:\.[0-9]+)?$";

/// All-digit strings.
pub static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DIGITS_SRC).expect("digits pattern is valid"));

/// Optionally negative numbers with optional thousands separators and
/// decimal part.
pub static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NUMBER_SRC).expect("number pattern is valid"));

/// RFC 2822 derived email addresses.
pub static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&email_source()).expect("email pattern is valid"));

/// `http`, `https` and `ftp` URLs.
pub static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&url_source()).expect("url pattern is valid"));

fn email_source() -> String {
    let atom = ["([a-z]|[0-9]|[!#$%&'*+/=?^_`{|}~-]|", UCS, ")"].concat();
    let dot_atom = [&atom, r"+(\.", &atom, "+)*"].concat();
    let quoted_char = [
        r"(([\x01-\x08\x0b\x0c\x0e-\x1f\x7f]|\x21|[\x23-\x5b]|[\x5d-\x7e]|",
        UCS,
        r")|(\\([\x01-\x09\x0b\x0c\x0d-\x7f]|",
        UCS,
        ")))",
    ]
    .concat();
    let fws = r"(((\x20|\x09)*(\x0d\x0a))?(\x20|\x09)+)?";
    let quoted = [r"((\x22)(", fws, &quoted_char, ")*", fws, r"(\x22))"].concat();
    let alnum = ["([a-z]|[0-9]|", UCS, ")"].concat();
    let alpha = ["([a-z]|", UCS, ")"].concat();
    let inner = [r"([a-z]|[0-9]|-|\.|_|~|", UCS, ")"].concat();
    let label = ["(", &alnum, "|(", &alnum, &inner, "*", &alnum, "))"].concat();
    let tld = ["(", &alpha, "|(", &alpha, &inner, "*", &alpha, "))"].concat();

    [
        "(?i)^((",
        &dot_atom,
        ")|",
        &quoted,
        ")@(",
        &label,
        r"\.)+",
        &tld,
        "$",
    ]
    .concat()
}

fn url_source() -> String {
    let unreserved = [r"([a-z]|[0-9]|-|\.|_|~|", UCS, ")"].concat();
    let pct = "(%[0-9a-f]{2})";
    let sub_delims = "[!$&'()*+,;=]";
    let pchar = ["(", &unreserved, "|", pct, "|", sub_delims, "|:|@)"].concat();
    let userinfo = ["((", &unreserved, "|", pct, "|", sub_delims, "|:)*@)?"].concat();

    let octet = "([0-9]|[1-9][0-9]|1[0-9][0-9]|2[0-4][0-9]|25[0-5])";
    let ipv4 = ["(", octet, r"\.", octet, r"\.", octet, r"\.", octet, ")"].concat();

    let alnum = ["([a-z]|[0-9]|", UCS, ")"].concat();
    let alpha = ["([a-z]|", UCS, ")"].concat();
    let label = ["(", &alnum, "|(", &alnum, &unreserved, "*", &alnum, "))"].concat();
    let tld = ["(", &alpha, "|(", &alpha, &unreserved, "*", &alpha, "))"].concat();
    let hostname = ["((", &label, r"\.)+", &tld, r"\.?)"].concat();

    let authority = ["(", &userinfo, "(", &ipv4, "|", &hostname, ")(:[0-9]*)?)"].concat();
    let path = ["(/(", &pchar, "+(/", &pchar, "*)*)?)?"].concat();
    let query = [r"(\?(", &pchar, r"|[\x{E000}-\x{F8FF}]|/|\?)*)?"].concat();
    let fragment = ["(#(", &pchar, r"|/|\?)*)?"].concat();

    ["(?i)^(https?|ftp)://", &authority, &path, &query, &fragment, "$"].concat()
}

/// The named patterns every catalog starts with.
pub(crate) fn builtin_patterns() -> BTreeMap<String, Regex> {
    [
        ("digits", &*DIGITS),
        ("number", &*NUMBER),
        ("email", &*EMAIL),
        ("url", &*URL),
    ]
    .into_iter()
    .map(|(name, regex)| (name.to_owned(), regex.clone()))
    .collect()
}

/// `pattern`: the value is present and its string form matches the named or
/// inline pattern.
pub fn pattern(args: &ValidatorArgs<'_>) -> Result<Outcome> {
    let source = args
        .param
        .as_str()
        .ok_or_else(|| ConfigError::invalid_param("pattern", "expected a pattern name or regex"))?;

    let matched = if is_present(args.value) {
        let text = display(args.value);
        match args.catalog().pattern(source) {
            Some(regex) => regex.is_match(&text),
            None => Regex::new(source)
                .map_err(|e| ConfigError::invalid_pattern(source, &e))?
                .is_match(&text),
        }
    } else {
        false
    };

    if matched {
        return Ok(Outcome::Pass);
    }
    let key = if args.catalog().has_message(source) {
        source
    } else {
        "inlinePattern"
    };
    Ok(args.fail_with(key, [source.to_owned()]))
}
