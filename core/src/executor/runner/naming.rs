//! Dynamic name construction.
//!
//! A template may embed one `${ITERATOR[:start[:step]]}` construct:
//!
//! ```text
//! report_${ITERATOR:100:3}.txt   count = 3   ->  report_100.txt, report_103.txt, report_106.txt
//! ```
//!
//! The prefix is letters, underscores and spaces; the suffix is letters with
//! at most one `.extension`. `start` defaults to 0 and `step` to 1.

use std::sync::OnceLock;

use regex::Regex;

use crate::executor::errors::NameError;

fn construct_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<prefix>[A-Za-z_ ]+)\$\{ITERATOR(?::(?P<start>[+-]?\d+)(?::(?P<step>[+-]?\d+))?)?\}(?P<suffix>[A-Za-z]*(?:\.[A-Za-z]+)?)$",
        )
        .unwrap_or_else(|err| unreachable!("dynamic construct pattern is valid: {err}"))
    })
}

/// Expand `template` into exactly `count` names.
///
/// A template without a `$` is a literal name and only valid for
/// `count == 1`. `count` of zero yields no names.
pub fn generate_names(template: &str, count: usize) -> Result<Vec<String>, NameError> {
    if !template.contains('$') {
        if count > 1 {
            return Err(NameError::CountWithoutConstruct);
        }
        return Ok(vec![template.to_string(); count]);
    }

    let captures = construct_pattern()
        .captures(template)
        .ok_or(NameError::InvalidConstruct)?;

    let prefix = &captures["prefix"];
    let suffix = &captures["suffix"];
    let start = parse_bound(captures.name("start").map(|m| m.as_str()), 0)?;
    let step = parse_bound(captures.name("step").map(|m| m.as_str()), 1)?;

    // a zero step would hand out the same name repeatedly
    if step == 0 && count > 1 {
        return Err(NameError::InvalidConstruct);
    }

    (0..count)
        .map(|i| {
            let i = i64::try_from(i).map_err(|_| NameError::InvalidConstruct)?;
            let n = i
                .checked_mul(step)
                .and_then(|offset| start.checked_add(offset))
                .ok_or(NameError::InvalidConstruct)?;
            Ok(format!("{prefix}{n}{suffix}"))
        })
        .collect()
}

fn parse_bound(raw: Option<&str>, default: i64) -> Result<i64, NameError> {
    match raw {
        Some(text) => text.parse().map_err(|_| NameError::InvalidConstruct),
        None => Ok(default),
    }
}
