//! Translation of the user-facing replacement syntax into the `regex` crate's.
//!
//! Users write `$1`, `$2`, ... to reference capture groups and `\$` for a
//! literal dollar sign. The `regex` crate reads `$name` greedily (so `$1_v2`
//! would mean a group called `1_v2`) and uses `$$` for a literal dollar, so
//! every group reference is rewritten to the braced `${N}` form and every
//! other dollar is escaped.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Stands in for an escaped `\$` while group references are rewritten.
const ESCAPED_DOLLAR: &str = "\u{F8FF}";

static DOLLAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+)|\$").expect("dollar pattern is valid"));

/// Convert a `$N` style replacement string into `regex` replacement syntax.
///
/// Ordinary text passes through unchanged and an empty input yields an empty
/// output.
pub fn translate_replacement(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let protected = input.replace(r"\$", ESCAPED_DOLLAR);
    let rewritten = DOLLAR.replace_all(&protected, |caps: &Captures| match caps.get(1) {
        Some(group) => format!("${{{}}}", group.as_str()),
        None => "$$".to_string(),
    });
    rewritten.replace(ESCAPED_DOLLAR, "$$")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_group_references_to_braced_form() {
        assert_eq!(translate_replacement("$1_v2.txt"), "${1}_v2.txt");
        assert_eq!(translate_replacement("$2-$10"), "${2}-${10}");
    }

    #[test]
    fn escaped_dollar_becomes_literal() {
        assert_eq!(translate_replacement(r"price\$1"), "price$$1");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(translate_replacement("holiday photo.jpg"), "holiday photo.jpg");
        assert_eq!(translate_replacement(""), "");
    }

    #[test]
    fn lone_dollar_stays_literal_after_substitution() {
        let translated = translate_replacement("cost$");
        let re = Regex::new("x").unwrap();
        assert_eq!(re.replace_all("x", translated.as_str()), "cost$");
    }

    #[test]
    fn translated_output_drives_regex_replacement() {
        let re = Regex::new(r"(.*)\.txt").unwrap();
        let repl = translate_replacement("$1_v2.txt");
        assert_eq!(re.replace_all("a.txt", repl.as_str()), "a_v2.txt");
    }
}
