// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Placeholder substitution.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `{{ identifier }}` with optional inner whitespace.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").unwrap());

/// Replace every `{{ name }}` token in `body` with `fields[name]`.
///
/// Unknown names become the empty string. Values are inserted verbatim (no
/// escaping) and are not themselves scanned for placeholders. Text that is
/// not a well-formed token is left untouched.
pub fn render(body: &str, fields: &BTreeMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(body, |caps: &Captures<'_>| {
            fields.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// Distinct placeholder names used by `body`, in order of first appearance.
pub fn placeholders(body: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(body) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_known_field() {
        assert_eq!(
            render("Hi {{name}}", &fields(&[("name", "Ana")])),
            "Hi Ana"
        );
    }

    #[test]
    fn tolerates_inner_whitespace() {
        assert_eq!(
            render("Hi {{  name }}!", &fields(&[("name", "Ana")])),
            "Hi Ana!"
        );
    }

    #[test]
    fn unknown_field_renders_empty() {
        assert_eq!(render("Hi {{x}}", &BTreeMap::new()), "Hi ");
    }

    #[test]
    fn body_without_placeholders_is_unchanged() {
        assert_eq!(render("plain text", &fields(&[("a", "b")])), "plain text");
    }

    #[test]
    fn values_are_not_rescanned() {
        let f = fields(&[("name", "{{company}}"), ("company", "ACME")]);
        assert_eq!(render("{{name}}", &f), "{{company}}");
    }

    #[test]
    fn malformed_tokens_survive() {
        let f = fields(&[("name", "Ana")]);
        assert_eq!(render("{{ first name }} {name} {{name", &f), "{{ first name }} {name} {{name");
    }

    #[test]
    fn repeated_placeholders_all_replaced() {
        let f = fields(&[("company", "ACME"), ("tax_id", "123")]);
        assert_eq!(
            render("{{company}} ({{ tax_id }}) - {{company}}", &f),
            "ACME (123) - ACME"
        );
    }

    #[test]
    fn placeholders_listed_once_in_order() {
        assert_eq!(
            placeholders("{{b}} {{ a }} {{b}}"),
            vec!["b".to_string(), "a".to_string()]
        );
    }

    proptest! {
        #[test]
        fn text_without_braces_is_identity(body in "[^{}]*") {
            prop_assert_eq!(render(&body, &fields(&[("name", "x")])), body);
        }

        #[test]
        fn rendering_is_deterministic(body in ".*", value in "[^{}]*") {
            let f = fields(&[("name", &value)]);
            prop_assert_eq!(render(&body, &f), render(&body, &f));
        }

        #[test]
        fn single_placeholder_yields_value(
            prefix in "[^{}]*",
            suffix in "[^{}]*",
            value in "[^{}]*",
        ) {
            let body = format!("{prefix}{{{{ name }}}}{suffix}");
            let f = fields(&[("name", &value)]);
            prop_assert_eq!(render(&body, &f), format!("{prefix}{value}{suffix}"));
        }

        #[test]
        fn rendered_output_has_no_known_tokens(value in "[a-zA-Z0-9 ]*") {
            let f = fields(&[("name", &value), ("company", &value)]);
            let out = render("{{name}} @ {{ company }}", &f);
            prop_assert!(placeholders(&out).is_empty());
        }
    }
}
