// This file is part of the terraform-provider-junos project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt::Display;

use super::ConfigError;

/// Accumulates `set` statements in emission order.
///
/// Every helper takes the already-built parent path as `prefix`, ending with a
/// space (`set firewall family inet filter F term T from `).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SetList {
    lines: Vec<String>,
}

impl SetList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, prefix: &str, statement: impl Display) {
        self.lines.push(format!("{prefix}{statement}"));
    }

    pub fn flag(&mut self, prefix: &str, keyword: &str, enabled: bool) {
        if enabled {
            self.push(prefix, keyword);
        }
    }

    /// Free-form value, emitted between quotes.
    pub fn text(&mut self, prefix: &str, keyword: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.push(prefix, format_args!("{keyword} {}", quoted(value)));
        }
    }

    /// Name or keyword-like value, quoted only when it has to be.
    pub fn word(&mut self, prefix: &str, keyword: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.push(prefix, format_args!("{keyword} {}", identifier(value)));
        }
    }

    /// `None` is the unset sentinel: nothing is emitted, while `Some(0)` is.
    pub fn number<T: Display>(&mut self, prefix: &str, keyword: &str, value: Option<T>) {
        if let Some(value) = value {
            self.push(prefix, format_args!("{keyword} {value}"));
        }
    }

    /// One statement per value, in sorted order.
    pub fn values(&mut self, prefix: &str, keyword: &str, values: &BTreeSet<String>) {
        for value in values {
            self.push(prefix, format_args!("{keyword} {}", identifier(value)));
        }
    }

    /// Positive/negated pair where the negation has its own keyword
    /// (`protocol tcp` / `protocol-except udp`).
    pub fn except_pair(
        &mut self,
        prefix: &str,
        attributes: (&'static str, &'static str),
        keywords: (&str, &str),
        values: &BTreeSet<String>,
        except: &BTreeSet<String>,
    ) -> Result<(), ConfigError> {
        exclusive(
            (attributes.0, !values.is_empty()),
            (attributes.1, !except.is_empty()),
        )?;
        self.values(prefix, keywords.0, values);
        self.values(prefix, keywords.1, except);
        Ok(())
    }

    /// Positive/negated pair where the negation is a trailing `except`
    /// (`address 192.0.2.0/24` / `address 192.0.2.0/24 except`).
    pub fn except_suffix_pair(
        &mut self,
        prefix: &str,
        attributes: (&'static str, &'static str),
        keyword: &str,
        values: &BTreeSet<String>,
        except: &BTreeSet<String>,
    ) -> Result<(), ConfigError> {
        exclusive(
            (attributes.0, !values.is_empty()),
            (attributes.1, !except.is_empty()),
        )?;
        self.values(prefix, keyword, values);
        for value in except {
            self.push(prefix, format_args!("{keyword} {} except", identifier(value)));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Double-quoted string with `"` and `\` escaped, read back by
/// [`unquote`](super::tokenizer::unquote).
pub fn quoted(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Name as Junos prints it: bare unless it holds blanks, quotes or escapes.
pub fn identifier(value: &str) -> Cow<'_, str> {
    if value.is_empty() || value.contains(|c: char| c.is_whitespace() || c == '"' || c == '\\') {
        Cow::Owned(quoted(value))
    } else {
        Cow::Borrowed(value)
    }
}

/// Fail when both attributes are set.
pub fn exclusive(
    (first, first_set): (&'static str, bool),
    (second, second_set): (&'static str, bool),
) -> Result<(), ConfigError> {
    if first_set && second_set {
        Err(ConfigError::Conflict(first, second))
    } else {
        Ok(())
    }
}

/// Fail when `attribute` is set without `dependency`.
pub fn requires(
    (attribute, attribute_set): (&'static str, bool),
    (dependency, dependency_set): (&'static str, bool),
) -> Result<(), ConfigError> {
    if attribute_set && !dependency_set {
        Err(ConfigError::Dependency(attribute, dependency))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn values_are_sorted() {
        let mut list = SetList::new();
        list.values("set from ", "protocol", &set(&["udp", "icmp", "tcp"]));
        assert_eq!(
            list.into_lines(),
            [
                "set from protocol icmp",
                "set from protocol tcp",
                "set from protocol udp"
            ]
        );
    }

    #[test]
    fn except_pair_conflict_emits_nothing() {
        let mut list = SetList::new();
        let err = list
            .except_pair(
                "set from ",
                ("source_port", "source_port_except"),
                ("source-port", "source-port-except"),
                &set(&["22"]),
                &set(&["23"]),
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "conflict between source_port and source_port_except"
        );
        assert!(list.is_empty());
    }

    #[test]
    fn except_suffix_form() {
        let mut list = SetList::new();
        list.except_suffix_pair(
            "set from ",
            ("address", "address_except"),
            "address",
            &BTreeSet::new(),
            &set(&["10.0.0.0/8"]),
        )
        .unwrap();
        assert_eq!(list.into_lines(), ["set from address 10.0.0.0/8 except"]);
    }

    #[test]
    fn zero_is_not_the_sentinel() {
        let mut list = SetList::new();
        list.number::<u32>("set ", "priority", None);
        list.number("set ", "priority", Some(0u32));
        assert_eq!(list.into_lines(), ["set priority 0"]);
    }

    #[test]
    fn identifiers_are_quoted_only_when_needed() {
        assert_eq!(identifier("T1"), "T1");
        assert_eq!(identifier("my filter"), "\"my filter\"");
        assert_eq!(identifier(r"a\b"), r#""a\\b""#);
    }

    #[test]
    fn text_escapes_quotes() {
        let mut list = SetList::new();
        list.text("set ", "description", Some(r#"rack "A""#));
        list.word("set ", "filter input", Some("edge in"));
        assert_eq!(
            list.into_lines(),
            [
                r#"set description "rack \"A\"""#,
                r#"set filter input "edge in""#
            ]
        );
    }

    #[test]
    fn dependency_message() {
        assert_eq!(
            requires(("authentication_key", true), ("authentication_type", false))
                .unwrap_err()
                .to_string(),
            "authentication_key need to be set with authentication_type"
        );
        assert!(requires(("authentication_key", false), ("authentication_type", false)).is_ok());
    }
}
