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

//! Prefix driven dispatch over a single configuration line.
//!
//! Parsers test prefixes in order and the first match wins, so a prefix must
//! always be tried before any shorter prefix sharing its stem
//! (`destination-port-except ` before `destination-port `).

use std::borrow::Cow;
use std::num::ParseIntError;
use std::str::FromStr;

use super::ConfigError;

/// Remove `prefix` from the start of `line` if it is there.
///
/// `line` is left untouched when it does not start with `prefix`.
pub fn cut_prefix(line: &mut &str, prefix: &str) -> bool {
    match line.strip_prefix(prefix) {
        Some(rest) => {
            *line = rest;
            true
        }
        None => false,
    }
}

/// Remove `suffix` from the end of `line` if it is there.
pub fn cut_suffix(line: &mut &str, suffix: &str) -> bool {
    match line.strip_suffix(suffix) {
        Some(rest) => {
            *line = rest;
            true
        }
        None => false,
    }
}

/// Pop the next word of `line`, a double-quoted string counting as one word.
///
/// A quoted word is returned without its quotes and with `\"` and `\\`
/// unescaped.
pub fn next_word<'a>(line: &mut &'a str) -> Option<Cow<'a, str>> {
    let s = line.trim_start();
    if s.is_empty() {
        *line = s;
        return None;
    }

    let (word, rest) = if let Some(quoted) = s.strip_prefix('"') {
        let mut escaped = false;
        let end = quoted.char_indices().find_map(|(i, c)| {
            match c {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => return Some(i),
                _ => escaped = false,
            }
            None
        });
        match end {
            Some(end) => (unescape(&quoted[..end]), &quoted[end + 1..]),
            None => (unescape(quoted), ""),
        }
    } else {
        let (word, rest) = s.split_once(' ').unwrap_or((s, ""));
        (Cow::Borrowed(word), rest)
    };

    *line = rest.trim_start();
    Some(word)
}

/// Value as written by [`quoted`](super::set_list::quoted): one pair of
/// surrounding quotes is removed and escapes are resolved.
///
/// Bare values are returned untouched.
pub fn unquote(value: &str) -> Cow<'_, str> {
    match value.strip_prefix('"').and_then(|inner| inner.strip_suffix('"')) {
        Some(inner) => unescape(inner),
        None => Cow::Borrowed(value),
    }
}

fn unescape(value: &str) -> Cow<'_, str> {
    if !value.contains('\\') {
        return Cow::Borrowed(value);
    }
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => unescaped.extend(chars.next()),
            c => unescaped.push(c),
        }
    }
    Cow::Owned(unescaped)
}

/// Split `line` into words, failing when fewer than `min` are found.
pub fn fields<'a>(
    mut line: &'a str,
    min: usize,
    what: &'static str,
) -> Result<Vec<Cow<'a, str>>, ConfigError> {
    let original = line;
    let mut words = Vec::new();
    while let Some(word) = next_word(&mut line) {
        words.push(word);
    }
    if words.len() < min {
        return Err(ConfigError::not_enough_fields(what, original));
    }
    Ok(words)
}

/// Parse an integer token from device output.
pub fn parse_int<T>(value: &str) -> Result<T, ConfigError>
where
    T: FromStr<Err = ParseIntError>,
{
    let value = unquote(value);
    value
        .parse()
        .map_err(|source| ConfigError::FailedConvAtoi {
            value: value.into_owned(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cut_prefix_mutates_only_on_match() {
        let mut line = "destination-port 22";
        assert!(!cut_prefix(&mut line, "source-port "));
        assert_eq!(line, "destination-port 22");
        assert!(cut_prefix(&mut line, "destination-port "));
        assert_eq!(line, "22");
    }

    #[test]
    fn longer_prefix_must_come_first() {
        let mut line = "destination-port-except 53";
        // the shorter stem does not match because of the trailing space
        assert!(!cut_prefix(&mut line, "destination-port "));
        assert!(cut_prefix(&mut line, "destination-port-except "));
        assert_eq!(line, "53");
    }

    #[test]
    fn cut_suffix_strips_except() {
        let mut line = "192.0.2.0/24 except";
        assert!(cut_suffix(&mut line, " except"));
        assert_eq!(line, "192.0.2.0/24");
        assert!(!cut_suffix(&mut line, " except"));
    }

    #[test]
    fn next_word_handles_quotes() {
        let mut line = r#""my term" from protocol tcp"#;
        assert_eq!(next_word(&mut line).as_deref(), Some("my term"));
        assert_eq!(line, "from protocol tcp");
        assert_eq!(next_word(&mut line).as_deref(), Some("from"));
        assert_eq!(next_word(&mut line).as_deref(), Some("protocol"));
        assert_eq!(next_word(&mut line).as_deref(), Some("tcp"));
        assert_eq!(next_word(&mut line), None);

        let mut line = r#""a \"b\" c\\" rest"#;
        assert_eq!(next_word(&mut line).as_deref(), Some(r#"a "b" c\"#));
        assert_eq!(line, "rest");
    }

    #[test]
    fn unquote_strips_one_pair() {
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote(r#""two words""#), "two words");
        assert_eq!(unquote(r#""rack \"A\"""#), r#"rack "A""#);
        assert_eq!(unquote(r#""""quoted""""#), r#"""quoted"""#);
        assert_eq!(unquote(r#"""#), r#"""#);
    }

    #[test]
    fn fields_underflow_is_an_error() {
        let words = fields("0.0.0.0/0 routing-instance default priority-cost 10", 5, "track route")
            .unwrap();
        assert_eq!(words[4], "10");

        let err = fields("0.0.0.0/0 routing-instance", 5, "track route").unwrap_err();
        assert_eq!(
            err,
            ConfigError::NotEnoughFields {
                what: "track route",
                line: "0.0.0.0/0 routing-instance".to_owned()
            }
        );
    }

    #[test]
    fn parse_int_reports_token() {
        assert_eq!(parse_int::<u32>("0"), Ok(0));
        let err = parse_int::<u32>("ten").unwrap_err();
        assert!(err.to_string().contains("'ten'"), "{err}");
    }
}
