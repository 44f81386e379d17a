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
use std::cell::RefCell;
use std::collections::BTreeSet;

use tf_provider::value::{Value, ValueString};

use crate::junos::ConfigError;

/// String attribute of a Terraform state.
pub(crate) type Text = ValueString<'static>;
/// Set of strings attribute of a Terraform state.
pub(crate) type TextSet = Value<BTreeSet<Text>>;
/// Nested block list of a Terraform state.
pub(crate) type Blocks<T> = Value<Vec<Value<T>>>;

// Terraform to record. Null and unknown values read as unset.

pub(crate) fn string_of(value: &Text) -> Option<String> {
    match value {
        Value::Value(s) if !s.is_empty() => Some(s.to_string()),
        _ => None,
    }
}

pub(crate) fn strings_of(value: &TextSet) -> BTreeSet<String> {
    match value {
        Value::Value(set) => set.iter().filter_map(string_of).collect(),
        _ => BTreeSet::new(),
    }
}

pub(crate) fn number_of<T: TryFrom<i64>>(
    value: &Value<i64>,
    attribute: &'static str,
) -> Result<Option<T>, ConfigError> {
    match value {
        Value::Value(n) => T::try_from(*n)
            .map(Some)
            .map_err(|_| ConfigError::invalid(attribute, n.to_string(), "out of range")),
        _ => Ok(None),
    }
}

pub(crate) fn flag_of(value: &Value<bool>) -> bool {
    matches!(value, Value::Value(true))
}

pub(crate) fn block_of<T>(value: &Value<T>) -> Option<&T> {
    match value {
        Value::Value(block) => Some(block),
        _ => None,
    }
}

pub(crate) fn blocks_of<T>(value: &Blocks<T>) -> impl Iterator<Item = &T> {
    block_of(value).into_iter().flatten().filter_map(block_of)
}

// Record to Terraform. Unset values are written as null.

pub(crate) fn string_value(value: Option<String>) -> Text {
    match value {
        Some(s) => Value::Value(Cow::Owned(s)),
        None => Value::Null,
    }
}

pub(crate) fn strings_value(values: BTreeSet<String>) -> TextSet {
    if values.is_empty() {
        Value::Null
    } else {
        Value::Value(
            values
                .into_iter()
                .map(|s| Value::Value(Cow::Owned(s)))
                .collect(),
        )
    }
}

pub(crate) fn number_value<T: Into<i64>>(value: Option<T>) -> Value<i64> {
    match value {
        Some(n) => Value::Value(n.into()),
        None => Value::Null,
    }
}

pub(crate) fn flag_value(value: bool) -> Value<bool> {
    if value {
        Value::Value(true)
    } else {
        Value::Null
    }
}

pub(crate) fn block_value<T>(value: Option<T>) -> Value<T> {
    match value {
        Some(block) => Value::Value(block),
        None => Value::Null,
    }
}

pub(crate) fn blocks_value<T, U>(values: Vec<T>, convert: impl Fn(T) -> U) -> Blocks<U> {
    Value::Value(values.into_iter().map(|v| Value::Value(convert(v))).collect())
}

pub struct DisplayJoiner<'a, T, I>
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    iter: RefCell<T>,
    sep: &'a str,
}

pub trait DisplayJoinable {
    type Joiner<'a>;
    fn join_with(self, sep: &str) -> Self::Joiner<'_>;
}

impl<T, I> DisplayJoinable for T
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    type Joiner<'a> = DisplayJoiner<'a, T, I>;

    fn join_with(self, sep: &str) -> Self::Joiner<'_> {
        DisplayJoiner {
            iter: RefCell::new(self),
            sep,
        }
    }
}

impl<'a, T, I> std::fmt::Display for DisplayJoiner<'a, T, I>
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut sep = "";
        let mut iter = self.iter.try_borrow_mut().or(Err(std::fmt::Error))?;
        for elt in iter.by_ref() {
            f.write_str(sep)?;
            f.write_fmt(format_args!("{elt}"))?;
            sep = self.sep;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_values_are_null() {
        assert!(string_value(None).is_null());
        assert!(strings_value(BTreeSet::new()).is_null());
        assert!(number_value::<u32>(None).is_null());
        assert!(flag_value(false).is_null());
        assert_eq!(number_value(Some(0u32)), Value::Value(0));
    }

    #[test]
    fn unknown_reads_as_unset() {
        assert_eq!(string_of(&Value::Unknown), None);
        assert_eq!(string_of(&Value::Value(Cow::Borrowed(""))), None);
        assert!(!flag_of(&Value::Unknown));
        assert_eq!(number_of::<u8>(&Value::Unknown, "priority"), Ok(None));
        assert!(number_of::<u8>(&Value::Value(300), "priority").is_err());
    }

    #[test]
    fn join_with_separator() {
        assert_eq!(["a", "b", "c"].iter().join_with(", ").to_string(), "a, b, c");
    }
}
