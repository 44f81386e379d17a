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

//! Ordered lists of keyed sub-blocks.
//!
//! Junos prints one line per leaf, so a single `term` block arrives as many
//! `term T from ...` / `term T then ...` lines. Looking the entry up by key
//! before filling it keeps exactly one entry per key, in the order keys were
//! first seen.

use std::fmt::Display;

use super::ConfigError;

/// A record identified inside its parent list by one or more attributes.
pub trait Keyed {
    /// Single attribute (`String`) or composite key (tuple).
    type Key: PartialEq + Clone;

    /// Block name used in error messages, e.g. `term`.
    const BLOCK: &'static str;
    /// Key attribute name(s) used in error messages, e.g. `name`.
    const KEY_ATTRIBUTE: &'static str;

    fn key(&self) -> Self::Key;

    /// Empty record carrying only its key.
    fn with_key(key: Self::Key) -> Self;
}

/// Return the entry of `list` keyed `key`, appending a new one if needed.
pub fn find_or_create<T: Keyed>(list: &mut Vec<T>, key: T::Key) -> &mut T {
    let index = match list.iter().position(|entry| entry.key() == key) {
        Some(index) => index,
        None => {
            list.push(T::with_key(key));
            list.len() - 1
        }
    };
    &mut list[index]
}

/// Reject a user-declared list holding two entries with the same key.
pub fn check_unique<T>(list: &[T]) -> Result<(), ConfigError>
where
    T: Keyed,
    T::Key: Display,
{
    for (i, entry) in list.iter().enumerate() {
        let key = entry.key();
        if list[..i].iter().any(|previous| previous.key() == key) {
            return Err(ConfigError::DuplicateBlock {
                block: T::BLOCK,
                attribute: T::KEY_ATTRIBUTE,
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

/// Display adapter for two-attribute keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairKey(pub String, pub String);

impl Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, self.1)
    }
}
