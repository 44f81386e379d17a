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

//! Translation between structured records and Junos configuration text.
//!
//! Records are turned into `set` statements by setters built on [`SetList`],
//! and `show configuration <path> | display set relative` output is turned
//! back into records by per-line parsers dispatched with [`cut_prefix`].

mod error;
pub mod merge;
mod set_list;
pub mod tokenizer;

pub use error::ConfigError;
pub use merge::{find_or_create, Keyed};
pub use set_list::{exclusive, identifier, requires, SetList};
pub use tokenizer::{cut_prefix, cut_suffix, next_word, parse_int, unquote};

/// Separator between key attributes in resource ids.
pub const ID_SEPARATOR: &str = "_-_";

/// Split a resource id into its `N` key attributes.
pub fn split_id<const N: usize>(id: &str) -> Result<[&str; N], ConfigError> {
    let parts: Vec<&str> = id.split(ID_SEPARATOR).collect();
    parts.try_into().map_err(|_| {
        ConfigError::invalid(
            "id",
            id,
            format!("expected {N} part(s) separated by {ID_SEPARATOR}"),
        )
    })
}

/// Command listing `path` as full `set` statements.
pub fn show_config(path: &str) -> String {
    format!("show configuration {path} | display set")
}

/// Command listing `path` as `set` statements relative to `path`.
pub fn show_config_relative(path: &str) -> String {
    format!("show configuration {path} | display set relative")
}

/// Feed every `set` line of `output` to `parse`, with the `set ` prefix removed.
///
/// Lines that are not `set` statements (blank lines, comments) are skipped.
/// The first parser error aborts the scan.
pub fn parse_lines<R>(
    output: &str,
    record: &mut R,
    mut parse: impl FnMut(&mut R, &str) -> Result<(), ConfigError>,
) -> Result<(), ConfigError> {
    for line in output.lines() {
        let mut line = line.trim();
        if !cut_prefix(&mut line, "set ") {
            continue;
        }
        let line = line.trim_start();
        if line.is_empty() {
            continue;
        }
        parse(record, line)?;
    }
    Ok(())
}
