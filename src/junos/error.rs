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

use std::num::ParseIntError;

use thiserror::Error;

/// Failure raised while translating between records and Junos statements.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Both sides of a mutually exclusive pair are set.
    #[error("conflict between {0} and {1}")]
    Conflict(&'static str, &'static str),

    /// Two sibling blocks share the same key.
    #[error("multiple blocks {block} with the same {attribute} {key}")]
    DuplicateBlock {
        block: &'static str,
        attribute: &'static str,
        key: String,
    },

    /// An attribute is set without the attribute it depends on.
    #[error("{0} need to be set with {1}")]
    Dependency(&'static str, &'static str),

    #[error("failed to convert value from '{value}' to integer: {source}")]
    FailedConvAtoi {
        value: String,
        source: ParseIntError,
    },

    #[error("can't read values for {what} in '{line}': not enough fields")]
    NotEnoughFields { what: &'static str, line: String },

    #[error("invalid value '{value}' for {attribute}: {reason}")]
    InvalidValue {
        attribute: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid(
        attribute: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            attribute,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn not_enough_fields(what: &'static str, line: &str) -> Self {
        Self::NotEnoughFields {
            what,
            line: line.to_owned(),
        }
    }
}
