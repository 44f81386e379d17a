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

use std::collections::HashMap;

use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Block, NestedBlock};
use tf_provider::schema::Description;

fn attribute(attr_type: AttributeType, constraint: AttributeConstraint, description: &str) -> Attribute {
    Attribute {
        attr_type,
        description: Description::plain(description),
        constraint,
        sensitive: false,
        deprecated: false,
    }
}

pub(crate) fn id() -> Attribute {
    attribute(
        AttributeType::String,
        AttributeConstraint::Computed,
        "Key attributes joined with `_-_`",
    )
}

pub(crate) fn required_string(description: &str) -> Attribute {
    attribute(AttributeType::String, AttributeConstraint::Required, description)
}

pub(crate) fn optional_string(description: &str) -> Attribute {
    attribute(AttributeType::String, AttributeConstraint::Optional, description)
}

pub(crate) fn sensitive_string(description: &str) -> Attribute {
    Attribute {
        sensitive: true,
        ..optional_string(description)
    }
}

pub(crate) fn required_number(description: &str) -> Attribute {
    attribute(AttributeType::Number, AttributeConstraint::Required, description)
}

pub(crate) fn optional_number(description: &str) -> Attribute {
    attribute(AttributeType::Number, AttributeConstraint::Optional, description)
}

pub(crate) fn optional_bool(description: &str) -> Attribute {
    attribute(AttributeType::Bool, AttributeConstraint::Optional, description)
}

pub(crate) fn optional_set(description: &str) -> Attribute {
    attribute(
        AttributeType::Set(Box::new(AttributeType::String)),
        AttributeConstraint::Optional,
        description,
    )
}

pub(crate) fn required_list(description: &str) -> Attribute {
    attribute(
        AttributeType::List(Box::new(AttributeType::String)),
        AttributeConstraint::Required,
        description,
    )
}

pub(crate) fn optional_list(description: &str) -> Attribute {
    attribute(
        AttributeType::List(Box::new(AttributeType::String)),
        AttributeConstraint::Optional,
        description,
    )
}

/// Repeatable nested block, kept in declaration order.
pub(crate) fn list(
    description: &str,
    attributes: HashMap<String, Attribute>,
    blocks: HashMap<String, NestedBlock>,
) -> NestedBlock {
    NestedBlock::List(block(description, attributes, blocks))
}

/// Nested block declared at most once.
pub(crate) fn optional(
    description: &str,
    attributes: HashMap<String, Attribute>,
    blocks: HashMap<String, NestedBlock>,
) -> NestedBlock {
    NestedBlock::Optional(block(description, attributes, blocks))
}

pub(crate) fn block(
    description: &str,
    attributes: HashMap<String, Attribute>,
    blocks: HashMap<String, NestedBlock>,
) -> Block {
    Block {
        version: 1,
        attributes,
        blocks,
        description: Description::plain(description),
        ..Default::default()
    }
}
