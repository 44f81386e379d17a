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

use anyhow::{Context, Result};
use tracing::debug;

use crate::junos::{parse_lines, show_config_relative};
use crate::session::{ReadLock, Session};

use super::ResourceKind;

/// Read the object at `key` back from the device.
///
/// `None` when the device has no configuration under the object path. A line
/// that fails to parse aborts the read: no partial record is returned.
pub async fn read_record<K: ResourceKind>(
    session: &dyn Session,
    lock: &ReadLock,
    key: &K::Key,
) -> Result<Option<K::Record>> {
    let path = K::path(key);

    let _guard = lock.acquire().await;
    let output = session.command(&show_config_relative(&path)).await?;
    if output.trim().is_empty() {
        debug!(kind = K::NAME, path, "object not found");
        return Ok(None);
    }

    let mut record = K::Record::default();
    parse_lines(&output, &mut record, K::parse)
        .with_context(|| format!("failed to read {} {}", K::NAME, K::format_id(key)))?;
    debug!(kind = K::NAME, path, ?record, "object read");
    Ok(Some(record))
}
