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

use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use super::Session;

/// Candidate configuration held as a flat list of `set` paths.
#[derive(Debug, Default)]
pub struct MemorySession {
    statements: Mutex<Vec<String>>,
    batches: Mutex<Vec<Vec<String>>>,
}

impl MemorySession {
    /// Every statement batch received by `config_set`, in order.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().map(|b| b.clone()).unwrap_or_default()
    }

    fn under<'a>(statement: &'a str, path: &str) -> Option<&'a str> {
        if statement == path {
            Some("")
        } else {
            statement.strip_prefix(path)?.strip_prefix(' ')
        }
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn command(&self, cmd: &str) -> Result<String> {
        let query = cmd
            .strip_prefix("show configuration ")
            .ok_or_else(|| anyhow!("unsupported command: {cmd}"))?;
        let (path, relative) = if let Some(path) = query.strip_suffix(" | display set relative") {
            (path, true)
        } else if let Some(path) = query.strip_suffix(" | display set") {
            (path, false)
        } else {
            bail!("unsupported command: {cmd}");
        };

        let statements = self.statements.lock().map_err(|_| anyhow!("poisoned"))?;
        let mut output = String::new();
        for statement in statements.iter() {
            let Some(rest) = Self::under(statement, path) else {
                continue;
            };
            match (relative, rest.is_empty()) {
                (true, true) => output.push_str("set"),
                (true, false) => output.push_str(&format!("set {rest}")),
                (false, _) => output.push_str(&format!("set {statement}")),
            }
            output.push('\n');
        }
        Ok(output)
    }

    async fn config_set(&self, lines: &[String]) -> Result<()> {
        let mut statements = self.statements.lock().map_err(|_| anyhow!("poisoned"))?;
        for line in lines {
            if let Some(path) = line.strip_prefix("set ") {
                if !statements.iter().any(|s| s == path) {
                    statements.push(path.to_owned());
                }
            } else if let Some(path) = line.strip_prefix("delete ") {
                statements.retain(|s| Self::under(s, path).is_none());
            } else {
                bail!("error: syntax error: {line}");
            }
        }
        self.batches
            .lock()
            .map_err(|_| anyhow!("poisoned"))?
            .push(lines.to_vec());
        Ok(())
    }
}
