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

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::junos::show_config;

pub mod local;
#[cfg(test)]
pub mod memory;

/// Access to a Junos device CLI.
#[async_trait]
pub trait Session: Send + Sync + std::fmt::Debug {
    /// Run a read-only CLI command and return its raw output
    async fn command(&self, cmd: &str) -> Result<String>;

    /// Stage `set`/`delete` statements into the candidate configuration
    async fn config_set(&self, lines: &[String]) -> Result<()>;
}

/// Check if the configuration at `path` is present on the device.
///
/// Always a fresh round trip: device state may change between two calls.
pub async fn exists(session: &dyn Session, path: &str) -> Result<bool> {
    let output = session.command(&show_config(path)).await?;
    let found = !output.trim().is_empty();
    debug!(path, found, "existence check");
    Ok(found)
}

/// Serializes device reads sharing a session.
///
/// Handed explicitly to the read path instead of living in a global.
#[derive(Debug, Default)]
pub struct ReadLock(Mutex<()>);

impl ReadLock {
    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.0.lock().await
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::memory::MemorySession;
    use super::*;

    #[derive(Debug)]
    struct Broken;

    #[async_trait]
    impl Session for Broken {
        async fn command(&self, _cmd: &str) -> Result<String> {
            Err(anyhow!("connection reset"))
        }
        async fn config_set(&self, _lines: &[String]) -> Result<()> {
            Err(anyhow!("connection reset"))
        }
    }

    #[tokio::test]
    async fn exists_follows_output() {
        let session = MemorySession::default();
        assert!(!exists(&session, "security zones security-zone \"trust\"").await.unwrap());

        session
            .config_set(&["set security zones security-zone \"trust\" tcp-rst".to_owned()])
            .await
            .unwrap();
        assert!(exists(&session, "security zones security-zone \"trust\"").await.unwrap());
        assert!(!exists(&session, "security zones security-zone \"untrust\"").await.unwrap());
    }

    #[tokio::test]
    async fn exists_propagates_transport_errors() {
        let err = exists(&Broken, "interfaces ge-0/0/0 unit 0").await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
    }
}
