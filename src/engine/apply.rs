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

use anyhow::{bail, Result};
use tracing::info;

use crate::session::{exists, Session};

use super::{delete_line, set_lines, ResourceKind};

/// Configure a new object, refusing to overwrite an existing one.
pub async fn create<K: ResourceKind>(session: &dyn Session, key: &K::Key, record: &K::Record) -> Result<()> {
    let lines = set_lines::<K>(key, record)?;
    let path = K::path(key);
    let id = K::format_id(key);

    if exists(session, &path).await? {
        bail!("{} {id} already exists", K::NAME);
    }

    info!(kind = K::NAME, id, statements = lines.len(), "creating");
    session.config_set(&lines).await?;

    if !exists(session, &path).await? {
        bail!("{} {id} does not exist after configuration => check your config", K::NAME);
    }
    Ok(())
}

/// Replace the object configuration: delete it, then set it again, in one batch.
pub async fn update<K: ResourceKind>(session: &dyn Session, key: &K::Key, record: &K::Record) -> Result<()> {
    let mut lines = vec![delete_line::<K>(key)];
    lines.extend(set_lines::<K>(key, record)?);

    info!(
        kind = K::NAME,
        id = K::format_id(key),
        statements = lines.len(),
        "updating"
    );
    session.config_set(&lines).await
}

pub async fn destroy<K: ResourceKind>(session: &dyn Session, key: &K::Key) -> Result<()> {
    info!(kind = K::NAME, id = K::format_id(key), "deleting");
    session.config_set(&[delete_line::<K>(key)]).await
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use crate::resources::security_zone::Zone;
    use crate::resources::SecurityZone;
    use crate::session::memory::MemorySession;

    use super::*;

    /// Accepts every statement but never shows anything.
    #[derive(Debug)]
    struct Blackhole;

    #[async_trait]
    impl Session for Blackhole {
        async fn command(&self, _cmd: &str) -> Result<String> {
            Ok(String::new())
        }

        async fn config_set(&self, _lines: &[String]) -> Result<()> {
            Ok(())
        }
    }

    fn zone() -> Zone {
        Zone {
            tcp_rst: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_refuses_existing_objects() {
        let session = MemorySession::default();
        let name = "trust".to_owned();
        create::<SecurityZone>(&session, &name, &zone()).await.unwrap();

        let err = create::<SecurityZone>(&session, &name, &zone())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "security_zone trust already exists");
        assert_eq!(session.batches().len(), 1);
    }

    #[tokio::test]
    async fn create_checks_the_device_accepted_it() {
        let err = create::<SecurityZone>(&Blackhole, &"trust".to_owned(), &zone())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "security_zone trust does not exist after configuration => check your config"
        );
    }

    #[tokio::test]
    async fn update_and_destroy_batches() {
        let session = MemorySession::default();
        let name = "trust".to_owned();
        create::<SecurityZone>(&session, &name, &zone()).await.unwrap();
        update::<SecurityZone>(&session, &name, &Zone::default())
            .await
            .unwrap();
        destroy::<SecurityZone>(&session, &name).await.unwrap();

        assert_eq!(
            session.batches(),
            [
                vec![
                    "set security zones security-zone trust".to_owned(),
                    "set security zones security-zone trust tcp-rst".to_owned(),
                ],
                vec![
                    "delete security zones security-zone trust".to_owned(),
                    "set security zones security-zone trust".to_owned(),
                ],
                vec!["delete security zones security-zone trust".to_owned()],
            ]
        );
        assert!(!exists(&session, "security zones security-zone trust")
            .await
            .unwrap());
    }
}
