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

//! Generic CRUD engine shared by every Junos resource.
//!
//! A resource only declares, through [`ResourceKind`], where its object lives
//! in the configuration tree, how its Terraform state maps onto a record, and
//! the setter/parser pair translating that record to and from statements.

use std::borrow::Cow;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tf_provider::schema::Schema;
use tf_provider::value::Value;
use tf_provider::Diagnostics;
use tokio::sync::RwLock;

use crate::junos::{ConfigError, SetList};
use crate::session::{ReadLock, Session};
use crate::utils::Text;

mod apply;
mod read;
mod resource;
pub(crate) mod schema;

pub use apply::{create, destroy, update};
pub use read::read_record;

pub trait ResourceKind: Debug + Send + Sync + 'static {
    /// Terraform type name, without the provider prefix
    const NAME: &'static str;

    type Key: Debug + Clone + PartialEq + Send + Sync;
    type Record: Debug + Default + Send + Sync;
    type State: Debug + Default + Clone + Serialize + DeserializeOwned + Send + Sync;

    fn schema() -> Schema;

    /// Checks that need no device, reported as attribute diagnostics
    fn validate(_diags: &mut Diagnostics, _state: &Self::State) {}

    /// Attributes locating the object; changing one replaces the resource
    fn key_attributes(state: &Self::State) -> Vec<(&'static str, &Text)>;
    /// `None` while a key attribute is still unknown
    fn key(state: &Self::State) -> Option<Self::Key>;
    fn id_mut(state: &mut Self::State) -> &mut Text;
    fn format_id(key: &Self::Key) -> String;
    fn parse_id(id: &str) -> Result<Self::Key, ConfigError>;

    /// Configuration path of the object, without the leading `set `
    fn path(key: &Self::Key) -> String;

    fn to_record(state: &Self::State) -> Result<Self::Record, ConfigError>;
    /// State without its id
    fn to_state(key: &Self::Key, record: Self::Record) -> Self::State;

    /// Append the statements configuring `record` under `prefix`
    fn emit(record: &Self::Record, prefix: &str, list: &mut SetList) -> Result<(), ConfigError>;
    /// Fold one relative `set` line (without `set `) into `record`
    fn parse(record: &mut Self::Record, line: &str) -> Result<(), ConfigError>;
}

/// Statements creating the object: the bare path, then every attribute.
///
/// On error no statement is returned.
pub fn set_lines<K: ResourceKind>(key: &K::Key, record: &K::Record) -> Result<Vec<String>, ConfigError> {
    let path = K::path(key);
    let mut list = SetList::new();
    list.push("set ", &path);
    K::emit(record, &format!("set {path} "), &mut list)?;
    Ok(list.into_lines())
}

pub fn delete_line<K: ResourceKind>(key: &K::Key) -> String {
    format!("delete {}", K::path(key))
}

/// Key attributes whose value differs between `prior` and `proposed`.
pub(crate) fn replaced_attributes<K: ResourceKind>(
    prior: &K::State,
    proposed: &K::State,
) -> Vec<&'static str> {
    K::key_attributes(prior)
        .into_iter()
        .zip(K::key_attributes(proposed))
        .filter(|((_, before), (_, after))| before != after)
        .map(|((name, _), _)| name)
        .collect()
}

/// Full Terraform state of an object, id included.
pub(crate) fn project<K: ResourceKind>(key: &K::Key, record: K::Record) -> K::State {
    let mut state = K::to_state(key, record);
    *K::id_mut(&mut state) = Value::Value(Cow::Owned(K::format_id(key)));
    state
}

/// State shared between the provider and its resources.
#[derive(Debug, Default)]
pub struct ProviderContext {
    session: RwLock<Option<Arc<dyn Session>>>,
    pub read_lock: ReadLock,
}

impl ProviderContext {
    pub async fn set_session(&self, session: Arc<dyn Session>) {
        *self.session.write().await = Some(session);
    }

    pub async fn session(&self) -> Option<Arc<dyn Session>> {
        self.session.read().await.clone()
    }
}

#[derive(Debug)]
pub struct JunosResource<K: ResourceKind> {
    ctx: Arc<ProviderContext>,
    kind: PhantomData<K>,
}

impl<K: ResourceKind> JunosResource<K> {
    pub fn new(ctx: Arc<ProviderContext>) -> Self {
        Self {
            ctx,
            kind: PhantomData,
        }
    }

    async fn session(&self, diags: &mut Diagnostics) -> Option<Arc<dyn Session>> {
        let session = self.ctx.session().await;
        if session.is_none() {
            diags.root_error(
                "Provider is not configured",
                format!(
                    "`{}` needs the provider `cli_command` to reach the device",
                    K::NAME
                ),
            );
        }
        session
    }
}
