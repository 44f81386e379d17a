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

use async_trait::async_trait;
use tracing::warn;

use tf_provider::value::{Value, ValueEmpty};
use tf_provider::{schema::Schema, AttributePath, Diagnostics, Resource};

use crate::session::exists;

use super::{
    create, destroy, project, read_record, replaced_attributes, update, JunosResource,
    ResourceKind,
};

#[async_trait]
impl<K: ResourceKind> Resource for JunosResource<K> {
    type State<'a> = Value<K::State>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(K::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        if let Value::Value(config) = &config {
            K::validate(diags, config);
        }

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let Some(key) = state.as_ref_option().and_then(K::key) else {
            return Some((state, private_state));
        };
        let session = self.session(diags).await?;

        match read_record::<K>(session.as_ref(), &self.ctx.read_lock, &key).await {
            Ok(Some(record)) => Some((Value::Value(project::<K>(&key, record)), private_state)),
            Ok(None) => {
                warn!(kind = K::NAME, id = K::format_id(&key), "object vanished from the device");
                Some((Value::Null, private_state))
            }
            Err(err) => {
                diags.root_error(format!("Failed to read {}", K::NAME), format!("{err:#}"));
                None
            }
        }
    }

    async fn plan_create<'a>(
        &self,
        _diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = proposed_state;
        if let Value::Value(state) = &mut state {
            *K::id_mut(state) = Value::Unknown;
        }
        Some((state, Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        _diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(
        Self::State<'a>,
        Self::PrivateState<'a>,
        Vec<tf_provider::AttributePath>,
    )> {
        let mut state = proposed_state;
        let mut trigger_replace = Vec::new();

        if let (Value::Value(prior), Value::Value(proposed)) = (&prior_state, &mut state) {
            trigger_replace = replaced_attributes::<K>(prior, proposed)
                .into_iter()
                .map(AttributePath::new)
                .collect();
            if !trigger_replace.is_empty() {
                *K::id_mut(proposed) = Value::Unknown;
            }
        }

        Some((state, prior_private_state, trigger_replace))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::PrivateState<'a>> {
        Some(prior_private_state)
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let (key, mut state, record) = self.planned(diags, planned_state)?;
        let session = self.session(diags).await?;

        if let Err(err) = create::<K>(session.as_ref(), &key, &record).await {
            diags.root_error(format!("Failed to create {}", K::NAME), format!("{err:#}"));
            return None;
        }

        *K::id_mut(&mut state) = Value::Value(K::format_id(&key).into());
        Some((Value::Value(state), private_state))
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let (key, mut state, record) = self.planned(diags, planned_state)?;
        let session = self.session(diags).await?;

        if let Err(err) = update::<K>(session.as_ref(), &key, &record).await {
            diags.root_error(format!("Failed to update {}", K::NAME), format!("{err:#}"));
            return None;
        }

        *K::id_mut(&mut state) = Value::Value(K::format_id(&key).into());
        Some((Value::Value(state), private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let Some(key) = state.as_ref_option().and_then(K::key) else {
            diags.root_error_short(format!("Cannot destroy {}: key attributes are not known", K::NAME));
            return None;
        };
        let session = self.session(diags).await?;

        if let Err(err) = destroy::<K>(session.as_ref(), &key).await {
            diags.root_error(format!("Failed to destroy {}", K::NAME), format!("{err:#}"));
            return None;
        }
        Some(())
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let key = match K::parse_id(&id) {
            Ok(key) => key,
            Err(err) => {
                diags.root_error(format!("Invalid {} import id", K::NAME), err.to_string());
                return None;
            }
        };
        let session = self.session(diags).await?;

        match exists(session.as_ref(), &K::path(&key)).await {
            Ok(true) => (),
            Ok(false) => {
                diags.root_error_short(format!("don't find {} with id '{id}'", K::NAME));
                return None;
            }
            Err(err) => {
                diags.root_error(format!("Failed to import {}", K::NAME), format!("{err:#}"));
                return None;
            }
        }

        // the attributes are filled by the read following the import
        let state = project::<K>(&key, Default::default());
        Some((Value::Value(state), Default::default()))
    }
}

impl<K: ResourceKind> JunosResource<K> {
    /// Key, state and record of a state planned for apply.
    fn planned(
        &self,
        diags: &mut Diagnostics,
        planned_state: Value<K::State>,
    ) -> Option<(K::Key, K::State, K::Record)> {
        let Value::Value(state) = planned_state else {
            diags.root_error_short(format!("Planned {} state is not known", K::NAME));
            return None;
        };
        let Some(key) = K::key(&state) else {
            diags.root_error_short(format!("{} key attributes are not known", K::NAME));
            return None;
        };
        match K::to_record(&state) {
            Ok(record) => Some((key, state, record)),
            Err(err) => {
                diags.root_error(format!("Invalid {} configuration", K::NAME), err.to_string());
                None
            }
        }
    }
}
