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

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use tf_provider::value::Value;
use tf_provider::schema::Schema;
use tf_provider::value::ValueEmpty;
use tf_provider::{map, AttributePath, Diagnostics, Provider};

use crate::engine::{schema, JunosResource, ProviderContext};
use crate::resources::{FirewallFilter, InterfaceLogical, OspfArea, SecurityZone};
use crate::session::local::LocalSession;
use crate::utils::{string_of, Text};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub cli_command: Value<Vec<Text>>,
    pub config_command: Value<Vec<Text>>,
}

fn command_of(value: &Value<Vec<Text>>) -> Option<Vec<String>> {
    match value {
        Value::Value(words) => Some(words.iter().filter_map(string_of).collect()),
        _ => None,
    }
}

#[derive(Debug, Default, Clone)]
pub struct JunosProvider {
    ctx: Arc<ProviderContext>,
}

#[async_trait]
impl Provider for JunosProvider {
    type Config<'a> = Value<ProviderConfig>;
    type MetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: schema::block(
                "junos",
                map! {
                    "cli_command" => schema::required_list(
                        "Program and arguments running one Junos CLI command, given as last argument"
                    ),
                    "config_command" => schema::optional_list(
                        "Program and arguments loading set/delete statements from stdin, defaults to cli_command"
                    ),
                },
                Default::default(),
            ),
        })
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::Config<'a>) -> Option<()> {
        if let Value::Value(config) = &config {
            if matches!(command_of(&config.cli_command), Some(cli) if cli.is_empty()) {
                diags.error_short(
                    "`cli_command` must at least name the program to run",
                    AttributePath::new("cli_command"),
                );
            }
        }

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn configure<'a>(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        let Value::Value(config) = config else {
            diags.root_error_short("Provider configuration is not known");
            return None;
        };
        let cli = command_of(&config.cli_command).unwrap_or_default();
        let session = match LocalSession::new(cli, command_of(&config.config_command)) {
            Ok(session) => session,
            Err(err) => {
                diags.root_error("Invalid provider configuration", format!("{err:#}"));
                return None;
            }
        };

        info!(%terraform_version, ?session, "provider configured");
        self.ctx.set_session(Arc::new(session)).await;
        Some(())
    }

    fn get_resources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<std::collections::HashMap<String, Box<dyn tf_provider::DynamicResource>>>
    {
        Some(map! {
            "firewall_filter"   => JunosResource::<FirewallFilter>::new(self.ctx.clone()),
            "interface_logical" => JunosResource::<InterfaceLogical>::new(self.ctx.clone()),
            "ospf_area"         => JunosResource::<OspfArea>::new(self.ctx.clone()),
            "security_zone"     => JunosResource::<SecurityZone>::new(self.ctx.clone()),
        })
    }

    fn get_data_sources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<
        std::collections::HashMap<String, Box<dyn tf_provider::DynamicDataSource>>,
    > {
        Some(Default::default())
    }
}
