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

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tf_provider::value::Value;
use tf_provider::schema::{Attribute, NestedBlock};
use tf_provider::schema::Schema;
use tf_provider::{map, AttributePath, Diagnostics};

use crate::engine::{schema, ResourceKind};
use crate::junos::merge::check_unique;
use crate::junos::{
    cut_prefix, cut_suffix, exclusive, find_or_create, identifier, next_word, split_id,
    unquote, ConfigError, Keyed, SetList, ID_SEPARATOR,
};
use crate::utils::{
    block_of, block_value, blocks_of, blocks_value, flag_of, flag_value, string_of, string_value,
    strings_of, strings_value, Blocks, Text, TextSet,
};

const FAMILIES: &[&str] = &[
    "any",
    "ccc",
    "ethernet-switching",
    "inet",
    "inet6",
    "mpls",
    "vpls",
];
const ACTIONS: &[&str] = &["accept", "reject", "discard", "next term"];
// Junos has no bare `from` or `then` statement, an empty block would not read back
const EMPTY_FROM: &str = "from block needs at least one match condition";
const EMPTY_THEN: &str = "then block needs at least one action";

#[derive(Debug, Default)]
pub struct FirewallFilter;

#[derive(Debug, Clone, PartialEq)]
pub struct FilterKey {
    pub name: String,
    pub family: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Filter {
    pub interface_specific: bool,
    pub terms: Vec<Term>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Term {
    pub name: String,
    pub filter: Option<String>,
    pub from: Option<TermFrom>,
    pub then: Option<TermThen>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TermFrom {
    pub address: BTreeSet<String>,
    pub address_except: BTreeSet<String>,
    pub destination_address: BTreeSet<String>,
    pub destination_address_except: BTreeSet<String>,
    pub source_address: BTreeSet<String>,
    pub source_address_except: BTreeSet<String>,
    pub prefix_list: BTreeSet<String>,
    pub prefix_list_except: BTreeSet<String>,
    pub port: BTreeSet<String>,
    pub port_except: BTreeSet<String>,
    pub destination_port: BTreeSet<String>,
    pub destination_port_except: BTreeSet<String>,
    pub source_port: BTreeSet<String>,
    pub source_port_except: BTreeSet<String>,
    pub protocol: BTreeSet<String>,
    pub protocol_except: BTreeSet<String>,
    pub icmp_type: BTreeSet<String>,
    pub icmp_type_except: BTreeSet<String>,
    pub tcp_flags: Option<String>,
    pub tcp_established: bool,
    pub tcp_initial: bool,
    pub is_fragment: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TermThen {
    pub action: Option<String>,
    pub count: Option<String>,
    pub policer: Option<String>,
    pub log: bool,
    pub syslog: bool,
    pub port_mirror: bool,
    pub service_accounting: bool,
}

impl Keyed for Term {
    type Key = String;
    const BLOCK: &'static str = "term";
    const KEY_ATTRIBUTE: &'static str = "name";

    fn key(&self) -> String {
        self.name.clone()
    }

    fn with_key(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

impl Term {
    fn emit(&self, prefix: &str, list: &mut SetList) -> Result<(), ConfigError> {
        let name = identifier(&self.name);
        let term = format!("{prefix}term {name} ");
        let before = list.len();
        list.word(&term, "filter", self.filter.as_deref());
        if let Some(from) = &self.from {
            if *from == TermFrom::default() {
                return Err(ConfigError::invalid("term", &self.name, EMPTY_FROM));
            }
            from.emit(&format!("{term}from "), list)?;
        }
        if let Some(then) = &self.then {
            if *then == TermThen::default() {
                return Err(ConfigError::invalid("term", &self.name, EMPTY_THEN));
            }
            then.emit(&format!("{term}then "), list);
        }
        // keep empty terms on the device
        if list.len() == before {
            list.push(prefix, format_args!("term {name}"));
        }
        Ok(())
    }

    fn parse(&mut self, mut line: &str) -> Result<(), ConfigError> {
        if cut_prefix(&mut line, "filter ") {
            self.filter = Some(unquote(line).into_owned());
        } else if cut_prefix(&mut line, "from ") {
            self.from.get_or_insert_with(Default::default).parse(line)?;
        } else if cut_prefix(&mut line, "then ") {
            self.then.get_or_insert_with(Default::default).parse(line);
        }
        Ok(())
    }
}

impl TermFrom {
    fn emit(&self, prefix: &str, list: &mut SetList) -> Result<(), ConfigError> {
        list.except_suffix_pair(
            prefix,
            ("address", "address_except"),
            "address",
            &self.address,
            &self.address_except,
        )?;
        list.except_suffix_pair(
            prefix,
            ("destination_address", "destination_address_except"),
            "destination-address",
            &self.destination_address,
            &self.destination_address_except,
        )?;
        list.except_suffix_pair(
            prefix,
            ("source_address", "source_address_except"),
            "source-address",
            &self.source_address,
            &self.source_address_except,
        )?;
        list.except_suffix_pair(
            prefix,
            ("prefix_list", "prefix_list_except"),
            "prefix-list",
            &self.prefix_list,
            &self.prefix_list_except,
        )?;
        list.except_pair(
            prefix,
            ("port", "port_except"),
            ("port", "port-except"),
            &self.port,
            &self.port_except,
        )?;
        list.except_pair(
            prefix,
            ("destination_port", "destination_port_except"),
            ("destination-port", "destination-port-except"),
            &self.destination_port,
            &self.destination_port_except,
        )?;
        list.except_pair(
            prefix,
            ("source_port", "source_port_except"),
            ("source-port", "source-port-except"),
            &self.source_port,
            &self.source_port_except,
        )?;
        list.except_pair(
            prefix,
            ("protocol", "protocol_except"),
            ("protocol", "protocol-except"),
            &self.protocol,
            &self.protocol_except,
        )?;
        list.except_pair(
            prefix,
            ("icmp_type", "icmp_type_except"),
            ("icmp-type", "icmp-type-except"),
            &self.icmp_type,
            &self.icmp_type_except,
        )?;

        exclusive(
            ("tcp_flags", self.tcp_flags.is_some()),
            ("tcp_established", self.tcp_established),
        )?;
        exclusive(
            ("tcp_flags", self.tcp_flags.is_some()),
            ("tcp_initial", self.tcp_initial),
        )?;
        exclusive(
            ("tcp_established", self.tcp_established),
            ("tcp_initial", self.tcp_initial),
        )?;
        list.text(prefix, "tcp-flags", self.tcp_flags.as_deref());
        list.flag(prefix, "tcp-established", self.tcp_established);
        list.flag(prefix, "tcp-initial", self.tcp_initial);
        list.flag(prefix, "is-fragment", self.is_fragment);
        Ok(())
    }

    fn parse(&mut self, mut line: &str) -> Result<(), ConfigError> {
        let (values, except) = if cut_prefix(&mut line, "address ") {
            (&mut self.address, &mut self.address_except)
        } else if cut_prefix(&mut line, "destination-address ") {
            (&mut self.destination_address, &mut self.destination_address_except)
        } else if cut_prefix(&mut line, "source-address ") {
            (&mut self.source_address, &mut self.source_address_except)
        } else if cut_prefix(&mut line, "prefix-list ") {
            (&mut self.prefix_list, &mut self.prefix_list_except)
        } else {
            return self.parse_match(line);
        };

        if cut_suffix(&mut line, " except") {
            except.insert(unquote(line).into_owned());
        } else {
            values.insert(unquote(line).into_owned());
        }
        Ok(())
    }

    fn parse_match(&mut self, mut line: &str) -> Result<(), ConfigError> {
        let target = if cut_prefix(&mut line, "destination-port-except ") {
            &mut self.destination_port_except
        } else if cut_prefix(&mut line, "destination-port ") {
            &mut self.destination_port
        } else if cut_prefix(&mut line, "source-port-except ") {
            &mut self.source_port_except
        } else if cut_prefix(&mut line, "source-port ") {
            &mut self.source_port
        } else if cut_prefix(&mut line, "port-except ") {
            &mut self.port_except
        } else if cut_prefix(&mut line, "port ") {
            &mut self.port
        } else if cut_prefix(&mut line, "protocol-except ") {
            &mut self.protocol_except
        } else if cut_prefix(&mut line, "protocol ") {
            &mut self.protocol
        } else if cut_prefix(&mut line, "icmp-type-except ") {
            &mut self.icmp_type_except
        } else if cut_prefix(&mut line, "icmp-type ") {
            &mut self.icmp_type
        } else {
            match line {
                "tcp-established" => self.tcp_established = true,
                "tcp-initial" => self.tcp_initial = true,
                "is-fragment" => self.is_fragment = true,
                _ => {
                    if cut_prefix(&mut line, "tcp-flags ") {
                        self.tcp_flags = Some(unquote(line).into_owned());
                    }
                }
            }
            return Ok(());
        };
        target.insert(unquote(line).into_owned());
        Ok(())
    }
}

impl TermThen {
    fn emit(&self, prefix: &str, list: &mut SetList) {
        if let Some(action) = &self.action {
            list.push(prefix, action);
        }
        list.word(prefix, "count", self.count.as_deref());
        list.word(prefix, "policer", self.policer.as_deref());
        list.flag(prefix, "log", self.log);
        list.flag(prefix, "syslog", self.syslog);
        list.flag(prefix, "port-mirror", self.port_mirror);
        list.flag(prefix, "service-accounting", self.service_accounting);
    }

    fn parse(&mut self, mut line: &str) {
        match line {
            "accept" | "reject" | "discard" | "next term" => self.action = Some(line.to_owned()),
            "log" => self.log = true,
            "syslog" => self.syslog = true,
            "port-mirror" => self.port_mirror = true,
            "service-accounting" => self.service_accounting = true,
            _ => {
                if cut_prefix(&mut line, "count ") {
                    self.count = Some(unquote(line).into_owned());
                } else if cut_prefix(&mut line, "policer ") {
                    self.policer = Some(unquote(line).into_owned());
                }
            }
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub id: Text,
    pub name: Text,
    pub family: Text,
    pub interface_specific: Value<bool>,
    pub term: Blocks<TermState>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TermState {
    pub name: Text,
    pub filter: Text,
    pub from: Value<TermFromState>,
    pub then: Value<TermThenState>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TermFromState {
    pub address: TextSet,
    pub address_except: TextSet,
    pub destination_address: TextSet,
    pub destination_address_except: TextSet,
    pub source_address: TextSet,
    pub source_address_except: TextSet,
    pub prefix_list: TextSet,
    pub prefix_list_except: TextSet,
    pub port: TextSet,
    pub port_except: TextSet,
    pub destination_port: TextSet,
    pub destination_port_except: TextSet,
    pub source_port: TextSet,
    pub source_port_except: TextSet,
    pub protocol: TextSet,
    pub protocol_except: TextSet,
    pub icmp_type: TextSet,
    pub icmp_type_except: TextSet,
    pub tcp_flags: Text,
    pub tcp_established: Value<bool>,
    pub tcp_initial: Value<bool>,
    pub is_fragment: Value<bool>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TermThenState {
    pub action: Text,
    pub count: Text,
    pub policer: Text,
    pub log: Value<bool>,
    pub syslog: Value<bool>,
    pub port_mirror: Value<bool>,
    pub service_accounting: Value<bool>,
}

impl From<&TermState> for Term {
    fn from(state: &TermState) -> Self {
        Self {
            name: string_of(&state.name).unwrap_or_default(),
            filter: string_of(&state.filter),
            from: block_of(&state.from).map(TermFrom::from),
            then: block_of(&state.then).map(TermThen::from),
        }
    }
}

impl From<Term> for TermState {
    fn from(term: Term) -> Self {
        Self {
            name: string_value(Some(term.name)),
            filter: string_value(term.filter),
            from: block_value(term.from.map(Into::into)),
            then: block_value(term.then.map(Into::into)),
        }
    }
}

impl From<&TermFromState> for TermFrom {
    fn from(state: &TermFromState) -> Self {
        Self {
            address: strings_of(&state.address),
            address_except: strings_of(&state.address_except),
            destination_address: strings_of(&state.destination_address),
            destination_address_except: strings_of(&state.destination_address_except),
            source_address: strings_of(&state.source_address),
            source_address_except: strings_of(&state.source_address_except),
            prefix_list: strings_of(&state.prefix_list),
            prefix_list_except: strings_of(&state.prefix_list_except),
            port: strings_of(&state.port),
            port_except: strings_of(&state.port_except),
            destination_port: strings_of(&state.destination_port),
            destination_port_except: strings_of(&state.destination_port_except),
            source_port: strings_of(&state.source_port),
            source_port_except: strings_of(&state.source_port_except),
            protocol: strings_of(&state.protocol),
            protocol_except: strings_of(&state.protocol_except),
            icmp_type: strings_of(&state.icmp_type),
            icmp_type_except: strings_of(&state.icmp_type_except),
            tcp_flags: string_of(&state.tcp_flags),
            tcp_established: flag_of(&state.tcp_established),
            tcp_initial: flag_of(&state.tcp_initial),
            is_fragment: flag_of(&state.is_fragment),
        }
    }
}

impl From<TermFrom> for TermFromState {
    fn from(from: TermFrom) -> Self {
        Self {
            address: strings_value(from.address),
            address_except: strings_value(from.address_except),
            destination_address: strings_value(from.destination_address),
            destination_address_except: strings_value(from.destination_address_except),
            source_address: strings_value(from.source_address),
            source_address_except: strings_value(from.source_address_except),
            prefix_list: strings_value(from.prefix_list),
            prefix_list_except: strings_value(from.prefix_list_except),
            port: strings_value(from.port),
            port_except: strings_value(from.port_except),
            destination_port: strings_value(from.destination_port),
            destination_port_except: strings_value(from.destination_port_except),
            source_port: strings_value(from.source_port),
            source_port_except: strings_value(from.source_port_except),
            protocol: strings_value(from.protocol),
            protocol_except: strings_value(from.protocol_except),
            icmp_type: strings_value(from.icmp_type),
            icmp_type_except: strings_value(from.icmp_type_except),
            tcp_flags: string_value(from.tcp_flags),
            tcp_established: flag_value(from.tcp_established),
            tcp_initial: flag_value(from.tcp_initial),
            is_fragment: flag_value(from.is_fragment),
        }
    }
}

impl From<&TermThenState> for TermThen {
    fn from(state: &TermThenState) -> Self {
        Self {
            action: string_of(&state.action),
            count: string_of(&state.count),
            policer: string_of(&state.policer),
            log: flag_of(&state.log),
            syslog: flag_of(&state.syslog),
            port_mirror: flag_of(&state.port_mirror),
            service_accounting: flag_of(&state.service_accounting),
        }
    }
}

impl From<TermThen> for TermThenState {
    fn from(then: TermThen) -> Self {
        Self {
            action: string_value(then.action),
            count: string_value(then.count),
            policer: string_value(then.policer),
            log: flag_value(then.log),
            syslog: flag_value(then.syslog),
            port_mirror: flag_value(then.port_mirror),
            service_accounting: flag_value(then.service_accounting),
        }
    }
}

const MATCH_PAIRS: &[(&str, &str)] = &[
    ("address", "IP source or destination address"),
    ("destination_address", "IP destination address"),
    ("source_address", "IP source address"),
    ("prefix_list", "IP source or destination prefix list"),
    ("port", "TCP/UDP source or destination port"),
    ("destination_port", "TCP/UDP destination port"),
    ("source_port", "TCP/UDP source port"),
    ("protocol", "IP protocol type"),
    ("icmp_type", "ICMP message type"),
];

fn from_schema() -> NestedBlock {
    let mut attributes: HashMap<String, Attribute> = map! {
        "tcp_flags" => schema::optional_string("Match TCP flags, conflicts with tcp_established and tcp_initial"),
        "tcp_established" => schema::optional_bool("Match packet of an established TCP connection"),
        "tcp_initial" => schema::optional_bool("Match initial packet of a TCP connection"),
        "is_fragment" => schema::optional_bool("Match if packet is a fragment"),
    };
    for (name, what) in MATCH_PAIRS {
        attributes.insert(
            name.to_string(),
            schema::optional_set(&format!("Match {what}")),
        );
        attributes.insert(
            format!("{name}_except"),
            schema::optional_set(&format!("Do not match {what}")),
        );
    }
    schema::optional("Match conditions", attributes, Default::default())
}

impl ResourceKind for FirewallFilter {
    const NAME: &'static str = "firewall_filter";

    type Key = FilterKey;
    type Record = Filter;
    type State = FilterState;

    fn schema() -> Schema {
        Schema {
            version: 1,
            block: schema::block(
                "Firewall filter applied on interfaces",
                map! {
                    "id" => schema::id(),
                    "name" => schema::required_string("Filter name"),
                    "family" => schema::required_string("Family where the filter is defined"),
                    "interface_specific" => schema::optional_bool("Interface-specific instances of the filter"),
                },
                map! {
                    "term" => schema::list(
                        "Terms, evaluated in declaration order",
                        map! {
                            "name" => schema::required_string("Term name"),
                            "filter" => schema::optional_string("Filter to include"),
                        },
                        map! {
                            "from" => from_schema(),
                            "then" => schema::optional(
                                "Action to take if the conditions match",
                                map! {
                                    "action" => schema::optional_string("accept, reject, discard or next term"),
                                    "count" => schema::optional_string("Count the packet in the named counter"),
                                    "policer" => schema::optional_string("Name of policer to use to rate-limit traffic"),
                                    "log" => schema::optional_bool("Log the packet"),
                                    "syslog" => schema::optional_bool("System log (syslog) information about the packet"),
                                    "port_mirror" => schema::optional_bool("Port-mirror the packet"),
                                    "service_accounting" => schema::optional_bool("Count the packets for service accounting"),
                                },
                                Default::default(),
                            ),
                        },
                    ),
                },
            ),
        }
    }

    fn validate(diags: &mut Diagnostics, state: &FilterState) {
        if let Value::Value(family) = &state.family {
            let family: &str = family;
            if !FAMILIES.contains(&family) {
                diags.error(
                    "Invalid family",
                    format!("`{family}` is not one of {}", FAMILIES.join(", ")),
                    AttributePath::new("family"),
                );
            }
        }
        for (i, term) in blocks_of(&state.term).enumerate() {
            let path = AttributePath::new("term").index(i as i64);
            if block_of(&term.from).is_some_and(|from| *from == TermFromState::default()) {
                diags.error("Empty block", EMPTY_FROM, path.clone().attribute("from"));
            }
            if block_of(&term.then).is_some_and(|then| *then == TermThenState::default()) {
                diags.error("Empty block", EMPTY_THEN, path.clone().attribute("then"));
            }
            let Some(Value::Value(action)) = block_of(&term.then).map(|then| &then.action) else {
                continue;
            };
            let action: &str = action;
            if !ACTIONS.contains(&action) {
                diags.error(
                    "Invalid action",
                    format!("`{action}` is not one of {}", ACTIONS.join(", ")),
                    path.attribute("then").attribute("action"),
                );
            }
        }
    }

    fn key_attributes(state: &FilterState) -> Vec<(&'static str, &Text)> {
        vec![("name", &state.name), ("family", &state.family)]
    }

    fn key(state: &FilterState) -> Option<FilterKey> {
        match (&state.name, &state.family) {
            (Value::Value(name), Value::Value(family)) => Some(FilterKey {
                name: name.to_string(),
                family: family.to_string(),
            }),
            _ => None,
        }
    }

    fn id_mut(state: &mut FilterState) -> &mut Text {
        &mut state.id
    }

    fn format_id(key: &FilterKey) -> String {
        format!("{}{ID_SEPARATOR}{}", key.name, key.family)
    }

    fn parse_id(id: &str) -> Result<FilterKey, ConfigError> {
        let [name, family] = split_id(id)?;
        Ok(FilterKey {
            name: name.to_owned(),
            family: family.to_owned(),
        })
    }

    fn path(key: &FilterKey) -> String {
        format!(
            "firewall family {} filter {}",
            key.family,
            identifier(&key.name)
        )
    }

    fn to_record(state: &FilterState) -> Result<Filter, ConfigError> {
        Ok(Filter {
            interface_specific: flag_of(&state.interface_specific),
            terms: blocks_of(&state.term).map(Term::from).collect(),
        })
    }

    fn to_state(key: &FilterKey, filter: Filter) -> FilterState {
        FilterState {
            id: Value::Null,
            name: string_value(Some(key.name.clone())),
            family: string_value(Some(key.family.clone())),
            interface_specific: flag_value(filter.interface_specific),
            term: blocks_value(filter.terms, TermState::from),
        }
    }

    fn emit(filter: &Filter, prefix: &str, list: &mut SetList) -> Result<(), ConfigError> {
        check_unique(&filter.terms)?;
        list.flag(prefix, "interface-specific", filter.interface_specific);
        for term in &filter.terms {
            term.emit(prefix, list)?;
        }
        Ok(())
    }

    fn parse(filter: &mut Filter, mut line: &str) -> Result<(), ConfigError> {
        if line == "interface-specific" {
            filter.interface_specific = true;
        } else if cut_prefix(&mut line, "term ") {
            let Some(name) = next_word(&mut line) else {
                return Err(ConfigError::not_enough_fields("term", line));
            };
            find_or_create(&mut filter.terms, name.into_owned()).parse(line)?;
        }
        Ok(())
    }
}
