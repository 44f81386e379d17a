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

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tf_provider::value::Value;
use tf_provider::map;
use tf_provider::schema::Schema;

use crate::engine::{schema, ResourceKind};
use crate::junos::merge::check_unique;
use crate::junos::{
    cut_prefix, exclusive, find_or_create, identifier, next_word, unquote, ConfigError, Keyed,
    SetList,
};
use crate::utils::{
    blocks_of, blocks_value, flag_of, flag_value, string_of, string_value, strings_of,
    strings_value, Blocks, Text, TextSet,
};

#[derive(Debug, Default)]
pub struct SecurityZone;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Zone {
    pub description: Option<String>,
    pub screen: Option<String>,
    pub application_tracking: bool,
    pub tcp_rst: bool,
    pub inbound: Inbound,
    pub addresses: Vec<Address>,
    pub address_sets: Vec<AddressSet>,
    pub interfaces: Vec<ZoneInterface>,
}

/// Host inbound traffic allowed through a zone or one of its interfaces.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Inbound {
    pub protocols: BTreeSet<String>,
    pub services: BTreeSet<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Address {
    pub name: String,
    pub network: Option<String>,
    pub dns_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AddressSet {
    pub name: String,
    pub address: BTreeSet<String>,
    pub address_set: BTreeSet<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ZoneInterface {
    pub name: String,
    pub inbound: Inbound,
}

macro_rules! keyed_by_name {
    ($($record:ident => $block:literal),* $(,)?) => {
        $(
            impl Keyed for $record {
                type Key = String;
                const BLOCK: &'static str = $block;
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
        )*
    };
}

keyed_by_name! {
    Address => "address_book",
    AddressSet => "address_book_set",
    ZoneInterface => "interface",
}

impl Inbound {
    fn emit(&self, prefix: &str, list: &mut SetList) {
        list.values(prefix, "host-inbound-traffic protocols", &self.protocols);
        list.values(prefix, "host-inbound-traffic system-services", &self.services);
    }

    /// Returns false when `line` is not a host inbound traffic statement.
    fn parse(&mut self, mut line: &str) -> bool {
        if !cut_prefix(&mut line, "host-inbound-traffic ") {
            return false;
        }
        if cut_prefix(&mut line, "protocols ") {
            self.protocols.insert(unquote(line).into_owned());
        } else if cut_prefix(&mut line, "system-services ") {
            self.services.insert(unquote(line).into_owned());
        }
        true
    }
}

impl Address {
    fn emit(&self, prefix: &str, list: &mut SetList) -> Result<(), ConfigError> {
        exclusive(
            ("network", self.network.is_some()),
            ("dns_name", self.dns_name.is_some()),
        )?;
        let name = identifier(&self.name);
        let address = format!("{prefix}address-book address {name} ");
        match (&self.network, &self.dns_name) {
            (Some(network), _) => list.push(&address, network),
            (_, Some(dns_name)) => list.word(&address, "dns-name", Some(dns_name)),
            (None, None) => {
                return Err(ConfigError::invalid(
                    "address_book",
                    &self.name,
                    "one of network or dns_name must be set",
                ))
            }
        }
        list.text(&address, "description", self.description.as_deref());
        Ok(())
    }

    fn parse(&mut self, mut line: &str) {
        if cut_prefix(&mut line, "description ") {
            self.description = Some(unquote(line).into_owned());
        } else if cut_prefix(&mut line, "dns-name ") {
            self.dns_name = Some(unquote(line).into_owned());
        } else if line.contains('/') && !line.contains(' ') {
            // only a lone prefix, range-address and wildcard-address are not handled
            self.network = Some(line.to_owned());
        }
    }
}

impl AddressSet {
    fn emit(&self, prefix: &str, list: &mut SetList) {
        let name = identifier(&self.name);
        let set = format!("{prefix}address-book address-set {name} ");
        let before = list.len();
        list.values(&set, "address", &self.address);
        list.values(&set, "address-set", &self.address_set);
        if list.len() == before {
            list.push(prefix, format_args!("address-book address-set {name}"));
        }
    }

    fn parse(&mut self, mut line: &str) {
        if cut_prefix(&mut line, "address-set ") {
            self.address_set.insert(unquote(line).into_owned());
        } else if cut_prefix(&mut line, "address ") {
            self.address.insert(unquote(line).into_owned());
        }
    }
}

impl ZoneInterface {
    fn emit(&self, prefix: &str, list: &mut SetList) {
        let name = identifier(&self.name);
        let before = list.len();
        self.inbound.emit(&format!("{prefix}interfaces {name} "), list);
        if list.len() == before {
            list.push(prefix, format_args!("interfaces {name}"));
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneState {
    pub id: Text,
    pub name: Text,
    pub description: Text,
    pub screen: Text,
    pub application_tracking: Value<bool>,
    pub tcp_rst: Value<bool>,
    pub inbound_protocols: TextSet,
    pub inbound_services: TextSet,
    pub address_book: Blocks<AddressState>,
    pub address_book_set: Blocks<AddressSetState>,
    pub interface: Blocks<ZoneInterfaceState>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AddressState {
    pub name: Text,
    pub network: Text,
    pub dns_name: Text,
    pub description: Text,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AddressSetState {
    pub name: Text,
    pub address: TextSet,
    pub address_set: TextSet,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneInterfaceState {
    pub name: Text,
    pub inbound_protocols: TextSet,
    pub inbound_services: TextSet,
}

impl From<&AddressState> for Address {
    fn from(state: &AddressState) -> Self {
        Self {
            name: string_of(&state.name).unwrap_or_default(),
            network: string_of(&state.network),
            dns_name: string_of(&state.dns_name),
            description: string_of(&state.description),
        }
    }
}

impl From<Address> for AddressState {
    fn from(address: Address) -> Self {
        Self {
            name: string_value(Some(address.name)),
            network: string_value(address.network),
            dns_name: string_value(address.dns_name),
            description: string_value(address.description),
        }
    }
}

impl From<&AddressSetState> for AddressSet {
    fn from(state: &AddressSetState) -> Self {
        Self {
            name: string_of(&state.name).unwrap_or_default(),
            address: strings_of(&state.address),
            address_set: strings_of(&state.address_set),
        }
    }
}

impl From<AddressSet> for AddressSetState {
    fn from(set: AddressSet) -> Self {
        Self {
            name: string_value(Some(set.name)),
            address: strings_value(set.address),
            address_set: strings_value(set.address_set),
        }
    }
}

impl From<&ZoneInterfaceState> for ZoneInterface {
    fn from(state: &ZoneInterfaceState) -> Self {
        Self {
            name: string_of(&state.name).unwrap_or_default(),
            inbound: Inbound {
                protocols: strings_of(&state.inbound_protocols),
                services: strings_of(&state.inbound_services),
            },
        }
    }
}

impl From<ZoneInterface> for ZoneInterfaceState {
    fn from(interface: ZoneInterface) -> Self {
        Self {
            name: string_value(Some(interface.name)),
            inbound_protocols: strings_value(interface.inbound.protocols),
            inbound_services: strings_value(interface.inbound.services),
        }
    }
}

impl ResourceKind for SecurityZone {
    const NAME: &'static str = "security_zone";

    type Key = String;
    type Record = Zone;
    type State = ZoneState;

    fn schema() -> Schema {
        Schema {
            version: 1,
            block: schema::block(
                "Security zone",
                map! {
                    "id" => schema::id(),
                    "name" => schema::required_string("Zone name"),
                    "description" => schema::optional_string("Text description of zone"),
                    "screen" => schema::optional_string("Name of ids option object applied to the zone"),
                    "application_tracking" => schema::optional_bool("Enable Application tracking support for this zone"),
                    "tcp_rst" => schema::optional_bool("Send RST for NON-SYN packet not matching TCP session"),
                    "inbound_protocols" => schema::optional_set("Protocol type of incoming traffic to accept"),
                    "inbound_services" => schema::optional_set("Type of incoming system-service traffic to accept"),
                },
                map! {
                    "address_book" => schema::list(
                        "Addresses of the zone address book",
                        map! {
                            "name" => schema::required_string("Address name"),
                            "network" => schema::optional_string("CIDR value of address, conflicts with dns_name"),
                            "dns_name" => schema::optional_string("DNS address name, conflicts with network"),
                            "description" => schema::optional_string("Text description of address"),
                        },
                        Default::default(),
                    ),
                    "address_book_set" => schema::list(
                        "Address sets of the zone address book",
                        map! {
                            "name" => schema::required_string("Address set name"),
                            "address" => schema::optional_set("Addresses in the set"),
                            "address_set" => schema::optional_set("Address sets in the set"),
                        },
                        Default::default(),
                    ),
                    "interface" => schema::list(
                        "Interfaces bound to the zone",
                        map! {
                            "name" => schema::required_string("Interface name"),
                            "inbound_protocols" => schema::optional_set("Protocol type of incoming traffic to accept"),
                            "inbound_services" => schema::optional_set("Type of incoming system-service traffic to accept"),
                        },
                        Default::default(),
                    ),
                },
            ),
        }
    }

    fn key_attributes(state: &ZoneState) -> Vec<(&'static str, &Text)> {
        vec![("name", &state.name)]
    }

    fn key(state: &ZoneState) -> Option<String> {
        match &state.name {
            Value::Value(name) => Some(name.to_string()),
            _ => None,
        }
    }

    fn id_mut(state: &mut ZoneState) -> &mut Text {
        &mut state.id
    }

    fn format_id(name: &String) -> String {
        name.clone()
    }

    fn parse_id(id: &str) -> Result<String, ConfigError> {
        if id.is_empty() {
            return Err(ConfigError::invalid("id", id, "zone name is empty"));
        }
        Ok(id.to_owned())
    }

    fn path(name: &String) -> String {
        format!("security zones security-zone {}", identifier(name))
    }

    fn to_record(state: &ZoneState) -> Result<Zone, ConfigError> {
        Ok(Zone {
            description: string_of(&state.description),
            screen: string_of(&state.screen),
            application_tracking: flag_of(&state.application_tracking),
            tcp_rst: flag_of(&state.tcp_rst),
            inbound: Inbound {
                protocols: strings_of(&state.inbound_protocols),
                services: strings_of(&state.inbound_services),
            },
            addresses: blocks_of(&state.address_book).map(Address::from).collect(),
            address_sets: blocks_of(&state.address_book_set)
                .map(AddressSet::from)
                .collect(),
            interfaces: blocks_of(&state.interface)
                .map(ZoneInterface::from)
                .collect(),
        })
    }

    fn to_state(name: &String, zone: Zone) -> ZoneState {
        ZoneState {
            id: Value::Null,
            name: string_value(Some(name.clone())),
            description: string_value(zone.description),
            screen: string_value(zone.screen),
            application_tracking: flag_value(zone.application_tracking),
            tcp_rst: flag_value(zone.tcp_rst),
            inbound_protocols: strings_value(zone.inbound.protocols),
            inbound_services: strings_value(zone.inbound.services),
            address_book: blocks_value(zone.addresses, AddressState::from),
            address_book_set: blocks_value(zone.address_sets, AddressSetState::from),
            interface: blocks_value(zone.interfaces, ZoneInterfaceState::from),
        }
    }

    fn emit(zone: &Zone, prefix: &str, list: &mut SetList) -> Result<(), ConfigError> {
        check_unique(&zone.addresses)?;
        check_unique(&zone.address_sets)?;
        check_unique(&zone.interfaces)?;

        list.text(prefix, "description", zone.description.as_deref());
        list.word(prefix, "screen", zone.screen.as_deref());
        list.flag(prefix, "application-tracking", zone.application_tracking);
        list.flag(prefix, "tcp-rst", zone.tcp_rst);
        zone.inbound.emit(prefix, list);
        for address in &zone.addresses {
            address.emit(prefix, list)?;
        }
        for set in &zone.address_sets {
            set.emit(prefix, list);
        }
        for interface in &zone.interfaces {
            interface.emit(prefix, list);
        }
        Ok(())
    }

    fn parse(zone: &mut Zone, mut line: &str) -> Result<(), ConfigError> {
        if zone.inbound.parse(line) {
            return Ok(());
        }
        if line == "application-tracking" {
            zone.application_tracking = true;
        } else if line == "tcp-rst" {
            zone.tcp_rst = true;
        } else if cut_prefix(&mut line, "description ") {
            zone.description = Some(unquote(line).into_owned());
        } else if cut_prefix(&mut line, "screen ") {
            zone.screen = Some(unquote(line).into_owned());
        } else if cut_prefix(&mut line, "address-book address-set ") {
            let Some(name) = next_word(&mut line) else {
                return Err(ConfigError::not_enough_fields("address-set", line));
            };
            find_or_create(&mut zone.address_sets, name.into_owned()).parse(line);
        } else if cut_prefix(&mut line, "address-book address ") {
            let Some(name) = next_word(&mut line) else {
                return Err(ConfigError::not_enough_fields("address", line));
            };
            find_or_create(&mut zone.addresses, name.into_owned()).parse(line);
        } else if cut_prefix(&mut line, "interfaces ") {
            let Some(name) = next_word(&mut line) else {
                return Err(ConfigError::not_enough_fields("interfaces", line));
            };
            find_or_create(&mut zone.interfaces, name.into_owned())
                .inbound
                .parse(line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::engine::{set_lines, testing::round_trip};
    use crate::junos::parse_lines;

    use super::*;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn address(name: &str, network: Option<&str>, dns_name: Option<&str>) -> Address {
        Address {
            name: name.to_owned(),
            network: network.map(str::to_owned),
            dns_name: dns_name.map(str::to_owned),
            description: None,
        }
    }

    #[test]
    fn emits_statements() {
        let zone = Zone {
            description: Some("users lan".to_owned()),
            inbound: Inbound {
                services: set(&["ssh", "ping"]),
                ..Default::default()
            },
            addresses: vec![address("web", Some("192.0.2.10/32"), None)],
            interfaces: vec![ZoneInterface::with_key("ge-0/0/1.0".to_owned())],
            ..Default::default()
        };
        assert_eq!(
            set_lines::<SecurityZone>(&"trust".to_owned(), &zone).unwrap(),
            [
                "set security zones security-zone trust",
                "set security zones security-zone trust description \"users lan\"",
                "set security zones security-zone trust host-inbound-traffic system-services ping",
                "set security zones security-zone trust host-inbound-traffic system-services ssh",
                "set security zones security-zone trust address-book address web 192.0.2.10/32",
                "set security zones security-zone trust interfaces ge-0/0/1.0",
            ]
        );
    }

    #[test]
    fn address_needs_exactly_one_value() {
        let both = Zone {
            addresses: vec![address("web", Some("192.0.2.10/32"), Some("www.example.com"))],
            ..Default::default()
        };
        assert_eq!(
            set_lines::<SecurityZone>(&"trust".to_owned(), &both).unwrap_err(),
            ConfigError::Conflict("network", "dns_name")
        );

        let none = Zone {
            addresses: vec![address("web", None, None)],
            ..Default::default()
        };
        assert!(matches!(
            set_lines::<SecurityZone>(&"trust".to_owned(), &none),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn parses_device_output() {
        let output = r#"
set description "users lan"
set tcp-rst
set address-book address web 192.0.2.10/32
set address-book address web description "front end"
set address-book address-set servers address web
set address-book address mail dns-name mail.example.com
set address-book address-set servers address-set legacy
set interfaces ge-0/0/1.0 host-inbound-traffic protocols ospf
set interfaces ge-0/0/1.0 host-inbound-traffic system-services ssh
set host-inbound-traffic system-services ping
set interfaces ge-0/0/2.0
"#;
        let mut zone = Zone::default();
        parse_lines(output, &mut zone, SecurityZone::parse).unwrap();

        assert_eq!(
            zone,
            Zone {
                description: Some("users lan".to_owned()),
                tcp_rst: true,
                inbound: Inbound {
                    services: set(&["ping"]),
                    ..Default::default()
                },
                addresses: vec![
                    Address {
                        description: Some("front end".to_owned()),
                        ..address("web", Some("192.0.2.10/32"), None)
                    },
                    address("mail", None, Some("mail.example.com")),
                ],
                address_sets: vec![AddressSet {
                    name: "servers".to_owned(),
                    address: set(&["web"]),
                    address_set: set(&["legacy"]),
                }],
                interfaces: vec![
                    ZoneInterface {
                        name: "ge-0/0/1.0".to_owned(),
                        inbound: Inbound {
                            protocols: set(&["ospf"]),
                            services: set(&["ssh"]),
                        },
                    },
                    ZoneInterface::with_key("ge-0/0/2.0".to_owned()),
                ],
                ..Default::default()
            }
        );
    }

    #[test]
    fn unknown_address_kinds_are_ignored() {
        let output = r#"
set address-book address pool range-address 192.0.2.1 to 192.0.2.9
set address-book address masked wildcard-address 10.0.0.1/255.0.0.255
set address-book address web 192.0.2.10/32
"#;
        let mut zone = Zone::default();
        parse_lines(output, &mut zone, SecurityZone::parse).unwrap();

        assert_eq!(
            zone.addresses,
            [
                address("pool", None, None),
                address("masked", None, None),
                address("web", Some("192.0.2.10/32"), None),
            ]
        );
    }

    #[tokio::test]
    async fn quotes_in_text_survive() {
        let zone = Zone {
            description: Some(r#"rack "A" \ row 2"#.to_owned()),
            addresses: vec![Address {
                description: Some(r#""quoted""#.to_owned()),
                ..address(r#"web "1""#, Some("192.0.2.10/32"), None)
            }],
            ..Default::default()
        };

        let lines = set_lines::<SecurityZone>(&"dmz".to_owned(), &zone).unwrap();
        assert_eq!(
            lines[1],
            r#"set security zones security-zone dmz description "rack \"A\" \\ row 2""#
        );

        let read = round_trip::<SecurityZone>(&"dmz".to_owned(), &zone)
            .await
            .unwrap();
        assert_eq!(read, zone);
    }

    #[tokio::test]
    async fn round_trips_through_device() {
        let zone = Zone {
            description: Some("public services".to_owned()),
            screen: Some("untrust-screen".to_owned()),
            application_tracking: true,
            inbound: Inbound {
                protocols: set(&["bgp"]),
                services: set(&["ike"]),
            },
            addresses: vec![
                address("mail", None, Some("mail.example.com")),
                address("web 1", Some("192.0.2.10/32"), None),
            ],
            address_sets: vec![
                AddressSet {
                    name: "servers".to_owned(),
                    address: set(&["mail", "web 1"]),
                    ..Default::default()
                },
                AddressSet::with_key("empty".to_owned()),
            ],
            interfaces: vec![ZoneInterface::with_key("ge-0/0/3.0".to_owned())],
            ..Default::default()
        };

        let read = round_trip::<SecurityZone>(&"dmz".to_owned(), &zone)
            .await
            .unwrap();
        assert_eq!(read, zone);
    }
}
