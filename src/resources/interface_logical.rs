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
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tf_provider::value::Value;
use tf_provider::schema::Schema;
use tf_provider::{map, AttributePath, Diagnostics};

use crate::engine::{schema, ResourceKind};
use crate::junos::merge::{check_unique, PairKey};
use crate::junos::tokenizer::fields;
use crate::junos::{
    cut_prefix, exclusive, find_or_create, identifier, next_word, parse_int, requires,
    unquote, ConfigError, Keyed, SetList,
};
use crate::utils::{
    block_of, block_value, blocks_of, blocks_value, flag_of, flag_value, number_of, number_value,
    string_of, string_value, strings_of, strings_value, Blocks, Text, TextSet,
};

const AUTHENTICATION_TYPES: &[&str] = &["md5", "simple"];

#[derive(Debug, Default)]
pub struct InterfaceLogical;

/// `<physical>.<unit>`, e.g. `ge-0/0/3.100`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitKey {
    pub physical: String,
    pub unit: String,
}

impl UnitKey {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.rsplit_once('.') {
            Some((physical, unit))
                if !physical.is_empty() && !unit.is_empty() && unit.bytes().all(|b| b.is_ascii_digit()) =>
            {
                Ok(Self {
                    physical: physical.to_owned(),
                    unit: unit.to_owned(),
                })
            }
            _ => Err(ConfigError::invalid(
                "name",
                name,
                "expected <physical>.<unit> with a numeric unit",
            )),
        }
    }
}

impl Display for UnitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.physical, self.unit)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct LogicalInterface {
    pub description: Option<String>,
    pub disable: bool,
    pub vlan_id: Option<u16>,
    pub family_inet: Option<FamilyInet>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FamilyInet {
    pub mtu: Option<u32>,
    pub filter_input: Option<String>,
    pub filter_output: Option<String>,
    pub addresses: Vec<InetAddress>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InetAddress {
    pub cidr_ip: String,
    pub preferred: bool,
    pub primary: bool,
    pub vrrp_groups: Vec<VrrpGroup>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct VrrpGroup {
    pub identifier: u8,
    pub virtual_address: BTreeSet<String>,
    pub accept_data: bool,
    pub no_accept_data: bool,
    pub preempt: bool,
    pub no_preempt: bool,
    pub advertise_interval: Option<u8>,
    pub priority: Option<u8>,
    pub authentication_key: Option<String>,
    pub authentication_type: Option<String>,
    pub track_interfaces: Vec<TrackInterface>,
    pub track_routes: Vec<TrackRoute>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TrackInterface {
    pub interface: String,
    pub priority_cost: u8,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TrackRoute {
    pub route: String,
    pub routing_instance: String,
    pub priority_cost: u8,
}

impl Keyed for InetAddress {
    type Key = String;
    const BLOCK: &'static str = "address";
    const KEY_ATTRIBUTE: &'static str = "cidr_ip";

    fn key(&self) -> String {
        self.cidr_ip.clone()
    }

    fn with_key(cidr_ip: String) -> Self {
        Self {
            cidr_ip,
            ..Default::default()
        }
    }
}

impl Keyed for VrrpGroup {
    type Key = u8;
    const BLOCK: &'static str = "vrrp_group";
    const KEY_ATTRIBUTE: &'static str = "identifier";

    fn key(&self) -> u8 {
        self.identifier
    }

    fn with_key(identifier: u8) -> Self {
        Self {
            identifier,
            ..Default::default()
        }
    }
}

impl Keyed for TrackInterface {
    type Key = String;
    const BLOCK: &'static str = "track_interface";
    const KEY_ATTRIBUTE: &'static str = "interface";

    fn key(&self) -> String {
        self.interface.clone()
    }

    fn with_key(interface: String) -> Self {
        Self {
            interface,
            ..Default::default()
        }
    }
}

impl Keyed for TrackRoute {
    type Key = PairKey;
    const BLOCK: &'static str = "track_route";
    const KEY_ATTRIBUTE: &'static str = "route and routing_instance";

    fn key(&self) -> PairKey {
        PairKey(self.route.clone(), self.routing_instance.clone())
    }

    fn with_key(PairKey(route, routing_instance): PairKey) -> Self {
        Self {
            route,
            routing_instance,
            ..Default::default()
        }
    }
}

impl FamilyInet {
    fn emit(&self, prefix: &str, list: &mut SetList) -> Result<(), ConfigError> {
        check_unique(&self.addresses)?;
        let inet = format!("{prefix}family inet ");
        let before = list.len();
        list.number(&inet, "mtu", self.mtu);
        list.word(&inet, "filter input", self.filter_input.as_deref());
        list.word(&inet, "filter output", self.filter_output.as_deref());
        for address in &self.addresses {
            address.emit(&inet, list)?;
        }
        if list.len() == before {
            list.push(prefix, "family inet");
        }
        Ok(())
    }

    fn parse(&mut self, mut line: &str) -> Result<(), ConfigError> {
        if cut_prefix(&mut line, "mtu ") {
            self.mtu = Some(parse_int(line)?);
        } else if cut_prefix(&mut line, "filter input ") {
            self.filter_input = Some(unquote(line).into_owned());
        } else if cut_prefix(&mut line, "filter output ") {
            self.filter_output = Some(unquote(line).into_owned());
        } else if cut_prefix(&mut line, "address ") {
            let Some(cidr_ip) = next_word(&mut line) else {
                return Err(ConfigError::not_enough_fields("address", line));
            };
            find_or_create(&mut self.addresses, cidr_ip.into_owned()).parse(line)?;
        }
        Ok(())
    }
}

impl InetAddress {
    fn emit(&self, prefix: &str, list: &mut SetList) -> Result<(), ConfigError> {
        check_unique(&self.vrrp_groups)?;
        let address = format!("{prefix}address {} ", self.cidr_ip);
        let before = list.len();
        list.flag(&address, "preferred", self.preferred);
        list.flag(&address, "primary", self.primary);
        for group in &self.vrrp_groups {
            group.emit(&address, list)?;
        }
        if list.len() == before {
            list.push(prefix, format_args!("address {}", self.cidr_ip));
        }
        Ok(())
    }

    fn parse(&mut self, mut line: &str) -> Result<(), ConfigError> {
        if line == "preferred" {
            self.preferred = true;
        } else if line == "primary" {
            self.primary = true;
        } else if cut_prefix(&mut line, "vrrp-group ") {
            let Some(identifier) = next_word(&mut line) else {
                return Err(ConfigError::not_enough_fields("vrrp-group", line));
            };
            find_or_create(&mut self.vrrp_groups, parse_int(&identifier)?).parse(line)?;
        }
        Ok(())
    }
}

impl VrrpGroup {
    fn emit(&self, prefix: &str, list: &mut SetList) -> Result<(), ConfigError> {
        exclusive(
            ("accept_data", self.accept_data),
            ("no_accept_data", self.no_accept_data),
        )?;
        exclusive(("preempt", self.preempt), ("no_preempt", self.no_preempt))?;
        requires(
            ("authentication_key", self.authentication_key.is_some()),
            ("authentication_type", self.authentication_type.is_some()),
        )?;
        check_unique(&self.track_interfaces)?;
        check_unique(&self.track_routes)?;

        let group = format!("{prefix}vrrp-group {} ", self.identifier);
        let before = list.len();
        list.values(&group, "virtual-address", &self.virtual_address);
        list.flag(&group, "accept-data", self.accept_data);
        list.flag(&group, "no-accept-data", self.no_accept_data);
        list.flag(&group, "preempt", self.preempt);
        list.flag(&group, "no-preempt", self.no_preempt);
        list.number(&group, "advertise-interval", self.advertise_interval);
        list.number(&group, "priority", self.priority);
        list.word(&group, "authentication-type", self.authentication_type.as_deref());
        list.text(&group, "authentication-key", self.authentication_key.as_deref());
        for track in &self.track_interfaces {
            list.push(
                &group,
                format_args!(
                    "track interface {} priority-cost {}",
                    track.interface, track.priority_cost
                ),
            );
        }
        for track in &self.track_routes {
            list.push(
                &group,
                format_args!(
                    "track route {} routing-instance {} priority-cost {}",
                    track.route,
                    identifier(&track.routing_instance),
                    track.priority_cost
                ),
            );
        }
        if list.len() == before {
            list.push(prefix, format_args!("vrrp-group {}", self.identifier));
        }
        Ok(())
    }

    fn parse(&mut self, line: &str) -> Result<(), ConfigError> {
        match line {
            "accept-data" => self.accept_data = true,
            "no-accept-data" => self.no_accept_data = true,
            "preempt" => self.preempt = true,
            "no-preempt" => self.no_preempt = true,
            _ => return self.parse_value(line),
        }
        Ok(())
    }

    fn parse_value(&mut self, mut line: &str) -> Result<(), ConfigError> {
        if cut_prefix(&mut line, "virtual-address ") {
            self.virtual_address.insert(unquote(line).into_owned());
        } else if cut_prefix(&mut line, "advertise-interval ") {
            self.advertise_interval = Some(parse_int(line)?);
        } else if cut_prefix(&mut line, "priority ") {
            self.priority = Some(parse_int(line)?);
        } else if cut_prefix(&mut line, "authentication-type ") {
            self.authentication_type = Some(unquote(line).into_owned());
        } else if cut_prefix(&mut line, "authentication-key ") {
            self.authentication_key = Some(unquote(line).into_owned());
        } else if cut_prefix(&mut line, "track interface ") {
            // <interface> priority-cost <cost>
            let words = fields(line, 3, "track interface")?;
            find_or_create(&mut self.track_interfaces, words[0].to_string()).priority_cost =
                parse_int(&words[2])?;
        } else if cut_prefix(&mut line, "track route ") {
            // <route> routing-instance <instance> priority-cost <cost>
            let words = fields(line, 5, "track route")?;
            let key = PairKey(words[0].to_string(), words[2].to_string());
            find_or_create(&mut self.track_routes, key).priority_cost = parse_int(&words[4])?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalInterfaceState {
    pub id: Text,
    pub name: Text,
    pub description: Text,
    pub disable: Value<bool>,
    pub vlan_id: Value<i64>,
    pub family_inet: Value<FamilyInetState>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FamilyInetState {
    pub mtu: Value<i64>,
    pub filter_input: Text,
    pub filter_output: Text,
    pub address: Blocks<InetAddressState>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InetAddressState {
    pub cidr_ip: Text,
    pub preferred: Value<bool>,
    pub primary: Value<bool>,
    pub vrrp_group: Blocks<VrrpGroupState>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VrrpGroupState {
    pub identifier: Value<i64>,
    pub virtual_address: TextSet,
    pub accept_data: Value<bool>,
    pub no_accept_data: Value<bool>,
    pub preempt: Value<bool>,
    pub no_preempt: Value<bool>,
    pub advertise_interval: Value<i64>,
    pub priority: Value<i64>,
    pub authentication_key: Text,
    pub authentication_type: Text,
    pub track_interface: Blocks<TrackInterfaceState>,
    pub track_route: Blocks<TrackRouteState>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackInterfaceState {
    pub interface: Text,
    pub priority_cost: Value<i64>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackRouteState {
    pub route: Text,
    pub routing_instance: Text,
    pub priority_cost: Value<i64>,
}

impl TryFrom<&FamilyInetState> for FamilyInet {
    type Error = ConfigError;

    fn try_from(state: &FamilyInetState) -> Result<Self, ConfigError> {
        Ok(Self {
            mtu: number_of(&state.mtu, "mtu")?,
            filter_input: string_of(&state.filter_input),
            filter_output: string_of(&state.filter_output),
            addresses: blocks_of(&state.address)
                .map(InetAddress::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl From<FamilyInet> for FamilyInetState {
    fn from(inet: FamilyInet) -> Self {
        Self {
            mtu: number_value(inet.mtu),
            filter_input: string_value(inet.filter_input),
            filter_output: string_value(inet.filter_output),
            address: blocks_value(inet.addresses, InetAddressState::from),
        }
    }
}

impl TryFrom<&InetAddressState> for InetAddress {
    type Error = ConfigError;

    fn try_from(state: &InetAddressState) -> Result<Self, ConfigError> {
        Ok(Self {
            cidr_ip: string_of(&state.cidr_ip).unwrap_or_default(),
            preferred: flag_of(&state.preferred),
            primary: flag_of(&state.primary),
            vrrp_groups: blocks_of(&state.vrrp_group)
                .map(VrrpGroup::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl From<InetAddress> for InetAddressState {
    fn from(address: InetAddress) -> Self {
        Self {
            cidr_ip: string_value(Some(address.cidr_ip)),
            preferred: flag_value(address.preferred),
            primary: flag_value(address.primary),
            vrrp_group: blocks_value(address.vrrp_groups, VrrpGroupState::from),
        }
    }
}

impl TryFrom<&VrrpGroupState> for VrrpGroup {
    type Error = ConfigError;

    fn try_from(state: &VrrpGroupState) -> Result<Self, ConfigError> {
        Ok(Self {
            identifier: number_of(&state.identifier, "identifier")?.unwrap_or_default(),
            virtual_address: strings_of(&state.virtual_address),
            accept_data: flag_of(&state.accept_data),
            no_accept_data: flag_of(&state.no_accept_data),
            preempt: flag_of(&state.preempt),
            no_preempt: flag_of(&state.no_preempt),
            advertise_interval: number_of(&state.advertise_interval, "advertise_interval")?,
            priority: number_of(&state.priority, "priority")?,
            authentication_key: string_of(&state.authentication_key),
            authentication_type: string_of(&state.authentication_type),
            track_interfaces: blocks_of(&state.track_interface)
                .map(|track| -> Result<_, ConfigError> {
                    Ok(TrackInterface {
                        interface: string_of(&track.interface).unwrap_or_default(),
                        priority_cost: number_of(&track.priority_cost, "priority_cost")?
                            .unwrap_or_default(),
                    })
                })
                .collect::<Result<_, _>>()?,
            track_routes: blocks_of(&state.track_route)
                .map(|track| -> Result<_, ConfigError> {
                    Ok(TrackRoute {
                        route: string_of(&track.route).unwrap_or_default(),
                        routing_instance: string_of(&track.routing_instance).unwrap_or_default(),
                        priority_cost: number_of(&track.priority_cost, "priority_cost")?
                            .unwrap_or_default(),
                    })
                })
                .collect::<Result<_, _>>()?,
        })
    }
}

impl From<VrrpGroup> for VrrpGroupState {
    fn from(group: VrrpGroup) -> Self {
        Self {
            identifier: number_value(Some(group.identifier)),
            virtual_address: strings_value(group.virtual_address),
            accept_data: flag_value(group.accept_data),
            no_accept_data: flag_value(group.no_accept_data),
            preempt: flag_value(group.preempt),
            no_preempt: flag_value(group.no_preempt),
            advertise_interval: number_value(group.advertise_interval),
            priority: number_value(group.priority),
            authentication_key: string_value(group.authentication_key),
            authentication_type: string_value(group.authentication_type),
            track_interface: blocks_value(group.track_interfaces, |track| TrackInterfaceState {
                interface: string_value(Some(track.interface)),
                priority_cost: number_value(Some(track.priority_cost)),
            }),
            track_route: blocks_value(group.track_routes, |track| TrackRouteState {
                route: string_value(Some(track.route)),
                routing_instance: string_value(Some(track.routing_instance)),
                priority_cost: number_value(Some(track.priority_cost)),
            }),
        }
    }
}

impl ResourceKind for InterfaceLogical {
    const NAME: &'static str = "interface_logical";

    type Key = UnitKey;
    type Record = LogicalInterface;
    type State = LogicalInterfaceState;

    fn schema() -> Schema {
        let track_interface = schema::list(
            "Interfaces to track",
            map! {
                "interface" => schema::required_string("Interface tracked"),
                "priority_cost" => schema::required_number("Value to subtract from priority when interface is down"),
            },
            Default::default(),
        );
        let track_route = schema::list(
            "Routes to track",
            map! {
                "route" => schema::required_string("Route address tracked"),
                "routing_instance" => schema::required_string("Routing instance to which route belongs"),
                "priority_cost" => schema::required_number("Value to subtract from priority when route is down"),
            },
            Default::default(),
        );
        let vrrp_group = schema::list(
            "VRRP groups of the address",
            map! {
                "identifier" => schema::required_number("VRRP group identifier"),
                "virtual_address" => schema::optional_set("Virtual IP addresses"),
                "accept_data" => schema::optional_bool("Accept packets destined for virtual IP address"),
                "no_accept_data" => schema::optional_bool("Don't accept packets destined for virtual IP address"),
                "preempt" => schema::optional_bool("Allow preemption"),
                "no_preempt" => schema::optional_bool("Don't allow preemption"),
                "advertise_interval" => schema::optional_number("Advertisement interval (seconds)"),
                "priority" => schema::optional_number("Virtual router election priority"),
                "authentication_key" => schema::sensitive_string("Authentication key"),
                "authentication_type" => schema::optional_string("Authentication type, md5 or simple"),
            },
            map! {
                "track_interface" => track_interface,
                "track_route" => track_route,
            },
        );
        let address = schema::list(
            "Addresses of the family",
            map! {
                "cidr_ip" => schema::required_string("Address in CIDR form"),
                "preferred" => schema::optional_bool("Preferred address on interface"),
                "primary" => schema::optional_bool("Candidate for primary address in system"),
            },
            map! {
                "vrrp_group" => vrrp_group,
            },
        );

        Schema {
            version: 1,
            block: schema::block(
                "Logical unit of a physical interface",
                map! {
                    "id" => schema::id(),
                    "name" => schema::required_string("Name of the unit, <physical>.<unit>"),
                    "description" => schema::optional_string("Text description of interface"),
                    "disable" => schema::optional_bool("Disable this logical interface"),
                    "vlan_id" => schema::optional_number("Virtual LAN identifier value for 802.1q VLAN tags"),
                },
                map! {
                    "family_inet" => schema::optional(
                        "IPv4 protocol parameters",
                        map! {
                            "mtu" => schema::optional_number("Maximum transmission unit packet size"),
                            "filter_input" => schema::optional_string("Filter to be applied to received packets"),
                            "filter_output" => schema::optional_string("Filter to be applied to transmitted packets"),
                        },
                        map! {
                            "address" => address,
                        },
                    ),
                },
            ),
        }
    }

    fn validate(diags: &mut Diagnostics, state: &LogicalInterfaceState) {
        if let Value::Value(name) = &state.name {
            if let Err(err) = UnitKey::parse(name) {
                diags.error("Invalid name", err.to_string(), AttributePath::new("name"));
            }
        }
        let Some(inet) = block_of(&state.family_inet) else {
            return;
        };
        for (i, address) in blocks_of(&inet.address).enumerate() {
            for (j, group) in blocks_of(&address.vrrp_group).enumerate() {
                let Value::Value(authentication_type) = &group.authentication_type else {
                    continue;
                };
                let authentication_type: &str = authentication_type;
                if !AUTHENTICATION_TYPES.contains(&authentication_type) {
                    diags.error(
                        "Invalid authentication type",
                        format!("`{authentication_type}` is not one of md5, simple"),
                        AttributePath::new("family_inet")
                            .attribute("address")
                            .index(i as i64)
                            .attribute("vrrp_group")
                            .index(j as i64)
                            .attribute("authentication_type"),
                    );
                }
            }
        }
    }

    fn key_attributes(state: &LogicalInterfaceState) -> Vec<(&'static str, &Text)> {
        vec![("name", &state.name)]
    }

    fn key(state: &LogicalInterfaceState) -> Option<UnitKey> {
        match &state.name {
            Value::Value(name) => UnitKey::parse(name).ok(),
            _ => None,
        }
    }

    fn id_mut(state: &mut LogicalInterfaceState) -> &mut Text {
        &mut state.id
    }

    fn format_id(key: &UnitKey) -> String {
        key.to_string()
    }

    fn parse_id(id: &str) -> Result<UnitKey, ConfigError> {
        UnitKey::parse(id)
    }

    fn path(key: &UnitKey) -> String {
        format!("interfaces {} unit {}", key.physical, key.unit)
    }

    fn to_record(state: &LogicalInterfaceState) -> Result<LogicalInterface, ConfigError> {
        Ok(LogicalInterface {
            description: string_of(&state.description),
            disable: flag_of(&state.disable),
            vlan_id: number_of(&state.vlan_id, "vlan_id")?,
            family_inet: block_of(&state.family_inet)
                .map(FamilyInet::try_from)
                .transpose()?,
        })
    }

    fn to_state(key: &UnitKey, interface: LogicalInterface) -> LogicalInterfaceState {
        LogicalInterfaceState {
            id: Value::Null,
            name: string_value(Some(key.to_string())),
            description: string_value(interface.description),
            disable: flag_value(interface.disable),
            vlan_id: number_value(interface.vlan_id),
            family_inet: block_value(interface.family_inet.map(Into::into)),
        }
    }

    fn emit(
        interface: &LogicalInterface,
        prefix: &str,
        list: &mut SetList,
    ) -> Result<(), ConfigError> {
        list.text(prefix, "description", interface.description.as_deref());
        list.flag(prefix, "disable", interface.disable);
        list.number(prefix, "vlan-id", interface.vlan_id);
        if let Some(inet) = &interface.family_inet {
            inet.emit(prefix, list)?;
        }
        Ok(())
    }

    fn parse(interface: &mut LogicalInterface, mut line: &str) -> Result<(), ConfigError> {
        if line == "disable" {
            interface.disable = true;
        } else if cut_prefix(&mut line, "description ") {
            interface.description = Some(unquote(line).into_owned());
        } else if cut_prefix(&mut line, "vlan-id ") {
            interface.vlan_id = Some(parse_int(line)?);
        } else if line == "family inet" {
            interface.family_inet.get_or_insert_with(Default::default);
        } else if cut_prefix(&mut line, "family inet ") {
            interface
                .family_inet
                .get_or_insert_with(Default::default)
                .parse(line)?;
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

    fn key() -> UnitKey {
        UnitKey::parse("ge-0/0/3.100").unwrap()
    }

    fn group(identifier: u8) -> VrrpGroup {
        VrrpGroup::with_key(identifier)
    }

    fn inet_with(group: VrrpGroup) -> LogicalInterface {
        LogicalInterface {
            family_inet: Some(FamilyInet {
                addresses: vec![InetAddress {
                    cidr_ip: "192.0.2.1/24".to_owned(),
                    vrrp_groups: vec![group],
                    ..Default::default()
                }],
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn unit_keys() {
        assert_eq!(
            key(),
            UnitKey {
                physical: "ge-0/0/3".to_owned(),
                unit: "100".to_owned()
            }
        );
        assert_eq!(InterfaceLogical::path(&key()), "interfaces ge-0/0/3 unit 100");
        assert_eq!(InterfaceLogical::format_id(&key()), "ge-0/0/3.100");
        assert!(UnitKey::parse("ge-0/0/3").is_err());
        assert!(UnitKey::parse("ge-0/0/3.x").is_err());
    }

    #[test]
    fn zero_vlan_is_emitted() {
        let interface = LogicalInterface {
            vlan_id: Some(0),
            ..Default::default()
        };
        assert_eq!(
            set_lines::<InterfaceLogical>(&key(), &interface).unwrap(),
            [
                "set interfaces ge-0/0/3 unit 100",
                "set interfaces ge-0/0/3 unit 100 vlan-id 0",
            ]
        );
    }

    #[test]
    fn vrrp_conflicts_and_dependencies() {
        let both = VrrpGroup {
            preempt: true,
            no_preempt: true,
            ..group(1)
        };
        assert_eq!(
            set_lines::<InterfaceLogical>(&key(), &inet_with(both)).unwrap_err(),
            ConfigError::Conflict("preempt", "no_preempt")
        );

        let keyless = VrrpGroup {
            authentication_key: Some("secret".to_owned()),
            ..group(1)
        };
        assert_eq!(
            set_lines::<InterfaceLogical>(&key(), &inet_with(keyless))
                .unwrap_err()
                .to_string(),
            "authentication_key need to be set with authentication_type"
        );
    }

    #[test]
    fn track_lines_need_all_fields() {
        let mut vrrp = group(1);
        assert!(matches!(
            vrrp.parse("track interface ge-0/0/1 priority-cost"),
            Err(ConfigError::NotEnoughFields { what: "track interface", .. })
        ));
        assert!(matches!(
            vrrp.parse("track route 0.0.0.0/0 routing-instance default priority-cost"),
            Err(ConfigError::NotEnoughFields { what: "track route", .. })
        ));
        vrrp.parse("track route 0.0.0.0/0 routing-instance default priority-cost 20")
            .unwrap();
        vrrp.parse("track interface ge-0/0/1 priority-cost 10").unwrap();
        assert_eq!(
            vrrp.track_routes,
            [TrackRoute {
                route: "0.0.0.0/0".to_owned(),
                routing_instance: "default".to_owned(),
                priority_cost: 20,
            }]
        );
        assert_eq!(
            vrrp.track_interfaces,
            [TrackInterface {
                interface: "ge-0/0/1".to_owned(),
                priority_cost: 10,
            }]
        );
    }

    #[test]
    fn parses_device_output() {
        let output = r#"
set description "uplink"
set vlan-id 100
set family inet filter input protect-re
set family inet address 192.0.2.1/24 vrrp-group 10 virtual-address 192.0.2.254
set family inet address 192.0.2.1/24 primary
set family inet address 192.0.2.1/24 vrrp-group 10 priority 0
set family inet address 192.0.2.1/24 vrrp-group 10 authentication-type md5
set family inet address 192.0.2.1/24 vrrp-group 10 authentication-key "$9$abc"
set family inet address 198.51.100.1/24
"#;
        let mut interface = LogicalInterface::default();
        parse_lines(output, &mut interface, InterfaceLogical::parse).unwrap();

        assert_eq!(
            interface,
            LogicalInterface {
                description: Some("uplink".to_owned()),
                vlan_id: Some(100),
                family_inet: Some(FamilyInet {
                    filter_input: Some("protect-re".to_owned()),
                    addresses: vec![
                        InetAddress {
                            cidr_ip: "192.0.2.1/24".to_owned(),
                            primary: true,
                            vrrp_groups: vec![VrrpGroup {
                                virtual_address: ["192.0.2.254".to_owned()].into(),
                                priority: Some(0),
                                authentication_type: Some("md5".to_owned()),
                                authentication_key: Some("$9$abc".to_owned()),
                                ..group(10)
                            }],
                            ..Default::default()
                        },
                        InetAddress::with_key("198.51.100.1/24".to_owned()),
                    ],
                    ..Default::default()
                }),
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn round_trips_through_device() {
        let interface = LogicalInterface {
            description: Some("to core".to_owned()),
            disable: true,
            vlan_id: Some(0),
            family_inet: Some(FamilyInet {
                mtu: Some(1500),
                filter_input: Some("in".to_owned()),
                filter_output: Some("out".to_owned()),
                addresses: vec![
                    InetAddress {
                        cidr_ip: "192.0.2.2/24".to_owned(),
                        preferred: true,
                        vrrp_groups: vec![
                            VrrpGroup {
                                virtual_address: ["192.0.2.254".to_owned(), "192.0.2.253".to_owned()]
                                    .into(),
                                accept_data: true,
                                no_preempt: true,
                                advertise_interval: Some(2),
                                priority: Some(150),
                                authentication_type: Some("simple".to_owned()),
                                authentication_key: Some("vrrp key".to_owned()),
                                track_interfaces: vec![TrackInterface {
                                    interface: "ge-0/0/0".to_owned(),
                                    priority_cost: 50,
                                }],
                                track_routes: vec![TrackRoute {
                                    route: "0.0.0.0/0".to_owned(),
                                    routing_instance: "default".to_owned(),
                                    priority_cost: 0,
                                }],
                                ..group(1)
                            },
                            group(2),
                        ],
                        ..Default::default()
                    },
                    InetAddress::with_key("198.51.100.2/24".to_owned()),
                ],
            }),
        };

        let read = round_trip::<InterfaceLogical>(&key(), &interface)
            .await
            .unwrap();
        assert_eq!(read, interface);
    }

    #[tokio::test]
    async fn empty_family_survives() {
        let interface = LogicalInterface {
            family_inet: Some(FamilyInet::default()),
            ..Default::default()
        };
        let read = round_trip::<InterfaceLogical>(&key(), &interface)
            .await
            .unwrap();
        assert_eq!(read, interface);
    }
}
