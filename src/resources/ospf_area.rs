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

use serde::{Deserialize, Serialize};
use tf_provider::value::Value;
use tf_provider::schema::Schema;
use tf_provider::{map, AttributePath, Diagnostics};

use crate::engine::{schema, ResourceKind};
use crate::junos::merge::{check_unique, PairKey};
use crate::junos::tokenizer::fields;
use crate::junos::{
    cut_prefix, exclusive, find_or_create, identifier, next_word, parse_int, requires, split_id,
    unquote, ConfigError, Keyed, SetList, ID_SEPARATOR,
};
use crate::utils::{
    blocks_of, blocks_value, flag_of, flag_value, number_of, number_value, string_of,
    string_value, Blocks, Text,
};

const BACKBONE: &str = "0.0.0.0";
const DEFAULT_INSTANCE: &str = "default";
const INTERFACE_TYPES: &[&str] = &["nbma", "p2mp", "p2mp-over-lan", "p2p"];

#[derive(Debug, Default)]
pub struct OspfArea;

#[derive(Debug, Clone, PartialEq)]
pub struct AreaKey {
    pub area_id: String,
    /// `v2` or `v3`
    pub version: String,
    pub routing_instance: String,
}

impl AreaKey {
    fn protocol(&self) -> &'static str {
        if self.version == "v3" {
            "ospf3"
        } else {
            "ospf"
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Area {
    pub stub: bool,
    pub nssa: bool,
    pub interfaces: Vec<AreaInterface>,
    pub virtual_links: Vec<VirtualLink>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AreaInterface {
    pub name: String,
    pub disable: bool,
    pub passive: bool,
    pub metric: Option<u16>,
    pub priority: Option<u8>,
    pub hello_interval: Option<u16>,
    pub dead_interval: Option<u16>,
    pub retransmit_interval: Option<u16>,
    pub interface_type: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct VirtualLink {
    pub neighbor_id: String,
    pub transit_area: String,
    pub disable: bool,
    pub hello_interval: Option<u16>,
    pub dead_interval: Option<u16>,
    pub retransmit_interval: Option<u16>,
    pub transit_delay: Option<u16>,
}

impl Keyed for AreaInterface {
    type Key = String;
    const BLOCK: &'static str = "interface";
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

impl Keyed for VirtualLink {
    type Key = PairKey;
    const BLOCK: &'static str = "virtual_link";
    const KEY_ATTRIBUTE: &'static str = "neighbor_id and transit_area";

    fn key(&self) -> PairKey {
        PairKey(self.neighbor_id.clone(), self.transit_area.clone())
    }

    fn with_key(PairKey(neighbor_id, transit_area): PairKey) -> Self {
        Self {
            neighbor_id,
            transit_area,
            ..Default::default()
        }
    }
}

impl AreaInterface {
    fn emit(&self, prefix: &str, list: &mut SetList) {
        let name = identifier(&self.name);
        let interface = format!("{prefix}interface {name} ");
        let before = list.len();
        list.flag(&interface, "disable", self.disable);
        list.flag(&interface, "passive", self.passive);
        list.number(&interface, "metric", self.metric);
        list.number(&interface, "priority", self.priority);
        list.number(&interface, "hello-interval", self.hello_interval);
        list.number(&interface, "dead-interval", self.dead_interval);
        list.number(&interface, "retransmit-interval", self.retransmit_interval);
        list.word(&interface, "interface-type", self.interface_type.as_deref());
        if list.len() == before {
            list.push(prefix, format_args!("interface {name}"));
        }
    }

    fn parse(&mut self, mut line: &str) -> Result<(), ConfigError> {
        if line == "disable" {
            self.disable = true;
        } else if line == "passive" {
            self.passive = true;
        } else if cut_prefix(&mut line, "metric ") {
            self.metric = Some(parse_int(line)?);
        } else if cut_prefix(&mut line, "priority ") {
            self.priority = Some(parse_int(line)?);
        } else if cut_prefix(&mut line, "hello-interval ") {
            self.hello_interval = Some(parse_int(line)?);
        } else if cut_prefix(&mut line, "dead-interval ") {
            self.dead_interval = Some(parse_int(line)?);
        } else if cut_prefix(&mut line, "retransmit-interval ") {
            self.retransmit_interval = Some(parse_int(line)?);
        } else if cut_prefix(&mut line, "interface-type ") {
            self.interface_type = Some(unquote(line).into_owned());
        }
        Ok(())
    }
}

impl VirtualLink {
    fn emit(&self, prefix: &str, list: &mut SetList) {
        let key = format!(
            "virtual-link neighbor-id {} transit-area {}",
            self.neighbor_id, self.transit_area
        );
        let link = format!("{prefix}{key} ");
        let before = list.len();
        list.flag(&link, "disable", self.disable);
        list.number(&link, "hello-interval", self.hello_interval);
        list.number(&link, "dead-interval", self.dead_interval);
        list.number(&link, "retransmit-interval", self.retransmit_interval);
        list.number(&link, "transit-delay", self.transit_delay);
        if list.len() == before {
            list.push(prefix, key);
        }
    }

    fn parse(&mut self, mut line: &str) -> Result<(), ConfigError> {
        if line == "disable" {
            self.disable = true;
        } else if cut_prefix(&mut line, "hello-interval ") {
            self.hello_interval = Some(parse_int(line)?);
        } else if cut_prefix(&mut line, "dead-interval ") {
            self.dead_interval = Some(parse_int(line)?);
        } else if cut_prefix(&mut line, "retransmit-interval ") {
            self.retransmit_interval = Some(parse_int(line)?);
        } else if cut_prefix(&mut line, "transit-delay ") {
            self.transit_delay = Some(parse_int(line)?);
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaState {
    pub id: Text,
    pub area_id: Text,
    pub version: Text,
    pub routing_instance: Text,
    pub stub: Value<bool>,
    pub nssa: Value<bool>,
    pub interface: Blocks<AreaInterfaceState>,
    pub virtual_link: Blocks<VirtualLinkState>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AreaInterfaceState {
    pub name: Text,
    pub disable: Value<bool>,
    pub passive: Value<bool>,
    pub metric: Value<i64>,
    pub priority: Value<i64>,
    pub hello_interval: Value<i64>,
    pub dead_interval: Value<i64>,
    pub retransmit_interval: Value<i64>,
    pub interface_type: Text,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VirtualLinkState {
    pub neighbor_id: Text,
    pub transit_area: Text,
    pub disable: Value<bool>,
    pub hello_interval: Value<i64>,
    pub dead_interval: Value<i64>,
    pub retransmit_interval: Value<i64>,
    pub transit_delay: Value<i64>,
}

impl TryFrom<&AreaInterfaceState> for AreaInterface {
    type Error = ConfigError;

    fn try_from(state: &AreaInterfaceState) -> Result<Self, ConfigError> {
        Ok(Self {
            name: string_of(&state.name).unwrap_or_default(),
            disable: flag_of(&state.disable),
            passive: flag_of(&state.passive),
            metric: number_of(&state.metric, "metric")?,
            priority: number_of(&state.priority, "priority")?,
            hello_interval: number_of(&state.hello_interval, "hello_interval")?,
            dead_interval: number_of(&state.dead_interval, "dead_interval")?,
            retransmit_interval: number_of(&state.retransmit_interval, "retransmit_interval")?,
            interface_type: string_of(&state.interface_type),
        })
    }
}

impl From<AreaInterface> for AreaInterfaceState {
    fn from(interface: AreaInterface) -> Self {
        Self {
            name: string_value(Some(interface.name)),
            disable: flag_value(interface.disable),
            passive: flag_value(interface.passive),
            metric: number_value(interface.metric),
            priority: number_value(interface.priority),
            hello_interval: number_value(interface.hello_interval),
            dead_interval: number_value(interface.dead_interval),
            retransmit_interval: number_value(interface.retransmit_interval),
            interface_type: string_value(interface.interface_type),
        }
    }
}

impl TryFrom<&VirtualLinkState> for VirtualLink {
    type Error = ConfigError;

    fn try_from(state: &VirtualLinkState) -> Result<Self, ConfigError> {
        Ok(Self {
            neighbor_id: string_of(&state.neighbor_id).unwrap_or_default(),
            transit_area: string_of(&state.transit_area).unwrap_or_default(),
            disable: flag_of(&state.disable),
            hello_interval: number_of(&state.hello_interval, "hello_interval")?,
            dead_interval: number_of(&state.dead_interval, "dead_interval")?,
            retransmit_interval: number_of(&state.retransmit_interval, "retransmit_interval")?,
            transit_delay: number_of(&state.transit_delay, "transit_delay")?,
        })
    }
}

impl From<VirtualLink> for VirtualLinkState {
    fn from(link: VirtualLink) -> Self {
        Self {
            neighbor_id: string_value(Some(link.neighbor_id)),
            transit_area: string_value(Some(link.transit_area)),
            disable: flag_value(link.disable),
            hello_interval: number_value(link.hello_interval),
            dead_interval: number_value(link.dead_interval),
            retransmit_interval: number_value(link.retransmit_interval),
            transit_delay: number_value(link.transit_delay),
        }
    }
}

impl ResourceKind for OspfArea {
    const NAME: &'static str = "ospf_area";

    type Key = AreaKey;
    type Record = Area;
    type State = AreaState;

    fn schema() -> Schema {
        Schema {
            version: 1,
            block: schema::block(
                "OSPF area of a routing instance",
                map! {
                    "id" => schema::id(),
                    "area_id" => schema::required_string("Area identifier, in dotted-quad form"),
                    "version" => schema::required_string("`v2` for ospf, `v3` for ospf3"),
                    "routing_instance" => schema::required_string("Routing instance, `default` for the master instance"),
                    "stub" => schema::optional_bool("Configure a stub area"),
                    "nssa" => schema::optional_bool("Configure a not-so-stubby area"),
                },
                map! {
                    "interface" => schema::list(
                        "Interfaces in the area",
                        map! {
                            "name" => schema::required_string("Interface name"),
                            "disable" => schema::optional_bool("Disable OSPF on this interface"),
                            "passive" => schema::optional_bool("Do not run OSPF, but advertise it"),
                            "metric" => schema::optional_number("Interface metric"),
                            "priority" => schema::optional_number("Designated router priority"),
                            "hello_interval" => schema::optional_number("Hello interval (seconds)"),
                            "dead_interval" => schema::optional_number("Dead interval (seconds)"),
                            "retransmit_interval" => schema::optional_number("Retransmission interval (seconds)"),
                            "interface_type" => schema::optional_string("Type of interface"),
                        },
                        Default::default(),
                    ),
                    "virtual_link" => schema::list(
                        "Virtual links, only in the backbone area",
                        map! {
                            "neighbor_id" => schema::required_string("Router ID of a virtual neighbor"),
                            "transit_area" => schema::required_string("Transit area in common with virtual neighbor"),
                            "disable" => schema::optional_bool("Disable this virtual link"),
                            "hello_interval" => schema::optional_number("Hello interval (seconds)"),
                            "dead_interval" => schema::optional_number("Dead interval (seconds)"),
                            "retransmit_interval" => schema::optional_number("Retransmission interval (seconds)"),
                            "transit_delay" => schema::optional_number("Transit delay (seconds)"),
                        },
                        Default::default(),
                    ),
                },
            ),
        }
    }

    fn validate(diags: &mut Diagnostics, state: &AreaState) {
        if let Value::Value(version) = &state.version {
            let version: &str = version;
            if version != "v2" && version != "v3" {
                diags.error(
                    "Invalid version",
                    format!("`{version}` is not one of v2, v3"),
                    AttributePath::new("version"),
                );
            }
        }
        for (i, interface) in blocks_of(&state.interface).enumerate() {
            let Value::Value(interface_type) = &interface.interface_type else {
                continue;
            };
            let interface_type: &str = interface_type;
            if !INTERFACE_TYPES.contains(&interface_type) {
                diags.error(
                    "Invalid interface type",
                    format!(
                        "`{interface_type}` is not one of {}",
                        INTERFACE_TYPES.join(", ")
                    ),
                    AttributePath::new("interface")
                        .index(i as i64)
                        .attribute("interface_type"),
                );
            }
        }
    }

    fn key_attributes(state: &AreaState) -> Vec<(&'static str, &Text)> {
        vec![
            ("area_id", &state.area_id),
            ("version", &state.version),
            ("routing_instance", &state.routing_instance),
        ]
    }

    fn key(state: &AreaState) -> Option<AreaKey> {
        match (&state.area_id, &state.version, &state.routing_instance) {
            (Value::Value(area_id), Value::Value(version), Value::Value(routing_instance)) => {
                Some(AreaKey {
                    area_id: area_id.to_string(),
                    version: version.to_string(),
                    routing_instance: routing_instance.to_string(),
                })
            }
            _ => None,
        }
    }

    fn id_mut(state: &mut AreaState) -> &mut Text {
        &mut state.id
    }

    fn format_id(key: &AreaKey) -> String {
        format!(
            "{}{ID_SEPARATOR}{}{ID_SEPARATOR}{}",
            key.area_id, key.version, key.routing_instance
        )
    }

    fn parse_id(id: &str) -> Result<AreaKey, ConfigError> {
        let [area_id, version, routing_instance] = split_id(id)?;
        Ok(AreaKey {
            area_id: area_id.to_owned(),
            version: version.to_owned(),
            routing_instance: routing_instance.to_owned(),
        })
    }

    fn path(key: &AreaKey) -> String {
        let protocols = format!("protocols {} area {}", key.protocol(), key.area_id);
        if key.routing_instance == DEFAULT_INSTANCE {
            protocols
        } else {
            format!(
                "routing-instances {} {protocols}",
                identifier(&key.routing_instance)
            )
        }
    }

    fn to_record(state: &AreaState) -> Result<Area, ConfigError> {
        let area = Area {
            stub: flag_of(&state.stub),
            nssa: flag_of(&state.nssa),
            interfaces: blocks_of(&state.interface)
                .map(AreaInterface::try_from)
                .collect::<Result<_, _>>()?,
            virtual_links: blocks_of(&state.virtual_link)
                .map(VirtualLink::try_from)
                .collect::<Result<_, _>>()?,
        };
        requires(
            ("virtual_link", !area.virtual_links.is_empty()),
            (
                "area_id 0.0.0.0",
                string_of(&state.area_id).as_deref() == Some(BACKBONE),
            ),
        )?;
        Ok(area)
    }

    fn to_state(key: &AreaKey, area: Area) -> AreaState {
        AreaState {
            id: Value::Null,
            area_id: string_value(Some(key.area_id.clone())),
            version: string_value(Some(key.version.clone())),
            routing_instance: string_value(Some(key.routing_instance.clone())),
            stub: flag_value(area.stub),
            nssa: flag_value(area.nssa),
            interface: blocks_value(area.interfaces, AreaInterfaceState::from),
            virtual_link: blocks_value(area.virtual_links, VirtualLinkState::from),
        }
    }

    fn emit(area: &Area, prefix: &str, list: &mut SetList) -> Result<(), ConfigError> {
        exclusive(("stub", area.stub), ("nssa", area.nssa))?;
        check_unique(&area.interfaces)?;
        check_unique(&area.virtual_links)?;

        list.flag(prefix, "stub", area.stub);
        list.flag(prefix, "nssa", area.nssa);
        for interface in &area.interfaces {
            interface.emit(prefix, list);
        }
        for link in &area.virtual_links {
            link.emit(prefix, list);
        }
        Ok(())
    }

    fn parse(area: &mut Area, mut line: &str) -> Result<(), ConfigError> {
        if line == "stub" || line.starts_with("stub ") {
            area.stub = true;
        } else if line == "nssa" || line.starts_with("nssa ") {
            area.nssa = true;
        } else if cut_prefix(&mut line, "interface ") {
            let Some(name) = next_word(&mut line) else {
                return Err(ConfigError::not_enough_fields("interface", line));
            };
            find_or_create(&mut area.interfaces, name.into_owned()).parse(line)?;
        } else if cut_prefix(&mut line, "virtual-link ") {
            // neighbor-id <id> transit-area <area> [attribute]
            let words = fields(line, 4, "virtual-link")?;
            let key = PairKey(words[1].to_string(), words[3].to_string());
            let mut rest = line;
            for _ in 0..4 {
                next_word(&mut rest);
            }
            find_or_create(&mut area.virtual_links, key).parse(rest)?;
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

    fn key(area_id: &str, routing_instance: &str) -> AreaKey {
        AreaKey {
            area_id: area_id.to_owned(),
            version: "v2".to_owned(),
            routing_instance: routing_instance.to_owned(),
        }
    }

    #[test]
    fn paths() {
        assert_eq!(OspfArea::path(&key("0.0.0.1", "default")), "protocols ospf area 0.0.0.1");
        let v3 = AreaKey {
            version: "v3".to_owned(),
            ..key("0.0.0.1", "blue")
        };
        assert_eq!(
            OspfArea::path(&v3),
            "routing-instances blue protocols ospf3 area 0.0.0.1"
        );
    }

    #[test]
    fn zero_priority_is_emitted() {
        let area = Area {
            interfaces: vec![AreaInterface {
                name: "ge-0/0/0.0".to_owned(),
                priority: Some(0),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(
            set_lines::<OspfArea>(&key("0.0.0.1", "default"), &area).unwrap(),
            [
                "set protocols ospf area 0.0.0.1",
                "set protocols ospf area 0.0.0.1 interface ge-0/0/0.0 priority 0",
            ]
        );
    }

    #[test]
    fn stub_conflicts_with_nssa() {
        let area = Area {
            stub: true,
            nssa: true,
            ..Default::default()
        };
        assert_eq!(
            set_lines::<OspfArea>(&key("0.0.0.1", "default"), &area).unwrap_err(),
            ConfigError::Conflict("stub", "nssa")
        );
    }

    #[test]
    fn virtual_link_needs_backbone() {
        let mut state = OspfArea::to_state(
            &key("0.0.0.1", "default"),
            Area {
                virtual_links: vec![VirtualLink::with_key(PairKey(
                    "192.0.2.1".to_owned(),
                    "0.0.0.1".to_owned(),
                ))],
                ..Default::default()
            },
        );
        assert_eq!(
            OspfArea::to_record(&state).unwrap_err().to_string(),
            "virtual_link need to be set with area_id 0.0.0.0"
        );

        state.area_id = string_value(Some(BACKBONE.to_owned()));
        assert!(OspfArea::to_record(&state).is_ok());
    }

    #[test]
    fn out_of_range_numbers_are_rejected() {
        let mut interface = AreaInterfaceState::from(AreaInterface::with_key("lo0.0".to_owned()));
        interface.priority = Value::Value(256);
        assert!(matches!(
            AreaInterface::try_from(&interface),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn parses_device_output() {
        let output = "\
set interface ge-0/0/0.0 metric 10
set interface lo0.0 passive
set virtual-link neighbor-id 192.0.2.1 transit-area 0.0.0.1 hello-interval 5
set interface ge-0/0/0.0 priority 0
set virtual-link neighbor-id 192.0.2.1 transit-area 0.0.0.1 disable
set virtual-link neighbor-id 192.0.2.2 transit-area 0.0.0.1
";
        let mut area = Area::default();
        parse_lines(output, &mut area, OspfArea::parse).unwrap();

        assert_eq!(
            area,
            Area {
                interfaces: vec![
                    AreaInterface {
                        name: "ge-0/0/0.0".to_owned(),
                        metric: Some(10),
                        priority: Some(0),
                        ..Default::default()
                    },
                    AreaInterface {
                        name: "lo0.0".to_owned(),
                        passive: true,
                        ..Default::default()
                    },
                ],
                virtual_links: vec![
                    VirtualLink {
                        neighbor_id: "192.0.2.1".to_owned(),
                        transit_area: "0.0.0.1".to_owned(),
                        disable: true,
                        hello_interval: Some(5),
                        ..Default::default()
                    },
                    VirtualLink::with_key(PairKey("192.0.2.2".to_owned(), "0.0.0.1".to_owned())),
                ],
                ..Default::default()
            }
        );
    }

    #[test]
    fn bad_numbers_and_short_lines_fail() {
        let mut area = Area::default();
        assert!(matches!(
            OspfArea::parse(&mut area, "interface ge-0/0/0.0 metric ten"),
            Err(ConfigError::FailedConvAtoi { .. })
        ));
        assert!(matches!(
            OspfArea::parse(&mut area, "virtual-link neighbor-id 192.0.2.1"),
            Err(ConfigError::NotEnoughFields { .. })
        ));
    }

    #[test]
    fn duplicate_virtual_links_are_rejected() {
        let link = VirtualLink::with_key(PairKey("192.0.2.1".to_owned(), "0.0.0.1".to_owned()));
        let area = Area {
            virtual_links: vec![link.clone(), link],
            ..Default::default()
        };
        assert_eq!(
            set_lines::<OspfArea>(&key(BACKBONE, "default"), &area)
                .unwrap_err()
                .to_string(),
            "multiple blocks virtual_link with the same neighbor_id and transit_area 192.0.2.1 0.0.0.1"
        );
    }

    #[tokio::test]
    async fn round_trips_through_device() {
        let area = Area {
            stub: true,
            interfaces: vec![
                AreaInterface {
                    name: "ge-0/0/1.0".to_owned(),
                    metric: Some(100),
                    priority: Some(0),
                    hello_interval: Some(5),
                    dead_interval: Some(20),
                    retransmit_interval: Some(3),
                    interface_type: Some("p2p".to_owned()),
                    ..Default::default()
                },
                AreaInterface::with_key("lo0.0".to_owned()),
                AreaInterface {
                    name: "ge-0/0/2.0".to_owned(),
                    disable: true,
                    passive: true,
                    ..Default::default()
                },
            ],
            virtual_links: vec![VirtualLink {
                neighbor_id: "192.0.2.9".to_owned(),
                transit_area: "0.0.0.2".to_owned(),
                transit_delay: Some(2),
                ..Default::default()
            }],
            ..Default::default()
        };

        let read = round_trip::<OspfArea>(&key(BACKBONE, "blue"), &area)
            .await
            .unwrap();
        assert_eq!(read, area);
    }
}
