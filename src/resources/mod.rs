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

pub(crate) mod firewall_filter;
pub(crate) mod interface_logical;
pub(crate) mod ospf_area;
pub(crate) mod security_zone;

pub use firewall_filter::FirewallFilter;
pub use interface_logical::InterfaceLogical;
pub use ospf_area::OspfArea;
pub use security_zone::SecurityZone;
