// acishell - interactive shell for Cisco ACI APIC inventory queries
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Validated identifiers and the controller resource paths built from them.
//!
//! Identifiers are checked before they are interpolated, so a path segment
//! can never carry `?`, `#`, `..` or stray slashes into the request URL.

use crate::error::AciError;
use std::fmt;
use std::str::FromStr;

/// Fabric pod identifier (`pod-<id>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodId(String);

/// Fabric node (switch) identifier (`node-<id>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeId(String);

/// Physical interface identifier such as `eth1/33` or `eth1/1/2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceId(String);

fn numeric(kind: &'static str, raw: &str) -> Result<String, AciError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(invalid(kind, raw, "must not be empty"));
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid(kind, raw, "must contain digits only"));
    }
    Ok(value.to_string())
}

fn invalid(kind: &'static str, value: &str, reason: &'static str) -> AciError {
    AciError::InvalidIdentifier {
        kind,
        value: value.to_string(),
        reason,
    }
}

impl FromStr for PodId {
    type Err = AciError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        numeric("pod id", s).map(PodId)
    }
}

impl FromStr for NodeId {
    type Err = AciError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        numeric("node id", s).map(NodeId)
    }
}

impl FromStr for InterfaceId {
    type Err = AciError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const KIND: &str = "interface";
        let value = s.trim();
        let prefix_len = value
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .count();
        if prefix_len == 0 {
            return Err(invalid(KIND, s, "must start with a type prefix like `eth`"));
        }
        let ports = &value[prefix_len..];
        if ports.is_empty() {
            return Err(invalid(KIND, s, "missing module/port numbers"));
        }
        let all_numeric = ports
            .split('/')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
        if !all_numeric {
            return Err(invalid(KIND, s, "expected `<type><module>/<port>`, e.g. eth1/1"));
        }
        Ok(InterfaceId(value.to_string()))
    }
}

impl InterfaceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A path relative to the controller API root, e.g. `node/class/fvAEPg.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath(String);

impl ApiPath {
    pub const LOGIN: &'static str = "aaaLogin.json";
    pub const LOGOUT: &'static str = "aaaLogout.json";

    pub fn epg_all() -> Self {
        ApiPath("node/class/fvAEPg.json".to_string())
    }

    pub fn interface_status(pod: &PodId, node: &NodeId) -> Self {
        ApiPath(format!(
            "node/class/topology/pod-{pod}/node-{node}/l1PhysIf.json\
             ?&rsp-subtree=children&rsp-subtree-class=ethpmPhysIf&order-by=l1PhysIf.id"
        ))
    }

    pub fn interface_deployment(pod: &PodId, node: &NodeId, interface: &InterfaceId) -> Self {
        ApiPath(format!(
            "node/mo/topology/pod-{pod}/node-{node}/sys/phys-[{interface}].json\
             ?rsp-subtree-include=full-deployment&target-node=all&target-path=l1EthIfToEPg"
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
