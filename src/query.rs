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

use crate::error::AciError;
use crate::mo::{ManagedObject, decode_envelope};
use crate::normalize::{self, ReportTable};
use crate::report::MAX_SHEET_NAME;
use crate::path::{ApiPath, InterfaceId, NodeId, PodId};
use crate::session::Session;

/// The inventory questions the shell can ask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    EpgAll,
    InterfaceStatus {
        pod: PodId,
        node: NodeId,
    },
    InterfaceEpg {
        pod: PodId,
        node: NodeId,
        interface: InterfaceId,
    },
}

impl Query {
    pub fn path(&self) -> ApiPath {
        match self {
            Query::EpgAll => ApiPath::epg_all(),
            Query::InterfaceStatus { pod, node } => ApiPath::interface_status(pod, node),
            Query::InterfaceEpg {
                pod,
                node,
                interface,
            } => ApiPath::interface_deployment(pod, node, interface),
        }
    }

    /// Object class the rows are built from.
    pub fn object_class(&self) -> &'static str {
        match self {
            Query::EpgAll => "fvAEPg",
            Query::InterfaceStatus { .. } => "l1PhysIf",
            Query::InterfaceEpg { .. } => "pconsResourceCtx",
        }
    }

    /// Worksheet name for exports of this query, before sanitizing.
    pub fn sheet_name(&self) -> String {
        match self {
            Query::EpgAll => "EPG".to_string(),
            Query::InterfaceStatus { pod, node } => {
                shortened("Interface_Status", "IF_Status", &format!("P{pod}_N{node}"))
            }
            Query::InterfaceEpg {
                pod,
                node,
                interface,
            } => shortened(
                "Interface_EPG",
                "IF_EPG",
                &format!("P{pod}_N{node}_{}", interface.as_str().replace('/', "-")),
            ),
        }
    }

    pub fn normalize(&self, objects: &[ManagedObject]) -> ReportTable {
        match self {
            Query::EpgAll => normalize::epg_table(objects),
            Query::InterfaceStatus { .. } => normalize::interface_status_table(objects),
            Query::InterfaceEpg { interface, .. } => {
                normalize::interface_epg_table(interface, objects)
            }
        }
    }
}

/// `<prefix>_<key>`, or `<short>_<key>` when the long form would not fit in
/// a worksheet name. The key carries the identifiers and is never cut here.
fn shortened(prefix: &str, short: &str, key: &str) -> String {
    let full = format!("{prefix}_{key}");
    if full.chars().count() <= MAX_SHEET_NAME {
        full
    } else {
        format!("{short}_{key}")
    }
}

/// Issues the query and decodes the `imdata` list. HTTP errors are logged
/// with the controller body and returned; the session stays usable.
pub fn fetch(session: &Session, query: &Query) -> Result<Vec<ManagedObject>, AciError> {
    let path = query.path();
    let resp = session.client().get(path.as_str())?;

    if !resp.is_success() {
        tracing::error!(status = resp.status, %path, "HTTP error from APIC");
        tracing::error!("Data reported by APIC: {}", resp.body);
        return Err(AciError::Query {
            path: path.to_string(),
            status: resp.status,
            body: resp.body,
        });
    }

    let json = resp.json.ok_or_else(|| AciError::Decode {
        path: path.to_string(),
        reason: "response body is not JSON".to_string(),
    })?;
    let objects = decode_envelope(&json).map_err(|reason| AciError::Decode {
        path: path.to_string(),
        reason,
    })?;
    tracing::debug!(
        count = objects.len(),
        class = query.object_class(),
        "decoded APIC objects"
    );
    Ok(objects)
}

/// Fetch + normalize in one step.
pub fn run(session: &Session, query: &Query) -> Result<ReportTable, AciError> {
    let objects = fetch(session, query)?;
    Ok(query.normalize(&objects))
}
