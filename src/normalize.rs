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

//! Flattening of managed-object trees into fixed-schema report tables.

use crate::dn::{EpgPath, parse_epg_dn};
use crate::mo::ManagedObject;
use crate::path::InterfaceId;
use std::cmp::Ordering;
use std::collections::HashSet;

pub const EPG_COLUMNS: &[&str] = &["Tenant", "Application Profile", "EPG", "Alias"];

pub const INTERFACE_STATUS_COLUMNS: &[&str] = &[
    "Interface",
    "Description",
    "Admin State",
    "Oper State",
    "Oper Reason",
    "Speed",
    "Duplex",
    "Port-Channel",
    "MTU",
    "Usage",
];

pub const INTERFACE_EPG_COLUMNS: &[&str] = &["Interface", "Tenant", "Application Profile", "EPG"];

/// One flattened row. Values line up with the owning table's columns;
/// `None` marks a value the controller did not provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord(Vec<Option<String>>);

impl InventoryRecord {
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.0
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.0.get(idx).and_then(|v| v.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    columns: &'static [&'static str],
    sort_key: &'static [&'static str],
    rows: Vec<InventoryRecord>,
}

impl ReportTable {
    pub fn new(columns: &'static [&'static str], sort_key: &'static [&'static str]) -> Self {
        debug_assert!(sort_key.iter().all(|k| columns.contains(k)));
        Self {
            columns,
            sort_key,
            rows: Vec::new(),
        }
    }

    /// Appends a row; rows that do not match the column count are refused.
    pub fn push(&mut self, record: InventoryRecord) -> Result<(), InventoryRecord> {
        if record.values().len() != self.columns.len() {
            return Err(record);
        }
        self.rows.push(record);
        Ok(())
    }

    pub fn columns(&self) -> &[&'static str] {
        self.columns
    }

    pub fn rows(&self) -> &[InventoryRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == name)
    }

    /// Stable sort on the declared key, comparing cells in natural order.
    pub fn sort(&mut self) {
        let key: Vec<usize> = self
            .sort_key
            .iter()
            .filter_map(|name| self.column(name))
            .collect();
        self.rows.sort_by(|a, b| {
            key.iter()
                .map(|&idx| natural_cmp(a.get(idx).unwrap_or(""), b.get(idx).unwrap_or("")))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        });
    }
}

/// Case-insensitive, digit-aware ordering (`EPG2 < EPG10`), falling back to a
/// case-sensitive comparison so that distinct strings never compare equal.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natord::compare_ignore_case(a, b).then_with(|| natord::compare(a, b))
}

fn push_checked(table: &mut ReportTable, values: Vec<Option<String>>) {
    if let Err(rejected) = table.push(InventoryRecord::new(values)) {
        tracing::error!(?rejected, "row does not match table columns, dropped");
    }
}

/// All `fvAEPg` objects across all tenants.
pub fn epg_table(objects: &[ManagedObject]) -> ReportTable {
    let mut table = ReportTable::new(EPG_COLUMNS, &["Tenant", "Application Profile", "EPG"]);
    for mo in objects.iter().filter(|mo| mo.class == "fvAEPg") {
        let Some(dn) = mo.attr("dn") else {
            tracing::warn!("fvAEPg without dn skipped: {:?}", mo.attributes);
            continue;
        };
        match parse_epg_dn(&dn) {
            Ok(EpgPath {
                tenant,
                profile,
                group,
            }) => push_checked(
                &mut table,
                vec![Some(tenant), Some(profile), Some(group), mo.attr("nameAlias")],
            ),
            Err(err) => tracing::warn!("Unexpected EPG dn `{dn}` skipped: {err}"),
        }
    }
    table.sort();
    table
}

/// Operational state carried by the `ethpmPhysIf` child of an `l1PhysIf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperState {
    Present {
        state: Option<String>,
        reason: Option<String>,
        speed: Option<String>,
        duplex: Option<String>,
        port_channel: Option<String>,
    },
    Absent,
}

impl OperState {
    pub fn of(interface: &ManagedObject) -> Self {
        let id = interface.attr("id").unwrap_or_default();
        let mut children = interface.children_of_class("ethpmPhysIf");
        let Some(child) = children.next() else {
            tracing::warn!("No ethpmPhysIf child for interface {id}; operational fields left empty");
            return OperState::Absent;
        };
        let extra = children.count();
        if extra > 0 {
            tracing::warn!("Interface {id} has {} ethpmPhysIf children, using the first", extra + 1);
        }
        OperState::Present {
            state: child.attr("operSt"),
            reason: child.attr("operStQual"),
            speed: child.attr("operSpeed"),
            duplex: child.attr("operDuplex"),
            port_channel: child.attr("bundleIndex"),
        }
    }
}

/// Physical interfaces of one node with their operational state.
pub fn interface_status_table(objects: &[ManagedObject]) -> ReportTable {
    let mut table = ReportTable::new(INTERFACE_STATUS_COLUMNS, &["Interface"]);
    for mo in objects.iter().filter(|mo| mo.class == "l1PhysIf") {
        let (state, reason, speed, duplex, port_channel) = match OperState::of(mo) {
            OperState::Present {
                state,
                reason,
                speed,
                duplex,
                port_channel,
            } => (state, reason, speed, duplex, port_channel),
            OperState::Absent => (None, None, None, None, None),
        };
        push_checked(
            &mut table,
            vec![
                mo.attr("id"),
                mo.attr("descr"),
                mo.attr("adminSt"),
                state,
                reason,
                speed,
                duplex,
                port_channel,
                mo.attr("mtu"),
                mo.attr("usage"),
            ],
        );
    }
    table.sort();
    table
}

/// EPGs deployed on one interface, taken from the `pconsResourceCtx`
/// objects of a full-deployment subtree query.
pub fn interface_epg_table(interface: &InterfaceId, objects: &[ManagedObject]) -> ReportTable {
    let mut table = ReportTable::new(
        INTERFACE_EPG_COLUMNS,
        &["Tenant", "Application Profile", "EPG"],
    );
    let mut seen = HashSet::new();
    let contexts = objects
        .iter()
        .flat_map(|mo| mo.descendants())
        .filter(|mo| mo.class == "pconsResourceCtx");

    for ctx in contexts {
        if ctx.attr("ctxClass").as_deref() != Some("fvAEPg") {
            continue;
        }
        let Some(dn) = ctx.attr("ctxDn") else {
            tracing::warn!("pconsResourceCtx without ctxDn skipped");
            continue;
        };
        let path = match parse_epg_dn(&dn) {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!("Unexpected EPG dn `{dn}` skipped: {err}");
                continue;
            }
        };
        if !seen.insert(dn) {
            continue;
        }
        push_checked(
            &mut table,
            vec![
                Some(interface.to_string()),
                Some(path.tenant),
                Some(path.profile),
                Some(path.group),
            ],
        );
    }
    table.sort();
    table
}
