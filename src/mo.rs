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

//! Managed objects as returned by the APIC REST API.
//!
//! Every response carries `{"totalCount": "...", "imdata": [...]}` where each
//! `imdata` entry is a single-key object naming the object class:
//!
//! ```json
//! {"l1PhysIf": {"attributes": {"id": "eth1/1"}, "children": [{"ethpmPhysIf": {...}}]}}
//! ```

use serde_json::{Map, Value};

pub const ENVELOPE_KEY: &str = "imdata";

#[derive(Debug, Clone, PartialEq)]
pub struct ManagedObject {
    pub class: String,
    pub attributes: Map<String, Value>,
    pub children: Vec<ManagedObject>,
}

impl ManagedObject {
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let tagged = value
            .as_object()
            .ok_or_else(|| format!("expected a tagged object, got {}", kind_of(value)))?;
        let mut entries = tagged.iter();
        let (class, body) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => {
                return Err(format!(
                    "expected exactly one class tag, got {}",
                    tagged.len()
                ));
            }
        };

        let attributes = body
            .get("attributes")
            .and_then(|a| a.as_object())
            .cloned()
            .unwrap_or_default();
        let children = match body.get("children") {
            Some(Value::Array(items)) => items
                .iter()
                .map(ManagedObject::from_value)
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(format!(
                    "`{class}` children must be a list, got {}",
                    kind_of(other)
                ));
            }
            None => Vec::new(),
        };

        Ok(ManagedObject {
            class: class.clone(),
            attributes,
            children,
        })
    }

    /// Attribute as text; the controller sends every attribute as a string
    /// but numbers are accepted too.
    pub fn attr(&self, name: &str) -> Option<String> {
        match self.attributes.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn children_of_class<'a>(
        &'a self,
        class: &'a str,
    ) -> impl Iterator<Item = &'a ManagedObject> + 'a {
        self.children.iter().filter(move |c| c.class == class)
    }

    /// Depth-first walk over this object and all of its descendants.
    pub fn descendants(&self) -> Vec<&ManagedObject> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(mo) = stack.pop() {
            out.push(mo);
            stack.extend(mo.children.iter().rev());
        }
        out
    }
}

/// Decode the `imdata` list of a response body.
pub fn decode_envelope(json: &Value) -> Result<Vec<ManagedObject>, String> {
    let items = json
        .get(ENVELOPE_KEY)
        .ok_or_else(|| format!("response has no `{ENVELOPE_KEY}` list"))?
        .as_array()
        .ok_or_else(|| format!("`{ENVELOPE_KEY}` is not a list"))?;
    items.iter().map(ManagedObject::from_value).collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_nested_children() {
        let body = json!({
            "totalCount": "1",
            "imdata": [{
                "l1PhysIf": {
                    "attributes": {"id": "eth1/1", "mtu": 9000},
                    "children": [{"ethpmPhysIf": {"attributes": {"operSt": "up"}}}]
                }
            }]
        });
        let mos = decode_envelope(&body).unwrap();
        assert_eq!(mos.len(), 1);
        assert_eq!(mos[0].class, "l1PhysIf");
        assert_eq!(mos[0].attr("id").as_deref(), Some("eth1/1"));
        assert_eq!(mos[0].attr("mtu").as_deref(), Some("9000"));
        let child = mos[0].children_of_class("ethpmPhysIf").next().unwrap();
        assert_eq!(child.attr("operSt").as_deref(), Some("up"));
    }

    #[test]
    fn walks_descendants_in_document_order() {
        let mo = ManagedObject::from_value(&json!({
            "a": {"children": [
                {"b": {"children": [{"c": {}}]}},
                {"d": {}}
            ]}
        }))
        .unwrap();
        let classes: Vec<_> = mo.descendants().iter().map(|m| m.class.as_str()).collect();
        assert_eq!(classes, ["a", "b", "c", "d"]);
    }

    #[test]
    fn rejects_missing_envelope_and_untagged_entries() {
        assert!(decode_envelope(&json!({"data": []})).is_err());
        assert!(decode_envelope(&json!({"imdata": {}})).is_err());
        let err = decode_envelope(&json!({"imdata": [{"a": {}, "b": {}}]})).unwrap_err();
        assert!(err.contains("exactly one class tag"));
    }
}
