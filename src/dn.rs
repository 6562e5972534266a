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

use crate::error::DnError;

/// Tenant, application profile and endpoint group recovered from an EPG dn
/// such as `uni/tn-Prod/ap-Web/epg-Frontend`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpgPath {
    pub tenant: String,
    pub profile: String,
    pub group: String,
}

pub fn parse_epg_dn(dn: &str) -> Result<EpgPath, DnError> {
    let rest = dn.strip_prefix("uni/").unwrap_or(dn);
    let rest = rest.strip_prefix("tn-").ok_or(DnError::MissingTenant)?;
    let (tenant, rest) = rest.split_once("/ap-").ok_or(DnError::MissingProfile)?;
    let (profile, group) = rest.split_once("/epg-").ok_or(DnError::MissingGroup)?;

    // Object names cannot contain '/', so anything after one belongs to a child mo.
    if let Some((_, tail)) = group.split_once('/') {
        return Err(DnError::TrailingPath(tail.to_string()));
    }
    for (label, value) in [("tenant", tenant), ("profile", profile), ("group", group)] {
        if value.is_empty() || value.contains('/') {
            return Err(DnError::MalformedSegment(label));
        }
    }

    Ok(EpgPath {
        tenant: tenant.to_string(),
        profile: profile.to_string(),
        group: group.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_epg_dn() {
        let path = parse_epg_dn("uni/tn-Prod/ap-Web-App/epg-EPG-10").unwrap();
        assert_eq!(
            path,
            EpgPath {
                tenant: "Prod".into(),
                profile: "Web-App".into(),
                group: "EPG-10".into(),
            }
        );
    }

    #[test]
    fn accepts_dn_without_uni_prefix() {
        let path = parse_epg_dn("tn-common/ap-default/epg-default").unwrap();
        assert_eq!(path.tenant, "common");
    }

    #[test]
    fn names_the_missing_segment() {
        assert_eq!(parse_epg_dn("uni/infra"), Err(DnError::MissingTenant));
        assert_eq!(parse_epg_dn("uni/tn-T1/BD-bd1"), Err(DnError::MissingProfile));
        assert_eq!(parse_epg_dn("uni/tn-T1/ap-A1"), Err(DnError::MissingGroup));
        assert_eq!(
            parse_epg_dn("uni/tn-T1/ap-/epg-E1"),
            Err(DnError::MalformedSegment("profile"))
        );
        assert_eq!(
            parse_epg_dn("uni/tn-T1/x/ap-A1/epg-E1"),
            Err(DnError::MalformedSegment("tenant"))
        );
    }

    #[test]
    fn rejects_child_object_dns() {
        assert_eq!(
            parse_epg_dn("uni/tn-T1/ap-A1/epg-E1/rsbd"),
            Err(DnError::TrailingPath("rsbd".into()))
        );
    }
}
