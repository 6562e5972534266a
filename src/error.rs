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

use thiserror::Error;

pub const LOGIN_FIRST: &str = "Please log in first with \"connect -u [username]\"";

#[derive(Debug, Error)]
pub enum AciError {
    #[error("APIC unreachable at {url}: {source}")]
    Connectivity {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("APIC {action} failed with HTTP {status}\n\nData reported by APIC: {body}")]
    Authentication {
        action: &'static str,
        status: u16,
        body: String,
    },
    #[error("query `{path}` failed with HTTP {status}\n\nData reported by APIC: {body}")]
    Query {
        path: String,
        status: u16,
        body: String,
    },
    #[error("could not decode APIC response for `{path}`: {reason}")]
    Decode { path: String, reason: String },
    #[error("invalid {kind} `{value}`: {reason}")]
    InvalidIdentifier {
        kind: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("{}", LOGIN_FIRST)]
    Precondition,
    #[error("export to {path} failed: {reason}")]
    Export { path: String, reason: String },
}

impl AciError {
    /// Whether the error came from the controller rather than from local input.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AciError::Connectivity { .. }
                | AciError::Authentication { .. }
                | AciError::Query { .. }
                | AciError::Decode { .. }
        )
    }
}

/// Why a distinguished name could not be split into tenant, profile and group.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DnError {
    #[error("missing `tn-` segment")]
    MissingTenant,
    #[error("missing `/ap-` segment")]
    MissingProfile,
    #[error("missing `/epg-` segment")]
    MissingGroup,
    #[error("empty or malformed {0} name")]
    MalformedSegment(&'static str),
    #[error("unexpected trailing path `{0}`")]
    TrailingPath(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_message_matches_prompt() {
        assert_eq!(
            AciError::Precondition.to_string(),
            "Please log in first with \"connect -u [username]\""
        );
    }

    #[test]
    fn query_error_keeps_body_verbatim() {
        let err = AciError::Query {
            path: "node/class/fvAEPg.json".into(),
            status: 400,
            body: r#"{"imdata":[{"error":{"attributes":{"code":"400"}}}]}"#.into(),
        };
        let text = err.to_string();
        assert!(text.contains("HTTP 400"));
        assert!(text.contains(r#"{"imdata":[{"error":{"attributes":{"code":"400"}}}]}"#));
        assert!(err.is_remote());
        assert!(!AciError::Precondition.is_remote());
    }
}
