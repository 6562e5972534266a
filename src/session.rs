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

use crate::client::{ApicClient, ApicUrl, HttpSettings};
use crate::error::AciError;
use crate::path::ApiPath;
use anyhow::Result;
use serde_json::{Value, json};

/// An authenticated APIC session. The auth token lives in the client's
/// cookie jar (`APIC-cookie`) for as long as this value exists.
#[derive(Debug)]
pub struct Session {
    client: ApicClient,
    username: String,
}

impl Session {
    pub fn login(
        base_url: ApicUrl,
        settings: HttpSettings,
        username: &str,
        password: &str,
    ) -> Result<Session> {
        let client = ApicClient::new(base_url, settings)?;
        if let Err(err) = client.probe() {
            tracing::error!("Connection error: {err}");
            return Err(err.into());
        }

        let payload = json!({
            "aaaUser": {"attributes": {"name": username, "pwd": password}}
        });
        let resp = client
            .post_json(ApiPath::LOGIN, Some(&payload))
            .inspect_err(|err| tracing::error!("Connection error: {err}"))?;

        if !resp.is_success() {
            tracing::error!(status = resp.status, "HTTP error during APIC login");
            tracing::error!("Data reported by APIC: {}", resp.body);
            return Err(AciError::Authentication {
                action: "login",
                status: resp.status,
                body: resp.body,
            }
            .into());
        }

        tracing::info!("Successful APIC login with user {username}");
        Ok(Session {
            client,
            username: username.to_string(),
        })
    }

    /// Ends the session on the controller. The session is consumed even when
    /// the controller rejects the request; the local token is gone either way.
    pub fn logout(self) -> Result<(), AciError> {
        if let Err(err) = self.client.probe() {
            tracing::error!("Connection error: {err}");
            return Err(err);
        }

        let resp = self
            .client
            .post_json(ApiPath::LOGOUT, Option::<&Value>::None)
            .inspect_err(|err| tracing::error!("Connection error: {err}"))?;

        if !resp.is_success() {
            tracing::error!(status = resp.status, "HTTP error during APIC logout");
            tracing::error!("Data reported by APIC: {}", resp.body);
            return Err(AciError::Authentication {
                action: "logout",
                status: resp.status,
                body: resp.body,
            });
        }

        tracing::info!("Successful APIC logout for user {}", self.username);
        Ok(())
    }

    pub fn client(&self) -> &ApicClient {
        &self.client
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn base_url(&self) -> &ApicUrl {
        self.client.base_url()
    }
}

/// `Disconnected -> Connected` on login, back on logout or session loss.
#[derive(Debug, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connected(Session),
}

impl SessionState {
    /// Live session or a precondition failure. Never touches the network.
    pub fn require(&self) -> Result<&Session, AciError> {
        match self {
            SessionState::Connected(session) => Ok(session),
            SessionState::Disconnected => {
                tracing::warn!("Connection session with APIC missing");
                Err(AciError::Precondition)
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected(_))
    }

    /// Moves the session out, leaving the state disconnected.
    pub fn take(&mut self) -> Option<Session> {
        match std::mem::take(self) {
            SessionState::Connected(session) => Some(session),
            SessionState::Disconnected => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn base(server: &MockServer) -> ApicUrl {
        ApicUrl::new(&server.base_url()).unwrap()
    }

    fn mock_probe(server: &MockServer) {
        server.mock(|when, then| {
            when.method(GET).path("/api/");
            then.status(400).body("{}");
        });
    }

    #[test]
    fn login_posts_aaa_user_payload() {
        let server = MockServer::start();
        mock_probe(&server);
        let login = server.mock(|when, then| {
            when.method(POST)
                .path("/api/aaaLogin.json")
                .json_body(json!({"aaaUser": {"attributes": {"name": "admin", "pwd": "s3cret"}}}));
            then.status(200)
                .header("Set-Cookie", "APIC-cookie=tok; path=/")
                .json_body(json!({"imdata": [{"aaaLogin": {"attributes": {"token": "tok"}}}]}));
        });

        let session =
            Session::login(base(&server), HttpSettings::default(), "admin", "s3cret").unwrap();

        login.assert();
        assert_eq!(session.username(), "admin");
        assert_eq!(session.base_url().to_string(), format!("{}/api/", server.base_url()));
    }

    #[test]
    fn rejected_login_is_an_authentication_error() {
        let server = MockServer::start();
        mock_probe(&server);
        server.mock(|when, then| {
            when.method(POST).path("/api/aaaLogin.json");
            then.status(401)
                .body(r#"{"imdata":[{"error":{"attributes":{"text":"FAILED local authentication"}}}]}"#);
        });

        let err = Session::login(base(&server), HttpSettings::default(), "admin", "wrong")
            .unwrap_err();

        match err.downcast_ref::<AciError>() {
            Some(AciError::Authentication { status, body, .. }) => {
                assert_eq!(*status, 401);
                assert!(body.contains("FAILED local authentication"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unreachable_controller_fails_before_posting_credentials() {
        let url = ApicUrl::new("http://127.0.0.1:9").unwrap();
        let err = Session::login(url, HttpSettings::default(), "admin", "pw").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AciError>(),
            Some(AciError::Connectivity { .. })
        ));
    }

    #[test]
    fn logout_posts_to_aaa_logout() {
        let server = MockServer::start();
        mock_probe(&server);
        server.mock(|when, then| {
            when.method(POST).path("/api/aaaLogin.json");
            then.status(200).json_body(json!({"imdata": []}));
        });
        let logout = server.mock(|when, then| {
            when.method(POST).path("/api/aaaLogout.json");
            then.status(200).json_body(json!({"imdata": []}));
        });

        let session =
            Session::login(base(&server), HttpSettings::default(), "admin", "pw").unwrap();
        session.logout().unwrap();

        logout.assert();
    }

    #[test]
    fn failed_logout_reports_controller_body() {
        let server = MockServer::start();
        mock_probe(&server);
        server.mock(|when, then| {
            when.method(POST).path("/api/aaaLogin.json");
            then.status(200).json_body(json!({"imdata": []}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/api/aaaLogout.json");
            then.status(500).body("internal");
        });

        let session =
            Session::login(base(&server), HttpSettings::default(), "admin", "pw").unwrap();
        let err = session.logout().unwrap_err();

        assert!(matches!(
            err,
            AciError::Authentication { action: "logout", status: 500, ref body } if body == "internal"
        ));
    }

    #[test]
    fn disconnected_state_requires_login() {
        let mut state = SessionState::default();
        assert!(!state.is_connected());
        assert!(matches!(state.require(), Err(AciError::Precondition)));
        assert!(state.take().is_none());
    }
}
