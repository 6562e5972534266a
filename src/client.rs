use crate::error::AciError;
use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderValue, USER_AGENT};
use reqwest::{Method, Url};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

const UA: &str = "acishell/0.1";

/// The controller API root, `https://<host>/api/`. Fixed once per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApicUrl(Url);

impl ApicUrl {
    /// Accepts a bare FQDN (`apic1.example.net`) or a full controller URL.
    pub fn new(input: &str) -> Result<Self> {
        let trimmed = input.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(anyhow!("APIC address must not be empty"));
        }
        let root = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };
        let root = root.strip_suffix("/api").unwrap_or(&root);
        let url = Url::parse(&format!("{root}/api/"))
            .with_context(|| format!("parsing APIC address `{input}`"))?;
        if url.host_str().is_none() {
            return Err(anyhow!("APIC address `{input}` has no host"));
        }
        Ok(Self(url))
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    fn join(&self, path: &str) -> Result<Url, AciError> {
        self.0
            .join(path.trim_start_matches('/'))
            .map_err(|e| AciError::Decode {
                path: path.to_string(),
                reason: format!("cannot join path to base URL: {e}"),
            })
    }
}

impl fmt::Display for ApicUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HttpSettings {
    pub verify_tls: bool,
    pub timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            verify_tls: true,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResponseData {
    pub status: u16,
    pub body: String,
    pub json: Option<Value>,
}

impl ResponseData {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone)]
pub struct ApicClient {
    base_url: ApicUrl,
    http: Client,
}

impl ApicClient {
    pub fn new(base_url: ApicUrl, settings: HttpSettings) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(!settings.verify_tls)
            .user_agent(HeaderValue::from_static(UA))
            .timeout(settings.timeout)
            .build()
            .context("building HTTP client")?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &ApicUrl {
        &self.base_url
    }

    /// Reachability check against the API root. Any HTTP status counts as
    /// reachable; only transport failures are errors.
    pub fn probe(&self) -> Result<(), AciError> {
        self.http
            .get(self.base_url.as_url().clone())
            .send()
            .map(|_| ())
            .map_err(|source| AciError::Connectivity {
                url: self.base_url.to_string(),
                source,
            })
    }

    pub fn get(&self, path: &str) -> Result<ResponseData, AciError> {
        self.request(Method::GET, path, Option::<&Value>::None)
    }

    pub fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&T>,
    ) -> Result<ResponseData, AciError> {
        self.request(Method::POST, path, body)
    }

    fn request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
    ) -> Result<ResponseData, AciError> {
        let url = self.base_url.join(path)?;
        tracing::debug!(%method, %url, "sending APIC request");

        let mut request = self
            .http
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(USER_AGENT, HeaderValue::from_static(UA));

        if let Some(body) = body {
            request = request.json(body);
        }

        let connectivity = |source| AciError::Connectivity {
            url: self.base_url.to_string(),
            source,
        };
        let response = request.send().map_err(connectivity)?;
        let status = response.status().as_u16();
        let text = response.text().map_err(connectivity)?;
        let json = serde_json::from_str(&text).ok();

        Ok(ResponseData {
            status,
            body: text,
            json,
        })
    }
}
