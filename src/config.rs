use super::command::Session;
use super::constants::{DEFAULT_PASSWORD, DEFAULT_TIMEOUT, DEFAULT_USERNAME};
use super::endpoint::Endpoint;
use super::error::Result;
use super::provision::{Credentials, DeviceTarget};
use super::retry::DowngradeRetrier;
use super::session::SessionClient;
use super::settings::{Settings, Write};
use super::transport::{HttpTransport, TransportPolicy};

use serde::Deserialize;

use std::time::Duration;

/// Everything needed to talk to one handset
///
/// Only `host` is required:
///
/// ```
/// let config = necsip::ClientConfig::from_json(r#"{
///     "host": "10.0.0.5",
///     "allow_downgrade": true,
///     "settings": { "lan": { "lldp_mode": true } }
/// }"#)?;
/// assert_eq!(config.username, "ADMIN");
/// # Ok::<(), necsip::Error>(())
/// ```
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// `10.0.0.5`, `10.0.0.5:8443` or a full `https://`/`http://` address
    pub host: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    /// Talk plain http from the first request
    #[serde(default)]
    pub force_http: bool,
    /// Retry a failed https request once over http
    #[serde(default)]
    pub allow_downgrade: bool,
    #[serde(default)]
    pub verify_certs: bool,
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub keep_session: bool,
    /// Token of a session kept open by an earlier run
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub settings: Settings,
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT
}

impl ClientConfig {
    /// Defaults for everything but the host
    pub fn new<S: Into<String>>(host: S) -> Self {
        Self {
            host: host.into(),
            username: default_username(),
            password: default_password(),
            force_http: false,
            allow_downgrade: false,
            verify_certs: false,
            proxy: None,
            timeout_secs: DEFAULT_TIMEOUT,
            keep_session: false,
            session_id: None,
            settings: Settings::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn policy(&self) -> TransportPolicy {
        TransportPolicy {
            verify_certs: self.verify_certs,
            proxy: self.proxy.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn endpoint(&self) -> Result<Endpoint> {
        let endpoint = Endpoint::parse(&self.host)?;
        if self.force_http {
            Ok(Endpoint::insecure(endpoint.host()))
        } else {
            Ok(endpoint)
        }
    }

    pub fn target(&self) -> Result<DeviceTarget> {
        let mut target = DeviceTarget::new(self.endpoint()?)
            .credentials(Credentials::new(self.username.as_str(), self.password.as_str()))
            .keep_session(self.keep_session);
        if let Some(token) = &self.session_id {
            target = target.session(Session::new(token.as_str())?);
        }
        Ok(target)
    }

    pub fn writes(&self) -> Result<Vec<Write>> {
        self.settings.writes()
    }

    pub fn transport(&self) -> DowngradeRetrier<HttpTransport> {
        DowngradeRetrier::new(HttpTransport::new()).allow_downgrade(self.allow_downgrade)
    }

    /// A ready client over reqwest, downgrading if allowed
    pub fn client(&self) -> Result<SessionClient<DowngradeRetrier<HttpTransport>>> {
        SessionClient::new(self.endpoint()?, self.transport(), self.policy())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("force_http", &self.force_http)
            .field("allow_downgrade", &self.allow_downgrade)
            .field("verify_certs", &self.verify_certs)
            .field("proxy", &self.proxy)
            .field("timeout_secs", &self.timeout_secs)
            .field("keep_session", &self.keep_session)
            .field("session_id", &self.session_id)
            .field("settings", &self.settings)
            .finish()
    }
}
