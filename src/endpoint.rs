use super::error::{Error, Result};

use serde::{Deserialize, Serialize};
use url::Url;

use std::fmt::{self, Display};
use std::str::FromStr;

/// Transport security of an [`Endpoint`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// `https://`
    Secure,
    /// `http://`
    Insecure,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Secure => "https",
            Self::Insecure => "http",
        }
    }
}

/// Address of a handset's web interface
///
/// The host may carry a port (`10.0.0.5:8443`). Downgrading only ever swaps the
/// scheme, the host is never touched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Endpoint {
    scheme: Scheme,
    host: String,
}

impl Endpoint {
    pub fn new<S: Into<String>>(scheme: Scheme, host: S) -> Self {
        Self {
            scheme,
            host: host.into(),
        }
    }

    pub fn secure<S: Into<String>>(host: S) -> Self {
        Self::new(Scheme::Secure, host)
    }

    pub fn insecure<S: Into<String>>(host: S) -> Self {
        Self::new(Scheme::Insecure, host)
    }

    /// Parse `10.0.0.5`, `10.0.0.5:8443`, `https://10.0.0.5` or `http://10.0.0.5`.
    ///
    /// A bare host defaults to [`Scheme::Secure`].
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim().trim_end_matches('/');
        let (scheme, url) = if input.contains("://") {
            let url = Url::parse(input).map_err(|_| Error::invalid_host(input))?;
            let scheme = match url.scheme() {
                "https" => Scheme::Secure,
                "http" => Scheme::Insecure,
                _ => return Err(Error::invalid_host(input)),
            };
            (scheme, url)
        } else {
            let url = Url::parse(&format!("https://{}", input))
                .map_err(|_| Error::invalid_host(input))?;
            (Scheme::Secure, url)
        };

        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(Error::invalid_host(input));
        }

        // `Url` hides a port equal to the scheme's default, but a written port is kept
        // so that a downgrade still reaches it.
        let authority = input.split_once("://").map_or(input, |(_, rest)| rest);
        let written_port = authority
            .rsplit_once(':')
            .map_or(false, |(_, port)| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()));
        let port = if written_port {
            url.port_or_known_default()
        } else {
            url.port()
        };

        let host = match (url.host_str(), port) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(Error::invalid_host(input)),
        };

        Ok(Self { scheme, host })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn is_secure(&self) -> bool {
        self.scheme == Scheme::Secure
    }

    /// Same host over plain http, or `None` if already insecure
    pub fn downgraded(&self) -> Option<Endpoint> {
        match self.scheme {
            Scheme::Secure => Some(Self::insecure(self.host.clone())),
            Scheme::Insecure => None,
        }
    }

    /// Absolute url for a query path built by [`Command::query`](super::Command::query)
    pub fn url(&self, query: &str) -> String {
        format!("{}://{}{}", self.scheme.as_str(), self.host, query)
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme.as_str(), self.host)
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
