use std::fmt::{self, Display};

use super::command::CommandKind;
use super::endpoint::Endpoint;
use super::transport::TransportError;

/// Result for calls made through a [`SessionClient`](super::SessionClient)
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Login was refused, unreachable, or the login page carried no session token
    AuthenticationFailed(Endpoint, AuthFailure),
    /// A session command was issued before a successful login
    NotLoggedIn,
    /// Symbolic option value is not part of the option's mapping
    InvalidEnumValue {
        option: &'static str,
        value: String,
    },
    /// A session token was empty
    EmptySession,
    /// The exchange could not be completed, even after any permitted downgrade
    TransportFailed {
        endpoint: Endpoint,
        command: CommandKind,
        source: TransportError,
    },
    /// The handset answered a command with a status other than 200
    DeviceRejected {
        endpoint: Endpoint,
        command: CommandKind,
        status: u16,
        body: String,
    },
    /// Errors from the caller's configuration
    Client(ClientError),
    /// Error from http client
    Reqwest(reqwest::Error),
    /// Error compiling the session pattern
    Regex(regex::Error),
    /// Error processing json configuration
    Json(serde_json::Error),
}

impl Error {
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::AuthenticationFailed(..))
    }

    pub fn is_not_logged_in(&self) -> bool {
        matches!(self, Error::NotLoggedIn)
    }

    pub fn is_invalid_enum(&self) -> bool {
        matches!(self, Error::InvalidEnumValue { .. })
    }

    /// The exchange never completed, including a login that could not reach the handset
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::TransportFailed { .. } | Error::AuthenticationFailed(_, AuthFailure::Transport(_))
        )
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Error::DeviceRejected { .. })
    }

    pub fn is_client(&self) -> bool {
        matches!(self, Error::Client(_))
    }

    pub(crate) fn invalid_enum<S: Into<String>>(option: &'static str, value: S) -> Error {
        Error::InvalidEnumValue {
            option,
            value: value.into(),
        }
    }

    pub(crate) fn invalid_host<S: Into<String>>(host: S) -> Error {
        ClientError::InvalidHost(host.into()).into()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TransportFailed { source, .. } => Some(source),
            Self::AuthenticationFailed(_, AuthFailure::Transport(e)) => Some(e),
            Self::Reqwest(e) => Some(e),
            Self::Regex(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ClientError> for Error {
    fn from(e: ClientError) -> Self {
        Error::Client(e)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Error {
        Error::Reqwest(e)
    }
}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Error {
        Error::Regex(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Json(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthenticationFailed(endpoint, reason) => {
                write!(f, "Login to '{}' failed: {}", endpoint, reason)
            }
            Self::NotLoggedIn => write!(f, "No active session, login first"),
            Self::InvalidEnumValue { option, value } => {
                write!(f, "'{}' is not a valid value for {}", value, option)
            }
            Self::EmptySession => write!(f, "Session token must not be empty"),
            Self::TransportFailed {
                endpoint,
                command,
                source,
            } => write!(f, "{} request to '{}' failed: {}", command, endpoint, source),
            Self::DeviceRejected {
                endpoint,
                command,
                status,
                body,
            } => write!(
                f,
                "{} request to '{}' rejected with status {}: {}",
                command, endpoint, status, body
            ),
            Self::Client(e) => write!(f, "{}", e),
            Self::Reqwest(e) => write!(f, "{}", e),
            Self::Regex(e) => write!(f, "{}", e),
            Self::Json(e) => write!(f, "{}", e),
        }
    }
}

/// Reason a login did not produce a session
#[derive(Debug)]
pub enum AuthFailure {
    /// Handset answered with a status other than 200
    Status(u16),
    /// Login page did not contain a session token
    MissingToken,
    /// The login request never completed
    Transport(TransportError),
}

impl Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "status {}", status),
            Self::MissingToken => write!(f, "no session token in response"),
            Self::Transport(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug)]
pub enum ClientError {
    /// Host could not be parsed into an endpoint
    InvalidHost(String),
    /// Proxy address was rejected by the http client
    InvalidProxy(String),
    /// Setting name is not part of the item code catalog
    UnknownSetting(String),
}

impl Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            Self::InvalidHost(host) => write!(f, "Invalid handset address: '{}'", host),
            Self::InvalidProxy(proxy) => write!(f, "Invalid proxy address: '{}'", proxy),
            Self::UnknownSetting(name) => write!(f, "Unknown setting: '{}'", name),
        }
    }
}
