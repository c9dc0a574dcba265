use super::catalog::{assign, Companion, Entry, ItemCode};
use super::constants::CGI_PATH;
use super::endpoint::Endpoint;
use super::error::{Error, Result};

use serde::Serialize;
use url::form_urlencoded::byte_serialize;

use std::fmt::{self, Debug, Display};

/// Token issued by the handset on login
///
/// Never empty; every command other than [`Command::Login`] carries one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Session(String);

impl Session {
    pub fn new<S: Into<String>>(token: S) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(Error::EmptySession);
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request shape, used to label logs and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommandKind {
    Login,
    Logout,
    SetSingle,
    SetPair,
    Assign,
}

impl Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::SetSingle => "set",
            Self::SetPair => "set pair",
            Self::Assign => "assign",
        })
    }
}

/// Write operation without a session, bound to the live token by
/// [`SessionClient::execute`](super::SessionClient::execute)
#[derive(Clone, PartialEq, Eq)]
pub enum Action {
    /// `set=<item>&item=<value>`
    Set { item: ItemCode, value: String },
    /// `set=<item>&item=<value>&<companion key>=<companion value>`
    SetPair {
        item: ItemCode,
        value: String,
        companion: Companion,
    },
    /// `<key>=<value>` with no `set=`/`item=` wrapper
    Assign { key: &'static str, value: &'static str },
}

impl Action {
    pub fn set<S: Into<String>>(item: ItemCode, value: S) -> Self {
        Self::Set {
            item,
            value: value.into(),
        }
    }

    pub fn set_pair<S: Into<String>>(item: ItemCode, value: S, companion: Companion) -> Self {
        Self::SetPair {
            item,
            value: value.into(),
            companion,
        }
    }

    pub fn assign(pair: (&'static str, &'static str)) -> Self {
        Self::Assign {
            key: pair.0,
            value: pair.1,
        }
    }

    /// Single or paired write depending on the catalog entry's companion
    pub fn for_entry<S: Into<String>>(entry: &Entry, value: S) -> Self {
        match entry.companion {
            Some(companion) => Self::set_pair(entry.code, value, companion),
            None => Self::set(entry.code, value),
        }
    }

    /// The handset reboots on this write and drops its session
    pub fn is_reboot(&self) -> bool {
        matches!(self, Self::Assign { key, .. } if *key == assign::HARD_RESET.0)
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Set { .. } => CommandKind::SetSingle,
            Self::SetPair { .. } => CommandKind::SetPair,
            Self::Assign { .. } => CommandKind::Assign,
        }
    }

    pub fn bind(self, session: Session) -> Command {
        match self {
            Self::Set { item, value } => Command::SetSingle {
                session,
                item,
                value,
            },
            Self::SetPair {
                item,
                value,
                companion,
            } => Command::SetPair {
                session,
                item,
                value,
                companion,
            },
            Self::Assign { key, value } => Command::Assign {
                session,
                key,
                value,
            },
        }
    }
}

impl Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set { item, value } => f
                .debug_struct("Set")
                .field("item", item)
                .field("value", &shown(item, value))
                .finish(),
            Self::SetPair {
                item,
                value,
                companion,
            } => f
                .debug_struct("SetPair")
                .field("item", item)
                .field("value", &shown(item, value))
                .field("companion", companion)
                .finish(),
            Self::Assign { key, value } => f
                .debug_struct("Assign")
                .field("key", key)
                .field("value", value)
                .finish(),
        }
    }
}

/// A request the handset understands
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    Login {
        username: String,
        password: String,
    },
    /// Commit all pending writes and end the session
    Logout { session: Session },
    SetSingle {
        session: Session,
        item: ItemCode,
        value: String,
    },
    SetPair {
        session: Session,
        item: ItemCode,
        value: String,
        companion: Companion,
    },
    Assign {
        session: Session,
        key: &'static str,
        value: &'static str,
    },
}

impl Command {
    pub fn login<S: Into<String>>(username: S, password: S) -> Self {
        Self::Login {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn logout(session: Session) -> Self {
        Self::Logout { session }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Login { .. } => CommandKind::Login,
            Self::Logout { .. } => CommandKind::Logout,
            Self::SetSingle { .. } => CommandKind::SetSingle,
            Self::SetPair { .. } => CommandKind::SetPair,
            Self::Assign { .. } => CommandKind::Assign,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Login { .. } => None,
            Self::Logout { session }
            | Self::SetSingle { session, .. }
            | Self::SetPair { session, .. }
            | Self::Assign { session, .. } => Some(session),
        }
    }

    /// Path and query for this command, e.g. `/index.cgi?session=ab12&set=all`
    pub fn query(&self) -> String {
        let params = match self {
            Self::Login { username, password } => {
                format!("username={}&password={}", escape(username), escape(password))
            }
            Self::Logout { session } => format!("session={}&set=all", escape(session.as_str())),
            Self::SetSingle {
                session,
                item,
                value,
            } => format!(
                "session={}&set={}&item={}",
                escape(session.as_str()),
                item,
                escape(value)
            ),
            Self::SetPair {
                session,
                item,
                value,
                companion,
            } => format!(
                "session={}&set={}&item={}&{}={}",
                escape(session.as_str()),
                item,
                escape(value),
                companion.key(),
                companion.value()
            ),
            Self::Assign {
                session,
                key,
                value,
            } => format!("session={}&{}={}", escape(session.as_str()), key, value),
        };
        format!("{}?{}", CGI_PATH, params)
    }

    pub fn url(&self, endpoint: &Endpoint) -> String {
        endpoint.url(&self.query())
    }
}

// Passwords stay out of logs
impl Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Logout { session } => f.debug_struct("Logout").field("session", session).finish(),
            Self::SetSingle {
                session,
                item,
                value,
            } => f
                .debug_struct("SetSingle")
                .field("session", session)
                .field("item", item)
                .field("value", &shown(item, value))
                .finish(),
            Self::SetPair {
                session,
                item,
                value,
                companion,
            } => f
                .debug_struct("SetPair")
                .field("session", session)
                .field("item", item)
                .field("value", &shown(item, value))
                .field("companion", companion)
                .finish(),
            Self::Assign {
                session,
                key,
                value,
            } => f
                .debug_struct("Assign")
                .field("session", session)
                .field("key", key)
                .field("value", value)
                .finish(),
        }
    }
}

fn shown<'a>(item: &ItemCode, value: &'a str) -> &'a str {
    if item.is_secret() {
        "<redacted>"
    } else {
        value
    }
}

fn escape(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}
