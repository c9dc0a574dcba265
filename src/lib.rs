//! Client for the HTTP configuration interface of NEC SIP handsets.
//!
//! The handsets take every command as a `GET /index.cgi?...` request. A
//! [`SessionClient`] logs in to get a session token, sends writes with that
//! token, and logs off, which makes the handset commit the writes and reboot.
//! Handsets whose TLS stack refuses the client can be reached by wrapping the
//! transport in a [`DowngradeRetrier`].
//!
//! [`provision`] and [`provision_all`] run the whole sequence for one or many
//! handsets from [`settings`] groups.

mod command;
mod config;
mod constants;
mod endpoint;
mod error;
mod provision;
mod retry;
mod session;
mod transport;

pub mod catalog;
pub mod codec;
pub mod settings;

pub use command::{Action, Command, CommandKind, Session};
pub use config::ClientConfig;
pub use constants::{DEFAULT_MAX_PARALLEL, DEFAULT_PASSWORD, DEFAULT_USERNAME};
pub use endpoint::{Endpoint, Scheme};
pub use error::{AuthFailure, ClientError, Error, Result};
pub use provision::{provision, provision_all, Credentials, DeviceReport, DeviceTarget, WriteReport};
pub use retry::DowngradeRetrier;
pub use session::{LogoutStatus, Outcome, SessionClient, SessionState};
pub use settings::{FactoryReset, LanPortSettings, PcPortSettings, Settings, VoipSettings, Write};
pub use transport::{FailureKind, HttpTransport, Response, Transport, TransportError, TransportPolicy};
