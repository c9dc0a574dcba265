use super::command::{Action, Command, CommandKind, Session};
use super::constants::SESSION_PATTERN;
use super::endpoint::Endpoint;
use super::error::{AuthFailure, Error, Result};
use super::transport::{Transport, TransportPolicy};

use regex::Regex;

use std::mem;

/// Where a [`SessionClient`] is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Session),
    /// Logged off or rebooted; the handset has discarded the token
    Closed,
}

/// Result of a completed exchange
///
/// A non-200 status is not an error at this level; what it means depends on the
/// item being written. Use [`error_for_status`](Self::error_for_status) to treat it
/// as one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Endpoint that answered
    pub endpoint: Endpoint,
    pub command: CommandKind,
    pub status: u16,
    pub body: String,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Turn a non-200 answer into [`Error::DeviceRejected`]
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::DeviceRejected {
                endpoint: self.endpoint,
                command: self.command,
                status: self.status,
                body: self.body,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutStatus {
    /// The logoff request was exchanged with the handset
    Completed(Outcome),
    /// An earlier call already ended the session; nothing was sent
    AlreadyClosed,
}

/// A client session with one NEC handset
///
/// Owns the session lifecycle: [`login()`](Self::login), any number of
/// [`execute()`](Self::execute) calls, then [`logout()`](Self::logout), which also makes
/// the handset commit the writes and reboot.
///
/// The session token is the client's only mutable state and is not synchronised, so a
/// client must not be shared between concurrent callers. Run one client per handset.
///
/// # Example
///
/// ```
/// use necsip::{catalog, codec, Action, Endpoint, HttpTransport, SessionClient, TransportPolicy};
///
/// # async fn enable_lldp() -> Result<(), necsip::Error> {
/// let endpoint = Endpoint::parse("10.0.0.5")?;
/// let mut client = SessionClient::new(endpoint, HttpTransport::new(), TransportPolicy::default())?;
///
/// client.login("ADMIN", "6633222").await?;
/// client
///     .execute(Action::set(catalog::LAN_LLDP_MODE, codec::encode_bool(true)))
///     .await?
///     .error_for_status()?;
/// client.logout().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SessionClient<T> {
    endpoint: Endpoint,
    policy: TransportPolicy,
    transport: T,
    state: SessionState,
}

impl<T: Transport> SessionClient<T> {
    /// Fails if the transport cannot use `policy`, e.g. a malformed proxy address
    pub fn new(endpoint: Endpoint, transport: T, policy: TransportPolicy) -> Result<Self> {
        transport.prepare(&policy)?;
        Ok(Self {
            endpoint,
            policy,
            transport,
            state: SessionState::Unauthenticated,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn policy(&self) -> &TransportPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The live token, if logged in
    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    /// Log in and keep the session token issued by the handset
    ///
    /// Any token held from an earlier login is dropped. On failure the client is
    /// left unauthenticated and the error is [`Error::AuthenticationFailed`], whether
    /// the handset refused, sent no token, or could not be reached.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Session> {
        if self.is_authenticated() {
            log::warn!(
                target: "necsip::session",
                "Replacing live session on {} with a new login",
                self.endpoint
            );
        }
        self.state = SessionState::Unauthenticated;

        let outcome = match self.send(&Command::login(username, password)).await {
            Ok(outcome) => outcome,
            Err(Error::TransportFailed { endpoint, source, .. }) => {
                return Err(Error::AuthenticationFailed(
                    endpoint,
                    AuthFailure::Transport(source),
                ))
            }
            Err(e) => return Err(e),
        };
        if !outcome.is_success() {
            return Err(Error::AuthenticationFailed(
                outcome.endpoint,
                AuthFailure::Status(outcome.status),
            ));
        }

        let session = match extract_session(&outcome.body)? {
            Some(session) => session,
            None => {
                return Err(Error::AuthenticationFailed(
                    outcome.endpoint,
                    AuthFailure::MissingToken,
                ))
            }
        };

        log::info!(
            target: "necsip::session",
            "Logon successful for session {} on host {}",
            session,
            outcome.endpoint
        );
        self.state = SessionState::Authenticated(session.clone());
        Ok(session)
    }

    /// Continue a session obtained earlier, e.g. one kept open by another run
    pub fn resume(&mut self, session: Session) {
        log::debug!(
            target: "necsip::session",
            "Resuming session {} on host {}",
            session,
            self.endpoint
        );
        self.state = SessionState::Authenticated(session);
    }

    /// Send a write with the current session token
    ///
    /// Returns the raw [`Outcome`], whatever its status. Fails with
    /// [`Error::NotLoggedIn`] without touching the network when there is no session.
    pub async fn execute(&mut self, action: Action) -> Result<Outcome> {
        let session = self.session().cloned().ok_or(Error::NotLoggedIn)?;
        let command = action.bind(session);
        log::debug!(target: "necsip::session", "{:?} on {}", command, self.endpoint);

        let outcome = self.send(&command).await?;
        if !outcome.is_success() {
            log::warn!(
                target: "necsip::session",
                "{} on {} answered with status {}",
                outcome.command,
                outcome.endpoint,
                outcome.status
            );
        }
        Ok(outcome)
    }

    /// End the session, committing all writes
    ///
    /// The client is closed afterwards whatever the handset answered, since the
    /// token is presumed expired either way. Calling this again sends nothing and
    /// returns [`LogoutStatus::AlreadyClosed`].
    pub async fn logout(&mut self) -> Result<LogoutStatus> {
        match mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Authenticated(session) => {
                let outcome = self.send(&Command::logout(session.clone())).await?;
                if outcome.is_success() {
                    log::info!(
                        target: "necsip::session",
                        "Logoff successful for session {} on host {}",
                        session,
                        outcome.endpoint
                    );
                } else {
                    log::warn!(
                        target: "necsip::session",
                        "Logoff failed for session {} on host {}: status {}",
                        session,
                        outcome.endpoint,
                        outcome.status
                    );
                }
                Ok(LogoutStatus::Completed(outcome))
            }
            SessionState::Closed => Ok(LogoutStatus::AlreadyClosed),
            SessionState::Unauthenticated => {
                self.state = SessionState::Unauthenticated;
                Err(Error::NotLoggedIn)
            }
        }
    }

    /// Give up the client and hand back the live token without logging off
    ///
    /// Writes stay pending on the handset until someone logs off with this token.
    pub fn detach(self) -> Option<Session> {
        match self.state {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    /// Forget the token after the handset has dropped it on its own, e.g. on reboot
    ///
    /// Sends nothing. A later [`logout`](Self::logout) reports
    /// [`LogoutStatus::AlreadyClosed`].
    pub fn invalidate(&mut self) {
        if let SessionState::Authenticated(session) = &self.state {
            log::debug!(target: "necsip::session", "Session {} dropped by {}", session, self.endpoint);
        }
        self.state = SessionState::Closed;
    }

    /// Check a username and password by logging in and straight back out
    pub async fn verify_credentials(&mut self, username: &str, password: &str) -> Result<()> {
        self.login(username, password).await?;
        match self.logout().await? {
            LogoutStatus::Completed(outcome) => outcome.error_for_status().map(|_| ()),
            LogoutStatus::AlreadyClosed => Ok(()),
        }
    }

    async fn send(&self, command: &Command) -> Result<Outcome> {
        let kind = command.kind();
        let res = self
            .transport
            .send(&self.endpoint, &command.query(), &self.policy)
            .await
            .map_err(|source| Error::TransportFailed {
                endpoint: self.endpoint.clone(),
                command: kind,
                source,
            })?;

        Ok(Outcome {
            endpoint: res.endpoint,
            command: kind,
            status: res.status,
            body: res.body,
        })
    }
}

/// Pull the session token out of a login page
fn extract_session(body: &str) -> Result<Option<Session>> {
    let pattern = Regex::new(SESSION_PATTERN)?;
    match pattern.captures(body).and_then(|caps| caps.get(1)) {
        Some(token) => Ok(Some(Session::new(token.as_str())?)),
        None => Ok(None),
    }
}
